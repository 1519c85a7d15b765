//! OAuth 2.0 client protocol engine: token exchange, introspection (RFC 7662), revocation
//! (RFC 7009), pushed authorization requests (RFC 9126), and PKCE (RFC 7636), with one-shot
//! client auth-style probing and a typed error taxonomy.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]
// The self dev-dependency is linked into unit tests as well.
#![cfg_attr(test, allow(unused_crate_dependencies))]

pub mod auth_style;
pub mod error;
pub mod flows;
pub mod http;
pub mod obs;
pub mod pkce;
pub mod request;
pub mod response;
pub mod token;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		flows::{Endpoint, ReqwestOAuthClient},
		http::ReqwestHttpClient,
	};

	/// Client ID shared by integration test fixtures.
	pub const TEST_CLIENT_ID: &str = "CLIENT_ID";
	/// Client secret shared by integration test fixtures.
	pub const TEST_CLIENT_SECRET: &str = "CLIENT_SECRET";

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Constructs an [`ReqwestOAuthClient`] with the shared test credentials, a redirect URL,
	/// two scopes, and the reqwest transport used across integration tests.
	pub fn build_reqwest_test_client(endpoint: Endpoint) -> ReqwestOAuthClient {
		ReqwestOAuthClient::with_http_client(TEST_CLIENT_ID, endpoint, test_reqwest_http_client())
			.with_client_secret(TEST_CLIENT_SECRET)
			.with_redirect_url("REDIRECT_URL")
			.with_scopes(["scope1", "scope2"])
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		ops::ControlFlow,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use oauth2::{
		HttpRequest, HttpResponse,
		http::{HeaderMap, StatusCode},
	};
	pub use parking_lot::RwLock;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use oauth2;
#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _, tokio as _};
