//! Pushed authorization requests (RFC 9126).

// self
use crate::{
	_prelude::*,
	flows::{AuthCodeOption, OAuthClient, parse_endpoint, require_endpoint},
	http::TokenHttpClient,
	obs::{self, FlowKind},
	request::Form,
	response,
};

/// Successful pushed authorization response.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushedAuthResponse {
	/// Single-use reference to the pushed request, passed to the authorization endpoint.
	#[serde(default)]
	pub request_uri: String,
	/// Lifetime of `request_uri` in seconds.
	#[serde(default)]
	pub expires_in: i64,
}
impl PushedAuthResponse {
	/// Returns `true` when `request_uri` is non-empty and `expires_in` is positive.
	pub fn is_valid(&self) -> bool {
		!self.request_uri.is_empty() && self.expires_in > 0
	}
}

impl<C> OAuthClient<C>
where
	C: ?Sized + TokenHttpClient,
{
	/// Pushes the authorization request parameters to the PAR endpoint.
	///
	/// The body carries the same parameters as [`OAuthClient::auth_code_url`] plus any query
	/// parameters already present on the configured authorization URL. On success the returned
	/// URL is the authorization URL whose query is exactly `client_id` and `request_uri`; it is
	/// `None` when no authorization URL is configured.
	pub async fn pushed_auth(
		&self,
		state: &str,
		options: &[AuthCodeOption],
	) -> Result<(Option<Url>, PushedAuthResponse)> {
		obs::observe(FlowKind::PushedAuthorization, "pushed_auth", async move {
			let url = require_endpoint(&self.endpoint.pushed_auth_url, "pushed authorization")?;
			let (auth_url, form) = self.pushed_auth_values(state, options)?;
			let classify = response::pushed_auth_response;
			let par = self.post_negotiated(url, "pushed authorization", &form, classify).await?;
			let auth_url = auth_url.map(|mut auth_url| {
				auth_url
					.query_pairs_mut()
					.append_pair("client_id", &self.client_id)
					.append_pair("request_uri", &par.request_uri);

				auth_url
			});

			Ok((auth_url, par))
		})
		.await
	}

	fn pushed_auth_values(
		&self,
		state: &str,
		options: &[AuthCodeOption],
	) -> Result<(Option<Url>, Form)> {
		let mut form = Form::new();
		let auth_url = if self.endpoint.auth_url.is_empty() {
			None
		} else {
			let mut auth_url = parse_endpoint(&self.endpoint.auth_url)?;

			form.extend(auth_url.query_pairs().into_owned());
			auth_url.set_query(None);
			auth_url.set_fragment(None);

			Some(auth_url)
		};

		form.extend(self.auth_code_values(state, options));

		Ok((auth_url, form))
	}
}

#[cfg(all(test, feature = "reqwest"))]
mod tests {
	// self
	use super::*;
	use crate::{_preludet::*, flows::Endpoint};

	#[test]
	fn values_merge_the_auth_url_query() {
		let client = build_reqwest_test_client(Endpoint::new(
			"https://provider.example/auth?audience=api&state=stale#frag",
			"https://provider.example/token",
		));
		let (auth_url, form) =
			client.pushed_auth_values("state", &[]).expect("PAR values should build.");

		assert_eq!(auth_url.as_ref().map(Url::as_str), Some("https://provider.example/auth"));
		assert_eq!(form.get("audience").map(String::as_str), Some("api"));
		assert_eq!(form.get("state").map(String::as_str), Some("state"));
		assert_eq!(form.get("response_type").map(String::as_str), Some("code"));
	}

	#[test]
	fn values_without_auth_url_have_no_return_url() {
		let client = build_reqwest_test_client(Endpoint::default());
		let (auth_url, form) =
			client.pushed_auth_values("state", &[]).expect("PAR values should build.");

		assert!(auth_url.is_none());
		assert_eq!(form.get("client_id").map(String::as_str), Some(TEST_CLIENT_ID));
	}

	#[test]
	fn payload_validity() {
		let valid = PushedAuthResponse { request_uri: "urn:x".into(), expires_in: 60 };

		assert!(valid.is_valid());
		assert!(!PushedAuthResponse { expires_in: 0, ..valid.clone() }.is_valid());
		assert!(!PushedAuthResponse { request_uri: String::new(), ..valid }.is_valid());
	}
}
