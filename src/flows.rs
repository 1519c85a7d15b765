//! Client configuration plus the OAuth flows it drives.
//!
//! [`OAuthClient`] owns the client credentials, the provider's [`Endpoint`] URLs, the HTTP
//! transport, and the [`AuthStyleCache`]. Each flow lives in its own submodule and adds methods
//! to [`OAuthClient`]; all of them funnel through one negotiated POST helper so credential
//! placement, probing, and response classification behave identically across endpoints.

pub mod auth_code;
pub mod exchange;
pub mod hints;
pub mod introspection;
pub mod par;
pub mod revocation;

pub use auth_code::*;
pub use hints::*;
pub use introspection::*;
pub use par::*;

// self
use crate::{
	_prelude::*,
	auth_style::{self, AuthStyle, AuthStyleCache},
	error::ConfigError,
	http::{self, TokenHttpClient},
	request::{self, ClientCredentials, Form},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport.
pub type ReqwestOAuthClient = OAuthClient<ReqwestHttpClient>;

/// Provider endpoint URLs plus the declared client auth style.
///
/// Empty URLs mark the corresponding operation as unsupported; calling it fails with
/// [`ConfigError::MissingEndpoint`] before any request is sent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoint {
	/// Authorization endpoint.
	pub auth_url: String,
	/// Token endpoint.
	pub token_url: String,
	/// Token introspection endpoint (RFC 7662).
	pub introspection_url: String,
	/// Token revocation endpoint (RFC 7009).
	pub revocation_url: String,
	/// Pushed authorization request endpoint (RFC 9126).
	pub pushed_auth_url: String,
	/// Declared credential placement; [`AuthStyle::Unknown`] enables probing.
	pub auth_style: AuthStyle,
}
impl Endpoint {
	/// Creates an endpoint set with the authorization and token URLs.
	pub fn new(auth_url: impl Into<String>, token_url: impl Into<String>) -> Self {
		Self { auth_url: auth_url.into(), token_url: token_url.into(), ..Default::default() }
	}

	/// Sets the introspection URL.
	pub fn with_introspection_url(mut self, url: impl Into<String>) -> Self {
		self.introspection_url = url.into();

		self
	}

	/// Sets the revocation URL.
	pub fn with_revocation_url(mut self, url: impl Into<String>) -> Self {
		self.revocation_url = url.into();

		self
	}

	/// Sets the pushed authorization request URL.
	pub fn with_pushed_auth_url(mut self, url: impl Into<String>) -> Self {
		self.pushed_auth_url = url.into();

		self
	}

	/// Declares the credential placement the provider expects.
	pub fn with_auth_style(mut self, style: AuthStyle) -> Self {
		self.auth_style = style;

		self
	}
}

/// OAuth 2.0 client bound to one provider.
///
/// Clones share the HTTP transport and the auth style cache.
pub struct OAuthClient<C>
where
	C: ?Sized + TokenHttpClient,
{
	/// OAuth 2.0 client identifier.
	pub client_id: String,
	/// Client secret; empty for public clients.
	pub client_secret: String,
	/// Provider endpoints.
	pub endpoint: Endpoint,
	/// Redirect URL sent with authorization and code exchange requests.
	pub redirect_url: Option<String>,
	/// Scopes requested by authorization and client credentials flows.
	pub scopes: Vec<String>,
	/// HTTP transport used for every provider request.
	pub http_client: Arc<C>,
	auth_style_cache: AuthStyleCache,
}
impl<C> OAuthClient<C>
where
	C: ?Sized + TokenHttpClient,
{
	/// Creates a client that reuses the caller-provided transport.
	pub fn with_http_client(
		client_id: impl Into<String>,
		endpoint: Endpoint,
		http_client: impl Into<Arc<C>>,
	) -> Self {
		Self {
			client_id: client_id.into(),
			client_secret: String::new(),
			endpoint,
			redirect_url: None,
			scopes: Vec::new(),
			http_client: http_client.into(),
			auth_style_cache: AuthStyleCache::default(),
		}
	}

	/// Sets the client secret used by confidential clients.
	pub fn with_client_secret(mut self, secret: impl Into<String>) -> Self {
		self.client_secret = secret.into();

		self
	}

	/// Sets the redirect URL.
	pub fn with_redirect_url(mut self, url: impl Into<String>) -> Self {
		self.redirect_url = Some(url.into());

		self
	}

	/// Replaces the requested scopes.
	pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.scopes = scopes.into_iter().map(Into::into).collect();

		self
	}

	/// Shares an existing auth style cache, e.g. between clients for the same provider.
	pub fn with_auth_style_cache(mut self, cache: AuthStyleCache) -> Self {
		self.auth_style_cache = cache;

		self
	}

	/// Auth style cache consulted before probing.
	pub fn auth_style_cache(&self) -> &AuthStyleCache {
		&self.auth_style_cache
	}

	fn credentials(&self) -> ClientCredentials<'_> {
		ClientCredentials { client_id: &self.client_id, client_secret: &self.client_secret }
	}

	/// Posts `form` to `url` under the negotiated auth style and classifies the response.
	///
	/// Probing re-sends the identical form, so callers must build it once up front.
	async fn post_negotiated<T, P>(
		&self,
		url: &str,
		endpoint: &'static str,
		form: &Form,
		classify: P,
	) -> Result<T>
	where
		P: Fn(HttpResponse) -> Result<T>,
	{
		let classify = &classify;

		auth_style::negotiate(url, self.endpoint.auth_style, &self.auth_style_cache, move |style| {
			let request = request::new_post_request(url, self.credentials(), form, style);

			async move {
				let response = http::send(self.http_client.as_ref(), endpoint, request?).await?;

				classify(response)
			}
		})
		.await
	}
}
#[cfg(feature = "reqwest")]
impl OAuthClient<ReqwestHttpClient> {
	/// Creates a client backed by a default reqwest transport.
	pub fn new(client_id: impl Into<String>, endpoint: Endpoint) -> Self {
		Self::with_http_client(client_id, endpoint, ReqwestHttpClient::default())
	}
}
impl<C> Clone for OAuthClient<C>
where
	C: ?Sized + TokenHttpClient,
{
	fn clone(&self) -> Self {
		Self {
			client_id: self.client_id.clone(),
			client_secret: self.client_secret.clone(),
			endpoint: self.endpoint.clone(),
			redirect_url: self.redirect_url.clone(),
			scopes: self.scopes.clone(),
			http_client: self.http_client.clone(),
			auth_style_cache: self.auth_style_cache.clone(),
		}
	}
}
impl<C> Debug for OAuthClient<C>
where
	C: ?Sized + TokenHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OAuthClient")
			.field("client_id", &self.client_id)
			.field("client_secret_set", &!self.client_secret.is_empty())
			.field("endpoint", &self.endpoint)
			.field("redirect_url", &self.redirect_url)
			.field("scopes", &self.scopes)
			.finish()
	}
}

/// Returns `url` unless it is empty.
fn require_endpoint<'a>(url: &'a str, endpoint: &'static str) -> Result<&'a str, ConfigError> {
	if url.is_empty() {
		return Err(ConfigError::MissingEndpoint { endpoint });
	}

	Ok(url)
}

fn parse_endpoint(url: &str) -> Result<Url, ConfigError> {
	Url::parse(url).map_err(|source| ConfigError::InvalidEndpoint { url: url.to_owned(), source })
}
