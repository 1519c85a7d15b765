//! Credential encoder: builds the form-encoded POST requests every flow sends.

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
use oauth2::http::{
	Method, Request,
	header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderValue},
};
use url::form_urlencoded;
// self
use crate::{_prelude::*, auth_style::AuthStyle, error::ConfigError};

/// Form body parameters; keys are kept sorted so encoded bodies are deterministic.
pub type Form = BTreeMap<String, String>;

/// Media type of every request body the engine sends.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Client identity attached to token-bearing requests.
#[derive(Clone, Copy)]
pub struct ClientCredentials<'a> {
	/// OAuth 2.0 client identifier.
	pub client_id: &'a str,
	/// Client secret; empty for public clients.
	pub client_secret: &'a str,
}
impl Debug for ClientCredentials<'_> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ClientCredentials")
			.field("client_id", &self.client_id)
			.field("client_secret_set", &!self.client_secret.is_empty())
			.finish()
	}
}

/// Builds a POST request for `url` carrying `form` and the client credentials placed according
/// to `style`.
///
/// [`AuthStyle::InHeader`] (and an unresolved [`AuthStyle::Unknown`]) uses HTTP Basic with the
/// form-urlencoded client ID and secret (RFC 6749 §2.3.1) and leaves the body untouched.
/// [`AuthStyle::InParams`] adds `client_id`, plus `client_secret` when it is non-empty.
pub fn new_post_request(
	url: &str,
	credentials: ClientCredentials,
	form: &Form,
	style: AuthStyle,
) -> Result<HttpRequest, ConfigError> {
	let endpoint = Url::parse(url)
		.map_err(|source| ConfigError::InvalidEndpoint { url: url.to_owned(), source })?;
	let mut body = form.clone();
	let mut builder = Request::builder()
		.method(Method::POST)
		.uri(endpoint.as_str())
		.header(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE))
		.header(ACCEPT, HeaderValue::from_static("application/json"));

	match style {
		AuthStyle::InParams => {
			body.insert("client_id".into(), credentials.client_id.into());

			if !credentials.client_secret.is_empty() {
				body.insert("client_secret".into(), credentials.client_secret.into());
			}
		},
		AuthStyle::InHeader | AuthStyle::Unknown => {
			builder = builder.header(AUTHORIZATION, basic_authorization(credentials));
		},
	}

	Ok(builder.body(encode_form(&body).into_bytes())?)
}

/// Serializes `form` as `application/x-www-form-urlencoded`.
pub fn encode_form(form: &Form) -> String {
	form_urlencoded::Serializer::new(String::new()).extend_pairs(form.iter()).finish()
}

fn basic_authorization(credentials: ClientCredentials) -> String {
	let user =
		form_urlencoded::byte_serialize(credentials.client_id.as_bytes()).collect::<String>();
	let password =
		form_urlencoded::byte_serialize(credentials.client_secret.as_bytes()).collect::<String>();

	format!("Basic {}", STANDARD.encode(format!("{user}:{password}")))
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	const URL: &str = "https://example.com/revoke";

	fn form() -> Form {
		Form::from([
			("token".to_owned(), "abc".to_owned()),
			("token_type_hint".to_owned(), "access_token".to_owned()),
		])
	}

	fn credentials(client_secret: &str) -> ClientCredentials<'_> {
		ClientCredentials { client_id: "CLIENT_ID", client_secret }
	}

	#[test]
	fn header_style_uses_basic_auth_and_leaves_body_alone() {
		let request =
			new_post_request(URL, credentials("CLIENT_SECRET"), &form(), AuthStyle::InHeader)
				.expect("Header request should build.");

		assert_eq!(request.method(), Method::POST);
		assert_eq!(
			request.headers().get(AUTHORIZATION).and_then(|value| value.to_str().ok()),
			Some("Basic Q0xJRU5UX0lEOkNMSUVOVF9TRUNSRVQ=")
		);
		assert_eq!(
			request.headers().get(CONTENT_TYPE).and_then(|value| value.to_str().ok()),
			Some(FORM_CONTENT_TYPE)
		);
		assert_eq!(
			request.headers().get(ACCEPT).and_then(|value| value.to_str().ok()),
			Some("application/json")
		);
		assert_eq!(request.body().as_slice(), b"token=abc&token_type_hint=access_token");
	}

	#[test]
	fn header_style_form_encodes_credentials() {
		let request = new_post_request(
			URL,
			ClientCredentials { client_id: "id:with space", client_secret: "p@ss" },
			&Form::new(),
			AuthStyle::InHeader,
		)
		.expect("Header request should build.");
		let expected = format!("Basic {}", STANDARD.encode("id%3Awith+space:p%40ss"));

		assert_eq!(
			request.headers().get(AUTHORIZATION).and_then(|value| value.to_str().ok()),
			Some(expected.as_str())
		);
	}

	#[test]
	fn params_style_moves_credentials_into_body() {
		let request =
			new_post_request(URL, credentials("CLIENT_SECRET"), &form(), AuthStyle::InParams)
				.expect("Params request should build.");

		assert!(request.headers().get(AUTHORIZATION).is_none());
		assert_eq!(
			request.body().as_slice(),
			b"client_id=CLIENT_ID&client_secret=CLIENT_SECRET&token=abc&token_type_hint=access_token"
		);
	}

	#[test]
	fn public_clients_omit_the_secret() {
		let request = new_post_request(URL, credentials(""), &form(), AuthStyle::InParams)
			.expect("Public client request should build.");

		assert_eq!(
			request.body().as_slice(),
			b"client_id=CLIENT_ID&token=abc&token_type_hint=access_token"
		);
	}

	#[test]
	fn malformed_urls_fail_before_sending() {
		let err = new_post_request("not a url", credentials(""), &form(), AuthStyle::InParams)
			.expect_err("Malformed URLs should be rejected.");

		assert!(matches!(err, ConfigError::InvalidEndpoint { .. }));
	}
}
