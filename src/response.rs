//! Response classifier: maps HTTP status + media type into success payloads or the engine's
//! error taxonomy.
//!
//! Every classifier reads at most [`MAX_BODY_BYTES`] of the body. Longer bodies are truncated,
//! which is an accepted lossy-read policy: the RFC error fields always appear early, and raw
//! bodies are only kept for diagnostics.
//!
//! Error bodies are parsed under one of two policies:
//!
//! - [`ErrorBodyPolicy::Strict`] (PAR, introspection): `application/json` is decoded, form or
//!   `text/plain` bodies are read as query strings, any other media type is rejected as
//!   unrecognized, and malformed JSON is a parse error.
//! - [`ErrorBodyPolicy::Lenient`] (revocation, token exchange): form or `text/plain` bodies are
//!   read as query strings and everything else is tried as JSON; a body that cannot be parsed
//!   still yields an [`OAuthError`] with empty RFC fields.

// crates.io
use oauth2::http::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	error::{OAuthError, OAuthErrorKind, ResponseError},
	flows::{Introspection, PushedAuthResponse},
	http::MAX_BODY_BYTES,
	request::FORM_CONTENT_TYPE,
	token::{Token, TokenResponse},
};

/// How strictly error bodies are interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorBodyPolicy {
	/// Reject unknown media types and malformed JSON.
	Strict,
	/// Keep the raw response when the body cannot be parsed.
	Lenient,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorFields {
	#[serde(default)]
	error: Option<String>,
	#[serde(default)]
	error_description: Option<String>,
	#[serde(default)]
	error_uri: Option<String>,
}
impl ErrorFields {
	fn from_form(body: &[u8]) -> Self {
		let mut fields = Self::default();

		for (key, value) in url::form_urlencoded::parse(body) {
			let slot = match key.as_ref() {
				"error" => &mut fields.error,
				"error_description" => &mut fields.error_description,
				"error_uri" => &mut fields.error_uri,
				_ => continue,
			};

			slot.get_or_insert_with(|| value.into_owned());
		}

		fields
	}

	fn apply(self, err: &mut OAuthError) {
		err.error_code = self.error.unwrap_or_default();
		err.error_description = self.error_description.unwrap_or_default();
		err.error_uri = self.error_uri.unwrap_or_default();
	}
}

/// Returns the lowercased `Content-Type` media type without parameters, or `""` if absent.
pub fn media_type(headers: &HeaderMap) -> String {
	headers
		.get(CONTENT_TYPE)
		.and_then(|value| value.to_str().ok())
		.and_then(|value| value.split(';').next())
		.map(|value| value.trim().to_ascii_lowercase())
		.unwrap_or_default()
}

/// Classifies a token endpoint response.
pub(crate) fn token_response(response: HttpResponse, now: OffsetDateTime) -> Result<Token> {
	const ENDPOINT: &str = "token";

	let (status, headers, body) = into_parts(response);

	if !status.is_success() {
		return Err(error_response(
			OAuthErrorKind::Retrieve,
			ENDPOINT,
			ErrorBodyPolicy::Lenient,
			status,
			headers,
			body,
		));
	}

	let parsed = if is_form_like(&media_type(&headers)) {
		TokenResponse::from_form(&body)
	} else {
		parse_json::<TokenResponse>(ENDPOINT, status, &body)?
	};

	if parsed.access_token.is_empty() {
		return Err(ResponseError::MissingAccessToken.into());
	}

	Ok(parsed.into_token(now))
}

/// Classifies an introspection endpoint response.
pub(crate) fn introspection_response(response: HttpResponse) -> Result<Introspection> {
	const ENDPOINT: &str = "introspection";

	let (status, headers, body) = into_parts(response);

	if !status.is_success() {
		return Err(error_response(
			OAuthErrorKind::Introspection,
			ENDPOINT,
			ErrorBodyPolicy::Strict,
			status,
			headers,
			body,
		));
	}

	parse_json(ENDPOINT, status, &body)
}

/// Classifies a revocation endpoint response; any 2xx is success and the body is ignored.
pub(crate) fn revocation_response(response: HttpResponse) -> Result<()> {
	let (status, headers, body) = into_parts(response);

	if status.is_success() {
		return Ok(());
	}

	Err(error_response(
		OAuthErrorKind::Revoke,
		"revocation",
		ErrorBodyPolicy::Lenient,
		status,
		headers,
		body,
	))
}

/// Classifies a pushed authorization endpoint response.
///
/// Only `201 Created` with a valid payload succeeds; any other 2xx is reported as an unexpected
/// success status instead of being accepted silently.
pub(crate) fn pushed_auth_response(response: HttpResponse) -> Result<PushedAuthResponse> {
	const ENDPOINT: &str = "pushed authorization";

	let (status, headers, body) = into_parts(response);

	if status == StatusCode::CREATED {
		let parsed = parse_json::<PushedAuthResponse>(ENDPOINT, status, &body)?;

		if !parsed.is_valid() {
			return Err(ResponseError::InvalidPushedAuth.into());
		}

		return Ok(parsed);
	}
	if status.is_success() {
		return Err(ResponseError::UnexpectedSuccessStatus { status: status.as_u16() }.into());
	}

	Err(error_response(
		OAuthErrorKind::Retrieve,
		ENDPOINT,
		ErrorBodyPolicy::Strict,
		status,
		headers,
		body,
	))
}

/// Builds the error for a non-success response according to `policy`.
pub(crate) fn error_response(
	kind: OAuthErrorKind,
	endpoint: &'static str,
	policy: ErrorBodyPolicy,
	status: StatusCode,
	headers: HeaderMap,
	body: Vec<u8>,
) -> Error {
	let content_type = media_type(&headers);
	let fields = if is_form_like(&content_type) {
		ErrorFields::from_form(&body)
	} else {
		match (policy, content_type.as_str()) {
			(ErrorBodyPolicy::Strict, "application/json") =>
				match parse_json::<ErrorFields>(endpoint, status, &body) {
					Ok(fields) => fields,
					Err(err) => return err,
				},
			(ErrorBodyPolicy::Strict, _) =>
				return ResponseError::UnrecognizedContentType {
					endpoint,
					content_type,
					status: status.as_u16(),
					body,
				}
				.into(),
			(ErrorBodyPolicy::Lenient, _) =>
				serde_json::from_slice::<ErrorFields>(&body).unwrap_or_default(),
		}
	};
	let mut err = OAuthError::from_response(kind, status, headers, body);

	fields.apply(&mut err);

	err.into()
}

fn into_parts(response: HttpResponse) -> (StatusCode, HeaderMap, Vec<u8>) {
	let (parts, mut body) = response.into_parts();

	body.truncate(MAX_BODY_BYTES);

	(parts.status, parts.headers, body)
}

fn is_form_like(media_type: &str) -> bool {
	media_type == FORM_CONTENT_TYPE || media_type == "text/plain"
}

fn parse_json<T>(endpoint: &'static str, status: StatusCode, body: &[u8]) -> Result<T>
where
	T: DeserializeOwned,
{
	let mut deserializer = serde_json::Deserializer::from_slice(body);

	serde_path_to_error::deserialize(&mut deserializer).map_err(|source| {
		Error::from(ResponseError::Parse {
			endpoint,
			source,
			status: status.as_u16(),
			body: body.to_vec(),
		})
	})
}
