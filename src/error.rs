//! Engine-level error types shared across every flow.
//!
//! [`Error`] is the single error surfaced by public APIs. It separates caller-input problems
//! ([`ConfigError`]), network failures ([`TransportError`]), RFC 6749 protocol errors
//! ([`OAuthError`], tagged with the [`OAuthErrorKind`] of the flow that produced them), malformed
//! or unexpected provider responses ([`ResponseError`]), and partially failed introspection
//! batches.

// crates.io
use oauth2::http::header::RETRY_AFTER;
use time::format_description::well_known::Rfc2822;
// self
use crate::{_prelude::*, flows::IntrospectionResult};

/// Engine-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical engine error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Caller input or local configuration problem; no request was sent.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, IO).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Provider answered with an OAuth 2.0 error response.
	#[error(transparent)]
	OAuth(#[from] OAuthError),
	/// Provider answered with a response the engine cannot interpret.
	#[error(transparent)]
	Response(#[from] ResponseError),
	/// At least one token type hint failed during introspection.
	#[error(
		"Token introspection failed for {failed} of {} token type hints; inspect the per-hint results.",
		.results.len()
	)]
	PartialIntrospection {
		/// Number of failed hints.
		failed: usize,
		/// One result per dispatched hint, in dispatch order.
		results: Vec<IntrospectionResult>,
	},
}
impl Error {
	/// Returns the protocol error payload, if this error carries one.
	pub fn as_oauth(&self) -> Option<&OAuthError> {
		match self {
			Self::OAuth(err) => Some(err),
			_ => None,
		}
	}

	/// Consumes a partial introspection failure and returns its per-hint results.
	pub fn into_introspection_results(self) -> Option<Vec<IntrospectionResult>> {
		match self {
			Self::PartialIntrospection { results, .. } => Some(results),
			_ => None,
		}
	}

	/// Returns `true` when a probing request should be retried with the next auth style.
	///
	/// Caller-input errors would fail identically on the second attempt, so only errors that
	/// involved the provider qualify.
	pub fn triggers_auth_style_fallback(&self) -> bool {
		!matches!(self, Self::Config(_))
	}
}

/// Configuration and caller-input failures raised before any request is sent.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// The operation's endpoint URL is not configured.
	#[error("No {endpoint} endpoint URL was provided.")]
	MissingEndpoint {
		/// Endpoint label.
		endpoint: &'static str,
	},
	/// An endpoint URL cannot be parsed.
	#[error("Endpoint URL `{url}` is invalid.")]
	InvalidEndpoint {
		/// Raw URL string as configured.
		url: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Token type hint is neither `access_token` nor `refresh_token`.
	#[error("Token type hint `{hint}` isn't known.")]
	UnknownTokenTypeHint {
		/// Hint string supplied by the caller.
		hint: String,
	},
	/// Token does not carry the material a token type hint requires.
	#[error("Token type hint `{hint}` can only be used with a token that has a non-empty {hint}.")]
	MissingTokenMaterial {
		/// Hint that failed validation.
		hint: &'static str,
	},
	/// Operating system randomness was unavailable.
	#[error("Secure random bytes could not be generated.")]
	Randomness {
		/// Underlying RNG failure.
		#[source]
		source: BoxError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the {endpoint} endpoint.")]
	Network {
		/// Endpoint label.
		endpoint: &'static str,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling an OAuth endpoint.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(
		endpoint: &'static str,
		src: impl 'static + Send + Sync + std::error::Error,
	) -> Self {
		Self::Network { endpoint, source: Box::new(src) }
	}
}

/// Flow that produced an [`OAuthError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OAuthErrorKind {
	/// Token endpoint or PAR endpoint retrieval.
	Retrieve,
	/// Token revocation.
	Revoke,
	/// Token introspection.
	Introspection,
}
impl OAuthErrorKind {
	/// Returns a stable label for messages and logs.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Retrieve => "retrieve",
			Self::Revoke => "revoke",
			Self::Introspection => "introspection",
		}
	}
}
impl Display for OAuthErrorKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// RFC 6749 error triplet plus the raw HTTP response it was extracted from.
///
/// An empty [`error_code`](Self::error_code) means the provider's body could not be parsed into
/// RFC fields; the message then falls back to the HTTP status and raw body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OAuthError {
	/// Flow that received the response.
	pub kind: OAuthErrorKind,
	/// HTTP status code of the response.
	pub status: StatusCode,
	/// Response headers.
	pub headers: HeaderMap,
	/// Raw response body, truncated to the read limit.
	pub body: Vec<u8>,
	/// RFC 6749 `error` parameter.
	pub error_code: String,
	/// RFC 6749 `error_description` parameter.
	pub error_description: String,
	/// RFC 6749 `error_uri` parameter.
	pub error_uri: String,
}
impl OAuthError {
	/// Creates an error without RFC fields for the given response.
	pub fn from_response(
		kind: OAuthErrorKind,
		status: StatusCode,
		headers: HeaderMap,
		body: Vec<u8>,
	) -> Self {
		Self {
			kind,
			status,
			headers,
			body,
			error_code: String::new(),
			error_description: String::new(),
			error_uri: String::new(),
		}
	}

	/// Returns the provider's `Retry-After` hint as a relative duration.
	pub fn retry_after(&self) -> Option<Duration> {
		let raw = self.headers.get(RETRY_AFTER)?.to_str().ok()?.trim();

		if let Ok(secs) = raw.parse::<u64>() {
			return Some(Duration::seconds(i64::try_from(secs).unwrap_or(i64::MAX)));
		}
		if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
			let delta = moment - OffsetDateTime::now_utc();

			if delta.is_positive() {
				return Some(delta);
			}
		}

		None
	}
}
impl Display for OAuthError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		if self.error_code.is_empty() {
			return write!(
				f,
				"OAuth {} request failed with HTTP {}. Response: {}",
				self.kind,
				self.status,
				String::from_utf8_lossy(&self.body),
			);
		}

		write!(f, "OAuth {} request failed: {:?}", self.kind, self.error_code)?;

		if !self.error_description.is_empty() {
			write!(f, " {:?}", self.error_description)?;
		}
		if !self.error_uri.is_empty() {
			write!(f, " {:?}", self.error_uri)?;
		}

		Ok(())
	}
}
impl StdError for OAuthError {}

/// Responses that violate the expected success or error format.
#[derive(Debug, ThisError)]
pub enum ResponseError {
	/// PAR endpoint returned a 2xx other than `201 Created`.
	#[error("Pushed authorization endpoint returned HTTP {status}; expected 201 Created.")]
	UnexpectedSuccessStatus {
		/// HTTP status code returned by the provider.
		status: u16,
	},
	/// PAR success payload lacked `request_uri` or a positive `expires_in`.
	#[error("Pushed authorization response is missing request_uri or a positive expires_in.")]
	InvalidPushedAuth,
	/// Token endpoint answered without an access token.
	#[error("Token endpoint response is missing access_token.")]
	MissingAccessToken,
	/// Error response used a content type the classifier does not understand.
	#[error(
		"Unrecognized content type `{content_type}` in HTTP {status} response from the {endpoint} endpoint. Response: {}",
		String::from_utf8_lossy(.body)
	)]
	UnrecognizedContentType {
		/// Endpoint label.
		endpoint: &'static str,
		/// Media type without parameters.
		content_type: String,
		/// HTTP status code returned by the provider.
		status: u16,
		/// Raw response body, truncated to the read limit.
		body: Vec<u8>,
	},
	/// JSON body could not be decoded.
	#[error(
		"The {endpoint} endpoint returned malformed JSON (HTTP {status}). Response: {}",
		String::from_utf8_lossy(.body)
	)]
	Parse {
		/// Endpoint label.
		endpoint: &'static str,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code returned by the provider.
		status: u16,
		/// Raw response body, truncated to the read limit.
		body: Vec<u8>,
	},
}
