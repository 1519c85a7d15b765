//! Transport primitives for OAuth endpoint calls.
//!
//! The module exposes [`TokenHttpClient`], the engine's only dependency on an HTTP stack.
//! Requests and responses use the `oauth2` crate's [`HttpRequest`]/[`HttpResponse`] aliases so
//! any [`AsyncHttpClient`] can be plugged in. Implementations must cap the response body they
//! buffer at [`MAX_BODY_BYTES`]; larger bodies are truncated rather than rejected.

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// crates.io
use oauth2::{AsyncHttpClient, HttpClientError};
// self
use crate::{
	_prelude::*,
	error::{ConfigError, TransportError},
};

/// Upper bound on the number of response body bytes the engine reads (1 MiB).
pub const MAX_BODY_BYTES: usize = 1 << 20;

/// Abstraction over HTTP transports capable of executing OAuth endpoint calls.
///
/// Callers provide an implementation (typically behind `Arc<T>`) and the engine requests a
/// short-lived [`AsyncHttpClient`] handle per round-trip. Implementations must be
/// `Send + Sync + 'static` so clients can be shared across tasks, and the request futures the
/// handles return must be `Send` so engine futures can hop executors.
pub trait TokenHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// [`AsyncHttpClient`] handle used for a single round-trip.
	type Handle: for<'c> AsyncHttpClient<
			'c,
			Error = HttpClientError<Self::TransportError>,
			Future: 'c + Send,
		>
		+ 'static
		+ Send
		+ Sync;

	/// Builds a handle for the next request.
	fn handle(&self) -> Self::Handle;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// OAuth endpoints return results directly instead of delegating to another URI, so any custom
/// [`ReqwestClient`] should be configured not to follow redirects.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl TokenHttpClient for ReqwestHttpClient {
	type Handle = ReqwestHandle;
	type TransportError = ReqwestError;

	fn handle(&self) -> Self::Handle {
		ReqwestHandle(self.0.clone())
	}
}

/// Handle returned by [`ReqwestHttpClient`]; reads at most [`MAX_BODY_BYTES`] of each body.
#[cfg(feature = "reqwest")]
#[derive(Clone)]
pub struct ReqwestHandle(ReqwestClient);
#[cfg(feature = "reqwest")]
impl<'c> AsyncHttpClient<'c> for ReqwestHandle {
	type Error = HttpClientError<ReqwestError>;
	type Future = Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		let client = self.0.clone();

		Box::pin(async move {
			let mut response =
				client.execute(request.try_into().map_err(Box::new)?).await.map_err(Box::new)?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let mut body = Vec::new();

			while let Some(chunk) = response.chunk().await.map_err(Box::new)? {
				let remaining = MAX_BODY_BYTES - body.len();

				if chunk.len() >= remaining {
					body.extend_from_slice(&chunk[..remaining]);

					break;
				}

				body.extend_from_slice(&chunk);
			}

			let mut response_new = HttpResponse::new(body);

			*response_new.status_mut() = status;
			*response_new.headers_mut() = headers;

			Ok(response_new)
		})
	}
}

/// Sends `request` through a fresh handle and maps transport failures into engine errors.
pub(crate) async fn send<C>(
	client: &C,
	endpoint: &'static str,
	request: HttpRequest,
) -> Result<HttpResponse>
where
	C: ?Sized + TokenHttpClient,
{
	let handle = client.handle();

	handle.call(request).await.map_err(|err| map_transport_error(endpoint, err))
}

fn map_transport_error<E>(endpoint: &'static str, err: HttpClientError<E>) -> Error
where
	E: 'static + Send + Sync + StdError,
{
	match err {
		HttpClientError::Http(inner) => ConfigError::from(inner).into(),
		HttpClientError::Io(inner) => TransportError::Io(inner).into(),
		other => TransportError::network(endpoint, other).into(),
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[derive(Debug)]
	struct Refused;
	impl Display for Refused {
		fn fmt(&self, f: &mut Formatter) -> FmtResult {
			f.write_str("Connection refused.")
		}
	}
	impl StdError for Refused {}

	#[test]
	fn network_failures_map_to_transport_errors() {
		let err =
			map_transport_error("revocation", HttpClientError::Reqwest(Box::new(Refused)));

		assert!(matches!(
			err,
			Error::Transport(TransportError::Network { endpoint: "revocation", .. })
		));
		assert!(err.triggers_auth_style_fallback());
	}

	#[test]
	fn io_failures_keep_their_source() {
		let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "Timed out.");
		let err = map_transport_error::<Refused>("token", HttpClientError::Io(io));

		assert!(matches!(err, Error::Transport(TransportError::Io(_))));
	}
}
