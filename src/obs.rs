//! Optional observability helpers for engine flows.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `oauth2_engine.flow` with the `flow` and
//!   `stage` (call site) fields, plus debug events when an auth-style probe falls back.
//! - Enable `metrics` to increment the `oauth2_engine_flow_total` counter for every
//!   attempt/success/failure, labeled by `flow` + `outcome`, and the
//!   `oauth2_engine_auth_style_fallback_total` counter for every fallback probe.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// OAuth operations observed by the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// Token endpoint exchanges (authorization code, refresh, custom grants).
	Token,
	/// Token introspection (RFC 7662).
	Introspection,
	/// Token revocation (RFC 7009).
	Revocation,
	/// Pushed authorization requests (RFC 9126).
	PushedAuthorization,
}
impl FlowKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::Token => "token",
			FlowKind::Introspection => "introspection",
			FlowKind::Revocation => "revocation",
			FlowKind::PushedAuthorization => "pushed_authorization",
		}
	}
}
impl Display for FlowKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to an engine operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Failure => "failure",
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Wraps an operation with a [`FlowSpan`] and attempt/success/failure outcome recording.
pub(crate) async fn observe<T, Fut>(kind: FlowKind, stage: &'static str, fut: Fut) -> Result<T>
where
	Fut: Future<Output = Result<T>>,
{
	let span = FlowSpan::new(kind, stage);

	record_flow_outcome(kind, FlowOutcome::Attempt);

	let result = span.instrument(fut).await;

	match &result {
		Ok(_) => record_flow_outcome(kind, FlowOutcome::Success),
		Err(_) => record_flow_outcome(kind, FlowOutcome::Failure),
	}

	result
}
