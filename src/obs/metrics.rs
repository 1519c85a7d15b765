// self
use crate::{
	_prelude::*,
	obs::{FlowKind, FlowOutcome, trace_auth_style_fallback},
};

/// Records a flow outcome via the global metrics recorder (when enabled).
pub fn record_flow_outcome(kind: FlowKind, outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"oauth2_engine_flow_total",
			"flow" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Records that a probing request fell back from header to body credentials.
pub(crate) fn record_auth_style_fallback(url: &str, err: &Error) {
	trace_auth_style_fallback(url, err);

	#[cfg(feature = "metrics")]
	{
		metrics::counter!("oauth2_engine_auth_style_fallback_total").increment(1);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn record_flow_outcome_noop_without_metrics() {
		record_flow_outcome(FlowKind::PushedAuthorization, FlowOutcome::Failure);
	}
}
