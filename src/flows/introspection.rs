//! Token introspection (RFC 7662).

// std
use std::convert::Infallible;
// self
use crate::{
	_prelude::*,
	flows::{IntrospectionOption, OAuthClient, hints, require_endpoint},
	http::TokenHttpClient,
	obs::{self, FlowKind},
	response,
	token::Token,
};

/// `aud` claim: a single audience or a list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
	/// Single audience string.
	Single(String),
	/// Multiple audiences.
	Multiple(Vec<String>),
}
impl Audience {
	/// Returns `true` when `audience` is listed.
	pub fn contains(&self, audience: &str) -> bool {
		match self {
			Self::Single(value) => value == audience,
			Self::Multiple(values) => values.iter().any(|value| value == audience),
		}
	}
}

/// Introspection response payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Introspection {
	/// Whether the token is currently active.
	pub active: bool,
	/// Space-separated scopes.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub scope: Option<String>,
	/// Client the token was issued to.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub client_id: Option<String>,
	/// Resource owner who authorized the token.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub username: Option<String>,
	/// Token type, e.g. `Bearer`.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub token_type: Option<String>,
	/// Expiry as seconds since the Unix epoch.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub exp: Option<i64>,
	/// Issue time as seconds since the Unix epoch.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub iat: Option<i64>,
	/// Not-before time as seconds since the Unix epoch.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub nbf: Option<i64>,
	/// Subject.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub sub: Option<String>,
	/// Intended audience.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub aud: Option<Audience>,
	/// Issuer.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub iss: Option<String>,
	/// Token identifier.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub jti: Option<String>,
	/// Extension members.
	#[serde(flatten)]
	pub extra: BTreeMap<String, serde_json::Value>,
}
impl Introspection {
	/// Returns the `exp` claim as a timestamp.
	pub fn expires_at(&self) -> Option<OffsetDateTime> {
		self.exp.and_then(|secs| OffsetDateTime::from_unix_timestamp(secs).ok())
	}

	/// Iterates over the granted scopes.
	pub fn scopes(&self) -> impl Iterator<Item = &str> {
		self.scope.as_deref().unwrap_or_default().split_whitespace()
	}
}

/// Outcome of introspecting one token type hint.
#[derive(Debug)]
pub struct IntrospectionResult {
	/// Hint that was dispatched.
	pub hint: String,
	/// Payload, or the error that hint produced.
	pub outcome: Result<Introspection>,
}

impl<C> OAuthClient<C>
where
	C: ?Sized + TokenHttpClient,
{
	/// Introspects `token` once per requested hint (default `access_token`).
	///
	/// Every hint is attempted. When at least one fails the call returns
	/// [`Error::PartialIntrospection`] carrying exactly one result per hint, successes included.
	pub async fn introspect(
		&self,
		token: &Token,
		options: &[IntrospectionOption],
	) -> Result<Vec<IntrospectionResult>> {
		obs::observe(FlowKind::Introspection, "introspect", async move {
			let url = require_endpoint(&self.endpoint.introspection_url, "introspection")?;
			let mut results = Vec::new();
			let ControlFlow::Continue(()) = hints::dispatch(
				token,
				options,
				move |form| async move {
					let classify = response::introspection_response;

					self.post_negotiated(url, "introspection", &form, classify).await
				},
				|hint, outcome| {
					results.push(IntrospectionResult { hint, outcome });

					ControlFlow::<Infallible>::Continue(())
				},
			)
			.await;
			let failed = results.iter().filter(|result| result.outcome.is_err()).count();

			if failed > 0 {
				return Err(Error::PartialIntrospection { failed, results });
			}

			Ok(results)
		})
		.await
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn payload_accepts_string_or_array_audience() {
		let single: Introspection =
			serde_json::from_str(r#"{"active":true,"aud":"api","scope":"read write","exp":60}"#)
				.expect("Introspection fixture should deserialize.");
		let multiple: Introspection =
			serde_json::from_str(r#"{"active":false,"aud":["api","web"],"ext":1}"#)
				.expect("Introspection fixture should deserialize.");

		assert!(single.aud.as_ref().is_some_and(|aud| aud.contains("api")));
		assert_eq!(single.scopes().collect::<Vec<_>>(), ["read", "write"]);
		assert_eq!(single.expires_at(), Some(OffsetDateTime::UNIX_EPOCH + Duration::minutes(1)));
		assert!(multiple.aud.as_ref().is_some_and(|aud| aud.contains("web")));
		assert_eq!(multiple.extra.get("ext"), Some(&serde_json::json!(1)));
		assert_eq!(multiple.scopes().count(), 0);
	}

	#[test]
	fn active_is_required() {
		assert!(serde_json::from_str::<Introspection>(r#"{"scope":"read"}"#).is_err());
	}
}
