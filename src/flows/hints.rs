//! Token type hint options and the per-hint dispatcher shared by introspection and revocation.
//!
//! Both flows send one request per token type hint. The dispatcher builds each request body,
//! validates that the token carries the material the hint names, and hands the outcome to a
//! flow-specific step that decides whether to keep going.

// self
use crate::{
	_prelude::*,
	error::ConfigError,
	request::Form,
	token::{Token, TokenTypeHint},
};

/// Option accepted by introspection and revocation requests.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenRequestOption {
	/// Sets a body parameter on every per-hint request.
	SetParam {
		/// Parameter name.
		key: String,
		/// Parameter value.
		value: String,
	},
	/// Appends token type hints to dispatch, skipping ones already queued.
	TokenTypeHints(Vec<String>),
}
impl TokenRequestOption {
	fn set_value(&self, form: &mut Form) {
		if let Self::SetParam { key, value } = self {
			form.insert(key.clone(), value.clone());
		}
	}

	fn append_token_type_hints(&self, hints: &mut Vec<String>) {
		let Self::TokenTypeHints(values) = self else { return };

		for value in values {
			if !hints.contains(value) {
				hints.push(value.clone());
			}
		}
	}
}

/// Option passed to revocation requests.
pub type RevocationOption = TokenRequestOption;
/// Option passed to introspection requests.
pub type IntrospectionOption = TokenRequestOption;

/// Passes an extra key/value parameter to the revocation endpoint.
pub fn set_revocation_url_param(
	key: impl Into<String>,
	value: impl Into<String>,
) -> RevocationOption {
	TokenRequestOption::SetParam { key: key.into(), value: value.into() }
}

/// Adds token type hints to revoke, e.g. `["access_token", "refresh_token"]` for providers
/// that require the refresh token to be revoked separately.
pub fn add_revocation_token_types<I, S>(values: I) -> RevocationOption
where
	I: IntoIterator<Item = S>,
	S: Into<String>,
{
	TokenRequestOption::TokenTypeHints(values.into_iter().map(Into::into).collect())
}

/// Passes an extra key/value parameter to the introspection endpoint.
pub fn set_introspection_param(
	key: impl Into<String>,
	value: impl Into<String>,
) -> IntrospectionOption {
	set_revocation_url_param(key, value)
}

/// Adds token type hints to introspect.
pub fn add_introspection_token_types<I, S>(values: I) -> IntrospectionOption
where
	I: IntoIterator<Item = S>,
	S: Into<String>,
{
	add_revocation_token_types(values)
}

/// Collects the de-duplicated hints requested by `options`, defaulting to `access_token`.
pub fn token_type_hints(options: &[TokenRequestOption]) -> Vec<String> {
	let mut hints = Vec::new();

	for option in options {
		option.append_token_type_hints(&mut hints);
	}

	if hints.is_empty() {
		hints.push(TokenTypeHint::AccessToken.as_str().into());
	}

	hints
}

/// Builds the request body for one hint.
pub(crate) fn hint_form(
	token: &Token,
	hint: &str,
	options: &[TokenRequestOption],
) -> Result<Form, ConfigError> {
	let hint = hint.parse::<TokenTypeHint>()?;
	let mut form = Form::from([
		("token_type_hint".to_owned(), hint.as_str().to_owned()),
		("token".to_owned(), token.material_for(hint)?.to_owned()),
	]);

	for option in options {
		option.set_value(&mut form);
	}

	Ok(form)
}

/// Sends one request per hint, in order, feeding each outcome to `step`.
///
/// Hints whose body cannot be built never reach `send`; their [`ConfigError`] is handed to
/// `step` like any other outcome. Dispatch stops as soon as `step` breaks.
pub(crate) async fn dispatch<R, B, F, Fut, S>(
	token: &Token,
	options: &[TokenRequestOption],
	mut send: F,
	mut step: S,
) -> ControlFlow<B>
where
	F: FnMut(Form) -> Fut,
	Fut: Future<Output = Result<R>>,
	S: FnMut(String, Result<R>) -> ControlFlow<B>,
{
	for hint in token_type_hints(options) {
		let outcome = match hint_form(token, &hint, options) {
			Ok(form) => send(form).await,
			Err(e) => Err(e.into()),
		};

		step(hint, outcome)?;
	}

	ControlFlow::Continue(())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn hints_are_deduplicated_in_insertion_order() {
		let options = [
			add_revocation_token_types(["foo", "bar", "foo"]),
			set_revocation_url_param("client_hint", "x"),
			add_revocation_token_types(["bar", "baz"]),
		];

		assert_eq!(token_type_hints(&options[..1]), ["foo", "bar"]);
		assert_eq!(token_type_hints(&options), ["foo", "bar", "baz"]);
	}

	#[test]
	fn no_hint_options_default_to_access_token() {
		assert_eq!(token_type_hints(&[]), ["access_token"]);
		assert_eq!(token_type_hints(&[set_introspection_param("a", "b")]), ["access_token"]);
	}

	#[test]
	fn refresh_hint_submits_the_refresh_token() {
		let token = Token::new("access").with_refresh_token("refresh");
		let form = hint_form(&token, "refresh_token", &[set_introspection_param("aud", "api")])
			.expect("Refresh hint should build.");

		assert_eq!(form.get("token").map(String::as_str), Some("refresh"));
		assert_eq!(form.get("token_type_hint").map(String::as_str), Some("refresh_token"));
		assert_eq!(form.get("aud").map(String::as_str), Some("api"));
	}

	#[test]
	fn refresh_hint_requires_a_refresh_token() {
		let err = hint_form(&Token::new("access"), "refresh_token", &[])
			.expect_err("Access-only tokens cannot use the refresh hint.");

		assert!(matches!(err, ConfigError::MissingTokenMaterial { hint: "refresh_token" }));
	}

	#[tokio::test]
	async fn unknown_hints_never_reach_the_transport() {
		let token = Token::new("access");
		let mut sent = Vec::new();
		let mut seen = Vec::new();
		let flow = dispatch(
			&token,
			&[add_revocation_token_types(["id_token", "access_token"])],
			|form: Form| {
				sent.push(form);

				async { Ok(()) }
			},
			|hint, outcome: Result<()>| {
				seen.push((hint, outcome.is_ok()));

				ControlFlow::<()>::Continue(())
			},
		)
		.await;

		assert!(flow.is_continue());
		assert_eq!(sent.len(), 1);
		assert_eq!(seen, [("id_token".to_owned(), false), ("access_token".to_owned(), true)]);
	}

	#[tokio::test]
	async fn breaking_step_stops_dispatch() {
		let token = Token::new("access").with_refresh_token("refresh");
		let mut calls = 0;
		let flow = dispatch(
			&token,
			&[add_revocation_token_types(["access_token", "refresh_token"])],
			|_| {
				calls += 1;

				async { Err::<(), _>(Error::from(ConfigError::MissingEndpoint { endpoint: "x" })) }
			},
			|hint, outcome| match outcome {
				Ok(()) => ControlFlow::Continue(()),
				Err(_) => ControlFlow::Break(hint),
			},
		)
		.await;

		assert_eq!(flow, ControlFlow::Break("access_token".to_owned()));
		assert_eq!(calls, 1);
	}
}
