//! Authorization-code request parameters and the authorization URL builder.

// self
use crate::{
	_prelude::*,
	flows::{OAuthClient, parse_endpoint, require_endpoint},
	http::TokenHttpClient,
	request::Form,
};

/// Extra parameter applied to authorization URLs, pushed authorization requests, and code
/// exchanges.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthCodeOption {
	/// Sets `key` to `value`, replacing any earlier value.
	SetParam {
		/// Parameter name.
		key: String,
		/// Parameter value.
		value: String,
	},
	/// Sets `code_challenge_method` and `code_challenge`.
	Challenge {
		/// `S256` or `plain`.
		method: &'static str,
		/// Derived challenge.
		challenge: String,
	},
}
impl AuthCodeOption {
	/// Builds an option that sets an arbitrary parameter.
	pub fn set_param(key: impl Into<String>, value: impl Into<String>) -> Self {
		Self::SetParam { key: key.into(), value: value.into() }
	}

	/// Requests a refresh token from providers that only issue one for offline access
	/// (`access_type=offline`).
	pub fn access_type_offline() -> Self {
		Self::set_param("access_type", "offline")
	}

	/// Forces the consent prompt even when the user already granted access (`prompt=consent`).
	pub fn approval_force() -> Self {
		Self::set_param("prompt", "consent")
	}

	pub(crate) fn challenge(method: &'static str, challenge: String) -> Self {
		Self::Challenge { method, challenge }
	}

	pub(crate) fn apply(&self, form: &mut Form) {
		match self {
			Self::SetParam { key, value } => {
				form.insert(key.clone(), value.clone());
			},
			Self::Challenge { method, challenge } => {
				form.insert("code_challenge_method".into(), (*method).into());
				form.insert("code_challenge".into(), challenge.clone());
			},
		}
	}
}

impl<C> OAuthClient<C>
where
	C: ?Sized + TokenHttpClient,
{
	/// Builds the URL that sends the resource owner to the provider's consent page.
	///
	/// `state` protects against CSRF and should be validated on the redirect. Query parameters
	/// already present on the configured authorization URL are kept.
	pub fn auth_code_url(&self, state: &str, options: &[AuthCodeOption]) -> Result<Url> {
		let mut url = parse_endpoint(require_endpoint(&self.endpoint.auth_url, "authorization")?)?;
		let form = self.auth_code_values(state, options);

		url.query_pairs_mut().extend_pairs(form.iter());

		Ok(url)
	}

	pub(crate) fn auth_code_values(&self, state: &str, options: &[AuthCodeOption]) -> Form {
		let mut form = Form::from([
			("response_type".to_owned(), "code".to_owned()),
			("client_id".to_owned(), self.client_id.clone()),
		]);

		if let Some(redirect_url) = &self.redirect_url {
			form.insert("redirect_uri".into(), redirect_url.clone());
		}
		if !self.scopes.is_empty() {
			form.insert("scope".into(), self.scopes.join(" "));
		}
		if !state.is_empty() {
			form.insert("state".into(), state.into());
		}

		for option in options {
			option.apply(&mut form);
		}

		form
	}
}
