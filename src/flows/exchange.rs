//! Token endpoint grants: authorization code, refresh token, client credentials, and raw forms.

// self
use crate::{
	_prelude::*,
	flows::{AuthCodeOption, OAuthClient, require_endpoint},
	http::TokenHttpClient,
	obs::{self, FlowKind},
	request::Form,
	response,
	token::{Token, TokenSecret},
};

impl<C> OAuthClient<C>
where
	C: ?Sized + TokenHttpClient,
{
	/// Exchanges an authorization code for a token.
	///
	/// Pass the PKCE verifier option here when the authorization request carried a challenge.
	pub async fn exchange(&self, code: &str, options: &[AuthCodeOption]) -> Result<Token> {
		let mut form = Form::from([
			("grant_type".to_owned(), "authorization_code".to_owned()),
			("code".to_owned(), code.to_owned()),
		]);

		if let Some(redirect_url) = &self.redirect_url {
			form.insert("redirect_uri".into(), redirect_url.clone());
		}

		for option in options {
			option.apply(&mut form);
		}

		obs::observe(FlowKind::Token, "exchange", self.request_token(form)).await
	}

	/// Redeems a refresh token.
	///
	/// Providers that do not rotate refresh tokens omit one from the response; the supplied
	/// refresh token is carried over in that case.
	pub async fn refresh(&self, refresh_token: &str) -> Result<Token> {
		let form = Form::from([
			("grant_type".to_owned(), "refresh_token".to_owned()),
			("refresh_token".to_owned(), refresh_token.to_owned()),
		]);

		obs::observe(FlowKind::Token, "refresh", async move {
			let mut token = self.request_token(form).await?;

			if token.refresh_token.is_none() && !refresh_token.is_empty() {
				token.refresh_token = Some(TokenSecret::new(refresh_token));
			}

			Ok(token)
		})
		.await
	}

	/// Requests a token with the client credentials grant, sending the configured scopes.
	pub async fn client_credentials_token(&self, options: &[AuthCodeOption]) -> Result<Token> {
		let mut form = Form::from([("grant_type".to_owned(), "client_credentials".to_owned())]);

		if !self.scopes.is_empty() {
			form.insert("scope".into(), self.scopes.join(" "));
		}

		for option in options {
			option.apply(&mut form);
		}

		obs::observe(FlowKind::Token, "client_credentials", self.request_token(form)).await
	}

	/// Posts an arbitrary grant form to the token endpoint.
	pub async fn retrieve_token(&self, form: Form) -> Result<Token> {
		obs::observe(FlowKind::Token, "retrieve_token", self.request_token(form)).await
	}

	async fn request_token(&self, form: Form) -> Result<Token> {
		let url = require_endpoint(&self.endpoint.token_url, "token")?;

		self.post_negotiated(url, "token", &form, |response| {
			response::token_response(response, OffsetDateTime::now_utc())
		})
		.await
	}
}
