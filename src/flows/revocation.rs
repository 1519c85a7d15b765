//! Token revocation (RFC 7009).

// self
use crate::{
	_prelude::*,
	flows::{OAuthClient, RevocationOption, hints, require_endpoint},
	http::TokenHttpClient,
	obs::{self, FlowKind},
	response,
	token::Token,
};

impl<C> OAuthClient<C>
where
	C: ?Sized + TokenHttpClient,
{
	/// Revokes `token` once per requested hint (default `access_token`).
	///
	/// Hints are revoked in order and the first failure is returned immediately; later hints are
	/// not attempted.
	pub async fn revoke(&self, token: &Token, options: &[RevocationOption]) -> Result<()> {
		obs::observe(FlowKind::Revocation, "revoke", async move {
			let url = require_endpoint(&self.endpoint.revocation_url, "revocation")?;
			let flow = hints::dispatch(
				token,
				options,
				move |form| async move {
					let classify = response::revocation_response;

					self.post_negotiated(url, "revocation", &form, classify).await
				},
				|_, outcome| match outcome {
					Ok(()) => ControlFlow::Continue(()),
					Err(e) => ControlFlow::Break(e),
				},
			)
			.await;

			match flow {
				ControlFlow::Continue(()) => Ok(()),
				ControlFlow::Break(e) => Err(e),
			}
		})
		.await
	}
}
