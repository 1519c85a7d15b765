//! Introspects both halves of a token pair, then revokes them, against mock endpoints that only
//! accept body credentials so the auth style probe falls back once per endpoint and is cached.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use oauth2_engine::{
	error::Error,
	flows::{self, Endpoint, ReqwestOAuthClient},
	token::Token,
};

const DEMO_BASIC: &str = "Basic ZGVtby1jbGllbnQ6ZGVtby1zZWNyZXQ=";

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let rejected = server
		.mock_async(|when, then| {
			when.method(POST).header("authorization", DEMO_BASIC);
			then.status(401)
				.header("content-type", "application/json")
				.body(r#"{"error":"invalid_client"}"#);
		})
		.await;

	for (path, token, hint) in [
		("/introspect", "demo-access", "access_token"),
		("/introspect", "demo-refresh", "refresh_token"),
		("/revoke", "demo-access", "access_token"),
		("/revoke", "demo-refresh", "refresh_token"),
	] {
		let body = format!(
			"client_id=demo-client&client_secret=demo-secret&token={token}&token_type_hint={hint}"
		);

		server
			.mock_async(|when, then| {
				when.method(POST).path(path).body(&body);
				then.status(200)
					.header("content-type", "application/json")
					.body(r#"{"active":true,"scope":"openid profile","sub":"user-123"}"#);
			})
			.await;
	}

	let endpoint = Endpoint::new(server.url("/authorize"), server.url("/token"))
		.with_introspection_url(server.url("/introspect"))
		.with_revocation_url(server.url("/revoke"));
	let client = ReqwestOAuthClient::new("demo-client", endpoint).with_client_secret("demo-secret");
	let token = Token::new("demo-access").with_refresh_token("demo-refresh");
	let both = ["access_token", "refresh_token"];
	let options = [flows::add_introspection_token_types(both)];
	let results = match client.introspect(&token, &options).await {
		Ok(results) => results,
		Err(Error::PartialIntrospection { results, .. }) => results,
		Err(e) => return Err(e.into()),
	};

	for result in &results {
		match &result.outcome {
			Ok(payload) =>
				println!("{}: active={} sub={:?}.", result.hint, payload.active, payload.sub),
			Err(e) => println!("{}: {e}", result.hint),
		}
	}

	client.revoke(&token, &[flows::add_revocation_token_types(both)]).await?;

	println!("Revoked both tokens.");
	println!("Auth style cache now holds {} endpoint(s).", client.auth_style_cache().len());

	rejected.assert_calls_async(2).await;

	Ok(())
}
