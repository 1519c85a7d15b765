//! Pushes an authorization request with a PKCE challenge to a mock PAR endpoint, then exchanges
//! the returned code with the matching verifier.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use oauth2_engine::{
	flows::{AuthCodeOption, Endpoint, ReqwestOAuthClient},
	pkce::Pkce,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let par_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/par");
			then.status(201).header("content-type", "application/json").body(
				r#"{"request_uri":"urn:ietf:params:oauth:request_uri:demo","expires_in":90}"#,
			);
		})
		.await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200).header("content-type", "application/json").body(
				r#"{"access_token":"demo-access","token_type":"bearer","expires_in":900}"#,
			);
		})
		.await;
	let endpoint = Endpoint::new(server.url("/authorize"), server.url("/token"))
		.with_pushed_auth_url(server.url("/par"));
	let client = ReqwestOAuthClient::new("demo-client", endpoint)
		.with_client_secret("demo-secret")
		.with_redirect_url("https://app.example.com/oauth/callback")
		.with_scopes(["openid", "profile"]);
	let pkce = Pkce::new()?;
	let options = [pkce.challenge_option(), AuthCodeOption::access_type_offline()];
	let (auth_url, par) = client.pushed_auth("demo-state", &options).await?;

	if let Some(auth_url) = auth_url {
		println!("Send your user to {auth_url}.");
	}

	println!("Request URI {} expires in {}s.", par.request_uri, par.expires_in);

	let token = client.exchange("demo-code", &[pkce.verifier_option()]).await?;

	println!("Exchanged code for a {} token.", token.token_type);
	println!("Auth style cache now holds {} endpoint(s).", client.auth_style_cache().len());

	par_mock.assert_calls_async(1).await;
	token_mock.assert_calls_async(1).await;

	Ok(())
}
