#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
// self
use oauth2_engine::{
	_preludet::*,
	auth_style::AuthStyle,
	error::{ConfigError, OAuthErrorKind, ResponseError},
	flows::{Endpoint, ReqwestOAuthClient},
	pkce::Pkce,
};

const REQUEST_URI: &str = "urn:ietf:params:oauth:request_uri:6esc_11ACC5bwc014ltc14eY22c";
const BASIC: &str = "Basic Q0xJRU5UX0lEOkNMSUVOVF9TRUNSRVQ=";
const FORM_ERROR: &str = "error=invalid_request&error_description=Invalid+request";

fn build_client(server: &MockServer) -> ReqwestOAuthClient {
	build_reqwest_test_client(
		Endpoint::new(server.url("/auth"), server.url("/token"))
			.with_pushed_auth_url(server.url("/par")),
	)
}

#[tokio::test]
async fn pushed_auth_posts_auth_code_values_and_returns_request_uri_url() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/par")
				.header("authorization", BASIC)
				.header("content-type", "application/x-www-form-urlencoded")
				.body(
					"client_id=CLIENT_ID&redirect_uri=REDIRECT_URL&response_type=code\
					 &scope=scope1+scope2&state=state",
				);
			then.status(201)
				.header("content-type", "application/json")
				.body(format!(r#"{{"request_uri":"{REQUEST_URI}","expires_in":60}}"#));
		})
		.await;
	let client = build_client(&server);
	let (auth_url, par) =
		client.pushed_auth("state", &[]).await.expect("Pushed authorization should succeed.");
	let auth_url = auth_url.expect("An authorization URL should be returned.");

	mock.assert_calls_async(1).await;

	assert_eq!(par.request_uri, REQUEST_URI);
	assert_eq!(par.expires_in, 60);
	assert_eq!(auth_url.path(), "/auth");
	assert_eq!(
		auth_url.query_pairs().into_owned().collect::<Vec<_>>(),
		[
			("client_id".to_owned(), TEST_CLIENT_ID.to_owned()),
			("request_uri".to_owned(), REQUEST_URI.to_owned()),
		]
	);
	assert_eq!(client.auth_style_cache().lookup(&server.url("/par")), Some(AuthStyle::InHeader));
}

#[tokio::test]
async fn pushed_auth_query_is_exactly_client_id_and_request_uri() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(POST).path("/par");
			then.status(201)
				.header("content-type", "application/json")
				.body(r#"{"request_uri":"urn:x","expires_in":60}"#);
		})
		.await;

	let client = build_reqwest_test_client(
		Endpoint::new(format!("{}?prompt=login", server.url("/auth")), server.url("/token"))
			.with_pushed_auth_url(server.url("/par")),
	);
	let pkce = Pkce::new().expect("OS randomness should be available in tests.");
	let (auth_url, _) = client
		.pushed_auth("state", &[pkce.challenge_option()])
		.await
		.expect("Pushed authorization should succeed.");

	assert_eq!(
		auth_url.expect("An authorization URL should be returned.").query(),
		Some("client_id=CLIENT_ID&request_uri=urn%3Ax")
	);
}

#[tokio::test]
async fn non_created_success_status_is_rejected() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(POST).path("/par");
			then.status(202)
				.header("content-type", "application/json")
				.body(r#"{"request_uri":"urn:x","expires_in":60}"#);
		})
		.await;

	let client = build_client(&server);
	let err = client.pushed_auth("state", &[]).await.expect_err("HTTP 202 should be rejected.");

	assert!(matches!(err, Error::Response(ResponseError::UnexpectedSuccessStatus { status: 202 })));
	assert!(client.auth_style_cache().is_empty());
}

#[tokio::test]
async fn json_and_text_error_bodies_expose_the_error_code() {
	let cases = [
		("application/json", r#"{"error":"invalid_request","error_description":"Invalid request"}"#),
		("application/x-www-form-urlencoded", FORM_ERROR),
		("text/plain", FORM_ERROR),
	];

	for (content_type, body) in cases {
		let server = MockServer::start_async().await;

		server
			.mock_async(|when, then| {
				when.method(POST).path("/par");
				then.status(400).header("content-type", content_type).body(body);
			})
			.await;

		let err = build_client(&server)
			.pushed_auth("state", &[])
			.await
			.expect_err("HTTP 400 should fail.");
		let oauth = err.as_oauth().expect("HTTP 400 should surface an OAuth error.");

		assert_eq!(oauth.kind, OAuthErrorKind::Retrieve, "{content_type}");
		assert_eq!(oauth.error_code, "invalid_request", "{content_type}");
		assert_eq!(oauth.error_description, "Invalid request", "{content_type}");
	}
}

#[tokio::test]
async fn unknown_error_content_type_is_unrecognized() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(POST).path("/par");
			then.status(500).header("content-type", "text/html").body("<h1>down</h1>");
		})
		.await;

	let err =
		build_client(&server).pushed_auth("state", &[]).await.expect_err("HTTP 500 should fail.");

	assert!(matches!(
		err,
		Error::Response(ResponseError::UnrecognizedContentType { status: 500, .. })
	));
}

#[tokio::test]
async fn missing_par_endpoint_fails_without_a_request() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.any_request();
			then.status(500);
		})
		.await;
	let client =
		build_reqwest_test_client(Endpoint::new(server.url("/auth"), server.url("/token")));
	let err = client.pushed_auth("state", &[]).await.expect_err("Missing PAR URL should fail.");

	assert!(matches!(
		err,
		Error::Config(ConfigError::MissingEndpoint { endpoint: "pushed authorization" })
	));

	mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn fallback_style_is_cached_per_par_url_and_reused() {
	let server = MockServer::start_async().await;
	let header = server
		.mock_async(|when, then| {
			when.method(POST).path("/par").header("authorization", BASIC);
			then.status(401)
				.header("content-type", "application/json")
				.body(r#"{"error":"invalid_client"}"#);
		})
		.await;
	let params = server
		.mock_async(|when, then| {
			when.method(POST).path("/par").body(
				"client_id=CLIENT_ID&client_secret=CLIENT_SECRET&redirect_uri=REDIRECT_URL\
				 &response_type=code&scope=scope1+scope2&state=state",
			);
			then.status(201)
				.header("content-type", "application/json")
				.body(r#"{"request_uri":"urn:x","expires_in":60}"#);
		})
		.await;
	let client = build_client(&server);

	client.pushed_auth("state", &[]).await.expect("Fallback pushed authorization should succeed.");

	header.assert_calls_async(1).await;
	params.assert_calls_async(1).await;

	assert_eq!(client.auth_style_cache().len(), 1);
	assert_eq!(client.auth_style_cache().lookup(&server.url("/par")), Some(AuthStyle::InParams));
	assert_eq!(client.auth_style_cache().lookup(&server.url("/token")), None);

	client.pushed_auth("state", &[]).await.expect("Cached pushed authorization should succeed.");

	header.assert_calls_async(1).await;
	params.assert_calls_async(2).await;
}
