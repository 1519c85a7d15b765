//! Token model consumed by introspection and revocation, and produced by token exchanges.

// self
use crate::{_prelude::*, error::ConfigError};

/// Redacted token secret wrapper keeping sensitive material out of logs.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Returns `true` when the secret is the empty string.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
impl AsRef<str> for TokenSecret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// OAuth 2.0 token pair as issued by a token endpoint.
///
/// Introspection and revocation only read the access and refresh token fields.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Token {
	/// Access token; may be empty for tokens that only carry a refresh token.
	pub access_token: TokenSecret,
	/// Token type, typically `Bearer`.
	pub token_type: String,
	/// Refresh token, when the provider issued one.
	pub refresh_token: Option<TokenSecret>,
	/// Absolute expiry derived from `expires_in` at receipt.
	pub expires_at: Option<OffsetDateTime>,
	/// Remaining response members not modeled above.
	pub extra: BTreeMap<String, serde_json::Value>,
}
impl Token {
	/// Creates a token holding only an access token.
	pub fn new(access_token: impl Into<String>) -> Self {
		Self {
			access_token: TokenSecret::new(access_token),
			token_type: "Bearer".into(),
			..Default::default()
		}
	}

	/// Attaches a refresh token.
	pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
		self.refresh_token = Some(TokenSecret::new(refresh_token));

		self
	}

	/// Returns the refresh token value, or `""` when absent.
	pub fn refresh_token_str(&self) -> &str {
		self.refresh_token.as_ref().map(TokenSecret::expose).unwrap_or_default()
	}

	/// Returns `true` when the token has an expiry at or before `instant`.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		self.expires_at.is_some_and(|expires_at| expires_at <= instant)
	}

	/// Returns the secret a token type hint refers to, validating that it is present.
	pub fn material_for(&self, hint: TokenTypeHint) -> Result<&str, ConfigError> {
		let value = match hint {
			TokenTypeHint::AccessToken => self.access_token.expose(),
			TokenTypeHint::RefreshToken => self.refresh_token_str(),
		};

		if value.is_empty() {
			return Err(ConfigError::MissingTokenMaterial { hint: hint.as_str() });
		}

		Ok(value)
	}
}

/// Token type hints understood by introspection and revocation (RFC 7009 §2.1).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenTypeHint {
	/// `access_token`
	AccessToken,
	/// `refresh_token`
	RefreshToken,
}
impl TokenTypeHint {
	/// Returns the wire value.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::AccessToken => "access_token",
			Self::RefreshToken => "refresh_token",
		}
	}
}
impl FromStr for TokenTypeHint {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"access_token" => Ok(Self::AccessToken),
			"refresh_token" => Ok(Self::RefreshToken),
			other => Err(ConfigError::UnknownTokenTypeHint { hint: other.into() }),
		}
	}
}
impl Display for TokenTypeHint {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Wire shape of a successful token endpoint response.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
	#[serde(default)]
	pub(crate) access_token: String,
	#[serde(default)]
	pub(crate) token_type: String,
	#[serde(default)]
	pub(crate) refresh_token: Option<String>,
	#[serde(default, deserialize_with = "expires_in_lenient")]
	pub(crate) expires_in: Option<i64>,
	#[serde(flatten)]
	pub(crate) extra: BTreeMap<String, serde_json::Value>,
}
impl TokenResponse {
	/// Builds a response from form-encoded pairs (used by providers that answer with
	/// `application/x-www-form-urlencoded` or `text/plain`).
	pub(crate) fn from_form(body: &[u8]) -> Self {
		let mut response = Self {
			access_token: String::new(),
			token_type: String::new(),
			refresh_token: None,
			expires_in: None,
			extra: BTreeMap::new(),
		};

		for (key, value) in url::form_urlencoded::parse(body) {
			match key.as_ref() {
				"access_token" => response.access_token = value.into_owned(),
				"token_type" => response.token_type = value.into_owned(),
				"refresh_token" => response.refresh_token = Some(value.into_owned()),
				"expires_in" => response.expires_in = value.parse().ok(),
				_ => {
					response
						.extra
						.entry(key.into_owned())
						.or_insert_with(|| serde_json::Value::String(value.into_owned()));
				},
			}
		}

		response
	}

	/// Converts the wire response into a [`Token`], stamping expiry relative to `now`.
	pub(crate) fn into_token(self, now: OffsetDateTime) -> Token {
		Token {
			access_token: TokenSecret::new(self.access_token),
			token_type: self.token_type,
			refresh_token: self
				.refresh_token
				.filter(|value| !value.is_empty())
				.map(TokenSecret::new),
			expires_at: self
				.expires_in
				.filter(|secs| *secs > 0)
				.map(|secs| now.saturating_add(Duration::seconds(secs))),
			extra: self.extra,
		}
	}
}

// Some providers encode `expires_in` as a JSON string.
fn expires_in_lenient<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
	D: serde::Deserializer<'de>,
{
	#[derive(Deserialize)]
	#[serde(untagged)]
	enum Raw {
		Number(i64),
		Text(String),
		Null,
	}

	Ok(match Raw::deserialize(deserializer)? {
		Raw::Number(secs) => Some(secs),
		Raw::Text(text) => text.trim().parse().ok(),
		Raw::Null => None,
	})
}
