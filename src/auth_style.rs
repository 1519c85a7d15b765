//! Client credential placement ("auth style") negotiation and its process-wide cache.
//!
//! Providers disagree on whether confidential clients authenticate with HTTP Basic or with
//! `client_id`/`client_secret` body parameters. When the caller does not declare a style the
//! engine probes: the first request to an endpoint goes out with [`AuthStyle::InHeader`], and a
//! failure is retried once with [`AuthStyle::InParams`]. Whichever style succeeds is remembered
//! under the exact endpoint URL string, so later calls skip the probe.

// self
use crate::{_prelude::*, obs};

/// Placement of client credentials on token-bearing requests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthStyle {
	/// Not yet determined; resolved by the cache or by probing.
	#[default]
	Unknown,
	/// HTTP Basic `Authorization` header.
	InHeader,
	/// `client_id` and `client_secret` form body parameters.
	InParams,
}

/// Endpoint URL → successful [`AuthStyle`] map shared by every clone of a client.
///
/// Keys are the raw URL strings; two spellings of the same endpoint are cached separately.
/// Entries are never evicted. Concurrent first-use probes of the same URL are allowed to race;
/// each writes the same value.
#[derive(Clone, Debug, Default)]
pub struct AuthStyleCache(Arc<RwLock<HashMap<String, AuthStyle>>>);
impl AuthStyleCache {
	/// Returns the cached style for `url`, if a probe previously succeeded.
	pub fn lookup(&self, url: &str) -> Option<AuthStyle> {
		self.0.read().get(url).copied()
	}

	/// Records the style that succeeded for `url`.
	pub fn set(&self, url: impl Into<String>, style: AuthStyle) {
		self.0.write().insert(url.into(), style);
	}

	/// Number of cached endpoints.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Returns `true` when nothing has been cached yet.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}
}

/// Style to use for the first attempt and whether the fallback probe is armed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Negotiation {
	/// Style for the first attempt.
	pub style: AuthStyle,
	/// `true` when neither the caller nor the cache determined the style.
	pub probing: bool,
}
impl Negotiation {
	/// Resolves the first-attempt style for `url`.
	pub fn resolve(declared: AuthStyle, url: &str, cache: &AuthStyleCache) -> Self {
		if declared != AuthStyle::Unknown {
			return Self { style: declared, probing: false };
		}

		match cache.lookup(url) {
			Some(style) => Self { style, probing: false },
			None => Self { style: AuthStyle::InHeader, probing: true },
		}
	}
}

/// Runs `attempt` under the negotiated style, falling back to [`AuthStyle::InParams`] once while
/// probing and caching the style that succeeded.
///
/// The cache is only written after a completed, successful attempt; dropping the returned future
/// mid-request leaves it untouched.
pub(crate) async fn negotiate<T, F, Fut>(
	url: &str,
	declared: AuthStyle,
	cache: &AuthStyleCache,
	mut attempt: F,
) -> Result<T>
where
	F: FnMut(AuthStyle) -> Fut,
	Fut: Future<Output = Result<T>>,
{
	let Negotiation { mut style, probing } = Negotiation::resolve(declared, url, cache);
	let mut result = attempt(style).await;

	if !probing {
		return result;
	}
	if let Err(err) = &result
		&& err.triggers_auth_style_fallback()
	{
		obs::record_auth_style_fallback(url, err);

		style = AuthStyle::InParams;
		result = attempt(style).await;
	}
	if result.is_ok() {
		cache.set(url, style);
	}

	result
}
