//! PKCE (RFC 7636) verifier and challenge generation.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, TryRngCore, rngs::OsRng};
use sha2::{Digest, Sha256};
// self
use crate::{_prelude::*, error::ConfigError, flows::AuthCodeOption};

/// RFC 3986 unreserved characters (`ALPHA / DIGIT / "-" / "." / "_" / "~"`).
const UNRESERVED: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-._~";
const VERIFIER_LEN: usize = 128;
// Largest multiple of the charset length that fits in a byte; bytes above it are rejected so
// every character stays equally likely.
const SAMPLE_ZONE: u8 = (u8::MAX as usize / UNRESERVED.len() * UNRESERVED.len()) as u8;

/// Challenge method label for SHA-256 challenges.
pub const METHOD_S256: &str = "S256";
/// Challenge method label for plain challenges.
pub const METHOD_PLAIN: &str = "plain";

/// PKCE verifier plus its challenge method.
///
/// The challenge is derived on demand from the verifier and the method flag; it is never cached.
/// Switching to the plain method is one-way.
#[derive(Clone, PartialEq, Eq)]
pub struct Pkce {
	verifier: Vec<u8>,
	plain: bool,
}
impl Pkce {
	/// Generates a 128-character verifier from the OS random source, using the S256 method.
	pub fn new() -> Result<Self> {
		let mut verifier = Vec::with_capacity(VERIFIER_LEN);
		let mut buf = [0_u8; VERIFIER_LEN];

		while verifier.len() < VERIFIER_LEN {
			OsRng
				.try_fill_bytes(&mut buf)
				.map_err(|e| ConfigError::Randomness { source: Box::new(e) })?;

			verifier.extend(
				buf.iter()
					.filter(|byte| **byte < SAMPLE_ZONE)
					.map(|byte| UNRESERVED[usize::from(*byte) % UNRESERVED.len()])
					.take(VERIFIER_LEN - verifier.len()),
			);
		}

		Ok(Self { verifier, plain: false })
	}

	/// Wraps an existing verifier.
	pub fn with_values(verifier: impl Into<Vec<u8>>, plain: bool) -> Self {
		Self { verifier: verifier.into(), plain }
	}

	/// Returns `"plain"` or `"S256"`.
	pub fn challenge_method(&self) -> &'static str {
		if self.plain { METHOD_PLAIN } else { METHOD_S256 }
	}

	/// Returns a copy of the verifier bytes.
	pub fn verifier(&self) -> Vec<u8> {
		self.verifier.clone()
	}

	/// Switches to the plain challenge method.
	pub fn use_plain(&mut self) {
		self.plain = true;
	}

	/// Derives the challenge for the current method.
	pub fn challenge(&self) -> String {
		if self.plain {
			String::from_utf8_lossy(&self.verifier).into_owned()
		} else {
			URL_SAFE_NO_PAD.encode(Sha256::digest(&self.verifier))
		}
	}

	/// Option carrying `code_challenge` and `code_challenge_method`, for the authorization URL or
	/// a pushed authorization request.
	pub fn challenge_option(&self) -> AuthCodeOption {
		AuthCodeOption::challenge(self.challenge_method(), self.challenge())
	}

	/// Option carrying `code_verifier`, for the code exchange.
	pub fn verifier_option(&self) -> AuthCodeOption {
		verifier_option(&String::from_utf8_lossy(&self.verifier))
	}
}
impl Debug for Pkce {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Pkce")
			.field("verifier", &"<redacted>")
			.field("method", &self.challenge_method())
			.finish()
	}
}

/// Generates a verifier from 32 random octets, base64url-encoded without padding (43 chars).
///
/// A fresh verifier should be generated for each authorization.
pub fn generate_verifier() -> String {
	let mut data = [0_u8; 32];

	rand::rng().fill(&mut data);

	URL_SAFE_NO_PAD.encode(data)
}

/// Returns `base64url(SHA-256(verifier))` without padding.
pub fn s256_challenge_from_verifier(verifier: &str) -> String {
	URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}

/// Option carrying `code_verifier`; pass it to the code exchange only.
pub fn verifier_option(verifier: &str) -> AuthCodeOption {
	AuthCodeOption::set_param("code_verifier", verifier)
}

/// Option carrying an S256 challenge derived from `verifier`; pass it to the authorization URL or
/// a pushed authorization request only.
pub fn s256_challenge_option(verifier: &str) -> AuthCodeOption {
	AuthCodeOption::challenge(METHOD_S256, s256_challenge_from_verifier(verifier))
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::request::Form;

	// RFC 7636 Appendix B.
	const RFC_VERIFIER: &str = "dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk";
	const RFC_CHALLENGE: &str = "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM";

	#[test]
	fn s256_challenge_is_pure() {
		assert_eq!(s256_challenge_from_verifier(RFC_VERIFIER), RFC_CHALLENGE);
		assert_eq!(
			s256_challenge_from_verifier(RFC_VERIFIER),
			s256_challenge_from_verifier(RFC_VERIFIER)
		);
	}

	#[test]
	fn plain_challenge_equals_verifier() {
		let mut pkce = Pkce::with_values(RFC_VERIFIER, false);

		assert_eq!(pkce.challenge_method(), "S256");
		assert_eq!(pkce.challenge(), RFC_CHALLENGE);

		pkce.use_plain();

		assert_eq!(pkce.challenge_method(), "plain");
		assert_eq!(pkce.challenge(), RFC_VERIFIER);
	}

	#[test]
	fn generated_verifier_uses_unreserved_charset() {
		let pkce = Pkce::new().expect("OS randomness should be available in tests.");
		let verifier = pkce.verifier();

		assert_eq!(verifier.len(), 128);
		assert!(verifier.iter().all(|byte| UNRESERVED.contains(byte)));
		assert_eq!(pkce.challenge_method(), "S256");
		assert_ne!(
			verifier,
			Pkce::new().expect("OS randomness should be available in tests.").verifier()
		);
	}

	#[test]
	fn verifier_accessor_returns_a_copy() {
		let pkce = Pkce::with_values(RFC_VERIFIER, false);
		let mut copy = pkce.verifier();

		copy.clear();

		assert_eq!(pkce.verifier(), RFC_VERIFIER.as_bytes());
	}

	#[test]
	fn generate_verifier_is_43_url_safe_chars() {
		let verifier = generate_verifier();

		assert_eq!(verifier.len(), 43);
		assert!(verifier.bytes().all(|byte| byte.is_ascii_alphanumeric() || b"-_".contains(&byte)));
	}

	#[test]
	fn options_set_the_pkce_parameters() {
		let mut form = Form::new();

		Pkce::with_values(RFC_VERIFIER, false).challenge_option().apply(&mut form);
		s256_challenge_option(RFC_VERIFIER).apply(&mut form);
		verifier_option(RFC_VERIFIER).apply(&mut form);

		assert_eq!(form.get("code_challenge").map(String::as_str), Some(RFC_CHALLENGE));
		assert_eq!(form.get("code_challenge_method").map(String::as_str), Some("S256"));
		assert_eq!(form.get("code_verifier").map(String::as_str), Some(RFC_VERIFIER));
		assert!(!format!("{:?}", Pkce::with_values(RFC_VERIFIER, false)).contains(RFC_VERIFIER));
	}
}
