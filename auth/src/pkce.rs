//! PKCE (Proof Key for Code Exchange, RFC 7636) with the S256 method.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Number of random bytes behind a code verifier.
const VERIFIER_BYTES: usize = 32;

/// Code verifier and the challenge derived from it.
///
/// Generate a fresh pair for every login attempt; never reuse one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PkcePair {
    /// Secret kept in the PKCE cookie and sent at code exchange.
    pub code_verifier: String,

    /// `base64url(SHA-256(code_verifier))`, sent to `/authorize`.
    pub code_challenge: String,
}

impl PkcePair {
    /// Generate a new pair from 256 bits of OS-seeded randomness.
    ///
    /// The verifier is 43 characters, the minimum length RFC 7636 allows.
    #[must_use]
    pub fn generate() -> Self {
        let mut random_bytes = [0u8; VERIFIER_BYTES];
        rand::thread_rng().fill_bytes(&mut random_bytes);

        let code_verifier = URL_SAFE_NO_PAD.encode(random_bytes);
        let code_challenge = code_challenge(&code_verifier);

        Self {
            code_verifier,
            code_challenge,
        }
    }
}

/// Compute the S256 challenge for `verifier`.
///
/// # Examples
///
/// ```
/// use empresor_auth::pkce::code_challenge;
///
/// // Appendix B of RFC 7636
/// assert_eq!(
///     code_challenge("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk"),
///     "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM",
/// );
/// ```
#[must_use]
pub fn code_challenge(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}

/// Generate an anti-CSRF `state` value for one login attempt.
#[must_use]
pub fn generate_state() -> String {
    uuid::Uuid::new_v4().to_string()
}
