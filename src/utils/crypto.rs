use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use constant_time_eq::constant_time_eq;
use rand::{distributions::Uniform, Rng, RngCore};
use sha2::{Digest, Sha256};

const SALT_BYTES: usize = 16;
const SESSION_TOKEN_BYTES: usize = 32;
const RESET_CODE_DIGITS: usize = 6;

/// Salted SHA-256 password hash. Returns `(hash, salt)`, both base64.
pub fn hash_password(password: &str) -> (String, String) {
    let mut salt = [0u8; SALT_BYTES];
    rand::thread_rng().fill_bytes(&mut salt);
    let salt_b64 = URL_SAFE_NO_PAD.encode(salt);
    (hash_with_salt(password, &salt_b64), salt_b64)
}

pub fn verify_password(password: &str, salt: &str, expected_hash: &str) -> bool {
    let candidate = hash_with_salt(password, salt);
    constant_time_eq(candidate.as_bytes(), expected_hash.as_bytes())
}

fn hash_with_salt(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    URL_SAFE_NO_PAD.encode(hasher.finalize())
}

/// Opaque bearer token for the session store.
pub fn generate_session_token() -> String {
    let mut bytes = [0u8; SESSION_TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Numeric password-reset code, zero-padded to six digits.
pub fn generate_reset_code() -> String {
    let digit = Uniform::from(0..=9u8);
    rand::thread_rng()
        .sample_iter(digit)
        .take(RESET_CODE_DIGITS)
        .map(|d| char::from(b'0' + d))
        .collect()
}

pub fn codes_match(candidate: &str, stored: &str) -> bool {
    constant_time_eq(candidate.as_bytes(), stored.as_bytes())
}
