//! Password sealing
//!
//! Control-panel passwords must stay readable by their owner, so the store keeps
//! them encrypted rather than hashed: AES-256-GCM under a PBKDF2-SHA256 key
//! derived from the operator's secret.
//!
//! A sealed value is one string, `v{version}:{salt}:{nonce}:{ciphertext}`, each
//! part Base64. Account passwords are alphanumeric, so a stored value containing
//! `:` is always a sealed one.

mod versions;

pub use versions::{CURRENT_SEAL_VERSION, pbkdf2_iterations};

use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, KeyInit},
};
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use pbkdf2::pbkdf2_hmac_array;
use rand::RngCore;
use sha2::Sha256;

use crate::error::{CoreError, CoreResult};

const PBKDF2_ITERATIONS: u32 = versions::current_iterations();
const SALT_LENGTH: usize = 16;
const NONCE_LENGTH: usize = 12;
const KEY_LENGTH: usize = 32; // AES-256

fn derive_key(secret: &str, salt: &[u8], iterations: u32) -> [u8; KEY_LENGTH] {
    pbkdf2_hmac_array::<Sha256, KEY_LENGTH>(secret.as_bytes(), salt, iterations)
}

fn cipher_for(key: &[u8]) -> CoreResult<Aes256Gcm> {
    Aes256Gcm::new_from_slice(key)
        .map_err(|e| CoreError::StorageError(format!("Failed to create cipher: {e}")))
}

/// Encrypt `plaintext` under `secret`.
pub fn seal(plaintext: &str, secret: &str) -> CoreResult<String> {
    let mut salt = [0u8; SALT_LENGTH];
    let mut nonce_bytes = [0u8; NONCE_LENGTH];
    rand::rng().fill_bytes(&mut salt);
    rand::rng().fill_bytes(&mut nonce_bytes);

    let cipher = cipher_for(&derive_key(secret, &salt, PBKDF2_ITERATIONS))?;
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), plaintext.as_bytes())
        .map_err(|e| CoreError::StorageError(format!("Encryption failed: {e}")))?;

    Ok(format!(
        "v{CURRENT_SEAL_VERSION}:{}:{}:{}",
        BASE64.encode(salt),
        BASE64.encode(nonce_bytes),
        BASE64.encode(ciphertext)
    ))
}

/// Decrypt a value produced by [`seal`].
pub fn open(sealed: &str, secret: &str) -> CoreResult<String> {
    let invalid = |what: &str| CoreError::StorageError(format!("Invalid sealed value: {what}"));

    let mut parts = sealed.splitn(4, ':');
    let (Some(version), Some(salt), Some(nonce), Some(ciphertext)) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(invalid("expected 4 segments"));
    };

    let iterations = version
        .strip_prefix('v')
        .and_then(|v| v.parse::<u32>().ok())
        .and_then(pbkdf2_iterations)
        .ok_or_else(|| invalid("unsupported version"))?;
    let salt = BASE64.decode(salt).map_err(|_| invalid("salt"))?;
    let nonce_bytes = BASE64.decode(nonce).map_err(|_| invalid("nonce"))?;
    let ciphertext = BASE64.decode(ciphertext).map_err(|_| invalid("ciphertext"))?;
    if nonce_bytes.len() != NONCE_LENGTH {
        return Err(invalid("nonce length"));
    }

    let cipher = cipher_for(&derive_key(secret, &salt, iterations))?;
    let plaintext = cipher
        .decrypt(Nonce::from_slice(&nonce_bytes), ciphertext.as_ref())
        .map_err(|_| {
            CoreError::StorageError(
                "Decryption failed: wrong secret or corrupted data".to_string(),
            )
        })?;

    String::from_utf8(plaintext).map_err(|_| invalid("plaintext is not UTF-8"))
}

/// Whether a stored value is in sealed form.
#[must_use]
pub fn is_sealed(value: &str) -> bool {
    value.starts_with('v') && value.contains(':')
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn seal_open_roundtrip() {
        let sealed = seal("Abc123xyz", "operator-secret").unwrap();
        assert!(is_sealed(&sealed));
        assert!(sealed.starts_with("v1:"));
        assert_eq!(open(&sealed, "operator-secret").unwrap(), "Abc123xyz");
    }

    #[test]
    fn wrong_secret_fails() {
        let sealed = seal("Abc123xyz", "right").unwrap();
        assert!(matches!(
            open(&sealed, "wrong"),
            Err(CoreError::StorageError(_))
        ));
    }

    #[test]
    fn sealing_is_randomized() {
        assert_ne!(seal("same", "k").unwrap(), seal("same", "k").unwrap());
    }

    #[test]
    fn plain_passwords_are_not_sealed() {
        assert!(!is_sealed("Abc123xyz"));
        assert!(!is_sealed("v1abc"));
    }

    #[test]
    fn malformed_values_rejected() {
        assert!(open("v1:only", "k").is_err());
        assert!(open("v9:AAAA:AAAA:AAAA", "k").is_err());
        assert!(open("v1:!!:!!:!!", "k").is_err());
    }
}
