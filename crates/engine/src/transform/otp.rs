//! One-time pad over Unicode scalar values with a server-generated key.
//!
//! Each plaintext character is XORed with the key character at the same
//! index. The resulting characters are UTF-8 encoded and base64'd, so ASCII
//! text produces exactly one ciphertext byte per character.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::{distributions::Alphanumeric, rngs::OsRng, Rng};

use super::CipherTransform;
use crate::error::CipherError;
use crate::request::CipherResult;

/// One-time-pad transform.
///
/// `key` is only read on decrypt; encrypt always generates a new one.
#[derive(Default)]
pub struct OneTimePadTransform {
    key: Option<String>,
}

impl OneTimePadTransform {
    /// Transform for encryption; the key is generated per call.
    pub fn for_encrypt() -> Self {
        Self { key: None }
    }

    /// Transform for decryption with a caller-retained key.
    pub fn for_decrypt(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
        }
    }
}

impl std::fmt::Debug for OneTimePadTransform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OneTimePadTransform")
            .field("key", &self.key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl CipherTransform for OneTimePadTransform {
    fn encrypt(&self, plaintext: &str) -> Result<CipherResult, CipherError> {
        if plaintext.is_empty() {
            return Err(CipherError::MissingInput("text"));
        }
        let key = generate_key(plaintext.chars().count());
        let encrypted = xor_chars(plaintext, &key)?;
        Ok(CipherResult {
            generated_key: Some(key),
            ..CipherResult::ciphertext(STANDARD.encode(encrypted.as_bytes()))
        })
    }

    fn decrypt(&self, ciphertext: &str) -> Result<String, CipherError> {
        let key = self
            .key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(CipherError::MissingInput("key"))?;
        let bytes = STANDARD.decode(ciphertext.trim()).map_err(|e| {
            CipherError::MalformedCiphertext(format!("ciphertext is not valid base64: {e}"))
        })?;
        let encrypted = String::from_utf8(bytes).map_err(|_| {
            CipherError::MalformedCiphertext("decoded ciphertext is not valid UTF-8".into())
        })?;
        xor_chars(&encrypted, key)
    }
}

/// Random key of `len` characters drawn from `[A-Za-z0-9]`.
pub fn generate_key(len: usize) -> String {
    OsRng
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// XOR `text` with `key` character by character.
///
/// # Errors
///
/// Returns [`CipherError::KeyLengthMismatch`] when the character counts
/// differ, and [`CipherError::MalformedCiphertext`] if a pair XORs to a value
/// that is not a Unicode scalar.
fn xor_chars(text: &str, key: &str) -> Result<String, CipherError> {
    let expected = text.chars().count();
    let actual = key.chars().count();
    if expected != actual {
        return Err(CipherError::KeyLengthMismatch { expected, actual });
    }
    text.chars()
        .zip(key.chars())
        .map(|(t, k)| {
            char::from_u32(u32::from(t) ^ u32::from(k)).ok_or_else(|| {
                CipherError::MalformedCiphertext("key does not fit this ciphertext".into())
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hi_generates_two_char_key_and_round_trips() {
        let enc = OneTimePadTransform::for_encrypt().encrypt("HI").unwrap();
        let key = enc.generated_key.clone().unwrap();
        assert_eq!(key.chars().count(), 2);
        assert!(key.chars().all(|c| c.is_ascii_alphanumeric()));
        assert!(enc.iv.is_none());
        let dec = OneTimePadTransform::for_decrypt(key).decrypt(&enc.ciphertext).unwrap();
        assert_eq!(dec, "HI");
    }

    #[test]
    fn wrong_key_length_rejected_both_ways() {
        let enc = OneTimePadTransform::for_encrypt().encrypt("HI").unwrap();
        for key in ["a", "abc"] {
            let err = OneTimePadTransform::for_decrypt(key)
                .decrypt(&enc.ciphertext)
                .unwrap_err();
            assert!(matches!(err, CipherError::KeyLengthMismatch { expected: 2, .. }));
        }
    }

    // Reference values produced by the Node.js service this engine replaces.
    #[test]
    fn matches_reference_ciphertexts() {
        assert_eq!(STANDARD.encode(xor_chars("HI", "ab").unwrap()), "KSs=");
        assert_eq!(STANDARD.encode(xor_chars("héllo", "abcde").unwrap()), "CcKLDwgK");
        let dec = OneTimePadTransform::for_decrypt("abcde").decrypt("CcKLDwgK").unwrap();
        assert_eq!(dec, "héllo");
    }

    #[test]
    fn key_length_counts_characters_not_bytes() {
        let enc = OneTimePadTransform::for_encrypt().encrypt("naïve").unwrap();
        assert_eq!(enc.generated_key.unwrap().len(), 5);
    }

    #[test]
    fn missing_key_rejected() {
        let err = OneTimePadTransform::for_decrypt("").decrypt("KSs=").unwrap_err();
        assert_eq!(err, CipherError::MissingInput("key"));
    }

    #[test]
    fn generated_keys_differ() {
        assert_ne!(generate_key(32), generate_key(32));
    }

    #[test]
    fn debug_redacts_key() {
        let t = OneTimePadTransform::for_decrypt("secretkey");
        assert!(!format!("{t:?}").contains("secretkey"));
    }
}
