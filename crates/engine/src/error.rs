//! Error taxonomy for every engine operation.

use thiserror::Error;

/// Errors produced by the cipher engine.
///
/// All variants are detected synchronously and never retried internally.
/// Every variant except [`CipherError::KeyGeneration`] is caused by the caller's
/// input; see [`CipherError::is_client_error`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CipherError {
    /// The algorithm literal is not one of `AES`, `3DES`, `OTP`, `RSA`.
    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// The mode literal is not one of `ecb`, `cbc`, `cfb`, `ofb`.
    #[error("Unsupported mode: {0}")]
    UnsupportedMode(String),

    /// A required input (payload, key, IV) was empty or absent.
    #[error("Missing input: {0}")]
    MissingInput(&'static str),

    /// Key material failed structural validation or could not be parsed.
    #[error("{0}")]
    InvalidKeyFormat(String),

    /// The one-time-pad key length differs from the text length.
    #[error("Key length must be equal to text length for OTP.")]
    KeyLengthMismatch {
        /// Character length of the text.
        expected: usize,
        /// Character length of the supplied key.
        actual: usize,
    },

    /// The decrypt call declared a different mode than the encrypt call used.
    #[error("Decryption mode must match the encryption mode.")]
    ModeMismatch,

    /// Base64 decoding, IV decoding, unpadding or UTF-8 decoding failed.
    #[error("Malformed ciphertext: {0}")]
    MalformedCiphertext(String),

    /// OAEP decryption failed (wrong key or tampered ciphertext).
    #[error("RSA decryption failed: OAEP padding check did not pass")]
    RsaPaddingFailure,

    /// The plaintext exceeds what a single OAEP block can carry.
    #[error("Message too long for RSA-OAEP with this key")]
    MessageTooLong,

    /// RSA key pair generation or PEM encoding failed.
    #[error("RSA key generation failed: {0}")]
    KeyGeneration(String),
}

impl CipherError {
    /// Short machine-readable error code (e.g. `"mode_mismatch"`).
    pub fn code(&self) -> &'static str {
        match self {
            CipherError::UnsupportedAlgorithm(_) => "unsupported_algorithm",
            CipherError::UnsupportedMode(_) => "unsupported_mode",
            CipherError::MissingInput(_) => "missing_input",
            CipherError::InvalidKeyFormat(_) => "invalid_key_format",
            CipherError::KeyLengthMismatch { .. } => "key_length_mismatch",
            CipherError::ModeMismatch => "mode_mismatch",
            CipherError::MalformedCiphertext(_) => "malformed_ciphertext",
            CipherError::RsaPaddingFailure => "rsa_padding_failure",
            CipherError::MessageTooLong => "message_too_long",
            CipherError::KeyGeneration(_) => "key_generation_failed",
        }
    }

    /// Returns `true` if the error was caused by the request rather than the service.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, CipherError::KeyGeneration(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_mismatch_message_is_user_facing() {
        assert_eq!(
            CipherError::ModeMismatch.to_string(),
            "Decryption mode must match the encryption mode."
        );
    }

    #[test]
    fn key_generation_is_not_a_client_error() {
        assert!(!CipherError::KeyGeneration("rng".into()).is_client_error());
        assert!(CipherError::RsaPaddingFailure.is_client_error());
        assert!(CipherError::MissingInput("payload").is_client_error());
    }

    #[test]
    fn codes_are_snake_case() {
        let e = CipherError::KeyLengthMismatch {
            expected: 2,
            actual: 3,
        };
        assert_eq!(e.code(), "key_length_mismatch");
        assert!(e.to_string().contains("OTP"));
    }

    #[test]
    fn user_facing_messages_are_capitalized() {
        let errors = [
            CipherError::UnsupportedAlgorithm("ROT13".into()),
            CipherError::UnsupportedMode("xts".into()),
            CipherError::MissingInput("key"),
            CipherError::InvalidKeyFormat("Invalid public key format.".into()),
            CipherError::KeyLengthMismatch { expected: 1, actual: 2 },
            CipherError::ModeMismatch,
            CipherError::MalformedCiphertext("bad base64".into()),
            CipherError::RsaPaddingFailure,
            CipherError::MessageTooLong,
            CipherError::KeyGeneration("rng".into()),
        ];
        for e in errors {
            let msg = e.to_string();
            assert!(msg.starts_with(|c: char| c.is_ascii_uppercase()), "{msg}");
        }
    }
}
