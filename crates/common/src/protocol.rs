//! Request and response types exchanged over the public HTTP API.
//!
//! Field names follow the JSON contract of the existing browser client
//! (`text`, `encryptionMode`, `publicKey`, ...).

use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// Encrypt endpoint
// ---------------------------------------------------------------------------

/// Request body for `POST /encrypt`.
#[derive(Clone, Serialize, Deserialize)]
pub struct EncryptRequest {
    /// Plaintext to encrypt.
    pub text: String,
    /// Passphrase (AES/3DES) or public key PEM (RSA). Ignored for OTP.
    #[serde(default)]
    pub key: Option<String>,
    /// `AES`, `3DES`, `OTP` or `RSA`.
    pub algorithm: String,
    /// `ecb`, `cbc`, `cfb` or `ofb`. Ignored for OTP and RSA.
    #[serde(default)]
    pub mode: Option<String>,
}

/// Successful response body for `POST /encrypt`.
///
/// Which optional fields appear depends on the algorithm:
/// - AES/3DES: `iv` (explicit `null` for ECB)
/// - OTP: `key`
/// - RSA without a supplied key: `publicKey` and `privateKey`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptResponse {
    /// Base64 ciphertext.
    pub encrypted: String,
    /// Outer `None` omits the field; `Some(None)` serialises as `null`.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present_or_null"
    )]
    pub iv: Option<Option<String>>,
    /// Generated one-time-pad key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Generated RSA public key PEM.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
    /// Generated RSA private key PEM.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
}

/// Distinguish a present `null` from an absent field.
fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

// ---------------------------------------------------------------------------
// Decrypt endpoint
// ---------------------------------------------------------------------------

/// Request body for `POST /decrypt`.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecryptRequest {
    /// Base64 ciphertext.
    pub text: String,
    /// Passphrase, OTP key or private key PEM.
    #[serde(default)]
    pub key: String,
    pub algorithm: String,
    /// Mode declared for this decryption.
    #[serde(default)]
    pub mode: Option<String>,
    /// Base64 IV returned by the matching encrypt call.
    #[serde(default)]
    pub iv: Option<String>,
    /// Mode recorded when the ciphertext was produced.
    #[serde(default)]
    pub encryption_mode: Option<String>,
}

/// Successful response body for `POST /decrypt`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecryptResponse {
    pub decrypted: String,
}

// ---------------------------------------------------------------------------
// Error response
// ---------------------------------------------------------------------------

/// Standard error response body returned on any non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable description safe to show to the user verbatim.
    pub error: String,
    /// Short machine-readable error code (e.g. `"mode_mismatch"`).
    pub code: String,
}

impl ErrorResponse {
    /// Construct an [`ErrorResponse`] from a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            code: code.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Response body for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"ok"` while the process is serving.
    pub status: String,
    /// Service version.
    pub version: String,
}
