//! RSA key pair generation and OAEP-SHA256 encryption.
//!
//! Public keys are exchanged as SubjectPublicKeyInfo PEM and private keys as
//! PKCS#8 PEM. Keys whose PEM body is PKCS#1 DER (legacy `RSA ... KEY`
//! markers rewritten by the normalizer) are also accepted.
//!
//! Key generation is CPU-heavy; callers on an async runtime should run
//! requests that need it on a blocking worker (see
//! [`CipherRequest::needs_key_generation`](crate::CipherRequest::needs_key_generation)).

use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::rngs::OsRng;
use rsa::{
    pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey},
    pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey, LineEnding},
    Oaep, RsaPrivateKey, RsaPublicKey,
};
use sha2::Sha256;
use tracing::debug;

use super::CipherTransform;
use crate::error::CipherError;
use crate::key::material::{format_error_message, pem_body, KeyKind};
use crate::request::{CipherResult, RsaKeyPair};

/// Modulus size of generated key pairs.
pub const DEFAULT_KEY_BITS: usize = 2048;

/// RSA-OAEP transform.
///
/// Encrypt uses `public_pem` when present and otherwise generates a fresh pair,
/// returning both halves. Decrypt requires `private_pem`.
pub struct AsymmetricTransform {
    public_pem: Option<String>,
    private_pem: Option<String>,
    key_bits: usize,
}

impl AsymmetricTransform {
    /// Transform for encryption. An empty `public_pem` triggers key generation.
    pub fn for_encrypt(public_pem: Option<String>, key_bits: usize) -> Self {
        Self {
            public_pem: public_pem.filter(|k| !k.trim().is_empty()),
            private_pem: None,
            key_bits,
        }
    }

    /// Transform for decryption with a caller-retained private key.
    pub fn for_decrypt(private_pem: impl Into<String>) -> Self {
        Self {
            public_pem: None,
            private_pem: Some(private_pem.into()),
            key_bits: DEFAULT_KEY_BITS,
        }
    }
}

impl std::fmt::Debug for AsymmetricTransform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsymmetricTransform")
            .field("has_public_key", &self.public_pem.is_some())
            .field("has_private_key", &self.private_pem.is_some())
            .field("key_bits", &self.key_bits)
            .finish()
    }
}

impl CipherTransform for AsymmetricTransform {
    fn encrypt(&self, plaintext: &str) -> Result<CipherResult, CipherError> {
        let (public_key, generated) = match self.public_pem.as_deref() {
            Some(pem) => (parse_public_key(pem)?, None),
            None => {
                let (private_key, pair) = generate_key_pair(self.key_bits)?;
                (RsaPublicKey::from(&private_key), Some(pair))
            }
        };
        let ciphertext = public_key
            .encrypt(&mut OsRng, Oaep::new::<Sha256>(), plaintext.as_bytes())
            .map_err(|e| match e {
                rsa::Error::MessageTooLong => CipherError::MessageTooLong,
                other => CipherError::InvalidKeyFormat(format!("RSA encryption failed: {other}")),
            })?;
        Ok(CipherResult {
            generated_key_pair: generated,
            ..CipherResult::ciphertext(STANDARD.encode(ciphertext))
        })
    }

    fn decrypt(&self, ciphertext: &str) -> Result<String, CipherError> {
        let pem = self
            .private_pem
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(CipherError::MissingInput("key"))?;
        let private_key = parse_private_key(pem)?;
        let data = STANDARD.decode(ciphertext.trim()).map_err(|e| {
            CipherError::MalformedCiphertext(format!("ciphertext is not valid base64: {e}"))
        })?;
        let plaintext = private_key
            .decrypt(Oaep::new::<Sha256>(), &data)
            .map_err(|_| CipherError::RsaPaddingFailure)?;
        String::from_utf8(plaintext).map_err(|_| {
            CipherError::MalformedCiphertext("decrypted bytes are not valid UTF-8".into())
        })
    }
}

/// Generate a `bits`-bit key pair, returning the private key and both PEMs.
///
/// # Errors
///
/// Returns [`CipherError::KeyGeneration`] if generation or PEM encoding fails.
pub fn generate_key_pair(bits: usize) -> Result<(RsaPrivateKey, RsaKeyPair), CipherError> {
    debug!(bits, "generating RSA key pair");
    let private_key = RsaPrivateKey::new(&mut OsRng, bits)
        .map_err(|e| CipherError::KeyGeneration(e.to_string()))?;
    let public_key = RsaPublicKey::from(&private_key);

    let private_key_pem = private_key
        .to_pkcs8_pem(LineEnding::LF)
        .map_err(|e| CipherError::KeyGeneration(e.to_string()))?
        .as_str()
        .to_owned();
    let public_key_pem = public_key
        .to_public_key_pem(LineEnding::LF)
        .map_err(|e| CipherError::KeyGeneration(e.to_string()))?;

    Ok((
        private_key,
        RsaKeyPair {
            public_key_pem,
            private_key_pem,
        },
    ))
}

fn parse_public_key(pem: &str) -> Result<RsaPublicKey, CipherError> {
    if let Ok(key) = RsaPublicKey::from_public_key_pem(pem) {
        return Ok(key);
    }
    pem_der(pem, KeyKind::PublicPem)
        .and_then(|der| RsaPublicKey::from_pkcs1_der(&der).ok())
        .ok_or_else(|| CipherError::InvalidKeyFormat(format_error_message(KeyKind::PublicPem)))
}

fn parse_private_key(pem: &str) -> Result<RsaPrivateKey, CipherError> {
    if let Ok(key) = RsaPrivateKey::from_pkcs8_pem(pem) {
        return Ok(key);
    }
    pem_der(pem, KeyKind::PrivatePem)
        .and_then(|der| RsaPrivateKey::from_pkcs1_der(&der).ok())
        .ok_or_else(|| CipherError::InvalidKeyFormat(format_error_message(KeyKind::PrivatePem)))
}

/// Base64-decode the body between the PEM markers, ignoring whitespace.
fn pem_der(pem: &str, kind: KeyKind) -> Option<Vec<u8>> {
    let body: String = pem_body(pem, kind)?
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    STANDARD.decode(body).ok()
}
