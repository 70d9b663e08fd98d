//! [`CipherEngine`]: request validation and dispatch to a [`Transform`].

use tracing::debug;

use crate::error::CipherError;
use crate::key::{KeyKind, KeyMaterial};
use crate::parity::ensure_mode_parity;
use crate::request::{Algorithm, CipherRequest, CipherResult, EncryptionContext};
use crate::transform::asymmetric::DEFAULT_KEY_BITS;
use crate::transform::{
    AsymmetricTransform, BlockCipherTransform, BlockFamily, CipherTransform, OneTimePadTransform,
    Transform,
};

/// Stateless entry point for encrypt and decrypt requests.
///
/// Cheap to clone and safe to share across concurrent requests; it holds only
/// configuration.
#[derive(Debug, Clone, Copy)]
pub struct CipherEngine {
    rsa_key_bits: usize,
}

impl CipherEngine {
    /// Engine generating RSA key pairs of `rsa_key_bits` bits.
    pub fn new(rsa_key_bits: usize) -> Self {
        Self { rsa_key_bits }
    }

    pub fn rsa_key_bits(&self) -> usize {
        self.rsa_key_bits
    }

    /// Encrypt `request.payload`.
    ///
    /// A key is required for AES and 3DES. OTP ignores the key and generates
    /// one. RSA uses the supplied public key, which must pass PEM validation,
    /// or generates a pair when none is supplied.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::MissingInput`] for an empty payload or a missing
    /// block-cipher key, [`CipherError::InvalidKeyFormat`] for a malformed RSA
    /// public key, and any error raised by the transform itself.
    pub fn encrypt(&self, request: &CipherRequest) -> Result<CipherResult, CipherError> {
        if request.payload.trim().is_empty() {
            return Err(CipherError::MissingInput("text"));
        }
        let transform = self.encrypt_transform(request)?;
        debug!(algorithm = %request.algorithm, mode = ?request.mode, "encrypting");
        transform.encrypt(&request.payload)
    }

    /// Decrypt `request.payload` using the context recorded at encryption time.
    ///
    /// For block ciphers the declared mode must equal `context.mode`; this is
    /// checked before any cipher runs.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::MissingInput`] for an empty payload or key,
    /// [`CipherError::ModeMismatch`] on a mode disagreement,
    /// [`CipherError::InvalidKeyFormat`] for a malformed RSA private key, and
    /// any error raised by the transform itself.
    pub fn decrypt(
        &self,
        request: &CipherRequest,
        context: &EncryptionContext,
    ) -> Result<String, CipherError> {
        if request.payload.trim().is_empty() {
            return Err(CipherError::MissingInput("text"));
        }
        if request.key.is_empty() {
            return Err(CipherError::MissingInput("key"));
        }
        let transform = self.decrypt_transform(request, context)?;
        debug!(algorithm = %request.algorithm, mode = ?request.mode, "decrypting");
        transform.decrypt(&request.payload)
    }

    fn encrypt_transform(&self, request: &CipherRequest) -> Result<Transform, CipherError> {
        let transform = match request.algorithm {
            Algorithm::Aes => block_for_encrypt(BlockFamily::Aes128, request)?,
            Algorithm::TripleDes => block_for_encrypt(BlockFamily::TripleDes, request)?,
            Algorithm::Otp => Transform::OneTimePad(OneTimePadTransform::for_encrypt()),
            Algorithm::Rsa => {
                let public_pem = if request.needs_key_generation() {
                    None
                } else {
                    Some(KeyMaterial::new(request.key.as_str(), KeyKind::PublicPem).validate()?)
                };
                Transform::Rsa(AsymmetricTransform::for_encrypt(public_pem, self.rsa_key_bits))
            }
        };
        Ok(transform)
    }

    fn decrypt_transform(
        &self,
        request: &CipherRequest,
        context: &EncryptionContext,
    ) -> Result<Transform, CipherError> {
        let transform = match request.algorithm {
            Algorithm::Aes => block_for_decrypt(BlockFamily::Aes128, request, context)?,
            Algorithm::TripleDes => block_for_decrypt(BlockFamily::TripleDes, request, context)?,
            Algorithm::Otp => Transform::OneTimePad(OneTimePadTransform::for_decrypt(&request.key)),
            Algorithm::Rsa => {
                let private_pem =
                    KeyMaterial::new(request.key.as_str(), KeyKind::PrivatePem).validate()?;
                Transform::Rsa(AsymmetricTransform::for_decrypt(private_pem))
            }
        };
        Ok(transform)
    }
}

impl Default for CipherEngine {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_BITS)
    }
}

fn block_for_encrypt(family: BlockFamily, request: &CipherRequest) -> Result<Transform, CipherError> {
    if request.key.is_empty() {
        return Err(CipherError::MissingInput("key"));
    }
    let transform = BlockCipherTransform::new(family, request.block_mode(), &request.key, None)?;
    Ok(Transform::Block(transform))
}

/// Mode parity is checked before the key is fitted or any cipher runs.
fn block_for_decrypt(
    family: BlockFamily,
    request: &CipherRequest,
    context: &EncryptionContext,
) -> Result<Transform, CipherError> {
    let mode = request.block_mode();
    ensure_mode_parity(mode, context)?;
    let transform = BlockCipherTransform::new(family, mode, &request.key, context.iv.clone())?;
    Ok(Transform::Block(transform))
}
