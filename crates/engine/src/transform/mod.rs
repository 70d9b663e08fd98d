//! The closed set of cipher transforms behind one capability trait.
//!
//! [`Transform`] dispatches by `match`, so adding an algorithm is a compile
//! error everywhere it is not handled.

pub mod asymmetric;
pub mod block;
pub mod otp;

pub use asymmetric::AsymmetricTransform;
pub use block::{BlockCipherTransform, BlockFamily};
pub use otp::OneTimePadTransform;

use crate::error::CipherError;
use crate::request::CipherResult;

/// Encrypt/decrypt capability shared by every transform.
pub trait CipherTransform {
    /// Encrypt `plaintext`, returning base64 ciphertext and any material the
    /// caller must retain.
    fn encrypt(&self, plaintext: &str) -> Result<CipherResult, CipherError>;

    /// Decrypt base64 `ciphertext` to UTF-8 text.
    fn decrypt(&self, ciphertext: &str) -> Result<String, CipherError>;
}

/// One transform, fully bound to its key material.
#[derive(Debug)]
pub enum Transform {
    Block(BlockCipherTransform),
    OneTimePad(OneTimePadTransform),
    Rsa(AsymmetricTransform),
}

impl CipherTransform for Transform {
    fn encrypt(&self, plaintext: &str) -> Result<CipherResult, CipherError> {
        match self {
            Transform::Block(t) => t.encrypt(plaintext),
            Transform::OneTimePad(t) => t.encrypt(plaintext),
            Transform::Rsa(t) => t.encrypt(plaintext),
        }
    }

    fn decrypt(&self, ciphertext: &str) -> Result<String, CipherError> {
        match self {
            Transform::Block(t) => t.decrypt(ciphertext),
            Transform::OneTimePad(t) => t.decrypt(ciphertext),
            Transform::Rsa(t) => t.decrypt(ciphertext),
        }
    }
}
