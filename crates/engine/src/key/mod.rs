//! Key material shaping, IV generation and PEM validation.
//!
//! - [`fitter`] turns a passphrase into a fixed-length block-cipher key by
//!   repetition and truncation. No hashing is applied.
//! - [`iv`] draws initialization vectors from the OS CSPRNG.
//! - [`material`] normalizes and validates PEM-framed RSA key text.

pub mod fitter;
pub mod iv;
pub mod material;

pub use fitter::FittedKey;
pub use iv::generate_iv;
pub use material::{KeyKind, KeyMaterial};
