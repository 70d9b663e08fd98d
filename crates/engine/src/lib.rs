//! Stateless cipher engine behind the `cipher-server` encrypt/decrypt API.
//!
//! The engine turns a [`CipherRequest`] into a [`CipherResult`] (encrypt) or a
//! plaintext string (decrypt) using one of a closed set of transforms:
//!
//! - AES-128 / triple-DES block ciphers in ECB, CBC, CFB or OFB mode
//! - a one-time pad with a server-generated alphanumeric key
//! - RSA-2048 with OAEP-SHA256
//!
//! # Module invariants
//!
//! - **No retained state.** Nothing survives between an encrypt and the
//!   matching decrypt call; the [`EncryptionContext`], OTP key and RSA private
//!   key travel with the caller.
//! - **No HTTP dependencies.** Transport lives in the `server` crate.
//! - **All or nothing.** An operation either returns a complete result or a
//!   [`CipherError`]; partial plaintext is never produced.

pub mod engine;
pub mod error;
pub mod import;
pub mod key;
pub mod parity;
pub mod request;
pub mod transform;

pub use engine::CipherEngine;
pub use error::CipherError;
pub use request::{
    Algorithm, BlockMode, CipherRequest, CipherResult, EncryptionContext, RsaKeyPair,
};
