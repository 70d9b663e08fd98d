//! Mode parity check between an encrypt call and its matching decrypt call.

use crate::error::CipherError;
use crate::request::{BlockMode, EncryptionContext};

/// Refuse a decrypt whose declared mode differs from the recorded one.
///
/// Runs before any transform is built. A context with no recorded mode never
/// matches: the caller has no encryption to pair this decrypt with.
///
/// # Errors
///
/// Returns [`CipherError::ModeMismatch`].
pub fn ensure_mode_parity(requested: BlockMode, context: &EncryptionContext) -> Result<(), CipherError> {
    if context.mode == Some(requested) {
        Ok(())
    } else {
        Err(CipherError::ModeMismatch)
    }
}
