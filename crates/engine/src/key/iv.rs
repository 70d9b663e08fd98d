//! Initialization vector generation.

use rand::{rngs::OsRng, RngCore};

use crate::request::BlockMode;

/// Draw a fresh IV of `block_size` bytes for `mode`, or `None` for ECB.
///
/// `OsRng` is stateless and safe to use from concurrent requests.
pub fn generate_iv(mode: BlockMode, block_size: usize) -> Option<Vec<u8>> {
    if !mode.requires_iv() {
        return None;
    }
    let mut iv = vec![0u8; block_size];
    OsRng.fill_bytes(&mut iv);
    Some(iv)
}
