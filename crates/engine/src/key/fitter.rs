//! [`FittedKey`]: passphrase shaped to the exact length a block cipher needs.

use crate::error::CipherError;

/// Block-cipher key bytes of exactly the requested length.
///
/// The passphrase bytes are repeated until long enough, then truncated. The
/// result is deterministic and periodic for short passphrases; this matches
/// the ciphertexts produced by existing clients and must not be replaced by a
/// KDF.
#[derive(Clone)]
pub struct FittedKey(Vec<u8>);

impl FittedKey {
    /// Fit `passphrase` to `len` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::MissingInput`] if `passphrase` is empty.
    pub fn fit(passphrase: &str, len: usize) -> Result<Self, CipherError> {
        if passphrase.is_empty() {
            return Err(CipherError::MissingInput("key"));
        }
        let bytes = passphrase.bytes().cycle().take(len).collect();
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Drop for FittedKey {
    fn drop(&mut self) {
        self.0.iter_mut().for_each(|b| *b = 0);
    }
}

impl std::fmt::Debug for FittedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("FittedKey([REDACTED])")
    }
}
