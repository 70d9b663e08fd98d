//! AES-128 and triple-DES block ciphers in ECB, CBC, CFB and OFB modes.
//!
//! ECB and CBC pad with PKCS#7. CFB (full-block feedback) and OFB run as
//! stream modes and produce ciphertext the same length as the plaintext.
//!
//! # Wire format
//!
//! Ciphertext and IV are standard base64 with padding. ECB never carries an IV.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use cbc::cipher::{
    block_padding::Pkcs7, AsyncStreamCipher, BlockDecryptMut, BlockEncryptMut, KeyInit,
    KeyIvInit, StreamCipher,
};

use super::CipherTransform;
use crate::error::CipherError;
use crate::key::{generate_iv, FittedKey};
use crate::request::{BlockMode, CipherResult};

/// Block cipher family; fixes key length and block size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockFamily {
    /// AES with a 16-byte key and 16-byte block.
    Aes128,
    /// DES-EDE3 with a 24-byte key and 8-byte block.
    TripleDes,
}

impl BlockFamily {
    /// Key length in bytes.
    pub fn key_len(self) -> usize {
        match self {
            BlockFamily::Aes128 => 16,
            BlockFamily::TripleDes => 24,
        }
    }

    /// Block (and IV) size in bytes.
    pub fn block_size(self) -> usize {
        match self {
            BlockFamily::Aes128 => 16,
            BlockFamily::TripleDes => 8,
        }
    }
}

/// Symmetric block cipher bound to a fitted key and a mode.
///
/// `iv` is only read on decrypt; encrypt always draws a fresh one.
#[derive(Debug)]
pub struct BlockCipherTransform {
    family: BlockFamily,
    mode: BlockMode,
    key: FittedKey,
    iv: Option<String>,
}

impl BlockCipherTransform {
    /// Fit `passphrase` for `family` and bind it to `mode`.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::MissingInput`] if `passphrase` is empty.
    pub fn new(
        family: BlockFamily,
        mode: BlockMode,
        passphrase: &str,
        iv: Option<String>,
    ) -> Result<Self, CipherError> {
        Ok(Self {
            family,
            mode,
            key: FittedKey::fit(passphrase, family.key_len())?,
            iv,
        })
    }

    fn decode_iv(&self) -> Result<Option<Vec<u8>>, CipherError> {
        if !self.mode.requires_iv() {
            return Ok(None);
        }
        let encoded = self
            .iv
            .as_deref()
            .map(str::trim)
            .filter(|iv| !iv.is_empty())
            .ok_or(CipherError::MissingInput("iv"))?;
        let iv = STANDARD
            .decode(encoded)
            .map_err(|e| CipherError::MalformedCiphertext(format!("IV is not valid base64: {e}")))?;
        if iv.len() != self.family.block_size() {
            return Err(CipherError::MalformedCiphertext(format!(
                "IV must be {} bytes, got {}",
                self.family.block_size(),
                iv.len()
            )));
        }
        Ok(Some(iv))
    }
}

impl CipherTransform for BlockCipherTransform {
    fn encrypt(&self, plaintext: &str) -> Result<CipherResult, CipherError> {
        let iv = generate_iv(self.mode, self.family.block_size());
        let key = self.key.as_bytes();
        let data = plaintext.as_bytes();
        let ciphertext = match self.family {
            BlockFamily::Aes128 => aes128_encrypt(self.mode, key, iv.as_deref(), data)?,
            BlockFamily::TripleDes => tdes_encrypt(self.mode, key, iv.as_deref(), data)?,
        };
        Ok(CipherResult {
            ciphertext: STANDARD.encode(ciphertext),
            iv: iv.map(|iv| STANDARD.encode(iv)),
            generated_key: None,
            generated_key_pair: None,
            mode: Some(self.mode),
        })
    }

    fn decrypt(&self, ciphertext: &str) -> Result<String, CipherError> {
        let data = STANDARD.decode(ciphertext.trim()).map_err(|e| {
            CipherError::MalformedCiphertext(format!("ciphertext is not valid base64: {e}"))
        })?;
        let iv = self.decode_iv()?;
        let key = self.key.as_bytes();
        let plaintext = match self.family {
            BlockFamily::Aes128 => aes128_decrypt(self.mode, key, iv.as_deref(), &data)?,
            BlockFamily::TripleDes => tdes_decrypt(self.mode, key, iv.as_deref(), &data)?,
        };
        String::from_utf8(plaintext).map_err(|_| {
            CipherError::MalformedCiphertext("decrypted bytes are not valid UTF-8".into())
        })
    }
}

fn require_iv(iv: Option<&[u8]>) -> Result<&[u8], CipherError> {
    iv.ok_or(CipherError::MissingInput("iv"))
}

fn invalid_length(_: cbc::cipher::InvalidLength) -> CipherError {
    CipherError::MalformedCiphertext("key or IV has the wrong length".into())
}

fn bad_padding(_: cbc::cipher::block_padding::UnpadError) -> CipherError {
    CipherError::MalformedCiphertext("bad decrypt: padding check failed".into())
}

/// Generate an encrypt/decrypt function pair for one concrete block cipher.
macro_rules! block_cipher_fns {
    ($encrypt:ident, $decrypt:ident, $cipher:ty) => {
        fn $encrypt(
            mode: BlockMode,
            key: &[u8],
            iv: Option<&[u8]>,
            data: &[u8],
        ) -> Result<Vec<u8>, CipherError> {
            let out = match mode {
                BlockMode::Ecb => ecb::Encryptor::<$cipher>::new_from_slice(key)
                    .map_err(invalid_length)?
                    .encrypt_padded_vec_mut::<Pkcs7>(data),
                BlockMode::Cbc => cbc::Encryptor::<$cipher>::new_from_slices(key, require_iv(iv)?)
                    .map_err(invalid_length)?
                    .encrypt_padded_vec_mut::<Pkcs7>(data),
                BlockMode::Cfb => {
                    let cipher = cfb_mode::Encryptor::<$cipher>::new_from_slices(key, require_iv(iv)?)
                        .map_err(invalid_length)?;
                    let mut buf = data.to_vec();
                    cipher.encrypt(&mut buf);
                    buf
                }
                BlockMode::Ofb => {
                    let mut cipher = ofb::Ofb::<$cipher>::new_from_slices(key, require_iv(iv)?)
                        .map_err(invalid_length)?;
                    let mut buf = data.to_vec();
                    cipher.apply_keystream(&mut buf);
                    buf
                }
            };
            Ok(out)
        }

        fn $decrypt(
            mode: BlockMode,
            key: &[u8],
            iv: Option<&[u8]>,
            data: &[u8],
        ) -> Result<Vec<u8>, CipherError> {
            let out = match mode {
                BlockMode::Ecb => ecb::Decryptor::<$cipher>::new_from_slice(key)
                    .map_err(invalid_length)?
                    .decrypt_padded_vec_mut::<Pkcs7>(data)
                    .map_err(bad_padding)?,
                BlockMode::Cbc => cbc::Decryptor::<$cipher>::new_from_slices(key, require_iv(iv)?)
                    .map_err(invalid_length)?
                    .decrypt_padded_vec_mut::<Pkcs7>(data)
                    .map_err(bad_padding)?,
                BlockMode::Cfb => {
                    let cipher = cfb_mode::Decryptor::<$cipher>::new_from_slices(key, require_iv(iv)?)
                        .map_err(invalid_length)?;
                    let mut buf = data.to_vec();
                    cipher.decrypt(&mut buf);
                    buf
                }
                BlockMode::Ofb => {
                    let mut cipher = ofb::Ofb::<$cipher>::new_from_slices(key, require_iv(iv)?)
                        .map_err(invalid_length)?;
                    let mut buf = data.to_vec();
                    cipher.apply_keystream(&mut buf);
                    buf
                }
            };
            Ok(out)
        }
    };
}

block_cipher_fns!(aes128_encrypt, aes128_decrypt, aes::Aes128);
block_cipher_fns!(tdes_encrypt, tdes_decrypt, des::TdesEde3);
