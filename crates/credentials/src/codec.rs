use crate::{CredentialError, CredentialResult};
use base64::{engine::general_purpose, Engine as _};
use cbc::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::RngCore;
use sha1::Sha1;
use subtle::ConstantTimeEq;
use solor_digest::{digest, DigestAlgorithm};
use zeroize::Zeroizing;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Joins the salt and the payload in stored records.
pub const SEPARATOR: &str = "$$$";

/// Length of every generated salt in bytes.
pub const SALT_LEN: usize = 32;

/// Default PBKDF2 iteration count.
pub const DEFAULT_ITERATIONS: u32 = 10240;

/// Default derived key length in bits.
pub const DEFAULT_KEY_BITS: u32 = 256;

/// Length of the SHA-1 checksum appended to encrypted plaintext.
const CHECKSUM_LEN: usize = 20;

/// AES block and IV length.
const BLOCK_LEN: usize = 16;

/// Key length the cipher requires.
const CIPHER_KEY_BITS: u32 = 256;

/// Key derivation parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CredentialParams {
    iterations: u32,
    key_bits: u32,
}

impl CredentialParams {
    /// # Errors
    ///
    /// Returns [`CredentialError::InvalidParameters`] if `iterations` is zero or `key_bits` is
    /// not a positive multiple of 8.
    pub fn new(iterations: u32, key_bits: u32) -> CredentialResult<Self> {
        if iterations == 0 {
            return Err(CredentialError::InvalidParameters(
                "iterations must be at least 1".into(),
            ));
        }
        if key_bits == 0 || key_bits % 8 != 0 {
            return Err(CredentialError::InvalidParameters(format!(
                "key length must be a positive multiple of 8 bits, got {}",
                key_bits
            )));
        }
        Ok(Self {
            iterations,
            key_bits,
        })
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    pub fn key_bits(&self) -> u32 {
        self.key_bits
    }

    fn key_len(&self) -> usize {
        (self.key_bits / 8) as usize
    }
}

impl Default for CredentialParams {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            key_bits: DEFAULT_KEY_BITS,
        }
    }
}

/// Derives the base64url PBKDF2-HMAC-SHA1 key for `password` and `salt`.
///
/// # Errors
///
/// Returns [`CredentialError::EmptyPassword`] if `password` is empty.
pub fn hash(password: &str, salt: &[u8], params: &CredentialParams) -> CredentialResult<String> {
    let key = derive_key(password, salt, params)?;
    Ok(general_purpose::URL_SAFE.encode(key.as_slice()))
}

/// Hashes, verifies, encrypts and decrypts with one set of [`CredentialParams`].
///
/// Stateless apart from the parameters; share freely between threads.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CredentialCodec {
    params: CredentialParams,
}

impl CredentialCodec {
    pub fn new(params: CredentialParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &CredentialParams {
        &self.params
    }

    /// Derives the base64url key for `password` with a caller-supplied salt.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::EmptyPassword`] if `password` is empty.
    pub fn hash(&self, password: &str, salt: &[u8]) -> CredentialResult<String> {
        hash(password, salt, &self.params)
    }

    /// Creates a credential record (`salt$$$key`) with a fresh random salt.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::EmptyPassword`] if `password` is empty.
    pub fn salted_hash(&self, password: &str) -> CredentialResult<String> {
        let salt = random_salt();
        let key = self.hash(password, &salt)?;
        Ok(join_record(&salt, &key))
    }

    /// Returns `true` if `password` matches the credential record `stored`.
    ///
    /// Malformed records and empty passwords are reported as `false`.
    pub fn check(&self, password: &str, stored: &str) -> bool {
        let Some((salt_text, key_text)) = split_record(stored) else {
            return false;
        };
        if password.is_empty() {
            return false;
        }
        let (Ok(salt), Ok(expected)) = (
            general_purpose::URL_SAFE.decode(salt_text),
            general_purpose::URL_SAFE.decode(key_text),
        ) else {
            return false;
        };
        let Ok(key) = derive_key(password, &salt, &self.params) else {
            return false;
        };
        key.as_slice().ct_eq(expected.as_slice()).into()
    }

    /// Encrypts `plaintext` under `password`, returning `salt$$$ciphertext`.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::EmptyPassword`] if `password` is empty, or
    /// [`CredentialError::InvalidParameters`] if the key length is not 256 bits.
    pub fn encrypt(&self, password: &str, plaintext: &[u8]) -> CredentialResult<String> {
        self.require_cipher_key()?;
        let salt = random_salt();
        let key = derive_key(password, &salt, &self.params)?;

        let mut buffer = Zeroizing::new(Vec::with_capacity(plaintext.len() + CHECKSUM_LEN));
        buffer.extend_from_slice(plaintext);
        buffer.extend_from_slice(digest(DigestAlgorithm::Sha1, plaintext).as_bytes());

        let cipher = Aes256CbcEnc::new_from_slices(key.as_slice(), &salt[..BLOCK_LEN])
            .map_err(|e| CredentialError::InvalidParameters(e.to_string()))?;
        let ciphertext = cipher.encrypt_padded_vec_mut::<Pkcs7>(buffer.as_slice());

        Ok(format!(
            "{}{}{}",
            general_purpose::URL_SAFE.encode(salt),
            SEPARATOR,
            general_purpose::URL_SAFE.encode(ciphertext)
        ))
    }

    /// Decrypts a blob produced by [`CredentialCodec::encrypt`].
    ///
    /// # Errors
    ///
    /// - [`CredentialError::MalformedInput`] if `encoded` is not two base64url parts, the salt
    ///   is shorter than a cipher block, or the ciphertext is not whole blocks.
    /// - [`CredentialError::EmptyPassword`] if `password` is empty.
    /// - [`CredentialError::WrongPassword`] if the padding does not verify.
    /// - [`CredentialError::TruncatedData`] if the plaintext cannot hold its checksum.
    /// - [`CredentialError::IntegrityCheckFailed`] if the checksum does not match.
    pub fn decrypt(&self, password: &str, encoded: &str) -> CredentialResult<Vec<u8>> {
        self.require_cipher_key()?;
        let (salt_text, ciphertext_text) = split_record(encoded).ok_or_else(|| {
            CredentialError::MalformedInput(format!("expected salt{}ciphertext", SEPARATOR))
        })?;

        let salt = general_purpose::URL_SAFE
            .decode(salt_text)
            .map_err(|e| CredentialError::MalformedInput(format!("salt: {}", e)))?;
        if salt.len() < BLOCK_LEN {
            return Err(CredentialError::MalformedInput(format!(
                "salt must be at least {} bytes, got {}",
                BLOCK_LEN,
                salt.len()
            )));
        }
        let ciphertext = general_purpose::URL_SAFE
            .decode(ciphertext_text)
            .map_err(|e| CredentialError::MalformedInput(format!("ciphertext: {}", e)))?;
        if ciphertext.is_empty() || ciphertext.len() % BLOCK_LEN != 0 {
            return Err(CredentialError::MalformedInput(format!(
                "ciphertext must be whole {}-byte blocks, got {} bytes",
                BLOCK_LEN,
                ciphertext.len()
            )));
        }

        let key = derive_key(password, &salt, &self.params)?;
        let cipher = Aes256CbcDec::new_from_slices(key.as_slice(), &salt[..BLOCK_LEN])
            .map_err(|e| CredentialError::InvalidParameters(e.to_string()))?;
        let plaintext = Zeroizing::new(
            cipher
                .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
                .map_err(|_| CredentialError::WrongPassword)?,
        );

        if plaintext.len() < CHECKSUM_LEN {
            return Err(CredentialError::TruncatedData(plaintext.len()));
        }
        let (payload, checksum) = plaintext.split_at(plaintext.len() - CHECKSUM_LEN);
        if digest(DigestAlgorithm::Sha1, payload).as_bytes() != checksum {
            tracing::warn!(bytes = payload.len(), "decrypted payload failed integrity check");
            return Err(CredentialError::IntegrityCheckFailed);
        }

        Ok(payload.to_vec())
    }

    fn require_cipher_key(&self) -> CredentialResult<()> {
        if self.params.key_bits != CIPHER_KEY_BITS {
            return Err(CredentialError::InvalidParameters(format!(
                "encryption requires a {}-bit key, configured {}",
                CIPHER_KEY_BITS, self.params.key_bits
            )));
        }
        Ok(())
    }
}

fn derive_key(
    password: &str,
    salt: &[u8],
    params: &CredentialParams,
) -> CredentialResult<Zeroizing<Vec<u8>>> {
    if password.is_empty() {
        return Err(CredentialError::EmptyPassword);
    }
    let mut key = Zeroizing::new(vec![0u8; params.key_len()]);
    pbkdf2::pbkdf2_hmac::<Sha1>(
        password.as_bytes(),
        salt,
        params.iterations,
        key.as_mut_slice(),
    );
    Ok(key)
}

fn random_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    salt
}

fn join_record(salt: &[u8], key: &str) -> String {
    format!(
        "{}{}{}",
        general_purpose::URL_SAFE.encode(salt),
        SEPARATOR,
        key
    )
}

/// Splits `salt$$$payload`; anything other than exactly two parts is rejected.
fn split_record(text: &str) -> Option<(&str, &str)> {
    let mut parts = text.split(SEPARATOR);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(salt), Some(payload), None) => Some((salt, payload)),
        _ => None,
    }
}
