//! AES-128-OCB3 seal/open (spec.md §4.2).
//!
//! Both registered tag lengths share one block cipher and differ only in
//! the nonce and tag widths, so [`seal`]/[`open`] dispatch on
//! [`ProtectionAlgorithm`] to pick the right `Ocb3` instantiation rather
//! than exposing two near-identical call sites.

use aead::{consts::{U16, U4, U8}, generic_array::GenericArray, Aead, KeyInit, Payload};
use aes::Aes128;
use ocb3::Ocb3;
use zeroize::Zeroize;

use crate::core::{ProtectionError, PROTECTION_KEY_SIZE};

use super::algorithm::ProtectionAlgorithm;

type OcbTag128 = Ocb3<Aes128, U8, U16>;
type OcbTag64 = Ocb3<Aes128, U4, U8>;

/// A 16-byte AES-128-OCB3 key. Zeroized on drop.
#[derive(Clone)]
pub struct SessionKey {
    bytes: [u8; PROTECTION_KEY_SIZE],
}

impl SessionKey {
    /// Build from exactly [`PROTECTION_KEY_SIZE`] bytes.
    pub fn from_bytes(bytes: [u8; PROTECTION_KEY_SIZE]) -> Self {
        Self { bytes }
    }

    /// Build from a slice, checking its length.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ProtectionError> {
        let bytes: [u8; PROTECTION_KEY_SIZE] =
            bytes.try_into().map_err(|_| ProtectionError::InvalidKeyLength {
                expected: PROTECTION_KEY_SIZE,
                actual: bytes.len(),
            })?;
        Ok(Self { bytes })
    }

    /// The raw key bytes.
    pub fn as_bytes(&self) -> &[u8; PROTECTION_KEY_SIZE] {
        &self.bytes
    }
}

impl Drop for SessionKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

fn check_nonce_len(algo: ProtectionAlgorithm, nonce: &[u8]) -> Result<(), ProtectionError> {
    let expected = algo
        .nonce_len()
        .ok_or(ProtectionError::InvalidNonceLength {
            expected: 0,
            actual: nonce.len(),
        })?;
    if nonce.len() != expected {
        return Err(ProtectionError::InvalidNonceLength {
            expected,
            actual: nonce.len(),
        });
    }
    Ok(())
}

/// Seal `plaintext` under `key`/`nonce`, authenticating `ad` alongside it.
/// Returns `ciphertext || tag`.
pub fn seal(
    algo: ProtectionAlgorithm,
    key: &SessionKey,
    nonce: &[u8],
    ad: &[u8],
    plaintext: &[u8],
) -> Result<Vec<u8>, ProtectionError> {
    check_nonce_len(algo, nonce)?;
    let payload = Payload { msg: plaintext, aad: ad };
    match algo {
        ProtectionAlgorithm::Aes128OcbTag128 => {
            let cipher = OcbTag128::new(GenericArray::from_slice(key.as_bytes()));
            cipher
                .encrypt(GenericArray::from_slice(nonce), payload)
                .map_err(|_| ProtectionError::SealFailed)
        }
        ProtectionAlgorithm::Aes128OcbTag64 => {
            let cipher = OcbTag64::new(GenericArray::from_slice(key.as_bytes()));
            cipher
                .encrypt(GenericArray::from_slice(nonce), payload)
                .map_err(|_| ProtectionError::SealFailed)
        }
        ProtectionAlgorithm::Private(_) => Err(ProtectionError::SealFailed),
    }
}

/// Open `ciphertext` (with trailing tag) under `key`/`nonce`, checking it
/// against `ad`. Constant-time on the tag comparison (delegated to the
/// `ocb3`/RustCrypto implementation).
pub fn open(
    algo: ProtectionAlgorithm,
    key: &SessionKey,
    nonce: &[u8],
    ad: &[u8],
    ciphertext: &[u8],
) -> Result<Vec<u8>, ProtectionError> {
    check_nonce_len(algo, nonce)?;
    let payload = Payload { msg: ciphertext, aad: ad };
    match algo {
        ProtectionAlgorithm::Aes128OcbTag128 => {
            let cipher = OcbTag128::new(GenericArray::from_slice(key.as_bytes()));
            cipher
                .decrypt(GenericArray::from_slice(nonce), payload)
                .map_err(|_| ProtectionError::AuthFailure)
        }
        ProtectionAlgorithm::Aes128OcbTag64 => {
            let cipher = OcbTag64::new(GenericArray::from_slice(key.as_bytes()));
            cipher
                .decrypt(GenericArray::from_slice(nonce), payload)
                .map_err(|_| ProtectionError::AuthFailure)
        }
        ProtectionAlgorithm::Private(_) => Err(ProtectionError::AuthFailure),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seals_and_opens_tag64() {
        let key = SessionKey::from_bytes([0x11; PROTECTION_KEY_SIZE]);
        let nonce = [0u8, 0, 0, 1];
        let ad = b"header-bytes";
        let plaintext = b"seq+body";

        let sealed = seal(ProtectionAlgorithm::Aes128OcbTag64, &key, &nonce, ad, plaintext).unwrap();
        let opened = open(ProtectionAlgorithm::Aes128OcbTag64, &key, &nonce, ad, &sealed).unwrap();
        assert_eq!(opened, plaintext);
    }

    #[test]
    fn seals_and_opens_tag128() {
        let key = SessionKey::from_bytes([0x22; PROTECTION_KEY_SIZE]);
        let nonce = [0u8; 8];
        let ad = b"header-bytes";
        let plaintext = b"seq+body";

        let sealed = seal(ProtectionAlgorithm::Aes128OcbTag128, &key, &nonce, ad, plaintext).unwrap();
        let opened = open(ProtectionAlgorithm::Aes128OcbTag128, &key, &nonce, ad, &sealed).unwrap();
        assert_eq!(opened, plaintext);
    }

    #[test]
    fn wrong_ad_fails_auth() {
        let key = SessionKey::from_bytes([0x33; PROTECTION_KEY_SIZE]);
        let nonce = [0u8, 0, 0, 1];
        let sealed = seal(ProtectionAlgorithm::Aes128OcbTag64, &key, &nonce, b"ad-a", b"msg").unwrap();
        let result = open(ProtectionAlgorithm::Aes128OcbTag64, &key, &nonce, b"ad-b", &sealed);
        assert!(matches!(result, Err(ProtectionError::AuthFailure)));
    }

    #[test]
    fn corrupted_ciphertext_fails_auth() {
        let key = SessionKey::from_bytes([0x44; PROTECTION_KEY_SIZE]);
        let nonce = [0u8, 0, 0, 1];
        let mut sealed = seal(ProtectionAlgorithm::Aes128OcbTag64, &key, &nonce, b"ad", b"msg").unwrap();
        sealed[0] ^= 0xFF;
        let result = open(ProtectionAlgorithm::Aes128OcbTag64, &key, &nonce, b"ad", &sealed);
        assert!(matches!(result, Err(ProtectionError::AuthFailure)));
    }

    #[test]
    fn rejects_wrong_nonce_length() {
        let key = SessionKey::from_bytes([0x55; PROTECTION_KEY_SIZE]);
        let result = seal(ProtectionAlgorithm::Aes128OcbTag64, &key, &[0u8; 8], b"ad", b"msg");
        assert!(matches!(result, Err(ProtectionError::InvalidNonceLength { .. })));
    }
}
