//! The registered protection algorithm ids (spec.md §3).

use crate::core::{PROTECTION_AES128_OCB_TAG128, PROTECTION_AES128_OCB_TAG64};

/// AES-128-OCB3 per RFC 7253, in one of its two registered tag lengths, or
/// a private-use id this implementation does not interpret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtectionAlgorithm {
    /// `AEAD_AES_128_OCB_TAGLEN128 = 20`: 8-byte nonce, 16-byte tag.
    Aes128OcbTag128,
    /// `AEAD_AES_128_OCB_TAGLEN64 = 22`: 4-byte nonce, 8-byte tag.
    Aes128OcbTag64,
    /// An id ≥128 this implementation does not know how to use.
    Private(u8),
}

impl ProtectionAlgorithm {
    /// The wire id for this algorithm.
    pub fn id(self) -> u8 {
        match self {
            ProtectionAlgorithm::Aes128OcbTag128 => PROTECTION_AES128_OCB_TAG128,
            ProtectionAlgorithm::Aes128OcbTag64 => PROTECTION_AES128_OCB_TAG64,
            ProtectionAlgorithm::Private(id) => id,
        }
    }

    /// Decode a wire id into a known algorithm, or `Private` if unrecognised.
    pub fn from_id(id: u8) -> Self {
        match id {
            PROTECTION_AES128_OCB_TAG128 => ProtectionAlgorithm::Aes128OcbTag128,
            PROTECTION_AES128_OCB_TAG64 => ProtectionAlgorithm::Aes128OcbTag64,
            other => ProtectionAlgorithm::Private(other),
        }
    }

    /// Nonce width in bytes, or `None` for a private-use id this
    /// implementation cannot drive.
    pub fn nonce_len(self) -> Option<usize> {
        match self {
            ProtectionAlgorithm::Aes128OcbTag128 => Some(8),
            ProtectionAlgorithm::Aes128OcbTag64 => Some(4),
            ProtectionAlgorithm::Private(_) => None,
        }
    }

    /// Tag width in bytes, or `None` for a private-use id.
    pub fn tag_len(self) -> Option<usize> {
        match self {
            ProtectionAlgorithm::Aes128OcbTag128 => Some(16),
            ProtectionAlgorithm::Aes128OcbTag64 => Some(8),
            ProtectionAlgorithm::Private(_) => None,
        }
    }

    /// Whether this implementation can actually seal/open under this
    /// algorithm.
    pub fn is_supported(self) -> bool {
        !matches!(self, ProtectionAlgorithm::Private(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_known_ids() {
        for algo in [
            ProtectionAlgorithm::Aes128OcbTag128,
            ProtectionAlgorithm::Aes128OcbTag64,
        ] {
            assert_eq!(ProtectionAlgorithm::from_id(algo.id()), algo);
            assert!(algo.is_supported());
        }
    }

    #[test]
    fn private_use_is_unsupported() {
        let algo = ProtectionAlgorithm::from_id(200);
        assert_eq!(algo, ProtectionAlgorithm::Private(200));
        assert!(!algo.is_supported());
        assert_eq!(algo.nonce_len(), None);
    }
}
