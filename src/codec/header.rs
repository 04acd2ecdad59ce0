//! The unencrypted and encrypted headers of a [`super::Frame`].

use crate::core::{CodecError, PROTECTION_AES128_OCB_TAG128, PROTECTION_AES128_OCB_TAG64};

use super::wire::{pack_version_type, unpack_version_type};

/// The protection algorithm discriminant plus its nonce, as carried
/// unencrypted in every frame's header (spec.md §3/§6). This union is
/// *implicit*, not extensible: an algorithm id this implementation does not
/// recognise cannot be decoded, because the nonce width it implies is
/// unknown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectionHeader {
    /// `AEAD_AES_128_OCB_TAGLEN128 = 20`, `AEAD_AES_128_OCB_TAGLEN64 = 22`,
    /// or a private-use value ≥128.
    pub algorithm: u8,
    /// 8 bytes for the tag-128 variant, 4 bytes for tag-64.
    pub nonce: Vec<u8>,
}

impl ProtectionHeader {
    /// The nonce width this implementation knows for a given algorithm id,
    /// or `None` if the id is unrecognised (private use or invalid).
    pub fn nonce_len_for_algorithm(algorithm: u8) -> Option<usize> {
        match algorithm {
            PROTECTION_AES128_OCB_TAG128 => Some(8),
            PROTECTION_AES128_OCB_TAG64 => Some(4),
            _ => None,
        }
    }

    /// Total wire size: one algorithm byte plus the nonce.
    pub fn wire_size(&self) -> usize {
        1 + self.nonce.len()
    }

    /// Encode to a freshly allocated buffer.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.wire_size());
        buf.push(self.algorithm);
        buf.extend_from_slice(&self.nonce);
        buf
    }

    /// Decode one protection header, returning it and the bytes consumed.
    pub fn decode(data: &[u8]) -> Result<(Self, usize), CodecError> {
        let algorithm = *data.first().ok_or(CodecError::Truncated {
            expected: 1,
            actual: 0,
        })?;
        let nonce_len = Self::nonce_len_for_algorithm(algorithm)
            .ok_or(CodecError::UnknownTag(algorithm))?;
        if data.len() < 1 + nonce_len {
            return Err(CodecError::Truncated {
                expected: 1 + nonce_len,
                actual: data.len(),
            });
        }
        let nonce = data[1..1 + nonce_len].to_vec();
        Ok((Self { algorithm, nonce }, 1 + nonce_len))
    }
}

/// The fixed-layout part of every frame: `version(4) | type(4) |
/// session_id(32) | protection_union` (spec.md §3/§6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnencryptedHeader {
    /// Always [`crate::core::PROTOCOL_VERSION`] for frames this
    /// implementation produces.
    pub version: u8,
    /// One of the `MSG_TYPE_*` constants.
    pub msg_type: u8,
    /// The receiver-chosen session identifier, plaintext (spec.md §4.5).
    pub session_id: u32,
    /// Protection algorithm and nonce for this frame.
    pub protection: ProtectionHeader,
}

impl UnencryptedHeader {
    /// Total wire size.
    pub fn wire_size(&self) -> usize {
        1 + 4 + self.protection.wire_size()
    }

    /// Encode to a freshly allocated buffer.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.wire_size());
        buf.push(pack_version_type(self.version, self.msg_type));
        buf.extend_from_slice(&self.session_id.to_be_bytes());
        buf.extend_from_slice(&self.protection.encode());
        buf
    }

    /// Decode one header, returning it and the bytes consumed.
    ///
    /// Per spec.md §3 Invariant 1, a mismatched `version` is reported as
    /// [`CodecError::UnsupportedVersion`] rather than silently accepted.
    pub fn decode(data: &[u8]) -> Result<(Self, usize), CodecError> {
        if data.len() < 5 {
            return Err(CodecError::Truncated {
                expected: 5,
                actual: data.len(),
            });
        }
        let (version, msg_type) = unpack_version_type(data[0]);
        if version != crate::core::PROTOCOL_VERSION {
            return Err(CodecError::UnsupportedVersion(version));
        }
        let session_id = u32::from_be_bytes(data[1..5].try_into().expect("length checked above"));
        let (protection, protection_len) = ProtectionHeader::decode(&data[5..])?;
        Ok((
            Self {
                version,
                msg_type,
                session_id,
                protection,
            },
            5 + protection_len,
        ))
    }
}

/// The header carried inside the AEAD plaintext: just the sequence number
/// (spec.md §3/§6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncryptedHeader {
    /// Strictly increasing per session; replay defense keys off this.
    pub sequence_number: u32,
}

impl EncryptedHeader {
    /// Wire size: always 4 bytes.
    pub const WIRE_SIZE: usize = 4;

    /// Encode to a freshly allocated buffer.
    pub fn encode(&self) -> Vec<u8> {
        self.sequence_number.to_be_bytes().to_vec()
    }

    /// Decode from the front of `data`, returning the header and the bytes
    /// consumed.
    pub fn decode(data: &[u8]) -> Result<(Self, usize), CodecError> {
        if data.len() < Self::WIRE_SIZE {
            return Err(CodecError::Truncated {
                expected: Self::WIRE_SIZE,
                actual: data.len(),
            });
        }
        let sequence_number =
            u32::from_be_bytes(data[..Self::WIRE_SIZE].try_into().expect("checked above"));
        Ok((Self { sequence_number }, Self::WIRE_SIZE))
    }
}
