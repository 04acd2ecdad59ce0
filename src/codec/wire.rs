//! Packed-field primitives shared by [`super::header`] and [`super::message`].

use crate::core::CodecError;

/// Pack a 4-bit version and a 4-bit message type into one byte, MSB-first.
pub fn pack_version_type(version: u8, msg_type: u8) -> u8 {
    ((version & 0x0F) << 4) | (msg_type & 0x0F)
}

/// Reverse of [`pack_version_type`].
pub fn unpack_version_type(byte: u8) -> (u8, u8) {
    (byte >> 4, byte & 0x0F)
}

/// Encode a list of bytes prefixed by a one-byte count, per spec.md §6's
/// `list<u8 count>` convention. Panics if `items.len() > u8::MAX as usize`;
/// callers own lists bounded well below that by construction.
pub fn encode_u8_list(items: &[u8]) -> Vec<u8> {
    assert!(items.len() <= u8::MAX as usize, "list too long for u8 count");
    let mut buf = Vec::with_capacity(1 + items.len());
    buf.push(items.len() as u8);
    buf.extend_from_slice(items);
    buf
}

/// Decode a [`encode_u8_list`]-framed list, returning the items and the
/// number of bytes consumed.
pub fn decode_u8_list(data: &[u8]) -> Result<(Vec<u8>, usize), CodecError> {
    let count = *data.first().ok_or(CodecError::Truncated {
        expected: 1,
        actual: 0,
    })? as usize;
    if data.len() < 1 + count {
        return Err(CodecError::Truncated {
            expected: 1 + count,
            actual: data.len(),
        });
    }
    Ok((data[1..1 + count].to_vec(), 1 + count))
}

/// A tag + byte-length-prefixed element of an *extensible* discriminated
/// union (spec.md §4.1): unrecognised tags are still skippable because the
/// length is always present, unlike the protection algorithm union in
/// [`super::header::ProtectionHeader`], which is implicit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlvElement {
    /// The discriminant.
    pub tag: u8,
    /// The variant's body.
    pub data: Vec<u8>,
}

/// Header size of an encoded [`TlvElement`]: one tag byte, one length byte.
pub const TLV_HEADER_SIZE: usize = 2;

impl TlvElement {
    /// Build a new element.
    pub fn new(tag: u8, data: Vec<u8>) -> Self {
        Self { tag, data }
    }

    /// Total wire size.
    pub fn wire_size(&self) -> usize {
        TLV_HEADER_SIZE + self.data.len()
    }

    /// Encode to a freshly allocated buffer.
    pub fn encode(&self) -> Vec<u8> {
        assert!(self.data.len() <= u8::MAX as usize, "TLV body too long");
        let mut buf = Vec::with_capacity(self.wire_size());
        buf.push(self.tag);
        buf.push(self.data.len() as u8);
        buf.extend_from_slice(&self.data);
        buf
    }

    /// Decode one element, returning it and the number of bytes consumed.
    /// Never errors on an unrecognised tag: callers that don't understand
    /// `tag` simply skip past `consumed` bytes, per the extensible-union
    /// rule in spec.md §4.1.
    pub fn decode_with_length(data: &[u8]) -> Result<(Self, usize), CodecError> {
        if data.len() < TLV_HEADER_SIZE {
            return Err(CodecError::Truncated {
                expected: TLV_HEADER_SIZE,
                actual: data.len(),
            });
        }
        let tag = data[0];
        let len = data[1] as usize;
        if data.len() < TLV_HEADER_SIZE + len {
            return Err(CodecError::Truncated {
                expected: TLV_HEADER_SIZE + len,
                actual: data.len(),
            });
        }
        let elem = TlvElement {
            tag,
            data: data[TLV_HEADER_SIZE..TLV_HEADER_SIZE + len].to_vec(),
        };
        Ok((elem, TLV_HEADER_SIZE + len))
    }
}
