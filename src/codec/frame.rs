//! [`Frame`]: a header plus its unencrypted and (optional) encrypted bodies.

use super::header::UnencryptedHeader;
use super::wire::pack_version_type;
use crate::core::CodecError;

/// A complete logical frame: the common header, the message-specific
/// plaintext body, and — for every type but `HELLO` — an opaque encrypted
/// payload (ciphertext || tag) the protection layer produced or will open.
///
/// `Frame` itself never encrypts or decrypts; it only knows how to lay out
/// bytes on the wire and how to build the associated-data view the AEAD
/// call needs (spec.md §4.2: the unencrypted header and body, with the
/// header's `nonce` field treated as zero-length).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// The common header.
    pub header: UnencryptedHeader,
    /// The message-specific plaintext body (empty for most types).
    pub unencrypted_body: Vec<u8>,
    /// Ciphertext || tag, or `None` for `HELLO` (plaintext-only).
    pub encrypted_payload: Option<Vec<u8>>,
}

impl Frame {
    /// Build a frame from its parts.
    pub fn new(
        header: UnencryptedHeader,
        unencrypted_body: Vec<u8>,
        encrypted_payload: Option<Vec<u8>>,
    ) -> Self {
        Self {
            header,
            unencrypted_body,
            encrypted_payload,
        }
    }

    /// The associated data an AEAD `seal`/`open` call covers: the header
    /// (with the nonce spliced out) followed by the unencrypted body, in
    /// their wire order.
    pub fn associated_data(&self) -> Vec<u8> {
        let mut ad = Vec::with_capacity(1 + 4 + 1 + self.unencrypted_body.len());
        ad.push(pack_version_type(self.header.version, self.header.msg_type));
        ad.extend_from_slice(&self.header.session_id.to_be_bytes());
        ad.push(self.header.protection.algorithm);
        ad.extend_from_slice(&self.unencrypted_body);
        ad
    }

    /// Total wire size.
    pub fn wire_size(&self) -> usize {
        self.header.wire_size()
            + self.unencrypted_body.len()
            + self.encrypted_payload.as_ref().map_or(0, Vec::len)
    }

    /// Encode to a freshly allocated buffer.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.wire_size());
        buf.extend_from_slice(&self.header.encode());
        buf.extend_from_slice(&self.unencrypted_body);
        if let Some(payload) = &self.encrypted_payload {
            buf.extend_from_slice(payload);
        }
        buf
    }

    /// Decode just the header from the front of `data`, returning the
    /// header and the bytes consumed. Callers dispatch on
    /// `header.msg_type` to know how many further bytes form the
    /// unencrypted body before the encrypted payload begins.
    pub fn decode_header(data: &[u8]) -> Result<(UnencryptedHeader, usize), CodecError> {
        UnencryptedHeader::decode(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::header::ProtectionHeader;
    use crate::core::{MSG_TYPE_BIND, PROTECTION_AES128_OCB_TAG64, PROTOCOL_VERSION};

    fn sample_header() -> UnencryptedHeader {
        UnencryptedHeader {
            version: PROTOCOL_VERSION,
            msg_type: MSG_TYPE_BIND,
            session_id: 0x1122_3344,
            protection: ProtectionHeader {
                algorithm: PROTECTION_AES128_OCB_TAG64,
                nonce: vec![0, 0, 0, 1],
            },
        }
    }

    #[test]
    fn round_trips_header_and_bodies() {
        let frame = Frame::new(sample_header(), vec![PROTECTION_AES128_OCB_TAG64], Some(vec![0xAA; 12]));
        let encoded = frame.encode();
        let (header, consumed) = Frame::decode_header(&encoded).unwrap();
        assert_eq!(header, frame.header);
        let rest = &encoded[consumed..];
        assert_eq!(&rest[..1], &[PROTECTION_AES128_OCB_TAG64]);
        assert_eq!(&rest[1..], &[0xAAu8; 12]);
    }

    #[test]
    fn associated_data_splices_out_the_nonce() {
        let frame = Frame::new(sample_header(), vec![PROTECTION_AES128_OCB_TAG64], None);
        let ad = frame.associated_data();
        // version/type byte + session_id(4) + algorithm(1) + unencrypted_body(1), no nonce.
        assert_eq!(ad.len(), 1 + 4 + 1 + 1);
        assert!(!ad
            .windows(4)
            .any(|w| w == frame.header.protection.nonce.as_slice()));
    }
}
