//! Binds [`super::aead`] to [`crate::codec::Frame`]: build a sealed frame
//! from a plaintext body, or recover the plaintext body from a received
//! one.
//!
//! Both [`TransmitterFsm`](crate::transmitter::TransmitterFsm) and
//! [`ReceiverFsm`](crate::receiver::ReceiverFsm) go through these two
//! functions rather than calling [`super::aead::seal`]/[`super::aead::open`]
//! directly, so the associated-data view (spec.md §4.2: header and
//! unencrypted body with the nonce spliced out) is only assembled in one
//! place.

use crate::codec::{Frame, ProtectionHeader, UnencryptedHeader};
use crate::core::{CodecError, ProtectionError, PROTOCOL_VERSION};

use super::algorithm::ProtectionAlgorithm;
use super::aead::{open, seal, SessionKey};

/// Seal `plaintext` into a complete [`Frame`] addressed to `session_id`,
/// under `algorithm`/`key`/`nonce`, with `unencrypted_body` carried in the
/// clear alongside the header.
pub fn seal_frame(
    msg_type: u8,
    session_id: u32,
    algorithm: ProtectionAlgorithm,
    key: &SessionKey,
    nonce: Vec<u8>,
    unencrypted_body: Vec<u8>,
    plaintext: &[u8],
) -> Result<Frame, ProtectionError> {
    let header = UnencryptedHeader {
        version: PROTOCOL_VERSION,
        msg_type,
        session_id,
        protection: ProtectionHeader {
            algorithm: algorithm.id(),
            nonce,
        },
    };
    let ad_frame = Frame::new(header.clone(), unencrypted_body.clone(), None);
    let ad = ad_frame.associated_data();
    let ciphertext = seal(algorithm, key, &ad_frame.header.protection.nonce, &ad, plaintext)?;
    Ok(Frame::new(header, unencrypted_body, Some(ciphertext)))
}

/// Recover the plaintext sealed inside `frame` under `algorithm`/`key`.
///
/// Returns [`ProtectionError::AuthFailure`] both when the tag fails to
/// verify and when `frame` has no encrypted payload at all (a caller
/// should never reach here for a `HELLO`).
pub fn open_frame(
    frame: &Frame,
    algorithm: ProtectionAlgorithm,
    key: &SessionKey,
) -> Result<Vec<u8>, ProtectionError> {
    let ciphertext = frame
        .encrypted_payload
        .as_deref()
        .ok_or(ProtectionError::AuthFailure)?;
    let ad = frame.associated_data();
    open(algorithm, key, &frame.header.protection.nonce, &ad, ciphertext)
}

/// Decode just the frame header from raw bus bytes, mapping an unsupported
/// [`ProtectionAlgorithm`] to [`CodecError::UnknownTag`] the same as any
/// other unrecognised discriminant.
pub fn decode_header(data: &[u8]) -> Result<(UnencryptedHeader, usize), CodecError> {
    Frame::decode_header(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MSG_TYPE_ACT;

    #[test]
    fn seal_then_open_round_trips() {
        let key = SessionKey::from_bytes([0x42; 16]);
        let algo = ProtectionAlgorithm::Aes128OcbTag64;
        let nonce = vec![0, 0, 0, 1];
        let plaintext = b"seq-and-body".to_vec();

        let frame = seal_frame(MSG_TYPE_ACT, 0x1122_3344, algo, &key, nonce, Vec::new(), &plaintext)
            .unwrap();
        let opened = open_frame(&frame, algo, &key).unwrap();
        assert_eq!(opened, plaintext);
    }

    #[test]
    fn wrong_key_fails_to_open() {
        let key = SessionKey::from_bytes([0x11; 16]);
        let other = SessionKey::from_bytes([0x22; 16]);
        let algo = ProtectionAlgorithm::Aes128OcbTag64;
        let frame = seal_frame(MSG_TYPE_ACT, 1, algo, &key, vec![0; 4], Vec::new(), b"x").unwrap();
        assert!(open_frame(&frame, algo, &other).is_err());
    }
}
