//! Per-message-type bodies (spec.md §6).
//!
//! Version 1's message catalog is a closed sum type: [`Message`] enumerates
//! every legal `(type, body)` pairing. `HELLO`/`UNBIND`/`CONFIGURE`/`BOUND`
//! are simple enough to encode/decode directly; `BIND` and `ACT` get the
//! full `encode`/`encode_into`/`decode`/`decode_with_length` quadruplet
//! because callers reach for buffer-reuse on those two in the hot path.

use crate::core::{
    CodecError, MSG_TYPE_ACT, MSG_TYPE_BIND, MSG_TYPE_BOUND, MSG_TYPE_CONFIGURE, MSG_TYPE_HELLO,
    MSG_TYPE_UNBIND, PROTECTION_KEY_SIZE, TRANSMITTER_ID_SIZE,
};

use super::wire::{decode_u8_list, encode_u8_list, TlvElement};

/// `HELLO` (private, receiver→transmitter, plaintext only).
///
/// spec.md §6's wire listing for HELLO names only the two candidate lists,
/// but §3 Invariant 5 requires HELLO to carry "an unencrypted freshly-
/// minted candidate session key" — the two sections describe the same
/// message, so the key is encoded here as a fixed 16-byte trailer after
/// the lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelloBody {
    /// Candidate protection algorithms, most preferred first.
    pub protection_algorithms: Vec<u8>,
    /// Interface types the receiver can actuate.
    pub interfaces: Vec<u8>,
    /// The freshly-minted candidate session key.
    pub session_key: [u8; PROTECTION_KEY_SIZE],
}

impl HelloBody {
    /// Encode to a freshly allocated buffer.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = encode_u8_list(&self.protection_algorithms);
        buf.extend_from_slice(&encode_u8_list(&self.interfaces));
        buf.extend_from_slice(&self.session_key);
        buf
    }

    /// Decode from the front of `data`, returning the body and bytes
    /// consumed.
    pub fn decode(data: &[u8]) -> Result<(Self, usize), CodecError> {
        let (protection_algorithms, n1) = decode_u8_list(data)?;
        let (interfaces, n2) = decode_u8_list(&data[n1..])?;
        let rest = &data[n1 + n2..];
        if rest.len() < PROTECTION_KEY_SIZE {
            return Err(CodecError::Truncated {
                expected: PROTECTION_KEY_SIZE,
                actual: rest.len(),
            });
        }
        let session_key: [u8; PROTECTION_KEY_SIZE] = rest[..PROTECTION_KEY_SIZE]
            .try_into()
            .expect("length checked above");
        Ok((
            Self {
                protection_algorithms,
                interfaces,
                session_key,
            },
            n1 + n2 + PROTECTION_KEY_SIZE,
        ))
    }
}

/// `BIND` (public, transmitter→receiver): a plaintext algorithm echo plus
/// an encrypted identity/capability body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindBody {
    /// Echoes the algorithm the transmitter adopted from HELLO; must match
    /// the frame header's own `protection.algorithm`.
    pub protection_algorithm_type: u8,
    /// The transmitter's persistent identifier (never sent in the clear
    /// elsewhere, per spec.md §1's "no plaintext transmitter identifier"
    /// non-goal — this field lives only inside the encrypted body).
    pub transmitter_id: [u8; TRANSMITTER_ID_SIZE],
    /// Interfaces the transmitter and receiver both support, intersected.
    pub interface_types: Vec<u8>,
}

impl BindBody {
    /// Wire size of the encrypted half (`transmitter_id` + interface list).
    pub fn encrypted_wire_size(&self) -> usize {
        TRANSMITTER_ID_SIZE + 1 + self.interface_types.len()
    }

    /// Encode the plaintext half: just `protection_algorithm_type`.
    pub fn encode_unencrypted(&self) -> Vec<u8> {
        vec![self.protection_algorithm_type]
    }

    /// Encode the half that gets sealed under AEAD.
    pub fn encode_encrypted(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.encrypted_wire_size());
        buf.extend_from_slice(&self.transmitter_id);
        buf.extend_from_slice(&encode_u8_list(&self.interface_types));
        buf
    }

    /// Write the encrypted half into `buf`, returning bytes written.
    pub fn encode_encrypted_into(&self, buf: &mut [u8]) -> Result<usize, CodecError> {
        let size = self.encrypted_wire_size();
        if buf.len() < size {
            return Err(CodecError::BufferTooSmall {
                needed: size,
                available: buf.len(),
            });
        }
        let encoded = self.encode_encrypted();
        buf[..size].copy_from_slice(&encoded);
        Ok(size)
    }

    /// Decode the plaintext half, returning the algorithm id and bytes
    /// consumed.
    pub fn decode_unencrypted(data: &[u8]) -> Result<(u8, usize), CodecError> {
        let byte = *data.first().ok_or(CodecError::Truncated {
            expected: 1,
            actual: 0,
        })?;
        Ok((byte, 1))
    }

    /// Decode the encrypted half (the already-opened plaintext) given the
    /// algorithm id recovered from [`Self::decode_unencrypted`].
    pub fn decode_encrypted(
        protection_algorithm_type: u8,
        data: &[u8],
    ) -> Result<(Self, usize), CodecError> {
        if data.len() < TRANSMITTER_ID_SIZE {
            return Err(CodecError::Truncated {
                expected: TRANSMITTER_ID_SIZE,
                actual: data.len(),
            });
        }
        let transmitter_id: [u8; TRANSMITTER_ID_SIZE] = data[..TRANSMITTER_ID_SIZE]
            .try_into()
            .expect("length checked above");
        let (interface_types, n) = decode_u8_list(&data[TRANSMITTER_ID_SIZE..])?;
        Ok((
            Self {
                protection_algorithm_type,
                transmitter_id,
                interface_types,
            },
            TRANSMITTER_ID_SIZE + n,
        ))
    }

    /// Decode both halves at once, returning the body and the encrypted
    /// bytes consumed (the plaintext half is always exactly one byte and is
    /// not counted here, since it lives in a different part of the frame).
    pub fn decode_with_length(
        unencrypted: &[u8],
        encrypted: &[u8],
    ) -> Result<(Self, usize), CodecError> {
        let (algo, _) = Self::decode_unencrypted(unencrypted)?;
        Self::decode_encrypted(algo, encrypted)
    }
}

/// `UNBIND` (public, encrypted, empty body).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UnbindBody;

impl UnbindBody {
    /// Always empty.
    pub fn encode(&self) -> Vec<u8> {
        Vec::new()
    }

    /// Always succeeds; `UNBIND` carries no body to validate.
    pub fn decode(_data: &[u8]) -> Result<(Self, usize), CodecError> {
        Ok((Self, 0))
    }
}

/// `CONFIGURE` (public, encrypted, empty body).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConfigureBody;

impl ConfigureBody {
    /// Always empty.
    pub fn encode(&self) -> Vec<u8> {
        Vec::new()
    }

    /// Always succeeds; `CONFIGURE` carries no body to validate.
    pub fn decode(_data: &[u8]) -> Result<(Self, usize), CodecError> {
        Ok((Self, 0))
    }
}

/// `BOUND` (private, receiver→transmitter, encrypted, empty body).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BoundBody;

impl BoundBody {
    /// Always empty.
    pub fn encode(&self) -> Vec<u8> {
        Vec::new()
    }

    /// Always succeeds; `BOUND` carries no body to validate.
    pub fn decode(_data: &[u8]) -> Result<(Self, usize), CodecError> {
        Ok((Self, 0))
    }
}

/// `ACT` (public, encrypted): an interface descriptor plus its parameters.
///
/// The parameters union is extensible (spec.md §3's "Interface descriptor"):
/// an `interface` this implementation doesn't recognise still decodes, with
/// its parameter bytes preserved opaquely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActBody {
    inner: TlvElement,
}

impl ActBody {
    /// Build from an interface code and its parameter bytes.
    pub fn new(interface: u8, parameters: Vec<u8>) -> Self {
        Self {
            inner: TlvElement::new(interface, parameters),
        }
    }

    /// The interface descriptor's wire code.
    pub fn interface(&self) -> u8 {
        self.inner.tag
    }

    /// The interface-specific parameter bytes.
    pub fn parameters(&self) -> &[u8] {
        &self.inner.data
    }

    /// Wire size.
    pub fn wire_size(&self) -> usize {
        self.inner.wire_size()
    }

    /// Encode to a freshly allocated buffer.
    pub fn encode(&self) -> Vec<u8> {
        self.inner.encode()
    }

    /// Write into `buf`, returning bytes written.
    pub fn encode_into(&self, buf: &mut [u8]) -> Result<usize, CodecError> {
        let size = self.wire_size();
        if buf.len() < size {
            return Err(CodecError::BufferTooSmall {
                needed: size,
                available: buf.len(),
            });
        }
        buf[..size].copy_from_slice(&self.encode());
        Ok(size)
    }

    /// Decode from the front of `data`.
    pub fn decode(data: &[u8]) -> Result<Self, CodecError> {
        let (inner, _) = TlvElement::decode_with_length(data)?;
        Ok(Self { inner })
    }

    /// Decode from the front of `data`, returning the body and bytes
    /// consumed.
    pub fn decode_with_length(data: &[u8]) -> Result<(Self, usize), CodecError> {
        let (inner, consumed) = TlvElement::decode_with_length(data)?;
        Ok((Self { inner }, consumed))
    }
}

/// The closed sum of all version-1 message bodies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// `HELLO`.
    Hello(HelloBody),
    /// `BIND`.
    Bind(BindBody),
    /// `UNBIND`.
    Unbind(UnbindBody),
    /// `CONFIGURE`.
    Configure(ConfigureBody),
    /// `ACT`.
    Act(ActBody),
    /// `BOUND`.
    Bound(BoundBody),
}

impl Message {
    /// The `MSG_TYPE_*` constant this variant carries.
    pub fn msg_type(&self) -> u8 {
        match self {
            Message::Hello(_) => MSG_TYPE_HELLO,
            Message::Bind(_) => MSG_TYPE_BIND,
            Message::Unbind(_) => MSG_TYPE_UNBIND,
            Message::Configure(_) => MSG_TYPE_CONFIGURE,
            Message::Act(_) => MSG_TYPE_ACT,
            Message::Bound(_) => MSG_TYPE_BOUND,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hello_round_trips() {
        let body = HelloBody {
            protection_algorithms: vec![22],
            interfaces: vec![1],
            session_key: [0x77; 16],
        };
        let encoded = body.encode();
        let (decoded, consumed) = HelloBody::decode(&encoded).unwrap();
        assert_eq!(decoded, body);
        assert_eq!(consumed, encoded.len());
    }

    #[test]
    fn bind_round_trips() {
        let body = BindBody {
            protection_algorithm_type: 22,
            transmitter_id: [0xA1, 0xA2, 0xA3, 0xA4, 0xA5, 0xA6, 0xA7, 0xA8],
            interface_types: vec![1],
        };
        let unencrypted = body.encode_unencrypted();
        let encrypted = body.encode_encrypted();
        let (decoded, consumed) = BindBody::decode_with_length(&unencrypted, &encrypted).unwrap();
        assert_eq!(decoded, body);
        assert_eq!(consumed, encrypted.len());
    }

    #[test]
    fn empty_bodies_round_trip() {
        assert_eq!(UnbindBody::decode(&UnbindBody.encode()).unwrap(), (UnbindBody, 0));
        assert_eq!(
            ConfigureBody::decode(&ConfigureBody.encode()).unwrap(),
            (ConfigureBody, 0)
        );
        assert_eq!(BoundBody::decode(&BoundBody.encode()).unwrap(), (BoundBody, 0));
    }

    #[test]
    fn act_round_trips() {
        let body = ActBody::new(1, Vec::new());
        let encoded = body.encode();
        let (decoded, consumed) = ActBody::decode_with_length(&encoded).unwrap();
        assert_eq!(decoded, body);
        assert_eq!(consumed, encoded.len());
    }

    #[test]
    fn act_preserves_unknown_interface_parameters() {
        let body = ActBody::new(200, vec![9, 9, 9]);
        let encoded = body.encode();
        let decoded = ActBody::decode(&encoded).unwrap();
        assert_eq!(decoded.interface(), 200);
        assert_eq!(decoded.parameters(), &[9, 9, 9]);
    }
}
