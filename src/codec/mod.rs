//! Bit/byte framing and message (de)serialization (C1).
//!
//! Three layers, innermost first: [`bitstream`] turns a byte buffer into the
//! OOK-PWM symbol stream (and back), [`wire`] has the packed-field and
//! discriminated-union primitives, and [`header`]/[`message`] build the
//! actual header and body types on top of those primitives. [`frame`] ties a
//! header to its bodies and exposes the associated-data view the protection
//! layer needs.

pub mod bitstream;
pub mod frame;
pub mod header;
pub mod message;
pub mod wire;

pub use bitstream::{decode_symbols, encode_symbols, Symbol};
pub use frame::Frame;
pub use header::{EncryptedHeader, ProtectionHeader, UnencryptedHeader};
pub use message::{ActBody, BindBody, BoundBody, ConfigureBody, HelloBody, Message, UnbindBody};
pub use wire::TlvElement;
