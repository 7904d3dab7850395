//! NDEF framing and tag transports for battag.
//!
//! Battery records travel as the text of the first NDEF record on a tag.
//! This crate covers the layers between that text and raw tag memory:
//!
//! - [`text`]: RTD Text payloads (`[status][lang][text]`)
//! - [`record`]: NDEF records and messages
//! - [`tlv`]: the Type 2 / MIFARE TLV container holding the message
//! - [`TagTransport`]: read or write the whole text in one exchange
//!
//! # Example
//!
//! ```
//! use battag_ndef::{MemoryTag, TagTransport};
//!
//! let mut tag = MemoryTag::new(720);
//! tag.write_text(r#"{"sn":"A0000"}"#).unwrap();
//! assert_eq!(tag.read_text().unwrap(), r#"{"sn":"A0000"}"#);
//! ```

mod error;
pub mod record;
pub mod text;
pub mod tlv;
mod transport;

pub use error::{Result, TagError};
pub use record::{NdefMessage, NdefRecord, Tnf};
pub use transport::{
    decode_user_area, encode_user_area, framed_len, ImageTag, MemoryTag, TagTransport,
    DEFAULT_CAPACITY, DEFAULT_LANGUAGE,
};
