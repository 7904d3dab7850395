//! TLV container used in tag user memory.
//!
//! ```text
//! 03 <len> <ndef message> FE          len < 0xFF
//! 03 FF <len hi> <len lo> <message> FE
//! ```

use crate::error::{Result, TagError};

pub const TLV_NULL: u8 = 0x00;
pub const TLV_NDEF: u8 = 0x03;
pub const TLV_TERMINATOR: u8 = 0xFE;

const LONG_LENGTH: u8 = 0xFF;

/// Wrap an encoded NDEF message in an NDEF TLV followed by a terminator.
pub fn wrap(message: &[u8]) -> Result<Vec<u8>> {
    let len = u16::try_from(message.len())
        .map_err(|_| TagError::Malformed("NDEF message longer than 65535 bytes"))?;

    let mut out = Vec::with_capacity(message.len() + 5);
    out.push(TLV_NDEF);
    if len < LONG_LENGTH as u16 {
        out.push(len as u8);
    } else {
        out.push(LONG_LENGTH);
        out.extend_from_slice(&len.to_be_bytes());
    }
    out.extend_from_slice(message);
    out.push(TLV_TERMINATOR);
    Ok(out)
}

/// Locate the value of the first NDEF TLV in `data`.
///
/// NULL TLVs are skipped, other TLVs are stepped over by their length and
/// the scan ends at a terminator.
pub fn find_ndef(data: &[u8]) -> Result<&[u8]> {
    let mut i = 0;
    while i < data.len() {
        let tag = data[i];
        match tag {
            TLV_NULL => {
                i += 1;
                continue;
            }
            TLV_TERMINATOR => break,
            _ => {}
        }

        let (len, header) = match data.get(i + 1) {
            None => break,
            Some(&LONG_LENGTH) => match (data.get(i + 2), data.get(i + 3)) {
                (Some(&hi), Some(&lo)) => (u16::from_be_bytes([hi, lo]) as usize, 4),
                _ => return Err(TagError::Malformed("truncated TLV length")),
            },
            Some(&len) => (len as usize, 2),
        };

        let start = i + header;
        let end = start + len;
        if tag == TLV_NDEF {
            return data
                .get(start..end)
                .ok_or(TagError::Malformed("NDEF TLV runs past the end of tag data"));
        }
        i = end;
    }

    Err(TagError::Malformed("no NDEF TLV found"))
}
