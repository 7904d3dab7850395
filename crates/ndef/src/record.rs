//! NDEF records and messages.

use crate::error::{Result, TagError};
use crate::text;

const FLAG_MB: u8 = 0x80;
const FLAG_ME: u8 = 0x40;
const FLAG_CF: u8 = 0x20;
const FLAG_SR: u8 = 0x10;
const FLAG_IL: u8 = 0x08;
const TNF_MASK: u8 = 0x07;

const TEXT_TYPE: &[u8] = b"T";
const JSON_MIME: &str = "application/json";

/// Type Name Format of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Tnf {
    Empty = 0,
    WellKnown = 1,
    Media = 2,
    AbsoluteUri = 3,
    External = 4,
    Unknown = 5,
    Unchanged = 6,
    Reserved = 7,
}

impl From<u8> for Tnf {
    fn from(value: u8) -> Self {
        match value & TNF_MASK {
            0 => Tnf::Empty,
            1 => Tnf::WellKnown,
            2 => Tnf::Media,
            3 => Tnf::AbsoluteUri,
            4 => Tnf::External,
            5 => Tnf::Unknown,
            6 => Tnf::Unchanged,
            _ => Tnf::Reserved,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NdefRecord {
    pub tnf: Tnf,
    pub record_type: Vec<u8>,
    pub id: Vec<u8>,
    pub payload: Vec<u8>,
}

impl NdefRecord {
    /// Well-known Text record carrying UTF-8 `text`.
    pub fn text(text: &str, language: &str) -> Self {
        Self {
            tnf: Tnf::WellKnown,
            record_type: TEXT_TYPE.to_vec(),
            id: Vec::new(),
            payload: text::encode(text, language),
        }
    }

    /// MIME record, e.g. `application/json`.
    pub fn mime(media_type: &str, payload: &[u8]) -> Self {
        Self {
            tnf: Tnf::Media,
            record_type: media_type.as_bytes().to_vec(),
            id: Vec::new(),
            payload: payload.to_vec(),
        }
    }

    pub fn empty() -> Self {
        Self {
            tnf: Tnf::Empty,
            record_type: Vec::new(),
            id: Vec::new(),
            payload: Vec::new(),
        }
    }

    /// Text carried by a Text or JSON record.
    pub fn as_text(&self) -> Result<String> {
        match self.tnf {
            Tnf::WellKnown if self.record_type == TEXT_TYPE => Ok(text::decode(&self.payload).text),
            Tnf::Media if is_json_mime(&self.record_type) => {
                Ok(String::from_utf8_lossy(&self.payload).into_owned())
            }
            Tnf::Empty => Err(TagError::NoRecords),
            tnf => Err(TagError::UnsupportedRecord {
                tnf: tnf as u8,
                record_type: String::from_utf8_lossy(&self.record_type).into_owned(),
            }),
        }
    }

    fn encode_into(&self, out: &mut Vec<u8>, first: bool, last: bool) {
        let short = self.payload.len() < 256;
        let mut header = self.tnf as u8;
        if first {
            header |= FLAG_MB;
        }
        if last {
            header |= FLAG_ME;
        }
        if short {
            header |= FLAG_SR;
        }
        if !self.id.is_empty() {
            header |= FLAG_IL;
        }

        out.push(header);
        out.push(self.record_type.len() as u8);
        if short {
            out.push(self.payload.len() as u8);
        } else {
            out.extend_from_slice(&(self.payload.len() as u32).to_be_bytes());
        }
        if !self.id.is_empty() {
            out.push(self.id.len() as u8);
        }
        out.extend_from_slice(&self.record_type);
        out.extend_from_slice(&self.id);
        out.extend_from_slice(&self.payload);
    }

    /// Decode one record from the front of `bytes`, returning it with its
    /// header byte and the number of bytes consumed.
    fn decode(bytes: &[u8]) -> Result<(Self, u8, usize)> {
        let mut cursor = Cursor { bytes, pos: 0 };

        let header = cursor.byte("record header")?;
        if header & FLAG_CF != 0 {
            return Err(TagError::Malformed("chunked records are not supported"));
        }
        let type_len = cursor.byte("type length")? as usize;
        let payload_len = if header & FLAG_SR != 0 {
            cursor.byte("payload length")? as usize
        } else {
            let raw = cursor.take(4, "payload length")?;
            u32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]]) as usize
        };
        let id_len = if header & FLAG_IL != 0 {
            cursor.byte("id length")? as usize
        } else {
            0
        };

        let record_type = cursor.take(type_len, "record type")?.to_vec();
        let id = cursor.take(id_len, "record id")?.to_vec();
        let payload = cursor.take(payload_len, "record payload")?.to_vec();

        let record = Self {
            tnf: Tnf::from(header),
            record_type,
            id,
            payload,
        };
        Ok((record, header, cursor.pos))
    }
}

fn is_json_mime(record_type: &[u8]) -> bool {
    std::str::from_utf8(record_type)
        .map(|t| t.trim().eq_ignore_ascii_case(JSON_MIME))
        .unwrap_or(false)
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn byte(&mut self, what: &'static str) -> Result<u8> {
        Ok(self.take(1, what)?[0])
    }

    fn take(&mut self, len: usize, what: &'static str) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.bytes.len())
            .ok_or(TagError::Malformed(what))?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }
}

/// An ordered list of records. The first carries MB, the last ME.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NdefMessage {
    pub records: Vec<NdefRecord>,
}

impl NdefMessage {
    pub fn new(records: Vec<NdefRecord>) -> Self {
        Self { records }
    }

    pub fn single(record: NdefRecord) -> Self {
        Self {
            records: vec![record],
        }
    }

    /// An empty message still encodes as one empty record (`D0 00 00`).
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        if self.records.is_empty() {
            NdefRecord::empty().encode_into(&mut out, true, true);
            return out;
        }

        let last = self.records.len() - 1;
        for (index, record) in self.records.iter().enumerate() {
            record.encode_into(&mut out, index == 0, index == last);
        }
        out
    }

    /// Decode records until one carries ME. Input ending before that is
    /// accepted as long as every record read so far was complete.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() {
            return Err(TagError::NoRecords);
        }

        let mut records = Vec::new();
        let mut offset = 0;
        while offset < bytes.len() {
            let (record, header, used) = NdefRecord::decode(&bytes[offset..])?;
            records.push(record);
            offset += used;
            if header & FLAG_ME != 0 {
                break;
            }
        }

        Ok(Self { records })
    }

    /// Text of the first record. Battery records are always written first.
    pub fn first_text(&self) -> Result<String> {
        self.records
            .first()
            .ok_or(TagError::NoRecords)
            .and_then(NdefRecord::as_text)
    }
}
