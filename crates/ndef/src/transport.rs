//! Whole-text exchanges with a tag.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::error::{Result, TagError};
use crate::record::{NdefMessage, NdefRecord};
use crate::tlv;

/// User area of a MIFARE Classic 1K: 45 data blocks of 16 bytes.
pub const DEFAULT_CAPACITY: usize = 720;
pub const DEFAULT_LANGUAGE: &str = "en";

/// One request/response exchange with a tag.
///
/// Implementations never retry; errors go straight back to the caller.
pub trait TagTransport {
    /// Text of the first NDEF record.
    fn read_text(&mut self) -> Result<String>;

    /// Replace the tag contents with a single Text record holding `text`.
    fn write_text(&mut self, text: &str) -> Result<()>;

    /// Bytes of user memory available for the framed message.
    fn capacity(&self) -> usize;
}

/// Frame `text` as TLV + Text record, padded with zeros to `capacity`.
pub fn encode_user_area(text: &str, language: &str, capacity: usize) -> Result<Vec<u8>> {
    let message = NdefMessage::single(NdefRecord::text(text, language)).to_bytes();
    let mut area = tlv::wrap(&message)?;

    if area.len() > capacity {
        return Err(TagError::TooLarge {
            needed: area.len(),
            capacity,
        });
    }

    area.resize(capacity, tlv::TLV_NULL);
    Ok(area)
}

pub fn decode_user_area(area: &[u8]) -> Result<String> {
    let message = NdefMessage::from_bytes(tlv::find_ndef(area)?)?;
    message.first_text()
}

/// Number of bytes `text` occupies once framed, before padding.
pub fn framed_len(text: &str, language: &str) -> Result<usize> {
    let message = NdefMessage::single(NdefRecord::text(text, language)).to_bytes();
    Ok(tlv::wrap(&message)?.len())
}

/// A tag held in memory.
#[derive(Debug, Clone)]
pub struct MemoryTag {
    area: Vec<u8>,
    language: String,
    read_only: bool,
}

impl MemoryTag {
    /// A blank (all zero) tag.
    pub fn new(capacity: usize) -> Self {
        Self::from_bytes(vec![tlv::TLV_NULL; capacity])
    }

    /// Wrap an existing user-area dump; its length becomes the capacity.
    pub fn from_bytes(area: Vec<u8>) -> Self {
        Self {
            area,
            language: DEFAULT_LANGUAGE.to_string(),
            read_only: false,
        }
    }

    pub fn with_language(mut self, language: &str) -> Self {
        self.language = language.to_string();
        self
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    pub fn bytes(&self) -> &[u8] {
        &self.area
    }
}

impl TagTransport for MemoryTag {
    fn read_text(&mut self) -> Result<String> {
        decode_user_area(&self.area)
    }

    fn write_text(&mut self, text: &str) -> Result<()> {
        if self.read_only {
            return Err(TagError::NotWritable);
        }
        self.area = encode_user_area(text, &self.language, self.area.len())?;
        Ok(())
    }

    fn capacity(&self) -> usize {
        self.area.len()
    }
}

/// A tag stored as a raw user-area image on disk, as dumped by a reader.
#[derive(Debug, Clone)]
pub struct ImageTag {
    path: PathBuf,
    capacity: usize,
    language: String,
}

impl ImageTag {
    pub fn new(path: impl Into<PathBuf>, capacity: usize) -> Self {
        Self {
            path: path.into(),
            capacity,
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }

    pub fn with_language(mut self, language: &str) -> Self {
        self.language = language.to_string();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Create a zeroed image, like a freshly formatted tag.
    pub fn create_blank(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, vec![tlv::TLV_NULL; self.capacity])?;
        Ok(())
    }

    /// Staging file next to the image: `tag.bin` stages as `tag.bin.tmp`.
    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn read_area(&self) -> Result<Vec<u8>> {
        fs::read(&self.path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => TagError::Unavailable(self.path.clone()),
            _ => TagError::Failure(e),
        })
    }
}

impl TagTransport for ImageTag {
    fn read_text(&mut self) -> Result<String> {
        let area = self.read_area()?;
        trace!(path = ?self.path, bytes = area.len(), "read tag image");
        decode_user_area(&area)
    }

    fn write_text(&mut self, text: &str) -> Result<()> {
        match fs::metadata(&self.path) {
            Ok(meta) if meta.permissions().readonly() => return Err(TagError::NotWritable),
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(TagError::Unavailable(self.path.clone()))
            }
            Err(e) => return Err(TagError::Failure(e)),
        }

        let area = encode_user_area(text, &self.language, self.capacity)?;

        let tmp = self.tmp_path();
        let staged = fs::write(&tmp, &area).and_then(|_| fs::rename(&tmp, &self.path));
        if let Err(e) = staged {
            fs::remove_file(&tmp).ok();
            return Err(TagError::Failure(e));
        }

        debug!(path = ?self.path, text_bytes = text.len(), "wrote tag image");
        Ok(())
    }

    fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_image(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("battag-ndef-{}-{}.bin", name, std::process::id()))
    }

    #[test]
    fn memory_tag_round_trip() {
        let mut tag = MemoryTag::new(DEFAULT_CAPACITY);
        let text = r#"{"sn":"1234-007","fu":"2409141230","cc":0,"n":0,"u":[]}"#;
        tag.write_text(text).unwrap();

        assert_eq!(tag.bytes().len(), DEFAULT_CAPACITY);
        assert_eq!(tag.bytes()[0], tlv::TLV_NDEF);
        assert_eq!(tag.read_text().unwrap(), text);
    }

    #[test]
    fn blank_tag_is_malformed() {
        let mut tag = MemoryTag::new(64);
        assert!(matches!(tag.read_text(), Err(TagError::Malformed(_))));
    }

    #[test]
    fn too_large_for_capacity() {
        let mut tag = MemoryTag::new(32);
        let err = tag.write_text(&"x".repeat(40)).unwrap_err();
        assert!(matches!(
            err,
            TagError::TooLarge {
                needed: 50,
                capacity: 32
            }
        ));
    }

    #[test]
    fn read_only_memory_tag() {
        let mut tag = MemoryTag::new(64);
        tag.set_read_only(true);
        assert!(matches!(tag.write_text("{}"), Err(TagError::NotWritable)));
    }

    #[test]
    fn framed_len_matches_encoding() {
        let text = "{}";
        let framed = framed_len(text, "en").unwrap();
        let area = encode_user_area(text, "en", 64).unwrap();
        assert_eq!(framed, 12);
        assert_eq!(area[framed - 1], tlv::TLV_TERMINATOR);
    }

    #[test]
    fn image_tag_round_trip() {
        let path = temp_image("roundtrip");
        let mut tag = ImageTag::new(&path, 128);
        tag.create_blank().unwrap();

        tag.write_text("{\"sn\":\"A\"}").unwrap();
        assert_eq!(fs::metadata(&path).unwrap().len(), 128);
        assert_eq!(tag.read_text().unwrap(), "{\"sn\":\"A\"}");

        fs::remove_file(&path).ok();
    }

    #[test]
    fn staging_name_keeps_full_file_name() {
        let bin = ImageTag::new("/data/tag.bin", 128);
        let img = ImageTag::new("/data/tag.img", 128);
        assert_eq!(bin.tmp_path(), PathBuf::from("/data/tag.bin.tmp"));
        assert_eq!(img.tmp_path(), PathBuf::from("/data/tag.img.tmp"));
    }

    #[test]
    fn failed_rename_removes_staging_file() {
        // a non-empty directory where the image should be: the rename fails
        let path = temp_image("rename-target");
        fs::create_dir_all(&path).unwrap();
        fs::write(path.join("occupied"), b"x").unwrap();

        let mut tag = ImageTag::new(&path, 128);
        let err = tag.write_text("{}").unwrap_err();
        assert!(matches!(err, TagError::Failure(_)));
        assert!(!tag.tmp_path().exists());

        fs::remove_dir_all(&path).ok();
    }

    #[test]
    fn missing_image_is_unavailable() {
        let mut tag = ImageTag::new(temp_image("missing"), 128);
        let err = tag.read_text().unwrap_err();
        assert!(err.is_transport());
        assert!(matches!(err, TagError::Unavailable(_)));
        assert!(matches!(tag.write_text("{}"), Err(TagError::Unavailable(_))));
    }
}
