use std::path::PathBuf;

/// Errors raised while framing data or talking to a tag.
#[derive(Debug, thiserror::Error)]
pub enum TagError {
    /// No tag is present (missing image file, nothing in the field).
    #[error("no tag available at {0}")]
    Unavailable(PathBuf),

    #[error("tag I/O failed: {0}")]
    Failure(#[from] std::io::Error),

    #[error("data needs {needed} bytes but the tag holds {capacity}")]
    TooLarge { needed: usize, capacity: usize },

    #[error("tag is read-only")]
    NotWritable,

    #[error("malformed tag data: {0}")]
    Malformed(&'static str),

    #[error("NDEF message has no records")]
    NoRecords,

    #[error("first NDEF record is not text or JSON (tnf {tnf}, type {record_type:?})")]
    UnsupportedRecord { tnf: u8, record_type: String },
}

impl TagError {
    /// Errors where retrying with another tag in the field could help.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            TagError::Unavailable(_) | TagError::Failure(_) | TagError::NotWritable
        )
    }
}

pub type Result<T> = std::result::Result<T, TagError>;
