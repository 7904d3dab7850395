/// Errors raised by the record store.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("not a valid battery document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("battery document must be a JSON object, found {0}")]
    NotAnObject(&'static str),

    #[error("invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("the most recent usage entry is already a charger session")]
    DuplicateCharger,

    #[error("usage ids are exhausted: an entry already holds the highest id")]
    IdsExhausted,
}

impl RecordError {
    pub(crate) fn validation(field: &'static str, message: impl Into<String>) -> Self {
        RecordError::Validation {
            field,
            message: message.into(),
        }
    }

    /// True for failures caused by the raw document rather than by caller input.
    pub fn is_parse(&self) -> bool {
        matches!(self, RecordError::Parse(_) | RecordError::NotAnObject(_))
    }
}

pub type Result<T> = std::result::Result<T, RecordError>;
