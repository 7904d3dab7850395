use serde::{Deserialize, Serialize};

use crate::error::{RecordError, Result};

/// Classification note stored in `n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
#[repr(i32)]
pub enum NoteType {
    #[default]
    Normal = 0,
    Practice = 1,
    Scrap = 2,
    Other = 3,
}

impl NoteType {
    pub const ALL: [NoteType; 4] = [
        NoteType::Normal,
        NoteType::Practice,
        NoteType::Scrap,
        NoteType::Other,
    ];

    /// Lenient mapping used when reading tags: unknown codes read as `Normal`.
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => NoteType::Practice,
            2 => NoteType::Scrap,
            3 => NoteType::Other,
            _ => NoteType::Normal,
        }
    }

    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn label(self) -> &'static str {
        match self {
            NoteType::Normal => "Normal",
            NoteType::Practice => "Practice",
            NoteType::Scrap => "Scrap",
            NoteType::Other => "Other",
        }
    }
}

impl TryFrom<i32> for NoteType {
    type Error = RecordError;

    fn try_from(code: i32) -> Result<Self> {
        match code {
            0..=3 => Ok(NoteType::from_code(code)),
            _ => Err(RecordError::validation(
                "note",
                format!("code {} is outside 0..=3", code),
            )),
        }
    }
}

/// Which device a usage entry was recorded on, stored in `d`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
#[repr(i32)]
pub enum DeviceType {
    #[default]
    Robot = 1,
    Charger = 2,
}

impl DeviceType {
    /// Strict mapping: `None` for codes no known writer produces.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(DeviceType::Robot),
            2 => Some(DeviceType::Charger),
            _ => None,
        }
    }

    /// Lenient mapping for display: anything that is not a charger is a robot session.
    pub fn from_code_or_default(code: i32) -> Self {
        Self::from_code(code).unwrap_or_default()
    }

    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn label(self) -> &'static str {
        match self {
            DeviceType::Robot => "Robot",
            DeviceType::Charger => "Charger",
        }
    }
}

/// How a charger append behaves when the last entry is already a charger session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChargerPolicy {
    /// Ask the caller to confirm, then allow.
    #[default]
    Warn,
    /// Refuse the append.
    Strict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendCheck {
    Clear,
    NeedsConfirmation,
}

/// Read-only aggregation over the usage log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct UsageStats {
    pub robot: usize,
    pub charger: usize,
    pub total: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_note_codes_read_as_normal() {
        assert_eq!(NoteType::from_code(99), NoteType::Normal);
        assert_eq!(NoteType::from_code(-1).label(), "Normal");
        assert_eq!(NoteType::from_code(2), NoteType::Scrap);
    }

    #[test]
    fn note_try_from_rejects_out_of_range() {
        assert_eq!(NoteType::try_from(3).unwrap(), NoteType::Other);
        let err = NoteType::try_from(4).unwrap_err();
        assert!(matches!(err, RecordError::Validation { field: "note", .. }));
    }

    #[test]
    fn device_codes() {
        assert_eq!(DeviceType::from_code(2), Some(DeviceType::Charger));
        assert_eq!(DeviceType::from_code(0), None);
        assert_eq!(DeviceType::from_code_or_default(7), DeviceType::Robot);
        assert_eq!(DeviceType::Charger.code(), 2);
    }

    #[test]
    fn charger_policy_serializes_lowercase() {
        let json = serde_json::to_string(&ChargerPolicy::Strict).unwrap();
        assert_eq!(json, "\"strict\"");
    }
}
