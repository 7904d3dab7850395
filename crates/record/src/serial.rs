use serde::{Deserialize, Serialize};

use crate::error::{RecordError, Result};

pub const MAX_MANUAL_SERIAL_LEN: usize = 8;
const TEAM_WIDTH: usize = 5;

/// Battery category in the BEST numbering scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BestKind {
    /// Ids 0..=899, rendered `NNN`.
    #[default]
    New,
    /// Ids 0..=98, rendered `9NN`.
    Old,
    /// Single shared serial `999` per team.
    Special,
}

/// How a serial number is chosen when a tag is initialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SerialScheme {
    /// Free text, 1 to 8 ASCII characters.
    Manual(String),
    /// Team number padded to five characters with `-`, then a three digit
    /// suffix derived from the battery kind.
    Best {
        team: String,
        kind: BestKind,
        id: Option<u32>,
    },
}

impl SerialScheme {
    pub fn build(&self) -> Result<String> {
        match self {
            SerialScheme::Manual(text) => build_manual(text),
            SerialScheme::Best { team, kind, id } => build_best(team, *kind, *id),
        }
    }
}

fn build_manual(text: &str) -> Result<String> {
    let text = text.trim();
    if text.is_empty() || text.len() > MAX_MANUAL_SERIAL_LEN {
        return Err(RecordError::validation(
            "serial",
            format!("must be 1 to {} characters", MAX_MANUAL_SERIAL_LEN),
        ));
    }
    if !text.is_ascii() {
        return Err(RecordError::validation("serial", "must be ASCII"));
    }
    Ok(text.to_string())
}

fn build_best(team: &str, kind: BestKind, id: Option<u32>) -> Result<String> {
    let team = team.trim();
    if team.is_empty() || team.len() > TEAM_WIDTH || !team.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RecordError::validation("team", "must be 1 to 5 digits"));
    }
    let team = format!("{:-<width$}", team, width = TEAM_WIDTH);

    let require_id = |max: u32| -> Result<u32> {
        match id {
            Some(id) if id <= max => Ok(id),
            Some(id) => Err(RecordError::validation(
                "id",
                format!("{} is outside 0..={}", id, max),
            )),
            None => Err(RecordError::validation("id", "required for this kind")),
        }
    };

    Ok(match kind {
        BestKind::New => format!("{}{:03}", team, require_id(899)?),
        BestKind::Old => format!("{}9{:02}", team, require_id(98)?),
        BestKind::Special => format!("{}999", team),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn best(team: &str, kind: BestKind, id: Option<u32>) -> Result<String> {
        SerialScheme::Best {
            team: team.to_string(),
            kind,
            id,
        }
        .build()
    }

    #[test]
    fn manual_serials() {
        assert_eq!(SerialScheme::Manual(" TEAM001 ".into()).build().unwrap(), "TEAM001");
        assert!(SerialScheme::Manual("".into()).build().is_err());
        assert!(SerialScheme::Manual("123456789".into()).build().is_err());
        assert!(SerialScheme::Manual("bätt".into()).build().is_err());
    }

    #[test]
    fn best_new_pads_team_and_id() {
        assert_eq!(best("1234", BestKind::New, Some(7)).unwrap(), "1234-007");
        assert_eq!(best("12345", BestKind::New, Some(899)).unwrap(), "12345899");
        assert!(best("1234", BestKind::New, Some(900)).is_err());
        assert!(best("1234", BestKind::New, None).is_err());
    }

    #[test]
    fn best_old_and_special() {
        assert_eq!(best("42", BestKind::Old, Some(5)).unwrap(), "42---905");
        assert!(best("42", BestKind::Old, Some(99)).is_err());
        assert_eq!(best("42", BestKind::Special, None).unwrap(), "42---999");
    }

    #[test]
    fn best_rejects_bad_team() {
        assert!(best("", BestKind::Special, None).is_err());
        assert!(best("123456", BestKind::Special, None).is_err());
        assert!(best("12a", BestKind::Special, None).is_err());
    }
}
