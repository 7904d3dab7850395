use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{RecordError, Result};
use crate::lenient;
use crate::timestamp::{now_tag_time, UNSET_TIMESTAMP};
use crate::types::{AppendCheck, ChargerPolicy, DeviceType, NoteType, UsageStats};

/// Number of usage entries kept on a tag. Older entries are evicted first.
pub const MAX_USAGE_ENTRIES: usize = 14;

/// One robot or charger session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UsageEntry {
    #[serde(deserialize_with = "lenient::uint")]
    pub i: u32,
    #[serde(deserialize_with = "lenient::timestamp")]
    pub t: String,
    #[serde(deserialize_with = "lenient::code")]
    pub d: i32,
    #[serde(deserialize_with = "lenient::uint")]
    pub e: u32,
    #[serde(deserialize_with = "lenient::uint")]
    pub v: u32,
}

impl Default for UsageEntry {
    fn default() -> Self {
        Self {
            i: 0,
            t: UNSET_TIMESTAMP.to_string(),
            d: 0,
            e: 0,
            v: 0,
        }
    }
}

impl UsageEntry {
    pub fn device(&self) -> Option<DeviceType> {
        DeviceType::from_code(self.d)
    }

    pub fn is_charger(&self) -> bool {
        self.d == DeviceType::Charger.code()
    }
}

/// The document stored on a battery tag.
///
/// Field names match the on-tag keys so the serialized form stays compact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatteryRecord {
    #[serde(deserialize_with = "lenient::string")]
    pub sn: String,
    #[serde(deserialize_with = "lenient::timestamp")]
    pub fu: String,
    #[serde(deserialize_with = "lenient::uint")]
    pub cc: u32,
    #[serde(deserialize_with = "lenient::code")]
    pub n: i32,
    #[serde(deserialize_with = "lenient::entries")]
    pub u: Vec<UsageEntry>,
}

impl Default for BatteryRecord {
    fn default() -> Self {
        Self {
            sn: String::new(),
            fu: UNSET_TIMESTAMP.to_string(),
            cc: 0,
            n: 0,
            u: Vec::new(),
        }
    }
}

impl BatteryRecord {
    /// Fresh record for a newly labelled battery, first used now.
    pub fn initialize(serial: &str) -> Self {
        Self::initialize_at(serial, now_tag_time())
    }

    pub fn initialize_at(serial: &str, first_use: impl Into<String>) -> Self {
        Self {
            sn: serial.to_string(),
            fu: first_use.into(),
            ..Self::default()
        }
    }

    /// Parse a raw tag payload.
    ///
    /// Missing or mistyped fields take their defaults. The payload itself must
    /// be a JSON object; anything else fails without producing a record.
    pub fn parse(raw: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(raw.trim_start_matches('\u{feff}'))?;
        let kind = match &value {
            Value::Object(_) => None,
            Value::Null => Some("null"),
            Value::Bool(_) => Some("a boolean"),
            Value::Number(_) => Some("a number"),
            Value::String(_) => Some("a string"),
            Value::Array(_) => Some("an array"),
        };
        if let Some(kind) = kind {
            return Err(RecordError::NotAnObject(kind));
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Compact form written to the tag.
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn note(&self) -> NoteType {
        NoteType::from_code(self.n)
    }

    pub fn set_note(&mut self, note: NoteType) {
        self.n = note.code();
    }

    /// One past the highest id still in `u`. Eviction drops the oldest
    /// positions while the newest id always stays, so ids are never reused.
    ///
    /// Fails with `IdsExhausted` once an entry already holds `u32::MAX`.
    pub fn next_usage_id(&self) -> Result<u32> {
        let highest = self.u.iter().map(|e| e.i).max().unwrap_or(0);
        highest.checked_add(1).ok_or(RecordError::IdsExhausted)
    }

    pub fn last_entry(&self) -> Option<&UsageEntry> {
        self.u.last()
    }

    pub fn last_device(&self) -> Option<DeviceType> {
        self.last_entry().and_then(UsageEntry::device)
    }

    pub fn append_usage(&mut self, device: DeviceType) -> Result<&UsageEntry> {
        self.append_usage_at(device, now_tag_time())
    }

    /// The record is left untouched when no id is left.
    pub fn append_usage_at(
        &mut self,
        device: DeviceType,
        time: impl Into<String>,
    ) -> Result<&UsageEntry> {
        let entry = UsageEntry {
            i: self.next_usage_id()?,
            t: time.into(),
            d: device.code(),
            e: 0,
            v: 0,
        };

        if device == DeviceType::Charger {
            self.cc = self.cc.saturating_add(1);
        }

        self.u.push(entry);
        if self.u.len() > MAX_USAGE_ENTRIES {
            let excess = self.u.len() - MAX_USAGE_ENTRIES;
            self.u.drain(..excess);
        }

        Ok(&self.u[self.u.len() - 1])
    }

    /// Duplicate-charger gate. Only charger appends on top of a charger
    /// entry are affected.
    pub fn check_append(&self, device: DeviceType, policy: ChargerPolicy) -> Result<AppendCheck> {
        let duplicate = device == DeviceType::Charger
            && self.last_entry().is_some_and(UsageEntry::is_charger);

        match (duplicate, policy) {
            (false, _) => Ok(AppendCheck::Clear),
            (true, ChargerPolicy::Warn) => Ok(AppendCheck::NeedsConfirmation),
            (true, ChargerPolicy::Strict) => Err(RecordError::DuplicateCharger),
        }
    }

    /// `check_append` followed by `append_usage`. Under `Warn` a duplicate
    /// charger goes through only when `confirmed` is set.
    pub fn try_append_usage(
        &mut self,
        device: DeviceType,
        policy: ChargerPolicy,
        confirmed: bool,
    ) -> Result<&UsageEntry> {
        match self.check_append(device, policy)? {
            AppendCheck::NeedsConfirmation if !confirmed => Err(RecordError::DuplicateCharger),
            _ => self.append_usage(device),
        }
    }

    pub fn summarize(&self) -> UsageStats {
        let robot = self
            .u
            .iter()
            .filter(|e| e.d == DeviceType::Robot.code())
            .count();
        let charger = self.u.iter().filter(|e| e.is_charger()).count();

        UsageStats {
            robot,
            charger,
            total: self.u.len(),
        }
    }

    /// Entries ordered for display, newest id first. Storage order is untouched.
    pub fn usage_newest_first(&self) -> Vec<&UsageEntry> {
        let mut rows: Vec<&UsageEntry> = self.u.iter().collect();
        rows.sort_by(|a, b| b.i.cmp(&a.i));
        rows
    }
}
