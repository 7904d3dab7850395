//! Read-modify-write flows against a tag, with every observed record
//! appended to the audit log.

use battag_ndef::{TagError, TagTransport};
use battag_record::{AppendCheck, BatteryRecord, ChargerPolicy, DeviceType, NoteType, RecordError};
use tracing::{debug, info, warn};

use crate::data::{AuditLog, LogKind};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Tag(#[from] TagError),

    #[error(transparent)]
    Record(#[from] RecordError),

    #[error("Failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SessionError>;

pub struct TagSession<'a, T: TagTransport> {
    tag: T,
    audit: &'a mut dyn AuditLog,
}

impl<'a, T: TagTransport> TagSession<'a, T> {
    pub fn new(tag: T, audit: &'a mut dyn AuditLog) -> Self {
        Self { tag, audit }
    }

    pub fn tag(&self) -> &T {
        &self.tag
    }

    /// Raw text currently on the tag.
    pub fn read_raw(&mut self) -> Result<String> {
        Ok(self.tag.read_text()?)
    }

    pub fn read(&mut self) -> Result<BatteryRecord> {
        let raw = self.read_raw()?;
        let record = BatteryRecord::parse(&raw)?;
        debug!(sn = %record.sn, entries = record.u.len(), "parsed tag record");
        self.audit_quietly(LogKind::Read, &record);
        Ok(record)
    }

    /// Replace the whole tag content with `record`.
    pub fn write(&mut self, record: &BatteryRecord, kind: LogKind) -> Result<()> {
        let json = record.to_json()?;
        self.tag.write_text(&json)?;
        info!(sn = %record.sn, bytes = json.len(), kind = kind.as_str(), "record written");
        self.audit_quietly(kind, record);
        Ok(())
    }

    /// Label a blank tag. Whatever was there before is overwritten.
    pub fn initialize(&mut self, serial: &str) -> Result<BatteryRecord> {
        let record = BatteryRecord::initialize(serial);
        self.write(&record, LogKind::Write)?;
        Ok(record)
    }

    /// Append a usage entry. A duplicate charger under `Warn` calls
    /// `confirm`; declining leaves the tag untouched and returns `None`.
    pub fn record_usage<C>(
        &mut self,
        device: DeviceType,
        policy: ChargerPolicy,
        confirm: C,
    ) -> Result<Option<BatteryRecord>>
    where
        C: FnOnce(&BatteryRecord) -> bool,
    {
        let mut record = self.read()?;

        if record.check_append(device, policy)? == AppendCheck::NeedsConfirmation {
            warn!(sn = %record.sn, "last entry is already a charger session");
            if !confirm(&record) {
                info!(sn = %record.sn, "duplicate charger entry declined");
                return Ok(None);
            }
        }

        let entry = record.append_usage(device)?;
        debug!(id = entry.i, device = device.label(), "usage entry appended");
        self.write(&record, LogKind::Write)?;
        Ok(Some(record))
    }

    pub fn set_note(&mut self, note: NoteType) -> Result<BatteryRecord> {
        let mut record = self.read()?;
        record.set_note(note);
        self.write(&record, LogKind::Write)?;
        Ok(record)
    }

    /// Load a record file's contents. With `write` set the record also
    /// replaces the tag content.
    pub fn import(&mut self, raw: &str, write: bool) -> Result<BatteryRecord> {
        let record = BatteryRecord::parse(raw)?;
        self.audit_quietly(LogKind::ViewImport, &record);
        if write {
            self.write(&record, LogKind::ImportWrite)?;
        }
        Ok(record)
    }

    // An audit failure never undoes a tag operation that already succeeded.
    fn audit_quietly(&mut self, kind: LogKind, record: &BatteryRecord) {
        if let Err(e) = self.audit.append(kind, record) {
            warn!(error = %e, kind = kind.as_str(), "failed to append audit entry");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::MemoryAuditLog;
    use battag_ndef::MemoryTag;
    use battag_record::MAX_USAGE_ENTRIES;
    use pretty_assertions::assert_eq;

    fn labelled_tag(serial: &str) -> MemoryTag {
        let mut tag = MemoryTag::new(720);
        let record = BatteryRecord::initialize_at(serial, "2409141230");
        tag.write_text(&record.to_json().unwrap()).unwrap();
        tag
    }

    #[test]
    fn read_logs_once_per_distinct_record() {
        let mut audit = MemoryAuditLog::new();
        let mut session = TagSession::new(labelled_tag("TEAM001"), &mut audit);

        let record = session.read().unwrap();
        session.read().unwrap();
        assert_eq!(record.sn, "TEAM001");

        let entries = audit.list().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, LogKind::Read);
    }

    #[test]
    fn lifecycle_on_a_blank_tag() {
        let mut audit = MemoryAuditLog::new();
        let mut session = TagSession::new(MemoryTag::new(720), &mut audit);

        session.initialize("TEAM001").unwrap();
        session
            .record_usage(DeviceType::Robot, ChargerPolicy::Warn, |_| false)
            .unwrap();
        session
            .record_usage(DeviceType::Charger, ChargerPolicy::Warn, |_| false)
            .unwrap();
        session.set_note(NoteType::Practice).unwrap();

        let record = session.read().unwrap();
        assert_eq!(record.sn, "TEAM001");
        assert_eq!(record.cc, 1);
        assert_eq!(record.note(), NoteType::Practice);
        assert_eq!(
            record.u.iter().map(|e| (e.i, e.d)).collect::<Vec<_>>(),
            vec![(1, 1), (2, 2)]
        );

        let kinds: Vec<_> = audit.list().unwrap().iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![LogKind::Write, LogKind::Write, LogKind::Write, LogKind::Write]);
    }

    #[test]
    fn duplicate_charger_declined_leaves_tag_alone() {
        let mut audit = MemoryAuditLog::new();
        let mut session = TagSession::new(labelled_tag("B1"), &mut audit);
        session
            .record_usage(DeviceType::Charger, ChargerPolicy::Warn, |_| true)
            .unwrap();
        let before = session.read_raw().unwrap();

        let mut asked = false;
        let result = session
            .record_usage(DeviceType::Charger, ChargerPolicy::Warn, |_| {
                asked = true;
                false
            })
            .unwrap();

        assert!(asked);
        assert!(result.is_none());
        assert_eq!(session.read_raw().unwrap(), before);
    }

    #[test]
    fn duplicate_charger_confirmed() {
        let mut audit = MemoryAuditLog::new();
        let mut session = TagSession::new(labelled_tag("B1"), &mut audit);
        for _ in 0..2 {
            session
                .record_usage(DeviceType::Charger, ChargerPolicy::Warn, |_| true)
                .unwrap();
        }
        let record = session.read().unwrap();
        assert_eq!(record.cc, 2);
        assert_eq!(record.u.len(), 2);
    }

    #[test]
    fn strict_policy_rejects_duplicate_charger() {
        let mut audit = MemoryAuditLog::new();
        let mut session = TagSession::new(labelled_tag("B1"), &mut audit);
        session
            .record_usage(DeviceType::Charger, ChargerPolicy::Strict, |_| true)
            .unwrap();

        let err = session
            .record_usage(DeviceType::Charger, ChargerPolicy::Strict, |_| true)
            .unwrap_err();
        assert!(matches!(
            err,
            SessionError::Record(RecordError::DuplicateCharger)
        ));
        assert_eq!(session.read().unwrap().cc, 1);
    }

    #[test]
    fn exhausted_ids_leave_tag_alone() {
        let raw = r#"{"sn":"B1","fu":"2409141230","cc":0,"n":0,"u":[{"i":4294967295,"t":"2409141300","d":1,"e":0,"v":0}]}"#;
        let mut tag = MemoryTag::new(720);
        tag.write_text(raw).unwrap();
        let mut audit = MemoryAuditLog::new();
        let mut session = TagSession::new(tag, &mut audit);

        let err = session
            .record_usage(DeviceType::Robot, ChargerPolicy::Warn, |_| true)
            .unwrap_err();
        assert!(matches!(err, SessionError::Record(RecordError::IdsExhausted)));
        assert_eq!(session.read_raw().unwrap(), raw);
    }

    #[test]
    fn usage_log_stays_bounded() {
        let mut audit = MemoryAuditLog::new();
        let mut session = TagSession::new(labelled_tag("B1"), &mut audit);
        for _ in 0..20 {
            session
                .record_usage(DeviceType::Robot, ChargerPolicy::Warn, |_| true)
                .unwrap();
        }
        let record = session.read().unwrap();
        assert_eq!(record.u.len(), MAX_USAGE_ENTRIES);
        assert_eq!(record.u.first().unwrap().i, 7);
        assert_eq!(record.u.last().unwrap().i, 20);
    }

    #[test]
    fn import_view_and_write() {
        let mut audit = MemoryAuditLog::new();
        let mut session = TagSession::new(MemoryTag::new(720), &mut audit);
        let raw = r#"{"sn":"IMP1","fu":"2409141230","cc":3,"n":2,"u":[]}"#;

        let viewed = session.import(raw, false).unwrap();
        assert_eq!(viewed.cc, 3);
        assert!(session.read_raw().is_err());

        session.import(raw, true).unwrap();
        assert_eq!(session.read_raw().unwrap(), raw);

        let kinds: Vec<_> = audit.list().unwrap().iter().map(|e| e.kind).collect();
        // the write repeats the viewed record, so only the view is kept
        assert_eq!(kinds, vec![LogKind::ViewImport]);
    }

    #[test]
    fn non_object_payload_is_rejected() {
        let mut tag = MemoryTag::new(720);
        tag.write_text("[1,2,3]").unwrap();
        let mut audit = MemoryAuditLog::new();
        let mut session = TagSession::new(tag, &mut audit);

        let err = session.read().unwrap_err();
        assert!(matches!(
            err,
            SessionError::Record(RecordError::NotAnObject(_))
        ));
        assert!(audit.list().unwrap().is_empty());
    }

    #[test]
    fn read_only_tag_is_reported() {
        let mut tag = labelled_tag("B1");
        tag.set_read_only(true);
        let mut audit = MemoryAuditLog::new();
        let mut session = TagSession::new(tag, &mut audit);

        let err = session.set_note(NoteType::Scrap).unwrap_err();
        assert!(matches!(err, SessionError::Tag(TagError::NotWritable)));
    }
}
