pub mod audit_store;
pub mod export;

pub use audit_store::{AuditLog, LogEntry, LogKind, SqliteAuditLog};

#[cfg(test)]
pub use audit_store::MemoryAuditLog;
