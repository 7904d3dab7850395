//! Battery record model stored on battag NFC tags.
//!
//! A tag holds one compact JSON document:
//!
//! ```json
//! {"sn":"1234-001","fu":"2409141230","cc":5,"n":0,
//!  "u":[{"i":1,"t":"2409141300","d":1,"e":0,"v":0}]}
//! ```
//!
//! This crate owns parsing (tolerant, with typed defaults), the update rules
//! for the bounded usage log, and deterministic serialization.

mod error;
mod lenient;
mod record;
mod serial;
pub mod timestamp;
mod types;

pub use error::{RecordError, Result};
pub use record::{BatteryRecord, UsageEntry, MAX_USAGE_ENTRIES};
pub use serial::{BestKind, SerialScheme, MAX_MANUAL_SERIAL_LEN};
pub use timestamp::UNSET_TIMESTAMP;
pub use types::{AppendCheck, ChargerPolicy, DeviceType, NoteType, UsageStats};
