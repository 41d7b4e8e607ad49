// ── Domain model ──
//
// Loosely typed records plus the strongly typed envelope around them.

pub mod payload;
pub mod record;
pub mod record_id;

pub use payload::RawPayload;
pub use record::Record;
pub use record_id::RecordId;
