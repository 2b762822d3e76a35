/// Job identifiers are remote-assigned opaque strings (UUIDs in practice).
pub type JobId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
