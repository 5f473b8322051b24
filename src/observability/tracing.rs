//! Trace identifiers for operation events.
//!
//! Every todo write emits an event tagged with a trace ID so the audit
//! channel can be correlated with request logs.

use uuid::Uuid;

/// Generate a fresh trace ID (UUID v4, hyphenless).
pub fn new_trace_id() -> String {
    Uuid::new_v4().simple().to_string()
}
