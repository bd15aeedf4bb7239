//! Identifiers for correlating log lines and ranking output.
//!
//! Every process gets one ULID at first access; each ranking call gets its own on top
//! of that, so a ranking response can be traced back to both.

use once_cell::sync::Lazy;
use ulid::Ulid;

static PROCESS_RUN_ID: Lazy<String> = Lazy::new(|| Ulid::new().to_string());

/// Stable for the lifetime of the process.
#[inline]
pub fn process_run_id() -> &'static str {
    &PROCESS_RUN_ID
}

/// Fresh id for a single ranking run. ULIDs sort by creation time.
#[inline]
pub fn ranking_run_id() -> String {
    Ulid::new().to_string()
}
