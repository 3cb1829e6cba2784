//! Developer tooling for the fishbowl: read-only session inspection.
//!
//! # Invariants
//! - Tools never mutate the session they inspect.

mod inspector;

pub use inspector::{ObjectInfo, SessionInspector, SessionSummary};
