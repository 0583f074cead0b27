//! Infrastructure Layer
//!
//! Collaborator implementations backed by process memory.

pub mod memory;

pub use memory::{AuditEvent, InMemoryShareRepository, LedgerSeed};
