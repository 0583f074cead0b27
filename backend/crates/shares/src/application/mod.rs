//! Application Layer - Use Cases
//!
//! Orchestrates the collaborators behind the issuance endpoint.

pub mod config;
pub mod issue_shares;

// Re-exports
pub use config::ShareConfig;
pub use issue_shares::{IssueSharesInput, IssueSharesOutput, IssueSharesUseCase};
