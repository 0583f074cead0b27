//! Shares (Equity Issuance) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, issuance command, collaborator traits
//! - `application/` - Use case and configuration
//! - `infra/` - In-memory collaborator implementations
//! - `presentation/` - HTTP handler, DTOs, response normalizer, router
//!
//! ## Endpoint
//! - `POST /v1/companies/{id}/shares` issues shares to a stakeholder
//!
//! ## Request Flow
//! - Company id in the path must be a CUID
//! - Caller must be an active member of the company
//! - Body is validated before the issuance service is called
//! - Every response field is present, with zero / empty / now defaults

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::ShareConfig;
pub use error::{ShareError, ShareResult};
pub use infra::memory::{InMemoryShareRepository, LedgerSeed};
pub use presentation::router::{share_router, share_router_generic};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::AppError,
    kind::ErrorKind,
};

#[cfg(test)]
mod tests;
