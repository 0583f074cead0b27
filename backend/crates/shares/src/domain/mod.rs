//! Domain Layer
//!
//! This layer contains:
//! - Entities (Company, Member, User, ShareRecord)
//! - Value objects (ShareStatus, RequestContext, provenance)
//! - The issuance command handed to the issuance service
//! - Collaborator traits (authorization resolver, issuance service)

pub mod command;
pub mod entities;
pub mod service;
pub mod value_objects;

// Re-exports
pub use command::{IssueShareCommand, ShareTerms};
pub use entities::{Company, CompanyAuth, Member, ShareRecord, User};
pub use service::{CompanyAuthResolver, IssuanceOutcome, ShareIssuanceService};
pub use value_objects::{ActingUser, MemberStatus, RequestContext, RequestProvenance, ShareStatus};
