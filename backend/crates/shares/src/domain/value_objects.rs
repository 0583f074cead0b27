//! Domain Value Objects
//!
//! Immutable value types for the share issuance domain.

use kernel::id::UserId;
use serde::{Deserialize, Serialize};

/// Lifecycle status of an issued share
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShareStatus {
    Active,
    #[default]
    Draft,
    Signed,
    Pending,
}

/// Membership status of a company member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemberStatus {
    #[default]
    Active,
    Pending,
    Inactive,
}

impl MemberStatus {
    pub fn can_act(&self) -> bool {
        matches!(self, MemberStatus::Active)
    }
}

/// Where a request came from
///
/// Both fields are empty strings when the value could not be determined.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestProvenance {
    pub request_ip: String,
    pub user_agent: String,
}

/// Everything the authorization resolver may look at
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Opaque credential presented by the caller (bearer token)
    pub credential: Option<String>,
    pub provenance: RequestProvenance,
}

/// The authenticated principal performing an issuance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActingUser {
    pub id: UserId,
    pub name: String,
}
