//! Collaborator Traits
//!
//! Authorization and issuance are owned by other parts of the system. The
//! request handler only sees these interfaces; implementations live in
//! `infra/` (or in tests).

use kernel::id::CompanyId;

use crate::domain::command::IssueShareCommand;
use crate::domain::entities::{CompanyAuth, ShareRecord};
use crate::domain::value_objects::RequestContext;
use crate::error::ShareResult;

/// What the issuance service reports back
///
/// `data` is only meaningful when `success` is true.
#[derive(Debug, Clone, PartialEq)]
pub struct IssuanceOutcome {
    pub success: bool,
    pub message: String,
    pub data: Option<ShareRecord>,
}

impl IssuanceOutcome {
    pub fn issued(message: impl Into<String>, record: ShareRecord) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(record),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }
}

/// Resolves the caller's access to a company
#[trait_variant::make(CompanyAuthResolver: Send)]
pub trait LocalCompanyAuthResolver {
    /// Return the company, acting member and user, or fail with
    /// `Unauthenticated`, `Forbidden` or `CompanyNotFound`
    async fn resolve(&self, ctx: &RequestContext, company_id: &CompanyId)
    -> ShareResult<CompanyAuth>;
}

/// Performs the share issuance itself
#[trait_variant::make(ShareIssuanceService: Send)]
pub trait LocalShareIssuanceService {
    /// Issue shares. Called at most once per request, never retried.
    async fn issue(&self, command: IssueShareCommand) -> ShareResult<IssuanceOutcome>;
}
