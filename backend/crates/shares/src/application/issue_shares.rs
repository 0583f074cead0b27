//! Issue Shares Use Case
//!
//! Two steps, called in order by the handler with body validation between
//! them: [`IssueSharesUseCase::authorize`] then [`IssueSharesUseCase::execute`].

use std::sync::Arc;

use kernel::id::CompanyId;

use crate::domain::command::{IssueShareCommand, ShareTerms};
use crate::domain::entities::{CompanyAuth, ShareRecord};
use crate::domain::service::{CompanyAuthResolver, IssuanceOutcome, ShareIssuanceService};
use crate::domain::value_objects::{RequestContext, RequestProvenance};
use crate::error::{ShareError, ShareResult};

/// Issue shares input
pub struct IssueSharesInput {
    pub auth: CompanyAuth,
    pub terms: ShareTerms,
    pub provenance: RequestProvenance,
}

/// Issue shares output
#[derive(Debug, Clone)]
pub struct IssueSharesOutput {
    pub message: String,
    pub record: ShareRecord,
}

/// Issue shares use case
pub struct IssueSharesUseCase<A, S>
where
    A: CompanyAuthResolver,
    S: ShareIssuanceService,
{
    resolver: Arc<A>,
    service: Arc<S>,
}

impl<A, S> IssueSharesUseCase<A, S>
where
    A: CompanyAuthResolver,
    S: ShareIssuanceService,
{
    pub fn new(resolver: Arc<A>, service: Arc<S>) -> Self {
        Self { resolver, service }
    }

    /// Resolve the caller's company, member and user
    pub async fn authorize(
        &self,
        ctx: &RequestContext,
        company_id: &CompanyId,
    ) -> ShareResult<CompanyAuth> {
        let auth = self.resolver.resolve(ctx, company_id).await?;

        tracing::debug!(
            company_id = %auth.company.id,
            member_id = %auth.member.id,
            "Resolved company access"
        );

        Ok(auth)
    }

    /// Build the command, call the issuance service once, and unwrap its outcome
    ///
    /// Any service error or unsuccessful outcome becomes `IssuanceFailed`.
    pub async fn execute(&self, input: IssueSharesInput) -> ShareResult<IssueSharesOutput> {
        let command = IssueShareCommand::new(input.terms, &input.auth, input.provenance);
        let company_id = command.company_id().clone();
        let member_id = command.member_id().clone();

        let outcome = self.service.issue(command).await.map_err(|e| {
            // Never surfaced to the caller as-is.
            tracing::warn!(
                company_id = %company_id,
                member_id = %member_id,
                error = %e,
                "Issuance service returned an error"
            );
            ShareError::IssuanceFailed
        })?;

        match outcome {
            IssuanceOutcome {
                success: true,
                message,
                data: Some(record),
            } => {
                tracing::info!(
                    company_id = %company_id,
                    member_id = %member_id,
                    share_id = %record.id,
                    certificate_id = %record.certificate_id,
                    quantity = record.quantity,
                    "Shares issued"
                );
                Ok(IssueSharesOutput { message, record })
            }
            IssuanceOutcome {
                success, message, ..
            } => {
                tracing::warn!(
                    company_id = %company_id,
                    member_id = %member_id,
                    success,
                    service_message = %message,
                    "Issuance service did not return a share"
                );
                Err(ShareError::IssuanceFailed)
            }
        }
    }
}
