//! Issuance Command
//!
//! The only input the issuance service ever receives.

use chrono::{DateTime, Utc};
use kernel::id::{CompanyId, MemberId};

use crate::domain::entities::{CompanyAuth, ShareRecord};
use crate::domain::value_objects::{ActingUser, RequestProvenance, ShareStatus};

/// Share fields supplied by the caller, already validated
#[derive(Debug, Clone, PartialEq)]
pub struct ShareTerms {
    pub status: Option<ShareStatus>,
    pub certificate_id: Option<String>,
    pub quantity: i64,
    pub price_per_share: Option<f64>,
    pub capital_contribution: Option<f64>,
    pub ip_contribution: Option<f64>,
    pub debt_cancelled: Option<f64>,
    pub other_contributions: Option<f64>,
    pub cliff_years: Option<i32>,
    pub vesting_years: Option<i32>,
    pub company_legends: Option<String>,
    pub issue_date: Option<DateTime<Utc>>,
    pub rule144_date: Option<DateTime<Utc>>,
    pub vesting_start_date: Option<DateTime<Utc>>,
    pub board_approval_date: Option<DateTime<Utc>>,
    pub stakeholder_id: String,
    pub share_class_id: String,
}

impl ShareTerms {
    /// Build the record an issuance service persists for these terms
    pub fn into_record(self, company_id: CompanyId, certificate_id: String) -> ShareRecord {
        ShareRecord {
            price_per_share: self.price_per_share,
            capital_contribution: self.capital_contribution,
            ip_contribution: self.ip_contribution,
            debt_cancelled: self.debt_cancelled,
            other_contributions: self.other_contributions,
            cliff_years: self.cliff_years,
            vesting_years: self.vesting_years,
            company_legends: self.company_legends,
            issue_date: self.issue_date,
            rule144_date: self.rule144_date,
            vesting_start_date: self.vesting_start_date,
            board_approval_date: self.board_approval_date,
            stakeholder_id: Some(self.stakeholder_id),
            ..ShareRecord::new(
                company_id,
                self.status.unwrap_or_default(),
                certificate_id,
                self.quantity,
                self.share_class_id,
            )
        }
    }
}

/// Validated terms enriched with resolved identities and provenance
///
/// Fields are private; construct once with [`IssueShareCommand::new`].
#[derive(Debug, Clone, PartialEq)]
pub struct IssueShareCommand {
    terms: ShareTerms,
    company_id: CompanyId,
    member_id: MemberId,
    user: ActingUser,
    provenance: RequestProvenance,
}

impl IssueShareCommand {
    pub fn new(terms: ShareTerms, auth: &CompanyAuth, provenance: RequestProvenance) -> Self {
        Self {
            terms,
            company_id: auth.company.id.clone(),
            member_id: auth.member.id.clone(),
            user: ActingUser {
                id: auth.user.id.clone(),
                name: auth.user.name.clone().unwrap_or_default(),
            },
            provenance,
        }
    }

    pub fn terms(&self) -> &ShareTerms {
        &self.terms
    }

    pub fn company_id(&self) -> &CompanyId {
        &self.company_id
    }

    pub fn member_id(&self) -> &MemberId {
        &self.member_id
    }

    pub fn user(&self) -> &ActingUser {
        &self.user
    }

    pub fn provenance(&self) -> &RequestProvenance {
        &self.provenance
    }

    /// Take the terms out, leaving the resolved context behind
    pub fn into_parts(self) -> (ShareTerms, CompanyId, MemberId, ActingUser, RequestProvenance) {
        (
            self.terms,
            self.company_id,
            self.member_id,
            self.user,
            self.provenance,
        )
    }
}
