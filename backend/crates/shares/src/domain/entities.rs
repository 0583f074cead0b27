//! Domain Entities
//!
//! Core business entities for the share issuance domain.

use chrono::{DateTime, Utc};
use kernel::id::{CompanyId, MemberId, ShareId, UserId};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{MemberStatus, ShareStatus};

/// Company - the legal entity issuing shares
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
}

/// Member - a user's seat inside a company
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: MemberId,
    pub company_id: CompanyId,
    pub user_id: UserId,
    #[serde(default)]
    pub status: MemberStatus,
}

/// User - the authenticated principal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    #[serde(default)]
    pub name: Option<String>,
}

/// Result of resolving a caller against a company
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyAuth {
    pub company: Company,
    pub member: Member,
    pub user: User,
}

/// ShareRecord entity - a persisted share issuance
///
/// `None` means "not set" and is kept distinct from zero or empty values.
#[derive(Debug, Clone, PartialEq)]
pub struct ShareRecord {
    pub id: ShareId,
    pub company_id: CompanyId,
    pub status: ShareStatus,
    pub certificate_id: String,
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
    pub stakeholder_id: Option<String>,
    pub share_class_id: String,
    pub created_at: DateTime<Utc>,
}

impl ShareRecord {
    /// Minimal record with every optional field unset
    pub fn new(
        company_id: CompanyId,
        status: ShareStatus,
        certificate_id: impl Into<String>,
        quantity: i64,
        share_class_id: impl Into<String>,
    ) -> Self {
        Self {
            id: ShareId::generate(),
            company_id,
            status,
            certificate_id: certificate_id.into(),
            quantity,
            price_per_share: None,
            capital_contribution: None,
            ip_contribution: None,
            debt_cancelled: None,
            other_contributions: None,
            cliff_years: None,
            vesting_years: None,
            company_legends: None,
            issue_date: None,
            rule144_date: None,
            vesting_start_date: None,
            board_approval_date: None,
            stakeholder_id: None,
            share_class_id: share_class_id.into(),
            created_at: Utc::now(),
        }
    }
}
