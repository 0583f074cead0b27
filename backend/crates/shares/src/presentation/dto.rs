//! API DTOs (Data Transfer Objects)

use chrono::{DateTime, Utc};
use kernel::error::app_error::FieldError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::command::ShareTerms;
use crate::domain::value_objects::ShareStatus;
use crate::error::{ShareError, ShareResult};

// ============================================================================
// Issue Shares
// ============================================================================

/// Request for POST /v1/companies/{id}/shares
///
/// Built from the raw JSON body with [`IssueShareRequest::from_json`] so
/// every malformed field is reported by its wire name. Unknown keys are
/// ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct IssueShareRequest {
    pub stakeholder_id: String,
    pub share_class_id: String,
    pub quantity: i64,
    pub status: Option<ShareStatus>,
    pub certificate_id: Option<String>,
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
}

impl IssueShareRequest {
    /// Read each known key from a JSON object, collecting one error per
    /// missing or mistyped field
    pub fn from_json(body: Value) -> Result<Self, Vec<FieldError>> {
        let Value::Object(fields) = body else {
            return Err(vec![FieldError::new("body", "must be a JSON object")]);
        };
        let mut errors = Vec::new();
        let mut reader = FieldReader {
            fields: &fields,
            errors: &mut errors,
        };

        let stakeholder_id: Option<String> = reader.required("stakeholderId");
        let share_class_id: Option<String> = reader.required("shareClassId");
        let quantity: Option<i64> = reader.required("quantity");
        let request = IssueShareRequest {
            stakeholder_id: stakeholder_id.unwrap_or_default(),
            share_class_id: share_class_id.unwrap_or_default(),
            quantity: quantity.unwrap_or_default(),
            status: reader.optional("status"),
            certificate_id: reader.optional("certificateId"),
            price_per_share: reader.optional("pricePerShare"),
            capital_contribution: reader.optional("capitalContribution"),
            ip_contribution: reader.optional("ipContribution"),
            debt_cancelled: reader.optional("debtCancelled"),
            other_contributions: reader.optional("otherContributions"),
            cliff_years: reader.optional("cliffYears"),
            vesting_years: reader.optional("vestingYears"),
            company_legends: reader.optional("companyLegends"),
            issue_date: reader.optional("issueDate"),
            rule144_date: reader.optional("rule144Date"),
            vesting_start_date: reader.optional("vestingStartDate"),
            board_approval_date: reader.optional("boardApprovalDate"),
        };

        if errors.is_empty() {
            Ok(request)
        } else {
            Err(errors)
        }
    }

    /// Check value constraints that the type system does not cover
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();

        if self.stakeholder_id.trim().is_empty() {
            errors.push(FieldError::new("stakeholderId", "must not be empty"));
        }
        if self.share_class_id.trim().is_empty() {
            errors.push(FieldError::new("shareClassId", "must not be empty"));
        }
        if self.quantity < 1 {
            errors.push(FieldError::new("quantity", "must be at least 1"));
        }
        if let Some(certificate_id) = &self.certificate_id {
            if certificate_id.trim().is_empty() {
                errors.push(FieldError::new(
                    "certificateId",
                    "must not be empty when provided",
                ));
            }
        }

        let amounts = [
            ("pricePerShare", self.price_per_share),
            ("capitalContribution", self.capital_contribution),
            ("ipContribution", self.ip_contribution),
            ("debtCancelled", self.debt_cancelled),
            ("otherContributions", self.other_contributions),
        ];
        for (field, value) in amounts {
            if let Some(v) = value {
                if !v.is_finite() || v < 0.0 {
                    errors.push(FieldError::new(field, "must be a non-negative number"));
                }
            }
        }

        for (field, value) in [
            ("cliffYears", self.cliff_years),
            ("vestingYears", self.vesting_years),
        ] {
            if value.is_some_and(|years| years < 0) {
                errors.push(FieldError::new(field, "must not be negative"));
            }
        }

        errors
    }

    /// Validate and convert into domain terms
    pub fn into_terms(self) -> ShareResult<ShareTerms> {
        let errors = self.validate();
        if !errors.is_empty() {
            return Err(ShareError::Validation(errors));
        }

        Ok(ShareTerms {
            status: self.status,
            certificate_id: self.certificate_id,
            quantity: self.quantity,
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
            stakeholder_id: self.stakeholder_id,
            share_class_id: self.share_class_id,
        })
    }
}

struct FieldReader<'a> {
    fields: &'a Map<String, Value>,
    errors: &'a mut Vec<FieldError>,
}

impl FieldReader<'_> {
    /// `null` counts as absent
    fn optional<T: DeserializeOwned>(&mut self, key: &str) -> Option<T> {
        let value = self.fields.get(key).filter(|v| !v.is_null())?;
        match T::deserialize(value) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                self.errors.push(FieldError::new(key, e.to_string()));
                None
            }
        }
    }

    fn required<T: DeserializeOwned>(&mut self, key: &str) -> Option<T> {
        if self.fields.get(key).is_none_or(Value::is_null) {
            self.errors.push(FieldError::new(key, "is required"));
            return None;
        }
        self.optional(key)
    }
}

/// Issued share as exposed by the API. Every field is always present.
///
/// Amounts are `f64`, so an unset amount serializes as `0.0`; JSON readers
/// compare it equal to `0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareResponse {
    pub status: ShareStatus,
    pub certificate_id: String,
    pub quantity: i64,
    pub price_per_share: f64,
    pub capital_contribution: f64,
    pub ip_contribution: f64,
    pub debt_cancelled: f64,
    pub other_contributions: f64,
    pub cliff_years: i32,
    pub vesting_years: i32,
    pub company_legends: String,
    pub issue_date: String,
    pub rule144_date: String,
    pub vesting_start_date: String,
    pub board_approval_date: String,
    pub stakeholder_id: String,
    pub share_class_id: String,
}

/// Response for POST /v1/companies/{id}/shares
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueSharesResponse {
    pub message: String,
    pub data: ShareResponse,
}
