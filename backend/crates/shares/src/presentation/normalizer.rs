//! Response Normalizer
//!
//! The one place where domain "unset" becomes API zero / empty / now.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::domain::entities::ShareRecord;
use crate::presentation::dto::ShareResponse;

/// Render an instant as ISO-8601 in UTC with millisecond precision
/// (`2024-01-31T09:30:00.000Z`)
pub fn to_iso8601(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Map a persisted share to the fixed response shape
///
/// Absent numbers become `0`, absent text becomes `""`, and absent dates
/// become `now`.
pub fn normalize_share(record: ShareRecord, now: DateTime<Utc>) -> ShareResponse {
    let date_or_now = |date: Option<DateTime<Utc>>| to_iso8601(date.unwrap_or(now));

    ShareResponse {
        status: record.status,
        certificate_id: record.certificate_id,
        quantity: record.quantity,
        price_per_share: record.price_per_share.unwrap_or(0.0),
        capital_contribution: record.capital_contribution.unwrap_or(0.0),
        ip_contribution: record.ip_contribution.unwrap_or(0.0),
        debt_cancelled: record.debt_cancelled.unwrap_or(0.0),
        other_contributions: record.other_contributions.unwrap_or(0.0),
        cliff_years: record.cliff_years.unwrap_or(0),
        vesting_years: record.vesting_years.unwrap_or(0),
        company_legends: record.company_legends.unwrap_or_default(),
        issue_date: date_or_now(record.issue_date),
        rule144_date: date_or_now(record.rule144_date),
        vesting_start_date: date_or_now(record.vesting_start_date),
        board_approval_date: date_or_now(record.board_approval_date),
        stakeholder_id: record.stakeholder_id.unwrap_or_default(),
        share_class_id: record.share_class_id,
    }
}
