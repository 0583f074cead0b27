//! In-Memory Collaborator Implementations
//!
//! A seeded, process-local ledger implementing both the authorization
//! resolver and the issuance service. State is lost on restart.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use kernel::id::{CompanyId, MemberId, UserId};
use serde::Deserialize;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::command::IssueShareCommand;
use crate::domain::entities::{Company, CompanyAuth, Member, ShareRecord, User};
use crate::domain::service::{CompanyAuthResolver, IssuanceOutcome, ShareIssuanceService};
use crate::domain::value_objects::{MemberStatus, RequestContext};
use crate::error::{ShareError, ShareResult};

pub const SHARE_CREATED_ACTION: &str = "share.created";
pub const ISSUED_MESSAGE: &str = "Successfully issued shares.";

// ============================================================================
// Seed
// ============================================================================

/// Initial ledger contents, usually loaded from JSON
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSeed {
    #[serde(default)]
    pub users: Vec<UserSeed>,
    #[serde(default)]
    pub companies: Vec<CompanySeed>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSeed {
    pub id: UserId,
    #[serde(default)]
    pub name: Option<String>,
    /// Bearer tokens that authenticate as this user
    #[serde(default)]
    pub api_tokens: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanySeed {
    pub id: CompanyId,
    pub name: String,
    #[serde(default)]
    pub stakeholders: Vec<String>,
    #[serde(default)]
    pub share_classes: Vec<String>,
    #[serde(default)]
    pub members: Vec<MemberSeed>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberSeed {
    pub id: MemberId,
    pub user_id: UserId,
    #[serde(default)]
    pub status: MemberStatus,
}

// ============================================================================
// State
// ============================================================================

/// Audit trail entry written for every issued share
#[derive(Debug, Clone, PartialEq)]
pub struct AuditEvent {
    pub id: Uuid,
    pub action: &'static str,
    pub company_id: CompanyId,
    pub actor_id: UserId,
    pub member_id: MemberId,
    pub request_ip: String,
    pub user_agent: String,
    pub summary: String,
    pub occurred_at: DateTime<Utc>,
}

struct CompanyLedger {
    company: Company,
    stakeholders: HashSet<String>,
    share_classes: HashSet<String>,
    shares: Vec<ShareRecord>,
}

impl CompanyLedger {
    fn certificate_taken(&self, certificate_id: &str) -> bool {
        self.shares.iter().any(|s| s.certificate_id == certificate_id)
    }

    fn next_certificate_id(&self) -> String {
        (self.shares.len() + 1..)
            .map(|n| format!("CS-{n}"))
            .find(|candidate| !self.certificate_taken(candidate))
            .unwrap_or_default()
    }
}

#[derive(Default)]
struct LedgerState {
    users: HashMap<UserId, User>,
    tokens: HashMap<String, UserId>,
    members: Vec<Member>,
    companies: HashMap<CompanyId, CompanyLedger>,
    audit: Vec<AuditEvent>,
}

/// In-memory ledger
#[derive(Clone, Default)]
pub struct InMemoryShareRepository {
    state: Arc<RwLock<LedgerState>>,
}

impl InMemoryShareRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_seed(seed: LedgerSeed) -> Self {
        let mut state = LedgerState::default();

        for user in seed.users {
            for token in user.api_tokens {
                state.tokens.insert(token, user.id.clone());
            }
            state.users.insert(
                user.id.clone(),
                User {
                    id: user.id,
                    name: user.name,
                },
            );
        }

        for company in seed.companies {
            state
                .members
                .extend(company.members.into_iter().map(|m| Member {
                    id: m.id,
                    company_id: company.id.clone(),
                    user_id: m.user_id,
                    status: m.status,
                }));
            state.companies.insert(
                company.id.clone(),
                CompanyLedger {
                    company: Company {
                        id: company.id,
                        name: company.name,
                    },
                    stakeholders: company.stakeholders.into_iter().collect(),
                    share_classes: company.share_classes.into_iter().collect(),
                    shares: Vec::new(),
                },
            );
        }

        tracing::debug!(
            users = state.users.len(),
            companies = state.companies.len(),
            members = state.members.len(),
            "Seeded in-memory ledger"
        );

        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }

    /// Shares issued so far for a company, oldest first
    pub async fn shares_for(&self, company_id: &CompanyId) -> Vec<ShareRecord> {
        let state = self.state.read().await;
        state
            .companies
            .get(company_id)
            .map(|ledger| ledger.shares.clone())
            .unwrap_or_default()
    }

    /// Full audit trail, oldest first
    pub async fn audit_events(&self) -> Vec<AuditEvent> {
        self.state.read().await.audit.clone()
    }
}

impl CompanyAuthResolver for InMemoryShareRepository {
    async fn resolve(
        &self,
        ctx: &RequestContext,
        company_id: &CompanyId,
    ) -> ShareResult<CompanyAuth> {
        let state = self.state.read().await;

        let user_id = ctx
            .credential
            .as_ref()
            .and_then(|token| state.tokens.get(token))
            .ok_or(ShareError::Unauthenticated)?;

        let user = state
            .users
            .get(user_id)
            .cloned()
            .ok_or_else(|| ShareError::Internal(format!("token bound to unknown user {user_id}")))?;

        let company = state
            .companies
            .get(company_id)
            .map(|ledger| ledger.company.clone())
            .ok_or(ShareError::CompanyNotFound)?;

        let member = state
            .members
            .iter()
            .find(|m| &m.company_id == company_id && &m.user_id == user_id && m.status.can_act())
            .cloned()
            .ok_or(ShareError::Forbidden)?;

        Ok(CompanyAuth {
            company,
            member,
            user,
        })
    }
}

impl ShareIssuanceService for InMemoryShareRepository {
    async fn issue(&self, command: IssueShareCommand) -> ShareResult<IssuanceOutcome> {
        let (terms, company_id, member_id, user, provenance) = command.into_parts();

        let mut state = self.state.write().await;

        let Some(ledger) = state.companies.get_mut(&company_id) else {
            return Ok(IssuanceOutcome::rejected("Company not found"));
        };
        if !ledger.stakeholders.contains(&terms.stakeholder_id) {
            return Ok(IssuanceOutcome::rejected("Stakeholder not found"));
        }
        if !ledger.share_classes.contains(&terms.share_class_id) {
            return Ok(IssuanceOutcome::rejected("Share class not found"));
        }

        let certificate_id = match &terms.certificate_id {
            Some(requested) if ledger.certificate_taken(requested) => {
                return Ok(IssuanceOutcome::rejected(format!(
                    "Certificate ID {requested} is already in use"
                )));
            }
            Some(requested) => requested.clone(),
            None => ledger.next_certificate_id(),
        };

        let record = terms.into_record(company_id.clone(), certificate_id);
        ledger.shares.push(record.clone());

        let actor = if user.name.is_empty() {
            user.id.to_string()
        } else {
            user.name.clone()
        };
        let summary = format!(
            "{actor} issued {} shares of class {} to stakeholder {}",
            record.quantity,
            record.share_class_id,
            record.stakeholder_id.as_deref().unwrap_or_default(),
        );

        state.audit.push(AuditEvent {
            id: Uuid::new_v4(),
            action: SHARE_CREATED_ACTION,
            company_id,
            actor_id: user.id,
            member_id,
            request_ip: provenance.request_ip,
            user_agent: provenance.user_agent,
            summary,
            occurred_at: Utc::now(),
        });

        Ok(IssuanceOutcome::issued(ISSUED_MESSAGE, record))
    }
}
