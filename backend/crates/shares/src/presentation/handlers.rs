//! HTTP Handlers

use std::net::IpAddr;
use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use chrono::Utc;
use kernel::id::CompanyId;
use platform::client::{PeerAddr, extract_bearer_token, extract_client_ip, extract_user_agent};
use serde_json::Value;

use crate::application::config::ShareConfig;
use crate::application::{IssueSharesInput, IssueSharesUseCase};
use crate::domain::command::ShareTerms;
use crate::domain::service::{CompanyAuthResolver, ShareIssuanceService};
use crate::domain::value_objects::{RequestContext, RequestProvenance};
use crate::error::{ShareError, ShareResult};
use crate::presentation::dto::{IssueShareRequest, IssueSharesResponse};
use crate::presentation::normalizer::normalize_share;

/// Shared state for share handlers
pub struct ShareAppState<A, S>
where
    A: CompanyAuthResolver + Send + Sync + 'static,
    S: ShareIssuanceService + Send + Sync + 'static,
{
    pub resolver: Arc<A>,
    pub service: Arc<S>,
    pub config: Arc<ShareConfig>,
}

impl<A, S> Clone for ShareAppState<A, S>
where
    A: CompanyAuthResolver + Send + Sync + 'static,
    S: ShareIssuanceService + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            resolver: self.resolver.clone(),
            service: self.service.clone(),
            config: self.config.clone(),
        }
    }
}

/// POST /v1/companies/{id}/shares
///
/// Oversized body, then path, then authorization, then body: a bad path
/// never reaches the resolver and a bad body never reaches the issuance
/// service.
pub async fn issue_shares<A, S>(
    State(state): State<ShareAppState<A, S>>,
    PeerAddr(peer): PeerAddr,
    headers: HeaderMap,
    path: Result<Path<String>, PathRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> ShareResult<Json<IssueSharesResponse>>
where
    A: CompanyAuthResolver + Send + Sync + 'static,
    S: ShareIssuanceService + Send + Sync + 'static,
{
    let body = reject_oversized(body)?;
    let company_id = parse_company_id(path)?;
    let ctx = request_context(&headers, peer, &state.config);

    let use_case = IssueSharesUseCase::new(state.resolver.clone(), state.service.clone());

    let auth = use_case.authorize(&ctx, &company_id).await?;
    let terms = parse_body(body)?;

    let output = use_case
        .execute(IssueSharesInput {
            auth,
            terms,
            provenance: ctx.provenance,
        })
        .await?;

    Ok(Json(IssueSharesResponse {
        message: output.message,
        data: normalize_share(output.record, Utc::now()),
    }))
}

// ============================================================================
// Helper Functions
// ============================================================================

fn reject_oversized(
    body: Result<Json<Value>, JsonRejection>,
) -> ShareResult<Result<Json<Value>, JsonRejection>> {
    match body {
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            Err(ShareError::PayloadTooLarge)
        }
        other => Ok(other),
    }
}

fn parse_company_id(path: Result<Path<String>, PathRejection>) -> ShareResult<CompanyId> {
    let Path(raw) = path.map_err(|rejection| ShareError::invalid_field("id", rejection.body_text()))?;
    CompanyId::parse(raw).map_err(|e| ShareError::invalid_field("id", e.to_string()))
}

fn parse_body(body: Result<Json<Value>, JsonRejection>) -> ShareResult<ShareTerms> {
    let Json(value) = body.map_err(body_rejection)?;
    IssueShareRequest::from_json(value)
        .map_err(ShareError::Validation)?
        .into_terms()
}

fn body_rejection(rejection: JsonRejection) -> ShareError {
    let message = match &rejection {
        JsonRejection::JsonSyntaxError(_) => "is not valid JSON".to_string(),
        JsonRejection::MissingJsonContentType(_) => {
            "expected `Content-Type: application/json`".to_string()
        }
        _ => rejection.body_text(),
    };
    ShareError::invalid_field("body", message)
}

fn request_context(headers: &HeaderMap, peer: Option<IpAddr>, config: &ShareConfig) -> RequestContext {
    let request_ip = extract_client_ip(headers, peer, config.trust_forwarded_for)
        .map(|ip| ip.to_string())
        .unwrap_or_default();

    RequestContext {
        credential: extract_bearer_token(headers),
        provenance: RequestProvenance {
            request_ip,
            user_agent: extract_user_agent(headers).unwrap_or_default(),
        },
    }
}
