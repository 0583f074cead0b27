use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{DateTime, Utc};
use http_body_util::BodyExt;
use kernel::error::kind::ErrorKind;
use kernel::id::{CompanyId, MemberId, UserId};
use serde_json::{Value, json};
use tower::ServiceExt;
use tracing::Level;

use crate::application::{IssueSharesInput, IssueSharesUseCase, ShareConfig};
use crate::domain::{
    Company, CompanyAuth, CompanyAuthResolver, IssuanceOutcome, IssueShareCommand, Member,
    MemberStatus, RequestContext, RequestProvenance, ShareIssuanceService, ShareRecord,
    ShareStatus, ShareTerms, User,
};
use crate::error::{GENERIC_FAILURE_MESSAGE, ShareError, ShareResult};
use crate::infra::memory::{InMemoryShareRepository, LedgerSeed};
use crate::presentation::dto::{IssueShareRequest, IssueSharesResponse};
use crate::presentation::router::{share_router, share_router_generic};

const COMPANY: &str = "clycjihpy0002c5fzcyf4gjjc";

// ============================================================================
// Fakes
// ============================================================================

#[derive(Clone, Copy)]
enum ResolverReply {
    Grant,
    Unauthenticated,
    Forbidden,
    NotFound,
}

struct FakeResolver {
    reply: ResolverReply,
    calls: Arc<AtomicUsize>,
}

impl FakeResolver {
    fn new(reply: ResolverReply) -> Self {
        Self {
            reply,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl CompanyAuthResolver for FakeResolver {
    async fn resolve(
        &self,
        _ctx: &RequestContext,
        company_id: &CompanyId,
    ) -> ShareResult<CompanyAuth> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.reply {
            ResolverReply::Grant => Ok(auth_for(company_id.clone())),
            ResolverReply::Unauthenticated => Err(ShareError::Unauthenticated),
            ResolverReply::Forbidden => Err(ShareError::Forbidden),
            ResolverReply::NotFound => Err(ShareError::CompanyNotFound),
        }
    }
}

struct FakeService {
    reply: IssuanceOutcome,
    fail_with: Option<fn() -> ShareError>,
    calls: Arc<AtomicUsize>,
    last_command: std::sync::Mutex<Option<IssueShareCommand>>,
}

impl FakeService {
    fn new(reply: IssuanceOutcome) -> Self {
        Self {
            reply,
            fail_with: None,
            calls: Arc::new(AtomicUsize::new(0)),
            last_command: std::sync::Mutex::new(None),
        }
    }

    fn failing(error: fn() -> ShareError) -> Self {
        Self {
            fail_with: Some(error),
            ..Self::new(IssuanceOutcome::rejected("unused"))
        }
    }
}

impl ShareIssuanceService for FakeService {
    async fn issue(&self, command: IssueShareCommand) -> ShareResult<IssuanceOutcome> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_command.lock().unwrap() = Some(command);
        match self.fail_with {
            Some(error) => Err(error()),
            None => Ok(self.reply.clone()),
        }
    }
}

fn auth_for(company_id: CompanyId) -> CompanyAuth {
    let user_id = UserId::parse("cuser0000000000000000001").unwrap();
    CompanyAuth {
        company: Company {
            id: company_id.clone(),
            name: "Acme Inc.".to_string(),
        },
        member: Member {
            id: MemberId::parse("cmember00000000000000001").unwrap(),
            company_id,
            user_id: user_id.clone(),
            status: MemberStatus::Active,
        },
        user: User {
            id: user_id,
            name: Some("Ada Lovelace".to_string()),
        },
    }
}

/// Payload carrying only status, certificateId, quantity and shareClassId
fn minimal_record() -> ShareRecord {
    ShareRecord::new(
        CompanyId::parse(COMPANY).unwrap(),
        ShareStatus::Draft,
        "CS-1",
        100,
        "sc_1",
    )
}

fn minimal_terms() -> ShareTerms {
    IssueShareRequest::from_json(minimal_body())
        .unwrap()
        .into_terms()
        .unwrap()
}

fn minimal_body() -> Value {
    json!({ "shareClassId": "sc_1", "quantity": 100, "stakeholderId": "stk_1" })
}

// ============================================================================
// Harness
// ============================================================================

struct Harness {
    router: Router,
    resolver_calls: Arc<AtomicUsize>,
    service_calls: Arc<AtomicUsize>,
    service: Arc<FakeService>,
}

fn harness(reply: ResolverReply, outcome: IssuanceOutcome) -> Harness {
    harness_with_config(reply, outcome, ShareConfig::default())
}

fn harness_with_config(reply: ResolverReply, outcome: IssuanceOutcome, config: ShareConfig) -> Harness {
    harness_with_service(reply, FakeService::new(outcome), config)
}

fn harness_with_service(reply: ResolverReply, service: FakeService, config: ShareConfig) -> Harness {
    let resolver = Arc::new(FakeResolver::new(reply));
    let service = Arc::new(service);
    Harness {
        resolver_calls: resolver.calls.clone(),
        service_calls: service.calls.clone(),
        service: service.clone(),
        router: share_router_generic(resolver, service, config),
    }
}

fn post(path: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json")
        .header("authorization", "Bearer tok_ada")
        .header("user-agent", "curl/8.5.0")
        .header("x-forwarded-for", "198.51.100.4, 10.0.0.1")
        .body(body.into())
        .unwrap()
}

fn shares_path(company: &str) -> String {
    format!("/v1/companies/{company}/shares")
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

async fn send_json(router: Router, company: &str, body: Value) -> (StatusCode, Value) {
    send(router, post(&shares_path(company), body.to_string())).await
}

// ============================================================================
// Use case
// ============================================================================

#[tokio::test]
async fn test_use_case_calls_each_collaborator_once() {
    let resolver = Arc::new(FakeResolver::new(ResolverReply::Grant));
    let record = minimal_record();
    let service = Arc::new(FakeService::new(IssuanceOutcome::issued("ok", record.clone())));
    let use_case = IssueSharesUseCase::new(resolver.clone(), service.clone());

    let company_id = CompanyId::parse(COMPANY).unwrap();
    let auth = use_case
        .authorize(&RequestContext::default(), &company_id)
        .await
        .unwrap();
    let output = use_case
        .execute(IssueSharesInput {
            auth,
            terms: minimal_terms(),
            provenance: RequestProvenance::default(),
        })
        .await
        .unwrap();

    assert_eq!(output.message, "ok");
    assert_eq!(output.record, record);
    assert_eq!(resolver.calls.load(Ordering::SeqCst), 1);
    assert_eq!(service.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_use_case_masks_unsuccessful_outcomes() {
    let outcomes = [
        IssuanceOutcome::rejected("Stakeholder not found"),
        IssuanceOutcome {
            success: true,
            message: "ok".to_string(),
            data: None,
        },
        IssuanceOutcome {
            success: false,
            message: "partial".to_string(),
            data: Some(minimal_record()),
        },
    ];

    for outcome in outcomes {
        let resolver = Arc::new(FakeResolver::new(ResolverReply::Grant));
        let service = Arc::new(FakeService::new(outcome));
        let use_case = IssueSharesUseCase::new(resolver, service.clone());

        let err = use_case
            .execute(IssueSharesInput {
                auth: auth_for(CompanyId::parse(COMPANY).unwrap()),
                terms: minimal_terms(),
                provenance: RequestProvenance::default(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ShareError::IssuanceFailed));
        assert_eq!(service.calls.load(Ordering::SeqCst), 1);
    }
}

#[tokio::test]
async fn test_use_case_masks_service_errors() {
    let failures: [fn() -> ShareError; 3] = [
        || ShareError::invalid_field("stakeholderId", "Stakeholder stk_1 was archived"),
        || ShareError::CompanyNotFound,
        || ShareError::Internal("ledger unavailable".to_string()),
    ];

    for failure in failures {
        let resolver = Arc::new(FakeResolver::new(ResolverReply::Grant));
        let service = Arc::new(FakeService::failing(failure));
        let use_case = IssueSharesUseCase::new(resolver, service.clone());

        let err = use_case
            .execute(IssueSharesInput {
                auth: auth_for(CompanyId::parse(COMPANY).unwrap()),
                terms: minimal_terms(),
                provenance: RequestProvenance::default(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ShareError::IssuanceFailed));
        assert_eq!(service.calls.load(Ordering::SeqCst), 1);
    }
}

// ============================================================================
// Router
// ============================================================================

#[tokio::test]
async fn test_issue_minimal_payload_fills_defaults() {
    let h = harness(
        ResolverReply::Grant,
        IssuanceOutcome::issued("Successfully issued shares.", minimal_record()),
    );
    let before = Utc::now();

    let (status, body) = send_json(h.router, COMPANY, minimal_body()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Successfully issued shares.");

    let data = &body["data"];
    assert_eq!(data["status"], "DRAFT");
    assert_eq!(data["certificateId"], "CS-1");
    assert_eq!(data["quantity"], 100);
    assert_eq!(data["shareClassId"], "sc_1");
    for field in [
        "pricePerShare",
        "capitalContribution",
        "ipContribution",
        "debtCancelled",
        "otherContributions",
        "cliffYears",
        "vestingYears",
    ] {
        assert_eq!(data[field].as_f64(), Some(0.0), "{field}");
    }
    assert_eq!(data["companyLegends"], "");
    assert_eq!(data["stakeholderId"], "");

    let dates: Vec<&str> = ["issueDate", "rule144Date", "vestingStartDate", "boardApprovalDate"]
        .iter()
        .map(|field| data[*field].as_str().unwrap())
        .collect();
    assert!(dates.iter().all(|d| *d == dates[0]));
    let stamped = DateTime::parse_from_rfc3339(dates[0]).unwrap();
    assert!(stamped.with_timezone(&Utc) >= before - chrono::Duration::milliseconds(1));
    assert!(dates[0].ends_with('Z'));

    let parsed: IssueSharesResponse = serde_json::from_value(body).unwrap();
    assert_eq!(parsed.data.quantity, 100);
    assert_eq!(h.resolver_calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.service_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_issue_command_carries_identities_and_provenance() {
    let h = harness(
        ResolverReply::Grant,
        IssuanceOutcome::issued("ok", minimal_record()),
    );
    let body = json!({
        "shareClassId": "sc_1",
        "quantity": 100,
        "stakeholderId": "stk_1",
        "pricePerShare": 1.5,
        "issueDate": "2024-01-31T09:30:00.000Z",
        "unexpected": true
    });

    let (status, _) = send_json(h.router, COMPANY, body).await;
    assert_eq!(status, StatusCode::OK);

    let command = h.service.last_command.lock().unwrap().clone().unwrap();
    assert_eq!(command.company_id().as_str(), COMPANY);
    assert_eq!(command.member_id().as_str(), "cmember00000000000000001");
    assert_eq!(command.user().name, "Ada Lovelace");
    assert_eq!(command.provenance().request_ip, "198.51.100.4");
    assert_eq!(command.provenance().user_agent, "curl/8.5.0");
    assert_eq!(command.terms().stakeholder_id, "stk_1");
    assert_eq!(command.terms().price_per_share, Some(1.5));
    assert!(command.terms().issue_date.is_some());
    assert_eq!(command.terms().status, None);
}

#[tokio::test]
async fn test_forwarded_for_ignored_when_untrusted() {
    let h = harness_with_config(
        ResolverReply::Grant,
        IssuanceOutcome::issued("ok", minimal_record()),
        ShareConfig::direct(),
    );

    let (status, _) = send_json(h.router, COMPANY, minimal_body()).await;
    assert_eq!(status, StatusCode::OK);

    // No peer address in oneshot requests, so nothing is recorded
    let command = h.service.last_command.lock().unwrap().clone().unwrap();
    assert_eq!(command.provenance().request_ip, "");
}

#[tokio::test]
async fn test_invalid_company_id_skips_resolver() {
    let h = harness(
        ResolverReply::Grant,
        IssuanceOutcome::issued("ok", minimal_record()),
    );

    let (status, body) = send_json(h.router, "not-a-cuid", minimal_body()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
    assert_eq!(body["errors"][0]["field"], "id");
    assert_eq!(h.resolver_calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.service_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_missing_required_field_skips_service() {
    let h = harness(
        ResolverReply::Grant,
        IssuanceOutcome::issued("ok", minimal_record()),
    );

    let body = json!({ "quantity": 100, "stakeholderId": "stk_1" });
    let (status, body) = send_json(h.router, COMPANY, body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], "shareClassId");
    assert_eq!(h.resolver_calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.service_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_value_constraints_reported_per_field() {
    let h = harness(
        ResolverReply::Grant,
        IssuanceOutcome::issued("ok", minimal_record()),
    );

    let body = json!({
        "shareClassId": "",
        "quantity": 0,
        "stakeholderId": "stk_1",
        "pricePerShare": -1.0
    });
    let (status, body) = send_json(h.router, COMPANY, body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, ["shareClassId", "quantity", "pricePerShare"]);
    assert_eq!(h.service_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_malformed_json_is_client_error() {
    let h = harness(
        ResolverReply::Grant,
        IssuanceOutcome::issued("ok", minimal_record()),
    );

    let (status, body) = send(h.router, post(&shares_path(COMPANY), "{\"quantity\":")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], "body");
    assert_eq!(body["errors"][0]["message"], "is not valid JSON");
    assert_eq!(h.service_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_mistyped_field_attributed_by_name() {
    let h = harness(
        ResolverReply::Grant,
        IssuanceOutcome::issued("ok", minimal_record()),
    );

    let body = json!({ "shareClassId": "sc_1", "quantity": "ten", "stakeholderId": "stk_1" });
    let (status, body) = send_json(h.router, COMPANY, body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], "quantity");
    assert_eq!(h.service_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_missing_content_type_is_client_error() {
    let h = harness(
        ResolverReply::Grant,
        IssuanceOutcome::issued("ok", minimal_record()),
    );

    let request = Request::builder()
        .method("POST")
        .uri(shares_path(COMPANY))
        .header("authorization", "Bearer tok_ada")
        .body(Body::from(minimal_body().to_string()))
        .unwrap();
    let (status, body) = send(h.router, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], "body");
    assert_eq!(h.service_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_resolver_failures_map_to_status() {
    let cases = [
        (ResolverReply::Unauthenticated, StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
        (ResolverReply::Forbidden, StatusCode::FORBIDDEN, "FORBIDDEN"),
        (ResolverReply::NotFound, StatusCode::NOT_FOUND, "NOT_FOUND"),
    ];

    for (reply, expected, code) in cases {
        let h = harness(reply, IssuanceOutcome::issued("ok", minimal_record()));

        let (status, body) = send_json(h.router, COMPANY, minimal_body()).await;

        assert_eq!(status, expected);
        assert_eq!(body["code"], code);
        assert_eq!(h.resolver_calls.load(Ordering::SeqCst), 1);
        assert_eq!(h.service_calls.load(Ordering::SeqCst), 0);
    }
}

#[tokio::test]
async fn test_service_failure_hides_service_message() {
    let h = harness(
        ResolverReply::Grant,
        IssuanceOutcome::rejected("Certificate ID CS-1 is already in use"),
    );

    let (status, body) = send_json(h.router, COMPANY, minimal_body()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "INTERNAL_SERVER_ERROR");
    assert_eq!(body["detail"], GENERIC_FAILURE_MESSAGE);
    assert!(!body.to_string().contains("CS-1"));
    assert_eq!(h.service_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_service_error_hides_domain_detail() {
    let h = harness_with_service(
        ResolverReply::Grant,
        FakeService::failing(|| {
            ShareError::invalid_field("stakeholderId", "Stakeholder stk_1 was archived by admin")
        }),
        ShareConfig::default(),
    );

    let (status, body) = send_json(h.router, COMPANY, minimal_body()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "INTERNAL_SERVER_ERROR");
    assert_eq!(body["detail"], GENERIC_FAILURE_MESSAGE);
    assert!(body.get("errors").is_none());
    assert!(!body.to_string().contains("archived"));
    assert_eq!(h.service_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_oversized_body_rejected() {
    let config = ShareConfig {
        max_body_bytes: 64,
        ..ShareConfig::default()
    };
    // Size is checked before credentials.
    let h = harness_with_config(
        ResolverReply::Unauthenticated,
        IssuanceOutcome::issued("ok", minimal_record()),
        config,
    );

    let body = json!({
        "shareClassId": "sc_1",
        "quantity": 100,
        "stakeholderId": "stk_1",
        "companyLegends": "x".repeat(256)
    });
    let (status, body) = send_json(h.router, COMPANY, body).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["code"], "PAYLOAD_TOO_LARGE");
    assert_eq!(h.resolver_calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.service_calls.load(Ordering::SeqCst), 0);
}

// ============================================================================
// In-memory ledger through the router
// ============================================================================

fn seeded_router() -> (Router, InMemoryShareRepository) {
    let seed: LedgerSeed = serde_json::from_value(json!({
        "users": [
            { "id": "cuser0000000000000000001", "name": "Ada Lovelace", "apiTokens": ["tok_ada"] }
        ],
        "companies": [{
            "id": COMPANY,
            "name": "Acme Inc.",
            "stakeholders": ["stk_1"],
            "shareClasses": ["sc_1"],
            "members": [
                { "id": "cmember00000000000000001", "userId": "cuser0000000000000000001" }
            ]
        }]
    }))
    .unwrap();
    let repo = InMemoryShareRepository::from_seed(seed);
    (share_router(repo.clone(), ShareConfig::default()), repo)
}

#[tokio::test]
async fn test_seeded_ledger_end_to_end() {
    let (router, repo) = seeded_router();

    let (status, body) = send_json(router, COMPANY, minimal_body()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Successfully issued shares.");
    assert_eq!(body["data"]["status"], "DRAFT");
    assert_eq!(body["data"]["certificateId"], "CS-1");
    assert_eq!(body["data"]["stakeholderId"], "stk_1");

    let company = CompanyId::parse(COMPANY).unwrap();
    assert_eq!(repo.shares_for(&company).await.len(), 1);
    let events = repo.audit_events().await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].request_ip, "198.51.100.4");
}

#[tokio::test]
async fn test_seeded_ledger_unknown_share_class() {
    let (router, repo) = seeded_router();

    let body = json!({ "shareClassId": "sc_404", "quantity": 5, "stakeholderId": "stk_1" });
    let (status, body) = send_json(router, COMPANY, body).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["detail"], GENERIC_FAILURE_MESSAGE);
    assert!(repo.audit_events().await.is_empty());
}

#[tokio::test]
async fn test_seeded_ledger_without_token() {
    let (router, _) = seeded_router();

    let request = Request::builder()
        .method("POST")
        .uri(shares_path(COMPANY))
        .header("content-type", "application/json")
        .body(Body::from(minimal_body().to_string()))
        .unwrap();
    let (status, body) = send(router, request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["action"].is_string());
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_error_status_codes() {
    assert_eq!(
        ShareError::invalid_field("quantity", "must be at least 1").status_code(),
        StatusCode::BAD_REQUEST
    );
    assert_eq!(ShareError::PayloadTooLarge.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(ShareError::Unauthenticated.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(ShareError::Forbidden.status_code(), StatusCode::FORBIDDEN);
    assert_eq!(ShareError::CompanyNotFound.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(
        ShareError::IssuanceFailed.status_code(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

#[test]
fn test_server_errors_render_generic_detail() {
    for error in [
        ShareError::Internal("connection reset by peer".to_string()),
        ShareError::IssuanceFailed,
    ] {
        let app = error.into_app_error();
        assert_eq!(app.message(), GENERIC_FAILURE_MESSAGE);
        assert!(app.is_server_error());
        assert!(std::error::Error::source(&app).is_some());
    }
}

#[test]
fn test_client_errors_keep_their_kind() {
    let app = ShareError::Forbidden.into_app_error();
    assert_eq!(app.kind(), ErrorKind::Forbidden);
    assert!(std::error::Error::source(&app).is_none());

    let app = ShareError::PayloadTooLarge.into_app_error();
    assert_eq!(app.status_code(), 413);
    assert!(app.action().is_some());

    let app = ShareError::invalid_field("quantity", "must be at least 1").into_app_error();
    assert_eq!(app.field_errors().len(), 1);
}

#[test]
fn test_error_log_levels() {
    assert_eq!(ShareError::Internal("boom".to_string()).log_level(), Level::ERROR);
    assert_eq!(ShareError::Forbidden.log_level(), Level::WARN);
    // Logged at warn with the service message where it is raised
    assert_eq!(ShareError::IssuanceFailed.log_level(), Level::DEBUG);
    assert_eq!(ShareError::Unauthenticated.log_level(), Level::DEBUG);
}
