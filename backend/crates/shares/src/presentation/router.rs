//! Share Router

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::{Router, routing::post};

use crate::application::config::ShareConfig;
use crate::domain::service::{CompanyAuthResolver, ShareIssuanceService};
use crate::infra::memory::InMemoryShareRepository;
use crate::presentation::handlers::{self, ShareAppState};

/// Create the share router backed by the in-memory ledger
pub fn share_router(repo: InMemoryShareRepository, config: ShareConfig) -> Router {
    let repo = Arc::new(repo);
    share_router_generic(repo.clone(), repo, config)
}

/// Create a share router for any resolver / issuance service pair
pub fn share_router_generic<A, S>(resolver: Arc<A>, service: Arc<S>, config: ShareConfig) -> Router
where
    A: CompanyAuthResolver + Send + Sync + 'static,
    S: ShareIssuanceService + Send + Sync + 'static,
{
    let body_limit = DefaultBodyLimit::max(config.max_body_bytes);
    let state = ShareAppState {
        resolver,
        service,
        config: Arc::new(config),
    };

    Router::new()
        .route(
            "/v1/companies/{id}/shares",
            post(handlers::issue_shares::<A, S>),
        )
        .layer(body_limit)
        .with_state(state)
}
