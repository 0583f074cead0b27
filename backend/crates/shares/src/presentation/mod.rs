//! Presentation Layer
//!
//! HTTP handler, DTOs, response normalizer and router.

pub mod dto;
pub mod handlers;
pub mod normalizer;
pub mod router;

pub use handlers::ShareAppState;
pub use normalizer::normalize_share;
pub use router::{share_router, share_router_generic};
