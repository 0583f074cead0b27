//! Application Configuration
//!
//! Configuration for the share issuance endpoint.

/// Default JSON body limit (64 KiB)
pub const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024;

/// Share application configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareConfig {
    /// Honour X-Forwarded-For / X-Real-IP when recording the client IP
    pub trust_forwarded_for: bool,
    /// Maximum accepted request body size in bytes
    pub max_body_bytes: usize,
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            trust_forwarded_for: true,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl ShareConfig {
    /// Config for a server reachable without a reverse proxy
    /// (forwarding headers are client-controlled there)
    pub fn direct() -> Self {
        Self {
            trust_forwarded_for: false,
            ..Self::default()
        }
    }
}
