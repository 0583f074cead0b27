//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Client identification (peer address, forwarded IP, user agent)
//! - Bearer credential extraction

pub mod client;
