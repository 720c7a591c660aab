//! Middleware module for the Cortex HTTP server
//!
//! Provides:
//! - Master key authentication for `/v1/*`

pub mod auth;
