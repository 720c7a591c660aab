//! Authentication middleware for Axum
//!
//! Optional master key on the OpenAI-compatible surface. When a key is
//! configured, `/v1/*` handlers require `Authorization: Bearer <key>`.
//! Provides the `RequireMasterKey` extractor for handlers.

use crate::api::error::ApiError;
use axum::{extract::FromRequestParts, http::request::Parts};
use std::sync::Arc;

/// Configured master key (absent = authentication disabled)
#[derive(Clone, Default)]
pub struct MasterKey(Option<Arc<str>>);

impl MasterKey {
    pub fn new(key: Option<String>) -> Self {
        Self(key.filter(|k| !k.is_empty()).map(Arc::from))
    }

    pub fn is_enabled(&self) -> bool {
        self.0.is_some()
    }

    fn matches(&self, candidate: &str) -> bool {
        self.0.as_deref().map_or(true, |key| {
            key.len() == candidate.len()
                && key
                    .bytes()
                    .zip(candidate.bytes())
                    .fold(0u8, |acc, (a, b)| acc | (a ^ b))
                    == 0
        })
    }
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("MasterKey")
            .field(&if self.is_enabled() { "***" } else { "disabled" })
            .finish()
    }
}

// ============================================================================
// RequireMasterKey Extractor
// ============================================================================

/// Axum extractor that enforces the master key when one is configured
pub struct RequireMasterKey;

#[async_trait::async_trait]
impl<S> FromRequestParts<S> for RequireMasterKey
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let master_key = parts
            .extensions
            .get::<MasterKey>()
            .cloned()
            .unwrap_or_default();

        if !master_key.is_enabled() {
            return Ok(RequireMasterKey);
        }

        let token = extract_bearer(parts).ok_or_else(|| {
            ApiError::unauthorized("Missing API key. Provide Authorization: Bearer <key>.")
        })?;
        if master_key.matches(token) {
            Ok(RequireMasterKey)
        } else {
            Err(ApiError::unauthorized("Invalid API key"))
        }
    }
}

/// Token from `Authorization: Bearer <token>`
fn extract_bearer(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get("authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}
