//! User profiles
//!
//! Per-user communication preferences stored in the cache store under
//! `user_dna:{user}` and rendered into the system message.

use crate::cache::CacheStore;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

fn default_style() -> String {
    "balanced".to_string()
}

fn default_tone() -> String {
    "professional".to_string()
}

fn default_skill_level() -> String {
    "intermediate".to_string()
}

/// Communication preferences of one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// concise, detailed, balanced or conversational
    #[serde(default = "default_style")]
    pub style: String,
    /// professional, casual, friendly or formal
    #[serde(default = "default_tone")]
    pub tone: String,
    /// beginner, intermediate, advanced or expert
    #[serde(default = "default_skill_level")]
    pub skill_level: String,
    /// Free-form preferences
    #[serde(default)]
    pub preferences: BTreeMap<String, String>,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            style: default_style(),
            tone: default_tone(),
            skill_level: default_skill_level(),
            preferences: BTreeMap::new(),
        }
    }
}

impl UserProfile {
    /// Render as a system-prompt block
    #[must_use]
    pub fn render(&self) -> String {
        let mut block = format!(
            "[USER PROFILE]\nCommunication Style: {}\nPreferred Tone: {}\nTechnical Level: {}",
            self.style, self.tone, self.skill_level
        );
        if !self.preferences.is_empty() {
            block.push_str("\nPreferences:");
            for (key, value) in &self.preferences {
                block.push_str(&format!("\n  - {key}: {value}"));
            }
        }
        block.push_str("\n[END PROFILE]\n\n");
        block
    }
}

fn profile_key(user_id: &str) -> String {
    format!("user_dna:{user_id}")
}

/// Loads and saves profiles through the cache store
#[derive(Clone)]
pub struct ProfileStore {
    cache: Arc<dyn CacheStore>,
}

impl ProfileStore {
    /// Create a store backed by `cache`
    pub fn new(cache: Arc<dyn CacheStore>) -> Self {
        Self { cache }
    }

    /// Profile for `user_id`; the default on miss, parse failure or cache error
    pub async fn get(&self, user_id: &str) -> UserProfile {
        if user_id.is_empty() {
            return UserProfile::default();
        }
        match self.cache.get(&profile_key(user_id)).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(profile) => {
                    debug!(user_id = %user_id, "User profile loaded");
                    profile
                }
                Err(e) => {
                    warn!(user_id = %user_id, error = %e, "User profile unreadable, using default");
                    UserProfile::default()
                }
            },
            Ok(None) => UserProfile::default(),
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "Profile store unavailable, using default");
                UserProfile::default()
            }
        }
    }

    /// Persist a profile (no expiry)
    pub async fn update(&self, user_id: &str, profile: &UserProfile) -> Result<()> {
        let raw = serde_json::to_string(profile)?;
        self.cache.set(&profile_key(user_id), &raw, None).await?;
        info!(
            user_id = %user_id,
            style = %profile.style,
            tone = %profile.tone,
            skill_level = %profile.skill_level,
            "User profile updated"
        );
        Ok(())
    }
}

impl std::fmt::Debug for ProfileStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileStore")
            .field("backend", &self.cache.backend())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::InMemoryCache;

    #[test]
    fn test_default_render() {
        assert_eq!(
            UserProfile::default().render(),
            "[USER PROFILE]\nCommunication Style: balanced\nPreferred Tone: professional\nTechnical Level: intermediate\n[END PROFILE]\n\n"
        );
    }

    #[test]
    fn test_render_with_preferences() {
        let mut profile = UserProfile::default();
        profile.preferences.insert("language".to_string(), "rust".to_string());
        assert!(profile
            .render()
            .ends_with("Technical Level: intermediate\nPreferences:\n  - language: rust\n[END PROFILE]\n\n"));
    }

    #[tokio::test]
    async fn test_round_trip_and_defaults() {
        let cache = Arc::new(InMemoryCache::new());
        let store = ProfileStore::new(cache.clone());

        assert_eq!(store.get("u1").await, UserProfile::default());

        let profile = UserProfile {
            style: "concise".to_string(),
            skill_level: "expert".to_string(),
            ..UserProfile::default()
        };
        store.update("u1", &profile).await.unwrap();
        assert_eq!(store.get("u1").await, profile);

        cache.set("user_dna:u2", "not json", None).await.unwrap();
        assert_eq!(store.get("u2").await, UserProfile::default());
    }

    #[tokio::test]
    async fn test_partial_profile_fills_defaults() {
        let cache = Arc::new(InMemoryCache::new());
        cache
            .set("user_dna:u3", r#"{"tone":"casual"}"#, None)
            .await
            .unwrap();
        let profile = ProfileStore::new(cache).get("u3").await;
        assert_eq!(profile.tone, "casual");
        assert_eq!(profile.style, "balanced");
    }
}
