use super::VectorMemory;
use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;

const MAX_ENTRIES_PER_USER: usize = 200;

#[derive(Debug, Clone)]
struct StoredSummary {
    summary: String,
    terms: HashSet<String>,
}

fn terms(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.len() > 2)
        .map(str::to_lowercase)
        .collect()
}

/// Process-local memory ranked by term overlap
///
/// Stands in for a vector store in single-node deployments and tests.
/// Each user keeps at most a fixed number of summaries, oldest evicted first.
#[derive(Debug, Default)]
pub struct LocalMemory {
    users: RwLock<HashMap<String, Vec<StoredSummary>>>,
}

impl LocalMemory {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VectorMemory for LocalMemory {
    async fn retrieve(&self, user_id: &str, query: &str, top_k: usize) -> Result<Vec<String>> {
        let query_terms = terms(query);
        let users = self.users.read().await;
        let Some(entries) = users.get(user_id) else {
            return Ok(Vec::new());
        };

        let mut ranked: Vec<(usize, usize, &str)> = entries
            .iter()
            .enumerate()
            .map(|(age, e)| (e.terms.intersection(&query_terms).count(), age, e.summary.as_str()))
            .filter(|(overlap, _, _)| *overlap > 0)
            .collect();
        // Highest overlap first, newest first among equals
        ranked.sort_by(|a, b| b.0.cmp(&a.0).then(b.1.cmp(&a.1)));

        Ok(ranked
            .into_iter()
            .take(top_k)
            .map(|(_, _, s)| s.to_string())
            .collect())
    }

    async fn store(&self, user_id: &str, summary: &str, _context: Value) -> Result<()> {
        let mut users = self.users.write().await;
        let entries = users.entry(user_id.to_string()).or_default();
        entries.push(StoredSummary {
            summary: summary.to_string(),
            terms: terms(summary),
        });
        if entries.len() > MAX_ENTRIES_PER_USER {
            let excess = entries.len() - MAX_ENTRIES_PER_USER;
            entries.drain(..excess);
        }
        Ok(())
    }
}
