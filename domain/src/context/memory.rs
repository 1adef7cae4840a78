//! Working memory
//!
//! A bounded (drop-oldest) store of typed items with a simple
//! keyword-overlap relevance score. Not a vector store; just enough
//! recall for agents to stash and retrieve notes during a run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use uuid::Uuid;

pub const DEFAULT_MAX_ITEMS: usize = 1000;

/// An item stored in working memory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryItem {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub kind: String,
    pub content: String,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl MemoryItem {
    pub fn new(kind: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            kind: kind.into(),
            content: content.into(),
            metadata: HashMap::new(),
        }
    }

    /// Item age in seconds
    pub fn age_secs(&self) -> i64 {
        (Utc::now() - self.timestamp).num_seconds()
    }

    /// Fraction of query terms appearing in the item content, 0.0 to 1.0.
    pub fn relevance_score(&self, query: &str) -> f64 {
        if query.is_empty() {
            return 0.0;
        }
        let terms: HashSet<String> = query.split_whitespace().map(str::to_lowercase).collect();
        let content = self.content.to_lowercase();
        let matches = terms.iter().filter(|term| content.contains(term.as_str())).count();
        (matches as f64 / terms.len().max(1) as f64).min(1.0)
    }
}

/// Bounded drop-oldest item store.
///
/// Invariant: `items.len() <= max_items` after every insert.
#[derive(Debug, Clone)]
pub struct WorkingMemory {
    items: VecDeque<MemoryItem>,
    max_items: usize,
}

impl Default for WorkingMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkingMemory {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_ITEMS)
    }

    pub fn with_capacity(max_items: usize) -> Self {
        Self {
            items: VecDeque::new(),
            max_items,
        }
    }

    /// Add an item, evicting the oldest if full. Returns the item id.
    pub fn add(&mut self, item: MemoryItem) -> String {
        let id = item.id.clone();
        self.items.push_back(item);
        while self.items.len() > self.max_items {
            self.items.pop_front();
        }
        id
    }

    pub fn get(&self, item_id: &str) -> Option<&MemoryItem> {
        self.items.iter().find(|item| item.id == item_id)
    }

    /// Remove an item by id. Returns false if not found.
    pub fn remove(&mut self, item_id: &str) -> bool {
        if let Some(pos) = self.items.iter().position(|item| item.id == item_id) {
            self.items.remove(pos);
            return true;
        }
        false
    }

    pub fn get_by_kind(&self, kind: &str) -> Vec<&MemoryItem> {
        self.items.iter().filter(|item| item.kind == kind).collect()
    }

    /// The `limit` most relevant items for a query, best first.
    /// Zero-relevance items are excluded.
    pub fn search(&self, query: &str, limit: usize) -> Vec<&MemoryItem> {
        let mut scored: Vec<(f64, &MemoryItem)> = self
            .items
            .iter()
            .map(|item| (item.relevance_score(query), item))
            .filter(|(score, _)| *score > 0.0)
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.into_iter().take(limit).map(|(_, item)| item).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}
