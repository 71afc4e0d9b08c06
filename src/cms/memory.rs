//! In-memory content API
//!
//! Serves a fixed list of documents with the same search semantics as the
//! remote API (type/uid/id predicates, orderings, `after`, page size and
//! next-page cursors). Used by the test suite and by `--fixtures` runs, and
//! records the queries it answers.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::Mutex;

use super::error::CmsError;
use super::types::{ApiPage, Cursor, RawDocument};
use super::{ContentApi, Direction, OrderField, Predicate, Query};

/// Prefix of every cursor this API hands out
pub const ENDPOINT: &str = "memory://cms/api/v2";

/// Queries kept for cursors and inspection; older ones are forgotten
pub const MAX_RECORDED_QUERIES: usize = 1024;

/// Most recent queries, addressed by their absolute position
#[derive(Default)]
struct QueryLog {
    entries: VecDeque<Query>,
    /// Number of queries already evicted from the front
    evicted: usize,
}

impl QueryLog {
    fn push(&mut self, query: Query) -> usize {
        if self.entries.len() == MAX_RECORDED_QUERIES {
            self.entries.pop_front();
            self.evicted += 1;
        }
        self.entries.push_back(query);
        self.evicted + self.entries.len() - 1
    }

    fn get(&self, index: usize) -> Option<&Query> {
        self.entries.get(index.checked_sub(self.evicted)?)
    }
}

/// A content API backed by a document list
#[derive(Default)]
pub struct InMemoryApi {
    documents: Vec<RawDocument>,
    log: Mutex<QueryLog>,
    failures: Mutex<u32>,
}

impl InMemoryApi {
    pub fn new(documents: Vec<RawDocument>) -> Self {
        Self {
            documents,
            log: Mutex::new(QueryLog::default()),
            failures: Mutex::new(0),
        }
    }

    /// Load documents from a JSON file holding either an array of documents
    /// or a search response (`{"results": [...]}`)
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let value: serde_json::Value = serde_json::from_str(&content)?;
        let documents: Vec<RawDocument> = match value {
            serde_json::Value::Array(_) => serde_json::from_value(value)?,
            other => serde_json::from_value::<ApiPage>(other)?.results,
        };
        tracing::info!("Loaded {} fixture documents from {:?}", documents.len(), path);
        Ok(Self::new(documents))
    }

    /// Make the next `count` calls fail with a network error
    pub fn fail_next(&self, count: u32) {
        if let Ok(mut failures) = self.failures.lock() {
            *failures = count;
        }
    }

    /// The most recent queries answered, oldest first
    pub fn queries(&self) -> Vec<Query> {
        self.log
            .lock()
            .map(|log| log.entries.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn check_failure(&self) -> Result<(), CmsError> {
        let mut failures = self
            .failures
            .lock()
            .map_err(|e| CmsError::Network(e.to_string()))?;
        if *failures > 0 {
            *failures -= 1;
            return Err(CmsError::Network("simulated outage".to_string()));
        }
        Ok(())
    }

    fn record(&self, query: &Query) -> usize {
        match self.log.lock() {
            Ok(mut log) => log.push(query.clone()),
            Err(_) => 0,
        }
    }

    fn recorded(&self, index: usize) -> Option<Query> {
        self.log.lock().ok()?.get(index).cloned()
    }

    fn matches(doc: &RawDocument, predicate: &Predicate) -> bool {
        match predicate {
            Predicate::DocumentType(t) => doc.doc_type == *t,
            Predicate::Uid { doc_type, uid } => {
                doc.doc_type == *doc_type && doc.uid.as_deref() == Some(uid.as_str())
            }
            Predicate::Id(id) => doc.id == *id,
        }
    }

    fn sort_key(doc: &RawDocument, field: OrderField) -> &str {
        let value = match field {
            OrderField::FirstPublicationDate => &doc.first_publication_date,
            OrderField::LastPublicationDate => &doc.last_publication_date,
        };
        value.as_deref().unwrap_or("")
    }

    /// Matching documents in result order, before paging
    fn select(&self, query: &Query) -> Vec<RawDocument> {
        let mut docs: Vec<RawDocument> = self
            .documents
            .iter()
            .filter(|d| query.predicates.iter().all(|p| Self::matches(d, p)))
            .cloned()
            .collect();

        if !query.orderings.is_empty() {
            docs.sort_by(|a, b| {
                query
                    .orderings
                    .iter()
                    .map(|o| {
                        let ord = Self::sort_key(a, o.field).cmp(Self::sort_key(b, o.field));
                        match o.direction {
                            Direction::Asc => ord,
                            Direction::Desc => ord.reverse(),
                        }
                    })
                    .find(|ord| ord.is_ne())
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
        }

        if let Some(after) = &query.after {
            docs = match docs.iter().position(|d| d.id == *after) {
                Some(pos) => docs.split_off(pos + 1),
                None => Vec::new(),
            };
        }

        docs
    }

    /// Page `page` (1-based) of a query, `None` when the number is out of range
    fn page(&self, query_index: usize, query: &Query, page: usize) -> Option<ApiPage> {
        let docs = self.select(query);
        let size = query.page_size.max(1);
        let start = page.checked_sub(1)?.checked_mul(size)?;
        let results: Vec<RawDocument> = docs.iter().skip(start).take(size).cloned().collect();
        let next_page = if start.saturating_add(size) < docs.len() {
            Some(Cursor::new(format!(
                "{}/documents/search?query={}&page={}",
                ENDPOINT,
                query_index,
                page.checked_add(1)?
            )))
        } else {
            None
        };

        Some(ApiPage { next_page, results })
    }
}

#[async_trait]
impl ContentApi for InMemoryApi {
    async fn query(&self, query: &Query) -> Result<ApiPage, CmsError> {
        self.check_failure()?;
        let index = self.record(query);
        Ok(self.page(index, query, 1).unwrap_or_default())
    }

    async fn next_page(&self, cursor: &Cursor) -> Result<ApiPage, CmsError> {
        self.check_failure()?;
        let invalid = || CmsError::InvalidCursor(cursor.to_string());

        let params = cursor
            .as_str()
            .strip_prefix(&format!("{}/documents/search?", ENDPOINT))
            .ok_or_else(invalid)?;

        let mut query_index = None;
        let mut page = None;
        for pair in params.split('&') {
            match pair.split_once('=') {
                Some(("query", v)) => query_index = v.parse::<usize>().ok(),
                Some(("page", v)) => page = v.parse::<usize>().ok(),
                _ => {}
            }
        }
        let (query_index, page) = query_index.zip(page).ok_or_else(invalid)?;
        let query = self.recorded(query_index).ok_or_else(invalid)?;
        self.page(query_index, &query, page).ok_or_else(invalid)
    }
}
