//! In-memory inverted index / 内存倒排索引
//!
//! Same contract as the SQLite index, nothing is persisted. Each insert takes
//! the write locks in a fixed order (documents, then postings) so readers never
//! see postings for a body that is not stored yet.

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;

use super::schema::{group_positions, DocId, IndexStats, Position};
use super::{IndexStore, Posting};
use crate::error::{Error, Result};

/// Inverted index entry / 倒排索引条目
#[derive(Debug, Clone)]
struct PostingEntry {
    doc: DocId,
    positions: Vec<Position>,
}

#[derive(Debug, Clone)]
struct StoredDocument {
    identifier: String,
    body: String,
}

/// In-memory index / 内存索引
pub struct MemoryIndex {
    /// Document storage: doc id -> document / 文档存储
    documents: RwLock<HashMap<DocId, StoredDocument>>,
    /// Inverted index: term -> [PostingEntry] / 倒排索引
    inverted_index: RwLock<HashMap<String, Vec<PostingEntry>>>,
    next_id: Mutex<DocId>,
    last_updated: Mutex<Option<i64>>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(HashMap::new()),
            inverted_index: RwLock::new(HashMap::new()),
            next_id: Mutex::new(1),
            last_updated: Mutex::new(None),
        }
    }

    /// 获取文档数量
    pub fn document_count(&self) -> usize {
        self.documents.read().len()
    }
}

impl Default for MemoryIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IndexStore for MemoryIndex {
    async fn insert(&self, identifier: &str, body: &str) -> Result<DocId> {
        let grouped = group_positions(body);

        let doc = {
            let mut next_id = self.next_id.lock();
            let id = *next_id;
            *next_id += 1;
            id
        };

        let mut docs = self.documents.write();
        let mut index = self.inverted_index.write();
        docs.insert(
            doc,
            StoredDocument {
                identifier: identifier.to_string(),
                body: body.to_string(),
            },
        );
        for (term, positions) in grouped {
            index.entry(term).or_default().push(PostingEntry { doc, positions });
        }
        drop(index);
        drop(docs);

        *self.last_updated.lock() = Some(chrono::Utc::now().timestamp());
        Ok(doc)
    }

    async fn lookup(&self, term: &str) -> Result<Vec<Posting>> {
        let docs = self.documents.read();
        let index = self.inverted_index.read();

        let Some(entries) = index.get(term) else {
            return Ok(Vec::new());
        };

        entries
            .iter()
            .map(|entry| {
                let stored = docs
                    .get(&entry.doc)
                    .ok_or_else(|| Error::NotFound(entry.doc.to_string()))?;
                Ok(Posting {
                    doc: entry.doc,
                    identifier: stored.identifier.clone(),
                    positions: entry.positions.clone(),
                })
            })
            .collect()
    }

    async fn get_body(&self, doc: DocId) -> Result<String> {
        self.documents
            .read()
            .get(&doc)
            .map(|d| d.body.clone())
            .ok_or_else(|| Error::NotFound(doc.to_string()))
    }

    async fn stats(&self) -> Result<IndexStats> {
        Ok(IndexStats {
            document_count: self.documents.read().len() as u64,
            term_count: self.inverted_index.read().len() as u64,
            last_updated: *self.last_updated.lock(),
        })
    }
}
