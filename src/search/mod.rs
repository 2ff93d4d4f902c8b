//! Search module - inverted index, query engine and snippets / 搜索模块
//!
//! Architecture principles / 架构原则：
//! - The index only exposes primitive operations: insert, lookup, get_body
//! - The caller drives walking, concurrency and cancellation
//! - Call direction: app → search (unidirectional) / 调用方向
//!
//! Two index stores share the same contract:
//! - `DbIndex`: SQLite file, one transaction per document (used by the CLI)
//! - `MemoryIndex`: in-process hash maps, nothing persisted

pub mod db_index;
pub mod memory_index;
pub mod query;
pub mod schema;
pub mod snippet;
pub mod tokenizer;

use async_trait::async_trait;

use crate::error::Result;

pub use db_index::DbIndex;
pub use memory_index::MemoryIndex;
pub use query::{Clause, Query, QueryEngine};
pub use schema::{DocId, IndexStats, Match, Position, Posting, SearchResult};
pub use snippet::extract;

/// Inverted index contract / 倒排索引接口
#[async_trait]
pub trait IndexStore: Send + Sync {
    /// Store the body verbatim and post every term it contains / 索引单个文档
    ///
    /// Identifiers are not checked for uniqueness; each call adds a new row.
    async fn insert(&self, identifier: &str, body: &str) -> Result<DocId>;

    /// Full posting list of a term, empty when absent / 查询倒排列表
    async fn lookup(&self, term: &str) -> Result<Vec<Posting>>;

    /// Stored body of a document, `NotFound` when absent / 获取文档正文
    async fn get_body(&self, doc: DocId) -> Result<String>;

    /// Index statistics / 索引统计
    async fn stats(&self) -> Result<IndexStats>;
}
