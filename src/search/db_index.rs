//! SQLite inverted index / 数据库倒排索引
//!
//! Storage layout / 存储方案：
//! - documents: one row per inserted document (id, identifier, body)
//! - postings: one row per (term, document), positions as compact JSON
//! - index_meta: key/value, holds the last update time
//!
//! Each insert is a single transaction, so an interrupted build leaves a
//! readable index with whole documents only. WAL mode lets searches read while
//! a build is writing.

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Pool, Sqlite};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::schema::{group_positions, DocId, IndexStats, Position};
use super::{IndexStore, Posting};
use crate::config::DatabaseConfig;
use crate::error::{Error, Result};

/// 数据库搜索索引
pub struct DbIndex {
    db: Pool<Sqlite>,
    path: PathBuf,
}

impl DbIndex {
    /// Open (creating if absent) the index file and its tables / 打开或创建索引数据库
    pub async fn open(path: impl AsRef<Path>, config: &DatabaseConfig) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let options = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true)
            // 启用WAL模式，提高并发性能
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_millis(config.busy_timeout_ms));

        let db = SqlitePoolOptions::new()
            .max_connections(config.max_connections.max(1))
            .connect_with(options)
            .await?;

        let index = Self { db, path };
        index.init().await?;

        tracing::info!("Search database opened: {:?} (WAL mode)", index.path);
        Ok(index)
    }

    /// 关闭数据库连接池 / Close database connection pool
    pub async fn close(&self) {
        self.db.close().await;
        tracing::debug!("Search database closed: {:?}", self.path);
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 初始化表结构
    /// 只在表不存在时创建，不删除已有数据
    async fn init(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                id INTEGER PRIMARY KEY,
                identifier TEXT NOT NULL,
                body TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.db)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS postings (
                term TEXT NOT NULL,
                doc_id INTEGER NOT NULL REFERENCES documents(id),
                positions TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.db)
        .await?;

        // 索引：term 用于倒排查询
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_postings_term ON postings(term)")
            .execute(&self.db)
            .await?;

        // 元数据表：存储索引更新时间等信息
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS index_meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.db)
        .await?;

        Ok(())
    }

    /// 获取索引更新时间 / Get index last updated time
    pub async fn get_last_updated(&self) -> Result<Option<i64>> {
        let result: Option<(String,)> =
            sqlx::query_as("SELECT value FROM index_meta WHERE key = 'last_updated'")
                .fetch_optional(&self.db)
                .await?;

        Ok(result.and_then(|(v,)| v.parse::<i64>().ok()))
    }
}

#[async_trait]
impl IndexStore for DbIndex {
    async fn insert(&self, identifier: &str, body: &str) -> Result<DocId> {
        let grouped = group_positions(body);
        let mut tx = self.db.begin().await?;

        let doc = sqlx::query("INSERT INTO documents (identifier, body) VALUES (?, ?)")
            .bind(identifier)
            .bind(body)
            .execute(&mut *tx)
            .await?
            .last_insert_rowid();

        for (term, positions) in &grouped {
            let encoded = serde_json::to_string(positions)?;
            sqlx::query("INSERT INTO postings (term, doc_id, positions) VALUES (?, ?, ?)")
                .bind(term)
                .bind(doc)
                .bind(encoded)
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query("INSERT OR REPLACE INTO index_meta (key, value) VALUES ('last_updated', ?)")
            .bind(chrono::Utc::now().timestamp().to_string())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(doc)
    }

    async fn lookup(&self, term: &str) -> Result<Vec<Posting>> {
        let rows: Vec<(i64, String, String)> = sqlx::query_as(
            r#"
            SELECT p.doc_id, d.identifier, p.positions
            FROM postings p
            JOIN documents d ON d.id = p.doc_id
            WHERE p.term = ?
            ORDER BY p.doc_id
            "#,
        )
        .bind(term)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter()
            .map(|(doc, identifier, positions)| {
                let positions: Vec<Position> = serde_json::from_str(&positions)?;
                Ok(Posting {
                    doc,
                    identifier,
                    positions,
                })
            })
            .collect()
    }

    async fn get_body(&self, doc: DocId) -> Result<String> {
        let row: Option<(String,)> = sqlx::query_as("SELECT body FROM documents WHERE id = ?")
            .bind(doc)
            .fetch_optional(&self.db)
            .await?;

        row.map(|(body,)| body)
            .ok_or_else(|| Error::NotFound(doc.to_string()))
    }

    async fn stats(&self) -> Result<IndexStats> {
        let (documents,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM documents")
            .fetch_one(&self.db)
            .await?;
        let (terms,): (i64,) = sqlx::query_as("SELECT COUNT(DISTINCT term) FROM postings")
            .fetch_one(&self.db)
            .await?;

        Ok(IndexStats {
            document_count: documents as u64,
            term_count: terms as u64,
            last_updated: self.get_last_updated().await?,
        })
    }
}
