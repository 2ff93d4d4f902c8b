//! Build and search passes / 构建与搜索流程
//!
//! One invocation runs exactly one pass. The index handle is opened here,
//! passed down explicitly and closed on every exit path.

use futures::stream::{self, TryStreamExt};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::{AppConfig, CorpusConfig, SnippetConfig};
use crate::corpus::{self, SourceDocument};
use crate::error::{Error, Result};
use crate::search::{DbIndex, IndexStore, QueryEngine};
use crate::state::RunState;

/// Arguments of one invocation / 运行参数
#[derive(Debug, Clone, Default)]
pub struct RunArgs {
    /// Directory to index; search mode when unset / 待索引目录
    pub index_dir: Option<PathBuf>,
    /// Index file path / 索引文件路径
    pub database: String,
    /// Query words, joined with spaces / 查询词
    pub query: Vec<String>,
}

/// Run a build pass or a search pass, writing results to `out` / 执行一次构建或搜索
pub async fn run<W: Write + Send>(
    config: &AppConfig,
    args: RunArgs,
    state: &RunState,
    out: &mut W,
) -> Result<()> {
    if args.database.is_empty() {
        return Err(Error::Config("-db must be set".to_string()));
    }
    let query = args.query.join(" ");
    if args.index_dir.is_none() && query.trim().is_empty() {
        return Err(Error::InvalidQuery("nothing to search".to_string()));
    }

    let index = DbIndex::open(&args.database, &config.database).await?;

    let result = match &args.index_dir {
        Some(dir) => build_index(&index, dir, &config.corpus, state).await.map(|_| ()),
        None => search(&index, &query, &config.snippet, state, out).await.map(|_| ()),
    };

    index.close().await;
    result
}

/// Index every document under `dir`, returning how many were inserted / 构建索引
///
/// Documents are inserted concurrently; each insert is atomic on its own, so a
/// cancelled or failed pass leaves whole documents only.
pub async fn build_index(
    store: &dyn IndexStore,
    dir: &Path,
    config: &CorpusConfig,
    state: &RunState,
) -> Result<u64> {
    tracing::info!("Indexing {:?}", dir);
    state.check()?;

    let root = dir.to_path_buf();
    let walk_config = config.clone();
    let documents = tokio::task::spawn_blocking(move || corpus::discover(&root, &walk_config))
        .await
        .map_err(|e| Error::traversal(dir, e))??;

    let max_concurrent = config.concurrency.max(1);
    stream::iter(documents.into_iter().map(Ok::<SourceDocument, Error>))
        .try_for_each_concurrent(max_concurrent, |doc| async move {
            state.check()?;
            let body = corpus::read_body(&doc).await?;
            store.insert(&doc.identifier, &body).await?;
            let count = state.increment();
            tracing::debug!("Indexed {} ({} so far)", doc.identifier, count);
            Ok::<(), Error>(())
        })
        .await?;

    let indexed = state.object_count();
    let stats = store.stats().await?;
    tracing::info!(
        "Indexing completed, {} documents indexed ({} total, {} terms)",
        indexed,
        stats.document_count,
        stats.term_count
    );
    Ok(indexed)
}

/// Search the index and print ranked results / 搜索并输出结果
///
/// Nothing is written unless every match and snippet was produced.
pub async fn search<W: Write + Send>(
    store: &dyn IndexStore,
    query: &str,
    snippet: &SnippetConfig,
    state: &RunState,
    out: &mut W,
) -> Result<usize> {
    tracing::debug!("Searching for {:?}", query);
    let results = QueryEngine::new(store)
        .with_state(state.clone())
        .search_results(query, snippet)
        .await?;

    for result in &results {
        write!(out, "File: {}\n\n{}\n\n", result.identifier, result.snippet)?;
    }
    out.flush()?;
    Ok(results.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::MemoryIndex;
    use std::fs;

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.md"), "hello world").unwrap();
        fs::write(dir.path().join("b.md"), "hello there").unwrap();
        fs::create_dir_all(dir.path().join(".git")).unwrap();
        fs::write(dir.path().join(".git/c.md"), "hello git").unwrap();
        dir
    }

    #[tokio::test]
    async fn test_build_index_into_memory() {
        let dir = fixture();
        let index = MemoryIndex::new();
        let state = RunState::new();

        let count = build_index(&index, dir.path(), &CorpusConfig::default(), &state)
            .await
            .unwrap();
        assert_eq!(count, 2);
        assert_eq!(index.document_count(), 2);
        assert!(index.lookup("git").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_build_index_cancelled() {
        let dir = fixture();
        let index = MemoryIndex::new();
        let state = RunState::new();
        state.cancel();

        let result = build_index(&index, dir.path(), &CorpusConfig::default(), &state).await;
        assert!(matches!(result, Err(Error::Cancelled)));
        assert_eq!(index.document_count(), 0);
    }

    #[tokio::test]
    async fn test_search_output_format() {
        let dir = fixture();
        let index = MemoryIndex::new();
        let state = RunState::new();
        build_index(&index, dir.path(), &CorpusConfig::default(), &state)
            .await
            .unwrap();

        let mut out = Vec::new();
        let count = search(&index, "world", &SnippetConfig::default(), &state, &mut out)
            .await
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "File: a.md\n\nhello <mark>world</mark>\n\n"
        );
    }

    #[tokio::test]
    async fn test_cancelled_search_prints_nothing() {
        let dir = fixture();
        let index = MemoryIndex::new();
        build_index(&index, dir.path(), &CorpusConfig::default(), &RunState::new())
            .await
            .unwrap();

        let state = RunState::new();
        state.cancel();
        let mut out = Vec::new();
        let result = search(&index, "hello", &SnippetConfig::default(), &state, &mut out).await;
        assert!(matches!(result, Err(Error::Cancelled)));
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_run_requires_db_and_query() {
        let config = AppConfig::default();
        let state = RunState::new();
        let mut out = Vec::new();

        let args = RunArgs {
            database: String::new(),
            query: vec!["hello".to_string()],
            ..RunArgs::default()
        };
        assert!(matches!(
            run(&config, args, &state, &mut out).await,
            Err(Error::Config(_))
        ));

        let dir = tempfile::tempdir().unwrap();
        let args = RunArgs {
            database: dir.path().join("idx.db").to_string_lossy().into_owned(),
            query: vec![" ".to_string()],
            ..RunArgs::default()
        };
        assert!(matches!(
            run(&config, args, &state, &mut out).await,
            Err(Error::InvalidQuery(_))
        ));
        assert!(!dir.path().join("idx.db").exists());
    }
}
