//! Corpus loader - walks a directory tree for documents / 文档遍历
//!
//! Depth-first walk; excluded directory names are pruned before recursion so
//! their subtree is never visited. Symlinks are not followed.

use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::config::CorpusConfig;
use crate::error::{Error, Result};

/// A file selected for indexing / 待索引文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    /// Path relative to the walk root, `/`-separated / 相对路径
    pub identifier: String,
    pub path: PathBuf,
}

fn is_excluded(entry: &DirEntry, config: &CorpusConfig) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .map(|name| config.is_excluded_dir(name))
            .unwrap_or(false)
}

/// Relative identifier of a path under `root` / 生成文档标识
fn identifier_for(root: &Path, path: &Path) -> Result<String> {
    let rel = path
        .strip_prefix(root)
        .map_err(|e| Error::traversal(path, e))?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Ok(parts.join("/"))
}

/// List every file under `root` carrying the configured suffix / 遍历目录
///
/// Any walk error aborts the whole listing.
pub fn discover(root: &Path, config: &CorpusConfig) -> Result<Vec<SourceDocument>> {
    let mut documents = Vec::new();

    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_excluded(e, config));

    for entry in walker {
        let entry = entry?;
        if entry.file_type().is_dir() {
            continue;
        }

        let identifier = identifier_for(root, entry.path())?;
        if !identifier.ends_with(&config.suffix) {
            continue;
        }

        documents.push(SourceDocument {
            identifier,
            path: entry.into_path(),
        });
    }

    tracing::debug!("Found {} documents under {:?}", documents.len(), root);
    Ok(documents)
}

/// Read a document body; invalid UTF-8 is replaced / 读取文档内容
pub async fn read_body(doc: &SourceDocument) -> Result<String> {
    let bytes = tokio::fs::read(&doc.path)
        .await
        .map_err(|e| Error::traversal(&doc.path, e))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(root: &Path, rel: &str, body: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, body).unwrap();
    }

    fn identifiers(docs: &[SourceDocument]) -> Vec<&str> {
        docs.iter().map(|d| d.identifier.as_str()).collect()
    }

    #[test]
    fn test_suffix_filter_and_nesting() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.md", "a");
        write(dir.path(), "notes.txt", "skip");
        write(dir.path(), "sub/deeper/c.md", "c");
        write(dir.path(), "sub/b.md", "b");
        write(dir.path(), "sub/readme.markdown", "skip");

        let docs = discover(dir.path(), &CorpusConfig::default()).unwrap();
        assert_eq!(identifiers(&docs), vec!["a.md", "sub/b.md", "sub/deeper/c.md"]);
        assert_eq!(docs[0].path, dir.path().join("a.md"));
    }

    #[test]
    fn test_git_directory_is_pruned() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "keep.md", "keep");
        write(dir.path(), ".git/HEAD.md", "never");
        write(dir.path(), "sub/.git/info/notes.md", "never");
        write(dir.path(), "sub/.github/ok.md", "ok");

        let docs = discover(dir.path(), &CorpusConfig::default()).unwrap();
        assert_eq!(identifiers(&docs), vec!["keep.md", "sub/.github/ok.md"]);
    }

    #[test]
    fn test_root_named_like_excluded_dir_is_walked() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join(".git");
        write(&root, "inside.md", "x");

        let docs = discover(&root, &CorpusConfig::default()).unwrap();
        assert_eq!(identifiers(&docs), vec!["inside.md"]);
    }

    #[test]
    fn test_custom_suffix() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.md", "a");
        write(dir.path(), "b.txt", "b");
        let config = CorpusConfig {
            suffix: ".txt".to_string(),
            ..CorpusConfig::default()
        };

        let docs = discover(dir.path(), &config).unwrap();
        assert_eq!(identifiers(&docs), vec!["b.txt"]);
    }

    #[test]
    fn test_missing_root_is_traversal_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = discover(&dir.path().join("nope"), &CorpusConfig::default());
        assert!(matches!(result, Err(Error::Traversal { .. })));
    }

    #[tokio::test]
    async fn test_read_body_lossy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.md");
        fs::write(&path, b"ok \xff end").unwrap();

        let doc = SourceDocument {
            identifier: "bad.md".to_string(),
            path,
        };
        assert_eq!(read_body(&doc).await.unwrap(), "ok \u{fffd} end");
    }
}
