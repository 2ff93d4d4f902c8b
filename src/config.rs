//! Application configuration module / 应用配置模块
//!
//! Configuration is loaded from an optional JSON file; every section has a
//! default so the file only needs the keys it overrides.
//! 配置文件可选，缺省时使用默认值

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Default config file name, looked up in the working directory / 默认配置文件名
pub const CONFIG_FILE: &str = "docsearch.json";

/// Environment variable overriding the config file location
pub const CONFIG_ENV: &str = "DOCSEARCH_CONFIG";

/// Application configuration / 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Index database configuration / 索引数据库配置
    pub database: DatabaseConfig,
    /// Corpus walking configuration / 文档遍历配置
    pub corpus: CorpusConfig,
    /// Snippet rendering configuration / 摘要配置
    pub snippet: SnippetConfig,
}

/// Index database configuration / 索引数据库配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Index file path / 索引文件路径
    pub path: String,
    /// Pool size / 连接池大小
    pub max_connections: u32,
    /// SQLite busy timeout in milliseconds
    pub busy_timeout_ms: u64,
}

/// Corpus walking configuration / 文档遍历配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusConfig {
    /// Only files whose path ends with this suffix are indexed / 文件后缀
    pub suffix: String,
    /// Directory names skipped together with their subtree / 排除的目录名
    pub exclude_dirs: Vec<String>,
    /// Documents inserted concurrently during a build pass / 并发数
    pub concurrency: usize,
}

/// Snippet rendering configuration / 摘要配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnippetConfig {
    /// Context tokens on each side of a match / 匹配词两侧的上下文词数
    pub radius: usize,
    pub mark_start: String,
    pub mark_end: String,
    pub ellipsis: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "docs-index.db".to_string(),
            max_connections: 4,
            busy_timeout_ms: 5000,
        }
    }
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            suffix: ".md".to_string(),
            exclude_dirs: vec![".git".to_string()],
            concurrency: 8,
        }
    }
}

impl Default for SnippetConfig {
    fn default() -> Self {
        Self {
            radius: 5,
            mark_start: "<mark>".to_string(),
            mark_end: "</mark>".to_string(),
            ellipsis: "...".to_string(),
        }
    }
}

impl CorpusConfig {
    /// Whether a directory name is excluded from the walk / 目录是否被排除
    pub fn is_excluded_dir(&self, name: &str) -> bool {
        self.exclude_dirs.iter().any(|d| d == name)
    }
}

/// Get the config file path / 获取配置文件路径
pub fn get_config_path() -> PathBuf {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        return PathBuf::from(path);
    }
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(CONFIG_FILE)
}

/// Load configuration from file, or use defaults if it does not exist / 加载配置文件，不存在则使用默认配置
pub fn load_config(config_path: &Path) -> Result<AppConfig> {
    if !config_path.exists() {
        tracing::debug!("No config file at {:?}, using defaults", config_path);
        return Ok(AppConfig::default());
    }

    let content = std::fs::read_to_string(config_path)
        .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

    let config: AppConfig = serde_json::from_str(&content)
        .map_err(|e| Error::Config(format!("Failed to parse config file: {}", e)))?;

    tracing::info!("Loaded configuration from {:?}", config_path);
    Ok(config)
}
