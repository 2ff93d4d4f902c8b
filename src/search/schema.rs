//! Index data model / 索引数据模型

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::tokenizer::tokenize;

/// Store-assigned row id of an inserted document / 文档行号
///
/// Identifiers may repeat across inserts, the id never does.
pub type DocId = i64;

/// One occurrence of a term in a document / 词的一次出现
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    /// Token ordinal / 词序号
    #[serde(rename = "i")]
    pub index: u32,
    /// Byte offset in the body / 字节偏移
    #[serde(rename = "o")]
    pub offset: usize,
}

/// All occurrences of one term in one document / 倒排索引条目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Posting {
    pub doc: DocId,
    pub identifier: String,
    /// Ordered by token ordinal / 按词序排列
    pub positions: Vec<Position>,
}

/// A document matching a query / 搜索命中
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub doc: DocId,
    pub identifier: String,
    /// Term-frequency score / 词频得分
    pub score: u64,
    /// Byte offsets of matched tokens, ascending / 命中词的字节偏移
    pub offsets: Vec<usize>,
}

/// A rendered search result / 带摘要的搜索结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub identifier: String,
    pub score: u64,
    pub snippet: String,
}

/// Index statistics / 索引统计
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    pub document_count: u64,
    pub term_count: u64,
    pub last_updated: Option<i64>,
}

/// Group a document's tokens into per-term positions, first-seen term order / 按词聚合位置
pub fn group_positions(body: &str) -> Vec<(String, Vec<Position>)> {
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut grouped: Vec<(String, Vec<Position>)> = Vec::new();

    for token in tokenize(body) {
        let position = Position {
            index: token.index,
            offset: token.offset,
        };
        match slots.get(&token.term) {
            Some(&slot) => grouped[slot].1.push(position),
            None => {
                slots.insert(token.term.clone(), grouped.len());
                grouped.push((token.term, vec![position]));
            }
        }
    }

    grouped
}
