//! Query parsing and evaluation / 查询解析与执行
//!
//! Grammar: whitespace separated words are independent required terms, text
//! inside double quotes is a phrase whose terms must appear consecutively. An
//! unterminated quote runs to the end of the input. Every clause must match
//! (AND); there is no OR or negation.

use std::collections::HashMap;

use super::schema::{DocId, Match, Posting, SearchResult};
use super::snippet;
use super::tokenizer::terms;
use super::IndexStore;
use crate::config::SnippetConfig;
use crate::error::{Error, Result};
use crate::state::RunState;

/// One required part of a query / 查询子句
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Clause {
    Term(String),
    /// Two or more terms at consecutive positions / 短语
    Phrase(Vec<String>),
}

/// Parsed query / 解析后的查询
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    clauses: Vec<Clause>,
}

impl Query {
    /// Parse query text; fails with `InvalidQuery` when it holds no terms / 解析查询
    pub fn parse(text: &str) -> Result<Self> {
        let mut clauses: Vec<Clause> = Vec::new();

        for (i, segment) in text.split('"').enumerate() {
            let words = terms(segment);
            let quoted = i % 2 == 1;
            if quoted && words.len() > 1 {
                push_unique(&mut clauses, Clause::Phrase(words));
            } else {
                for word in words {
                    push_unique(&mut clauses, Clause::Term(word));
                }
            }
        }

        if clauses.is_empty() {
            return Err(Error::InvalidQuery("nothing to search".to_string()));
        }
        Ok(Self { clauses })
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Distinct terms across all clauses, first-seen order / 查询涉及的所有词
    pub fn terms(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for clause in &self.clauses {
            let words: &[String] = match clause {
                Clause::Term(t) => std::slice::from_ref(t),
                Clause::Phrase(ts) => ts,
            };
            for w in words {
                if !out.contains(&w.as_str()) {
                    out.push(w.as_str());
                }
            }
        }
        out
    }
}

fn push_unique(clauses: &mut Vec<Clause>, clause: Clause) {
    if !clauses.contains(&clause) {
        clauses.push(clause);
    }
}

/// Per-document accumulator / 候选文档
#[derive(Debug)]
struct Candidate {
    identifier: String,
    score: u64,
    offsets: Vec<usize>,
}

/// Query engine over an index store / 查询引擎
pub struct QueryEngine<'a> {
    store: &'a dyn IndexStore,
    state: RunState,
}

impl<'a> QueryEngine<'a> {
    pub fn new(store: &'a dyn IndexStore) -> Self {
        Self {
            store,
            state: RunState::new(),
        }
    }

    /// Observe cancellation through the given run state
    pub fn with_state(mut self, state: RunState) -> Self {
        self.state = state;
        self
    }

    /// Matches for the query text, best first / 搜索
    pub async fn search(&self, text: &str) -> Result<Vec<Match>> {
        let query = Query::parse(text)?;
        self.execute(&query).await
    }

    /// Evaluate a parsed query / 执行查询
    pub async fn execute(&self, query: &Query) -> Result<Vec<Match>> {
        let mut postings: HashMap<&str, Vec<Posting>> = HashMap::new();
        for term in query.terms() {
            self.state.check()?;
            let list = self.store.lookup(term).await?;
            if list.is_empty() {
                tracing::debug!("Term {:?} has no postings", term);
                return Ok(Vec::new());
            }
            postings.insert(term, list);
        }

        let mut candidates: Option<HashMap<DocId, Candidate>> = None;
        for clause in query.clauses() {
            let hits = match clause {
                Clause::Term(term) => term_hits(&postings[term.as_str()]),
                Clause::Phrase(words) => phrase_hits(words, &postings),
            };

            let merged = match candidates.take() {
                None => hits,
                Some(mut current) => {
                    current.retain(|doc, _| hits.contains_key(doc));
                    for (doc, candidate) in current.iter_mut() {
                        let hit = &hits[doc];
                        candidate.score += hit.score;
                        candidate.offsets.extend_from_slice(&hit.offsets);
                    }
                    current
                }
            };

            if merged.is_empty() {
                return Ok(Vec::new());
            }
            candidates = Some(merged);
        }

        let mut matches: Vec<Match> = candidates
            .unwrap_or_default()
            .into_iter()
            .map(|(doc, mut c)| {
                c.offsets.sort_unstable();
                c.offsets.dedup();
                Match {
                    doc,
                    identifier: c.identifier,
                    score: c.score,
                    offsets: c.offsets,
                }
            })
            .collect();

        // 按分数排序，同分按标识符排序
        matches.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| a.identifier.cmp(&b.identifier))
                .then_with(|| a.doc.cmp(&b.doc))
        });

        self.state.check()?;
        tracing::debug!("Query matched {} documents", matches.len());
        Ok(matches)
    }

    /// Matches rendered with snippets, best first / 带摘要的搜索结果
    pub async fn search_results(&self, text: &str, config: &SnippetConfig) -> Result<Vec<SearchResult>> {
        let matches = self.search(text).await?;

        let mut results = Vec::with_capacity(matches.len());
        for m in matches {
            self.state.check()?;
            let body = self.store.get_body(m.doc).await?;
            results.push(SearchResult {
                snippet: snippet::render(&body, &m.offsets, config),
                identifier: m.identifier,
                score: m.score,
            });
        }
        Ok(results)
    }
}

fn term_hits(postings: &[Posting]) -> HashMap<DocId, Candidate> {
    postings
        .iter()
        .map(|p| {
            (
                p.doc,
                Candidate {
                    identifier: p.identifier.clone(),
                    score: p.positions.len() as u64,
                    offsets: p.positions.iter().map(|pos| pos.offset).collect(),
                },
            )
        })
        .collect()
}

fn phrase_hits(words: &[String], postings: &HashMap<&str, Vec<Posting>>) -> HashMap<DocId, Candidate> {
    let by_doc: Vec<HashMap<DocId, &Posting>> = words
        .iter()
        .map(|w| postings[w.as_str()].iter().map(|p| (p.doc, p)).collect())
        .collect();

    let mut hits = HashMap::new();
    for (doc, head) in &by_doc[0] {
        let Some(rest) = by_doc[1..]
            .iter()
            .map(|m| m.get(doc).copied())
            .collect::<Option<Vec<&Posting>>>()
        else {
            continue;
        };

        let mut score = 0u64;
        let mut offsets = Vec::new();
        for start in &head.positions {
            let mut run = vec![start.offset];
            for (k, posting) in rest.iter().enumerate() {
                let want = start.index + k as u32 + 1;
                match posting.positions.binary_search_by_key(&want, |p| p.index) {
                    Ok(found) => run.push(posting.positions[found].offset),
                    Err(_) => break,
                }
            }
            if run.len() == words.len() {
                score += 1;
                offsets.extend(run);
            }
        }

        if score > 0 {
            hits.insert(
                *doc,
                Candidate {
                    identifier: head.identifier.clone(),
                    score,
                    offsets,
                },
            );
        }
    }
    hits
}
