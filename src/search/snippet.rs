//! Snippet extraction / 摘要提取
//!
//! Matches closer than `radius` tokens form one cluster. Every cluster keeps
//! `radius` tokens of context on both sides; overlapping or touching windows
//! merge, the rest are joined with the ellipsis.

use std::collections::HashSet;

use super::tokenizer::{tokenize, Token};
use crate::config::SnippetConfig;

/// Token window, inclusive on both ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Window {
    start: usize,
    end: usize,
}

/// Build a highlighted excerpt of `body` around the tokens starting at `match_offsets` / 生成高亮摘要
pub fn extract(
    body: &str,
    match_offsets: &[usize],
    radius: usize,
    mark_start: &str,
    mark_end: &str,
    ellipsis: &str,
) -> String {
    let tokens: Vec<Token> = tokenize(body).collect();
    if tokens.is_empty() {
        return body.trim().to_string();
    }

    let wanted: HashSet<usize> = match_offsets.iter().copied().collect();
    let matched: Vec<usize> = tokens
        .iter()
        .filter(|t| wanted.contains(&t.offset))
        .map(|t| t.index as usize)
        .collect();

    let last = tokens.len() - 1;
    let windows = if matched.is_empty() {
        vec![Window {
            start: 0,
            end: (2 * radius).min(last),
        }]
    } else {
        windows_for(&matched, radius, last)
    };

    let mut out = String::new();
    if windows[0].start > 0 {
        out.push_str(ellipsis);
        out.push(' ');
    }
    for (i, window) in windows.iter().enumerate() {
        if i > 0 {
            out.push(' ');
            out.push_str(ellipsis);
            out.push(' ');
        }
        out.push_str(&render_window(body, &tokens, &wanted, *window, last, mark_start, mark_end));
    }
    if windows[windows.len() - 1].end < last {
        out.push(' ');
        out.push_str(ellipsis);
    }
    out
}

/// `extract` with the configured radius and markers
pub fn render(body: &str, match_offsets: &[usize], config: &SnippetConfig) -> String {
    extract(
        body,
        match_offsets,
        config.radius,
        &config.mark_start,
        &config.mark_end,
        &config.ellipsis,
    )
}

fn windows_for(matched: &[usize], radius: usize, last: usize) -> Vec<Window> {
    let mut clusters: Vec<(usize, usize)> = Vec::new();
    for &idx in matched {
        match clusters.last_mut() {
            Some(cluster) if idx - cluster.1 <= radius => cluster.1 = idx,
            _ => clusters.push((idx, idx)),
        }
    }

    let mut windows: Vec<Window> = Vec::with_capacity(clusters.len());
    for (first, end) in clusters {
        let window = Window {
            start: first.saturating_sub(radius),
            end: (end + radius).min(last),
        };
        match windows.last_mut() {
            Some(prev) if window.start <= prev.end + 1 => prev.end = prev.end.max(window.end),
            _ => windows.push(window),
        }
    }
    windows
}

fn render_window(
    body: &str,
    tokens: &[Token],
    wanted: &HashSet<usize>,
    window: Window,
    last: usize,
    mark_start: &str,
    mark_end: &str,
) -> String {
    let start_byte = if window.start == 0 { 0 } else { tokens[window.start].offset };
    let end_byte = if window.end == last { body.len() } else { tokens[window.end].end };

    let mut piece = String::with_capacity(end_byte - start_byte + 16);
    let mut cursor = start_byte;
    for token in &tokens[window.start..=window.end] {
        if !wanted.contains(&token.offset) {
            continue;
        }
        piece.push_str(&body[cursor..token.offset]);
        piece.push_str(mark_start);
        piece.push_str(&body[token.offset..token.end]);
        piece.push_str(mark_end);
        cursor = token.end;
    }
    piece.push_str(&body[cursor..end_byte]);

    let mut piece = piece.as_str();
    if window.start == 0 {
        piece = piece.trim_start();
    }
    if window.end == last {
        piece = piece.trim_end();
    }
    piece.to_string()
}
