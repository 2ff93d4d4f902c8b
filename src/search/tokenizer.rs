//! Tokenizer - splits text into lowercase alphanumeric terms / 分词器
//!
//! Rules / 规则：
//! - Split on non-alphanumeric boundaries / 按非字母数字字符切分
//! - Case-fold to lowercase / 转小写
//! - No stemming, no stop-word removal / 不做词干提取与停用词过滤
//!
//! Index and query text go through the same tokenizer, otherwise nothing would match.

use std::str::CharIndices;

/// A single token / 词元
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Normalized term / 标准化后的词
    pub term: String,
    /// Token ordinal within the text / 词序号
    pub index: u32,
    /// Byte offset of the first character in the original text / 起始字节偏移
    pub offset: usize,
    /// Byte offset one past the last character / 结束字节偏移
    pub end: usize,
}

/// Lazy token stream over a borrowed text; clone it to restart
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    text: &'a str,
    chars: CharIndices<'a>,
    next_index: u32,
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        let start = loop {
            let (pos, c) = self.chars.next()?;
            if c.is_alphanumeric() {
                break pos;
            }
        };

        let mut end = self.text.len();
        for (pos, c) in self.chars.by_ref() {
            if !c.is_alphanumeric() {
                end = pos;
                break;
            }
        }

        let index = self.next_index;
        self.next_index += 1;
        Some(Token {
            term: self.text[start..end].to_lowercase(),
            index,
            offset: start,
            end,
        })
    }
}

/// Tokenize text / 对文本进行分词
pub fn tokenize(text: &str) -> Tokens<'_> {
    Tokens {
        text,
        chars: text.char_indices(),
        next_index: 0,
    }
}

/// Normalized terms only, in order / 仅返回词
pub fn terms(text: &str) -> Vec<String> {
    tokenize(text).map(|t| t.term).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_english() {
        let tokens: Vec<Token> = tokenize("Hello, World!").collect();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].term, "hello");
        assert_eq!((tokens[0].offset, tokens[0].end), (0, 5));
        assert_eq!(tokens[1].term, "world");
        assert_eq!(tokens[1].index, 1);
        assert_eq!((tokens[1].offset, tokens[1].end), (7, 12));
    }

    #[test]
    fn test_split_on_punctuation() {
        assert_eq!(terms("foo_bar-baz.md"), vec!["foo", "bar", "baz", "md"]);
        assert_eq!(terms("  x2  Y3\n"), vec!["x2", "y3"]);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(tokenize("").count(), 0);
        assert_eq!(tokenize(" ,.;!? ").count(), 0);
    }

    #[test]
    fn test_unicode_offsets() {
        let text = "Ärger über 测试";
        let tokens: Vec<Token> = tokenize(text).collect();
        assert_eq!(terms(text), vec!["ärger", "über", "测试"]);
        for t in &tokens {
            assert_eq!(text[t.offset..t.end].to_lowercase(), t.term);
        }
    }

    #[test]
    fn test_restartable_and_idempotent() {
        let text = "The quick brown fox, the lazy dog";
        let stream = tokenize(text);
        let first: Vec<Token> = stream.clone().collect();
        let second: Vec<Token> = stream.collect();
        assert_eq!(first, second);
        assert_eq!(first, tokenize(text).collect::<Vec<_>>());
        let indexes: Vec<u32> = first.iter().map(|t| t.index).collect();
        assert_eq!(indexes, (0..7).collect::<Vec<u32>>());
    }
}
