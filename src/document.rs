//! Plain-text word splitting for the reader.
//!
//! Blank lines separate paragraphs; a [`PARAGRAPH_MARKER`] token is placed
//! between them so the scheduler can hold the paragraph pause. No cleanup is
//! attempted beyond whitespace splitting.

use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::timing::PARAGRAPH_MARKER;

/// Closing characters skipped when looking for sentence-final punctuation
const CLOSERS: &[char] = &['"', '\'', ')', ']', '\u{201D}', '\u{2019}'];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub sentence_end: bool,
}

impl Token {
    fn word(text: &str) -> Self {
        Self {
            text: text.to_string(),
            sentence_end: ends_sentence(text),
        }
    }

    fn paragraph_break() -> Self {
        Self {
            text: PARAGRAPH_MARKER.to_string(),
            sentence_end: true,
        }
    }

    pub fn is_paragraph_break(&self) -> bool {
        self.text == PARAGRAPH_MARKER
    }
}

/// True when `word` ends in `.`, `?` or `!`, ignoring trailing quotes and brackets
pub fn ends_sentence(word: &str) -> bool {
    matches!(
        word.trim_end_matches(CLOSERS).chars().last(),
        Some('.' | '?' | '!')
    )
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    tokens: Vec<Token>,
}

impl Document {
    pub fn parse(text: &str) -> Self {
        let mut tokens = Vec::new();
        let mut paragraph: Vec<Token> = Vec::new();

        for line in text.lines() {
            if line.trim().is_empty() {
                Self::flush_paragraph(&mut tokens, &mut paragraph);
                continue;
            }
            paragraph.extend(line.split_whitespace().map(Token::word));
        }
        Self::flush_paragraph(&mut tokens, &mut paragraph);

        Self { tokens }
    }

    fn flush_paragraph(tokens: &mut Vec<Token>, paragraph: &mut Vec<Token>) {
        if paragraph.is_empty() {
            return;
        }
        // The last word of a paragraph always closes a sentence
        if let Some(last) = paragraph.last_mut() {
            last.sentence_end = true;
        }
        if !tokens.is_empty() {
            tokens.push(Token::paragraph_break());
        }
        tokens.append(paragraph);
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let document = Self::parse(&fs::read_to_string(path)?);
        if document.is_empty() {
            return Err(Error::EmptyDocument {
                path: path.to_path_buf(),
            });
        }
        Ok(document)
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    /// Token count including paragraph markers
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Real words only
    pub fn word_count(&self) -> usize {
        self.tokens.iter().filter(|t| !t.is_paragraph_break()).count()
    }
}
