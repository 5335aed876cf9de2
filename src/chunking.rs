//! Word-based chunking of cleaned document text.
//!
//! A word is a whitespace-delimited token. All strategies return an empty
//! vector for text without words.

use crate::error::ProcessError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ChunkingStrategy {
    FixedSize,
    Semantic,
    Hybrid,
}

impl ChunkingStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChunkingStrategy::FixedSize => "fixed_size",
            ChunkingStrategy::Semantic => "semantic",
            ChunkingStrategy::Hybrid => "hybrid",
        }
    }
}

impl fmt::Display for ChunkingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChunkingStrategy {
    type Err = ProcessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fixed_size" => Ok(ChunkingStrategy::FixedSize),
            "semantic" => Ok(ChunkingStrategy::Semantic),
            "hybrid" => Ok(ChunkingStrategy::Hybrid),
            other => Err(ProcessError::InvalidChunking(format!(
                "unknown chunking strategy: {other}"
            ))),
        }
    }
}

/// Strategy plus its word budget. `overlap` is ignored by the semantic strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkParams {
    pub strategy: ChunkingStrategy,
    pub chunk_size: usize,
    pub overlap: usize,
}

impl ChunkParams {
    pub fn new(strategy: ChunkingStrategy, chunk_size: usize, overlap: usize) -> Result<Self, ProcessError> {
        let params = Self {
            strategy,
            chunk_size,
            overlap,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), ProcessError> {
        if self.chunk_size == 0 {
            return Err(ProcessError::InvalidChunking(
                "chunk_size must be a positive integer".into(),
            ));
        }
        if self.overlap >= self.chunk_size {
            return Err(ProcessError::InvalidChunking(format!(
                "overlap ({}) must be smaller than chunk_size ({})",
                self.overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chunk {
    pub text: String,
    pub chunk_id: usize,
    pub word_count: usize,
    pub chunk_type: ChunkingStrategy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_word: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_word: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentence_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_semantic_chunk_id: Option<usize>,
}

pub fn chunk_text(text: &str, params: &ChunkParams) -> Vec<Chunk> {
    match params.strategy {
        ChunkingStrategy::FixedSize => chunk_fixed_size(text, params.chunk_size, params.overlap),
        ChunkingStrategy::Semantic => chunk_semantic(text, params.chunk_size),
        ChunkingStrategy::Hybrid => chunk_hybrid(text, params.chunk_size, params.overlap),
    }
}

/// Sliding window of `chunk_size` words advancing by `chunk_size - overlap`.
///
/// Callers validate `overlap < chunk_size`; an out-of-range overlap is
/// clamped so the window always advances by at least one word.
pub fn chunk_fixed_size(text: &str, chunk_size: usize, overlap: usize) -> Vec<Chunk> {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return Vec::new();
    }
    let chunk_size = chunk_size.max(1);

    if words.len() <= chunk_size {
        return vec![Chunk {
            text: text.trim().to_string(),
            chunk_id: 0,
            word_count: words.len(),
            chunk_type: ChunkingStrategy::FixedSize,
            start_word: Some(0),
            end_word: Some(words.len()),
            sentence_count: None,
            parent_semantic_chunk_id: None,
        }];
    }

    let step = chunk_size.saturating_sub(overlap).max(1);
    let mut chunks = Vec::new();
    let mut start = 0usize;
    while start < words.len() {
        let end = (start + chunk_size).min(words.len());
        chunks.push(Chunk {
            text: words[start..end].join(" "),
            chunk_id: chunks.len(),
            word_count: end - start,
            chunk_type: ChunkingStrategy::FixedSize,
            start_word: Some(start),
            end_word: Some(end),
            sentence_count: None,
            parent_semantic_chunk_id: None,
        });
        if start + chunk_size >= words.len() {
            break;
        }
        start += step;
    }
    chunks
}

/// Sentence-aware packing. Sentences are never split, so a single sentence
/// longer than `max_chunk_size` words ends up alone in its own chunk.
pub fn chunk_semantic(text: &str, max_chunk_size: usize) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut current: Vec<String> = Vec::new();
    let mut current_words = 0usize;

    for paragraph in text.split("\n\n") {
        if paragraph.trim().is_empty() {
            continue;
        }
        for sentence in split_sentences(paragraph) {
            let words = sentence.split_whitespace().count();
            if words == 0 {
                continue;
            }
            if !current.is_empty() && current_words + words > max_chunk_size {
                chunks.push(semantic_chunk(chunks.len(), &current, current_words));
                current.clear();
                current_words = 0;
            }
            current.push(sentence);
            current_words += words;
        }
    }

    if !current.is_empty() {
        chunks.push(semantic_chunk(chunks.len(), &current, current_words));
    }
    chunks
}

fn semantic_chunk(chunk_id: usize, sentences: &[String], word_count: usize) -> Chunk {
    Chunk {
        text: sentences.join(" "),
        chunk_id,
        word_count,
        chunk_type: ChunkingStrategy::Semantic,
        start_word: None,
        end_word: None,
        sentence_count: Some(sentences.len()),
        parent_semantic_chunk_id: None,
    }
}

/// Semantic chunking, then a fixed-size re-split of any chunk that is still
/// over budget. Ids are renumbered across the whole output.
pub fn chunk_hybrid(text: &str, max_chunk_size: usize, overlap: usize) -> Vec<Chunk> {
    let mut out = Vec::new();
    for chunk in chunk_semantic(text, max_chunk_size) {
        if chunk.word_count > max_chunk_size {
            let parent = chunk.chunk_id;
            for mut sub in chunk_fixed_size(&chunk.text, max_chunk_size, overlap) {
                sub.chunk_id = out.len();
                sub.chunk_type = ChunkingStrategy::Hybrid;
                sub.parent_semantic_chunk_id = Some(parent);
                out.push(sub);
            }
        } else {
            out.push(Chunk {
                chunk_id: out.len(),
                chunk_type: ChunkingStrategy::Hybrid,
                ..chunk
            });
        }
    }
    out
}

/// Splits at `.`, `!` or `?` followed by whitespace and then an uppercase
/// letter, a digit or the end of the text. Returns trimmed, non-empty pieces.
pub fn split_sentences(text: &str) -> Vec<String> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut sentences = Vec::new();
    let mut start = 0usize;

    let mut i = 0usize;
    while i < chars.len() {
        if matches!(chars[i].1, '.' | '!' | '?') {
            let mut j = i + 1;
            while j < chars.len() && matches!(chars[j].1, '.' | '!' | '?' | '"' | '\'' | ')') {
                j += 1;
            }
            let boundary = match chars.get(j) {
                None => true,
                Some((_, c)) if c.is_whitespace() => {
                    let mut k = j;
                    while k < chars.len() && chars[k].1.is_whitespace() {
                        k += 1;
                    }
                    match chars.get(k) {
                        None => true,
                        Some((_, next)) => next.is_uppercase() || next.is_ascii_digit(),
                    }
                }
                Some(_) => false,
            };
            if boundary {
                let end = chars.get(j).map(|(p, _)| *p).unwrap_or(text.len());
                let piece = text[start..end].trim();
                if !piece.is_empty() {
                    sentences.push(piece.to_string());
                }
                start = end;
                i = j;
                continue;
            }
        }
        i += 1;
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail.to_string());
    }
    sentences
}
