use crate::config::{Cleaning, Sections};
use anyhow::{Context, Result};
use regex::Regex;
use std::collections::BTreeMap;
use unicode_normalization::UnicodeNormalization;

/// Collapses every run of whitespace, control or non-ASCII characters into a
/// single space and trims the ends.
///
/// The output only contains `0x20..=0x7E`, never two spaces in a row and no
/// surrounding whitespace, so cleaning it again returns it unchanged.
pub fn clean_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;
    for ch in text.chars() {
        if ch.is_ascii_graphic() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(ch);
        } else {
            pending_space = true;
        }
    }
    out
}

/// Cleaning as configured for the pipeline: optional NFKC folding first so
/// ligatures and full-width forms survive as ASCII instead of becoming spaces.
pub fn clean_with(cfg: &Cleaning, text: &str) -> String {
    if cfg.normalize_unicode {
        let folded: String = text.nfkc().collect();
        clean_text(&folded)
    } else {
        clean_text(text)
    }
}

/// Compiled section rules, built once per pipeline.
pub struct SectionExtractor {
    rules: Vec<(String, Vec<Regex>)>,
    window_chars: usize,
}

impl SectionExtractor {
    pub fn new(cfg: &Sections) -> Result<Self> {
        let mut rules = Vec::with_capacity(cfg.rules.len());
        for rule in &cfg.rules {
            let patterns = rule
                .keywords
                .iter()
                .map(|k| keyword_regex(k))
                .collect::<Result<Vec<_>>>()
                .with_context(|| format!("compiling keywords for section {}", rule.name))?;
            rules.push((rule.name.clone(), patterns));
        }
        Ok(Self {
            rules,
            window_chars: cfg.window_chars,
        })
    }

    /// For each section the first keyword (in listed order) found anywhere in
    /// `text` wins; the excerpt is the cleaned window following the match.
    /// Sections without a match are left out.
    pub fn extract(&self, text: &str) -> BTreeMap<String, String> {
        let mut sections = BTreeMap::new();
        for (name, patterns) in &self.rules {
            for re in patterns {
                if let Some(m) = re.find(text) {
                    let excerpt = char_window(text, m.end(), self.window_chars);
                    sections.insert(name.clone(), clean_text(excerpt));
                    break;
                }
            }
        }
        sections
    }
}

/// Case-insensitive literal keyword. A colon right after the keyword is
/// heading punctuation and is consumed with it.
fn keyword_regex(keyword: &str) -> Result<Regex> {
    let pattern = format!(r"(?i){}(?:\s*:)?", regex::escape(keyword.trim()));
    Regex::new(&pattern).with_context(|| format!("invalid section keyword: {keyword}"))
}

fn char_window(text: &str, start: usize, max_chars: usize) -> &str {
    let rest = &text[start..];
    match rest.char_indices().nth(max_chars) {
        Some((end, _)) => &rest[..end],
        None => rest,
    }
}
