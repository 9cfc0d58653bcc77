use std::str::FromStr;

use crate::error::EngineError;

/// The reference text a session walks through.
///
/// Holds two views of the same source: the non-blank lines the learner types
/// one at a time, and the whole text with only its outer whitespace trimmed.
/// Metrics are measured against the latter, so blank separator lines inside
/// the text still count toward the reference length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Corpus {
    lines: Vec<String>,
    full_text: String,
}

impl Corpus {
    pub fn build(raw: &str) -> Result<Self, EngineError> {
        let lines = raw
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .filter(|line| !line.trim().is_empty())
            .map(str::to_owned)
            .collect::<Vec<String>>();

        if lines.is_empty() {
            return Err(EngineError::EmptyCorpus);
        }

        Ok(Self {
            lines,
            full_text: raw.replace("\r\n", "\n").trim().to_owned(),
        })
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn last_index(&self) -> usize {
        self.lines.len() - 1
    }

    pub fn line_at(&self, index: usize) -> Result<&str, EngineError> {
        self.lines
            .get(index)
            .map(String::as_str)
            .ok_or(EngineError::IndexOutOfRange {
                index,
                len: self.lines.len(),
            })
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> + '_ {
        self.lines.iter().map(String::as_str)
    }

    /// The first `count` lines joined by a single line break.
    pub(crate) fn joined_prefix(&self, count: usize) -> String {
        self.lines[..count.min(self.lines.len())].join("\n")
    }

    pub fn full_text_trimmed(&self) -> &str {
        &self.full_text
    }
}

impl FromStr for Corpus {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::build(s)
    }
}
