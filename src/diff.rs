use itertools::Itertools;

/// How one reference codepoint relates to what the learner typed at the same
/// position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum Classification {
    Matched,
    Mismatched,
    Pending,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DiffEntry {
    pub ch: char,
    pub class: Classification,
}

/// Adjacent entries sharing a classification, for renderers that style
/// whole spans at once.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Run {
    pub text: String,
    pub class: Classification,
}

/// Per-codepoint comparison of a buffer against a reference line.
///
/// The diff only stores its two inputs; classifications are produced lazily
/// by [`Diff::iter`], which can be called any number of times.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diff {
    reference: String,
    typed: String,
}

impl Diff {
    pub fn new(reference: impl Into<String>, typed: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            typed: typed.into(),
        }
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// Number of entries, i.e. codepoints in the reference line.
    pub fn len(&self) -> usize {
        self.reference.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.reference.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = DiffEntry> + '_ {
        let mut typed = self.typed.chars();
        self.reference.chars().map(move |expected| {
            let class = match typed.next() {
                Some(actual) if actual == expected => Classification::Matched,
                Some(_) => Classification::Mismatched,
                None => Classification::Pending,
            };
            DiffEntry {
                ch: expected,
                class,
            }
        })
    }

    pub fn classes(&self) -> Vec<Classification> {
        self.iter().map(|entry| entry.class).collect()
    }

    pub fn runs(&self) -> Vec<Run> {
        self.iter()
            .chunk_by(|entry| entry.class)
            .into_iter()
            .map(|(class, entries)| Run {
                text: entries.map(|entry| entry.ch).collect(),
                class,
            })
            .collect()
    }

    pub fn count(&self, class: Classification) -> usize {
        self.iter().filter(|entry| entry.class == class).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::Classification::*;

    #[test]
    fn test_identical_buffer_all_matched() {
        let diff = Diff::new("hello", "hello");

        assert_eq!(diff.classes(), vec![Matched; 5]);
    }

    #[test]
    fn test_partial_buffer() {
        let diff = Diff::new("AB", "A");

        assert_eq!(diff.classes(), vec![Matched, Pending]);
    }

    #[test]
    fn test_mismatch() {
        let diff = Diff::new("AB", "AX");

        assert_eq!(diff.classes(), vec![Matched, Mismatched]);
        assert_eq!(diff.count(Mismatched), 1);
    }

    #[test]
    fn test_buffer_longer_than_reference() {
        let diff = Diff::new("AB", "ABCDE");

        assert_eq!(diff.len(), 2);
        assert_eq!(diff.classes(), vec![Matched, Matched]);
    }

    #[test]
    fn test_empty_buffer_all_pending() {
        let diff = Diff::new("abc", "");

        assert_eq!(diff.classes(), vec![Pending; 3]);
    }

    #[test]
    fn test_compares_codepoints_not_bytes() {
        let diff = Diff::new("무궁화 삼천리", "무궁하");

        assert_eq!(diff.len(), 7);
        assert_eq!(
            diff.classes()[..4],
            [Matched, Matched, Mismatched, Pending]
        );
    }

    #[test]
    fn test_iter_is_restartable() {
        let diff = Diff::new("abc", "ax");

        let first: Vec<DiffEntry> = diff.iter().collect();
        let second: Vec<DiffEntry> = diff.iter().collect();
        assert_eq!(first, second);
        assert_eq!(first[0], DiffEntry { ch: 'a', class: Matched });
    }

    #[test]
    fn test_runs_group_adjacent_classes() {
        let diff = Diff::new("hello world", "helxo");

        assert_eq!(
            diff.runs(),
            vec![
                Run { text: "hel".into(), class: Matched },
                Run { text: "l".into(), class: Mismatched },
                Run { text: "o".into(), class: Matched },
                Run { text: " world".into(), class: Pending },
            ]
        );
    }

    #[test]
    fn test_runs_cover_every_entry() {
        let diff = Diff::new("the quick fox", "thx quack");

        let joined: String = diff.runs().into_iter().map(|run| run.text).collect();
        assert_eq!(joined, "the quick fox");
    }

    #[test]
    fn test_classification_display() {
        assert_eq!(Matched.to_string(), "Matched");
        assert_eq!(Pending.to_string(), "Pending");
    }
}
