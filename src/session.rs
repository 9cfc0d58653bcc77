use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::clock::{Clock, SystemClock};
use crate::corpus::Corpus;
use crate::diff::Diff;
use crate::metrics::Metrics;

/// Where a session stands within its corpus.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Active(usize),
    /// The current line is fully matched; the next trigger keystroke advances.
    AwaitingAdvance(usize),
    Finished,
}

/// Header text for the typing area. Indices are zero-based and rendered
/// one-based.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisplayLabel {
    InProgress { index: usize, total: usize },
    AwaitingTrigger { index: usize, total: usize },
    Finished,
}

impl fmt::Display for DisplayLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayLabel::InProgress { index, total } => {
                write!(f, "Line {}/{}", index + 1, total)
            }
            DisplayLabel::AwaitingTrigger { index, total } => write!(
                f,
                "Line {}/{} - press [space] or [enter] to continue",
                index + 1,
                total
            ),
            DisplayLabel::Finished => write!(f, "Done! All lines typed"),
        }
    }
}

/// Everything a renderer needs after one input event.
#[derive(Clone, Debug, PartialEq)]
pub struct Feedback {
    pub diff: Diff,
    pub metrics: Metrics,
    pub label: DisplayLabel,
    /// The engine's sanitized buffer after the event. Drivers mirror this into
    /// their entry widget; it is empty right after an advance.
    pub buffer: String,
    pub advanced: bool,
}

/// One learner's walk through a [`Corpus`].
#[derive(Debug)]
pub struct Session {
    corpus: Arc<Corpus>,
    state: SessionState,
    buffer: String,
    started_at: Option<Instant>,
    finished_at: Option<Instant>,
    clock: Box<dyn Clock>,
}

impl Session {
    pub fn new(corpus: Arc<Corpus>) -> Self {
        Self::with_clock(corpus, SystemClock)
    }

    pub fn with_clock(corpus: Arc<Corpus>, clock: impl Clock) -> Self {
        Self {
            corpus,
            state: SessionState::Active(0),
            buffer: String::new(),
            started_at: None,
            finished_at: None,
            clock: Box::new(clock),
        }
    }

    /// Feed the learner's whole current buffer. Called once per change.
    pub fn on_input(&mut self, raw: &str) -> Feedback {
        if self.state == SessionState::Finished {
            return self.snapshot();
        }

        let line_break = raw.contains(['\n', '\r']);
        self.buffer = raw.chars().filter(|c| !matches!(c, '\n' | '\r')).collect();

        if self.started_at.is_none() && !self.buffer.is_empty() {
            self.started_at = Some(self.clock.now());
            debug!("session started");
        }

        let metrics = self.metrics();
        let index = self.current_index();
        let corpus = Arc::clone(&self.corpus);
        let line = corpus.line_at(index).unwrap_or_default();

        if self.buffer.trim() != line.trim() {
            self.state = SessionState::Active(index);
            return Feedback {
                diff: Diff::new(line, self.buffer.as_str()),
                metrics,
                label: self.label(),
                buffer: self.buffer.clone(),
                advanced: false,
            };
        }

        self.state = SessionState::AwaitingAdvance(index);

        if self.buffer.ends_with(' ') || line_break {
            self.advance();
            return Feedback {
                metrics,
                advanced: true,
                ..self.snapshot()
            };
        }

        Feedback {
            diff: Diff::new(line, self.buffer.as_str()),
            metrics,
            label: self.label(),
            buffer: self.buffer.clone(),
            advanced: false,
        }
    }

    /// Move to the next line, or finish after the last one. No effect once
    /// finished.
    pub fn advance(&mut self) {
        let index = match self.state {
            SessionState::Finished => return,
            SessionState::Active(index) | SessionState::AwaitingAdvance(index) => index,
        };

        self.buffer.clear();

        if index >= self.corpus.last_index() {
            self.state = SessionState::Finished;
            self.finished_at = Some(self.clock.now());
            info!(
                lines = self.corpus.line_count(),
                elapsed_secs = self.elapsed().map_or(0.0, |e| e.as_secs_f64()),
                "session finished"
            );
        } else {
            self.state = SessionState::Active(index + 1);
            debug!(line = index + 1, "advanced to next line");
        }
    }

    pub fn reset(&mut self) {
        self.state = SessionState::Active(0);
        self.buffer.clear();
        self.started_at = None;
        self.finished_at = None;
        debug!("session reset");
    }

    /// Feedback for the current state without consuming an input event.
    pub fn snapshot(&self) -> Feedback {
        let line = self.current_line();
        Feedback {
            diff: Diff::new(line, self.buffer.as_str()),
            metrics: self.metrics(),
            label: self.label(),
            buffer: self.buffer.clone(),
            advanced: false,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    /// Index of the displayed line. Stays on the last line once finished.
    pub fn current_index(&self) -> usize {
        match self.state {
            SessionState::Active(index) | SessionState::AwaitingAdvance(index) => index,
            SessionState::Finished => self.corpus.last_index(),
        }
    }

    pub fn current_line(&self) -> &str {
        self.corpus
            .line_at(self.current_index())
            .unwrap_or_default()
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn is_started(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn is_finished(&self) -> bool {
        self.state == SessionState::Finished
    }

    /// Time since the first keystroke, frozen once the session finishes.
    pub fn elapsed(&self) -> Option<Duration> {
        let started_at = self.started_at?;
        let until = self.finished_at.unwrap_or_else(|| self.clock.now());
        Some(until.saturating_duration_since(started_at))
    }

    pub fn label(&self) -> DisplayLabel {
        let total = self.corpus.line_count();
        match self.state {
            SessionState::Active(index) => DisplayLabel::InProgress { index, total },
            SessionState::AwaitingAdvance(index) => {
                DisplayLabel::AwaitingTrigger { index, total }
            }
            SessionState::Finished => DisplayLabel::Finished,
        }
    }

    /// Completed lines joined by line breaks, then the current buffer.
    pub fn typed_so_far(&self) -> String {
        let completed = match self.state {
            SessionState::Finished => self.corpus.line_count(),
            SessionState::Active(index) | SessionState::AwaitingAdvance(index) => index,
        };

        let mut typed = self.corpus.joined_prefix(completed);
        if completed > 0 && !self.is_finished() {
            typed.push('\n');
        }
        typed.push_str(&self.buffer);
        typed
    }

    pub fn metrics(&self) -> Metrics {
        Metrics::compute(
            &self.typed_so_far(),
            self.corpus.full_text_trimmed(),
            self.elapsed(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::diff::Classification::*;
    use assert_matches::assert_matches;

    fn session(text: &str) -> Session {
        Session::with_clock(Arc::new(Corpus::build(text).unwrap()), ManualClock::new())
    }

    #[test]
    fn test_new_session_is_active_at_first_line() {
        let s = session("AB\nCD");

        assert_eq!(s.state(), SessionState::Active(0));
        assert_eq!(s.current_line(), "AB");
        assert!(!s.is_started());
        assert_eq!(s.elapsed(), None);
    }

    #[test]
    fn test_scenario_a_space_advances() {
        let mut s = session("AB\nCD");

        let fb = s.on_input("A");
        assert_eq!(fb.diff.classes(), vec![Matched, Pending]);
        assert_eq!(fb.label, DisplayLabel::InProgress { index: 0, total: 2 });

        let fb = s.on_input("AB");
        assert_eq!(fb.diff.classes(), vec![Matched, Matched]);
        assert_eq!(fb.label, DisplayLabel::AwaitingTrigger { index: 0, total: 2 });
        assert_eq!(s.state(), SessionState::AwaitingAdvance(0));

        let fb = s.on_input("AB ");
        assert!(fb.advanced);
        assert_eq!(s.current_index(), 1);
        assert_eq!(s.buffer(), "");
        assert_eq!(fb.buffer, "");
        assert_eq!(fb.diff.reference(), "CD");
        assert_eq!(fb.diff.classes(), vec![Pending, Pending]);
        assert_eq!(fb.label, DisplayLabel::InProgress { index: 1, total: 2 });
    }

    #[test]
    fn test_scenario_b_mismatch_does_not_advance() {
        let mut s = session("AB");

        let fb = s.on_input("AX");
        assert_eq!(fb.diff.classes(), vec![Matched, Mismatched]);
        assert_eq!(fb.metrics.accuracy, 0.5);
        assert!(!fb.advanced);
        assert_eq!(s.state(), SessionState::Active(0));

        let fb = s.on_input("AX ");
        assert!(!fb.advanced);
        assert_eq!(s.state(), SessionState::Active(0));
    }

    #[test]
    fn test_scenario_c_empty_input_on_fresh_session() {
        let mut s = session("AB\nCD");

        let fb = s.on_input("");
        assert_eq!(fb.metrics.progress, 0.0);
        assert_eq!(fb.metrics.accuracy, 1.0);
        assert_eq!(fb.metrics.speed, 0.0);
        assert!(!s.is_started());
    }

    #[test]
    fn test_scenario_d_line_break_triggers_advance() {
        let mut s = session("AB\nCD");

        let fb = s.on_input("AB\n");
        assert!(fb.advanced);
        assert_eq!(s.current_index(), 1);

        let fb = s.on_input("C\r\nD");
        assert!(fb.advanced);
        assert!(s.is_finished());
    }

    #[test]
    fn test_line_break_is_stripped_without_advance() {
        let mut s = session("AB\nCD");

        let fb = s.on_input("A\n");
        assert!(!fb.advanced);
        assert_eq!(fb.buffer, "A");
        assert_eq!(s.buffer(), "A");
        assert_eq!(s.state(), SessionState::Active(0));
    }

    #[test]
    fn test_scenario_e_finished_keeps_last_line() {
        let mut s = session("AB\nCD");

        s.on_input("AB ");
        let fb = s.on_input("CD ");
        assert!(fb.advanced);
        assert_eq!(s.state(), SessionState::Finished);
        assert_eq!(fb.label, DisplayLabel::Finished);
        assert_eq!(fb.diff.reference(), "CD");

        for input in ["", "x", "CD ", "CD\n"] {
            let fb = s.on_input(input);
            assert_eq!(fb.label, DisplayLabel::Finished);
            assert_eq!(fb.diff.reference(), "CD");
            assert_eq!(fb.buffer, "");
            assert!(!fb.advanced);
            assert_eq!(s.current_index(), 1);
        }
    }

    #[test]
    fn test_finished_metrics_count_every_line() {
        let mut s = session("AB\nCD");
        s.on_input("AB ");
        s.on_input("CD ");

        let m = s.metrics();
        assert_eq!(m.typed, 5);
        assert_eq!(m.progress, 1.0);
        assert_eq!(m.accuracy, 1.0);
    }

    #[test]
    fn test_advance_is_idempotent_after_finish() {
        let mut s = session("only line");
        s.advance();
        assert!(s.is_finished());

        let before = (s.state(), s.current_index(), s.current_line().to_owned());
        s.advance();
        s.advance();
        assert_eq!(
            (s.state(), s.current_index(), s.current_line().to_owned()),
            before
        );
    }

    #[test]
    fn test_completion_ignores_surrounding_whitespace() {
        let mut s = session("  indented\nnext");

        let fb = s.on_input("indented");
        assert_eq!(fb.label, DisplayLabel::AwaitingTrigger { index: 0, total: 2 });
        assert_eq!(fb.diff.count(Matched), 0);

        let fb = s.on_input("indented ");
        assert!(fb.advanced);
    }

    #[test]
    fn test_awaiting_returns_to_active_on_edit() {
        let mut s = session("AB\nCD");

        s.on_input("AB");
        assert_matches!(s.state(), SessionState::AwaitingAdvance(0));

        s.on_input("A");
        assert_matches!(s.state(), SessionState::Active(0));
    }

    #[test]
    fn test_metrics_include_completed_lines() {
        let mut s = session("AB\nCD");

        s.on_input("AB ");
        let fb = s.on_input("C");
        assert_eq!(fb.metrics.typed, 4);
        assert_eq!(fb.metrics.correct, 4);
        assert!((fb.metrics.progress - 0.8).abs() < 1e-12);
        assert_eq!(s.typed_so_far(), "AB\nC");
    }

    #[test]
    fn test_metrics_measured_against_unfiltered_text() {
        let mut s = session("AB\n\nCD");

        s.on_input("AB ");
        let fb = s.on_input("CD");
        assert_eq!(fb.metrics.typed, 5);
        assert_eq!(fb.metrics.correct, 3);
        assert!((fb.metrics.accuracy - 0.6).abs() < 1e-12);
        assert!((fb.metrics.progress - 5.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_crlf_text_scores_like_lf_text() {
        let mut lf = session("AB\nCD");
        let mut crlf = session("AB\r\nCD\r\n");

        for input in ["AB ", "CD"] {
            assert_eq!(crlf.on_input(input).metrics, lf.on_input(input).metrics);
        }
        assert!(crlf.is_finished());
        assert_eq!(crlf.metrics().typed, 5);
        assert!((crlf.metrics().accuracy - 1.0).abs() < 1e-12);
        assert!((crlf.metrics().progress - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_advancing_event_reports_its_own_metrics() {
        let mut s = session("AB\nCD");

        let fb = s.on_input("AB ");
        assert_eq!(fb.metrics.typed, 3);
        assert_eq!(fb.metrics.correct, 2);
    }

    #[test]
    fn test_started_latches_once() {
        let clock = ManualClock::new();
        let mut s = Session::with_clock(
            Arc::new(Corpus::build("abcd").unwrap()),
            clock.clone(),
        );

        s.on_input("a");
        assert!(s.is_started());
        clock.advance(Duration::from_secs(30));

        s.on_input("");
        assert!(s.is_started());

        let fb = s.on_input("ab");
        assert_eq!(s.elapsed(), Some(Duration::from_secs(30)));
        assert!((fb.metrics.speed - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_elapsed_freezes_on_finish() {
        let clock = ManualClock::new();
        let mut s = Session::with_clock(Arc::new(Corpus::build("ab").unwrap()), clock.clone());

        s.on_input("a");
        clock.advance(Duration::from_secs(6));
        s.on_input("ab ");
        assert!(s.is_finished());

        clock.advance(Duration::from_secs(60));
        assert_eq!(s.elapsed(), Some(Duration::from_secs(6)));
        assert!((s.metrics().speed - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_reset_from_any_state() {
        let mut s = session("AB\nCD");
        s.on_input("AB ");
        s.on_input("CD ");
        assert!(s.is_finished());

        s.reset();
        assert_eq!(s.state(), SessionState::Active(0));
        assert_eq!(s.buffer(), "");
        assert!(!s.is_started());
        assert_eq!(s.elapsed(), None);
        assert_eq!(s.snapshot().metrics, Metrics::default());

        s.on_input("A");
        s.reset();
        assert_eq!(s.state(), SessionState::Active(0));
        assert!(!s.is_started());
    }

    #[test]
    fn test_control_characters_compared_verbatim() {
        let mut s = session("AB");

        let fb = s.on_input("A\u{7}");
        assert_eq!(fb.diff.classes(), vec![Matched, Mismatched]);
        assert_eq!(fb.buffer, "A\u{7}");
    }

    #[test]
    fn test_snapshot_matches_initial_state() {
        let s = session("hello\nworld");
        let fb = s.snapshot();

        assert_eq!(fb.diff.reference(), "hello");
        assert_eq!(fb.diff.classes(), vec![Pending; 5]);
        assert_eq!(fb.label, DisplayLabel::InProgress { index: 0, total: 2 });
        assert!(!fb.advanced);
    }

    #[test]
    fn test_label_display() {
        assert_eq!(
            DisplayLabel::InProgress { index: 0, total: 4 }.to_string(),
            "Line 1/4"
        );
        assert_eq!(
            DisplayLabel::AwaitingTrigger { index: 2, total: 4 }.to_string(),
            "Line 3/4 - press [space] or [enter] to continue"
        );
        assert_eq!(DisplayLabel::Finished.to_string(), "Done! All lines typed");
    }

    #[test]
    fn test_session_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<Session>();
    }
}
