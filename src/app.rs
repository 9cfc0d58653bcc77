use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::corpus::Corpus;
use crate::line_editor::LineEditor;
use crate::runtime::AppEvent;
use crate::session::{Feedback, Session};

/// Presentation state: the engine, the entry buffer and the last feedback the
/// engine produced. Rendering only ever reads `feedback`.
#[derive(Debug)]
pub struct App {
    pub session: Session,
    pub editor: LineEditor,
    pub feedback: Feedback,
    pub max_speed: f64,
    pub should_quit: bool,
}

impl App {
    pub fn new(corpus: Arc<Corpus>, max_speed: f64) -> Self {
        Self::with_session(Session::new(corpus), max_speed)
    }

    pub fn with_session(session: Session, max_speed: f64) -> Self {
        let feedback = session.snapshot();
        Self {
            session,
            editor: LineEditor::new(),
            feedback,
            max_speed,
            should_quit: false,
        }
    }

    /// Returns true when the screen needs redrawing.
    pub fn handle_event(&mut self, event: AppEvent) -> bool {
        match event {
            AppEvent::Key(key) => self.handle_key(key),
            AppEvent::Paste(text) => {
                self.editor.insert_str(&text);
                self.submit();
                true
            }
            AppEvent::Resize => true,
            AppEvent::Tick => self.on_tick(),
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> bool {
        // AltGr arrives as Ctrl+Alt
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL)
            && !key.modifiers.contains(KeyModifiers::ALT);
        match key.code {
            KeyCode::Esc => {
                self.should_quit = true;
                false
            }
            KeyCode::Char('c') if ctrl => {
                self.should_quit = true;
                false
            }
            KeyCode::Char('r') if ctrl => {
                self.reset();
                true
            }
            _ => {
                let changed = self.editor.handle_key(&key);
                if changed {
                    self.submit();
                }
                // cursor moves still need a redraw
                true
            }
        }
    }

    /// Send the entry buffer to the engine and adopt its sanitized result.
    pub fn submit(&mut self) {
        self.feedback = self.session.on_input(self.editor.text());
        self.editor.sync(&self.feedback.buffer);
    }

    pub fn reset(&mut self) {
        self.session.reset();
        self.editor.clear();
        self.feedback = self.session.snapshot();
    }

    /// Refresh speed while the learner pauses mid-line.
    pub fn on_tick(&mut self) -> bool {
        if self.session.is_started() && !self.session.is_finished() {
            self.feedback.metrics = self.session.metrics();
            true
        } else {
            false
        }
    }
}
