// Library surface for headless/integration tests and reuse.
// The engine (corpus, session, diff, metrics) has no terminal dependencies;
// app/ui/runtime/line_editor make up the terminal shell around it.
pub mod app;
pub mod app_dirs;
pub mod clock;
pub mod config;
pub mod corpus;
pub mod diff;
pub mod error;
pub mod line_editor;
pub mod logging;
pub mod metrics;
pub mod passage;
pub mod runtime;
pub mod session;
pub mod ui;

pub use corpus::Corpus;
pub use diff::{Classification, Diff, DiffEntry, Run};
pub use error::EngineError;
pub use metrics::Metrics;
pub use session::{DisplayLabel, Feedback, Session, SessionState};
