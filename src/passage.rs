use include_dir::{include_dir, Dir};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::corpus::Corpus;
use crate::error::EngineError;

static PASSAGE_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/passages");

pub const DEFAULT_PASSAGE: &str = "anthem";

#[derive(Debug, Error)]
pub enum PassageError {
    #[error("no built-in passage named '{0}'")]
    UnknownPassage(String),

    #[error("failed to read reference text from {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Corpus(#[from] EngineError),
}

/// Names of the built-in passages, sorted.
pub fn names() -> Vec<&'static str> {
    let mut names = PASSAGE_DIR
        .files()
        .filter_map(|file| file.path().file_stem()?.to_str())
        .collect::<Vec<&str>>();
    names.sort_unstable();
    names
}

/// Raw text of a built-in passage.
pub fn text(name: &str) -> Result<&'static str, PassageError> {
    PASSAGE_DIR
        .get_file(format!("{name}.txt"))
        .and_then(|file| file.contents_utf8())
        .ok_or_else(|| PassageError::UnknownPassage(name.to_owned()))
}

pub fn load(name: &str) -> Result<Corpus, PassageError> {
    Ok(Corpus::build(text(name)?)?)
}

pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Corpus, PassageError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|source| PassageError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Corpus::build(&raw)?)
}
