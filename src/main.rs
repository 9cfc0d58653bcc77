use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{DisableBracketedPaste, EnableBracketedPaste},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use linetype::{
    app::App,
    app_dirs::AppDirs,
    config::{Config, FileConfigStore},
    logging, passage,
    passage::PassageError,
    runtime::{CrosstermEventSource, FixedTicker, Runner},
    Corpus,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    sync::Arc,
    time::Duration,
};
use tracing::info;

const TICK_RATE_MS: u64 = 250;

/// line-by-line typing practice with live feedback
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Type a reference text one line at a time. Each line is coloured as you type, and progress, speed and accuracy update live. Finish a line and press space or enter to move on."
)]
pub struct Cli {
    /// built-in passage to practice (see --list)
    #[clap(short = 'p', long)]
    passage: Option<String>,

    /// reference text file to practice, overrides --passage
    #[clap(short = 'f', long)]
    file: Option<PathBuf>,

    /// list built-in passages and exit
    #[clap(long)]
    list: bool,

    /// speed gauge ceiling in characters per minute
    #[clap(long)]
    max_speed: Option<f64>,

    /// write logs to the state directory
    #[clap(long)]
    log: bool,
}

impl Cli {
    fn load_corpus(&self, config: &Config) -> Result<Corpus, PassageError> {
        match (&self.file, &self.passage) {
            (Some(path), _) => passage::load_file(path),
            (None, Some(name)) => passage::load(name),
            (None, None) => passage::load(&config.passage),
        }
    }

    fn max_speed(&self, config: &Config) -> f64 {
        self.max_speed.unwrap_or(config.max_speed)
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if cli.list {
        for name in passage::names() {
            println!("{name}");
        }
        return Ok(());
    }

    let config = FileConfigStore::new().load_or_create();

    if cli.log {
        logging::init(&config.log_level, &AppDirs::log_path())?;
    }

    let corpus = match cli.load_corpus(&config) {
        Ok(corpus) => Arc::new(corpus),
        Err(err) => {
            let mut cmd = Cli::command();
            cmd.error(ErrorKind::InvalidValue, err).exit();
        }
    };

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    info!(lines = corpus.line_count(), "starting session");

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(corpus, cli.max_speed(&config));
    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableBracketedPaste,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );

    terminal.draw(|f| f.render_widget(&*app, f.area()))?;

    while !app.should_quit {
        if app.handle_event(runner.step()) {
            terminal.draw(|f| f.render_widget(&*app, f.area()))?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["linetype"]);

        assert_eq!(cli.passage, None);
        assert_eq!(cli.file, None);
        assert!(!cli.list);
        assert_eq!(cli.max_speed, None);
        assert!(!cli.log);
    }

    #[test]
    fn test_cli_passage() {
        let cli = Cli::parse_from(["linetype", "-p", "pangrams"]);
        assert_eq!(cli.passage, Some("pangrams".to_string()));

        let cli = Cli::parse_from(["linetype", "--passage", "gettysburg"]);
        assert_eq!(cli.passage, Some("gettysburg".to_string()));
    }

    #[test]
    fn test_cli_file_and_flags() {
        let cli = Cli::parse_from(["linetype", "-f", "lines.txt", "--max-speed", "500", "--log"]);

        assert_eq!(cli.file, Some(PathBuf::from("lines.txt")));
        assert_eq!(cli.max_speed, Some(500.0));
        assert!(cli.log);
    }

    #[test]
    fn test_load_corpus_uses_config_passage_by_default() {
        let cli = Cli::parse_from(["linetype"]);
        let config = Config {
            passage: "pangrams".into(),
            ..Config::default()
        };

        let corpus = cli.load_corpus(&config).unwrap();
        assert_eq!(corpus.line_count(), 5);
    }

    #[test]
    fn test_load_corpus_file_overrides_passage() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mine.txt");
        fs::write(&path, "only line\n").unwrap();

        let cli = Cli::parse_from([
            "linetype",
            "-p",
            "pangrams",
            "-f",
            path.to_str().unwrap(),
        ]);
        let corpus = cli.load_corpus(&Config::default()).unwrap();
        assert_eq!(corpus.line_count(), 1);
    }

    #[test]
    fn test_load_corpus_unknown_passage() {
        let cli = Cli::parse_from(["linetype", "-p", "missing"]);

        assert_matches!(
            cli.load_corpus(&Config::default()),
            Err(PassageError::UnknownPassage(_))
        );
    }

    #[test]
    fn test_max_speed_prefers_cli() {
        let config = Config::default();
        assert_eq!(Cli::parse_from(["linetype"]).max_speed(&config), 1000.0);
        assert_eq!(
            Cli::parse_from(["linetype", "--max-speed", "300"]).max_speed(&config),
            300.0
        );
    }
}
