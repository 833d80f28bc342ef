mod ui;

use std::{
    fs::{self, OpenOptions},
    io::{self, stdin},
    path::PathBuf,
    sync::Mutex,
};

use anyhow::{Context, Result};
use clap::{error::ErrorKind, ArgGroup, CommandFactory, Parser, ValueEnum};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use rampread::{
    app_dirs::AppDirs,
    config::{ConfigStore, FileConfigStore, Settings},
    document::Document,
    ramp::{clamp_wpm, Mode},
    runtime::{CrosstermEventSource, FixedTicker, ReaderEvent, Runner},
    Reader, SystemClock,
};

/// rsvp speed reader with adaptive speed ramps
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Flashes a text one word at a time. Speed can stay fixed, ramp up as you read (training), or ease up over a fixed time (demo). Training backs off when long pauses or big rewinds suggest you're struggling."
)]
#[clap(group(ArgGroup::new("source").required(true).args(["file", "prompt"])))]
pub struct Cli {
    /// text file to read
    file: Option<PathBuf>,

    /// read this text instead of a file
    #[clap(short = 'p', long)]
    prompt: Option<String>,

    /// speed mode
    #[clap(short = 'm', long, value_enum)]
    mode: Option<ModeArg>,

    /// starting words per minute
    #[clap(short = 'w', long)]
    wpm: Option<u32>,

    /// ramp ceiling in words per minute (training and demo)
    #[clap(long)]
    max_wpm: Option<u32>,

    /// seconds the demo ramp takes to reach its ceiling
    #[clap(long)]
    ramp_secs: Option<f64>,

    /// show every word for the same time regardless of punctuation
    #[clap(long)]
    no_punctuation_pauses: bool,

    /// settings file to use instead of the default location
    #[clap(long)]
    config: Option<PathBuf>,

    /// debug-level logging
    #[clap(short = 'v', long)]
    verbose: bool,
}

#[derive(Debug, Copy, Clone, PartialEq, ValueEnum)]
pub enum ModeArg {
    Fixed,
    Training,
    Demo,
}

impl From<ModeArg> for Mode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Fixed => Mode::Fixed,
            ModeArg::Training => Mode::Training,
            ModeArg::Demo => Mode::Demo,
        }
    }
}

impl Cli {
    /// Overlay command line flags on the stored settings
    fn apply(&self, settings: &mut Settings) {
        if let Some(mode) = self.mode {
            settings.mode = mode.into();
        }
        if let Some(wpm) = self.wpm.map(clamp_wpm) {
            settings.timing.words_per_minute = wpm;
            match settings.mode {
                Mode::Fixed => settings.fixed.speed = wpm,
                Mode::Training => settings.training.start_speed = wpm,
                Mode::Demo => settings.demo.start_speed = wpm,
            }
        }
        if let Some(max) = self.max_wpm.map(clamp_wpm) {
            settings.training.max_speed = max;
            settings.demo.max_speed = max;
        }
        if let Some(secs) = self.ramp_secs {
            settings.demo.ramp_duration_seconds = secs.max(0.0);
        }
        if self.no_punctuation_pauses {
            settings.timing.punctuation_pauses_enabled = false;
        }
    }

    fn load_document(&self) -> rampread::Result<Document> {
        match (&self.prompt, &self.file) {
            (Some(prompt), _) => {
                let document = Document::parse(prompt);
                if document.is_empty() {
                    return Err(rampread::Error::EmptyDocument {
                        path: PathBuf::from("--prompt"),
                    });
                }
                Ok(document)
            }
            (None, Some(path)) => Document::load(path),
            (None, None) => Err(rampread::Error::EmptyDocument {
                path: PathBuf::new(),
            }),
        }
    }

    fn config_store(&self) -> FileConfigStore {
        match &self.config {
            Some(path) => FileConfigStore::with_path(path),
            None => FileConfigStore::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppState {
    Reading,
    Results,
}

#[derive(Debug)]
pub struct App {
    pub reader: Reader<SystemClock>,
    pub state: AppState,
}

impl App {
    pub fn new(document: Document, settings: Settings) -> Self {
        Self {
            reader: Reader::new(document, settings, SystemClock),
            state: AppState::Reading,
        }
    }

    /// True when the screen needs redrawing
    pub fn on_frame(&mut self) -> bool {
        let changed = self.reader.on_frame();
        changed || self.check_finished()
    }

    fn check_finished(&mut self) -> bool {
        if self.state == AppState::Reading && self.reader.has_finished() {
            self.state = AppState::Results;
            return true;
        }
        false
    }

    /// Returns false when the reader asked to quit
    pub fn on_key(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return false;
        }

        match (self.state, key.code) {
            (_, KeyCode::Esc | KeyCode::Char('q')) => return false,
            (_, KeyCode::Char('r')) => {
                self.reader.restart();
                self.state = AppState::Reading;
            }
            (AppState::Reading, KeyCode::Char(' ')) => {
                self.reader.toggle_pause();
            }
            (AppState::Reading, KeyCode::Left | KeyCode::Char('h')) => self.reader.rewind(),
            (AppState::Reading, KeyCode::Right | KeyCode::Char('l')) => self.reader.skip(),
            (AppState::Reading, KeyCode::Up | KeyCode::Char('k')) => self.reader.speed_up(),
            (AppState::Reading, KeyCode::Down | KeyCode::Char('j')) => self.reader.slow_down(),
            (AppState::Reading, KeyCode::Char('m')) => self.reader.cycle_mode(),
            (AppState::Reading, KeyCode::Char('f')) => {
                self.reader.toggle_ramp_freeze();
            }
            _ => {}
        }

        self.check_finished();
        true
    }
}

fn init_logging(verbose: bool) -> Result<()> {
    let Some(path) = AppDirs::log_path() else {
        return Ok(());
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    // The terminal is in raw mode while reading, so logs only go to the file
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    init_logging(cli.verbose)?;

    let store = cli.config_store();
    let mut settings = store.load();
    cli.apply(&mut settings);
    let document = cli.load_document().context("loading text")?;
    info!(path = %store.path().display(), mode = %settings.mode, "settings loaded");

    enable_raw_mode().context("enabling raw mode")?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(document, settings);
    let res = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = store.save(app.reader.settings()) {
        warn!(%err, "could not save settings");
    }

    res
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    let mut runner = Runner::new(CrosstermEventSource::new(), FixedTicker::default());

    app.reader.start();
    terminal.draw(|f| ui(app, f))?;

    loop {
        let redraw = match runner.step() {
            ReaderEvent::Frame => app.on_frame(),
            ReaderEvent::Resize => true,
            ReaderEvent::Key(key) => {
                if !app.on_key(key) {
                    break;
                }
                true
            }
        };
        if redraw {
            terminal.draw(|f| ui(app, f))?;
        }
    }

    Ok(())
}

fn ui(app: &App, f: &mut Frame) {
    f.render_widget(app, f.area());
}
