mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use colourmatch::{
    app_dirs::AppDirs,
    clock::{MonotonicTime, TimeSource},
    config::{Config, ConfigStore, FileConfigStore, LogFormat},
    persistence::FileSink,
    random::{RandomSource, StdRandom},
    runtime::{CrosstermEventSource, FixedTicker, Runner, Stimulus},
    session::AutoSave,
    Phase, Progress, SlideMachine, TICK_RATE_MS,
};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    fs::{self, File, OpenOptions},
    io::{self, stdin},
    path::{Path, PathBuf},
    sync::Mutex,
    time::Duration,
};
use tracing_subscriber::EnvFilter;

/// timed colour-matching task with click logging
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Runs a timed colour-matching task: each slide shows a prompt, a colour is picked from a shrinking palette before the countdown ends, and every interaction is logged and saved when the task ends."
)]
pub struct Cli {
    /// seconds allowed per slide
    #[clap(short = 's', long)]
    slide_secs: Option<u64>,

    /// number of colour options (1-9)
    #[clap(short = 'o', long)]
    options: Option<usize>,

    /// comma separated prompt labels
    #[clap(short = 'p', long, value_delimiter = ',')]
    prompts: Option<Vec<String>>,

    /// directory for saved click logs
    #[clap(long)]
    log_dir: Option<PathBuf>,

    /// file format for saved click logs
    #[clap(short = 'f', long, value_enum)]
    format: Option<LogFormat>,

    /// seed for reproducible correctness draws
    #[clap(long)]
    seed: Option<u64>,

    /// settings file to use instead of the default location
    #[clap(short = 'c', long)]
    config: Option<PathBuf>,

    /// write the effective settings to the settings file and exit
    #[clap(long)]
    write_config: bool,
}

impl Cli {
    /// Command line flags win over the stored config
    fn apply(&self, mut cfg: Config) -> Config {
        if let Some(secs) = self.slide_secs {
            cfg.slide_secs = secs;
        }
        if let Some(n) = self.options {
            cfg.option_count = n;
        }
        if let Some(prompts) = &self.prompts {
            cfg.prompts = prompts.iter().map(|p| p.trim().to_string()).collect();
        }
        if let Some(dir) = &self.log_dir {
            cfg.log_dir = Some(dir.clone());
        }
        if let Some(format) = self.format {
            cfg.log_format = format;
        }
        cfg
    }

    fn store(&self) -> FileConfigStore {
        self.config
            .as_ref()
            .map(FileConfigStore::with_path)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct App<T: TimeSource = MonotonicTime, R: RandomSource = StdRandom> {
    pub machine: SlideMachine<T, R>,
    pub status: Option<String>,
}

impl<T: TimeSource, R: RandomSource> App<T, R> {
    pub fn new(config: &Config, time: T, random: R) -> Self {
        let log_dir = config.log_dir.clone().unwrap_or_else(AppDirs::click_log_dir);
        let sink = FileSink::new(&log_dir, config.log_format);
        Self {
            machine: SlideMachine::new(config, time, random).with_sink(Box::new(sink)),
            status: None,
        }
    }

    pub fn on_progress(&mut self, progress: Progress) {
        tracing::debug!(?progress, "tick");
        if let Progress::Ended(_) = progress {
            self.status = match self.machine.auto_save() {
                Some(AutoSave::Written(path)) => {
                    Some(format!("Click log saved to {}", path.display()))
                }
                Some(AutoSave::Failed(e)) => Some(format!("Automatic save failed: {e}")),
                Some(AutoSave::Skipped) | None => None,
            };
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Flow {
        if key.code == KeyCode::Esc
            || (key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c'))
        {
            return Flow::Quit;
        }

        let outcome = match (self.machine.phase(), key.code) {
            (_, KeyCode::Char('s')) => {
                self.save();
                Ok(())
            }
            (_, KeyCode::Char('l')) => {
                match self.machine.log().to_json() {
                    Ok(json) => tracing::info!(log = %json, "click log"),
                    Err(e) => tracing::warn!(error = %e, "could not encode click log"),
                }
                Ok(())
            }
            (Phase::Idle, KeyCode::Enter) => self.machine.start(),
            (Phase::Ended, KeyCode::Char('r')) => {
                self.machine.reset();
                self.status = None;
                Ok(())
            }
            (_, KeyCode::Char(c)) if c.is_ascii_digit() && c != '0' => {
                let id = c as usize - '1' as usize;
                self.machine.select(id)
            }
            (_, KeyCode::Enter | KeyCode::Right | KeyCode::Char('a')) => self.machine.confirm(),
            _ => Ok(()),
        };

        if let Err(e) = outcome {
            tracing::debug!(error = %e, "input ignored");
        }
        Flow::Continue
    }

    fn save(&mut self) {
        self.status = match self.machine.save_now() {
            Ok(Some(path)) => Some(format!("Saved {}", path.display())),
            Ok(None) => Some("Nothing to save yet".to_string()),
            Err(e) => {
                tracing::warn!(error = %e, "manual save failed");
                Some(format!("Save failed: {e}"))
            }
        };
    }
}

fn open_trace_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Traces go to a file; the terminal belongs to the TUI
fn init_tracing() {
    let path = AppDirs::trace_path();
    let file = match open_trace_file(&path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("colourmatch: cannot open {}: {e}; tracing disabled", path.display());
            return;
        }
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let store = cli.store();
    let config = cli.apply(store.load());

    if let Err(e) = config.validate() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::InvalidValue, e.to_string()).exit();
    }

    if cli.write_config {
        store.save(&config)?;
        println!("wrote {}", store.path().display());
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    init_tracing();
    let random = cli.seed.map_or_else(StdRandom::from_entropy, StdRandom::seeded);
    let mut app = App::new(&config, MonotonicTime::new(), random);

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );

    loop {
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;

        match runner.advance(&mut app.machine) {
            Stimulus::Progress(progress) => app.on_progress(progress),
            Stimulus::Redraw => {}
            Stimulus::Key(key) => {
                if app.handle_key(key) == Flow::Quit {
                    break;
                }
            }
        }
    }

    Ok(())
}
