mod app;
mod config;
mod domain;
mod input;
mod notifications;
mod persistence;
mod ui;

use anyhow::{Context, Result};
use app::{AppSettings, AppState};
use clap::{Parser, Subcommand};
use config::Config;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use domain::{Filter, Priority, SortKey, TaskDraft};
use persistence::{ensure_data_dir, init_local_data_dir, JsonFileStore};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, BufRead, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};

/// Log file written inside the data directory
const LOG_FILE_NAME: &str = "taskdeck.log";

#[derive(Parser)]
#[command(name = "taskdeck")]
#[command(about = "A keyboard-driven to-do list for the terminal", long_about = None)]
struct Cli {
    /// Config file (defaults to ~/.config/taskdeck/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Data directory, overriding the config file and .taskdeck lookup
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); RUST_LOG wins if set
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a local .taskdeck directory in the current directory
    Init,
    #[command(flatten)]
    Tasks(TaskCommand),
}

/// One-shot commands that work on the stored task list
#[derive(Subcommand)]
enum TaskCommand {
    /// Print the task list
    List {
        /// all, pending or completed
        #[arg(short, long, default_value = "all")]
        filter: String,
        /// created, priority, duedate or category
        #[arg(short, long, default_value = "created")]
        sort: String,
    },
    /// Add a task
    Add {
        text: String,
        /// low, medium or high
        #[arg(short, long, default_value = "medium")]
        priority: String,
        #[arg(short, long)]
        category: Option<String>,
        /// Due date (YYYY-MM-DD)
        #[arg(short, long)]
        due: Option<String>,
    },
    /// Print completion statistics
    Stats,
    /// Delete all completed tasks
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Write a dated JSON backup
    Export {
        /// Target directory. Defaults to the current directory
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },
    /// Replace all tasks with the content of a JSON backup ("-" reads stdin)
    Import { file: PathBuf },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Init runs before the data directory is resolved so it can't create ~/.taskdeck
    let command = match cli.command {
        Some(Commands::Init) => return init_command(),
        Some(Commands::Tasks(command)) => Some(command),
        None => None,
    };

    let config = Config::load(cli.config.as_deref())?;
    let explicit_dir = cli.data_dir.clone().or_else(|| config.data_dir.clone());
    let data_dir = ensure_data_dir(explicit_dir.as_deref())?;

    let log_level = cli.log_level.clone().unwrap_or_else(|| config.log_level.clone());
    let _log_guard = init_logging(&log_level, &data_dir);
    tracing::info!("taskdeck starting with data directory {}", data_dir.display());

    let export_dir = match &command {
        Some(TaskCommand::Export { dir: Some(dir) }) => dir.clone(),
        _ => std::env::current_dir().context("Could not determine current directory")?,
    };
    let settings = AppSettings {
        toasts: config.toasts,
        debounce: config.debounce,
        export_dir,
    };
    let store = Box::new(JsonFileStore::new(&data_dir));

    match command {
        None => run_tui(AppState::new(store, settings), &config),
        Some(command) => run_command(AppState::open(store, settings)?, command),
    }
}

fn init_command() -> Result<()> {
    let data_dir = init_local_data_dir()?;
    println!("Initialized taskdeck directory: {}", data_dir.display());
    println!();
    println!("taskdeck will now use this local directory for task storage.");
    println!("Run 'taskdeck' to open your list.");
    Ok(())
}

/// Initialize file-based logging in the data directory
///
/// The terminal belongs to ratatui, so nothing is logged to stdout. The
/// returned guard flushes buffered entries when dropped.
fn init_logging(level: &str, data_dir: &Path) -> Option<WorkerGuard> {
    let file_appender = match RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(LOG_FILE_NAME)
        .build(data_dir)
    {
        Ok(appender) => appender,
        Err(e) => {
            eprintln!("Logging disabled: {}", e);
            return None;
        }
    };
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .try_init()
        .ok()?;

    Some(guard)
}

fn run_command(mut app: AppState, command: TaskCommand) -> Result<()> {
    match command {
        TaskCommand::List { filter, sort } => {
            let filter = Filter::from_name(&filter)
                .with_context(|| format!("Unknown filter '{}'", filter))?;
            let sort =
                SortKey::from_name(&sort).with_context(|| format!("Unknown sort '{}'", sort))?;
            app.set_filter(filter);
            app.set_sort(sort);
            print_list(&app);
        }
        TaskCommand::Add {
            text,
            priority,
            category,
            due,
        } => {
            let priority = Priority::from_name(&priority)
                .with_context(|| format!("Unknown priority '{}'", priority))?;
            let due_date = app::parse_due_date(due.as_deref().unwrap_or(""))?;
            let mut draft = TaskDraft::new(text)
                .with_priority(priority)
                .with_due_date(due_date);
            if let Some(category) = category {
                draft = draft.with_category(category);
            }
            let task = app.add(draft)?;
            ensure_saved(&mut app)?;
            println!("Added \"{}\" ({})", task.text, task.priority.name());
        }
        TaskCommand::Stats => {
            let stats = app.stats();
            println!("Total:     {}", stats.total);
            println!("Completed: {}", stats.completed);
            println!("Pending:   {}", stats.pending);
            println!("Overdue:   {}", stats.overdue);
            println!("Progress:  {}%", stats.completion_rate);
            if let Some(saved) = app.last_saved() {
                println!("Saved:     {}", saved.format("%Y-%m-%d %H:%M:%S"));
            }
        }
        TaskCommand::Clear { yes } => {
            let mut confirm = |prompt: &str| yes || ask_yes_no(prompt);
            let cleared = app.clear_completed(&mut confirm)?;
            ensure_saved(&mut app)?;
            match cleared {
                Some(count) => println!("{} completed tasks cleared!", count),
                None => println!("Nothing deleted."),
            }
        }
        TaskCommand::Export { .. } => {
            let path = app.export()?;
            println!("Tasks exported to {}", path.display());
        }
        TaskCommand::Import { file } if file.as_os_str() == "-" => {
            let mut content = String::new();
            io::stdin()
                .read_to_string(&mut content)
                .context("Could not read tasks from stdin")?;
            let count = app.import_content(&content)?;
            ensure_saved(&mut app)?;
            println!("Imported {} tasks from stdin", count);
        }
        TaskCommand::Import { file } => {
            let count = app.import_file(&file)?;
            ensure_saved(&mut app)?;
            println!("Imported {} tasks from {}", count, file.display());
        }
    }
    Ok(())
}

/// Fail the command when the write behind it did not reach the store
fn ensure_saved(app: &mut AppState) -> Result<()> {
    match app.take_save_error() {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}

fn print_list(app: &AppState) {
    let projection = app.render();
    if projection.is_empty {
        println!("{}", ui::list_pane::empty_message(projection.filter, projection.stats.total));
        return;
    }

    for row in &projection.rows {
        let checkbox = if row.completed { "[x]" } else { "[ ]" };
        let due = row
            .due
            .as_ref()
            .map(|d| format!("  {}", d.label))
            .unwrap_or_default();
        println!(
            "{} {}  {}  [{}]{}",
            checkbox,
            row.text,
            row.priority.name().to_uppercase(),
            row.category,
            due
        );
    }
}

/// Ask on stdin; anything but y/yes declines
fn ask_yes_no(prompt: &str) -> bool {
    print!("{} [y/N] ", prompt);
    if io::stdout().flush().is_err() {
        return false;
    }

    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

fn run_tui(mut app: AppState, config: &Config) -> Result<()> {
    app.welcome_if_new();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, config);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Save on exit
    if let Err(e) = app.save() {
        tracing::error!("final save failed: {:#}", anyhow::Error::new(e));
        eprintln!("Error saving tasks. See {} for details.", LOG_FILE_NAME);
    }

    tracing::info!("taskdeck exiting");
    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
    config: &Config,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui::render(f, app))?;

        // Handle events with timeout for ticking
        if event::poll(config.tick)? {
            if let Event::Key(key) = event::read()? {
                // Only process key press events (ignore key release)
                if key.kind == KeyEventKind::Press && input::handle_key(app, key)? {
                    return Ok(());
                }
            }
        }

        app.tick(Instant::now());

        for cue in app.take_cues() {
            if config.sound {
                notifications::play_cue(cue);
            }
        }
    }
}
