mod app;
mod calendar;
mod domain;
mod input;
mod notifications;
mod persistence;
mod registry;
mod schedule;
mod session;
mod ticker;
mod ui;

use anyhow::{Context, Result};
use app::AppState;
use calendar::StubCalendar;
use chrono::Local;
use clap::{Parser, Subcommand};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use domain::validation::{parse_optional_date, parse_optional_time};
use domain::{display_order, session_badge, TaskDraft};
use persistence::{ensure_pomodo_dir, init_local_pomodo, log_file, FileStore};
use ratatui::{backend::CrosstermBackend, Terminal};
use session::DEFAULT_REPEATS;
use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Mutex;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter
const LOG_ENV: &str = "POMODO_LOG";

#[derive(Parser)]
#[command(name = "pomodo")]
#[command(about = "A terminal Pomodoro timer with tasks and a schedule", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a local .pomodo directory in the current directory
    Init,
    /// Add a task
    Add {
        /// Task name
        name: String,
        /// Focus minutes (defaults to the settings value)
        #[arg(long)]
        focus: Option<u32>,
        /// Short break minutes (defaults to the settings value)
        #[arg(long)]
        short: Option<u32>,
        /// Long break minutes (defaults to the settings value)
        #[arg(long)]
        long: Option<u32>,
        /// Focus sessions before a long break
        #[arg(long, default_value_t = DEFAULT_REPEATS)]
        repeats: u32,
        /// Scheduled date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
        /// Scheduled time (HH:MM), requires --date
        #[arg(long)]
        time: Option<String>,
    },
    /// List tasks, current task first
    List,
    /// Mark overdue tasks and print scheduled tasks by day
    Agenda {
        /// Print events as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Init) => {
            init_stderr_tracing()?;
            let current_dir = std::env::current_dir().context("Could not determine current directory")?;
            let pomodo_dir = init_local_pomodo(&current_dir)?;
            println!("Initialized pomodo directory: {}", pomodo_dir.display());
            println!();
            println!("Pomodo will now use this local directory for tasks and timer state.");
            println!("Run 'pomodo' to start the timer.");
            Ok(())
        }
        Some(Commands::Add {
            name,
            focus,
            short,
            long,
            repeats,
            date,
            time,
        }) => {
            init_stderr_tracing()?;
            let scheduled_date = parse_optional_date(date.as_deref().unwrap_or_default())?;
            let scheduled_time = parse_optional_time(time.as_deref().unwrap_or_default())?;
            if scheduled_time.is_some() && scheduled_date.is_none() {
                anyhow::bail!("--time needs a --date");
            }

            let mut app = open_app()?;
            let defaults = app.settings;
            let mut draft = TaskDraft::new(
                name,
                focus.unwrap_or(defaults.work),
                short.unwrap_or(defaults.short_break),
                long.unwrap_or(defaults.long_break),
                repeats,
            );
            if let Some(date) = scheduled_date {
                draft = draft.scheduled(date, scheduled_time);
            }

            let id = app.create_task(draft)?;
            if let Some(task) = app.registry.get(id) {
                println!("Added task '{}' ({})", task.name, task.id);
            }
            Ok(())
        }
        Some(Commands::List) => {
            init_stderr_tracing()?;
            let app = open_app()?;
            print_tasks(&app);
            Ok(())
        }
        Some(Commands::Agenda { json }) => {
            init_stderr_tracing()?;
            let mut app = open_app()?;
            app.reconcile_schedule(Local::now().naive_local());
            print_agenda(&app, json)
        }
        None => run_tui(),
    }
}

/// One-shot commands log to stderr
fn init_stderr_tracing() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))
}

/// The terminal UI owns the screen, so logs go to a file in the data directory
fn init_file_tracing(dir: &Path) -> Result<()> {
    let path = log_file(dir);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"))
}

fn open_app() -> Result<AppState> {
    let dir = ensure_pomodo_dir()?;
    Ok(AppState::load(
        Box::new(FileStore::new(dir)),
        Box::new(StubCalendar::new()),
    ))
}

fn print_tasks(app: &AppState) {
    let tasks = app.registry.tasks();
    if tasks.is_empty() {
        println!("No tasks. Add one with 'pomodo add <name>'.");
        return;
    }
    for idx in display_order(tasks) {
        let task = &tasks[idx];
        let marker = if task.is_current { "*" } else { " " };
        let mut line = format!(
            "{marker} {:<30} {:>4}m  {:>5}",
            task.name,
            task.focus_time,
            session_badge(task)
        );
        if let Some(status) = task.status {
            line.push_str(&format!("  {:<8}", status.to_tag()));
        }
        if let Some(due) = task.due_at() {
            match task.scheduled_time {
                Some(_) => line.push_str(&due.format(" %Y-%m-%d %H:%M").to_string()),
                None => line.push_str(&due.format(" %Y-%m-%d").to_string()),
            }
        }
        println!("{line}");
    }
}

fn print_agenda(app: &AppState, json: bool) -> Result<()> {
    let events = app.calendar_events();
    if json {
        println!("{}", serde_json::to_string_pretty(&events)?);
        return Ok(());
    }
    if events.is_empty() {
        println!("Nothing scheduled.");
        return Ok(());
    }
    for (date, day_events) in schedule::group_by_date(&events) {
        println!("{}", date.format("%A, %B %-d %Y"));
        for event in day_events {
            let when = event
                .time
                .map(|time| time.format("%H:%M").to_string())
                .unwrap_or_else(|| "all day".to_string());
            let class = event.style.class_name();
            if class.is_empty() {
                println!("  {when:>7}  {}", event.title);
            } else {
                println!("  {when:>7}  {}  [{}]", event.title, class.trim_end_matches("-event"));
            }
        }
    }
    Ok(())
}

fn run_tui() -> Result<()> {
    // Ensure data directory exists
    let pomodo_dir = ensure_pomodo_dir()?;
    init_file_tracing(&pomodo_dir)?;

    // Show which directory we're using
    eprintln!("Using pomodo directory: {}", pomodo_dir.display());

    let mut app = AppState::load(
        Box::new(FileStore::new(&pomodo_dir)),
        Box::new(StubCalendar::new()),
    );

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run app
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Pause, cancel the tick and save on exit
    if let Err(e) = app.shutdown() {
        eprintln!("Error saving state: {:#}", e);
    }

    // Print any errors
    if let Err(err) = result {
        eprintln!("Error: {:#}", err);
    }

    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut AppState) -> Result<()> {
    let tick_rate = ticker::tick_duration();

    loop {
        terminal.draw(|f| ui::render(f, app))?;

        // Handle events with timeout for ticking
        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                // Only process key press events (ignore key release)
                if key.kind == KeyEventKind::Press && input::handle_key(app, key)? {
                    return Ok(());
                }
            }
        }

        // Count down every whole second that elapsed while running
        app.on_tick(Instant::now());
    }
}
