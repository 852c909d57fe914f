use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use att_cli::commands::{export, mark, ocr, report, subject, timetable, today, util};
use att_cli::{Cli, Commands, Config, SubjectAction, TimetableAction};
use att_store::Tracker;

/// Load config and open the tracker, creating the data directory if needed.
fn open_tracker(config_path: Option<&Path>) -> Result<(Tracker, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let tracker = Tracker::open(&config.data_dir, &config.days).with_context(|| {
        format!("failed to open data directory {}", config.data_dir.display())
    })?;

    let snapshot = tracker.snapshot().context("failed to read tracker data")?;
    for warning in util::malformed_warnings(&snapshot) {
        eprintln!("{warning}");
    }
    Ok((tracker, config))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match &cli.command {
        Some(Commands::Subject(action)) => {
            let (tracker, config) = open_tracker(cli.config.as_deref())?;
            match action {
                SubjectAction::Add { name, target } => {
                    let target = target.unwrap_or_else(|| i64::from(config.default_target.get()));
                    subject::add(&mut out, &tracker, name, target)?;
                }
                SubjectAction::Remove { name } => subject::remove(&mut out, &tracker, name)?,
                SubjectAction::List { json } => subject::list(&mut out, &tracker, *json)?,
            }
        }
        Some(Commands::Mark {
            subject,
            outcome,
            date,
        }) => {
            let (tracker, _config) = open_tracker(cli.config.as_deref())?;
            mark::run(&mut out, &tracker, subject, *outcome, util::resolve_date(*date))?;
        }
        Some(Commands::Today { date }) => {
            let (tracker, _config) = open_tracker(cli.config.as_deref())?;
            today::run(&mut out, &tracker, util::resolve_date(*date))?;
        }
        Some(Commands::Timetable(action)) => {
            let (tracker, _config) = open_tracker(cli.config.as_deref())?;
            match action {
                TimetableAction::Add { day, subject } => {
                    timetable::add(&mut out, &tracker, *day, subject)?;
                }
                TimetableAction::Remove { day, subject } => {
                    timetable::remove(&mut out, &tracker, *day, subject)?;
                }
                TimetableAction::Show { json } => timetable::show(&mut out, &tracker, *json)?,
            }
        }
        Some(Commands::Report { date, json }) => {
            let (tracker, _config) = open_tracker(cli.config.as_deref())?;
            report::run(&mut out, &tracker, util::resolve_date(*date), *json)?;
        }
        Some(Commands::Export { output }) => {
            let (tracker, _config) = open_tracker(cli.config.as_deref())?;
            match output {
                Some(path) => {
                    let file = File::create(path)
                        .with_context(|| format!("failed to create {}", path.display()))?;
                    export::run(BufWriter::new(file), &tracker)?;
                    tracing::info!(path = %path.display(), "exported attendance");
                }
                None => export::run(&mut out, &tracker)?,
            }
        }
        Some(Commands::Ocr(args)) => {
            let (tracker, config) = open_tracker(cli.config.as_deref())?;
            ocr::run(&mut out, &tracker, &config, args)?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    out.flush()?;
    Ok(())
}
