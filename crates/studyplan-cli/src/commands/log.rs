use std::path::PathBuf;

use clap::Subcommand;
use studyplan_core::storage::default_log_path;
use studyplan_core::{JsonFileLogSink, LogEvent, SqliteLogSink};

#[derive(Subcommand)]
pub enum LogAction {
    /// Show recent log events
    Show {
        /// JSON log file (defaults to scheduler_log.json in the data directory)
        #[arg(long, conflicts_with = "sqlite")]
        log: Option<PathBuf>,
        /// Read from a SQLite log database instead
        #[arg(long)]
        sqlite: Option<PathBuf>,
        /// Maximum number of events to show
        #[arg(long, default_value_t = 20)]
        limit: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: LogAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        LogAction::Show {
            log,
            sqlite,
            limit,
            json,
        } => {
            let events = match sqlite {
                Some(path) => SqliteLogSink::open(path)?
                    .recent(limit)?
                    .into_iter()
                    .map(|stored| stored.event)
                    .collect(),
                None => {
                    let path = match log {
                        Some(path) => path,
                        None => default_log_path()?,
                    };
                    let mut events = JsonFileLogSink::new(path).read_all()?;
                    let skip = events.len().saturating_sub(limit);
                    events.drain(..skip);
                    events
                }
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&events)?);
            } else if events.is_empty() {
                println!("No log events.");
            } else {
                for event in &events {
                    println!("{}", format_event(event));
                }
            }
        }
    }
    Ok(())
}

fn format_event(event: &LogEvent) -> String {
    let extra = event
        .extended_by
        .map(|minutes| format!(" +{minutes} min"))
        .unwrap_or_default();
    format!(
        "{:<9} {:>3} min  {}{}",
        event.action.label(),
        event.task_duration,
        event.task_description,
        extra
    )
}
