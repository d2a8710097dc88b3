use std::io::{BufRead, Write};
use std::path::PathBuf;

use clap::Args;
use studyplan_core::error::{InvalidAction, LogSinkError};
use studyplan_core::storage::default_log_path;
use studyplan_core::{
    run_session, ActionSource, Config, JsonFileLogSink, LogSink, Outcome, Prompt, ScheduleItem,
    SessionSummary, SqliteLogSink,
};

use super::plan::{self, PlanInput};

#[derive(Args, Debug)]
pub struct SessionArgs {
    #[command(flatten)]
    pub input: PlanInput,
    /// JSON log file (defaults to scheduler_log.json in the data directory)
    #[arg(long, conflicts_with = "sqlite")]
    pub log: Option<PathBuf>,
    /// Log to a SQLite database instead of a JSON file
    #[arg(long)]
    pub sqlite: Option<PathBuf>,
    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: SessionArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.input.tasks.as_os_str() == "-" {
        return Err("session reads actions from stdin; pass --tasks as a file".into());
    }

    let config = Config::load_or_default();
    let schedule = plan::build(&args.input, &config)?;
    if schedule.is_empty() {
        println!("Nothing fits in the available time.");
        return Ok(());
    }
    plan::print_schedule(&schedule);
    println!();

    let mut sink: Box<dyn LogSink> = match (&args.sqlite, &args.log) {
        (Some(path), _) => Box::new(SqliteLogSink::open(path)?),
        (None, Some(path)) => Box::new(JsonFileLogSink::new(path)),
        (None, None) => Box::new(JsonFileLogSink::new(default_log_path()?)),
    };

    let stdin = std::io::stdin();
    let mut source = TerminalActions::new(stdin.lock());
    let summary = run_session(
        schedule,
        &mut source,
        sink.as_mut(),
        &config.session_config(),
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }
    Ok(())
}

/// Reads actions line by line from a terminal (or any reader).
struct TerminalActions<R> {
    input: R,
}

impl<R: BufRead> TerminalActions<R> {
    fn new(input: R) -> Self {
        Self { input }
    }

    fn ask(&mut self, question: &str) -> Option<String> {
        print!("{question}");
        if let Err(e) = std::io::stdout().flush() {
            tracing::debug!(error = %e, "failed to flush prompt");
        }
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line.trim().to_string()),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read input");
                None
            }
        }
    }
}

impl<R: BufRead> ActionSource for TerminalActions<R> {
    fn next_input(&mut self, prompt: &Prompt) -> Option<String> {
        let choices = if prompt.item.is_break() {
            "[c]omplete [s]kip"
        } else {
            "[c]omplete [s]kip [d]efer [e]xtend"
        };
        let label = match &prompt.item {
            ScheduleItem::Chunk(chunk) if !chunk.subject.is_empty() => {
                format!("{} [{}]", chunk.description, chunk.subject)
            }
            item => item.description().to_string(),
        };
        println!(
            "({}/{}) {} - {} min",
            prompt.position + 1,
            prompt.total,
            label,
            prompt.item.duration()
        );
        self.ask(&format!("{choices} > "))
    }

    fn extend_amount(&mut self, _prompt: &Prompt) -> Option<String> {
        self.ask("extra minutes > ")
    }

    fn rejected(&mut self, _prompt: &Prompt, error: &InvalidAction) {
        println!("  {error}");
    }

    fn log_failed(&mut self, error: &LogSinkError) {
        eprintln!("warning: action applied but not logged: {error}");
    }

    fn applied(&mut self, outcome: &Outcome) {
        if outcome.forced_skip {
            println!("  defer limit reached, skipped");
        } else {
            println!("  {}", outcome.event.action.label());
        }
    }
}

fn print_summary(summary: &SessionSummary) {
    println!();
    if summary.finished {
        println!("Session complete.");
    } else {
        println!("Session ended early.");
    }
    println!(
        "Completed: {} ({} min)  Skipped: {}  Deferred: {}  Extended: {} (+{} min)",
        summary.completed,
        summary.completed_minutes,
        summary.skipped,
        summary.deferred,
        summary.extended,
        summary.extended_minutes
    );
    if summary.log_failures > 0 {
        println!("{} action(s) could not be logged.", summary.log_failures);
    }
}
