use std::io::Read;
use std::path::{Path, PathBuf};

use clap::Args;
use studyplan_core::{annotate_tasks, Config, Interleaver, Schedule, ScheduleItem, Task};

/// Inputs shared by `plan` and `session`.
#[derive(Args, Debug, Clone)]
pub struct PlanInput {
    /// JSON file holding an array of tasks ("-" reads stdin)
    #[arg(long)]
    pub tasks: PathBuf,
    /// Available time in minutes
    #[arg(long)]
    pub time: i32,
    /// Phrase marking a task as must-do when found in its description
    #[arg(long = "must-do")]
    pub must_do: Vec<String>,
}

#[derive(Args, Debug)]
pub struct PlanArgs {
    #[command(flatten)]
    pub input: PlanInput,
    /// Print the schedule as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: PlanArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let schedule = build(&args.input, &config)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&schedule)?);
    } else {
        print_schedule(&schedule);
    }
    Ok(())
}

/// Read, annotate and schedule the tasks described by `input`.
pub fn build(input: &PlanInput, config: &Config) -> Result<Schedule, Box<dyn std::error::Error>> {
    let mut tasks = read_tasks(&input.tasks)?;
    annotate_tasks(
        &mut tasks,
        &config.priority_feed(),
        &input.must_do,
        config.priority.must_do_boost,
    );

    let interleaver = Interleaver::with_config(config.scheduler_config());
    let schedule = interleaver.build_schedule(&tasks, input.time)?;
    tracing::info!(
        tasks = tasks.len(),
        items = schedule.len(),
        minutes = schedule.total_duration_min(),
        "schedule built"
    );
    Ok(schedule)
}

fn read_tasks(path: &Path) -> Result<Vec<Task>, Box<dyn std::error::Error>> {
    let raw = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read tasks from {}: {e}", path.display()))?
    };

    let mut tasks: Vec<Task> = serde_json::from_str(&raw)?;
    for task in &mut tasks {
        if task.id.trim().is_empty() {
            task.id = uuid::Uuid::new_v4().to_string();
        }
    }
    Ok(tasks)
}

pub fn print_schedule(schedule: &Schedule) {
    if schedule.is_empty() {
        println!("Nothing fits in the available time.");
        return;
    }

    let mut clock = 0u32;
    for item in schedule.iter() {
        let marker = match item {
            ScheduleItem::Chunk(chunk) if chunk.must_do => "!",
            ScheduleItem::Chunk(_) => " ",
            ScheduleItem::Break(_) => "~",
        };
        println!(
            "{marker} {:>4}  {:>3} min  {}",
            format!("+{clock}"),
            item.duration(),
            item.description()
        );
        clock += item.duration();
    }
    println!(
        "Total: {} min ({} work, {} breaks)",
        schedule.total_duration_min(),
        schedule.work_duration_min(),
        schedule.break_count()
    );
}
