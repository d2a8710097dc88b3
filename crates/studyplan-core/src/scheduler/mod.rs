//! Round-robin interleaving scheduler.
//!
//! Builds a time-boxed study plan from a set of tasks:
//! - Orders tasks by must-do flag, then priority score (stable for ties)
//! - Chunks every task into its own FIFO queue
//! - Sweeps the queues in that fixed order, taking one chunk per visit
//! - Inserts a rest break whenever uninterrupted work reaches a threshold
//! - Stops hard as soon as the next chunk would overrun the time budget

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::chunker::{chunk_task, ChunkingConfig};
use crate::error::ValidationError;
use crate::schedule::{BreakItem, Chunk, Schedule, ScheduleItem};
use crate::task::Task;

/// Scheduler configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Chunk sizing bounds
    pub chunking: ChunkingConfig,
    /// Rest break duration (minutes)
    pub break_duration: u32,
    /// Uninterrupted work that triggers a break (minutes)
    pub work_before_break: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            chunking: ChunkingConfig::default(),
            break_duration: 5,
            work_before_break: 25,
        }
    }
}

/// Interleaves chunks from several tasks under a time budget.
#[derive(Debug, Clone, Default)]
pub struct Interleaver {
    config: SchedulerConfig,
}

impl Interleaver {
    /// Create a new scheduler with default config
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom config
    pub fn with_config(config: SchedulerConfig) -> Self {
        Self { config }
    }

    /// Build a schedule for `tasks` within `available_time_minutes`.
    ///
    /// A non-positive budget or an empty task list yields an empty schedule
    /// without chunking anything. Running out of budget is not an error; the
    /// schedule is simply cut short.
    ///
    /// # Errors
    /// Returns [`ValidationError::InvalidTask`] if any task is invalid. All
    /// tasks are validated before any is chunked, so no partial schedule is
    /// ever produced.
    pub fn build_schedule(
        &self,
        tasks: &[Task],
        available_time_minutes: i32,
    ) -> Result<Schedule, ValidationError> {
        if available_time_minutes <= 0 || tasks.is_empty() {
            tracing::debug!(
                available_time_minutes,
                task_count = tasks.len(),
                "nothing to schedule"
            );
            return Ok(Schedule::default());
        }

        for task in tasks {
            task.validate()?;
        }

        let budget = available_time_minutes as u32;
        let mut ordered: Vec<&Task> = tasks.iter().collect();
        sort_by_priority(&mut ordered);

        let mut queues = ordered
            .iter()
            .map(|task| chunk_task(task, &self.config.chunking).map(VecDeque::from))
            .collect::<Result<Vec<VecDeque<Chunk>>, _>>()?;

        let mut items: Vec<ScheduleItem> = Vec::new();
        let mut time_used: u32 = 0;
        let mut work_since_last_break: u32 = 0;

        loop {
            // Active queues are recomputed per sweep; drained queues drop out.
            let active: Vec<usize> = queues
                .iter()
                .enumerate()
                .filter(|(_, q)| !q.is_empty())
                .map(|(i, _)| i)
                .collect();
            if active.is_empty() {
                break;
            }

            for index in active {
                let Some(chunk) = queues[index].pop_front() else {
                    continue;
                };

                let Some(after_chunk) = time_used
                    .checked_add(chunk.duration)
                    .filter(|t| *t <= budget)
                else {
                    tracing::debug!(
                        time_used,
                        budget,
                        next_chunk = %chunk.description,
                        "time budget reached, stopping schedule"
                    );
                    return Ok(Schedule::new(items));
                };

                time_used = after_chunk;
                work_since_last_break = work_since_last_break.saturating_add(chunk.duration);
                items.push(chunk.into());

                if work_since_last_break >= self.config.work_before_break
                    && time_used
                        .checked_add(self.config.break_duration)
                        .is_some_and(|t| t <= budget)
                {
                    items.push(BreakItem::new(self.config.break_duration).into());
                    time_used += self.config.break_duration;
                    work_since_last_break = 0;
                }
            }
        }

        tracing::debug!(
            items = items.len(),
            time_used,
            budget,
            "all task queues drained"
        );
        Ok(Schedule::new(items))
    }
}

/// Build a schedule with the given configuration.
///
/// Convenience wrapper over [`Interleaver::build_schedule`].
pub fn build_schedule(
    tasks: &[Task],
    available_time_minutes: i32,
    config: &SchedulerConfig,
) -> Result<Schedule, ValidationError> {
    Interleaver::with_config(*config).build_schedule(tasks, available_time_minutes)
}

/// Sort tasks must-do first, then by descending priority score.
///
/// The sort is stable: tasks with equal keys keep their input order.
pub fn sort_by_priority<T: Borrow<Task>>(tasks: &mut [T]) {
    tasks.sort_by(|a, b| {
        let a = <T as Borrow<Task>>::borrow(a);
        let b = <T as Borrow<Task>>::borrow(b);
        b.must_do.cmp(&a.must_do).then_with(|| {
            b.priority_score
                .partial_cmp(&a.priority_score)
                .unwrap_or(Ordering::Equal)
        })
    });
}
