//! Task chunking.
//!
//! Splits one task into an ordered run of bounded work chunks. Chunk length
//! grows with the task's priority score (high-priority work gets longer,
//! less interrupted stretches) and is capped more tightly for must-do tasks
//! so they resurface more often in an interleaved schedule.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::schedule::Chunk;
use crate::task::Task;

/// Chunk sizing bounds, in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Ceiling for any chunk.
    #[serde(default = "default_max_chunk_length")]
    pub max_chunk_length: u32,
    /// Floor for the computed chunk length. The last chunk of a task may
    /// still be shorter.
    #[serde(default = "default_min_chunk_length")]
    pub min_chunk_length: u32,
    /// Stricter ceiling applied to must-do tasks.
    #[serde(default = "default_must_do_max_chunk_length")]
    pub must_do_max_chunk_length: u32,
}

fn default_max_chunk_length() -> u32 {
    25
}
fn default_min_chunk_length() -> u32 {
    10
}
fn default_must_do_max_chunk_length() -> u32 {
    15
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chunk_length: default_max_chunk_length(),
            min_chunk_length: default_min_chunk_length(),
            must_do_max_chunk_length: default_must_do_max_chunk_length(),
        }
    }
}

impl ChunkingConfig {
    /// Nominal chunk length for a task with the given priority and must-do flag.
    ///
    /// `trunc(priority * max)` clamped to `[min, max]`, then capped at the
    /// must-do ceiling when `must_do` is set. Never returns zero.
    pub fn chunk_length(&self, priority_score: f64, must_do: bool) -> u32 {
        let max = self.max_chunk_length.max(1);
        let floor = self.min_chunk_length.min(max);

        let scaled = (priority_score * f64::from(max)).trunc();
        let mut length = if scaled.is_nan() || scaled <= f64::from(floor) {
            floor
        } else if scaled >= f64::from(max) {
            max
        } else {
            scaled as u32
        };

        if must_do {
            length = length.min(self.must_do_max_chunk_length);
        }
        length.max(1)
    }
}

/// Split a task into chunks whose durations sum to its estimate.
///
/// Chunk descriptions carry a 1-based `(Part N)` suffix that restarts for
/// every task.
///
/// # Errors
/// Returns [`ValidationError::InvalidTask`] if the task fails
/// [`Task::validate`]; nothing is chunked in that case.
pub fn chunk_task(task: &Task, config: &ChunkingConfig) -> Result<Vec<Chunk>, ValidationError> {
    task.validate()?;

    let chunk_length = config.chunk_length(task.priority_score, task.must_do);
    let mut remaining = task.estimated_duration_minutes as u32;
    let mut chunks = Vec::with_capacity(remaining.div_ceil(chunk_length) as usize);
    let mut part = 1;

    while remaining > 0 {
        let duration = chunk_length.min(remaining);
        chunks.push(Chunk {
            task_id: task.id.clone(),
            description: format!("{} (Part {})", task.description, part),
            subject: task.subject.clone(),
            task_type: task.task_type,
            duration,
            priority_score: task.priority_score,
            must_do: task.must_do,
        });
        remaining -= duration;
        part += 1;
    }

    Ok(chunks)
}
