//! Schedule types shared by the scheduler and the session state machine.
//!
//! A [`Schedule`] is a flat, ordered list of work chunks and rest breaks.
//! Order is the contract between the interleaver that produces it and the
//! session that consumes it.

use serde::{Deserialize, Serialize};

use crate::task::TaskType;

/// Description used for every scheduled rest break.
pub const BREAK_DESCRIPTION: &str = "Take a short break";

/// A bounded slice of one task's work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Back-reference to the originating task.
    pub task_id: String,
    /// Task description suffixed with `(Part N)`.
    pub description: String,
    pub subject: String,
    pub task_type: TaskType,
    /// Duration in minutes.
    pub duration: u32,
    pub priority_score: f64,
    pub must_do: bool,
}

/// A synthetic rest break inserted by the scheduler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakItem {
    pub description: String,
    pub task_type: TaskType,
    /// Duration in minutes.
    pub duration: u32,
}

impl BreakItem {
    pub fn new(duration: u32) -> Self {
        Self {
            description: BREAK_DESCRIPTION.to_string(),
            task_type: TaskType::Break,
            duration,
        }
    }
}

/// One entry of a schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScheduleItem {
    Chunk(Chunk),
    Break(BreakItem),
}

impl ScheduleItem {
    pub fn task_id(&self) -> Option<&str> {
        match self {
            Self::Chunk(c) => Some(&c.task_id),
            Self::Break(_) => None,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Self::Chunk(c) => &c.description,
            Self::Break(b) => &b.description,
        }
    }

    pub fn task_type(&self) -> TaskType {
        match self {
            Self::Chunk(c) => c.task_type,
            Self::Break(b) => b.task_type,
        }
    }

    pub fn duration(&self) -> u32 {
        match self {
            Self::Chunk(c) => c.duration,
            Self::Break(b) => b.duration,
        }
    }

    pub fn is_break(&self) -> bool {
        matches!(self, Self::Break(_))
    }

    pub fn as_chunk(&self) -> Option<&Chunk> {
        match self {
            Self::Chunk(c) => Some(c),
            Self::Break(_) => None,
        }
    }
}

impl From<Chunk> for ScheduleItem {
    fn from(chunk: Chunk) -> Self {
        ScheduleItem::Chunk(chunk)
    }
}

impl From<BreakItem> for ScheduleItem {
    fn from(item: BreakItem) -> Self {
        ScheduleItem::Break(item)
    }
}

/// Ordered plan of work chunks and breaks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schedule {
    pub items: Vec<ScheduleItem>,
}

impl Schedule {
    pub fn new(items: Vec<ScheduleItem>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScheduleItem> {
        self.items.iter()
    }

    /// Total scheduled minutes, breaks included.
    pub fn total_duration_min(&self) -> u32 {
        self.items.iter().map(|i| i.duration()).sum()
    }

    /// Minutes of work, breaks excluded.
    pub fn work_duration_min(&self) -> u32 {
        self.items
            .iter()
            .filter(|i| !i.is_break())
            .map(|i| i.duration())
            .sum()
    }

    pub fn break_count(&self) -> usize {
        self.items.iter().filter(|i| i.is_break()).count()
    }

    /// Chunks belonging to `task_id`, in schedule order.
    pub fn chunks_for<'a>(&'a self, task_id: &'a str) -> impl Iterator<Item = &'a Chunk> + 'a {
        self.items
            .iter()
            .filter_map(ScheduleItem::as_chunk)
            .filter(move |c| c.task_id == task_id)
    }
}

impl IntoIterator for Schedule {
    type Item = ScheduleItem;
    type IntoIter = std::vec::IntoIter<ScheduleItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
