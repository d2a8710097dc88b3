//! Session log records.
//!
//! [`LogEvent`] is the one record persisted per applied session action. Its
//! field names and the single-letter [`ActionCode`] values are the wire
//! format read by log consumers.

use serde::{Deserialize, Serialize};

use crate::schedule::ScheduleItem;

/// Action applied to the current session item.
///
/// Serialized as the single-letter codes `c`, `s`, `d`, `e` used by the
/// log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionCode {
    #[serde(rename = "c")]
    Complete,
    #[serde(rename = "s")]
    Skip,
    #[serde(rename = "d")]
    Defer,
    #[serde(rename = "e")]
    Extend,
}

impl ActionCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Complete => "c",
            Self::Skip => "s",
            Self::Defer => "d",
            Self::Extend => "e",
        }
    }

    /// Past-tense label for user-facing messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Complete => "completed",
            Self::Skip => "skipped",
            Self::Defer => "deferred",
            Self::Extend => "extended",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "c" => Some(Self::Complete),
            "s" => Some(Self::Skip),
            "d" => Some(Self::Defer),
            "e" => Some(Self::Extend),
            _ => None,
        }
    }
}

/// Immutable record of one session action.
///
/// Field names and action codes are the wire format shared with log
/// consumers. `task_duration` is the item's duration before the action was
/// applied, so an extend records the pre-extension value alongside
/// `extended_by`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEvent {
    pub task_id: Option<String>,
    pub task_description: String,
    pub task_duration: u32,
    pub action: ActionCode,
    pub extended_by: Option<u32>,
}

impl LogEvent {
    /// Record `action` against `item` as it was before the action applied.
    pub fn for_item(item: &ScheduleItem, action: ActionCode, extended_by: Option<u32>) -> Self {
        Self {
            task_id: item.task_id().map(str::to_string),
            task_description: item.description().to_string(),
            task_duration: item.duration(),
            action,
            extended_by,
        }
    }
}
