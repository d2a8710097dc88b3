//! Study task records handed to the scheduler.
//!
//! Tasks arrive already structured (an external parser turns free text into
//! these records) and already annotated with a priority score and a must-do
//! flag. Cold-start callers may leave both at their defaults.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Category of study work.
///
/// Deserialization accepts free-form labels and normalizes them
/// (`"Video Watching"`, `"hw"`, `"leetcode"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum TaskType {
    Homework,
    Writing,
    ProblemSolving,
    Project,
    Reading,
    VideoWatching,
    Coding,
    Essay,
    Assignment,
    /// Reserved for synthetic rest breaks inserted by the scheduler.
    Break,
}

impl TaskType {
    pub const ALL: [TaskType; 10] = [
        TaskType::Homework,
        TaskType::Writing,
        TaskType::ProblemSolving,
        TaskType::Project,
        TaskType::Reading,
        TaskType::VideoWatching,
        TaskType::Coding,
        TaskType::Essay,
        TaskType::Assignment,
        TaskType::Break,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Homework => "homework",
            Self::Writing => "writing",
            Self::ProblemSolving => "problem_solving",
            Self::Project => "project",
            Self::Reading => "reading",
            Self::VideoWatching => "video_watching",
            Self::Coding => "coding",
            Self::Essay => "essay",
            Self::Assignment => "assignment",
            Self::Break => "break",
        }
    }

    /// Normalize a free-form label into a known category.
    ///
    /// Lowercases, trims, and replaces spaces with underscores before
    /// resolving aliases.
    pub fn normalize(label: &str) -> Option<TaskType> {
        let key = label.trim().to_lowercase().replace(' ', "_");
        let key = match key.as_str() {
            "essay_writing" => "writing",
            "project_work" => "project",
            "video" => "video_watching",
            "hw" => "homework",
            "leetcode" => "problem_solving",
            other => other,
        };
        Self::ALL.iter().copied().find(|t| t.as_str() == key)
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskType::normalize(s).ok_or_else(|| ValidationError::UnknownTaskType(s.to_string()))
    }
}

impl TryFrom<String> for TaskType {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A unit of study work before chunking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Opaque identifier, stable for the task's lifetime.
    #[serde(default, alias = "task_id")]
    pub id: String,
    pub description: String,
    #[serde(default)]
    pub subject: String,
    pub task_type: TaskType,
    /// Total work remaining, in minutes. Must be positive to be scheduled.
    pub estimated_duration_minutes: i32,
    /// Higher schedules earlier.
    #[serde(default)]
    pub priority_score: f64,
    /// Must-do tasks precede all others and are chunked more finely.
    #[serde(default)]
    pub must_do: bool,
}

impl Task {
    pub fn new(
        id: impl Into<String>,
        description: impl Into<String>,
        task_type: TaskType,
        estimated_duration_minutes: i32,
    ) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            subject: String::new(),
            task_type,
            estimated_duration_minutes,
            priority_score: 0.0,
            must_do: false,
        }
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    pub fn with_priority(mut self, priority_score: f64) -> Self {
        self.priority_score = priority_score;
        self
    }

    pub fn with_must_do(mut self, must_do: bool) -> Self {
        self.must_do = must_do;
        self
    }

    /// Check that this task may enter the chunker.
    ///
    /// # Errors
    /// Returns [`ValidationError::InvalidTask`] for a non-positive duration,
    /// the reserved `break` type, or a non-finite priority score.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.estimated_duration_minutes <= 0 {
            return Err(ValidationError::invalid_task(
                &self.id,
                format!(
                    "estimated_duration_minutes must be positive, got {}",
                    self.estimated_duration_minutes
                ),
            ));
        }
        if self.task_type == TaskType::Break {
            return Err(ValidationError::invalid_task(
                &self.id,
                "task_type 'break' is reserved for scheduled rest breaks",
            ));
        }
        if !self.priority_score.is_finite() {
            return Err(ValidationError::invalid_task(
                &self.id,
                "priority_score must be a finite number",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_resolves_aliases() {
        assert_eq!(TaskType::normalize("hw"), Some(TaskType::Homework));
        assert_eq!(TaskType::normalize("Video Watching"), Some(TaskType::VideoWatching));
        assert_eq!(TaskType::normalize("video"), Some(TaskType::VideoWatching));
        assert_eq!(TaskType::normalize(" LeetCode "), Some(TaskType::ProblemSolving));
        assert_eq!(TaskType::normalize("essay_writing"), Some(TaskType::Writing));
        assert_eq!(TaskType::normalize("project work"), Some(TaskType::Project));
        assert_eq!(TaskType::normalize("essay"), Some(TaskType::Essay));
        assert_eq!(TaskType::normalize("knitting"), None);
    }

    #[test]
    fn task_type_serializes_snake_case() {
        let json = serde_json::to_string(&TaskType::ProblemSolving).unwrap();
        assert_eq!(json, "\"problem_solving\"");
    }

    #[test]
    fn task_deserializes_with_defaults_and_alias() {
        let json = r#"{
            "task_id": "abc",
            "description": "Read chapter 3",
            "subject": "Biology",
            "task_type": "Reading",
            "estimated_duration_minutes": 40
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.id, "abc");
        assert_eq!(task.task_type, TaskType::Reading);
        assert_eq!(task.priority_score, 0.0);
        assert!(!task.must_do);
    }

    #[test]
    fn task_rejects_unknown_type() {
        let json = r#"{"description": "x", "task_type": "knitting", "estimated_duration_minutes": 5}"#;
        assert!(serde_json::from_str::<Task>(json).is_err());
    }

    #[test]
    fn validate_rejects_non_positive_duration() {
        let zero = Task::new("a", "Zero", TaskType::Homework, 0);
        let negative = Task::new("b", "Negative", TaskType::Homework, -5);
        assert!(matches!(zero.validate(), Err(ValidationError::InvalidTask { .. })));
        assert!(matches!(negative.validate(), Err(ValidationError::InvalidTask { .. })));
    }

    #[test]
    fn validate_rejects_break_type() {
        let task = Task::new("a", "Nap", TaskType::Break, 10);
        assert!(task.validate().is_err());
    }

    #[test]
    fn validate_rejects_nan_priority() {
        let task = Task::new("a", "Essay", TaskType::Essay, 10).with_priority(f64::NAN);
        assert!(task.validate().is_err());
    }

    #[test]
    fn validate_accepts_well_formed_task() {
        let task = Task::new("a", "Essay", TaskType::Essay, 10)
            .with_subject("English")
            .with_priority(0.7)
            .with_must_do(true);
        assert!(task.validate().is_ok());
    }
}
