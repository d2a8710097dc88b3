//! Priority annotation.
//!
//! Priority scores come from outside the scheduling core (a learned model, a
//! config table, a test fixture). The scheduler only reads the
//! `priority_score` and `must_do` fields; this module fills them in.

use std::collections::{BTreeMap, HashMap};

use crate::task::{Task, TaskType};

/// Source of priority scores.
pub trait PriorityFeed {
    /// Score for `task`, or `None` to keep the task's current score.
    fn score(&self, task: &Task) -> Option<f64>;
}

impl<F> PriorityFeed for F
where
    F: Fn(&Task) -> Option<f64>,
{
    fn score(&self, task: &Task) -> Option<f64> {
        self(task)
    }
}

/// Fixed score per task type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypePriorityFeed {
    scores: HashMap<TaskType, f64>,
}

impl TypePriorityFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_score(mut self, task_type: TaskType, score: f64) -> Self {
        self.scores.insert(task_type, score);
        self
    }

    /// Build from free-form labels. Unknown labels are skipped with a warning.
    pub fn from_labels(labels: &BTreeMap<String, f64>) -> Self {
        let mut feed = Self::new();
        for (label, score) in labels {
            match TaskType::normalize(label) {
                Some(task_type) => {
                    feed.scores.insert(task_type, *score);
                }
                None => tracing::warn!(label = %label, "ignoring score for unknown task type"),
            }
        }
        feed
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

impl PriorityFeed for TypePriorityFeed {
    fn score(&self, task: &Task) -> Option<f64> {
        self.scores.get(&task.task_type).copied()
    }
}

/// True if any non-blank phrase occurs in the description, ignoring case.
pub fn matches_must_do(description: &str, phrases: &[String]) -> bool {
    let description = description.to_lowercase();
    phrases
        .iter()
        .map(|p| p.trim().to_lowercase())
        .filter(|p| !p.is_empty())
        .any(|p| description.contains(&p))
}

/// Fill in `priority_score` and `must_do` for every task.
///
/// - `must_do` is set when the task was already flagged or its description
///   matches one of `must_do_phrases`.
/// - `priority_score` comes from `feed`, falling back to the existing value.
/// - Must-do tasks get `must_do_boost` added to their score.
pub fn annotate_tasks(
    tasks: &mut [Task],
    feed: &dyn PriorityFeed,
    must_do_phrases: &[String],
    must_do_boost: f64,
) {
    for task in tasks.iter_mut() {
        task.must_do = task.must_do || matches_must_do(&task.description, must_do_phrases);
        if let Some(score) = feed.score(task) {
            task.priority_score = score;
        }
        if task.must_do {
            task.priority_score += must_do_boost;
        }
    }
    tracing::debug!(tasks = tasks.len(), "annotated task priorities");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phrases(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn must_do_matching_ignores_case_and_blank_phrases() {
        let p = phrases(&["  ", "Calculus"]);
        assert!(matches_must_do("finish calculus worksheet", &p));
        assert!(!matches_must_do("read history chapter", &p));
        assert!(!matches_must_do("anything", &phrases(&[""])));
    }

    #[test]
    fn type_feed_scores_by_task_type() {
        let feed = TypePriorityFeed::new().with_score(TaskType::Reading, 0.8);
        let reading = Task::new("a", "Read", TaskType::Reading, 20);
        let essay = Task::new("b", "Essay", TaskType::Essay, 20);
        assert_eq!(feed.score(&reading), Some(0.8));
        assert_eq!(feed.score(&essay), None);
    }

    #[test]
    fn from_labels_normalizes_and_skips_unknown() {
        let mut labels = BTreeMap::new();
        labels.insert("Video Watching".to_string(), 0.4);
        labels.insert("knitting".to_string(), 0.9);
        let feed = TypePriorityFeed::from_labels(&labels);
        assert_eq!(feed.len(), 1);
        let task = Task::new("a", "Lecture", TaskType::VideoWatching, 30);
        assert_eq!(feed.score(&task), Some(0.4));
    }

    #[test]
    fn annotate_applies_feed_phrases_and_boost() {
        let mut tasks = vec![
            Task::new("a", "Calculus problem set", TaskType::Homework, 40),
            Task::new("b", "Read novel", TaskType::Reading, 30).with_priority(0.3),
            Task::new("c", "Lab report", TaskType::Writing, 30).with_must_do(true),
        ];
        let feed = TypePriorityFeed::new().with_score(TaskType::Homework, 0.6);
        annotate_tasks(&mut tasks, &feed, &phrases(&["calculus"]), 0.5);

        assert!(tasks[0].must_do);
        assert!((tasks[0].priority_score - 1.1).abs() < 1e-9);
        assert!(!tasks[1].must_do);
        assert_eq!(tasks[1].priority_score, 0.3);
        assert!(tasks[2].must_do);
        assert_eq!(tasks[2].priority_score, 0.5);
    }

    #[test]
    fn closures_act_as_feeds() {
        let feed = |task: &Task| (task.estimated_duration_minutes > 30).then_some(1.0);
        let mut tasks = vec![
            Task::new("a", "Long", TaskType::Project, 90),
            Task::new("b", "Short", TaskType::Project, 15),
        ];
        annotate_tasks(&mut tasks, &feed, &[], 0.5);
        assert_eq!(tasks[0].priority_score, 1.0);
        assert_eq!(tasks[1].priority_score, 0.0);
    }
}
