//! Interactive session state machine.
//!
//! A session walks a [`Schedule`] one item at a time. The only state is the
//! cursor and the schedule itself, which is reordered by defers and
//! lengthened by extends while the session runs.
//!
//! ## Transitions
//!
//! ```text
//! complete / skip  -> cursor + 1
//! defer            -> item moves to the end, cursor stays
//! extend(n)        -> item duration + n, cursor stays
//! ```
//!
//! Every applied action is logged before its effect is committed. Invalid
//! input is rejected without logging or mutation.
//!
//! ## Usage
//!
//! ```ignore
//! let mut sink = MemoryLogSink::new();
//! let mut source = ScriptedActions::new(["d", "c", "c"]);
//! let summary = run_session(schedule, &mut source, &mut sink, &SessionConfig::default());
//! ```

mod input;

pub use input::{parse_action_token, parse_extend_amount, ActionSource, Prompt, ScriptedActions};

use serde::{Deserialize, Serialize};

use crate::error::{InvalidAction, LogSinkError};
use crate::events::{ActionCode, LogEvent};
use crate::log_sink::LogSink;
use crate::schedule::{Schedule, ScheduleItem};

/// Session behaviour settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// How many times one item may be deferred. A defer beyond this limit
    /// is applied as a skip, so every session terminates.
    #[serde(default = "default_max_defers_per_item")]
    pub max_defers_per_item: u32,
}

fn default_max_defers_per_item() -> u32 {
    3
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_defers_per_item: default_max_defers_per_item(),
        }
    }
}

/// A validated user action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionAction {
    Complete,
    Skip,
    Defer,
    /// Add the given minutes to the current item.
    Extend(u32),
}

impl SessionAction {
    pub fn code(&self) -> ActionCode {
        match self {
            Self::Complete => ActionCode::Complete,
            Self::Skip => ActionCode::Skip,
            Self::Defer => ActionCode::Defer,
            Self::Extend(_) => ActionCode::Extend,
        }
    }
}

/// Result of one applied action.
#[derive(Debug)]
pub struct Outcome {
    /// The event handed to the log sink.
    pub event: LogEvent,
    /// A defer over the per-item limit was turned into a skip.
    pub forced_skip: bool,
    /// Set when the sink refused the event. The action still applied.
    pub log_error: Option<LogSinkError>,
    /// The item after the action (extended duration included).
    pub item: ScheduleItem,
}

/// Tally of a finished (or abandoned) session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub completed: u32,
    pub skipped: u32,
    pub deferred: u32,
    pub extended: u32,
    /// Defers converted into skips (also counted in `skipped`).
    pub forced_skips: u32,
    pub rejected_inputs: u32,
    pub log_failures: u32,
    /// Minutes of completed work, breaks excluded.
    pub completed_minutes: u32,
    pub extended_minutes: u32,
    /// Whether every item was completed or skipped.
    pub finished: bool,
}

impl SessionSummary {
    /// Number of actions applied (and logged or attempted to log).
    pub fn actions_applied(&self) -> u32 {
        self.completed + self.skipped + self.deferred + self.extended
    }
}

#[derive(Debug, Clone)]
struct Entry {
    item: ScheduleItem,
    defers: u32,
}

/// Session state machine over one schedule.
#[derive(Debug, Clone)]
pub struct Session {
    entries: Vec<Entry>,
    cursor: usize,
    config: SessionConfig,
    summary: SessionSummary,
}

impl Session {
    pub fn new(schedule: Schedule, config: SessionConfig) -> Self {
        let entries: Vec<Entry> = schedule
            .into_iter()
            .map(|item| Entry { item, defers: 0 })
            .collect();
        let summary = SessionSummary {
            finished: entries.is_empty(),
            ..SessionSummary::default()
        };
        Self {
            entries,
            cursor: 0,
            config,
            summary,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.entries.len()
    }

    pub fn current(&self) -> Option<&ScheduleItem> {
        self.entries.get(self.cursor).map(|e| &e.item)
    }

    /// Times the current item has been deferred.
    pub fn current_defers(&self) -> u32 {
        self.entries.get(self.cursor).map(|e| e.defers).unwrap_or(0)
    }

    /// Items from the cursor onwards.
    pub fn remaining(&self) -> impl Iterator<Item = &ScheduleItem> {
        self.entries[self.cursor.min(self.entries.len())..]
            .iter()
            .map(|e| &e.item)
    }

    pub fn summary(&self) -> &SessionSummary {
        &self.summary
    }

    pub fn into_summary(self) -> SessionSummary {
        self.summary
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Apply one action to the current item.
    ///
    /// The log event is written before the cursor or schedule changes. A
    /// sink failure is reported in the returned [`Outcome`] and logged as a
    /// warning, but the action still takes effect.
    ///
    /// # Errors
    /// Returns [`InvalidAction`] when there is no current item, the action
    /// is not allowed on it (defer or extend of a break), or an extend would
    /// push its duration past `u32::MAX`. Nothing is logged or changed in
    /// that case.
    pub fn apply(
        &mut self,
        action: SessionAction,
        sink: &mut dyn LogSink,
    ) -> Result<Outcome, InvalidAction> {
        let Some(entry) = self.entries.get(self.cursor) else {
            self.summary.rejected_inputs += 1;
            return Err(InvalidAction::SessionFinished);
        };

        if entry.item.is_break() {
            let refused = match action {
                SessionAction::Defer => Some("deferred"),
                SessionAction::Extend(_) => Some("extended"),
                _ => None,
            };
            if let Some(verb) = refused {
                self.summary.rejected_inputs += 1;
                return Err(InvalidAction::NotAllowedOnBreak(verb));
            }
        }

        if let SessionAction::Extend(extra) = action {
            if entry.item.duration().checked_add(extra).is_none() {
                self.summary.rejected_inputs += 1;
                return Err(InvalidAction::InvalidExtendAmount(extra.to_string()));
            }
        }

        let mut forced_skip = false;
        let action = match action {
            SessionAction::Defer if entry.defers >= self.config.max_defers_per_item => {
                tracing::info!(
                    item = %entry.item.description(),
                    defers = entry.defers,
                    limit = self.config.max_defers_per_item,
                    "defer limit reached, skipping item"
                );
                forced_skip = true;
                SessionAction::Skip
            }
            other => other,
        };

        let extended_by = match action {
            SessionAction::Extend(extra) => Some(extra),
            _ => None,
        };
        let event = LogEvent::for_item(&entry.item, action.code(), extended_by);

        let log_error = match sink.append(&event) {
            Ok(()) => None,
            Err(err) => {
                tracing::warn!(
                    action = event.action.as_str(),
                    item = %event.task_description,
                    error = %err,
                    "failed to record session log event"
                );
                self.summary.log_failures += 1;
                Some(err)
            }
        };

        let item = self.commit(action);
        if forced_skip {
            self.summary.forced_skips += 1;
        }
        if self.is_finished() {
            self.summary.finished = true;
            tracing::info!(
                completed = self.summary.completed,
                skipped = self.summary.skipped,
                "session complete"
            );
        }

        Ok(Outcome {
            event,
            forced_skip,
            log_error,
            item,
        })
    }

    /// Apply the effect of a validated action; returns the affected item.
    fn commit(&mut self, action: SessionAction) -> ScheduleItem {
        let index = self.cursor;
        match action {
            SessionAction::Complete => {
                let item = self.entries[index].item.clone();
                if !item.is_break() {
                    self.summary.completed_minutes =
                        self.summary.completed_minutes.saturating_add(item.duration());
                }
                self.summary.completed += 1;
                self.cursor += 1;
                item
            }
            SessionAction::Skip => {
                self.summary.skipped += 1;
                self.cursor += 1;
                self.entries[index].item.clone()
            }
            SessionAction::Defer => {
                let mut entry = self.entries.remove(index);
                entry.defers += 1;
                let item = entry.item.clone();
                self.entries.push(entry);
                self.summary.deferred += 1;
                item
            }
            SessionAction::Extend(extra) => {
                // Overflowing amounts were rejected in `apply`.
                if let ScheduleItem::Chunk(chunk) = &mut self.entries[index].item {
                    chunk.duration += extra;
                }
                self.summary.extended += 1;
                self.summary.extended_minutes = self.summary.extended_minutes.saturating_add(extra);
                self.entries[index].item.clone()
            }
        }
    }

    fn prompt(&self) -> Option<Prompt> {
        self.current().map(|item| Prompt {
            position: self.cursor,
            total: self.entries.len(),
            item: item.clone(),
        })
    }
}

/// Drive a session to completion.
///
/// Prompts `source` for one action at a time, re-prompting on invalid input,
/// and writes one [`LogEvent`] per applied action to `sink`. Ends when every
/// item has been completed or skipped, or early when `source` runs dry.
pub fn run_session(
    schedule: Schedule,
    source: &mut dyn ActionSource,
    sink: &mut dyn LogSink,
    config: &SessionConfig,
) -> SessionSummary {
    let mut session = Session::new(schedule, *config);

    while let Some(prompt) = session.prompt() {
        let Some(token) = source.next_input(&prompt) else {
            tracing::info!(position = prompt.position, "action source exhausted, ending session");
            break;
        };

        let action = match parse_action_token(&token) {
            Ok(ActionCode::Complete) => SessionAction::Complete,
            Ok(ActionCode::Skip) => SessionAction::Skip,
            Ok(ActionCode::Defer) => SessionAction::Defer,
            Ok(ActionCode::Extend) if prompt.item.is_break() => {
                // Refuse before asking for minutes.
                session.summary.rejected_inputs += 1;
                source.rejected(&prompt, &InvalidAction::NotAllowedOnBreak("extended"));
                continue;
            }
            Ok(ActionCode::Extend) => {
                let Some(raw) = source.extend_amount(&prompt) else {
                    break;
                };
                match parse_extend_amount(&raw) {
                    Ok(extra) => SessionAction::Extend(extra),
                    Err(err) => {
                        session.summary.rejected_inputs += 1;
                        source.rejected(&prompt, &err);
                        continue;
                    }
                }
            }
            Err(err) => {
                session.summary.rejected_inputs += 1;
                source.rejected(&prompt, &err);
                continue;
            }
        };

        match session.apply(action, sink) {
            Ok(outcome) => {
                if let Some(err) = &outcome.log_error {
                    source.log_failed(err);
                }
                source.applied(&outcome);
            }
            Err(err) => source.rejected(&prompt, &err),
        }
    }

    session.into_summary()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log_sink::MemoryLogSink;
    use crate::schedule::{BreakItem, Chunk};
    use crate::task::TaskType;

    fn chunk(id: &str, duration: u32) -> ScheduleItem {
        Chunk {
            task_id: id.to_string(),
            description: format!("{id} (Part 1)"),
            subject: "History".to_string(),
            task_type: TaskType::Reading,
            duration,
            priority_score: 0.0,
            must_do: false,
        }
        .into()
    }

    fn ids(events: &[LogEvent]) -> Vec<(Option<&str>, ActionCode)> {
        events
            .iter()
            .map(|e| (e.task_id.as_deref(), e.action))
            .collect()
    }

    #[test]
    fn complete_and_skip_advance_cursor() {
        let mut session = Session::new(
            Schedule::new(vec![chunk("x", 10), chunk("y", 10)]),
            SessionConfig::default(),
        );
        let mut sink = MemoryLogSink::new();

        session.apply(SessionAction::Complete, &mut sink).unwrap();
        assert_eq!(session.cursor(), 1);
        session.apply(SessionAction::Skip, &mut sink).unwrap();
        assert!(session.is_finished());
        assert!(session.summary().finished);
        assert_eq!(sink.events().len(), 2);
    }

    #[test]
    fn defer_moves_item_to_end_without_advancing() {
        let mut session = Session::new(
            Schedule::new(vec![chunk("x", 10), chunk("y", 10), chunk("z", 10)]),
            SessionConfig::default(),
        );
        let mut sink = MemoryLogSink::new();

        session.apply(SessionAction::Defer, &mut sink).unwrap();
        assert_eq!(session.cursor(), 0);
        let order: Vec<&str> = session.remaining().filter_map(|i| i.task_id()).collect();
        assert_eq!(order, vec!["y", "z", "x"]);
        assert_eq!(session.len(), 3);
    }

    #[test]
    fn extend_logs_pre_extension_duration() {
        let mut session = Session::new(Schedule::new(vec![chunk("x", 10)]), SessionConfig::default());
        let mut sink = MemoryLogSink::new();

        let outcome = session.apply(SessionAction::Extend(5), &mut sink).unwrap();
        assert_eq!(outcome.item.duration(), 15);
        assert_eq!(session.current().unwrap().duration(), 15);
        assert_eq!(session.cursor(), 0);

        let event = &sink.events()[0];
        assert_eq!(event.task_duration, 10);
        assert_eq!(event.extended_by, Some(5));
        assert_eq!(event.action, ActionCode::Extend);
    }

    #[test]
    fn completion_after_extend_logs_extended_duration() {
        let mut session = Session::new(Schedule::new(vec![chunk("x", 10)]), SessionConfig::default());
        let mut sink = MemoryLogSink::new();

        session.apply(SessionAction::Extend(5), &mut sink).unwrap();
        session.apply(SessionAction::Complete, &mut sink).unwrap();
        assert_eq!(sink.events()[1].task_duration, 15);
        assert_eq!(sink.events()[1].extended_by, None);
        assert_eq!(session.summary().completed_minutes, 15);
    }

    #[test]
    fn extend_past_u32_range_is_rejected_without_logging() {
        let mut session = Session::new(Schedule::new(vec![chunk("x", 10)]), SessionConfig::default());
        let mut sink = MemoryLogSink::new();

        assert_eq!(
            session.apply(SessionAction::Extend(u32::MAX), &mut sink).unwrap_err(),
            InvalidAction::InvalidExtendAmount(u32::MAX.to_string())
        );
        assert!(sink.events().is_empty());
        assert_eq!(session.current().unwrap().duration(), 10);
        assert_eq!(session.summary().rejected_inputs, 1);

        // The largest amount that still fits is accepted and logged as given.
        let outcome = session
            .apply(SessionAction::Extend(u32::MAX - 10), &mut sink)
            .unwrap();
        assert_eq!(outcome.item.duration(), u32::MAX);
        assert_eq!(sink.events()[0].extended_by, Some(u32::MAX - 10));
    }

    #[test]
    fn run_session_survives_huge_extends_and_completions() {
        let max = u32::MAX.to_string();
        let mut source = ScriptedActions::new(["e", max.as_str(), "e", max.as_str(), "c", "c"]);
        let mut sink = MemoryLogSink::new();
        let summary = run_session(
            Schedule::new(vec![chunk("x", 10), chunk("y", 10)]),
            &mut source,
            &mut sink,
            &SessionConfig::default(),
        );

        assert!(summary.finished);
        assert_eq!(summary.rejected_inputs, 2);
        assert_eq!(summary.extended, 0);
        assert_eq!(summary.completed_minutes, 20);
        assert_eq!(
            source.rejections()[0],
            InvalidAction::InvalidExtendAmount(max.clone())
        );
    }

    #[test]
    fn summary_minutes_saturate_instead_of_overflowing() {
        let mut session = Session::new(
            Schedule::new(vec![chunk("x", u32::MAX), chunk("y", 10)]),
            SessionConfig::default(),
        );
        let mut sink = MemoryLogSink::new();
        session.apply(SessionAction::Complete, &mut sink).unwrap();
        session.apply(SessionAction::Extend(5), &mut sink).unwrap();
        session.apply(SessionAction::Complete, &mut sink).unwrap();
        assert_eq!(session.summary().completed_minutes, u32::MAX);
        assert!(session.is_finished());
    }

    #[test]
    fn breaks_refuse_defer_and_extend() {
        let mut session = Session::new(
            Schedule::new(vec![BreakItem::new(5).into(), chunk("x", 10)]),
            SessionConfig::default(),
        );
        let mut sink = MemoryLogSink::new();

        assert_eq!(
            session.apply(SessionAction::Defer, &mut sink).unwrap_err(),
            InvalidAction::NotAllowedOnBreak("deferred")
        );
        assert_eq!(
            session.apply(SessionAction::Extend(3), &mut sink).unwrap_err(),
            InvalidAction::NotAllowedOnBreak("extended")
        );
        assert!(sink.events().is_empty());
        assert_eq!(session.cursor(), 0);

        session.apply(SessionAction::Complete, &mut sink).unwrap();
        assert_eq!(sink.events()[0].task_id, None);
        // Break minutes are not counted as completed work.
        assert_eq!(session.summary().completed_minutes, 0);
    }

    #[test]
    fn defer_over_limit_becomes_skip() {
        let config = SessionConfig {
            max_defers_per_item: 1,
        };
        let mut session = Session::new(Schedule::new(vec![chunk("x", 10)]), config);
        let mut sink = MemoryLogSink::new();

        let first = session.apply(SessionAction::Defer, &mut sink).unwrap();
        assert!(!first.forced_skip);
        assert_eq!(session.current_defers(), 1);

        let second = session.apply(SessionAction::Defer, &mut sink).unwrap();
        assert!(second.forced_skip);
        assert_eq!(second.event.action, ActionCode::Skip);
        assert!(session.is_finished());
        assert_eq!(session.summary().forced_skips, 1);
        assert_eq!(session.summary().skipped, 1);
    }

    #[test]
    fn sink_failure_does_not_block_action() {
        let mut session = Session::new(
            Schedule::new(vec![chunk("x", 10), chunk("y", 10)]),
            SessionConfig::default(),
        );
        let mut sink = MemoryLogSink::failing(1);

        let outcome = session.apply(SessionAction::Complete, &mut sink).unwrap();
        assert!(outcome.log_error.is_some());
        assert_eq!(session.cursor(), 1);
        assert_eq!(session.summary().log_failures, 1);
        assert!(sink.events().is_empty());
    }

    #[test]
    fn apply_after_finish_is_rejected() {
        let mut session = Session::new(Schedule::default(), SessionConfig::default());
        let mut sink = MemoryLogSink::new();
        assert!(session.is_finished());
        assert_eq!(
            session.apply(SessionAction::Complete, &mut sink).unwrap_err(),
            InvalidAction::SessionFinished
        );
    }

    #[test]
    fn run_session_defer_then_complete_both() {
        let mut source = ScriptedActions::new(["d", "c", "c"]);
        let mut sink = MemoryLogSink::new();
        let summary = run_session(
            Schedule::new(vec![chunk("x", 10), chunk("y", 10)]),
            &mut source,
            &mut sink,
            &SessionConfig::default(),
        );

        assert_eq!(
            ids(sink.events()),
            vec![
                (Some("x"), ActionCode::Defer),
                (Some("y"), ActionCode::Complete),
                (Some("x"), ActionCode::Complete),
            ]
        );
        assert!(summary.finished);
        assert_eq!(summary.actions_applied(), 3);
        assert_eq!(source.remaining(), 0);
    }

    #[test]
    fn run_session_rejects_invalid_input_without_logging() {
        let mut source = ScriptedActions::new(["x", "e", "-4", "e", "abc", "e", "5", "c"]);
        let mut sink = MemoryLogSink::new();
        let summary = run_session(
            Schedule::new(vec![chunk("x", 10)]),
            &mut source,
            &mut sink,
            &SessionConfig::default(),
        );

        assert_eq!(summary.rejected_inputs, 3);
        assert_eq!(source.rejections().len(), 3);
        assert_eq!(
            ids(sink.events()),
            vec![(Some("x"), ActionCode::Extend), (Some("x"), ActionCode::Complete)]
        );
        assert_eq!(sink.events()[1].task_duration, 15);
    }

    #[test]
    fn run_session_refuses_extend_on_break_without_reading_amount() {
        let mut source = ScriptedActions::new(["e", "s", "c"]);
        let mut sink = MemoryLogSink::new();
        let summary = run_session(
            Schedule::new(vec![BreakItem::new(5).into(), chunk("x", 10)]),
            &mut source,
            &mut sink,
            &SessionConfig::default(),
        );

        assert_eq!(summary.rejected_inputs, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.completed, 1);
        assert!(summary.finished);
    }

    #[test]
    fn run_session_ends_early_when_source_exhausted() {
        let mut source = ScriptedActions::new(["c"]);
        let mut sink = MemoryLogSink::new();
        let summary = run_session(
            Schedule::new(vec![chunk("x", 10), chunk("y", 10)]),
            &mut source,
            &mut sink,
            &SessionConfig::default(),
        );
        assert!(!summary.finished);
        assert_eq!(summary.completed, 1);
    }

    #[test]
    fn run_session_always_defer_terminates() {
        let mut source = ScriptedActions::new(std::iter::repeat("d").take(100));
        let mut sink = MemoryLogSink::new();
        let summary = run_session(
            Schedule::new(vec![chunk("x", 10), chunk("y", 10)]),
            &mut source,
            &mut sink,
            &SessionConfig::default(),
        );

        // Three defers each, then the fourth request skips.
        assert!(summary.finished);
        assert_eq!(summary.deferred, 6);
        assert_eq!(summary.forced_skips, 2);
        assert_eq!(sink.events().len(), 8);
    }
}
