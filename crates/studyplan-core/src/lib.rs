//! # Studyplan Core Library
//!
//! Turns a list of study tasks into a time-budgeted, interleaved schedule of
//! short work chunks and breaks, then walks that schedule interactively while
//! logging every action. The CLI binary is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Chunker**: splits one task into chunks sized by priority and must-do
//! - **Interleaver**: round-robins chunks across tasks, inserting breaks and
//!   stopping at the time budget
//! - **Session**: a cursor-driven state machine applying complete, skip,
//!   defer and extend actions
//! - **Storage**: TOML configuration plus JSON-file and SQLite log sinks
//!
//! ## Key Components
//!
//! - [`Interleaver`]: schedule builder
//! - [`Session`] and [`run_session`]: interactive walk-through
//! - [`LogEvent`]: the persisted action record
//! - [`Config`]: application configuration management

pub mod chunker;
pub mod error;
pub mod events;
pub mod log_sink;
pub mod priority;
pub mod schedule;
pub mod scheduler;
pub mod session;
pub mod storage;
pub mod task;

pub use chunker::{chunk_task, ChunkingConfig};
pub use error::{
    ConfigError, CoreError, DatabaseError, InvalidAction, LogSinkError, ValidationError,
};
pub use events::{ActionCode, LogEvent};
pub use log_sink::{LogSink, MemoryLogSink};
pub use priority::{annotate_tasks, PriorityFeed, TypePriorityFeed};
pub use schedule::{BreakItem, Chunk, Schedule, ScheduleItem};
pub use scheduler::{build_schedule, Interleaver, SchedulerConfig};
pub use session::{
    run_session, ActionSource, Outcome, Prompt, ScriptedActions, Session, SessionAction,
    SessionConfig, SessionSummary,
};
pub use storage::{Config, JsonFileLogSink, SqliteLogSink, StoredLogEvent};
pub use task::{Task, TaskType};
