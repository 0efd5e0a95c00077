//! # SteadyStudy Core Library
//!
//! This library finds free time in a student's calendar and places study
//! tasks into it. All operations are also available through the standalone
//! `steadystudy` CLI binary.
//!
//! ## Architecture
//!
//! - **Availability**: half-open intervals, daily windows, weekday sets and
//!   the constraint that bundles them for one search
//! - **Timeline**: free-block discovery (busy merge, gap walk, window and
//!   weekday slicing in the user's timezone)
//! - **Scheduler**: greedy earliest-fit placement with deadlines and
//!   per-assignment ordering
//! - **Planner**: preferences, task preparation and both passes in one call
//! - **Storage**: TOML-based configuration
//!
//! ## Key Components
//!
//! - [`find_free_blocks`]: Free-block finder
//! - [`TaskScheduler`]: Task placement
//! - [`StudyPlanner`]: Preference-aware planning facade
//! - [`Config`]: Application configuration management

pub mod availability;
pub mod breakdown;
pub mod calendar;
pub mod error;
pub mod interval;
pub mod planner;
pub mod preferences;
pub mod scheduler;
pub mod storage;
pub mod time_expr;
pub mod timeline;

pub use availability::{AvailabilityConstraint, DayTimeWindow, Weekdays};
pub use breakdown::{break_down, Assignment, Breakdown, Difficulty, Subtask};
pub use calendar::{busy_from_events, event_drafts, CalendarEvent, EventDraft};
pub use error::{ConfigError, CoreError, ValidationError};
pub use interval::{BusyInterval, TimeInterval};
pub use planner::{PlanRequest, StudyPlan, StudyPlanner};
pub use preferences::{ProductivityPattern, StudyPreferences, SubjectStrength};
pub use scheduler::{
    schedule_tasks, PlacedTask, SchedulableTask, SchedulerConfig, SchedulingOutcome,
    TaskScheduler, UnplacedReason, UnplacedTask,
};
pub use storage::Config;
pub use time_expr::{parse_time_expression, TimeExpression};
pub use timeline::{find_free_blocks, FreeBlock};
