//! Task placement into free blocks.
//!
//! This module provides greedy earliest-fit placement:
//! - Tasks are taken in caller order and never re-sorted
//! - Free blocks are consumed chronologically through a capacity ledger
//! - Deadlines and per-assignment ordering limit where a task may go
//! - Tasks that cannot be fitted are reported with a reason, not as errors

mod capacity;

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::interval::TimeInterval;
use crate::timeline::FreeBlock;
use capacity::{CapacityLedger, SlotRequest};

/// A unit of work waiting for a slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulableTask {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Work length in minutes. Must be positive.
    pub estimated_minutes: i64,
    /// Assignment this task belongs to, for ordering within it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignment_id: Option<String>,
    /// Position within the assignment; lower runs no later than higher.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_index: Option<u32>,
    /// Free-form phase label such as "Research". Carried, not interpreted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    /// The task must finish at or before this instant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,
}

impl SchedulableTask {
    pub fn new(id: impl Into<String>, estimated_minutes: i64) -> Self {
        Self {
            id: id.into(),
            title: None,
            estimated_minutes,
            assignment_id: None,
            order_index: None,
            phase: None,
            deadline: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Mark as step `order_index` of `assignment_id`.
    pub fn in_assignment(mut self, assignment_id: impl Into<String>, order_index: u32) -> Self {
        self.assignment_id = Some(assignment_id.into());
        self.order_index = Some(order_index);
        self
    }

    pub fn with_phase(mut self, phase: impl Into<String>) -> Self {
        self.phase = Some(phase.into());
        self
    }

    /// `None` when the minutes do not fit in a time span.
    pub fn estimated_duration(&self) -> Option<Duration> {
        Duration::try_minutes(self.estimated_minutes)
    }
}

/// A task with its assigned time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedTask {
    pub task: SchedulableTask,
    pub scheduled: TimeInterval,
}

impl PlacedTask {
    pub fn scheduled_start(&self) -> DateTime<Utc> {
        self.scheduled.start()
    }

    pub fn scheduled_end(&self) -> DateTime<Utc> {
        self.scheduled.end()
    }
}

/// Why a task could not be placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnplacedReason {
    /// The task has a deadline and no remaining capacity ends by then.
    NoCapacityBeforeDeadline,
    /// No remaining segment anywhere is long enough.
    NoFreeBlockLargeEnough,
}

impl UnplacedReason {
    /// Get human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            UnplacedReason::NoCapacityBeforeDeadline => "not enough free time before the deadline",
            UnplacedReason::NoFreeBlockLargeEnough => "no free block is large enough",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnplacedTask {
    pub task: SchedulableTask,
    pub reason: UnplacedReason,
}

/// Result of one placement run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulingOutcome {
    /// Placed tasks in processing order.
    pub placed: Vec<PlacedTask>,
    pub unplaced: Vec<UnplacedTask>,
}

impl SchedulingOutcome {
    /// True when every task found a slot.
    pub fn is_complete(&self) -> bool {
        self.unplaced.is_empty()
    }

    pub fn placed_minutes(&self) -> i64 {
        self.placed.iter().map(|p| p.task.estimated_minutes).sum()
    }

    pub fn find_placed(&self, task_id: &str) -> Option<&PlacedTask> {
        self.placed.iter().find(|p| p.task.id == task_id)
    }
}

/// Scheduler configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Placement starts are rounded up to a multiple of this many minutes.
    #[serde(default = "default_granularity_minutes")]
    pub granularity_minutes: u32,
}

fn default_granularity_minutes() -> u32 {
    1
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            granularity_minutes: default_granularity_minutes(),
        }
    }
}

/// Greedy earliest-fit scheduler.
#[derive(Debug, Clone, Default)]
pub struct TaskScheduler {
    config: SchedulerConfig,
}

impl TaskScheduler {
    /// Create a new scheduler with default config
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom config
    pub fn with_config(config: SchedulerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Place `tasks`, in the given order, into `free_blocks`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if a task has a non-positive duration,
    /// two free blocks overlap, or the configured granularity is zero.
    /// Tasks that do not fit are reported in the outcome instead.
    pub fn schedule(
        &self,
        tasks: &[SchedulableTask],
        free_blocks: &[FreeBlock],
    ) -> Result<SchedulingOutcome, ValidationError> {
        if self.config.granularity_minutes == 0 {
            return Err(ValidationError::InvalidValue {
                field: "granularity_minutes".into(),
                message: "must be at least 1".into(),
            });
        }
        if let Some(task) = tasks.iter().find(|t| t.estimated_minutes <= 0) {
            return Err(ValidationError::InvalidDuration {
                task_id: task.id.clone(),
                minutes: task.estimated_minutes,
            });
        }
        let blocks = sorted_disjoint(free_blocks)?;

        let mut ledger = CapacityLedger::new(&blocks);
        let mut finished: HashMap<&str, Vec<(u32, DateTime<Utc>)>> = HashMap::new();
        let mut outcome = SchedulingOutcome::default();

        for task in tasks {
            let not_before = predecessors_end(&finished, task);
            let request = task.estimated_duration().map(|length| SlotRequest {
                length,
                not_before,
                deadline: task.deadline,
                granularity_minutes: self.config.granularity_minutes,
            });

            match request.and_then(|request| ledger.find(&request)) {
                Some((idx, slot)) => {
                    ledger.reserve(idx, &slot.span);
                    tracing::debug!(
                        task = %task.id,
                        block = slot.block,
                        "placed task at {}",
                        slot.span
                    );
                    if let (Some(assignment), Some(order)) =
                        (task.assignment_id.as_deref(), task.order_index)
                    {
                        finished
                            .entry(assignment)
                            .or_default()
                            .push((order, slot.span.end()));
                    }
                    outcome.placed.push(PlacedTask {
                        task: task.clone(),
                        scheduled: slot.span,
                    });
                }
                None => {
                    let reason = if task.deadline.is_some() {
                        UnplacedReason::NoCapacityBeforeDeadline
                    } else {
                        UnplacedReason::NoFreeBlockLargeEnough
                    };
                    if let (Some(after), Some(request)) = (not_before, request) {
                        let unordered = SlotRequest {
                            not_before: None,
                            ..request
                        };
                        if ledger.find(&unordered).is_some() {
                            tracing::debug!(
                                task = %task.id,
                                predecessors_end = %after,
                                "task would fit before an earlier step of its assignment ends"
                            );
                        }
                    }
                    tracing::debug!(task = %task.id, ?reason, "task left unplaced");
                    outcome.unplaced.push(UnplacedTask {
                        task: task.clone(),
                        reason,
                    });
                }
            }
        }

        tracing::debug!(
            placed = outcome.placed.len(),
            unplaced = outcome.unplaced.len(),
            remaining_minutes = ledger.remaining_minutes(),
            "scheduling run finished"
        );
        Ok(outcome)
    }
}

/// Convenience function to schedule with default settings
pub fn schedule_tasks(
    tasks: &[SchedulableTask],
    free_blocks: &[FreeBlock],
) -> Result<SchedulingOutcome, ValidationError> {
    TaskScheduler::new().schedule(tasks, free_blocks)
}

/// Latest end among already placed tasks of the same assignment that come
/// earlier in its order.
fn predecessors_end(
    finished: &HashMap<&str, Vec<(u32, DateTime<Utc>)>>,
    task: &SchedulableTask,
) -> Option<DateTime<Utc>> {
    let assignment = task.assignment_id.as_deref()?;
    let order = task.order_index?;
    finished
        .get(assignment)?
        .iter()
        .filter(|(other, _)| *other < order)
        .map(|(_, end)| *end)
        .max()
}

/// Sort blocks by start and reject any that share time.
fn sorted_disjoint(free_blocks: &[FreeBlock]) -> Result<Vec<FreeBlock>, ValidationError> {
    let mut blocks = free_blocks.to_vec();
    blocks.sort_by_key(FreeBlock::start);
    for pair in blocks.windows(2) {
        if pair[0].interval().overlaps(&pair[1].interval()) {
            return Err(ValidationError::OverlappingFreeBlocks {
                first_start: pair[0].start(),
                first_end: pair[0].end(),
                second_start: pair[1].start(),
                second_end: pair[1].end(),
            });
        }
    }
    Ok(blocks)
}
