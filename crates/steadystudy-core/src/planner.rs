//! Study planner: preferences + calendar snapshot + tasks -> plan.
//!
//! This is the caller-side glue around the finder and the scheduler. It
//! builds the availability constraint from [`StudyPreferences`], applies the
//! deadline buffer and extra-time factor to tasks, puts tasks in scheduling
//! order, and runs both passes.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::availability::{AvailabilityConstraint, DayTimeWindow};
use crate::error::ValidationError;
use crate::interval::{BusyInterval, TimeInterval};
use crate::preferences::StudyPreferences;
use crate::scheduler::{SchedulableTask, SchedulerConfig, SchedulingOutcome, TaskScheduler};
use crate::timeline::{find_free_blocks, FreeBlock};

/// One planning request, typically for a single assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRequest {
    /// Range to plan within.
    pub horizon: TimeInterval,
    /// Calendar snapshot taken just before planning.
    #[serde(default)]
    pub busy: Vec<BusyInterval>,
    pub tasks: Vec<SchedulableTask>,
    /// Subject of the assignment, used for the extra-time lookup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// Explicit time the student asked for; replaces preferred windows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_override: Option<DayTimeWindow>,
}

/// Free blocks considered plus the placement result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyPlan {
    pub free_blocks: Vec<FreeBlock>,
    pub outcome: SchedulingOutcome,
}

pub struct StudyPlanner {
    preferences: StudyPreferences,
    scheduler: TaskScheduler,
}

impl StudyPlanner {
    pub fn new(preferences: StudyPreferences) -> Self {
        Self {
            preferences,
            scheduler: TaskScheduler::new(),
        }
    }

    pub fn with_scheduler_config(mut self, config: SchedulerConfig) -> Self {
        self.scheduler = TaskScheduler::with_config(config);
        self
    }

    pub fn preferences(&self) -> &StudyPreferences {
        &self.preferences
    }

    /// Constraint for `horizon` and `busy` under the stored preferences.
    pub fn availability(
        &self,
        horizon: TimeInterval,
        busy: &[BusyInterval],
        time_override: Option<DayTimeWindow>,
    ) -> AvailabilityConstraint {
        let windows = match time_override {
            Some(window) => vec![window],
            None => self.preferences.effective_windows(),
        };
        AvailabilityConstraint::new(horizon)
            .with_busy(busy.iter().copied())
            .with_min_duration(self.preferences.min_session_minutes)
            .with_windows(windows)
            .with_weekdays(self.preferences.days_available)
            .with_timezone(self.preferences.timezone)
    }

    /// Apply the deadline buffer and extra-time factor, then order tasks.
    pub fn prepare_tasks(
        &self,
        tasks: &[SchedulableTask],
        subject: Option<&str>,
    ) -> Vec<SchedulableTask> {
        let buffer = Duration::days(i64::from(self.preferences.deadline_buffer_days));
        let mut prepared: Vec<SchedulableTask> = tasks
            .iter()
            .map(|task| {
                let mut task = task.clone();
                if task.estimated_minutes > 0 {
                    task.estimated_minutes = self
                        .preferences
                        .adjusted_minutes(subject, task.estimated_minutes);
                }
                task.deadline = task.deadline.map(|deadline| {
                    deadline
                        .checked_sub_signed(buffer)
                        .unwrap_or(DateTime::<Utc>::MIN_UTC)
                });
                task
            })
            .collect();
        sort_for_scheduling(&mut prepared);
        prepared
    }

    /// Find free time and place the request's tasks in it.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if a task has a non-positive duration.
    pub fn plan(&self, request: &PlanRequest) -> Result<StudyPlan, ValidationError> {
        let constraint =
            self.availability(request.horizon, &request.busy, request.time_override);
        let free_blocks = find_free_blocks(&constraint);
        let tasks = self.prepare_tasks(&request.tasks, request.subject.as_deref());
        let outcome = self.scheduler.schedule(&tasks, &free_blocks)?;

        tracing::info!(
            tasks = tasks.len(),
            blocks = free_blocks.len(),
            placed = outcome.placed.len(),
            unplaced = outcome.unplaced.len(),
            "study plan computed"
        );
        Ok(StudyPlan {
            free_blocks,
            outcome,
        })
    }
}

/// Stable sort by order index, then deadline. Missing values sort last.
pub fn sort_for_scheduling(tasks: &mut [SchedulableTask]) {
    tasks.sort_by(|a, b| {
        let order = match (a.order_index, b.order_index) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        };
        order.then_with(|| match (a.deadline, b.deadline) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        })
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::availability::Weekdays;
    use crate::preferences::SubjectStrength;
    use crate::scheduler::UnplacedReason;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(day: u32, h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, h, m, 0).unwrap()
    }

    fn span(start: DateTime<Utc>, end: DateTime<Utc>) -> TimeInterval {
        TimeInterval::new(start, end).unwrap()
    }

    #[test]
    fn sort_orders_by_index_then_deadline() {
        let mut tasks = vec![
            SchedulableTask::new("loose", 30),
            SchedulableTask::new("b1", 30).in_assignment("b", 1).with_deadline(at(5, 0, 0)),
            SchedulableTask::new("a1", 30).in_assignment("a", 1).with_deadline(at(4, 0, 0)),
            SchedulableTask::new("b0", 30).in_assignment("b", 0).with_deadline(at(5, 0, 0)),
            SchedulableTask::new("a0", 30).in_assignment("a", 0).with_deadline(at(4, 0, 0)),
        ];
        sort_for_scheduling(&mut tasks);
        let ids: Vec<_> = tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["a0", "b0", "a1", "b1", "loose"]);
    }

    #[test]
    fn prepare_applies_buffer_and_extra_time() {
        let planner = StudyPlanner::new(StudyPreferences {
            deadline_buffer_days: 2,
            subject_strengths: vec![SubjectStrength {
                subject: "Physics".into(),
                needs_more_time: true,
            }],
            ..Default::default()
        });
        let tasks = [SchedulableTask::new("t", 60).with_deadline(at(10, 12, 0))];

        let prepared = planner.prepare_tasks(&tasks, Some("physics"));
        assert_eq!(prepared[0].estimated_minutes, 75);
        assert_eq!(prepared[0].deadline, Some(at(8, 12, 0)));

        let plain = planner.prepare_tasks(&tasks, None);
        assert_eq!(plain[0].estimated_minutes, 60);
    }

    #[test]
    fn plan_uses_preferred_days_and_windows() {
        let planner = StudyPlanner::new(StudyPreferences {
            days_available: [chrono::Weekday::Tue].into_iter().collect(),
            preferred_study_times: vec![DayTimeWindow::hours(9, 12).unwrap()],
            deadline_buffer_days: 0,
            ..Default::default()
        });
        // Mon 2024-01-01 through Wed 2024-01-03
        let request = PlanRequest {
            horizon: span(at(1, 0, 0), at(4, 0, 0)),
            busy: vec![span(at(2, 9, 0), at(2, 10, 0))],
            tasks: vec![
                SchedulableTask::new("read", 60).in_assignment("essay", 0),
                SchedulableTask::new("draft", 90).in_assignment("essay", 1),
            ],
            subject: None,
            time_override: None,
        };

        let plan = planner.plan(&request).unwrap();
        assert_eq!(plan.free_blocks.len(), 1);
        assert_eq!(plan.free_blocks[0].start(), at(2, 10, 0));
        assert_eq!(plan.free_blocks[0].end(), at(2, 12, 0));

        let read = plan.outcome.find_placed("read").unwrap();
        assert_eq!(read.scheduled_start(), at(2, 10, 0));
        assert_eq!(plan.outcome.unplaced.len(), 1);
        assert_eq!(plan.outcome.unplaced[0].task.id, "draft");
        assert_eq!(
            plan.outcome.unplaced[0].reason,
            UnplacedReason::NoFreeBlockLargeEnough
        );
    }

    #[test]
    fn time_override_replaces_windows() {
        let planner = StudyPlanner::new(StudyPreferences {
            days_available: Weekdays::unrestricted(),
            ..Default::default()
        });
        let request = PlanRequest {
            horizon: span(at(1, 0, 0), at(2, 0, 0)),
            busy: Vec::new(),
            tasks: vec![SchedulableTask::new("call", 60)],
            subject: None,
            time_override: Some(DayTimeWindow::hours(15, 16).unwrap()),
        };

        let plan = planner.plan(&request).unwrap();
        let call = plan.outcome.find_placed("call").unwrap();
        assert_eq!(call.scheduled_start(), at(1, 15, 0));
        assert_eq!(call.scheduled_end(), at(1, 16, 0));
    }

    #[test]
    fn buffered_deadline_can_leave_task_unplaced() {
        let planner = StudyPlanner::new(StudyPreferences {
            days_available: Weekdays::unrestricted(),
            deadline_buffer_days: 1,
            ..Default::default()
        });
        // Due Jan 2 noon; with a one day buffer it must be done by Jan 1 noon,
        // but midday study time starts at noon.
        let request = PlanRequest {
            horizon: span(at(1, 0, 0), at(3, 0, 0)),
            busy: Vec::new(),
            tasks: vec![SchedulableTask::new("quiz", 60).with_deadline(at(2, 12, 0))],
            subject: None,
            time_override: None,
        };

        let plan = planner.plan(&request).unwrap();
        assert_eq!(
            plan.outcome.unplaced[0].reason,
            UnplacedReason::NoCapacityBeforeDeadline
        );
    }

    #[test]
    fn buffer_before_the_earliest_instant_saturates() {
        let planner = StudyPlanner::new(StudyPreferences {
            deadline_buffer_days: 3,
            ..Default::default()
        });
        let task = SchedulableTask::new("old", 30).with_deadline(DateTime::<Utc>::MIN_UTC);
        let prepared = planner.prepare_tasks(&[task], None);
        assert_eq!(prepared[0].deadline, Some(DateTime::<Utc>::MIN_UTC));
    }

    #[test]
    fn invalid_task_fails_the_plan() {
        let planner = StudyPlanner::new(StudyPreferences::default());
        let request = PlanRequest {
            horizon: span(at(1, 0, 0), at(2, 0, 0)),
            busy: Vec::new(),
            tasks: vec![SchedulableTask::new("empty", 0)],
            subject: None,
            time_override: None,
        };
        assert!(matches!(
            planner.plan(&request),
            Err(ValidationError::InvalidDuration { .. })
        ));
    }
}
