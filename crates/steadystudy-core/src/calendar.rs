//! Calendar boundary types.
//!
//! Provider events come in as [`CalendarEvent`] and leave as busy intervals.
//! Placed tasks go out as [`EventDraft`]s for the calendar collaborator to
//! create, tagged with the task id so they can be traced back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::interval::{BusyInterval, TimeInterval};
use crate::scheduler::PlacedTask;

/// An existing calendar commitment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl CalendarEvent {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            start_time,
            end_time,
        }
    }

    /// Busy span of this event, if it has positive length.
    pub fn busy_interval(&self) -> Option<BusyInterval> {
        TimeInterval::new(self.start_time, self.end_time).ok()
    }
}

/// Convert provider events to busy intervals, dropping malformed ones.
pub fn busy_from_events(events: &[CalendarEvent]) -> Vec<BusyInterval> {
    events
        .iter()
        .filter_map(|event| {
            let busy = event.busy_interval();
            if busy.is_none() {
                tracing::warn!(
                    event_id = %event.id,
                    start = %event.start_time,
                    end = %event.end_time,
                    "skipping calendar event without positive length"
                );
            }
            busy
        })
        .collect()
}

/// A calendar event to be created for a placed task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDraft {
    pub task_id: String,
    pub title: String,
    pub description: String,
    pub scheduled_start: DateTime<Utc>,
    pub scheduled_end: DateTime<Utc>,
    pub duration_minutes: i64,
}

impl From<&PlacedTask> for EventDraft {
    fn from(placed: &PlacedTask) -> Self {
        let task = &placed.task;
        let title = task.title.clone().unwrap_or_else(|| task.id.clone());
        let description = match (&task.phase, &task.assignment_id) {
            (Some(phase), Some(assignment)) => format!("{phase} phase of {assignment}"),
            (Some(phase), None) => format!("{phase} phase"),
            (None, Some(assignment)) => format!("Part of {assignment}"),
            (None, None) => String::new(),
        };
        Self {
            task_id: task.id.clone(),
            title,
            description,
            scheduled_start: placed.scheduled_start(),
            scheduled_end: placed.scheduled_end(),
            duration_minutes: placed.scheduled.duration_minutes(),
        }
    }
}

/// Drafts for every placed task, in placement order.
pub fn event_drafts(placed: &[PlacedTask]) -> Vec<EventDraft> {
    placed.iter().map(EventDraft::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::SchedulableTask;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, h, m, 0).unwrap()
    }

    #[test]
    fn events_become_busy_intervals() {
        let events = vec![
            CalendarEvent::new("ev-1", "Lecture", at(9, 0), at(10, 30)),
            CalendarEvent::new("ev-2", "Broken", at(12, 0), at(11, 0)),
            CalendarEvent::new("ev-3", "Instant", at(13, 0), at(13, 0)),
            CalendarEvent::new("ev-4", "Lab", at(14, 0), at(16, 0)),
        ];
        let busy = busy_from_events(&events);
        assert_eq!(busy.len(), 2);
        assert_eq!(busy[0].start(), at(9, 0));
        assert_eq!(busy[0].end(), at(10, 30));
        assert_eq!(busy[1].start(), at(14, 0));
    }

    #[test]
    fn event_deserializes_without_title() {
        let event: CalendarEvent = serde_json::from_str(
            r#"{"id":"x","start_time":"2024-01-01T09:00:00Z","end_time":"2024-01-01T10:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(event.title, "");
        assert!(event.busy_interval().is_some());
    }

    #[test]
    fn draft_carries_task_identity() {
        let placed = PlacedTask {
            task: SchedulableTask::new("t-7", 90)
                .with_title("Write first draft")
                .with_phase("Drafting")
                .in_assignment("History essay", 2),
            scheduled: TimeInterval::new(at(13, 0), at(14, 30)).unwrap(),
        };
        let draft = EventDraft::from(&placed);
        assert_eq!(draft.task_id, "t-7");
        assert_eq!(draft.title, "Write first draft");
        assert_eq!(draft.description, "Drafting phase of History essay");
        assert_eq!(draft.scheduled_start, at(13, 0));
        assert_eq!(draft.scheduled_end, at(14, 30));
        assert_eq!(draft.duration_minutes, 90);
    }

    #[test]
    fn untitled_task_uses_id() {
        let placed = PlacedTask {
            task: SchedulableTask::new("t-8", 30),
            scheduled: TimeInterval::new(at(8, 0), at(8, 30)).unwrap(),
        };
        let drafts = event_drafts(&[placed]);
        assert_eq!(drafts[0].title, "t-8");
        assert!(drafts[0].description.is_empty());
    }
}
