//! Study preferences supplied by the user.
//!
//! These feed the availability constraint (days, windows, minimum session
//! length, timezone) and task preparation (deadline buffer, extra time for
//! subjects the student finds hard).

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::availability::{DayTimeWindow, Weekdays};
use crate::error::ValidationError;

/// Part of the day the student works best in. Used when no explicit study
/// times are configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductivityPattern {
    /// 08:00-12:00
    Morning,
    /// 12:00-17:00
    #[default]
    Midday,
    /// 17:00-21:00
    Evening,
}

impl ProductivityPattern {
    pub fn window(&self) -> DayTimeWindow {
        let (start, end) = match self {
            ProductivityPattern::Morning => (8 * 60, 12 * 60),
            ProductivityPattern::Midday => (12 * 60, 17 * 60),
            ProductivityPattern::Evening => (17 * 60, 21 * 60),
        };
        DayTimeWindow::from_minutes(start, end).unwrap_or_else(|_| DayTimeWindow::whole_day())
    }
}

/// How the student rates themselves in a subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectStrength {
    pub subject: String,
    #[serde(default)]
    pub needs_more_time: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyPreferences {
    #[serde(default = "Weekdays::work_week")]
    pub days_available: Weekdays,
    /// Explicit daily windows. Empty falls back to the productivity pattern.
    #[serde(default)]
    pub preferred_study_times: Vec<DayTimeWindow>,
    #[serde(default)]
    pub productivity_pattern: ProductivityPattern,
    /// Whole days to finish ahead of each deadline.
    #[serde(default = "default_deadline_buffer_days")]
    pub deadline_buffer_days: u32,
    /// Shortest free block worth studying in.
    #[serde(default = "default_min_session_minutes")]
    pub min_session_minutes: u32,
    #[serde(default)]
    pub subject_strengths: Vec<SubjectStrength>,
    /// Duration multiplier for subjects flagged `needs_more_time`.
    #[serde(default = "default_extra_time_factor")]
    pub extra_time_factor: f64,
    #[serde(default = "default_timezone")]
    pub timezone: Tz,
}

fn default_deadline_buffer_days() -> u32 {
    2
}
fn default_min_session_minutes() -> u32 {
    45
}
/// Upper bound for `extra_time_factor`.
pub const MAX_EXTRA_TIME_FACTOR: f64 = 10.0;

fn default_extra_time_factor() -> f64 {
    1.25
}
fn default_timezone() -> Tz {
    Tz::UTC
}

impl Default for StudyPreferences {
    fn default() -> Self {
        Self {
            days_available: Weekdays::work_week(),
            preferred_study_times: Vec::new(),
            productivity_pattern: ProductivityPattern::default(),
            deadline_buffer_days: default_deadline_buffer_days(),
            min_session_minutes: default_min_session_minutes(),
            subject_strengths: Vec::new(),
            extra_time_factor: default_extra_time_factor(),
            timezone: default_timezone(),
        }
    }
}

impl StudyPreferences {
    /// Windows the finder should use.
    pub fn effective_windows(&self) -> Vec<DayTimeWindow> {
        if self.preferred_study_times.is_empty() {
            vec![self.productivity_pattern.window()]
        } else {
            self.preferred_study_times.clone()
        }
    }

    /// Case-insensitive lookup of the subject's `needs_more_time` flag.
    pub fn needs_more_time(&self, subject: &str) -> bool {
        self.subject_strengths
            .iter()
            .find(|s| s.subject.eq_ignore_ascii_case(subject.trim()))
            .is_some_and(|s| s.needs_more_time)
    }

    /// Scale a duration for a subject, rounding down. Never below one minute.
    /// Results past `i64::MAX` saturate.
    pub fn adjusted_minutes(&self, subject: Option<&str>, minutes: i64) -> i64 {
        match subject {
            Some(subject) if self.needs_more_time(subject) => {
                ((minutes as f64 * self.extra_time_factor) as i64).max(1)
            }
            _ => minutes,
        }
    }

    /// Check values serde cannot rule out on its own.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(1.0..=MAX_EXTRA_TIME_FACTOR).contains(&self.extra_time_factor) {
            return Err(ValidationError::InvalidValue {
                field: "extra_time_factor".into(),
                message: format!(
                    "{} must be between 1.0 and {MAX_EXTRA_TIME_FACTOR}",
                    self.extra_time_factor
                ),
            });
        }
        if self.min_session_minutes > u32::from(crate::availability::MINUTES_PER_DAY) {
            return Err(ValidationError::InvalidValue {
                field: "min_session_minutes".into(),
                message: format!("{} is longer than a day", self.min_session_minutes),
            });
        }
        Ok(())
    }
}
