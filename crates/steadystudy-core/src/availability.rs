//! Recurring availability: daily time windows, weekday sets, and the
//! constraint handed to the free-time finder.

use chrono::{Duration, NaiveTime, Timelike, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::interval::{BusyInterval, TimeInterval};

/// Minutes in a day. A window may end exactly here (`24:00`).
pub const MINUTES_PER_DAY: u16 = 24 * 60;

/// Default minimum length of a usable free block.
pub const DEFAULT_MIN_DURATION_MINUTES: u32 = 45;

/// A recurring time-of-day window such as 09:00-17:00.
///
/// Stored as minutes after local midnight. `start < end`, and `end` may be
/// `24:00` to reach the following midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawWindow", into = "RawWindow")]
pub struct DayTimeWindow {
    start_minute: u16,
    end_minute: u16,
}

#[derive(Serialize, Deserialize)]
struct RawWindow {
    start: String,
    end: String,
}

impl TryFrom<RawWindow> for DayTimeWindow {
    type Error = ValidationError;

    fn try_from(raw: RawWindow) -> Result<Self, Self::Error> {
        Self::parse(&raw.start, &raw.end)
    }
}

impl From<DayTimeWindow> for RawWindow {
    fn from(window: DayTimeWindow) -> Self {
        Self {
            start: format_minute(window.start_minute),
            end: format_minute(window.end_minute),
        }
    }
}

impl DayTimeWindow {
    /// Create a window from minutes after midnight.
    pub fn from_minutes(start_minute: u16, end_minute: u16) -> Result<Self, ValidationError> {
        if start_minute >= end_minute || end_minute > MINUTES_PER_DAY {
            return Err(ValidationError::InvalidDayWindow {
                start: format_minute(start_minute),
                end: format_minute(end_minute),
            });
        }
        Ok(Self {
            start_minute,
            end_minute,
        })
    }

    /// 00:00-24:00.
    pub const fn whole_day() -> Self {
        Self {
            start_minute: 0,
            end_minute: MINUTES_PER_DAY,
        }
    }

    /// Create a window from two wall-clock times. Cannot express `24:00`;
    /// use [`DayTimeWindow::from_minutes`] or [`DayTimeWindow::parse`] for that.
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self, ValidationError> {
        Self::from_minutes(minute_of(start), minute_of(end))
    }

    /// Parse `"HH:MM"` bounds, e.g. `parse("09:00", "17:00")`.
    pub fn parse(start: &str, end: &str) -> Result<Self, ValidationError> {
        Self::from_minutes(parse_minute(start)?, parse_minute(end)?)
    }

    /// Whole-hour shorthand.
    pub fn hours(start_hour: u16, end_hour: u16) -> Result<Self, ValidationError> {
        Self::from_minutes(start_hour.saturating_mul(60), end_hour.saturating_mul(60))
    }

    pub fn start_minute(&self) -> u16 {
        self.start_minute
    }

    pub fn end_minute(&self) -> u16 {
        self.end_minute
    }

    /// Offset of the window start from local midnight.
    pub fn start_offset(&self) -> Duration {
        Duration::minutes(i64::from(self.start_minute))
    }

    /// Offset of the window end from local midnight.
    pub fn end_offset(&self) -> Duration {
        Duration::minutes(i64::from(self.end_minute))
    }

    pub fn length_minutes(&self) -> u16 {
        self.end_minute - self.start_minute
    }
}

impl std::fmt::Display for DayTimeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}-{}",
            format_minute(self.start_minute),
            format_minute(self.end_minute)
        )
    }
}

fn minute_of(time: NaiveTime) -> u16 {
    // hour() < 24 and minute() < 60, so this always fits
    (time.hour() * 60 + time.minute()) as u16
}

fn format_minute(minute: u16) -> String {
    format!("{:02}:{:02}", minute / 60, minute % 60)
}

/// Parse `"HH:MM"` into minutes after midnight. Accepts `24:00`.
pub fn parse_minute(text: &str) -> Result<u16, ValidationError> {
    let invalid = || ValidationError::InvalidTimeOfDay(text.to_string());
    let (hour, minute) = text.trim().split_once(':').ok_or_else(invalid)?;
    let hour: u16 = hour.parse().map_err(|_| invalid())?;
    let minute: u16 = minute.parse().map_err(|_| invalid())?;
    if minute >= 60 || hour > 24 || (hour == 24 && minute != 0) {
        return Err(invalid());
    }
    Ok(hour * 60 + minute)
}

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// A set of weekdays. An empty set places no restriction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Weekday>", into = "Vec<Weekday>")]
pub struct Weekdays(u8);

impl Weekdays {
    /// No explicit days; every day is allowed.
    pub fn unrestricted() -> Self {
        Self(0)
    }

    /// Monday through Friday.
    pub fn work_week() -> Self {
        [
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
        ]
        .into_iter()
        .collect()
    }

    /// Convert day numbers where 0 is Sunday and 6 is Saturday.
    pub fn from_sunday_numbers(days: &[u8]) -> Result<Self, ValidationError> {
        days.iter()
            .map(|&day| match day {
                0 => Ok(Weekday::Sun),
                1..=6 => Ok(WEEK[usize::from(day) - 1]),
                _ => Err(ValidationError::InvalidValue {
                    field: "days_available".into(),
                    message: format!("day number {day} is outside 0..=6"),
                }),
            })
            .collect()
    }

    pub fn insert(&mut self, day: Weekday) {
        self.0 |= 1 << day.num_days_from_monday();
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.0 & (1 << day.num_days_from_monday()) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// True when scheduling on `day` is permitted.
    pub fn allows(&self, day: Weekday) -> bool {
        self.is_empty() || self.contains(day)
    }

    /// Days in the set, Monday first.
    pub fn iter(&self) -> impl Iterator<Item = Weekday> + '_ {
        WEEK.into_iter().filter(move |day| self.contains(*day))
    }
}

impl FromIterator<Weekday> for Weekdays {
    fn from_iter<I: IntoIterator<Item = Weekday>>(iter: I) -> Self {
        let mut set = Self::unrestricted();
        for day in iter {
            set.insert(day);
        }
        set
    }
}

impl From<Vec<Weekday>> for Weekdays {
    fn from(days: Vec<Weekday>) -> Self {
        days.into_iter().collect()
    }
}

impl From<Weekdays> for Vec<Weekday> {
    fn from(days: Weekdays) -> Self {
        days.iter().collect()
    }
}

fn default_min_duration_minutes() -> u32 {
    DEFAULT_MIN_DURATION_MINUTES
}

fn default_timezone() -> Tz {
    Tz::UTC
}

/// Everything the free-time finder needs for one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityConstraint {
    /// Range to search.
    pub horizon: TimeInterval,
    /// Existing commitments. May overlap, be unsorted or stick out of the horizon.
    #[serde(default)]
    pub busy: Vec<BusyInterval>,
    /// Shortest block worth returning. 0 means no minimum.
    #[serde(default = "default_min_duration_minutes")]
    pub min_duration_minutes: u32,
    /// Preferred daily windows. Empty means the whole day.
    #[serde(default)]
    pub windows: Vec<DayTimeWindow>,
    /// Allowed weekdays. Empty means every day.
    #[serde(default)]
    pub weekdays: Weekdays,
    /// Zone in which windows and weekdays are evaluated.
    #[serde(default = "default_timezone")]
    pub timezone: Tz,
}

impl AvailabilityConstraint {
    /// Constraint over `horizon` with no busy time and default settings.
    pub fn new(horizon: TimeInterval) -> Self {
        Self {
            horizon,
            busy: Vec::new(),
            min_duration_minutes: DEFAULT_MIN_DURATION_MINUTES,
            windows: Vec::new(),
            weekdays: Weekdays::unrestricted(),
            timezone: default_timezone(),
        }
    }

    pub fn with_busy(mut self, busy: impl IntoIterator<Item = BusyInterval>) -> Self {
        self.busy.extend(busy);
        self
    }

    pub fn with_min_duration(mut self, minutes: u32) -> Self {
        self.min_duration_minutes = minutes;
        self
    }

    pub fn with_windows(mut self, windows: impl IntoIterator<Item = DayTimeWindow>) -> Self {
        self.windows = windows.into_iter().collect();
        self
    }

    pub fn with_weekdays(mut self, weekdays: Weekdays) -> Self {
        self.weekdays = weekdays;
        self
    }

    pub fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }

    pub fn min_duration(&self) -> Duration {
        Duration::minutes(i64::from(self.min_duration_minutes))
    }

    /// Whether gaps need to be cut along day boundaries at all.
    pub fn has_day_filter(&self) -> bool {
        !self.windows.is_empty() || !self.weekdays.is_empty()
    }
}
