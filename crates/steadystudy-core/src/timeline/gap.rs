//! Free time discovery between calendar commitments.
//!
//! Busy intervals are clipped to the horizon, merged, and the holes between
//! them are cut down to the user's preferred daily windows and weekdays.

use chrono::{
    DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone,
    Utc,
};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::availability::{AvailabilityConstraint, DayTimeWindow};
use crate::error::ValidationError;
use crate::interval::{BusyInterval, TimeInterval};

/// A contiguous span eligible for task placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawBlock")]
pub struct FreeBlock {
    #[serde(flatten)]
    interval: TimeInterval,
    duration_minutes: i64,
}

#[derive(Deserialize)]
struct RawBlock {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TryFrom<RawBlock> for FreeBlock {
    type Error = ValidationError;

    fn try_from(raw: RawBlock) -> Result<Self, Self::Error> {
        TimeInterval::new(raw.start, raw.end).map(Self::from)
    }
}

impl From<TimeInterval> for FreeBlock {
    fn from(interval: TimeInterval) -> Self {
        Self {
            interval,
            duration_minutes: interval.duration_minutes(),
        }
    }
}

impl FreeBlock {
    /// Create a block, rejecting `end <= start`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, ValidationError> {
        TimeInterval::new(start, end).map(Self::from)
    }

    pub fn interval(&self) -> TimeInterval {
        self.interval
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.interval.start()
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.interval.end()
    }

    pub fn duration_minutes(&self) -> i64 {
        self.duration_minutes
    }

    /// Check if this block can hold a task of given duration
    pub fn can_fit(&self, minutes: i64) -> bool {
        self.duration_minutes >= minutes
    }
}

/// Compute the free blocks for a constraint, sorted by start time.
///
/// The result is recomputed from scratch on every call, so calling twice
/// with the same constraint yields the same list.
pub fn find_free_blocks(constraint: &AvailabilityConstraint) -> Vec<FreeBlock> {
    let merged = merge_busy(&constraint.horizon, &constraint.busy);
    let gaps = gaps_between(&constraint.horizon, &merged);
    let min_duration = constraint.min_duration();

    let mut blocks: Vec<FreeBlock> = gaps
        .into_iter()
        .flat_map(|gap| restrict_to_windows(gap, constraint))
        .filter(|slice| slice.duration() >= min_duration)
        .map(FreeBlock::from)
        .collect();
    blocks.sort_by_key(FreeBlock::start);

    tracing::debug!(
        busy = constraint.busy.len(),
        merged = merged.len(),
        blocks = blocks.len(),
        "computed free blocks for {}",
        constraint.horizon
    );
    blocks
}

/// Clip to the horizon, sort by start, and fold overlapping or adjacent
/// intervals together.
pub fn merge_busy(horizon: &TimeInterval, busy: &[BusyInterval]) -> Vec<BusyInterval> {
    let mut clipped: Vec<BusyInterval> = busy
        .iter()
        .filter_map(|interval| interval.intersection(horizon))
        .collect();
    // stable: equal starts keep input order
    clipped.sort_by_key(TimeInterval::start);

    let mut merged: Vec<BusyInterval> = Vec::with_capacity(clipped.len());
    for interval in clipped {
        match merged.last_mut() {
            Some(last) if interval.start() <= last.end() => *last = last.hull(&interval),
            _ => merged.push(interval),
        }
    }
    merged
}

/// Holes left in `horizon` by sorted, non-overlapping busy intervals.
fn gaps_between(horizon: &TimeInterval, merged: &[BusyInterval]) -> Vec<TimeInterval> {
    let mut gaps = Vec::with_capacity(merged.len() + 1);
    let mut cursor = horizon.start();

    for busy in merged {
        if cursor < busy.start() {
            if let Ok(gap) = TimeInterval::new(cursor, busy.start()) {
                gaps.push(gap);
            }
        }
        cursor = cursor.max(busy.end());
    }

    if cursor < horizon.end() {
        if let Ok(gap) = TimeInterval::new(cursor, horizon.end()) {
            gaps.push(gap);
        }
    }
    gaps
}

/// Cut a gap down to the allowed days and daily windows.
///
/// Every local day touched by the gap is visited; each allowed day
/// contributes the intersection of the gap with its windows.
fn restrict_to_windows(gap: TimeInterval, constraint: &AvailabilityConstraint) -> Vec<TimeInterval> {
    if !constraint.has_day_filter() {
        return vec![gap];
    }

    let tz = constraint.timezone;
    let whole_day = [DayTimeWindow::whole_day()];
    let windows: &[DayTimeWindow] = if constraint.windows.is_empty() {
        &whole_day
    } else {
        &constraint.windows
    };

    let first_day = gap.start().with_timezone(&tz).date_naive();
    let last_day = gap.end().with_timezone(&tz).date_naive();

    let mut slices = Vec::new();
    let mut day = first_day;
    while day <= last_day {
        if constraint.weekdays.allows(day.weekday()) {
            slices.extend(day_slices(gap, tz, day, windows));
        }
        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }
    slices
}

/// Intersections of `gap` with the windows of one local day.
///
/// Overlapping windows must not produce duplicate minutes, so slices are
/// merged, but only within the day. Slices of different days stay apart.
fn day_slices(
    gap: TimeInterval,
    tz: Tz,
    day: NaiveDate,
    windows: &[DayTimeWindow],
) -> Vec<TimeInterval> {
    let mut slices: Vec<TimeInterval> = windows
        .iter()
        .filter_map(|window| {
            let start = local_instant(tz, day, window.start_offset())?;
            let end = local_instant(tz, day, window.end_offset())?;
            let span = TimeInterval::new(start, end).ok()?;
            gap.intersection(&span)
        })
        .collect();
    slices.sort_by_key(TimeInterval::start);

    let mut merged: Vec<TimeInterval> = Vec::with_capacity(slices.len());
    for slice in slices {
        match merged.last_mut() {
            Some(last) if slice.touches(last) => *last = last.hull(&slice),
            _ => merged.push(slice),
        }
    }
    merged
}

/// UTC instant of `offset` after local midnight of `day`. `None` near the
/// limits of the representable range.
fn local_instant(tz: Tz, day: NaiveDate, offset: Duration) -> Option<DateTime<Utc>> {
    let local = day.and_time(NaiveTime::default()).checked_add_signed(offset)?;
    resolve_local(tz, local)
}

/// Map a local wall-clock time to UTC.
///
/// Ambiguous times (clocks falling back) take the earlier instant. Times
/// skipped by a forward jump are read with the offset in force before the
/// jump, which lands them just after the gap.
fn resolve_local(tz: Tz, local: NaiveDateTime) -> Option<DateTime<Utc>> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(instant) => Some(instant.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
        LocalResult::None => {
            let day_before = local.checked_sub_signed(Duration::days(1))?;
            let before = tz.offset_from_utc_datetime(&day_before).fix();
            let utc = local
                .checked_sub_signed(Duration::seconds(i64::from(before.local_minus_utc())))?;
            Some(Utc.from_utc_datetime(&utc))
        }
    }
}
