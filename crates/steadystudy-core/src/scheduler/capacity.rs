//! Remaining-capacity ledger for a scheduling run.
//!
//! Each free block starts as one segment. Reserving a slot removes exactly
//! that slot and leaves whatever remains on either side as new segments, so
//! reserved minutes can never be handed out twice.

use chrono::{DateTime, Duration, Utc};

use crate::interval::TimeInterval;
use crate::timeline::FreeBlock;

/// A still-unused piece of one original free block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Segment {
    /// Index of the originating block in the chronologically sorted input.
    pub block: usize,
    pub span: TimeInterval,
}

/// Where a request may go.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SlotRequest {
    pub length: Duration,
    pub not_before: Option<DateTime<Utc>>,
    pub deadline: Option<DateTime<Utc>>,
    pub granularity_minutes: u32,
}

#[derive(Debug, Clone)]
pub(crate) struct CapacityLedger {
    segments: Vec<Segment>,
}

impl CapacityLedger {
    /// Blocks must already be sorted and non-overlapping.
    pub fn new(blocks: &[FreeBlock]) -> Self {
        Self {
            segments: blocks
                .iter()
                .enumerate()
                .map(|(block, b)| Segment {
                    block,
                    span: b.interval(),
                })
                .collect(),
        }
    }

    /// Earliest slot satisfying the request, scanning segments in order.
    ///
    /// With a deadline, only segments ending at or before it are eligible.
    /// A slot whose end is not representable never fits.
    pub fn find(&self, request: &SlotRequest) -> Option<(usize, Segment)> {
        self.segments.iter().enumerate().find_map(|(idx, segment)| {
            if request.deadline.is_some_and(|deadline| segment.span.end() > deadline) {
                return None;
            }
            let mut start = segment.span.start();
            if let Some(not_before) = request.not_before {
                start = start.max(not_before);
            }
            let start = align_up(start, request.granularity_minutes);
            let end = start.checked_add_signed(request.length)?;
            if end > segment.span.end() {
                return None;
            }
            TimeInterval::new(start, end).ok().map(|span| {
                (
                    idx,
                    Segment {
                        block: segment.block,
                        span,
                    },
                )
            })
        })
    }

    /// Remove `slot` from the segment at `idx`, keeping the leftovers.
    pub fn reserve(&mut self, idx: usize, slot: &TimeInterval) {
        let segment = self.segments[idx];
        let mut leftovers = Vec::with_capacity(2);
        if let Ok(before) = TimeInterval::new(segment.span.start(), slot.start()) {
            leftovers.push(Segment {
                block: segment.block,
                span: before,
            });
        }
        if let Ok(after) = TimeInterval::new(slot.end(), segment.span.end()) {
            leftovers.push(Segment {
                block: segment.block,
                span: after,
            });
        }
        self.segments.splice(idx..=idx, leftovers);
    }

    pub fn remaining_minutes(&self) -> i64 {
        self.segments
            .iter()
            .map(|s| s.span.duration().num_minutes())
            .sum()
    }

    #[cfg(test)]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }
}

/// Round up to the next multiple of `granularity_minutes` since the epoch.
pub(crate) fn align_up(instant: DateTime<Utc>, granularity_minutes: u32) -> DateTime<Utc> {
    let step = i64::from(granularity_minutes.max(1)) * 60;
    let secs = instant.timestamp();
    let rem = secs.rem_euclid(step);
    if rem == 0 && instant.timestamp_subsec_nanos() == 0 {
        return instant;
    }
    DateTime::from_timestamp(secs - rem + step, 0).unwrap_or(instant)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, h, m, s).unwrap()
    }

    fn request(minutes: i64) -> SlotRequest {
        SlotRequest {
            length: Duration::minutes(minutes),
            not_before: None,
            deadline: None,
            granularity_minutes: 1,
        }
    }

    #[test]
    fn align_up_rounds_to_granularity() {
        assert_eq!(align_up(at(9, 0, 0), 1), at(9, 0, 0));
        assert_eq!(align_up(at(9, 0, 1), 1), at(9, 1, 0));
        assert_eq!(align_up(at(9, 7, 0), 15), at(9, 15, 0));
        assert_eq!(align_up(at(9, 15, 0), 15), at(9, 15, 0));
    }

    #[test]
    fn reserve_splits_segment() {
        let block = FreeBlock::new(at(9, 0, 0), at(11, 0, 0)).unwrap();
        let mut ledger = CapacityLedger::new(&[block]);

        let slot = TimeInterval::new(at(9, 30, 0), at(10, 0, 0)).unwrap();
        ledger.reserve(0, &slot);

        let spans: Vec<_> = ledger.segments().iter().map(|s| s.span).collect();
        assert_eq!(
            spans,
            vec![
                TimeInterval::new(at(9, 0, 0), at(9, 30, 0)).unwrap(),
                TimeInterval::new(at(10, 0, 0), at(11, 0, 0)).unwrap(),
            ]
        );
        assert!(ledger.segments().iter().all(|s| s.block == 0));
        assert_eq!(ledger.remaining_minutes(), 90);
    }

    #[test]
    fn find_respects_deadline_and_not_before() {
        let blocks = [
            FreeBlock::new(at(9, 0, 0), at(9, 45, 0)).unwrap(),
            FreeBlock::new(at(10, 0, 0), at(12, 0, 0)).unwrap(),
        ];
        let ledger = CapacityLedger::new(&blocks);

        let (idx, slot) = ledger.find(&request(60)).unwrap();
        assert_eq!(idx, 1);
        assert_eq!(slot.span.start(), at(10, 0, 0));

        let late = SlotRequest {
            not_before: Some(at(10, 30, 0)),
            ..request(60)
        };
        assert_eq!(ledger.find(&late).unwrap().1.span.start(), at(10, 30, 0));

        let tight = SlotRequest {
            deadline: Some(at(10, 59, 0)),
            ..request(60)
        };
        assert!(ledger.find(&tight).is_none());
    }

    #[test]
    fn deadline_excludes_segments_ending_after_it() {
        let blocks = [
            FreeBlock::new(at(8, 0, 0), at(8, 30, 0)).unwrap(),
            FreeBlock::new(at(9, 0, 0), at(12, 0, 0)).unwrap(),
        ];
        let ledger = CapacityLedger::new(&blocks);

        // 9:00-10:00 would fit before the deadline, but the block runs to noon
        let due_ten = SlotRequest {
            deadline: Some(at(10, 0, 0)),
            ..request(60)
        };
        assert!(ledger.find(&due_ten).is_none());

        let due_noon = SlotRequest {
            deadline: Some(at(12, 0, 0)),
            ..request(60)
        };
        assert_eq!(ledger.find(&due_noon).unwrap().1.span.start(), at(9, 0, 0));
    }

    #[test]
    fn unrepresentable_end_does_not_fit() {
        let end_of_time = DateTime::<Utc>::MAX_UTC;
        let block = FreeBlock::new(end_of_time - Duration::hours(1), end_of_time).unwrap();
        let ledger = CapacityLedger::new(&[block]);

        assert!(ledger.find(&request(1_000_000_000_000)).is_none());
        assert!(ledger.find(&request(30)).is_some());
    }
}
