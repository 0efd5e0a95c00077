//! Explicit time ranges in free text.
//!
//! Recognises short phrases such as "from 3 to 4", "9am-11am",
//! "between 15:00 and 17:00" or "at 2pm" and turns them into a
//! [`DayTimeWindow`] that can override the preferred study times.
//!
//! Forms are tried in a fixed order. For each form only its leftmost match
//! is considered; if that match is not a valid forward range the next form
//! is tried.

use serde::{Deserialize, Serialize};

use crate::availability::{DayTimeWindow, MINUTES_PER_DAY};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpressionKind {
    /// `from X to Y`
    FromTo,
    /// `X to Y`
    RangeTo,
    /// `X-Y`, also with en or em dash
    RangeDash,
    /// `between X and Y`
    BetweenAnd,
    /// `at X`, read as one hour
    AtTime,
}

impl ExpressionKind {
    const SEARCH_ORDER: [ExpressionKind; 5] = [
        ExpressionKind::FromTo,
        ExpressionKind::RangeTo,
        ExpressionKind::RangeDash,
        ExpressionKind::BetweenAnd,
        ExpressionKind::AtTime,
    ];

    pub fn confidence(&self) -> Confidence {
        match self {
            ExpressionKind::AtTime => Confidence::Medium,
            _ => Confidence::High,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    High,
    Medium,
}

/// A time range found in text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeExpression {
    pub window: DayTimeWindow,
    pub confidence: Confidence,
    /// Matched slice of the lowercased input.
    pub matched_text: String,
    pub kind: ExpressionKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Meridiem {
    Am,
    Pm,
}

impl Meridiem {
    fn flipped(self) -> Self {
        match self {
            Meridiem::Am => Meridiem::Pm,
            Meridiem::Pm => Meridiem::Am,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Clock {
    hour: u16,
    minute: u16,
    meridiem: Option<Meridiem>,
}

impl Clock {
    fn on_twelve_hour_dial(&self) -> bool {
        (1..=12).contains(&self.hour)
    }

    fn minute_of_day(&self) -> Option<u16> {
        let hour = match (self.meridiem, self.hour) {
            (Some(Meridiem::Pm), h) if h != 12 => h + 12,
            (Some(Meridiem::Am), 12) => 0,
            (_, h) => h,
        };
        (hour < 24 && self.minute < 60).then_some(hour * 60 + self.minute)
    }
}

/// Structural match before range validation.
struct RawMatch {
    start: Clock,
    end: Option<Clock>,
    span: (usize, usize),
}

/// Find the first valid time expression in `text`.
pub fn parse_time_expression(text: &str) -> Option<TimeExpression> {
    let chars: Vec<char> = text.to_lowercase().chars().collect();

    for kind in ExpressionKind::SEARCH_ORDER {
        let Some(raw) = (0..chars.len()).find_map(|pos| match_at(kind, &chars, pos)) else {
            continue;
        };
        let window = match raw.end {
            Some(end) => resolve_range(raw.start, end),
            None => resolve_single(raw.start),
        };
        let Some(window) = window else {
            tracing::trace!(?kind, "time expression rejected, trying next form");
            continue;
        };

        let matched_text: String = chars[raw.span.0..raw.span.1].iter().collect();
        tracing::debug!(?kind, %window, matched = %matched_text, "time expression detected");
        return Some(TimeExpression {
            window,
            confidence: kind.confidence(),
            matched_text,
            kind,
        });
    }
    None
}

fn resolve_range(mut start: Clock, mut end: Clock) -> Option<DayTimeWindow> {
    match (start.meridiem, end.meridiem) {
        (Some(m), None) if end.on_twelve_hour_dial() => {
            let crosses_noon = end.hour % 12 < start.hour % 12;
            end.meridiem = Some(if crosses_noon { m.flipped() } else { m });
        }
        (None, Some(m)) if start.on_twelve_hour_dial() => {
            let crosses_noon = start.hour % 12 > end.hour % 12;
            start.meridiem = Some(if crosses_noon { m.flipped() } else { m });
        }
        _ => {}
    }
    let from = start.minute_of_day()?;
    let to = end.minute_of_day()?;
    DayTimeWindow::from_minutes(from, to).ok()
}

fn resolve_single(start: Clock) -> Option<DayTimeWindow> {
    let from = start.minute_of_day()?;
    DayTimeWindow::from_minutes(from, (from + 60).min(MINUTES_PER_DAY)).ok()
}

fn match_at(kind: ExpressionKind, chars: &[char], pos: usize) -> Option<RawMatch> {
    let (prefix, connector): (Option<&str>, Option<Connector>) = match kind {
        ExpressionKind::FromTo => (Some("from"), Some(Connector::Word("to"))),
        ExpressionKind::RangeTo => (None, Some(Connector::Word("to"))),
        ExpressionKind::RangeDash => (None, Some(Connector::Dash)),
        ExpressionKind::BetweenAnd => (Some("between"), Some(Connector::Word("and"))),
        ExpressionKind::AtTime => (Some("at"), None),
    };

    let mut cursor = pos;
    if let Some(word) = prefix {
        if pos > 0 && chars[pos - 1].is_alphanumeric() {
            return None;
        }
        cursor = literal(chars, cursor, word)?;
        cursor = whitespace1(chars, cursor)?;
    }

    let Some(connector) = connector else {
        let (start, end) = clock_candidates(chars, cursor).into_iter().next()?;
        return Some(RawMatch {
            start,
            end: None,
            span: (pos, end),
        });
    };

    clock_candidates(chars, cursor)
        .into_iter()
        .find_map(|(start, after_start)| {
            let after_connector = connector.skip(chars, after_start)?;
            let (end, after_end) = clock_candidates(chars, after_connector).into_iter().next()?;
            Some(RawMatch {
                start,
                end: Some(end),
                span: (pos, after_end),
            })
        })
}

#[derive(Clone, Copy)]
enum Connector {
    /// Whitespace, the word, whitespace.
    Word(&'static str),
    /// Optional whitespace around a hyphen, en dash or em dash.
    Dash,
}

impl Connector {
    fn skip(self, chars: &[char], pos: usize) -> Option<usize> {
        match self {
            Connector::Word(word) => {
                let pos = whitespace1(chars, pos)?;
                let pos = literal(chars, pos, word)?;
                whitespace1(chars, pos)
            }
            Connector::Dash => {
                let pos = whitespace0(chars, pos);
                match chars.get(pos) {
                    Some('-' | '\u{2013}' | '\u{2014}') => Some(whitespace0(chars, pos + 1)),
                    _ => None,
                }
            }
        }
    }
}

/// Every way a clock can be read at `pos`, longest first.
fn clock_candidates(chars: &[char], pos: usize) -> Vec<(Clock, usize)> {
    let digit = |i: usize| chars.get(i).and_then(|c| c.to_digit(10)).map(|d| d as u16);

    let mut hours = Vec::with_capacity(2);
    if let Some(first) = digit(pos) {
        if let Some(second) = digit(pos + 1) {
            hours.push((first * 10 + second, pos + 2));
        }
        hours.push((first, pos + 1));
    }

    let mut candidates = Vec::new();
    for (hour, after_hour) in hours {
        let mut minutes = Vec::with_capacity(2);
        if chars.get(after_hour) == Some(&':') {
            if let (Some(tens), Some(ones)) = (digit(after_hour + 1), digit(after_hour + 2)) {
                minutes.push((tens * 10 + ones, after_hour + 3));
            }
        }
        minutes.push((0, after_hour));

        for (minute, after_minute) in minutes {
            let marker = whitespace0(chars, after_minute);
            let meridiem = if literal(chars, marker, "am").is_some() {
                Some(Meridiem::Am)
            } else if literal(chars, marker, "pm").is_some() {
                Some(Meridiem::Pm)
            } else {
                None
            };
            if let Some(meridiem) = meridiem {
                candidates.push((
                    Clock {
                        hour,
                        minute,
                        meridiem: Some(meridiem),
                    },
                    marker + 2,
                ));
            }
            candidates.push((
                Clock {
                    hour,
                    minute,
                    meridiem: None,
                },
                after_minute,
            ));
        }
    }
    candidates
}

fn literal(chars: &[char], pos: usize, word: &str) -> Option<usize> {
    let mut cursor = pos;
    for expected in word.chars() {
        if chars.get(cursor) != Some(&expected) {
            return None;
        }
        cursor += 1;
    }
    Some(cursor)
}

fn whitespace0(chars: &[char], pos: usize) -> usize {
    pos + chars[pos.min(chars.len())..]
        .iter()
        .take_while(|c| c.is_whitespace())
        .count()
}

fn whitespace1(chars: &[char], pos: usize) -> Option<usize> {
    let end = whitespace0(chars, pos);
    (end > pos).then_some(end)
}
