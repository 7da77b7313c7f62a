//! Recurrence expansion.
//!
//! Turns parsed events into the concrete occurrences that overlap a time
//! window. RRULEs are evaluated with the `rrule` crate in a UTC frame so that
//! wall-clock values come back unchanged.

use super::parse::{CalendarEvent, parse_ical_datetime};
use crate::config::{CALENDAR_WINDOW_DAYS_AFTER, CALENDAR_WINDOW_DAYS_BEFORE, MAX_RECURRENCES_PER_EVENT};
use chrono::{NaiveDateTime, TimeDelta, TimeZone};
use rrule::{RRuleSet, Tz};
use std::collections::{HashMap, HashSet};

/// Half-open span `[start, end)` of wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl EventWindow {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    /// One day before `now` through a year after it.
    pub fn around(now: NaiveDateTime) -> Self {
        Self {
            start: now - TimeDelta::days(CALENDAR_WINDOW_DAYS_BEFORE),
            end: now + TimeDelta::days(CALENDAR_WINDOW_DAYS_AFTER),
        }
    }

    pub fn from_now() -> Self {
        Self::around(chrono::Local::now().naive_local())
    }

    /// Zero-length occurrences count when they start inside the window.
    pub fn overlaps(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        if start == end {
            return start >= self.start && start < self.end;
        }
        start < self.end && end > self.start
    }
}

/// A single row of the spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    pub summary: Option<String>,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub description: Option<String>,
    pub location: Option<String>,
}

impl EventRecord {
    fn occurrence_of(event: &CalendarEvent, start: NaiveDateTime) -> Self {
        Self {
            summary: event.summary.clone(),
            start,
            end: start + event.duration(),
            description: event.description.clone(),
            location: event.location.clone(),
        }
    }
}

/// Expands every event into the occurrences that overlap `window`, sorted by start.
///
/// EXDATE entries are removed, and an instance carrying a RECURRENCE-ID
/// replaces the matching occurrence of the series with the same UID.
pub fn expand_events(events: &[CalendarEvent], window: &EventWindow) -> Vec<EventRecord> {
    let mut overridden: HashMap<&str, HashSet<NaiveDateTime>> = HashMap::new();
    for event in events {
        if let (Some(uid), Some(recurrence_id)) = (event.uid.as_deref(), event.recurrence_id) {
            overridden.entry(uid).or_default().insert(recurrence_id);
        }
    }

    let mut records = Vec::new();
    for event in events {
        let skipped = event
            .uid
            .as_deref()
            .filter(|_| event.recurrence_id.is_none())
            .and_then(|uid| overridden.get(uid));

        for start in occurrence_starts(event, window) {
            if event.exdates.contains(&start) || skipped.is_some_and(|s| s.contains(&start)) {
                continue;
            }
            let record = EventRecord::occurrence_of(event, start);
            if window.overlaps(record.start, record.end) {
                records.push(record);
            }
        }
    }

    records.sort_by_key(|r| r.start);
    records
}

fn occurrence_starts(event: &CalendarEvent, window: &EventWindow) -> Vec<NaiveDateTime> {
    let Some(rule) = event.rrule.as_deref() else {
        return vec![event.start];
    };

    let source = format!(
        "DTSTART:{}Z\nRRULE:{}",
        event.start.format("%Y%m%dT%H%M%S"),
        normalize_rrule(rule, event.tzid.as_deref())
    );
    let set = match source.parse::<RRuleSet>() {
        Ok(set) => set,
        Err(e) => {
            log::warn!(
                "Could not expand recurrence '{rule}' of '{}': {e}; using the first occurrence only",
                event.summary.as_deref().unwrap_or("(untitled)")
            );
            return vec![event.start];
        }
    };

    let lookback = window.start - event.duration() - TimeDelta::seconds(1);
    let result = set
        .after(Tz::UTC.from_utc_datetime(&lookback))
        .before(Tz::UTC.from_utc_datetime(&window.end))
        .all(MAX_RECURRENCES_PER_EVENT);
    if result.limited {
        log::debug!(
            "Recurrence of '{}' truncated at {MAX_RECURRENCES_PER_EVENT} occurrences",
            event.summary.as_deref().unwrap_or("(untitled)")
        );
    }

    result.dates.iter().map(|dt| dt.naive_utc()).collect()
}

/// Puts UNTIL into the same UTC frame as the generated DTSTART.
///
/// A UTC UNTIL on a zoned series is shifted to that zone's wall-clock time,
/// since DTSTART is evaluated as if its wall-clock value were UTC.
fn normalize_rrule(rule: &str, tzid: Option<&str>) -> String {
    rule.trim()
        .split(';')
        .map(|part| match part.split_once('=') {
            Some((key, value)) if key.eq_ignore_ascii_case("UNTIL") => {
                if value.len() == 8 {
                    format!("UNTIL={value}T235959Z")
                } else if value.ends_with(['Z', 'z']) {
                    format!("UNTIL={}", until_in_zone(value, tzid))
                } else {
                    format!("UNTIL={value}Z")
                }
            }
            _ => part.to_string(),
        })
        .collect::<Vec<_>>()
        .join(";")
}

fn until_in_zone(value: &str, tzid: Option<&str>) -> String {
    let Some(tzid) = tzid else {
        return value.to_string();
    };
    let (Ok(zone), Some(until)) = (tzid.parse::<chrono_tz::Tz>(), parse_ical_datetime(value)) else {
        log::debug!("Unknown TZID '{tzid}'; keeping UNTIL={value} as UTC");
        return value.to_string();
    };
    format!(
        "{}Z",
        zone.from_utc_datetime(&until).naive_local().format("%Y%m%dT%H%M%S")
    )
}
