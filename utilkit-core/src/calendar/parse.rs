//! iCalendar parsing.
//!
//! Reads VEVENT components with the `ical` crate and turns their date-times
//! into naive wall-clock values. `Z` suffixes and `TZID` parameters are
//! dropped, so an event shows the time that was written in the file. The
//! DTSTART zone is kept aside for interpreting a UTC recurrence end.

use crate::error::{CoreError, CoreResult};
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use ical::parser::ical::component::IcalEvent;
use ical::property::Property;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// One VEVENT as read from the file, before recurrence expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEvent {
    pub uid: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// TZID parameter of DTSTART, if any.
    pub tzid: Option<String>,
    pub all_day: bool,
    pub rrule: Option<String>,
    pub exdates: Vec<NaiveDateTime>,
    /// Set on an instance that overrides one occurrence of a recurring event.
    pub recurrence_id: Option<NaiveDateTime>,
}

impl CalendarEvent {
    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }
}

/// Reads every VEVENT in `path`.
///
/// Events without a usable DTSTART are skipped with a warning.
pub fn parse_calendar(path: &Path) -> CoreResult<Vec<CalendarEvent>> {
    let file = File::open(path).map_err(|e| {
        CoreError::Calendar(format!("could not open {}: {e}", path.display()))
    })?;
    let parser = ical::IcalParser::new(BufReader::new(file));

    let mut calendars = 0usize;
    let mut events = Vec::new();
    for calendar in parser {
        let calendar = calendar.map_err(|e| {
            CoreError::Calendar(format!("{} is not a valid iCalendar file: {e}", path.display()))
        })?;
        calendars += 1;

        for event in &calendar.events {
            match parse_event(event) {
                Some(parsed) => events.push(parsed),
                None => log::warn!(
                    "Skipping event without a valid DTSTART in {}",
                    path.display()
                ),
            }
        }
    }

    if calendars == 0 {
        return Err(CoreError::Calendar(format!(
            "{} does not contain a VCALENDAR",
            path.display()
        )));
    }

    log::debug!("Parsed {} event(s) from {}", events.len(), path.display());
    Ok(events)
}

fn parse_event(event: &IcalEvent) -> Option<CalendarEvent> {
    let mut uid = None;
    let mut summary = None;
    let mut description = None;
    let mut location = None;
    let mut start = None;
    let mut tzid = None;
    let mut end = None;
    let mut duration = None;
    let mut rrule = None;
    let mut exdates = Vec::new();
    let mut recurrence_id = None;

    for property in &event.properties {
        let Some(value) = property.value.as_deref() else {
            continue;
        };
        match property.name.as_str() {
            "UID" => uid = Some(value.to_string()),
            "SUMMARY" => summary = Some(unescape_text(value)),
            "DESCRIPTION" => description = Some(unescape_text(value)),
            "LOCATION" => location = Some(unescape_text(value)),
            "DTSTART" => {
                start = parse_date_property(property, value);
                tzid = param_value(property, "TZID");
            }
            "DTEND" => end = parse_date_property(property, value),
            "DURATION" => duration = parse_duration(value),
            "RRULE" => rrule = Some(value.to_string()),
            "EXDATE" => exdates.extend(
                value
                    .split(',')
                    .filter_map(|v| parse_date_property(property, v))
                    .map(|(dt, _)| dt),
            ),
            "RECURRENCE-ID" => recurrence_id = parse_date_property(property, value).map(|(dt, _)| dt),
            _ => {}
        }
    }

    let (start, all_day) = start?;
    let end = match (end, duration) {
        (Some((end, _)), _) => end,
        (None, Some(duration)) => start + duration,
        (None, None) if all_day => start + TimeDelta::days(1),
        (None, None) => start,
    };

    Some(CalendarEvent {
        uid,
        summary,
        description,
        location,
        start,
        end,
        tzid,
        all_day,
        rrule,
        exdates,
        recurrence_id,
    })
}

fn param_value(property: &Property, name: &str) -> Option<String> {
    property.params.as_ref()?.iter().find_map(|(param, values)| {
        param
            .eq_ignore_ascii_case(name)
            .then(|| values.first().map(|v| v.trim().to_string()))
            .flatten()
    })
}

fn is_date_value(property: &Property) -> bool {
    property.params.as_ref().is_some_and(|params| {
        params.iter().any(|(name, values)| {
            name.eq_ignore_ascii_case("VALUE") && values.iter().any(|v| v.eq_ignore_ascii_case("DATE"))
        })
    })
}

/// Parses a DATE or DATE-TIME value; the flag is true for a plain date.
fn parse_date_property(property: &Property, value: &str) -> Option<(NaiveDateTime, bool)> {
    let value = value.trim();
    if is_date_value(property) || value.len() == 8 {
        let date = NaiveDate::parse_from_str(value.get(..8)?, "%Y%m%d").ok()?;
        return Some((date.and_hms_opt(0, 0, 0)?, true));
    }
    parse_ical_datetime(value).map(|dt| (dt, false))
}

/// Parses `YYYYMMDDTHHMMSS` with an optional trailing `Z`.
pub fn parse_ical_datetime(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim().trim_end_matches(['Z', 'z']);
    NaiveDateTime::parse_from_str(value, "%Y%m%dT%H%M%S").ok()
}

/// Parses an iCalendar DURATION such as `PT1H30M`, `P1D` or `-P1W`.
pub fn parse_duration(value: &str) -> Option<TimeDelta> {
    let value = value.trim();
    let (negative, rest) = match value.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, value.strip_prefix('+').unwrap_or(value)),
    };
    let rest = rest.strip_prefix('P')?;

    let mut total = TimeDelta::zero();
    let mut in_time = false;
    let mut number = String::new();
    for c in rest.chars() {
        match c {
            'T' => in_time = true,
            '0'..='9' => number.push(c),
            unit => {
                let amount: i64 = number.parse().ok()?;
                number.clear();
                total += match (unit, in_time) {
                    ('W', false) => TimeDelta::weeks(amount),
                    ('D', false) => TimeDelta::days(amount),
                    ('H', true) => TimeDelta::hours(amount),
                    ('M', true) => TimeDelta::minutes(amount),
                    ('S', true) => TimeDelta::seconds(amount),
                    _ => return None,
                };
            }
        }
    }
    if !number.is_empty() {
        return None;
    }

    Some(if negative { -total } else { total })
}

/// Reverses iCalendar TEXT escaping (`\n`, `\,`, `\;`, `\\`).
pub fn unescape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n' | 'N') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(s: &str) -> NaiveDateTime {
        parse_ical_datetime(s).unwrap()
    }

    #[test]
    fn test_parse_ical_datetime_drops_utc_marker() {
        assert_eq!(dt("20240115T090000Z"), dt("20240115T090000"));
        assert_eq!(dt("20240115T090000").format("%Y-%m-%d %H:%M").to_string(), "2024-01-15 09:00");
        assert!(parse_ical_datetime("2024-01-15").is_none());
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("PT1H30M"), Some(TimeDelta::minutes(90)));
        assert_eq!(parse_duration("P1D"), Some(TimeDelta::days(1)));
        assert_eq!(parse_duration("P1W"), Some(TimeDelta::weeks(1)));
        assert_eq!(parse_duration("P1DT2H"), Some(TimeDelta::hours(26)));
        assert_eq!(parse_duration("-PT15M"), Some(TimeDelta::minutes(-15)));
        assert_eq!(parse_duration("PT"), Some(TimeDelta::zero()));
        assert_eq!(parse_duration("1H"), None);
        assert_eq!(parse_duration("PT5"), None);
    }

    #[test]
    fn test_unescape_text() {
        assert_eq!(unescape_text(r"Room 1\, floor 2\nBring laptop\; charger"), "Room 1, floor 2\nBring laptop; charger");
        assert_eq!(unescape_text(r"C:\\temp"), r"C:\temp");
    }

    #[test]
    fn test_parse_calendar_events() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cal.ics");
        std::fs::write(
            &path,
            "BEGIN:VCALENDAR\r\n\
             VERSION:2.0\r\n\
             PRODID:-//utilkit//test//EN\r\n\
             BEGIN:VEVENT\r\n\
             UID:one\r\n\
             SUMMARY:Standup\r\n\
             DTSTART;TZID=Europe/Berlin:20240115T090000\r\n\
             DURATION:PT15M\r\n\
             RRULE:FREQ=DAILY;COUNT=3\r\n\
             EXDATE;TZID=Europe/Berlin:20240116T090000\r\n\
             END:VEVENT\r\n\
             BEGIN:VEVENT\r\n\
             UID:two\r\n\
             SUMMARY:Holiday\r\n\
             DTSTART;VALUE=DATE:20240120\r\n\
             END:VEVENT\r\n\
             BEGIN:VEVENT\r\n\
             UID:three\r\n\
             SUMMARY:No start\r\n\
             END:VEVENT\r\n\
             END:VCALENDAR\r\n",
        )
        .unwrap();

        let events = parse_calendar(&path).unwrap();
        assert_eq!(events.len(), 2);

        let standup = &events[0];
        assert_eq!(standup.summary.as_deref(), Some("Standup"));
        assert_eq!(standup.start, dt("20240115T090000"));
        assert_eq!(standup.end, dt("20240115T091500"));
        assert_eq!(standup.rrule.as_deref(), Some("FREQ=DAILY;COUNT=3"));
        assert_eq!(standup.exdates, vec![dt("20240116T090000")]);
        assert_eq!(standup.description, None);
        assert_eq!(standup.tzid.as_deref(), Some("Europe/Berlin"));

        let holiday = &events[1];
        assert!(holiday.all_day);
        assert_eq!(holiday.start, dt("20240120T000000"));
        assert_eq!(holiday.end, dt("20240121T000000"));
        assert_eq!(holiday.tzid, None);
    }

    #[test]
    fn test_parse_calendar_rejects_non_calendar() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.ics");
        std::fs::write(&path, "just some notes\n").unwrap();
        assert!(matches!(parse_calendar(&path), Err(CoreError::Calendar(_))));
    }
}
