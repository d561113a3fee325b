//! Turns stored movies into day-view calendar events.

use chrono::{NaiveDateTime, NaiveTime, TimeDelta};
use tracing::warn;

use crate::error::MalformedTime;
use crate::showtime::{DEFAULT_DURATION, parse_duration, parse_time_of_day};
use crate::store::DateKey;
use crate::{Movie, Screening};

/// Credits and turnover after every show.
pub const POST_SHOW_BUFFER: TimeDelta = TimeDelta::minutes(30);

/// One showing placed on the calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEvent<'a> {
    pub label: String,
    pub screen: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub movie: &'a Movie,
}

pub fn normalize<'a>(
    movie: &'a Movie,
    screening: &Screening,
    time: &str,
    date: DateKey,
) -> Result<CalendarEvent<'a>, MalformedTime> {
    let start = parse_time_of_day(time, date)?;
    // A running time too long to place falls back to the default.
    let end = [parse_duration(&movie.duration), DEFAULT_DURATION]
        .into_iter()
        .find_map(|running| {
            start
                .checked_add_signed(running)?
                .checked_add_signed(POST_SHOW_BUFFER)
        })
        .ok_or_else(|| MalformedTime(time.to_string()))?;
    Ok(CalendarEvent {
        label: format!("{} ({})", movie.title, screening.screen),
        screen: screening.screen.clone(),
        start,
        end,
        movie,
    })
}

/// Every (movie, screening, time) of the day, in listing order.
pub fn day_events(
    movies: &[Movie],
    date: DateKey,
) -> impl Iterator<Item = Result<CalendarEvent<'_>, MalformedTime>> {
    movies.iter().flat_map(move |movie| {
        movie.screenings.iter().flat_map(move |screening| {
            screening
                .times
                .iter()
                .map(move |time| normalize(movie, screening, time, date))
        })
    })
}

/// Events ready for display: malformed showtimes are logged and left out,
/// the rest are ordered by start.
pub fn day_schedule(movies: &[Movie], date: DateKey) -> Vec<CalendarEvent<'_>> {
    let mut events: Vec<_> = day_events(movies, date)
        .filter_map(|event| match event {
            Ok(event) => Some(event),
            Err(e) => {
                warn!(%date, "skipping showing: {e}");
                None
            }
        })
        .collect();
    events.sort_by_key(|e| e.start);
    events
}

/// Visible hours of the day grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayView {
    pub first_slot: NaiveTime,
    /// `None` means the grid runs to midnight.
    pub last_slot: Option<NaiveTime>,
    pub slot: TimeDelta,
}

impl Default for DayView {
    fn default() -> Self {
        Self {
            first_slot: NaiveTime::MIN + TimeDelta::hours(9),
            last_slot: None,
            slot: TimeDelta::minutes(30),
        }
    }
}

impl DayView {
    pub fn window(&self, date: DateKey) -> (NaiveDateTime, NaiveDateTime) {
        let day = date.date();
        let open = day.and_time(self.first_slot);
        let close = match self.last_slot {
            Some(t) => day.and_time(t),
            None => day.and_time(NaiveTime::MIN) + TimeDelta::days(1),
        };
        (open, close)
    }

    pub fn slot_count(&self, date: DateKey) -> i64 {
        let (open, close) = self.window(date);
        let slot = self.slot.num_minutes().max(1);
        (close - open).num_minutes() / slot
    }

    /// Whether any part of `event` is inside the grid.
    pub fn shows(&self, event: &CalendarEvent<'_>, date: DateKey) -> bool {
        let (open, close) = self.window(date);
        event.start < close && event.end > open
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> DateKey {
        s.parse().unwrap()
    }

    fn movie(title: &str, duration: &str, screenings: Vec<(&str, Vec<&str>)>) -> Movie {
        Movie {
            title: title.into(),
            rating: "PG".into(),
            duration: duration.into(),
            screenings: screenings
                .into_iter()
                .map(|(screen, times)| Screening {
                    screen: screen.into(),
                    times: times.into_iter().map(String::from).collect(),
                })
                .collect(),
            ..Movie::default()
        }
    }

    #[test]
    fn event_spans_duration_plus_buffer() {
        let m = movie("Wicked", "1 hour, 50 minutes", vec![("IMAX", vec!["7:00 PM"])]);
        let d = date("2025-03-01");
        let e = normalize(&m, &m.screenings[0], "7:00 PM", d).unwrap();
        assert_eq!(e.label, "Wicked (IMAX)");
        assert_eq!(e.screen, "IMAX");
        assert_eq!(e.start.to_string(), "2025-03-01 19:00:00");
        assert_eq!(e.end.to_string(), "2025-03-01 21:20:00");
        assert!(std::ptr::eq(e.movie, &m));
    }

    #[test]
    fn unparsed_duration_gets_two_and_a_half_hours() {
        let m = movie("Mystery", "", vec![("Standard", vec!["11:45 PM"])]);
        let e = normalize(&m, &m.screenings[0], "11:45 PM", date("2025-03-01")).unwrap();
        assert_eq!(e.end.to_string(), "2025-03-02 02:15:00");
    }

    #[test]
    fn running_time_too_long_to_place_uses_default() {
        let m = movie(
            "Epic",
            "9999999999 hours, 0 minutes",
            vec![("Standard", vec!["7:00 PM"])],
        );
        let d = date("2025-03-01");
        let e = normalize(&m, &m.screenings[0], "7:00 PM", d).unwrap();
        assert_eq!(e.end.to_string(), "2025-03-01 21:30:00");

        let schedule = day_schedule(std::slice::from_ref(&m), d);
        assert_eq!(schedule.len(), 1);
        assert_eq!(schedule[0].end, e.end);
    }

    #[test]
    fn expands_every_group_and_time() {
        let movies = vec![
            movie(
                "A",
                "2 hours, 0 minutes",
                vec![("Standard", vec!["1:00 PM", "4:00 PM"]), ("IMAX", vec!["7:00 PM"])],
            ),
            movie(
                "B",
                "1 hour, 30 minutes",
                vec![("Standard", vec!["bogus", "2:00 PM"])],
            ),
        ];
        let events: Vec<_> = day_events(&movies, date("2025-03-01")).collect();
        assert_eq!(events.len(), 5);
        assert_eq!(events[3], Err(MalformedTime("bogus".into())));

        let schedule = day_schedule(&movies, date("2025-03-01"));
        let labels: Vec<_> = schedule.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, ["A (Standard)", "B (Standard)", "A (Standard)", "A (IMAX)"]);
    }

    #[test]
    fn day_view_window() {
        let view = DayView::default();
        let d = date("2025-03-01");
        assert_eq!(view.slot_count(d), 30);

        let m = movie(
            "Late",
            "1 hour, 0 minutes",
            vec![("Standard", vec!["7:00 AM", "8:00 AM", "11:30 PM"])],
        );
        let events = day_schedule(std::slice::from_ref(&m), d);
        let shown: Vec<_> = events.iter().map(|e| view.shows(e, d)).collect();
        assert_eq!(shown, [false, true, true]);
    }
}
