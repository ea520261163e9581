//! Calendar adapter: translates the month endpoint's date buckets into
//! point events, filters notes by creation day, and decides the layout
//! from the terminal width.

use chrono::{Datelike, NaiveDate};

use crate::api::types::{Area, CalendarResponse, Note};
use crate::render::DEFAULT_AREA_COLOR;

/// Columns at or above which the calendar renders as a month grid;
/// below it, a plain list.
pub const GRID_WIDTH_THRESHOLD: u16 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarLayout {
    List,
    Grid,
}

pub fn layout_for_width(width: u16) -> CalendarLayout {
    if width < GRID_WIDTH_THRESHOLD {
        CalendarLayout::List
    } else {
        CalendarLayout::Grid
    }
}

/// One note, shown as a point event on its creation day.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarEvent {
    pub note_id: i64,
    pub title: String,
    pub date: NaiveDate,
    pub color: String,
}

#[derive(Debug)]
pub struct CalendarState {
    pub year: i32,
    pub month: u32,
    pub events: Vec<CalendarEvent>,
    pub layout: CalendarLayout,
    pub selected: usize,
}

impl CalendarState {
    pub fn new(today: NaiveDate, width: u16) -> Self {
        Self {
            year: today.year(),
            month: today.month(),
            events: Vec::new(),
            layout: layout_for_width(width),
            selected: 0,
        }
    }

    /// Moves the visible month; the caller refetches when this returns
    /// true.
    pub fn shift_month(&mut self, delta: i32) -> bool {
        let total = self.year * 12 + self.month as i32 - 1 + delta;
        let (year, month) = (total.div_euclid(12), total.rem_euclid(12) as u32 + 1);
        if (year, month) != (self.year, self.month) {
            self.year = year;
            self.month = month;
            true
        } else {
            false
        }
    }

    pub fn set_events(&mut self, events: Vec<CalendarEvent>) {
        self.events = events;
        self.selected = self.selected.min(self.events.len().saturating_sub(1));
    }

    /// Re-evaluates the layout for a new width. True when the resize
    /// crossed the threshold and the layout flipped.
    pub fn resize(&mut self, width: u16) -> bool {
        let layout = layout_for_width(width);
        if layout != self.layout {
            self.layout = layout;
            true
        } else {
            false
        }
    }

    pub fn selected_event(&self) -> Option<&CalendarEvent> {
        self.events.get(self.selected)
    }

    pub fn select_next(&mut self) {
        if !self.events.is_empty() {
            self.selected = (self.selected + 1).min(self.events.len() - 1);
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }
}

/// Flattens the month response's `{date: [note, ...]}` buckets. Events
/// take the note area's registered color, or the default area color
/// when the area is unknown. Buckets with unparseable date keys are
/// skipped.
pub fn events_from_response(response: &CalendarResponse, areas: &[Area]) -> Vec<CalendarEvent> {
    let mut events: Vec<CalendarEvent> = Vec::new();
    for (date_str, notes) in &response.calendar_data {
        let Ok(date) = NaiveDate::parse_from_str(date_str, "%Y-%m-%d") else {
            continue;
        };
        for note in notes {
            let color = note
                .area
                .as_deref()
                .and_then(|name| areas.iter().find(|a| a.name == name))
                .map(|a| a.color.clone())
                .unwrap_or_else(|| DEFAULT_AREA_COLOR.to_string());
            events.push(CalendarEvent {
                note_id: note.id,
                title: note.title.clone(),
                date,
                color,
            });
        }
    }
    events.sort_by(|a, b| a.date.cmp(&b.date).then(a.note_id.cmp(&b.note_id)));
    events
}

/// Client-side filter for an empty-date selection: notes created on
/// that day, from the already-loaded page.
pub fn notes_created_on(notes: &[Note], date: NaiveDate) -> Vec<Note> {
    notes
        .iter()
        .filter(|n| n.created_at.date() == date)
        .cloned()
        .collect()
}
