use std::time::Instant;

use chrono::NaiveDate;
use crossterm::event::KeyEvent;

use crate::api::types::{
    Area, CalendarResponse, Note, NotesPage, SearchResponse, Statistics, Tag,
};
use crate::config::Theme;
use crate::error::{ErrorInfo, Toast};

pub const TOAST_SECS: u64 = 4;
pub const NOTES_PAGE_LIMIT: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Dashboard,
    Notes,
    Calendar,
    Settings,
}

/// What a one-line prompt is collecting a name for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    NewArea,
    NewTag,
    FilterArea,
    FilterTag,
    DraftTag,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Browse,
    Search,
    Edit,
    Prompt(PromptKind),
}

/// Monotonic counter for one load surface. A fetch captures the value
/// returned by `bump`; completion messages carrying an older value are
/// stale and get dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Generation(u64);

impl Generation {
    pub fn bump(&mut self) -> u64 {
        self.0 += 1;
        self.0
    }

    pub fn is_current(&self, gen: u64) -> bool {
        self.0 == gen
    }
}

/// Everything the loop task owns. Mutated only from the message loop.
pub struct AppState {
    pub view: View,
    pub input_mode: InputMode,

    pub current_note_id: Option<i64>,
    pub areas: Vec<Area>,
    pub tags: Vec<Tag>,

    // Transient filter selection, never persisted.
    pub selected_areas: Vec<String>,
    pub selected_tags: Vec<String>,

    // Metadata of the note being edited, carried into the next save.
    pub draft_area: Option<String>,
    pub draft_tags: Vec<String>,

    pub notes: Vec<Note>,
    pub notes_total: u64,
    pub selected_note: usize,
    pub search_input: String,
    pub prompt_input: String,
    pub stats: Option<Statistics>,
    pub recent: Vec<Note>,
    pub search_results: Option<(String, SearchResponse)>,
    pub date_filter: Option<NaiveDate>,

    pub saving: bool,
    pub deleting: bool,
    pub toast: Option<Toast>,
    pub toast_deadline: Option<Instant>,

    pub theme: Theme,
    pub width: u16,

    pub notes_gen: Generation,
    pub dashboard_gen: Generation,
    pub search_gen: Generation,
    pub calendar_gen: Generation,

    pub should_quit: bool,
}

impl AppState {
    pub fn new(theme: Theme) -> Self {
        Self {
            view: View::default(),
            input_mode: InputMode::default(),
            current_note_id: None,
            areas: Vec::new(),
            tags: Vec::new(),
            selected_areas: Vec::new(),
            selected_tags: Vec::new(),
            draft_area: None,
            draft_tags: Vec::new(),
            notes: Vec::new(),
            notes_total: 0,
            selected_note: 0,
            search_input: String::new(),
            prompt_input: String::new(),
            stats: None,
            recent: Vec::new(),
            search_results: None,
            date_filter: None,
            saving: false,
            deleting: false,
            toast: None,
            toast_deadline: None,
            theme,
            width: 0,
            notes_gen: Generation::default(),
            dashboard_gen: Generation::default(),
            search_gen: Generation::default(),
            calendar_gen: Generation::default(),
            should_quit: false,
        }
    }

    /// Adds the tag to the selection or removes it if present. Order of
    /// first selection is preserved; no duplicates.
    pub fn toggle_tag(&mut self, name: &str) {
        if let Some(pos) = self.selected_tags.iter().position(|t| t == name) {
            self.selected_tags.remove(pos);
        } else {
            self.selected_tags.push(name.to_string());
        }
    }

    /// Adds the area to the selection or removes it if present.
    pub fn toggle_area(&mut self, name: &str) {
        if let Some(pos) = self.selected_areas.iter().position(|a| a == name) {
            self.selected_areas.remove(pos);
        } else {
            self.selected_areas.push(name.to_string());
        }
    }

    /// Selected areas comma-joined into the single filter string the
    /// listing and search requests take.
    pub fn area_filter(&self) -> Option<String> {
        if self.selected_areas.is_empty() {
            None
        } else {
            Some(self.selected_areas.join(","))
        }
    }

    /// Adds the tag to the draft of the note being edited, or removes
    /// it if already attached.
    pub fn toggle_draft_tag(&mut self, name: &str) {
        if let Some(pos) = self.draft_tags.iter().position(|t| t == name) {
            self.draft_tags.remove(pos);
        } else {
            self.draft_tags.push(name.to_string());
        }
    }

    pub fn clear_filters(&mut self) {
        self.selected_areas.clear();
        self.selected_tags.clear();
    }

    pub fn select_next_note(&mut self) {
        if !self.notes.is_empty() {
            self.selected_note = (self.selected_note + 1).min(self.notes.len() - 1);
        }
    }

    pub fn select_prev_note(&mut self) {
        self.selected_note = self.selected_note.saturating_sub(1);
    }

    pub fn selected_note_id(&self) -> Option<i64> {
        self.notes.get(self.selected_note).map(|n| n.id)
    }

    pub fn show_toast(&mut self, toast: Toast, now: Instant) {
        self.toast = Some(toast);
        self.toast_deadline = Some(now + std::time::Duration::from_secs(TOAST_SECS));
    }

    pub fn expire_toast(&mut self, now: Instant) {
        if let Some(deadline) = self.toast_deadline {
            if now >= deadline {
                self.toast = None;
                self.toast_deadline = None;
            }
        }
    }
}

/// Everything the loop reacts to. Spawned tasks only ever send these.
#[derive(Debug)]
pub enum AppMessage {
    Key(KeyEvent),
    Resize(u16, u16),
    Tick,

    ReferenceLoaded {
        areas: Vec<Area>,
        tags: Vec<Tag>,
    },
    ReferenceFailed(ErrorInfo),

    DashboardLoaded {
        gen: u64,
        stats: Statistics,
        recent: Vec<Note>,
    },
    DashboardFailed {
        gen: u64,
        error: ErrorInfo,
    },

    NotesLoaded {
        gen: u64,
        page: NotesPage,
    },
    NotesFailed {
        gen: u64,
        error: ErrorInfo,
    },

    NoteLoaded(Box<Note>),
    NoteFailed(ErrorInfo),

    SearchFinished {
        gen: u64,
        keyword: String,
        response: SearchResponse,
    },
    SearchFailed {
        gen: u64,
        error: ErrorInfo,
    },

    CalendarLoaded {
        gen: u64,
        response: CalendarResponse,
    },
    CalendarFailed {
        gen: u64,
        error: ErrorInfo,
    },

    SaveFinished(Result<Box<Note>, ErrorInfo>),
    DeleteFinished {
        id: i64,
        result: Result<(), ErrorInfo>,
    },
    ExportFinished(Result<std::path::PathBuf, ErrorInfo>),

    AreaCreated(Result<Area, ErrorInfo>),
    TagCreated(Result<Tag, ErrorInfo>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn toggle_tag_preserves_order_and_uniqueness() {
        let mut state = AppState::new(Theme::Light);
        state.toggle_tag("b");
        state.toggle_tag("a");
        state.toggle_tag("b"); // deselect
        state.toggle_tag("c");
        assert_eq!(state.selected_tags, vec!["a", "c"]);
    }

    #[test]
    fn toggle_area_is_multi_select() {
        let mut state = AppState::new(Theme::Light);
        state.toggle_area("Work");
        state.toggle_area("Home");
        assert_eq!(state.selected_areas, vec!["Work", "Home"]);
        state.toggle_area("Home");
        assert_eq!(state.selected_areas, vec!["Work"]);
    }

    #[test]
    fn area_filter_joins_selection_with_commas() {
        let mut state = AppState::new(Theme::Light);
        assert_eq!(state.area_filter(), None);
        state.toggle_area("Work");
        state.toggle_area("Home");
        assert_eq!(state.area_filter().as_deref(), Some("Work,Home"));
    }

    #[test]
    fn toggle_draft_tag_attaches_and_detaches() {
        let mut state = AppState::new(Theme::Light);
        state.toggle_draft_tag("urgent");
        state.toggle_draft_tag("todo");
        state.toggle_draft_tag("urgent");
        assert_eq!(state.draft_tags, vec!["todo"]);
    }

    #[test]
    fn clear_filters_resets_both() {
        let mut state = AppState::new(Theme::Light);
        state.toggle_area("Work");
        state.toggle_tag("urgent");
        state.clear_filters();
        assert!(state.selected_areas.is_empty());
        assert!(state.selected_tags.is_empty());
    }

    #[test]
    fn generation_staleness() {
        let mut gen = Generation::default();
        let first = gen.bump();
        assert!(gen.is_current(first));
        let second = gen.bump();
        assert!(!gen.is_current(first));
        assert!(gen.is_current(second));
    }

    #[test]
    fn toast_expires_after_deadline() {
        let mut state = AppState::new(Theme::Light);
        let now = Instant::now();
        state.show_toast(Toast::info("saved"), now);

        state.expire_toast(now + Duration::from_secs(1));
        assert!(state.toast.is_some());

        state.expire_toast(now + Duration::from_secs(TOAST_SECS));
        assert!(state.toast.is_none());
        assert!(state.toast_deadline.is_none());
    }
}
