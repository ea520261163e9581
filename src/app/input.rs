use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::api::types::ExportFormat;
use crate::editor::{Editor, EditorMode};

use super::calendar::CalendarState;
use super::state::{AppState, InputMode, PromptKind, View};

/// Work a keypress asks the loop to do. Handlers mutate local state
/// directly; anything touching the network or config comes back as a
/// command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Quit,
    ShowDashboard,
    ShowNotes,
    ShowCalendar,
    ShowSettings,
    OpenNote(i64),
    NewNote,
    Save,
    Delete(i64),
    Export(i64, ExportFormat),
    SearchEdited,
    SearchNow,
    ClearSearch,
    CreateArea(String),
    CreateTag(String),
    ToggleAreaFilter(String),
    ToggleTagFilter(String),
    ToggleDraftTag(String),
    ToggleTheme,
    ShiftMonth(i32),
    FilterDate(NaiveDate),
    ClearDateFilter,
}

pub fn handle_key(
    state: &mut AppState,
    editor: &mut Editor,
    calendar: &mut CalendarState,
    key: &KeyEvent,
) -> Option<Command> {
    match state.input_mode {
        InputMode::Browse => handle_browse_key(state, editor, calendar, key),
        InputMode::Search => handle_search_key(state, key),
        InputMode::Edit => handle_edit_key(state, editor, key),
        InputMode::Prompt(kind) => handle_prompt_key(state, kind, key),
    }
}

fn handle_browse_key(
    state: &mut AppState,
    editor: &mut Editor,
    calendar: &mut CalendarState,
    key: &KeyEvent,
) -> Option<Command> {
    match (key.modifiers, key.code) {
        (KeyModifiers::NONE, KeyCode::Char('q')) => Some(Command::Quit),
        (KeyModifiers::NONE, KeyCode::Char('1')) => Some(Command::ShowDashboard),
        (KeyModifiers::NONE, KeyCode::Char('2')) => Some(Command::ShowNotes),
        (KeyModifiers::NONE, KeyCode::Char('3')) => Some(Command::ShowCalendar),
        (KeyModifiers::NONE, KeyCode::Char('4')) => Some(Command::ShowSettings),
        (KeyModifiers::NONE, KeyCode::Char('/')) => {
            state.input_mode = InputMode::Search;
            state.search_input.clear();
            None
        }
        (KeyModifiers::NONE, KeyCode::Char('t')) => Some(Command::ToggleTheme),
        (KeyModifiers::NONE, KeyCode::Char('n')) => {
            editor.clear();
            state.current_note_id = None;
            state.input_mode = InputMode::Edit;
            Some(Command::NewNote)
        }
        (KeyModifiers::NONE, KeyCode::Char('e')) => {
            if state.current_note_id.is_some() {
                state.input_mode = InputMode::Edit;
            }
            None
        }
        (KeyModifiers::SHIFT, KeyCode::Char('D')) => {
            state.current_note_id.map(Command::Delete)
        }
        (KeyModifiers::NONE, KeyCode::Char('x')) => state
            .current_note_id
            .map(|id| Command::Export(id, ExportFormat::Markdown)),
        (KeyModifiers::SHIFT, KeyCode::Char('X')) => state
            .current_note_id
            .map(|id| Command::Export(id, ExportFormat::Html)),
        (KeyModifiers::NONE, KeyCode::Char('a')) if state.view == View::Settings => {
            state.prompt_input.clear();
            state.input_mode = InputMode::Prompt(PromptKind::NewArea);
            None
        }
        (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char('#'))
            if state.view == View::Settings =>
        {
            state.prompt_input.clear();
            state.input_mode = InputMode::Prompt(PromptKind::NewTag);
            None
        }
        (KeyModifiers::NONE, KeyCode::Char('a')) => {
            state.prompt_input.clear();
            state.input_mode = InputMode::Prompt(PromptKind::FilterArea);
            None
        }
        (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char('#')) => {
            state.prompt_input.clear();
            state.input_mode = InputMode::Prompt(PromptKind::FilterTag);
            None
        }
        (KeyModifiers::NONE, KeyCode::Char('c')) => {
            state.clear_filters();
            if state.view == View::Notes {
                Some(Command::ShowNotes)
            } else {
                None
            }
        }
        (KeyModifiers::NONE, KeyCode::Down | KeyCode::Char('j')) => {
            match state.view {
                View::Calendar => calendar.select_next(),
                _ => state.select_next_note(),
            }
            None
        }
        (KeyModifiers::NONE, KeyCode::Up | KeyCode::Char('k')) => {
            match state.view {
                View::Calendar => calendar.select_prev(),
                _ => state.select_prev_note(),
            }
            None
        }
        (KeyModifiers::NONE, KeyCode::Left | KeyCode::Char('h')) if state.view == View::Calendar => {
            Some(Command::ShiftMonth(-1))
        }
        (KeyModifiers::NONE, KeyCode::Right | KeyCode::Char('l')) if state.view == View::Calendar => {
            Some(Command::ShiftMonth(1))
        }
        (KeyModifiers::NONE, KeyCode::Char('f')) if state.view == View::Calendar => calendar
            .selected_event()
            .map(|ev| Command::FilterDate(ev.date)),
        (KeyModifiers::SHIFT, KeyCode::Char('A')) if state.date_filter.is_some() => {
            Some(Command::ClearDateFilter)
        }
        (KeyModifiers::NONE, KeyCode::Enter) => match state.view {
            View::Calendar => calendar.selected_event().map(|ev| Command::OpenNote(ev.note_id)),
            _ => state.selected_note_id().map(Command::OpenNote),
        },
        _ => None,
    }
}

fn handle_search_key(state: &mut AppState, key: &KeyEvent) -> Option<Command> {
    match (key.modifiers, key.code) {
        (KeyModifiers::NONE, KeyCode::Esc) => {
            state.search_input.clear();
            state.input_mode = InputMode::Browse;
            Some(Command::ClearSearch)
        }
        (KeyModifiers::NONE, KeyCode::Enter) => Some(Command::SearchNow),
        (KeyModifiers::NONE, KeyCode::Backspace) => {
            state.search_input.pop();
            Some(Command::SearchEdited)
        }
        (KeyModifiers::NONE, KeyCode::Char(c)) | (KeyModifiers::SHIFT, KeyCode::Char(c)) => {
            state.search_input.push(c);
            Some(Command::SearchEdited)
        }
        _ => None,
    }
}

/// The draft-tag prompt interrupts editing; every other prompt comes
/// from browsing.
fn prompt_exit_mode(kind: PromptKind) -> InputMode {
    match kind {
        PromptKind::DraftTag => InputMode::Edit,
        _ => InputMode::Browse,
    }
}

fn handle_prompt_key(state: &mut AppState, kind: PromptKind, key: &KeyEvent) -> Option<Command> {
    match (key.modifiers, key.code) {
        (KeyModifiers::NONE, KeyCode::Esc) => {
            state.prompt_input.clear();
            state.input_mode = prompt_exit_mode(kind);
            None
        }
        (KeyModifiers::NONE, KeyCode::Enter) => {
            let name = state.prompt_input.trim().to_string();
            state.prompt_input.clear();
            state.input_mode = prompt_exit_mode(kind);
            if name.is_empty() {
                return None;
            }
            Some(match kind {
                PromptKind::NewArea => Command::CreateArea(name),
                PromptKind::NewTag => Command::CreateTag(name),
                PromptKind::FilterArea => Command::ToggleAreaFilter(name),
                PromptKind::FilterTag => Command::ToggleTagFilter(name),
                PromptKind::DraftTag => Command::ToggleDraftTag(name),
            })
        }
        (KeyModifiers::NONE, KeyCode::Backspace) => {
            state.prompt_input.pop();
            None
        }
        (KeyModifiers::NONE, KeyCode::Char(c)) | (KeyModifiers::SHIFT, KeyCode::Char(c)) => {
            state.prompt_input.push(c);
            None
        }
        _ => None,
    }
}

fn handle_edit_key(
    state: &mut AppState,
    editor: &mut Editor,
    key: &KeyEvent,
) -> Option<Command> {
    match (key.modifiers, key.code) {
        (KeyModifiers::NONE, KeyCode::Esc) => {
            state.input_mode = InputMode::Browse;
            None
        }
        (KeyModifiers::CONTROL, KeyCode::Char('s')) => Some(Command::Save),
        (KeyModifiers::CONTROL, KeyCode::Char('e')) => {
            editor.toggle_mode();
            None
        }
        (KeyModifiers::CONTROL, KeyCode::Char('t')) => {
            state.prompt_input.clear();
            state.input_mode = InputMode::Prompt(PromptKind::DraftTag);
            None
        }
        // Text entry lands on the markdown surface; the rich surface is
        // a rendered preview in the terminal.
        _ if editor.mode() == EditorMode::Markdown => {
            edit_buffer_key(editor, key);
            None
        }
        _ => None,
    }
}

fn edit_buffer_key(editor: &mut Editor, key: &KeyEvent) {
    let buf = &mut editor.buffer;
    match (key.modifiers, key.code) {
        (KeyModifiers::NONE, KeyCode::Char(c)) | (KeyModifiers::SHIFT, KeyCode::Char(c)) => {
            buf.insert_char(c)
        }
        (KeyModifiers::NONE, KeyCode::Enter) => buf.insert_newline(),
        (KeyModifiers::NONE, KeyCode::Backspace) => buf.delete_back(),
        (KeyModifiers::NONE, KeyCode::Delete) => buf.delete_forward(),
        (KeyModifiers::NONE, KeyCode::Left) => buf.move_left(),
        (KeyModifiers::NONE, KeyCode::Right) => buf.move_right(),
        (KeyModifiers::NONE, KeyCode::Up) => buf.move_up(),
        (KeyModifiers::NONE, KeyCode::Down) => buf.move_down(),
        (KeyModifiers::NONE, KeyCode::Home) => buf.move_line_home(),
        (KeyModifiers::NONE, KeyCode::End) => buf.move_line_end(),
        (KeyModifiers::CONTROL, KeyCode::Left) => buf.move_word_left(),
        (KeyModifiers::CONTROL, KeyCode::Right) => buf.move_word_right(),
        _ => {}
    }
}
