pub mod calendar;
mod input;
pub mod search;
mod state;
mod tasks;
pub use input::Command;
pub use state::*;

use std::time::{Duration, Instant};

use chrono::{Local, NaiveDate};
use crossterm::event::{Event, EventStream, KeyEventKind};
use futures::StreamExt;
use ratatui::DefaultTerminal;
use tokio::sync::mpsc;

use crate::api::client::NotesClient;
use crate::api::types::{Area, Note, NoteDraft, NotesPage, SearchRequest, SearchResponse, Tag};
use crate::config::{AppConfig, Theme};
use crate::convert::plain_text;
use crate::editor::Editor;
use crate::error::{ErrorInfo, Result, Toast};
use crate::format::derive_title;

use calendar::{events_from_response, CalendarState};
use input::handle_key;
use search::SearchDebounce;
use tasks::{
    spawn_create_area, spawn_create_tag, spawn_delete, spawn_export, spawn_fetch_calendar,
    spawn_fetch_dashboard, spawn_fetch_note, spawn_fetch_notes, spawn_fetch_reference, spawn_save,
    spawn_search,
};

pub async fn run(
    config: &AppConfig,
    config_path: &std::path::Path,
    terminal: &mut DefaultTerminal,
) -> Result<()> {
    let mut state = AppState::new(config.theme());
    let mut editor = Editor::new(config.theme());
    editor.ready().await;

    let size = terminal.size()?;
    state.width = size.width;
    let today = Local::now().date_naive();
    let mut cal = CalendarState::new(today, size.width);
    let mut debounce = SearchDebounce::new();

    let (tx, mut rx) = mpsc::unbounded_channel::<AppMessage>();
    let client = NotesClient::new(&config.server.base_url);

    spawn_fetch_reference(client.clone(), tx.clone());
    spawn_fetch_dashboard(client.clone(), tx.clone(), state.dashboard_gen.bump());

    // Event reader task
    let event_tx = tx.clone();
    tokio::spawn(async move {
        let mut reader = EventStream::new();
        loop {
            match reader.next().await {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                    if event_tx.send(AppMessage::Key(key)).is_err() {
                        break;
                    }
                }
                Some(Ok(Event::Resize(w, h))) => {
                    if event_tx.send(AppMessage::Resize(w, h)).is_err() {
                        break;
                    }
                }
                Some(Err(_)) | None => break,
                _ => {}
            }
        }
    });

    // Tick timer
    let tick_tx = tx.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(100));
        loop {
            interval.tick().await;
            if tick_tx.send(AppMessage::Tick).is_err() {
                break;
            }
        }
    });

    loop {
        terminal.draw(|frame| crate::ui::render(frame, &state, &editor, &cal))?;

        let Some(msg) = rx.recv().await else { break };
        match msg {
            AppMessage::Key(key) => {
                if let Some(cmd) = handle_key(&mut state, &mut editor, &mut cal, &key) {
                    execute_command(
                        cmd,
                        &mut state,
                        &mut editor,
                        &mut cal,
                        &mut debounce,
                        &client,
                        &tx,
                        config_path,
                    )
                    .await;
                }
            }
            AppMessage::Resize(w, _) => {
                state.width = w;
                cal.resize(w);
            }
            AppMessage::Tick => {
                let now = Instant::now();
                state.expire_toast(now);
                if let Some(keyword) = debounce.poll(now) {
                    fire_search(&mut state, &client, &tx, keyword);
                }
            }
            AppMessage::ReferenceLoaded { areas, tags } => {
                state.areas = areas;
                state.tags = tags;
            }
            AppMessage::ReferenceFailed(error) => {
                state.show_toast(Toast::from_error_info(&error), Instant::now());
            }
            AppMessage::DashboardLoaded { gen, stats, recent } => {
                handle_dashboard_loaded(&mut state, gen, stats, recent);
            }
            AppMessage::DashboardFailed { gen, error } => {
                if state.dashboard_gen.is_current(gen) {
                    state.show_toast(Toast::from_error_info(&error), Instant::now());
                }
            }
            AppMessage::NotesLoaded { gen, page } => {
                handle_notes_loaded(&mut state, gen, page);
            }
            AppMessage::NotesFailed { gen, error } => {
                if state.notes_gen.is_current(gen) {
                    state.show_toast(Toast::from_error_info(&error), Instant::now());
                }
            }
            AppMessage::NoteLoaded(note) => {
                handle_note_loaded(&mut state, &mut editor, *note);
            }
            AppMessage::NoteFailed(error) => {
                state.show_toast(Toast::from_error_info(&error), Instant::now());
            }
            AppMessage::SearchFinished {
                gen,
                keyword,
                response,
            } => {
                handle_search_finished(&mut state, gen, keyword, response);
            }
            AppMessage::SearchFailed { gen, error } => {
                if state.search_gen.is_current(gen) {
                    state.show_toast(Toast::from_error_info(&error), Instant::now());
                }
            }
            AppMessage::CalendarLoaded { gen, response } => {
                if state.calendar_gen.is_current(gen) {
                    cal.set_events(events_from_response(&response, &state.areas));
                }
            }
            AppMessage::CalendarFailed { gen, error } => {
                if state.calendar_gen.is_current(gen) {
                    state.show_toast(Toast::from_error_info(&error), Instant::now());
                }
            }
            AppMessage::SaveFinished(result) => {
                handle_save_finished(&mut state, result, Instant::now());
                // Saved notes change listings and counters; refresh the
                // backing data for whatever is visible.
                spawn_fetch_notes(
                    client.clone(),
                    tx.clone(),
                    state.notes_gen.bump(),
                    state.area_filter(),
                    state.selected_tags.clone(),
                );
                spawn_fetch_dashboard(client.clone(), tx.clone(), state.dashboard_gen.bump());
            }
            AppMessage::DeleteFinished { id, result } => {
                handle_delete_finished(&mut state, id, result, Instant::now());
                spawn_fetch_notes(
                    client.clone(),
                    tx.clone(),
                    state.notes_gen.bump(),
                    state.area_filter(),
                    state.selected_tags.clone(),
                );
            }
            AppMessage::ExportFinished(result) => match result {
                Ok(path) => state.show_toast(
                    Toast::success(format!("Exported to {}", path.display())),
                    Instant::now(),
                ),
                Err(error) => state.show_toast(Toast::from_error_info(&error), Instant::now()),
            },
            AppMessage::AreaCreated(result) => match result {
                Ok(area) => {
                    state.show_toast(Toast::success(format!("Area '{}' created", area.name)), Instant::now());
                    state.areas.push(area);
                }
                Err(error) => state.show_toast(Toast::from_error_info(&error), Instant::now()),
            },
            AppMessage::TagCreated(result) => match result {
                Ok(tag) => {
                    state.show_toast(Toast::success(format!("Tag '{}' created", tag.name)), Instant::now());
                    state.tags.push(tag);
                }
                Err(error) => state.show_toast(Toast::from_error_info(&error), Instant::now()),
            },
        }

        if state.should_quit {
            break;
        }
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn execute_command(
    cmd: Command,
    state: &mut AppState,
    editor: &mut Editor,
    cal: &mut CalendarState,
    debounce: &mut SearchDebounce,
    client: &NotesClient,
    tx: &mpsc::UnboundedSender<AppMessage>,
    config_path: &std::path::Path,
) {
    match cmd {
        Command::Quit => state.should_quit = true,
        Command::ShowDashboard => {
            state.view = View::Dashboard;
            spawn_fetch_dashboard(client.clone(), tx.clone(), state.dashboard_gen.bump());
        }
        Command::ShowNotes => {
            state.view = View::Notes;
            state.date_filter = None;
            state.search_results = None;
            spawn_fetch_notes(
                client.clone(),
                tx.clone(),
                state.notes_gen.bump(),
                state.area_filter(),
                state.selected_tags.clone(),
            );
        }
        Command::ShowCalendar => {
            state.view = View::Calendar;
            spawn_fetch_calendar(
                client.clone(),
                tx.clone(),
                state.calendar_gen.bump(),
                cal.year,
                cal.month,
            );
        }
        Command::ShowSettings => {
            state.view = View::Settings;
        }
        Command::OpenNote(id) => {
            state.view = View::Notes;
            spawn_fetch_note(client.clone(), tx.clone(), id);
        }
        Command::NewNote => {
            // A note belongs to at most one area; seed from the first
            // filtered one.
            state.draft_area = state.selected_areas.first().cloned();
            state.draft_tags = state.selected_tags.clone();
        }
        Command::Save => {
            if state.saving {
                return;
            }
            state.saving = true;
            let content = editor.content();
            let draft = NoteDraft {
                title: derive_title(&plain_text(&content.html)),
                html_content: content.html,
                markdown_content: content.markdown,
                area: state.draft_area.clone(),
                tags: state.draft_tags.clone(),
            };
            spawn_save(client.clone(), tx.clone(), state.current_note_id, draft);
        }
        Command::Delete(id) => {
            if state.deleting {
                return;
            }
            state.deleting = true;
            spawn_delete(client.clone(), tx.clone(), id);
        }
        Command::Export(id, format) => {
            spawn_export(client.clone(), tx.clone(), id, format);
        }
        Command::SearchEdited => {
            let keyword = state.search_input.clone();
            debounce.on_input(&keyword, Instant::now());
            if state.search_input.trim().is_empty() && state.search_results.is_some() {
                // Cleared field reverts to the unfiltered list.
                state.search_results = None;
                spawn_fetch_notes(
                    client.clone(),
                    tx.clone(),
                    state.notes_gen.bump(),
                    state.area_filter(),
                    state.selected_tags.clone(),
                );
            }
        }
        Command::SearchNow => {
            let typed = state.search_input.clone();
            if let Some(keyword) = debounce.on_enter(&typed) {
                fire_search(state, client, tx, keyword);
            }
        }
        Command::ClearSearch => {
            debounce.on_clear();
            if state.search_results.take().is_some() {
                spawn_fetch_notes(
                    client.clone(),
                    tx.clone(),
                    state.notes_gen.bump(),
                    state.area_filter(),
                    state.selected_tags.clone(),
                );
            }
        }
        Command::ToggleAreaFilter(name) => {
            state.toggle_area(&name);
            refresh_filtered_notes(state, client, tx);
        }
        Command::ToggleTagFilter(name) => {
            state.toggle_tag(&name);
            refresh_filtered_notes(state, client, tx);
        }
        Command::ToggleDraftTag(name) => {
            state.toggle_draft_tag(&name);
            let listed = if state.draft_tags.is_empty() {
                "(none)".to_string()
            } else {
                state.draft_tags.join(", ")
            };
            state.show_toast(Toast::info(format!("Note tags: {}", listed)), Instant::now());
        }
        Command::CreateArea(name) => {
            let area = Area {
                name,
                color: crate::render::DEFAULT_AREA_COLOR.to_string(),
            };
            spawn_create_area(client.clone(), tx.clone(), area);
        }
        Command::CreateTag(name) => {
            let tag = Tag {
                name,
                color: crate::render::DEFAULT_TAG_COLOR.to_string(),
            };
            spawn_create_tag(client.clone(), tx.clone(), tag);
        }
        Command::ToggleTheme => {
            let theme = state.theme.toggled();
            state.theme = theme;
            editor.set_theme(theme).await;
            if let Err(e) = AppConfig::save_theme(config_path, theme) {
                state.show_toast(
                    Toast::warning(format!("Theme not saved: {}", e)),
                    Instant::now(),
                );
            }
        }
        Command::ShiftMonth(delta) => {
            if cal.shift_month(delta) {
                spawn_fetch_calendar(
                    client.clone(),
                    tx.clone(),
                    state.calendar_gen.bump(),
                    cal.year,
                    cal.month,
                );
            }
        }
        Command::FilterDate(date) => {
            apply_date_filter(state, date);
        }
        Command::ClearDateFilter => {
            state.date_filter = None;
            spawn_fetch_notes(
                client.clone(),
                tx.clone(),
                state.notes_gen.bump(),
                state.area_filter(),
                state.selected_tags.clone(),
            );
        }
    }
}

/// A filter change only refetches when the listing is on screen; other
/// views pick the new selection up through `ShowNotes`.
fn refresh_filtered_notes(
    state: &mut AppState,
    client: &NotesClient,
    tx: &mpsc::UnboundedSender<AppMessage>,
) {
    if state.view != View::Notes {
        return;
    }
    state.date_filter = None;
    state.search_results = None;
    spawn_fetch_notes(
        client.clone(),
        tx.clone(),
        state.notes_gen.bump(),
        state.area_filter(),
        state.selected_tags.clone(),
    );
}

fn fire_search(
    state: &mut AppState,
    client: &NotesClient,
    tx: &mpsc::UnboundedSender<AppMessage>,
    keyword: String,
) {
    state.view = View::Notes;
    let request = SearchRequest::new(
        keyword,
        state.area_filter(),
        state.selected_tags.clone(),
    );
    spawn_search(client.clone(), tx.clone(), state.search_gen.bump(), request);
}

pub(crate) fn apply_date_filter(state: &mut AppState, date: NaiveDate) {
    state.date_filter = Some(date);
    state.view = View::Notes;
    state.selected_note = 0;
}

pub(crate) fn handle_dashboard_loaded(
    state: &mut AppState,
    gen: u64,
    stats: crate::api::types::Statistics,
    recent: Vec<Note>,
) {
    if !state.dashboard_gen.is_current(gen) {
        return;
    }
    state.stats = Some(stats);
    state.recent = recent;
}

pub(crate) fn handle_notes_loaded(state: &mut AppState, gen: u64, page: NotesPage) {
    if !state.notes_gen.is_current(gen) {
        return;
    }
    state.notes = page.notes;
    state.notes_total = page.total;
    state.selected_note = state
        .selected_note
        .min(state.notes.len().saturating_sub(1));
}

pub(crate) fn handle_note_loaded(state: &mut AppState, editor: &mut Editor, note: Note) {
    state.current_note_id = Some(note.id);
    state.draft_area = note.area.clone();
    state.draft_tags = note.tags.clone();
    editor.clear();
    editor.set_content(
        &note.html_content,
        note.markdown_content.as_deref().unwrap_or(""),
    );
}

pub(crate) fn handle_search_finished(
    state: &mut AppState,
    gen: u64,
    keyword: String,
    response: SearchResponse,
) {
    if !state.search_gen.is_current(gen) {
        return;
    }
    state.search_results = Some((keyword, response));
    state.view = View::Notes;
}

/// The saving flag clears on every outcome; nothing may leave the save
/// control stuck busy.
pub(crate) fn handle_save_finished(
    state: &mut AppState,
    result: std::result::Result<Box<Note>, ErrorInfo>,
    now: Instant,
) {
    state.saving = false;
    match result {
        Ok(note) => {
            state.current_note_id = Some(note.id);
            state.show_toast(Toast::success("Note saved"), now);
        }
        Err(error) => {
            state.show_toast(Toast::from_error_info(&error), now);
        }
    }
}

pub(crate) fn handle_delete_finished(
    state: &mut AppState,
    id: i64,
    result: std::result::Result<(), ErrorInfo>,
    now: Instant,
) {
    state.deleting = false;
    match result {
        Ok(()) => {
            if state.current_note_id == Some(id) {
                state.current_note_id = None;
            }
            state.show_toast(Toast::success("Note deleted"), now);
        }
        Err(error) => {
            state.show_toast(Toast::from_error_info(&error), now);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::Statistics;
    use crate::error::ToastLevel;

    fn note(id: i64) -> Note {
        Note {
            id,
            title: format!("note {}", id),
            html_content: format!("<p>body {}</p>", id),
            plaintext: None,
            markdown_content: Some(format!("body {}", id)),
            area: Some("Work".into()),
            tags: vec!["urgent".into()],
            created_at: chrono::NaiveDate::from_ymd_opt(2024, 3, 15)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
            modified_at: chrono::NaiveDate::from_ymd_opt(2024, 3, 15)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
        }
    }

    #[test]
    fn stale_notes_response_is_discarded() {
        let mut state = AppState::new(Theme::Light);
        let stale = state.notes_gen.bump();
        let fresh = state.notes_gen.bump();

        handle_notes_loaded(
            &mut state,
            stale,
            NotesPage {
                notes: vec![note(1)],
                total: 1,
            },
        );
        assert!(state.notes.is_empty());

        handle_notes_loaded(
            &mut state,
            fresh,
            NotesPage {
                notes: vec![note(2)],
                total: 1,
            },
        );
        assert_eq!(state.notes[0].id, 2);
    }

    #[test]
    fn stale_search_response_is_discarded() {
        let mut state = AppState::new(Theme::Light);
        let stale = state.search_gen.bump();
        let fresh = state.search_gen.bump();

        handle_search_finished(&mut state, stale, "old".into(), SearchResponse::default());
        assert!(state.search_results.is_none());

        handle_search_finished(&mut state, fresh, "new".into(), SearchResponse::default());
        assert_eq!(state.search_results.as_ref().unwrap().0, "new");
        assert_eq!(state.view, View::Notes);
    }

    #[test]
    fn stale_dashboard_response_is_discarded() {
        let mut state = AppState::new(Theme::Light);
        let stale = state.dashboard_gen.bump();
        state.dashboard_gen.bump();

        handle_dashboard_loaded(&mut state, stale, Statistics::default(), vec![note(1)]);
        assert!(state.stats.is_none());
        assert!(state.recent.is_empty());
    }

    #[test]
    fn save_success_adopts_server_id_and_clears_flag() {
        let mut state = AppState::new(Theme::Light);
        state.saving = true;
        state.current_note_id = None;

        handle_save_finished(&mut state, Ok(Box::new(note(31))), Instant::now());

        assert!(!state.saving);
        assert_eq!(state.current_note_id, Some(31));
        assert_eq!(state.toast.as_ref().unwrap().level, ToastLevel::Success);
    }

    #[test]
    fn save_failure_still_clears_flag() {
        let mut state = AppState::new(Theme::Light);
        state.saving = true;

        handle_save_finished(
            &mut state,
            Err(ErrorInfo::Save("timeout".into())),
            Instant::now(),
        );

        assert!(!state.saving);
        assert_eq!(state.toast.as_ref().unwrap().level, ToastLevel::Error);
    }

    #[test]
    fn delete_clears_open_note_only_when_it_matches() {
        let mut state = AppState::new(Theme::Light);
        state.deleting = true;
        state.current_note_id = Some(5);

        handle_delete_finished(&mut state, 7, Ok(()), Instant::now());
        assert_eq!(state.current_note_id, Some(5));
        assert!(!state.deleting);

        state.deleting = true;
        handle_delete_finished(&mut state, 5, Ok(()), Instant::now());
        assert_eq!(state.current_note_id, None);
    }

    #[tokio::test]
    async fn note_loaded_fills_editor_and_draft_metadata() {
        let mut state = AppState::new(Theme::Light);
        let mut editor = Editor::new(Theme::Light);

        handle_note_loaded(&mut state, &mut editor, note(12));

        assert_eq!(state.current_note_id, Some(12));
        assert_eq!(state.draft_area.as_deref(), Some("Work"));
        assert_eq!(state.draft_tags, vec!["urgent"]);
        assert_eq!(editor.content().html, "<p>body 12</p>");
    }

    #[test]
    fn notes_loaded_clamps_selection() {
        let mut state = AppState::new(Theme::Light);
        state.selected_note = 9;
        let gen = state.notes_gen.bump();

        handle_notes_loaded(
            &mut state,
            gen,
            NotesPage {
                notes: vec![note(1), note(2)],
                total: 2,
            },
        );
        assert_eq!(state.selected_note, 1);
    }

    async fn run_command(state: &mut AppState, cmd: Command) -> mpsc::UnboundedReceiver<AppMessage> {
        let mut editor = Editor::new(Theme::Light);
        let mut cal = CalendarState::new(
            chrono::NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            120,
        );
        let mut debounce = SearchDebounce::new();
        // Nothing listens here; the spawned fetch reports its failure
        // back over the channel.
        let client = NotesClient::new("http://127.0.0.1:9");
        let (tx, rx) = mpsc::unbounded_channel();
        execute_command(
            cmd,
            state,
            &mut editor,
            &mut cal,
            &mut debounce,
            &client,
            &tx,
            std::path::Path::new("/tmp/notekeep-test-config.toml"),
        )
        .await;
        rx
    }

    #[tokio::test]
    async fn tag_filter_command_updates_selection_and_refetches() {
        let mut state = AppState::new(Theme::Light);
        state.view = View::Notes;

        let mut rx = run_command(&mut state, Command::ToggleTagFilter("urgent".into())).await;
        assert_eq!(state.selected_tags, vec!["urgent"]);
        assert!(matches!(
            rx.recv().await,
            Some(AppMessage::NotesFailed { .. } | AppMessage::NotesLoaded { .. })
        ));

        run_command(&mut state, Command::ToggleTagFilter("urgent".into())).await;
        assert!(state.selected_tags.is_empty());
    }

    #[tokio::test]
    async fn area_filter_command_builds_comma_joined_selection() {
        let mut state = AppState::new(Theme::Light);
        state.view = View::Dashboard;

        run_command(&mut state, Command::ToggleAreaFilter("Work".into())).await;
        run_command(&mut state, Command::ToggleAreaFilter("Home".into())).await;

        assert_eq!(state.selected_areas, vec!["Work", "Home"]);
        assert_eq!(state.area_filter().as_deref(), Some("Work,Home"));
    }

    #[tokio::test]
    async fn draft_tag_command_tags_the_open_note() {
        let mut state = AppState::new(Theme::Light);

        run_command(&mut state, Command::ToggleDraftTag("todo".into())).await;
        assert_eq!(state.draft_tags, vec!["todo"]);
        assert_eq!(state.toast.as_ref().unwrap().level, ToastLevel::Info);

        run_command(&mut state, Command::ToggleDraftTag("todo".into())).await;
        assert!(state.draft_tags.is_empty());
    }

    #[test]
    fn date_filter_switches_to_notes_view() {
        let mut state = AppState::new(Theme::Light);
        apply_date_filter(&mut state, chrono::NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        assert_eq!(state.view, View::Notes);
        assert!(state.date_filter.is_some());
    }
}
