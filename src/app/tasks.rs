//! Fire-and-forget task helpers. Every task reports back over the
//! message channel, success or failure; the loop never awaits network
//! work directly.

use std::path::PathBuf;

use tokio::sync::mpsc::UnboundedSender;

use crate::api::client::NotesClient;
use crate::api::types::{Area, ExportFormat, NoteDraft, NoteQuery, SearchRequest, Tag};
use crate::app::state::{AppMessage, NOTES_PAGE_LIMIT};
use crate::error::ErrorInfo;

pub fn spawn_fetch_reference(client: NotesClient, tx: UnboundedSender<AppMessage>) {
    tokio::spawn(async move {
        let areas = client.list_areas().await;
        let tags = client.list_tags().await;
        let msg = match (areas, tags) {
            (Ok(areas), Ok(tags)) => AppMessage::ReferenceLoaded { areas, tags },
            (Err(e), _) | (_, Err(e)) => {
                AppMessage::ReferenceFailed(ErrorInfo::from_note_error(&e))
            }
        };
        let _ = tx.send(msg);
    });
}

pub fn spawn_fetch_dashboard(client: NotesClient, tx: UnboundedSender<AppMessage>, gen: u64) {
    tokio::spawn(async move {
        let stats = client.statistics().await;
        let recent = client.list_notes(&NoteQuery::page(10, 0)).await;
        let msg = match (stats, recent) {
            (Ok(stats), Ok(page)) => AppMessage::DashboardLoaded {
                gen,
                stats,
                recent: page.notes,
            },
            (Err(e), _) | (_, Err(e)) => AppMessage::DashboardFailed {
                gen,
                error: ErrorInfo::from_note_error(&e),
            },
        };
        let _ = tx.send(msg);
    });
}

pub fn spawn_fetch_notes(
    client: NotesClient,
    tx: UnboundedSender<AppMessage>,
    gen: u64,
    area: Option<String>,
    tags: Vec<String>,
) {
    tokio::spawn(async move {
        let query = NoteQuery {
            limit: NOTES_PAGE_LIMIT,
            offset: 0,
            area,
            tags,
        };
        let msg = match client.list_notes(&query).await {
            Ok(page) => AppMessage::NotesLoaded { gen, page },
            Err(e) => AppMessage::NotesFailed {
                gen,
                error: ErrorInfo::from_note_error(&e),
            },
        };
        let _ = tx.send(msg);
    });
}

pub fn spawn_fetch_note(client: NotesClient, tx: UnboundedSender<AppMessage>, id: i64) {
    tokio::spawn(async move {
        let msg = match client.get_note(id).await {
            Ok(note) => AppMessage::NoteLoaded(Box::new(note)),
            Err(e) => AppMessage::NoteFailed(ErrorInfo::from_note_error(&e)),
        };
        let _ = tx.send(msg);
    });
}

pub fn spawn_fetch_calendar(
    client: NotesClient,
    tx: UnboundedSender<AppMessage>,
    gen: u64,
    year: i32,
    month: u32,
) {
    tokio::spawn(async move {
        let msg = match client.calendar(year, month).await {
            Ok(response) => AppMessage::CalendarLoaded { gen, response },
            Err(e) => AppMessage::CalendarFailed {
                gen,
                error: ErrorInfo::from_note_error(&e),
            },
        };
        let _ = tx.send(msg);
    });
}

pub fn spawn_search(
    client: NotesClient,
    tx: UnboundedSender<AppMessage>,
    gen: u64,
    request: SearchRequest,
) {
    tokio::spawn(async move {
        let keyword = request.keyword.clone();
        let msg = match client.search(&request).await {
            Ok(response) => AppMessage::SearchFinished {
                gen,
                keyword,
                response,
            },
            Err(e) => AppMessage::SearchFailed {
                gen,
                error: ErrorInfo::from_note_error(&e),
            },
        };
        let _ = tx.send(msg);
    });
}

/// POST for a new note, PUT when an id exists. The completion message
/// is sent on every path so the loop can clear the saving flag.
pub fn spawn_save(
    client: NotesClient,
    tx: UnboundedSender<AppMessage>,
    note_id: Option<i64>,
    draft: NoteDraft,
) {
    tokio::spawn(async move {
        let result = match note_id {
            Some(id) => client.update_note(id, &draft).await,
            None => client.create_note(&draft).await,
        };
        let msg = AppMessage::SaveFinished(
            result
                .map(Box::new)
                .map_err(|e| ErrorInfo::Save(e.to_string())),
        );
        let _ = tx.send(msg);
    });
}

pub fn spawn_delete(client: NotesClient, tx: UnboundedSender<AppMessage>, id: i64) {
    tokio::spawn(async move {
        let result = client
            .delete_note(id)
            .await
            .map_err(|e| ErrorInfo::from_note_error(&e));
        let _ = tx.send(AppMessage::DeleteFinished { id, result });
    });
}

/// Fetches the export body and writes it next to the working directory
/// as `note-<id>.<ext>`.
pub fn spawn_export(
    client: NotesClient,
    tx: UnboundedSender<AppMessage>,
    id: i64,
    format: ExportFormat,
) {
    tokio::spawn(async move {
        let result = async {
            let body = client.export_note(id, format).await?;
            let path = PathBuf::from(format!("note-{}.{}", id, format.extension()));
            tokio::fs::write(&path, body).await?;
            Ok::<PathBuf, crate::error::NoteError>(path)
        }
        .await
        .map_err(|e| ErrorInfo::from_note_error(&e));
        let _ = tx.send(AppMessage::ExportFinished(result));
    });
}

pub fn spawn_create_area(client: NotesClient, tx: UnboundedSender<AppMessage>, area: Area) {
    tokio::spawn(async move {
        let result = client
            .create_area(&area)
            .await
            .map_err(|e| ErrorInfo::from_note_error(&e));
        let _ = tx.send(AppMessage::AreaCreated(result));
    });
}

pub fn spawn_create_tag(client: NotesClient, tx: UnboundedSender<AppMessage>, tag: Tag) {
    tokio::spawn(async move {
        let result = client
            .create_tag(&tag)
            .await
            .map_err(|e| ErrorInfo::from_note_error(&e));
        let _ = tx.send(AppMessage::TagCreated(result));
    });
}
