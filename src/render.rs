//! Pure view renderers. Each function turns state slices and a fetched
//! payload into an HTML string; the terminal layer translates that
//! markup into styled lines. User-supplied strings are escaped at every
//! insertion point; only server-controlled color values go into style
//! attributes raw.

use chrono::NaiveDateTime;

use crate::api::types::{Area, Note, SearchResult, Statistics, Tag};
use crate::format::{clip, escape_html, format_relative};
use crate::snippet::{highlight, search_snippet, SNIPPET_MAX_LEN};

pub const LIST_SNIPPET_LEN: usize = 150;
pub const TAG_CLOUD_LIMIT: usize = 10;

pub const DEFAULT_AREA_COLOR: &str = "#3b82f6";
pub const DEFAULT_TAG_COLOR: &str = "#10b981";

fn area_color<'a>(areas: &'a [Area], name: &str) -> &'a str {
    areas
        .iter()
        .find(|a| a.name == name)
        .map(|a| a.color.as_str())
        .unwrap_or(DEFAULT_AREA_COLOR)
}

fn tag_color<'a>(tags: &'a [Tag], name: &str) -> &'a str {
    tags.iter()
        .find(|t| t.name == name)
        .map(|t| t.color.as_str())
        .unwrap_or(DEFAULT_TAG_COLOR)
}

fn tag_badges(names: &[String], tags: &[Tag]) -> String {
    names
        .iter()
        .map(|name| {
            format!(
                r#"<span class="tag-badge" style="background-color: {};">{}</span>"#,
                tag_color(tags, name),
                escape_html(name)
            )
        })
        .collect()
}

fn area_badge(area: Option<&str>, areas: &[Area]) -> String {
    match area {
        Some(name) => format!(
            r#"<span class="area-badge" style="background-color: {};">{}</span>"#,
            area_color(areas, name),
            escape_html(name)
        ),
        None => String::new(),
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

/// Counters, by-area breakdown, top-10 tag cloud (server order), recent
/// feed.
pub fn dashboard(
    stats: &Statistics,
    recent: &[Note],
    areas: &[Area],
    tags: &[Tag],
    now: NaiveDateTime,
) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        concat!(
            r#"<div class="stat-card"><div class="stat-value">{}</div>"#,
            r#"<div class="stat-label">Total Notes</div></div>"#,
            r#"<div class="stat-card"><div class="stat-value">{}</div>"#,
            r#"<div class="stat-label">This Week</div></div>"#,
            r#"<div class="stat-card"><div class="stat-value">{}</div>"#,
            r#"<div class="stat-label">This Month</div></div>"#,
        ),
        stats.total_notes, stats.notes_this_week, stats.notes_this_month
    ));

    out.push_str(r#"<div class="stat-card"><div class="stat-label">Notes by Area</div><div class="stat-breakdown">"#);
    for (name, count) in stats.notes_by_area.iter() {
        out.push_str(&format!(
            concat!(
                r#"<div class="stat-item">"#,
                r#"<span class="color-swatch" style="background-color: {};"></span>"#,
                "<span>{}: {}</span></div>"
            ),
            area_color(areas, name),
            escape_html(name),
            count
        ));
    }
    out.push_str("</div></div>");

    out.push_str(r#"<div class="stat-card"><div class="stat-label">Top Tags</div><div class="tag-cloud">"#);
    for (name, count) in stats.notes_by_tag.iter().take(TAG_CLOUD_LIMIT) {
        out.push_str(&format!(
            r#"<span class="tag-badge" style="background-color: {};">{} ({})</span>"#,
            tag_color(tags, name),
            escape_html(name),
            count
        ));
    }
    out.push_str("</div></div>");

    if recent.is_empty() {
        out.push_str(r#"<div class="empty-state"><p>No notes yet. Create your first note!</p></div>"#);
    } else {
        for note in recent {
            out.push_str(&format!(
                concat!(
                    r#"<div class="note-card" data-note-id="{}">"#,
                    r#"<div class="note-card-title">{}</div>"#,
                    "{}",
                    r#"<div class="note-card-tags">{}</div>"#,
                    r#"<div class="note-card-timestamp">{}</div></div>"#
                ),
                note.id,
                escape_html(&note.title),
                area_badge(note.area.as_deref(), areas),
                tag_badges(&note.tags, tags),
                format_relative(note.created_at, now)
            ));
        }
    }

    out
}

fn note_list_item(
    note: &Note,
    areas: &[Area],
    tags: &[Tag],
    active: bool,
    now: NaiveDateTime,
) -> String {
    let plain = crate::convert::plain_text(&note.html_content);
    let snippet = clip(&plain, LIST_SNIPPET_LEN);
    format!(
        concat!(
            r#"<div class="note-list-item{}" data-note-id="{}">"#,
            r#"<div class="note-list-item-header">"#,
            r#"<div class="note-list-item-title">{}</div>{}</div>"#,
            r#"<div class="note-list-item-snippet">{}</div>"#,
            r#"<div class="note-list-item-footer">"#,
            r#"<div class="note-list-item-tags">{}</div>"#,
            r#"<div class="note-list-item-timestamp">{}</div></div></div>"#
        ),
        if active { " is-active" } else { "" },
        note.id,
        escape_html(&note.title),
        area_badge(note.area.as_deref(), areas),
        escape_html(&snippet),
        tag_badges(&note.tags, tags),
        format_relative(note.created_at, now)
    )
}

pub fn notes_list(
    notes: &[Note],
    areas: &[Area],
    tags: &[Tag],
    current_note_id: Option<i64>,
    now: NaiveDateTime,
) -> String {
    if notes.is_empty() {
        return r#"<div class="empty-state"><p>No notes found. Try adjusting your filters or create a new note.</p></div>"#
            .to_string();
    }
    notes
        .iter()
        .map(|note| note_list_item(note, areas, tags, current_note_id == Some(note.id), now))
        .collect()
}

/// Search results with highlighted titles and keyword-context snippets,
/// under a result-count header.
pub fn search_results(
    results: &[SearchResult],
    keyword: &str,
    areas: &[Area],
    tags: &[Tag],
    now: NaiveDateTime,
) -> String {
    if results.is_empty() {
        return format!(
            concat!(
                r#"<div class="empty-state"><h3>No results found</h3>"#,
                r#"<p>No notes match your search for "{}"</p></div>"#
            ),
            escape_html(keyword)
        );
    }

    let mut out = format!(
        r#"<div class="search-info">Found {} result{} for "{}"</div>"#,
        results.len(),
        plural(results.len()),
        escape_html(keyword)
    );

    for hit in results {
        let snippet = match &hit.html_content {
            Some(html) => search_snippet(html, keyword, SNIPPET_MAX_LEN),
            None => highlight(&hit.snippet, keyword),
        };
        out.push_str(&format!(
            concat!(
                r#"<div class="note-list-item search-result" data-note-id="{}">"#,
                r#"<div class="note-list-item-header">"#,
                r#"<div class="note-list-item-title">{}</div>{}</div>"#,
                r#"<div class="note-list-item-snippet search-snippet">{}</div>"#,
                r#"<div class="note-list-item-footer">"#,
                r#"<div class="note-list-item-tags">{}</div>"#,
                r#"<div class="note-list-item-timestamp">{}</div></div></div>"#
            ),
            hit.id,
            highlight(&hit.title, keyword),
            area_badge(hit.area.as_deref(), areas),
            snippet,
            tag_badges(&hit.tags, tags),
            format_relative(hit.created_at, now)
        ));
    }

    out
}

/// Notes filtered to one calendar day, with a "Show All Notes" escape.
pub fn date_filtered(
    notes: &[Note],
    date: chrono::NaiveDate,
    areas: &[Area],
    tags: &[Tag],
    now: NaiveDateTime,
) -> String {
    let mut out = format!(
        concat!(
            r#"<div class="search-info">Notes from {} ({} note{})"#,
            r#" <button class="btn">Show All Notes</button></div>"#
        ),
        date.format("%B %-d, %Y"),
        notes.len(),
        plural(notes.len())
    );
    for note in notes {
        out.push_str(&note_list_item(note, areas, tags, false, now));
    }
    out
}

/// Flat settings lists with color swatches.
pub fn settings_lists(areas: &[Area], tags: &[Tag]) -> String {
    let mut out = String::from(r#"<div class="settings-section"><h3>Areas</h3>"#);
    for area in areas {
        out.push_str(&format!(
            concat!(
                r#"<div class="settings-item">"#,
                r#"<span class="color-swatch" style="background-color: {};"></span>"#,
                "<span>{}</span></div>"
            ),
            area.color,
            escape_html(&area.name)
        ));
    }
    out.push_str(r#"</div><div class="settings-section"><h3>Tags</h3>"#);
    for tag in tags {
        out.push_str(&format!(
            concat!(
                r#"<div class="settings-item">"#,
                r#"<span class="color-swatch" style="background-color: {};"></span>"#,
                "<span>{}</span></div>"
            ),
            tag.color,
            escape_html(&tag.name)
        ));
    }
    out.push_str("</div>");
    out
}
