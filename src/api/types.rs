use std::fmt;

use chrono::NaiveDateTime;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Note {
    pub id: i64,
    pub title: String,
    pub html_content: String,
    #[serde(default)]
    pub plaintext: Option<String>,
    #[serde(default)]
    pub markdown_content: Option<String>,
    #[serde(default)]
    pub area: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: NaiveDateTime,
    pub modified_at: NaiveDateTime,
}

/// Payload for creating or updating a note. The server derives nothing:
/// title and both content representations are supplied by the client.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NoteDraft {
    pub title: String,
    pub html_content: String,
    pub markdown_content: String,
    pub area: Option<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct NotesPage {
    #[serde(default)]
    pub notes: Vec<Note>,
    #[serde(default)]
    pub total: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Area {
    pub name: String,
    #[serde(default = "default_area_color")]
    pub color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tag {
    pub name: String,
    #[serde(default = "default_tag_color")]
    pub color: String,
}

pub fn default_area_color() -> String {
    "#3b82f6".to_string()
}

pub fn default_tag_color() -> String {
    "#10b981".to_string()
}

/// The list endpoints answer either a bare array or a wrapped object
/// (`{"areas": [...]}` / `{"tags": [...]}`), depending on server version.
pub fn unwrap_list<T: serde::de::DeserializeOwned>(
    value: serde_json::Value,
    key: &str,
) -> Vec<T> {
    let inner = match value {
        serde_json::Value::Array(_) => value,
        serde_json::Value::Object(mut map) => match map.remove(key) {
            Some(v) => v,
            None => return Vec::new(),
        },
        _ => return Vec::new(),
    };
    serde_json::from_value(inner).unwrap_or_default()
}

/// Count breakdown whose entry order matters for display. JSON objects
/// carry no order guarantee in most decoders, so this deserializes the
/// map entries in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CountList(pub Vec<(String, u64)>);

impl CountList {
    pub fn iter(&self) -> std::slice::Iter<'_, (String, u64)> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for CountList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CountVisitor;

        impl<'de> Visitor<'de> for CountVisitor {
            type Value = CountList;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of names to counts")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, count)) = access.next_entry::<String, u64>()? {
                    entries.push((name, count));
                }
                Ok(CountList(entries))
            }
        }

        deserializer.deserialize_map(CountVisitor)
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Statistics {
    #[serde(default)]
    pub total_notes: u64,
    #[serde(default)]
    pub notes_by_area: CountList,
    #[serde(default)]
    pub notes_by_tag: CountList,
    #[serde(default)]
    pub notes_this_week: u64,
    #[serde(default)]
    pub notes_this_month: u64,
}

/// Lightweight note projection in calendar buckets.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CalendarNote {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub area: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// `{"calendar_data": {"2024-03-15": [note, ...], ...}}`
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct CalendarResponse {
    #[serde(default)]
    pub calendar_data: std::collections::HashMap<String, Vec<CalendarNote>>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SearchRequest {
    pub keyword: String,
    pub area: Option<String>,
    pub tags: Vec<String>,
    pub search_in: Vec<String>,
}

impl SearchRequest {
    pub fn new(keyword: impl Into<String>, area: Option<String>, tags: Vec<String>) -> Self {
        Self {
            keyword: keyword.into(),
            area,
            tags,
            search_in: vec!["title".to_string(), "content".to_string()],
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SearchResult {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub snippet: String,
    #[serde(default)]
    pub html_content: Option<String>,
    #[serde(default)]
    pub area: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<SearchResult>,
    #[serde(default)]
    pub total: u64,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct UploadResponse {
    pub location: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Html,
    Markdown,
}

impl ExportFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Markdown => "markdown",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Markdown => "md",
        }
    }
}

/// Query parameters for the notes listing endpoint. Selected tags are
/// comma-joined into a single `tags` parameter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoteQuery {
    pub limit: u32,
    pub offset: u32,
    pub area: Option<String>,
    pub tags: Vec<String>,
}

impl NoteQuery {
    pub fn page(limit: u32, offset: u32) -> Self {
        Self {
            limit,
            offset,
            ..Self::default()
        }
    }

    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("limit", self.limit.to_string()),
            ("offset", self.offset.to_string()),
        ];
        if let Some(area) = &self.area {
            if !area.is_empty() {
                params.push(("area", area.clone()));
            }
        }
        if !self.tags.is_empty() {
            params.push(("tags", self.tags.join(",")));
        }
        params
    }
}
