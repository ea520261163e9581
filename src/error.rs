use std::fmt;

#[derive(Debug)]
pub enum NoteError {
    Api { status: u16, detail: String },
    Http(reqwest::Error),
    Config(String),
    Io(std::io::Error),
    Json(serde_json::Error),
    TomlDe(toml::de::Error),
}

impl fmt::Display for NoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Api { status, detail } => write!(f, "API error ({}): {}", status, detail),
            Self::Http(e) => write!(f, "HTTP error: {}", e),
            Self::Config(msg) => write!(f, "Config error: {}", msg),
            Self::Io(e) => write!(f, "IO error: {}", e),
            Self::Json(e) => write!(f, "JSON error: {}", e),
            Self::TomlDe(e) => write!(f, "TOML parse error: {}", e),
        }
    }
}

impl std::error::Error for NoteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http(e) => Some(e),
            Self::Io(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::TomlDe(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for NoteError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e)
    }
}

impl From<std::io::Error> for NoteError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for NoteError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

impl From<toml::de::Error> for NoteError {
    fn from(e: toml::de::Error) -> Self {
        Self::TomlDe(e)
    }
}

pub type Result<T> = std::result::Result<T, NoteError>;

/// Structured error data for the message channel
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorInfo {
    Api { status: u16, body: String },
    Network(String),
    Save(String),
}

impl ErrorInfo {
    pub fn from_note_error(e: &NoteError) -> Self {
        match e {
            NoteError::Api { status, detail } => ErrorInfo::Api {
                status: *status,
                body: detail.clone(),
            },
            _ => ErrorInfo::Network(e.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Transient user-visible notification. Failures degrade the specific
/// view or action, never the session, so this is the whole error surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
}

impl Toast {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Info,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Success,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Error,
            message: message.into(),
        }
    }

    pub fn from_error_info(info: &ErrorInfo) -> Self {
        match info {
            ErrorInfo::Api { status, body } => {
                let detail = extract_detail(body).unwrap_or_else(|| truncate(body, 80));
                if detail.is_empty() {
                    Self::error(format!("Request failed ({})", status))
                } else {
                    Self::error(detail)
                }
            }
            ErrorInfo::Network(msg) => Self::error(truncate(msg, 80)),
            ErrorInfo::Save(msg) => Self::error(format!("Save failed: {}", truncate(msg, 80))),
        }
    }
}

/// The backend reports structured errors as `{"detail": "..."}`.
pub fn extract_detail(body: &str) -> Option<String> {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("detail")?.as_str().map(String::from))
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_displays_status_and_detail() {
        let err = NoteError::Api {
            status: 404,
            detail: "Note not found".into(),
        };
        assert_eq!(err.to_string(), "API error (404): Note not found");
    }

    #[test]
    fn config_error_displays_message() {
        let err = NoteError::Config("missing base_url".into());
        assert!(err.to_string().contains("missing base_url"));
    }

    #[test]
    fn io_error_converts_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: NoteError = io_err.into();
        assert!(matches!(err, NoteError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn json_error_converts_from_serde() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid").unwrap_err();
        let err: NoteError = json_err.into();
        assert!(matches!(err, NoteError::Json(_)));
    }

    #[test]
    fn toml_error_converts_from_toml_de() {
        let toml_err = toml::from_str::<toml::Value>("= invalid").unwrap_err();
        let err: NoteError = toml_err.into();
        assert!(matches!(err, NoteError::TomlDe(_)));
    }

    #[test]
    fn extract_detail_from_json_body() {
        assert_eq!(
            extract_detail(r#"{"detail":"Area already exists"}"#),
            Some("Area already exists".into())
        );
    }

    #[test]
    fn extract_detail_from_plain_text_is_none() {
        assert_eq!(extract_detail("internal server error"), None);
    }

    #[test]
    fn toast_from_api_error_prefers_detail() {
        let info = ErrorInfo::Api {
            status: 409,
            body: r#"{"detail":"Tag already exists"}"#.into(),
        };
        let toast = Toast::from_error_info(&info);
        assert_eq!(toast.level, ToastLevel::Error);
        assert_eq!(toast.message, "Tag already exists");
    }

    #[test]
    fn toast_from_api_error_falls_back_to_body() {
        let info = ErrorInfo::Api {
            status: 502,
            body: "bad gateway".into(),
        };
        let toast = Toast::from_error_info(&info);
        assert_eq!(toast.message, "bad gateway");
    }

    #[test]
    fn toast_from_api_error_with_empty_body_names_status() {
        let info = ErrorInfo::Api {
            status: 500,
            body: "".into(),
        };
        let toast = Toast::from_error_info(&info);
        assert_eq!(toast.message, "Request failed (500)");
    }

    #[test]
    fn toast_from_network_error() {
        let info = ErrorInfo::Network("connection refused".into());
        let toast = Toast::from_error_info(&info);
        assert_eq!(toast.message, "connection refused");
    }

    #[test]
    fn toast_from_save_error() {
        let info = ErrorInfo::Save("timeout".into());
        let toast = Toast::from_error_info(&info);
        assert_eq!(toast.message, "Save failed: timeout");
    }

    #[test]
    fn toast_truncates_long_message() {
        let info = ErrorInfo::Network("a".repeat(120));
        let toast = Toast::from_error_info(&info);
        assert!(toast.message.len() <= 83); // 80 + "..."
        assert!(toast.message.ends_with("..."));
    }

    #[test]
    fn error_info_from_note_api_error() {
        let err = NoteError::Api {
            status: 404,
            detail: "missing".into(),
        };
        match ErrorInfo::from_note_error(&err) {
            ErrorInfo::Api { status, body } => {
                assert_eq!(status, 404);
                assert_eq!(body, "missing");
            }
            other => panic!("Expected ErrorInfo::Api, got {:?}", other),
        }
    }

    #[test]
    fn error_info_from_config_error_becomes_network() {
        let err = NoteError::Config("bad config".into());
        assert!(matches!(
            ErrorInfo::from_note_error(&err),
            ErrorInfo::Network(_)
        ));
    }
}
