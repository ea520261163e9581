use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::error::{NoteError, Result};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct UiConfig {
    #[serde(default = "default_theme")]
    pub theme: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            theme: default_theme(),
        }
    }
}

fn default_theme() -> String {
    "light".into()
}

/// The single persisted client preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn from_name(name: &str) -> Self {
        match name {
            "dark" => Self::Dark,
            _ => Self::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

impl AppConfig {
    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        let config: AppConfig = Figment::new()
            .merge(Serialized::defaults(AppConfig::defaults()))
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("NOTEKEEP_").split("__"))
            .extract()
            .map_err(|e| NoteError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.base_url.is_empty() {
            return Err(NoteError::Config(
                "server.base_url is required (set in config or NOTEKEEP_SERVER__BASE_URL env var)"
                    .into(),
            ));
        }
        if !self.server.base_url.starts_with("http://")
            && !self.server.base_url.starts_with("https://")
        {
            return Err(NoteError::Config(
                "server.base_url must start with http:// or https://".into(),
            ));
        }
        match self.ui.theme.as_str() {
            "light" | "dark" => Ok(()),
            other => Err(NoteError::Config(format!(
                "ui.theme must be \"light\" or \"dark\", got \"{}\"",
                other
            ))),
        }
    }

    pub fn theme(&self) -> Theme {
        Theme::from_name(&self.ui.theme)
    }

    pub fn config_dir() -> Option<PathBuf> {
        std::env::var("XDG_CONFIG_HOME")
            .ok()
            .map(|xdg| PathBuf::from(xdg).join("notekeep"))
            .or_else(|| {
                directories::BaseDirs::new()
                    .map(|dirs| dirs.home_dir().join(".config").join("notekeep"))
            })
    }

    pub fn write_default(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = r#"[server]
base_url = "http://localhost:8000"

[ui]
theme = "light"  # light | dark
"#;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Persists the theme toggle back to the config file, keeping the
    /// rest of the on-disk settings intact.
    pub fn save_theme(path: &Path, theme: Theme) -> Result<()> {
        let mut doc: toml::Table = if path.exists() {
            toml::from_str(&std::fs::read_to_string(path)?)?
        } else {
            toml::Table::new()
        };

        let ui = doc
            .entry("ui")
            .or_insert_with(|| toml::Value::Table(toml::Table::new()));
        match ui {
            toml::Value::Table(table) => {
                table.insert(
                    "theme".to_string(),
                    toml::Value::String(theme.as_str().to_string()),
                );
            }
            _ => {
                return Err(NoteError::Config(
                    "config [ui] section is not a table".into(),
                ))
            }
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(&doc).map_err(|e| {
            NoteError::Config(format!("could not serialize config: {}", e))
        })?)?;
        Ok(())
    }

    fn defaults() -> Self {
        Self {
            server: ServerConfig {
                base_url: String::new(),
            },
            ui: UiConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join("config.toml");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn loads_valid_config_from_toml() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(
            tmp.path(),
            r#"
[server]
base_url = "http://localhost:8000"

[ui]
theme = "dark"
"#,
        );

        let config = AppConfig::load_from_path(&path).unwrap();
        assert_eq!(config.server.base_url, "http://localhost:8000");
        assert_eq!(config.ui.theme, "dark");
        assert_eq!(config.theme(), Theme::Dark);
    }

    #[test]
    fn theme_defaults_to_light() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(
            tmp.path(),
            r#"
[server]
base_url = "http://localhost:8000"
"#,
        );

        let config = AppConfig::load_from_path(&path).unwrap();
        assert_eq!(config.theme(), Theme::Light);
    }

    #[test]
    fn validate_fails_without_base_url() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(
            tmp.path(),
            r#"
[server]
base_url = ""
"#,
        );

        let err = AppConfig::load_from_path(&path).unwrap_err();
        assert!(err.to_string().contains("base_url"));
    }

    #[test]
    fn validate_rejects_non_http_url() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(
            tmp.path(),
            r#"
[server]
base_url = "localhost:8000"
"#,
        );

        let err = AppConfig::load_from_path(&path).unwrap_err();
        assert!(err.to_string().contains("http"));
    }

    #[test]
    fn validate_rejects_unknown_theme() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(
            tmp.path(),
            r#"
[server]
base_url = "http://localhost:8000"

[ui]
theme = "solarized"
"#,
        );

        let err = AppConfig::load_from_path(&path).unwrap_err();
        assert!(err.to_string().contains("theme"));
    }

    #[test]
    fn write_default_then_load_fails_only_on_validation() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("config.toml");
        AppConfig::write_default(&path).unwrap();

        let config = AppConfig::load_from_path(&path).unwrap();
        assert_eq!(config.server.base_url, "http://localhost:8000");
        assert_eq!(config.ui.theme, "light");
    }

    #[test]
    fn save_theme_persists_toggle_and_keeps_server_section() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(
            tmp.path(),
            r#"
[server]
base_url = "http://localhost:8000"

[ui]
theme = "light"
"#,
        );

        AppConfig::save_theme(&path, Theme::Dark).unwrap();

        let config = AppConfig::load_from_path(&path).unwrap();
        assert_eq!(config.theme(), Theme::Dark);
        assert_eq!(config.server.base_url, "http://localhost:8000");
    }

    #[test]
    fn save_theme_creates_missing_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");

        AppConfig::save_theme(&path, Theme::Dark).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("theme = \"dark\""));
    }

    #[test]
    fn theme_round_trips_names_and_toggles() {
        assert_eq!(Theme::from_name("dark"), Theme::Dark);
        assert_eq!(Theme::from_name("light"), Theme::Light);
        assert_eq!(Theme::from_name("anything-else"), Theme::Light);
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!(Theme::Dark.toggled().as_str(), "light");
    }
}
