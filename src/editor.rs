//! Dual-mode note editor: a rich-text surface backed by an async-loaded
//! engine, and a raw markdown surface backed by an [`EditBuffer`]. One
//! logical payload, two representations; conversions happen on mode
//! toggle and on read.

use tokio::sync::watch;

use crate::config::Theme;
use crate::convert::{to_html, to_markdown};
use crate::edit_buffer::EditBuffer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditorMode {
    #[default]
    RichText,
    Markdown,
}

/// Both representations of the editor payload.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorContent {
    pub html: String,
    pub markdown: String,
}

/// Content captured off the visible surface before an engine teardown,
/// restored verbatim after the rebuild completes.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedSurface {
    pub mode: EditorMode,
    pub html: String,
    pub markdown: String,
}

/// The rich-text engine value. Construction is asynchronous: `load`
/// returns immediately and readiness is signalled exactly once over a
/// watch channel, which callers await instead of polling.
#[derive(Debug)]
pub struct RichEngine {
    theme: Theme,
    ready_rx: watch::Receiver<bool>,
}

impl RichEngine {
    pub fn load(theme: Theme) -> Self {
        let (ready_tx, ready_rx) = watch::channel(false);
        tokio::spawn(async move {
            // Engine asset setup happens off the loop; the channel
            // resolves once regardless of how long it takes.
            let _ = ready_tx.send(true);
        });
        Self { theme, ready_rx }
    }

    pub async fn ready(&mut self) {
        while !*self.ready_rx.borrow() {
            if self.ready_rx.changed().await.is_err() {
                break;
            }
        }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }
}

#[derive(Debug)]
pub struct Editor {
    mode: EditorMode,
    engine: RichEngine,
    /// Rich surface content.
    html: String,
    /// Markdown surface.
    pub buffer: EditBuffer,
}

impl Editor {
    pub fn new(theme: Theme) -> Self {
        Self {
            mode: EditorMode::RichText,
            engine: RichEngine::load(theme),
            html: String::new(),
            buffer: EditBuffer::new_empty(),
        }
    }

    pub async fn ready(&mut self) {
        self.engine.ready().await;
    }

    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    pub fn theme(&self) -> Theme {
        self.engine.theme()
    }

    /// Converts the active surface into the other and switches modes.
    pub fn toggle_mode(&mut self) {
        match self.mode {
            EditorMode::RichText => {
                self.buffer = EditBuffer::new(&to_markdown(&self.html));
                self.mode = EditorMode::Markdown;
            }
            EditorMode::Markdown => {
                self.html = to_html(&self.buffer.to_string());
                self.mode = EditorMode::RichText;
            }
        }
    }

    /// Both representations, derived from whichever surface is live.
    pub fn content(&self) -> EditorContent {
        match self.mode {
            EditorMode::RichText => EditorContent {
                html: self.html.clone(),
                markdown: to_markdown(&self.html),
            },
            EditorMode::Markdown => {
                let markdown = self.buffer.to_string();
                EditorContent {
                    html: to_html(&markdown),
                    markdown,
                }
            }
        }
    }

    /// Writes the stored pair into the active surface only; the other
    /// surface is re-derived on the next toggle or read.
    pub fn set_content(&mut self, html: &str, markdown: &str) {
        match self.mode {
            EditorMode::RichText => self.html = html.to_string(),
            EditorMode::Markdown => self.buffer = EditBuffer::new(markdown),
        }
    }

    /// Empties both surfaces and returns to rich-text mode.
    pub fn clear(&mut self) {
        self.html.clear();
        self.buffer = EditBuffer::new_empty();
        self.mode = EditorMode::RichText;
    }

    fn capture(&self) -> CapturedSurface {
        CapturedSurface {
            mode: self.mode,
            html: self.html.clone(),
            markdown: self.buffer.to_string(),
        }
    }

    fn restore(&mut self, captured: CapturedSurface) {
        self.mode = captured.mode;
        self.html = captured.html;
        self.buffer = EditBuffer::new(&captured.markdown);
    }

    /// Re-theming tears the engine down and rebuilds it. The visible
    /// content is captured before teardown and restored only after the
    /// new engine reports ready.
    pub async fn set_theme(&mut self, theme: Theme) {
        if self.engine.theme() == theme {
            return;
        }
        let captured = self.capture();
        self.engine = RichEngine::load(theme);
        self.engine.ready().await;
        self.restore(captured);
    }
}
