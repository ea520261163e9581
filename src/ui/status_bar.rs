use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Widget;

use crate::app::{InputMode, PromptKind};
use crate::error::{Toast, ToastLevel};

pub struct StatusBar<'a> {
    pub input_mode: InputMode,
    pub toast: Option<&'a Toast>,
    pub saving: bool,
    pub search_input: &'a str,
    pub prompt_input: &'a str,
}

fn hints_for(mode: InputMode) -> &'static [(&'static str, &'static str)] {
    match mode {
        InputMode::Browse => &[
            ("q", "quit"),
            ("/", "search"),
            ("n", "new"),
            ("e", "edit"),
            ("t", "theme"),
            ("Enter", "open"),
        ],
        InputMode::Search | InputMode::Prompt(_) => &[("Enter", "confirm"), ("Esc", "cancel")],
        InputMode::Edit => &[
            ("Ctrl+S", "save"),
            ("Ctrl+E", "mode"),
            ("Ctrl+T", "tags"),
            ("Esc", "done"),
        ],
    }
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if let Some(toast) = self.toast {
            let color = match toast.level {
                ToastLevel::Info => Color::Cyan,
                ToastLevel::Success => Color::Green,
                ToastLevel::Warning => Color::Yellow,
                ToastLevel::Error => Color::Red,
            };
            Line::from(Span::styled(
                format!(" {} ", toast.message),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ))
            .render(area, buf);
            return;
        }

        if self.input_mode == InputMode::Search {
            Line::from(vec![
                Span::styled(" / ", Style::default().fg(Color::Cyan)),
                Span::raw(self.search_input.to_string()),
                Span::styled("▏", Style::default().fg(Color::Cyan)),
            ])
            .render(area, buf);
            return;
        }

        if let InputMode::Prompt(kind) = self.input_mode {
            let label = match kind {
                PromptKind::NewArea => " new area: ",
                PromptKind::NewTag => " new tag: ",
                PromptKind::FilterArea => " filter area: ",
                PromptKind::FilterTag => " filter tag: ",
                PromptKind::DraftTag => " note tag: ",
            };
            Line::from(vec![
                Span::styled(label, Style::default().fg(Color::Cyan)),
                Span::raw(self.prompt_input.to_string()),
                Span::styled("▏", Style::default().fg(Color::Cyan)),
            ])
            .render(area, buf);
            return;
        }

        let mut spans = vec![Span::raw(" ")];
        if self.saving {
            spans.push(Span::styled(
                "saving… ",
                Style::default().fg(Color::Yellow),
            ));
        }
        for (i, (key, action)) in hints_for(self.input_mode).iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled("  ", Style::default().fg(Color::DarkGray)));
            }
            spans.push(Span::styled(
                format!("[{}]", key),
                Style::default().fg(Color::Cyan),
            ));
            spans.push(Span::styled(
                action.to_string(),
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::DIM),
            ));
        }
        Line::from(spans).render(area, buf);
    }
}
