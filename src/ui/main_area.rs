use chrono::{Datelike, NaiveDate, NaiveDateTime};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Widget};

use crate::app::calendar::{CalendarLayout, CalendarState};
use crate::app::{AppState, InputMode, PromptKind, View};
use crate::editor::{Editor, EditorMode};
use crate::render;

use super::markup;

pub struct MainArea<'a> {
    pub state: &'a AppState,
    pub editor: &'a Editor,
    pub calendar: &'a CalendarState,
    pub now: NaiveDateTime,
}

impl Widget for MainArea<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let lines = self.content_lines();
        Paragraph::new(lines)
            .block(Block::default().borders(Borders::TOP))
            .render(area, buf);
    }
}

impl MainArea<'_> {
    fn content_lines(&self) -> Vec<Line<'static>> {
        // The draft-tag prompt interrupts editing without leaving it.
        if matches!(
            self.state.input_mode,
            InputMode::Edit | InputMode::Prompt(PromptKind::DraftTag)
        ) {
            return self.editor_lines();
        }
        match self.state.view {
            View::Dashboard => markup::lines(&render::dashboard(
                self.state.stats.as_ref().unwrap_or(&Default::default()),
                &self.state.recent,
                &self.state.areas,
                &self.state.tags,
                self.now,
            )),
            View::Notes => self.notes_lines(),
            View::Calendar => self.calendar_lines(),
            View::Settings => markup::lines(&render::settings_lists(
                &self.state.areas,
                &self.state.tags,
            )),
        }
    }

    fn notes_lines(&self) -> Vec<Line<'static>> {
        if let Some((keyword, response)) = &self.state.search_results {
            return markup::lines(&render::search_results(
                &response.results,
                keyword,
                &self.state.areas,
                &self.state.tags,
                self.now,
            ));
        }
        if let Some(date) = self.state.date_filter {
            let filtered = crate::app::calendar::notes_created_on(&self.state.notes, date);
            return markup::lines(&render::date_filtered(
                &filtered,
                date,
                &self.state.areas,
                &self.state.tags,
                self.now,
            ));
        }
        markup::lines(&render::notes_list(
            &self.state.notes,
            &self.state.areas,
            &self.state.tags,
            self.state.current_note_id,
            self.now,
        ))
    }

    fn editor_lines(&self) -> Vec<Line<'static>> {
        let mode_label = match self.editor.mode() {
            EditorMode::RichText => "rich text (preview)",
            EditorMode::Markdown => "markdown",
        };
        let mut lines = vec![Line::from(Span::styled(
            format!("── editing: {} ──", mode_label),
            Style::default().fg(Color::DarkGray),
        ))];

        match self.editor.mode() {
            EditorMode::RichText => {
                lines.extend(markup::lines(&self.editor.content().html));
            }
            EditorMode::Markdown => {
                let text = self.editor.buffer.to_string();
                let (cursor_line, cursor_col) = self.editor.buffer.cursor_position();
                for (i, raw) in text.split('\n').enumerate() {
                    if i == cursor_line {
                        lines.push(line_with_cursor(raw, cursor_col));
                    } else {
                        lines.push(Line::from(raw.to_string()));
                    }
                }
            }
        }
        lines
    }

    fn calendar_lines(&self) -> Vec<Line<'static>> {
        let cal = self.calendar;
        let month_start = match NaiveDate::from_ymd_opt(cal.year, cal.month, 1) {
            Some(d) => d,
            None => return vec![Line::from("invalid month")],
        };
        let mut lines = vec![Line::from(Span::styled(
            month_start.format("%B %Y").to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ))];

        match cal.layout {
            CalendarLayout::Grid => {
                lines.push(Line::from(Span::styled(
                    " Mo  Tu  We  Th  Fr  Sa  Su",
                    Style::default().fg(Color::DarkGray),
                )));
                let mut spans: Vec<Span<'static>> = Vec::new();
                let lead = month_start.weekday().num_days_from_monday() as usize;
                for _ in 0..lead {
                    spans.push(Span::raw("    "));
                }
                let mut day = month_start;
                while day.month() == cal.month {
                    let events = cal.events.iter().filter(|e| e.date == day).count();
                    let style = if events > 0 {
                        Style::default()
                            .fg(Color::Cyan)
                            .add_modifier(Modifier::BOLD)
                    } else {
                        Style::default()
                    };
                    spans.push(Span::styled(format!("{:>3} ", day.day()), style));
                    if day.weekday().num_days_from_monday() == 6 {
                        lines.push(Line::from(std::mem::take(&mut spans)));
                    }
                    day = match day.succ_opt() {
                        Some(d) => d,
                        None => break,
                    };
                }
                if !spans.is_empty() {
                    lines.push(Line::from(spans));
                }
                lines.push(Line::from(""));
            }
            CalendarLayout::List => {}
        }

        if cal.events.is_empty() {
            lines.push(Line::from(Span::styled(
                "no notes this month",
                Style::default().fg(Color::DarkGray),
            )));
        }
        for (i, event) in cal.events.iter().enumerate() {
            let color = markup::parse_hex_color(&event.color).unwrap_or(Color::Blue);
            let mut style = Style::default().fg(color);
            if i == cal.selected {
                style = style.add_modifier(Modifier::REVERSED);
            }
            lines.push(Line::from(vec![
                Span::styled(event.date.format("%b %-d  ").to_string(), style),
                Span::styled(event.title.clone(), style),
            ]));
        }
        lines
    }
}

fn line_with_cursor(raw: &str, col: usize) -> Line<'static> {
    let chars: Vec<char> = raw.chars().collect();
    let before: String = chars.iter().take(col).collect();
    let at: String = chars.get(col).map(|c| c.to_string()).unwrap_or(" ".into());
    let after: String = chars.iter().skip(col + 1).collect();
    Line::from(vec![
        Span::raw(before),
        Span::styled(at, Style::default().add_modifier(Modifier::REVERSED)),
        Span::raw(after),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::calendar::CalendarEvent;
    use crate::config::Theme;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn buffer_text(widget: MainArea<'_>, width: u16, height: u16) -> String {
        let area = Rect::new(0, 0, width, height);
        let mut buf = Buffer::empty(area);
        widget.render(area, &mut buf);
        let mut text = String::new();
        for y in 0..height {
            for x in 0..width {
                text.push_str(buf.cell((x, y)).unwrap().symbol());
            }
            text.push('\n');
        }
        text
    }

    #[tokio::test]
    async fn empty_notes_view_shows_empty_state() {
        let mut state = AppState::new(Theme::Light);
        state.view = View::Notes;
        let editor = Editor::new(Theme::Light);
        let cal = CalendarState::new(now().date(), 120);

        let text = buffer_text(
            MainArea {
                state: &state,
                editor: &editor,
                calendar: &cal,
                now: now(),
            },
            80,
            10,
        );
        assert!(text.contains("No notes found"));
    }

    #[tokio::test]
    async fn markdown_editor_shows_buffer_and_mode() {
        let mut state = AppState::new(Theme::Light);
        state.input_mode = InputMode::Edit;
        let mut editor = Editor::new(Theme::Light);
        editor.toggle_mode();
        editor.buffer.insert_str("# Title");
        let cal = CalendarState::new(now().date(), 120);

        let text = buffer_text(
            MainArea {
                state: &state,
                editor: &editor,
                calendar: &cal,
                now: now(),
            },
            60,
            8,
        );
        assert!(text.contains("editing: markdown"));
        assert!(text.contains("# Title"));
    }

    #[tokio::test]
    async fn calendar_grid_names_the_month() {
        let mut state = AppState::new(Theme::Light);
        state.view = View::Calendar;
        let editor = Editor::new(Theme::Light);
        let mut cal = CalendarState::new(now().date(), 120);
        cal.set_events(vec![CalendarEvent {
            note_id: 1,
            title: "standup notes".into(),
            date: now().date(),
            color: "#3b82f6".into(),
        }]);

        let text = buffer_text(
            MainArea {
                state: &state,
                editor: &editor,
                calendar: &cal,
                now: now(),
            },
            80,
            14,
        );
        assert!(text.contains("March 2024"));
        assert!(text.contains("standup notes"));
    }

    #[tokio::test]
    async fn narrow_calendar_skips_the_grid() {
        let mut state = AppState::new(Theme::Light);
        state.view = View::Calendar;
        let editor = Editor::new(Theme::Light);
        let mut cal = CalendarState::new(now().date(), 80);
        cal.resize(80);

        let text = buffer_text(
            MainArea {
                state: &state,
                editor: &editor,
                calendar: &cal,
                now: now(),
            },
            80,
            10,
        );
        assert!(text.contains("March 2024"));
        assert!(!text.contains("Mo  Tu"));
    }
}
