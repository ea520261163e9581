use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Widget;

use crate::app::View;

pub struct Header<'a> {
    pub view: View,
    pub selected_areas: &'a [String],
    pub selected_tags: &'a [String],
    pub theme: &'a str,
}

impl Widget for Header<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut spans = vec![Span::styled(
            " notekeep ",
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )];

        for (view, label) in [
            (View::Dashboard, " [1] Dashboard "),
            (View::Notes, " [2] Notes "),
            (View::Calendar, " [3] Calendar "),
            (View::Settings, " [4] Settings "),
        ] {
            let style = if view == self.view {
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            spans.push(Span::styled(label, style));
        }

        let mut filters = Vec::new();
        for area in self.selected_areas {
            filters.push(format!("area:{}", area));
        }
        for tag in self.selected_tags {
            filters.push(format!("#{}", tag));
        }
        if !filters.is_empty() {
            spans.push(Span::styled(
                format!("  {}", filters.join(" ")),
                Style::default().fg(Color::Yellow),
            ));
        }

        spans.push(Span::styled(
            format!("  ({})", self.theme),
            Style::default().fg(Color::DarkGray),
        ));

        Line::from(spans).render(area, buf);
    }
}
