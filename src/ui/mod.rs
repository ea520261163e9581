use chrono::Local;
use ratatui::layout::{Constraint, Layout};
use ratatui::Frame;

use crate::app::calendar::CalendarState;
use crate::app::AppState;
use crate::editor::Editor;

pub mod header;
pub mod main_area;
pub mod markup;
pub mod status_bar;

use header::Header;
use main_area::MainArea;
use status_bar::StatusBar;

pub fn render(frame: &mut Frame, state: &AppState, editor: &Editor, cal: &CalendarState) {
    let [header_area, main, status] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    frame.render_widget(
        Header {
            view: state.view,
            selected_areas: &state.selected_areas,
            selected_tags: &state.selected_tags,
            theme: state.theme.as_str(),
        },
        header_area,
    );

    frame.render_widget(
        MainArea {
            state,
            editor,
            calendar: cal,
            now: Local::now().naive_local(),
        },
        main,
    );

    frame.render_widget(
        StatusBar {
            input_mode: state.input_mode,
            toast: state.toast.as_ref(),
            saving: state.saving,
            search_input: &state.search_input,
            prompt_input: &state.prompt_input,
        },
        status,
    );
}
