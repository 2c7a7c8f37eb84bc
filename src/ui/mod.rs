pub mod cards;
pub mod command_bar;
pub mod error_popup;
pub mod help;
pub mod input;
pub mod load_more;
pub mod results;
pub mod status_bar;
pub mod text;

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};

use crate::app::{App, AppMode};

use command_bar::CommandBar;
use error_popup::ErrorPopup;
use help::HelpView;
use results::ResultsView;
use status_bar::StatusBar;

pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Layout: main content + status bar + optional command bar
    let bottom_height = if app.mode != AppMode::Normal { 2 } else { 1 };

    let [main_area, bottom_area] =
        Layout::vertical([Constraint::Min(1), Constraint::Length(bottom_height)]).areas(area);

    if app.mode != AppMode::Normal {
        let [status_area, cmd_area] =
            Layout::vertical([Constraint::Length(1), Constraint::Length(1)]).areas(bottom_area);
        frame.render_widget(StatusBar::new(app), status_area);
        frame.render_widget(CommandBar::new(app), cmd_area);
    } else {
        frame.render_widget(StatusBar::new(app), bottom_area);
    }

    frame.render_widget(
        ResultsView::new(&app.search)
            .selected(app.selected_index)
            .max_columns(app.config.max_columns)
            .frame(app.frame),
        main_area,
    );

    if app.show_help {
        frame.render_widget(HelpView::new(), main_area);
    }

    // Error detail popup overlay (renders on top of everything)
    if let Some(ref detail) = app.error_detail {
        frame.render_widget(ErrorPopup::new(detail), frame.area());
    }
}
