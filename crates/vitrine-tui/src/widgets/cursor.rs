use ratatui::{style::Modifier, Frame};

use crate::app::App;

pub struct CursorWidget;

impl CursorWidget {
    /// Highlight the cell the spring follower currently sits on
    pub fn render(frame: &mut Frame, app: &App) {
        if !app.config.ui.cursor_follower {
            return;
        }
        let Some(position) = app.cursor_cell() else {
            return;
        };
        let theme = &app.theme;
        if let Some(cell) = frame.buffer_mut().cell_mut(position) {
            cell.set_bg(theme.accent)
                .set_fg(theme.bg0)
                .modifier
                .insert(Modifier::BOLD);
        }
    }
}
