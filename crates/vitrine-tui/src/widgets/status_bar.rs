use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::app::App;

pub struct StatusBarWidget;

impl StatusBarWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let theme = &app.theme;

        let status_text = if let Some(msg) = app.status() {
            format!(" {}", msg)
        } else {
            let section = app.active_section().title().to_uppercase();
            let photos = if app.about.is_empty() {
                String::new()
            } else {
                format!(" | Photo {}/{}", app.about.current() + 1, app.about.len())
            };
            let link = match app.focused_link.and_then(|i| app.links.get(i)) {
                Some(link) => format!(" | Link: {}", link.label),
                None => String::new(),
            };
            format!(
                " {}{}{} | {}px",
                section,
                photos,
                link,
                app.scroll_sampler.scroll_y() as i64
            )
        };

        let help_hint = " q:quit j/k:scroll 1-5:jump tab:links []:photos ";
        let padding_len = area
            .width
            .saturating_sub(status_text.width() as u16 + help_hint.width() as u16)
            as usize;

        let line = Line::from(vec![
            Span::styled(status_text, Style::default().fg(theme.fg0).bg(theme.bg2)),
            Span::styled(" ".repeat(padding_len), Style::default().bg(theme.bg2)),
            Span::styled(help_hint, Style::default().fg(theme.muted).bg(theme.bg2)),
        ]);

        frame.render_widget(Paragraph::new(line), area);
    }
}
