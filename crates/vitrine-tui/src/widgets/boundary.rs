use anyhow::Result;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};
use tracing::{error, info};
use vitrine_core::sync::lock;

use crate::app::App;
use crate::layout::Section;
use crate::theme::Theme;

/// Draws one page section into an offscreen buffer
pub type SectionRenderer = fn(Rect, &mut Buffer, &App) -> Result<()>;

/// Contains a failing section so the rest of the page still renders
pub struct ErrorBoundary;

impl ErrorBoundary {
    /// Run `render`; on failure draw a fallback panel in its place.
    ///
    /// Returns whether the section rendered. A failure is logged once per
    /// distinct message until the section recovers.
    pub fn render(
        section: Section,
        area: Rect,
        buf: &mut Buffer,
        app: &App,
        render: SectionRenderer,
    ) -> bool {
        match render(area, buf, app) {
            Ok(()) => {
                let mut failures = lock(&app.failures);
                if failures.remove(&section).is_some() {
                    info!(section = section.id(), "Section recovered");
                }
                true
            }
            Err(err) => {
                let message = format!("{:#}", err);
                {
                    let mut failures = lock(&app.failures);
                    if failures.get(&section) != Some(&message) {
                        error!(section = section.id(), "Section failed to render: {}", message);
                        failures.insert(section, message.clone());
                    }
                }
                Clear.render(area, buf);
                Self::render_fallback(area, buf, &app.theme, &message);
                false
            }
        }
    }

    fn render_fallback(area: Rect, buf: &mut Buffer, theme: &Theme, message: &str) {
        let block = Block::default()
            .title(" Something went wrong ")
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.error))
            .style(Style::default().bg(theme.bg1));
        let inner = block.inner(area);
        block.render(area, buf);

        let mut lines = vec![Line::from(Span::styled(
            "This section could not be displayed.",
            Style::default().fg(theme.fg0).add_modifier(Modifier::BOLD),
        ))];
        if cfg!(debug_assertions) {
            lines.push(Line::default());
            lines.push(Line::from(Span::styled(
                message.to_string(),
                Style::default().fg(theme.muted),
            )));
        }

        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use anyhow::anyhow;
    use vitrine_core::{AppConfig, Profile};

    fn failing(_: Rect, _: &mut Buffer, _: &App) -> Result<()> {
        Err(anyhow!("broken card"))
    }

    fn working(area: Rect, buf: &mut Buffer, _: &App) -> Result<()> {
        buf.set_string(area.x, area.y, "fine", Style::default());
        Ok(())
    }

    fn text(buf: &Buffer) -> String {
        let area = buf.area;
        (area.top()..area.bottom())
            .map(|y| {
                (area.left()..area.right())
                    .filter_map(|x| buf.cell((x, y)).map(|c| c.symbol().to_string()))
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[tokio::test]
    async fn test_failure_renders_fallback() {
        let app = App::new(Arc::new(AppConfig::default()), Profile::sample(), Theme::default())
            .unwrap();
        let area = Rect::new(0, 0, 60, 6);
        let mut buf = Buffer::empty(area);

        assert!(!ErrorBoundary::render(Section::Projects, area, &mut buf, &app, failing));
        let rendered = text(&buf);
        assert!(rendered.contains("Something went wrong"));
        assert!(rendered.contains("could not be displayed"));
        assert_eq!(
            app.failures.lock().unwrap().get(&Section::Projects).map(String::as_str),
            Some("broken card")
        );
    }

    #[tokio::test]
    async fn test_recovery_clears_failure() {
        let app = App::new(Arc::new(AppConfig::default()), Profile::sample(), Theme::default())
            .unwrap();
        let area = Rect::new(0, 0, 60, 6);

        let mut buf = Buffer::empty(area);
        ErrorBoundary::render(Section::About, area, &mut buf, &app, failing);
        ErrorBoundary::render(Section::About, area, &mut buf, &app, failing);
        assert_eq!(app.failures.lock().unwrap().len(), 1);

        let mut buf = Buffer::empty(area);
        assert!(ErrorBoundary::render(Section::About, area, &mut buf, &app, working));
        assert!(text(&buf).starts_with("fine"));
        assert!(app.failures.lock().unwrap().is_empty());
    }
}
