use anyhow::{anyhow, Result};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Widget, Wrap},
};

use super::{card_rect, pose_style, render_heading, truncate_str};
use crate::app::App;
use crate::layout::{carousel_dots, Section, ABOUT_DOTS_ROW, CAROUSEL_ROWS, HEADING_ROWS};

pub struct AboutWidget;

impl AboutWidget {
    /// Photo carousel with indicator dots, followed by the bio
    pub fn render(area: Rect, buf: &mut Buffer, app: &App) -> Result<()> {
        let theme = &app.theme;
        render_heading("About", area, buf, theme);

        let fade = pose_style(&app.child_pose(Section::About, 0)).unwrap_or_default();
        if let Some(panel) = card_rect(area, (area.y + HEADING_ROWS) as i32, CAROUSEL_ROWS) {
            Self::render_carousel(panel, buf, app)?;
        }

        let dots_row = area.y + ABOUT_DOTS_ROW;
        if dots_row < area.bottom() {
            let current = app.about.current();
            for (i, col) in carousel_dots(area.width, app.about.len()).into_iter().enumerate() {
                let (symbol, style) = if i == current {
                    ("●", Style::default().fg(theme.accent))
                } else {
                    ("○", Style::default().fg(theme.muted))
                };
                buf.set_string(area.x + col, dots_row, symbol, style);
            }
        }

        let bio_top = dots_row + 2;
        if bio_top < area.bottom() {
            let mut lines = Vec::new();
            for paragraph in &app.profile.bio {
                lines.push(Line::from(Span::styled(
                    paragraph.clone(),
                    Style::default().fg(theme.fg0),
                )));
                lines.push(Line::default());
            }
            let bio = Rect::new(
                area.x + 2,
                bio_top,
                area.width.saturating_sub(4),
                area.bottom() - bio_top,
            );
            Paragraph::new(lines)
                .style(fade)
                .wrap(Wrap { trim: true })
                .render(bio, buf);
        }

        Ok(())
    }

    fn render_carousel(panel: Rect, buf: &mut Buffer, app: &App) -> Result<()> {
        let theme = &app.theme;
        let count = app.about.len();
        let title = if count == 0 {
            " Photos ".to_string()
        } else {
            format!(" Photos {}/{} ", app.about.current() + 1, count)
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.muted))
            .title(Span::styled(title, Style::default().fg(theme.fg1)))
            .style(Style::default().bg(theme.bg1));
        let inner = block.inner(panel);
        block.render(panel, buf);

        let caption = if count == 0 {
            Line::from(Span::styled(
                "No photos yet",
                Style::default().fg(theme.muted).add_modifier(Modifier::ITALIC),
            ))
        } else {
            let current = app.about.current();
            let item = app
                .about
                .current_item()
                .ok_or_else(|| anyhow!("carousel index {} out of range ({} items)", current, count))?;
            let pose = app.carousel_pose();
            let width = (inner.width.saturating_sub(4) as f64 * pose.scale) as usize;
            Line::from(Span::styled(
                truncate_str(&item, width),
                Style::default()
                    .fg(theme.fg0)
                    .add_modifier(Modifier::BOLD)
                    .patch(pose_style(&pose).unwrap_or_default()),
            ))
        };

        if inner.height > 0 {
            let middle = Rect::new(inner.x, inner.y + inner.height / 2, inner.width, 1);
            Paragraph::new(caption)
                .alignment(Alignment::Center)
                .render(middle, buf);
        }
        if count > 1 && inner.height > 2 {
            let controls = Rect::new(inner.x, inner.bottom() - 1, inner.width, 1);
            Paragraph::new(Line::from(vec![
                Span::styled("◀ [", Style::default().fg(theme.muted)),
                Span::styled("      ", Style::default()),
                Span::styled("] ▶", Style::default().fg(theme.muted)),
            ]))
            .alignment(Alignment::Center)
            .render(controls, buf);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use vitrine_core::{AppConfig, Profile};

    use crate::layout::PageLayout;
    use crate::theme::Theme;

    fn row(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .filter_map(|x| buf.cell((x, y)).map(|c| c.symbol().to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_carousel_and_dots() {
        let app = App::new(Arc::new(AppConfig::default()), Profile::sample(), Theme::default())
            .unwrap();
        app.about.select(2);

        let height = PageLayout::compute(&app.profile, 60, 30).span(Section::About).height;
        let area = Rect::new(0, 0, 60, height);
        let mut buf = Buffer::empty(area);
        AboutWidget::render(area, &mut buf, &app).unwrap();

        assert!(row(&buf, HEADING_ROWS).contains("Photos 3/4"));
        let dots = row(&buf, ABOUT_DOTS_ROW);
        assert_eq!(dots.matches('●').count(), 1);
        assert_eq!(dots.matches('○').count(), 3);
        let filled = carousel_dots(60, 4)[2];
        assert_eq!(buf.cell((filled, ABOUT_DOTS_ROW)).map(|c| c.symbol()), Some("●"));
    }

    #[tokio::test]
    async fn test_empty_carousel() {
        let mut profile = Profile::sample();
        profile.about_images.clear();
        let app = App::new(Arc::new(AppConfig::default()), profile, Theme::default()).unwrap();

        let area = Rect::new(0, 0, 60, 20);
        let mut buf = Buffer::empty(area);
        AboutWidget::render(area, &mut buf, &app).unwrap();
        let text: String = (0..area.height).map(|y| row(&buf, y)).collect();
        assert!(text.contains("No photos yet"));
        assert!(!text.contains('●'));
    }
}
