use anyhow::{Context, Result};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};
use url::Url;

use super::{card_rect, pose_style, render_heading};
use crate::app::{rows_for, App};
use crate::layout::{Section, HEADING_ROWS, VENTURE_CARD_ROWS};

pub struct VenturesWidget;

impl VenturesWidget {
    pub fn render(area: Rect, buf: &mut Buffer, app: &App) -> Result<()> {
        let theme = &app.theme;
        render_heading("Business Ventures", area, buf, theme);

        for (i, venture) in app.profile.ventures.iter().enumerate() {
            let pose = app.child_pose(Section::Ventures, i);
            let Some(fade) = pose_style(&pose) else {
                continue;
            };
            let top = area.y as i32
                + HEADING_ROWS as i32
                + i as i32 * (VENTURE_CARD_ROWS as i32 + 1)
                + rows_for(pose.offset_y);
            let Some(card) = card_rect(area, top, VENTURE_CARD_ROWS) else {
                continue;
            };

            let host = match &venture.url {
                Some(url) => Url::parse(url)
                    .with_context(|| format!("venture '{}' has an invalid link", venture.name))?
                    .host_str()
                    .map(str::to_string),
                None => None,
            };
            let focused = venture.url.is_some() && app.focused_url() == venture.url.as_deref();

            let border = if focused {
                Style::default().fg(theme.link).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.muted)
            };
            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(border.patch(fade))
                .title(Span::styled(
                    format!(" {} ", venture.name),
                    Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
                ));
            let inner = block.inner(card);
            block.render(card, buf);

            let mut meta = vec![Span::styled(
                venture.role.clone(),
                Style::default().fg(theme.yellow),
            )];
            if let Some(host) = host {
                meta.push(Span::raw("  "));
                meta.push(Span::styled(
                    format!("↗ {}", host),
                    Style::default().fg(theme.link).add_modifier(Modifier::UNDERLINED),
                ));
            }
            let lines = vec![
                Line::from(meta),
                Line::from(Span::styled(
                    venture.description.clone(),
                    Style::default().fg(theme.fg0),
                )),
            ];
            Paragraph::new(lines)
                .style(fade)
                .wrap(Wrap { trim: true })
                .render(inner, buf);
        }

        Ok(())
    }
}
