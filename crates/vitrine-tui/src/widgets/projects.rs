use anyhow::{Context, Result};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};
use url::Url;

use super::{card_rect, pose_style, render_heading, truncate_str};
use crate::app::{rows_for, App};
use crate::layout::{Section, HEADING_ROWS, PROJECT_CARD_ROWS};

/// Description lines shown per card
const DESCRIPTION_LINES: usize = 2;

pub struct ProjectsWidget;

impl ProjectsWidget {
    pub fn render(area: Rect, buf: &mut Buffer, app: &App) -> Result<()> {
        let theme = &app.theme;
        render_heading("Projects", area, buf, theme);

        for (i, project) in app.profile.projects.iter().enumerate() {
            let pose = app.child_pose(Section::Projects, i);
            let Some(fade) = pose_style(&pose) else {
                continue;
            };
            let top = area.y as i32
                + HEADING_ROWS as i32
                + i as i32 * (PROJECT_CARD_ROWS as i32 + 1)
                + rows_for(pose.offset_y);
            let Some(card) = card_rect(area, top, PROJECT_CARD_ROWS) else {
                continue;
            };

            let focused = project.url.is_some() && app.focused_url() == project.url.as_deref();
            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(
                    if focused {
                        Style::default().fg(theme.link).add_modifier(Modifier::BOLD)
                    } else {
                        Style::default().fg(theme.bg2)
                    }
                    .patch(fade),
                )
                .style(Style::default().bg(theme.bg1));
            let inner = block.inner(card);
            block.render(card, buf);

            let width = inner.width as usize;
            let mut lines = vec![Line::from(Span::styled(
                truncate_str(&project.title, width),
                Style::default().fg(theme.fg0).add_modifier(Modifier::BOLD),
            ))];
            lines.extend(
                project
                    .description
                    .lines()
                    .take(DESCRIPTION_LINES)
                    .map(|line| {
                        Line::from(Span::styled(
                            truncate_str(line, width),
                            Style::default().fg(theme.fg1),
                        ))
                    }),
            );
            while lines.len() < DESCRIPTION_LINES + 1 {
                lines.push(Line::default());
            }

            let mut footer: Vec<Span> = project
                .tags
                .iter()
                .flat_map(|tag| {
                    [
                        Span::styled(format!("#{}", tag), Style::default().fg(theme.aqua)),
                        Span::raw(" "),
                    ]
                })
                .collect();
            if let Some(url) = &project.url {
                let url = Url::parse(url)
                    .with_context(|| format!("project '{}' has an invalid link", project.title))?;
                footer.push(Span::styled(
                    format!(" ↗ {}", url.host_str().unwrap_or(url.as_str())),
                    Style::default().fg(theme.link).add_modifier(Modifier::UNDERLINED),
                ));
            }
            lines.push(Line::from(footer));

            Paragraph::new(lines).style(fade).render(inner, buf);
        }

        Ok(())
    }
}
