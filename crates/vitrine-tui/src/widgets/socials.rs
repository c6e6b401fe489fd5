use anyhow::{Context, Result};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};
use url::Url;

use super::{centered_x, pose_style, render_heading};
use crate::app::App;
use crate::layout::{Section, HEADING_ROWS};

pub struct SocialsWidget;

impl SocialsWidget {
    pub fn render(area: Rect, buf: &mut Buffer, app: &App) -> Result<()> {
        let theme = &app.theme;
        render_heading("Get in Touch", area, buf, theme);

        let mut y = area.y + HEADING_ROWS;
        for (i, social) in app.profile.socials.iter().enumerate() {
            if y >= area.bottom() {
                break;
            }
            let Some(fade) = pose_style(&app.child_pose(Section::Socials, i)) else {
                y += 1;
                continue;
            };
            let url = Url::parse(&social.url)
                .with_context(|| format!("{} link is invalid", social.platform))?;
            let focused = app.focused_url() == Some(social.url.as_str());
            let base = if focused {
                Style::default().bg(theme.selection)
            } else {
                Style::default()
            };

            let line = Line::from(vec![
                Span::styled(if focused { "▸ " } else { "  " }, base.fg(theme.link)),
                Span::styled(
                    format!("{:<12}", social.platform),
                    base.fg(theme.accent).add_modifier(Modifier::BOLD),
                ),
                Span::styled(format!("{:<20}", social.handle), base.fg(theme.fg0)),
                Span::styled(
                    url.as_str().trim_end_matches('/').to_string(),
                    base.fg(theme.link).add_modifier(Modifier::UNDERLINED),
                ),
            ])
            .style(fade);
            let row = Rect::new(area.x + 2, y, area.width.saturating_sub(4), 1);
            Paragraph::new(line).render(row, buf);
            y += 1;
        }

        let footer = format!("© {}", app.profile.name);
        let footer_row = area.bottom().saturating_sub(1);
        if footer_row > y {
            buf.set_string(
                centered_x(area, &footer),
                footer_row,
                footer,
                Style::default().fg(theme.muted),
            );
        }

        Ok(())
    }
}
