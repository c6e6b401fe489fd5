mod about;
mod boundary;
mod cursor;
mod header;
mod hero;
mod page;
mod projects;
mod socials;
mod status_bar;
mod ventures;

pub use about::AboutWidget;
pub use boundary::{ErrorBoundary, SectionRenderer};
pub use cursor::CursorWidget;
pub use header::HeaderWidget;
pub use hero::HeroWidget;
pub use page::PageWidget;
pub use projects::ProjectsWidget;
pub use socials::SocialsWidget;
pub use status_bar::StatusBarWidget;
pub use ventures::VenturesWidget;

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
};
use unicode_width::UnicodeWidthStr;
use vitrine_core::motion::Pose;

use crate::layout::HEADING_ROWS;
use crate::theme::Theme;

/// Below this opacity a card is not drawn at all
const MIN_VISIBLE_OPACITY: f64 = 0.05;
/// Below this opacity a card is drawn dimmed
const DIM_OPACITY: f64 = 0.6;

/// Section title with an accent underline
pub(crate) fn render_heading(title: &str, area: Rect, buf: &mut Buffer, theme: &Theme) {
    if area.height < HEADING_ROWS {
        return;
    }
    let x = area.x + 2;
    buf.set_string(
        x,
        area.y,
        title,
        Style::default().fg(theme.fg0).add_modifier(Modifier::BOLD),
    );
    let underline = "─".repeat(title.width().min(area.width.saturating_sub(4) as usize));
    buf.set_string(x, area.y + 1, underline, Style::default().fg(theme.accent));
}

/// Style modifier for a card in `pose`; `None` while it is invisible
pub(crate) fn pose_style(pose: &Pose) -> Option<Style> {
    if pose.opacity < MIN_VISIBLE_OPACITY {
        None
    } else if pose.opacity < DIM_OPACITY {
        Some(Style::default().add_modifier(Modifier::DIM))
    } else {
        Some(Style::default())
    }
}

/// Inset card rect starting at row `top`, clipped to `area`
pub(crate) fn card_rect(area: Rect, top: i32, height: u16) -> Option<Rect> {
    let y0 = top.max(area.y as i32);
    let y1 = (top + height as i32).min(area.bottom() as i32);
    if y1 <= y0 || area.width < 6 {
        return None;
    }
    Some(Rect::new(
        area.x + 2,
        y0 as u16,
        area.width - 4,
        (y1 - y0) as u16,
    ))
}

/// Column that centers `text` in `area`
pub(crate) fn centered_x(area: Rect, text: &str) -> u16 {
    area.x + area.width.saturating_sub(text.width() as u16) / 2
}

/// Copy `src` onto `dst`, with `src` row 0 landing `offset` rows below the
/// top of `clip`. Cells outside `clip` are skipped.
pub(crate) fn blit(src: &Buffer, dst: &mut Buffer, clip: Rect, offset: i32) {
    let area = src.area;
    for y in 0..area.height {
        let target_y = clip.y as i32 + offset + y as i32;
        if target_y < clip.y as i32 || target_y >= clip.bottom() as i32 {
            continue;
        }
        for x in 0..area.width.min(clip.width) {
            let (Some(from), Some(to)) = (
                src.cell((area.x + x, area.y + y)),
                dst.cell_mut((clip.x + x, target_y as u16)),
            ) else {
                continue;
            };
            *to = from.clone();
        }
    }
}

/// Truncate a string to max length with ellipsis
pub(crate) fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}
