use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::{Block, Borders, Clear, Widget},
    Frame,
};

use super::blit;
use crate::app::{rows_for, App};
use crate::layout::{NavLayout, Section, HEADER_HEIGHT, NAV_ROW};

pub struct HeaderWidget;

impl HeaderWidget {
    /// Fixed header: brand on the left, navigation on the right. It slides
    /// down on first paint and gains a backdrop once the page scrolls.
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let mut buf = Buffer::empty(Rect::new(0, 0, area.width, area.height));
        Self::draw(buf.area, &mut buf, app);
        let shift = rows_for(app.header_pose().offset_y);
        blit(&buf, frame.buffer_mut(), area, shift);
    }

    fn draw(area: Rect, buf: &mut Buffer, app: &App) {
        let theme = &app.theme;
        let scrolled = app.is_header_scrolled();

        let block = if scrolled {
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Style::default().fg(theme.muted))
                .style(Style::default().bg(theme.bg2))
        } else {
            Block::default().style(Style::default().bg(theme.bg0))
        };
        block.render(area, buf);

        let row = area.y + NAV_ROW;
        buf.set_string(
            area.x + 2,
            row,
            &app.profile.name,
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
        );

        match NavLayout::for_width(area.width) {
            NavLayout::Full(items) => {
                let active = app.active_section();
                for (section, x, _) in items {
                    let style = if section == active {
                        Style::default()
                            .fg(theme.accent)
                            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
                    } else {
                        Style::default().fg(theme.fg0)
                    };
                    buf.set_string(area.x + x, row, section.title(), style);
                }
            }
            NavLayout::Compact { x, .. } => {
                let style = if app.menu_open {
                    Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(theme.fg0)
                };
                buf.set_string(area.x + x, row, NavLayout::menu_label(), style);
            }
        }
    }

    /// Dropdown listing every section, one per row below the header
    pub fn render_menu(frame: &mut Frame, app: &App) {
        let theme = &app.theme;
        let screen = frame.area();
        let height = (Section::ALL.len() as u16).min(screen.height.saturating_sub(HEADER_HEIGHT));
        let area = Rect::new(screen.x, screen.y + HEADER_HEIGHT, screen.width, height);
        frame.render_widget(Clear, area);

        let active = app.active_section();
        let buf = frame.buffer_mut();
        buf.set_style(area, Style::default().bg(theme.bg1));
        for (i, section) in Section::ALL.iter().enumerate().take(height as usize) {
            let style = if *section == active {
                Style::default()
                    .fg(theme.accent)
                    .bg(theme.selection)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.fg0).bg(theme.bg1)
            };
            let label = format!("  {}  {}", i + 1, section.title());
            buf.set_string(area.x, area.y + i as u16, label, style);
        }
    }
}
