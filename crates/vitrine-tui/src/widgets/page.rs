use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Color, Style},
    widgets::Block,
    Frame,
};

use super::{
    blit, AboutWidget, CursorWidget, ErrorBoundary, HeaderWidget, HeroWidget, ProjectsWidget,
    SectionRenderer, SocialsWidget, StatusBarWidget, VenturesWidget, MIN_VISIBLE_OPACITY,
};
use crate::app::{rows_for, App};
use crate::layout::{Section, HEADER_HEIGHT};
use crate::theme::blend;

pub struct PageWidget;

impl PageWidget {
    /// Draw the whole screen: scrolled sections, then the fixed header, the
    /// menu overlay, the cursor follower and the status bar on top.
    pub fn render(frame: &mut Frame, app: &App) {
        let theme = &app.theme;
        let size = frame.area();
        frame.render_widget(
            Block::default().style(Style::default().bg(theme.bg0).fg(theme.fg0)),
            size,
        );

        let chunks = Layout::vertical([
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(size);
        let body = chunks[1];
        let scroll = app.scroll.current_scroll() as i32;

        for span in app.layout.spans() {
            let pose = app.section_pose(span.section);
            if pose.opacity < MIN_VISIBLE_OPACITY {
                continue;
            }
            let top = span.top as i32 + rows_for(pose.offset_y) - scroll;
            if top >= body.height as i32 || top + span.height as i32 <= 0 {
                continue;
            }

            let area = Rect::new(0, 0, body.width, span.height);
            let mut buf = Buffer::empty(area);
            buf.set_style(area, Style::default().bg(theme.bg0).fg(theme.fg0));
            ErrorBoundary::render(span.section, area, &mut buf, app, renderer(span.section));
            fade(&mut buf, pose.opacity, theme.bg0);
            blit(&buf, frame.buffer_mut(), body, top);
        }

        HeaderWidget::render(frame, chunks[0], app);
        if app.menu_open {
            HeaderWidget::render_menu(frame, app);
        }
        CursorWidget::render(frame, app);
        StatusBarWidget::render(frame, chunks[2], app);
    }
}

fn renderer(section: Section) -> SectionRenderer {
    match section {
        Section::Hero => HeroWidget::render,
        Section::Ventures => VenturesWidget::render,
        Section::About => AboutWidget::render,
        Section::Projects => ProjectsWidget::render,
        Section::Socials => SocialsWidget::render,
    }
}

/// Pull foreground colors toward `bg` for a partially transparent section
fn fade(buf: &mut Buffer, opacity: f64, bg: Color) {
    if opacity >= 0.99 {
        return;
    }
    for cell in buf.content.iter_mut() {
        cell.fg = blend(bg, cell.fg, opacity);
    }
}
