use anyhow::Result;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
};

use super::{centered_x, truncate_str};
use crate::app::App;
use crate::theme::blend;

pub struct HeroWidget;

impl HeroWidget {
    /// Full-height intro: drifting particles, the rotating background
    /// caption moving with the scroll, name and tagline centered on top.
    pub fn render(area: Rect, buf: &mut Buffer, app: &App) -> Result<()> {
        let theme = &app.theme;
        buf.set_style(area, Style::default().bg(theme.bg1));

        let dot = Style::default().fg(blend(theme.bg1, theme.muted, 0.5));
        for (x, y) in app.particle_cells(area.width, area.height) {
            buf.set_string(area.x + x, area.y + y, "·", dot);
        }

        let (previous, current, t) = app.background_crossfade();
        // Outgoing caption fades out during the first half, the new one in
        // during the second.
        let (caption, color) = match previous {
            Some(previous) if t < 0.5 => (Some(previous), blend(theme.muted, theme.bg1, t * 2.0)),
            Some(_) => (current, blend(theme.bg1, theme.muted, (t - 0.5) * 2.0)),
            None => (current, theme.muted),
        };

        let drift = app.hero_parallax_rows().round() as u16;
        let caption_row = area.y + 1 + drift;
        if let Some(caption) = caption {
            if caption_row < area.bottom() {
                let caption = format!("◇ {} ◇", truncate_str(&caption, area.width as usize / 2));
                buf.set_string(
                    centered_x(area, &caption),
                    caption_row,
                    &caption,
                    Style::default().fg(color).add_modifier(Modifier::ITALIC),
                );
            }
        }

        let middle = area.y + area.height / 2;
        let name = truncate_str(&app.profile.name, area.width.saturating_sub(4) as usize);
        buf.set_string(
            centered_x(area, &name),
            middle.saturating_sub(1),
            &name,
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
        );

        if !app.profile.tagline.is_empty() && middle + 1 < area.bottom() {
            let tagline = truncate_str(&app.profile.tagline, area.width.saturating_sub(4) as usize);
            buf.set_string(
                centered_x(area, &tagline),
                middle + 1,
                &tagline,
                Style::default().fg(theme.fg1),
            );
        }

        let hint = "scroll ↓  or press 2";
        if area.height > 4 {
            buf.set_string(
                centered_x(area, hint),
                area.bottom() - 2,
                hint,
                Style::default().fg(theme.muted),
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use vitrine_core::motion::{EasingType, Particle, ParticleField};
    use vitrine_core::{AppConfig, Profile};

    use crate::theme::Theme;

    fn symbol(buf: &Buffer, x: u16, y: u16) -> Option<String> {
        buf.cell((x, y)).map(|c| c.symbol().to_string())
    }

    #[tokio::test(start_paused = true)]
    async fn test_particles_drift_and_return() {
        let mut app =
            App::new(Arc::new(AppConfig::default()), Profile::sample(), Theme::default()).unwrap();
        app.particles = ParticleField::new(vec![Particle {
            from: (0.0, 0.0),
            to: (1.0, 1.0),
            leg: Duration::from_secs(10),
            easing: EasingType::EaseInOut,
        }]);
        let area = Rect::new(0, 0, 120, 36);

        let render = |app: &App| {
            let mut buf = Buffer::empty(area);
            HeroWidget::render(area, &mut buf, app).unwrap();
            buf
        };

        let buf = render(&app);
        assert_eq!(symbol(&buf, 0, 0).as_deref(), Some("·"));
        assert_ne!(symbol(&buf, 119, 35).as_deref(), Some("·"));

        tokio::time::advance(Duration::from_secs(5)).await;
        assert_eq!(app.particle_cells(120, 36), vec![(60, 18)]);

        tokio::time::advance(Duration::from_secs(5)).await;
        let buf = render(&app);
        assert_eq!(symbol(&buf, 119, 35).as_deref(), Some("·"));
        assert_ne!(symbol(&buf, 0, 0).as_deref(), Some("·"));

        tokio::time::advance(Duration::from_secs(10)).await;
        assert_eq!(app.particle_cells(120, 36), vec![(0, 0)]);
    }

    #[tokio::test]
    async fn test_default_field_has_five_particles() {
        let app =
            App::new(Arc::new(AppConfig::default()), Profile::sample(), Theme::default()).unwrap();
        assert_eq!(app.particles.particles().len(), 5);
        for (x, y) in app.particle_cells(80, 20) {
            assert!(x < 80 && y < 20);
        }
    }
}
