use std::io::{self, Stdout};
use std::sync::Arc;

use anyhow::{Context, Result};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::warn;

use vitrine_core::ratelimit::frame_period;
use vitrine_core::{AppConfig, Profile};
use vitrine_tui::{
    event::{AppEvent, EventHandler},
    input::{handle_key_event, handle_mouse_event},
    load_theme,
    widgets::PageWidget,
    App, Theme,
};

pub async fn run(config: Arc<AppConfig>) -> Result<()> {
    config.validate().context("invalid config")?;

    let profile_path = config.profile_path();
    let profile = Profile::load_or_sample(&profile_path)
        .with_context(|| format!("loading profile from {}", profile_path.display()))?;
    if let Err(e) = profile.validate() {
        warn!("Profile has problems: {}", e);
    }

    let theme = load_theme(&config.ui.theme);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    let title = format!("{} · vitrine", profile.name);
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture, SetTitle(title))?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, config, profile, theme);

    // Restore terminal even when the loop failed
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    config: Arc<AppConfig>,
    profile: Profile,
    theme: Theme,
) -> Result<()> {
    let mut app = App::new(config.clone(), profile, theme)?;
    let size = terminal.size()?;
    app.set_size(size.width, size.height);
    app.start()?;

    let event_handler = EventHandler::new(
        config.ui.tick_rate_ms,
        frame_period(config.sampler.frame_rate),
    );

    loop {
        app.on_frame();
        terminal.draw(|frame| PageWidget::render(frame, &app))?;

        // Poll at frame rate while something is moving
        let event = if app.is_animating() {
            event_handler.next_frame()?
        } else {
            event_handler.next()?
        };
        if let Some(event) = event {
            match event {
                AppEvent::Key(key) => {
                    let action = handle_key_event(key, &app);
                    app.apply(action);
                }
                AppEvent::Mouse(mouse) => app.apply(handle_mouse_event(mouse)),
                AppEvent::Resize(width, height) => app.request_resize(width, height),
                AppEvent::Tick => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    app.shutdown();
    Ok(())
}
