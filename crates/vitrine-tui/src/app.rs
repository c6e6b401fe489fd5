use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tracing::{debug, info, warn};
use url::Url;

use vitrine_core::motion::{
    fade_in_up, header_entrance, scale_in, ParticleField, Pose, SpringConfig, SpringFollower,
    Stagger,
};
use vitrine_core::ratelimit::{Debounce, FrameLoop};
use vitrine_core::sampler::{
    PointerEvent, PointerSample, PointerSampler, ScrollEvent, ScrollSampler,
};
use vitrine_core::sync::lock;
use vitrine_core::viewport::{create_viewport_observer, IntersectionEntry, ViewportObserver};
use vitrine_core::{AppConfig, EventSource, Profile, RotationState, Rotator};

use crate::input::Action;
use crate::layout::{
    carousel_dot_at, NavLayout, PageLayout, Section, ABOUT_DOTS_ROW, COL_PX, HEADER_HEIGHT,
    NAV_ROW, ROW_PX,
};
use crate::scroll::ScrollAnimator;
use crate::theme::Theme;

/// Quiet period before a burst of resize events is applied
const RESIZE_SETTLE: Duration = Duration::from_millis(100);
/// Background crossfade length
const CROSSFADE: Duration = Duration::from_millis(1000);
const STATUS_TTL: Duration = Duration::from_secs(3);
/// Reveal animations are treated as finished after this long
const REVEAL_SETTLE: Duration = Duration::from_millis(1500);
const CURSOR_TOLERANCE: f64 = 0.05;

/// Something the user can click
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    Nav(Section),
    MenuToggle,
    MenuItem(Section),
    CarouselDot(usize),
}

/// A link reachable with Tab
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRef {
    pub section: Section,
    pub label: String,
    pub url: String,
}

type ResizeTarget = Box<dyn Fn((u16, u16)) + Send + Sync>;

/// Application state
pub struct App {
    pub config: Arc<AppConfig>,
    pub profile: Profile,
    pub theme: Theme,
    pub should_quit: bool,
    pub menu_open: bool,
    pub links: Vec<LinkRef>,
    pub focused_link: Option<usize>,
    status: Option<(String, Instant)>,

    pub layout: PageLayout,
    pub scroll: ScrollAnimator,

    pub about: Rotator<String>,
    about_rx: watch::Receiver<usize>,
    /// When the carousel last changed photo
    about_changed: Option<Instant>,
    pub background: Rotator<String>,
    background_rx: watch::Receiver<usize>,
    background_shown: usize,
    /// Background being faded out and when the fade began
    background_fade: Option<(usize, Instant)>,

    pub scroll_events: EventSource<ScrollEvent>,
    pub pointer_events: EventSource<PointerEvent>,
    pub scroll_sampler: ScrollSampler,
    pub pointer_sampler: PointerSampler,
    pointer_rx: watch::Receiver<PointerSample>,
    pub frames: Arc<FrameLoop>,

    reveal: ViewportObserver,
    revealed: Arc<Mutex<HashMap<Section, Instant>>>,
    stagger: Stagger,
    /// Pauses the background rotation while the hero is off-screen
    visibility: ViewportObserver,
    visibility_changes: Arc<Mutex<Vec<(Section, bool)>>>,

    cursor: Option<SpringFollower>,
    /// Floating dots over the hero, timed from `started_at`
    pub(crate) particles: ParticleField,
    started_at: Instant,
    last_frame: Instant,

    resize: Debounce<ResizeTarget>,
    resize_rx: mpsc::UnboundedReceiver<(u16, u16)>,

    /// Last error reported per section by the error boundary
    pub(crate) failures: Mutex<HashMap<Section, String>>,
}

impl App {
    /// Build the page state. Must be called inside a tokio runtime.
    pub fn new(config: Arc<AppConfig>, profile: Profile, theme: Theme) -> Result<Self> {
        let about = Rotator::new(
            "about",
            RotationState::new(profile.about_images.clone(), config.rotation.about_interval())?,
        );
        let background = Rotator::new(
            "background",
            RotationState::new(
                profile.background_images.clone(),
                config.rotation.background_interval(),
            )?,
        );
        let about_rx = about.subscribe();
        let background_rx = background.subscribe();

        let frames = Arc::new(FrameLoop::new());
        let scroll_sampler = ScrollSampler::from_config(&config.sampler)?;
        let pointer_sampler = PointerSampler::from_config(&config.sampler, frames.clone())?;
        let pointer_rx = pointer_sampler.subscribe();

        let revealed = Arc::new(Mutex::new(HashMap::new()));
        let reveal = {
            let revealed = Arc::clone(&revealed);
            let once = config.viewport.reveal().once;
            create_viewport_observer(
                move |entries: &[IntersectionEntry]| {
                    let mut revealed = lock(&revealed);
                    for entry in entries {
                        let Some(section) = Section::from_id(&entry.target) else {
                            continue;
                        };
                        if entry.is_intersecting {
                            revealed.entry(section).or_insert_with(Instant::now);
                        } else if !once {
                            revealed.remove(&section);
                        }
                    }
                },
                Some(config.viewport.reveal_options()),
            )?
        };

        let visibility_changes = Arc::new(Mutex::new(Vec::new()));
        let visibility = {
            let changes = Arc::clone(&visibility_changes);
            create_viewport_observer(
                move |entries: &[IntersectionEntry]| {
                    let mut changes = lock(&changes);
                    for entry in entries {
                        if let Some(section) = Section::from_id(&entry.target) {
                            changes.push((section, entry.is_intersecting));
                        }
                    }
                },
                Some(config.viewport.observer_options()),
            )?
        };

        let (resize_tx, resize_rx) = mpsc::unbounded_channel();
        let resize_target: ResizeTarget = Box::new(move |size| {
            let _ = resize_tx.send(size);
        });
        let resize = Debounce::new(resize_target, RESIZE_SETTLE)?;

        let layout = PageLayout::compute(&profile, 80, 24);
        let links = collect_links(&profile);
        let now = Instant::now();

        Ok(Self {
            scroll: ScrollAnimator::new(config.ui.scroll.clone()),
            config,
            profile,
            theme,
            should_quit: false,
            menu_open: false,
            links,
            focused_link: None,
            status: None,
            layout,
            about,
            about_rx,
            about_changed: None,
            background,
            background_rx,
            background_shown: 0,
            background_fade: None,
            scroll_events: EventSource::new(),
            pointer_events: EventSource::new(),
            scroll_sampler,
            pointer_sampler,
            pointer_rx,
            frames,
            reveal,
            revealed,
            stagger: Stagger::default(),
            visibility,
            visibility_changes,
            cursor: None,
            particles: ParticleField::default(),
            started_at: now,
            last_frame: now,
            resize,
            resize_rx,
            failures: Mutex::new(HashMap::new()),
        })
    }

    /// Start rotations and samplers.
    pub fn start(&mut self) -> Result<()> {
        self.about.start().context("starting about carousel")?;
        self.background.start().context("starting background rotation")?;
        self.scroll_sampler.start(&self.scroll_events);
        self.pointer_sampler.start(&self.pointer_events);
        self.observe_sections();
        info!(
            sections = self.layout.spans().len(),
            links = self.links.len(),
            "Page started"
        );
        Ok(())
    }

    /// Stop every timer and subscription. Nothing fires afterwards.
    pub fn shutdown(&mut self) {
        self.about.stop();
        self.background.stop();
        self.scroll_sampler.stop();
        self.pointer_sampler.stop();
        self.reveal.disconnect();
        self.visibility.disconnect();
        self.resize.cancel();
        info!("Page stopped");
    }

    /// Queue a terminal resize; bursts are collapsed into one relayout.
    pub fn request_resize(&self, width: u16, height: u16) {
        self.resize.call((width, height));
    }

    /// Recompute the layout for a `width` x `height` terminal.
    pub fn set_size(&mut self, width: u16, height: u16) {
        self.layout = PageLayout::compute(&self.profile, width, height);
        self.observe_sections();
        debug!(width, height, total = self.layout.total_height(), "Layout updated");
    }

    fn observe_sections(&mut self) {
        for span in self.layout.spans() {
            let bounds = self.layout.bounds_px(span.section);
            for observer in [&mut self.reveal, &mut self.visibility] {
                if !observer.update_bounds(span.section.id(), bounds) {
                    observer.observe(span.section.id(), bounds);
                }
            }
        }
    }

    /// Advance everything that moves. Called once per host frame.
    pub fn on_frame(&mut self) {
        let now = Instant::now();
        let dt = now.duration_since(self.last_frame).as_secs_f64().min(0.1);
        self.last_frame = now;

        let mut resized = None;
        while let Ok(size) = self.resize_rx.try_recv() {
            resized = Some(size);
        }
        if let Some((width, height)) = resized {
            self.set_size(width, height);
        }

        // Emit until the sampler has accepted the current position; the
        // throttle drops emits that land inside its window.
        let scroll = self.scroll.update(self.layout.max_scroll());
        let offset_y = scroll as f64 * ROW_PX;
        if self.scroll_sampler.scroll_y() != offset_y {
            self.scroll_events.emit(&ScrollEvent { offset_y });
        }

        self.frames.run_frame();

        if self.about_rx.has_changed().unwrap_or(false) {
            self.about_rx.borrow_and_update();
            self.about_changed = Some(now);
        }

        if self.background_rx.has_changed().unwrap_or(false) {
            let current = *self.background_rx.borrow_and_update();
            if current != self.background_shown {
                self.background_fade = Some((self.background_shown, now));
                self.background_shown = current;
            }
        }
        if let Some((_, since)) = self.background_fade {
            if now.duration_since(since) >= CROSSFADE {
                self.background_fade = None;
            }
        }

        if self.pointer_rx.has_changed().unwrap_or(false) {
            let sample = *self.pointer_rx.borrow_and_update();
            let (x, y) = (sample.x / COL_PX, sample.y / ROW_PX);
            let cursor = self
                .cursor
                .get_or_insert_with(|| SpringFollower::new(SpringConfig::default(), x, y));
            cursor.set_target(x, y);
        }
        if let Some(cursor) = self.cursor.as_mut() {
            cursor.step(dt);
        }

        let viewport = self.layout.viewport_px(scroll);
        self.reveal.check(viewport);
        self.visibility.check(viewport);
        self.apply_visibility_changes();

        if let Some((_, at)) = &self.status {
            if now.duration_since(*at) >= STATUS_TTL {
                self.status = None;
            }
        }
    }

    fn apply_visibility_changes(&mut self) {
        let changes: Vec<(Section, bool)> = lock(&self.visibility_changes).drain(..).collect();
        for (section, visible) in changes {
            if section != Section::Hero {
                continue;
            }
            if visible && !self.background.is_running() {
                if let Err(e) = self.background.start() {
                    warn!("Failed to resume background rotation: {}", e);
                }
            } else if !visible && self.background.is_running() {
                self.background.stop();
            }
        }
    }

    /// Whether the host should poll at frame rate instead of tick rate
    pub fn is_animating(&self) -> bool {
        let now = Instant::now();
        self.scroll.needs_update()
            || self.frames.pending() > 0
            || self.background_fade.is_some()
            || self
                .about_changed
                .is_some_and(|at| now.duration_since(at) < REVEAL_SETTLE)
            || self.cursor.is_some_and(|c| !c.is_settled(CURSOR_TOLERANCE))
            || now.duration_since(self.started_at) < REVEAL_SETTLE
            || lock(&self.revealed)
                .values()
                .any(|at| now.duration_since(*at) < REVEAL_SETTLE)
    }

    pub fn apply(&mut self, action: Action) {
        let max = self.layout.max_scroll();
        let viewport = self.layout.viewport_rows();
        match action {
            Action::Quit => self.should_quit = true,
            Action::ScrollDown => self.scroll.scroll_lines(1, max),
            Action::ScrollUp => self.scroll.scroll_lines(-1, max),
            Action::Wheel(notches) => self.scroll.scroll_lines(notches, max),
            Action::ScrollHalfPageDown => self.scroll.scroll_half_page(true, viewport, max),
            Action::ScrollHalfPageUp => self.scroll.scroll_half_page(false, viewport, max),
            Action::JumpToTop => self.scroll.scroll_to(0, max),
            Action::JumpToBottom => self.scroll.scroll_to(max, max),
            Action::JumpTo(section) => self.jump_to(section),
            Action::ToggleMenu => self.menu_open = !self.menu_open,
            Action::CloseMenu => self.menu_open = false,
            Action::NextLink => self.focus_link(1),
            Action::PrevLink => self.focus_link(-1),
            Action::OpenLink => self.open_focused_link(),
            Action::CarouselNext => {
                self.about.select_next();
            }
            Action::CarouselPrev => {
                self.about.select_previous();
            }
            Action::PointerMoved { column, row } => self.pointer_moved(column, row),
            Action::Click { column, row } => self.click(column, row),
            Action::None => {}
        }
    }

    pub fn jump_to(&mut self, section: Section) {
        let top = self.layout.span(section).top;
        self.scroll.scroll_to(top, self.layout.max_scroll());
        self.menu_open = false;
    }

    fn pointer_moved(&mut self, column: u16, row: u16) {
        self.pointer_events.emit(&PointerEvent {
            x: column as f64 * COL_PX,
            y: row as f64 * ROW_PX,
        });
    }

    fn click(&mut self, column: u16, row: u16) {
        match self.hit_test(column, row) {
            Some(HitTarget::Nav(section)) | Some(HitTarget::MenuItem(section)) => {
                self.jump_to(section)
            }
            Some(HitTarget::MenuToggle) => self.menu_open = !self.menu_open,
            Some(HitTarget::CarouselDot(index)) => {
                self.about.select(index);
            }
            None => self.menu_open = false,
        }
    }

    /// What sits at screen cell (`column`, `row`)
    pub fn hit_test(&self, column: u16, row: u16) -> Option<HitTarget> {
        if self.menu_open && row >= HEADER_HEIGHT {
            let index = (row - HEADER_HEIGHT) as usize;
            if let Some(section) = Section::ALL.get(index) {
                return Some(HitTarget::MenuItem(*section));
            }
        }

        if row == NAV_ROW {
            return match NavLayout::for_width(self.layout.width()) {
                NavLayout::Full(items) => items
                    .into_iter()
                    .find(|(_, x, w)| column >= *x && column < x + w)
                    .map(|(section, _, _)| HitTarget::Nav(section)),
                NavLayout::Compact { x, width } => {
                    (column >= x && column < x + width).then_some(HitTarget::MenuToggle)
                }
            };
        }

        if row < HEADER_HEIGHT || row >= HEADER_HEIGHT + self.layout.viewport_rows() {
            return None;
        }
        let page_row = self.scroll.current_scroll() as i32 + (row - HEADER_HEIGHT) as i32;
        let about = self.layout.span(Section::About);
        let dots_row = about.top as i32 + self.section_shift(Section::About) + ABOUT_DOTS_ROW as i32;
        if page_row == dots_row {
            return carousel_dot_at(self.layout.width(), self.about.len(), column)
                .map(HitTarget::CarouselDot);
        }
        None
    }

    fn focus_link(&mut self, step: isize) {
        if self.links.is_empty() {
            return;
        }
        let len = self.links.len() as isize;
        let next = match self.focused_link {
            Some(i) => (i as isize + step).rem_euclid(len),
            None if step >= 0 => 0,
            None => len - 1,
        } as usize;
        self.focused_link = Some(next);

        let section = self.links[next].section;
        if self.layout.section_at(self.scroll.target_scroll()) != Some(section) {
            self.jump_to(section);
        }
    }

    pub fn focused_url(&self) -> Option<&str> {
        self.focused_link
            .and_then(|i| self.links.get(i))
            .map(|link| link.url.as_str())
    }

    fn open_focused_link(&mut self) {
        let Some(link) = self.focused_link.and_then(|i| self.links.get(i)).cloned() else {
            self.set_status("Tab to a link first");
            return;
        };
        match Url::parse(&link.url) {
            Ok(url) => match open::that(url.as_str()) {
                Ok(()) => {
                    info!(url = %url, "Opened link");
                    self.set_status(format!("Opened {}", link.label));
                }
                Err(e) => {
                    warn!("Failed to open {}: {}", url, e);
                    self.set_status(format!("Could not open {}: {}", link.label, e));
                }
            },
            Err(e) => self.set_status(format!("Invalid link {}: {}", link.url, e)),
        }
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some((message.into(), Instant::now()));
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_ref().map(|(message, _)| message.as_str())
    }

    /// Section under the top of the viewport
    pub fn active_section(&self) -> Section {
        self.layout
            .section_at(self.scroll.current_scroll())
            .unwrap_or(Section::Hero)
    }

    pub fn is_header_scrolled(&self) -> bool {
        self.scroll_sampler.is_scrolled()
    }

    pub fn header_pose(&self) -> Pose {
        header_entrance().pose_at(self.started_at.elapsed())
    }

    /// Reveal pose of a whole section
    pub fn section_pose(&self, section: Section) -> Pose {
        let variant = fade_in_up();
        match lock(&self.revealed).get(&section) {
            Some(at) => variant.pose_at(at.elapsed()),
            None => variant.hidden,
        }
    }

    /// Reveal pose of the `index`th card in a section
    pub fn child_pose(&self, section: Section, index: usize) -> Pose {
        let variant = fade_in_up();
        match lock(&self.revealed).get(&section) {
            Some(at) => self.stagger.child_pose(&variant, index, at.elapsed()),
            None => variant.hidden,
        }
    }

    /// Pop-in pose of the carousel photo after it changes
    pub fn carousel_pose(&self) -> Pose {
        match self.about_changed {
            Some(at) => scale_in().pose_at(at.elapsed()),
            None => Pose::default(),
        }
    }

    /// Vertical shift in rows applied to a section by its reveal pose
    pub fn section_shift(&self, section: Section) -> i32 {
        rows_for(self.section_pose(section).offset_y)
    }

    pub fn is_revealed(&self, section: Section) -> bool {
        lock(&self.revealed).contains_key(&section)
    }

    /// Background item fading out (if any), the current one, and crossfade progress
    pub fn background_crossfade(&self) -> (Option<String>, Option<String>, f64) {
        let current = self.background.current_item();
        match self.background_fade {
            Some((previous, since)) => {
                let t = since.elapsed().as_secs_f64() / CROSSFADE.as_secs_f64();
                let previous = self.background.with_state(|s| s.items().get(previous).cloned());
                (previous, current, t.clamp(0.0, 1.0))
            }
            None => (None, current, 1.0),
        }
    }

    /// Parallax drift of the hero background in rows, driven by whole-page
    /// scroll progress
    pub fn hero_parallax_rows(&self) -> f64 {
        let hero = self.layout.span(Section::Hero);
        self.scroll_sampler
            .parallax_offset(self.layout.max_scroll() as f64 * ROW_PX, hero.height as f64)
    }

    /// Hero particle cells within a `width` x `height` area
    pub fn particle_cells(&self, width: u16, height: u16) -> Vec<(u16, u16)> {
        let span_x = width.saturating_sub(1) as f64;
        let span_y = height.saturating_sub(1) as f64;
        self.particles
            .positions_at(self.started_at.elapsed())
            .into_iter()
            .map(|(x, y)| ((x * span_x).round() as u16, (y * span_y).round() as u16))
            .collect()
    }

    /// Cursor follower position in cells, once the pointer has moved
    pub fn cursor_cell(&self) -> Option<(u16, u16)> {
        let (x, y) = self.cursor?.position();
        Some((x.round().max(0.0) as u16, y.round().max(0.0) as u16))
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Convert a px offset into whole rows
pub fn rows_for(offset_px: f64) -> i32 {
    (offset_px / ROW_PX).round() as i32
}

fn collect_links(profile: &Profile) -> Vec<LinkRef> {
    let ventures = profile.ventures.iter().filter_map(|v| {
        v.url.as_ref().map(|url| LinkRef {
            section: Section::Ventures,
            label: v.name.clone(),
            url: url.clone(),
        })
    });
    let projects = profile.projects.iter().filter_map(|p| {
        p.url.as_ref().map(|url| LinkRef {
            section: Section::Projects,
            label: p.title.clone(),
            url: url.clone(),
        })
    });
    let socials = profile.socials.iter().map(|s| LinkRef {
        section: Section::Socials,
        label: s.platform.clone(),
        url: s.url.clone(),
    });
    ventures.chain(projects).chain(socials).collect()
}
