//! Page geometry: where each section sits on the scrolled page
//!
//! Positions are in terminal cells. Anything handed to the core observers and
//! samplers is converted to px with one row = 16px and one column = 8px, so
//! px-based settings (header threshold, root margins) keep their meaning.

use unicode_width::UnicodeWidthStr;
use vitrine_core::viewport::Rect as PxRect;
use vitrine_core::Profile;

pub const ROW_PX: f64 = 16.0;
pub const COL_PX: f64 = 8.0;

/// Rows taken by the fixed header
pub const HEADER_HEIGHT: u16 = 3;
/// Row of the navigation inside the header
pub const NAV_ROW: u16 = 1;
/// Below this width the navigation collapses into a menu toggle
pub const COMPACT_WIDTH: u16 = 80;

/// Section heading plus its underline and a blank row
pub const HEADING_ROWS: u16 = 3;
pub const VENTURE_CARD_ROWS: u16 = 4;
pub const PROJECT_CARD_ROWS: u16 = 6;
pub const CAROUSEL_ROWS: u16 = 7;
/// Row of the carousel indicator dots inside the about section
pub const ABOUT_DOTS_ROW: u16 = HEADING_ROWS + CAROUSEL_ROWS;
const MIN_HERO_ROWS: u16 = 12;
const DOT_SPACING: u16 = 2;
const MENU_LABEL: &str = "☰ Menu";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Hero,
    Ventures,
    About,
    Projects,
    Socials,
}

impl Section {
    pub const ALL: [Section; 5] = [
        Section::Hero,
        Section::Ventures,
        Section::About,
        Section::Projects,
        Section::Socials,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Section::Hero => "Home",
            Section::Ventures => "Ventures",
            Section::About => "About",
            Section::Projects => "Projects",
            Section::Socials => "Contact",
        }
    }

    /// Observer target name
    pub fn id(&self) -> &'static str {
        match self {
            Section::Hero => "hero",
            Section::Ventures => "ventures",
            Section::About => "about",
            Section::Projects => "projects",
            Section::Socials => "socials",
        }
    }

    pub fn from_id(id: &str) -> Option<Section> {
        Section::ALL.into_iter().find(|s| s.id() == id)
    }

    /// `1`..`5` select sections in page order
    pub fn from_digit(c: char) -> Option<Section> {
        let index = c.to_digit(10)? as usize;
        index.checked_sub(1).and_then(|i| Section::ALL.get(i).copied())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionSpan {
    pub section: Section,
    /// First page row
    pub top: u16,
    pub height: u16,
}

impl SectionSpan {
    pub fn bottom(&self) -> u16 {
        self.top + self.height
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLayout {
    width: u16,
    /// Rows available to the page below the header
    viewport_rows: u16,
    spans: Vec<SectionSpan>,
}

impl PageLayout {
    pub fn compute(profile: &Profile, width: u16, height: u16) -> Self {
        let viewport_rows = height.saturating_sub(HEADER_HEIGHT + 1).max(1);
        let text_width = width.saturating_sub(4).max(1);

        let mut spans = Vec::with_capacity(Section::ALL.len());
        let mut top = 0u16;
        for section in Section::ALL {
            let height = match section {
                Section::Hero => viewport_rows.max(MIN_HERO_ROWS),
                Section::Ventures => {
                    HEADING_ROWS + (VENTURE_CARD_ROWS + 1) * profile.ventures.len() as u16
                }
                Section::About => {
                    let bio_rows: u16 = profile
                        .bio
                        .iter()
                        .map(|p| wrapped_rows(p, text_width) + 1)
                        .sum();
                    ABOUT_DOTS_ROW + 2 + bio_rows
                }
                Section::Projects => {
                    HEADING_ROWS + (PROJECT_CARD_ROWS + 1) * profile.projects.len() as u16
                }
                Section::Socials => HEADING_ROWS + profile.socials.len() as u16 + 2,
            };
            spans.push(SectionSpan { section, top, height });
            top = top.saturating_add(height);
        }

        Self {
            width,
            viewport_rows,
            spans,
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn viewport_rows(&self) -> u16 {
        self.viewport_rows
    }

    pub fn spans(&self) -> &[SectionSpan] {
        &self.spans
    }

    pub fn span(&self, section: Section) -> SectionSpan {
        self.spans
            .iter()
            .copied()
            .find(|s| s.section == section)
            .unwrap_or(SectionSpan {
                section,
                top: 0,
                height: 0,
            })
    }

    pub fn total_height(&self) -> u16 {
        self.spans.last().map(|s| s.bottom()).unwrap_or(0)
    }

    /// Furthest scroll offset. The page is padded past its end so the last
    /// section's top can reach the top of the viewport.
    pub fn max_scroll(&self) -> u16 {
        let last_top = self.spans.last().map(|s| s.top).unwrap_or(0);
        self.total_height()
            .saturating_sub(self.viewport_rows)
            .max(last_top)
    }

    /// Section containing `page_row`
    pub fn section_at(&self, page_row: u16) -> Option<Section> {
        self.spans
            .iter()
            .find(|s| page_row >= s.top && page_row < s.bottom())
            .map(|s| s.section)
    }

    /// Section bounds in page px
    pub fn bounds_px(&self, section: Section) -> PxRect {
        let span = self.span(section);
        PxRect::new(
            0.0,
            span.top as f64 * ROW_PX,
            self.width as f64 * COL_PX,
            span.height as f64 * ROW_PX,
        )
    }

    /// Visible part of the page in page px when scrolled to `scroll` rows
    pub fn viewport_px(&self, scroll: u16) -> PxRect {
        PxRect::new(
            0.0,
            scroll as f64 * ROW_PX,
            self.width as f64 * COL_PX,
            self.viewport_rows as f64 * ROW_PX,
        )
    }
}

/// Rows `text` takes when wrapped at `width` columns
pub fn wrapped_rows(text: &str, width: u16) -> u16 {
    let width = width.max(1) as usize;
    text.lines()
        .map(|line| line.width().div_ceil(width).max(1) as u16)
        .sum::<u16>()
        .max(1)
}

/// Navigation hit areas in the header row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavLayout {
    /// One entry per section: (section, first column, width)
    Full(Vec<(Section, u16, u16)>),
    /// Narrow terminals show a single menu toggle
    Compact { x: u16, width: u16 },
}

impl NavLayout {
    pub fn for_width(width: u16) -> Self {
        if width < COMPACT_WIDTH {
            let label = MENU_LABEL.width() as u16;
            return NavLayout::Compact {
                x: width.saturating_sub(label + 2),
                width: label,
            };
        }

        let total: u16 = Section::ALL
            .iter()
            .map(|s| s.title().width() as u16 + 3)
            .sum();
        let mut x = width.saturating_sub(total + 1);
        let mut items = Vec::with_capacity(Section::ALL.len());
        for section in Section::ALL {
            let w = section.title().width() as u16;
            items.push((section, x, w));
            x += w + 3;
        }
        NavLayout::Full(items)
    }

    pub fn menu_label() -> &'static str {
        MENU_LABEL
    }
}

/// Columns of the carousel indicator dots, centered in `width`
pub fn carousel_dots(width: u16, count: usize) -> Vec<u16> {
    if count == 0 {
        return Vec::new();
    }
    let count = count as u16;
    let span = count + (count - 1) * (DOT_SPACING - 1);
    let start = width.saturating_sub(span) / 2;
    (0..count).map(|i| start + i * DOT_SPACING).collect()
}

/// Which carousel dot, if any, sits at column `x`
pub fn carousel_dot_at(width: u16, count: usize, x: u16) -> Option<usize> {
    carousel_dots(width, count).iter().position(|&col| col == x)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sections_are_contiguous() {
        let layout = PageLayout::compute(&Profile::sample(), 100, 40);
        let mut expected_top = 0;
        for span in layout.spans() {
            assert_eq!(span.top, expected_top);
            assert!(span.height > 0);
            expected_top = span.bottom();
        }
        assert_eq!(layout.total_height(), expected_top);
    }

    #[test]
    fn test_hero_fills_viewport() {
        let layout = PageLayout::compute(&Profile::sample(), 100, 40);
        assert_eq!(layout.span(Section::Hero).height, layout.viewport_rows());
        let small = PageLayout::compute(&Profile::sample(), 100, 8);
        assert_eq!(small.span(Section::Hero).height, MIN_HERO_ROWS);
    }

    #[test]
    fn test_section_lookup() {
        let layout = PageLayout::compute(&Profile::sample(), 100, 40);
        let about = layout.span(Section::About);
        assert_eq!(layout.section_at(about.top), Some(Section::About));
        assert_eq!(layout.section_at(about.bottom() - 1), Some(Section::About));
        assert_eq!(layout.section_at(layout.total_height()), None);
    }

    #[test]
    fn test_every_section_top_is_reachable() {
        for (width, height) in [(120, 40), (80, 24), (200, 60)] {
            let layout = PageLayout::compute(&Profile::sample(), width, height);
            for span in layout.spans() {
                assert!(span.top <= layout.max_scroll(), "{:?} at {}x{}", span.section, width, height);
                assert_eq!(layout.section_at(span.top), Some(span.section));
            }
        }
    }

    #[test]
    fn test_max_scroll_unpadded_for_tall_last_section() {
        let mut profile = Profile::sample();
        profile.socials = (0..60).map(|_| profile.socials[0].clone()).collect();
        let layout = PageLayout::compute(&profile, 120, 40);
        assert_eq!(
            layout.max_scroll(),
            layout.total_height() - layout.viewport_rows()
        );
    }

    #[test]
    fn test_px_conversion() {
        let layout = PageLayout::compute(&Profile::sample(), 100, 40);
        let viewport = layout.viewport_px(3);
        assert_eq!(viewport.y, 48.0);
        assert_eq!(viewport.width, 800.0);
    }

    #[test]
    fn test_digits_select_sections() {
        assert_eq!(Section::from_digit('1'), Some(Section::Hero));
        assert_eq!(Section::from_digit('5'), Some(Section::Socials));
        assert_eq!(Section::from_digit('0'), None);
        assert_eq!(Section::from_digit('6'), None);
        assert_eq!(Section::from_id("projects"), Some(Section::Projects));
    }

    #[test]
    fn test_nav_layout() {
        match NavLayout::for_width(120) {
            NavLayout::Full(items) => {
                assert_eq!(items.len(), 5);
                assert!(items.windows(2).all(|w| w[0].1 + w[0].2 < w[1].1));
                let (_, x, w) = items[4];
                assert!(x + w <= 120);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(NavLayout::for_width(60), NavLayout::Compact { .. }));
    }

    #[test]
    fn test_carousel_dots() {
        let dots = carousel_dots(20, 4);
        assert_eq!(dots, vec![6, 8, 10, 12]);
        assert_eq!(carousel_dot_at(20, 4, 10), Some(2));
        assert_eq!(carousel_dot_at(20, 4, 7), None);
        assert!(carousel_dots(20, 0).is_empty());
    }

    #[test]
    fn test_wrapped_rows() {
        assert_eq!(wrapped_rows("abcdef", 3), 2);
        assert_eq!(wrapped_rows("ab\ncd", 10), 2);
        assert_eq!(wrapped_rows("", 10), 1);
    }
}
