//! Viewport visibility observer
//!
//! Tracks a set of target rectangles against a root region and reports when
//! a target's visible fraction crosses one of the configured thresholds.
//! This drives lazy behaviour such as reveal-on-scroll animations.

use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::{Error, Result};

/// Axis-aligned rectangle in page coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Overlapping region, or `None` when the rectangles neither overlap nor
    /// touch.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right < left || bottom < top {
            return None;
        }
        Some(Rect::new(left, top, right - left, bottom - top))
    }
}

/// One side of a root margin
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MarginValue {
    Px(f64),
    Percent(f64),
}

impl MarginValue {
    fn resolve(self, reference: f64) -> f64 {
        match self {
            MarginValue::Px(px) => px,
            MarginValue::Percent(pct) => reference * pct / 100.0,
        }
    }
}

impl FromStr for MarginValue {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidRootMargin(s.to_string());
        if let Some(number) = s.strip_suffix("px") {
            number.parse().map(MarginValue::Px).map_err(|_| invalid())
        } else if let Some(number) = s.strip_suffix('%') {
            number.parse().map(MarginValue::Percent).map_err(|_| invalid())
        } else if s == "0" {
            Ok(MarginValue::Px(0.0))
        } else {
            Err(invalid())
        }
    }
}

/// Margin applied around the root before intersecting, CSS shorthand order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootMargin {
    pub top: MarginValue,
    pub right: MarginValue,
    pub bottom: MarginValue,
    pub left: MarginValue,
}

impl RootMargin {
    /// Grow (or, for negative values, shrink) `root` by this margin.
    pub fn apply(&self, root: &Rect) -> Rect {
        let top = self.top.resolve(root.height);
        let bottom = self.bottom.resolve(root.height);
        let left = self.left.resolve(root.width);
        let right = self.right.resolve(root.width);
        Rect::new(
            root.x - left,
            root.y - top,
            root.width + left + right,
            root.height + top + bottom,
        )
    }
}

impl FromStr for RootMargin {
    type Err = Error;

    /// Parse 1 to 4 space separated `px`/`%` values, as in CSS `margin`.
    fn from_str(s: &str) -> Result<Self> {
        let values = s
            .split_whitespace()
            .map(|part| {
                part.parse::<MarginValue>()
                    .map_err(|_| Error::InvalidRootMargin(s.to_string()))
            })
            .collect::<Result<Vec<_>>>()?;

        let (top, right, bottom, left) = match values.as_slice() {
            [all] => (*all, *all, *all, *all),
            [vertical, horizontal] => (*vertical, *horizontal, *vertical, *horizontal),
            [top, horizontal, bottom] => (*top, *horizontal, *bottom, *horizontal),
            [top, right, bottom, left] => (*top, *right, *bottom, *left),
            _ => return Err(Error::InvalidRootMargin(s.to_string())),
        };
        Ok(RootMargin {
            top,
            right,
            bottom,
            left,
        })
    }
}

/// Visibility threshold(s): a single ratio or a list of ratios
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Threshold {
    Single(f64),
    Multiple(Vec<f64>),
}

impl Default for Threshold {
    fn default() -> Self {
        Threshold::Single(0.1)
    }
}

impl Threshold {
    /// Sorted, deduplicated thresholds, each checked to lie in [0, 1].
    pub fn normalized(&self) -> Result<Vec<f64>> {
        let mut values = match self {
            Threshold::Single(value) => vec![*value],
            Threshold::Multiple(values) if values.is_empty() => vec![0.0],
            Threshold::Multiple(values) => values.clone(),
        };
        if let Some(bad) = values.iter().find(|v| !(0.0..=1.0).contains(*v)) {
            return Err(Error::InvalidThreshold(format!(
                "{} is outside [0, 1]",
                bad
            )));
        }
        values.sort_by(f64::total_cmp);
        values.dedup();
        Ok(values)
    }
}

/// Options accepted by [`create_viewport_observer`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObserverOptions {
    /// Explicit root region; `None` observes against the viewport
    #[serde(default)]
    pub root: Option<Rect>,
    #[serde(default = "default_root_margin")]
    pub root_margin: String,
    #[serde(default)]
    pub threshold: Threshold,
}

impl Default for ObserverOptions {
    fn default() -> Self {
        Self {
            root: None,
            root_margin: default_root_margin(),
            threshold: Threshold::default(),
        }
    }
}

fn default_root_margin() -> String {
    "50px".to_string()
}

/// Visibility report for one target
#[derive(Debug, Clone, PartialEq)]
pub struct IntersectionEntry {
    pub target: String,
    pub bounds: Rect,
    pub root_bounds: Rect,
    pub intersection: Option<Rect>,
    pub ratio: f64,
    pub is_intersecting: bool,
}

/// Callback receiving the entries that changed during a check
pub type ObserverCallback = Box<dyn FnMut(&[IntersectionEntry]) + Send>;

#[derive(Debug, Clone)]
struct Target {
    bounds: Rect,
    /// Bucket and intersecting flag from the previous check
    last: Option<(usize, bool)>,
}

/// Observer over a set of named target rectangles
pub struct ViewportObserver {
    root: Option<Rect>,
    margin: RootMargin,
    thresholds: Vec<f64>,
    targets: HashMap<String, Target>,
    /// Observation order, for stable entry ordering
    order: Vec<String>,
    callback: ObserverCallback,
}

/// Build an observer, filling unspecified options with defaults
/// (viewport root, `50px` margin, `0.1` threshold).
pub fn create_viewport_observer<F>(callback: F, options: Option<ObserverOptions>) -> Result<ViewportObserver>
where
    F: FnMut(&[IntersectionEntry]) + Send + 'static,
{
    let options = options.unwrap_or_default();
    let margin = options.root_margin.parse::<RootMargin>()?;
    let thresholds = options.threshold.normalized()?;

    debug!(
        root_margin = %options.root_margin,
        thresholds = ?thresholds,
        "Viewport observer created"
    );

    Ok(ViewportObserver {
        root: options.root,
        margin,
        thresholds,
        targets: HashMap::new(),
        order: Vec::new(),
        callback: Box::new(callback),
    })
}

impl ViewportObserver {
    /// Start observing `target`. Re-observing an existing target resets it
    /// so the next check reports it again.
    pub fn observe(&mut self, target: impl Into<String>, bounds: Rect) {
        let target = target.into();
        if !self.targets.contains_key(&target) {
            self.order.push(target.clone());
        }
        self.targets.insert(target, Target { bounds, last: None });
    }

    pub fn unobserve(&mut self, target: &str) {
        if self.targets.remove(target).is_some() {
            self.order.retain(|t| t != target);
        }
    }

    /// Move a target without resetting its reported state.
    pub fn update_bounds(&mut self, target: &str, bounds: Rect) -> bool {
        match self.targets.get_mut(target) {
            Some(entry) => {
                entry.bounds = bounds;
                true
            }
            None => false,
        }
    }

    pub fn is_observing(&self, target: &str) -> bool {
        self.targets.contains_key(target)
    }

    pub fn disconnect(&mut self) {
        self.targets.clear();
        self.order.clear();
    }

    /// Intersect every target with the root (or `viewport`) and deliver the
    /// entries whose threshold bucket or intersecting state changed.
    ///
    /// Returns the number of entries delivered.
    pub fn check(&mut self, viewport: Rect) -> usize {
        let root = self.margin.apply(&self.root.unwrap_or(viewport));
        let mut entries = Vec::new();

        for name in &self.order {
            let Some(target) = self.targets.get_mut(name) else {
                continue;
            };
            let intersection = target.bounds.intersection(&root);
            let is_intersecting = intersection.is_some();
            let ratio = match intersection {
                Some(overlap) if target.bounds.area() > 0.0 => overlap.area() / target.bounds.area(),
                Some(_) => 1.0,
                None => 0.0,
            };
            let bucket = self.thresholds.iter().filter(|t| ratio >= **t).count();

            if target.last == Some((bucket, is_intersecting)) {
                continue;
            }
            target.last = Some((bucket, is_intersecting));
            trace!(target = %name, ratio, is_intersecting, "intersection changed");

            entries.push(IntersectionEntry {
                target: name.clone(),
                bounds: target.bounds,
                root_bounds: root,
                intersection,
                ratio,
                is_intersecting,
            });
        }

        if !entries.is_empty() {
            (self.callback)(&entries);
        }
        entries.len()
    }

    pub fn thresholds(&self) -> &[f64] {
        &self.thresholds
    }

    pub fn root_margin(&self) -> RootMargin {
        self.margin
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn collecting(options: Option<ObserverOptions>) -> (ViewportObserver, Arc<Mutex<Vec<IntersectionEntry>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let observer = create_viewport_observer(
            move |entries: &[IntersectionEntry]| sink.lock().unwrap().extend_from_slice(entries),
            options,
        )
        .unwrap();
        (observer, seen)
    }

    #[test]
    fn test_default_options() {
        let options = ObserverOptions::default();
        assert_eq!(options.root, None);
        assert_eq!(options.root_margin, "50px");
        assert_eq!(options.threshold, Threshold::Single(0.1));
    }

    #[test]
    fn test_parse_root_margin() {
        let margin: RootMargin = "-100px".parse().unwrap();
        assert_eq!(margin.top, MarginValue::Px(-100.0));
        assert_eq!(margin.left, MarginValue::Px(-100.0));

        let margin: RootMargin = "10px 5%".parse().unwrap();
        assert_eq!(margin.top, MarginValue::Px(10.0));
        assert_eq!(margin.right, MarginValue::Percent(5.0));
        assert_eq!(margin.bottom, MarginValue::Px(10.0));

        let margin: RootMargin = "1px 2px 3px 4px".parse().unwrap();
        assert_eq!(margin.left, MarginValue::Px(4.0));

        assert!("50".parse::<RootMargin>().is_err());
        assert!("".parse::<RootMargin>().is_err());
        assert!("1px 2px 3px 4px 5px".parse::<RootMargin>().is_err());
    }

    #[test]
    fn test_invalid_options_fail_construction() {
        let bad_margin = ObserverOptions {
            root_margin: "wide".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            create_viewport_observer(|_: &[IntersectionEntry]| {}, Some(bad_margin)),
            Err(Error::InvalidRootMargin(_))
        ));

        let bad_threshold = ObserverOptions {
            threshold: Threshold::Multiple(vec![0.0, 1.5]),
            ..Default::default()
        };
        assert!(matches!(
            create_viewport_observer(|_: &[IntersectionEntry]| {}, Some(bad_threshold)),
            Err(Error::InvalidThreshold(_))
        ));
    }

    #[test]
    fn test_margin_expands_root() {
        let (mut observer, seen) = collecting(None);
        // Target sits 30px below a 100px viewport: outside, but within 50px.
        observer.observe("about", Rect::new(0.0, 130.0, 100.0, 100.0));
        observer.check(Rect::new(0.0, 0.0, 100.0, 100.0));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].is_intersecting);
        assert!((seen[0].ratio - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_reports_only_changes() {
        let options = ObserverOptions {
            root_margin: "0px".to_string(),
            threshold: Threshold::Multiple(vec![0.0, 0.5, 1.0]),
            ..Default::default()
        };
        let (mut observer, seen) = collecting(Some(options));
        observer.observe("projects", Rect::new(0.0, 200.0, 100.0, 100.0));

        let viewport = |y: f64| Rect::new(0.0, y, 100.0, 100.0);
        assert_eq!(observer.check(viewport(0.0)), 1); // initial report
        assert_eq!(observer.check(viewport(10.0)), 0); // still hidden
        assert_eq!(observer.check(viewport(120.0)), 1); // 20% visible
        assert_eq!(observer.check(viewport(130.0)), 0); // same bucket
        assert_eq!(observer.check(viewport(160.0)), 1); // crossed 0.5
        assert_eq!(observer.check(viewport(200.0)), 1); // fully visible

        let ratios: Vec<f64> = seen.lock().unwrap().iter().map(|e| e.ratio).collect();
        assert_eq!(ratios.len(), 4);
        assert_eq!(ratios[0], 0.0);
        assert!((ratios[3] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_explicit_root_ignores_viewport() {
        let options = ObserverOptions {
            root: Some(Rect::new(0.0, 0.0, 50.0, 50.0)),
            root_margin: "0px".to_string(),
            ..Default::default()
        };
        let (mut observer, seen) = collecting(Some(options));
        observer.observe("card", Rect::new(0.0, 0.0, 10.0, 10.0));
        observer.check(Rect::new(0.0, 1000.0, 10.0, 10.0));

        assert!(seen.lock().unwrap()[0].is_intersecting);
    }

    #[test]
    fn test_unobserve_and_disconnect() {
        let (mut observer, seen) = collecting(None);
        observer.observe("a", Rect::new(0.0, 0.0, 10.0, 10.0));
        observer.observe("b", Rect::new(0.0, 0.0, 10.0, 10.0));
        observer.unobserve("a");
        assert!(!observer.is_observing("a"));

        observer.check(Rect::new(0.0, 0.0, 100.0, 100.0));
        assert_eq!(seen.lock().unwrap().len(), 1);

        observer.disconnect();
        assert_eq!(observer.check(Rect::new(0.0, 0.0, 100.0, 100.0)), 0);
    }

    #[test]
    fn test_threshold_deserializes_number_or_list() {
        #[derive(Deserialize)]
        struct Wrapper {
            threshold: Threshold,
        }
        let single: Wrapper = toml::from_str("threshold = 0.25").unwrap();
        assert_eq!(single.threshold, Threshold::Single(0.25));
        let list: Wrapper = toml::from_str("threshold = [0.0, 0.5]").unwrap();
        assert_eq!(list.threshold, Threshold::Multiple(vec![0.0, 0.5]));
    }
}
