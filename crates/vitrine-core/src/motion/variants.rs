//! Enter animations: hidden/visible poses and the transitions between them

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::easing::EasingType;
use super::spring::SpringConfig;
use super::timing::{lerp, progress_after};

/// Visual properties animated by a variant
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub opacity: f64,
    /// Vertical offset in px (positive = below its resting place)
    pub offset_y: f64,
    pub scale: f64,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            offset_y: 0.0,
            scale: 1.0,
        }
    }
}

impl Pose {
    pub fn lerp(&self, to: &Pose, t: f64) -> Pose {
        Pose {
            opacity: lerp(self.opacity, to.opacity, t),
            offset_y: lerp(self.offset_y, to.offset_y, t),
            scale: lerp(self.scale, to.scale, t),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Transition {
    Spring(SpringConfig),
    Tween { duration_ms: u64, easing: EasingType },
}

impl Transition {
    /// Progress in [0, 1] after `elapsed`
    pub fn progress(&self, elapsed: Duration) -> f64 {
        match self {
            Transition::Spring(spring) => spring.progress_at(elapsed).clamp(0.0, 1.0),
            Transition::Tween { duration_ms, easing } => {
                easing.apply(progress_after(elapsed, Duration::from_millis(*duration_ms)))
            }
        }
    }
}

/// A hidden → visible animation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub hidden: Pose,
    pub visible: Pose,
    pub transition: Transition,
}

impl Variant {
    /// Pose `elapsed` after the animation started
    pub fn pose_at(&self, elapsed: Duration) -> Pose {
        self.hidden.lerp(&self.visible, self.transition.progress(elapsed))
    }
}

/// Fade in while rising 20px, on the default spring
pub fn fade_in_up() -> Variant {
    Variant {
        hidden: Pose {
            opacity: 0.0,
            offset_y: 20.0,
            scale: 1.0,
        },
        visible: Pose::default(),
        transition: Transition::Spring(SpringConfig::default()),
    }
}

/// Fade in while growing from 80%, on the default spring
pub fn scale_in() -> Variant {
    Variant {
        hidden: Pose {
            opacity: 0.0,
            offset_y: 0.0,
            scale: 0.8,
        },
        visible: Pose::default(),
        transition: Transition::Spring(SpringConfig::default()),
    }
}

/// Header slide-down on first paint
pub fn header_entrance() -> Variant {
    Variant {
        hidden: Pose {
            opacity: 1.0,
            offset_y: -100.0,
            scale: 1.0,
        },
        visible: Pose::default(),
        transition: Transition::Tween {
            duration_ms: 600,
            easing: EasingType::EaseOut,
        },
    }
}

/// Child delays for a staggered container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stagger {
    pub stagger_children: Duration,
    pub delay_children: Duration,
}

impl Default for Stagger {
    fn default() -> Self {
        Self {
            stagger_children: Duration::from_millis(100),
            delay_children: Duration::from_millis(200),
        }
    }
}

impl Stagger {
    /// Start delay of the `index`th child
    pub fn delay_for(&self, index: usize) -> Duration {
        self.delay_children + self.stagger_children * index as u32
    }

    /// Pose of the `index`th child `elapsed` after the container appeared
    pub fn child_pose(&self, variant: &Variant, index: usize, elapsed: Duration) -> Pose {
        match elapsed.checked_sub(self.delay_for(index)) {
            Some(own) => variant.pose_at(own),
            None => variant.hidden,
        }
    }
}

/// When reveal-on-scroll animations trigger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealConfig {
    /// Only animate the first time
    pub once: bool,
    /// Root margin for the visibility check
    pub margin: String,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            once: true,
            margin: "-100px".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fade_in_up_endpoints() {
        let variant = fade_in_up();
        let start = variant.pose_at(Duration::ZERO);
        assert_eq!(start.opacity, 0.0);
        assert_eq!(start.offset_y, 20.0);

        let end = variant.pose_at(Duration::from_secs(3));
        assert!((end.opacity - 1.0).abs() < 0.01);
        assert!(end.offset_y.abs() < 0.2);
    }

    #[test]
    fn test_scale_in_grows() {
        let variant = scale_in();
        assert_eq!(variant.pose_at(Duration::ZERO).scale, 0.8);
        let mid = variant.pose_at(Duration::from_millis(200)).scale;
        assert!(mid > 0.8 && mid < 1.0);
    }

    #[test]
    fn test_tween_header_entrance() {
        let variant = header_entrance();
        assert_eq!(variant.pose_at(Duration::ZERO).offset_y, -100.0);
        assert_eq!(variant.pose_at(Duration::from_millis(600)).offset_y, 0.0);
    }

    #[test]
    fn test_pose_after_hours_open_is_visible() {
        let variant = fade_in_up();
        let started = std::time::Instant::now();
        for hours in 1..=1000u64 {
            let pose = variant.pose_at(Duration::from_secs(hours * 3600));
            assert_eq!(pose.opacity, 1.0);
            assert!(pose.offset_y.abs() < 1e-9);
        }
        assert!(started.elapsed() < Duration::from_millis(500));
    }

    #[test]
    fn test_stagger_delays() {
        let stagger = Stagger::default();
        assert_eq!(stagger.delay_for(0), Duration::from_millis(200));
        assert_eq!(stagger.delay_for(3), Duration::from_millis(500));

        let variant = fade_in_up();
        let pose = stagger.child_pose(&variant, 2, Duration::from_millis(350));
        assert_eq!(pose, variant.hidden);
        let pose = stagger.child_pose(&variant, 0, Duration::from_millis(350));
        assert!(pose.opacity > 0.0);
    }

    #[test]
    fn test_reveal_defaults() {
        let reveal = RevealConfig::default();
        assert!(reveal.once);
        assert_eq!(reveal.margin, "-100px");
    }
}
