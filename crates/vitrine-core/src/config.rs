use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::motion::{EasingType, RevealConfig};
use crate::sampler::PointerMode;
use crate::viewport::{ObserverOptions, Threshold};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub sampler: SamplerConfig,
    #[serde(default)]
    pub rotation: RotationConfig,
    #[serde(default)]
    pub viewport: ViewportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Data directory path (log file lives here)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Profile file (TOML or JSON); defaults to profile.toml next to the config
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_path: Option<PathBuf>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            profile_path: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Tick rate in milliseconds
    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,
    /// Theme name (e.g., "gruvbox-dark", "nord")
    #[serde(default = "default_theme_name")]
    pub theme: String,
    /// Show the cursor follower
    #[serde(default = "default_true")]
    pub cursor_follower: bool,
    /// Smooth page scrolling
    #[serde(default)]
    pub scroll: ScrollConfig,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: default_tick_rate(),
            theme: default_theme_name(),
            cursor_follower: default_true(),
            scroll: ScrollConfig::default(),
        }
    }
}

/// Smooth scrolling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrollConfig {
    /// Animate scroll jumps instead of moving instantly
    #[serde(default = "default_true")]
    pub smooth_enabled: bool,
    /// Duration of a scroll animation in milliseconds
    #[serde(default = "default_scroll_duration")]
    pub animation_duration_ms: u64,
    /// Easing curve for scroll animations
    #[serde(default)]
    pub easing: EasingType,
    /// Lines moved per wheel notch or j/k press
    #[serde(default = "default_scroll_lines")]
    pub scroll_lines: u16,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            smooth_enabled: default_true(),
            animation_duration_ms: default_scroll_duration(),
            easing: EasingType::default(),
            scroll_lines: default_scroll_lines(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplerConfig {
    /// Minimum gap between published scroll samples
    #[serde(default = "default_sample_throttle")]
    pub scroll_throttle_ms: u64,
    /// Scroll offset past which the header switches to its scrolled style
    #[serde(default = "default_header_threshold")]
    pub header_threshold: f64,
    /// How pointer moves are rate-limited: "frame", "throttle" or "raw"
    #[serde(default)]
    pub pointer_mode: PointerMode,
    /// Minimum gap between pointer samples in "throttle" mode
    #[serde(default = "default_sample_throttle")]
    pub pointer_throttle_ms: u64,
    /// Frames per second of the host frame loop
    #[serde(default = "default_frame_rate")]
    pub frame_rate: u32,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            scroll_throttle_ms: default_sample_throttle(),
            header_threshold: default_header_threshold(),
            pointer_mode: PointerMode::default(),
            pointer_throttle_ms: default_sample_throttle(),
            frame_rate: default_frame_rate(),
        }
    }
}

impl SamplerConfig {
    pub fn scroll_throttle(&self) -> Duration {
        Duration::from_millis(self.scroll_throttle_ms)
    }

    pub fn pointer_throttle(&self) -> Duration {
        Duration::from_millis(self.pointer_throttle_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotationConfig {
    /// About-me image carousel interval in milliseconds
    #[serde(default = "default_about_interval")]
    pub about_interval_ms: u64,
    /// Hero background crossfade interval in milliseconds
    #[serde(default = "default_background_interval")]
    pub background_interval_ms: u64,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            about_interval_ms: default_about_interval(),
            background_interval_ms: default_background_interval(),
        }
    }
}

impl RotationConfig {
    pub fn about_interval(&self) -> Duration {
        Duration::from_millis(self.about_interval_ms)
    }

    pub fn background_interval(&self) -> Duration {
        Duration::from_millis(self.background_interval_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewportConfig {
    /// Margin around the viewport for lazy visibility checks
    #[serde(default = "default_root_margin")]
    pub root_margin: String,
    /// Visible fraction(s) that trigger a visibility report
    #[serde(default)]
    pub threshold: Threshold,
    /// Margin for reveal-on-scroll animations (negative = reveal later)
    #[serde(default = "default_reveal_margin")]
    pub reveal_margin: String,
    /// Reveal each section only the first time it becomes visible
    #[serde(default = "default_true")]
    pub reveal_once: bool,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            root_margin: default_root_margin(),
            threshold: Threshold::default(),
            reveal_margin: default_reveal_margin(),
            reveal_once: default_true(),
        }
    }
}

impl ViewportConfig {
    /// Options for lazy visibility observers
    pub fn observer_options(&self) -> ObserverOptions {
        ObserverOptions {
            root: None,
            root_margin: self.root_margin.clone(),
            threshold: self.threshold.clone(),
        }
    }

    pub fn reveal(&self) -> RevealConfig {
        RevealConfig {
            once: self.reveal_once,
            margin: self.reveal_margin.clone(),
        }
    }

    /// Options for the reveal-on-scroll observer
    pub fn reveal_options(&self) -> ObserverOptions {
        ObserverOptions {
            root: None,
            root_margin: self.reveal_margin.clone(),
            threshold: Threshold::Single(0.0),
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("vitrine")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_tick_rate() -> u64 {
    100
}

fn default_theme_name() -> String {
    "gruvbox-dark".to_string()
}

fn default_scroll_duration() -> u64 {
    300
}

fn default_scroll_lines() -> u16 {
    3
}

fn default_sample_throttle() -> u64 {
    16 // ~60 Hz
}

fn default_header_threshold() -> f64 {
    50.0
}

fn default_frame_rate() -> u32 {
    60
}

fn default_about_interval() -> u64 {
    3000
}

fn default_background_interval() -> u64 {
    5000
}

fn default_root_margin() -> String {
    "50px".to_string()
}

fn default_reveal_margin() -> String {
    "-100px".to_string()
}

/// Expand tilde (~) in path to user's home directory
fn expand_tilde(path: &Path) -> PathBuf {
    if let Some(path_str) = path.to_str() {
        if let Some(stripped) = path_str.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(stripped);
            }
        } else if path_str == "~" {
            if let Some(home) = dirs::home_dir() {
                return home;
            }
        }
    }
    path.to_path_buf()
}

impl AppConfig {
    /// Load configuration from file or return defaults
    pub fn load() -> crate::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from `path`, or defaults when it does not exist
    pub fn load_from(path: &Path) -> crate::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content).map_err(|e| crate::Error::Config(e.to_string()))
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> crate::Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> crate::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))?;
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Check values that serde cannot reject on its own.
    pub fn validate(&self) -> crate::Result<()> {
        if self.rotation.about_interval_ms == 0 || self.rotation.background_interval_ms == 0 {
            return Err(crate::Error::Config(
                "rotation intervals must be greater than zero".to_string(),
            ));
        }
        if self.sampler.scroll_throttle_ms == 0 {
            return Err(crate::Error::Config(
                "sampler.scroll_throttle_ms must be greater than zero".to_string(),
            ));
        }
        self.viewport.observer_options().root_margin.parse::<crate::viewport::RootMargin>()?;
        self.viewport.reveal_options().root_margin.parse::<crate::viewport::RootMargin>()?;
        self.viewport.threshold.normalized()?;
        Ok(())
    }

    /// Get the configuration directory
    /// Always uses ~/.config/vitrine on all platforms
    pub fn config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("vitrine")
    }

    /// Get the configuration file path
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Get the profile file path (with tilde expansion)
    pub fn profile_path(&self) -> PathBuf {
        match &self.general.profile_path {
            Some(path) => expand_tilde(path),
            None => Self::config_dir().join("profile.toml"),
        }
    }

    /// Get the log file path
    pub fn log_path(&self) -> PathBuf {
        self.data_dir().join("vitrine.log")
    }

    /// Get the data directory (with tilde expansion)
    pub fn data_dir(&self) -> PathBuf {
        expand_tilde(&self.general.data_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.sampler.scroll_throttle_ms, 16);
        assert_eq!(config.sampler.header_threshold, 50.0);
        assert_eq!(config.sampler.pointer_mode, PointerMode::Frame);
        assert_eq!(config.rotation.about_interval(), Duration::from_millis(3000));
        assert_eq!(config.rotation.background_interval(), Duration::from_millis(5000));
        assert_eq!(config.viewport.root_margin, "50px");
        assert_eq!(config.viewport.threshold, Threshold::Single(0.1));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [rotation]
            about_interval_ms = 1500

            [sampler]
            pointer_mode = "throttle"

            [viewport]
            threshold = [0.0, 0.5, 1.0]
            "#,
        )
        .unwrap();

        assert_eq!(config.rotation.about_interval_ms, 1500);
        assert_eq!(config.rotation.background_interval_ms, 5000);
        assert_eq!(config.sampler.pointer_mode, PointerMode::Throttle);
        assert_eq!(config.viewport.threshold, Threshold::Multiple(vec![0.0, 0.5, 1.0]));
        assert_eq!(config.ui.scroll.easing, EasingType::Cubic);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.rotation.about_interval_ms = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.viewport.reveal_margin = "lots".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_roundtrip_through_file() {
        let dir = std::env::temp_dir().join(format!("vitrine-config-{}", std::process::id()));
        let path = dir.join("config.toml");
        let mut config = AppConfig::default();
        config.ui.theme = "nord".to_string();
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.ui.theme, "nord");
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let path = std::env::temp_dir().join("vitrine-does-not-exist").join("config.toml");
        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.ui.tick_rate_ms, 100);
    }
}
