use std::path::Path;

use anyhow::{Context, Result};

use vitrine_core::{AppConfig, Profile};

pub fn run(config: &AppConfig, config_path: &Path, profile: Option<&Path>) -> Result<()> {
    config
        .validate()
        .with_context(|| format!("invalid config {}", config_path.display()))?;
    if config_path.exists() {
        println!("Config OK: {}", config_path.display());
    } else {
        println!("Config OK: defaults (no file at {})", config_path.display());
    }

    let (profile_path, profile) = match profile {
        Some(path) => {
            let profile = Profile::load(path)
                .with_context(|| format!("loading profile {}", path.display()))?;
            (path.to_path_buf(), profile)
        }
        None => {
            let path = config.profile_path();
            let profile = load_configured(&path)?;
            (path, profile)
        }
    };
    profile
        .validate()
        .with_context(|| format!("invalid profile {}", profile_path.display()))?;

    println!(
        "Profile OK: {} ({} ventures, {} projects, {} links, {} photos)",
        profile.name,
        profile.ventures.len(),
        profile.projects.len(),
        profile.links().count(),
        profile.about_images.len()
    );
    Ok(())
}

/// The configured profile falls back to the built-in sample
fn load_configured(path: &Path) -> Result<Profile> {
    if !path.exists() {
        println!("No profile at {}, checking the built-in sample", path.display());
    }
    Profile::load_or_sample(path).with_context(|| format!("loading profile {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("vitrine-check-{}-{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_valid_profile_passes() {
        let dir = temp_dir("ok");
        let path = dir.join("profile.toml");
        Profile::sample().save_to(&path).unwrap();
        assert!(run(&AppConfig::default(), &dir.join("config.toml"), Some(&path)).is_ok());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_bad_link_fails() {
        let dir = temp_dir("bad");
        let path = dir.join("profile.toml");
        let mut profile = Profile::sample();
        profile.ventures[0].url = Some("not a link".to_string());
        profile.save_to(&path).unwrap();

        let err = run(&AppConfig::default(), &dir.join("config.toml"), Some(&path)).unwrap_err();
        assert!(format!("{:#}", err).contains("invalid profile"));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_explicit_profile_fails() {
        let path = Path::new("/nonexistent/vitrine/profile.toml");
        assert!(run(&AppConfig::default(), Path::new("/nonexistent/config.toml"), Some(path)).is_err());
    }

    #[test]
    fn test_invalid_config_fails() {
        let mut config = AppConfig::default();
        config.rotation.about_interval_ms = 0;
        assert!(run(&config, Path::new("/nonexistent/config.toml"), None).is_err());
    }
}
