use std::path::Path;

use anyhow::{Context, Result};

use vitrine_core::{AppConfig, Profile};

pub fn run(config: &AppConfig, config_path: &Path, force: bool) -> Result<()> {
    let wrote_config = write_unless_present(config_path, force, |path| {
        AppConfig::default().save_to(path).map_err(Into::into)
    })
    .with_context(|| format!("writing config to {}", config_path.display()))?;
    report("Config", config_path, wrote_config);

    let profile_path = config.profile_path();
    let wrote_profile = write_unless_present(&profile_path, force, |path| {
        Profile::sample().save_to(path).map_err(Into::into)
    })
    .with_context(|| format!("writing profile to {}", profile_path.display()))?;
    report("Profile", &profile_path, wrote_profile);

    if wrote_profile {
        println!("\nEdit the profile, then run `vitrine check` and `vitrine`.");
    }
    Ok(())
}

/// Returns whether the file was written
fn write_unless_present(
    path: &Path,
    force: bool,
    write: impl FnOnce(&Path) -> Result<()>,
) -> Result<bool> {
    if path.exists() && !force {
        return Ok(false);
    }
    write(path)?;
    Ok(true)
}

fn report(what: &str, path: &Path, written: bool) {
    if written {
        println!("{} written to {}", what, path.display());
    } else {
        println!(
            "{} already exists at {} (use --force to overwrite)",
            what,
            path.display()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_existing_files_are_kept_unless_forced() {
        let dir = std::env::temp_dir().join(format!("vitrine-init-{}", std::process::id()));
        let config_path = dir.join("config.toml");
        let mut config = AppConfig::default();
        config.general.profile_path = Some(dir.join("profile.toml"));

        run(&config, &config_path, false).unwrap();
        assert!(config_path.exists());
        let profile = Profile::load(&dir.join("profile.toml")).unwrap();
        assert_eq!(profile, Profile::sample());

        std::fs::write(&config_path, "# edited").unwrap();
        run(&config, &config_path, false).unwrap();
        assert_eq!(std::fs::read_to_string(&config_path).unwrap(), "# edited");

        run(&config, &config_path, true).unwrap();
        let rewritten = AppConfig::load_from(&config_path).unwrap();
        assert_eq!(
            rewritten.rotation.about_interval_ms,
            AppConfig::default().rotation.about_interval_ms
        );

        std::fs::remove_dir_all(&dir).ok();
    }
}
