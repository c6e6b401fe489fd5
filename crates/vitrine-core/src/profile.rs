//! Portfolio content shown by the page

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    #[serde(default)]
    pub tagline: String,
    /// Biography paragraphs
    #[serde(default)]
    pub bio: Vec<String>,
    #[serde(default)]
    pub ventures: Vec<Venture>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub socials: Vec<SocialLink>,
    /// Items cycled by the about-section carousel
    #[serde(default)]
    pub about_images: Vec<String>,
    /// Items crossfaded behind the hero
    #[serde(default)]
    pub background_images: Vec<String>,
}

/// A business the owner runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Venture {
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub title: String,
    /// May span several lines
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialLink {
    pub platform: String,
    #[serde(default)]
    pub handle: String,
    pub url: String,
}

impl Profile {
    /// Load a profile from a `.toml` or `.json` file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let profile = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::from_str(&content)?,
            _ => toml::from_str(&content).map_err(|e| Error::Profile(e.to_string()))?,
        };
        info!("Loaded profile from {}", path.display());
        Ok(profile)
    }

    /// Load `path` if it exists, otherwise fall back to the built-in sample.
    pub fn load_or_sample(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            debug!("No profile at {}, using sample", path.display());
            Ok(Self::sample())
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).map_err(|e| Error::Profile(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject an empty name and links that do not parse.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Profile("name must not be empty".to_string()));
        }
        for url in self.links() {
            Url::parse(url)?;
        }
        Ok(())
    }

    /// Every link on the page, in display order
    pub fn links(&self) -> impl Iterator<Item = &str> {
        self.ventures
            .iter()
            .filter_map(|v| v.url.as_deref())
            .chain(self.projects.iter().filter_map(|p| p.url.as_deref()))
            .chain(self.socials.iter().map(|s| s.url.as_str()))
    }

    pub fn sample() -> Self {
        Self {
            name: "Rin Aoki".to_string(),
            tagline: "Building playful things with AI".to_string(),
            bio: vec![
                "Engineer and founder working where AI meets entertainment.".to_string(),
                "I run two small studios and spend the rest of my time on games.".to_string(),
            ],
            ventures: vec![
                Venture {
                    name: "Luminous Core".to_string(),
                    role: "Founder & CEO".to_string(),
                    description: "Custom AI systems and tooling for clients.".to_string(),
                    url: Some("https://luminous-core.example.com/".to_string()),
                },
                Venture {
                    name: "StudyLab".to_string(),
                    role: "Co-founder".to_string(),
                    description: "Learning platform for students preparing abroad.".to_string(),
                    url: Some("https://studylab.example.com/".to_string()),
                },
            ],
            projects: vec![
                Project {
                    title: "AI system development".to_string(),
                    description: "Bespoke AI systems and tools built for clients".to_string(),
                    tags: vec!["AI".to_string(), "Consulting".to_string()],
                    url: None,
                },
                Project {
                    title: "Social growth".to_string(),
                    description: "Running and growing social accounts with AI-assisted content"
                        .to_string(),
                    tags: vec!["Marketing".to_string()],
                    url: None,
                },
                Project {
                    title: "Game development".to_string(),
                    description: "A story-driven world woven by AI.\nFirst MVP in progress."
                        .to_string(),
                    tags: vec!["Games".to_string(), "AI".to_string()],
                    url: None,
                },
            ],
            socials: vec![
                SocialLink {
                    platform: "Instagram".to_string(),
                    handle: "@rin.aoki".to_string(),
                    url: "https://www.instagram.com/rin.aoki".to_string(),
                },
                SocialLink {
                    platform: "LinkedIn".to_string(),
                    handle: "rin-aoki".to_string(),
                    url: "https://www.linkedin.com/in/rin-aoki".to_string(),
                },
            ],
            about_images: vec![
                "Studio, Tokyo".to_string(),
                "Speaking at a meetup".to_string(),
                "Team offsite".to_string(),
                "Game jam".to_string(),
            ],
            background_images: vec![
                "Night skyline".to_string(),
                "Neon street".to_string(),
                "Harbour at dawn".to_string(),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_is_valid() {
        let profile = Profile::sample();
        assert!(profile.validate().is_ok());
        assert!(profile.about_images.len() > 1);
        assert_eq!(profile.links().count(), 4);
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut profile = Profile::sample();
        profile.name = "  ".to_string();
        assert!(matches!(profile.validate(), Err(Error::Profile(_))));
    }

    #[test]
    fn test_bad_url_rejected() {
        let mut profile = Profile::sample();
        profile.socials[0].url = "not a url".to_string();
        assert!(matches!(profile.validate(), Err(Error::UrlParse(_))));
    }

    #[test]
    fn test_minimal_toml() {
        let profile: Profile = toml::from_str(r#"name = "Solo""#).unwrap();
        assert_eq!(profile.name, "Solo");
        assert!(profile.projects.is_empty());
        assert!(profile.validate().is_ok());
    }

    #[test]
    fn test_load_toml_and_json() {
        let dir = std::env::temp_dir().join(format!("vitrine-profile-{}", std::process::id()));
        let toml_path = dir.join("profile.toml");
        let sample = Profile::sample();
        sample.save_to(&toml_path).unwrap();
        assert_eq!(Profile::load(&toml_path).unwrap(), sample);

        let json_path = dir.join("profile.json");
        std::fs::write(&json_path, serde_json::to_string(&sample).unwrap()).unwrap();
        assert_eq!(Profile::load(&json_path).unwrap(), sample);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_file_falls_back() {
        let profile = Profile::load_or_sample(Path::new("/nonexistent/vitrine/profile.toml")).unwrap();
        assert_eq!(profile, Profile::sample());
    }
}
