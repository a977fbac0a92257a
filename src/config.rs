//! Runtime configuration. Only binaries read the environment; the library
//! takes these values explicitly.
use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use std::env;
use std::net::SocketAddr;
use std::str::FromStr;

pub const DEFAULT_TMDB_BASE: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_IMAGE_BASE: &str = "https://image.tmdb.org/t/p";
pub const DEFAULT_PERSON_ID: u32 = 3087;
pub const DEFAULT_BIND: &str = "0.0.0.0:3146";

/// Credentials and endpoints for the TMDB client.
#[derive(Debug, Clone)]
pub struct TmdbConfig {
    pub api_key: String,
    pub base_url: String,
    pub image_base: String,
}

impl TmdbConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_TMDB_BASE.to_string(),
            image_base: DEFAULT_IMAGE_BASE.to_string(),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn with_image_base(mut self, image_base: impl Into<String>) -> Self {
        self.image_base = image_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn from_env() -> Result<Self> {
        let api_key = env::var("TMDB_API_KEY")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| anyhow!("TMDB_API_KEY must be set"))?;
        let mut config = Self::new(api_key);
        if let Some(base) = non_empty_var("TMDB_BASE_URL") {
            config = config.with_base_url(base);
        }
        if let Some(base) = non_empty_var("TMDB_IMAGE_BASE") {
            config = config.with_image_base(base);
        }
        Ok(config)
    }
}

/// What the tribute screen does when its fetches fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FallbackPolicy {
    /// Log the failure and show the built-in defaults.
    #[default]
    Placeholder,
    /// Surface the failure like every other screen.
    Error,
}

impl FromStr for FallbackPolicy {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "placeholder" => Ok(FallbackPolicy::Placeholder),
            "error" => Ok(FallbackPolicy::Error),
            other => Err(anyhow!(
                "fallback policy must be 'placeholder' or 'error', got '{}'",
                other
            )),
        }
    }
}

/// A role the tribute page highlights regardless of what TMDB returns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotableRole {
    pub character: String,
    pub film: String,
    pub year: String,
    pub note: Option<String>,
}

impl NotableRole {
    fn new(character: &str, film: &str, year: &str, note: &str) -> Self {
        Self {
            character: character.to_string(),
            film: film.to_string(),
            year: year.to_string(),
            note: Some(note.to_string()).filter(|n| !n.is_empty()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AwardStats {
    pub oscars: u32,
    pub nominations: u32,
}

/// Curated tribute content, plus the values shown when TMDB gives nothing.
#[derive(Debug, Clone)]
pub struct TributeDefaults {
    pub name: String,
    pub birth_year: String,
    pub death_year: String,
    pub biography: String,
    pub quote: String,
    pub awards: AwardStats,
    pub notable_roles: Vec<NotableRole>,
    pub memorial: String,
}

impl Default for TributeDefaults {
    fn default() -> Self {
        Self {
            name: "Robert Duvall".to_string(),
            birth_year: "1931".to_string(),
            death_year: "2025".to_string(),
            biography: "Robert Selden Duvall was an American actor and filmmaker. Known for his \
                        commanding screen presence and versatility, he delivered iconic \
                        performances across six decades of cinema."
                .to_string(),
            quote: "I don't care about Hollywood. I just want to work.".to_string(),
            awards: AwardStats {
                oscars: 1,
                nominations: 7,
            },
            notable_roles: vec![
                NotableRole::new("Boo Radley", "To Kill a Mockingbird", "1962", "Film debut"),
                NotableRole::new(
                    "Tom Hagen",
                    "The Godfather",
                    "1972",
                    "Academy Award Nomination",
                ),
                NotableRole::new(
                    "Lt. Col. Bill Kilgore",
                    "Apocalypse Now",
                    "1979",
                    "Academy Award Nomination",
                ),
                NotableRole::new(
                    "Mac Sledge",
                    "Tender Mercies",
                    "1983",
                    "Academy Award Winner, Best Actor",
                ),
                NotableRole::new("Augustus McCrae", "Lonesome Dove", "1989", "Emmy Award Winner"),
                NotableRole::new(
                    "Bull Meechum",
                    "The Great Santini",
                    "1979",
                    "Academy Award Nomination",
                ),
            ],
            memorial: "Robert Duvall left an indelible mark on cinema. His dedication to his \
                       craft and his ability to inhabit every character he portrayed made him \
                       one of the greatest actors in the history of film."
                .to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub tmdb: TmdbConfig,
    pub person_id: u32,
    pub bind: SocketAddr,
    pub tribute_fallback: FallbackPolicy,
    pub tribute_defaults: TributeDefaults,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let tmdb = TmdbConfig::from_env()?;
        let person_id = match non_empty_var("FILMOGRAPHY_PERSON_ID") {
            Some(raw) => raw
                .parse::<u32>()
                .with_context(|| format!("FILMOGRAPHY_PERSON_ID is not a number: {}", raw))?,
            None => DEFAULT_PERSON_ID,
        };
        let bind = non_empty_var("FILMOGRAPHY_BIND")
            .unwrap_or_else(|| DEFAULT_BIND.to_string())
            .parse::<SocketAddr>()
            .context("FILMOGRAPHY_BIND is not a socket address")?;
        let tribute_fallback = match non_empty_var("TRIBUTE_FALLBACK") {
            Some(raw) => raw.parse::<FallbackPolicy>()?,
            None => FallbackPolicy::default(),
        };
        Ok(Self {
            tmdb,
            person_id,
            bind,
            tribute_fallback,
            tribute_defaults: TributeDefaults::default(),
        })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_urls_lose_trailing_slash() {
        let config = TmdbConfig::new("key")
            .with_base_url("http://127.0.0.1:9000/3/")
            .with_image_base("http://img/t/p/");
        assert_eq!(config.base_url, "http://127.0.0.1:9000/3");
        assert_eq!(config.image_base, "http://img/t/p");
        assert_eq!(config.api_key, "key");
    }

    #[test]
    fn fallback_policy_parses_both_modes() {
        assert_eq!(
            "placeholder".parse::<FallbackPolicy>().unwrap(),
            FallbackPolicy::Placeholder
        );
        assert_eq!(" Error ".parse::<FallbackPolicy>().unwrap(), FallbackPolicy::Error);
        assert!("swallow".parse::<FallbackPolicy>().is_err());
    }

    #[test]
    fn tribute_defaults_carry_curated_content() {
        let defaults = TributeDefaults::default();
        assert_eq!(defaults.notable_roles.len(), 6);
        assert_eq!(defaults.notable_roles[0].note.as_deref(), Some("Film debut"));
        assert_eq!(
            defaults.awards,
            AwardStats {
                oscars: 1,
                nominations: 7
            }
        );
        assert!(defaults.quote.contains("I just want to work"));
    }
}
