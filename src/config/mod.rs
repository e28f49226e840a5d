use std::env;
use std::path::Path;

use anyhow::Result;
use serde::Deserialize;

/// Application settings, read once at process start.
///
/// Precedence: environment variables > config file > built-in defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub app: AppSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub title: String,
    /// Memoization TTL for prediction queries, in seconds.
    pub cache_ttl_secs: u64,
    pub max_rows_display: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database: DatabaseSettings::default(),
            app: AppSettings::default(),
        }
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: "sqlite:data/pitchboard.db".to_string(),
        }
    }
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            title: "Football Predictions Dashboard".to_string(),
            cache_ttl_secs: 300,
            max_rows_display: 100,
        }
    }
}

impl Settings {
    /// Load settings from an optional JSON config file, then apply
    /// environment overrides.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let path = config_path.unwrap_or("config.json");

        let mut settings = if Path::new(path).exists() {
            let raw = std::fs::read_to_string(path)?;
            match serde_json::from_str::<Settings>(&raw) {
                Ok(parsed) => parsed,
                Err(e) => {
                    tracing::warn!("Could not parse config file {}: {}", path, e);
                    Settings::default()
                }
            }
        } else {
            Settings::default()
        };

        if let Ok(url) = env::var("DATABASE_URL") {
            settings.database.url = url;
        }
        if let Ok(ttl) = env::var("PITCHBOARD_CACHE_TTL") {
            match ttl.parse() {
                Ok(secs) => settings.app.cache_ttl_secs = secs,
                Err(_) => tracing::warn!("Ignoring non-numeric PITCHBOARD_CACHE_TTL: {}", ttl),
            }
        }

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.app.cache_ttl_secs, 300);
        assert!(settings.database.url.starts_with("sqlite:"));
    }

    #[test]
    fn test_partial_config_file_keeps_defaults() {
        // Unknown path falls back to defaults entirely
        let settings = Settings::load(Some("does-not-exist.json")).unwrap();
        assert_eq!(settings.app.max_rows_display, 100);
    }

    #[test]
    fn test_partial_json_merges_with_defaults() {
        let parsed: Settings =
            serde_json::from_str(r#"{"database": {"url": "sqlite::memory:"}}"#).unwrap();
        assert_eq!(parsed.database.url, "sqlite::memory:");
        assert_eq!(parsed.app.cache_ttl_secs, 300);
    }
}
