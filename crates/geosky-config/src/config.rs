//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Environment variable consulted for the minimum star magnitude when the
/// config leaves it unset.
pub const MIN_STAR_MAGNITUDE_ENV: &str = "GEOSKY_MIN_STAR_MAGNITUDE";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Sky rendering settings.
    pub sky: SkyConfig,
    /// Reference ellipsoid of the planet under the sky.
    pub ellipsoid: EllipsoidConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Sky rendering configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SkyConfig {
    /// Optional star catalog file (`name,ra,decl,magnitude` per line).
    pub star_file: Option<PathBuf>,
    /// Stars with a magnitude below this value are discarded. `None` keeps all.
    pub min_star_magnitude: Option<f32>,
    /// Draw the sun disc.
    pub sun_visible: bool,
    /// Draw the moon.
    pub moon_visible: bool,
    /// Draw the starfield.
    pub stars_visible: bool,
    /// Derive ambient light from the angle between eye and sun.
    pub auto_ambience: bool,
    /// Initial ambient brightness in `[0, 1]`.
    pub ambient_brightness: f32,
    /// Logical name of the moon surface texture.
    pub moon_texture: String,
    /// Directories searched for resources such as the moon texture.
    pub data_paths: Vec<PathBuf>,
    /// Light channel the sky light occupies in each attached view.
    pub light_channel: u32,
    /// Simulated start time, RFC 3339. `None` means "now".
    pub date_time: Option<String>,
}

/// Reference ellipsoid radii in meters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EllipsoidConfig {
    pub equatorial_radius_m: f64,
    pub polar_radius_m: f64,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

impl Default for SkyConfig {
    fn default() -> Self {
        Self {
            star_file: None,
            min_star_magnitude: None,
            sun_visible: true,
            moon_visible: true,
            stars_visible: true,
            auto_ambience: false,
            ambient_brightness: 0.2,
            moon_texture: "moon_1024x512.jpg".to_string(),
            data_paths: vec![PathBuf::from("data")],
            light_channel: 0,
            date_time: None,
        }
    }
}

impl Default for EllipsoidConfig {
    fn default() -> Self {
        // WGS-84
        Self {
            equatorial_radius_m: 6_378_137.0,
            polar_radius_m: 6_356_752.314_245,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl SkyConfig {
    /// The configured minimum magnitude, falling back to
    /// [`MIN_STAR_MAGNITUDE_ENV`] when unset.
    pub fn resolve_min_star_magnitude(&self) -> Option<f32> {
        let env = std::env::var(MIN_STAR_MAGNITUDE_ENV).ok();
        self.resolve_min_star_magnitude_with(env.as_deref())
    }

    /// Same as [`resolve_min_star_magnitude`](Self::resolve_min_star_magnitude)
    /// with the environment value supplied by the caller.
    pub fn resolve_min_star_magnitude_with(&self, env_value: Option<&str>) -> Option<f32> {
        if self.min_star_magnitude.is_some() {
            return self.min_star_magnitude;
        }
        let raw = env_value?;
        match raw.trim().parse::<f32>() {
            Ok(value) => Some(value),
            Err(_) => {
                log::warn!("Ignoring {MIN_STAR_MAGNITUDE_ENV}={raw:?}: not a number");
                None
            }
        }
    }

    /// Parse the configured start time.
    pub fn start_date_time(&self) -> Result<Option<DateTime<Utc>>, ConfigError> {
        match &self.date_time {
            None => Ok(None),
            Some(text) => DateTime::parse_from_rfc3339(text)
                .map(|dt| Some(dt.with_timezone(&Utc)))
                .map_err(|source| ConfigError::InvalidDateTime {
                    value: text.clone(),
                    source,
                }),
        }
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Default configuration directory (`<platform config dir>/geosky`).
    pub fn default_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("geosky"))
    }

    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join("config.ron");
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(3))
                .unwrap();
        assert!(ron_str.contains("moon_texture: \"moon_1024x512.jpg\""));
        assert!(ron_str.contains("sun_visible: true"));
    }

    #[test]
    fn test_config_roundtrip() {
        let mut config = Config::default();
        config.sky.star_file = Some(PathBuf::from("stars.csv"));
        config.sky.min_star_magnitude = Some(4.5);
        let ron_str = ron::to_string(&config).unwrap();
        let deserialized: Config = ron::from_str(&ron_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_missing_section_uses_default() {
        let config: Config = ron::from_str("(sky: (auto_ambience: true))").unwrap();
        assert!(config.sky.auto_ambience);
        assert_eq!(config.ellipsoid, EllipsoidConfig::default());
        assert_eq!(config.sky.moon_texture, "moon_1024x512.jpg");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.sky.stars_visible = false;
        config.sky.light_channel = 2;

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_or_create_writes_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(dir.path().join("config.ron").exists());
    }

    #[test]
    fn test_reload_detects_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        let mut modified = config.clone();
        modified.sky.auto_ambience = true;
        modified.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert!(result.is_some_and(|c| c.sky.auto_ambience));
        let unchanged = modified.reload(dir.path()).unwrap();
        assert!(unchanged.is_none());
    }

    #[test]
    fn test_invalid_ron_produces_error() {
        let result: Result<Config, _> = ron::from_str("{{not valid}}");
        assert!(result.is_err());
    }

    #[test]
    fn test_configured_magnitude_wins_over_env() {
        let sky = SkyConfig {
            min_star_magnitude: Some(3.0),
            ..SkyConfig::default()
        };
        assert_eq!(sky.resolve_min_star_magnitude_with(Some("5.5")), Some(3.0));
    }

    #[test]
    fn test_env_magnitude_used_when_unset() {
        let sky = SkyConfig::default();
        assert_eq!(sky.resolve_min_star_magnitude_with(Some(" 5.5 ")), Some(5.5));
        assert_eq!(sky.resolve_min_star_magnitude_with(Some("bright")), None);
        assert_eq!(sky.resolve_min_star_magnitude_with(None), None);
    }

    #[test]
    fn test_start_date_time_parses_rfc3339() {
        let sky = SkyConfig {
            date_time: Some("2024-03-20T06:30:00+02:00".to_string()),
            ..SkyConfig::default()
        };
        let dt = sky.start_date_time().unwrap().unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-03-20T04:30:00+00:00");

        let bad = SkyConfig {
            date_time: Some("yesterday".to_string()),
            ..SkyConfig::default()
        };
        assert!(matches!(
            bad.start_date_time(),
            Err(ConfigError::InvalidDateTime { .. })
        ));
    }
}
