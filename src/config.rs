//! Configuration for weigh-map
//!
//! Config stored at: ~/.config/weigh-map/config.json

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::cli::Cli;
use crate::data::filter::DefaultRegionPolicy;
use crate::error::ConfigError;

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Market scale dataset (.json or .csv)
    #[serde(default = "default_scale_data")]
    pub scale_data: PathBuf,

    /// Weighbridge dataset (.json or .csv)
    #[serde(default = "default_weighbridge_data")]
    pub weighbridge_data: PathBuf,

    /// Regions shown when the region selection is empty
    #[serde(default)]
    pub default_region_policy: DefaultRegionPolicy,

    /// Text shown in place of absent record attributes
    #[serde(default = "default_placeholder")]
    pub placeholder: String,
}

fn default_scale_data() -> PathBuf {
    PathBuf::from("scale-data.json")
}

fn default_weighbridge_data() -> PathBuf {
    PathBuf::from("weighbridge-data.json")
}

fn default_placeholder() -> String {
    "無".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scale_data: default_scale_data(),
            weighbridge_data: default_weighbridge_data(),
            default_region_policy: DefaultRegionPolicy::default(),
            placeholder: default_placeholder(),
        }
    }
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(dir.join("weigh-map").join("config.json"))
    }

    /// Load config from `explicit`, or from the default location.
    ///
    /// A missing file at the default location yields defaults; a missing
    /// explicit file is an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(p) => p.to_path_buf(),
            None => {
                let p = Self::config_path()?;
                if !p.exists() {
                    return Ok(Config::default());
                }
                p
            }
        };
        Self::from_file(&path)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Json {
            path: path.display().to_string(),
            source,
        })
    }

    /// Command-line flags win over the file.
    pub fn apply_overrides(&mut self, cli: &Cli) {
        if let Some(p) = &cli.scale_data {
            self.scale_data = p.clone();
        }
        if let Some(p) = &cli.weighbridge_data {
            self.weighbridge_data = p.clone();
        }
        if cli.all_regions {
            self.default_region_policy = DefaultRegionPolicy::AllRegions;
        } else if !cli.default_regions.is_empty() {
            self.default_region_policy = DefaultRegionPolicy::FixedList(cli.default_regions.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.default_region_policy, DefaultRegionPolicy::AllRegions);
    }

    #[test]
    fn parses_fixed_region_list() {
        let config: Config = serde_json::from_str(
            r#"{"default_region_policy": {"policy": "fixed_list", "regions": ["臺北市", "新北市"]}}"#,
        )
        .unwrap();
        assert_eq!(
            config.default_region_policy,
            DefaultRegionPolicy::FixedList(vec!["臺北市".into(), "新北市".into()])
        );
    }

    #[test]
    fn policy_serializes_as_tagged_object() {
        let json = serde_json::to_value(DefaultRegionPolicy::AllRegions).unwrap();
        assert_eq!(json, serde_json::json!({"policy": "all_regions"}));
    }

    #[test]
    fn loads_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"placeholder": "-", "scale_data": "data/s.csv"}}"#).unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.placeholder, "-");
        assert_eq!(config.scale_data, PathBuf::from("data/s.csv"));
        assert_eq!(config.weighbridge_data, default_weighbridge_data());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(Some(&dir.path().join("nope.json"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn cli_overrides_policy_and_paths() {
        let cli = Cli::parse_from([
            "weigh-map",
            "--scale-data",
            "a.json",
            "--default-regions",
            "臺北市,基隆市",
        ]);
        let mut config = Config::default();
        config.apply_overrides(&cli);
        assert_eq!(config.scale_data, PathBuf::from("a.json"));
        assert_eq!(
            config.default_region_policy,
            DefaultRegionPolicy::FixedList(vec!["臺北市".into(), "基隆市".into()])
        );

        let cli = Cli::parse_from(["weigh-map", "--all-regions"]);
        let mut config = Config {
            default_region_policy: DefaultRegionPolicy::FixedList(vec!["x".into()]),
            ..Config::default()
        };
        config.apply_overrides(&cli);
        assert_eq!(config.default_region_policy, DefaultRegionPolicy::AllRegions);
    }
}
