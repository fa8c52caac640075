use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use tigerways::address::OffsetSettings;
use tigerways::project::Projection;

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub conversion: ConversionConfig,
    pub lookup: LookupConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ConversionConfig {
    pub distance_ft: f64,
    pub pullback_ft: f64,
    pub projection: Projection,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        let offsets = OffsetSettings::default();
        Self {
            distance_ft: offsets.distance_ft,
            pullback_ft: offsets.pullback_ft,
            projection: Projection::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct LookupConfig {
    pub zip_db: PathBuf,
    pub county_fips: PathBuf,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            zip_db: PathBuf::from("zip_db.csv"),
            county_fips: PathBuf::from("tiger_county_fips.json"),
        }
    }
}

/// Values given on the command line; each one replaces the config value
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub distance_ft: Option<f64>,
    pub pullback_ft: Option<f64>,
    pub projection: Option<Projection>,
    pub zip_db: Option<PathBuf>,
    pub county_fips: Option<PathBuf>,
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Config file if given, defaults otherwise
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn apply(mut self, overrides: Overrides) -> Self {
        if let Some(distance) = overrides.distance_ft {
            self.conversion.distance_ft = distance;
        }
        if let Some(pullback) = overrides.pullback_ft {
            self.conversion.pullback_ft = pullback;
        }
        if let Some(projection) = overrides.projection {
            self.conversion.projection = projection;
        }
        if let Some(zip_db) = overrides.zip_db {
            self.lookup.zip_db = zip_db;
        }
        if let Some(county_fips) = overrides.county_fips {
            self.lookup.county_fips = county_fips;
        }
        self
    }

    /// Validated offset distances
    pub fn offset_settings(&self) -> tigerways::Result<OffsetSettings> {
        OffsetSettings::new(self.conversion.distance_ft, self.conversion.pullback_ft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::load(None).unwrap();
        assert_eq!(config.conversion.distance_ft, 30.0);
        assert_eq!(config.conversion.pullback_ft, 45.0);
        assert_eq!(config.conversion.projection, Projection::Geographic);
        assert_eq!(config.lookup.zip_db, PathBuf::from("zip_db.csv"));
    }

    #[test]
    fn test_partial_file_and_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[conversion]\npullback_ft = 20.0\nprojection = \"web-mercator\"\n\n[lookup]\nzip_db = \"/data/zips.csv\""
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.conversion.distance_ft, 30.0);
        assert_eq!(config.conversion.pullback_ft, 20.0);
        assert_eq!(config.conversion.projection, Projection::WebMercator);
        assert_eq!(config.lookup.zip_db, PathBuf::from("/data/zips.csv"));
        assert_eq!(
            config.lookup.county_fips,
            PathBuf::from("tiger_county_fips.json")
        );

        let config = config.apply(Overrides {
            pullback_ft: Some(10.0),
            projection: Some(Projection::Geographic),
            ..Default::default()
        });
        assert_eq!(config.conversion.pullback_ft, 10.0);
        assert_eq!(config.conversion.projection, Projection::Geographic);
        assert_eq!(config.lookup.zip_db, PathBuf::from("/data/zips.csv"));
    }

    #[test]
    fn test_invalid_settings() {
        let config = Config::default().apply(Overrides {
            distance_ft: Some(-5.0),
            ..Default::default()
        });
        assert!(config.offset_settings().is_err());
        assert!(Config::default().offset_settings().is_ok());
    }

    #[test]
    fn test_unparsable_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[conversion]\ndistance_ft = \"far\"").unwrap();
        assert!(Config::load_from_file(file.path()).is_err());
    }
}
