use std::{fs::read_to_string, path::Path};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;

use crate::{cluster::TIME_GAP, diagnostics::HistogramConfig, locator::GeometryConfig};

/// Hits used to build the clustered gamma candidates
#[derive(
    Deserialize,
    Serialize,
    Copy,
    Clone,
    Debug,
    Display,
    EnumString,
    Default,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ClusterSource {
    /// All calibrated calorimeter hits
    #[default]
    Calibrated,
    /// Only the hits associated to reconstructed neutral tracks
    NeutralTracks,
}

#[derive(Deserialize, Serialize, Copy, Clone, Debug, PartialEq)]
pub struct AnalysisConfig {
    /// Maximum time difference in ns between consecutive hits of a cluster
    #[serde(default = "default_time_gap")]
    pub time_gap: f64,
    #[serde(default)]
    pub cluster_source: ClusterSource,
}

fn default_time_gap() -> f64 {
    TIME_GAP
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            time_gap: TIME_GAP,
            cluster_source: Default::default(),
        }
    }
}

/// Run configuration
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub geometry: GeometryConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub histograms: HistogramConfig,
}

impl Config {
    /// Read the configuration from a YAML file
    ///
    /// An empty file gives the default configuration.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(yaml)?;
        if !(config.analysis.time_gap >= 0.) {
            return Err(ConfigError::TimeGap(config.analysis.time_gap));
        }
        Ok(config)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse configuration: {0}")]
    YamlError(#[from] serde_yaml::Error),
    #[error("Time gap has to be a non-negative number, got {0}")]
    TimeGap(f64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::from_yaml("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.analysis.time_gap, 2.5);
        assert_eq!(config.geometry.locators.len(), 3);
    }

    #[test]
    fn partial_config() {
        let config = Config::from_yaml(
            r"
analysis:
  cluster_source: neutral-tracks
histograms:
  energy: { min: 0, max: 2, nbins: 50 }
",
        )
        .unwrap();
        assert_eq!(config.analysis.cluster_source, ClusterSource::NeutralTracks);
        assert_eq!(config.analysis.time_gap, 2.5);
        assert_eq!(config.histograms.energy.nbins, 50);
        assert_eq!(config.histograms.calos.nbins, 20);
    }

    #[test]
    fn invalid_config() {
        assert!(matches!(
            Config::from_yaml("analysis: { time_gap: -1 }"),
            Err(ConfigError::TimeGap(_))
        ));
        assert!(matches!(
            Config::from_yaml("analysis: { cluster_source: tracks }"),
            Err(ConfigError::YamlError(_))
        ));
    }

    #[test]
    fn read_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "analysis:\n  time_gap: 4.0").unwrap();
        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.analysis.time_gap, 4.);
    }
}
