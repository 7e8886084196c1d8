//! Report configuration.
//! Built-in defaults, optionally overridden by a `report.json` file.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Input paths and report parameters. The pipeline takes no CLI flags; the
/// only way to override the defaults is this file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub emissions_path: PathBuf,
    pub gdp_path: PathBuf,
    pub population_path: PathBuf,
    pub output_dir: PathBuf,
    /// Industrialized classification threshold, in normalized GDP units
    /// (1 + GDP per capita / 100).
    pub industrialized_threshold: f64,
    /// Year for the top-emitter rankings. Defaults to the most recent year
    /// present in the prepared table.
    pub report_year: Option<i32>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            emissions_path: PathBuf::from("data/emissions.csv"),
            gdp_path: PathBuf::from("data/gdp_per_capita.csv"),
            population_path: PathBuf::from("data/population.csv"),
            output_dir: PathBuf::from("out"),
            industrialized_threshold: 45.0,
            report_year: None,
        }
    }
}

impl ReportConfig {
    /// Load the config from `path` if it exists, otherwise use defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let file = File::open(path)?;
            let config: ReportConfig = serde_json::from_reader(file)?;
            info!(path = %path.display(), "loaded config override");
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Directory the chart images are written to.
    pub fn charts_dir(&self) -> PathBuf {
        self.output_dir.join("charts")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_file_absent() {
        let config = ReportConfig::load_or_default(Path::new("no_such_config.json")).unwrap();
        assert_eq!(config.industrialized_threshold, 45.0);
        assert_eq!(config.report_year, None);
        assert_eq!(config.output_dir, PathBuf::from("out"));
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let json = r#"{ "industrialized_threshold": 50.0 }"#;
        let config: ReportConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.industrialized_threshold, 50.0);
        assert_eq!(config.emissions_path, PathBuf::from("data/emissions.csv"));
    }
}
