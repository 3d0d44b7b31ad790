use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

use crate::error::ExportError;

pub const DEFAULT_CONFIG_FILE: &str = "metaspace-export.json";
pub const DEFAULT_ENDPOINT: &str = "https://metaspace2020.org/graphql";
pub const DEFAULT_FDR: f64 = 0.1;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub fdr: Option<f64>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub output_dir: Option<String>,
    #[serde(default)]
    pub include_chem_mods: Option<bool>,
    #[serde(default)]
    pub include_neutral_losses: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub endpoint: String,
    pub fdr: f64,
    pub timeout: Option<Duration>,
    pub output_dir: Utf8PathBuf,
    pub include_chem_mods: bool,
    pub include_neutral_losses: bool,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            fdr: DEFAULT_FDR,
            timeout: None,
            output_dir: Utf8PathBuf::from("."),
            include_chem_mods: false,
            include_neutral_losses: false,
        }
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads `path`, or `metaspace-export.json` from the current directory
    /// when no path is given. Only an explicitly named file has to exist.
    pub fn resolve(path: Option<&str>) -> Result<ResolvedConfig, ExportError> {
        let config_path = match path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        if path.is_none() && !config_path.exists() {
            return Self::resolve_config(Config::default());
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|_| ExportError::ConfigRead(config_path.clone()))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|err| ExportError::ConfigParse(err.to_string()))?;

        Self::resolve_config(config)
    }

    pub fn resolve_config(config: Config) -> Result<ResolvedConfig, ExportError> {
        let fdr = config.fdr.unwrap_or(DEFAULT_FDR);
        if !(fdr > 0.0 && fdr <= 1.0) {
            return Err(ExportError::InvalidFdr(fdr));
        }

        let endpoint = config
            .endpoint
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        Ok(ResolvedConfig {
            endpoint,
            fdr,
            timeout: config.timeout_secs.map(Duration::from_secs),
            output_dir: config
                .output_dir
                .map(Utf8PathBuf::from)
                .unwrap_or_else(|| Utf8PathBuf::from(".")),
            include_chem_mods: config.include_chem_mods.unwrap_or(false),
            include_neutral_losses: config.include_neutral_losses.unwrap_or(false),
        })
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let resolved = ConfigLoader::resolve_config(Config::default()).unwrap();
        assert_eq!(resolved.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(resolved.fdr, DEFAULT_FDR);
        assert!(resolved.timeout.is_none());
        assert_eq!(resolved.output_dir, Utf8PathBuf::from("."));
        assert!(!resolved.include_chem_mods);
        assert!(!resolved.include_neutral_losses);
    }

    #[test]
    fn rejects_out_of_range_fdr() {
        let config = Config {
            fdr: Some(1.5),
            ..Config::default()
        };
        let err = ConfigLoader::resolve_config(config).unwrap_err();
        assert_matches!(err, ExportError::InvalidFdr(_));
    }
}
