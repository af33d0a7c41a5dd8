//! Configuration loading and parsing

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main application configuration (loaded from config.toml)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub input: InputConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub decode: DecodeConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InputConfig {
    /// Trace file to decode
    pub trace: PathBuf,
    /// Only decode these CAN identifiers
    #[serde(default)]
    pub ids: Vec<u32>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OutputConfig {
    /// Output file (stdout when absent)
    pub file: Option<PathBuf>,
    /// Emit JSON lines instead of plain text
    #[serde(default)]
    pub json: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DecodeConfig {
    /// Decode identifier groups sequentially
    #[serde(default)]
    pub sequential: bool,
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let toml_content = r#"
            [input]
            trace = "bus.trace"
            ids = [0x700, 0x7E8]

            [output]
            json = true
        "#;

        let config: AppConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.input.trace, PathBuf::from("bus.trace"));
        assert_eq!(config.input.ids, vec![0x700, 0x7E8]);
        assert!(config.output.json);
        assert!(config.output.file.is_none());
        assert!(!config.decode.sequential);
    }

    #[test]
    fn test_minimal_config() {
        let toml_content = r#"
            [input]
            trace = "bus.trace"
        "#;

        let config: AppConfig = toml::from_str(toml_content).unwrap();
        assert!(config.input.ids.is_empty());
        assert!(config.output.file.is_none());
        assert!(!config.output.json);
    }
}
