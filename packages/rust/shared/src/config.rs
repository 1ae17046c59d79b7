//! Application configuration for Parallels.
//!
//! An optional `parallels.toml` in the working directory (or a file passed
//! with `--config`) sets input and output paths. CLI flags override config
//! file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ParallelsError, Result};

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "parallels.toml";

// ---------------------------------------------------------------------------
// Config structs (matching parallels.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Source documents.
    #[serde(default)]
    pub inputs: InputsConfig,

    /// Generated JSON.
    #[serde(default)]
    pub output: OutputConfig,
}

/// `[inputs]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputsConfig {
    /// Transcribed source text with citation markers.
    #[serde(default = "default_text")]
    pub text: String,

    /// Cross-reference table (header line first).
    #[serde(default = "default_table")]
    pub table: String,
}

impl Default for InputsConfig {
    fn default() -> Self {
        Self {
            text: default_text(),
            table: default_table(),
        }
    }
}

fn default_text() -> String {
    "josephus.txt".into()
}
fn default_table() -> String {
    "input_file_0.csv".into()
}

/// `[output]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Path of the JSON file to write.
    #[serde(default = "default_output_path")]
    pub path: String,

    /// Pretty-print with 2-space indentation.
    #[serde(default = "default_true")]
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            pretty: true,
        }
    }
}

fn default_output_path() -> String {
    "full_parallels.json".into()
}
fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Pipeline config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime pipeline configuration, merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Source text path.
    pub text_path: PathBuf,
    /// Relation table path.
    pub table_path: PathBuf,
    /// Output JSON path.
    pub output_path: PathBuf,
    /// Pretty-print the output.
    pub pretty: bool,
}

impl From<&AppConfig> for PipelineConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            text_path: PathBuf::from(&config.inputs.text),
            table_path: PathBuf::from(&config.inputs.table),
            output_path: PathBuf::from(&config.output.path),
            pretty: config.output.pretty,
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the config from an explicit path, or from `./parallels.toml` when it
/// exists. Returns defaults otherwise.
///
/// An explicit path that does not exist is an error; a missing default file
/// is not.
pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig> {
    if let Some(path) = explicit {
        return load_config_from(path);
    }

    let path = Path::new(CONFIG_FILE_NAME);
    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| ParallelsError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        ParallelsError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Write a default config file into `dir`. Returns the path to the created file.
pub fn init_config(dir: &Path) -> Result<PathBuf> {
    let path = dir.join(CONFIG_FILE_NAME);
    let content = toml::to_string_pretty(&AppConfig::default())
        .map_err(|e| ParallelsError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| ParallelsError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "parallels-config-test-{}",
            uuid::Uuid::now_v7()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("josephus.txt"));
        assert!(toml_str.contains("full_parallels.json"));
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[output]
path = "site/data/parallels.json"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.output.path, "site/data/parallels.json");
        assert!(config.output.pretty);
        assert_eq!(config.inputs.text, "josephus.txt");
        assert_eq!(config.inputs.table, "input_file_0.csv");
    }

    #[test]
    fn pipeline_config_from_app_config() {
        let mut app = AppConfig::default();
        app.output.pretty = false;
        let pipeline = PipelineConfig::from(&app);
        assert_eq!(pipeline.text_path, PathBuf::from("josephus.txt"));
        assert_eq!(pipeline.table_path, PathBuf::from("input_file_0.csv"));
        assert_eq!(pipeline.output_path, PathBuf::from("full_parallels.json"));
        assert!(!pipeline.pretty);
    }

    #[test]
    fn invalid_config_is_a_config_error() {
        let dir = temp_dir();
        let path = dir.join("bad.toml");
        std::fs::write(&path, "[output]\npretty = \"sometimes\"\n").unwrap();

        let err = load_config_from(&path).unwrap_err();
        assert!(matches!(err, ParallelsError::Config { .. }));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn explicit_missing_config_is_an_error() {
        let result = load_config(Some(Path::new("definitely/not/here/parallels.toml")));
        assert!(result.unwrap_err().is_not_found());
    }

    #[test]
    fn init_config_roundtrip() {
        let dir = temp_dir();

        let path = init_config(&dir).expect("init");
        let parsed = load_config_from(&path).expect("reload");
        assert_eq!(parsed.inputs.text, "josephus.txt");
        assert!(parsed.output.pretty);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
