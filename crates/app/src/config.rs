use anyhow::{Context, Result};
use qbofix_engine::FilterConfig;
use qbofix_ingest::BankProfile;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where the browser drops bank exports.
    pub download_dir: PathBuf,
    /// Where repaired statements are written.
    pub output_dir: PathBuf,
    /// Statement file extension, with the leading dot.
    pub statement_ext: String,
    /// Delete the source file after a successful repair.
    pub remove_originals: bool,
    pub filter: FilterConfig,
    pub bank: BankProfile,
}

impl Default for Config {
    fn default() -> Self {
        let user_dirs = directories::UserDirs::new();
        let download_dir = user_dirs
            .as_ref()
            .and_then(|d| d.download_dir().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."));
        let output_dir = user_dirs
            .as_ref()
            .and_then(|d| d.document_dir().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."));
        Self {
            download_dir,
            output_dir,
            statement_ext: ".qbo".to_string(),
            remove_originals: true,
            filter: FilterConfig::default(),
            bank: BankProfile::default(),
        }
    }
}

/// Load configuration from `path`, or fall back to defaults when no path
/// is given or the file does not exist.
pub fn load(path: Option<&Path>) -> Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    if !path.exists() {
        return Ok(Config::default());
    }
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    toml::from_str(&contents).with_context(|| format!("parse config {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_path_uses_defaults() {
        let config = load(None).unwrap();
        assert_eq!(config.statement_ext, ".qbo");
        assert!(config.remove_originals);
    }

    #[test]
    fn partial_config_fills_in_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "download_dir = \"/tmp/in\"\nremove_originals = false").unwrap();
        let config = load(Some(file.path())).unwrap();
        assert_eq!(config.download_dir, PathBuf::from("/tmp/in"));
        assert!(!config.remove_originals);
        assert_eq!(config.statement_ext, ".qbo");
        assert!(!config.filter.remove.is_empty());
    }

    #[test]
    fn filter_rules_survive_round_trip_in_order() {
        let config = Config::default();
        let toml = toml::to_string(&config).unwrap();
        let back: Config = toml::from_str(&toml).unwrap();
        assert_eq!(back.filter, config.filter);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = load(Some(Path::new("/nonexistent/qbofix.toml"))).unwrap();
        assert_eq!(config.statement_ext, ".qbo");
        assert!(!config.filter.remove.is_empty());
    }

    #[test]
    fn malformed_config_is_an_error_with_context() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "statement_ext = [not toml").unwrap();
        let err = load(Some(file.path())).unwrap_err();
        assert!(err.to_string().contains(&file.path().display().to_string()));
    }
}
