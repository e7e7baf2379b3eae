//! Per-host configuration for the recognizer (§2 "Configuration [NEW]").
//!
//! Exposes numeric knobs only — `max_input_len` (the runtime's ring-buffer
//! capacity, §3/§5) and per-mode `max_count` overrides a host can raise or
//! lower without recompiling a command table. Unknown TOML fields are
//! ignored, same forward-compatibility stance as the rest of this corpus;
//! keymaps themselves stay Rust code, never data, so this crate never
//! defines bindings.

use std::collections::HashMap;
use std::{fs, path::PathBuf};

use anyhow::Result;
use serde::Deserialize;
use tracing::{info, warn};

/// Ring-buffer capacity used when no override is configured (§3/§5).
pub const DEFAULT_MAX_INPUT_LEN: usize = 64;

#[derive(Debug, Deserialize, Default, Clone)]
pub struct RecognizerConfig {
    #[serde(default)]
    pub max_input_len: Option<usize>,
    #[serde(default)]
    pub max_count: HashMap<String, u64>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ConfigFile {
    #[serde(default)]
    pub recognizer: RecognizerConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Original file contents, kept for diagnostics; `None` when no file was
    /// found and defaults were used.
    pub raw: Option<String>,
    pub file: ConfigFile,
}

/// Best-effort config path: a `vir.toml` in the current working directory.
pub fn discover() -> PathBuf {
    PathBuf::from("vir.toml")
}

/// Loads configuration from `path`, or from [`discover`] if `path` is
/// `None`. A missing file or a malformed one both fall back to
/// [`Config::default`] rather than failing the whole process — the
/// recognizer must still function with every knob at its built-in default.
pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        return Ok(Config::default());
    };
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => {
            info!(target: "recognizer.config", path = %path.display(), "config_loaded");
            Ok(Config {
                raw: Some(content),
                file,
            })
        }
        Err(error) => {
            warn!(
                target: "recognizer.config",
                path = %path.display(),
                %error,
                "config_parse_failed_using_defaults"
            );
            Ok(Config::default())
        }
    }
}

impl Config {
    /// Effective ring-buffer capacity (§3/§5), falling back to
    /// [`DEFAULT_MAX_INPUT_LEN`] when unset.
    pub fn max_input_len(&self) -> usize {
        self.file.recognizer.max_input_len.unwrap_or(DEFAULT_MAX_INPUT_LEN)
    }

    /// A configured override for `mode`'s count cap, if any. Command tables
    /// apply this as a ceiling under their own built-in `max_count` (never a
    /// way to raise a cap a command table set lower, only to tighten it
    /// further or relax it up to the table's own ceiling).
    pub fn max_count_override(&self, mode: &str) -> Option<u64> {
        self.file.recognizer.max_count.get(mode).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_when_missing_file() {
        let cfg = load_from(Some(PathBuf::from("__nonexistent_vir_config__.toml"))).unwrap();
        assert_eq!(cfg.max_input_len(), DEFAULT_MAX_INPUT_LEN);
        assert!(cfg.raw.is_none());
    }

    #[test]
    fn parses_max_input_len_override() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "[recognizer]\nmax_input_len = 128\n").unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg.max_input_len(), 128);
    }

    #[test]
    fn parses_per_mode_max_count_overrides() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            tmp.path(),
            "[recognizer.max_count]\nnormal = 9999\nvisual = 16\n",
        )
        .unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg.max_count_override("normal"), Some(9999));
        assert_eq!(cfg.max_count_override("visual"), Some(16));
        assert_eq!(cfg.max_count_override("insert"), None);
    }

    #[test]
    fn malformed_toml_falls_back_to_defaults() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "this is not valid toml [[[").unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg.max_input_len(), DEFAULT_MAX_INPUT_LEN);
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            tmp.path(),
            "[recognizer]\nmax_input_len = 64\nsome_future_knob = true\n",
        )
        .unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg.max_input_len(), 64);
    }
}
