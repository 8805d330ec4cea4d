//! Configuration loading and parsing.
//!
//! Parses `kilo.toml` from the working directory or the platform config
//! directory. Every key is optional and defaults to the classic compiled-in
//! constant, so a missing or unparseable file reproduces the canonical
//! behaviour exactly. Unknown fields are ignored to allow forward evolution.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use serde::Deserialize;
use tracing::warn;

/// Default tab expansion width.
pub const TAB_STOP: usize = 8;
/// Default number of confirmation presses to quit with unsaved changes.
pub const QUIT_TIMES: usize = 3;
/// Default status message lifetime, seconds.
pub const MESSAGE_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Tab expansion width (render cells per tab stop).
    pub tab_stop: usize,
    /// Unsaved-changes confirmation presses before quit.
    pub quit_times: usize,
    /// Status message lifetime in seconds.
    pub message_timeout: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tab_stop: TAB_STOP,
            quit_times: QUIT_TIMES,
            message_timeout: MESSAGE_TIMEOUT_SECS,
        }
    }
}

impl Config {
    pub fn message_timeout(&self) -> Duration {
        Duration::from_secs(self.message_timeout)
    }

    /// Clamp values the editor cannot operate with. A zero tab stop would
    /// divide by zero in the render derivation; a zero quit threshold would
    /// make the unsaved-changes guard unreachable.
    fn sanitize(mut self, path: &Path) -> Self {
        if self.tab_stop == 0 {
            warn!(target: "config", file = %path.display(), "tab_stop_clamped_to_one");
            self.tab_stop = 1;
        }
        if self.quit_times == 0 {
            warn!(target: "config", file = %path.display(), "quit_times_clamped_to_one");
            self.quit_times = 1;
        }
        self
    }
}

/// Best-effort config path: prefer a working-directory `kilo.toml`, then the
/// platform config dir.
pub fn discover() -> PathBuf {
    let local = PathBuf::from("kilo.toml");
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("kilo").join("kilo.toml");
    }
    PathBuf::from("kilo.toml")
}

/// Load configuration from `path`, falling back to discovery when absent. A
/// missing file yields the defaults silently; a malformed file yields the
/// defaults with a warning.
pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    match std::fs::read_to_string(&path) {
        Ok(content) => match toml::from_str::<Config>(&content) {
            Ok(config) => Ok(config.sanitize(&path)),
            Err(error) => {
                warn!(target: "config", file = %path.display(), %error, "config_parse_failed");
                Ok(Config::default())
            }
        },
        Err(_) => Ok(Config::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_file_is_missing() {
        let cfg = load_from(Some(PathBuf::from("__nonexistent_kilo_config__.toml"))).unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.tab_stop, 8);
        assert_eq!(cfg.quit_times, 3);
        assert_eq!(cfg.message_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn parses_all_keys() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            tmp.path(),
            "tab_stop = 4\nquit_times = 1\nmessage_timeout = 10\n",
        )
        .unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg.tab_stop, 4);
        assert_eq!(cfg.quit_times, 1);
        assert_eq!(cfg.message_timeout, 10);
    }

    #[test]
    fn partial_files_keep_remaining_defaults() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "tab_stop = 2\n").unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg.tab_stop, 2);
        assert_eq!(cfg.quit_times, 3);
    }

    #[test]
    fn unknown_keys_are_tolerated() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "tab_stop = 4\nfuture_option = true\n").unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg.tab_stop, 4);
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "tab_stop = \"eight\"\n").unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn zero_values_are_clamped() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "tab_stop = 0\nquit_times = 0\n").unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg.tab_stop, 1);
        assert_eq!(cfg.quit_times, 1);
    }
}
