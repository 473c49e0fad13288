//! Settings loading for vortex-meter
//!
//! Configuration lives in `config.toml` under the platform config directory
//! (`~/.config/vortex-meter/` on Linux). The `VMETER_CONFIG` environment
//! variable overrides the file path, which the tests use to point at
//! temporary files. A missing file yields defaults; a present-but-broken
//! file is an error, since silently ignoring a typo'd engine URL would be
//! worse than refusing to start.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use vmeter_core::prelude::*;
use vmeter_core::{TestDuration, DEFAULT_DURATION_SECS};

const CONFIG_FILENAME: &str = "config.toml";
const CONFIG_DIR: &str = "vortex-meter";

/// Environment variable overriding the config file path.
pub const CONFIG_PATH_ENV: &str = "VMETER_CONFIG";

/// Address of the local engine process, from the original deployment.
pub const DEFAULT_ENGINE_URL: &str = "ws://127.0.0.1:9001";

/// User configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// WebSocket address of the test engine.
    pub engine_url: String,
    /// Test length used when none is given on the command line.
    pub default_duration: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            engine_url: DEFAULT_ENGINE_URL.to_string(),
            default_duration: DEFAULT_DURATION_SECS,
        }
    }
}

impl Settings {
    /// Load settings from the default location (or `VMETER_CONFIG`).
    ///
    /// A missing file is not an error; defaults apply.
    pub fn load() -> Result<Self> {
        match config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load and validate settings from a specific file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let settings: Settings = toml::from_str(&raw)
            .map_err(|e| Error::config(format!("parsing {}: {}", path.display(), e)))?;
        settings.validate()?;
        info!("loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Check that the engine URL and default duration are usable.
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.engine_url)
            .map_err(|e| Error::config(format!("invalid engine_url: {}", e)))?;
        if url.scheme() != "ws" && url.scheme() != "wss" {
            return Err(Error::config(format!(
                "engine_url must use ws:// or wss://, got {}://",
                url.scheme()
            )));
        }
        TestDuration::new(self.default_duration)?;
        Ok(())
    }

    /// The validated default duration.
    pub fn duration(&self) -> Result<TestDuration> {
        TestDuration::new(self.default_duration)
    }
}

/// Resolve the config file path: env override, then the platform directory.
fn config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILENAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.engine_url, DEFAULT_ENGINE_URL);
        assert_eq!(settings.default_duration, 15);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_load_from_full_file() {
        let file = write_config(
            r#"
engine_url = "ws://10.0.0.2:9001"
default_duration = 60
"#,
        );
        let settings = Settings::load_from(file.path()).unwrap();
        assert_eq!(settings.engine_url, "ws://10.0.0.2:9001");
        assert_eq!(settings.default_duration, 60);
    }

    #[test]
    fn test_load_from_partial_file_fills_defaults() {
        let file = write_config(r#"default_duration = 5"#);
        let settings = Settings::load_from(file.path()).unwrap();
        assert_eq!(settings.engine_url, DEFAULT_ENGINE_URL);
        assert_eq!(settings.default_duration, 5);
    }

    #[test]
    fn test_load_from_rejects_bad_toml() {
        let file = write_config("engine_url = [not toml");
        assert!(Settings::load_from(file.path()).is_err());
    }

    #[test]
    fn test_validate_rejects_non_websocket_scheme() {
        let settings = Settings {
            engine_url: "http://127.0.0.1:9001".into(),
            ..Settings::default()
        };
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("ws://"));
    }

    #[test]
    fn test_validate_rejects_unparseable_url() {
        let settings = Settings {
            engine_url: "not a url".into(),
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_disallowed_duration() {
        let settings = Settings {
            default_duration: 42,
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    #[serial]
    fn test_load_honors_env_override() {
        let file = write_config(r#"default_duration = 30"#);
        std::env::set_var(CONFIG_PATH_ENV, file.path());
        let settings = Settings::load().unwrap();
        std::env::remove_var(CONFIG_PATH_ENV);
        assert_eq!(settings.default_duration, 30);
    }

    #[test]
    #[serial]
    fn test_load_with_missing_override_path_uses_defaults() {
        std::env::set_var(CONFIG_PATH_ENV, "/nonexistent/vmeter-config.toml");
        let settings = Settings::load().unwrap();
        std::env::remove_var(CONFIG_PATH_ENV);
        assert_eq!(settings, Settings::default());
    }
}
