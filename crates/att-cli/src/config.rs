//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use att_core::{Day, Target};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding `data.json` and `timetable.json`.
    pub data_dir: PathBuf,
    /// Weekdays the timetable supports.
    pub days: Vec<Day>,
    /// Target used when `subject add` is given none.
    pub default_target: Target,
    /// OCR.space API key.
    pub ocr_api_key: Option<String>,
    /// Language hint sent to the OCR service.
    pub ocr_language: String,
    /// Upper bound on a single OCR request.
    pub ocr_timeout_secs: u64,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("data_dir", &self.data_dir)
            .field("days", &self.days)
            .field("default_target", &self.default_target)
            .field(
                "ocr_api_key",
                &self.ocr_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("ocr_language", &self.ocr_language)
            .field("ocr_timeout_secs", &self.ocr_timeout_secs)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: dirs_data_path().unwrap_or_else(|| PathBuf::from(".")),
            days: Day::TEACHING_WEEK.to_vec(),
            default_target: Target::default(),
            ocr_api_key: None,
            ocr_language: att_ocr::DEFAULT_LANGUAGE.to_string(),
            ocr_timeout_secs: att_ocr::DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (ATT_*)
        figment = figment.merge(Env::prefixed("ATT_"));

        figment.extract()
    }

    pub const fn ocr_timeout(&self) -> Duration {
        Duration::from_secs(self.ocr_timeout_secs)
    }
}

/// Returns the platform-specific config directory for att.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("att"))
}

/// Returns the platform-specific data directory for att.
///
/// On Linux: `~/.local/share/att`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("att"))
}
