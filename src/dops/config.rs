use crate::error::{DopsError, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_FILENAME: &str = "config.json";
const CONFIG_DIR_ENV: &str = "DOPS_CONFIG_DIR";
const DEFAULT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DEFAULT_TIMEZONE: &str = "local";
const DEFAULT_WATCH_INTERVAL: &str = "2s";

/// Output formats tried when neither the command line nor the config names any.
/// Ordered from widest to narrowest; the last one is always used if nothing fits.
pub const DEFAULT_FORMATS: &[&str] = &[
    "table {{.ID}}\t{{.Names}}\t{{.ImageName}}\t{{.ImageTag}}\t{{.ShortCommand}}\t{{.CreatedAt}}\t{{.State}}\t{{.Status}}\t{{.LongPublishedPorts}}\t{{.Networks}}\t{{.IP}}",
    "table {{.ID}}\t{{.Names}}\t{{.ImageName}}\t{{.ImageTag}}\t{{.ShortCommand}}\t{{.CreatedAt}}\t{{.State}}\t{{.Status}}\t{{.ShortPublishedPorts}}\t{{.Networks}}",
    "table {{.ID}}\t{{.Names}}\t{{.ImageName}}\t{{.ImageTag}}\t{{.CreatedAt}}\t{{.State}}\t{{.Status}}\t{{.ShortPublishedPorts}}",
    "table {{.ID}}\t{{.Names}}\t{{.ImageName}}\t{{.State}}\t{{.Status}}\t{{.ShortPublishedPorts}}",
    "table {{.Names}}\t{{.ImageName}}\t{{.State}}\t{{.Status}}",
    "table {{.Names}}\t{{.State}}",
];

/// Configuration for dops, stored in `<config dir>/config.json`.
///
/// Every key is optional in the file; command line options win over it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DopsConfig {
    /// Format candidates, widest first
    pub formats: Vec<String>,

    /// strftime format for `{{.CreatedAt}}`
    pub time_format: String,

    /// `local`, `UTC` or a fixed offset such as `+02:00`
    pub timezone: String,

    /// Refresh interval used by `--watch` without a value
    pub watch_interval: String,

    /// Maximum cell width per field, e.g. `{"Command": 30}`
    pub column_widths: BTreeMap<String, usize>,

    /// Print the table header line
    pub header: bool,

    /// Print the dashed line under the header
    pub separator: bool,

    /// Docker socket path; `None` means `DOCKER_HOST` or the default socket
    pub socket: Option<String>,
}

impl Default for DopsConfig {
    fn default() -> Self {
        Self {
            formats: DEFAULT_FORMATS.iter().map(|f| f.to_string()).collect(),
            time_format: DEFAULT_TIME_FORMAT.to_string(),
            timezone: DEFAULT_TIMEZONE.to_string(),
            watch_interval: DEFAULT_WATCH_INTERVAL.to_string(),
            column_widths: BTreeMap::new(),
            header: true,
            separator: true,
            socket: None,
        }
    }
}

impl DopsConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)?;
        serde_json::from_str(&content)
            .map_err(|e| DopsError::Config(format!("{}: {}", config_path.display(), e)))
    }

    /// Save config to the given directory
    pub fn watch_interval(&self) -> Result<Duration> {
        parse_interval(&self.watch_interval)
    }
}

/// Directory holding `config.json`: `$DOPS_CONFIG_DIR`, else the platform config dir.
pub fn config_dir() -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
        return Some(PathBuf::from(dir));
    }
    ProjectDirs::from("com", "dops", "dops").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Parses a refresh interval: `500ms`, `2s`, `1m`, or bare (fractional) seconds.
pub fn parse_interval(value: &str) -> Result<Duration> {
    let value = value.trim();
    let invalid = || DopsError::Config(format!("Invalid interval: '{}'", value));

    let (number, unit_ms) = if let Some(n) = value.strip_suffix("ms") {
        (n, 1.0)
    } else if let Some(n) = value.strip_suffix('s') {
        (n, 1000.0)
    } else if let Some(n) = value.strip_suffix('m') {
        (n, 60_000.0)
    } else {
        (value, 1000.0)
    };

    let amount: f64 = number.trim().parse().map_err(|_| invalid())?;
    if !amount.is_finite() || amount <= 0.0 {
        return Err(invalid());
    }
    match (amount * unit_ms).round() as u64 {
        0 => Err(invalid()),
        millis => Ok(Duration::from_millis(millis)),
    }
}
