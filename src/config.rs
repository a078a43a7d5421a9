use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, warn};
use serde::Deserialize;

use crate::error::TcpingError;
use crate::resolver::AddressFamily;

pub const DEFAULT_PORT: u16 = 80;
pub const DEFAULT_COUNT: u64 = 4;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

const NORMAL_DELAY: Duration = Duration::from_secs(1);
const FAST_DELAY: Duration = Duration::from_millis(150);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptLimit {
    Finite(u64),
    Unbounded,
}

impl AttemptLimit {
    pub fn is_reached(self, attempts_made: u64) -> bool {
        match self {
            AttemptLimit::Finite(limit) => attempts_made >= limit,
            AttemptLimit::Unbounded => false,
        }
    }
}

/// Pause between attempts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DelayMode {
    #[default]
    Normal,
    Fast,
}

impl DelayMode {
    pub fn interval(self) -> Duration {
        match self {
            DelayMode::Normal => NORMAL_DELAY,
            DelayMode::Fast => FAST_DELAY,
        }
    }
}

/// Validated settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfiguration {
    pub target: String,
    pub port: u16,
    pub attempt_limit: AttemptLimit,
    pub timeout: Duration,
    pub delay: DelayMode,
    pub family: AddressFamily,
}

impl ProbeConfiguration {
    pub fn new(target: impl Into<String>, port: u16) -> Self {
        Self {
            target: target.into(),
            port,
            attempt_limit: AttemptLimit::Finite(DEFAULT_COUNT),
            timeout: DEFAULT_TIMEOUT,
            delay: DelayMode::Normal,
            family: AddressFamily::V4,
        }
    }

    pub fn with_attempt_limit(mut self, limit: AttemptLimit) -> Self {
        self.attempt_limit = limit;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_delay(mut self, delay: DelayMode) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_family(mut self, family: AddressFamily) -> Self {
        self.family = family;
        self
    }
}

/// Parse a port argument, rejecting non-numbers and anything outside 1..=65535.
pub fn parse_port(raw: &str) -> Result<u16, TcpingError> {
    let port: i64 = raw.trim().parse().map_err(|_| TcpingError::PortNotInteger)?;
    u16::try_from(port)
        .ok()
        .filter(|&p| p != 0)
        .ok_or(TcpingError::PortOutOfRange)
}

/// User defaults read from `config.json`. Every key is optional; command-line
/// flags win over anything set here.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub count: Option<u64>,
    pub timeout_ms: Option<u64>,
    pub fast: Option<bool>,
    pub ipv6: Option<bool>,
}

impl AppConfig {
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tcping").join("config.json"))
    }

    /// Load from the default location, falling back to empty defaults.
    pub fn load() -> Self {
        Self::get_config_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    /// A missing file is silently empty; an unreadable or malformed one is
    /// logged and ignored.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            debug!("no config file at {}", path.display());
            return Self::default();
        }

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!("Failed to read config file {}: {e}", path.display());
                return Self::default();
            }
        };

        match serde_json::from_str::<AppConfig>(&content) {
            Ok(config) => config,
            Err(e) => {
                warn!("Failed to parse config {}: {e}", path.display());
                Self::default()
            }
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}
