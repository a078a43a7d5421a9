use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::config::{
    AppConfig, AttemptLimit, DEFAULT_COUNT, DEFAULT_PORT, DEFAULT_TIMEOUT, DelayMode, ProbeConfiguration, parse_port,
};
use crate::error::TcpingError;
use crate::resolver::AddressFamily;

/// Probe a TCP port and report connect latency.
#[derive(Debug, Parser)]
#[command(name = "tcping", disable_version_flag = true)]
pub struct Cli {
    /// Host name or IP address
    pub host: Option<String>,

    /// TCP port, default 80
    pub port: Option<String>,

    /// Number of probes, default 4
    #[arg(short, long)]
    pub count: Option<u64>,

    /// Timeout per probe, default 2s
    #[arg(short = 's', long, value_parser = parse_duration)]
    pub timeout: Option<Duration>,

    /// Infinite probes
    #[arg(short = 't', long)]
    pub infinite: bool,

    /// Use IPv6; requires domain name
    #[arg(short = '6', long)]
    pub ipv6: bool,

    /// Fast mode; reduce delay between probes
    #[arg(short, long)]
    pub fast: bool,

    /// Show version
    #[arg(short = 'v', long)]
    pub version: bool,

    /// Log diagnostics to stderr
    #[arg(long)]
    pub verbose: bool,

    /// Defaults file, instead of the per-user config.json
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Merge flags over file defaults and validate.
    pub fn to_configuration(&self, defaults: &AppConfig) -> Result<ProbeConfiguration, TcpingError> {
        let host = self.host.clone().ok_or(TcpingError::MissingHost)?;

        let port = match &self.port {
            Some(raw) => parse_port(raw)?,
            None => DEFAULT_PORT,
        };

        let attempt_limit = if self.infinite {
            AttemptLimit::Unbounded
        } else {
            AttemptLimit::Finite(self.count.or(defaults.count).unwrap_or(DEFAULT_COUNT))
        };

        let timeout = self.timeout.or(defaults.timeout()).unwrap_or(DEFAULT_TIMEOUT);
        if timeout.is_zero() {
            return Err(TcpingError::Configuration("timeout must be greater than zero".into()));
        }

        let delay = if self.fast || defaults.fast.unwrap_or(false) {
            DelayMode::Fast
        } else {
            DelayMode::Normal
        };

        let family = if self.ipv6 || defaults.ipv6.unwrap_or(false) {
            AddressFamily::V6
        } else {
            AddressFamily::V4
        };

        Ok(ProbeConfiguration::new(host, port)
            .with_attempt_limit(attempt_limit)
            .with_timeout(timeout)
            .with_delay(delay)
            .with_family(family))
    }
}

/// Parse durations such as `2s`, `200ms`, `1m30s` or `1.5s`.
///
/// Whole-number input goes straight to humantime. A single fractional term
/// like `1.5s` is scaled from the unit humantime reports for `1s`.
pub fn parse_duration(text: &str) -> Result<Duration, String> {
    let s = text.trim();
    if s.is_empty() {
        return Err("duration string is empty".to_string());
    }
    if s == "0" {
        return Ok(Duration::ZERO);
    }
    if let Some(fractional) = parse_fractional(s) {
        return fractional;
    }
    humantime::parse_duration(s).map_err(|e| e.to_string())
}

fn parse_fractional(s: &str) -> Option<Result<Duration, String>> {
    let split = s.find(|c: char| !(c.is_ascii_digit() || c == '.'))?;
    let (number, unit) = s.split_at(split);
    if !number.contains('.') {
        return None;
    }
    if !unit.chars().all(char::is_alphabetic) {
        return Some(Err(format!("invalid duration {s:?}")));
    }

    let value: f64 = match number.parse() {
        Ok(value) => value,
        Err(_) => return Some(Err(format!("invalid duration {s:?}"))),
    };
    let unit = match humantime::parse_duration(&format!("1{unit}")) {
        Ok(unit) => unit,
        Err(e) => return Some(Err(e.to_string())),
    };
    Some(Duration::try_from_secs_f64(unit.as_secs_f64() * value).map_err(|_| format!("duration {s:?} is too large")))
}
