use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use chrono::{DateTime, Local};

/// The single address every attempt of a run is sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub ip: IpAddr,
    pub port: u16,
}

impl ResolvedTarget {
    pub fn new(ip: IpAddr, port: u16) -> Self {
        Self { ip, port }
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.ip, self.port)
    }
}

impl fmt::Display for ResolvedTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // SocketAddr brackets IPv6 hosts
        self.socket_addr().fmt(f)
    }
}

/// Why a connect attempt failed. Only used for logs; output stays uniform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    Timeout,
    Refused,
    Other(String),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Timeout => f.write_str("timed out"),
            FailureReason::Refused => f.write_str("connection refused"),
            FailureReason::Other(msg) => f.write_str(msg),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Success,
    Failure(FailureReason),
}

/// What one prober invocation observed.
#[derive(Debug, Clone)]
pub struct ProbeAttempt {
    pub started_at: DateTime<Local>,
    pub elapsed: Duration,
    pub outcome: ProbeOutcome,
}

impl ProbeAttempt {
    pub fn success(started_at: DateTime<Local>, elapsed: Duration) -> Self {
        Self {
            started_at,
            elapsed,
            outcome: ProbeOutcome::Success,
        }
    }

    pub fn failure(started_at: DateTime<Local>, elapsed: Duration, reason: FailureReason) -> Self {
        Self {
            started_at,
            elapsed,
            outcome: ProbeOutcome::Failure(reason),
        }
    }
}

/// One numbered attempt in a run.
#[derive(Debug, Clone)]
pub struct ProbeAttemptResult {
    /// 1-based.
    pub sequence: u64,
    pub started_at: DateTime<Local>,
    /// On failure this is time until the error or timeout, never a latency sample.
    pub elapsed: Duration,
    pub outcome: ProbeOutcome,
}

impl ProbeAttemptResult {
    pub fn new(sequence: u64, attempt: ProbeAttempt) -> Self {
        Self {
            sequence,
            started_at: attempt.started_at,
            elapsed: attempt.elapsed,
            outcome: attempt.outcome,
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome == ProbeOutcome::Success
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1000.0
    }
}

/// Aggregate view of a finished run. Latency fields are milliseconds and all
/// zero when nothing succeeded.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunSummary {
    pub attempts_made: u64,
    pub successes: u64,
    pub success_rate_percent: f64,
    pub min_latency_ms: f64,
    pub max_latency_ms: f64,
    pub avg_latency_ms: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};

    #[test]
    fn test_target_display_brackets_ipv6() {
        let v4 = ResolvedTarget::new(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)), 80);
        let v6 = ResolvedTarget::new(IpAddr::V6(Ipv6Addr::LOCALHOST), 443);
        assert_eq!(v4.to_string(), "10.0.0.1:80");
        assert_eq!(v6.to_string(), "[::1]:443");
    }

    #[test]
    fn test_result_carries_attempt_fields() {
        let attempt = ProbeAttempt::failure(Local::now(), Duration::from_millis(200), FailureReason::Timeout);
        let result = ProbeAttemptResult::new(3, attempt);
        assert_eq!(result.sequence, 3);
        assert!(!result.is_success());
        assert!((result.elapsed_ms() - 200.0).abs() < 1e-9);
    }
}
