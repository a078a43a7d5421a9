//! Console output.
//!
//! Everything a user reads on stdout goes through a [`Reporter`]; diagnostics
//! go through `log` to stderr instead.

use std::io::{self, Write};

use log::warn;

use crate::probe::{ProbeAttemptResult, ResolvedTarget, RunSummary};
use crate::probe_loop::Termination;
use crate::resolver::Resolution;

pub trait Reporter: Send {
    /// Called once after a hostname lookup. Literal IPs are not reported.
    fn resolved(&mut self, _host: &str, _resolution: &Resolution) {}

    /// Called once per attempt, in sequence order.
    fn attempt(&mut self, target: &ResolvedTarget, result: &ProbeAttemptResult);

    fn summary(&mut self, summary: &RunSummary, termination: Termination);
}

pub fn format_resolved(host: &str, resolution: &Resolution) -> Option<String> {
    match resolution {
        Resolution::Literal(_) => None,
        Resolution::Record { family, .. } => Some(format!("Using {host} {} record: {resolution}", family.record())),
    }
}

pub fn format_attempt(target: &ResolvedTarget, result: &ProbeAttemptResult) -> String {
    if result.is_success() {
        format!("[{}] Reply from {target}: time={:.3}ms", result.sequence, result.elapsed_ms())
    } else {
        format!("[{}] Connection to {target} failed: timeout", result.sequence)
    }
}

pub fn format_summary(summary: &RunSummary, termination: Termination) -> String {
    let header = match termination {
        Termination::Completed => "",
        Termination::Cancelled => "Test interrupted by user\n",
    };
    format!(
        "\n{header}Test finished, success {}/{} ({:.2}%)\nmin = {:.3}ms, max = {:.3}ms, avg = {:.3}ms",
        summary.successes,
        summary.attempts_made,
        summary.success_rate_percent,
        summary.min_latency_ms,
        summary.max_latency_ms,
        summary.avg_latency_ms,
    )
}

/// Line-oriented reporter over any writer, stdout in the binary.
pub struct ConsoleReporter<W> {
    out: W,
}

impl ConsoleReporter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, text: &str) {
        let written = writeln!(self.out, "{text}").and_then(|_| self.out.flush());
        if let Err(e) = written {
            warn!("Failed to write report: {e}");
        }
    }
}

impl<W: Write + Send> Reporter for ConsoleReporter<W> {
    fn resolved(&mut self, host: &str, resolution: &Resolution) {
        if let Some(text) = format_resolved(host, resolution) {
            self.line(&text);
        }
    }

    fn attempt(&mut self, target: &ResolvedTarget, result: &ProbeAttemptResult) {
        self.line(&format_attempt(target, result));
    }

    fn summary(&mut self, summary: &RunSummary, termination: Termination) {
        self.line(&format_summary(summary, termination));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::{FailureReason, ProbeAttempt};
    use crate::resolver::AddressFamily;
    use chrono::Local;
    use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
    use std::time::Duration;

    fn target() -> ResolvedTarget {
        ResolvedTarget::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 9999)
    }

    #[test]
    fn test_attempt_lines() {
        let ok = ProbeAttemptResult::new(1, ProbeAttempt::success(Local::now(), Duration::from_micros(12_345)));
        let refused = ProbeAttemptResult::new(
            2,
            ProbeAttempt::failure(Local::now(), Duration::from_millis(1), FailureReason::Refused),
        );

        assert_eq!(format_attempt(&target(), &ok), "[1] Reply from 127.0.0.1:9999: time=12.345ms");
        // every failure kind prints the same
        assert_eq!(
            format_attempt(&target(), &refused),
            "[2] Connection to 127.0.0.1:9999 failed: timeout"
        );
    }

    #[test]
    fn test_resolved_line_only_for_lookups() {
        let literal = Resolution::Literal(IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert_eq!(format_resolved("127.0.0.1", &literal), None);

        let record = Resolution::Record {
            ip: IpAddr::V6(Ipv6Addr::LOCALHOST),
            family: AddressFamily::V6,
        };
        assert_eq!(
            format_resolved("localhost", &record).as_deref(),
            Some("Using localhost AAAA record: ::1")
        );
    }

    #[test]
    fn test_summary_completed_and_cancelled() {
        let summary = RunSummary {
            attempts_made: 3,
            ..RunSummary::default()
        };

        assert_eq!(
            format_summary(&summary, Termination::Completed),
            "\nTest finished, success 0/3 (0.00%)\nmin = 0.000ms, max = 0.000ms, avg = 0.000ms"
        );
        assert_eq!(
            format_summary(&summary, Termination::Cancelled),
            "\nTest interrupted by user\nTest finished, success 0/3 (0.00%)\nmin = 0.000ms, max = 0.000ms, avg = 0.000ms"
        );
    }

    #[test]
    fn test_console_reporter_writes_lines() {
        let mut reporter = ConsoleReporter::new(Vec::new());
        let ok = ProbeAttemptResult::new(1, ProbeAttempt::success(Local::now(), Duration::from_millis(5)));
        reporter.attempt(&target(), &ok);
        reporter.summary(
            &RunSummary {
                attempts_made: 1,
                successes: 1,
                success_rate_percent: 100.0,
                min_latency_ms: 5.0,
                max_latency_ms: 5.0,
                avg_latency_ms: 5.0,
            },
            Termination::Completed,
        );

        let text = String::from_utf8(reporter.into_inner()).unwrap();
        assert_eq!(
            text,
            "[1] Reply from 127.0.0.1:9999: time=5.000ms\n\nTest finished, success 1/1 (100.00%)\nmin = 5.000ms, max = 5.000ms, avg = 5.000ms\n"
        );
    }
}
