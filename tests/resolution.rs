use std::future::Future;
use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use tcping::{
    AddressFamily, AddressResolver, Lookup, ProbeAttemptResult, ProbeConfiguration, Reporter, Resolution,
    ResolvedTarget, RunSummary, TcpingError, Termination,
};

/// Lookup answering every host with the same candidates.
struct FixedLookup(Vec<IpAddr>);

impl Lookup for FixedLookup {
    fn lookup(&self, _host: &str) -> impl Future<Output = io::Result<Vec<IpAddr>>> + Send {
        let candidates = self.0.clone();
        async move { Ok(candidates) }
    }
}

#[derive(Default)]
struct CountingReporter {
    resolved: Vec<String>,
    attempts: usize,
    summaries: usize,
}

impl Reporter for CountingReporter {
    fn resolved(&mut self, host: &str, resolution: &Resolution) {
        self.resolved.push(format!("{host} {resolution}"));
    }

    fn attempt(&mut self, _target: &ResolvedTarget, _result: &ProbeAttemptResult) {
        self.attempts += 1;
    }

    fn summary(&mut self, _summary: &RunSummary, _termination: Termination) {
        self.summaries += 1;
    }
}

fn ipv6_only() -> AddressResolver<FixedLookup> {
    AddressResolver::new().with_lookup(FixedLookup(vec![
        IpAddr::V6("2001:db8::1".parse::<Ipv6Addr>().unwrap()),
        IpAddr::V6("2001:db8::2".parse::<Ipv6Addr>().unwrap()),
    ]))
}

#[tokio::test]
async fn test_no_matching_record_reports_nothing() {
    let config = ProbeConfiguration::new("v6only.example", 443);
    let mut reporter = CountingReporter::default();

    let err = tcping::resolve_target(&config, &ipv6_only(), &mut reporter)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        TcpingError::NoMatchingRecord { ref host, record: "A" } if host == "v6only.example"
    ));
    assert_eq!(err.exit_code(), 1);
    assert!(reporter.resolved.is_empty());
    assert_eq!(reporter.attempts, 0);
    assert_eq!(reporter.summaries, 0);
}

#[tokio::test]
async fn test_matching_record_is_reported_once() {
    let config = ProbeConfiguration::new("v6only.example", 443).with_family(AddressFamily::V6);
    let mut reporter = CountingReporter::default();

    let target = tcping::resolve_target(&config, &ipv6_only(), &mut reporter)
        .await
        .unwrap();

    assert_eq!(target, ResolvedTarget::new("2001:db8::1".parse().unwrap(), 443));
    assert_eq!(reporter.resolved, vec!["v6only.example 2001:db8::1".to_string()]);
    assert_eq!(reporter.attempts, 0);
    assert_eq!(reporter.summaries, 0);
}

#[tokio::test]
async fn test_literal_host_skips_lookup() {
    // an empty candidate list would fail any lookup
    let resolver = AddressResolver::new().with_lookup(FixedLookup(Vec::new()));
    let config = ProbeConfiguration::new("127.0.0.1", 80);
    let mut reporter = CountingReporter::default();

    let target = tcping::resolve_target(&config, &resolver, &mut reporter)
        .await
        .unwrap();

    assert_eq!(target.ip, IpAddr::V4(Ipv4Addr::LOCALHOST));
    assert_eq!(reporter.resolved, vec!["127.0.0.1 127.0.0.1".to_string()]);
}
