use crate::probe::{ProbeAttemptResult, RunSummary};

/// Reduce an ordered run into its summary.
///
/// Failures count toward `attempts_made` and the success rate but never toward
/// latency. With no attempts or no successes the corresponding fields stay at
/// zero instead of dividing by zero.
pub fn summarize(results: &[ProbeAttemptResult]) -> RunSummary {
    let attempts_made = results.len() as u64;

    let mut successes = 0u64;
    let mut total_ms = 0.0;
    let mut min_ms = f64::INFINITY;
    let mut max_ms = f64::NEG_INFINITY;

    for result in results.iter().filter(|r| r.is_success()) {
        let ms = result.elapsed_ms();
        successes += 1;
        total_ms += ms;
        min_ms = min_ms.min(ms);
        max_ms = max_ms.max(ms);
    }

    let success_rate_percent = if attempts_made > 0 {
        successes as f64 / attempts_made as f64 * 100.0
    } else {
        0.0
    };

    if successes == 0 {
        return RunSummary {
            attempts_made,
            successes,
            success_rate_percent,
            ..RunSummary::default()
        };
    }

    RunSummary {
        attempts_made,
        successes,
        success_rate_percent,
        min_latency_ms: min_ms,
        max_latency_ms: max_ms,
        avg_latency_ms: total_ms / successes as f64,
    }
}
