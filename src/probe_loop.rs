//! The repeated-attempt driver.
//!
//! A run moves `Idle -> Running -> {Completed, Cancelled}`. Cancellation is
//! cooperative: the loop checks the shared flag before each attempt and races
//! it against both the in-flight connect and the inter-attempt delay, so a
//! cancelled loop stops within one poll instead of finishing its schedule.

use std::time::Duration;

use log::debug;
use tokio::sync::watch;

use crate::config::AttemptLimit;
use crate::probe::{ProbeAttemptResult, ProbeOutcome, ResolvedTarget, RunSummary};
use crate::prober::Prober;
use crate::report::Reporter;
use crate::stats;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopPhase {
    Idle,
    Running,
    Completed,
    Cancelled,
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    Completed,
    Cancelled,
}

/// Running tally owned by the worker while the loop runs.
#[derive(Debug)]
pub struct LoopState {
    phase: LoopPhase,
    attempts_made: u64,
    successes: u64,
    results: Vec<ProbeAttemptResult>,
}

impl Default for LoopState {
    fn default() -> Self {
        Self {
            phase: LoopPhase::Idle,
            attempts_made: 0,
            successes: 0,
            results: Vec::new(),
        }
    }
}

impl LoopState {
    pub fn phase(&self) -> LoopPhase {
        self.phase
    }

    pub fn attempts_made(&self) -> u64 {
        self.attempts_made
    }

    pub fn successes(&self) -> u64 {
        self.successes
    }

    pub fn results(&self) -> &[ProbeAttemptResult] {
        &self.results
    }

    pub fn into_results(self) -> Vec<ProbeAttemptResult> {
        self.results
    }

    /// `None` until the loop has reached a terminal phase.
    pub fn termination(&self) -> Option<Termination> {
        match self.phase {
            LoopPhase::Completed => Some(Termination::Completed),
            LoopPhase::Cancelled => Some(Termination::Cancelled),
            LoopPhase::Idle | LoopPhase::Running => None,
        }
    }

    pub fn summary(&self) -> RunSummary {
        stats::summarize(&self.results)
    }

    fn record(&mut self, result: ProbeAttemptResult) {
        self.attempts_made += 1;
        if result.is_success() {
            self.successes += 1;
        }
        self.results.push(result);
    }

    fn transition(&mut self, phase: LoopPhase) {
        debug!("probe loop {:?} -> {:?} after {} attempts", self.phase, phase, self.attempts_made);
        self.phase = phase;
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ProbeLoop {
    target: ResolvedTarget,
    attempt_limit: AttemptLimit,
    timeout: Duration,
    delay: Duration,
}

impl ProbeLoop {
    pub fn new(target: ResolvedTarget, attempt_limit: AttemptLimit, timeout: Duration, delay: Duration) -> Self {
        Self {
            target,
            attempt_limit,
            timeout,
            delay,
        }
    }

    /// Drive attempts until the limit is reached or `cancel` turns true.
    ///
    /// An attempt still in flight when cancellation arrives is dropped and not
    /// recorded.
    pub async fn run<P, R>(&self, prober: &P, reporter: &mut R, mut cancel: watch::Receiver<bool>) -> LoopState
    where
        P: Prober,
        R: Reporter + ?Sized,
    {
        let mut state = LoopState::default();
        state.transition(LoopPhase::Running);

        let addr = self.target.socket_addr();
        let mut sequence = 1u64;

        loop {
            if self.attempt_limit.is_reached(state.attempts_made) {
                state.transition(LoopPhase::Completed);
                break;
            }
            if *cancel.borrow() {
                state.transition(LoopPhase::Cancelled);
                break;
            }

            let attempt = tokio::select! {
                biased;
                _ = cancelled(&mut cancel) => {
                    state.transition(LoopPhase::Cancelled);
                    break;
                }
                attempt = prober.attempt(addr, self.timeout) => attempt,
            };

            let result = ProbeAttemptResult::new(sequence, attempt);
            if let ProbeOutcome::Failure(reason) = &result.outcome {
                debug!("[{}] started {} failed: {reason}", result.sequence, result.started_at);
            }
            reporter.attempt(&self.target, &result);
            state.record(result);

            if self.attempt_limit.is_reached(state.attempts_made) {
                state.transition(LoopPhase::Completed);
                break;
            }

            tokio::select! {
                biased;
                _ = cancelled(&mut cancel) => {
                    state.transition(LoopPhase::Cancelled);
                    break;
                }
                _ = tokio::time::sleep(self.delay) => {}
            }
            sequence += 1;
        }

        state
    }
}

/// Resolves once the flag is true. A dropped sender means nobody can cancel
/// any more, so this then never resolves.
async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    if cancel.wait_for(|flag| *flag).await.is_err() {
        std::future::pending::<()>().await;
    }
}
