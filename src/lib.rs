//! TCP reachability probe.
//!
//! Resolves a host once, then repeatedly times TCP handshakes against it and
//! summarises the latency of the ones that succeeded.

pub mod cli;
pub mod config;
pub mod error;
pub mod probe;
pub mod probe_loop;
pub mod prober;
pub mod report;
pub mod resolver;
pub mod stats;

use std::future::Future;

use log::info;
use tokio::sync::watch;

pub use crate::config::{AttemptLimit, DelayMode, ProbeConfiguration};
pub use crate::error::TcpingError;
pub use crate::probe::{ProbeAttemptResult, ProbeOutcome, ResolvedTarget, RunSummary};
pub use crate::probe_loop::{LoopState, ProbeLoop, Termination};
pub use crate::prober::{Prober, TcpProber};
pub use crate::report::{ConsoleReporter, Reporter};
pub use crate::resolver::{AddressFamily, AddressResolver, FamilyMatch, Lookup, Resolution, SystemLookup};

/// Which event ended the wait in [`run`].
enum Event<R> {
    WorkerDone(LoopState, R),
    Interrupted,
}

/// What a finished run hands back to the caller.
#[derive(Debug)]
pub struct RunReport {
    pub termination: Termination,
    pub summary: RunSummary,
    pub results: Vec<ProbeAttemptResult>,
}

/// Resolve the configured host and report the chosen record.
pub async fn resolve_target<L, R>(
    config: &ProbeConfiguration,
    resolver: &AddressResolver<L>,
    reporter: &mut R,
) -> Result<ResolvedTarget, TcpingError>
where
    L: Lookup,
    R: Reporter + ?Sized,
{
    let resolution = resolver.resolve(&config.target, config.family).await?;
    reporter.resolved(&config.target, &resolution);
    Ok(ResolvedTarget::new(resolution.ip(), config.port))
}

/// Probe `target` on a worker task until it finishes or `shutdown` resolves.
///
/// On shutdown the worker is told to stop and then joined, so the results
/// read afterwards are exactly the attempts it completed. The summary is
/// written to `reporter` before returning.
pub async fn run<P, R, S>(
    config: &ProbeConfiguration,
    target: ResolvedTarget,
    prober: P,
    reporter: R,
    shutdown: S,
) -> Result<RunReport, TcpingError>
where
    P: Prober + 'static,
    R: Reporter + 'static,
    S: Future<Output = ()>,
{
    let probe_loop = ProbeLoop::new(target, config.attempt_limit, config.timeout, config.delay.interval());
    let (cancel_tx, cancel_rx) = watch::channel(false);

    let mut worker = tokio::spawn(async move {
        let mut reporter = reporter;
        let state = probe_loop.run(&prober, &mut reporter, cancel_rx).await;
        (state, reporter)
    });

    tokio::pin!(shutdown);
    let event = tokio::select! {
        joined = &mut worker => {
            let (state, reporter) = joined?;
            Event::WorkerDone(state, reporter)
        }
        _ = &mut shutdown => Event::Interrupted,
    };

    let (termination, state, mut reporter) = match event {
        Event::WorkerDone(state, reporter) => {
            let termination = state.termination().unwrap_or(Termination::Completed);
            (termination, state, reporter)
        }
        Event::Interrupted => {
            info!("interrupt received, stopping probe loop");
            // the worker may have finished already and dropped its receiver
            let _ = cancel_tx.send(true);
            let (state, reporter) = worker.await?;
            (Termination::Cancelled, state, reporter)
        }
    };

    let summary = state.summary();
    reporter.summary(&summary, termination);

    Ok(RunReport {
        termination,
        summary,
        results: state.into_results(),
    })
}

/// Resolves on the first SIGINT, or SIGTERM on unix.
pub async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = term.recv() => {}
                }
            }
            Err(e) => {
                log::warn!("Failed to install SIGTERM handler: {e}");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
