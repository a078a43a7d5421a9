use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use chrono::Local;
use log::debug;
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::probe::{FailureReason, ProbeAttempt};

/// One timed connection attempt. Implementations never retry.
pub trait Prober: Send + Sync {
    fn attempt(&self, addr: SocketAddr, timeout: Duration) -> impl Future<Output = ProbeAttempt> + Send;
}

/// Plain TCP handshake prober.
///
/// Each attempt opens exactly one socket and drops it before returning, so the
/// local port and descriptor are released synchronously.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpProber;

impl TcpProber {
    pub fn new() -> Self {
        Self
    }
}

impl Prober for TcpProber {
    fn attempt(&self, addr: SocketAddr, conn_timeout: Duration) -> impl Future<Output = ProbeAttempt> + Send {
        async move {
            let started_at = Local::now();
            let start = Instant::now();
            let result = timeout(conn_timeout, TcpStream::connect(addr)).await;
            let elapsed = start.elapsed();

            match result {
                Ok(Ok(stream)) => {
                    drop(stream);
                    ProbeAttempt::success(started_at, elapsed)
                }
                Ok(Err(e)) => {
                    debug!("connect to {addr} failed after {elapsed:?}: {e}");
                    ProbeAttempt::failure(started_at, elapsed, classify(&e))
                }
                Err(_) => {
                    debug!("connect to {addr} timed out after {}ms", conn_timeout.as_millis());
                    ProbeAttempt::failure(started_at, elapsed, FailureReason::Timeout)
                }
            }
        }
    }
}

fn classify(err: &io::Error) -> FailureReason {
    match err.kind() {
        io::ErrorKind::ConnectionRefused => FailureReason::Refused,
        io::ErrorKind::TimedOut => FailureReason::Timeout,
        _ => FailureReason::Other(err.to_string()),
    }
}
