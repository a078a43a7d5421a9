//! Fatal error types.
//!
//! Anything in here stops the run before (or instead of) probing. A single
//! failed connect is not an error; see [`crate::probe::ProbeOutcome`].

use std::io;

use thiserror::Error;

/// Errors that end a tcping run.
#[derive(Debug, Error)]
pub enum TcpingError {
    /// Port argument was not a number.
    #[error("Port must be an integer")]
    PortNotInteger,

    /// Port argument was outside 1..=65535.
    #[error("Port must be between 1 and 65535")]
    PortOutOfRange,

    /// No host was given on the command line.
    #[error("missing required argument: <host>")]
    MissingHost,

    /// Any other invalid setting.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// The DNS lookup itself failed.
    #[error("Failed to resolve {host}: {source}")]
    Resolution {
        host: String,
        #[source]
        source: io::Error,
    },

    /// The lookup succeeded but returned nothing of the requested family.
    #[error("No {record} record found for {host}")]
    NoMatchingRecord { host: String, record: &'static str },

    /// The probe worker task panicked or was aborted.
    #[error("probe worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

impl TcpingError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            TcpingError::Worker(_) => 2,
            _ => 1,
        }
    }
}
