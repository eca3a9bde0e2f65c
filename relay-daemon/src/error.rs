//! Error types for relay-daemon.

use std::net::SocketAddr;

use thiserror::Error;

/// Error surface of the webhook service runtime.
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}
