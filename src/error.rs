//! Unified error handling for notifirc.
//!
//! Errors are scoped to a single destination group: the dispatcher records
//! them per target and never lets one bad server abort delivery to the rest.

use notifirc_proto::ProtoError;
use thiserror::Error;

/// Errors raised while delivering to one connection group.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Transport could not be established.
    #[error("connect to {host}:{port} failed: {source}")]
    Connect {
        host: String,
        port: u16,
        #[source]
        source: std::io::Error,
    },

    /// TLS handshake failed.
    #[error("tls handshake with {host} failed: {source}")]
    Tls {
        host: String,
        #[source]
        source: std::io::Error,
    },

    /// The server never confirmed registration within the deadline.
    #[error("timed out waiting for registration from {host}:{port}")]
    ProtocolTimeout { host: String, port: u16 },

    /// Write failure on an established socket.
    #[error("send to {host} failed: {source}")]
    Send {
        host: String,
        #[source]
        source: ProtoError,
    },

    /// A command was issued before the connection reached the ready state.
    #[error("{command} is only valid on a registered connection")]
    InvalidState { command: &'static str },

    /// The destination set itself is inconsistent.
    #[error(transparent)]
    Router(#[from] RouterError),
}

/// Errors detected while grouping destinations, before any socket opens.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouterError {
    /// Destinations sharing a `(host, port)` disagree on TLS.
    #[error("conflicting tls settings for {host}:{port}")]
    SecureMismatch { host: String, port: u16 },

    /// Destinations sharing a `(host, port)` disagree on the server password.
    #[error("conflicting passwords for {host}:{port}")]
    PasswordMismatch { host: String, port: u16 },
}
