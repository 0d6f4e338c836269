//! Unified error type.

use std::fmt;
use std::net::SocketAddr;

/// The error type returned by the server's fallible operations.
///
/// Validation failures are never `Error`s: they become 400 / 422 / 500
/// [`Response`](crate::Response) values inside the wrapper. This type only
/// surfaces infrastructure failures such as binding the listening socket.
#[derive(Debug)]
pub enum Error {
    Bind { addr: SocketAddr, source: std::io::Error },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bind { addr, source } => write!(f, "bind {addr}: {source}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Bind { source, .. } => Some(source),
        }
    }
}
