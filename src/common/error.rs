use crate::http::parser::ParseError;
use std::net::SocketAddr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Protocol violation by the peer; answered with an HTTP error status
    #[error(transparent)]
    Http(#[from] ParseError),

    /// The transport could not bind or listen on the requested address
    #[error("Failed to start daemon on {addr}: {source}")]
    DaemonStart {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("Server is already running")]
    AlreadyRunning,

    /// Routes are frozen while the server is running
    #[error("Cannot register handlers while the server is running")]
    RegistrationClosed,
}

pub type Result<T> = std::result::Result<T, ServerError>;
