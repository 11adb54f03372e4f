pub mod callback;
pub mod connection;
pub mod daemon;
pub mod listener;

pub use callback::{Outcome, RawRequest, RequestCallback, UploadCursor};
pub use connection::Connection;
pub use daemon::{Daemon, TransportOptions};
pub use listener::Listener;
