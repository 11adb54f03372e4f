pub mod application;
pub mod common;
pub mod core;
pub mod http;

pub use application::config::{Config, ConfigLoader};
pub use application::handler::{Handler, RequestContext, Router};
pub use application::server::{Server, ServerState};
pub use common::error::{Result, ServerError};
pub use core::net::Outcome;
