pub mod context;
pub mod dispatcher;
pub mod error_page_handler;
pub mod health_handler;
pub mod request_handler;
pub mod route_key;
pub mod router;

pub use context::RequestContext;
pub use dispatcher::Dispatcher;
pub use error_page_handler::ErrorPageHandler;
pub use health_handler::HealthHandler;
pub use request_handler::Handler;
pub use route_key::{make_key, RouteKey};
pub use router::Router;
