use crate::application::handler::context::RequestContext;
use crate::application::handler::request_handler::Handler;
use crate::core::net::callback::Outcome;
use crate::http::response::Response;
use crate::http::status::StatusCode;
use serde_json::json;
use tracing::debug;

pub const HEALTH_PATH: &str = "/health";

/// Liveness check: always answers `{"status":"UP"}`
pub struct HealthHandler;

impl HealthHandler {
    pub fn body() -> String {
        format!("{}\n", json!({ "status": "UP" }))
    }

    pub fn handle(ctx: &RequestContext<'_>) -> Outcome {
        debug!(peer = %ctx.connection().peer_addr(), "health check called");

        let mut response = Response::with_body(StatusCode::OK, Self::body());
        response.set_content_type("application/json");
        ctx.respond_with(response)
    }

    pub fn handler() -> Handler {
        Handler::new(Self::handle)
    }
}
