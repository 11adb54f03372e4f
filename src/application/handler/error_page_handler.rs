use crate::application::handler::context::RequestContext;
use crate::application::handler::request_handler::Handler;
use crate::core::net::callback::Outcome;
use crate::http::status::StatusCode;
use tracing::debug;

/// Fallback for requests no route claims
pub struct ErrorPageHandler;

impl ErrorPageHandler {
    pub fn not_found_body(path: &str) -> String {
        format!("Unknown request: \"{}\"\n", path)
    }

    pub fn not_found(ctx: &RequestContext<'_>) -> Outcome {
        debug!(method = ctx.method(), path = ctx.path(), "no route matched");
        ctx.respond(StatusCode::NOT_FOUND, Self::not_found_body(ctx.path()))
    }

    pub fn handler() -> Handler {
        Handler::new(Self::not_found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_body() {
        assert_eq!(ErrorPageHandler::not_found_body("/nope"), "Unknown request: \"/nope\"\n");
        assert_eq!(ErrorPageHandler::not_found_body(""), "Unknown request: \"\"\n");
    }
}
