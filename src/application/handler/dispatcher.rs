use crate::application::handler::context::RequestContext;
use crate::application::handler::request_handler::Handler;
use crate::application::handler::route_key::RouteKey;
use crate::application::handler::router::Router;
use crate::core::net::callback::{Outcome, RawRequest, RequestCallback};
use crate::core::net::connection::Connection;
use crate::http::status::StatusCode;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, error};

pub const DEFAULT_NOT_FOUND_BODY: &str = "not found";
pub const HANDLER_FAILURE_BODY: &str = "internal server error";

/// Routing core: maps each transport callback onto a registered handler.
///
/// Holds an immutable router snapshot, so any number of connection threads
/// can dispatch through it at once.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    router: Arc<Router>,
}

impl Dispatcher {
    pub fn new(router: Arc<Router>) -> Self {
        Self { router }
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Route one invocation and run the selected handler
    pub fn dispatch(&self, connection: &Connection, request: &RawRequest<'_>) -> Outcome {
        debug!(
            method = request.method,
            path = request.path,
            version = %request.version,
            upload = request.upload.len(),
            "dispatching request"
        );

        let ctx = RequestContext::new(connection, *request);
        let key = RouteKey::new(request.path, request.method);

        let handler = match self.router.lookup_key(&key).or_else(|| self.router.fallback()) {
            Some(handler) => handler,
            None => return ctx.respond(StatusCode::NOT_FOUND, DEFAULT_NOT_FOUND_BODY),
        };

        Self::guarded_call(handler, &ctx, &key)
    }

    /// Run `handler`, answering 500 on its behalf if it panics or finishes
    /// the request without queuing anything
    fn guarded_call(handler: &Handler, ctx: &RequestContext<'_>, key: &RouteKey) -> Outcome {
        match panic::catch_unwind(AssertUnwindSafe(|| handler.call(ctx))) {
            Ok(Outcome::Proceed) if ctx.is_final() && !ctx.connection().has_queued_response() => {
                error!(route = %key, "handler returned without queuing a response");
                ctx.respond(StatusCode::INTERNAL_SERVER_ERROR, HANDLER_FAILURE_BODY)
            }
            Ok(outcome) => outcome,
            Err(payload) => {
                error!(route = %key, reason = panic_message(&*payload), "handler panicked");
                if ctx.connection().has_queued_response() {
                    // Whatever was queued before the panic cannot be trusted
                    let _ = ctx.connection().take_response();
                }
                ctx.respond(StatusCode::INTERNAL_SERVER_ERROR, HANDLER_FAILURE_BODY)
            }
        }
    }
}

impl RequestCallback for Dispatcher {
    fn on_request(&self, connection: &Connection, request: &RawRequest<'_>) -> Outcome {
        self.dispatch(connection, request)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}
