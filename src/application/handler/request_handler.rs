use crate::application::handler::context::RequestContext;
use crate::core::net::callback::Outcome;
use std::fmt;
use std::sync::Arc;

/// A request handler: any thread-safe callable from context to outcome.
///
/// Handlers are expected to queue exactly one response through the context
/// before returning.
#[derive(Clone)]
pub struct Handler(Arc<dyn Fn(&RequestContext<'_>) -> Outcome + Send + Sync>);

impl Handler {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&RequestContext<'_>) -> Outcome + Send + Sync + 'static,
    {
        Handler(Arc::new(f))
    }

    pub fn call(&self, ctx: &RequestContext<'_>) -> Outcome {
        (self.0)(ctx)
    }

    /// Whether both values share the same underlying callable
    pub fn ptr_eq(&self, other: &Handler) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<F> From<F> for Handler
where
    F: Fn(&RequestContext<'_>) -> Outcome + Send + Sync + 'static,
{
    fn from(f: F) -> Self {
        Handler::new(f)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Handler")
    }
}
