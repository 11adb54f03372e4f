use crate::application::handler::request_handler::Handler;
use crate::application::handler::route_key::RouteKey;
use std::collections::HashMap;
use tracing::debug;

/// Handler registry: exact `(path, method)` routes plus one fallback.
///
/// Populated during setup and then shared read-only across connection
/// threads.
#[derive(Debug, Clone, Default)]
pub struct Router {
    routes: HashMap<RouteKey, Handler>,
    fallback: Option<Handler>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `(path, method)`; an existing handler for the
    /// same key is replaced
    pub fn register(&mut self, path: &str, method: &str, handler: impl Into<Handler>) {
        let key = RouteKey::new(path, method);
        if self.routes.insert(key.clone(), handler.into()).is_some() {
            debug!(route = %key, "replaced existing handler");
        }
    }

    /// Handler used when no route matches
    pub fn set_fallback(&mut self, handler: impl Into<Handler>) {
        self.fallback = Some(handler.into());
    }

    pub fn lookup(&self, path: &str, method: &str) -> Option<&Handler> {
        self.lookup_key(&RouteKey::new(path, method))
    }

    pub fn lookup_key(&self, key: &RouteKey) -> Option<&Handler> {
        self.routes.get(key)
    }

    pub fn fallback(&self) -> Option<&Handler> {
        self.fallback.as_ref()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::net::callback::Outcome;

    fn ok_handler() -> Handler {
        Handler::new(|_| Outcome::Proceed)
    }

    #[test]
    fn test_lookup_is_method_case_insensitive() {
        let mut router = Router::new();
        let handler = ok_handler();
        router.register("/health", "get", handler.clone());

        assert!(router.lookup("/health", "GET").unwrap().ptr_eq(&handler));
        assert!(router.lookup("/health", "Get").is_some());
        assert!(router.lookup("/health", "POST").is_none());
        assert!(router.lookup("/HEALTH", "GET").is_none());
    }

    #[test]
    fn test_duplicate_registration_overwrites() {
        let mut router = Router::new();
        let first = ok_handler();
        let second = ok_handler();
        router.register("/x", "GET", first.clone());
        router.register("/x", "get", second.clone());

        assert_eq!(router.len(), 1);
        let found = router.lookup("/x", "GET").unwrap();
        assert!(found.ptr_eq(&second));
        assert!(!found.ptr_eq(&first));
    }

    #[test]
    fn test_fallback_replaced() {
        let mut router = Router::new();
        assert!(router.fallback().is_none());

        let first = ok_handler();
        let second = ok_handler();
        router.set_fallback(first);
        router.set_fallback(second.clone());
        assert!(router.fallback().unwrap().ptr_eq(&second));
        assert!(router.is_empty());
    }

    #[test]
    fn test_router_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Router>();
    }
}
