use crate::application::config::models::Config;
use crate::application::handler::dispatcher::Dispatcher;
use crate::application::handler::request_handler::Handler;
use crate::application::handler::router::Router;
use crate::common::error::{Result, ServerError};
use crate::core::net::daemon::{Daemon, TransportOptions};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    Stopped,
    Running,
}

/// Owns the route table and the transport daemon.
///
/// Routes are registered while stopped; `start` freezes them into a
/// dispatcher shared by every connection thread. A stopped server can be
/// started again with the same routes.
pub struct Server {
    router: Arc<Router>,
    daemon: Option<Daemon>,
    options: TransportOptions,
    concurrency_hint: u32,
}

impl Server {
    pub fn new() -> Self {
        Self::with_options(TransportOptions::default())
    }

    pub fn with_options(options: TransportOptions) -> Self {
        Self {
            router: Arc::new(Router::new()),
            daemon: None,
            options,
            concurrency_hint: 0,
        }
    }

    /// Register `handler` for `(path, method)`, replacing any previous one
    pub fn route(&mut self, path: &str, method: &str, handler: impl Into<Handler>) -> Result<()> {
        self.router_mut()?.register(path, method, handler);
        Ok(())
    }

    /// Handler for requests that match no route
    pub fn not_found(&mut self, handler: impl Into<Handler>) -> Result<()> {
        self.router_mut()?.set_fallback(handler);
        Ok(())
    }

    pub fn set_transport_options(&mut self, options: TransportOptions) -> Result<()> {
        if self.is_running() {
            return Err(ServerError::AlreadyRunning);
        }
        self.options = options;
        Ok(())
    }

    /// Bind and start serving.
    ///
    /// An address hint that is not an IP address falls back to all
    /// interfaces. The concurrency hint is only recorded.
    pub fn start(&mut self, bind_address_hint: &str, port: u16, concurrency_hint: u32) -> Result<()> {
        if self.is_running() {
            return Err(ServerError::AlreadyRunning);
        }

        let addr = SocketAddr::new(resolve_bind_ip(bind_address_hint), port);
        self.concurrency_hint = concurrency_hint;

        info!(
            address = %addr,
            concurrency_hint,
            routes = self.router.len(),
            fallback = self.router.fallback().is_some(),
            "starting server"
        );

        let dispatcher = Arc::new(Dispatcher::new(Arc::clone(&self.router)));
        match Daemon::start(addr, dispatcher, self.options.clone()) {
            Ok(daemon) => {
                info!(address = %daemon.local_addr(), "server running");
                self.daemon = Some(daemon);
                Ok(())
            }
            Err(e) => {
                error!(address = %addr, error = %e, "failed to start server");
                Err(e)
            }
        }
    }

    /// Start using address, port, hint and socket limits from `config`
    pub fn start_with(&mut self, config: &Config) -> Result<()> {
        self.set_transport_options(config.transport_options())?;
        self.start(&config.bind_address, config.port, config.concurrency_hint)
    }

    /// Stop serving; does nothing when already stopped
    pub fn stop(&mut self) {
        if let Some(daemon) = self.daemon.take() {
            let addr = daemon.local_addr();
            info!(address = %addr, "stopping server");
            daemon.shutdown();
            info!(address = %addr, "server stopped");
        }
    }

    pub fn state(&self) -> ServerState {
        if self.daemon.is_some() {
            ServerState::Running
        } else {
            ServerState::Stopped
        }
    }

    pub fn is_running(&self) -> bool {
        self.state() == ServerState::Running
    }

    /// Bound address while running
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.daemon.as_ref().map(Daemon::local_addr)
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn concurrency_hint(&self) -> u32 {
        self.concurrency_hint
    }

    fn router_mut(&mut self) -> Result<&mut Router> {
        if self.is_running() {
            return Err(ServerError::RegistrationClosed);
        }
        // Unique again once the previous daemon's threads are joined
        Ok(Arc::make_mut(&mut self.router))
    }
}

impl Default for Server {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        self.stop();
    }
}

fn resolve_bind_ip(hint: &str) -> IpAddr {
    match hint.trim().parse::<IpAddr>() {
        Ok(ip) => ip,
        Err(_) => {
            warn!(hint, "bind address is not an IP address, listening on all interfaces");
            IpAddr::V4(Ipv4Addr::UNSPECIFIED)
        }
    }
}
