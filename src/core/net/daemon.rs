use crate::common::constants::{DEFAULT_MAX_BODY_SIZE, DEFAULT_MAX_HEADER_SIZE};
use crate::common::error::Result;
use crate::core::net::callback::RequestCallback;
use crate::core::net::connection::{Connection, ConnectionWorker};
use crate::core::net::listener::{self, Listener};
use std::collections::HashMap;
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, info, warn};

// Pause after a failed accept so fd exhaustion does not spin the thread
const ACCEPT_BACKOFF: Duration = Duration::from_millis(10);

/// Socket-level knobs for accepted connections
#[derive(Debug, Clone)]
pub struct TransportOptions {
    /// `None` waits forever for the next byte
    pub read_timeout: Option<Duration>,
    pub write_timeout: Option<Duration>,
    pub max_header_size: usize,
    pub max_body_size: usize,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            read_timeout: None,
            write_timeout: None,
            max_header_size: DEFAULT_MAX_HEADER_SIZE,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
        }
    }
}

struct Shared {
    stopping: AtomicBool,
    next_id: AtomicU64,
    /// Live sockets, kept so shutdown can unblock their workers
    live: Mutex<HashMap<u64, TcpStream>>,
}

impl Shared {
    fn live(&self) -> MutexGuard<'_, HashMap<u64, TcpStream>> {
        self.live.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Running transport: one accept thread plus one worker thread per
/// connection. Dropping the daemon shuts it down.
pub struct Daemon {
    local_addr: SocketAddr,
    shared: Arc<Shared>,
    accept_thread: Option<JoinHandle<Vec<JoinHandle<()>>>>,
}

impl Daemon {
    /// Bind `addr` and start serving, invoking `callback` for every request
    pub fn start(
        addr: SocketAddr,
        callback: Arc<dyn RequestCallback>,
        options: TransportOptions,
    ) -> Result<Self> {
        let listener = Listener::bind(addr)?;
        let local_addr = listener.addr();

        let shared = Arc::new(Shared {
            stopping: AtomicBool::new(false),
            next_id: AtomicU64::new(1),
            live: Mutex::new(HashMap::new()),
        });

        let accept_shared = Arc::clone(&shared);
        let accept_thread = thread::Builder::new()
            .name(format!("switchyard-accept-{}", local_addr.port()))
            .spawn(move || accept_loop(listener, accept_shared, callback, options))?;

        info!(address = %local_addr, "daemon listening");

        Ok(Self {
            local_addr,
            shared,
            accept_thread: Some(accept_thread),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop accepting, close live connections and join every thread
    pub fn shutdown(mut self) {
        self.stop_threads();
    }

    fn stop_threads(&mut self) {
        let accept_thread = match self.accept_thread.take() {
            Some(handle) => handle,
            None => return,
        };

        self.shared.stopping.store(true, Ordering::SeqCst);
        if let Err(e) = listener::wake(self.local_addr) {
            // Joining would hang on the blocked accept; leave the thread behind
            warn!(address = %self.local_addr, error = %e, "could not wake accept thread");
            self.close_live();
            return;
        }

        let workers = match accept_thread.join() {
            Ok(workers) => workers,
            Err(_) => {
                error!("accept thread panicked");
                Vec::new()
            }
        };

        self.close_live();
        for worker in workers {
            if worker.join().is_err() {
                error!("connection worker panicked");
            }
        }

        info!(address = %self.local_addr, "daemon stopped");
    }

    fn close_live(&self) {
        for stream in self.shared.live().values() {
            let _ = stream.shutdown(Shutdown::Both);
        }
    }
}

impl Drop for Daemon {
    fn drop(&mut self) {
        self.stop_threads();
    }
}

fn accept_loop(
    listener: Listener,
    shared: Arc<Shared>,
    callback: Arc<dyn RequestCallback>,
    options: TransportOptions,
) -> Vec<JoinHandle<()>> {
    let mut workers: Vec<JoinHandle<()>> = Vec::new();

    loop {
        let accepted = listener.accept();
        if shared.stopping.load(Ordering::SeqCst) {
            break;
        }

        let (stream, peer_addr) = match accepted {
            Ok(accepted) => accepted,
            Err(e) => {
                warn!(error = %e, "accept failed");
                thread::sleep(ACCEPT_BACKOFF);
                continue;
            }
        };

        workers.retain(|worker| !worker.is_finished());

        let id = shared.next_id.fetch_add(1, Ordering::Relaxed);
        match stream.try_clone() {
            Ok(handle) => {
                shared.live().insert(id, handle);
            }
            Err(e) => {
                warn!(connection = id, error = %e, "could not track connection");
                continue;
            }
        }

        let worker_shared = Arc::clone(&shared);
        let worker_callback = Arc::clone(&callback);
        let worker_options = options.clone();
        let spawned = thread::Builder::new()
            .name(format!("switchyard-conn-{}", id))
            .spawn(move || {
                debug!(connection = id, peer = %peer_addr, "connection opened");
                let connection = Connection::new(id, peer_addr);
                let result = ConnectionWorker::new(stream, connection, worker_callback.as_ref(), &worker_options)
                    .and_then(ConnectionWorker::run);
                if let Err(e) = result {
                    debug!(connection = id, error = %e, "connection ended with error");
                }
                worker_shared.live().remove(&id);
                debug!(connection = id, "connection closed");
            });

        match spawned {
            Ok(worker) => workers.push(worker),
            Err(e) => {
                error!(connection = id, error = %e, "failed to spawn connection thread");
                if let Some(stream) = shared.live().remove(&id) {
                    let _ = stream.shutdown(Shutdown::Both);
                }
            }
        }
    }

    workers
}
