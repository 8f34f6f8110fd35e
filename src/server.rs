use std::net::{SocketAddr, TcpListener};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, error, info};

use crate::cache;
use crate::config::Config;
use crate::error::Result;
use crate::network::Connection;
use crate::storage::FileStorage;
use crate::store::CachedStore;

/// How long the accept loop sleeps between polls when idle.
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Key-value server: a sequential accept loop spawning one handler thread
/// per connection, all sharing a single cached store behind a global lock.
pub struct Server {
    config: Config,
    listener: TcpListener,
    store: Arc<Mutex<CachedStore>>,
    shutdown: AtomicBool,
    active_connections: Arc<AtomicUsize>,
}

impl Server {
    /// Create a new server with the given configuration.
    ///
    /// Validates the configuration, initializes the persistent store
    /// (refusing to start if the storage root cannot be created), and binds
    /// the listening socket.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let storage = FileStorage::new(&config.data_dir)?;
        let cache = cache::new_cache(config.cache_strategy, config.cache_size);
        let store = Arc::new(Mutex::new(CachedStore::new(cache, storage)));

        let listener = TcpListener::bind((config.bind_addr.as_str(), config.port))?;
        listener.set_nonblocking(true)?;

        info!(
            "server listening on {} ({} cache, {} entries)",
            listener.local_addr()?,
            config.cache_strategy,
            config.cache_size
        );

        Ok(Self {
            config,
            listener,
            store,
            shutdown: AtomicBool::new(false),
            active_connections: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// The address the server is actually bound to (useful with port 0).
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// The shared store, for embedding and tests.
    pub fn store(&self) -> &Arc<Mutex<CachedStore>> {
        &self.store
    }

    /// Run the accept loop until shutdown.
    ///
    /// Accepting never blocks on request processing: each connection runs
    /// on its own thread against the shared store. Shutdown stops accepting
    /// but does not interrupt handlers already in flight.
    pub fn run(&self) -> Result<()> {
        while !self.shutdown.load(Ordering::Acquire) {
            match self.listener.accept() {
                Ok((stream, addr)) => {
                    debug!("new connection from {}", addr);

                    // The listener is non-blocking so the shutdown flag is
                    // observed; handlers use plain blocking reads
                    stream.set_nonblocking(false)?;

                    let store = Arc::clone(&self.store);
                    let active = Arc::clone(&self.active_connections);
                    let max_frame_lines = self.config.max_frame_lines;

                    active.fetch_add(1, Ordering::Relaxed);
                    let spawned = thread::Builder::new()
                        .name(format!("conn-{}", addr))
                        .spawn(move || {
                            Connection::new(stream, addr, store, max_frame_lines).run();
                            active.fetch_sub(1, Ordering::Relaxed);
                        });

                    if let Err(e) = spawned {
                        error!("unable to spawn handler for {}: {}", addr, e);
                        self.active_connections.fetch_sub(1, Ordering::Relaxed);
                    }
                }
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(e) => {
                    error!("error accepting connection: {}", e);
                }
            }
        }

        let remaining = self.active_connections();
        if remaining > 0 {
            info!(
                "stopped accepting connections, {} handler(s) still active",
                remaining
            );
        } else {
            info!("server stopped");
        }
        Ok(())
    }

    /// Signal the server to stop accepting connections.
    pub fn shutdown(&self) {
        info!("initiating server shutdown");
        self.shutdown.store(true, Ordering::Release);
    }

    /// Get the number of active client connections.
    pub fn active_connections(&self) -> usize {
        self.active_connections.load(Ordering::Acquire)
    }
}
