use std::io::{self, BufReader, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use kvlite_store::{DigestFunction, HashedStore, Md5Digest};

use crate::config::{Concurrency, ServerConfig};
use crate::error::ServerError;
use crate::request::parse_request;
use crate::router::Router;

/// A bound listener plus the router it feeds.
pub struct Server<D = Md5Digest> {
    listener: TcpListener,
    router: Arc<Router<D>>,
    slots: ConnectionSlots,
    config: ServerConfig,
}

impl Server<Md5Digest> {
    /// Open the configured store root and bind the listening socket.
    pub fn bind(config: ServerConfig) -> Result<Self, ServerError> {
        let store = HashedStore::open(&config.store_root)?;
        Self::with_store(config, store)
    }
}

impl<D: DigestFunction + 'static> Server<D> {
    pub fn with_store(config: ServerConfig, store: HashedStore<D>) -> Result<Self, ServerError> {
        let addr = config.socket_addr();
        let listener =
            TcpListener::bind(addr).map_err(|source| ServerError::Bind { addr, source })?;
        let bound = listener.local_addr()?;

        info!(
            addr = %bound,
            root = %store.root().display(),
            policy = ?config.error_policy,
            "kvlite started"
        );

        Ok(Self {
            listener,
            router: Arc::new(Router::new(store, config.error_policy)),
            slots: ConnectionSlots::new(config.max_connections),
            config,
        })
    }

    /// The bound address; useful when the configured port was 0.
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept and serve connections until accepting fails.
    ///
    /// Only an accept failure ends the loop; anything that goes wrong with a
    /// single connection is logged and the loop carries on.
    ///
    /// In thread-per-connection mode at most `max_connections` threads are
    /// live. Past that, the accepting thread serves the connection itself and
    /// accepts nothing else until it is done.
    pub fn run(&self) -> Result<(), ServerError> {
        loop {
            let (stream, peer) = self.listener.accept().map_err(ServerError::Accept)?;
            debug!(%peer, "client connected");

            let max_line_len = self.config.max_line_len;
            let read_timeout = self.config.read_timeout;

            match self.config.concurrency {
                Concurrency::Serial => serve_connection(
                    self.router.as_ref(),
                    stream,
                    peer,
                    max_line_len,
                    read_timeout,
                ),
                Concurrency::ThreadPerConnection => {
                    let Some(slot) = self.slots.try_acquire() else {
                        warn!(%peer, limit = self.slots.limit, "connection limit reached");
                        serve_connection(
                            self.router.as_ref(),
                            stream,
                            peer,
                            max_line_len,
                            read_timeout,
                        );
                        continue;
                    };
                    let router = Arc::clone(&self.router);
                    let spawned = thread::Builder::new()
                        .name("kvlite-conn".to_string())
                        .spawn(move || {
                            let _slot = slot;
                            serve_connection(
                                router.as_ref(),
                                stream,
                                peer,
                                max_line_len,
                                read_timeout,
                            )
                        });
                    if let Err(error) = spawned {
                        warn!(%peer, %error, "could not spawn connection thread");
                    }
                }
            }
        }
    }
}

/// Counts live connection threads against a fixed limit.
struct ConnectionSlots {
    live: Arc<AtomicUsize>,
    limit: usize,
}

/// Frees its slot when the connection thread finishes.
struct SlotGuard(Arc<AtomicUsize>);

impl ConnectionSlots {
    fn new(limit: usize) -> Self {
        Self {
            live: Arc::new(AtomicUsize::new(0)),
            limit,
        }
    }

    fn try_acquire(&self) -> Option<SlotGuard> {
        self.live
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < self.limit).then_some(n + 1)
            })
            .ok()
            .map(|_| SlotGuard(Arc::clone(&self.live)))
    }
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

fn serve_connection<D: DigestFunction>(
    router: &Router<D>,
    stream: TcpStream,
    peer: SocketAddr,
    max_line_len: usize,
    read_timeout: Option<Duration>,
) {
    let result = match stream.set_read_timeout(read_timeout) {
        Ok(()) => handle_stream(router, stream, max_line_len),
        Err(error) => Err(error),
    };

    if let Err(error) = result {
        warn!(%peer, %error, "connection dropped");
    }
}

/// Serve exactly one request from `stream`: parse, route, respond.
///
/// The stream is dropped (and a socket closed) on return.
pub fn handle_stream<D, S>(
    router: &Router<D>,
    mut stream: S,
    max_line_len: usize,
) -> io::Result<()>
where
    D: DigestFunction,
    S: Read + Write,
{
    let request = {
        let mut reader = BufReader::new(&mut stream);
        parse_request(&mut reader, max_line_len)?
    };

    let response = router.handle(&request);
    debug!(
        method = %request.method_lossy(),
        target = %request.target_lossy(),
        status = response.status.as_u16(),
        "responding"
    );
    response.write_to(&mut stream)
}
