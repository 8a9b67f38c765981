use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

/// Store root used when none is given on the command line.
pub const DEFAULT_STORE_ROOT: &str = "/tmp/kvstore/";

/// Longest request or header line kept, in bytes. The rest is dropped.
pub const DEFAULT_MAX_LINE_LEN: usize = 16384;

/// How long a connection may stay silent before it is dropped.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Most connection threads alive at once in thread-per-connection mode.
pub const DEFAULT_MAX_CONNECTIONS: usize = 256;

/// How accepted connections are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Concurrency {
    /// Handle each connection to completion before accepting the next.
    Serial,
    /// Spawn one thread per accepted connection, up to `max_connections`.
    #[default]
    ThreadPerConnection,
}

/// How request failures are reported to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Every failure is a 404 and the method is never checked. This is
    /// what existing kvlite clients see on the wire.
    #[default]
    Compatible,
    /// Distinguish failures: 400 for malformed requests, 500 for store
    /// errors, 501 for any method other than GET or HEAD. HEAD gets the
    /// headers GET would, with no body, and is never allowed to write.
    Strict,
}

/// Everything the server needs, decided once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_host: IpAddr,
    /// TCP port; 0 picks an ephemeral port.
    pub port: u16,
    pub store_root: PathBuf,
    pub max_line_len: usize,
    /// `None` waits forever on silent clients.
    pub read_timeout: Option<Duration>,
    pub concurrency: Concurrency,
    pub max_connections: usize,
    pub error_policy: ErrorPolicy,
}

impl ServerConfig {
    /// Defaults for everything but the port: all interfaces, the default
    /// store root, a 16 KiB line limit and a 30 second read deadline.
    pub fn new(port: u16) -> Self {
        Self {
            bind_host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port,
            store_root: PathBuf::from(DEFAULT_STORE_ROOT),
            max_line_len: DEFAULT_MAX_LINE_LEN,
            read_timeout: Some(DEFAULT_READ_TIMEOUT),
            concurrency: Concurrency::default(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            error_policy: ErrorPolicy::default(),
        }
    }

    pub fn with_bind_host(mut self, host: IpAddr) -> Self {
        self.bind_host = host;
        self
    }

    pub fn with_store_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.store_root = root.into();
        self
    }

    pub fn with_max_line_len(mut self, len: usize) -> Self {
        self.max_line_len = len;
        self
    }

    pub fn with_read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub fn with_concurrency(mut self, concurrency: Concurrency) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_max_connections(mut self, limit: usize) -> Self {
        self.max_connections = limit;
        self
    }

    pub fn with_error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.error_policy = policy;
        self
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ServerConfig::new(4444);
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:4444");
        assert_eq!(config.store_root, PathBuf::from("/tmp/kvstore/"));
        assert_eq!(config.max_line_len, 16384);
        assert_eq!(config.read_timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.concurrency, Concurrency::ThreadPerConnection);
        assert_eq!(config.max_connections, 256);
        assert_eq!(config.error_policy, ErrorPolicy::Compatible);
    }

    #[test]
    fn builders_override() {
        let config = ServerConfig::new(0)
            .with_bind_host(IpAddr::V4(Ipv4Addr::LOCALHOST))
            .with_store_root("/srv/kv")
            .with_max_line_len(64)
            .with_read_timeout(None)
            .with_concurrency(Concurrency::Serial)
            .with_max_connections(8)
            .with_error_policy(ErrorPolicy::Strict);
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:0");
        assert_eq!(config.store_root, PathBuf::from("/srv/kv"));
        assert_eq!(config.max_line_len, 64);
        assert_eq!(config.read_timeout, None);
        assert_eq!(config.concurrency, Concurrency::Serial);
        assert_eq!(config.max_connections, 8);
        assert_eq!(config.error_policy, ErrorPolicy::Strict);
    }
}
