use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use kvlite_http::config::{DEFAULT_MAX_CONNECTIONS, DEFAULT_MAX_LINE_LEN, DEFAULT_STORE_ROOT};
use kvlite_http::{Concurrency, ErrorPolicy, Server, ServerConfig, ServerError};

/// kvlite - a key-value store served over plain HTTP GET requests
///
/// Routes: /get/{key}, /set/{key}?v={value}, /edit/{key}
#[derive(Parser, Debug)]
#[command(name = "kvlite")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "Example: kvlite 5461 /var/kvlitestore/")]
struct Args {
    /// TCP port to listen on (0 picks a free port)
    port: u16,

    /// Directory holding one file per key
    #[arg(default_value = DEFAULT_STORE_ROOT)]
    store_root: PathBuf,

    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0")]
    host: IpAddr,

    /// Longest request line kept, in bytes; longer lines are truncated
    #[arg(long, default_value_t = DEFAULT_MAX_LINE_LEN)]
    max_line_len: usize,

    /// Seconds to wait on a silent client (0 waits forever)
    #[arg(long, default_value_t = 30)]
    read_timeout_secs: u64,

    /// Handle one connection at a time
    #[arg(long)]
    serial: bool,

    /// Most connection threads alive at once
    #[arg(long, default_value_t = DEFAULT_MAX_CONNECTIONS)]
    max_connections: usize,

    /// Report 400/500/501 instead of folding every failure into 404
    #[arg(long)]
    strict: bool,
}

impl Args {
    fn into_config(self) -> ServerConfig {
        let read_timeout = match self.read_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        ServerConfig::new(self.port)
            .with_bind_host(self.host)
            .with_store_root(self.store_root)
            .with_max_line_len(self.max_line_len)
            .with_read_timeout(read_timeout)
            .with_concurrency(if self.serial {
                Concurrency::Serial
            } else {
                Concurrency::ThreadPerConnection
            })
            .with_max_connections(self.max_connections)
            .with_error_policy(if self.strict {
                ErrorPolicy::Strict
            } else {
                ErrorPolicy::Compatible
            })
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(config: ServerConfig) -> Result<(), ServerError> {
    tracing::debug!(?config, "configuration");
    let server = Server::bind(config)?;
    println!("kvlite running on port {}", server.local_addr()?.port());
    server.run()
}

fn main() {
    let args = Args::parse();
    init_logging();

    if let Err(e) = run(args.into_config()) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
