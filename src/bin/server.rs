//! socketz Server Binary
//!
//! Starts one of the servers on a TCP port.

use clap::Parser;
use socketz::config::{ConnectionMode, ContentLengthStyle, Protocol};
use socketz::{Config, Registry, Server};
use tracing_subscriber::{fmt, EnvFilter};

/// socketz Server
#[derive(Parser, Debug)]
#[command(name = "socketz-server")]
#[command(about = "Echo, method-value and HTTP/1.0 toy servers")]
#[command(version)]
struct Args {
    /// Wire protocol to serve
    #[arg(short, long, value_enum, default_value_t = Protocol::Echo)]
    protocol: Protocol,

    /// Host/interface to bind
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// TCP port (defaults to 8888 for line protocols, 8080 for http)
    #[arg(short = 'P', long, allow_negative_numbers = true)]
    port: Option<i64>,

    /// Worker threads; 0 serves one connection at a time
    #[arg(short, long, default_value = "0")]
    workers: usize,

    /// Accepted connections allowed to wait for a worker
    #[arg(long, default_value = "128")]
    max_pending: usize,

    /// Close line-protocol connections after the first response
    #[arg(long)]
    once: bool,

    /// Emit `Content-Length: N` instead of the legacy `Content-Length:N `
    #[arg(long)]
    strict_content_length: bool,

    /// Read timeout in milliseconds (0 = none)
    #[arg(long, default_value = "0")]
    read_timeout_ms: u64,

    /// Write timeout in milliseconds (0 = none)
    #[arg(long, default_value = "0")]
    write_timeout_ms: u64,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,socketz=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("socketz server v{}", socketz::VERSION);

    let mode = match args.workers {
        0 => ConnectionMode::Iterative,
        workers => ConnectionMode::WorkerPool { workers },
    };
    let style = if args.strict_content_length {
        ContentLengthStyle::Strict
    } else {
        ContentLengthStyle::Legacy
    };

    // Build config from args
    let mut builder = Config::builder()
        .protocol(args.protocol)
        .host(&args.host)
        .mode(mode)
        .max_pending(args.max_pending)
        .persistent(!args.once)
        .content_length_style(style)
        .read_timeout_ms(args.read_timeout_ms)
        .write_timeout_ms(args.write_timeout_ms);
    if let Some(port) = args.port {
        builder = builder.port(port);
    }

    let config = match builder.build() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(2);
        }
    };

    let registry = Registry::with_defaults();
    if config.protocol == Protocol::Method {
        tracing::info!("Registered methods: {:?}", registry.methods());
    }

    let server = match Server::bind(config, registry) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    };

    // Ctrl+C stops the accept loop and unblocks any connection being served
    let signal = server.shutdown_signal();
    if let Err(e) = ctrlc::set_handler(move || {
        tracing::info!("Received Ctrl+C, initiating shutdown...");
        signal.trigger();
    }) {
        tracing::warn!("Could not install Ctrl+C handler: {}", e);
    }

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
