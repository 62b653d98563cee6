//! pingwired — receives payloads tunnelled in ICMP Echo Requests.
//!
//! Listens on a raw ICMP socket forever. Each burst of requests followed by
//! a quiet period is one session; its decoded payload is printed to stdout.

use anyhow::{Context, Result};

use pingwire_core::config::PingwireConfig;
use pingwire_net::{RawIcmpSocket, SessionListener};

fn print_usage() {
    println!("Usage: pingwired [--port <port>] [--timeout-ms <ms>]");
    println!();
    println!("Options:");
    println!("  --port <port>       Port selector to bind (default from config)");
    println!("  --timeout-ms <ms>   Inactivity window closing a session (default from config)");
}

/// Load the config, falling back to defaults when the file is unusable.
fn load_config() -> PingwireConfig {
    if let Err(e) = PingwireConfig::write_default_if_missing() {
        tracing::warn!(error = %e, "failed to write default config");
    }
    PingwireConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to load config, using defaults");
        PingwireConfig::default()
    })
}

/// Apply command-line overrides on top of the loaded config.
/// Returns false if usage was requested.
fn apply_args(args: &[String], config: &mut PingwireConfig) -> Result<bool> {
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--port" => {
                i += 1;
                config.receiver.port = args
                    .get(i)
                    .context("--port requires a value")?
                    .parse()
                    .context("--port must be a number")?;
            }
            "--timeout-ms" => {
                i += 1;
                config.receiver.inactivity_timeout_ms = args
                    .get(i)
                    .context("--timeout-ms requires a value")?
                    .parse()
                    .context("--timeout-ms must be a number")?;
            }
            "help" | "--help" | "-h" => return Ok(false),
            other => anyhow::bail!("unknown argument: {other}"),
        }
        i += 1;
    }
    Ok(true)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut config = load_config();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if !apply_args(&args, &mut config)? {
        print_usage();
        return Ok(());
    }
    config.validate().context("invalid configuration")?;

    let socket = RawIcmpSocket::open(config.receiver.port)
        .context("failed to open raw ICMP socket (needs root or CAP_NET_RAW)")?;
    let mut listener = SessionListener::from_config(socket, &config.receiver)?;

    tracing::info!(
        port = config.receiver.port,
        inactivity_ms = config.receiver.inactivity_timeout_ms,
        "pingwired listening"
    );

    loop {
        match listener.receive().await {
            Ok(text) => println!(">>> {text}"),
            // Already logged by the listener; the socket is still good.
            Err(e) if e.is_session_local() => continue,
            Err(e) => return Err(e).context("receive failed"),
        }
    }
}
