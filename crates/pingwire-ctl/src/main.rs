//! pingwire-ctl — sends a payload as a burst of ICMP Echo Requests.

use std::io::Read;

use anyhow::{Context, Result};

use pingwire_core::config::PingwireConfig;
use pingwire_net::{RawIcmpSocket, Sender};

// ── Argument handling ─────────────────────────────────────────────────────────

#[derive(Debug, PartialEq, Eq)]
enum Command {
    /// Payload words as given; `-` means stdin.
    Send(Vec<String>),
    Config,
    Help,
}

/// Parse options into `config` and return the remaining command.
fn parse_args(args: &[String], config: &mut PingwireConfig) -> Result<Command> {
    let mut remaining: Vec<&str> = Vec::new();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--to" => {
                i += 1;
                config.sender.destination = args.get(i).context("--to requires a value")?.clone();
            }
            "--port" => {
                i += 1;
                config.sender.port = args
                    .get(i)
                    .context("--port requires a value")?
                    .parse()
                    .context("--port must be a number")?;
            }
            "--chunk-size" => {
                i += 1;
                config.sender.chunk_size = args
                    .get(i)
                    .context("--chunk-size requires a value")?
                    .parse()
                    .context("--chunk-size must be a number")?;
            }
            other => remaining.push(other),
        }
        i += 1;
    }

    match remaining.as_slice() {
        ["send", words @ ..] if !words.is_empty() => {
            Ok(Command::Send(words.iter().map(|w| w.to_string()).collect()))
        }
        ["send"] => anyhow::bail!("send requires a payload (or - for stdin)"),
        ["config"] => Ok(Command::Config),
        ["help"] | ["--help"] | ["-h"] | [] => Ok(Command::Help),
        other => anyhow::bail!("unknown command: {}", other.join(" ")),
    }
}

fn print_usage() {
    println!("Usage: pingwire-ctl [options] <command>");
    println!();
    println!("Commands:");
    println!("  send <text...>   Send the text as one burst of echo requests");
    println!("  send -           Send everything read from stdin");
    println!("  config           Print the effective configuration");
    println!();
    println!("Options:");
    println!("  --to <ipv4>          Destination address");
    println!("  --port <port>        Port selector passed to sendto");
    println!("  --chunk-size <n>     Compressed bytes per packet");
}

/// Load the config, falling back to defaults when the file is unusable.
fn load_config() -> PingwireConfig {
    PingwireConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to load config, using defaults");
        PingwireConfig::default()
    })
}

fn read_payload(words: &[String]) -> Result<String> {
    if words == ["-"] {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("failed to read payload from stdin")?;
        Ok(text)
    } else {
        Ok(words.join(" "))
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut config = load_config();
    tracing::debug!(path = %PingwireConfig::file_path().display(), "config loaded");
    let args: Vec<String> = std::env::args().skip(1).collect();

    let command = match parse_args(&args, &mut config) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("{e:#}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    };

    match command {
        Command::Help => {
            print_usage();
            Ok(())
        }
        Command::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
        Command::Send(words) => {
            config.validate().context("invalid configuration")?;
            let payload = read_payload(&words)?;

            let socket = RawIcmpSocket::open(config.sender.port)
                .context("failed to open raw ICMP socket (needs root or CAP_NET_RAW)")?;
            let sender = Sender::from_config(socket, &config.sender)?;
            let report = sender.send(&payload).await.context("send failed")?;

            println!(
                "Sent {} bytes in {} packet(s) to {} (id {}).",
                payload.len(),
                report.frames,
                config.sender.destination,
                report.identifier
            );
            Ok(())
        }
    }
}
