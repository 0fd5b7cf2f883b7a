use sira_link::{
    cli::CliArgs,
    client::{commands, ClientEvent},
    config::Config,
    logging,
    telemetry::TelemetryLog,
    StreamingClient,
};

use anyhow::{Context, Result};
use clap::Parser;
use crossbeam_channel::RecvTimeoutError;
use log::{debug, error, info, warn};
use serde_json::Value;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Default)]
struct Stats {
    frames: u64,
    telemetry: u64,
    errors: u64,
}

fn main() -> Result<()> {
    // Parse command-line arguments
    let cli_args = CliArgs::parse();

    // Setup logging
    logging::setup_logging(cli_args.debug, cli_args.log_file.as_deref())?;
    logging::log_app_start(env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = Config::load(&cli_args)?;
    logging::set_verbosity(config.logging.verbosity);
    logging::log_app_config(&config);

    let outgoing = pending_commands(&cli_args)?;

    let client = StreamingClient::new(config.connection.clone());
    let events = client.events();
    let mut history = TelemetryLog::default();

    client
        .connect_default()
        .with_context(|| {
            format!(
                "Could not connect to {}:{}",
                config.connection.host, config.connection.port
            )
        })?;

    for command in &outgoing {
        if client.send_command(command).is_ok() {
            info!("Sent command {}", command);
        }
    }

    let deadline = cli_args
        .duration
        .map(|secs| Instant::now() + Duration::from_secs(secs));
    let mut stats = Stats::default();

    info!("Entering event loop");
    loop {
        let wait = match deadline {
            Some(deadline) => {
                let remaining = deadline.saturating_duration_since(Instant::now());
                if remaining.is_zero() {
                    info!("Run duration elapsed");
                    break;
                }
                remaining.min(POLL_INTERVAL)
            }
            None => POLL_INTERVAL,
        };

        match events.recv_timeout(wait) {
            Ok(ClientEvent::FrameReceived(frame)) => {
                stats.frames += 1;
                debug!("Frame {} ({})", frame.nframe, frame.resolution());
            }
            Ok(ClientEvent::TelemetryReceived(telemetry)) => {
                stats.telemetry += 1;
                let text = serde_json::to_string(&telemetry.values).unwrap_or_default();
                info!("Telemetry: {}", text);
                history.info(text);
            }
            Ok(ClientEvent::ConnectionChanged(true)) => {
                history.info(format!(
                    "Connected to {}:{}",
                    config.connection.host, config.connection.port
                ));
            }
            Ok(ClientEvent::ConnectionChanged(false)) => {
                history.warning("Disconnected");
                info!("Connection closed");
                break;
            }
            Ok(ClientEvent::ErrorOccurred(message)) => {
                stats.errors += 1;
                error!("{}", message);
                history.error(message);
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                warn!("Event channel closed");
                break;
            }
        }
    }

    client.disconnect();

    info!(
        "Received {} frames and {} telemetry snapshots, {} errors",
        stats.frames, stats.telemetry, stats.errors
    );
    for entry in history.entries() {
        println!("{}", entry);
    }

    Ok(())
}

fn pending_commands(args: &CliArgs) -> Result<Vec<Value>> {
    let mut outgoing = Vec::new();

    if let Some(text) = &args.command {
        let command = commands::parse_command(text).context("Invalid --command")?;
        outgoing.push(Value::Object(command));
    }
    if let Some(resolution) = &args.resolution {
        outgoing.push(commands::set_resolution(resolution)?);
    }
    if let Some(fps) = args.fps {
        outgoing.push(commands::set_fps(fps)?);
    }

    Ok(outgoing)
}
