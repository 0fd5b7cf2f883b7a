use clap::{ArgAction, Parser};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Stream camera frames and telemetry from a SIRA controller",
    long_about = None
)]
pub struct CliArgs {
    /// Path to a TOML configuration file
    #[arg(long)]
    pub config: Option<String>,

    /// Controller host name or IP address
    #[arg(long)]
    pub host: Option<String>,

    #[arg(long)]
    pub port: Option<u16>,

    #[arg(long)]
    pub connect_timeout_ms: Option<u64>,

    /// 0 disables the send timeout
    #[arg(long)]
    pub send_timeout_ms: Option<u64>,

    /// Raw JSON object to send once connected
    #[arg(long)]
    pub command: Option<String>,

    /// Request a camera resolution, e.g. 1280x720
    #[arg(long)]
    pub resolution: Option<String>,

    /// Request a camera frame rate
    #[arg(long)]
    pub fps: Option<u32>,

    /// Seconds to stay connected; runs until the peer disconnects if omitted
    #[arg(long)]
    pub duration: Option<u64>,

    /// Repeat for more verbose logging
    #[arg(short, long, action = ArgAction::Count)]
    pub debug: u8,

    /// Also write the log to this file
    #[arg(long)]
    pub log_file: Option<String>,
}
