mod analyse;
mod logging;
mod render;
mod stream;

use std::path::PathBuf;
use std::process::ExitCode;

use aabus_core::DEFAULT_CHUNK_SIZE;
use clap::{Parser, Subcommand};

use crate::analyse::{AnalyseArgs, cmd_pcap_analyse, cmd_replay_report};
use crate::logging::{LogFormat, LogLevel, LogSettings};
use crate::stream::{PrintOptions, cmd_monitor, cmd_replay};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("AABUS_BUILD_COMMIT"),
    " ",
    env!("AABUS_BUILD_DATE"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "aabus")]
#[command(version, long_version = LONG_VERSION)]
#[command(
    about = "Decoder for the Advantage Air wall-tablet bus (setCAN/getCAN/ackCAN).",
    long_about = None,
    after_help = "Examples:\n  aabus monitor 192.168.1.2:10002\n  aabus replay session.raw --json\n  aabus replay session.raw -o report.json\n  aabus pcap analyse session.pcapng -o report.json"
)]
struct Cli {
    /// Log output format (stderr)
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr)
    #[arg(long, value_name = "LEVEL", default_value = "warn", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Connect to the bridge and print records as they arrive.
    Monitor {
        /// Bridge address (host:port)
        #[arg(env = "AABUS_ADDR", default_value = "192.168.1.2:10002")]
        addr: String,

        /// Give up connecting after this many seconds
        #[arg(long, value_name = "SECS")]
        connect_timeout: Option<u64>,

        /// Print one JSON object per record
        #[arg(long)]
        json: bool,

        /// Socket read size in bytes
        #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,
    },
    /// Decode a raw dump of the bridge stream ('-' reads stdin).
    Replay {
        input: PathBuf,

        /// Print one JSON object per record
        #[arg(long)]
        json: bool,

        /// Write a JSON session report instead of printing records
        #[arg(short = 'o', long, value_name = "PATH", conflicts_with = "json")]
        report: Option<PathBuf>,

        /// Pretty-print the report
        #[arg(long, requires = "report")]
        pretty: bool,

        /// Read size in bytes
        #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,
    },
    /// Operations on PCAP/PCAPNG captures of the bridge traffic.
    Pcap {
        #[command(subcommand)]
        command: PcapCommands,
    },
}

#[derive(Subcommand, Debug)]
enum PcapCommands {
    /// Decode every TCP stream of a capture into a JSON session report.
    #[command(alias = "analyze")]
    #[command(
        after_help = "Examples:\n  aabus pcap analyse session.pcapng -o report.json\n  aabus pcap analyze 'captures/*.pcap' --stdout --pretty --port 10002"
    )]
    Analyse(AnalyseArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    LogSettings {
        format: cli.log_format,
        level: cli.log_level,
    }
    .install();

    let result = match cli.command {
        Commands::Monitor {
            addr,
            connect_timeout,
            json,
            chunk_size,
        } => cmd_monitor(
            &addr,
            connect_timeout,
            chunk_size,
            PrintOptions {
                json,
                stamped: true,
            },
        ),
        Commands::Replay {
            input,
            report: Some(report),
            pretty,
            ..
        } => cmd_replay_report(&input, &report, pretty),
        Commands::Replay {
            input,
            json,
            chunk_size,
            ..
        } => cmd_replay(
            &input,
            chunk_size,
            PrintOptions {
                json,
                stamped: false,
            },
        ),
        Commands::Pcap { command } => match command {
            PcapCommands::Analyse(args) => cmd_pcap_analyse(args),
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

#[derive(Debug)]
pub(crate) struct CliError {
    pub(crate) message: String,
    pub(crate) hint: Option<String>,
}

impl CliError {
    pub(crate) fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(format!("{err:#}"), None)
    }
}
