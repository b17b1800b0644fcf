//! MediaView CLI - Headless front end for the playback controller
//!
//! Features:
//! - Simulated playback through the full controller state machine
//! - Source validation
//! - Scale-to-fit calculation
//! - Configuration inspection

use clap::{Parser, Subcommand};
use mediaview_core::Size;
use std::path::PathBuf;

mod commands;
mod output;
mod simulator;

use output::OutputFormat;

/// MediaView CLI - playback view controller toolkit
#[derive(Parser)]
#[command(name = "mediaview")]
#[command(version)]
#[command(about = "Drive the playback view controller from the command line", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (text, json)
    #[arg(short, long, global = true, default_value = "text")]
    format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a source against a simulated decoder
    Play {
        /// Source URI (.mp4, .3gp or .3gpp)
        uri: String,

        /// Intrinsic video size
        #[arg(long, default_value = "1280x720")]
        video: Size,

        /// Render surface size
        #[arg(long, default_value = "1080x1920")]
        surface: Size,

        /// Clip duration in milliseconds
        #[arg(long, default_value = "8000")]
        duration_ms: u32,

        /// Raise a decoder error with this code halfway through
        #[arg(long)]
        fail_with: Option<i32>,

        /// Pause after this many milliseconds, then resume after as many again
        #[arg(long)]
        pause_after_ms: Option<u64>,

        /// JSON configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Check whether sources would be accepted
    Check {
        /// Sources to check
        #[arg(required = true)]
        uris: Vec<String>,

        /// JSON configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Fit a video into a surface preserving aspect ratio
    Scale {
        /// Video size (WxH)
        #[arg(long)]
        video: Size,

        /// Surface size (WxH)
        #[arg(long)]
        surface: Size,
    },

    /// Print the effective configuration
    Config {
        /// JSON configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let format = OutputFormat::from(cli.format.as_str());

    // Initialize tracing; logs go to stderr so stdout stays parseable
    let level = if cli.verbose { "debug" } else { "info" };
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_writer(std::io::stderr);
    match format {
        OutputFormat::Json => subscriber.json().init(),
        OutputFormat::Text => subscriber.init(),
    }

    mediaview_core::init();

    match cli.command {
        Commands::Play {
            uri,
            video,
            surface,
            duration_ms,
            fail_with,
            pause_after_ms,
            config,
        } => {
            let options = commands::PlayOptions {
                uri,
                video,
                surface,
                duration_ms,
                fail_with,
                pause_after_ms,
                config,
            };
            commands::play(options, format).await?;
        }
        Commands::Check { uris, config } => {
            commands::check(&uris, config.as_ref(), format)?;
        }
        Commands::Scale { video, surface } => {
            commands::scale(video, surface, format)?;
        }
        Commands::Config { config } => {
            commands::config(config.as_ref())?;
        }
    }

    Ok(())
}
