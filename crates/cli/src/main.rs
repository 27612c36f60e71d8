//! Command-line front end for the image generation service.
//!
//! Submits prompts, waits for them to finish while printing progress, and
//! archives the results into the same output directory the web server
//! uses.

use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use novagen_client::poller::PollConfig;
use novagen_core::config::GenerationConfig;

mod cmd;
mod session;

use session::Session;

#[derive(Parser)]
#[command(name = "novagen")]
#[command(about = "Generate images from text prompts")]
#[command(version)]
struct Cli {
    /// Seconds between two status checks
    #[arg(long, global = true, default_value_t = 5, env = "NOVAGEN_POLL_INTERVAL_SECS")]
    poll_interval_secs: u64,

    /// Stop waiting for a job after this many seconds
    #[arg(long, global = true, env = "NOVAGEN_MAX_WAIT_SECS")]
    max_wait_secs: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate images; prompts are read interactively when none is given
    Generate {
        /// Prompt text
        prompt: Option<String>,
    },

    /// List archived generations, newest first
    List,

    /// Delete an archived generation
    Delete {
        /// Message id of the generation
        message_id: String,
    },

    /// Upscale (U1-U4) or create a variation (V1-V4) of an earlier job
    Button {
        /// Message id of the original job
        message_id: String,

        /// Button code, e.g. U2 or V3
        code: String,

        /// Prompt of the original job, used to describe the result; looked
        /// up in the archive when omitted
        #[arg(long, default_value = "")]
        prompt: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "novagen_cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = GenerationConfig::from_env().context("Invalid configuration")?;
    if config.api_key.is_none() {
        tracing::warn!("IMAGINEPRO_API_KEY is not set; requests to the generation service will fail");
    }

    let poll = PollConfig {
        interval: Duration::from_secs(cli.poll_interval_secs),
        max_wait: cli.max_wait_secs.map(Duration::from_secs),
    };
    let session = Session::new(config, poll).await?;

    let cancel = CancellationToken::new();
    spawn_ctrl_c_handler(cancel.clone());

    match cli.command {
        None => cmd::generate::interactive(&session, &cancel).await,
        Some(Commands::Generate { prompt: None }) => {
            cmd::generate::interactive(&session, &cancel).await
        }
        Some(Commands::Generate { prompt: Some(prompt) }) => {
            cmd::generate::once(&session, &prompt, &cancel).await
        }
        Some(Commands::List) => cmd::archive::list(&session).await,
        Some(Commands::Delete { message_id }) => cmd::archive::delete(&session, &message_id).await,
        Some(Commands::Button {
            message_id,
            code,
            prompt,
        }) => cmd::button::run(&session, &message_id, &code, &prompt, &cancel).await,
    }
}

/// Cancel `token` on the first Ctrl-C so a running poll stops cleanly.
fn spawn_ctrl_c_handler(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted, stopping");
            token.cancel();
        }
    });
}
