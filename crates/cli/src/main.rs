//! ChatDeck CLI — the main entry point.
//!
//! Commands:
//! - `chat`     — Text chat with a system prompt
//! - `explain`  — Ask questions about an image
//! - `draw`     — Generate images from text
//! - `edit`     — Transform an uploaded image
//! - `onboard`  — Initialize config & sample prompts
//! - `doctor`   — Diagnose configuration

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;
mod output;
mod repl;

#[derive(Parser)]
#[command(
    name = "chatdeck",
    about = "ChatDeck — chat, vision and image generation in the terminal",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with the model
    Chat {
        /// System prompt file (overrides the configured one)
        #[arg(short, long)]
        prompt: Option<PathBuf>,
    },

    /// Ask questions about an image
    Explain {
        /// Image to attach (png, jpg, jpeg)
        #[arg(short, long)]
        image: PathBuf,

        /// System prompt file (overrides the configured one)
        #[arg(short, long)]
        prompt: Option<PathBuf>,
    },

    /// Generate images from text instructions
    Draw {
        /// Directory for generated images
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Transform an image with text instructions
    Edit {
        /// Source image (png, jpg, jpeg)
        #[arg(short, long)]
        image: PathBuf,

        /// System prompt file (overrides the configured one)
        #[arg(short, long)]
        prompt: Option<PathBuf>,

        /// Directory for generated images
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Initialize configuration and sample prompts
    Onboard,

    /// Diagnose configuration health
    Doctor,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Chat { prompt } => commands::chat::run(prompt).await?,
        Commands::Explain { image, prompt } => commands::explain::run(image, prompt).await?,
        Commands::Draw { out } => commands::draw::run(out).await?,
        Commands::Edit { image, prompt, out } => commands::edit::run(image, prompt, out).await?,
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Doctor => commands::doctor::run().await?,
    }

    Ok(())
}
