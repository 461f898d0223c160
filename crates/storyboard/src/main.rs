//! Storyboard CLI binary.
//!
//! Generates a storyboard from a story prompt, or appends one scene to an
//! existing storyboard file.

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;

#[tokio::main]
async fn main() {
    use cli::{Cli, Commands, continue_storyboard, generate_storyboard};

    // Secrets such as GEMINI_API_KEY may live in a local .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Generate(args) => generate_storyboard(cli.config.as_deref(), args).await,
        Commands::Continue(args) => continue_storyboard(cli.config.as_deref(), args).await,
    };

    if let Err(e) = result {
        tracing::error!(category = %e.category(), error = %e, "Command failed");
        eprintln!("{}", e.user_message());
        std::process::exit(1);
    }
}
