//! CLI entry and dispatch.

use anyhow::{Context, Result};
use banter_core::config::{self, Config};
use banter_core::logging;
use banter_core::session::ModelId;
use clap::Parser;

mod commands;

#[derive(Parser)]
#[command(name = "banter")]
#[command(version)]
#[command(about = "Terminal streaming chat client")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override the model from config (o3-mini, gpt-4o-mini)
    #[arg(long)]
    model: Option<String>,

    /// Override the chat backend base URL from config
    #[arg(long)]
    base_url: Option<String>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Line-mode chat on stdin/stdout (no full-screen UI)
    Chat,

    /// List the supported model tags
    Models,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    let mut config = Config::load().context("load config")?;

    if let Some(url) = cli.base_url.as_deref() {
        config.base_url = Some(url.to_string());
    }
    if let Some(model) = cli.model.as_deref() {
        if ModelId::from_tag(model).is_none() {
            anyhow::bail!(
                "Unknown model '{}'. Supported: {}",
                model,
                ModelId::ALL.map(ModelId::tag).join(", ")
            );
        }
        config.model = model.to_string();
    }

    // default to the full-screen UI
    let Some(command) = cli.command else {
        let _log_guard = logging::init_logging(&config::paths::banter_home())
            .context("initialize logging")?;
        return banter_tui::run(config);
    };

    match command {
        Commands::Chat => {
            let _log_guard = logging::init_logging(&config::paths::banter_home())
                .context("initialize logging")?;
            commands::chat::run(&config).await
        }

        Commands::Models => {
            commands::models::run(&config);
            Ok(())
        }

        Commands::Config { command } => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
        },
    }
}
