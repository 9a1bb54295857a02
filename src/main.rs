//! Deskchat - research-capable chat assistant
//!
#![doc = "Main entry point for the Deskchat application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use deskchat::cli::{Cli, Commands};
use deskchat::commands;
use deskchat::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    init_tracing(cli.verbose);

    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    config.validate()?;

    match cli.command {
        Commands::Chat { chat, new } => {
            if let Some(id) = chat {
                tracing::debug!("Opening chat {}", id);
            }
            commands::chat::run_chat(config, chat, new).await?;
            Ok(())
        }
        Commands::Research { topic } => {
            commands::research::run_research(config, &topic.join(" ")).await?;
            Ok(())
        }
        Commands::Ask { message, chat } => {
            commands::ask::run_ask(config, &message.join(" "), chat).await?;
            Ok(())
        }
        Commands::Chats { command } => {
            tracing::info!("Starting chat management command");
            commands::chats::handle_chats(&config, command)?;
            Ok(())
        }
        Commands::Settings { command } => {
            commands::settings::handle_settings(&config, command)?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
///
/// `RUST_LOG` wins; otherwise `deskchat=info`, or `deskchat=debug` with `--verbose`.
fn init_tracing(verbose: bool) {
    let default_directive = if verbose {
        "deskchat=debug"
    } else {
        "deskchat=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
