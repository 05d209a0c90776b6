//! CodyStack CLI - Main entry point

mod cli;
mod init;
mod registry;

use clap::{Parser, Subcommand};
use codystack_foundation::CodyConfig;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// CodyStack - plugin registry for the CodyStack AI IDE
#[derive(Parser, Debug)]
#[command(name = "codystack")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Initialize CodyStack in the current directory
    Init {
        /// Force reinitialization even if already initialized
        #[arg(short, long)]
        force: bool,
    },
    /// List registered plugins
    Plugins {
        /// Show only active plugins
        #[arg(short, long)]
        active: bool,
    },
    /// List plugin categories
    Categories,
    /// Activate a plugin and show its commands
    Activate {
        /// Plugin ID
        id: String,
    },
    /// Activate a plugin and execute one of its commands
    Run {
        /// Plugin ID
        plugin_id: String,
        /// Command ID
        command_id: String,
    },
    /// Validate a plugin manifest (package.json)
    Manifest {
        /// Path to the manifest file
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 로깅보다 먼저 설정을 읽어야 logLevel을 반영할 수 있다
    let config = CodyConfig::load();

    // Initialize logging
    let log_level = if args.debug {
        "debug".to_string()
    } else {
        config
            .as_ref()
            .ok()
            .and_then(|c| c.log_level.clone())
            .unwrap_or_else(|| "info".to_string())
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let config = config.unwrap_or_else(|e| {
        eprintln!("Warning: Failed to load config: {}", e);
        CodyConfig::default()
    });

    let command = args.command.unwrap_or(Command::Plugins { active: false });

    // 레지스트리가 필요 없는 명령
    match &command {
        Command::Init { force } => return init::init_project(*force),
        Command::Categories => {
            cli::list_categories();
            return Ok(());
        }
        Command::Manifest { path } => return cli::inspect_manifest(path),
        _ => {}
    }

    registry::init_default_registry(&config).await?;

    match command {
        Command::Plugins { active } => cli::list_plugins(active),
        Command::Activate { id } => cli::activate(&id).await,
        Command::Run {
            plugin_id,
            command_id,
        } => cli::run_command(&plugin_id, &command_id).await,
        Command::Init { .. } | Command::Categories | Command::Manifest { .. } => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run() {
        let args = Args::parse_from(["codystack", "run", "architect-agent", "architect.analyze"]);
        match args.command {
            Some(Command::Run {
                plugin_id,
                command_id,
            }) => {
                assert_eq!(plugin_id, "architect-agent");
                assert_eq!(command_id, "architect.analyze");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_plugins_active() {
        let args = Args::parse_from(["codystack", "--debug", "plugins", "--active"]);
        assert!(args.debug);
        assert!(matches!(args.command, Some(Command::Plugins { active: true })));
    }
}
