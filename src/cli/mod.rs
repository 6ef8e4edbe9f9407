pub mod commands;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "drinks-api")]
#[command(about = "Drink catalog API with role-based JWT authorization")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve {
        #[arg(long, help = "Port to listen on, overrides PORT")]
        port: Option<u16>,

        #[arg(long, help = "DESTRUCTIVE: drop, recreate and seed the drink table before serving")]
        reset_database: bool,
    },

    #[command(about = "DESTRUCTIVE: drop, recreate and seed the drink table, then exit")]
    ResetDatabase,
}

pub async fn run(cli: Cli, mut config: AppConfig) -> anyhow::Result<()> {
    match cli.command.unwrap_or(Commands::Serve {
        port: None,
        reset_database: false,
    }) {
        Commands::Serve { port, reset_database } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            config.database.reset_on_boot |= reset_database;
            commands::serve::handle(config).await
        }
        Commands::ResetDatabase => commands::reset::handle(config).await,
    }
}
