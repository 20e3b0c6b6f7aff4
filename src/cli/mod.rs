use clap::{Parser, Subcommand};

use crate::config::config;
use crate::database::DatabaseManager;
use crate::server;

#[derive(Parser)]
#[command(name = "storefront-api")]
#[command(about = "Storefront API - users, catalog, carts, orders, reviews and settings over HTTP")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve {
        #[arg(long, help = "Port to listen on (overrides API_PORT)")]
        port: Option<u16>,
    },

    #[command(about = "Apply pending PostgreSQL migrations and exit")]
    Migrate,
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = config();
    tracing::info!("Starting Storefront API in {:?} mode", config.environment);

    match cli.command.unwrap_or(Commands::Serve { port: None }) {
        Commands::Serve { port } => server::serve(config, port.unwrap_or(config.api.port)).await,
        Commands::Migrate => {
            let pool = DatabaseManager::connect(&config.database).await?;
            DatabaseManager::migrate(&pool).await?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["storefront-api"]).unwrap();
        assert!(cli.command.is_none());

        let cli = Cli::try_parse_from(["storefront-api", "serve", "--port", "8081"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Serve { port: Some(8081) })));

        let cli = Cli::try_parse_from(["storefront-api", "migrate"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Migrate)));
    }
}
