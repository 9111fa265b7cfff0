use std::time::Duration;

use clap::Subcommand;
use serde_json::json;

use crate::cli::config::{load_cli_config, save_cli_config};
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::client::HttpCatalogClient;

#[derive(Subcommand)]
pub enum ServerCommands {
    #[command(about = "Point the CLI at a catalog server")]
    Use {
        #[arg(help = "Server base URL, e.g. http://localhost:8000")]
        url: String,
    },

    #[command(about = "Show the configured server")]
    Current,

    #[command(about = "Check server health status from API /health endpoint")]
    Health,
}

pub async fn handle(cmd: ServerCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        ServerCommands::Use { url } => {
            let parsed = url::Url::parse(&url).map_err(|e| anyhow::anyhow!("Invalid server URL '{}': {}", url, e))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                anyhow::bail!("Server URL must use http or https");
            }

            let mut config = load_cli_config()?;
            config.set_server_url(url.clone());
            save_cli_config(&config)?;

            output_success(
                &output_format,
                &format!("Switched to server '{}'", url),
                Some(json!({ "server_url": url })),
            )
        }
        ServerCommands::Current => {
            let config = load_cli_config()?;
            match output_format {
                OutputFormat::Json => println!(
                    "{}",
                    serde_json::to_string_pretty(&json!({ "server_url": config.server_url() }))?
                ),
                OutputFormat::Text => println!("Current server: {}", config.server_url()),
            }
            Ok(())
        }
        ServerCommands::Health => {
            let config = load_cli_config()?;
            let client = HttpCatalogClient::new(config.server_url(), Duration::from_secs(5))?;
            let health = client.health().await?;

            match output_format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&health)?),
                OutputFormat::Text => {
                    let status = health.get("status").and_then(|s| s.as_str()).unwrap_or("unknown");
                    let storage = health.get("storage").and_then(|s| s.as_str()).unwrap_or("unknown");
                    println!("Server:  {}", config.server_url());
                    println!("Status:  {}", status);
                    println!("Storage: {}", storage);
                }
            }
            Ok(())
        }
    }
}
