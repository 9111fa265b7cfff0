use std::time::Duration;

use clap::Subcommand;
use serde_json::json;

use crate::auth::issue_token;
use crate::cli::config::{credential_store, load_cli_config};
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::client::{session, HttpCatalogClient, Session};
use crate::config::config;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Store a bearer token for subsequent commands")]
    Token {
        #[arg(help = "Bearer token issued by the identity provider")]
        token: String,
    },

    #[command(about = "Show current authentication status")]
    Status,

    #[command(about = "Revoke the stored token on the server and forget it")]
    Logout,

    #[command(about = "Mint a token locally (development only)")]
    Issue {
        #[arg(long, help = "Principal id to embed in the token")]
        user_id: i64,
        #[arg(long, help = "Signing secret (defaults to SECURITY_JWT_SECRET)")]
        secret: Option<String>,
        #[arg(long, help = "Token lifetime in hours")]
        hours: Option<u64>,
        #[arg(long, help = "Store the token as the current credential")]
        save: bool,
    },
}

pub async fn handle(cmd: AuthCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Token { token } => {
            let token = token.trim();
            if token.is_empty() {
                anyhow::bail!("Token must not be empty");
            }

            let mut session = Session::open(credential_store()?)?;
            session.sign_in(token)?;
            output_success(&output_format, "Token stored", None)
        }
        AuthCommands::Status => {
            let session = Session::open(credential_store()?)?;
            let config = load_cli_config()?;
            let signed_in = session.is_signed_in();

            match output_format {
                OutputFormat::Json => println!(
                    "{}",
                    serde_json::to_string_pretty(&json!({
                        "authenticated": signed_in,
                        "server_url": config.server_url(),
                    }))?
                ),
                OutputFormat::Text => {
                    println!("Server: {}", config.server_url());
                    if signed_in {
                        println!("Status: token stored");
                    } else {
                        println!("Status: not signed in (use `catalog auth token <token>`)");
                    }
                }
            }
            Ok(())
        }
        AuthCommands::Logout => {
            let mut session = Session::open(credential_store()?)?;
            if !session.is_signed_in() {
                return output_success(&output_format, "Already signed out", None);
            }

            let config = load_cli_config()?;
            let client = HttpCatalogClient::new(config.server_url(), Duration::from_secs(10))?;

            match session::logout(&client, &mut session).await {
                Ok(()) => output_success(&output_format, "Logged out", None),
                Err(e) if e.is_unauthorized() => {
                    // Token was already invalid on the server
                    session.clear()?;
                    output_success(&output_format, "Logged out", None)
                }
                Err(e) => Err(e.into()),
            }
        }
        AuthCommands::Issue {
            user_id,
            secret,
            hours,
            save,
        } => {
            let settings = &config().security;
            let secret = secret.unwrap_or_else(|| settings.jwt_secret.clone());
            let hours = hours.unwrap_or(settings.jwt_expiry_hours);
            let token = issue_token(&secret, user_id, hours)?;

            if save {
                Session::open(credential_store()?)?.sign_in(token.as_str())?;
            }

            match output_format {
                OutputFormat::Json => println!(
                    "{}",
                    serde_json::to_string_pretty(&json!({
                        "token": token,
                        "user_id": user_id,
                        "expires_in_hours": hours,
                        "saved": save,
                    }))?
                ),
                OutputFormat::Text => println!("{}", token),
            }
            Ok(())
        }
    }
}
