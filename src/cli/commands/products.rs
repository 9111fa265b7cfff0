use std::io::{self, BufRead, Write};
use std::time::Duration;

use clap::Subcommand;
use serde_json::json;

use crate::cli::config::{credential_store, load_cli_config};
use crate::cli::utils::{output_product, output_products, output_success};
use crate::cli::OutputFormat;
use crate::client::{CatalogApi, Confirm, HttpCatalogClient, ProductSync, RemoveOutcome, Session, SyncError};

#[derive(Subcommand)]
pub enum ProductCommands {
    #[command(about = "List all products")]
    List,

    #[command(about = "Show a single product")]
    Show {
        #[arg(help = "Product ID")]
        id: i64,
    },

    #[command(about = "Create a product")]
    Add {
        #[arg(long)]
        name: String,
        #[arg(long, help = "Price; leading numeric text is kept, anything else is 0")]
        price: String,
        #[arg(long, default_value = "")]
        description: String,
    },

    #[command(about = "Edit a product you own; omitted fields keep their current value")]
    Edit {
        #[arg(help = "Product ID")]
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        price: Option<String>,
    },

    #[command(about = "Delete a product you own")]
    Delete {
        #[arg(help = "Product ID")]
        id: i64,
        #[arg(long, short, help = "Skip the confirmation prompt")]
        yes: bool,
    },
}

/// Asks on stderr and reads a y/N answer from stdin
struct PromptConfirm;

impl Confirm for PromptConfirm {
    fn confirm(&mut self, prompt: &str) -> bool {
        eprint!("{} [y/N] ", prompt);
        if io::stderr().flush().is_err() {
            return false;
        }

        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
            Err(_) => false,
        }
    }
}

struct AlwaysConfirm;

impl Confirm for AlwaysConfirm {
    fn confirm(&mut self, _prompt: &str) -> bool {
        true
    }
}

fn open_sync() -> anyhow::Result<ProductSync<HttpCatalogClient>> {
    let config = load_cli_config()?;
    let client = HttpCatalogClient::new(config.server_url(), Duration::from_secs(10))?;
    let session = Session::open(credential_store()?)?;
    Ok(ProductSync::new(client, session))
}

fn sync_failure(err: SyncError) -> anyhow::Error {
    match err {
        SyncError::SessionExpired | SyncError::NotSignedIn => {
            anyhow::anyhow!("{}. Run `catalog auth token <token>` to sign in.", err)
        }
        SyncError::Failed { .. } | SyncError::CredentialStore(_) => err.into(),
    }
}

pub async fn handle(cmd: ProductCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let mut sync = open_sync()?;

    match cmd {
        ProductCommands::List => {
            sync.load().await.map_err(sync_failure)?;
            output_products(&output_format, sync.products())
        }
        ProductCommands::Show { id } => {
            let credential = sync
                .session()
                .credential()
                .ok_or_else(|| sync_failure(SyncError::NotSignedIn))?;
            let product = sync.api().get_product(credential, id).await?;
            output_product(&output_format, &product)
        }
        ProductCommands::Add {
            name,
            price,
            description,
        } => {
            let draft = sync.draft_mut();
            draft.name = name;
            draft.description = description;
            draft.price = price;

            let saved = sync.submit_draft().await.map_err(sync_failure)?;
            output_success(
                &output_format,
                &format!("Created product {} ({})", saved.id, saved.display_price()),
                Some(json!(saved)),
            )
        }
        ProductCommands::Edit {
            id,
            name,
            description,
            price,
        } => {
            let credential = sync
                .session()
                .credential()
                .ok_or_else(|| sync_failure(SyncError::NotSignedIn))?;
            let current = sync.api().get_product(credential, id).await?;

            sync.begin_edit(&current);
            let draft = sync.draft_mut();
            if let Some(name) = name {
                draft.name = name;
            }
            if let Some(description) = description {
                draft.description = description;
            }
            if let Some(price) = price {
                draft.price = price;
            }

            let saved = sync.submit_draft().await.map_err(sync_failure)?;
            output_success(
                &output_format,
                &format!("Updated product {}", saved.id),
                Some(json!(saved)),
            )
        }
        ProductCommands::Delete { id, yes } => {
            let outcome = if yes {
                sync.remove(id, &mut AlwaysConfirm).await
            } else {
                sync.remove(id, &mut PromptConfirm).await
            }
            .map_err(sync_failure)?;

            match outcome {
                RemoveOutcome::Deleted => output_success(
                    &output_format,
                    &format!("Deleted product {}", id),
                    Some(json!({ "id": id })),
                ),
                RemoveOutcome::Cancelled => output_success(&output_format, "Delete cancelled", None),
            }
        }
    }
}
