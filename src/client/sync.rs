//! Client-side product list synchronization.
//!
//! The list is never patched locally. Every successful create, update or
//! delete is followed by a full `load()`, so what the user sees is always the
//! server's answer. Operations take `&mut self`, which keeps a single request
//! sequence in flight per synchronizer.

use std::io;

use thiserror::Error;

use super::api::{CatalogApi, ClientError};
use super::model::{Draft, ProductRecord};
use super::session::Session;
use crate::database::models::ProductId;

pub const LOAD_FAILED: &str = "Failed to fetch products";
pub const SUBMIT_FAILED: &str = "Operation failed";
pub const DELETE_FAILED: &str = "Failed to delete product";
pub const DELETE_PROMPT: &str = "Are you sure you want to delete this product?";

/// Where the user should be
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Products,
    /// Unauthenticated entry point; reached when the credential is missing or rejected
    Login,
}

/// Explicit user confirmation gesture
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Deleted,
    Cancelled,
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("session expired; sign in again")]
    SessionExpired,

    #[error("not signed in")]
    NotSignedIn,

    /// Session ended but the stored credential could not be removed
    #[error("session expired and the stored credential could not be removed: {0}")]
    CredentialStore(#[source] io::Error),

    #[error("{message}")]
    Failed {
        message: String,
        #[source]
        source: ClientError,
    },
}

pub struct ProductSync<A: CatalogApi> {
    api: A,
    session: Session,
    products: Vec<ProductRecord>,
    draft: Draft,
    editing_id: Option<ProductId>,
    error: Option<String>,
    loading: bool,
    view: View,
}

impl<A: CatalogApi> ProductSync<A> {
    pub fn new(api: A, session: Session) -> Self {
        Self {
            api,
            session,
            products: Vec::new(),
            draft: Draft::default(),
            editing_id: None,
            error: None,
            loading: true,
            view: View::Products,
        }
    }

    pub fn products(&self) -> &[ProductRecord] {
        &self.products
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut Draft {
        &mut self.draft
    }

    pub fn editing_id(&self) -> Option<ProductId> {
        self.editing_id
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    /// True until the first `load()` completes, successfully or not
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Replace the local list with the server's full collection.
    ///
    /// A rejected or missing credential clears the stored credential, drops
    /// the list and switches to [`View::Login`].
    pub async fn load(&mut self) -> Result<(), SyncError> {
        let result = match self.session.credential() {
            Some(credential) => self.api.list_products(credential).await,
            None => {
                self.loading = false;
                return Err(self.expire_session());
            }
        };
        self.loading = false;

        match result {
            Ok(products) => {
                tracing::debug!("Loaded {} products", products.len());
                self.products = products;
                self.error = None;
                self.view = View::Products;
                Ok(())
            }
            Err(e) if e.is_unauthorized() => {
                tracing::warn!("Product list rejected credential; signing out");
                Err(self.expire_session())
            }
            Err(e) => {
                tracing::warn!("Failed to fetch products: {}", e);
                self.error = Some(LOAD_FAILED.to_string());
                Err(SyncError::Failed {
                    message: LOAD_FAILED.to_string(),
                    source: e,
                })
            }
        }
    }

    fn expire_session(&mut self) -> SyncError {
        let cleared = self.session.clear();
        self.products.clear();
        self.error = Some(LOAD_FAILED.to_string());
        self.view = View::Login;

        match cleared {
            Ok(()) => SyncError::SessionExpired,
            Err(e) => SyncError::CredentialStore(e),
        }
    }

    /// Create (no `editing_id`) or update (with one) from the current draft.
    ///
    /// On success the draft and `editing_id` reset and the list is reloaded;
    /// a failed reload is recorded in the visible state, not returned. On
    /// failure the draft is kept and the server's message, or a generic one,
    /// is surfaced.
    pub async fn submit_draft(&mut self) -> Result<ProductRecord, SyncError> {
        let request = self.draft.to_request();
        let credential = match self.session.credential() {
            Some(credential) => credential,
            None => {
                self.error = Some(SUBMIT_FAILED.to_string());
                return Err(SyncError::NotSignedIn);
            }
        };

        let result = match self.editing_id {
            Some(id) => self.api.update_product(credential, id, &request).await,
            None => self.api.create_product(credential, &request).await,
        };

        match result {
            Ok(saved) => {
                tracing::info!("Saved product {}", saved.id);
                self.draft = Draft::default();
                self.editing_id = None;
                self.error = None;
                if let Err(e) = self.load().await {
                    tracing::warn!("Reload after save failed: {}", e);
                }
                Ok(saved)
            }
            Err(e) => {
                let message = e.server_message().unwrap_or(SUBMIT_FAILED).to_string();
                tracing::warn!("Save failed: {}", e);
                self.error = Some(message.clone());
                Err(SyncError::Failed { message, source: e })
            }
        }
    }

    /// Copy `product` into the draft and remember its id. No network.
    pub fn begin_edit(&mut self, product: &ProductRecord) {
        self.draft = Draft::from_record(product);
        self.editing_id = Some(product.id);
    }

    /// Drop the draft and `editing_id`. No network.
    pub fn cancel_edit(&mut self) {
        self.draft = Draft::default();
        self.editing_id = None;
    }

    /// Delete `id` after `confirm` approves; declining issues no request.
    pub async fn remove(
        &mut self,
        id: ProductId,
        confirm: &mut dyn Confirm,
    ) -> Result<RemoveOutcome, SyncError> {
        if !confirm.confirm(DELETE_PROMPT) {
            return Ok(RemoveOutcome::Cancelled);
        }

        let credential = match self.session.credential() {
            Some(credential) => credential,
            None => {
                self.error = Some(DELETE_FAILED.to_string());
                return Err(SyncError::NotSignedIn);
            }
        };

        match self.api.delete_product(credential, id).await {
            Ok(()) => {
                tracing::info!("Deleted product {}", id);
                if let Err(e) = self.load().await {
                    tracing::warn!("Reload after delete failed: {}", e);
                }
                Ok(RemoveOutcome::Deleted)
            }
            Err(e) => {
                tracing::warn!("Delete of product {} failed: {}", id, e);
                self.error = Some(DELETE_FAILED.to_string());
                Err(SyncError::Failed {
                    message: DELETE_FAILED.to_string(),
                    source: e,
                })
            }
        }
    }
}
