//! Client side of the catalog: HTTP access, credential handling and the
//! product list synchronizer used by the CLI.

pub mod api;
pub mod model;
pub mod price;
pub mod session;
pub mod sync;

pub use api::{CatalogApi, ClientError, HttpCatalogClient};
pub use model::{Draft, ProductRecord, ProductRequest};
pub use session::{Credential, CredentialStore, FileCredentialStore, MemoryCredentialStore, Session};
pub use sync::{Confirm, ProductSync, RemoveOutcome, SyncError, View};
