use std::fmt;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use super::api::{CatalogApi, ClientError};

/// Bearer token presented on every authenticated request
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(..)")
    }
}

/// Persistent home of the credential between runs
pub trait CredentialStore: Send + Sync {
    fn load(&self) -> io::Result<Option<String>>;
    fn save(&self, token: &str) -> io::Result<()>;
    fn clear(&self) -> io::Result<()>;
}

/// Token kept in a single file, typically `~/.config/catalog/cli/token`
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> io::Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(content) => {
                let token = content.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn save(&self, token: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, token)
    }

    fn clear(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

/// In-process store; clones share the same slot
#[derive(Clone, Default)]
pub struct MemoryCredentialStore {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(token.into()))),
        }
    }

    pub fn current(&self) -> Option<String> {
        self.slot.lock().map(|slot| slot.clone()).unwrap_or(None)
    }

    fn poisoned() -> io::Error {
        io::Error::new(io::ErrorKind::Other, "credential slot poisoned")
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> io::Result<Option<String>> {
        Ok(self.slot.lock().map_err(|_| Self::poisoned())?.clone())
    }

    fn save(&self, token: &str) -> io::Result<()> {
        *self.slot.lock().map_err(|_| Self::poisoned())? = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> io::Result<()> {
        *self.slot.lock().map_err(|_| Self::poisoned())? = None;
        Ok(())
    }
}

/// The caller's credential, passed explicitly into request-issuing code
pub struct Session {
    credential: Option<Credential>,
    store: Box<dyn CredentialStore>,
}

impl Session {
    /// Open a session, loading any previously stored credential
    pub fn open(store: impl CredentialStore + 'static) -> io::Result<Self> {
        let credential = store.load()?.map(Credential::new);
        Ok(Self {
            credential,
            store: Box::new(store),
        })
    }

    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    pub fn is_signed_in(&self) -> bool {
        self.credential.is_some()
    }

    pub fn sign_in(&mut self, token: impl Into<String>) -> io::Result<()> {
        let credential = Credential::new(token);
        self.store.save(credential.as_str())?;
        self.credential = Some(credential);
        Ok(())
    }

    /// Forget the credential in memory and in the store. The in-memory
    /// credential is dropped even when the store fails to forget it.
    pub fn clear(&mut self) -> io::Result<()> {
        self.credential = None;
        self.store.clear().map_err(|e| {
            tracing::warn!("Failed to clear stored credential: {}", e);
            e
        })
    }
}

/// POST /api/logout, then drop the credential. A failed request keeps it.
pub async fn logout<A>(api: &A, session: &mut Session) -> Result<(), ClientError>
where
    A: CatalogApi + ?Sized,
{
    if let Some(credential) = session.credential() {
        api.logout(credential).await?;
    }
    session.clear()?;
    Ok(())
}
