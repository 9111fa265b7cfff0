use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;

type Fingerprint = [u8; 32];

/// Tokens invalidated by logout, kept until their own expiry passes.
///
/// Only a SHA-256 fingerprint of each token is held, never the token itself.
#[derive(Clone, Default)]
pub struct RevocationList {
    revoked: Arc<RwLock<HashMap<Fingerprint, i64>>>,
}

impl RevocationList {
    pub fn new() -> Self {
        Self::default()
    }

    fn fingerprint(token: &str) -> Fingerprint {
        Sha256::digest(token.as_bytes()).into()
    }

    /// Revoke `token` until `expires_at` (unix seconds). Expired entries are pruned here.
    pub async fn revoke(&self, token: &str, expires_at: i64) {
        let now = Utc::now().timestamp();
        let mut revoked = self.revoked.write().await;
        revoked.retain(|_, exp| *exp > now);
        revoked.insert(Self::fingerprint(token), expires_at);
    }

    pub async fn is_revoked(&self, token: &str) -> bool {
        self.revoked.read().await.contains_key(&Self::fingerprint(token))
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.revoked.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn revoked_token_is_reported() {
        let list = RevocationList::new();
        let exp = Utc::now().timestamp() + 3600;
        list.revoke("token-a", exp).await;

        assert!(list.is_revoked("token-a").await);
        assert!(!list.is_revoked("token-b").await);
    }

    #[tokio::test]
    async fn expired_entries_are_pruned_on_revoke() {
        let list = RevocationList::new();
        let now = Utc::now().timestamp();
        list.revoke("old", now - 10).await;
        list.revoke("fresh", now + 3600).await;

        assert_eq!(list.len().await, 1);
        assert!(list.is_revoked("fresh").await);
    }
}
