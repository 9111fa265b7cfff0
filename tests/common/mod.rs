#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;

use catalog_api::app::{app, AppState};
use catalog_api::auth::issue_token;
use catalog_api::client::{HttpCatalogClient, MemoryCredentialStore, ProductSync, Session};
use catalog_api::config::AppConfig;
use catalog_api::database::MemoryProductStore;

/// Router served on a free port inside the current test's runtime
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub config: AppConfig,
    pub http: reqwest::Client,
}

impl TestServer {
    pub async fn start() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut config = AppConfig::development();
        config.api.port = port;
        config.api.enable_request_logging = false;

        let state = AppState::new(config.clone(), Arc::new(MemoryProductStore::new()));
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test listener")?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app(state)).await;
        });

        let server = Self {
            port,
            base_url,
            config,
            http: reqwest::Client::new(),
        };
        server.wait_ready(Duration::from_secs(5)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            if let Ok(resp) = self.http.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Bearer token for `user_id` signed with the server's secret
    pub fn token_for(&self, user_id: i64) -> String {
        issue_token(&self.config.security.jwt_secret, user_id, 1).expect("token")
    }

    pub fn client(&self) -> HttpCatalogClient {
        HttpCatalogClient::new(&self.base_url, Duration::from_secs(5)).expect("client")
    }

    /// Synchronizer signed in as `user_id`, plus the store backing its session
    pub fn sync_for(&self, user_id: i64) -> (ProductSync<HttpCatalogClient>, MemoryCredentialStore) {
        let store = MemoryCredentialStore::with_token(self.token_for(user_id));
        let session = Session::open(store.clone()).expect("session");
        (ProductSync::new(self.client(), session), store)
    }

    /// POST a product as `user_id` and return its id
    pub async fn create_product(&self, user_id: i64, body: serde_json::Value) -> Result<i64> {
        let res = self
            .http
            .post(self.url("/api/products"))
            .bearer_auth(self.token_for(user_id))
            .json(&body)
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "create failed: {}", res.status());
        let body: serde_json::Value = res.json().await?;
        body["data"]["id"].as_i64().context("missing id")
    }
}
