mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use catalog_api::auth::issue_token;

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let server = common::TestServer::start().await?;

    let res = server.http.get(server.url("/health")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = res.json().await?;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["storage"], json!("memory"));
    Ok(())
}

#[tokio::test]
async fn products_require_bearer_token() -> Result<()> {
    let server = common::TestServer::start().await?;

    let res = server.http.get(server.url("/api/products")).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await?;
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"], json!("UNAUTHORIZED"));

    let res = server
        .http
        .post(server.url("/api/products"))
        .json(&json!({"name": "Widget", "price": 1}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn token_signed_with_other_secret_is_rejected() -> Result<()> {
    let server = common::TestServer::start().await?;
    let forged = issue_token("not-the-server-secret", 1, 1)?;

    let res = server
        .http
        .get(server.url("/api/products"))
        .bearer_auth(forged)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], json!("Unauthenticated."));
    Ok(())
}

#[tokio::test]
async fn logout_revokes_only_the_presented_token() -> Result<()> {
    let server = common::TestServer::start().await?;
    let token = server.token_for(1);

    let res = server
        .http
        .post(server.url("/api/logout"))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = server
        .http
        .get(server.url("/api/products"))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // Tokens for the same principal minted in the same second are identical
    let other = server.token_for(2);
    let res = server
        .http
        .get(server.url("/api/products"))
        .bearer_auth(other)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}
