mod common;

use anyhow::Result;
use serde_json::json;

use catalog_api::client::sync::DELETE_FAILED;
use catalog_api::client::{CatalogApi, Credential, RemoveOutcome, SyncError, View};

#[tokio::test]
async fn load_reflects_server_after_every_write() -> Result<()> {
    let server = common::TestServer::start().await?;
    let (mut sync, _) = server.sync_for(1);

    sync.load().await?;
    assert!(sync.products().is_empty());
    assert!(!sync.is_loading());

    let draft = sync.draft_mut();
    draft.name = "Widget".into();
    draft.price = "5".into();
    let saved = sync.submit_draft().await?;

    assert_eq!(saved.price, 5.0);
    assert_eq!(saved.owner_id, 1);
    assert!(sync.draft().is_empty());
    assert_eq!(sync.products().len(), 1);
    assert_eq!(sync.products()[0].display_price(), "$5.00");
    assert_eq!(sync.products()[0].display_description(), "N/A");
    Ok(())
}

#[tokio::test]
async fn edit_round_trip_updates_existing_row() -> Result<()> {
    let server = common::TestServer::start().await?;
    let id = server
        .create_product(1, json!({"name": "Old", "description": "d", "price": 12.5}))
        .await?;
    let (mut sync, _) = server.sync_for(1);
    sync.load().await?;

    let existing = sync.products()[0].clone();
    sync.begin_edit(&existing);
    assert_eq!(sync.editing_id(), Some(id));
    assert_eq!(sync.draft().price, "12.5");

    sync.draft_mut().name = "New".into();
    sync.submit_draft().await?;

    assert_eq!(sync.editing_id(), None);
    assert_eq!(sync.products().len(), 1);
    assert_eq!(sync.products()[0].name, "New");
    assert_eq!(sync.products()[0].description.as_deref(), Some("d"));
    Ok(())
}

#[tokio::test]
async fn server_validation_message_is_surfaced_and_draft_kept() -> Result<()> {
    let server = common::TestServer::start().await?;
    let (mut sync, _) = server.sync_for(1);

    sync.draft_mut().price = "10".into();
    let err = sync.submit_draft().await.unwrap_err();

    assert!(matches!(err, SyncError::Failed { .. }));
    assert_eq!(sync.error(), Some("The name field is required."));
    assert_eq!(sync.draft().price, "10");
    Ok(())
}

#[tokio::test]
async fn non_owner_edit_is_rejected_by_server() -> Result<()> {
    let server = common::TestServer::start().await?;
    server.create_product(1, json!({"name": "Mine", "price": 3})).await?;
    let (mut sync, _) = server.sync_for(2);
    sync.load().await?;

    let theirs = sync.products()[0].clone();
    sync.begin_edit(&theirs);
    sync.draft_mut().name = "Stolen".into();
    assert!(sync.submit_draft().await.is_err());
    assert_eq!(sync.error(), Some("This action is unauthorized."));

    let removed = sync.remove(theirs.id, &mut |_: &str| true).await;
    assert!(removed.is_err());
    assert_eq!(sync.error(), Some(DELETE_FAILED));

    sync.load().await?;
    assert_eq!(sync.products()[0].name, "Mine");
    Ok(())
}

#[tokio::test]
async fn confirmed_remove_deletes_declined_does_not() -> Result<()> {
    let server = common::TestServer::start().await?;
    let id = server.create_product(1, json!({"name": "Temp", "price": 1})).await?;
    let (mut sync, _) = server.sync_for(1);
    sync.load().await?;

    let outcome = sync.remove(id, &mut |_: &str| false).await?;
    assert_eq!(outcome, RemoveOutcome::Cancelled);
    assert_eq!(sync.products().len(), 1);

    let outcome = sync.remove(id, &mut |_: &str| true).await?;
    assert_eq!(outcome, RemoveOutcome::Deleted);
    assert!(sync.products().is_empty());
    Ok(())
}

#[tokio::test]
async fn revoked_credential_sends_user_to_login() -> Result<()> {
    let server = common::TestServer::start().await?;
    server.create_product(1, json!({"name": "A", "price": 1})).await?;
    let (mut sync, store) = server.sync_for(1);
    sync.load().await?;
    assert_eq!(sync.products().len(), 1);

    // Revoke the same token from outside the synchronizer
    let token = store.current().expect("token");
    server.client().logout(&Credential::new(token)).await?;

    let err = sync.load().await.unwrap_err();
    assert!(matches!(err, SyncError::SessionExpired));
    assert_eq!(sync.view(), View::Login);
    assert!(sync.products().is_empty());
    assert_eq!(store.current(), None);
    Ok(())
}

#[tokio::test]
async fn logout_clears_session_after_server_accepts() -> Result<()> {
    let server = common::TestServer::start().await?;
    let (mut sync, store) = server.sync_for(1);
    let client = server.client();

    catalog_api::client::session::logout(&client, sync.session_mut()).await?;

    assert!(!sync.session().is_signed_in());
    assert_eq!(store.current(), None);
    assert!(matches!(sync.load().await, Err(SyncError::SessionExpired)));
    Ok(())
}
