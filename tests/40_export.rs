mod common;

use anyhow::Result;
use reqwest::{header, StatusCode};
use serde_json::Value;

use common::{spawn_export_stub, TestApp};

#[tokio::test]
async fn notebook_export_relays_pdf() -> Result<()> {
    let export = spawn_export_stub().await?;
    let app = TestApp::spawn_with_export(&export).await?;
    let (_, token) = app.signup("alice").await?;
    let notebook = app.create_notebook(&token, "Recipes").await?;
    for title in ["Bread", "Soup", "Pie"] {
        app.create_note(&token, &notebook, title).await?;
    }

    let res = app
        .client
        .post(app.url(&format!("/notebooks/{}/export", notebook)))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()[header::CONTENT_TYPE], "application/pdf");
    assert_eq!(
        res.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=notebook.pdf"
    );
    assert_eq!(res.text().await?, "%PDF-stub Recipes 3");
    Ok(())
}

#[tokio::test]
async fn note_export_relays_pdf() -> Result<()> {
    let export = spawn_export_stub().await?;
    let app = TestApp::spawn_with_export(&export).await?;
    let (_, token) = app.signup("alice").await?;
    let notebook = app.create_notebook(&token, "Recipes").await?;
    let note = app.create_note(&token, &notebook, "Bread").await?;

    let res = app
        .client
        .post(app.url(&format!("/notes/{}/export", note)))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()[header::CONTENT_TYPE], "application/pdf");
    assert_eq!(res.text().await?, "%PDF-stub Bread");
    Ok(())
}

#[tokio::test]
async fn export_of_foreign_notebook_is_not_found() -> Result<()> {
    let export = spawn_export_stub().await?;
    let app = TestApp::spawn_with_export(&export).await?;
    let (_, alice) = app.signup("alice").await?;
    let (_, bob) = app.signup("bob").await?;
    let notebook = app.create_notebook(&alice, "Private").await?;
    let note = app.create_note(&alice, &notebook, "secret").await?;

    let res = app
        .client
        .post(app.url(&format!("/notebooks/{}/export", notebook)))
        .bearer_auth(&bob)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = app
        .client
        .post(app.url(&format!("/notes/{}/export", note)))
        .bearer_auth(&bob)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn unreachable_export_service_is_bad_gateway() -> Result<()> {
    // Default test app points at a port nobody listens on.
    let app = TestApp::spawn().await?;
    let (_, token) = app.signup("alice").await?;
    let notebook = app.create_notebook(&token, "Offline").await?;

    let res = app
        .client
        .post(app.url(&format!("/notebooks/{}/export", notebook)))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    let body: Value = res.json().await?;
    assert_eq!(body["error"], "Export service unavailable");
    assert_eq!(body["code"], "BAD_GATEWAY");
    Ok(())
}
