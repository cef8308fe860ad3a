#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{http::header, response::IntoResponse, routing::post, Json, Router};
use reqwest::{header::SET_COOKIE, Response};
use serde_json::{json, Value};

use notebook_api::config::AppConfig;
use notebook_api::database::MemoryStore;
use notebook_api::{app, AppState};

pub const TEST_SECRET: &str = "integration-test-secret";
pub const PASSWORD: &str = "correct horse battery";

/// The full router served on a free local port, backed by the in-memory store
pub struct TestApp {
    pub base_url: String,
    pub client: reqwest::Client,
    pub state: AppState,
}

impl TestApp {
    pub async fn spawn() -> Result<Self> {
        // Nothing listens here; only export tests need a live upstream.
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        Self::spawn_with_export(&format!("http://127.0.0.1:{}", port)).await
    }

    pub async fn spawn_with_export(export_base_url: &str) -> Result<Self> {
        let mut config = AppConfig::development().with_jwt_secret(TEST_SECRET);
        config.export.base_url = export_base_url.to_string();
        config.export.timeout_secs = 5;

        let state = AppState::new(config, Arc::new(MemoryStore::new()))?;
        let base_url = serve(app(state.clone())).await?;

        Ok(Self {
            base_url,
            client: reqwest::Client::new(),
            state,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn register(&self, username: &str, password: &str) -> Result<Response> {
        Ok(self
            .client
            .post(self.url("/register"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await?)
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<Response> {
        Ok(self
            .client
            .post(self.url("/login"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await?)
    }

    /// Register and log in; returns `(user_id, access_token)`.
    pub async fn signup(&self, username: &str) -> Result<(String, String)> {
        let res = self.register(username, PASSWORD).await?;
        anyhow::ensure!(res.status() == 201, "register failed: {}", res.status());
        let body: Value = res.json().await?;
        let user_id = body["data"]["id"].as_str().context("missing id")?.to_string();

        let res = self.login(username, PASSWORD).await?;
        anyhow::ensure!(res.status() == 200, "login failed: {}", res.status());
        let body: Value = res.json().await?;
        let token = body["data"]["access_token"]
            .as_str()
            .context("missing access_token")?
            .to_string();

        Ok((user_id, token))
    }

    pub async fn get(&self, token: &str, path: &str) -> Result<Response> {
        Ok(self.client.get(self.url(path)).bearer_auth(token).send().await?)
    }

    pub async fn post(&self, token: &str, path: &str, body: Value) -> Result<Response> {
        Ok(self
            .client
            .post(self.url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?)
    }

    pub async fn put(&self, token: &str, path: &str, body: Value) -> Result<Response> {
        Ok(self
            .client
            .put(self.url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?)
    }

    pub async fn delete(&self, token: &str, path: &str) -> Result<Response> {
        Ok(self.client.delete(self.url(path)).bearer_auth(token).send().await?)
    }

    /// Create a notebook and return its id.
    pub async fn create_notebook(&self, token: &str, name: &str) -> Result<String> {
        let res = self.post(token, "/notebooks", json!({ "name": name })).await?;
        anyhow::ensure!(res.status() == 201, "create notebook failed: {}", res.status());
        let body: Value = res.json().await?;
        Ok(body["data"]["id"].as_str().context("missing id")?.to_string())
    }

    /// Create a note and return its id.
    pub async fn create_note(&self, token: &str, notebook_id: &str, title: &str) -> Result<String> {
        let res = self
            .post(
                token,
                "/notes",
                json!({ "title": title, "content": format!("body of {}", title), "notebook_id": notebook_id }),
            )
            .await?;
        anyhow::ensure!(res.status() == 201, "create note failed: {}", res.status());
        let body: Value = res.json().await?;
        Ok(body["data"]["id"].as_str().context("missing id")?.to_string())
    }
}

/// Serve `router` on a free port and return its base URL.
async fn serve(router: Router) -> Result<String> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .context("failed to bind test listener")?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    Ok(format!("http://127.0.0.1:{}", port))
}

/// Stand-in for the PDF service. Echoes what it was asked to render so tests
/// can check the relayed body.
pub async fn spawn_export_stub() -> Result<String> {
    async fn notebook(Json(body): Json<Value>) -> impl IntoResponse {
        let name = body["notebook_name"].as_str().unwrap_or_default().to_string();
        let count = body["notes"].as_array().map(|n| n.len()).unwrap_or_default();
        (
            [
                (header::CONTENT_TYPE, "application/pdf"),
                (header::CONTENT_DISPOSITION, "attachment; filename=notebook.pdf"),
            ],
            format!("%PDF-stub {} {}", name, count),
        )
    }

    async fn note(Json(body): Json<Value>) -> impl IntoResponse {
        let title = body["title"].as_str().unwrap_or_default().to_string();
        (
            [
                (header::CONTENT_TYPE, "application/pdf"),
                (header::CONTENT_DISPOSITION, "attachment; filename=note.pdf"),
            ],
            format!("%PDF-stub {}", title),
        )
    }

    let router = Router::new()
        .route("/export/notebook", post(notebook))
        .route("/export/note", post(note));
    serve(router).await
}

/// Value of the `name` cookie from the response's `Set-Cookie` headers, with its attributes.
pub fn set_cookie(res: &Response, name: &str) -> Option<String> {
    res.headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with(&format!("{}=", name)))
        .map(str::to_string)
}

/// Just the value part of a `Set-Cookie` header line.
pub fn cookie_value(set_cookie: &str) -> &str {
    set_cookie
        .split(';')
        .next()
        .and_then(|pair| pair.split_once('='))
        .map(|(_, value)| value)
        .unwrap_or_default()
}
