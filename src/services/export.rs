//! Client for the external PDF rendering service.
//!
//! The service is called with already-authorised data only; this module never
//! looks at ownership.

use axum::body::Bytes;
use reqwest::{header::CONTENT_DISPOSITION, Client, StatusCode};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error};
use url::Url;

use crate::config::{ConfigError, ExportConfig};
use crate::database::models::{Note, Notebook};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("export request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("export service returned {0}")]
    Upstream(StatusCode),

    #[error("invalid export endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
}

#[derive(Debug, Serialize)]
struct NotePayload<'a> {
    title: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct NotebookPayload<'a> {
    notebook_name: &'a str,
    notes: Vec<NotePayload<'a>>,
}

/// A rendered document as returned by the export service
#[derive(Debug, Clone)]
pub struct ExportedPdf {
    pub bytes: Bytes,
    pub content_disposition: String,
}

#[derive(Clone)]
pub struct ExportClient {
    http: Client,
    base_url: Url,
}

impl ExportClient {
    pub fn new(config: &ExportConfig) -> Result<Self, ConfigError> {
        let mut base_url = Url::parse(&config.base_url).map_err(|_| ConfigError::InvalidValue {
            name: "EXPORT_SERVICE_URL",
            value: config.base_url.clone(),
        })?;
        // `join` replaces the last segment unless the base ends with a slash.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self { http, base_url })
    }

    pub async fn export_notebook(&self, notebook: &Notebook, notes: &[Note]) -> Result<ExportedPdf, ExportError> {
        let payload = NotebookPayload {
            notebook_name: &notebook.name,
            notes: notes
                .iter()
                .map(|n| NotePayload {
                    title: &n.title,
                    content: &n.content,
                })
                .collect(),
        };
        self.render("export/notebook", &payload, "notebook.pdf").await
    }

    pub async fn export_note(&self, note: &Note) -> Result<ExportedPdf, ExportError> {
        let payload = NotePayload {
            title: &note.title,
            content: &note.content,
        };
        self.render("export/note", &payload, "note.pdf").await
    }

    async fn render<T: Serialize>(
        &self,
        endpoint: &str,
        payload: &T,
        fallback_filename: &str,
    ) -> Result<ExportedPdf, ExportError> {
        let url = self.base_url.join(endpoint)?;
        debug!("Requesting export from {}", url);

        let response = self.http.post(url).json(payload).send().await?;

        let status = response.status();
        if !status.is_success() {
            error!("Export service responded with {}", status);
            return Err(ExportError::Upstream(status));
        }

        let content_disposition = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .unwrap_or_else(|| format!("attachment; filename={}", fallback_filename));

        let bytes = response.bytes().await?;
        Ok(ExportedPdf {
            bytes,
            content_disposition,
        })
    }
}
