//! Remote document store over HTTP (writes) and WebSocket (live queries).
//!
//! Endpoints:
//! - `POST   {base}/collections/{collection}/documents` → `{"id": "..."}`
//! - `PATCH  {base}/collections/{collection}/documents/{id}`
//! - `DELETE {base}/collections/{collection}/documents/{id}`
//! - `GET    {ws}/collections/{collection}/watch?orderBy=..&direction=..`
//!   (WebSocket; every text frame is `{"documents": [...]}`, the full ordered
//!   result set)
//!
//! A watch that ends is not reopened. The subscription reports
//! `is_live() == false` and the caller decides what to do.

use crate::document::{Document, DocumentListener, DocumentStore, Fields, OrderBy};
use crate::subscription::{DeliveryGate, Subscription};
use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use shelf_core::{NoteId, StoreError, StoreOp, StoreResult};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone)]
pub struct RemoteStoreSettings {
    pub base_url: String,
    pub ws_endpoint: String,
    pub request_timeout: Duration,
    pub api_key: Option<String>,
    pub bearer_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InsertResponse {
    id: NoteId,
}

#[derive(Debug, Deserialize)]
struct WatchFrame {
    documents: Vec<Document>,
}

#[derive(Clone)]
pub struct RemoteDocumentStore {
    client: reqwest::Client,
    base_url: Url,
    ws_endpoint: String,
    api_key: Option<String>,
    bearer_token: Option<String>,
}

impl RemoteDocumentStore {
    pub fn new(settings: &RemoteStoreSettings) -> StoreResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .default_headers(auth_headers(settings)?)
            .build()
            .map_err(|err| StoreError::unavailable(err.to_string()))?;
        let base_url = Url::parse(&settings.base_url)
            .map_err(|err| StoreError::unavailable(format!("{}: {}", settings.base_url, err)))?;
        if base_url.cannot_be_a_base() {
            return Err(StoreError::unavailable(format!(
                "{} cannot be used as a base URL",
                settings.base_url
            )));
        }
        Ok(Self {
            client,
            base_url,
            ws_endpoint: settings.ws_endpoint.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            bearer_token: settings.bearer_token.clone(),
        })
    }

    /// `base_url` with `segments` appended, each percent-encoded as one path
    /// segment.
    fn endpoint(&self, segments: &[&str]) -> StoreResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::unavailable(format!("{} has no path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn documents_url(&self, collection: &str) -> StoreResult<Url> {
        self.endpoint(&["collections", collection, "documents"])
    }

    fn document_url(&self, collection: &str, id: &NoteId) -> StoreResult<Url> {
        self.endpoint(&["collections", collection, "documents", id.as_str()])
    }

    fn watch_url(&self, collection: &str, order: &OrderBy) -> String {
        format!(
            "{}/collections/{}/watch?orderBy={}&direction={}",
            self.ws_endpoint,
            collection,
            order.field,
            order.direction.as_str()
        )
    }

    fn watch_request(&self, url: &str) -> StoreResult<http::Request<()>> {
        let mut request = url
            .into_client_request()
            .map_err(|err| StoreError::unavailable(err.to_string()))?;
        let headers = request.headers_mut();
        if let Some(api_key) = &self.api_key {
            let value = http::HeaderValue::from_str(api_key)
                .map_err(|err| StoreError::unavailable(err.to_string()))?;
            headers.insert(http::HeaderName::from_static("x-api-key"), value);
        }
        if let Some(token) = &self.bearer_token {
            let value = http::HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|err| StoreError::unavailable(err.to_string()))?;
            headers.insert(http::header::AUTHORIZATION, value);
        }
        Ok(request)
    }
}

#[async_trait]
impl DocumentStore for RemoteDocumentStore {
    async fn insert(&self, collection: &str, fields: Fields) -> StoreResult<NoteId> {
        let response = self
            .client
            .post(self.documents_url(collection)?)
            .json(&fields)
            .send()
            .await
            .map_err(|err| transport_error(StoreOp::Create, err))?;
        let response = check_status(StoreOp::Create, None, response).await?;
        let body: InsertResponse = response
            .json()
            .await
            .map_err(|err| StoreError::Decode {
                reason: err.to_string(),
            })?;
        Ok(body.id)
    }

    async fn patch(&self, collection: &str, id: &NoteId, fields: Fields) -> StoreResult<()> {
        let response = self
            .client
            .patch(self.document_url(collection, id)?)
            .json(&fields)
            .send()
            .await
            .map_err(|err| transport_error(StoreOp::Update, err))?;
        check_status(StoreOp::Update, Some(id), response).await?;
        Ok(())
    }

    async fn remove(&self, collection: &str, id: &NoteId) -> StoreResult<()> {
        let response = self
            .client
            .delete(self.document_url(collection, id)?)
            .send()
            .await
            .map_err(|err| transport_error(StoreOp::Delete, err))?;
        match check_status(StoreOp::Delete, Some(id), response).await {
            Ok(_) | Err(StoreError::NotFound { .. }) => Ok(()),
            Err(err) => Err(err),
        }
    }

    async fn watch(
        &self,
        collection: &str,
        order: OrderBy,
        listener: DocumentListener,
    ) -> StoreResult<Subscription> {
        let url = self.watch_url(collection, &order);
        let request = self.watch_request(&url)?;
        let (mut stream, _) = tokio_tungstenite::connect_async(request)
            .await
            .map_err(|err| StoreError::unavailable(err.to_string()))?;
        info!(url = %url, "Watch connected");

        let live = Arc::new(AtomicBool::new(true));
        let gate = Arc::new(DeliveryGate::new(live.clone()));
        let task_gate = gate.clone();
        let task = tokio::spawn(async move {
            let mut frames: u64 = 0;
            while let Some(message) = stream.next().await {
                if !task_gate.is_live() {
                    break;
                }
                match message {
                    Ok(Message::Text(text)) => match serde_json::from_str::<WatchFrame>(&text) {
                        Ok(frame) => {
                            frames += 1;
                            debug!(documents = frame.documents.len(), "Watch frame");
                            let documents = frame.documents;
                            task_gate.deliver(frames, || listener(documents));
                        }
                        Err(err) => {
                            warn!(error = %err, "Ignoring undecodable watch frame");
                        }
                    },
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(err) => {
                        error!(error = %err, "Watch stream failed");
                        break;
                    }
                }
            }
            task_gate.close();
            info!("Watch closed");
        });

        Ok(Subscription::new(live, move || {
            gate.drain();
            task.abort();
        }))
    }
}

fn auth_headers(settings: &RemoteStoreSettings) -> StoreResult<HeaderMap> {
    let mut headers = HeaderMap::new();
    if let Some(api_key) = &settings.api_key {
        headers.insert(
            HeaderName::from_static("x-api-key"),
            HeaderValue::from_str(api_key)
                .map_err(|err| StoreError::unavailable(err.to_string()))?,
        );
    }
    if let Some(token) = &settings.bearer_token {
        headers.insert(
            reqwest::header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|err| StoreError::unavailable(err.to_string()))?,
        );
    }
    Ok(headers)
}

fn transport_error(op: StoreOp, err: reqwest::Error) -> StoreError {
    if err.is_connect() || err.is_timeout() {
        StoreError::unavailable(err.to_string())
    } else {
        StoreError::write(op, err.to_string())
    }
}

async fn check_status(
    op: StoreOp,
    id: Option<&NoteId>,
    response: reqwest::Response,
) -> StoreResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(status_error(op, id, status, &body))
}

fn status_error(op: StoreOp, id: Option<&NoteId>, status: StatusCode, body: &str) -> StoreError {
    match (status, id) {
        (StatusCode::NOT_FOUND, Some(id)) => StoreError::NotFound { id: id.clone() },
        (StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN, _) => {
            StoreError::PermissionDenied { op }
        }
        (StatusCode::SERVICE_UNAVAILABLE | StatusCode::BAD_GATEWAY, _) => {
            StoreError::unavailable(format!("HTTP {}", status.as_u16()))
        }
        _ => StoreError::write(op, format!("HTTP {}: {}", status.as_u16(), body)),
    }
}
