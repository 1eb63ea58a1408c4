//! # API Client
//!
//! [`ClientDirectory`] over HTTP, talking to the REST API served by `api-rest`.
//!
//! Status mapping:
//! - `404` becomes [`DirectoryError::NotFound`]
//! - `400`/`422` become [`DirectoryError::Rejected`] with the response `detail`
//! - any other failure status becomes [`DirectoryError::Service`] with the response `detail`
//! - transport failures (refused connections, timeouts, undecodable bodies) become
//!   [`DirectoryError::Network`]

#![warn(rust_2018_idioms)]

use api_shared::{ClientCountRes, ClientSummary, ErrorRes};
use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use therapist_core::{ClientDirectory, ClientPayload, ClientRecord, DirectoryError};

/// Default base URL of the versioned REST API.
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api/v1";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const LIST_PAGE_SIZE: usize = 100;

#[derive(Clone, Debug)]
pub struct HttpClientDirectory {
    http: reqwest::Client,
    base_url: String,
}

impl HttpClientDirectory {
    /// Creates a client for the API rooted at `base_url` (for example
    /// `http://localhost:8000/api/v1`).
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::Network` if the underlying HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self, DirectoryError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| DirectoryError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// One page of the roster, ordered by id.
    pub async fn list_summaries(
        &self,
        skip: usize,
        limit: usize,
    ) -> Result<Vec<ClientSummary>, DirectoryError> {
        let response = self
            .http
            .get(self.url("/clients"))
            .query(&[("skip", skip), ("limit", limit)])
            .send()
            .await
            .map_err(network_error)?;
        decode(response).await
    }

    pub async fn get_client_by_uuid(&self, uuid: &str) -> Result<ClientRecord, DirectoryError> {
        let response = self
            .http
            .get(self.url(&format!("/clients/uuid/{uuid}")))
            .send()
            .await
            .map_err(network_error)?;
        decode(response).await
    }

    pub async fn delete_client(&self, id: u64) -> Result<(), DirectoryError> {
        let response = self
            .http
            .delete(self.url(&format!("/clients/{id}")))
            .send()
            .await
            .map_err(network_error)?;
        check_status(response).await.map(|_| ())
    }

    pub async fn count_clients(&self) -> Result<u64, DirectoryError> {
        let response = self
            .http
            .get(self.url("/clients/stats/count"))
            .send()
            .await
            .map_err(network_error)?;
        let count: ClientCountRes = decode(response).await?;
        Ok(count.total_clients)
    }
}

#[async_trait]
impl ClientDirectory for HttpClientDirectory {
    async fn create_client(&self, payload: &ClientPayload) -> Result<ClientRecord, DirectoryError> {
        let response = self
            .http
            .post(self.url("/clients"))
            .json(payload)
            .send()
            .await
            .map_err(network_error)?;
        decode(response).await
    }

    async fn update_client(
        &self,
        id: u64,
        payload: &ClientPayload,
    ) -> Result<ClientRecord, DirectoryError> {
        let response = self
            .http
            .put(self.url(&format!("/clients/{id}")))
            .json(payload)
            .send()
            .await
            .map_err(network_error)?;
        decode(response).await
    }

    async fn get_client(&self, id: u64) -> Result<ClientRecord, DirectoryError> {
        let response = self
            .http
            .get(self.url(&format!("/clients/{id}")))
            .send()
            .await
            .map_err(network_error)?;
        decode(response).await
    }

    /// The list endpoint returns summaries, so each full record is fetched separately.
    async fn list_clients(&self) -> Result<Vec<ClientRecord>, DirectoryError> {
        let mut summaries = Vec::new();
        loop {
            let page = self.list_summaries(summaries.len(), LIST_PAGE_SIZE).await?;
            let done = page.len() < LIST_PAGE_SIZE;
            summaries.extend(page);
            if done {
                break;
            }
        }

        let mut records = Vec::with_capacity(summaries.len());
        for summary in summaries {
            match self.get_client(summary.id).await {
                Ok(record) => records.push(record),
                // Deleted between the list and the fetch.
                Err(DirectoryError::NotFound) => {
                    tracing::warn!("client {} disappeared while listing", summary.id);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(records)
    }
}

fn network_error(err: reqwest::Error) -> DirectoryError {
    tracing::error!("directory request failed: {}", err);
    DirectoryError::Network(err.to_string())
}

/// Passes successful responses through and turns failure statuses into directory errors.
async fn check_status(response: Response) -> Result<Response, DirectoryError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<ErrorRes>(&body)
        .map(|e| e.detail)
        .unwrap_or_else(|_| {
            status
                .canonical_reason()
                .map(str::to_string)
                .unwrap_or_else(|| status.to_string())
        });

    tracing::warn!("directory returned {}: {}", status, detail);
    Err(match status {
        StatusCode::NOT_FOUND => DirectoryError::NotFound,
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            DirectoryError::Rejected(detail)
        }
        _ => DirectoryError::Service(detail),
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, DirectoryError> {
    check_status(response)
        .await?
        .json::<T>()
        .await
        .map_err(network_error)
}
