//! HTTP client abstraction for the configuration API

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{ConfigEditorError, Result};
use crate::values::AttributeMap;

/// HTTP response from a request
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Abstraction over HTTP client for dependency injection
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait HttpClient: Send + Sync {
    /// Send a GET request to the given URL
    async fn get(&self, url: &str) -> Result<HttpResponse>;

    /// Send a POST request with a JSON body
    async fn post_json(&self, url: &str, body: &Value) -> Result<HttpResponse>;
}

/// Production HTTP client using reqwest
#[derive(Default)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigEditorError::Http(format!("Building HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(&self, url: &str) -> Result<HttpResponse> {
        tracing::debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ConfigEditorError::Http(format!("GET {} failed: {}", url, e)))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ConfigEditorError::Http(format!("Reading response body: {}", e)))?;

        tracing::debug!("GET {} -> {} ({} bytes)", url, status, body.len());
        Ok(HttpResponse { status, body })
    }

    async fn post_json(&self, url: &str, body: &Value) -> Result<HttpResponse> {
        tracing::debug!("POST {}", url);
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| ConfigEditorError::Http(format!("POST {} failed: {}", url, e)))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ConfigEditorError::Http(format!("Reading response body: {}", e)))?;

        tracing::debug!("POST {} -> {} ({} bytes)", url, status, body.len());
        Ok(HttpResponse { status, body })
    }
}

/// Body of a list endpoint: the server's envelope or a bare array
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListResponse {
    Envelope {
        success: bool,
        #[serde(default)]
        data: Vec<AttributeMap>,
        #[serde(default)]
        errormessage: Option<String>,
    },
    Bare(Vec<AttributeMap>),
}

/// Decode a list response into records
pub fn parse_list_response(response: &HttpResponse) -> Result<Vec<AttributeMap>> {
    let parsed = serde_json::from_str::<ListResponse>(&response.body);

    if !response.is_success() {
        let message = match parsed {
            Ok(ListResponse::Envelope {
                errormessage: Some(message),
                ..
            }) => message,
            _ => response.body.clone(),
        };
        return Err(ConfigEditorError::Api {
            status: response.status,
            message,
        });
    }

    match parsed? {
        ListResponse::Envelope { success: true, data, .. } => Ok(data),
        ListResponse::Envelope { errormessage, .. } => Err(ConfigEditorError::Api {
            status: response.status,
            message: errormessage.unwrap_or_else(|| "request was not successful".to_string()),
        }),
        ListResponse::Bare(records) => Ok(records),
    }
}

/// Fetch and decode the records of a list endpoint
pub async fn fetch_list(http: &dyn HttpClient, url: &str) -> Result<Vec<AttributeMap>> {
    let response = http.get(url).await?;
    let records = parse_list_response(&response)?;
    tracing::debug!("Fetched {} records from {}", records.len(), url);
    Ok(records)
}
