use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;

use super::{FetchRequest, HttpClient, RawResponse};
use crate::error::{CapabilityError, Result, TransportError};

/// [`HttpClient`] backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    pub fn new(user_agent: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(user_agent);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().map_err(|e| CapabilityError::Client {
            message: e.to_string(),
        })?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn get(&self, request: &FetchRequest) -> std::result::Result<RawResponse, TransportError> {
        let response = self
            .client
            .get(request.url.clone())
            .header(ACCEPT, request.accept_header())
            .send()
            .await
            .map_err(|e| TransportError::with_source(format!("request failed: {e}"), e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::with_source(format!("failed to read response body: {e}"), e))?;

        Ok(RawResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().map(str::to_string),
            body,
        })
    }
}
