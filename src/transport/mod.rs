//! Outbound requests: the strategies a load walks through and the HTTP seam
//! they are sent over.

pub mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::TransportError;
use crate::input;

pub use http::ReqwestClient;

pub const FHIR_JSON: &str = "application/fhir+json";
pub const JSON: &str = "application/json";

/// A single GET to issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub url: Url,
    /// Acceptable media types, most preferred first.
    pub accept: Vec<&'static str>,
}

impl FetchRequest {
    pub fn accept_header(&self) -> String {
        self.accept.join(", ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub reason: Option<String>,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            reason: None,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Network access used by the loader. Implementations report transport-level
/// failures only; any HTTP status is a successful response here.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn get(&self, request: &FetchRequest) -> Result<RawResponse, TransportError>;
}

/// How to reach a target URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TransportStrategy {
    /// Request the target itself.
    Direct,
    /// Request the target through a relay that takes it as a query parameter.
    Relay {
        endpoint: Url,
        #[serde(default = "default_relay_param")]
        param: String,
    },
}

fn default_relay_param() -> String {
    input::LINK_PARAM.to_string()
}

impl TransportStrategy {
    pub fn relay(endpoint: Url) -> Self {
        TransportStrategy::Relay {
            endpoint,
            param: default_relay_param(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TransportStrategy::Direct => "direct",
            TransportStrategy::Relay { .. } => "relay",
        }
    }

    pub fn request_for(&self, target: &Url) -> FetchRequest {
        let target = input::with_json_format(target);
        match self {
            TransportStrategy::Direct => FetchRequest {
                url: target,
                accept: vec![FHIR_JSON, JSON],
            },
            TransportStrategy::Relay { endpoint, param } => FetchRequest {
                url: input::relay_url(endpoint, param, &target),
                accept: vec![JSON],
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_request() {
        let target = Url::parse("https://example.org/metadata").unwrap();
        let request = TransportStrategy::Direct.request_for(&target);
        assert_eq!(request.url.as_str(), "https://example.org/metadata?_format=json");
        assert_eq!(
            request.accept_header(),
            "application/fhir+json, application/json"
        );
    }

    #[test]
    fn test_relay_request() {
        let target = Url::parse("https://example.org/fhir/metadata?a=1").unwrap();
        let strategy = TransportStrategy::relay(Url::parse("https://relay.example/raw").unwrap());
        let request = strategy.request_for(&target);
        assert_eq!(
            request.url.as_str(),
            "https://relay.example/raw?url=https%3A%2F%2Fexample.org%2Ffhir%2Fmetadata%3Fa%3D1%26_format%3Djson"
        );
        assert_eq!(request.accept_header(), "application/json");
    }

    #[test]
    fn test_strategy_serde() {
        let strategies: Vec<TransportStrategy> = serde_json::from_str(
            r#"[{"type": "direct"}, {"type": "relay", "endpoint": "https://relay.example/raw"}]"#,
        )
        .unwrap();
        assert_eq!(strategies[0], TransportStrategy::Direct);
        assert_eq!(
            strategies[1],
            TransportStrategy::relay(Url::parse("https://relay.example/raw").unwrap())
        );
    }

    #[test]
    fn test_status_range() {
        assert!(RawResponse::new(200, "").is_success());
        assert!(RawResponse::new(204, "").is_success());
        assert!(!RawResponse::new(304, "").is_success());
        assert!(!RawResponse::new(404, "").is_success());
    }
}
