use async_trait::async_trait;
use fhir_capability_viewer::{
    CapabilityLoader, FetchRequest, HttpClient, RawResponse, TransportError, TransportStrategy,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;

#[allow(dead_code)]
pub const RELAY: &str = "https://relay.test/raw";

#[allow(dead_code)]
#[derive(Debug, Clone)]
pub enum Reply {
    Response(RawResponse),
    NetworkError(String),
    Delayed(Duration, Box<Reply>),
}

#[allow(dead_code)]
impl Reply {
    pub fn ok(body: &str) -> Self {
        Reply::Response(RawResponse::new(200, body))
    }

    pub fn status(code: u16, reason: &str, body: &str) -> Self {
        Reply::Response(RawResponse {
            status: code,
            reason: Some(reason.to_string()),
            body: body.to_string(),
        })
    }

    pub fn network(message: &str) -> Self {
        Reply::NetworkError(message.to_string())
    }

    pub fn after(self, delay: Duration) -> Self {
        Reply::Delayed(delay, Box::new(self))
    }
}

/// Scripted [`HttpClient`]: answers by URL prefix and records every request.
#[allow(dead_code)]
#[derive(Debug, Default)]
pub struct MockClient {
    routes: Vec<(String, Reply)>,
    requests: Mutex<Vec<FetchRequest>>,
}

#[allow(dead_code)]
impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, prefix: &str, reply: Reply) -> Self {
        self.routes.push((prefix.to_string(), reply));
        self
    }

    pub fn relay(self, reply: Reply) -> Self {
        self.route(RELAY, reply)
    }

    pub fn requests(&self) -> Vec<FetchRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl HttpClient for MockClient {
    async fn get(&self, request: &FetchRequest) -> Result<RawResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());

        let mut reply = self
            .routes
            .iter()
            .find(|(prefix, _)| request.url.as_str().starts_with(prefix.as_str()))
            .map(|(_, reply)| reply.clone())
            .unwrap_or_else(|| Reply::network("no route"));

        loop {
            match reply {
                Reply::Delayed(delay, inner) => {
                    tokio::time::sleep(delay).await;
                    reply = *inner;
                }
                Reply::Response(response) => return Ok(response),
                Reply::NetworkError(message) => return Err(TransportError::new(message)),
            }
        }
    }
}

#[allow(dead_code)]
pub fn default_strategies() -> Vec<TransportStrategy> {
    vec![
        TransportStrategy::Direct,
        TransportStrategy::relay(Url::parse(RELAY).unwrap()),
    ]
}

#[allow(dead_code)]
pub fn loader_with(client: &Arc<MockClient>) -> CapabilityLoader {
    CapabilityLoader::with_client(client.clone(), default_strategies())
}

#[allow(dead_code)]
pub fn capability_statement(name: &str) -> String {
    format!(r#"{{"resourceType":"CapabilityStatement","fhirVersion":"4.0.1","name":"{name}"}}"#)
}

#[allow(dead_code)]
pub fn hapi_like_statement() -> serde_json::Value {
    serde_json::json!({
        "resourceType": "CapabilityStatement",
        "id": "hapi",
        "name": "RestServer",
        "title": "HAPI FHIR Server",
        "status": "active",
        "date": "2024-03-05T10:15:00+01:00",
        "publisher": "Not provided",
        "kind": "instance",
        "software": {"name": "HAPI FHIR Server", "version": "7.0.0"},
        "implementation": {"description": "HAPI FHIR R4 Server", "url": "https://hapi.fhir.org/baseR4"},
        "fhirVersion": "4.0.1",
        "format": ["application/fhir+xml", "xml", "application/fhir+json", "json"],
        "contact": [{"name": "Support", "telecom": [{"system": "email", "value": "support@example.org"}]}],
        "rest": [{
            "mode": "server",
            "security": {
                "cors": true,
                "service": [{"coding": [{"system": "http://terminology.hl7.org/CodeSystem/restful-security-service", "code": "SMART-on-FHIR", "display": "SMART-on-FHIR"}]}],
                "description": "OAuth2 using SMART-on-FHIR profile"
            },
            "resource": [
                {
                    "type": "Patient",
                    "profile": "http://hl7.org/fhir/StructureDefinition/Patient",
                    "interaction": [{"code": "search-type"}, {"code": "read"}, {"code": "$custom"}, {"code": "create"}],
                    "searchParam": [
                        {"name": "name", "type": "string"},
                        {"name": "birthdate", "type": "date", "documentation": "The patient's date of birth"}
                    ],
                    "operation": [{"name": "everything", "definition": "http://hl7.org/fhir/OperationDefinition/Patient-everything"}]
                },
                {
                    "type": "Observation",
                    "interaction": [{"code": "read"}, {"code": "vread"}]
                }
            ],
            "interaction": [{"code": "transaction"}],
            "searchParam": [{"name": "_lastUpdated", "type": "date"}],
            "operation": [{"name": "export", "definition": "http://hl7.org/fhir/uv/bulkdata/OperationDefinition/export"}]
        }]
    })
}
