use std::sync::Arc;

use url::Url;

use crate::core::types::{AttemptFailure, select_failure};
use crate::core::{LoadResult, LoaderConfig};
use crate::error::{HttpStatus, LoadFailure, Result};
use crate::input;
use crate::model::CapabilityStatement;
use crate::transport::{HttpClient, RawResponse, ReqwestClient, TransportStrategy};

/// Turns a user-entered URL into a validated CapabilityStatement or a
/// classified failure.
pub struct CapabilityLoader {
    client: Arc<dyn HttpClient>,
    strategies: Vec<TransportStrategy>,
}

impl CapabilityLoader {
    /// Loader over a reqwest client built from `config`.
    pub fn new(config: &LoaderConfig) -> Result<Self> {
        config.validate()?;
        let client = ReqwestClient::new(&config.user_agent, config.timeout())?;
        Ok(Self::with_client(Arc::new(client), config.strategies.clone()))
    }

    pub fn with_client(client: Arc<dyn HttpClient>, strategies: Vec<TransportStrategy>) -> Self {
        Self { client, strategies }
    }

    pub fn strategies(&self) -> &[TransportStrategy] {
        &self.strategies
    }

    /// Load the CapabilityStatement at `input`. Always returns a terminal
    /// result; an unparseable input fails without touching the network.
    pub async fn load(&self, input: &str) -> LoadResult {
        let target = match input::parse_target_url(input) {
            Ok(url) => url,
            Err(err) => {
                tracing::info!("Rejected load input {:?}: {}", input, err);
                return LoadResult::Failure(LoadFailure::invalid_input(input.trim(), &err));
            }
        };

        let mut attempts = Vec::with_capacity(self.strategies.len());
        for strategy in &self.strategies {
            match self.attempt(strategy, &target).await {
                Ok(doc) => {
                    tracing::info!(
                        "Loaded CapabilityStatement from {} via {} (FHIR {})",
                        target,
                        strategy.name(),
                        doc.fhir_version()
                    );
                    return LoadResult::Success(doc);
                }
                Err(failure) => {
                    tracing::warn!(
                        "{} request for {} failed: {}",
                        strategy.name(),
                        target,
                        failure.kind
                    );
                    let fall_through = failure.kind.allows_fallback();
                    attempts.push(AttemptFailure {
                        strategy: strategy.name(),
                        failure,
                    });
                    if !fall_through {
                        break;
                    }
                }
            }
        }

        let failure = select_failure(attempts);
        tracing::info!("Loading {} failed: {}", target, failure.kind);
        LoadResult::Failure(failure)
    }

    async fn attempt(
        &self,
        strategy: &TransportStrategy,
        target: &Url,
    ) -> std::result::Result<CapabilityStatement, LoadFailure> {
        let request = strategy.request_for(target);
        tracing::debug!(
            "Requesting {} via {} (Accept: {})",
            request.url,
            strategy.name(),
            request.accept_header()
        );

        let response = self
            .client
            .get(&request)
            .await
            .map_err(|err| LoadFailure::network(target.as_str(), &err))?;

        interpret(target.as_str(), response)
    }
}

impl std::fmt::Debug for CapabilityLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilityLoader")
            .field("strategies", &self.strategies)
            .finish_non_exhaustive()
    }
}

/// Classify a response: status, then JSON syntax, then the
/// CapabilityStatement presence rules.
pub fn interpret(
    url: &str,
    response: RawResponse,
) -> std::result::Result<CapabilityStatement, LoadFailure> {
    if !response.is_success() {
        return Err(LoadFailure::http(
            url,
            HttpStatus {
                code: response.status,
                reason: response.reason,
            },
        ));
    }

    let value: serde_json::Value = match serde_json::from_str(&response.body) {
        Ok(value) => value,
        Err(err) if looks_like_html(&response.body) => {
            tracing::debug!("Response from {} is HTML: {}", url, err);
            return Err(LoadFailure::unexpected_html(url));
        }
        Err(err) => return Err(LoadFailure::invalid_json(url, &err)),
    };

    CapabilityStatement::from_value(value).map_err(|err| LoadFailure::schema_mismatch(url, &err))
}

/// True when the body carries an `<html` tag or a doctype declaration.
pub fn looks_like_html(body: &str) -> bool {
    let lower = body.to_ascii_lowercase();
    lower.contains("<html") || lower.contains("<!doctype")
}
