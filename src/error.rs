use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CapabilityError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("HTTP client error: {message}")]
    Client { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CapabilityError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

/// Classification of a failed load. Stable across releases; the message that
/// accompanies it is advisory prose and may change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureKind {
    InvalidInput,
    NetworkFailure,
    HttpError,
    UnexpectedHtmlResponse,
    InvalidJson,
    SchemaMismatch,
}

impl FailureKind {
    /// How far a request got before failing. Used to pick the failure worth
    /// reporting when every strategy failed.
    pub(crate) fn rank(self) -> u8 {
        match self {
            FailureKind::InvalidInput => 0,
            FailureKind::NetworkFailure => 1,
            FailureKind::HttpError => 2,
            FailureKind::UnexpectedHtmlResponse | FailureKind::InvalidJson => 3,
            FailureKind::SchemaMismatch => 4,
        }
    }

    /// Whether the next transport strategy should be tried after this
    /// failure. A response that parsed but is not a CapabilityStatement ends
    /// the load.
    pub fn allows_fallback(self) -> bool {
        matches!(
            self,
            FailureKind::NetworkFailure
                | FailureKind::HttpError
                | FailureKind::UnexpectedHtmlResponse
                | FailureKind::InvalidJson
        )
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FailureKind::InvalidInput => "InvalidInput",
            FailureKind::NetworkFailure => "NetworkFailure",
            FailureKind::HttpError => "HttpError",
            FailureKind::UnexpectedHtmlResponse => "UnexpectedHtmlResponse",
            FailureKind::InvalidJson => "InvalidJson",
            FailureKind::SchemaMismatch => "SchemaMismatch",
        };
        f.write_str(name)
    }
}

/// HTTP status carried by [`FailureKind::HttpError`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpStatus {
    pub code: u16,
    pub reason: Option<String>,
}

impl std::fmt::Display for HttpStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.reason {
            Some(reason) => write!(f, "{} {}", self.code, reason),
            None => write!(f, "{}", self.code),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct LoadFailure {
    pub kind: FailureKind,
    pub message: String,
    pub status: Option<HttpStatus>,
}

impl LoadFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
        }
    }

    pub fn with_status(mut self, status: HttpStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn invalid_input(input: &str, reason: &InputError) -> Self {
        Self::new(
            FailureKind::InvalidInput,
            format!(
                "'{input}' is not a valid URL ({reason}). Enter the full address of the \
                 server's metadata endpoint, for example https://hapi.fhir.org/baseR4/metadata."
            ),
        )
    }

    pub fn network(url: &str, error: &TransportError) -> Self {
        Self::new(
            FailureKind::NetworkFailure,
            format!(
                "Could not reach {url} ({error}). The server may be offline, it may not allow \
                 cross-origin requests (CORS), or the URL may be wrong. Check your connection \
                 and the URL, then try again."
            ),
        )
    }

    pub fn http(url: &str, status: HttpStatus) -> Self {
        Self::new(
            FailureKind::HttpError,
            format!(
                "The server at {url} answered with HTTP {status}. Make sure the URL points to \
                 the FHIR base or its /metadata endpoint and that the server is publicly \
                 accessible."
            ),
        )
        .with_status(status)
    }

    pub fn unexpected_html(url: &str) -> Self {
        Self::new(
            FailureKind::UnexpectedHtmlResponse,
            format!(
                "The server at {url} returned an HTML page instead of JSON. This usually means \
                 the URL points to a web page rather than the FHIR API; try the server's \
                 /metadata endpoint."
            ),
        )
    }

    pub fn invalid_json(url: &str, error: &serde_json::Error) -> Self {
        Self::new(
            FailureKind::InvalidJson,
            format!(
                "The response from {url} is not valid JSON ({error}). Check that the URL is a \
                 FHIR endpoint that supports JSON."
            ),
        )
    }

    pub fn schema_mismatch(url: &str, reason: &SchemaError) -> Self {
        Self::new(
            FailureKind::SchemaMismatch,
            format!(
                "The response from {url} is not a CapabilityStatement: {reason}. Make sure the \
                 URL ends with /metadata."
            ),
        )
    }
}

#[derive(Error, Debug)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("empty input")]
    Empty,

    #[error("{0}")]
    Parse(#[from] url::ParseError),

    #[error("unsupported scheme '{0}', expected http or https")]
    UnsupportedScheme(String),

    #[error("missing host")]
    MissingHost,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("the document is not a JSON object")]
    NotAnObject,

    #[error("resourceType is missing")]
    MissingResourceType,

    #[error("resourceType is '{0}'")]
    WrongResourceType(String),

    #[error("fhirVersion is missing or empty")]
    MissingFhirVersion,
}

pub type Result<T> = std::result::Result<T, CapabilityError>;
