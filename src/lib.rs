//! # FHIR Capability Viewer
//!
//! Fetches a FHIR CapabilityStatement from a server and presents what the
//! server supports: resources, interactions, operations, search parameters and
//! security.
//!
//! ## Features
//!
//! - **Loader**: direct request with a relay fallback, every failure classified
//! - **Verbatim documents**: the fetched JSON is kept as-is, field order included
//! - **Typed model**: named optional fields and grouped views over the document
//! - **Sessions**: overlapping loads never let a stale result win
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fhir_capability_viewer::*;
//!
//! # async fn example() -> Result<()> {
//! let loader = CapabilityLoader::new(&LoaderConfig::default())?;
//! match loader.load("https://hapi.fhir.org/baseR4/metadata").await {
//!     LoadResult::Success(doc) => println!("FHIR {}", doc.fhir_version()),
//!     LoadResult::Failure(failure) => eprintln!("{}: {}", failure.kind, failure.message),
//! }
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod error;
pub mod input;
pub mod model;
pub mod transport;

#[cfg(feature = "cli")]
pub mod cli;

pub use crate::core::{CapabilityLoader, LoadResult, LoadSession, LoaderConfig, SessionUpdate};
pub use error::Result;
pub use error::{
    CapabilityError, FailureKind, HttpStatus, InputError, LoadFailure, SchemaError,
    TransportError,
};
pub use model::{CapabilityModel, CapabilityStatement};
pub use transport::{FetchRequest, HttpClient, RawResponse, ReqwestClient, TransportStrategy};
