pub mod config;
pub mod loader;
pub mod session;
pub mod types;

pub use config::{DEFAULT_RELAY_ENDPOINT, LoaderConfig};
pub use loader::{CapabilityLoader, interpret, looks_like_html};
pub use session::{LoadSession, SessionUpdate};
pub use types::LoadResult;
