use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::RwLock;

use crate::core::{CapabilityLoader, LoadResult};

/// What happened to a finished load.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionUpdate {
    /// The result now occupies the slot.
    Applied(Arc<LoadResult>),
    /// A newer load started before this one finished; the result was dropped.
    Stale(Arc<LoadResult>),
}

impl SessionUpdate {
    pub fn result(&self) -> &LoadResult {
        match self {
            SessionUpdate::Applied(result) | SessionUpdate::Stale(result) => result,
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, SessionUpdate::Applied(_))
    }
}

/// Holds the result of the most recent load. Overlapping loads are allowed;
/// with `discard_stale` only the newest invocation may fill the slot.
#[derive(Debug)]
pub struct LoadSession {
    loader: Arc<CapabilityLoader>,
    generation: AtomicU64,
    current: RwLock<Option<Arc<LoadResult>>>,
    discard_stale: bool,
}

impl LoadSession {
    pub fn new(loader: Arc<CapabilityLoader>, discard_stale: bool) -> Self {
        Self {
            loader,
            generation: AtomicU64::new(0),
            current: RwLock::new(None),
            discard_stale,
        }
    }

    pub async fn load(&self, input: &str) -> SessionUpdate {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let result = Arc::new(self.loader.load(input).await);

        let mut slot = self.current.write().await;
        if self.discard_stale && self.generation.load(Ordering::SeqCst) != generation {
            tracing::debug!("Discarding result of superseded load #{}", generation);
            return SessionUpdate::Stale(result);
        }

        *slot = Some(Arc::clone(&result));
        SessionUpdate::Applied(result)
    }

    pub async fn current(&self) -> Option<Arc<LoadResult>> {
        self.current.read().await.clone()
    }

    /// Empty the slot. Loads still in flight become stale.
    pub async fn clear(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        *self.current.write().await = None;
    }

    /// Bumped by every `load` and by `clear`.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }
}
