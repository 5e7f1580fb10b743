use serde::Serialize;

use crate::error::{FailureKind, LoadFailure};
use crate::model::CapabilityStatement;

/// Terminal outcome of one load.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "value", rename_all = "lowercase")]
pub enum LoadResult {
    Success(CapabilityStatement),
    Failure(LoadFailure),
}

impl LoadResult {
    pub fn is_success(&self) -> bool {
        matches!(self, LoadResult::Success(_))
    }

    pub fn document(&self) -> Option<&CapabilityStatement> {
        match self {
            LoadResult::Success(doc) => Some(doc),
            LoadResult::Failure(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&LoadFailure> {
        match self {
            LoadResult::Success(_) => None,
            LoadResult::Failure(failure) => Some(failure),
        }
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        self.failure().map(|f| f.kind)
    }

    pub fn into_result(self) -> Result<CapabilityStatement, LoadFailure> {
        self.into()
    }
}

impl From<LoadResult> for Result<CapabilityStatement, LoadFailure> {
    fn from(result: LoadResult) -> Self {
        match result {
            LoadResult::Success(doc) => Ok(doc),
            LoadResult::Failure(failure) => Err(failure),
        }
    }
}

/// What one strategy produced, kept for the failure summary.
#[derive(Debug, Clone)]
pub(crate) struct AttemptFailure {
    pub strategy: &'static str,
    pub failure: LoadFailure,
}

/// Pick the failure to report once the load failed: the one that got
/// furthest, the later attempt on ties. The other attempts are appended to
/// its message.
pub(crate) fn select_failure(attempts: Vec<AttemptFailure>) -> LoadFailure {
    let Some(best) = attempts
        .iter()
        .enumerate()
        .max_by_key(|(index, a)| (a.failure.kind.rank(), *index))
        .map(|(index, _)| index)
    else {
        return LoadFailure::new(
            FailureKind::NetworkFailure,
            "No transport strategy is configured, so no request was made.",
        );
    };

    let others: Vec<String> = attempts
        .iter()
        .enumerate()
        .filter(|(index, _)| *index != best)
        .map(|(_, a)| format!("{} request: {}", a.strategy, a.failure.kind))
        .collect();

    let mut failure = attempts[best].failure.clone();
    if !others.is_empty() {
        failure.message = format!("{} (also tried: {})", failure.message, others.join("; "));
    }
    failure
}
