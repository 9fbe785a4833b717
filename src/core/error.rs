//! Error taxonomy for price acquisition and contribution input.

use serde::Serialize;
use std::fmt::{self, Display};
use thiserror::Error;

/// A single provider call failed (network, auth, rate limit, malformed payload).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{provider} failed: {cause}")]
pub struct ProviderError {
    /// Name of the provider that failed, e.g. "finnhub".
    pub provider: String,
    /// Human-readable cause, preserving the provider's own message where available.
    pub cause: String,
}

impl ProviderError {
    pub fn new(provider: impl Into<String>, cause: impl Display) -> Self {
        Self {
            provider: provider.into(),
            cause: cause.to_string(),
        }
    }

    /// Builds an error from an `anyhow` chain, keeping every context layer.
    pub fn from_anyhow(provider: impl Into<String>, err: anyhow::Error) -> Self {
        Self {
            provider: provider.into(),
            cause: format!("{err:#}"),
        }
    }
}

/// Every configured provider failed in one acquisition attempt.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub struct AllProvidersFailedError {
    /// Failures in the order the providers were attempted.
    pub failures: Vec<ProviderError>,
}

impl Display for AllProvidersFailedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.failures.is_empty() {
            return write!(f, "All sources failed: no providers configured");
        }
        let reasons: Vec<String> = self.failures.iter().map(|e| e.to_string()).collect();
        write!(f, "All sources failed: {}", reasons.join(" | "))
    }
}

/// Required input columns are missing; row processing never started.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("missing required columns: {}", .missing.join(", "))]
pub struct StructuralInputError {
    pub missing: Vec<String>,
}

/// Per-row validation issue. Recorded on the row, never raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    BadDate,
    BadAmount,
}

impl IssueCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueCode::BadDate => "bad_date",
            IssueCode::BadAmount => "bad_amount",
        }
    }
}

impl Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
