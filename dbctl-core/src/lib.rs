//! Core of `dbctl cluster create`: turns a loosely-structured component
//! description into a composed Cluster manifest ready for submission.

pub mod config;
pub mod document;
pub mod lookup;
pub mod manifest;
pub mod overlay;
pub mod pipeline;
pub mod presubmit;
pub mod request;
pub mod source;
pub mod validate;

pub use config::PipelineConfig;
pub use document::{Component, Document};
pub use lookup::ResourceLookup;
pub use manifest::{ClusterTemplate, Manifest, TemplateMaterializer};
pub use pipeline::{ClusterCreatePipeline, RequestState};
pub use request::{ClusterCreationRequest, SourceLocator};
pub use source::SourceLoader;

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Cluster deletion behavior
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TerminationPolicy {
    DoNotTerminate, // block deletion entirely
    Halt,           // delete workloads, keep pvcs
    Delete,         // delete workloads and pvcs
    WipeOut,        // delete everything including snapshots
}

impl TerminationPolicy {
    pub const ALL: [TerminationPolicy; 4] = [
        TerminationPolicy::DoNotTerminate,
        TerminationPolicy::Halt,
        TerminationPolicy::Delete,
        TerminationPolicy::WipeOut,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DoNotTerminate => "DoNotTerminate",
            Self::Halt => "Halt",
            Self::Delete => "Delete",
            Self::WipeOut => "WipeOut",
        }
    }
}

impl std::fmt::Display for TerminationPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TerminationPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| {
                Error::UserInput(format!(
                    "invalid termination policy '{}', must be one of: DoNotTerminate, Halt, Delete, WipeOut",
                    s
                ))
            })
    }
}

/// Pipeline error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    UserInput(String),

    #[error("failed to read components from {locator}: {reason}")]
    SourceAcquisition { locator: String, reason: String },

    #[error("malformed components document: {0}")]
    Format(String),

    #[error("{0}")]
    SemanticValidation(String),

    #[error("remote lookup failed: {0}")]
    RemoteLookup(String),

    #[error("submission failed: {0}")]
    Submission(String),

    #[error("{0}")]
    StageOrder(String),
}

pub type Result<T> = std::result::Result<T, Error>;
