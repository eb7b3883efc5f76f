//! Request validation, purely local

use crate::request::ClusterCreationRequest;
use crate::{Error, Result, TerminationPolicy};

/// Check the required fields of `request` and return its termination policy
pub fn validate(request: &ClusterCreationRequest) -> Result<TerminationPolicy> {
    if request.name.is_empty() {
        return Err(Error::UserInput("missing cluster name".to_string()));
    }

    if request.termination_policy.is_empty() {
        return Err(Error::UserInput(
            "a valid termination policy is needed, use --termination-policy to specify one of: DoNotTerminate, Halt, Delete, WipeOut"
                .to_string(),
        ));
    }
    let policy = request.termination_policy.parse::<TerminationPolicy>()?;

    if request.components_source.is_none() {
        return Err(Error::UserInput(
            "a valid component local file path, URL, or stdin is needed".to_string(),
        ));
    }

    Ok(policy)
}
