//! Request pipeline driver
//!
//! Runs the stages in order, one at a time, and records where the request
//! stands. A failed request never enters another stage.

use crate::config::PipelineConfig;
use crate::document;
use crate::lookup::ResourceLookup;
use crate::manifest::{self, Manifest};
use crate::overlay;
use crate::presubmit;
use crate::request::ClusterCreationRequest;
use crate::source::SourceLoader;
use crate::validate;
use crate::{Error, Result, TerminationPolicy};
use std::fmt;
use tokio::io::AsyncRead;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    Draft,
    Loaded,
    Normalized,
    Overlaid,
    Validated,
    Materialized,
    PreSubmitted,
    Submitted,
    Accepted,
    Rejected,
    LoadFailed,
    FormatFailed,
    ValidationFailed,
    RemoteLookupFailed,
}

impl RequestState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Accepted
                | Self::Rejected
                | Self::LoadFailed
                | Self::FormatFailed
                | Self::ValidationFailed
                | Self::RemoteLookupFailed
        )
    }

    /// The failure state an error puts the request in
    fn failed_by(err: &Error) -> Option<Self> {
        match err {
            Error::SourceAcquisition { .. } => Some(Self::LoadFailed),
            Error::Format(_) => Some(Self::FormatFailed),
            Error::UserInput(_) | Error::SemanticValidation(_) => Some(Self::ValidationFailed),
            Error::RemoteLookup(_) => Some(Self::RemoteLookupFailed),
            Error::Submission(_) => Some(Self::Rejected),
            Error::StageOrder(_) => None,
        }
    }
}

impl fmt::Display for RequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

pub struct ClusterCreatePipeline<'a, L: ResourceLookup + ?Sized> {
    config: PipelineConfig,
    loader: SourceLoader,
    lookup: &'a L,
    state: RequestState,
}

impl<'a, L: ResourceLookup + ?Sized> ClusterCreatePipeline<'a, L> {
    pub fn new(config: PipelineConfig, lookup: &'a L) -> Self {
        Self {
            config,
            loader: SourceLoader::new(),
            lookup,
            state: RequestState::Draft,
        }
    }

    pub fn with_loader(mut self, loader: SourceLoader) -> Self {
        self.loader = loader;
        self
    }

    pub fn state(&self) -> RequestState {
        self.state
    }

    /// Run every stage up to submission and hand back the final manifest
    pub async fn run<R>(
        &mut self,
        request: &mut ClusterCreationRequest,
        stdin: &mut R,
    ) -> Result<Manifest>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        self.complete(request, stdin).await?;
        self.validate(request)?;
        let mut manifest = self.materialize(request)?;
        self.pre_submit(request, &mut manifest).await?;
        Ok(manifest)
    }

    /// Load and normalize the components, then apply the monitor and backup
    /// overlays
    pub async fn complete<R>(
        &mut self,
        request: &mut ClusterCreationRequest,
        stdin: &mut R,
    ) -> Result<()>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        self.guard("load components for", RequestState::Draft)?;

        // without a source the components stay as given and validation rejects the request
        if let Some(locator) = request.components_source.clone() {
            let raw = self.loader.load(&locator, stdin).await;
            let raw = self.track(raw, RequestState::Loaded)?;
            let components = document::normalize(&raw);
            request.components = self.track(components, RequestState::Normalized)?;
        } else {
            self.transition(RequestState::Normalized);
        }

        overlay::set_monitor(request.monitor, &mut request.components);
        let backup = overlay::set_backup(request, self.lookup).await;
        self.track(backup, RequestState::Overlaid)
    }

    pub fn validate(&mut self, request: &ClusterCreationRequest) -> Result<TerminationPolicy> {
        self.guard("validate", RequestState::Overlaid)?;
        let result = validate::validate(request);
        self.track(result, RequestState::Validated)
    }

    pub fn materialize(&mut self, request: &ClusterCreationRequest) -> Result<Manifest> {
        self.guard("materialize", RequestState::Validated)?;
        let result = manifest::template_for(&self.config.template_name)
            .and_then(|template| template.materialize(request, &self.config));
        self.track(result, RequestState::Materialized)
    }

    pub async fn pre_submit(
        &mut self,
        request: &ClusterCreationRequest,
        manifest: &mut Manifest,
    ) -> Result<()> {
        self.guard("pre-submit", RequestState::Materialized)?;
        let result = presubmit::pre_submit(manifest, request.enable_all_logs, self.lookup).await;
        self.track(result, RequestState::PreSubmitted)
    }

    /// Record the outcome of handing the manifest to the control plane
    pub fn record_submission(&mut self, accepted: bool) -> Result<()> {
        self.guard("submit", RequestState::PreSubmitted)?;
        self.transition(RequestState::Submitted);
        self.transition(if accepted {
            RequestState::Accepted
        } else {
            RequestState::Rejected
        });
        Ok(())
    }

    fn guard(&self, stage: &str, expected: RequestState) -> Result<()> {
        if self.state != expected {
            return Err(Error::StageOrder(format!(
                "cannot {} a request in state {}",
                stage, self.state
            )));
        }
        Ok(())
    }

    fn transition(&mut self, next: RequestState) {
        tracing::debug!(from = %self.state, to = %next, "request state");
        self.state = next;
    }

    fn track<T>(&mut self, result: Result<T>, next: RequestState) -> Result<T> {
        match result {
            Ok(value) => {
                self.transition(next);
                Ok(value)
            }
            Err(err) => {
                if let Some(failed) = RequestState::failed_by(&err) {
                    self.transition(failed);
                }
                Err(err)
            }
        }
    }
}
