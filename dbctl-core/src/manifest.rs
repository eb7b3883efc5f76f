//! Manifest materialization
//!
//! A [`TemplateMaterializer`] merges a completed request into a resource
//! document. [`ClusterTemplate`] is the built-in one producing a `Cluster`.

use crate::config::PipelineConfig;
use crate::document::{nested_str, Document};
use crate::lookup::CLUSTERS;
use crate::request::ClusterCreationRequest;
use crate::{Error, Result};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// A composed resource document, ready for submission
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Manifest {
    content: Document,
}

impl Manifest {
    pub fn new(content: Document) -> Self {
        Self { content }
    }

    pub fn content(&self) -> &Document {
        &self.content
    }

    /// Replace the whole document in one step
    pub fn set_content(&mut self, content: Document) {
        self.content = content;
    }

    pub fn into_content(self) -> Document {
        self.content
    }

    pub fn name(&self) -> Option<&str> {
        nested_str(&self.content, &["metadata", "name"])
    }

    pub fn namespace(&self) -> Option<&str> {
        nested_str(&self.content, &["metadata", "namespace"])
    }
}

pub trait TemplateMaterializer: Send + Sync {
    fn name(&self) -> &str;

    fn materialize(
        &self,
        request: &ClusterCreationRequest,
        config: &PipelineConfig,
    ) -> Result<Manifest>;
}

/// Resolve a template by name
pub fn template_for(name: &str) -> Result<Box<dyn TemplateMaterializer>> {
    match name {
        ClusterTemplate::NAME => Ok(Box::new(ClusterTemplate)),
        other => Err(Error::UserInput(format!("unknown template '{}'", other))),
    }
}

/// Renders a `dbaas.kubeblocks.io` Cluster
pub struct ClusterTemplate;

impl ClusterTemplate {
    pub const NAME: &'static str = "cluster";
}

/// `spec.affinity` of a Cluster
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Affinity {
    pod_anti_affinity: String,
    // unset must stay absent, the control plane cannot turn null into a list
    #[serde(skip_serializing_if = "Option::is_none")]
    topology_keys: Option<Vec<String>>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    node_labels: BTreeMap<String, String>,
}

fn or_default<'a>(value: &'a str, default: &'a str) -> &'a str {
    if value.is_empty() {
        default
    } else {
        value
    }
}

impl TemplateMaterializer for ClusterTemplate {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn materialize(
        &self,
        request: &ClusterCreationRequest,
        config: &PipelineConfig,
    ) -> Result<Manifest> {
        let affinity = Affinity {
            pod_anti_affinity: or_default(&request.pod_anti_affinity, &config.pod_anti_affinity)
                .to_string(),
            topology_keys: request.topology_keys.clone(),
            node_labels: request.node_labels.clone(),
        };

        let components: Vec<Value> = request
            .components
            .iter()
            .cloned()
            .map(Value::Object)
            .collect();

        let content = json!({
            "apiVersion": CLUSTERS.api_version(),
            "kind": "Cluster",
            "metadata": {
                "name": request.name,
                "namespace": request.namespace,
            },
            "spec": {
                "clusterDefinitionRef": or_default(&request.cluster_definition_ref, &config.cluster_definition),
                "appVersionRef": or_default(&request.app_version_ref, &config.app_version),
                "terminationPolicy": request.termination_policy,
                "affinity": affinity,
                "components": components,
            },
        });

        Ok(Manifest::new(content))
    }
}
