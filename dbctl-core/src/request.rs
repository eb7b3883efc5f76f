//! Cluster creation request model

use crate::document::Component;
use std::collections::BTreeMap;
use std::fmt;

/// Where the components document is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocator {
    Stdin,
    Remote(String),
    File(std::path::PathBuf),
}

impl fmt::Display for SourceLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdin => write!(f, "stdin"),
            Self::Remote(url) => write!(f, "url {}", url),
            Self::File(path) => write!(f, "file {}", path.display()),
        }
    }
}

/// Everything the user asked for, merged into the cluster template once complete
#[derive(Debug, Clone, Default)]
pub struct ClusterCreationRequest {
    pub name: String,
    pub namespace: String,
    pub cluster_definition_ref: String,
    pub app_version_ref: String,
    pub termination_policy: String,
    pub pod_anti_affinity: String,
    pub monitor: bool,
    pub enable_all_logs: bool,
    /// `None` when the flag was never given, as opposed to an empty list
    pub topology_keys: Option<Vec<String>>,
    pub node_labels: BTreeMap<String, String>,
    pub components: Vec<Component>,
    pub components_source: Option<SourceLocator>,
    pub backup: Option<String>,
}

impl ClusterCreationRequest {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            ..Default::default()
        }
    }
}
