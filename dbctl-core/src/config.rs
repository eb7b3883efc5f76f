//! Pipeline defaults

use serde::{Deserialize, Serialize};

pub const DEFAULT_CLUSTER_DEFINITION: &str = "apecloud-wesql";
pub const DEFAULT_APP_VERSION: &str = "wesql-8.0.30";
pub const DEFAULT_POD_ANTI_AFFINITY: &str = "Preferred";
pub const DEFAULT_TEMPLATE: &str = "cluster";

/// Values the pipeline falls back to when the request leaves them unset
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PipelineConfig {
    pub cluster_definition: String,
    pub app_version: String,
    pub pod_anti_affinity: String,
    pub template_name: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            cluster_definition: DEFAULT_CLUSTER_DEFINITION.to_string(),
            app_version: DEFAULT_APP_VERSION.to_string(),
            pod_anti_affinity: DEFAULT_POD_ANTI_AFFINITY.to_string(),
            template_name: DEFAULT_TEMPLATE.to_string(),
        }
    }
}
