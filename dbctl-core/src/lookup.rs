//! Remote resource lookup
//!
//! The overlay and pre-submit stages each need one read from the control
//! plane. They reach it through [`ResourceLookup`] so the transformation
//! logic can run against an in-memory fake.

use crate::document::Document;
use crate::Result;
use serde::{Deserialize, Serialize};

/// Address of a resource collection on the control plane
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupVersionResource {
    pub group: &'static str,
    pub version: &'static str,
    pub resource: &'static str,
}

impl GroupVersionResource {
    pub fn api_version(&self) -> String {
        format!("{}/{}", self.group, self.version)
    }
}

pub const BACKUP_JOBS: GroupVersionResource = GroupVersionResource {
    group: "dataprotection.kubeblocks.io",
    version: "v1alpha1",
    resource: "backupjobs",
};

pub const CLUSTER_DEFINITIONS: GroupVersionResource = GroupVersionResource {
    group: "dbaas.kubeblocks.io",
    version: "v1alpha1",
    resource: "clusterdefinitions",
};

pub const CLUSTERS: GroupVersionResource = GroupVersionResource {
    group: "dbaas.kubeblocks.io",
    version: "v1alpha1",
    resource: "clusters",
};

/// Read-only access to the resources the pipeline consults
#[async_trait::async_trait]
pub trait ResourceLookup: Send + Sync {
    /// Fetch a backup job by name within `namespace`
    async fn get_backup_job(&self, namespace: &str, name: &str) -> Result<Document>;

    /// Fetch a cluster-scoped cluster definition by name
    async fn get_cluster_definition(&self, name: &str) -> Result<Document>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterDefinition {
    pub spec: ClusterDefinitionSpec,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClusterDefinitionSpec {
    #[serde(default)]
    pub components: Vec<ClusterDefinitionComponent>,
}

/// One component type a cluster definition offers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterDefinitionComponent {
    pub type_name: String,
    #[serde(default)]
    pub log_configs: Vec<LogConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path_pattern: Option<String>,
}

impl ClusterDefinition {
    /// Log names declared for `component_type`, matched case-insensitively.
    ///
    /// When several entries match, the last one wins.
    pub fn log_names_for(&self, component_type: &str) -> Option<Vec<String>> {
        self.spec
            .components
            .iter()
            .rev()
            .find(|c| c.type_name.eq_ignore_ascii_case(component_type))
            .map(|c| c.log_configs.iter().map(|l| l.name.clone()).collect())
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_api_version() {
        assert_eq!(BACKUP_JOBS.api_version(), "dataprotection.kubeblocks.io/v1alpha1");
        assert_eq!(CLUSTERS.api_version(), "dbaas.kubeblocks.io/v1alpha1");
    }

    #[test]
    fn test_log_names_match_case_insensitively() {
        let cd: ClusterDefinition = serde_json::from_value(json!({
            "spec": {"components": [
                {"typeName": "replicasets", "logConfigs": [
                    {"name": "error", "filePathPattern": "/data/mysql/log/mysqld.err"},
                    {"name": "slow"}
                ]},
                {"typeName": "proxy"}
            ]}
        }))
        .unwrap();

        assert_eq!(
            cd.log_names_for("ReplicaSets"),
            Some(vec!["error".to_string(), "slow".to_string()])
        );
        assert_eq!(cd.log_names_for("proxy"), Some(vec![]));
        assert_eq!(cd.log_names_for("unknown"), None);
    }

    #[test]
    fn test_last_matching_entry_wins() {
        let cd: ClusterDefinition = serde_json::from_value(json!({
            "spec": {"components": [
                {"typeName": "wesql", "logConfigs": [{"name": "error"}]},
                {"typeName": "proxy", "logConfigs": [{"name": "access"}]},
                {"typeName": "WeSQL", "logConfigs": [{"name": "slow"}, {"name": "general"}]}
            ]}
        }))
        .unwrap();

        assert_eq!(
            cd.log_names_for("wesql"),
            Some(vec!["slow".to_string(), "general".to_string()])
        );
    }
}
