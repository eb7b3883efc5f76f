//! Common test utilities and helpers

use dbctl_core::document::Document;
use dbctl_core::{ClusterCreationRequest, Error, ResourceLookup, Result, SourceLocator};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Mutex;

/// In-memory control plane that records every lookup
#[derive(Default)]
pub struct FakeControlPlane {
    backup_jobs: HashMap<(String, String), Document>,
    cluster_definitions: HashMap<String, Document>,
    pub requests: Mutex<Vec<String>>,
}

impl FakeControlPlane {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn backup_job(mut self, namespace: &str, name: &str, backup_type: &str) -> Self {
        self.backup_jobs.insert(
            (namespace.to_string(), name.to_string()),
            json!({
                "apiVersion": "dataprotection.kubeblocks.io/v1alpha1",
                "kind": "BackupJob",
                "metadata": {"name": name, "namespace": namespace},
                "spec": {"backupType": backup_type},
            }),
        );
        self
    }

    pub fn cluster_definition(mut self, name: &str, types: &[(&str, &[&str])]) -> Self {
        let components: Vec<_> = types
            .iter()
            .map(|(type_name, logs)| {
                let log_configs: Vec<_> = logs.iter().map(|l| json!({"name": l})).collect();
                json!({"typeName": type_name, "logConfigs": log_configs})
            })
            .collect();
        self.cluster_definitions.insert(
            name.to_string(),
            json!({
                "apiVersion": "dbaas.kubeblocks.io/v1alpha1",
                "kind": "ClusterDefinition",
                "metadata": {"name": name},
                "spec": {"components": components},
            }),
        );
        self
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl ResourceLookup for FakeControlPlane {
    async fn get_backup_job(&self, namespace: &str, name: &str) -> Result<Document> {
        self.requests
            .lock()
            .unwrap()
            .push(format!("backupjobs/{}/{}", namespace, name));
        self.backup_jobs
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| Error::RemoteLookup(format!("backupjobs \"{}\" not found", name)))
    }

    async fn get_cluster_definition(&self, name: &str) -> Result<Document> {
        self.requests
            .lock()
            .unwrap()
            .push(format!("clusterdefinitions/{}", name));
        self.cluster_definitions
            .get(name)
            .cloned()
            .ok_or_else(|| Error::RemoteLookup(format!("clusterdefinitions \"{}\" not found", name)))
    }
}

/// A request reading its components from stdin
pub fn stdin_request(name: &str, termination_policy: &str) -> ClusterCreationRequest {
    let mut request = ClusterCreationRequest::new(name, "default");
    request.termination_policy = termination_policy.to_string();
    request.components_source = Some(SourceLocator::Stdin);
    request
}
