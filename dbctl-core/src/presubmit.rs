//! Last mutation before submission: log enablement.
//!
//! With `enableAllLogs` set, every component whose type the cluster
//! definition knows gets all of that type's log configurations enabled,
//! replacing whatever the component listed. Components of unknown type keep
//! their `enabledLogs` as they are.

use crate::document::Document;
use crate::lookup::{ClusterDefinition, ResourceLookup};
use crate::manifest::Manifest;
use crate::{Error, Result};
use serde::Deserialize;
use serde_json::Value;

pub const ENABLED_LOGS_KEY: &str = "enabledLogs";

#[derive(Debug, Deserialize)]
struct ClusterView {
    spec: ClusterSpecView,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClusterSpecView {
    cluster_definition_ref: String,
}

/// Rewrite `enabledLogs` of the manifest's components from the referenced
/// cluster definition. The manifest is replaced only if every step succeeds.
pub async fn pre_submit<L>(manifest: &mut Manifest, enable_all_logs: bool, lookup: &L) -> Result<()>
where
    L: ResourceLookup + ?Sized,
{
    if !enable_all_logs {
        return Ok(());
    }

    let cluster: ClusterView = serde_json::from_value(manifest.content().clone())
        .map_err(|e| Error::RemoteLookup(format!("cannot read cluster manifest: {}", e)))?;

    let definition_name = &cluster.spec.cluster_definition_ref;
    let raw = lookup.get_cluster_definition(definition_name).await?;
    let definition: ClusterDefinition = serde_json::from_value(raw).map_err(|e| {
        Error::RemoteLookup(format!(
            "cannot read cluster definition '{}': {}",
            definition_name, e
        ))
    })?;

    let mut content = manifest.content().clone();
    let updated = set_enable_all_logs(&mut content, &definition)?;
    manifest.set_content(content);

    tracing::info!(
        cluster_definition = %definition_name,
        updated,
        "enabled all logs"
    );
    Ok(())
}

/// Overwrite `enabledLogs` on every component with a matching definition
/// entry and return how many components were rewritten
pub fn set_enable_all_logs(content: &mut Document, definition: &ClusterDefinition) -> Result<usize> {
    let Some(components) = content
        .get_mut("spec")
        .and_then(|spec| spec.get_mut("components"))
        .and_then(Value::as_array_mut)
    else {
        return Ok(0);
    };

    let mut updated = 0;
    for (i, component) in components.iter_mut().enumerate() {
        let component = component.as_object_mut().ok_or_else(|| {
            Error::RemoteLookup(format!("cluster component {} is not a map", i))
        })?;
        let component_type = component
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        match definition.log_names_for(&component_type) {
            Some(logs) => {
                component.insert(ENABLED_LOGS_KEY.to_string(), serde_json::json!(logs));
                updated += 1;
            }
            None => {
                tracing::warn!(
                    component = i,
                    component_type = %component_type,
                    "no cluster definition entry for component type, keeping its enabledLogs"
                );
            }
        }
    }
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::testing::StaticLookup;
    use serde_json::json;

    fn manifest() -> Manifest {
        Manifest::new(json!({
            "apiVersion": "dbaas.kubeblocks.io/v1alpha1",
            "kind": "Cluster",
            "metadata": {"name": "mycluster", "namespace": "default"},
            "spec": {
                "clusterDefinitionRef": "apecloud-wesql",
                "components": [
                    {"name": "c1", "type": "t1", "enabledLogs": ["error"]},
                    {"name": "c2", "type": "other", "enabledLogs": ["general"]},
                    {"name": "c3", "type": "T1"},
                ],
            },
        }))
    }

    fn lookup() -> StaticLookup {
        StaticLookup::default().with_cluster_definition(
            "apecloud-wesql",
            json!({
                "kind": "ClusterDefinition",
                "spec": {"components": [
                    {"typeName": "t1", "logConfigs": [{"name": "error"}, {"name": "slow"}]},
                    {"typeName": "t2", "logConfigs": [{"name": "audit"}]},
                ]},
            }),
        )
    }

    #[tokio::test]
    async fn test_disabled_leaves_manifest_untouched() {
        let lookup = lookup();
        let mut manifest = manifest();
        let before = serde_json::to_vec(manifest.content()).unwrap();

        pre_submit(&mut manifest, false, &lookup).await.unwrap();
        assert_eq!(serde_json::to_vec(manifest.content()).unwrap(), before);
        assert_eq!(lookup.calls(), 0);
    }

    #[tokio::test]
    async fn test_enabled_overwrites_matching_components() {
        let lookup = lookup();
        let mut manifest = manifest();

        pre_submit(&mut manifest, true, &lookup).await.unwrap();
        assert_eq!(lookup.calls(), 1);

        let components = &manifest.content()["spec"]["components"];
        assert_eq!(components[0][ENABLED_LOGS_KEY], json!(["error", "slow"]));
        assert_eq!(components[1][ENABLED_LOGS_KEY], json!(["general"]));
        assert_eq!(components[2][ENABLED_LOGS_KEY], json!(["error", "slow"]));
        assert_eq!(components[0]["name"], "c1");
    }

    #[tokio::test]
    async fn test_missing_definition_leaves_manifest_untouched() {
        let lookup = StaticLookup::default();
        let mut manifest = manifest();
        let before = manifest.clone();

        let err = pre_submit(&mut manifest, true, &lookup).await.unwrap_err();
        assert!(matches!(err, Error::RemoteLookup(_)));
        assert_eq!(manifest, before);
    }

    #[tokio::test]
    async fn test_malformed_definition_is_lookup_error() {
        let lookup = StaticLookup::default()
            .with_cluster_definition("apecloud-wesql", json!({"spec": {"components": "nope"}}));
        let mut manifest = manifest();
        let before = manifest.clone();

        let err = pre_submit(&mut manifest, true, &lookup).await.unwrap_err();
        assert!(err.to_string().contains("cannot read cluster definition 'apecloud-wesql'"));
        assert_eq!(manifest, before);
    }

    #[tokio::test]
    async fn test_manifest_without_definition_ref_is_lookup_error() {
        let lookup = lookup();
        let mut manifest = Manifest::new(json!({"kind": "Cluster", "spec": {}}));

        let err = pre_submit(&mut manifest, true, &lookup).await.unwrap_err();
        assert!(matches!(err, Error::RemoteLookup(_)));
        assert_eq!(lookup.calls(), 0);
    }

    #[test]
    fn test_set_enable_all_logs_counts_updates() {
        let definition: ClusterDefinition = serde_json::from_value(json!({
            "spec": {"components": [{"typeName": "t1", "logConfigs": [{"name": "slow"}]}]}
        }))
        .unwrap();
        let mut content = manifest().into_content();

        assert_eq!(set_enable_all_logs(&mut content, &definition).unwrap(), 2);
    }
}
