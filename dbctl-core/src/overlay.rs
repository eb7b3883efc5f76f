//! Cross-cutting overlays applied uniformly to every component

use crate::document::{list_of_maps_mut, nested_str, set_nested, Component};
use crate::lookup::ResourceLookup;
use crate::request::ClusterCreationRequest;
use crate::{Error, Result};
use serde_json::{json, Value};

pub const MONITOR_KEY: &str = "monitor";
pub const VOLUME_CLAIM_TEMPLATES_KEY: &str = "volumeClaimTemplates";
pub const SNAPSHOT_BACKUP_TYPE: &str = "snapshot";

/// Write `monitor` onto every component, replacing any existing value
pub fn set_monitor(monitor: bool, components: &mut [Component]) {
    for component in components.iter_mut() {
        component.insert(MONITOR_KEY.to_string(), Value::Bool(monitor));
    }
}

/// Data source pointing a volume claim at a volume snapshot
pub fn snapshot_data_source(backup: &str) -> Value {
    json!({
        "name": backup,
        "kind": "VolumeSnapshot",
        "apiGroup": "snapshot.storage.k8s.io",
    })
}

/// Wire every volume claim template of every component to restore from the
/// requested backup.
///
/// The backup job is looked up once and must be a snapshot backup. Nothing is
/// written unless the backup type and every component's shape check out.
pub async fn set_backup<L>(request: &mut ClusterCreationRequest, lookup: &L) -> Result<()>
where
    L: ResourceLookup + ?Sized,
{
    let backup = match request.backup.as_deref() {
        Some(backup) if !backup.is_empty() => backup,
        _ => return Ok(()),
    };
    if request.components.is_empty() {
        return Ok(());
    }

    let job = lookup.get_backup_job(&request.namespace, backup).await?;
    let backup_type = nested_str(&job, &["spec", "backupType"]).unwrap_or_default();
    if backup_type != SNAPSHOT_BACKUP_TYPE {
        return Err(Error::SemanticValidation(format!(
            "only support snapshot backup, specified backup type is '{}'",
            backup_type
        )));
    }

    let data_source = snapshot_data_source(backup);
    let mut templates = Vec::new();
    for (i, component) in request.components.iter_mut().enumerate() {
        let name = component
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let shape_error = |e: crate::document::ShapeError| {
            Error::SemanticValidation(format!(
                "cannot restore backup '{}' into component {} '{}': {}",
                backup, i, name, e
            ))
        };

        for template in list_of_maps_mut(component, VOLUME_CLAIM_TEMPLATES_KEY).map_err(shape_error)? {
            match template.get("spec") {
                None | Some(Value::Object(_)) => {}
                Some(other) => {
                    return Err(Error::SemanticValidation(format!(
                        "cannot restore backup '{}' into component {} '{}': volume claim template spec must be a map, found {}",
                        backup,
                        i,
                        name,
                        crate::document::kind_of(other)
                    )))
                }
            }
            templates.push(template);
        }
    }

    let count = templates.len();
    for template in templates {
        set_nested(template, &["spec", "dataSource"], data_source.clone())
            .map_err(|e| Error::SemanticValidation(e.to_string()))?;
    }

    tracing::info!(backup, templates = count, "volume claim templates wired to snapshot backup");
    Ok(())
}
