//! TL-009: Storage claims — claim records and workload attachment.

use super::record::{get_in, mapping, push_in, set_in, update_in};
use crate::core::types::Manifest;
use serde_yaml_ng::Value;

/// Build a standalone storage-claim record.
pub fn claim(name: &str, size: &str, class: Option<&str>) -> Manifest {
    mapping(vec![
        ("apiVersion", "v1".into()),
        ("kind", "PersistentVolumeClaim".into()),
        ("metadata", mapping(vec![("name", name.into())])),
        ("spec", claim_spec(size, class)),
    ])
}

/// Build a claim template for embedding in a workload.
pub fn claim_template(name: &str, size: &str, class: Option<&str>) -> Value {
    mapping(vec![
        ("metadata", mapping(vec![("name", name.into())])),
        ("spec", claim_spec(size, class)),
    ])
}

fn claim_spec(size: &str, class: Option<&str>) -> Value {
    let mut pairs = vec![
        (
            "accessModes",
            Value::Sequence(vec!["ReadWriteOnce".into()]),
        ),
        (
            "resources",
            mapping(vec![("requests", mapping(vec![("storage", size.into())]))]),
        ),
    ];
    if let Some(class) = class {
        pairs.push(("storageClassName", class.into()));
    }
    mapping(pairs)
}

/// Attach a claim template to a workload: the workload becomes
/// claim-templated (StatefulSet-shaped), the template joins its claim list,
/// and the first container mounts the claim at `mount_path`.
pub fn attach_claim(workload: Manifest, template: Value, mount_path: &str) -> Manifest {
    let claim_name = get_in(&template, &["metadata", "name"])
        .and_then(Value::as_str)
        .unwrap_or("data")
        .to_string();

    let record = set_in(workload, &["kind"], "StatefulSet".into());
    let record = push_in(record, &["spec", "volumeClaimTemplates"], template);
    update_in(
        record,
        &["spec", "template", "spec", "containers"],
        |containers| {
            let mut seq = match containers {
                Value::Sequence(seq) => seq,
                _ => Vec::new(),
            };
            if let Some(first) = seq.first_mut() {
                *first = push_in(
                    first.clone(),
                    &["volumeMounts"],
                    mapping(vec![
                        ("name", claim_name.as_str().into()),
                        ("mountPath", mount_path.into()),
                    ]),
                );
            }
            Value::Sequence(seq)
        },
    )
}
