//! TL-007: Workload records — generic Deployment-shaped manifests.

use super::record::{mapping, push_in};
use crate::core::types::{yaml_value_to_string, Manifest};
use serde_yaml_ng::Value;

/// Build a workload shell: Deployment-shaped, labeled `app: <name>`, no
/// containers yet.
pub fn workload(name: &str, replicas: u64) -> Manifest {
    let labels = mapping(vec![("app", name.into())]);
    mapping(vec![
        ("apiVersion", "apps/v1".into()),
        ("kind", "Deployment".into()),
        (
            "metadata",
            mapping(vec![("name", name.into()), ("labels", labels.clone())]),
        ),
        (
            "spec",
            mapping(vec![
                ("replicas", Value::from(replicas)),
                ("selector", mapping(vec![("matchLabels", labels.clone())])),
                (
                    "template",
                    mapping(vec![
                        ("metadata", mapping(vec![("labels", labels)])),
                        (
                            "spec",
                            mapping(vec![("containers", Value::Sequence(Vec::new()))]),
                        ),
                    ]),
                ),
            ]),
        ),
    ])
}

/// Build a container record.
pub fn container(name: &str, image: &str) -> Value {
    mapping(vec![("name", name.into()), ("image", image.into())])
}

/// Expose a port on a container.
pub fn with_port(container: Value, port: u64) -> Value {
    push_in(
        container,
        &["ports"],
        mapping(vec![("containerPort", Value::from(port))]),
    )
}

/// Add an environment binding to a container. Values are spliced as
/// strings, which is what the environment expects.
pub fn add_env(container: Value, key: &str, value: &Value) -> Value {
    push_in(
        container,
        &["env"],
        mapping(vec![
            ("name", key.into()),
            ("value", Value::String(yaml_value_to_string(value))),
        ]),
    )
}

/// Add a container to a workload record.
pub fn add_container(workload: Manifest, container: Value) -> Manifest {
    push_in(
        workload,
        &["spec", "template", "spec", "containers"],
        container,
    )
}

/// Descriptor a workload exposes to dependents: its name, match labels, and
/// container port if one is set.
pub fn descriptor(name: &str, port: Option<u64>) -> Value {
    let mut pairs = vec![
        ("name", Value::from(name)),
        ("labels", mapping(vec![("app", name.into())])),
    ];
    if let Some(port) = port {
        pairs.push(("port", Value::from(port)));
    }
    mapping(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::record::get_in;

    #[test]
    fn test_tl007_workload_shape() {
        let record = workload("web", 3);
        assert_eq!(get_in(&record, &["kind"]).and_then(Value::as_str), Some("Deployment"));
        assert_eq!(
            get_in(&record, &["metadata", "name"]).and_then(Value::as_str),
            Some("web")
        );
        assert_eq!(
            get_in(&record, &["spec", "replicas"]).and_then(Value::as_u64),
            Some(3)
        );
        assert_eq!(
            get_in(&record, &["spec", "selector", "matchLabels", "app"]).and_then(Value::as_str),
            Some("web")
        );
        assert_eq!(
            get_in(&record, &["spec", "template", "metadata", "labels", "app"])
                .and_then(Value::as_str),
            Some("web")
        );
    }

    #[test]
    fn test_tl007_add_container() {
        let record = add_container(workload("web", 1), container("web", "nginx:1.27"));
        let containers = get_in(&record, &["spec", "template", "spec", "containers"])
            .and_then(Value::as_sequence)
            .unwrap();
        assert_eq!(containers.len(), 1);
        assert_eq!(
            containers[0].get("image").and_then(Value::as_str),
            Some("nginx:1.27")
        );
    }

    #[test]
    fn test_tl007_add_second_container() {
        let record = add_container(
            add_container(workload("web", 1), container("web", "nginx:1.27")),
            container("sidecar", "envoy:1.30"),
        );
        let containers = get_in(&record, &["spec", "template", "spec", "containers"])
            .and_then(Value::as_sequence)
            .unwrap();
        assert_eq!(containers.len(), 2);
        assert_eq!(
            containers[1].get("name").and_then(Value::as_str),
            Some("sidecar")
        );
    }

    #[test]
    fn test_tl007_with_port() {
        let record = with_port(container("web", "nginx:1.27"), 8080);
        let ports = get_in(&record, &["ports"]).and_then(Value::as_sequence).unwrap();
        assert_eq!(
            ports[0].get("containerPort").and_then(Value::as_u64),
            Some(8080)
        );
    }

    #[test]
    fn test_tl007_add_env_stringifies() {
        let record = add_env(
            add_env(container("web", "nginx:1.27"), "MODE", &Value::from("production")),
            "REPLICAS",
            &Value::from(3u64),
        );
        let env = get_in(&record, &["env"]).and_then(Value::as_sequence).unwrap();
        assert_eq!(env.len(), 2);
        assert_eq!(env[0].get("name").and_then(Value::as_str), Some("MODE"));
        assert_eq!(env[1].get("value").and_then(Value::as_str), Some("3"));
    }

    #[test]
    fn test_tl007_descriptor() {
        let desc = descriptor("web", Some(8080));
        assert_eq!(get_in(&desc, &["name"]).and_then(Value::as_str), Some("web"));
        assert_eq!(
            get_in(&desc, &["labels", "app"]).and_then(Value::as_str),
            Some("web")
        );
        assert_eq!(get_in(&desc, &["port"]).and_then(Value::as_u64), Some(8080));

        let no_port = descriptor("db", None);
        assert!(get_in(&no_port, &["port"]).is_none());
    }
}
