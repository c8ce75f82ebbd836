//! TL-008: Network exposure — Service-shaped records over a workload.

use super::record::{get_in, mapping};
use crate::core::types::Manifest;
use serde_yaml_ng::Value;

/// Wrap a workload in a network-exposure record. The backend descriptor
/// supplies the selector labels and the default target port.
pub fn expose(backend: &Value, name: &str, port: u64, target_port: Option<u64>) -> Manifest {
    let selector = get_in(backend, &["labels"])
        .cloned()
        .unwrap_or_else(|| mapping(Vec::new()));
    let target = target_port
        .or_else(|| get_in(backend, &["port"]).and_then(Value::as_u64))
        .unwrap_or(port);
    mapping(vec![
        ("apiVersion", "v1".into()),
        ("kind", "Service".into()),
        ("metadata", mapping(vec![("name", name.into())])),
        (
            "spec",
            mapping(vec![
                ("selector", selector),
                (
                    "ports",
                    Value::Sequence(vec![mapping(vec![
                        ("port", Value::from(port)),
                        ("targetPort", Value::from(target)),
                    ])]),
                ),
            ]),
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::workload::descriptor;

    #[test]
    fn test_tl008_expose_selects_backend_labels() {
        let record = expose(&descriptor("web", Some(8080)), "web-svc", 80, None);
        assert_eq!(get_in(&record, &["kind"]).and_then(Value::as_str), Some("Service"));
        assert_eq!(
            get_in(&record, &["metadata", "name"]).and_then(Value::as_str),
            Some("web-svc")
        );
        assert_eq!(
            get_in(&record, &["spec", "selector", "app"]).and_then(Value::as_str),
            Some("web")
        );
    }

    #[test]
    fn test_tl008_target_port_defaults_to_backend_port() {
        let record = expose(&descriptor("web", Some(8080)), "web-svc", 80, None);
        let ports = get_in(&record, &["spec", "ports"])
            .and_then(Value::as_sequence)
            .unwrap();
        assert_eq!(ports[0].get("port").and_then(Value::as_u64), Some(80));
        assert_eq!(ports[0].get("targetPort").and_then(Value::as_u64), Some(8080));
    }

    #[test]
    fn test_tl008_explicit_target_port_wins() {
        let record = expose(&descriptor("web", Some(8080)), "web-svc", 80, Some(9000));
        let ports = get_in(&record, &["spec", "ports"])
            .and_then(Value::as_sequence)
            .unwrap();
        assert_eq!(ports[0].get("targetPort").and_then(Value::as_u64), Some(9000));
    }

    #[test]
    fn test_tl008_target_port_falls_back_to_port() {
        let record = expose(&descriptor("db", None), "db-svc", 5432, None);
        let ports = get_in(&record, &["spec", "ports"])
            .and_then(Value::as_sequence)
            .unwrap();
        assert_eq!(ports[0].get("targetPort").and_then(Value::as_u64), Some(5432));
    }
}
