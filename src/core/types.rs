//! TL-001: Stack schema types.
//!
//! Defines the YAML schema for telar.yaml: stack metadata, configuration
//! values, and resource declarations. All types derive Serialize/Deserialize
//! for YAML roundtripping.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A manifest or descriptor value — an opaque nested record.
///
/// Equality is structural (deep value equality), which is what drives
/// manifest deduplication in the resolver.
pub type Manifest = serde_yaml_ng::Value;

// ============================================================================
// Top-level telar.yaml
// ============================================================================

/// Root stack configuration — the declared resources of one stack.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StackConfig {
    /// Schema version (must be "1.0")
    pub version: String,

    /// Human-readable stack name
    pub name: String,

    /// Optional description
    #[serde(default)]
    pub description: Option<String>,

    /// Configuration values — templatable, and resolvable as dependencies
    #[serde(default)]
    pub values: HashMap<String, serde_yaml_ng::Value>,

    /// Resource declarations (order-preserving)
    pub resources: IndexMap<String, ResourceDecl>,
}

// ============================================================================
// Resources
// ============================================================================

/// A single declared resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceDecl {
    /// Resource kind
    #[serde(rename = "type")]
    pub resource_type: ResourceType,

    /// Dependencies (resource IDs or value keys), resolved before this one
    #[serde(default)]
    pub depends_on: Vec<String>,

    /// Object name (defaults to the declaration ID)
    #[serde(default)]
    pub name: Option<String>,

    // -- Workload fields --
    /// Container image
    #[serde(default)]
    pub image: Option<String>,

    /// Replica count — a number or a `{{values.key}}` template
    #[serde(default)]
    pub replicas: Option<serde_yaml_ng::Value>,

    /// Container port (workload) or published port (exposure)
    #[serde(default)]
    pub port: Option<serde_yaml_ng::Value>,

    /// Environment bindings for the main container
    #[serde(default)]
    pub env: IndexMap<String, serde_yaml_ng::Value>,

    /// Storage claim template to attach to the workload
    #[serde(default)]
    pub storage: Option<StorageSpec>,

    // -- Exposure fields --
    /// Backing workload (must also appear in depends_on)
    #[serde(default)]
    pub backend: Option<String>,

    /// Port on the backing workload (defaults to its container port)
    #[serde(default)]
    pub target_port: Option<serde_yaml_ng::Value>,

    // -- Claim fields --
    /// Requested storage size (e.g., "10Gi")
    #[serde(default)]
    pub size: Option<String>,

    /// Storage class name
    #[serde(default)]
    pub class: Option<String>,

    // -- Raw manifest fields --
    /// Literal manifest record, emitted as-is
    #[serde(default)]
    pub manifest: Option<serde_yaml_ng::Value>,

    /// Descriptor exposed to dependents (defaults to `{name}`)
    #[serde(default)]
    pub export: Option<serde_yaml_ng::Value>,
}

/// Resource declaration kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    Workload,
    Exposure,
    Claim,
    Manifest,
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Workload => write!(f, "workload"),
            Self::Exposure => write!(f, "exposure"),
            Self::Claim => write!(f, "claim"),
            Self::Manifest => write!(f, "manifest"),
        }
    }
}

/// Storage claim template attached to a workload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSpec {
    /// Claim name
    pub name: String,

    /// Requested size (e.g., "10Gi")
    pub size: String,

    /// Storage class name
    #[serde(default)]
    pub class: Option<String>,

    /// Where the claim is mounted in the main container
    pub mount_path: String,
}

// ============================================================================
// Template helper
// ============================================================================

/// Convert a serde_yaml_ng::Value to a string for template splicing.
pub fn yaml_value_to_string(val: &serde_yaml_ng::Value) -> String {
    match val {
        serde_yaml_ng::Value::String(s) => s.clone(),
        serde_yaml_ng::Value::Number(n) => n.to_string(),
        serde_yaml_ng::Value::Bool(b) => b.to_string(),
        serde_yaml_ng::Value::Null => String::new(),
        other => format!("{:?}", other),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tl001_config_parse() {
        let yaml = r#"
version: "1.0"
name: test-stack
values:
  replicas: 3
resources:
  web:
    type: workload
    image: nginx:1.27
    port: 8080
  web-svc:
    type: exposure
    backend: web
    port: 80
    depends_on: [web]
"#;
        let config: StackConfig = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.name, "test-stack");
        assert_eq!(config.resources.len(), 2);
        assert_eq!(config.resources["web"].resource_type, ResourceType::Workload);
        assert_eq!(
            config.resources["web-svc"].depends_on,
            vec!["web".to_string()]
        );
    }

    #[test]
    fn test_tl001_decl_defaults() {
        let yaml = r#"
type: workload
image: nginx:1.27
"#;
        let decl: ResourceDecl = serde_yaml_ng::from_str(yaml).unwrap();
        assert!(decl.depends_on.is_empty());
        assert!(decl.name.is_none());
        assert!(decl.replicas.is_none());
        assert!(decl.env.is_empty());
        assert!(decl.storage.is_none());
    }

    #[test]
    fn test_tl001_resource_type_display() {
        assert_eq!(ResourceType::Workload.to_string(), "workload");
        assert_eq!(ResourceType::Exposure.to_string(), "exposure");
        assert_eq!(ResourceType::Claim.to_string(), "claim");
        assert_eq!(ResourceType::Manifest.to_string(), "manifest");
    }

    #[test]
    fn test_tl001_declaration_order_preserved() {
        let yaml = r#"
version: "1.0"
name: ordered
resources:
  zeta:
    type: claim
    size: 1Gi
  alpha:
    type: claim
    size: 1Gi
  mid:
    type: claim
    size: 1Gi
"#;
        let config: StackConfig = serde_yaml_ng::from_str(yaml).unwrap();
        let ids: Vec<&String> = config.resources.keys().collect();
        assert_eq!(ids, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_tl001_storage_spec_parse() {
        let yaml = r#"
type: workload
image: postgres:16
storage:
  name: data
  size: 10Gi
  mount_path: /var/lib/postgresql/data
"#;
        let decl: ResourceDecl = serde_yaml_ng::from_str(yaml).unwrap();
        let storage = decl.storage.unwrap();
        assert_eq!(storage.name, "data");
        assert_eq!(storage.size, "10Gi");
        assert!(storage.class.is_none());
        assert_eq!(storage.mount_path, "/var/lib/postgresql/data");
    }

    #[test]
    fn test_tl001_config_roundtrip() {
        let yaml = r#"
version: "1.0"
name: roundtrip
resources:
  cfg:
    type: manifest
    manifest:
      apiVersion: v1
      kind: ConfigMap
      metadata:
        name: app-config
"#;
        let config: StackConfig = serde_yaml_ng::from_str(yaml).unwrap();
        let rendered = serde_yaml_ng::to_string(&config).unwrap();
        let config2: StackConfig = serde_yaml_ng::from_str(&rendered).unwrap();
        assert_eq!(config2.name, "roundtrip");
        assert_eq!(
            config2.resources["cfg"].resource_type,
            ResourceType::Manifest
        );
    }

    #[test]
    fn test_tl001_yaml_value_to_string() {
        assert_eq!(
            yaml_value_to_string(&serde_yaml_ng::Value::String("hello".into())),
            "hello"
        );
        assert_eq!(yaml_value_to_string(&serde_yaml_ng::Value::from(5u64)), "5");
        assert_eq!(
            yaml_value_to_string(&serde_yaml_ng::Value::Bool(true)),
            "true"
        );
        assert_eq!(yaml_value_to_string(&serde_yaml_ng::Value::Null), "");
    }
}
