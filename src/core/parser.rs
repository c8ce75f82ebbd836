//! TL-004: Stack file parsing, template resolution, and validation.
//!
//! Parses telar.yaml and validates structural constraints:
//! - Version must be "1.0"
//! - depends_on references must name a declared resource or a value
//! - Required fields per resource type
//!
//! Template strings reference configuration values as `{{values.key}}`. A
//! string that is exactly one template resolves to the referenced value
//! itself, keeping its type; embedded templates splice the value as text.

use super::types::*;
use serde_yaml_ng::Value;
use std::collections::HashMap;
use std::path::Path;

/// Validation error.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Parse a telar.yaml file from disk.
pub fn parse_config_file(path: &Path) -> Result<StackConfig, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {}", path.display(), e))?;
    parse_config(&content)
}

/// Parse a telar.yaml from a string.
pub fn parse_config(yaml: &str) -> Result<StackConfig, String> {
    serde_yaml_ng::from_str(yaml).map_err(|e| format!("YAML parse error: {}", e))
}

/// Resolve all templates in a string, splicing referenced values as text.
pub fn resolve_str(template: &str, values: &HashMap<String, Value>) -> Result<String, String> {
    let mut result = template.to_string();
    let mut start = 0;

    while let Some(open) = result[start..].find("{{") {
        let open = start + open;
        let close = result[open..]
            .find("}}")
            .ok_or_else(|| format!("unclosed template at position {}", open))?;
        let close = open + close + 2;
        let key = result[open + 2..close - 2].trim();

        let value = if let Some(value_key) = key.strip_prefix("values.") {
            values
                .get(value_key)
                .map(yaml_value_to_string)
                .ok_or_else(|| format!("unknown value: {}", value_key))?
        } else {
            return Err(format!("unknown template variable: {}", key));
        };

        result.replace_range(open..close, &value);
        start = open + value.len();
    }

    Ok(result)
}

/// Resolve templates in a value. A string that is exactly one
/// `{{values.key}}` template becomes the referenced value itself; other
/// strings are spliced as text; mappings and sequences recurse.
pub fn resolve_value(value: &Value, values: &HashMap<String, Value>) -> Result<Value, String> {
    match value {
        Value::String(s) => {
            if let Some(key) = full_template(s) {
                return values
                    .get(key)
                    .cloned()
                    .ok_or_else(|| format!("unknown value: {}", key));
            }
            Ok(Value::String(resolve_str(s, values)?))
        }
        Value::Sequence(seq) => {
            let resolved = seq
                .iter()
                .map(|item| resolve_value(item, values))
                .collect::<Result<Vec<Value>, String>>()?;
            Ok(Value::Sequence(resolved))
        }
        Value::Mapping(map) => {
            let mut resolved = serde_yaml_ng::Mapping::new();
            for (k, v) in map {
                resolved.insert(k.clone(), resolve_value(v, values)?);
            }
            Ok(Value::Mapping(resolved))
        }
        other => Ok(other.clone()),
    }
}

/// Extract the key of a string that is exactly one `{{values.key}}`.
fn full_template(s: &str) -> Option<&str> {
    let inner = s.trim().strip_prefix("{{")?.strip_suffix("}}")?;
    if inner.contains("{{") || inner.contains("}}") {
        return None;
    }
    inner.trim().strip_prefix("values.").filter(|key| !key.is_empty())
}

/// Resolve all templates in a declaration's fields.
pub fn resolve_decl_templates(
    decl: &ResourceDecl,
    values: &HashMap<String, Value>,
) -> Result<ResourceDecl, String> {
    let mut resolved = decl.clone();

    if let Some(ref name) = resolved.name {
        resolved.name = Some(resolve_str(name, values)?);
    }
    if let Some(ref image) = resolved.image {
        resolved.image = Some(resolve_str(image, values)?);
    }
    if let Some(ref replicas) = resolved.replicas {
        resolved.replicas = Some(resolve_value(replicas, values)?);
    }
    if let Some(ref port) = resolved.port {
        resolved.port = Some(resolve_value(port, values)?);
    }
    if let Some(ref target_port) = resolved.target_port {
        resolved.target_port = Some(resolve_value(target_port, values)?);
    }
    if let Some(ref size) = resolved.size {
        resolved.size = Some(resolve_str(size, values)?);
    }
    if let Some(ref class) = resolved.class {
        resolved.class = Some(resolve_str(class, values)?);
    }
    for value in resolved.env.values_mut() {
        *value = resolve_value(value, values)?;
    }
    if let Some(ref mut storage) = resolved.storage {
        storage.name = resolve_str(&storage.name, values)?;
        storage.size = resolve_str(&storage.size, values)?;
        storage.mount_path = resolve_str(&storage.mount_path, values)?;
        if let Some(ref class) = storage.class {
            storage.class = Some(resolve_str(class, values)?);
        }
    }
    if let Some(ref manifest) = resolved.manifest {
        resolved.manifest = Some(resolve_value(manifest, values)?);
    }
    if let Some(ref export) = resolved.export {
        resolved.export = Some(resolve_value(export, values)?);
    }

    Ok(resolved)
}

/// Validate a parsed config. Returns a list of errors (empty = valid).
pub fn validate_config(config: &StackConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if config.version != "1.0" {
        errors.push(ValidationError {
            message: format!("version must be \"1.0\", got \"{}\"", config.version),
        });
    }

    if config.name.is_empty() {
        errors.push(ValidationError {
            message: "name must not be empty".to_string(),
        });
    }

    for (id, decl) in &config.resources {
        for dep in &decl.depends_on {
            if !config.resources.contains_key(dep) && !config.values.contains_key(dep) {
                errors.push(ValidationError {
                    message: format!(
                        "resource '{}' depends on unknown resource or value '{}'",
                        id, dep
                    ),
                });
            }
            if dep == id {
                errors.push(ValidationError {
                    message: format!("resource '{}' depends on itself", id),
                });
            }
        }

        match decl.resource_type {
            ResourceType::Workload => {
                if decl.image.is_none() {
                    errors.push(ValidationError {
                        message: format!("resource '{}' (workload) has no image", id),
                    });
                }
            }
            ResourceType::Exposure => {
                if decl.port.is_none() {
                    errors.push(ValidationError {
                        message: format!("resource '{}' (exposure) has no port", id),
                    });
                }
                match decl.backend {
                    None => {
                        errors.push(ValidationError {
                            message: format!("resource '{}' (exposure) has no backend", id),
                        });
                    }
                    Some(ref backend) => {
                        match config.resources.get(backend) {
                            None => {
                                errors.push(ValidationError {
                                    message: format!(
                                        "resource '{}' references unknown backend '{}'",
                                        id, backend
                                    ),
                                });
                            }
                            Some(target) => {
                                if target.resource_type != ResourceType::Workload {
                                    errors.push(ValidationError {
                                        message: format!(
                                            "resource '{}' backend '{}' is not a workload",
                                            id, backend
                                        ),
                                    });
                                }
                            }
                        }
                        if !decl.depends_on.contains(backend) {
                            errors.push(ValidationError {
                                message: format!(
                                    "resource '{}' backend '{}' must be listed in depends_on",
                                    id, backend
                                ),
                            });
                        }
                    }
                }
            }
            ResourceType::Claim => {
                if decl.size.is_none() {
                    errors.push(ValidationError {
                        message: format!("resource '{}' (claim) has no size", id),
                    });
                }
            }
            ResourceType::Manifest => match decl.manifest {
                None => {
                    errors.push(ValidationError {
                        message: format!("resource '{}' (manifest) has no manifest record", id),
                    });
                }
                Some(ref manifest) => {
                    if !manifest.is_mapping() {
                        errors.push(ValidationError {
                            message: format!(
                                "resource '{}' (manifest) record must be a mapping",
                                id
                            ),
                        });
                    }
                }
            },
        }
    }

    errors
}
