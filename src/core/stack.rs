//! TL-011: Stack expansion — declared resources into injector rules.
//!
//! A parsed stack file becomes a module: one rule per declared resource, in
//! declaration order. Rule dependencies are the declaration's `depends_on`
//! verbatim, so declared resources and configuration values mix freely as
//! dependency keys.

use super::injector::{Injector, Module, Output};
use super::parser;
use super::types::*;
use crate::builders::{network, record, storage, workload};
use serde_yaml_ng::Value;

/// Build a module from a parsed stack file. Templates are resolved against
/// the file's values when the module is applied.
pub fn module(config: StackConfig) -> Module {
    Box::new(move |mut injector: Injector| {
        for (id, decl) in &config.resources {
            let decl = parser::resolve_decl_templates(decl, &config.values)
                .map_err(|e| format!("resource '{}': {}", id, e))?;
            injector = register(injector, id, decl)?;
        }
        Ok(injector)
    })
}

fn register(injector: Injector, id: &str, decl: ResourceDecl) -> Result<Injector, String> {
    match decl.resource_type {
        ResourceType::Workload => register_workload(injector, id, decl),
        ResourceType::Exposure => register_exposure(injector, id, decl),
        ResourceType::Claim => register_claim(injector, id, decl),
        ResourceType::Manifest => register_manifest(injector, id, decl),
    }
}

fn object_name(id: &str, decl: &ResourceDecl) -> String {
    decl.name.clone().unwrap_or_else(|| id.to_string())
}

fn as_port(field: &str, value: &Value) -> Result<u64, String> {
    value
        .as_u64()
        .ok_or_else(|| format!("{} must be a number, got '{}'", field, yaml_value_to_string(value)))
}

fn register_workload(injector: Injector, id: &str, decl: ResourceDecl) -> Result<Injector, String> {
    let name = object_name(id, &decl);
    let deps = decl.depends_on.clone();
    let build = move |_deps: &[Value]| -> Result<Output, String> {
        let image = decl.image.as_deref().ok_or("missing image")?;
        let replicas = match decl.replicas {
            None => 1,
            Some(ref value) => value.as_u64().ok_or_else(|| {
                format!("replicas must be a number, got '{}'", yaml_value_to_string(value))
            })?,
        };
        let port = match decl.port {
            None => None,
            Some(ref value) => Some(as_port("port", value)?),
        };

        let mut main = workload::container(&name, image);
        if let Some(port) = port {
            main = workload::with_port(main, port);
        }
        for (key, value) in &decl.env {
            main = workload::add_env(main, key, value);
        }

        let mut manifest = workload::add_container(workload::workload(&name, replicas), main);
        if let Some(ref spec) = decl.storage {
            let template = storage::claim_template(&spec.name, &spec.size, spec.class.as_deref());
            manifest = storage::attach_claim(manifest, template, &spec.mount_path);
        }

        Ok(Output::new(vec![manifest], workload::descriptor(&name, port)))
    };

    let dep_refs: Vec<&str> = deps.iter().map(String::as_str).collect();
    injector.rule(id, &dep_refs, build)
}

fn register_exposure(injector: Injector, id: &str, decl: ResourceDecl) -> Result<Injector, String> {
    let name = object_name(id, &decl);
    let backend = decl
        .backend
        .clone()
        .ok_or_else(|| format!("resource '{}': exposure has no backend", id))?;
    let backend_pos = decl
        .depends_on
        .iter()
        .position(|dep| *dep == backend)
        .ok_or_else(|| {
            format!("resource '{}': backend '{}' must be listed in depends_on", id, backend)
        })?;

    let deps = decl.depends_on.clone();
    let build = move |resolved: &[Value]| -> Result<Output, String> {
        let port = match decl.port {
            None => return Err("missing port".to_string()),
            Some(ref value) => as_port("port", value)?,
        };
        let target_port = match decl.target_port {
            None => None,
            Some(ref value) => Some(as_port("target_port", value)?),
        };

        let service = network::expose(&resolved[backend_pos], &name, port, target_port);
        let descriptor = record::mapping(vec![
            ("name", name.as_str().into()),
            ("port", Value::from(port)),
        ]);
        Ok(Output::new(vec![service], descriptor))
    };

    let dep_refs: Vec<&str> = deps.iter().map(String::as_str).collect();
    injector.rule(id, &dep_refs, build)
}

fn register_claim(injector: Injector, id: &str, decl: ResourceDecl) -> Result<Injector, String> {
    let name = object_name(id, &decl);
    let deps = decl.depends_on.clone();
    let build = move |_deps: &[Value]| -> Result<Output, String> {
        let size = decl.size.as_deref().ok_or("missing size")?;
        let manifest = storage::claim(&name, size, decl.class.as_deref());
        let descriptor = record::mapping(vec![("name", name.as_str().into())]);
        Ok(Output::new(vec![manifest], descriptor))
    };

    let dep_refs: Vec<&str> = deps.iter().map(String::as_str).collect();
    injector.rule(id, &dep_refs, build)
}

fn register_manifest(injector: Injector, id: &str, decl: ResourceDecl) -> Result<Injector, String> {
    let name = object_name(id, &decl);
    let deps = decl.depends_on.clone();
    let build = move |_deps: &[Value]| -> Result<Output, String> {
        let manifest = decl.manifest.clone().ok_or("missing manifest record")?;
        let descriptor = decl
            .export
            .clone()
            .unwrap_or_else(|| record::mapping(vec![("name", name.as_str().into())]));
        Ok(Output::new(vec![manifest], descriptor))
    };

    let dep_refs: Vec<&str> = deps.iter().map(String::as_str).collect();
    injector.rule(id, &dep_refs, build)
}
