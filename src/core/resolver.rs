//! TL-003: Demand-driven resolution — memoized recursion over the rule graph.
//!
//! Resolving a key yields every manifest its closure needs, dependency-first
//! and duplicate-free, plus the key's descriptor value. Each top-level call
//! owns its own memo and in-progress path; a key re-entered while still in
//! progress is a cycle.

use super::injector::Injector;
use super::types::Manifest;
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::Arc;

/// The outcome of resolving one key.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    /// Dependency-ordered, duplicate-free manifests
    pub manifests: Vec<Manifest>,

    /// Descriptor value exposed to dependents
    pub value: serde_yaml_ng::Value,
}

/// Resolution failure. Every variant aborts the whole call; none is
/// retryable without changing the injector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The key has neither a rule nor a configuration value
    Unknown { key: String },

    /// The key was re-encountered while still in progress
    Cycle { path: Vec<String> },

    /// A builder failed; the reason is propagated unchanged
    Builder { key: String, reason: String },
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown { key } => {
                write!(f, "unknown resource '{}' (no rule or configuration value)", key)
            }
            Self::Cycle { path } => write!(f, "dependency cycle: {}", path.join(" -> ")),
            Self::Builder { key, reason } => write!(f, "builder for '{}' failed: {}", key, reason),
        }
    }
}

impl std::error::Error for ResolveError {}

/// Per-call scratch state. Never shared across top-level calls, so unrelated
/// earlier resolutions cannot produce false cycles.
struct ResolveCtx {
    memo: FxHashMap<String, Resolved>,
    in_progress: Vec<String>,
}

/// Resolve `key` against `injector`.
///
/// Rules shadow configuration values of the same name; a key with neither
/// fails as unknown. A rule's builder runs at most once per call. Manifests
/// merge dependency-first in declared order, and a candidate is appended
/// only if no structurally equal manifest already appears earlier in the
/// merged list.
pub fn get_resource(injector: &Injector, key: &str) -> Result<Resolved, ResolveError> {
    let mut ctx = ResolveCtx {
        memo: FxHashMap::default(),
        in_progress: Vec::new(),
    };
    resolve_key(injector, key, &mut ctx)
}

fn resolve_key(injector: &Injector, key: &str, ctx: &mut ResolveCtx) -> Result<Resolved, ResolveError> {
    if let Some(hit) = ctx.memo.get(key) {
        return Ok(hit.clone());
    }
    if let Some(pos) = ctx.in_progress.iter().position(|k| k == key) {
        let mut path = ctx.in_progress[pos..].to_vec();
        path.push(key.to_string());
        return Err(ResolveError::Cycle { path });
    }

    let rule = match injector.registry().get(key) {
        Some(rule) => Arc::clone(rule),
        None => {
            // Configuration passthrough: no manifests, the literal value.
            return match injector.value(key) {
                Some(value) => Ok(Resolved {
                    manifests: Vec::new(),
                    value: value.clone(),
                }),
                None => Err(ResolveError::Unknown {
                    key: key.to_string(),
                }),
            };
        }
    };

    ctx.in_progress.push(key.to_string());

    let mut dep_values = Vec::with_capacity(rule.deps.len());
    let mut manifests: Vec<Manifest> = Vec::new();
    for dep in &rule.deps {
        let resolved = resolve_key(injector, dep, ctx)?;
        for manifest in &resolved.manifests {
            if !manifests.contains(manifest) {
                manifests.push(manifest.clone());
            }
        }
        dep_values.push(resolved.value);
    }

    let output = (rule.build)(&dep_values).map_err(|reason| ResolveError::Builder {
        key: key.to_string(),
        reason,
    })?;
    for manifest in output.manifests {
        if !manifests.contains(&manifest) {
            manifests.push(manifest);
        }
    }

    ctx.in_progress.pop();

    let resolved = Resolved {
        manifests,
        value: output.value,
    };
    ctx.memo.insert(key.to_string(), resolved.clone());
    Ok(resolved)
}
