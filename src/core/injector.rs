//! TL-002: Rule registry and injector — immutable assembly of named rules.
//!
//! An injector pairs frozen configuration values with a registry of named
//! rules. Extension is pure: adding a rule returns a new injector and leaves
//! the original untouched, so injectors derived from earlier modules stay
//! valid while later modules keep composing.

use super::types::Manifest;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// What a builder produces: manifests plus the descriptor value exposed to
/// dependents.
#[derive(Debug, Clone, PartialEq)]
pub struct Output {
    /// Manifests this resource contributes (dependency manifests excluded)
    pub manifests: Vec<Manifest>,

    /// Descriptor value handed to dependent builders
    pub value: serde_yaml_ng::Value,
}

impl Output {
    pub fn new(manifests: Vec<Manifest>, value: serde_yaml_ng::Value) -> Self {
        Self { manifests, value }
    }
}

/// Builder function — resolved dependency values in declared order, in;
/// manifests and a descriptor value, out.
pub type BuildFn = dyn Fn(&[serde_yaml_ng::Value]) -> Result<Output, String> + Send + Sync;

/// A named resource definition: ordered dependency keys plus a builder.
pub struct Rule {
    /// Dependency keys, resolved in this order before the builder runs
    pub deps: Vec<String>,

    /// Builder invoked with one resolved value per dependency
    pub build: Box<BuildFn>,
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("deps", &self.deps)
            .finish_non_exhaustive()
    }
}

/// Immutable mapping from resource key to rule.
///
/// Adding an entry clones the index and shares every existing rule, so
/// registries derived earlier are unaffected by later additions.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: IndexMap<String, Arc<Rule>>,
}

impl Registry {
    pub fn get(&self, key: &str) -> Option<&Arc<Rule>> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Registered keys, in registration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn with(&self, key: String, rule: Arc<Rule>) -> Self {
        let mut entries = self.entries.clone();
        entries.insert(key, rule);
        Self { entries }
    }
}

/// Immutable pairing of configuration values and a rule registry.
#[derive(Debug, Clone)]
pub struct Injector {
    values: Arc<HashMap<String, serde_yaml_ng::Value>>,
    registry: Registry,
}

impl Injector {
    /// Create an injector over a frozen configuration mapping. The registry
    /// starts empty.
    pub fn new(values: HashMap<String, serde_yaml_ng::Value>) -> Self {
        Self {
            values: Arc::new(values),
            registry: Registry::default(),
        }
    }

    /// Look up a configuration value.
    pub fn value(&self, key: &str) -> Option<&serde_yaml_ng::Value> {
        self.values.get(key)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn has_rule(&self, key: &str) -> bool {
        self.registry.contains(key)
    }

    /// Register a rule. Rejects a key that already has one; override
    /// deliberately with [`Injector::replace_rule`].
    pub fn rule<F>(self, key: &str, deps: &[&str], build: F) -> Result<Self, String>
    where
        F: Fn(&[serde_yaml_ng::Value]) -> Result<Output, String> + Send + Sync + 'static,
    {
        if self.registry.contains(key) {
            return Err(format!(
                "rule '{}' already registered (use replace_rule to override)",
                key
            ));
        }
        Ok(self.replace_rule(key, deps, build))
    }

    /// Register a rule, overriding any existing one for the key.
    pub fn replace_rule<F>(self, key: &str, deps: &[&str], build: F) -> Self
    where
        F: Fn(&[serde_yaml_ng::Value]) -> Result<Output, String> + Send + Sync + 'static,
    {
        let rule = Arc::new(Rule {
            deps: deps.iter().map(|d| (*d).to_string()).collect(),
            build: Box::new(build),
        });
        Self {
            values: self.values,
            registry: self.registry.with(key.to_string(), rule),
        }
    }
}

/// A module — a composable injector extension.
pub type Module = Box<dyn FnOnce(Injector) -> Result<Injector, String>>;

/// Apply modules in sequence over a base injector.
pub fn compose<I>(base: Injector, modules: I) -> Result<Injector, String>
where
    I: IntoIterator<Item = Module>,
{
    let mut injector = base;
    for module in modules {
        injector = module(injector)?;
    }
    Ok(injector)
}
