//! Plugin registry backing register 1
//!
//! A plugin is a named invocable extending the operation vocabulary available
//! to expressions. Plugins are authored in Rust and registered
//! programmatically; the evaluator applies them to eagerly evaluated argument
//! values and wraps any failure they report.

use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Error type plugins report; the evaluator wraps it into `Error::Evaluation`
pub type PluginError = Box<dyn std::error::Error + Send + Sync>;

/// Result of a plugin invocation
pub type PluginResult = std::result::Result<Value, PluginError>;

/// A plugin invocable: evaluated argument values in, JSON value out
pub type PluginFn = Arc<dyn Fn(&[Value]) -> PluginResult + Send + Sync>;

/// Mapping from operation name to invocable
#[derive(Clone, Default)]
pub struct PluginRegistry {
    entries: HashMap<String, PluginFn>,
}

impl PluginRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Register an invocable under a name, replacing any previous entry
    pub fn register<F>(&mut self, name: impl Into<String>, plugin: F)
    where
        F: Fn(&[Value]) -> PluginResult + Send + Sync + 'static,
    {
        self.entries.insert(name.into(), Arc::new(plugin));
    }

    /// Insert an already-wrapped invocable under a name
    pub fn insert(&mut self, name: impl Into<String>, plugin: PluginFn) {
        self.entries.insert(name.into(), plugin);
    }

    /// Look up an invocable by name
    pub fn get(&self, name: &str) -> Option<&PluginFn> {
        self.entries.get(name)
    }

    /// Whether a plugin is registered under this name
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of registered plugins
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("PluginRegistry")
            .field("names", &names)
            .finish()
    }
}
