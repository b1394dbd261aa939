//! Register environment and path resolution
//!
//! Expressions reach everything external through exactly two addressable
//! slots: register 0 holds the context value and register 1 holds the plugin
//! registry. The environment is read-only during evaluation; scoping builds a
//! *new* environment with a node's own declarations shallow-merged over the
//! inherited slots, so siblings and parents are never affected.

pub mod path;
pub mod plugins;

pub use path::{Register, RegisterPath, Segment};
pub use plugins::{PluginError, PluginFn, PluginRegistry, PluginResult};

use crate::error::{Error, Result};
use serde_json::{Map, Value};

/// The two-register environment expressions evaluate against
#[derive(Debug, Clone)]
pub struct Registers {
    /// Register 0: arbitrary JSON context, layered from outer to inner scope
    context: Value,
    /// Register 1: named invocables
    plugins: PluginRegistry,
}

impl Registers {
    /// Create an environment with an empty context and no plugins
    pub fn new() -> Self {
        Self {
            context: Value::Object(Map::new()),
            plugins: PluginRegistry::new(),
        }
    }

    /// Replace the context value (register 0)
    pub fn with_context(mut self, context: Value) -> Self {
        self.context = context;
        self
    }

    /// Register a plugin invocable (register 1)
    pub fn with_plugin<F>(mut self, name: impl Into<String>, plugin: F) -> Self
    where
        F: Fn(&[Value]) -> PluginResult + Send + Sync + 'static,
    {
        self.plugins.register(name, plugin);
        self
    }

    /// Current context value
    pub fn context(&self) -> &Value {
        &self.context
    }

    /// Current plugin registry
    pub fn plugins(&self) -> &PluginRegistry {
        &self.plugins
    }

    /// Parse and resolve a register path string against this environment
    pub fn resolve(&self, path: &str) -> Result<Value> {
        self.resolve_path(&RegisterPath::parse(path)?)
    }

    /// Resolve a parsed register path to a JSON value.
    ///
    /// Register 1 entries are invocables, not JSON values, so a `$1.` path
    /// is only meaningful in the operation-selector position of an
    /// expression; resolving one here is an evaluation error.
    pub fn resolve_path(&self, path: &RegisterPath) -> Result<Value> {
        match path.register {
            Register::Context => {
                let mut current = &self.context;
                for segment in &path.segments {
                    current = step(current, segment, path)?;
                }
                Ok(current.clone())
            }
            Register::Plugins => Err(Error::evaluation(format!(
                "plugin reference `{}` cannot be used as a value",
                path
            ))),
        }
    }

    /// Resolve a `$1.` path to its plugin invocable
    pub fn resolve_plugin(&self, path: &RegisterPath) -> Result<PluginFn> {
        if path.register != Register::Plugins {
            return Err(Error::evaluation(format!(
                "`{}` does not name a plugin; operations come from register 1",
                path
            )));
        }
        let name = match path.segments.as_slice() {
            [Segment::Key(name)] => name,
            _ => {
                return Err(Error::schema(format!(
                    "plugin path `{}` must name exactly one plugin, e.g. `$1.name`",
                    path
                )))
            }
        };
        self.plugins
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownOperation { name: name.clone() })
    }

    /// Build a child environment for a node's subtree.
    ///
    /// The node's `ctx` entries are shallow-merged over the inherited
    /// context, local entries winning on key collision; inherited keys not
    /// overridden remain visible. Plugin aliases re-expose inherited
    /// register-1 entries under local names, following the same merge rule.
    pub fn scoped(&self, ctx: &Map<String, Value>, aliases: &[(String, RegisterPath)]) -> Result<Registers> {
        if ctx.is_empty() && aliases.is_empty() {
            return Ok(self.clone());
        }

        let context = if ctx.is_empty() {
            self.context.clone()
        } else {
            merge_context(&self.context, ctx.iter().map(|(k, v)| (k.clone(), v.clone())))
        };

        let mut plugins = self.plugins.clone();
        for (name, target) in aliases {
            plugins.insert(name.clone(), self.resolve_plugin(target)?);
        }

        Ok(Registers { context, plugins })
    }

    /// Layer additional context entries over register 0, entries winning on
    /// collision. Used for loop-variable and computed bindings.
    pub fn layered(&self, entries: impl IntoIterator<Item = (String, Value)>) -> Registers {
        Registers {
            context: merge_context(&self.context, entries),
            plugins: self.plugins.clone(),
        }
    }
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

/// Shallow-merge entries over a base context, entries winning.
/// A non-object base has no keys to keep and is replaced wholesale.
fn merge_context(base: &Value, entries: impl IntoIterator<Item = (String, Value)>) -> Value {
    let mut merged = base.as_object().cloned().unwrap_or_default();
    for (key, value) in entries {
        merged.insert(key, value);
    }
    Value::Object(merged)
}

/// Walk one accessor step; any miss is a `PathNotFound`
fn step<'a>(current: &'a Value, segment: &Segment, path: &RegisterPath) -> Result<&'a Value> {
    let found = match (segment, current) {
        (Segment::Key(key), Value::Object(map)) => map.get(key),
        (Segment::Index(index), Value::Array(items)) => items.get(*index),
        _ => None,
    };
    found.ok_or_else(|| Error::PathNotFound {
        path: path.to_string(),
        segment: match segment {
            Segment::Key(key) => key.clone(),
            Segment::Index(index) => format!("[{}]", index),
        },
    })
}
