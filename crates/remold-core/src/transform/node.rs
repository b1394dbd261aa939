//! Node-level declarations shared by every transformer variant
//!
//! Each schema node may carry an `if` guard, `ctx` entries, `plugins`
//! aliases, and `computed` bindings. The guard gates the whole node; the
//! rest layer a child environment over the inherited one, local declarations
//! winning on key collision.

use crate::error::{Error, Result};
use crate::expr::{truthy, Expr};
use crate::registers::{Register, RegisterPath, Registers, Segment};
use crate::schema::SchemaNode;
use crate::transform::Transformer;
use serde_json::{Map, Value};

/// Guard, context, plugin aliases, and computed bindings of one node
#[derive(Debug, Clone)]
pub struct NodeCommon {
    guard: Option<Expr>,
    ctx: Map<String, Value>,
    plugin_aliases: Vec<(String, RegisterPath)>,
    computed: Vec<(String, Transformer)>,
}

impl NodeCommon {
    pub fn build(schema: &SchemaNode) -> Result<Self> {
        let guard = schema.guard.as_ref().map(Expr::compile).transpose()?;

        let mut plugin_aliases = Vec::with_capacity(schema.plugins.len());
        for (name, descriptor) in &schema.plugins {
            let path = RegisterPath::parse(descriptor).map_err(|_| {
                Error::schema(format!(
                    "plugin descriptor for `{}` must be a `$1.` reference, got `{}`",
                    name, descriptor
                ))
            })?;
            if path.register != Register::Plugins
                || !matches!(path.segments.as_slice(), [Segment::Key(_)])
            {
                return Err(Error::schema(format!(
                    "plugin descriptor for `{}` must name exactly one register-1 entry, got `{}`",
                    name, descriptor
                )));
            }
            plugin_aliases.push((name.clone(), path));
        }

        let mut computed = Vec::with_capacity(schema.computed.len());
        for (name, child) in &schema.computed {
            computed.push((name.clone(), Transformer::build(child)?));
        }

        Ok(NodeCommon {
            guard,
            ctx: schema.ctx.clone(),
            plugin_aliases,
            computed,
        })
    }

    /// Evaluate the `if` guard against the inherited environment.
    /// A node without a guard always passes.
    pub fn passes_gate(&self, env: &Registers) -> Result<bool> {
        match &self.guard {
            None => Ok(true),
            Some(guard) => Ok(truthy(&guard.eval(env)?)),
        }
    }

    /// Build the environment this node's mapping and children evaluate in:
    /// `ctx` and plugin aliases merge over the inherited registers, then
    /// `computed` bindings are invoked against that scope and layered on top
    /// (overriding `ctx` entries of the same name). Computed bindings do not
    /// see each other.
    pub fn scope(&self, env: &Registers) -> Result<Registers> {
        let scoped = env.scoped(&self.ctx, &self.plugin_aliases)?;
        if self.computed.is_empty() {
            return Ok(scoped);
        }

        let mut bindings = Vec::with_capacity(self.computed.len());
        for (name, transformer) in &self.computed {
            match transformer.invoke(&scoped)? {
                Some(value) => bindings.push((name.clone(), value)),
                None => log::warn!("computed binding `{}` was gated off; omitted", name),
            }
        }
        Ok(scoped.layered(bindings))
    }
}
