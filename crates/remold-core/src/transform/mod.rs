//! Transformer dispatch: schema nodes compiled into invocable variants
//!
//! A transformer is the in-memory realization of a schema node. The variant
//! set is closed and small — Literal, Expr, Tuple, List, Object — so dispatch
//! is an exhaustive match over a tagged enum rather than open-ended virtual
//! dispatch.
//!
//! # Module Organization
//!
//! - [`node`] - declarations shared by every variant (guard, ctx, plugins,
//!   computed bindings) and their scoping rules
//! - [`variants`] - the five variants and their invocation semantics
//! - [`tests`] - test suite for dispatch, scoping, and gating
//!
//! # Example
//!
//! ```
//! use remold_core::{SchemaNode, Transformer};
//! use serde_json::json;
//!
//! let schema = SchemaNode::from_value(&json!({
//!     "type": "expr",
//!     "mapping": ["$0.rec"],
//!     "ctx": {"rec": {"foo": {"foo": 1}}}
//! })).unwrap();
//!
//! let transformer = Transformer::build(&schema).unwrap();
//! let output = transformer.invoke_root().unwrap();
//! assert_eq!(output, json!({"foo": {"foo": 1}}));
//! ```

pub mod node;
pub mod variants;


pub use node::NodeCommon;
pub use variants::{
    ExprTransformer, ListTransformer, LiteralTransformer, ObjectTransformer, TupleTransformer,
};

use crate::error::Result;
use crate::registers::Registers;
use crate::schema::{NodeKind, SchemaNode};
use serde_json::Value;

/// A compiled transformer, one variant per schema node kind
#[derive(Debug, Clone)]
pub enum Transformer {
    Literal(LiteralTransformer),
    Expr(ExprTransformer),
    Tuple(TupleTransformer),
    List(ListTransformer),
    Object(ObjectTransformer),
}

impl Transformer {
    /// Compile a schema node into the matching transformer variant.
    ///
    /// This is the single construction entry point: nested schema nodes are
    /// compiled depth-first, once, before any invocation. Construction
    /// performs no I/O and fails only for schema shape violations.
    pub fn build(schema: &SchemaNode) -> Result<Transformer> {
        match schema.kind {
            NodeKind::Literal => LiteralTransformer::build(schema).map(Transformer::Literal),
            NodeKind::Expr => ExprTransformer::build(schema).map(Transformer::Expr),
            NodeKind::Tuple => TupleTransformer::build(schema).map(Transformer::Tuple),
            NodeKind::List => ListTransformer::build(schema).map(Transformer::List),
            NodeKind::Object => ObjectTransformer::build(schema).map(Transformer::Object),
        }
    }

    /// Invoke this transformer against an environment.
    ///
    /// Returns `Ok(None)` when the node's `if` guard evaluated falsy: the
    /// node contributes nothing, and enclosing composites omit it rather
    /// than null-filling. The guard is checked against the inherited
    /// environment; the node's own `ctx`, `plugins`, and `computed`
    /// declarations scope its mapping and children only.
    pub fn invoke(&self, env: &Registers) -> Result<Option<Value>> {
        let common = self.common();
        if !common.passes_gate(env)? {
            return Ok(None);
        }
        let scoped = common.scope(env)?;
        self.produce(&scoped).map(Some)
    }

    /// Invoke with an outer environment, rendering a gated-off root as null
    pub fn invoke_with(&self, env: &Registers) -> Result<Value> {
        Ok(self.invoke(env)?.unwrap_or(Value::Null))
    }

    /// Invoke with an empty context/plugins pair
    pub fn invoke_root(&self) -> Result<Value> {
        self.invoke_with(&Registers::new())
    }

    /// The kind of schema node this transformer was compiled from
    pub fn kind(&self) -> NodeKind {
        match self {
            Transformer::Literal(_) => NodeKind::Literal,
            Transformer::Expr(_) => NodeKind::Expr,
            Transformer::Tuple(_) => NodeKind::Tuple,
            Transformer::List(_) => NodeKind::List,
            Transformer::Object(_) => NodeKind::Object,
        }
    }

    fn common(&self) -> &NodeCommon {
        match self {
            Transformer::Literal(t) => &t.common,
            Transformer::Expr(t) => &t.common,
            Transformer::Tuple(t) => &t.common,
            Transformer::List(t) => &t.common,
            Transformer::Object(t) => &t.common,
        }
    }

    fn produce(&self, env: &Registers) -> Result<Value> {
        match self {
            Transformer::Literal(t) => t.produce(env),
            Transformer::Expr(t) => t.produce(env),
            Transformer::Tuple(t) => t.produce(env),
            Transformer::List(t) => t.produce(env),
            Transformer::Object(t) => t.produce(env),
        }
    }
}
