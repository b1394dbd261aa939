//! Remold Core - Schema-driven JSON-to-JSON transformation engine
//!
//! This crate provides the core functionality for deriving an output JSON
//! value from an input context, driven by a declarative schema document with
//! an Excel-formula-like expression language.
//!
//! # Main Components
//!
//! - **Error Handling**: Closed error taxonomy using `thiserror`, with
//!   construction-time and invocation-time failures kept distinguishable
//! - **Schema Nodes**: The parsed, immutable templates transformers are
//!   compiled from
//! - **Register Environment**: The two-slot addressing model (`$0` context,
//!   `$1` plugins) expressions use to reach external data and functions
//! - **Expression Evaluator**: Recursive, eager reduction of expression
//!   trees, with a fixed built-in operator vocabulary
//! - **Transformers**: The five-variant dispatch system that walks a schema
//!   and produces output
//!
//! # Example
//!
//! ```
//! use remold_core::{transform, Result};
//! use serde_json::json;
//!
//! fn example() -> Result<()> {
//!     let schema = json!({
//!         "type": "object",
//!         "mapping": {
//!             "a": {"type": "literal", "mapping": 1},
//!             "b": {"type": "expr", "mapping": ["add", "$0.base", 1]}
//!         }
//!     });
//!     let output = transform(&schema, json!({"base": 41}))?;
//!     assert_eq!(output, json!({"a": 1, "b": 42}));
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod expr;
pub mod registers;
pub mod schema;
pub mod transform;

// Re-export main types for convenience
pub use error::{Error, Result};
pub use expr::{truthy, Expr, OpRef};
pub use registers::{
    PluginError, PluginFn, PluginRegistry, PluginResult, Register, RegisterPath, Registers,
    Segment,
};
pub use schema::{NodeKind, SchemaNode};
pub use transform::{
    ExprTransformer, ListTransformer, LiteralTransformer, ObjectTransformer, Transformer,
    TupleTransformer,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Transform a context value with a schema document in one call.
///
/// Parses the schema, compiles it, and invokes it with `context` seeding
/// register 0 and no plugins registered. A gated-off root yields JSON null.
pub fn transform(schema: &serde_json::Value, context: serde_json::Value) -> Result<serde_json::Value> {
    let node = SchemaNode::from_value(schema)?;
    let transformer = Transformer::build(&node)?;
    transformer.invoke_with(&Registers::new().with_context(context))
}
