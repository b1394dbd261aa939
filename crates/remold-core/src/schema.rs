//! Schema node parsing
//!
//! A schema document is a JSON object describing one transformer node:
//! a required `type` discriminant, a required `mapping` payload whose shape
//! depends on the type, and the optional `ctx`, `plugins`, `if`, and
//! `computed` fields. Nodes are immutable templates; parsing never evaluates
//! anything, and the same parsed node can be compiled and invoked any number
//! of times.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Discriminant for the five schema node kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Literal,
    Expr,
    Tuple,
    List,
    Object,
}

impl NodeKind {
    fn parse(kind: &str) -> Result<Self> {
        match kind {
            "literal" => Ok(NodeKind::Literal),
            "expr" => Ok(NodeKind::Expr),
            "tuple" => Ok(NodeKind::Tuple),
            "list" => Ok(NodeKind::List),
            "object" => Ok(NodeKind::Object),
            other => Err(Error::UnknownType {
                detail: format!("`{}` is not one of literal|expr|tuple|list|object", other),
            }),
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Literal => write!(f, "literal"),
            NodeKind::Expr => write!(f, "expr"),
            NodeKind::Tuple => write!(f, "tuple"),
            NodeKind::List => write!(f, "list"),
            NodeKind::Object => write!(f, "object"),
        }
    }
}

/// A parsed schema node, the declarative template for one transformer
#[derive(Debug, Clone)]
pub struct SchemaNode {
    /// Node kind, from the `type` field
    pub kind: NodeKind,
    /// Payload from the `mapping` field, shape-checked per kind at build time
    pub mapping: Value,
    /// Entries seeding register 0, merged over the inherited context
    pub ctx: Map<String, Value>,
    /// Local name -> `$1.` reference re-exposing an inherited plugin
    pub plugins: Vec<(String, String)>,
    /// Optional gating expression; a falsy result omits the node's output
    pub guard: Option<Value>,
    /// Derived context bindings, evaluated per invocation and merged into
    /// register 0 after `ctx`
    pub computed: Vec<(String, SchemaNode)>,
}

impl SchemaNode {
    /// Parse a schema node from a JSON value.
    ///
    /// Field presence rules: `type` and `mapping` are required; `ctx`,
    /// `plugins`, `if`, and `computed` are optional. Unknown fields are
    /// ignored. The `mapping` payload is carried verbatim here and
    /// shape-checked when the node is compiled into a transformer.
    pub fn from_value(value: &Value) -> Result<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| Error::schema("schema node must be a JSON object"))?;

        let kind = match obj.get("type") {
            None => {
                return Err(Error::UnknownType {
                    detail: "node has no `type` field".to_string(),
                })
            }
            Some(Value::String(kind)) => NodeKind::parse(kind)?,
            Some(other) => {
                return Err(Error::UnknownType {
                    detail: format!("`type` must be a string, got {}", other),
                })
            }
        };

        let mapping = obj
            .get("mapping")
            .cloned()
            .ok_or_else(|| Error::schema(format!("{} node has no `mapping` field", kind)))?;

        let ctx = match obj.get("ctx") {
            None => Map::new(),
            Some(Value::Object(entries)) => entries.clone(),
            Some(other) => {
                return Err(Error::schema(format!(
                    "`ctx` must be an object of name -> value, got {}",
                    other
                )))
            }
        };

        let plugins = match obj.get("plugins") {
            None => Vec::new(),
            Some(Value::Object(entries)) => {
                let mut parsed = Vec::with_capacity(entries.len());
                for (name, descriptor) in entries {
                    match descriptor {
                        Value::String(reference) => {
                            parsed.push((name.clone(), reference.clone()));
                        }
                        other => {
                            return Err(Error::schema(format!(
                                "plugin descriptor for `{}` must be a `$1.` reference string, got {}",
                                name, other
                            )))
                        }
                    }
                }
                parsed
            }
            Some(other) => {
                return Err(Error::schema(format!(
                    "`plugins` must be an object of name -> descriptor, got {}",
                    other
                )))
            }
        };

        let guard = obj.get("if").cloned();

        let computed = match obj.get("computed") {
            None => Vec::new(),
            Some(Value::Object(entries)) => {
                let mut parsed = Vec::with_capacity(entries.len());
                for (name, child) in entries {
                    parsed.push((name.clone(), SchemaNode::from_value(child)?));
                }
                parsed
            }
            Some(other) => {
                return Err(Error::schema(format!(
                    "`computed` must be an object of name -> schema node, got {}",
                    other
                )))
            }
        };

        Ok(SchemaNode {
            kind,
            mapping,
            ctx,
            plugins,
            guard,
            computed,
        })
    }

    /// Parse a schema node from a JSON document string
    pub fn from_str(document: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(document)?;
        Self::from_value(&value)
    }
}
