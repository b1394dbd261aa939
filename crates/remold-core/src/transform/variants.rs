//! The five transformer variants and their invocation semantics
//!
//! Each variant is a pure function of its compiled mapping and the register
//! environment it is invoked with. Composite variants (Tuple, List, Object)
//! invoke child transformers against their scoped environment and omit
//! children whose guards evaluate falsy — omitted slots shift, they are
//! never null-filled.

use crate::error::{Error, Result};
use crate::expr::Expr;
use crate::registers::Registers;
use crate::schema::SchemaNode;
use crate::transform::{NodeCommon, Transformer};
use serde_json::{Map, Value};

/// `literal`: returns the stored mapping verbatim, no register access
#[derive(Debug, Clone)]
pub struct LiteralTransformer {
    pub(super) common: NodeCommon,
    value: Value,
}

impl LiteralTransformer {
    pub(super) fn build(schema: &SchemaNode) -> Result<Self> {
        Ok(Self {
            common: NodeCommon::build(schema)?,
            value: schema.mapping.clone(),
        })
    }

    pub(super) fn produce(&self, _env: &Registers) -> Result<Value> {
        Ok(self.value.clone())
    }
}

/// `expr`: evaluates its compiled expression tree
#[derive(Debug, Clone)]
pub struct ExprTransformer {
    pub(super) common: NodeCommon,
    expr: Expr,
}

impl ExprTransformer {
    pub(super) fn build(schema: &SchemaNode) -> Result<Self> {
        Ok(Self {
            common: NodeCommon::build(schema)?,
            expr: Expr::compile(&schema.mapping)?,
        })
    }

    pub(super) fn produce(&self, env: &Registers) -> Result<Value> {
        self.expr.eval(env)
    }
}

/// `tuple`: an ordered sequence of child nodes, invoked left to right
#[derive(Debug, Clone)]
pub struct TupleTransformer {
    pub(super) common: NodeCommon,
    items: Vec<Transformer>,
}

impl TupleTransformer {
    pub(super) fn build(schema: &SchemaNode) -> Result<Self> {
        let children = schema.mapping.as_array().ok_or_else(|| {
            Error::schema(format!(
                "tuple mapping must be an array of schema nodes, got {}",
                schema.mapping
            ))
        })?;
        let items = children
            .iter()
            .map(|child| Transformer::build(&SchemaNode::from_value(child)?))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            common: NodeCommon::build(schema)?,
            items,
        })
    }

    pub(super) fn produce(&self, env: &Registers) -> Result<Value> {
        let mut out = Vec::with_capacity(self.items.len());
        for item in &self.items {
            if let Some(value) = item.invoke(env)? {
                out.push(value);
            }
        }
        Ok(Value::Array(out))
    }
}

/// `list`: evaluates `iter` once, invokes `each` per element with the
/// reserved `loop_item` / `loop_index` bindings layered into register 0
#[derive(Debug, Clone)]
pub struct ListTransformer {
    pub(super) common: NodeCommon,
    iter: Expr,
    each: Box<Transformer>,
}

impl ListTransformer {
    pub(super) fn build(schema: &SchemaNode) -> Result<Self> {
        let mapping = schema.mapping.as_object().ok_or_else(|| {
            Error::schema(format!(
                "list mapping must be an object with `iter` and `each`, got {}",
                schema.mapping
            ))
        })?;
        let iter = mapping
            .get("iter")
            .ok_or_else(|| Error::schema("list mapping has no `iter` expression"))
            .and_then(Expr::compile)?;
        let each = mapping
            .get("each")
            .ok_or_else(|| Error::schema("list mapping has no `each` node"))
            .and_then(SchemaNode::from_value)
            .and_then(|node| Transformer::build(&node))?;
        Ok(Self {
            common: NodeCommon::build(schema)?,
            iter,
            each: Box::new(each),
        })
    }

    pub(super) fn produce(&self, env: &Registers) -> Result<Value> {
        let iterable = self.iter.eval(env)?;
        let items = match iterable {
            Value::Array(items) => items,
            other => {
                return Err(Error::evaluation(format!(
                    "invalid `iter` definition: {} is not a sequence",
                    other
                )))
            }
        };

        let mut out = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            let element_env = env.layered([
                ("loop_item".to_string(), item),
                ("loop_index".to_string(), Value::from(index)),
            ]);
            if let Some(value) = self.each.invoke(&element_env)? {
                out.push(value);
            }
        }
        Ok(Value::Array(out))
    }
}

/// `object`: a mapping of key -> child node; key order is source order
#[derive(Debug, Clone)]
pub struct ObjectTransformer {
    pub(super) common: NodeCommon,
    fields: Vec<(String, Transformer)>,
}

impl ObjectTransformer {
    pub(super) fn build(schema: &SchemaNode) -> Result<Self> {
        let mapping = schema.mapping.as_object().ok_or_else(|| {
            Error::schema(format!(
                "object mapping must be an object of key -> schema node, got {}",
                schema.mapping
            ))
        })?;
        let mut fields = Vec::with_capacity(mapping.len());
        for (key, child) in mapping {
            fields.push((
                key.clone(),
                Transformer::build(&SchemaNode::from_value(child)?)?,
            ));
        }
        Ok(Self {
            common: NodeCommon::build(schema)?,
            fields,
        })
    }

    pub(super) fn produce(&self, env: &Registers) -> Result<Value> {
        let mut out = Map::new();
        for (key, field) in &self.fields {
            if let Some(value) = field.invoke(env)? {
                out.insert(key.clone(), value);
            }
        }
        Ok(Value::Object(out))
    }
}
