//! End-to-end integration tests for the transformation engine
//!
//! These tests drive the public surface only: parse a schema document,
//! compile it, invoke it against an environment, and check the output.

use remold_core::{Error, Registers, SchemaNode, Transformer};
use serde_json::{json, Value};

fn run(schema: Value) -> Value {
    let node = SchemaNode::from_value(&schema).expect("schema should parse");
    let transformer = Transformer::build(&node).expect("schema should compile");
    transformer.invoke_root().expect("invocation should succeed")
}

#[test]
fn test_expr_schema_end_to_end() {
    let output = run(json!({
        "type": "expr",
        "mapping": ["$0.rec"],
        "ctx": {"rec": {"foo": {"foo": 1}}}
    }));
    assert_eq!(output, json!({"foo": {"foo": 1}}));
}

#[test]
fn test_object_schema_end_to_end() {
    let output = run(json!({
        "type": "object",
        "mapping": {
            "a": {"type": "literal", "mapping": 1},
            "b": {"type": "literal", "mapping": 2}
        }
    }));
    assert_eq!(output, json!({"a": 1, "b": 2}));
    let keys: Vec<&String> = output.as_object().unwrap().keys().collect();
    assert_eq!(keys, ["a", "b"]);
}

#[test]
fn test_outer_environment_feeds_register_zero() {
    let node = SchemaNode::from_value(&json!({
        "type": "list",
        "mapping": {
            "iter": ["$0.records"],
            "each": {
                "type": "object",
                "mapping": {
                    "name": {"type": "expr", "mapping": ["getitem", "$0.loop_item", "name"]},
                    "rank": {"type": "expr", "mapping": ["add", "$0.loop_index", 1]}
                }
            }
        }
    }))
    .unwrap();
    let transformer = Transformer::build(&node).unwrap();

    let env = Registers::new().with_context(json!({
        "records": [{"name": "ada"}, {"name": "brian"}]
    }));
    assert_eq!(
        transformer.invoke_with(&env).unwrap(),
        json!([
            {"name": "ada", "rank": 1},
            {"name": "brian", "rank": 2}
        ])
    );
}

#[test]
fn test_nested_composites_with_scoped_context() {
    let output = run(json!({
        "type": "object",
        "mapping": {
            "static": {"type": "literal", "mapping": "v1"},
            "rows": {
                "type": "list",
                "mapping": {
                    "iter": ["$0.items"],
                    "each": {
                        "type": "object",
                        "mapping": {
                            "label": {
                                "type": "expr",
                                "mapping": ["concat", "$0.prefix", ["str", "$0.loop_item"]]
                            }
                        }
                    }
                },
                "ctx": {"prefix": "row_"}
            }
        },
        "ctx": {"items": [10, 20]}
    }));
    assert_eq!(
        output,
        json!({
            "static": "v1",
            "rows": [{"label": "row_10"}, {"label": "row_20"}]
        })
    );
}

#[test]
fn test_plugins_extend_the_vocabulary() {
    let node = SchemaNode::from_value(&json!({
        "type": "expr",
        "mapping": ["$1.slug", "$0.title"]
    }))
    .unwrap();
    let transformer = Transformer::build(&node).unwrap();

    let env = Registers::new()
        .with_context(json!({"title": "Hello World"}))
        .with_plugin("slug", |args| {
            let text = args[0].as_str().ok_or("expected a string")?;
            Ok(json!(text.to_lowercase().replace(' ', "-")))
        });
    assert_eq!(transformer.invoke_with(&env).unwrap(), json!("hello-world"));
}

#[test]
fn test_computed_bindings_end_to_end() {
    let output = run(json!({
        "type": "object",
        "mapping": {
            "total": {"type": "expr", "mapping": ["$0.total"]},
            "summary": {
                "type": "expr",
                "mapping": ["concat", ["str", "$0.total"], " item(s)"]
            }
        },
        "ctx": {"prices": [3, 4]},
        "computed": {
            "total": {"type": "expr", "mapping": ["len", "$0.prices"]}
        }
    }));
    assert_eq!(output, json!({"total": 2, "summary": "2 item(s)"}));
}

#[test]
fn test_bad_schema_fails_at_build() {
    let node = SchemaNode::from_value(&json!({
        "type": "expr",
        "mapping": []
    }))
    .unwrap();
    let err = Transformer::build(&node).unwrap_err();
    assert!(err.is_build_error());
}

#[test]
fn test_bad_input_fails_at_invocation() {
    let node = SchemaNode::from_value(&json!({
        "type": "expr",
        "mapping": ["$0.missing"]
    }))
    .unwrap();
    let transformer = Transformer::build(&node).unwrap();

    let err = transformer.invoke_root().unwrap_err();
    assert!(matches!(err, Error::PathNotFound { .. }));
    assert!(!err.is_build_error());
}

#[test]
fn test_unknown_operation_never_returns_null() {
    let node = SchemaNode::from_value(&json!({
        "type": "expr",
        "mapping": ["nonexistent_op", 1, 2]
    }))
    .unwrap();
    let transformer = Transformer::build(&node).unwrap();

    let err = transformer.invoke_root().unwrap_err();
    assert!(matches!(err, Error::UnknownOperation { .. }));
}

#[test]
fn test_child_failure_fails_the_whole_invocation() {
    let node = SchemaNode::from_value(&json!({
        "type": "object",
        "mapping": {
            "good": {"type": "literal", "mapping": 1},
            "bad": {"type": "expr", "mapping": ["$0.absent"]}
        }
    }))
    .unwrap();
    let transformer = Transformer::build(&node).unwrap();
    assert!(transformer.invoke_root().is_err());
}

#[test]
fn test_shared_tree_across_threads() {
    let node = SchemaNode::from_value(&json!({
        "type": "expr",
        "mapping": ["mul", "$0.n", 2]
    }))
    .unwrap();
    let transformer = std::sync::Arc::new(Transformer::build(&node).unwrap());

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let shared = std::sync::Arc::clone(&transformer);
            std::thread::spawn(move || {
                let env = Registers::new().with_context(json!({"n": i}));
                shared.invoke_with(&env).unwrap()
            })
        })
        .collect();
    let results: Vec<Value> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(results, vec![json!(0), json!(2), json!(4), json!(6)]);
}
