//! Command handlers
//!
//! Each handler is the thin I/O shell around the engine: read documents,
//! compile, invoke, print. No transformation logic lives here.

use crate::cli::{CheckArgs, TransformArgs};
use crate::error::{Error, Result};
use remold_core::{Registers, SchemaNode, Transformer};
use serde_json::Value;
use std::fs;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, instrument};

/// Handle the transform command
#[instrument(skip(args), fields(schema = %args.schema.display()))]
pub fn handle_transform(args: TransformArgs) -> Result<()> {
    let schema = load_json(&args.schema)?;
    let node = SchemaNode::from_value(&schema)?;
    let transformer = Transformer::build(&node)?;
    debug!("schema compiled, root node is {}", transformer.kind());

    let context = match &args.context {
        Some(path) => load_json(path)?,
        None => Value::Object(Default::default()),
    };

    let env = Registers::new().with_context(context);
    let output = transformer.invoke_with(&env)?;
    info!("transformation succeeded");

    let rendered = if args.pretty {
        serde_json::to_string_pretty(&output).map_err(remold_core::Error::from)?
    } else {
        serde_json::to_string(&output).map_err(remold_core::Error::from)?
    };

    match &args.output_file {
        Some(path) => fs::write(path, rendered + "\n")?,
        None => println!("{}", rendered),
    }
    Ok(())
}

/// Handle the check command
#[instrument(skip(args), fields(schema = %args.schema.display()))]
pub fn handle_check(args: CheckArgs) -> Result<()> {
    let schema = load_json(&args.schema)?;
    let node = SchemaNode::from_value(&schema)?;
    let transformer = Transformer::build(&node)?;
    println!(
        "{}: schema compiles, root node is {}",
        args.schema.display(),
        transformer.kind()
    );
    Ok(())
}

/// Read a JSON document from a file, or from stdin when the path is `-`
fn load_json(path: &Path) -> Result<Value> {
    let content = if path.as_os_str() == "-" {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        fs::read_to_string(path)?
    };
    serde_json::from_str(&content).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_json(dir: &TempDir, name: &str, value: &Value) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(serde_json::to_string(value).unwrap().as_bytes())
            .unwrap();
        path
    }

    #[test]
    fn test_transform_to_file() {
        let dir = TempDir::new().unwrap();
        let schema = write_json(
            &dir,
            "schema.json",
            &json!({
                "type": "object",
                "mapping": {
                    "doubled": {"type": "expr", "mapping": ["mul", "$0.n", 2]}
                }
            }),
        );
        let context = write_json(&dir, "ctx.json", &json!({"n": 21}));
        let out = dir.path().join("out.json");

        handle_transform(TransformArgs {
            schema,
            context: Some(context),
            pretty: false,
            output_file: Some(out.clone()),
        })
        .unwrap();

        let written: Value = serde_json::from_str(&fs::read_to_string(out).unwrap()).unwrap();
        assert_eq!(written, json!({"doubled": 42}));
    }

    #[test]
    fn test_transform_missing_schema_file() {
        let dir = TempDir::new().unwrap();
        let err = handle_transform(TransformArgs {
            schema: dir.path().join("absent.json"),
            context: None,
            pretty: false,
            output_file: None,
        })
        .unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }

    #[test]
    fn test_check_reports_bad_schema() {
        let dir = TempDir::new().unwrap();
        let schema = write_json(&dir, "schema.json", &json!({"type": "frob", "mapping": 1}));
        let err = handle_check(CheckArgs { schema }).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_check_accepts_valid_schema() {
        let dir = TempDir::new().unwrap();
        let schema = write_json(
            &dir,
            "schema.json",
            &json!({"type": "literal", "mapping": [1, 2, 3]}),
        );
        handle_check(CheckArgs { schema }).unwrap();
    }
}
