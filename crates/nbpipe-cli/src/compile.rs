//! `compile` command.

use std::path::{Path, PathBuf};

use nbpipe_core::compile::{CompileRequest, PipelineMetadata};

use crate::backend;

/// Compile `notebook_path` and print the package path and metadata as JSON.
pub fn execute(
    notebook_path: PathBuf,
    converter: &Path,
    packager: &str,
    overrides: &[String],
    debug: bool,
    auto_snapshot: bool,
) -> anyhow::Result<()> {
    if !notebook_path.is_file() {
        anyhow::bail!("Notebook not found: {}", notebook_path.display());
    }

    let orchestrator = backend::orchestrator(converter, packager)?;
    let request = CompileRequest {
        notebook_path,
        metadata_overrides: parse_overrides(overrides)?,
        debug,
        auto_snapshot,
    };

    let output = orchestrator.compile(&request)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Parse `KEY=VALUE` pairs. Values that are valid JSON keep their type.
fn parse_overrides(pairs: &[String]) -> anyhow::Result<PipelineMetadata> {
    let mut metadata = PipelineMetadata::new();
    for pair in pairs {
        let Some((key, value)) = pair.split_once('=') else {
            anyhow::bail!("Invalid override `{}`, expected KEY=VALUE", pair);
        };
        let value = serde_json::from_str(value)
            .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
        metadata.insert(key.trim().to_string(), value);
    }
    Ok(metadata)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_overrides() {
        let metadata = parse_overrides(&[
            "pipeline_name=train".to_string(),
            "volumes=[]".to_string(),
            "retries=3".to_string(),
        ])
        .unwrap();
        assert_eq!(metadata["pipeline_name"], json!("train"));
        assert_eq!(metadata["volumes"], json!([]));
        assert_eq!(metadata["retries"], json!(3));

        assert!(parse_overrides(&["no-equals".to_string()]).is_err());
    }
}
