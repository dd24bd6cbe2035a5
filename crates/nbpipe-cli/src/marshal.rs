//! Marshal directory and step session commands.

use std::path::Path;

use nbpipe_core::{EnvConfig, ExplorationDetector, MarshalStore};
use nbpipe_server::handlers::marshal_value_to_wire;

/// Print `{is_exploration, step_name}` for the notebook.
pub fn explore(notebook_path: &Path) -> anyhow::Result<()> {
    let env = EnvConfig::from_env();
    let detector = ExplorationDetector::new(env.pipeline_step, MarshalStore::new());
    let exploration = detector.detect(notebook_path)?;
    println!("{}", serde_json::to_string_pretty(&exploration)?);
    Ok(())
}

/// Print the stored variables as JSON.
pub fn unmarshal(notebook_path: &Path) -> anyhow::Result<()> {
    let values = MarshalStore::new().unmarshal(notebook_path)?;
    let wire: serde_json::Map<String, serde_json::Value> = values
        .into_iter()
        .map(|(name, value)| (name, marshal_value_to_wire(value)))
        .collect();
    println!("{}", serde_json::to_string_pretty(&wire)?);
    Ok(())
}

/// Remove the marshal directory.
pub fn purge(notebook_path: &Path) -> anyhow::Result<()> {
    MarshalStore::new().purge(notebook_path)?;
    Ok(())
}

/// Print the resume path, or nothing when none is configured.
pub fn resume_path() -> anyhow::Result<()> {
    if let Some(path) = EnvConfig::from_env().resume_notebook_path()? {
        println!("{}", path.display());
    }
    Ok(())
}
