//! `parameters` and `metrics` commands.

use std::path::Path;

use nbpipe_core::{Notebook, cells, parameter_rows};
use nbpipe_server::table;

/// Print the notebook's pipeline parameters.
pub fn parameters(notebook_path: &Path, json: bool) -> anyhow::Result<()> {
    let notebook = Notebook::read_from_file(notebook_path)?;
    let rows = parameter_rows(&cells::extract_parameters(&notebook)?);

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        println!("{}", table::render(&["name", "type", "value"], &rows));
    }
    Ok(())
}

/// Print the notebook's pipeline metrics.
pub fn metrics(notebook_path: &Path, json: bool) -> anyhow::Result<()> {
    let notebook = Notebook::read_from_file(notebook_path)?;
    let metrics = cells::extract_metrics(&notebook)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&metrics)?);
    } else {
        let rows: Vec<[&str; 2]> = metrics
            .iter()
            .map(|(name, id)| [name.as_str(), id.as_str()])
            .collect();
        println!("{}", table::render(&["variable", "metric"], &rows));
    }
    Ok(())
}
