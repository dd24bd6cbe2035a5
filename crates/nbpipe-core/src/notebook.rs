//! Jupyter notebook (.ipynb) document model.
//!
//! Only the parts nbpipe needs are modelled strictly (cells, their source and
//! tags). Everything else is kept as raw JSON so documents survive a
//! read/write cycle untouched.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Key under the notebook-level metadata holding pipeline settings.
pub const PIPELINE_METADATA_KEY: &str = "nbpipe";

/// A Jupyter notebook.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notebook {
    /// Notebook metadata (kernelspec, language info, pipeline settings, ...)
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,

    /// Format version (always 4)
    pub nbformat: u32,

    /// Minor format version
    pub nbformat_minor: u32,

    /// Notebook cells
    pub cells: Vec<Cell>,
}

/// A notebook cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cell {
    /// Cell type (`code`, `markdown` or `raw`)
    pub cell_type: String,

    /// Cell metadata
    #[serde(default)]
    pub metadata: CellMetadata,

    /// Cell source
    pub source: CellSource,

    /// Remaining fields (outputs, execution_count, id, ...)
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Cell metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CellMetadata {
    /// Tags
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Remaining metadata entries
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Cell source text.
///
/// nbformat allows either a single string or a list of lines that are
/// concatenated verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellSource {
    Text(String),
    Lines(Vec<String>),
}

impl CellSource {
    /// The full source text.
    pub fn text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Lines(lines) => lines.concat(),
        }
    }
}

impl Cell {
    /// Create a code cell with the given source and tags.
    pub fn code(source: impl Into<String>, tags: &[&str]) -> Self {
        Self {
            cell_type: "code".to_string(),
            metadata: CellMetadata {
                tags: tags.iter().map(|t| t.to_string()).collect(),
                extra: serde_json::Map::new(),
            },
            source: CellSource::Text(source.into()),
            extra: serde_json::Map::new(),
        }
    }

    /// Check whether the cell carries `tag`.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.metadata.tags.iter().any(|t| t == tag)
    }
}

impl Notebook {
    /// Create a new empty notebook.
    pub fn new() -> Self {
        Self {
            metadata: serde_json::Map::new(),
            nbformat: 4,
            nbformat_minor: 5,
            cells: Vec::new(),
        }
    }

    /// Read a notebook from a file.
    pub fn read_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| Error::Notebook {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&content).map_err(|e| Error::Notebook {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Write the notebook to a file.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Pipeline settings stored in the notebook metadata, if any.
    pub fn pipeline_metadata(&self) -> Option<&serde_json::Map<String, serde_json::Value>> {
        self.metadata
            .get(PIPELINE_METADATA_KEY)
            .and_then(serde_json::Value::as_object)
    }
}

impl Default for Notebook {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_notebook() {
        let notebook = Notebook::new();
        assert_eq!(notebook.nbformat, 4);
        assert!(notebook.cells.is_empty());
        assert!(notebook.pipeline_metadata().is_none());
    }

    #[test]
    fn test_source_as_lines() {
        let json = r#"{
            "metadata": {},
            "nbformat": 4,
            "nbformat_minor": 4,
            "cells": [{
                "cell_type": "code",
                "metadata": {"tags": ["pipeline-parameters"]},
                "source": ["a = 1\n", "b = 2"],
                "outputs": [],
                "execution_count": null
            }]
        }"#;

        let notebook: Notebook = serde_json::from_str(json).unwrap();
        let cell = &notebook.cells[0];
        assert_eq!(cell.source.text(), "a = 1\nb = 2");
        assert!(cell.has_tag("pipeline-parameters"));
        assert!(cell.extra.contains_key("outputs"));
    }

    #[test]
    fn test_source_as_string_and_missing_tags() {
        let json = r##"{
            "metadata": {"nbpipe": {"pipeline_name": "demo"}},
            "nbformat": 4,
            "nbformat_minor": 5,
            "cells": [{"cell_type": "markdown", "metadata": {}, "source": "# Title"}]
        }"##;

        let notebook: Notebook = serde_json::from_str(json).unwrap();
        assert_eq!(notebook.cells[0].source.text(), "# Title");
        assert!(notebook.cells[0].metadata.tags.is_empty());
        assert_eq!(
            notebook.pipeline_metadata().unwrap()["pipeline_name"],
            serde_json::json!("demo")
        );
    }

    #[test]
    fn test_read_missing_file() {
        let err = Notebook::read_from_file("/nonexistent/notebook.ipynb").unwrap_err();
        assert!(matches!(err, Error::Notebook { .. }));
    }

    #[test]
    fn test_write_and_read_back() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("nb.ipynb");

        let mut notebook = Notebook::new();
        notebook.cells.push(Cell::code("x = 1", &["pipeline-parameters"]));
        notebook.write_to_file(&path).unwrap();

        let loaded = Notebook::read_from_file(&path).unwrap();
        assert_eq!(loaded.cells.len(), 1);
        assert!(loaded.cells[0].has_tag("pipeline-parameters"));
    }
}
