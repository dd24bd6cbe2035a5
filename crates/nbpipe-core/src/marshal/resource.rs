//! Serialization of individual marshalled variables.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{Error, Result};

/// A variable recovered from (or written to) the marshal directory.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarshalValue {
    /// Structured data (`.json`).
    Json(serde_json::Value),
    /// UTF-8 text (`.txt`).
    Text(String),
    /// Opaque bytes (any other extension).
    Bytes(Vec<u8>),
}

impl MarshalValue {
    /// File extension used when storing this value.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json(_) => "json",
            Self::Text(_) => "txt",
            Self::Bytes(_) => "bin",
        }
    }
}

/// Loads and stores marshalled variables.
///
/// The marshal store only cares about file names; the encoding of each file
/// is up to the loader.
pub trait ResourceLoader: Send + Sync {
    /// Load the value stored at `path`.
    fn load(&self, path: &Path) -> Result<MarshalValue>;

    /// Store `value` as variable `name` inside `dir`, returning the file written.
    fn save(&self, dir: &Path, name: &str, value: &MarshalValue) -> Result<PathBuf>;
}

/// Chooses the encoding from the file extension.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtensionLoader;

impl ResourceLoader for ExtensionLoader {
    fn load(&self, path: &Path) -> Result<MarshalValue> {
        let marshal_err = |message: String| Error::Marshal {
            path: path.to_path_buf(),
            message,
        };
        let bytes = fs::read(path).map_err(|e| marshal_err(e.to_string()))?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_slice(&bytes)
                .map(MarshalValue::Json)
                .map_err(|e| marshal_err(e.to_string())),
            Some("txt") => String::from_utf8(bytes)
                .map(MarshalValue::Text)
                .map_err(|e| marshal_err(e.to_string())),
            _ => Ok(MarshalValue::Bytes(bytes)),
        }
    }

    fn save(&self, dir: &Path, name: &str, value: &MarshalValue) -> Result<PathBuf> {
        let path = dir.join(format!("{}.{}", name, value.extension()));
        let bytes = match value {
            MarshalValue::Json(json) => serde_json::to_vec_pretty(json)?,
            MarshalValue::Text(text) => text.clone().into_bytes(),
            MarshalValue::Bytes(bytes) => bytes.clone(),
        };
        fs::write(&path, bytes).map_err(|e| Error::Marshal {
            path: path.clone(),
            message: e.to_string(),
        })?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_dispatch_by_extension() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a.json"), "{\"k\": [1, 2]}").unwrap();
        fs::write(temp.path().join("b.txt"), "hello").unwrap();
        fs::write(temp.path().join("c.pkl"), [0u8, 159, 146]).unwrap();

        let loader = ExtensionLoader;
        assert_eq!(
            loader.load(&temp.path().join("a.json")).unwrap(),
            MarshalValue::Json(serde_json::json!({"k": [1, 2]}))
        );
        assert_eq!(
            loader.load(&temp.path().join("b.txt")).unwrap(),
            MarshalValue::Text("hello".to_string())
        );
        assert_eq!(
            loader.load(&temp.path().join("c.pkl")).unwrap(),
            MarshalValue::Bytes(vec![0, 159, 146])
        );
    }

    #[test]
    fn test_corrupt_json_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.json");
        fs::write(&path, "{not json").unwrap();

        let err = ExtensionLoader.load(&path).unwrap_err();
        assert!(matches!(err, Error::Marshal { .. }));
    }

    #[test]
    fn test_save_names_file_after_variable() {
        let temp = TempDir::new().unwrap();
        let path = ExtensionLoader
            .save(temp.path(), "df", &MarshalValue::Text("x".to_string()))
            .unwrap();
        assert_eq!(path, temp.path().join("df.txt"));
    }
}
