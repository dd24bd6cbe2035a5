//! The per-notebook marshal directory.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::resource::{ExtensionLoader, MarshalValue, ResourceLoader};
use crate::error::{Error, Result};

/// Suffix appended to `.<notebook file name>` to form the marshal directory name.
pub const MARSHAL_DIR_POSTFIX: &str = ".nbpipe.marshal.dir";

/// Resolve the marshal directory of a notebook.
///
/// The directory is a hidden sibling of the notebook:
///
/// ```text
/// project/
/// ├── train.ipynb
/// └── .train.ipynb.nbpipe.marshal.dir/
///     ├── features.json
///     └── model.bin
/// ```
///
/// Symlinks are resolved like `realpath`: the full path when it exists,
/// otherwise the notebook's directory. Nothing is created.
pub fn marshal_dir(notebook_path: &Path) -> Result<PathBuf> {
    let file_name = notebook_path.file_name().ok_or_else(|| Error::Marshal {
        path: notebook_path.to_path_buf(),
        message: "notebook path has no file name".to_string(),
    })?;
    let parent = notebook_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));

    let mut dir_name = OsString::from(".");
    dir_name.push(file_name);
    dir_name.push(MARSHAL_DIR_POSTFIX);

    let candidate = parent.join(&dir_name);
    if let Ok(resolved) = candidate.canonicalize() {
        return Ok(resolved);
    }

    let parent = match parent.canonicalize() {
        Ok(resolved) => resolved,
        Err(_) => std::path::absolute(parent)?,
    };
    Ok(parent.join(dir_name))
}

/// Filesystem-backed store of variables exchanged between pipeline steps.
///
/// There is no in-memory layer: every read scans the directory again.
#[derive(Clone)]
pub struct MarshalStore {
    loader: Arc<dyn ResourceLoader>,
}

impl MarshalStore {
    /// Create a store using [`ExtensionLoader`].
    pub fn new() -> Self {
        Self::with_loader(Arc::new(ExtensionLoader))
    }

    /// Create a store with a custom resource loader.
    pub fn with_loader(loader: Arc<dyn ResourceLoader>) -> Self {
        Self { loader }
    }

    /// The marshal directory for `notebook_path` (see [`marshal_dir`]).
    pub fn locate(&self, notebook_path: &Path) -> Result<PathBuf> {
        marshal_dir(notebook_path)
    }

    /// Load every variable persisted for the notebook.
    ///
    /// A missing directory means no step has produced data yet and yields an
    /// empty map. Subdirectories are ignored.
    pub fn unmarshal(&self, notebook_path: &Path) -> Result<BTreeMap<String, MarshalValue>> {
        let dir = self.locate(notebook_path)?;
        let mut values = BTreeMap::new();

        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(values),
            Err(e) => return Err(e.into()),
        };

        for entry in entries {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                tracing::warn!("Skipping marshal file with non UTF-8 name: {}", path.display());
                continue;
            };
            let name = name.to_string();
            let value = self.loader.load(&path)?;
            values.insert(name, value);
        }

        tracing::debug!("Unmarshalled {} variables from {}", values.len(), dir.display());
        Ok(values)
    }

    /// Persist `value` as variable `name`, creating the directory if needed.
    pub fn save(&self, notebook_path: &Path, name: &str, value: &MarshalValue) -> Result<PathBuf> {
        let dir = self.locate(notebook_path)?;
        fs::create_dir_all(&dir)?;
        let path = self.loader.save(&dir, name, value)?;
        tracing::debug!("Marshalled `{}` to {}", name, path.display());
        Ok(path)
    }

    /// Delete the marshal directory and everything in it. No-op when absent.
    pub fn purge(&self, notebook_path: &Path) -> Result<()> {
        let dir = self.locate(notebook_path)?;
        match fs::remove_dir_all(&dir) {
            Ok(()) => {
                tracing::info!("Removed marshal directory {}", dir.display());
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl Default for MarshalStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_marshal_dir_name() {
        let temp = TempDir::new().unwrap();
        let nb = temp.path().join("train.ipynb");

        let dir = marshal_dir(&nb).unwrap();
        assert_eq!(
            dir.file_name().unwrap().to_str().unwrap(),
            ".train.ipynb.nbpipe.marshal.dir"
        );
        assert_eq!(dir.parent().unwrap(), temp.path().canonicalize().unwrap());
        assert!(!dir.exists());
    }

    #[test]
    fn test_marshal_dir_is_pure() {
        let temp = TempDir::new().unwrap();
        let a = temp.path().join("a.ipynb");
        let b = temp.path().join("b.ipynb");

        assert_eq!(marshal_dir(&a).unwrap(), marshal_dir(&a).unwrap());
        assert_ne!(marshal_dir(&a).unwrap(), marshal_dir(&b).unwrap());
    }

    #[test]
    fn test_marshal_dir_relative_path_is_absolute() {
        let dir = marshal_dir(Path::new("nb.ipynb")).unwrap();
        assert!(dir.is_absolute());
        assert!(dir.ends_with(".nb.ipynb.nbpipe.marshal.dir"));
    }

    #[test]
    fn test_marshal_dir_requires_file_name() {
        assert!(marshal_dir(Path::new("/")).is_err());
    }

    #[test]
    fn test_unmarshal_skips_subdirectories() {
        let temp = TempDir::new().unwrap();
        let nb = temp.path().join("nb.ipynb");
        let store = MarshalStore::new();

        store
            .save(&nb, "x", &MarshalValue::Json(serde_json::json!(1)))
            .unwrap();
        let dir = store.locate(&nb).unwrap();
        fs::create_dir(dir.join("nested")).unwrap();
        fs::write(dir.join("nested").join("y.txt"), "ignored").unwrap();

        let values = store.unmarshal(&nb).unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(values["x"], MarshalValue::Json(serde_json::json!(1)));
    }

    #[test]
    fn test_purge_twice() {
        let temp = TempDir::new().unwrap();
        let nb = temp.path().join("nb.ipynb");
        let store = MarshalStore::new();

        store
            .save(&nb, "x", &MarshalValue::Text("v".to_string()))
            .unwrap();
        store.purge(&nb).unwrap();
        assert!(!store.locate(&nb).unwrap().exists());
        store.purge(&nb).unwrap();
    }
}
