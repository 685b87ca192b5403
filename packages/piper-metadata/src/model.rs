//! ONNX model container access
//!
//! The patcher only needs three capabilities from a model file: load it,
//! read its metadata table, and append entries then save. They sit behind
//! [`ModelLoader`] and [`ModelMetadata`] so the patch logic can run against
//! an in-memory model in tests.

use std::io::Write;
use std::path::Path;

use candle_onnx::onnx::{ModelProto, StringStringEntryProto};
use prost::Message;
use tempfile::NamedTempFile;

use crate::error::{IoErrorExt, ModelError, Result};
use crate::metadata::MetadataMap;

/// A loaded model whose metadata table can be read and extended
pub trait ModelMetadata {
    /// Current metadata table. Later duplicates of a key win.
    fn metadata(&self) -> MetadataMap;

    /// Append one entry. Existing entries are never modified.
    fn append_metadata(&mut self, key: &str, value: &str);

    /// Write the model back to `path`, replacing the previous file
    fn save(&self, path: &Path) -> Result<()>;
}

/// Opens model files
pub trait ModelLoader {
    type Model: ModelMetadata;

    fn load(&self, path: &Path) -> Result<Self::Model>;
}

/// Loader for ONNX protobuf models
#[derive(Debug, Default, Clone, Copy)]
pub struct OnnxLoader;

impl ModelLoader for OnnxLoader {
    type Model = OnnxModel;

    fn load(&self, path: &Path) -> Result<OnnxModel> {
        OnnxModel::load(path)
    }
}

/// Decoded ONNX model
#[derive(Debug, Clone)]
pub struct OnnxModel {
    proto: ModelProto,
}

impl OnnxModel {
    /// Read and decode a model file
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).with_path(path, ModelError::read)?;

        let proto = ModelProto::decode(bytes.as_slice()).map_err(|source| ModelError::Decode {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::debug!(
            path = %path.display(),
            size = bytes.len(),
            entries = proto.metadata_props.len(),
            "Decoded ONNX model"
        );

        Ok(Self { proto })
    }

    /// Wrap an already-decoded model
    pub fn from_proto(proto: ModelProto) -> Self {
        Self { proto }
    }

    /// Underlying protobuf message
    pub fn proto(&self) -> &ModelProto {
        &self.proto
    }

    /// Serialized model as it would be saved
    pub fn to_bytes(&self) -> Vec<u8> {
        self.proto.encode_to_vec()
    }
}

impl ModelMetadata for OnnxModel {
    fn metadata(&self) -> MetadataMap {
        self.proto
            .metadata_props
            .iter()
            .map(|prop| (prop.key.clone(), prop.value.clone()))
            .collect()
    }

    fn append_metadata(&mut self, key: &str, value: &str) {
        self.proto.metadata_props.push(StringStringEntryProto {
            key: key.to_string(),
            value: value.to_string(),
        });
    }

    fn save(&self, path: &Path) -> Result<()> {
        let bytes = self.to_bytes();
        atomic_write(path, &bytes)?;
        tracing::info!(path = %path.display(), size = bytes.len(), "Saved ONNX model");
        Ok(())
    }
}

/// Replace `path` with `content` via a sibling temporary file
///
/// Symlinks are followed so the file they point at is replaced, not the
/// link. The original permissions are carried over. On any error the
/// original file is left as it was and the temporary file is removed.
fn atomic_write(path: &Path, content: &[u8]) -> std::result::Result<(), ModelError> {
    let resolved = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let path = resolved.as_path();

    let dir = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut temp_file = NamedTempFile::new_in(dir).with_path(dir, ModelError::write)?;

    temp_file
        .write_all(content)
        .with_path(temp_file.path(), ModelError::write)?;

    if let Ok(original) = std::fs::metadata(path) {
        std::fs::set_permissions(temp_file.path(), original.permissions())
            .with_path(temp_file.path(), ModelError::write)?;
    }

    temp_file
        .as_file()
        .sync_all()
        .with_path(temp_file.path(), ModelError::write)?;

    temp_file
        .persist(path)
        .map_err(|err| ModelError::persist(path.to_path_buf(), err.error))?;

    Ok(())
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory model used to exercise the patch logic

    use std::cell::RefCell;
    use std::path::PathBuf;
    use std::rc::Rc;

    use super::*;

    #[derive(Debug, Default)]
    pub struct Store {
        pub entries: Vec<(String, String)>,
        pub saves: Vec<PathBuf>,
    }

    #[derive(Debug, Clone, Default)]
    pub struct MemoryLoader {
        pub store: Rc<RefCell<Store>>,
    }

    impl MemoryLoader {
        pub fn with_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
            let loader = Self::default();
            loader.store.borrow_mut().entries = entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            loader
        }

        pub fn entries(&self) -> Vec<(String, String)> {
            self.store.borrow().entries.clone()
        }

        pub fn save_count(&self) -> usize {
            self.store.borrow().saves.len()
        }
    }

    pub struct MemoryModel {
        entries: Vec<(String, String)>,
        store: Rc<RefCell<Store>>,
    }

    impl ModelLoader for MemoryLoader {
        type Model = MemoryModel;

        fn load(&self, _path: &Path) -> Result<MemoryModel> {
            Ok(MemoryModel {
                entries: self.store.borrow().entries.clone(),
                store: Rc::clone(&self.store),
            })
        }
    }

    impl ModelMetadata for MemoryModel {
        fn metadata(&self) -> MetadataMap {
            self.entries.iter().cloned().collect()
        }

        fn append_metadata(&mut self, key: &str, value: &str) {
            self.entries.push((key.to_string(), value.to_string()));
        }

        fn save(&self, path: &Path) -> Result<()> {
            let mut store = self.store.borrow_mut();
            store.entries = self.entries.clone();
            store.saves.push(path.to_path_buf());
            Ok(())
        }
    }
}
