//! Label files.
//!
//! A label file stands in for the host catalog: schema names with their ids,
//! and the stored security labels.
//!
//! ```yaml
//! schemas:
//!   anon: 16500
//! labels:
//!   - policy: anon
//!     kind: schema
//!     object_id: 16500
//!     label: TRUSTED
//!   - policy: anon
//!     kind: table
//!     object_id: 16402
//!     sub_object_id: 3
//!     label: MASKED WITH FUNCTION anon.fake_email()
//! ```

use anon_core::AnonConfig;
use anon_policy::{InMemoryLabelStore, LabelEntry};
use anon_runtime::{InMemorySchemaCatalog, MaskingExtension};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelFile {
    #[serde(default)]
    pub schemas: InMemorySchemaCatalog,
    #[serde(default)]
    pub labels: Vec<LabelEntry>,
}

impl LabelFile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read label file {}", path.display()))?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse label file {}", path.display()))
    }

    /// Like [`LabelFile::load`], with an empty file when `path` does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self).context("Failed to serialize labels")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write label file {}", path.display()))
    }

    /// Load the extension over this file's labels and schemas.
    pub fn extension(&self, config: AnonConfig) -> (MaskingExtension, Arc<InMemoryLabelStore>) {
        let store = Arc::new(InMemoryLabelStore::from_entries(self.labels.clone()));
        let catalog = Arc::new(self.schemas.clone());
        let extension = MaskingExtension::new(config, store.clone(), catalog);
        (extension, store)
    }
}
