use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::ArtifactName;

/// Reference to an artifact already known to the remote service (a resource at a pinned version).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    pub resource: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub version: BTreeMap<String, String>,
}

/// Resolved task input.
///
/// An input is either uploaded from `local_path` or fetched remotely via `source_ref`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputBinding {
    pub name: ArtifactName,
    pub local_path: Option<PathBuf>,
    pub source_ref: Option<SourceRef>,
}

impl InputBinding {
    pub fn local(name: impl Into<ArtifactName>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            local_path: Some(path.into()),
            source_ref: None,
        }
    }

    pub fn remote(name: impl Into<ArtifactName>, source: SourceRef) -> Self {
        Self {
            name: name.into(),
            local_path: None,
            source_ref: Some(source),
        }
    }

    /// Local path to upload from, if any.
    ///
    /// An empty path counts as no path.
    pub fn upload_path(&self) -> Option<&Path> {
        non_empty(self.local_path.as_deref())
    }

    #[inline]
    pub fn needs_transfer(&self) -> bool {
        self.upload_path().is_some()
    }
}

/// Resolved task output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputBinding {
    pub name: ArtifactName,
    pub local_path: Option<PathBuf>,
}

impl OutputBinding {
    pub fn new(name: impl Into<ArtifactName>, local_path: Option<PathBuf>) -> Self {
        Self {
            name: name.into(),
            local_path,
        }
    }

    /// Local directory to download into, if any.
    pub fn download_path(&self) -> Option<&Path> {
        non_empty(self.local_path.as_deref())
    }

    #[inline]
    pub fn needs_transfer(&self) -> bool {
        self.download_path().is_some()
    }
}

fn non_empty(path: Option<&Path>) -> Option<&Path> {
    path.filter(|p| !p.as_os_str().is_empty())
}
