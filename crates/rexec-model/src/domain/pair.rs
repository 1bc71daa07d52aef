use std::{path::PathBuf, str::FromStr};

use crate::{ArtifactName, ModelError};

/// `NAME=PATH` value of the `--input` / `--output` flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedPath {
    pub name: ArtifactName,
    pub path: PathBuf,
}

impl FromStr for NamedPath {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, path) = s
            .split_once('=')
            .ok_or_else(|| ModelError::InvalidPair(s.to_string()))?;

        let name = name.trim();
        if name.is_empty() || path.is_empty() {
            return Err(ModelError::InvalidPair(s.to_string()));
        }
        Ok(Self {
            name: name.to_string(),
            path: PathBuf::from(path),
        })
    }
}
