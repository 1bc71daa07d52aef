use serde::{Deserialize, Serialize};

use crate::{ArtifactName, SourceRef, TaskConfig};

/// Everything the remote service needs to create a build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildRequest {
    pub config: TaskConfig,
    pub inputs: Vec<PlannedInput>,
    pub outputs: Vec<ArtifactName>,
    #[serde(default)]
    pub privileged: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// How the build obtains one of its inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedInput {
    pub name: ArtifactName,
    /// Fetch the input from this source instead of waiting for an upload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceRef>,
    /// The client will upload this input after creating the build.
    #[serde(default)]
    pub upload: bool,
}
