use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{ArtifactName, ModelError, TaskParams};

/// Description of the task to run remotely.
///
/// Loaded from the task config file; read-only once validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskConfig {
    /// Platform the task must run on (e.g. `"linux"`).
    #[serde(default)]
    pub platform: String,
    /// Container image the task runs in.
    ///
    /// If `None`, the worker's default image is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Artifacts the task expects to find in its working directory.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inputs: Vec<TaskInputConfig>,
    /// Artifacts the task produces.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<TaskOutputConfig>,
    /// Environment variables for the task process.
    #[serde(default, skip_serializing_if = "TaskParams::is_empty")]
    pub params: TaskParams,
    /// Command to execute.
    pub run: RunConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskInputConfig {
    pub name: ArtifactName,
    /// Directory the input is placed at, relative to the task's working directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// The task can run without this input.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub optional: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskOutputConfig {
    pub name: ArtifactName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    pub path: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

impl TaskConfig {
    /// Check the config for problems, reporting all of them at once.
    pub fn validate(&self) -> Result<(), ModelError> {
        let mut messages = Vec::new();

        if self.platform.trim().is_empty() {
            messages.push("missing 'platform'".to_string());
        }
        if self.run.path.trim().is_empty() {
            messages.push("missing path to executable to run".to_string());
        }

        check_names(
            "input",
            self.inputs.iter().map(|i| i.name.as_str()),
            &mut messages,
        );
        check_names(
            "output",
            self.outputs.iter().map(|o| o.name.as_str()),
            &mut messages,
        );

        if messages.is_empty() {
            Ok(())
        } else {
            Err(ModelError::InvalidConfig(messages))
        }
    }

    pub fn input(&self, name: &str) -> Option<&TaskInputConfig> {
        self.inputs.iter().find(|i| i.name == name)
    }

    pub fn output(&self, name: &str) -> Option<&TaskOutputConfig> {
        self.outputs.iter().find(|o| o.name == name)
    }
}

fn check_names<'a>(
    what: &str,
    names: impl Iterator<Item = &'a str>,
    messages: &mut Vec<String>,
) {
    let mut seen = HashSet::new();
    for (idx, name) in names.enumerate() {
        if name.trim().is_empty() {
            messages.push(format!("{what} in position {idx} has no name"));
        } else if !seen.insert(name) {
            messages.push(format!("duplicate {what} name '{name}'"));
        }
    }
}
