//! Turns command-line mappings and the task config into input/output bindings.
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use rexec_model::{InputBinding, JobRef, NamedPath, OutputBinding, SourceRef, TaskConfig};
use tracing::{debug, instrument, trace};

use crate::{client::BuildClient, error::CoreError};

/// Resolve every declared input of `config`.
///
/// Explicit mappings win over inputs taken from `inputs_from`. Without any mapping the current
/// directory is bound under its own name. Missing optional inputs are left out.
#[instrument(level = "debug", skip_all, fields(mappings = mappings.len(), inputs_from = ?inputs_from.map(ToString::to_string)))]
pub async fn determine_inputs(
    client: &dyn BuildClient,
    config: &TaskConfig,
    mappings: &[NamedPath],
    inputs_from: Option<&JobRef>,
    cwd: &Path,
) -> Result<Vec<InputBinding>, CoreError> {
    for mapping in mappings {
        if config.input(&mapping.name).is_none() {
            return Err(CoreError::InputResolution(format!(
                "unknown input `{}`",
                mapping.name
            )));
        }
    }

    let mut local: HashMap<&str, PathBuf> = HashMap::new();
    if mappings.is_empty() && inputs_from.is_none() {
        if let Some(name) = cwd.file_name().and_then(|n| n.to_str()) {
            trace!(input = name, "mapping current directory");
            local.insert(name, cwd.to_path_buf());
        }
    } else {
        for mapping in mappings {
            local.insert(&mapping.name, absolute(cwd, &mapping.path));
        }
    }

    for (name, path) in &local {
        if tokio::fs::metadata(path).await.is_err() {
            return Err(CoreError::InputResolution(format!(
                "input `{name}`: {} does not exist",
                path.display()
            )));
        }
    }

    let mut remote: HashMap<String, SourceRef> = HashMap::new();
    if let Some(job) = inputs_from {
        let inputs = client
            .job_inputs(job)
            .await
            .map_err(|e| CoreError::InputResolution(format!("inputs of {job}: {e}")))?;
        remote.extend(inputs.into_iter().map(|i| (i.name, i.source)));
    }

    let mut bindings = Vec::with_capacity(config.inputs.len());
    for input in &config.inputs {
        if let Some(path) = local.remove(input.name.as_str()) {
            bindings.push(InputBinding::local(input.name.clone(), path));
        } else if let Some(source) = remote.remove(&input.name) {
            bindings.push(InputBinding::remote(input.name.clone(), source));
        } else if input.optional {
            trace!(input = %input.name, "optional input not provided");
        } else {
            return Err(CoreError::InputResolution(format!(
                "missing required input `{}`",
                input.name
            )));
        }
    }

    debug!(bindings = bindings.len(), "inputs resolved");
    Ok(bindings)
}

/// Resolve every declared output of `config`; only mapped outputs get a local path.
pub fn determine_outputs(
    config: &TaskConfig,
    mappings: &[NamedPath],
    cwd: &Path,
) -> Result<Vec<OutputBinding>, CoreError> {
    let mut mapped: HashMap<&str, PathBuf> = HashMap::new();
    for mapping in mappings {
        if config.output(&mapping.name).is_none() {
            return Err(CoreError::OutputResolution(format!(
                "unknown output `{}`",
                mapping.name
            )));
        }
        mapped.insert(&mapping.name, absolute(cwd, &mapping.path));
    }

    Ok(config
        .outputs
        .iter()
        .map(|o| OutputBinding::new(o.name.clone(), mapped.remove(o.name.as_str())))
        .collect())
}

fn absolute(cwd: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}
