use rexec_model::{BuildHandle, BuildRequest, PlannedInput};
use tracing::{info, instrument};

use crate::{client::BuildClient, error::CoreError, orchestrator::ExecuteRequest};

/// Create the remote build described by `request`.
///
/// The returned handle always carries a valid build id.
#[instrument(level = "debug", skip_all, fields(inputs = request.inputs.len(), outputs = request.outputs.len()))]
pub async fn launch(
    client: &dyn BuildClient,
    request: &ExecuteRequest,
) -> Result<BuildHandle, CoreError> {
    let build = client
        .create_build(&build_request(request))
        .await
        .map_err(|e| CoreError::BuildCreation(e.to_string()))?;

    if !build.id.is_valid() {
        return Err(CoreError::BuildCreation(format!(
            "service returned invalid build id {}",
            build.id
        )));
    }

    info!(build = %build.id, status = %build.status, "build created");
    Ok(build)
}

/// Remote description of `request`: which inputs will be uploaded and which are fetched from a source.
pub fn build_request(request: &ExecuteRequest) -> BuildRequest {
    BuildRequest {
        config: request.config.clone(),
        inputs: request
            .inputs
            .iter()
            .map(|i| PlannedInput {
                name: i.name.clone(),
                source: i.source_ref.clone(),
                upload: i.needs_transfer(),
            })
            .collect(),
        outputs: request.outputs.iter().map(|o| o.name.clone()).collect(),
        privileged: request.privileged,
        tags: request.tags.clone(),
    }
}
