use std::sync::Arc;

use anyhow::{Context, Result};
use rexec_api::{ApiConfig, HttpBuildClient};
use rexec_core::{
    EventRenderer, ExecuteRequest, Orchestrator, determine_inputs, determine_outputs,
    load_task_config,
};
use tracing::info;

use crate::{cli::ExecuteArgs, signals::OsSignals};

/// Run `execute` to completion and return the process exit code.
pub async fn execute(args: ExecuteArgs, api: ApiConfig) -> Result<i32> {
    let cwd = std::env::current_dir().context("failed to determine working directory")?;
    let config = load_task_config(&args.config, &args.task_args).await?;

    let client = Arc::new(HttpBuildClient::new(&api)?);
    let inputs = determine_inputs(
        client.as_ref(),
        &config,
        &args.inputs,
        args.inputs_from.as_ref(),
        &cwd,
    )
    .await?;
    let outputs = determine_outputs(&config, &args.outputs, &cwd)?;

    let request = ExecuteRequest {
        config,
        inputs,
        outputs,
        privileged: args.privileged,
        exclude_ignored: args.exclude_ignored,
        tags: args.tags,
    };

    let signals = OsSignals::install().context("failed to install signal handlers")?;
    let transfers = Arc::new(client.transfer());
    let orchestrator = Orchestrator::new(client, transfers);
    let mut renderer = EventRenderer::stdout();

    let outcome = orchestrator.run(request, signals, &mut renderer).await?;
    info!(exit_code = outcome.exit_code(), "execution finished");
    Ok(outcome.exit_code())
}
