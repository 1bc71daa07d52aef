use std::sync::Arc;

use rexec_model::{BuildHandle, InputBinding, OutputBinding};
use tracing::{debug, trace, warn};

use super::{TransferHandle, TransferKind, TransferReport, TransferService};

/// Schedules the uploads and downloads of one build.
pub struct TransferCoordinator {
    service: Arc<dyn TransferService>,
    exclude_ignored: bool,
}

/// Handles of every transfer started for a build.
#[derive(Debug)]
pub struct Transfers {
    inputs: TransferHandle,
    outputs: Vec<TransferHandle>,
    downloads: usize,
}

impl TransferCoordinator {
    pub fn new(service: Arc<dyn TransferService>) -> Self {
        Self {
            service,
            exclude_ignored: false,
        }
    }

    /// Skip files matched by ignore rules when uploading.
    pub fn exclude_ignored(mut self, exclude: bool) -> Self {
        self.exclude_ignored = exclude;
        self
    }

    /// Start all transfers for `build` and return immediately.
    pub fn start(
        &self,
        build: &BuildHandle,
        inputs: Vec<InputBinding>,
        outputs: Vec<OutputBinding>,
    ) -> Transfers {
        let inputs = self.start_inputs(build, inputs);

        let mut handles = Vec::with_capacity(outputs.len());
        let mut downloads = 0;
        for output in outputs {
            if output.needs_transfer() {
                downloads += 1;
                handles.push(self.start_download(build, output));
            } else {
                trace!(output = %output.name, "output not mapped");
                handles.push(TransferHandle::completed(
                    TransferKind::Download,
                    output.name,
                    TransferReport::skipped(),
                ));
            }
        }

        debug!(build = %build.id, downloads, "transfers started");
        Transfers {
            inputs,
            outputs: handles,
            downloads,
        }
    }

    fn start_inputs(&self, build: &BuildHandle, inputs: Vec<InputBinding>) -> TransferHandle {
        if !inputs.iter().any(InputBinding::needs_transfer) {
            return TransferHandle::completed(
                TransferKind::Upload,
                "inputs",
                TransferReport {
                    skipped: inputs.len(),
                    ..TransferReport::default()
                },
            );
        }

        let (completion, handle) = TransferHandle::channel(TransferKind::Upload, "inputs");
        let service = Arc::clone(&self.service);
        let build = build.clone();
        let exclude_ignored = self.exclude_ignored;

        tokio::spawn(async move {
            let mut report = TransferReport::default();
            for input in &inputs {
                let Some(source) = input.upload_path() else {
                    report.merge(TransferReport::skipped());
                    continue;
                };
                match service.upload(&build, input, source, exclude_ignored).await {
                    Ok(files) => {
                        debug!(input = %input.name, files, "input uploaded");
                        report.merge(TransferReport::transferred());
                    }
                    Err(e) => {
                        warn!(input = %input.name, error = %e, "input upload failed");
                        report.merge(TransferReport::failed());
                    }
                }
            }
            completion.fire(report);
        });

        handle
    }

    fn start_download(&self, build: &BuildHandle, output: OutputBinding) -> TransferHandle {
        let (completion, handle) = TransferHandle::channel(TransferKind::Download, output.name.clone());
        let service = Arc::clone(&self.service);
        let build = build.clone();

        tokio::spawn(async move {
            let report = match output.download_path() {
                Some(dest) => match service.download(&build, &output, dest).await {
                    Ok(files) => {
                        debug!(output = %output.name, files, "output downloaded");
                        TransferReport::transferred()
                    }
                    Err(e) => {
                        warn!(output = %output.name, error = %e, "output download failed");
                        TransferReport::failed()
                    }
                },
                None => TransferReport::skipped(),
            };
            completion.fire(report);
        });

        handle
    }
}

impl Transfers {
    /// Number of download tasks actually started.
    pub fn downloads(&self) -> usize {
        self.downloads
    }

    /// Wait for the input sequence and then for every output.
    pub async fn join(self) -> TransferReport {
        let mut report = self.inputs.wait().await;
        for handle in self.outputs {
            report.merge(handle.wait().await);
        }
        report
    }
}
