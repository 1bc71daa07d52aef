use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use ignore::WalkBuilder;
use reqwest::{Body, Method};
use rexec_core::{TransferError, TransferService};
use rexec_model::{BuildHandle, InputBinding, OutputBinding};
use serde::Deserialize;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use tracing::{debug, instrument, trace};

use crate::{
    endpoint::{Endpoint, check, decode},
    errors::ApiError,
};

/// File listing of a build output.
#[derive(Debug, Deserialize)]
struct OutputListing {
    #[serde(default)]
    files: Vec<String>,
}

/// File-by-file artifact transfer over the service's REST API.
#[derive(Debug, Clone)]
pub struct HttpTransfer {
    endpoint: Endpoint,
}

impl HttpTransfer {
    pub(crate) fn new(endpoint: Endpoint) -> Self {
        Self { endpoint }
    }

    fn file_url(
        &self,
        build: &BuildHandle,
        direction: &str,
        name: &str,
        rel: &Path,
    ) -> Result<reqwest::Url, ApiError> {
        let id = build.id.to_string();
        let mut segments = vec![
            "builds".to_string(),
            id,
            direction.to_string(),
            name.to_string(),
            "files".to_string(),
        ];
        segments.extend(rel.components().map(|c| c.as_os_str().to_string_lossy().into_owned()));
        self.endpoint.url(segments)
    }

    async fn put_file(
        &self,
        build: &BuildHandle,
        input: &str,
        path: &Path,
        rel: &Path,
    ) -> Result<(), ApiError> {
        let url = self.file_url(build, "inputs", input, rel)?;
        let file = tokio::fs::File::open(path).await?;
        let body = Body::wrap_stream(ReaderStream::new(file));

        trace!(input, file = %rel.display(), "uploading");
        check(self.endpoint.request(Method::PUT, url).body(body).send().await?).await?;
        Ok(())
    }

    async fn upload_all(
        &self,
        build: &BuildHandle,
        input: &InputBinding,
        source: &Path,
        exclude_ignored: bool,
    ) -> Result<u64, ApiError> {
        let root = source.to_path_buf();
        let files = tokio::task::spawn_blocking(move || collect_files(&root, exclude_ignored))
            .await
            .map_err(|e| ApiError::Io(std::io::Error::other(e)))??;

        let mut sent = 0;
        for (path, rel) in &files {
            self.put_file(build, &input.name, path, rel).await?;
            sent += 1;
        }
        self.finish_input(build, &input.name).await?;
        Ok(sent)
    }

    /// Marks an input as complete, including one that had no files to send.
    async fn finish_input(&self, build: &BuildHandle, input: &str) -> Result<(), ApiError> {
        let url = self.endpoint.url([
            "builds",
            build.id.to_string().as_str(),
            "inputs",
            input,
            "done",
        ])?;
        check(self.endpoint.call(Method::PUT, url).send().await?).await?;
        Ok(())
    }

    async fn get_file(
        &self,
        build: &BuildHandle,
        output: &str,
        rel: &Path,
        dest: &Path,
    ) -> Result<(), ApiError> {
        let url = self.file_url(build, "outputs", output, rel)?;
        let mut response = check(self.endpoint.request(Method::GET, url).send().await?).await?;

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = tokio::fs::File::create(dest).await?;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
        }
        file.flush().await?;
        Ok(())
    }

    async fn download_all(
        &self,
        build: &BuildHandle,
        output: &OutputBinding,
        dest: &Path,
    ) -> Result<u64, ApiError> {
        let url = self.endpoint.url([
            "builds",
            build.id.to_string().as_str(),
            "outputs",
            output.name.as_str(),
        ])?;
        // Held by the service until the output exists; unbounded.
        let listing: OutputListing =
            decode(check(self.endpoint.request(Method::GET, url).send().await?).await?).await?;

        let files = listing
            .files
            .iter()
            .map(|f| safe_relative(f))
            .collect::<Result<Vec<_>, _>>()?;

        tokio::fs::create_dir_all(dest).await?;
        let mut written = 0;
        for rel in &files {
            self.get_file(build, &output.name, rel, &dest.join(rel)).await?;
            written += 1;
        }
        Ok(written)
    }
}

#[async_trait]
impl TransferService for HttpTransfer {
    #[instrument(level = "debug", skip_all, fields(build = %build.id, input = %input.name))]
    async fn upload(
        &self,
        build: &BuildHandle,
        input: &InputBinding,
        source: &Path,
        exclude_ignored: bool,
    ) -> Result<u64, TransferError> {
        let sent = self.upload_all(build, input, source, exclude_ignored).await?;
        debug!(files = sent, "input uploaded");
        Ok(sent)
    }

    #[instrument(level = "debug", skip_all, fields(build = %build.id, output = %output.name))]
    async fn download(
        &self,
        build: &BuildHandle,
        output: &OutputBinding,
        dest: &Path,
    ) -> Result<u64, TransferError> {
        let written = self.download_all(build, output, dest).await?;
        debug!(files = written, "output downloaded");
        Ok(written)
    }
}

/// Files to upload from `source`, with their paths relative to it.
///
/// A single file is sent under its own name.
fn collect_files(source: &Path, exclude_ignored: bool) -> Result<Vec<(PathBuf, PathBuf)>, ApiError> {
    if source.is_file() {
        let name = source
            .file_name()
            .ok_or_else(|| ApiError::InvalidPath(source.display().to_string()))?;
        return Ok(vec![(source.to_path_buf(), PathBuf::from(name))]);
    }

    let mut builder = WalkBuilder::new(source);
    builder.standard_filters(false);
    if exclude_ignored {
        builder
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .require_git(false)
            .filter_entry(|entry| entry.file_name() != ".git");
    }

    let mut files = Vec::new();
    for entry in builder.build() {
        let entry = entry.map_err(|e| ApiError::Io(std::io::Error::other(e)))?;
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(source)
            .map_err(|_| ApiError::InvalidPath(entry.path().display().to_string()))?
            .to_path_buf();
        files.push((entry.into_path(), rel));
    }
    files.sort_by(|a, b| a.1.cmp(&b.1));
    Ok(files)
}

/// Relative path from an output listing; anything escaping the destination is rejected.
fn safe_relative(raw: &str) -> Result<PathBuf, ApiError> {
    let mut rel = PathBuf::new();
    for component in Path::new(raw).components() {
        match component {
            Component::Normal(part) => rel.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(ApiError::InvalidPath(raw.to_string()));
            }
        }
    }
    if rel.as_os_str().is_empty() {
        return Err(ApiError::InvalidPath(raw.to_string()));
    }
    Ok(rel)
}
