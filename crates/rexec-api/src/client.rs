use async_trait::async_trait;
use reqwest::Method;
use rexec_core::{BuildClient, ClientError, EventFeed};
use rexec_model::{BuildHandle, BuildId, BuildRequest, JobInput, JobRef};
use tracing::{debug, instrument};

use crate::{
    config::ApiConfig,
    endpoint::{Endpoint, check, decode},
    errors::ApiError,
    events::SseEventFeed,
    transfer::HttpTransfer,
};

/// [`BuildClient`] over the service's REST API.
#[derive(Debug, Clone)]
pub struct HttpBuildClient {
    endpoint: Endpoint,
}

impl HttpBuildClient {
    pub fn new(cfg: &ApiConfig) -> Result<Self, ApiError> {
        Ok(Self {
            endpoint: Endpoint::new(cfg)?,
        })
    }

    /// Transfer service sharing this client's connection pool and credentials.
    pub fn transfer(&self) -> HttpTransfer {
        HttpTransfer::new(self.endpoint.clone())
    }

    async fn create(&self, request: &BuildRequest) -> Result<BuildHandle, ApiError> {
        let url = self.endpoint.url(["builds"])?;
        let response = self.endpoint.call(Method::POST, url).json(request).send().await?;
        decode(check(response).await?).await
    }

    async fn abort(&self, id: BuildId) -> Result<(), ApiError> {
        let url = self.endpoint.url(["builds", id.to_string().as_str(), "abort"])?;
        check(self.endpoint.call(Method::PUT, url).send().await?).await?;
        Ok(())
    }

    async fn inputs(&self, job: &JobRef) -> Result<Vec<JobInput>, ApiError> {
        let url = self
            .endpoint
            .url(["pipelines", job.pipeline.as_str(), "jobs", job.job.as_str(), "inputs"])?;
        let response = self.endpoint.call(Method::GET, url).send().await?;
        decode(check(response).await?).await
    }
}

#[async_trait]
impl BuildClient for HttpBuildClient {
    #[instrument(level = "debug", skip_all)]
    async fn create_build(&self, request: &BuildRequest) -> Result<BuildHandle, ClientError> {
        let build = self.create(request).await?;
        debug!(build = %build.id, status = %build.status, "build created");
        Ok(build)
    }

    #[instrument(level = "debug", skip(self))]
    async fn abort_build(&self, id: BuildId) -> Result<(), ClientError> {
        Ok(self.abort(id).await?)
    }

    async fn build_events(&self, id: BuildId) -> Result<Box<dyn EventFeed>, ClientError> {
        let url = self.endpoint.url(["builds", id.to_string().as_str(), "events"])?;
        let feed = SseEventFeed::open(self.endpoint.request(Method::GET, url), id)?;
        Ok(Box::new(feed))
    }

    #[instrument(level = "debug", skip_all, fields(job = %job))]
    async fn job_inputs(&self, job: &JobRef) -> Result<Vec<JobInput>, ClientError> {
        Ok(self.inputs(job).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use rexec_model::{BuildStatus, TaskConfig};
    use serde_json::json;

    fn client(server: &Server, token: Option<&str>) -> HttpBuildClient {
        HttpBuildClient::new(&ApiConfig {
            endpoint: server.url(),
            token: token.map(str::to_string),
            ..ApiConfig::default()
        })
        .unwrap()
    }

    fn request() -> BuildRequest {
        let config: TaskConfig =
            serde_json::from_value(json!({"platform": "linux", "run": {"path": "make"}})).unwrap();
        BuildRequest {
            config,
            inputs: vec![],
            outputs: vec!["bin".into()],
            privileged: true,
            tags: vec![],
        }
    }

    #[tokio::test]
    async fn creates_build() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v1/builds")
            .match_header("authorization", "Bearer secret")
            .match_body(Matcher::PartialJson(json!({"privileged": true, "outputs": ["bin"]})))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id": 42, "status": "started"}"#)
            .create_async()
            .await;

        let build = client(&server, Some("secret"))
            .create_build(&request())
            .await
            .unwrap();

        assert_eq!(build.id.get(), 42);
        assert_eq!(build.status, BuildStatus::Started);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn rejected_creation_keeps_status() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/api/v1/builds")
            .with_status(403)
            .with_body("forbidden\n")
            .create_async()
            .await;

        let err = client(&server, None).create_build(&request()).await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::Rejected { status: 403, ref message } if message == "forbidden"
        ));
    }

    #[tokio::test]
    async fn malformed_body_is_invalid_response() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/api/v1/builds")
            .with_status(200)
            .with_body("{\"id\": \"nope\"}")
            .create_async()
            .await;

        let err = client(&server, None).create_build(&request()).await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn aborts_build() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("PUT", "/api/v1/builds/42/abort")
            .with_status(204)
            .create_async()
            .await;

        client(&server, None)
            .abort_build(BuildId::new(42))
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn fetches_job_inputs() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/v1/pipelines/main/jobs/unit/inputs")
            .with_status(200)
            .with_body(r#"[{"name": "repo", "source": {"resource": "repo", "version": {"ref": "abc"}}}]"#)
            .create_async()
            .await;

        let job: JobRef = "main/unit".parse().unwrap();
        let inputs = client(&server, None).job_inputs(&job).await.unwrap();
        assert_eq!(inputs.len(), 1);
        assert_eq!(inputs[0].name, "repo");
        assert_eq!(inputs[0].source.version.get("ref").map(String::as_str), Some("abc"));
    }

    #[tokio::test]
    async fn unreachable_service_is_transport_error() {
        let client = HttpBuildClient::new(&ApiConfig {
            endpoint: "http://127.0.0.1:1".into(),
            ..ApiConfig::default()
        })
        .unwrap();
        let err = client.abort_build(BuildId::new(1)).await.unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)));
    }
}
