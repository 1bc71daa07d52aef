use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response, Url};

use crate::{config::ApiConfig, errors::ApiError};

const API_PREFIX: [&str; 2] = ["api", "v1"];

/// Shared HTTP state: one connection pool, base URL and credentials.
#[derive(Debug, Clone)]
pub(crate) struct Endpoint {
    http: reqwest::Client,
    base: Url,
    token: Option<String>,
    timeout: Duration,
}

impl Endpoint {
    pub(crate) fn new(cfg: &ApiConfig) -> Result<Self, ApiError> {
        let base = cfg.validate()?;
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_millis(cfg.timeout_ms))
            .build()?;

        Ok(Self {
            http,
            base,
            token: cfg.token.clone(),
            timeout: Duration::from_millis(cfg.timeout_ms),
        })
    }

    /// `<base>/api/v1/<segments...>`, each segment percent-encoded.
    pub(crate) fn url<I, S>(&self, segments: I) -> Result<Url, ApiError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidEndpoint(self.base.to_string()))?
            .pop_if_empty()
            .extend(API_PREFIX)
            .extend(segments);
        Ok(url)
    }

    /// Request without a timeout, for streamed bodies.
    pub(crate) fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.http.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Request bounded by the control-call timeout.
    pub(crate) fn call(&self, method: Method, url: Url) -> RequestBuilder {
        self.request(method, url).timeout(self.timeout)
    }
}

/// Turn a non-success response into [`ApiError::Rejected`].
pub(crate) async fn check(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(ApiError::Rejected {
        status: status.as_u16(),
        message: message.trim().to_string(),
    })
}

/// Decode a JSON body, keeping the raw body in the error.
pub(crate) async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| {
        ApiError::InvalidResponse(format!("failed to parse response: {e}, body: {body}"))
    })
}
