use reqwest::Url;

use crate::errors::ApiError;

/// Connection settings for the remote build service.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL of the service, e.g. `http://localhost:8080`.
    pub endpoint: String,
    /// Bearer token sent with every request.
    pub token: Option<String>,
    /// Timeout for control calls (create, abort, job inputs, input completion).
    /// Event feeds, output listings and file transfers are not bounded.
    pub timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8080".to_string(),
            token: None,
            timeout_ms: 30_000,
        }
    }
}

impl ApiConfig {
    /// Parse and check the endpoint; it must be an absolute http(s) URL.
    pub fn validate(&self) -> Result<Url, ApiError> {
        let url = Url::parse(&self.endpoint)
            .map_err(|e| ApiError::InvalidEndpoint(format!("{}: {e}", self.endpoint)))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ApiError::InvalidEndpoint(format!(
                "{}: unsupported scheme `{}`",
                self.endpoint,
                url.scheme()
            )));
        }
        if url.cannot_be_a_base() {
            return Err(ApiError::InvalidEndpoint(self.endpoint.clone()));
        }
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(endpoint: &str) -> ApiConfig {
        ApiConfig {
            endpoint: endpoint.to_string(),
            ..ApiConfig::default()
        }
    }

    #[test]
    fn accepts_http_endpoints() {
        assert!(ApiConfig::default().validate().is_ok());
        assert!(config("https://ci.example.com/prefix").validate().is_ok());
    }

    #[test]
    fn rejects_other_endpoints() {
        assert!(matches!(
            config("ftp://ci.example.com").validate(),
            Err(ApiError::InvalidEndpoint(_))
        ));
        assert!(config("localhost:8080").validate().is_err());
        assert!(config("not a url").validate().is_err());
    }
}
