pub mod cost_models;
pub mod metrics;
pub mod query;
pub mod rbac;
pub mod reports;

use base64::Engine;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::core::config::ApiConfig;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error("endpoint must use HTTPS (plain HTTP is only allowed for localhost), got: {0}")]
    InsecureEndpoint(String),
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("{kind} reports are not available for {platform}")]
    UnsupportedReport { platform: String, kind: String },
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },
    #[error("request failed: {0}")]
    Transport(String),
    #[error("failed to decode response: {0}")]
    Decode(String),
}

/// Validate that an endpoint uses HTTPS, or plain HTTP against localhost.
pub fn validate_endpoint(url: &str) -> Result<(), ApiError> {
    if url.starts_with("https://") {
        return Ok(());
    }
    let local = ["http://localhost", "http://127.0.0.1", "http://[::1]"];
    if local.iter().any(|prefix| {
        url.strip_prefix(prefix)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with(':') || rest.starts_with('/'))
    }) {
        return Ok(());
    }
    Err(ApiError::InsecureEndpoint(url.to_string()))
}

#[derive(Debug, Clone, PartialEq)]
enum Auth {
    None,
    Bearer(String),
    Identity(String),
}

/// Build the base64 `x-rh-identity` header used by self-hosted APIs.
pub fn identity_header(account: &str, org_admin: bool) -> String {
    let identity = serde_json::json!({
        "identity": {
            "account_number": account,
            "type": "User",
            "user": { "is_org_admin": org_admin }
        }
    });
    base64::engine::general_purpose::STANDARD.encode(identity.to_string())
}

fn parse_base(url: &str) -> Result<Url, ApiError> {
    validate_endpoint(url)?;
    let normalized = if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{}/", url)
    };
    Url::parse(&normalized).map_err(|e| ApiError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

/// Thin HTTP client for the cost management API.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    rbac_url: Option<Url>,
    auth: Auth,
}

impl ApiClient {
    pub fn from_config(config: &ApiConfig) -> Result<Self, ApiError> {
        let base_url = parse_base(&config.base_url)?;
        let rbac_url = config.rbac_url.as_deref().map(parse_base).transpose()?;

        let token = std::env::var(&config.token_env)
            .ok()
            .filter(|t| !t.trim().is_empty());
        let auth = match (token, &config.account) {
            (Some(token), _) => Auth::Bearer(token),
            (None, Some(account)) => Auth::Identity(identity_header(account, config.org_admin)),
            (None, None) => Auth::None,
        };
        if auth == Auth::None {
            tracing::warn!(
                "No credentials: set {} or api.account in the config",
                config.token_env
            );
        }

        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            base_url,
            rbac_url,
            auth,
        })
    }

    /// Resolve `path_and_query` (relative, no leading slash) against the base URL.
    pub fn url(&self, path_and_query: &str) -> Result<Url, ApiError> {
        join(&self.base_url, path_and_query)
    }

    pub fn rbac_url(&self, path_and_query: &str) -> Option<Result<Url, ApiError>> {
        self.rbac_url.as_ref().map(|base| join(base, path_and_query))
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let request = request.header("Accept", "application/json");
        match &self.auth {
            Auth::None => request,
            Auth::Bearer(token) => request.header("Authorization", format!("Bearer {}", token)),
            Auth::Identity(identity) => request.header("x-rh-identity", identity),
        }
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!("HTTP {} body: {}", status.as_u16(), body);
            return Err(ApiError::Http {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        tracing::debug!("GET {}", url);
        let response = self.send(self.http.get(url)).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    pub(crate) async fn put_json<B: Serialize, T: DeserializeOwned>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T, ApiError> {
        tracing::debug!("PUT {}", url);
        let response = self.send(self.http.put(url).json(body)).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    pub(crate) async fn delete(&self, url: Url) -> Result<(), ApiError> {
        tracing::debug!("DELETE {}", url);
        self.send(self.http.delete(url)).await?;
        Ok(())
    }
}

fn join(base: &Url, path_and_query: &str) -> Result<Url, ApiError> {
    base.join(path_and_query.trim_start_matches('/'))
        .map_err(|e| ApiError::InvalidUrl {
            url: path_and_query.to_string(),
            reason: e.to_string(),
        })
}
