use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value as JsonValue;

use super::PanelSource;
use crate::config::UpstreamConfig;
use crate::error::{AppError, AppResult};
use crate::middleware::identity::USER_HEADER;
use crate::types::{FileObject, ListEnvelope, PaginatedResult, RawFileObject, RawServer, Server, ServerQuery};

/// [`PanelSource`] backed by the panel's client API over HTTP.
#[derive(Clone)]
pub struct HttpPanelSource {
    client: Client,
    base_url: String,
    api_token: Option<String>,
}

impl HttpPanelSource {
    pub fn new(cfg: &UpstreamConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_token: cfg.api_token.clone().filter(|t| !t.is_empty()),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET on behalf of `user`, forwarded in the same header the caller sent.
    async fn get_json<T: serde::de::DeserializeOwned>(&self, user: &str, url: &str) -> AppResult<T> {
        let mut req = self.client.get(url).header("Accept", "application/json").header(USER_HEADER, user);
        if let Some(token) = &self.api_token {
            req = req.bearer_auth(token);
        }
        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(map_status(status, &text));
        }
        Ok(resp.json::<T>().await?)
    }
}

#[async_trait]
impl PanelSource for HttpPanelSource {
    async fn list_servers(&self, query: &ServerQuery) -> AppResult<PaginatedResult<Server>> {
        let mut qs = vec![format!("page={}", query.page.max(1))];
        if query.admin {
            qs.push("type=admin".to_string());
        }
        let url = self.url(&format!("/api/client/servers?{}", qs.join("&")));
        let envelope: ListEnvelope<RawServer> = self.get_json(&query.user, &url).await?;
        envelope.into_page()
    }

    async fn list_directory(&self, user: &str, server_id: &str, directory: &str) -> AppResult<Vec<FileObject>> {
        let url = self.url(&format!(
            "/api/client/servers/{}/files/list?directory={}",
            urlencoding::encode(server_id),
            urlencoding::encode(directory)
        ));
        let envelope: ListEnvelope<RawFileObject> = self.get_json(user, &url).await?;
        Ok(envelope.into_page::<FileObject>()?.items)
    }
}

/// Turns a non-2xx upstream response into an error with a readable message.
pub(crate) fn map_status(status: StatusCode, body: &str) -> AppError {
    let parsed = serde_json::from_str::<JsonValue>(body).ok();
    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry = parsed
            .as_ref()
            .and_then(|v| v.get("retry_after_seconds").and_then(|x| x.as_u64()))
            .unwrap_or(60);
        return AppError::RateLimited { retry_after_seconds: retry };
    }
    // Panel errors look like {"errors":[{"code":"…","detail":"…"}]}
    let detail = parsed.as_ref().and_then(|v| {
        v.get("errors")
            .and_then(|e| e.as_array())
            .and_then(|arr| arr.first())
            .and_then(|first| first.get("detail"))
            .and_then(|d| d.as_str())
            .map(str::to_string)
    });
    let message = match detail {
        Some(d) => d,
        None if body.trim().is_empty() => format!("HTTP {}", status.as_u16()),
        None => format!("HTTP {}: {}", status.as_u16(), body.trim()),
    };
    match status {
        StatusCode::NOT_FOUND => AppError::NotFound(message),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AppError::Unauthorized(message),
        _ => AppError::Upstream(message),
    }
}
