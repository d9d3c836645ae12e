use deck_logging::deck_debug;
use reqwest::multipart::Form;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::{ApiSettings, FailureKind, TransportError};

/// Thin JSON-over-HTTP client bound to one backend base URL.
///
/// Holds two reqwest clients: one with the configured total timeout for
/// ordinary requests, and one without it for long-lived event streams.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base: Url,
    auth_token: Option<String>,
    http: reqwest::Client,
    streaming: reqwest::Client,
}

impl ApiClient {
    pub fn new(settings: &ApiSettings) -> Result<Self, TransportError> {
        let mut base = settings.base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base = Url::parse(&base)
            .map_err(|err| TransportError::new(FailureKind::InvalidUrl, err.to_string()))?;

        let http = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(map_reqwest_error)?;
        let streaming = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .build()
            .map_err(map_reqwest_error)?;

        Ok(Self {
            base,
            auth_token: settings.auth_token.clone(),
            http,
            streaming,
        })
    }

    /// Resolves a route relative to the base URL.
    pub fn endpoint(&self, path: &str) -> Result<Url, TransportError> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|err| TransportError::new(FailureKind::InvalidUrl, err.to_string()))
    }

    pub async fn get_json(&self, url: Url) -> Result<Value, TransportError> {
        deck_debug!("GET {}", url);
        let response = self
            .authorize(self.http.get(url))
            .send()
            .await
            .map_err(map_reqwest_error)?;
        read_json(response).await
    }

    pub async fn post_json<B>(&self, url: Url, body: &B) -> Result<Value, TransportError>
    where
        B: Serialize + ?Sized + Sync,
    {
        deck_debug!("POST {}", url);
        let response = self
            .authorize(self.http.post(url).json(body))
            .send()
            .await
            .map_err(map_reqwest_error)?;
        read_json(response).await
    }

    pub async fn post_multipart(&self, url: Url, form: Form) -> Result<Value, TransportError> {
        deck_debug!("POST {} (multipart)", url);
        let response = self
            .authorize(self.http.post(url).multipart(form))
            .send()
            .await
            .map_err(map_reqwest_error)?;
        read_json(response).await
    }

    /// Opens an event stream. The caller owns the body.
    pub async fn open_stream(&self, url: Url) -> Result<Response, TransportError> {
        deck_debug!("GET {} (event stream)", url);
        let response = self
            .authorize(
                self.streaming
                    .get(url)
                    .header(reqwest::header::ACCEPT, "text/event-stream"),
            )
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.map_err(map_reqwest_error)?;
            return Err(status_error(status, &body));
        }
        Ok(response)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

async fn read_json(response: Response) -> Result<Value, TransportError> {
    let status = response.status();
    let body = response.bytes().await.map_err(map_reqwest_error)?;
    if !status.is_success() {
        return Err(status_error(status, &body));
    }
    if body.is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_slice(&body)
        .map_err(|err| TransportError::new(FailureKind::Decode, err.to_string()))
}

/// Error bodies carry a human-readable `detail` or `message` when the server
/// has one; otherwise the status reason is used.
fn status_error(status: StatusCode, body: &[u8]) -> TransportError {
    let detail = serde_json::from_slice::<Value>(body).ok().and_then(|value| {
        ["detail", "message"]
            .iter()
            .find_map(|key| value.get(key).and_then(Value::as_str).map(str::to_owned))
    });
    let message = detail.unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    });
    TransportError::new(FailureKind::HttpStatus(status.as_u16()), message)
}

pub(crate) fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        return TransportError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return TransportError::new(FailureKind::Decode, err.to_string());
    }
    TransportError::new(FailureKind::Network, err.to_string())
}
