//! WeChat Official Account API calls used by the publish pipeline.
//!
//! Each call is one request/response round trip on a freshly built client:
//! no connection reuse and no retry. A response missing the expected field is
//! reported with its raw body.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_API_BASE: &str = "https://api.weixin.qq.com";
pub const DEFAULT_IMAGE_CONTENT_TYPE: &str = "image/jpeg";

const TOKEN_TIMEOUT: Duration = Duration::from_secs(30);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// The four remote endpoints, used to label failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    AccessToken,
    UploadImage,
    AddDraft,
    SubmitPublish,
}

impl Operation {
    fn path(self) -> &'static str {
        match self {
            Operation::AccessToken => "/cgi-bin/token",
            Operation::UploadImage => "/cgi-bin/material/add_material",
            Operation::AddDraft => "/cgi-bin/draft/add",
            Operation::SubmitPublish => "/cgi-bin/freepublish/submit",
        }
    }

    fn timeout(self) -> Duration {
        match self {
            Operation::AccessToken => TOKEN_TIMEOUT,
            _ => REQUEST_TIMEOUT,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::AccessToken => "access_token",
            Operation::UploadImage => "add_material",
            Operation::AddDraft => "draft/add",
            Operation::SubmitPublish => "freepublish/submit",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{operation} request failed: {source}")]
    Transport {
        operation: Operation,
        #[source]
        source: reqwest::Error,
    },
    #[error("{operation} error: {body}")]
    Rejected { operation: Operation, body: String },
}

impl ApiError {
    pub fn operation(&self) -> Operation {
        match self {
            ApiError::Transport { operation, .. } | ApiError::Rejected { operation, .. } => {
                *operation
            }
        }
    }
}

/// Cover image bytes as received from the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverImage {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl CoverImage {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            content_type: None,
            bytes,
        }
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// Article record posted to `draft/add`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftArticle {
    pub title: String,
    pub author: String,
    pub digest: String,
    pub content: String,
    pub thumb_media_id: String,
    pub need_open_comment: u8,
    pub only_fans_can_comment: u8,
}

/// Successful `freepublish/submit` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishReceipt {
    pub errcode: i64,
    pub errmsg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg_data_id: Option<String>,
}

impl PublishReceipt {
    fn from_value(value: &Value) -> Self {
        Self {
            errcode: value.get("errcode").and_then(Value::as_i64).unwrap_or_default(),
            errmsg: value
                .get("errmsg")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            publish_id: value.get("publish_id").and_then(id_string),
            msg_data_id: value.get("msg_data_id").and_then(id_string),
        }
    }
}

/// The platform returns ids as either strings or bare numbers.
fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Remote operations the publish pipeline depends on.
pub trait PlatformApi {
    fn access_token(
        &self,
        appid: &str,
        appsecret: &str,
    ) -> impl Future<Output = Result<String, ApiError>> + Send;

    fn upload_image(
        &self,
        access_token: &str,
        image: &CoverImage,
    ) -> impl Future<Output = Result<String, ApiError>> + Send;

    fn add_draft(
        &self,
        access_token: &str,
        article: &DraftArticle,
    ) -> impl Future<Output = Result<String, ApiError>> + Send;

    fn submit_publish(
        &self,
        access_token: &str,
        media_id: &str,
    ) -> impl Future<Output = Result<PublishReceipt, ApiError>> + Send;
}

#[derive(Debug, Clone)]
pub struct WeChatClient {
    base_url: String,
}

impl Default for WeChatClient {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE)
    }
}

impl WeChatClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, operation: Operation) -> String {
        format!("{}{}", self.base_url, operation.path())
    }

    fn http_client(operation: Operation) -> Result<reqwest::Client, ApiError> {
        reqwest::Client::builder()
            .user_agent(concat!("mpdraft/", env!("CARGO_PKG_VERSION")))
            .timeout(operation.timeout())
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|source| ApiError::Transport { operation, source })
    }

    /// Sends the request and returns the raw body together with its JSON parse, if any.
    async fn send(
        operation: Operation,
        request: reqwest::RequestBuilder,
    ) -> Result<(String, Option<Value>), ApiError> {
        let transport = |source| ApiError::Transport { operation, source };
        let response = request.send().await.map_err(transport)?;
        let status = response.status();
        let body = response.text().await.map_err(transport)?;
        debug!(%operation, %status, bytes = body.len(), "Platform response received");
        let parsed = serde_json::from_str::<Value>(&body).ok();
        Ok((body, parsed))
    }

    fn required_string(
        operation: Operation,
        field: &str,
        (body, parsed): (String, Option<Value>),
    ) -> Result<String, ApiError> {
        match parsed.as_ref().and_then(|v| v.get(field)).and_then(id_string) {
            Some(value) => Ok(value),
            None => {
                warn!(%operation, body = %body, "Platform response missing {field}");
                Err(ApiError::Rejected { operation, body })
            }
        }
    }
}

impl PlatformApi for WeChatClient {
    async fn access_token(&self, appid: &str, appsecret: &str) -> Result<String, ApiError> {
        let operation = Operation::AccessToken;
        let request = Self::http_client(operation)?.get(self.url(operation)).query(&[
            ("grant_type", "client_credential"),
            ("appid", appid),
            ("secret", appsecret),
        ]);
        let response = Self::send(operation, request).await?;
        Self::required_string(operation, "access_token", response)
    }

    async fn upload_image(&self, access_token: &str, image: &CoverImage) -> Result<String, ApiError> {
        let operation = Operation::UploadImage;
        let content_type = image
            .content_type
            .as_deref()
            .filter(|ct| !ct.trim().is_empty())
            .unwrap_or(DEFAULT_IMAGE_CONTENT_TYPE);
        let part = Part::bytes(image.bytes.clone())
            .file_name(image.filename.clone())
            .mime_str(content_type)
            .map_err(|source| ApiError::Transport { operation, source })?;
        let request = Self::http_client(operation)?
            .post(self.url(operation))
            .query(&[("access_token", access_token), ("type", "image")])
            .multipart(Form::new().part("media", part));
        let response = Self::send(operation, request).await?;
        Self::required_string(operation, "media_id", response)
    }

    async fn add_draft(&self, access_token: &str, article: &DraftArticle) -> Result<String, ApiError> {
        let operation = Operation::AddDraft;
        let request = Self::http_client(operation)?
            .post(self.url(operation))
            .query(&[("access_token", access_token)])
            .json(&json!({ "articles": [article] }));
        let response = Self::send(operation, request).await?;
        Self::required_string(operation, "media_id", response)
    }

    async fn submit_publish(
        &self,
        access_token: &str,
        media_id: &str,
    ) -> Result<PublishReceipt, ApiError> {
        let operation = Operation::SubmitPublish;
        let request = Self::http_client(operation)?
            .post(self.url(operation))
            .query(&[("access_token", access_token)])
            .json(&json!({ "media_id": media_id }));
        let (body, parsed) = Self::send(operation, request).await?;
        match parsed {
            Some(value) if value.get("errcode").and_then(Value::as_i64) == Some(0) => {
                Ok(PublishReceipt::from_value(&value))
            }
            _ => {
                warn!(%operation, body = %body, "Publish submission rejected");
                Err(ApiError::Rejected { operation, body })
            }
        }
    }
}
