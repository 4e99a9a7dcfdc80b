//! The LMS collaborator: two verbs over JSON, plus the Canvas paths this step
//! touches.

use std::time::Duration;

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::Value;

use crate::error::{ConfigError, LmsError};

#[async_trait]
pub trait LmsClient: Send + Sync {
    async fn get(&self, path: &str) -> Result<Value, LmsError>;
    async fn put(&self, path: &str, payload: &Value) -> Result<Value, LmsError>;
}

// Canvas ids may be SIS references like `sis_course_id:Online.Master.FDREL 121`
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b':');

fn segment(raw: &str) -> String {
    utf8_percent_encode(raw, SEGMENT).to_string()
}

pub mod paths {
    use super::segment;

    pub fn course(canvas_ou: &str) -> String {
        format!("/api/v1/courses/{}", segment(canvas_ou))
    }

    pub fn settings(canvas_ou: &str) -> String {
        format!("{}/settings", course(canvas_ou))
    }

    pub fn feature_flag(canvas_ou: &str, flag: &str) -> String {
        format!("{}/features/flags/{}", course(canvas_ou), segment(flag))
    }

    pub fn terms(account_id: &str) -> String {
        format!("/api/v1/accounts/{}/terms?per_page=100", segment(account_id))
    }
}

/// reqwest-backed client for a Canvas instance.
#[derive(Clone)]
pub struct CanvasClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl CanvasClient {
    pub fn new(base_url: &str, token: &str, timeout: Duration) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .gzip(true)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, path: &str, req: reqwest::RequestBuilder) -> Result<Value, LmsError> {
        let res = req
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| LmsError::Transport {
                path: path.to_string(),
                message: e.to_string(),
            })?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(LmsError::Status {
                path: path.to_string(),
                status,
                body,
            });
        }

        let bytes = res.bytes().await.map_err(|e| LmsError::Transport {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        if bytes.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&bytes).map_err(|e| LmsError::Decode {
            path: path.to_string(),
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl LmsClient for CanvasClient {
    async fn get(&self, path: &str) -> Result<Value, LmsError> {
        tracing::debug!(%path, "lms get");
        self.send(path, self.http.get(self.url(path))).await
    }

    async fn put(&self, path: &str, payload: &Value) -> Result<Value, LmsError> {
        tracing::debug!(%path, "lms put");
        self.send(path, self.http.put(self.url(path)).json(payload))
            .await
    }
}
