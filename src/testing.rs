//! In-memory `LmsClient` for tests.

use std::{collections::HashMap, sync::Mutex};

use async_trait::async_trait;
use http::StatusCode;
use serde_json::{json, Value};

use crate::{error::LmsError, lms::LmsClient};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Get(String),
    Put(String, Value),
}

/// Records every call; answers GETs from canned bodies and fails the paths it
/// is told to fail.
#[derive(Debug, Default)]
pub struct RecordingLms {
    responses: Mutex<HashMap<String, Value>>,
    failing: Mutex<Vec<String>>,
    calls: Mutex<Vec<Call>>,
}

impl RecordingLms {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, path: &str, body: Value) -> Self {
        self.responses.lock().unwrap().insert(path.to_string(), body);
        self
    }

    /// Serve an enrollment-term catalog the way Canvas shapes it.
    pub fn with_terms(self, account_id: &str, terms: &[(&str, i64)]) -> Self {
        let terms: Vec<Value> = terms
            .iter()
            .map(|(name, id)| json!({ "id": id, "name": name }))
            .collect();
        self.respond(
            &crate::lms::paths::terms(account_id),
            json!({ "enrollment_terms": terms }),
        )
    }

    /// Requests to `path` fail with a 500. A query string on the request is ignored.
    pub fn fail(self, path: &str) -> Self {
        self.failing.lock().unwrap().push(path.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn puts(&self) -> Vec<(String, Value)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Put(path, body) => Some((path, body)),
                Call::Get(_) => None,
            })
            .collect()
    }

    pub fn gets(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Get(path) => Some(path),
                Call::Put(..) => None,
            })
            .collect()
    }

    fn check(&self, path: &str) -> Result<(), LmsError> {
        let failing = self.failing.lock().unwrap();
        if failing.iter().any(|p| p == path || path.starts_with(&format!("{p}?"))) {
            return Err(LmsError::Status {
                path: path.to_string(),
                status: StatusCode::INTERNAL_SERVER_ERROR,
                body: "simulated failure".into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl LmsClient for RecordingLms {
    async fn get(&self, path: &str) -> Result<Value, LmsError> {
        self.calls.lock().unwrap().push(Call::Get(path.to_string()));
        self.check(path)?;
        self.responses
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| LmsError::Status {
                path: path.to_string(),
                status: StatusCode::NOT_FOUND,
                body: "not found".into(),
            })
    }

    async fn put(&self, path: &str, payload: &Value) -> Result<Value, LmsError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Put(path.to_string(), payload.clone()));
        self.check(path)?;
        Ok(payload.clone())
    }
}
