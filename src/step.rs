//! The course-settings pipeline step.
//!
//! Three independent PUTs run one after another. A failed write is recorded
//! against the course and the next write still runs. The step always hands
//! back a report so the pipeline can move on to its next step.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::skip_serializing_none;
use tracing::Instrument;
use uuid::Uuid;

use crate::{
    error::{LmsError, StepError, UpdateTarget},
    lms::{paths, LmsClient},
    models::CourseContext,
    resolver::{Resolution, Resolver},
};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// All three writes were attempted (some may have failed).
    Completed,
    /// The platform gate rejected the course; nothing was written.
    Skipped,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Message,
    Warning,
    Error,
}

#[derive(Serialize, Debug, Clone)]
pub struct LogEntry {
    pub level: LogLevel,
    pub text: String,
    pub at: DateTime<Utc>,
}

#[skip_serializing_none]
#[derive(Serialize, Debug, Clone)]
pub struct WriteResult {
    pub target: UpdateTarget,
    pub path: String,
    pub ok: bool,
    pub error: Option<String>,
}

#[derive(Serialize, Debug, Clone)]
pub struct StepReport {
    pub run_id: Uuid,
    pub course: CourseContext,
    pub status: StepStatus,
    /// True when any error was recorded against the course.
    pub degraded: bool,
    pub writes: Vec<WriteResult>,
    pub log: Vec<LogEntry>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl StepReport {
    pub fn entries(&self, level: LogLevel) -> impl Iterator<Item = &LogEntry> {
        self.log.iter().filter(move |e| e.level == level)
    }
}

/// Accumulates what the step has to say about one course and mirrors it to
/// the tracing output.
struct CourseLog<'a> {
    canvas_ou: &'a str,
    entries: Vec<LogEntry>,
}

impl<'a> CourseLog<'a> {
    fn new(canvas_ou: &'a str) -> Self {
        Self {
            canvas_ou,
            entries: Vec::new(),
        }
    }

    fn push(&mut self, level: LogLevel, text: String) {
        self.entries.push(LogEntry {
            level,
            text,
            at: Utc::now(),
        });
    }

    fn message(&mut self, text: impl Into<String>) {
        let text = text.into();
        tracing::info!(canvas_ou = %self.canvas_ou, "{}", text);
        self.push(LogLevel::Message, text);
    }

    fn warning(&mut self, text: impl Into<String>) {
        let text = text.into();
        tracing::warn!(canvas_ou = %self.canvas_ou, "{}", text);
        self.push(LogLevel::Warning, text);
    }

    fn error(&mut self, err: &StepError) {
        tracing::error!(canvas_ou = %self.canvas_ou, error = %err, "course update failed");
        self.push(LogLevel::Error, err.to_string());
    }

    fn degraded(&self) -> bool {
        self.entries.iter().any(|e| e.level == LogLevel::Error)
    }
}

pub struct StepRunner {
    resolver: Resolver,
    lms: Arc<dyn LmsClient>,
}

impl StepRunner {
    pub fn new(resolver: Resolver, lms: Arc<dyn LmsClient>) -> Self {
        Self { resolver, lms }
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Resolve payloads without writing anything.
    pub async fn dry_run(&self, ctx: &CourseContext) -> Result<Resolution, StepError> {
        self.resolver.resolve(self.lms.as_ref(), ctx).await
    }

    pub async fn run(&self, ctx: CourseContext) -> StepReport {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "course_settings",
            %run_id,
            canvas_ou = %ctx.canvas_ou,
            platform = %ctx.platform
        );
        self.run_inner(run_id, ctx).instrument(span).await
    }

    async fn run_inner(&self, run_id: Uuid, ctx: CourseContext) -> StepReport {
        let started_at = Utc::now();
        let mut log = CourseLog::new(&ctx.canvas_ou);
        let mut writes = Vec::with_capacity(3);

        let status = match self.resolver.resolve(self.lms.as_ref(), &ctx).await {
            Err(skip) => {
                log.message(format!("{skip}. Skipping course settings step."));
                StepStatus::Skipped
            }
            Ok(resolution) => {
                for warning in &resolution.warnings {
                    log.warning(warning.clone());
                }
                let payloads = &resolution.payloads;
                let flag = &self.resolver.policy().feature_flag;
                let course_path = paths::course(&ctx.canvas_ou);
                let settings_path = paths::settings(&ctx.canvas_ou);
                let features_path = paths::feature_flag(&ctx.canvas_ou, flag);
                let plan = [
                    (
                        UpdateTarget::Course,
                        encoded(&course_path, payloads.course.request_body()),
                        course_path,
                    ),
                    (
                        UpdateTarget::Settings,
                        encoded(&settings_path, serde_json::to_value(&payloads.settings)),
                        settings_path,
                    ),
                    (
                        UpdateTarget::Features,
                        encoded(&features_path, serde_json::to_value(&payloads.features)),
                        features_path,
                    ),
                ];
                for (target, body, path) in plan {
                    writes.push(self.write(&mut log, target, path, body).await);
                }
                StepStatus::Completed
            }
        };

        let degraded = log.degraded();
        let entries = log.entries;
        StepReport {
            run_id,
            course: ctx,
            status,
            degraded,
            writes,
            log: entries,
            started_at,
            finished_at: Utc::now(),
        }
    }

    async fn write(
        &self,
        log: &mut CourseLog<'_>,
        target: UpdateTarget,
        path: String,
        body: Result<Value, LmsError>,
    ) -> WriteResult {
        let sent = match body {
            Ok(body) => self.lms.put(&path, &body).await,
            // nothing goes out if the payload could not be encoded
            Err(e) => Err(e),
        };
        match sent {
            Ok(_) => {
                log.message(format!("{} updated successfully.", capitalized(target)));
                WriteResult {
                    target,
                    path,
                    ok: true,
                    error: None,
                }
            }
            Err(source) => {
                let err = StepError::UpdateFailed { target, source };
                log.error(&err);
                WriteResult {
                    target,
                    path,
                    ok: false,
                    error: Some(err.to_string()),
                }
            }
        }
    }
}

fn capitalized(target: UpdateTarget) -> String {
    crate::resolver::capitalize(&target.to_string())
}

fn encoded(path: &str, body: Result<Value, serde_json::Error>) -> Result<Value, LmsError> {
    body.map_err(|e| LmsError::Encode {
        path: path.to_string(),
        message: e.to_string(),
    })
}
