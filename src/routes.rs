use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};

use crate::{
    error::ApiError,
    models::CourseContext,
    policy::PolicyTable,
    resolver::Resolution,
    step::{StepReport, StepRunner},
};

pub type AppState = Arc<StepRunner>;

pub fn router(runner: AppState) -> Router {
    Router::new()
        .route("/api/policy", get(policy))
        // payload preview, no writes
        .route("/api/courses/resolve", post(resolve_course))
        // the pipeline step itself
        .route("/api/courses/configure", post(configure_course))
        .with_state(runner)
}

async fn policy(State(runner): State<AppState>) -> Json<PolicyTable> {
    Json(runner.resolver().policy().clone())
}

async fn resolve_course(
    State(runner): State<AppState>,
    Json(ctx): Json<CourseContext>,
) -> Result<Json<Resolution>, ApiError> {
    Ok(Json(runner.dry_run(&ctx).await?))
}

// Always 200: skipped and degraded runs are still finished steps.
async fn configure_course(
    State(runner): State<AppState>,
    Json(ctx): Json<CourseContext>,
) -> Json<StepReport> {
    let report = runner.run(ctx).await;
    tracing::info!(
        run_id = %report.run_id,
        canvas_ou = %report.course.canvas_ou,
        status = ?report.status,
        degraded = report.degraded,
        "course settings step finished"
    );
    Json(report)
}
