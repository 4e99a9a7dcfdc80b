pub mod config;
pub mod error;
pub mod lms;
pub mod models;
pub mod policy;
pub mod resolver;
pub mod routes;
pub mod step;
pub mod terms;
#[cfg(any(test, feature = "testing"))]
#[doc(hidden)]
pub mod testing;

use std::sync::Arc;

use axum::{routing::get, Router};

/// The full service router: health check plus the step routes.
pub fn app(runner: routes::AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .merge(routes::router(runner))
}

/// Wire a runner from configuration against a live Canvas instance.
pub fn runner_from_config(cfg: &config::Config) -> Result<routes::AppState, error::ConfigError> {
    let lms = lms::CanvasClient::new(&cfg.canvas_base_url, &cfg.canvas_token, cfg.lms_timeout)?;
    let resolver = resolver::Resolver::new(cfg.policy.clone(), cfg.root_account_id.clone());
    Ok(Arc::new(step::StepRunner::new(resolver, Arc::new(lms))))
}
