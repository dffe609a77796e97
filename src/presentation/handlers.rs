// HTTP request handlers
use crate::application::report::{InsightsReport, ReportFilter, ReportOptions};
use crate::domain::submission::validate;
use crate::presentation::app_state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Form posted by the front end: raw comma separated URLs, the selected
/// device and the current display filters.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsForm {
    #[serde(default)]
    pub urls: String,
    #[serde(default)]
    pub form_factor: String,
    #[serde(flatten)]
    pub filter: ReportFilter,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Metric, status and device choices for building filters
pub async fn list_options() -> Json<ReportOptions> {
    Json(ReportOptions::catalog())
}

/// Validate a submission, query CrUX for every URL and return the report
pub async fn submit_insights(
    State(state): State<Arc<AppState>>,
    Json(form): Json<InsightsForm>,
) -> Response {
    let submission = match validate(&form.urls, &form.form_factor) {
        Ok(submission) => submission,
        Err(e) => {
            tracing::info!("Rejected submission {:?}: {}", form.urls, e);
            let body = ErrorBody {
                message: e.to_string(),
            };
            return (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response();
        }
    };

    let results = state
        .insights_service
        .fetch_all(&submission.urls, submission.form_factor)
        .await;
    tracing::debug!("Building report for {} URLs", results.len());

    Json(InsightsReport::build(submission, results, &form.filter)).into_response()
}
