use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use crate::{
    db::models::{JobNotification, JobSummary},
    names,
    rejections::{AppError, ResultExt},
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(names::JOBS_URL, get(jobs))
        .route(names::JOB_ROUTE, get(job))
}

async fn jobs(State(state): State<AppState>) -> Result<Json<Vec<JobSummary>>, AppError> {
    let jobs = state.db.active_jobs().await.reject("could not get jobs")?;
    Ok(Json(jobs))
}

async fn job(
    State(state): State<AppState>,
    Path(job_id): Path<i64>,
) -> Result<Json<JobNotification>, AppError> {
    state
        .db
        .active_job(job_id)
        .await
        .reject("could not get job")?
        .map(Json)
        .ok_or(AppError::NotFound)
}
