use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use crate::{
    db::models::{CodingProblem, CodingProblemSummary, CodingTopic},
    names,
    rejections::{AppError, ResultExt},
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(names::CODING_TOPICS_URL, get(coding_topics))
        .route(names::CODING_PROBLEMS_ROUTE, get(coding_problems))
        .route(names::CODING_PROBLEM_ROUTE, get(coding_problem))
}

async fn coding_topics(State(state): State<AppState>) -> Result<Json<Vec<CodingTopic>>, AppError> {
    let topics = state
        .db
        .coding_topics()
        .await
        .reject("could not get coding topics")?;

    Ok(Json(topics))
}

async fn coding_problems(
    State(state): State<AppState>,
    Path(topic_id): Path<i64>,
) -> Result<Json<Vec<CodingProblemSummary>>, AppError> {
    let problems = state
        .db
        .coding_problems(topic_id)
        .await
        .reject("could not get coding problems")?;

    Ok(Json(problems))
}

async fn coding_problem(
    State(state): State<AppState>,
    Path(problem_id): Path<i64>,
) -> Result<Json<CodingProblem>, AppError> {
    state
        .db
        .coding_problem(problem_id)
        .await
        .reject("could not get coding problem")?
        .map(Json)
        .ok_or(AppError::NotFound)
}
