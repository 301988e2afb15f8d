use axum::{
    body::Bytes,
    extract::{Path, State},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};

use crate::{
    db::models::{LevelSummary, PublicQuestion, TopicSummary},
    extractors::AuthGuard,
    names,
    rejections::{AppError, ResultExt},
    services::progression::{Answers, SubmissionOutcome},
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(names::LEVELS_URL, get(levels))
        .route(names::LEVEL_TOPICS_ROUTE, get(level_topics))
        .route(names::TOPIC_QUESTIONS_ROUTE, get(topic_questions))
        .route(names::SUBMIT_ANSWERS_ROUTE, post(submit_answers))
}

async fn levels(State(state): State<AppState>) -> Result<Json<Vec<LevelSummary>>, AppError> {
    let levels = state.db.levels().await.reject("could not get levels")?;
    Ok(Json(levels))
}

#[derive(Serialize)]
struct LevelTopics {
    level_id: i64,
    level_number: i64,
    level_title: String,
    topics: Vec<TopicSummary>,
}

async fn level_topics(
    State(state): State<AppState>,
    Path(level_id): Path<i64>,
) -> Result<Json<LevelTopics>, AppError> {
    let level = state
        .db
        .level(level_id)
        .await
        .reject("could not get level")?
        .ok_or(AppError::NotFound)?;

    let topics = state
        .db
        .topics_for_level(level.id)
        .await
        .reject("could not get topics")?;

    Ok(Json(LevelTopics {
        level_id: level.id,
        level_number: level.number,
        level_title: level.title,
        topics,
    }))
}

#[derive(Serialize)]
struct TopicQuestions {
    topic_id: i64,
    topic_title: String,
    questions: Vec<PublicQuestion>,
}

async fn topic_questions(
    State(state): State<AppState>,
    Path(topic_id): Path<i64>,
) -> Result<Json<TopicQuestions>, AppError> {
    let topic = state
        .db
        .topic(topic_id)
        .await
        .reject("could not get topic")?
        .ok_or(AppError::NotFound)?;

    let questions = state
        .db
        .public_questions_for_topic(topic.id)
        .await
        .reject("could not get questions")?;

    Ok(Json(TopicQuestions {
        topic_id: topic.id,
        topic_title: topic.title,
        questions,
    }))
}

/// The body is parsed leniently: anything that is not `{"answers": {...}}`
/// counts as an empty submission.
async fn submit_answers(
    AuthGuard(user): AuthGuard,
    State(state): State<AppState>,
    Path(topic_id): Path<i64>,
    body: Bytes,
) -> Result<Response, AppError> {
    let payload = serde_json::from_slice::<Value>(&body).unwrap_or_else(|e| {
        tracing::debug!("submission body is not JSON: {e}");
        Value::Null
    });
    let answers = Answers::from_payload(&payload);

    let outcome = state
        .db
        .submit_answers(user.id, topic_id, &answers)
        .await
        .reject("could not submit answers")?
        .ok_or(AppError::NotFound)?;

    let message = outcome.message();
    let response = match outcome {
        SubmissionOutcome::Completed { ledger, .. } => json!({
            "message": message,
            "xp": ledger.xp,
            "coins": ledger.coins,
            "level": ledger.level,
            "unlocked_level": ledger.unlocked_level,
        }),
        SubmissionOutcome::AlreadyCompleted | SubmissionOutcome::Partial { .. } => {
            json!({ "message": message })
        }
    };

    Ok(Json(response).into_response())
}
