use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::{
    db::models::TopicProgress,
    extractors::AuthGuard,
    names,
    rejections::{AppError, ResultExt},
    services::progression::{level_statuses, LevelStatus},
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(names::USER_PROGRESS_URL, get(user_progress))
        .route(names::USER_LEVELS_URL, get(user_levels))
}

#[derive(Serialize)]
struct UserProgress {
    /// The account e-mail, which doubles as the username.
    user: String,
    progress: Vec<TopicProgress>,
}

async fn user_progress(
    AuthGuard(user): AuthGuard,
    State(state): State<AppState>,
) -> Result<Json<UserProgress>, AppError> {
    let progress = state
        .db
        .user_progress(user.id)
        .await
        .reject("could not get user progress")?;

    Ok(Json(UserProgress {
        user: user.email,
        progress,
    }))
}

async fn user_levels(
    AuthGuard(user): AuthGuard,
    State(state): State<AppState>,
) -> Result<Json<Vec<LevelStatus>>, AppError> {
    let profile = state
        .db
        .get_or_create_profile(user.id)
        .await
        .reject("could not load profile")?;

    let rows = state
        .db
        .level_status_rows(user.id)
        .await
        .reject("could not get level status")?;

    Ok(Json(level_statuses(profile.unlocked_level, rows)))
}
