use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::{
    extractors::AuthGuard,
    names,
    rejections::{AppError, ResultExt},
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new().route(names::PROFILE_URL, get(profile))
}

#[derive(Serialize)]
struct ProfileResponse {
    id: i64,
    email: String,
    name: String,
    xp: i64,
    level: i64,
    coins: i64,
    unlocked_level: i64,
    avatar: Option<String>,
}

async fn profile(
    AuthGuard(user): AuthGuard,
    State(state): State<AppState>,
) -> Result<Json<ProfileResponse>, AppError> {
    let profile = state
        .auth
        .profile(user.id)
        .await
        .reject("could not load profile")?;

    Ok(Json(ProfileResponse {
        id: user.id,
        email: user.email,
        name: user.display_name,
        xp: profile.xp,
        level: profile.level,
        coins: profile.coins,
        unlocked_level: profile.unlocked_level,
        avatar: profile.avatar,
    }))
}
