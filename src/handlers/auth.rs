use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    extractors::{AuthGuard, JsonBody},
    names,
    rejections::{AppError, ResultExt},
    services::auth::{
        AuthSession, ChangePasswordOutcome, GoogleLoginOutcome, LoginOutcome, LogoutOutcome,
        RefreshOutcome, RegisterOutcome,
    },
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(names::REGISTER_URL, post(register))
        .route(names::LOGIN_URL, post(login))
        .route(names::GOOGLE_LOGIN_URL, post(google_login))
        .route(names::REFRESH_URL, post(refresh))
        .route(names::LOGOUT_URL, post(logout))
        .route(names::CHANGE_PASSWORD_URL, post(change_password))
}

#[derive(Serialize)]
struct UserSummary {
    email: String,
    name: String,
    xp: i64,
    coins: i64,
    level: i64,
    avatar: Option<String>,
}

#[derive(Serialize)]
struct SessionResponse {
    access_token: String,
    refresh_token: String,
    user: UserSummary,
}

impl From<AuthSession> for SessionResponse {
    fn from(session: AuthSession) -> Self {
        Self {
            access_token: session.tokens.access_token,
            refresh_token: session.tokens.refresh_token,
            user: UserSummary {
                email: session.user.email,
                name: session.user.display_name,
                xp: session.profile.xp,
                coins: session.profile.coins,
                level: session.profile.level,
                avatar: session.profile.avatar,
            },
        }
    }
}

#[derive(Deserialize)]
struct RegisterPost {
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

async fn register(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<RegisterPost>,
) -> Result<Response, AppError> {
    let outcome = state
        .auth
        .register(body.name.trim(), body.email.trim(), &body.password)
        .await
        .reject("could not register user")?;

    match outcome {
        RegisterOutcome::Registered(session) => {
            Ok((StatusCode::CREATED, Json(SessionResponse::from(session))).into_response())
        }
        RegisterOutcome::EmptyFields => {
            Err(AppError::Input("name, email and password are required"))
        }
        RegisterOutcome::EmailTaken => Err(AppError::Input("Email already registered")),
        RegisterOutcome::WeakPassword(reason) => Err(AppError::Input(reason)),
    }
}

#[derive(Deserialize)]
struct LoginPost {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

async fn login(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<LoginPost>,
) -> Result<Json<SessionResponse>, AppError> {
    let outcome = state
        .auth
        .login(body.email.trim(), &body.password)
        .await
        .reject("could not log in")?;

    match outcome {
        LoginOutcome::Success(session) => Ok(Json(session.into())),
        LoginOutcome::EmptyFields => Err(AppError::Input("email and password are required")),
        LoginOutcome::InvalidCredentials => Err(AppError::Unauthorized),
    }
}

#[derive(Deserialize)]
struct GoogleLoginPost {
    #[serde(default)]
    token: String,
}

async fn google_login(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<GoogleLoginPost>,
) -> Result<Json<SessionResponse>, AppError> {
    let outcome = state
        .auth
        .google_login(&body.token)
        .await
        .reject("could not verify google token")?;

    match outcome {
        GoogleLoginOutcome::Success(session) => Ok(Json(session.into())),
        GoogleLoginOutcome::EmptyToken => Err(AppError::Input("token is required")),
        GoogleLoginOutcome::InvalidToken => Err(AppError::Unauthorized),
    }
}

#[derive(Deserialize)]
struct RefreshPost {
    #[serde(default)]
    refresh: String,
}

async fn refresh(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<RefreshPost>,
) -> Result<Response, AppError> {
    let outcome = state
        .auth
        .refresh(&body.refresh)
        .await
        .reject("could not refresh token")?;

    match outcome {
        RefreshOutcome::Refreshed(tokens) => Ok(Json(json!({
            "access_token": tokens.access_token,
            "refresh_token": tokens.refresh_token,
        }))
        .into_response()),
        RefreshOutcome::EmptyToken => Err(AppError::Input("refresh token is required")),
        RefreshOutcome::InvalidToken => Err(AppError::Unauthorized),
    }
}

async fn logout(
    AuthGuard(user): AuthGuard,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<RefreshPost>,
) -> Result<Response, AppError> {
    let outcome = state
        .auth
        .logout(user.id, &body.refresh)
        .await
        .reject("could not log out")?;

    match outcome {
        LogoutOutcome::LoggedOut => {
            Ok(Json(json!({ "message": "Logged out successfully." })).into_response())
        }
        LogoutOutcome::EmptyToken => Err(AppError::Input("refresh token is required")),
        LogoutOutcome::InvalidToken => Err(AppError::Input("Invalid token.")),
    }
}

#[derive(Deserialize)]
struct ChangePasswordPost {
    #[serde(default)]
    current_password: String,
    #[serde(default)]
    new_password: String,
}

async fn change_password(
    AuthGuard(user): AuthGuard,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<ChangePasswordPost>,
) -> Result<Response, AppError> {
    let outcome = state
        .auth
        .change_password(user.id, &body.current_password, &body.new_password)
        .await
        .reject("could not change password")?;

    match outcome {
        ChangePasswordOutcome::Success => {
            Ok(Json(json!({ "message": "Password updated." })).into_response())
        }
        ChangePasswordOutcome::EmptyFields => {
            Err(AppError::Input("current_password and new_password are required"))
        }
        ChangePasswordOutcome::WeakPassword(reason) => Err(AppError::Input(reason)),
        ChangePasswordOutcome::IncorrectPassword => {
            Err(AppError::Input("Current password is incorrect."))
        }
    }
}
