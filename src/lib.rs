pub mod db;
pub mod extractors;
pub mod google;
pub mod handlers;
pub mod models;
pub mod names;
pub mod rejections;
pub mod services;

use axum::Router;

use crate::rejections::AppError;
use crate::services::auth::AuthService;

#[derive(Clone)]
pub struct AppState {
    pub db: db::Db,
    pub auth: AuthService,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(handlers::health::routes())
        .merge(handlers::auth::routes())
        .merge(handlers::profile::routes())
        .merge(handlers::tutorials::routes())
        .merge(handlers::progress::routes())
        .merge(handlers::coding::routes())
        .merge(handlers::jobs::routes())
        .fallback(not_found)
        .with_state(state)
}

async fn not_found() -> AppError {
    AppError::NotFound
}
