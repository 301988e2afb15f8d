pub mod auth;
pub mod coding;
pub mod health;
pub mod jobs;
pub mod profile;
pub mod progress;
pub mod tutorials;
