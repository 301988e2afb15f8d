pub mod auth;
pub mod progression;
pub mod tokens;
