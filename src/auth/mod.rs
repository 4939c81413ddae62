use crate::state::AppState;
use axum::Router;

mod dto;
pub mod error;
pub mod handlers;
pub mod otp;
pub mod repo;
pub mod repo_types;
pub mod services;

pub fn router() -> Router<AppState> {
    handlers::auth_routes()
}
