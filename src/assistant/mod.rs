//! Model-backed coaching endpoints. Each one builds a prompt from the meal
//! log and goals, then decodes the reply through structured generation.

pub mod dto;
pub mod handlers;
pub mod prompts;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
