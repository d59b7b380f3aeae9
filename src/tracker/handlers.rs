use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use super::dto::{
    DateQuery, ProgressResponse, SavedGoalsResponse, SetGoalsRequest, TrackerResponse, TrackerView,
};
use crate::{
    days::{format_day, parse_day, today},
    error::AppError,
    meals::services::day_totals,
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/tracker", get(get_goals).post(set_goals))
        .route("/tracker/progress", get(progress))
}

#[instrument(skip(state))]
pub async fn set_goals(
    State(state): State<AppState>,
    Json(body): Json<SetGoalsRequest>,
) -> Result<Json<SavedGoalsResponse>, AppError> {
    let day = parse_day(&body.date, state.offset()).map_err(AppError::BadRequest)?;
    let entry = state.goals.upsert(day, body.goals).await?;
    info!(day = %format_day(day), kcal = entry.goals.calories, "daily goals saved");
    Ok(Json(SavedGoalsResponse {
        success: true,
        tracker: entry,
    }))
}

#[instrument(skip(state))]
pub async fn get_goals(
    State(state): State<AppState>,
    Query(q): Query<DateQuery>,
) -> Result<Json<TrackerResponse>, AppError> {
    let tracker = match q.date.as_deref().filter(|d| !d.trim().is_empty()) {
        Some(raw) => {
            let day = parse_day(raw, state.offset()).map_err(AppError::BadRequest)?;
            TrackerView::Day(state.goals.get(day).await?)
        }
        None => TrackerView::All(
            state
                .goals
                .list()
                .await?
                .into_iter()
                .map(|g| (format_day(g.date), g))
                .collect(),
        ),
    };
    Ok(Json(TrackerResponse { tracker }))
}

/// Goals against what was actually eaten that day. Defaults to today.
#[instrument(skip(state))]
pub async fn progress(
    State(state): State<AppState>,
    Query(q): Query<DateQuery>,
) -> Result<Json<ProgressResponse>, AppError> {
    let day = match q.date.as_deref().filter(|d| !d.trim().is_empty()) {
        Some(raw) => parse_day(raw, state.offset()).map_err(AppError::BadRequest)?,
        None => today(state.offset()),
    };
    let stored = state.goals.get(day).await?;
    let consumed = day_totals(&state, day).await?;
    let goals_set = stored.is_some();
    let goals = stored.map(|g| g.goals).unwrap_or_default();
    Ok(Json(ProgressResponse::new(day, goals, goals_set, consumed)))
}
