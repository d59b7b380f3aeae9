use axum::{
    extract::{Path, State},
    routing::{delete, get, post},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument};
use uuid::Uuid;

use super::dto::{
    CreateFavoriteRequest, CreatedFavoriteResponse, FavoriteListResponse, LogFavoriteRequest,
};
use crate::{
    error::AppError,
    extractors::JsonOrDefault,
    meals::{
        dto::{CreatedMealResponse, SuccessResponse},
        repo_types::NewMeal,
        services::meal_view,
    },
    nutrition::MealType,
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/favorites", get(list_favorites).post(create_favorite))
        .route("/favorites/:id", delete(delete_favorite))
        .route("/favorites/:id/log", post(log_favorite))
}

#[instrument(skip(state, body))]
pub async fn create_favorite(
    State(state): State<AppState>,
    Json(body): Json<CreateFavoriteRequest>,
) -> Result<Json<CreatedFavoriteResponse>, AppError> {
    if body.name.trim().is_empty() {
        return Err(AppError::BadRequest("Favorite name is required".into()));
    }
    let favorite = state.favorites.insert(body.into_new()).await?;
    info!(id = %favorite.id, name = %favorite.name, "favorite saved");
    Ok(Json(CreatedFavoriteResponse {
        success: true,
        favorite,
    }))
}

#[instrument(skip(state))]
pub async fn list_favorites(
    State(state): State<AppState>,
) -> Result<Json<FavoriteListResponse>, AppError> {
    Ok(Json(FavoriteListResponse {
        favorites: state.favorites.list().await?,
    }))
}

#[instrument(skip(state))]
pub async fn delete_favorite(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SuccessResponse>, AppError> {
    state.favorites.delete(id).await?;
    Ok(Json(SuccessResponse { success: true }))
}

/// Log a favorite as a meal eaten now.
#[instrument(skip(state, body))]
pub async fn log_favorite(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    JsonOrDefault(body): JsonOrDefault<LogFavoriteRequest>,
) -> Result<Json<CreatedMealResponse>, AppError> {
    let fav = state
        .favorites
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Favorite not found".into()))?;
    let meal_type = body
        .meal_type
        .unwrap_or_else(|| MealType::current(state.offset()));

    let meal = state
        .meals
        .insert(NewMeal {
            id: Uuid::new_v4(),
            image_url: String::new(),
            items: fav.items,
            total_calories: fav.total_calories,
            macros: fav.macros_summary,
            timestamp: OffsetDateTime::now_utc(),
            meal_type,
            dietary_preference: fav.dietary_preference,
            advice: String::new(),
        })
        .await?;
    info!(favorite = %id, meal = %meal.id, "favorite logged");

    Ok(Json(CreatedMealResponse {
        success: true,
        meal: meal_view(&state, meal).await,
    }))
}
