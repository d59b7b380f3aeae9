use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::header,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    aggregate::{self, daily_totals, PeriodSummary},
    dto::{
        CreateMealRequest, CreatedMealResponse, DaysQuery, MealListResponse, MealsQuery,
        StatsResponse, SuccessResponse,
    },
    services::{self, ImageUpload},
};
use crate::{
    days::{format_day, parse_day, today},
    error::AppError,
    nutrition::DietaryPreference,
    state::AppState,
};

const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/history", get(history))
        .route("/meals", get(list_meals))
        .route("/meals/stats", get(stats))
        .route("/meals/weekly-summary", get(weekly_summary))
        .route("/meals/export", get(export))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/analyze",
            post(analyze).layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES + 64 * 1024)),
        )
        .route("/meals", post(create_meal))
        .route("/meals/:id", delete(delete_meal))
}

/// POST /analyze (multipart). Fields: `image`, optional `dietaryPreference`.
#[instrument(skip(state, mp))]
pub async fn analyze(
    State(state): State<AppState>,
    mut mp: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut upload = None;
    let mut pref = DietaryPreference::default();

    while let Some(field) = mp
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("invalid multipart body: {e}")))?
    {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("image") => {
                let content_type = field
                    .content_type()
                    .map(|s| s.to_ascii_lowercase())
                    .unwrap_or_default();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("failed to read image: {e}")))?;
                if data.len() > MAX_IMAGE_BYTES {
                    return Err(AppError::BadRequest("Image is larger than 10 MB".into()));
                }
                upload = Some(ImageUpload { data, content_type });
            }
            Some("dietaryPreference") => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                pref = raw.parse().map_err(AppError::BadRequest)?;
            }
            _ => {}
        }
    }

    let upload = upload.ok_or_else(|| AppError::BadRequest("No image file provided".into()))?;
    info!(bytes = upload.data.len(), mime = %upload.content_type, %pref, "analyzing meal photo");
    let resp = services::analyze_meal(&state, upload, pref).await?;
    Ok(Json(resp))
}

/// Meals of the last seven days.
#[instrument(skip(state))]
pub async fn history(State(state): State<AppState>) -> Result<Json<MealListResponse>, AppError> {
    let meals = services::recent_meals(&state, 7).await?;
    Ok(Json(MealListResponse {
        meals: services::meal_views(&state, meals).await,
    }))
}

#[instrument(skip(state))]
pub async fn list_meals(
    State(state): State<AppState>,
    Query(q): Query<MealsQuery>,
) -> Result<Json<MealListResponse>, AppError> {
    let limit = q.limit.filter(|l| *l > 0);
    let meals = match q.date.as_deref().filter(|d| !d.trim().is_empty()) {
        Some(raw) => {
            let day = parse_day(raw, state.offset()).map_err(AppError::BadRequest)?;
            services::meals_on(&state, day, limit).await?
        }
        None => {
            state
                .meals
                .list(super::repo::MealFilter {
                    limit,
                    ..Default::default()
                })
                .await?
        }
    };
    Ok(Json(MealListResponse {
        meals: services::meal_views(&state, meals).await,
    }))
}

#[instrument(skip(state, body))]
pub async fn create_meal(
    State(state): State<AppState>,
    Json(body): Json<CreateMealRequest>,
) -> Result<Json<CreatedMealResponse>, AppError> {
    let meal = services::create_meal(&state, body).await?;
    info!(id = %meal.id, "meal logged manually");
    Ok(Json(CreatedMealResponse {
        success: true,
        meal: services::meal_view(&state, meal).await,
    }))
}

#[instrument(skip(state))]
pub async fn delete_meal(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SuccessResponse>, AppError> {
    services::delete_meal(&state, id).await?;
    Ok(Json(SuccessResponse { success: true }))
}

#[instrument(skip(state))]
pub async fn stats(
    State(state): State<AppState>,
    Query(q): Query<DaysQuery>,
) -> Result<Json<StatsResponse>, AppError> {
    let meals = services::recent_meals(&state, q.days).await?;
    Ok(Json(StatsResponse {
        stats: daily_totals(&meals, state.offset()),
    }))
}

#[instrument(skip(state))]
pub async fn weekly_summary(
    State(state): State<AppState>,
) -> Result<Json<PeriodSummary>, AppError> {
    let (today, meals) = services::window_meals(&state, 7).await?;
    Ok(Json(aggregate::weekly_summary(&meals, today, state.offset())))
}

/// CSV download, oldest meal first.
#[instrument(skip(state))]
pub async fn export(
    State(state): State<AppState>,
    Query(q): Query<DaysQuery>,
) -> Result<impl IntoResponse, AppError> {
    let mut meals = services::recent_meals(&state, q.days).await?;
    meals.reverse();
    let csv = services::meals_csv(&meals, &state);
    let filename = format!(
        "attachment; filename=\"meals-{}.csv\"",
        format_day(today(state.offset()))
    );
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, filename),
        ],
        csv,
    ))
}
