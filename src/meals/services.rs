use bytes::Bytes;
use time::{Date, Duration, OffsetDateTime};
use tracing::{info, warn};
use uuid::Uuid;

use super::{
    aggregate::{period_summary, totals_for_day, DayTotals, PeriodSummary},
    dto::{AnalyzeResponse, CreateMealRequest, MealView},
    repo::MealFilter,
    repo_types::{Meal, NewMeal},
};
use crate::{
    assistant::prompts,
    days::{day_bounds, format_day, today},
    error::AppError,
    llm::{generate_structured, GenerationParams, InlineImage, StructuredRequest},
    nutrition::{reconcile, AnalysisPayload, DietaryPreference, Macros, MealType},
    state::AppState,
    storage::{owns_photo, photo_key, PHOTO_URL_TTL_SECS},
};

pub struct ImageUpload {
    pub data: Bytes,
    pub content_type: String,
}

/// Analyze a meal photo and store the result.
///
/// The model's totals are reconciled against its own item list before
/// anything is persisted. The photo is uploaded only after a usable answer
/// came back.
pub async fn analyze_meal(
    state: &AppState,
    upload: ImageUpload,
    pref: DietaryPreference,
) -> Result<AnalyzeResponse, AppError> {
    let id = Uuid::new_v4();
    let key = photo_key(id, &upload.content_type)
        .ok_or_else(|| AppError::BadRequest("Only image files are allowed".into()))?;
    let meal_type = MealType::current(state.offset());

    let request = StructuredRequest::new(prompts::analyze(pref), prompts::ANALYZE_SCHEMA)
        .image(InlineImage {
            data: upload.data.clone(),
            mime_type: upload.content_type.clone(),
        })
        .params(GenerationParams {
            temperature: 0.3,
            top_p: Some(0.9),
            top_k: Some(40),
            ..state.params(0.3)
        });
    let mut analysis: AnalysisPayload = generate_structured(&state.invoker, request).await?;
    let fixed = reconcile(&mut analysis, &state.config.reconcile.tolerances());
    if fixed.calories || fixed.macros {
        info!(%id, ?fixed, "analysis totals corrected");
    }

    state
        .storage
        .put_object(&key, upload.data, &upload.content_type)
        .await?;

    let new_meal = NewMeal {
        id,
        image_url: key.clone(),
        items: analysis.items.clone(),
        total_calories: analysis.total_calories.unwrap_or_default(),
        macros: analysis.macros_summary.unwrap_or_default(),
        timestamp: OffsetDateTime::now_utc(),
        meal_type,
        dietary_preference: pref,
        advice: analysis.advice.clone().unwrap_or_default(),
    };
    let saved = match state.meals.insert(new_meal).await {
        Ok(m) => m,
        Err(e) => {
            if let Err(del) = state.storage.delete_object(&key).await {
                warn!(error = %del, %key, "failed to remove orphaned photo");
            }
            return Err(e.into());
        }
    };
    info!(id = %saved.id, kcal = saved.total_calories, "meal analyzed and saved");

    Ok(AnalyzeResponse {
        analysis,
        id: saved.id,
        meal_type,
        dietary_preference: pref,
    })
}

/// Store a manually entered meal. Totals are taken as given.
pub async fn create_meal(state: &AppState, req: CreateMealRequest) -> Result<Meal, AppError> {
    let meal = NewMeal {
        id: Uuid::new_v4(),
        image_url: req.image_url.unwrap_or_default(),
        items: req.items,
        total_calories: req.total_calories.unwrap_or_default(),
        macros: req.macros_summary.unwrap_or_default(),
        timestamp: req.timestamp.unwrap_or_else(OffsetDateTime::now_utc),
        meal_type: req
            .meal_type
            .unwrap_or_else(|| MealType::current(state.offset())),
        dietary_preference: req.dietary_preference.unwrap_or_default(),
        advice: req.advice.unwrap_or_default(),
    };
    Ok(state.meals.insert(meal).await?)
}

/// Longest look-back accepted from a `days` query.
pub const MAX_WINDOW_DAYS: i64 = 365;

/// Meals eaten during the last `days` days (1..=365), newest first.
pub async fn recent_meals(state: &AppState, days: i64) -> Result<Vec<Meal>, AppError> {
    let days = days.clamp(1, MAX_WINDOW_DAYS);
    let since = OffsetDateTime::now_utc() - Duration::days(days);
    Ok(state.meals.list(MealFilter::since(since)).await?)
}

/// Meals of one calendar day, newest first.
pub async fn meals_on(
    state: &AppState,
    day: Date,
    limit: Option<i64>,
) -> Result<Vec<Meal>, AppError> {
    let (from, to) = day_bounds(day, state.offset());
    let filter = MealFilter {
        limit,
        ..MealFilter::between(from, to)
    };
    Ok(state.meals.list(filter).await?)
}

/// Consumed totals for a calendar day.
pub async fn day_totals(state: &AppState, day: Date) -> Result<DayTotals, AppError> {
    let meals = meals_on(state, day, None).await?;
    Ok(totals_for_day(&meals, day, state.offset()))
}

/// Meals eaten in the last `days` calendar days, today included, together
/// with the local date of today.
pub async fn window_meals(state: &AppState, days: u32) -> Result<(Date, Vec<Meal>), AppError> {
    let offset = state.offset();
    let today = today(offset);
    let first = today - Duration::days(i64::from(days.max(1)) - 1);
    let (from, _) = day_bounds(first, offset);
    let meals = state.meals.list(MealFilter::since(from)).await?;
    Ok((today, meals))
}

/// Summary of the last `days` calendar days, today included.
pub async fn summarize(state: &AppState, days: u32) -> Result<PeriodSummary, AppError> {
    let days = days.clamp(1, MAX_WINDOW_DAYS as u32);
    let (today, meals) = window_meals(state, days).await?;
    Ok(period_summary(&meals, today, days, state.offset()))
}

/// Remove a meal and its photo. Missing meals are not an error.
///
/// Only the object uploaded for this meal is removed; a manual entry that
/// names another meal's key leaves that photo alone.
pub async fn delete_meal(state: &AppState, id: Uuid) -> Result<(), AppError> {
    if let Some(meal) = state.meals.delete(id).await? {
        if owns_photo(meal.id, &meal.image_url) {
            if let Err(e) = state.storage.delete_object(&meal.image_url).await {
                warn!(error = %e, %id, "failed to delete meal photo");
            }
        }
    }
    Ok(())
}

/// Client view of a meal, with stored photos turned into temporary links.
pub async fn meal_view(state: &AppState, meal: Meal) -> MealView {
    let url = if owns_photo(meal.id, &meal.image_url) {
        match state.storage.presign_get(&meal.image_url, PHOTO_URL_TTL_SECS).await {
            Ok(url) => url,
            Err(e) => {
                warn!(error = %e, id = %meal.id, "presign failed");
                meal.image_url.clone()
            }
        }
    } else {
        meal.image_url.clone()
    };
    MealView::new(meal, url)
}

pub async fn meal_views(state: &AppState, meals: Vec<Meal>) -> Vec<MealView> {
    let mut out = Vec::with_capacity(meals.len());
    for m in meals {
        out.push(meal_view(state, m).await);
    }
    out
}

/// CSV export of meals in the order given.
pub fn meals_csv(meals: &[Meal], state: &AppState) -> String {
    let offset = state.offset();
    let mut out = String::from("Date,Time,Meal Type,Diet,Items,Calories,Protein (g),Carbs (g),Fats (g)\n");
    for m in meals {
        let local = m.timestamp.to_offset(offset);
        let items = m
            .items
            .iter()
            .map(|i| i.name.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        let Macros { protein, carbs, fats } = m.macros;
        let row = [
            format_day(local.date()),
            format!("{:02}:{:02}", local.hour(), local.minute()),
            m.meal_type.to_string(),
            m.dietary_preference.to_string(),
            items,
            format!("{:.0}", m.total_calories),
            format!("{protein:.1}"),
            format!("{carbs:.1}"),
            format!("{fats:.1}"),
        ];
        let line = row.iter().map(|f| csv_field(f)).collect::<Vec<_>>().join(",");
        out.push_str(&line);
        out.push('\n');
    }
    out
}

fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nutrition::MealItem;
    use time::macros::datetime;

    #[test]
    fn csv_quotes_awkward_fields() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a, b"), "\"a, b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn csv_has_header_and_one_row_per_meal() {
        let state = AppState::fake();
        let meal = NewMeal {
            id: Uuid::nil(),
            image_url: String::new(),
            items: vec![
                MealItem { name: "Rajma, Chawal".into(), calories: 450.0, protein: 15.0, carbs: 70.0, fats: 9.0 },
                MealItem { name: "Salad".into(), calories: 20.0, protein: 1.0, carbs: 4.0, fats: 0.0 },
            ],
            total_calories: 470.0,
            macros: Macros { protein: 16.0, carbs: 74.0, fats: 9.0 },
            timestamp: datetime!(2025-02-03 13:05 UTC),
            meal_type: MealType::Lunch,
            dietary_preference: DietaryPreference::Standard,
            advice: String::new(),
        }
        .into_meal(datetime!(2025-02-03 13:05 UTC));

        let csv = meals_csv(&[meal], &state);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Date,Time,Meal Type"));
        assert_eq!(
            lines[1],
            "2025-02-03,13:05,Lunch,Standard,\"Rajma, Chawal; Salad\",470,16.0,74.0,9.0"
        );
    }
}
