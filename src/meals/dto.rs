use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::{aggregate::DayTotals, repo_types::Meal};
use crate::nutrition::{AnalysisPayload, DietaryPreference, Macros, MealItem, MealType};

/// Meal as returned to clients.
#[derive(Debug, Clone, Serialize)]
pub struct MealView {
    pub id: Uuid,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
    pub items: Vec<MealItem>,
    pub total_calories: f64,
    pub macros_summary: Macros,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    #[serde(rename = "mealType")]
    pub meal_type: MealType,
    #[serde(rename = "dietaryPreference")]
    pub dietary_preference: DietaryPreference,
    pub advice: String,
    #[serde(rename = "createdAt", with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl MealView {
    pub fn new(meal: Meal, image_url: String) -> Self {
        Self {
            id: meal.id,
            image_url,
            items: meal.items,
            total_calories: meal.total_calories,
            macros_summary: meal.macros,
            timestamp: meal.timestamp,
            meal_type: meal.meal_type,
            dietary_preference: meal.dietary_preference,
            advice: meal.advice,
            created_at: meal.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MealListResponse {
    pub meals: Vec<MealView>,
}

#[derive(Debug, Serialize)]
pub struct CreatedMealResponse {
    pub success: bool,
    pub meal: MealView,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub stats: Vec<DayTotals>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    #[serde(flatten)]
    pub analysis: AnalysisPayload,
    pub id: Uuid,
    #[serde(rename = "mealType")]
    pub meal_type: MealType,
    #[serde(rename = "dietaryPreference")]
    pub dietary_preference: DietaryPreference,
}

/// Manually entered meal. Totals are stored as given.
#[derive(Debug, Default, Deserialize)]
pub struct CreateMealRequest {
    #[serde(default, rename = "imageUrl")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub items: Vec<MealItem>,
    #[serde(default, alias = "totalCalories")]
    pub total_calories: Option<f64>,
    #[serde(default, alias = "macros")]
    pub macros_summary: Option<Macros>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub timestamp: Option<OffsetDateTime>,
    #[serde(default, rename = "mealType")]
    pub meal_type: Option<MealType>,
    #[serde(default, rename = "dietaryPreference")]
    pub dietary_preference: Option<DietaryPreference>,
    #[serde(default)]
    pub advice: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MealsQuery {
    pub date: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct DaysQuery {
    #[serde(default = "default_days")]
    pub days: i64,
}

pub fn default_days() -> i64 {
    7
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_accepts_both_spellings() {
        let snake: CreateMealRequest = serde_json::from_str(
            r#"{"items":[{"name":"Idli","calories":120}],"total_calories":120,"macros_summary":{"protein":4,"carbs":24,"fats":1}}"#,
        )
        .unwrap();
        let camel: CreateMealRequest = serde_json::from_str(
            r#"{"totalCalories":120,"macros":{"protein":4,"carbs":24,"fats":1},"mealType":"Breakfast","dietaryPreference":"High Protein","timestamp":"2025-06-01T07:30:00Z"}"#,
        )
        .unwrap();
        assert_eq!(snake.total_calories, camel.total_calories);
        assert_eq!(snake.macros_summary, camel.macros_summary);
        assert_eq!(camel.meal_type, Some(MealType::Breakfast));
        assert_eq!(camel.dietary_preference, Some(DietaryPreference::HighProtein));
        assert!(camel.timestamp.is_some());
    }

    #[test]
    fn analyze_response_flattens_payload() {
        let resp = AnalyzeResponse {
            analysis: AnalysisPayload {
                items: vec![],
                total_calories: Some(0.0),
                macros_summary: Some(Macros::default()),
                advice: Some("Add a salad".into()),
            },
            id: Uuid::nil(),
            meal_type: MealType::Dinner,
            dietary_preference: DietaryPreference::Vegan,
        };
        let v = serde_json::to_value(resp).unwrap();
        assert_eq!(v["advice"], "Add a salad");
        assert_eq!(v["mealType"], "Dinner");
        assert_eq!(v["dietaryPreference"], "Vegan");
        assert_eq!(v["macros_summary"]["protein"], 0.0);
    }
}
