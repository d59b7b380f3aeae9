use serde::{Deserialize, Serialize};

use crate::{
    llm::ModelInfo,
    meals::aggregate::PeriodSummary,
    nutrition::{types::zero_if_null, DietaryPreference, MealType},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    #[serde(alias = "model", alias = "ai")]
    Assistant,
}

impl ChatRole {
    pub fn label(self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Assistant => "Assistant",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub history: Vec<ChatTurn>,
    #[serde(default, rename = "dietaryPreference")]
    pub dietary_preference: DietaryPreference,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct SuggestionsRequest {
    #[serde(default, rename = "dietaryPreference")]
    pub dietary_preference: DietaryPreference,
    #[serde(default, rename = "mealType")]
    pub meal_type: Option<MealType>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suggestion {
    pub name: String,
    #[serde(default, deserialize_with = "zero_if_null")]
    pub calories: f64,
    #[serde(default, deserialize_with = "zero_if_null")]
    pub protein: f64,
    #[serde(default, deserialize_with = "zero_if_null")]
    pub carbs: f64,
    #[serde(default, deserialize_with = "zero_if_null")]
    pub fats: f64,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SuggestionsResponse {
    pub suggestions: Vec<Suggestion>,
}

#[derive(Debug, Deserialize)]
pub struct MealPlanRequest {
    #[serde(default = "one")]
    pub days: u32,
    #[serde(default, rename = "calorieTarget")]
    pub calorie_target: Option<f64>,
    #[serde(default, rename = "dietaryPreference")]
    pub dietary_preference: DietaryPreference,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannedMeal {
    /// Slot label as the model wrote it ("Breakfast", "Mid-morning Snack").
    #[serde(default, rename = "mealType")]
    pub meal_type: String,
    pub name: String,
    #[serde(default, deserialize_with = "zero_if_null")]
    pub calories: f64,
    #[serde(default, deserialize_with = "zero_if_null")]
    pub protein: f64,
    #[serde(default, deserialize_with = "zero_if_null")]
    pub carbs: f64,
    #[serde(default, deserialize_with = "zero_if_null")]
    pub fats: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanDay {
    pub day: u32,
    pub meals: Vec<PlannedMeal>,
    #[serde(default, rename = "totalCalories")]
    pub total_calories: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MealPlanResponse {
    pub plan: Vec<PlanDay>,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Deserialize)]
pub struct RecipeRequest {
    pub ingredients: Vec<String>,
    #[serde(default = "two")]
    pub servings: u32,
    #[serde(default, rename = "dietaryPreference")]
    pub dietary_preference: DietaryPreference,
}

/// Recipe content is passed through as the model wrote it.
#[derive(Debug, Serialize, Deserialize)]
pub struct RecipeResponse {
    pub recipe: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthScore {
    pub score: f64,
    pub grade: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub improvements: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct DietCoachRequest {
    pub goal: String,
    #[serde(default, rename = "dietaryPreference")]
    pub dietary_preference: DietaryPreference,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DietCoachResponse {
    pub advice: String,
    #[serde(default, rename = "actionItems")]
    pub action_items: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GroceryListRequest {
    #[serde(default)]
    pub days: Option<u32>,
    #[serde(default, rename = "dietaryPreference")]
    pub dietary_preference: DietaryPreference,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroceryCategory {
    pub category: String,
    #[serde(default)]
    pub items: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GroceryListResponse {
    pub categories: Vec<GroceryCategory>,
}

#[derive(Debug, Deserialize)]
pub struct InsightsReply {
    pub insights: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct InsightsResponse {
    pub insights: Vec<String>,
    pub aggregates: PeriodSummary,
}

/// Provider catalogue next to the configured fallback order.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelsResponse {
    pub all_models: Vec<ModelInfo>,
    pub vision_models: Vec<String>,
    pub configured: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct PingResponse {
    pub status: &'static str,
    pub model: String,
    pub message: String,
}

fn one() -> u32 {
    1
}

fn two() -> u32 {
    2
}
