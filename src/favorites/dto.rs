use serde::{Deserialize, Serialize};

use super::repo_types::{Favorite, NewFavorite};
use crate::nutrition::{item_sums, DietaryPreference, Macros, MealItem, MealType};

#[derive(Debug, Deserialize)]
pub struct CreateFavoriteRequest {
    pub name: String,
    #[serde(default)]
    pub items: Vec<MealItem>,
    #[serde(default, alias = "totalCalories")]
    pub total_calories: Option<f64>,
    #[serde(default, alias = "macros")]
    pub macros_summary: Option<Macros>,
    #[serde(default, rename = "mealType")]
    pub meal_type: Option<MealType>,
    #[serde(default, rename = "dietaryPreference")]
    pub dietary_preference: Option<DietaryPreference>,
}

impl CreateFavoriteRequest {
    /// Missing totals fall back to the sum over the items.
    pub fn into_new(self) -> NewFavorite {
        let (kcal, macros) = item_sums(&self.items);
        NewFavorite {
            name: self.name.trim().to_string(),
            total_calories: self.total_calories.unwrap_or(kcal.round()),
            macros: self.macros_summary.unwrap_or(macros.rounded()),
            items: self.items,
            meal_type: self.meal_type.unwrap_or(MealType::Lunch),
            dietary_preference: self.dietary_preference.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LogFavoriteRequest {
    #[serde(default, rename = "mealType")]
    pub meal_type: Option<MealType>,
}

#[derive(Debug, Serialize)]
pub struct FavoriteListResponse {
    pub favorites: Vec<Favorite>,
}

#[derive(Debug, Serialize)]
pub struct CreatedFavoriteResponse {
    pub success: bool,
    pub favorite: Favorite,
}
