use anyhow::anyhow;
use serde::Serialize;
use sqlx::{types::Json, FromRow};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::nutrition::{DietaryPreference, Macros, MealItem, MealType};

/// A saved meal template. Independent of any logged meal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Favorite {
    pub id: Uuid,
    pub name: String,
    pub items: Vec<MealItem>,
    pub total_calories: f64,
    pub macros_summary: Macros,
    #[serde(rename = "mealType")]
    pub meal_type: MealType,
    #[serde(rename = "dietaryPreference")]
    pub dietary_preference: DietaryPreference,
    #[serde(rename = "createdAt", with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewFavorite {
    pub name: String,
    pub items: Vec<MealItem>,
    pub total_calories: f64,
    pub macros: Macros,
    pub meal_type: MealType,
    pub dietary_preference: DietaryPreference,
}

#[derive(Debug, FromRow)]
pub struct FavoriteRow {
    pub id: Uuid,
    pub name: String,
    pub items: Json<Vec<MealItem>>,
    pub total_calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
    pub meal_type: String,
    pub dietary_preference: String,
    pub created_at: OffsetDateTime,
}

impl TryFrom<FavoriteRow> for Favorite {
    type Error = anyhow::Error;

    fn try_from(r: FavoriteRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            name: r.name,
            items: r.items.0,
            total_calories: r.total_calories,
            macros_summary: Macros {
                protein: r.protein,
                carbs: r.carbs,
                fats: r.fats,
            },
            meal_type: r.meal_type.parse().map_err(|e: String| anyhow!(e))?,
            dietary_preference: r.dietary_preference.parse().map_err(|e: String| anyhow!(e))?,
            created_at: r.created_at,
        })
    }
}
