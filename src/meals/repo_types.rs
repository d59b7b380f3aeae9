use anyhow::anyhow;
use sqlx::{types::Json, FromRow};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::nutrition::{DietaryPreference, Macros, MealItem, MealType};

/// A stored meal.
#[derive(Debug, Clone, PartialEq)]
pub struct Meal {
    pub id: Uuid,
    /// Object key of the uploaded photo, or whatever reference a manual
    /// entry supplied.
    pub image_url: String,
    pub items: Vec<MealItem>,
    pub total_calories: f64,
    pub macros: Macros,
    pub timestamp: OffsetDateTime,
    pub meal_type: MealType,
    pub dietary_preference: DietaryPreference,
    pub advice: String,
    pub created_at: OffsetDateTime,
}

/// Meal about to be inserted. The store assigns the creation time.
#[derive(Debug, Clone)]
pub struct NewMeal {
    pub id: Uuid,
    pub image_url: String,
    pub items: Vec<MealItem>,
    pub total_calories: f64,
    pub macros: Macros,
    pub timestamp: OffsetDateTime,
    pub meal_type: MealType,
    pub dietary_preference: DietaryPreference,
    pub advice: String,
}

#[derive(Debug, FromRow)]
pub struct MealRow {
    pub id: Uuid,
    pub image_url: String,
    pub items: Json<Vec<MealItem>>,
    pub total_calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
    pub eaten_at: OffsetDateTime,
    pub meal_type: String,
    pub dietary_preference: String,
    pub advice: String,
    pub created_at: OffsetDateTime,
}

impl TryFrom<MealRow> for Meal {
    type Error = anyhow::Error;

    fn try_from(r: MealRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            image_url: r.image_url,
            items: r.items.0,
            total_calories: r.total_calories,
            macros: Macros {
                protein: r.protein,
                carbs: r.carbs,
                fats: r.fats,
            },
            timestamp: r.eaten_at,
            meal_type: r.meal_type.parse().map_err(|e: String| anyhow!(e))?,
            dietary_preference: r.dietary_preference.parse().map_err(|e: String| anyhow!(e))?,
            advice: r.advice,
            created_at: r.created_at,
        })
    }
}

impl NewMeal {
    pub fn into_meal(self, created_at: OffsetDateTime) -> Meal {
        Meal {
            id: self.id,
            image_url: self.image_url,
            items: self.items,
            total_calories: self.total_calories,
            macros: self.macros,
            timestamp: self.timestamp,
            meal_type: self.meal_type,
            dietary_preference: self.dietary_preference,
            advice: self.advice,
            created_at,
        }
    }
}
