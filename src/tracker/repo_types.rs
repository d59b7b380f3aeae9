use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Date, OffsetDateTime};

use crate::days::day_format;

/// Daily targets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Goals {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
}

impl Default for Goals {
    fn default() -> Self {
        Self {
            calories: 2000.0,
            protein: 150.0,
            carbs: 250.0,
            fats: 65.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyGoals {
    #[serde(with = "day_format")]
    pub date: Date,
    pub goals: Goals,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, FromRow)]
pub struct DailyGoalsRow {
    pub day: Date,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
    pub updated_at: OffsetDateTime,
}

impl From<DailyGoalsRow> for DailyGoals {
    fn from(r: DailyGoalsRow) -> Self {
        Self {
            date: r.day,
            goals: Goals {
                calories: r.calories,
                protein: r.protein,
                carbs: r.carbs,
                fats: r.fats,
            },
            updated_at: r.updated_at,
        }
    }
}
