use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize};
use time::{OffsetDateTime, UtcOffset};

/// One line of a meal as estimated by the model or entered by hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealItem {
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

/// Macro triple in grams.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Macros {
    #[serde(default, deserialize_with = "zero_if_null")]
    pub protein: f64,
    #[serde(default, deserialize_with = "zero_if_null")]
    pub carbs: f64,
    #[serde(default, deserialize_with = "zero_if_null")]
    pub fats: f64,
}

/// Model replies use `null` for unknown amounts; count them as 0.
pub fn zero_if_null<'de, D>(de: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(de)?.unwrap_or_default())
}

impl Macros {
    pub fn rounded(self) -> Self {
        Self {
            protein: round1(self.protein),
            carbs: round1(self.carbs),
            fats: round1(self.fats),
        }
    }
}

/// Round to one decimal place.
pub fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// Calorie and macro sums over a list of items.
pub fn item_sums(items: &[MealItem]) -> (f64, Macros) {
    items.iter().fold((0.0, Macros::default()), |(kcal, m), it| {
        (
            kcal + it.calories,
            Macros {
                protein: m.protein + it.protein,
                carbs: m.carbs + it.carbs,
                fats: m.fats + it.fats,
            },
        )
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    pub const ALL: [MealType; 4] = [Self::Breakfast, Self::Lunch, Self::Dinner, Self::Snack];

    pub fn from_hour(hour: u8) -> Self {
        match hour {
            5..=10 => Self::Breakfast,
            11..=15 => Self::Lunch,
            16..=20 => Self::Dinner,
            _ => Self::Snack,
        }
    }

    /// Meal type for "now" on the wall clock of `offset`.
    pub fn current(offset: UtcOffset) -> Self {
        Self::from_hour(OffsetDateTime::now_utc().to_offset(offset).hour())
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Breakfast => "Breakfast",
            Self::Lunch => "Lunch",
            Self::Dinner => "Dinner",
            Self::Snack => "Snack",
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MealType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown meal type: {s}"))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DietaryPreference {
    #[default]
    Standard,
    Jain,
    Vegan,
    Keto,
    #[serde(rename = "High Protein")]
    HighProtein,
}

impl DietaryPreference {
    pub const ALL: [DietaryPreference; 5] = [
        Self::Standard,
        Self::Jain,
        Self::Vegan,
        Self::Keto,
        Self::HighProtein,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "Standard",
            Self::Jain => "Jain",
            Self::Vegan => "Vegan",
            Self::Keto => "Keto",
            Self::HighProtein => "High Protein",
        }
    }
}

impl fmt::Display for DietaryPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DietaryPreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(Self::Standard);
        }
        Self::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown dietary preference: {s}"))
    }
}
