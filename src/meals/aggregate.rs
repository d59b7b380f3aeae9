use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use time::{Date, Duration, UtcOffset};

use super::repo_types::Meal;
use crate::{
    days::{day_format, local_day},
    nutrition::{types::round1, MealType},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayTotals {
    #[serde(with = "day_format")]
    pub date: Date,
    pub total_calories: f64,
    pub total_protein: f64,
    pub total_carbs: f64,
    pub total_fats: f64,
    pub meal_count: usize,
}

impl DayTotals {
    pub fn empty(date: Date) -> Self {
        Self {
            date,
            total_calories: 0.0,
            total_protein: 0.0,
            total_carbs: 0.0,
            total_fats: 0.0,
            meal_count: 0,
        }
    }

    fn add(&mut self, m: &Meal) {
        self.total_calories += m.total_calories;
        self.total_protein += m.macros.protein;
        self.total_carbs += m.macros.carbs;
        self.total_fats += m.macros.fats;
        self.meal_count += 1;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FoodCount {
    pub name: String,
    pub count: usize,
}

/// Per-day totals, oldest day first. Days without meals are omitted.
pub fn daily_totals(meals: &[Meal], offset: UtcOffset) -> Vec<DayTotals> {
    let mut days: BTreeMap<Date, DayTotals> = BTreeMap::new();
    for m in meals {
        let day = local_day(m.timestamp, offset);
        days.entry(day).or_insert_with(|| DayTotals::empty(day)).add(m);
    }
    days.into_values().collect()
}

/// Totals for a single day, zero when nothing was logged.
pub fn totals_for_day(meals: &[Meal], day: Date, offset: UtcOffset) -> DayTotals {
    meals
        .iter()
        .filter(|m| local_day(m.timestamp, offset) == day)
        .fold(DayTotals::empty(day), |mut acc, m| {
            acc.add(m);
            acc
        })
}

pub fn meal_type_counts(meals: &[Meal]) -> BTreeMap<MealType, usize> {
    let mut counts: BTreeMap<MealType, usize> = MealType::ALL.iter().map(|t| (*t, 0)).collect();
    for m in meals {
        *counts.entry(m.meal_type).or_default() += 1;
    }
    counts
}

/// Most frequently logged item names, case-insensitive. Ties sort by name.
pub fn food_frequency(meals: &[Meal], top: usize) -> Vec<FoodCount> {
    let mut seen: HashMap<String, FoodCount> = HashMap::new();
    for item in meals.iter().flat_map(|m| &m.items) {
        let name = item.name.trim();
        if name.is_empty() {
            continue;
        }
        seen.entry(name.to_lowercase())
            .or_insert_with(|| FoodCount {
                name: name.to_string(),
                count: 0,
            })
            .count += 1;
    }
    let mut out: Vec<FoodCount> = seen.into_values().collect();
    out.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    out.truncate(top);
    out
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodSummary {
    #[serde(with = "day_format")]
    pub start: Date,
    #[serde(with = "day_format")]
    pub end: Date,
    /// One entry per day in the window, including empty days.
    pub days: Vec<DayTotals>,
    pub total_meals: usize,
    pub logged_days: usize,
    pub average_calories: f64,
    pub average_protein: f64,
    pub average_carbs: f64,
    pub average_fats: f64,
    pub meal_types: BTreeMap<MealType, usize>,
    pub top_foods: Vec<FoodCount>,
}

/// Seven-day summary ending on `today` (inclusive).
pub fn weekly_summary(meals: &[Meal], today: Date, offset: UtcOffset) -> PeriodSummary {
    period_summary(meals, today, 7, offset)
}

/// Summary of the `days` calendar days ending on `today` (inclusive).
/// Averages are over days with at least one meal.
pub fn period_summary(meals: &[Meal], today: Date, days: u32, offset: UtcOffset) -> PeriodSummary {
    let start = today - Duration::days(i64::from(days.max(1)) - 1);
    let in_window: Vec<Meal> = meals
        .iter()
        .filter(|m| {
            let d = local_day(m.timestamp, offset);
            d >= start && d <= today
        })
        .cloned()
        .collect();

    let logged = daily_totals(&in_window, offset);
    let logged_days = logged.len();
    let avg = |f: fn(&DayTotals) -> f64| {
        if logged_days == 0 {
            0.0
        } else {
            round1(logged.iter().map(f).sum::<f64>() / logged_days as f64)
        }
    };

    let mut window = Vec::new();
    let mut day = start;
    while day <= today {
        window.push(
            logged
                .iter()
                .find(|d| d.date == day)
                .cloned()
                .unwrap_or_else(|| DayTotals::empty(day)),
        );
        day = day + Duration::days(1);
    }

    PeriodSummary {
        start,
        end: today,
        days: window,
        total_meals: in_window.len(),
        logged_days,
        average_calories: avg(|d| d.total_calories),
        average_protein: avg(|d| d.total_protein),
        average_carbs: avg(|d| d.total_carbs),
        average_fats: avg(|d| d.total_fats),
        meal_types: meal_type_counts(&in_window),
        top_foods: food_frequency(&in_window, 5),
    }
}
