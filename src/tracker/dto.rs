use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::Date;

use super::repo_types::{DailyGoals, Goals};
use crate::{
    days::day_format,
    meals::aggregate::DayTotals,
    nutrition::types::round1,
};

#[derive(Debug, Deserialize)]
pub struct SetGoalsRequest {
    pub date: String,
    #[serde(default)]
    pub goals: Option<Goals>,
}

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SavedGoalsResponse {
    pub success: bool,
    pub tracker: DailyGoals,
}

/// One day, or every stored day keyed by `YYYY-MM-DD`.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum TrackerView {
    Day(Option<DailyGoals>),
    All(BTreeMap<String, DailyGoals>),
}

#[derive(Debug, Serialize)]
pub struct TrackerResponse {
    pub tracker: TrackerView,
}

/// What is still left of a day's budget. Negative values mean over budget.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Remaining {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
}

impl Remaining {
    pub fn new(goals: &Goals, today: &DayTotals) -> Self {
        Self {
            calories: round1(goals.calories - today.total_calories),
            protein: round1(goals.protein - today.total_protein),
            carbs: round1(goals.carbs - today.total_carbs),
            fats: round1(goals.fats - today.total_fats),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressResponse {
    #[serde(with = "day_format")]
    pub date: Date,
    pub goals: Goals,
    /// False when the day has no stored goals and defaults are shown.
    pub goals_set: bool,
    pub consumed: DayTotals,
    pub remaining: Remaining,
    /// Share of each goal consumed so far, in percent.
    pub percent: Remaining,
}

impl ProgressResponse {
    pub fn new(date: Date, goals: Goals, goals_set: bool, consumed: DayTotals) -> Self {
        let pct = |eaten: f64, goal: f64| if goal > 0.0 { round1(eaten / goal * 100.0) } else { 0.0 };
        Self {
            remaining: Remaining::new(&goals, &consumed),
            percent: Remaining {
                calories: pct(consumed.total_calories, goals.calories),
                protein: pct(consumed.total_protein, goals.protein),
                carbs: pct(consumed.total_carbs, goals.carbs),
                fats: pct(consumed.total_fats, goals.fats),
            },
            date,
            goals,
            goals_set,
            consumed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn progress_against_default_goals() {
        let day = date!(2025 - 04 - 10);
        let consumed = DayTotals {
            total_calories: 500.0,
            total_protein: 30.0,
            total_carbs: 50.0,
            total_fats: 20.0,
            meal_count: 2,
            ..DayTotals::empty(day)
        };
        let p = ProgressResponse::new(day, Goals::default(), false, consumed);
        assert_eq!(p.remaining.calories, 1500.0);
        assert_eq!(p.remaining.protein, 120.0);
        assert_eq!(p.percent.calories, 25.0);
        assert_eq!(p.percent.protein, 20.0);
    }

    #[test]
    fn zero_goal_does_not_divide() {
        let day = date!(2025 - 04 - 10);
        let goals = Goals {
            fats: 0.0,
            ..Goals::default()
        };
        let p = ProgressResponse::new(day, goals, true, DayTotals::empty(day));
        assert_eq!(p.percent.fats, 0.0);
    }

    #[test]
    fn remaining_can_go_negative() {
        let mut today = DayTotals::empty(date!(2025 - 01 - 01));
        today.total_calories = 2500.0;
        today.total_protein = 40.0;
        let r = Remaining::new(&Goals::default(), &today);
        assert_eq!(r.calories, -500.0);
        assert_eq!(r.protein, 110.0);
    }
}
