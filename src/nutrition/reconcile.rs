use serde::{Deserialize, Serialize};
use tracing::warn;

use super::types::{item_sums, Macros, MealItem};

/// Meal analysis as returned by the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisPayload {
    pub items: Vec<MealItem>,
    #[serde(default)]
    pub total_calories: Option<f64>,
    #[serde(default)]
    pub macros_summary: Option<Macros>,
    #[serde(default)]
    pub advice: Option<String>,
}

/// Absolute divergence allowed between claimed and summed totals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    pub calories: f64,
    pub macro_grams: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            calories: 50.0,
            macro_grams: 5.0,
        }
    }
}

/// What the reconciler changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Corrections {
    pub calories: bool,
    pub macros: bool,
}

/// Bring the payload totals in line with its items.
///
/// Claimed totals survive only while they stay within `tol` of the item sums.
/// Missing totals are filled from the sums. After this call both
/// `total_calories` and `macros_summary` are `Some`.
pub fn reconcile(payload: &mut AnalysisPayload, tol: &Tolerances) -> Corrections {
    let (sum_kcal, sum_macros) = item_sums(&payload.items);
    let mut fixed = Corrections::default();

    match payload.total_calories {
        Some(claimed) if (sum_kcal - claimed).abs() <= tol.calories => {}
        Some(claimed) => {
            warn!(
                calculated = sum_kcal,
                reported = claimed,
                "calorie mismatch, using calculated value"
            );
            payload.total_calories = Some(sum_kcal.round());
            fixed.calories = true;
        }
        None => payload.total_calories = Some(sum_kcal.round()),
    }

    match payload.macros_summary {
        Some(claimed) => {
            let off = (sum_macros.protein - claimed.protein).abs() > tol.macro_grams
                || (sum_macros.carbs - claimed.carbs).abs() > tol.macro_grams
                || (sum_macros.fats - claimed.fats).abs() > tol.macro_grams;
            if off {
                warn!(?claimed, calculated = ?sum_macros, "macro mismatch, using calculated values");
                payload.macros_summary = Some(sum_macros.rounded());
                fixed.macros = true;
            }
        }
        None => payload.macros_summary = Some(sum_macros.rounded()),
    }

    fixed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, calories: f64, protein: f64, carbs: f64, fats: f64) -> MealItem {
        MealItem {
            name: name.into(),
            calories,
            protein,
            carbs,
            fats,
        }
    }

    fn thali() -> Vec<MealItem> {
        vec![
            item("2 Rotis", 150.0, 5.0, 30.0, 1.0),
            item("Dal Tadka", 140.0, 7.0, 18.0, 4.5),
            item("Aloo Gobi", 130.0, 3.0, 15.0, 7.0),
            item("Rice", 80.0, 1.5, 17.5, 0.2),
        ]
    }

    #[test]
    fn overwrites_calories_beyond_tolerance() {
        let mut p = AnalysisPayload {
            items: thali(),
            total_calories: Some(800.0),
            macros_summary: Some(Macros { protein: 16.5, carbs: 80.5, fats: 12.7 }),
            advice: None,
        };
        let fixed = reconcile(&mut p, &Tolerances::default());
        assert!(fixed.calories);
        assert!(!fixed.macros);
        assert_eq!(p.total_calories, Some(500.0));
    }

    #[test]
    fn keeps_claimed_calories_within_tolerance() {
        let mut p = AnalysisPayload {
            items: thali(),
            total_calories: Some(540.0),
            macros_summary: Some(Macros { protein: 16.5, carbs: 80.5, fats: 12.7 }),
            advice: None,
        };
        let fixed = reconcile(&mut p, &Tolerances::default());
        assert_eq!(fixed, Corrections::default());
        assert_eq!(p.total_calories, Some(540.0));
    }

    #[test]
    fn one_macro_off_replaces_the_whole_triple() {
        let mut p = AnalysisPayload {
            items: thali(),
            total_calories: Some(500.0),
            macros_summary: Some(Macros { protein: 16.0, carbs: 95.0, fats: 13.0 }),
            advice: None,
        };
        let fixed = reconcile(&mut p, &Tolerances::default());
        assert!(fixed.macros);
        assert_eq!(
            p.macros_summary,
            Some(Macros { protein: 16.5, carbs: 80.5, fats: 12.7 })
        );
    }

    #[test]
    fn absent_totals_equal_recomputed_sums() {
        let mut p = AnalysisPayload {
            items: vec![item("Poha", 20.0, 0.5, 4.0, 0.25)],
            total_calories: None,
            macros_summary: None,
            advice: None,
        };
        reconcile(&mut p, &Tolerances::default());
        assert_eq!(p.total_calories, Some(20.0));
        assert_eq!(p.macros_summary, Some(Macros { protein: 0.5, carbs: 4.0, fats: 0.3 }));
    }

    #[test]
    fn custom_tolerances_apply() {
        let mut p = AnalysisPayload {
            items: thali(),
            total_calories: Some(520.0),
            macros_summary: Some(Macros { protein: 18.5, carbs: 80.5, fats: 12.7 }),
            advice: None,
        };
        let tol = Tolerances { calories: 10.0, macro_grams: 1.0 };
        let fixed = reconcile(&mut p, &tol);
        assert!(fixed.calories && fixed.macros);
        assert_eq!(p.total_calories, Some(500.0));
        assert_eq!(p.macros_summary.map(|m| m.protein), Some(16.5));
    }

    #[test]
    fn empty_items_zero_totals() {
        let mut p: AnalysisPayload =
            serde_json::from_str(r#"{"items":[],"total_calories":30}"#).unwrap();
        reconcile(&mut p, &Tolerances::default());
        assert_eq!(p.total_calories, Some(30.0));
        assert_eq!(p.macros_summary, Some(Macros::default()));
    }

    #[test]
    fn payload_without_items_is_rejected() {
        let res = serde_json::from_str::<AnalysisPayload>(r#"{"total_calories":300}"#);
        assert!(res.is_err());
    }
    #[test]
    fn null_item_amounts_reconcile_as_zero() {
        let mut p: AnalysisPayload = serde_json::from_str(
            r#"{"items":[{"name":"Dal","calories":200,"protein":null,"carbs":null,"fats":null},{"name":"Rice","calories":null,"protein":4,"carbs":45,"fats":1}],"total_calories":null}"#,
        )
        .unwrap();
        reconcile(&mut p, &Tolerances::default());
        assert_eq!(p.total_calories, Some(200.0));
        assert_eq!(p.macros_summary, Some(Macros { protein: 4.0, carbs: 45.0, fats: 1.0 }));
    }
}
