pub mod reconcile;
pub mod types;

pub use reconcile::{reconcile, AnalysisPayload, Tolerances};
pub use types::{item_sums, DietaryPreference, Macros, MealItem, MealType};
