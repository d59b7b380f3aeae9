//! Prompt templates and the JSON shapes each one asks the model for.

use serde::Serialize;

use crate::{
    meals::aggregate::{DayTotals, PeriodSummary},
    nutrition::{DietaryPreference, MealType},
    tracker::{dto::Remaining, repo_types::Goals},
};

use super::dto::ChatTurn;

pub const ANALYZE_SCHEMA: &str = r#"{
  "items": [
    { "name": "Specific food name (e.g. 'Aloo Gobi', 'Dal Makhani', '2 Rotis')", "calories": 0, "protein": 0, "carbs": 0, "fats": 0 }
  ],
  "total_calories": 0,
  "macros_summary": { "protein": 0, "carbs": 0, "fats": 0 },
  "advice": "2-3 practical nutrition tips based on this meal"
}"#;

pub const CHAT_SCHEMA: &str = r#"{ "reply": "your answer to the user" }"#;

pub const SUGGESTIONS_SCHEMA: &str = r#"{
  "suggestions": [
    { "name": "dish name", "calories": 0, "protein": 0, "carbs": 0, "fats": 0, "reason": "why it fits" }
  ]
}"#;

pub const MEAL_PLAN_SCHEMA: &str = r#"{
  "plan": [
    {
      "day": 1,
      "meals": [
        { "mealType": "Breakfast", "name": "dish name", "calories": 0, "protein": 0, "carbs": 0, "fats": 0 }
      ],
      "totalCalories": 0
    }
  ],
  "notes": "short guidance for following the plan"
}"#;

pub const RECIPE_SCHEMA: &str = r#"{
  "recipe": {
    "name": "dish name",
    "servings": 2,
    "prepMinutes": 0,
    "cookMinutes": 0,
    "ingredients": ["quantity + ingredient"],
    "steps": ["step"],
    "perServing": { "calories": 0, "protein": 0, "carbs": 0, "fats": 0 },
    "tips": "optional tips"
  }
}"#;

pub const HEALTH_SCORE_SCHEMA: &str = r#"{
  "score": 0,
  "grade": "A",
  "summary": "one paragraph assessment",
  "strengths": ["strength"],
  "improvements": ["improvement"]
}"#;

pub const DIET_COACH_SCHEMA: &str = r#"{
  "advice": "coaching message",
  "actionItems": ["concrete action"]
}"#;

pub const GROCERY_LIST_SCHEMA: &str = r#"{
  "categories": [
    { "category": "Vegetables", "items": ["item with quantity"] }
  ]
}"#;

pub const INSIGHTS_SCHEMA: &str = r#"{ "insights": ["short observation with a suggestion"] }"#;

const PERSONA: &str = "You are an expert Indian nutritionist specializing in traditional Indian meals (Thalis).";

/// Restrictions the model has to respect for a dietary preference.
pub fn dietary_context(pref: DietaryPreference) -> &'static str {
    match pref {
        DietaryPreference::Standard => "",
        DietaryPreference::Jain => {
            "CRITICAL: User follows a Jain diet. FORBIDDEN: onion, garlic, root vegetables \
             (potato, carrot, radish, beetroot, turnip) and all non-vegetarian items. \
             If any are detected, add an explicit warning in the advice."
        }
        DietaryPreference::Vegan => {
            "CRITICAL: User follows a Vegan diet. FORBIDDEN: all dairy (milk, ghee, paneer, \
             yogurt, butter, cheese), eggs and honey. If any are detected, warn in the advice."
        }
        DietaryPreference::Keto => {
            "CRITICAL: User follows a Keto diet. FLAG high-carb items (rice, roti, bread, potato) \
             and suggest keto alternatives. Target: under 15g net carbs per meal."
        }
        DietaryPreference::HighProtein => {
            "CRITICAL: User wants high protein meals. Target at least 25-30g protein per meal. \
             Highlight protein-rich items and suggest additions if protein is low."
        }
    }
}

pub fn analyze(pref: DietaryPreference) -> String {
    let extra = match pref {
        DietaryPreference::Standard => String::new(),
        other => format!("\nInclude {other} specific recommendations in the advice."),
    };
    format!(
        r#"{PERSONA} Analyze the meal image with high accuracy.

ANALYSIS REQUIREMENTS:
1. Identify EVERY food item visible and be specific ("Aloo Gobi" not "Sabzi", "Dal Makhani" not "Dal").
2. Estimate portions using Indian standard servings:
   - 1 Roti/Chapati (~30g): 70-80 kcal
   - 1 Katori Dal (150ml): 120-150 kcal
   - 1 Katori Sabzi (100g): 50-200 kcal depending on type
   - 1 Katori Rice (150g cooked): 200-220 kcal
   - 1 Papad (~15g): 60-70 kcal
   - Raita/Curd (~100g): 50-80 kcal
   - Salad (~50g): 15-25 kcal
   - Pickle (~10g): 10-20 kcal
   - Chutney (~20g): 20-40 kcal
3. Account for cooking: 1-2 tsp oil/ghee per sabzi adds 40-80 kcal, fried items and gravies are denser.
4. Macros: protein and carbs 4 kcal/g, fats 9 kcal/g.

{}{extra}

total_calories MUST equal the sum of item calories and macros_summary MUST equal the sum of item macros."#,
        dietary_context(pref)
    )
}

fn diet_line(pref: DietaryPreference) -> String {
    match pref {
        DietaryPreference::Standard => "The user has no dietary restrictions.".to_string(),
        other => format!("The user follows a {other} diet. {}", dietary_context(other)),
    }
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_default()
}

pub fn chat(
    message: &str,
    history: &[ChatTurn],
    today: &DayTotals,
    goals: &Goals,
    pref: DietaryPreference,
) -> String {
    let transcript: String = history
        .iter()
        .map(|t| format!("{}: {}\n", t.role.label(), t.content.trim()))
        .collect();
    format!(
        "{PERSONA} You are chatting with a user of a meal tracking app. Be friendly, practical and concise \
         (under 150 words). Do not give medical diagnoses.\n\n{}\n\n\
         Today so far: {:.0} kcal, {:.1}g protein, {:.1}g carbs, {:.1}g fats over {} meals.\n\
         Daily goals: {:.0} kcal, {:.0}g protein, {:.0}g carbs, {:.0}g fats.\n\n\
         Conversation so far:\n{}User: {}",
        diet_line(pref),
        today.total_calories,
        today.total_protein,
        today.total_carbs,
        today.total_fats,
        today.meal_count,
        goals.calories,
        goals.protein,
        goals.carbs,
        goals.fats,
        transcript,
        message.trim()
    )
}

pub fn suggestions(remaining: &Remaining, meal_type: MealType, pref: DietaryPreference) -> String {
    format!(
        "{PERSONA} Suggest 3 to 5 Indian dishes for the user's next {meal_type}.\n{}\n\n\
         Remaining budget for today: {:.0} kcal, {:.0}g protein, {:.0}g carbs, {:.0}g fats. \
         Prefer dishes that close the protein gap without exceeding the calorie budget; \
         if the budget is already exceeded suggest light options.",
        diet_line(pref),
        remaining.calories,
        remaining.protein,
        remaining.carbs,
        remaining.fats
    )
}

pub fn meal_plan(days: u32, calorie_target: f64, pref: DietaryPreference) -> String {
    format!(
        "{PERSONA} Create a {days}-day Indian meal plan with Breakfast, Lunch, Dinner and one Snack per day.\n{}\n\n\
         Each day should total about {calorie_target:.0} kcal with balanced macros. Use everyday home-cooked \
         dishes and vary them across days.",
        diet_line(pref)
    )
}

pub fn recipe(ingredients: &[String], servings: u32, pref: DietaryPreference) -> String {
    format!(
        "{PERSONA} Create one healthy Indian recipe for {servings} servings that uses mainly these ingredients: {}.\n{}\n\n\
         Give exact quantities, clear numbered steps and per-serving nutrition.",
        ingredients.join(", "),
        diet_line(pref)
    )
}

pub fn health_score(summary: &PeriodSummary, goals: &Goals) -> String {
    format!(
        "{PERSONA} Score the user's eating over the last {} days from 0 to 100 and give a letter grade (A-F).\n\
         Consider calorie adherence, macro balance, meal regularity and variety.\n\n\
         Daily goals: {}\n\nAggregated meal log:\n{}",
        summary.days.len(),
        to_json(goals),
        to_json(summary)
    )
}

pub fn diet_coach(goal: &str, summary: &PeriodSummary, pref: DietaryPreference) -> String {
    format!(
        "{PERSONA} Act as a supportive diet coach. The user's goal: \"{}\".\n{}\n\n\
         Base your coaching on their recent meal log:\n{}\n\n\
         Give encouraging advice and 3 to 5 concrete action items for the coming week.",
        goal.trim(),
        diet_line(pref),
        to_json(summary)
    )
}

pub fn grocery_list(days: u32, summary: &PeriodSummary, pref: DietaryPreference) -> String {
    format!(
        "{PERSONA} Build a grocery list covering {days} days of healthy Indian home cooking for one person.\n{}\n\n\
         Favour staples the user already eats (from their recent log below) and add what is missing for a \
         balanced diet. Group items by store category with quantities.\n\nRecent log:\n{}",
        diet_line(pref),
        to_json(summary)
    )
}

pub fn insights(summary: &PeriodSummary, goals: &Goals) -> String {
    format!(
        "{PERSONA} Give 3 to 5 short, specific insights about the user's eating patterns and one suggestion \
         per insight.\n\nDaily goals: {}\n\nAggregated meal log:\n{}",
        to_json(goals),
        to_json(summary)
    )
}
