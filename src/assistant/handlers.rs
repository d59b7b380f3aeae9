use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use super::{
    dto::{
        ChatRequest, ChatResponse, DietCoachRequest, DietCoachResponse, GroceryListRequest,
        GroceryListResponse, HealthScore, InsightsReply, InsightsResponse, MealPlanRequest,
        MealPlanResponse, ModelsResponse, PingResponse, RecipeRequest, RecipeResponse, SuggestionsRequest,
        SuggestionsResponse,
    },
    prompts,
};
use crate::{
    days::today,
    error::AppError,
    extractors::JsonOrDefault,
    llm::{generate_structured, Prompt, StructuredRequest},
    meals::{aggregate::DayTotals, dto::DaysQuery, services},
    nutrition::MealType,
    state::AppState,
    tracker::{dto::Remaining, repo_types::Goals},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/ai/chat", post(chat))
        .route("/ai/suggestions", post(suggestions))
        .route("/ai/meal-plan", post(meal_plan))
        .route("/ai/recipe", post(recipe))
        .route("/ai/health-score", get(health_score))
        .route("/ai/diet-coach", post(diet_coach))
        .route("/ai/grocery-list", post(grocery_list))
        .route("/ai/insights", get(insights))
        .route("/ai/ping", get(ping))
        .route("/ai/models", get(models))
}

/// Today's consumed totals and goals (defaults when none are stored).
async fn today_context(state: &AppState) -> Result<(DayTotals, Goals), AppError> {
    let day = today(state.offset());
    let consumed = services::day_totals(state, day).await?;
    let goals = state
        .goals
        .get(day)
        .await?
        .map(|g| g.goals)
        .unwrap_or_default();
    Ok((consumed, goals))
}

fn window(days: i64) -> u32 {
    days.clamp(1, 90) as u32
}

#[instrument(skip(state, body))]
pub async fn chat(
    State(state): State<AppState>,
    Json(body): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    if body.message.trim().is_empty() {
        return Err(AppError::BadRequest("Message is required".into()));
    }
    let (consumed, goals) = today_context(&state).await?;
    let prompt = prompts::chat(
        &body.message,
        &body.history,
        &consumed,
        &goals,
        body.dietary_preference,
    );
    let req = StructuredRequest::new(prompt, prompts::CHAT_SCHEMA).params(state.params(0.7));
    Ok(Json(generate_structured(&state.invoker, req).await?))
}

/// Next-meal ideas sized to what is left of today's budget.
#[instrument(skip(state, body))]
pub async fn suggestions(
    State(state): State<AppState>,
    JsonOrDefault(body): JsonOrDefault<SuggestionsRequest>,
) -> Result<Json<SuggestionsResponse>, AppError> {
    let (consumed, goals) = today_context(&state).await?;
    let remaining = Remaining::new(&goals, &consumed);
    let meal_type = body
        .meal_type
        .unwrap_or_else(|| MealType::current(state.offset()));

    let req = StructuredRequest::new(
        prompts::suggestions(&remaining, meal_type, body.dietary_preference),
        prompts::SUGGESTIONS_SCHEMA,
    )
    .params(state.params(0.8));
    Ok(Json(generate_structured(&state.invoker, req).await?))
}

#[instrument(skip(state, body))]
pub async fn meal_plan(
    State(state): State<AppState>,
    Json(body): Json<MealPlanRequest>,
) -> Result<Json<MealPlanResponse>, AppError> {
    let days = body.days.clamp(1, 7);
    let target = match body.calorie_target.filter(|t| *t > 0.0) {
        Some(t) => t,
        None => today_context(&state).await?.1.calories,
    };
    let req = StructuredRequest::new(
        prompts::meal_plan(days, target, body.dietary_preference),
        prompts::MEAL_PLAN_SCHEMA,
    )
    .params(state.params(0.7));
    let plan: MealPlanResponse = generate_structured(&state.invoker, req).await?;
    info!(days, planned = plan.plan.len(), "meal plan generated");
    Ok(Json(plan))
}

#[instrument(skip(state, body))]
pub async fn recipe(
    State(state): State<AppState>,
    Json(body): Json<RecipeRequest>,
) -> Result<Json<RecipeResponse>, AppError> {
    let ingredients: Vec<String> = body
        .ingredients
        .iter()
        .map(|i| i.trim().to_string())
        .filter(|i| !i.is_empty())
        .collect();
    if ingredients.is_empty() {
        return Err(AppError::BadRequest("At least one ingredient is required".into()));
    }
    let req = StructuredRequest::new(
        prompts::recipe(&ingredients, body.servings.clamp(1, 12), body.dietary_preference),
        prompts::RECIPE_SCHEMA,
    )
    .params(state.params(0.7));
    let recipe: serde_json::Value = generate_structured(&state.invoker, req).await?;
    Ok(Json(RecipeResponse { recipe }))
}

#[instrument(skip(state))]
pub async fn health_score(
    State(state): State<AppState>,
    Query(q): Query<DaysQuery>,
) -> Result<Json<HealthScore>, AppError> {
    let summary = services::summarize(&state, window(q.days)).await?;
    let (_, goals) = today_context(&state).await?;
    let req = StructuredRequest::new(
        prompts::health_score(&summary, &goals),
        prompts::HEALTH_SCORE_SCHEMA,
    )
    .params(state.params(0.4));
    let mut score: HealthScore = generate_structured(&state.invoker, req).await?;
    score.score = score.score.clamp(0.0, 100.0);
    Ok(Json(score))
}

#[instrument(skip(state, body))]
pub async fn diet_coach(
    State(state): State<AppState>,
    Json(body): Json<DietCoachRequest>,
) -> Result<Json<DietCoachResponse>, AppError> {
    if body.goal.trim().is_empty() {
        return Err(AppError::BadRequest("Goal is required".into()));
    }
    let summary = services::summarize(&state, 7).await?;
    let req = StructuredRequest::new(
        prompts::diet_coach(&body.goal, &summary, body.dietary_preference),
        prompts::DIET_COACH_SCHEMA,
    )
    .params(state.params(0.7));
    Ok(Json(generate_structured(&state.invoker, req).await?))
}

#[instrument(skip(state, body))]
pub async fn grocery_list(
    State(state): State<AppState>,
    JsonOrDefault(body): JsonOrDefault<GroceryListRequest>,
) -> Result<Json<GroceryListResponse>, AppError> {
    let days = body.days.unwrap_or(7).clamp(1, 14);
    let summary = services::summarize(&state, 7).await?;
    let req = StructuredRequest::new(
        prompts::grocery_list(days, &summary, body.dietary_preference),
        prompts::GROCERY_LIST_SCHEMA,
    )
    .params(state.params(0.5));
    Ok(Json(generate_structured(&state.invoker, req).await?))
}

#[instrument(skip(state))]
pub async fn insights(
    State(state): State<AppState>,
    Query(q): Query<DaysQuery>,
) -> Result<Json<InsightsResponse>, AppError> {
    let summary = services::summarize(&state, window(q.days)).await?;
    let (_, goals) = today_context(&state).await?;
    let req = StructuredRequest::new(prompts::insights(&summary, &goals), prompts::INSIGHTS_SCHEMA)
        .params(state.params(0.5));
    let reply: InsightsReply = generate_structured(&state.invoker, req).await?;
    Ok(Json(InsightsResponse {
        insights: reply.insights,
        aggregates: summary,
    }))
}

/// One plain-text round trip through the model fallback chain.
#[instrument(skip(state))]
pub async fn ping(State(state): State<AppState>) -> Result<Json<PingResponse>, AppError> {
    let prompt = Prompt::text("Reply with exactly one word: pong");
    let out = state.invoker.invoke(&prompt, &state.params(0.0)).await?;
    Ok(Json(PingResponse {
        status: "ok",
        model: out.model,
        message: out.text.trim().to_string(),
    }))
}

#[instrument(skip(state))]
pub async fn models(State(state): State<AppState>) -> Result<Json<ModelsResponse>, AppError> {
    let all = state.invoker.catalogue().await?;
    let vision_models = all
        .iter()
        .filter(|m| m.accepts_images())
        .map(|m| m.name.clone())
        .collect();
    Ok(Json(ModelsResponse {
        all_models: all,
        vision_models,
        configured: state.invoker.models().to_vec(),
    }))
}
