use anyhow::Context;
use async_trait::async_trait;
use sqlx::{types::Json, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{Meal, MealRow, NewMeal};

/// Time window and cap for meal listings. Bounds are `[from, to)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MealFilter {
    pub from: Option<OffsetDateTime>,
    pub to: Option<OffsetDateTime>,
    pub limit: Option<i64>,
}

impl MealFilter {
    pub fn since(from: OffsetDateTime) -> Self {
        Self {
            from: Some(from),
            ..Default::default()
        }
    }

    pub fn between(from: OffsetDateTime, to: OffsetDateTime) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
            limit: None,
        }
    }

    pub fn matches(&self, at: OffsetDateTime) -> bool {
        self.from.map_or(true, |f| at >= f) && self.to.map_or(true, |t| at < t)
    }
}

#[async_trait]
pub trait MealStore: Send + Sync {
    async fn insert(&self, meal: NewMeal) -> anyhow::Result<Meal>;
    /// Newest first.
    async fn list(&self, filter: MealFilter) -> anyhow::Result<Vec<Meal>>;
    /// Returns the removed meal, `None` when it did not exist.
    async fn delete(&self, id: Uuid) -> anyhow::Result<Option<Meal>>;
}

#[derive(Clone)]
pub struct PgMealStore {
    db: PgPool,
}

impl PgMealStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

const MEAL_COLUMNS: &str = "id, image_url, items, total_calories, protein, carbs, fats, \
                            eaten_at, meal_type, dietary_preference, advice, created_at";

#[async_trait]
impl MealStore for PgMealStore {
    async fn insert(&self, m: NewMeal) -> anyhow::Result<Meal> {
        let created_at: OffsetDateTime = sqlx::query_scalar(
            r#"
            INSERT INTO meals (id, image_url, items, total_calories, protein, carbs, fats,
                               eaten_at, meal_type, dietary_preference, advice)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING created_at
            "#,
        )
        .bind(m.id)
        .bind(&m.image_url)
        .bind(Json(&m.items))
        .bind(m.total_calories)
        .bind(m.macros.protein)
        .bind(m.macros.carbs)
        .bind(m.macros.fats)
        .bind(m.timestamp)
        .bind(m.meal_type.as_str())
        .bind(m.dietary_preference.as_str())
        .bind(&m.advice)
        .fetch_one(&self.db)
        .await
        .context("insert meal")?;
        Ok(m.into_meal(created_at))
    }

    async fn list(&self, f: MealFilter) -> anyhow::Result<Vec<Meal>> {
        let rows = sqlx::query_as::<_, MealRow>(&format!(
            r#"
            SELECT {MEAL_COLUMNS}
            FROM meals
            WHERE ($1::timestamptz IS NULL OR eaten_at >= $1)
              AND ($2::timestamptz IS NULL OR eaten_at < $2)
            ORDER BY eaten_at DESC
            LIMIT $3
            "#
        ))
        .bind(f.from)
        .bind(f.to)
        .bind(f.limit)
        .fetch_all(&self.db)
        .await
        .context("list meals")?;
        rows.into_iter().map(Meal::try_from).collect()
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<Option<Meal>> {
        let row = sqlx::query_as::<_, MealRow>(&format!(
            "DELETE FROM meals WHERE id = $1 RETURNING {MEAL_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("delete meal")?;
        row.map(Meal::try_from).transpose()
    }
}
