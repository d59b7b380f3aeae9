use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use time::Date;

use super::repo_types::{DailyGoals, DailyGoalsRow, Goals};

#[async_trait]
pub trait GoalStore: Send + Sync {
    /// Set the goals for `day` in one atomic step. `None` keeps whatever is
    /// stored, or stores the defaults when the day is new.
    async fn upsert(&self, day: Date, goals: Option<Goals>) -> anyhow::Result<DailyGoals>;
    async fn get(&self, day: Date) -> anyhow::Result<Option<DailyGoals>>;
    /// Oldest day first.
    async fn list(&self) -> anyhow::Result<Vec<DailyGoals>>;
}

#[derive(Clone)]
pub struct PgGoalStore {
    db: PgPool,
}

impl PgGoalStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl GoalStore for PgGoalStore {
    async fn upsert(&self, day: Date, goals: Option<Goals>) -> anyhow::Result<DailyGoals> {
        let defaults = Goals::default();
        let row = sqlx::query_as::<_, DailyGoalsRow>(
            r#"
            INSERT INTO daily_goals AS g (day, calories, protein, carbs, fats)
            VALUES ($1, COALESCE($2, $6), COALESCE($3, $7), COALESCE($4, $8), COALESCE($5, $9))
            ON CONFLICT (day) DO UPDATE SET
                calories = COALESCE($2, g.calories),
                protein = COALESCE($3, g.protein),
                carbs = COALESCE($4, g.carbs),
                fats = COALESCE($5, g.fats),
                updated_at = now()
            RETURNING day, calories, protein, carbs, fats, updated_at
            "#,
        )
        .bind(day)
        .bind(goals.map(|g| g.calories))
        .bind(goals.map(|g| g.protein))
        .bind(goals.map(|g| g.carbs))
        .bind(goals.map(|g| g.fats))
        .bind(defaults.calories)
        .bind(defaults.protein)
        .bind(defaults.carbs)
        .bind(defaults.fats)
        .fetch_one(&self.db)
        .await
        .context("upsert daily goals")?;
        Ok(row.into())
    }

    async fn get(&self, day: Date) -> anyhow::Result<Option<DailyGoals>> {
        let row = sqlx::query_as::<_, DailyGoalsRow>(
            "SELECT day, calories, protein, carbs, fats, updated_at FROM daily_goals WHERE day = $1",
        )
        .bind(day)
        .fetch_optional(&self.db)
        .await
        .context("get daily goals")?;
        Ok(row.map(Into::into))
    }

    async fn list(&self) -> anyhow::Result<Vec<DailyGoals>> {
        let rows = sqlx::query_as::<_, DailyGoalsRow>(
            "SELECT day, calories, protein, carbs, fats, updated_at FROM daily_goals ORDER BY day",
        )
        .fetch_all(&self.db)
        .await
        .context("list daily goals")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}
