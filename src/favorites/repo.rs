use anyhow::Context;
use async_trait::async_trait;
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use super::repo_types::{Favorite, FavoriteRow, NewFavorite};

#[async_trait]
pub trait FavoriteStore: Send + Sync {
    async fn insert(&self, fav: NewFavorite) -> anyhow::Result<Favorite>;
    /// Newest first.
    async fn list(&self) -> anyhow::Result<Vec<Favorite>>;
    async fn get(&self, id: Uuid) -> anyhow::Result<Option<Favorite>>;
    /// Whether a favorite was removed.
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;
}

#[derive(Clone)]
pub struct PgFavoriteStore {
    db: PgPool,
}

impl PgFavoriteStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

const FAVORITE_COLUMNS: &str =
    "id, name, items, total_calories, protein, carbs, fats, meal_type, dietary_preference, created_at";

#[async_trait]
impl FavoriteStore for PgFavoriteStore {
    async fn insert(&self, f: NewFavorite) -> anyhow::Result<Favorite> {
        let row = sqlx::query_as::<_, FavoriteRow>(&format!(
            r#"
            INSERT INTO favorite_meals (id, name, items, total_calories, protein, carbs, fats,
                                        meal_type, dietary_preference)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {FAVORITE_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&f.name)
        .bind(Json(&f.items))
        .bind(f.total_calories)
        .bind(f.macros.protein)
        .bind(f.macros.carbs)
        .bind(f.macros.fats)
        .bind(f.meal_type.as_str())
        .bind(f.dietary_preference.as_str())
        .fetch_one(&self.db)
        .await
        .context("insert favorite")?;
        row.try_into()
    }

    async fn list(&self) -> anyhow::Result<Vec<Favorite>> {
        let rows = sqlx::query_as::<_, FavoriteRow>(&format!(
            "SELECT {FAVORITE_COLUMNS} FROM favorite_meals ORDER BY created_at DESC"
        ))
        .fetch_all(&self.db)
        .await
        .context("list favorites")?;
        rows.into_iter().map(Favorite::try_from).collect()
    }

    async fn get(&self, id: Uuid) -> anyhow::Result<Option<Favorite>> {
        let row = sqlx::query_as::<_, FavoriteRow>(&format!(
            "SELECT {FAVORITE_COLUMNS} FROM favorite_meals WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("get favorite")?;
        row.map(Favorite::try_from).transpose()
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM favorite_meals WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .context("delete favorite")?;
        Ok(res.rows_affected() > 0)
    }
}
