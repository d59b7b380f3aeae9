//! In-memory stand-ins for the database, object storage and model API.

use std::{
    collections::{BTreeMap, HashMap, VecDeque},
    sync::Mutex,
};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use bytes::Bytes;
use time::{Date, OffsetDateTime};
use tower::ServiceExt;
use uuid::Uuid;

use crate::{
    favorites::{
        repo::FavoriteStore,
        repo_types::{Favorite, NewFavorite},
    },
    llm::{GenerationParams, GenerativeModel, ModelError, ModelInfo, Prompt},
    meals::{
        repo::{MealFilter, MealStore},
        repo_types::{Meal, NewMeal},
    },
    storage::StorageClient,
    tracker::{
        repo::GoalStore,
        repo_types::{DailyGoals, Goals},
    },
};

#[derive(Debug, Clone)]
pub enum Script {
    Reply(String),
    RateLimited,
    Unavailable,
    Fail,
}

/// Model backend that plays back canned outcomes per model identifier.
/// Calls with nothing scripted for their model fall back to the shared
/// queue, then to `Unavailable`.
#[derive(Default)]
pub struct ScriptedModel {
    scripts: Mutex<HashMap<String, VecDeque<Script>>>,
    shared: Mutex<VecDeque<Script>>,
    calls: Mutex<Vec<String>>,
    prompts: Mutex<Vec<String>>,
    catalogue: Option<Vec<ModelInfo>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(self, model: &str, outcome: Script) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .entry(model.to_string())
            .or_default()
            .push_back(outcome);
        self
    }

    /// Reply from whichever model is asked next.
    pub fn reply(self, text: impl Into<String>) -> Self {
        self.shared.lock().unwrap().push_back(Script::Reply(text.into()));
        self
    }

    /// Catalogue returned by `list_models`; without one listing fails.
    pub fn catalogue(mut self, models: Vec<ModelInfo>) -> Self {
        self.catalogue = Some(models);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerativeModel for ScriptedModel {
    async fn generate(
        &self,
        model: &str,
        prompt: &Prompt,
        _params: &GenerationParams,
    ) -> Result<String, ModelError> {
        self.calls.lock().unwrap().push(model.to_string());
        self.prompts.lock().unwrap().push(prompt.text.clone());

        let next = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(model)
            .and_then(VecDeque::pop_front)
            .or_else(|| self.shared.lock().unwrap().pop_front());

        let model = model.to_string();
        match next {
            Some(Script::Reply(text)) => Ok(text),
            Some(Script::RateLimited) => Err(ModelError::RateLimited { model }),
            Some(Script::Unavailable) | None => Err(ModelError::Unavailable { model }),
            Some(Script::Fail) => Err(ModelError::Api {
                model,
                status: 500,
                body: "internal".into(),
            }),
        }
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>, ModelError> {
        self.catalogue.clone().ok_or_else(|| ModelError::Unavailable {
            model: "models".into(),
        })
    }
}

#[derive(Default)]
pub struct FakeStorage {
    objects: Mutex<HashMap<String, (Bytes, String)>>,
}

impl FakeStorage {
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.lock().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl StorageClient for FakeStorage {
    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> anyhow::Result<()> {
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), (body, content_type.to_string()));
        Ok(())
    }

    async fn delete_object(&self, key: &str) -> anyhow::Result<()> {
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }

    async fn presign_get(&self, key: &str, _seconds: u64) -> anyhow::Result<String> {
        Ok(format!("https://fake.local/{key}"))
    }
}

#[derive(Default)]
pub struct MemoryMealStore {
    meals: Mutex<Vec<Meal>>,
}

#[async_trait]
impl MealStore for MemoryMealStore {
    async fn insert(&self, meal: NewMeal) -> anyhow::Result<Meal> {
        let meal = meal.into_meal(OffsetDateTime::now_utc());
        self.meals.lock().unwrap().push(meal.clone());
        Ok(meal)
    }

    async fn list(&self, filter: MealFilter) -> anyhow::Result<Vec<Meal>> {
        let mut out: Vec<Meal> = self
            .meals
            .lock()
            .unwrap()
            .iter()
            .filter(|m| filter.matches(m.timestamp))
            .cloned()
            .collect();
        out.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        if let Some(limit) = filter.limit {
            out.truncate(limit.max(0) as usize);
        }
        Ok(out)
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<Option<Meal>> {
        let mut meals = self.meals.lock().unwrap();
        let pos = meals.iter().position(|m| m.id == id);
        Ok(pos.map(|i| meals.remove(i)))
    }
}

/// Meal store whose database is down: writes fail, reads find nothing.
pub struct FailingMealStore;

#[async_trait]
impl MealStore for FailingMealStore {
    async fn insert(&self, _meal: NewMeal) -> anyhow::Result<Meal> {
        anyhow::bail!("connection refused")
    }

    async fn list(&self, _filter: MealFilter) -> anyhow::Result<Vec<Meal>> {
        Ok(Vec::new())
    }

    async fn delete(&self, _id: Uuid) -> anyhow::Result<Option<Meal>> {
        Ok(None)
    }
}

#[derive(Default)]
pub struct MemoryFavoriteStore {
    favorites: Mutex<Vec<Favorite>>,
}

#[async_trait]
impl FavoriteStore for MemoryFavoriteStore {
    async fn insert(&self, f: NewFavorite) -> anyhow::Result<Favorite> {
        let fav = Favorite {
            id: Uuid::new_v4(),
            name: f.name,
            items: f.items,
            total_calories: f.total_calories,
            macros_summary: f.macros,
            meal_type: f.meal_type,
            dietary_preference: f.dietary_preference,
            created_at: OffsetDateTime::now_utc(),
        };
        self.favorites.lock().unwrap().push(fav.clone());
        Ok(fav)
    }

    async fn list(&self) -> anyhow::Result<Vec<Favorite>> {
        let mut out = self.favorites.lock().unwrap().clone();
        out.reverse();
        Ok(out)
    }

    async fn get(&self, id: Uuid) -> anyhow::Result<Option<Favorite>> {
        Ok(self.favorites.lock().unwrap().iter().find(|f| f.id == id).cloned())
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let mut favs = self.favorites.lock().unwrap();
        let before = favs.len();
        favs.retain(|f| f.id != id);
        Ok(favs.len() != before)
    }
}

/// Updates hold the lock for the whole read-modify-write, like the row lock
/// taken by the Postgres upsert.
#[derive(Default)]
pub struct MemoryGoalStore {
    days: Mutex<BTreeMap<Date, DailyGoals>>,
}

#[async_trait]
impl GoalStore for MemoryGoalStore {
    async fn upsert(&self, day: Date, goals: Option<Goals>) -> anyhow::Result<DailyGoals> {
        let mut days = self.days.lock().unwrap();
        let goals = goals
            .or_else(|| days.get(&day).map(|d| d.goals))
            .unwrap_or_default();
        let entry = DailyGoals {
            date: day,
            goals,
            updated_at: OffsetDateTime::now_utc(),
        };
        days.insert(day, entry.clone());
        Ok(entry)
    }

    async fn get(&self, day: Date) -> anyhow::Result<Option<DailyGoals>> {
        Ok(self.days.lock().unwrap().get(&day).cloned())
    }

    async fn list(&self) -> anyhow::Result<Vec<DailyGoals>> {
        Ok(self.days.lock().unwrap().values().cloned().collect())
    }
}

/// Run one request through the router and return status plus raw body.
pub async fn send(app: Router, req: Request<Body>) -> (StatusCode, Bytes) {
    let res = app.oneshot(req).await.unwrap();
    let status = res.status();
    let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    (status, body)
}

pub async fn send_json(app: Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
    let (status, body) = send(app, req).await;
    let value = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, value)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

pub fn delete(uri: &str) -> Request<Body> {
    Request::delete(uri).body(Body::empty()).unwrap()
}

pub fn post_empty(uri: &str) -> Request<Body> {
    Request::post(uri).body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Multipart body with one file field and optional text fields.
pub fn post_multipart(
    uri: &str,
    file: Option<(&str, &str, &[u8])>,
    fields: &[(&str, &str)],
) -> Request<Body> {
    const BOUNDARY: &str = "platewise-test-boundary";
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((filename, content_type, data)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::post(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}
