mod app;
mod assistant;
mod config;
mod days;
mod error;
mod extractors;
mod favorites;
mod llm;
mod meals;
mod nutrition;
mod state;
mod storage;
mod tracker;

#[cfg(test)]
mod test_support;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "platewise=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let state = state::AppState::init().await?;
    tracing::info!(
        models = ?state.invoker.models(),
        utc_offset_minutes = state.config.utc_offset_minutes,
        "platewise starting"
    );

    app::serve(app::build_app(state)).await
}
