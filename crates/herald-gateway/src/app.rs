use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use teloxide::Bot;

use herald_core::HeraldConfig;
use herald_store::ReminderStore;
use herald_sweep::SweepRunner;
use herald_telegram::{CommandHandler, TelegramSender};

/// Central shared state — passed as `Arc<AppState>` to all Axum handlers.
pub struct AppState {
    pub config: HeraldConfig,
    pub handler: CommandHandler,
    pub bot: Bot,
    pub runner: SweepRunner<ReminderStore, TelegramSender>,
}

/// Assemble the full Axum router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(crate::http::health::health_handler))
        .route(
            "/webhooks/telegram",
            post(crate::http::webhook::webhook_handler),
        )
        .route(
            "/sweep",
            get(crate::http::sweep::sweep_handler).post(crate::http::sweep::sweep_handler),
        )
        .with_state(state)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}
