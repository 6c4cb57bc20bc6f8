use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};

mod app;
mod http;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "herald_gateway=info,tower_http=debug".into()),
        )
        .init();

    // load config: explicit HERALD_CONFIG path > ~/.herald/herald.toml
    let config_path = std::env::var("HERALD_CONFIG").ok();
    let config = herald_core::HeraldConfig::load(config_path.as_deref())?;

    // One explicit zone for every date/time interpretation.
    let tz = config.sweep.tz()?;
    let bind = config.gateway.bind.clone();
    let port = config.gateway.port;

    let db_path = &config.database.path;
    ensure_parent_dir(db_path);
    info!(path = %db_path, "opening SQLite database");

    let conn = rusqlite::Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    let store = herald_store::ReminderStore::new(conn)?;
    info!("database migrations complete");

    let bot = teloxide::Bot::new(config.telegram.bot_token.clone());

    let handler = herald_telegram::CommandHandler::new(
        store.clone(),
        config.sweep.buckets.clone(),
        tz,
        config.telegram.allow_chats.clone(),
    );

    let sender = herald_telegram::TelegramSender::new(bot.clone());
    let dispatcher = herald_sweep::Dispatcher::new(
        sender,
        config.telegram.notify_chat_id.map(|id| id.to_string()),
    );
    let runner =
        herald_sweep::SweepRunner::new(store, dispatcher, config.sweep.buckets.clone(), tz);

    let state = Arc::new(app::AppState {
        config,
        handler,
        bot,
        runner,
    });

    // Dev mode: run the sweep in-process on a fixed interval. Production
    // relies on an external periodic caller hitting /sweep instead.
    if let Some(secs) = state.config.sweep.interval_secs {
        let state2 = Arc::clone(&state);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(std::time::Duration::from_secs(secs));
            loop {
                interval.tick().await;
                if let Err(e) = state2.runner.run(chrono::Utc::now()).await {
                    error!("scheduled sweep failed: {e}");
                }
            }
        });
        info!(interval_secs = secs, "in-process sweep timer started");
    }

    let router = app::build_router(Arc::clone(&state));
    let addr: SocketAddr = format!("{bind}:{port}").parse()?;
    info!("herald gateway listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}

/// Ensure the parent directory for a file path exists.
fn ensure_parent_dir(path: &str) {
    if let Some(parent) = std::path::Path::new(path).parent() {
        let _ = std::fs::create_dir_all(parent);
    }
}
