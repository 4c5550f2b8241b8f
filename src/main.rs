use std::time::Duration;

use axum::Router;
use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;

use dutydinar_server::config::Config;
use dutydinar_server::integrations::email::EmailSender;
use dutydinar_server::integrations::wallet::WalletPassGenerator;
use dutydinar_server::outbox::OutboxWorker;
use dutydinar_server::routes::create_routes;
use dutydinar_server::state::AppState;

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::from_env();

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Successfully connected to database");

    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    tracing::info!("Migrations run successfully");

    let worker = OutboxWorker::new(
        pool.clone(),
        WalletPassGenerator::new(&config.wallet_pass_dir),
        EmailSender::new(),
        Duration::from_secs(config.outbox_poll_interval_secs),
    );
    tokio::spawn(worker.run());

    let addr = config.bind_addr;
    let state = AppState::new(pool, config);
    let app: Router = create_routes(state);

    tracing::info!("🚀 Server running at http://{}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, app).await.expect("Server failed");
}
