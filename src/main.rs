use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use std::sync::Arc;

use mobbex_relay::config::Config;
use mobbex_relay::db::{create_pool, init_db, queries, AppState};
use mobbex_relay::handlers;
use mobbex_relay::models::CreateOrder;
use mobbex_relay::token::TokenAuthenticator;
use mobbex_relay::webhook::ReconciliationEngine;

#[derive(Parser, Debug)]
#[command(name = "mobbex-relay")]
#[command(about = "Reconciles Mobbex payment webhooks into a local orders store")]
struct Cli {
    /// Seed the database with a demo order (dev only)
    #[arg(long)]
    seed: bool,

    /// Print the webhook token derived from the configured credentials and exit
    #[arg(long)]
    print_token: bool,
}

fn seed_demo_order(state: &AppState) {
    let conn = state.db.get().expect("Failed to get db connection for seed");

    let order = CreateOrder {
        id: "demo-1".to_string(),
        total: 1000.0,
        currency: "ARS".to_string(),
    };

    match queries::create_order(&conn, &order) {
        Ok(order) => tracing::info!("Seeded demo order {} (total {})", order.id, order.total),
        Err(e) => tracing::warn!("Seed skipped: {}", e),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = Config::from_env();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mobbex_relay=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let token = TokenAuthenticator::new(config.api_key.clone(), config.access_token.clone());

    if cli.print_token {
        println!("{}", token.generate());
        return;
    }

    if !config.is_ready() {
        tracing::warn!(
            "Integration is not ready (set MOBBEX_ENABLED, MOBBEX_API_KEY, MOBBEX_ACCESS_TOKEN); \
             webhook token checks will reject all deliveries"
        );
    }

    let pool = create_pool(&config.database_path).expect("Failed to create database pool");
    {
        let conn = pool.get().expect("Failed to get db connection");
        init_db(&conn).expect("Failed to initialize schema");
    }

    let http_client = reqwest::Client::new();
    let engine = Arc::new(ReconciliationEngine::new(
        token,
        config.coupon_url.clone(),
        http_client.clone(),
        config.forward_webhook_url.clone(),
    ));

    let state = AppState {
        db: pool,
        config: config.clone(),
        engine,
        http_client,
    };

    if cli.seed {
        seed_demo_order(&state);
    }

    let app = handlers::router(state).layer(TraceLayer::new_for_http());

    let addr = config.addr();
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind listener");
    axum::serve(listener, app).await.expect("Server error");
}
