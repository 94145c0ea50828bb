// region:    --- Imports
use crate::config::EngineConfig;
use crate::database::DatabaseManager;
use crate::scheduler::SweepDispatcher;
use crate::store::PostgresEntityStore;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};
// endregion: --- Imports

// region:    --- Modules
mod auction;
mod bidding;
mod boost;
mod config;
mod database;
mod error;
mod handlers;
mod notification;
mod query;
mod scheduler;
mod store;

// endregion: --- Modules

// region:    --- Main
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // logging 초기화
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .without_time()
        .with_target(false)
        .init();

    // 설정 로드
    let engine_config = EngineConfig::from_env();

    // DatabaseManager 생성
    let db_manager = Arc::new(DatabaseManager::new().await);

    // 데이터베이스 초기화
    if let Err(e) = db_manager.initialize_database().await {
        error!("{:<12} --> 데이터베이스 초기화 실패: {:?}", "Main", e);
        return Err(e.into());
    }
    info!("{:<12} --> 데이터베이스 초기화 성공", "Main");

    // 엔티티 저장소 생성
    let store = Arc::new(PostgresEntityStore::new(db_manager.get_pool()));

    // 주기적 스윕 디스패처 시작
    let dispatcher = SweepDispatcher::new(Arc::clone(&store), engine_config.clone());
    dispatcher.start().await;
    info!(
        "{:<12} --> 스윕 디스패처 시작 (주기: {}초)",
        "Main", engine_config.sweep_interval_secs
    );

    // 테스트 페이지를 위한 cors 설정
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let bind_addr = engine_config.bind_addr.clone();

    // 라우터 설정
    let routes_all = Router::new()
        .route(
            "/auctions",
            post(handlers::handle_create_auction).get(handlers::handle_get_auctions),
        )
        .route(
            "/auctions/:id/submit",
            post(handlers::handle_submit_auction),
        )
        .route(
            "/auctions/:id/approve",
            post(handlers::handle_approve_auction),
        )
        .route("/auctions/:id/close", post(handlers::handle_close_auction))
        .route(
            "/auctions/:id/cancel",
            post(handlers::handle_cancel_auction),
        )
        .route("/auctions/:id", get(handlers::handle_get_auction))
        .route("/auctions/:id/bids", get(handlers::handle_get_bid_history))
        .route(
            "/auctions/:id/highest-bid",
            get(handlers::handle_get_highest_bid),
        )
        .route("/bid", post(handlers::handle_bid))
        .route("/boost", post(handlers::handle_activate_boost))
        .route(
            "/boost/deactivate",
            post(handlers::handle_deactivate_boost),
        )
        .route("/boosts/:id", get(handlers::handle_get_boost))
        .route(
            "/notifications/:id",
            get(handlers::handle_get_notifications),
        )
        .route("/accounts/:id", get(handlers::handle_get_account))
        .route("/sweep", post(handlers::handle_run_sweep))
        .layer(cors)
        .layer(DefaultBodyLimit::max(1024 * 1024 * 20))
        .with_state((db_manager, store, engine_config));

    // 리스너 생성
    let listener = TcpListener::bind(&bind_addr).await?;
    info!(
        "{:<12} --> Web Server: Listening on {}",
        "Main",
        listener.local_addr()?
    );

    // 서버 실행
    if let Err(err) = axum::serve(listener, routes_all.into_make_service()).await {
        error!("{:<12} --> Server error: {}", "Main", err);
    }
    Ok(())
}
// endregion: --- Main
