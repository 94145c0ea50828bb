// region:    --- Imports
use crate::auction::machine;
use crate::auction::model::NewAuction;
use crate::bidding::commands::{place_bid, PlaceBidCommand};
use crate::boost::commands::{self, ActivateBoostCommand, DeactivateBoostCommand};
use crate::config::EngineConfig;
use crate::database::DatabaseManager;
use crate::error::EngineError;
use crate::query;
use crate::scheduler;
use crate::store::{EntityStore, PostgresEntityStore};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

// endregion: --- Imports

/// 핸들러 공유 상태
pub type AppState = (Arc<DatabaseManager>, Arc<PostgresEntityStore>, EngineConfig);

// region:    --- Error Mapping
/// 엔진 오류를 응답으로 변환
/// 비즈니스 규칙 거부는 코드와 함께 400 계열로 내려 호출자가 구분할 수 있게 한다
fn error_response(err: EngineError) -> Response {
    let status = match &err {
        EngineError::AuctionNotFound { .. } => StatusCode::NOT_FOUND,
        EngineError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_REQUEST,
    };
    let mut body = json!({
        "error": err.to_string(),
        "code": err.code(),
    });
    match &err {
        EngineError::BidTooLow { floor } => body["floor"] = (*floor).into(),
        EngineError::HasBids { bid_count } => body["bid_count"] = (*bid_count).into(),
        _ => {}
    }
    (status, Json(body)).into_response()
}
// endregion: --- Error Mapping

// region:    --- Command Handlers

/// 경매 생성 (DRAFT)
pub async fn handle_create_auction(
    State((_, store, _)): State<AppState>,
    Json(new): Json<NewAuction>,
) -> impl IntoResponse {
    info!("{:<12} --> 경매 생성 요청: {:?}", "Command", new);
    match store.create_auction(new).await {
        Ok(auction) => (StatusCode::OK, Json(auction)).into_response(),
        Err(e) => error_response(EngineError::from(e)),
    }
}

/// 경매 제출 요청 처리
pub async fn handle_submit_auction(
    State((_, store, _)): State<AppState>,
    Path(auction_id): Path<i64>,
) -> impl IntoResponse {
    match machine::submit(store.as_ref(), auction_id).await {
        Ok(auction) => (StatusCode::OK, Json(auction)).into_response(),
        Err(e) => error_response(e),
    }
}

/// 경매 승인 요청
#[derive(Debug, Deserialize)]
pub struct ApproveAuctionRequest {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

/// 경매 승인 요청 처리
pub async fn handle_approve_auction(
    State((_, store, _)): State<AppState>,
    Path(auction_id): Path<i64>,
    Json(req): Json<ApproveAuctionRequest>,
) -> impl IntoResponse {
    match machine::approve(
        store.as_ref(),
        auction_id,
        req.start_time,
        req.end_time,
        Utc::now(),
    )
    .await
    {
        Ok(auction) => (StatusCode::OK, Json(auction)).into_response(),
        Err(e) => error_response(e),
    }
}

/// 경매 종료 요청 처리 (수동 종료)
pub async fn handle_close_auction(
    State((_, store, _)): State<AppState>,
    Path(auction_id): Path<i64>,
) -> impl IntoResponse {
    match machine::close(store.as_ref(), auction_id, Utc::now()).await {
        Ok(result) => (
            StatusCode::OK,
            Json(json!({
                "auction": result.auction,
                "newly_ended": result.newly_ended,
            })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// 경매 취소 요청 처리
pub async fn handle_cancel_auction(
    State((_, store, _)): State<AppState>,
    Path(auction_id): Path<i64>,
) -> impl IntoResponse {
    match machine::cancel(store.as_ref(), auction_id).await {
        Ok(auction) => (StatusCode::OK, Json(auction)).into_response(),
        Err(e) => error_response(e),
    }
}

/// 입찰 요청 처리
pub async fn handle_bid(
    State((_, store, config)): State<AppState>,
    Json(cmd): Json<PlaceBidCommand>,
) -> impl IntoResponse {
    info!("{:<12} --> 입찰 요청 처리 시작: {:?}", "Command", cmd);
    match place_bid(store.as_ref(), &config, cmd, Utc::now()).await {
        Ok(leader) => (
            StatusCode::OK,
            Json(json!({
                "message": "입찰이 성공적으로 처리되었습니다.",
                "current_bid": leader.current_bid,
                "current_bidder_id": leader.current_bidder_id,
                "bid_count": leader.bid_count,
            })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// 부스트 활성화 요청 처리
pub async fn handle_activate_boost(
    State((_, store, _)): State<AppState>,
    Json(cmd): Json<ActivateBoostCommand>,
) -> impl IntoResponse {
    match commands::activate(store.as_ref(), cmd, Utc::now()).await {
        Ok(boost) => (StatusCode::OK, Json(boost)).into_response(),
        Err(e) => error_response(e),
    }
}

/// 부스트 해제 요청 처리
pub async fn handle_deactivate_boost(
    State((_, store, _)): State<AppState>,
    Json(cmd): Json<DeactivateBoostCommand>,
) -> impl IntoResponse {
    match commands::deactivate(store.as_ref(), cmd, Utc::now()).await {
        Ok(Some(boost)) => (StatusCode::OK, Json(boost)).into_response(),
        Ok(None) => (
            StatusCode::OK,
            Json(json!({ "message": "활성 부스트가 없습니다." })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// 스윕 수동 실행 (외부 스케줄러/크론 트리거용)
pub async fn handle_run_sweep(State((_, store, config)): State<AppState>) -> impl IntoResponse {
    let report = scheduler::run_scheduled_sweep(store.as_ref(), &config, Utc::now()).await;
    Json(report).into_response()
}

// endregion: --- Command Handlers

// region:    --- Query Handlers

/// 모든 경매 조회
pub async fn handle_get_auctions(
    State((db_manager, _, _)): State<AppState>,
) -> impl IntoResponse {
    info!("{:<12} --> 모든 경매 조회", "HandlerQuery");
    match query::handlers::get_all_auctions(&db_manager).await {
        Ok(auctions) => Json(auctions).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

/// 경매 상태 조회
pub async fn handle_get_auction(
    State((db_manager, _, _)): State<AppState>,
    Path(auction_id): Path<i64>,
) -> impl IntoResponse {
    info!("{:<12} --> 경매 상태 조회 id: {}", "HandlerQuery", auction_id);
    match query::handlers::get_auction_state(&db_manager, auction_id).await {
        Ok(auction) => Json(auction).into_response(),
        Err(sqlx::Error::RowNotFound) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "경매를 찾을 수 없습니다.", "code": "NOT_FOUND" })),
        )
            .into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

/// 입찰 이력 조회
pub async fn handle_get_bid_history(
    State((db_manager, _, _)): State<AppState>,
    Path(auction_id): Path<i64>,
) -> impl IntoResponse {
    info!("{:<12} --> 입찰 이력 조회 id: {}", "HandlerQuery", auction_id);
    match query::handlers::get_bid_history(&db_manager, auction_id).await {
        Ok(history) => Json(history).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

/// 최고 입찰가 조회
pub async fn handle_get_highest_bid(
    State((db_manager, _, _)): State<AppState>,
    Path(auction_id): Path<i64>,
) -> impl IntoResponse {
    info!(
        "{:<12} --> 최고 입찰가 조회 id: {}",
        "HandlerQuery", auction_id
    );
    match query::handlers::get_highest_bid(&db_manager, auction_id).await {
        Ok(bid) => Json(bid).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

/// 부스트 조회
pub async fn handle_get_boost(
    State((db_manager, _, _)): State<AppState>,
    Path(listing_id): Path<i64>,
) -> impl IntoResponse {
    info!(
        "{:<12} --> 부스트 조회 listing: {}",
        "HandlerQuery", listing_id
    );
    match query::handlers::get_boost(&db_manager, listing_id).await {
        Ok(boost) => Json(boost).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

/// 수신자별 알림 조회
pub async fn handle_get_notifications(
    State((db_manager, _, _)): State<AppState>,
    Path(recipient_id): Path<i64>,
) -> impl IntoResponse {
    info!(
        "{:<12} --> 알림 조회 recipient: {}",
        "HandlerQuery", recipient_id
    );
    match query::handlers::get_notifications(&db_manager, recipient_id).await {
        Ok(notifications) => Json(notifications).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

/// 계정 조회
pub async fn handle_get_account(
    State((db_manager, _, _)): State<AppState>,
    Path(account_id): Path<i64>,
) -> impl IntoResponse {
    info!("{:<12} --> 계정 조회 id: {}", "HandlerQuery", account_id);
    match query::handlers::get_account(&db_manager, account_id).await {
        Ok(account) => Json(account).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

// endregion: --- Query Handlers
