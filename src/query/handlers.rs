// region:    --- Imports
use super::queries;
use crate::auction::model::{Auction, Bid};
use crate::boost::model::{Account, Boost};
use crate::database::DatabaseManager;
use crate::notification::model::Notification;
use sqlx::Error as SqlxError;
use sqlx::Row;
use tracing::info;

// endregion: --- Imports

// region:    --- Query Handlers

/// 경매 상태 조회
pub async fn get_auction_state(
    db_manager: &DatabaseManager,
    auction_id: i64,
) -> Result<Auction, SqlxError> {
    info!("{:<12} --> 경매 상태 조회 id: {}", "Query", auction_id);
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query_as::<_, Auction>(queries::GET_AUCTION_STATE)
                    .bind(auction_id)
                    .fetch_one(&mut **tx)
                    .await
            })
        })
        .await
}

/// 모든 경매 조회
pub async fn get_all_auctions(db_manager: &DatabaseManager) -> Result<Vec<Auction>, SqlxError> {
    info!("{:<12} --> 모든 경매 조회", "Query");
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query_as::<_, Auction>(queries::GET_ALL_AUCTIONS)
                    .fetch_all(&mut **tx)
                    .await
            })
        })
        .await
}

/// 최고 입찰가 조회
pub async fn get_highest_bid(
    db_manager: &DatabaseManager,
    auction_id: i64,
) -> Result<Option<i64>, SqlxError> {
    info!("{:<12} --> 최고 입찰가 조회 id: {}", "Query", auction_id);
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                let result = sqlx::query(queries::GET_HIGHEST_BID)
                    .bind(auction_id)
                    .fetch_one(&mut **tx)
                    .await?;

                Ok(result.get("highest_bid"))
            })
        })
        .await
}

/// 입찰 이력 조회
pub async fn get_bid_history(
    db_manager: &DatabaseManager,
    auction_id: i64,
) -> Result<Vec<Bid>, SqlxError> {
    info!("{:<12} --> 입찰 이력 조회 id: {}", "Query", auction_id);
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query_as::<_, Bid>(queries::GET_BID_HISTORY)
                    .bind(auction_id)
                    .fetch_all(&mut **tx)
                    .await
            })
        })
        .await
}

/// 부스트 조회
pub async fn get_boost(
    db_manager: &DatabaseManager,
    listing_id: i64,
) -> Result<Option<Boost>, SqlxError> {
    info!("{:<12} --> 부스트 조회 listing: {}", "Query", listing_id);
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query_as::<_, Boost>(queries::GET_BOOST)
                    .bind(listing_id)
                    .fetch_optional(&mut **tx)
                    .await
            })
        })
        .await
}

/// 수신자별 알림 조회
pub async fn get_notifications(
    db_manager: &DatabaseManager,
    recipient_id: i64,
) -> Result<Vec<Notification>, SqlxError> {
    info!("{:<12} --> 알림 조회 recipient: {}", "Query", recipient_id);
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query_as::<_, Notification>(queries::GET_NOTIFICATIONS)
                    .bind(recipient_id)
                    .fetch_all(&mut **tx)
                    .await
            })
        })
        .await
}

/// 계정 조회
pub async fn get_account(
    db_manager: &DatabaseManager,
    account_id: i64,
) -> Result<Option<Account>, SqlxError> {
    info!("{:<12} --> 계정 조회 id: {}", "Query", account_id);
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query_as::<_, Account>(queries::GET_ACCOUNT)
                    .bind(account_id)
                    .fetch_optional(&mut **tx)
                    .await
            })
        })
        .await
}

// endregion: --- Query Handlers
