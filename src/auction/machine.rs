/// 경매 상태 머신
/// 유효한 상태 전환과 불변식을 강제한다.
/// DRAFT -> PENDING_APPROVAL -> ACTIVE -> ENDED,
/// 입찰이 없는 경매만 CANCELLED 로 전환 가능
// region:    --- Imports
use crate::auction::model::{status, Auction};
use crate::error::EngineError;
use crate::notification::{self, kind, DedupWindow, NotificationRequest};
use crate::store::EntityStore;
use chrono::{DateTime, Utc};
use tracing::{info, warn};

// endregion: --- Imports

// region:    --- Transitions
/// 종료 처리 결과
/// newly_ended 가 false 이면 이미 종료된 경매에 대한 무해한 재호출
#[derive(Debug)]
pub struct CloseResult {
    pub auction: Auction,
    pub newly_ended: bool,
}

/// 경매 제출: DRAFT -> PENDING_APPROVAL
pub async fn submit(store: &impl EntityStore, auction_id: i64) -> Result<Auction, EngineError> {
    info!("{:<12} --> 경매 제출: id={}", "Machine", auction_id);
    if let Some(auction) = store
        .transition_status(auction_id, &[status::DRAFT], status::PENDING_APPROVAL)
        .await?
    {
        return Ok(auction);
    }
    match store.get_auction(auction_id).await? {
        None => Err(EngineError::AuctionNotFound { auction_id }),
        Some(auction) => Err(EngineError::InvalidTransition {
            status: auction.status,
        }),
    }
}

/// 경매 승인: PENDING_APPROVAL -> ACTIVE, 경매 기간 설정
/// end_time > start_time > now 가 아니면 InvalidWindow
pub async fn approve(
    store: &impl EntityStore,
    auction_id: i64,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<Auction, EngineError> {
    info!(
        "{:<12} --> 경매 승인: id={}, start={}, end={}",
        "Machine", auction_id, start_time, end_time
    );
    if !(now < start_time && start_time < end_time) {
        return Err(EngineError::InvalidWindow);
    }
    if let Some(auction) = store
        .activate_auction(auction_id, start_time, end_time)
        .await?
    {
        return Ok(auction);
    }
    match store.get_auction(auction_id).await? {
        None => Err(EngineError::AuctionNotFound { auction_id }),
        Some(auction) => Err(EngineError::InvalidTransition {
            status: auction.status,
        }),
    }
}

/// 경매 종료: ACTIVE -> ENDED (시간 도달 또는 수동 종료)
/// 이미 종료된 경매는 무해한 재호출로 처리하며,
/// 정산 알림은 중복 제거 원장을 거치므로 재시도에도 한 번만 생성된다.
pub async fn close(
    store: &impl EntityStore,
    auction_id: i64,
    now: DateTime<Utc>,
) -> Result<CloseResult, EngineError> {
    info!("{:<12} --> 경매 종료: id={}", "Machine", auction_id);
    let auction = store
        .get_auction(auction_id)
        .await?
        .ok_or(EngineError::AuctionNotFound { auction_id })?;

    match auction.status.as_str() {
        status::ENDED => {
            // 재시도 경로: 전환은 생략하고 정산 알림만 다시 시도 (원장이 중복을 억제)
            settle(store, &auction, now).await?;
            Ok(CloseResult {
                auction,
                newly_ended: false,
            })
        }
        status::ACTIVE => {
            match store
                .transition_status(auction_id, &[status::ACTIVE], status::ENDED)
                .await?
            {
                Some(ended) => {
                    settle(store, &ended, now).await?;
                    Ok(CloseResult {
                        auction: ended,
                        newly_ended: true,
                    })
                }
                None => {
                    // 동시 종료 경합에서 패배: 최신 상태로 재판정
                    warn!(
                        "{:<12} --> 종료 전환 경합: id={}, 최신 상태로 재확인",
                        "Machine", auction_id
                    );
                    let latest = store
                        .get_auction(auction_id)
                        .await?
                        .ok_or(EngineError::AuctionNotFound { auction_id })?;
                    if latest.status == status::ENDED {
                        settle(store, &latest, now).await?;
                        Ok(CloseResult {
                            auction: latest,
                            newly_ended: false,
                        })
                    } else {
                        Err(EngineError::InvalidTransition {
                            status: latest.status,
                        })
                    }
                }
            }
        }
        _ => Err(EngineError::InvalidTransition {
            status: auction.status,
        }),
    }
}

/// 경매 취소: 입찰이 없을 때만 허용
pub async fn cancel(store: &impl EntityStore, auction_id: i64) -> Result<Auction, EngineError> {
    info!("{:<12} --> 경매 취소: id={}", "Machine", auction_id);
    let auction = store
        .get_auction(auction_id)
        .await?
        .ok_or(EngineError::AuctionNotFound { auction_id })?;

    match auction.status.as_str() {
        // 관리자 재시도 경로
        status::CANCELLED => Ok(auction),
        status::ENDED => Err(EngineError::InvalidTransition {
            status: auction.status,
        }),
        _ if auction.bid_count > 0 => Err(EngineError::HasBids {
            bid_count: auction.bid_count,
        }),
        _ => {
            if let Some(cancelled) = store.cancel_if_unbid(auction_id).await? {
                return Ok(cancelled);
            }
            // 스냅샷 이후 입찰 또는 상태 변화
            let latest = store
                .get_auction(auction_id)
                .await?
                .ok_or(EngineError::AuctionNotFound { auction_id })?;
            if latest.bid_count > 0 {
                Err(EngineError::HasBids {
                    bid_count: latest.bid_count,
                })
            } else {
                Err(EngineError::InvalidTransition {
                    status: latest.status,
                })
            }
        }
    }
}
// endregion: --- Transitions

// region:    --- Settlement
/// 종료된 경매의 정산 알림 (낙찰자 + 판매자)
/// 엔티티 수명 동안 한 번만 생성되도록 Once 창으로 게이트한다.
async fn settle(
    store: &impl EntityStore,
    auction: &Auction,
    now: DateTime<Utc>,
) -> Result<(), EngineError> {
    if let (Some(bidder_id), Some(amount)) = (auction.current_bidder_id, auction.current_bid) {
        notification::try_notify(
            store,
            NotificationRequest {
                recipient_id: bidder_id,
                notification_type: kind::AUCTION_WON.to_string(),
                title: "경매 낙찰".to_string(),
                description: format!("입찰하신 경매에서 {}원에 낙찰되었습니다.", amount),
                entity_type: "auction".to_string(),
                related_entity_id: auction.id,
                action_url: Some(format!("/auctions/{}", auction.id)),
            },
            DedupWindow::Once,
            now,
        )
        .await?;
    }

    let description = match (auction.current_bid, auction.reserve_met()) {
        (Some(amount), true) => format!("경매가 {}원에 낙찰 종료되었습니다.", amount),
        (Some(amount), false) => format!(
            "경매가 종료되었습니다. 최고 입찰가 {}원이 최소 판매가에 미달했습니다.",
            amount
        ),
        (None, _) => "경매가 입찰 없이 종료되었습니다.".to_string(),
    };
    notification::try_notify(
        store,
        NotificationRequest {
            recipient_id: auction.seller_id,
            notification_type: kind::AUCTION_ENDED.to_string(),
            title: "경매 종료".to_string(),
            description,
            entity_type: "auction".to_string(),
            related_entity_id: auction.id,
            action_url: Some(format!("/auctions/{}", auction.id)),
        },
        DedupWindow::Once,
        now,
    )
    .await?;
    Ok(())
}
// endregion: --- Settlement
