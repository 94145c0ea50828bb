/// 입찰 순위 엔진
/// 입찰 수락 여부를 판정하고 경매의 선두 캐시를 입찰 기록 추가와
/// 같은 원자적 단위로 갱신한다. 경합에서 진 입찰자는 제출 시점에
/// 유효했더라도 커밋 시점 기준으로 BID_TOO_LOW 를 받는다.
// region:    --- Imports
use crate::auction::model::{status, Auction};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::store::EntityStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

// endregion: --- Imports

// region:    --- Commands
/// 입찰 명령
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PlaceBidCommand {
    pub auction_id: i64,
    pub bidder_id: i64,
    pub amount: i64,
}

/// 입찰 수락 후의 선두 상태
#[derive(Debug, Serialize, Deserialize)]
pub struct LeaderState {
    pub current_bid: i64,
    pub current_bidder_id: i64,
    pub bid_count: i64,
}

/// 입찰 처리
pub async fn place_bid(
    store: &impl EntityStore,
    config: &EngineConfig,
    cmd: PlaceBidCommand,
    now: DateTime<Utc>,
) -> Result<LeaderState, EngineError> {
    info!("{:<12} --> 입찰 요청 처리 시작: {:?}", "Bidding", cmd);

    let auction = store
        .get_auction(cmd.auction_id)
        .await?
        .ok_or(EngineError::AuctionNotFound {
            auction_id: cmd.auction_id,
        })?;

    // 스냅샷 기준 사전 검증 (정확한 거부 사유 응답용)
    if !auction.is_open_for_bids(now) {
        return Err(EngineError::AuctionNotActive {
            status: not_active_reason(&auction, now),
        });
    }
    if cmd.bidder_id == auction.seller_id && !config.allow_seller_bids {
        return Err(EngineError::SelfBid);
    }
    if cmd.amount <= auction.bid_floor() {
        return Err(EngineError::BidTooLow {
            floor: auction.bid_floor(),
        });
    }

    // 원자적 확정: 커밋 시점의 최신 상태로 재검증된다
    match store
        .commit_bid(cmd.auction_id, cmd.bidder_id, cmd.amount, now)
        .await?
    {
        Some(updated) => {
            info!(
                "{:<12} --> 입찰 수락: auction={}, bidder={}, amount={}",
                "Bidding", cmd.auction_id, cmd.bidder_id, cmd.amount
            );
            Ok(LeaderState {
                current_bid: updated.current_bid.unwrap_or(cmd.amount),
                current_bidder_id: updated.current_bidder_id.unwrap_or(cmd.bidder_id),
                bid_count: updated.bid_count,
            })
        }
        None => {
            // 스냅샷 이후 다른 입찰이 먼저 확정되었거나 경매 상태가 바뀜
            warn!(
                "{:<12} --> 입찰 확정 실패, 최신 상태로 재판정: auction={}, bidder={}",
                "Bidding", cmd.auction_id, cmd.bidder_id
            );
            let latest = store
                .get_auction(cmd.auction_id)
                .await?
                .ok_or(EngineError::AuctionNotFound {
                    auction_id: cmd.auction_id,
                })?;
            if latest.is_open_for_bids(now) {
                Err(EngineError::BidTooLow {
                    floor: latest.bid_floor(),
                })
            } else {
                Err(EngineError::AuctionNotActive {
                    status: not_active_reason(&latest, now),
                })
            }
        }
    }
}

/// 입찰 불가 사유 (응답 코드용)
fn not_active_reason(auction: &Auction, now: DateTime<Utc>) -> String {
    if auction.status != status::ACTIVE {
        auction.status.clone()
    } else if auction.start_time.map_or(true, |start| now < start) {
        "NOT_STARTED".to_string()
    } else {
        "ALREADY_ENDED".to_string()
    }
}
// endregion: --- Commands
