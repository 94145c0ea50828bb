use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 경매 상태 상수
pub mod status {
    pub const DRAFT: &str = "DRAFT";
    pub const PENDING_APPROVAL: &str = "PENDING_APPROVAL";
    pub const ACTIVE: &str = "ACTIVE";
    pub const ENDED: &str = "ENDED";
    pub const CANCELLED: &str = "CANCELLED";
}

// 경매 모델
/// current_bid / current_bidder_id / bid_count 는 입찰 원장에서 파생된 캐시이며,
/// 입찰 기록 추가와 같은 트랜잭션 안에서만 갱신된다.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Auction {
    pub id: i64,
    pub listing_id: i64,
    pub seller_id: i64,
    pub status: String,
    pub starting_price: i64,
    pub reserve_price: Option<i64>,
    pub current_bid: Option<i64>,
    pub current_bidder_id: Option<i64>,
    pub bid_count: i64,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Auction {
    /// 다음 입찰이 넘어야 하는 금액
    pub fn bid_floor(&self) -> i64 {
        self.current_bid.unwrap_or(self.starting_price)
    }

    /// 입찰 가능 여부 (ACTIVE 이고 start_time <= now < end_time)
    pub fn is_open_for_bids(&self, now: DateTime<Utc>) -> bool {
        self.status == status::ACTIVE
            && self.start_time.map_or(false, |start| start <= now)
            && self.end_time.map_or(false, |end| now < end)
    }

    /// 최소 판매가 달성 여부 (최소 판매가가 없으면 항상 달성)
    pub fn reserve_met(&self) -> bool {
        match self.reserve_price {
            None => true,
            Some(reserve) => self.current_bid.map_or(false, |bid| bid >= reserve),
        }
    }
}

/// 신규 경매 생성 요청 (DRAFT 상태로 생성)
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct NewAuction {
    pub listing_id: i64,
    pub seller_id: i64,
    pub starting_price: i64,
    pub reserve_price: Option<i64>,
}

// 입찰 모델 (불변, 추가 전용 원장)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Bid {
    pub id: i64,
    pub auction_id: i64,
    pub bidder_id: i64,
    pub amount: i64,
    pub placed_at: DateTime<Utc>,
}

// region:    --- Tests
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn active_auction(now: DateTime<Utc>) -> Auction {
        Auction {
            id: 1,
            listing_id: 10,
            seller_id: 100,
            status: status::ACTIVE.to_string(),
            starting_price: 100_000,
            reserve_price: None,
            current_bid: None,
            current_bidder_id: None,
            bid_count: 0,
            start_time: Some(now - Duration::hours(1)),
            end_time: Some(now + Duration::hours(1)),
            created_at: now - Duration::days(1),
        }
    }

    #[test]
    fn test_bid_floor_falls_back_to_starting_price() {
        let now = Utc::now();
        let mut auction = active_auction(now);
        assert_eq!(auction.bid_floor(), 100_000);
        auction.current_bid = Some(110_000);
        assert_eq!(auction.bid_floor(), 110_000);
    }

    #[test]
    fn test_is_open_for_bids_respects_window() {
        let now = Utc::now();
        let mut auction = active_auction(now);
        assert!(auction.is_open_for_bids(now));

        auction.start_time = Some(now + Duration::minutes(5));
        assert!(!auction.is_open_for_bids(now));

        auction.start_time = Some(now - Duration::hours(2));
        auction.end_time = Some(now - Duration::minutes(1));
        assert!(!auction.is_open_for_bids(now));

        auction.end_time = Some(now + Duration::hours(1));
        auction.status = status::ENDED.to_string();
        assert!(!auction.is_open_for_bids(now));
    }

    #[test]
    fn test_reserve_met() {
        let now = Utc::now();
        let mut auction = active_auction(now);
        assert!(auction.reserve_met());

        auction.reserve_price = Some(200_000);
        assert!(!auction.reserve_met());

        auction.current_bid = Some(200_000);
        assert!(auction.reserve_met());
    }
}
// endregion: --- Tests
