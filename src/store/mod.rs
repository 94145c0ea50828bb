/// 엔티티 저장소 인터페이스
/// 도메인 로직이 필요로 하는 원자적 조건부 연산을 정의한다.
/// 각 메서드는 하나의 원자적 단위로 실행되어야 하며,
/// 동시 호출이 경합하더라도 정확히 하나만 조건을 통과한다.
// region:    --- Imports
use crate::auction::model::{Auction, Bid, NewAuction};
use crate::boost::model::{Account, Boost, BoostActivation};
use crate::error::StoreError;
use crate::notification::model::NotificationRequest;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PostgresEntityStore;

// endregion: --- Imports

// region:    --- Entity Store Trait
#[async_trait]
pub trait EntityStore: Send + Sync {
    // -- 경매

    /// DRAFT 상태의 경매 생성
    async fn create_auction(&self, new: NewAuction) -> Result<Auction, StoreError>;

    /// 경매 조회
    async fn get_auction(&self, auction_id: i64) -> Result<Option<Auction>, StoreError>;

    /// 조건부 상태 전환: 현재 상태가 from 중 하나일 때만 to 로 변경
    /// 조건을 통과하지 못하면 None
    async fn transition_status(
        &self,
        auction_id: i64,
        from: &[&str],
        to: &str,
    ) -> Result<Option<Auction>, StoreError>;

    /// PENDING_APPROVAL -> ACTIVE 전환 및 경매 기간 설정
    async fn activate_auction(
        &self,
        auction_id: i64,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Result<Option<Auction>, StoreError>;

    /// 입찰이 없는 경매만 CANCELLED 로 전환
    async fn cancel_if_unbid(&self, auction_id: i64) -> Result<Option<Auction>, StoreError>;

    /// 입찰 확정: 최신 상태 기준 검증, 입찰 기록 추가, 선두 캐시 갱신을
    /// 하나의 원자적 단위로 수행한다. 커밋 시점에 조건을 통과하지 못하면 None
    async fn commit_bid(
        &self,
        auction_id: i64,
        bidder_id: i64,
        amount: i64,
        placed_at: DateTime<Utc>,
    ) -> Result<Option<Auction>, StoreError>;

    /// 경매에 참여한 입찰자 목록 (입찰 원장에서 파생, 중복 제거)
    async fn distinct_bidders(&self, auction_id: i64) -> Result<Vec<i64>, StoreError>;

    /// 종료 시각이 [from, until) 구간에 있는 ACTIVE 경매 목록
    async fn auctions_ending_within(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<Auction>, StoreError>;

    /// 종료 시각이 지난 ACTIVE 경매 목록
    async fn auctions_past_end(&self, now: DateTime<Utc>) -> Result<Vec<Auction>, StoreError>;

    // -- 부스트 / 쿼터

    /// 부스트 활성화: 쿼터 차감과 부스트 생성을 하나의 원자적 단위로 수행
    async fn activate_boost(
        &self,
        listing_id: i64,
        owner_id: i64,
        hot_sale_price: Option<i64>,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<BoostActivation, StoreError>;

    /// 부스트 조기 해제 (쿼터는 복구하지 않음)
    /// 활성 부스트가 없으면 None
    async fn clear_boost(
        &self,
        listing_id: i64,
        owner_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<Boost>, StoreError>;

    /// 만료 시각이 지난 부스트 일괄 해제, 해제 건수 반환
    async fn expire_boosts(&self, now: DateTime<Utc>) -> Result<u64, StoreError>;

    /// 계정 조회
    async fn get_account(&self, account_id: i64) -> Result<Option<Account>, StoreError>;

    /// 구독 만료 시각이 [from, until] 구간에 있는 계정 목록
    async fn subscriptions_expiring_within(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<Account>, StoreError>;

    // -- 알림

    /// 중복 제거 기록과 알림 생성을 하나의 원자적 단위로 수행
    /// (recipient, type, entity, bucket) 키가 이미 존재하면 false (중복 억제)
    async fn insert_notification_once(
        &self,
        req: &NotificationRequest,
        window_bucket: i64,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError>;

    /// 입찰 이력 조회 (최신순)
    async fn bids_for_auction(&self, auction_id: i64) -> Result<Vec<Bid>, StoreError>;
}
// endregion: --- Entity Store Trait
