/// 엔티티 저장소 인메모리 구현체
/// 테스트와 데이터베이스 없는 로컬 실행에 사용한다.
/// 모든 트레이트 호출은 하나의 임계 구역 안에서 수행되어 원자성을 보장한다.
// region:    --- Imports
use crate::auction::model::{status, Auction, Bid, NewAuction};
use crate::boost::model::{Account, Boost, BoostActivation};
use crate::error::StoreError;
use crate::notification::model::{Notification, NotificationRequest};
use crate::store::EntityStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

// endregion: --- Imports

// region:    --- Memory Store
#[derive(Default)]
struct Inner {
    auctions: HashMap<i64, Auction>,
    next_auction_id: i64,
    bids: Vec<Bid>,
    next_bid_id: i64,
    accounts: HashMap<i64, Account>,
    boosts: HashMap<i64, Boost>,
    notifications: Vec<Notification>,
    next_notification_id: i64,
    dedup: HashSet<(i64, String, i64, i64)>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 경매 직접 삽입 (테스트 시드용)
    pub fn put_auction(&self, auction: Auction) {
        let mut inner = self.inner.lock().unwrap();
        inner.next_auction_id = inner.next_auction_id.max(auction.id);
        inner.auctions.insert(auction.id, auction);
    }

    /// 계정 직접 삽입 (테스트 시드용)
    pub fn put_account(&self, account: Account) {
        let mut inner = self.inner.lock().unwrap();
        inner.accounts.insert(account.id, account);
    }

    /// 부스트 조회
    pub fn boost(&self, listing_id: i64) -> Option<Boost> {
        self.inner.lock().unwrap().boosts.get(&listing_id).cloned()
    }

    /// 수신자별 알림 조회
    pub fn notifications_for(&self, recipient_id: i64) -> Vec<Notification> {
        self.inner
            .lock()
            .unwrap()
            .notifications
            .iter()
            .filter(|n| n.recipient_id == recipient_id)
            .cloned()
            .collect()
    }

    /// 전체 알림 조회
    pub fn all_notifications(&self) -> Vec<Notification> {
        self.inner.lock().unwrap().notifications.clone()
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn create_auction(&self, new: NewAuction) -> Result<Auction, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.next_auction_id += 1;
        let auction = Auction {
            id: inner.next_auction_id,
            listing_id: new.listing_id,
            seller_id: new.seller_id,
            status: status::DRAFT.to_string(),
            starting_price: new.starting_price,
            reserve_price: new.reserve_price,
            current_bid: None,
            current_bidder_id: None,
            bid_count: 0,
            start_time: None,
            end_time: None,
            created_at: Utc::now(),
        };
        inner.auctions.insert(auction.id, auction.clone());
        Ok(auction)
    }

    async fn get_auction(&self, auction_id: i64) -> Result<Option<Auction>, StoreError> {
        Ok(self.inner.lock().unwrap().auctions.get(&auction_id).cloned())
    }

    async fn transition_status(
        &self,
        auction_id: i64,
        from: &[&str],
        to: &str,
    ) -> Result<Option<Auction>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        match inner.auctions.get_mut(&auction_id) {
            Some(auction) if from.contains(&auction.status.as_str()) => {
                auction.status = to.to_string();
                Ok(Some(auction.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn activate_auction(
        &self,
        auction_id: i64,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Result<Option<Auction>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        match inner.auctions.get_mut(&auction_id) {
            Some(auction) if auction.status == status::PENDING_APPROVAL => {
                auction.status = status::ACTIVE.to_string();
                auction.start_time = Some(start_time);
                auction.end_time = Some(end_time);
                Ok(Some(auction.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn cancel_if_unbid(&self, auction_id: i64) -> Result<Option<Auction>, StoreError> {
        let cancellable = [status::DRAFT, status::PENDING_APPROVAL, status::ACTIVE];
        let mut inner = self.inner.lock().unwrap();
        match inner.auctions.get_mut(&auction_id) {
            Some(auction)
                if cancellable.contains(&auction.status.as_str()) && auction.bid_count == 0 =>
            {
                auction.status = status::CANCELLED.to_string();
                Ok(Some(auction.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn commit_bid(
        &self,
        auction_id: i64,
        bidder_id: i64,
        amount: i64,
        placed_at: DateTime<Utc>,
    ) -> Result<Option<Auction>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.next_bid_id += 1;
        let bid_id = inner.next_bid_id;
        match inner.auctions.get_mut(&auction_id) {
            Some(auction)
                if auction.is_open_for_bids(placed_at) && amount > auction.bid_floor() =>
            {
                auction.current_bid = Some(amount);
                auction.current_bidder_id = Some(bidder_id);
                auction.bid_count += 1;
                let updated = auction.clone();
                inner.bids.push(Bid {
                    id: bid_id,
                    auction_id,
                    bidder_id,
                    amount,
                    placed_at,
                });
                Ok(Some(updated))
            }
            _ => Ok(None),
        }
    }

    async fn distinct_bidders(&self, auction_id: i64) -> Result<Vec<i64>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut bidders = Vec::new();
        for bid in inner.bids.iter().filter(|b| b.auction_id == auction_id) {
            if !bidders.contains(&bid.bidder_id) {
                bidders.push(bid.bidder_id);
            }
        }
        Ok(bidders)
    }

    async fn auctions_ending_within(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<Auction>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .auctions
            .values()
            .filter(|a| {
                a.status == status::ACTIVE
                    && a.end_time.map_or(false, |end| end >= from && end < until)
            })
            .cloned()
            .collect())
    }

    async fn auctions_past_end(&self, now: DateTime<Utc>) -> Result<Vec<Auction>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .auctions
            .values()
            .filter(|a| a.status == status::ACTIVE && a.end_time.map_or(false, |end| end <= now))
            .cloned()
            .collect())
    }

    async fn activate_boost(
        &self,
        listing_id: i64,
        owner_id: i64,
        hot_sale_price: Option<i64>,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<BoostActivation, StoreError> {
        let mut inner = self.inner.lock().unwrap();

        // 쿼터 확인이 먼저, 그다음 활성 부스트 확인 (변경은 둘 다 통과한 뒤에)
        let has_quota = inner
            .accounts
            .get(&owner_id)
            .map_or(false, |account| account.available_boosts > 0);
        if !has_quota {
            return Ok(BoostActivation::NoQuota);
        }

        if inner
            .boosts
            .get(&listing_id)
            .map_or(false, |boost| boost.is_active(now))
        {
            return Ok(BoostActivation::AlreadyActive);
        }

        if let Some(account) = inner.accounts.get_mut(&owner_id) {
            account.available_boosts -= 1;
        }
        let boost = Boost {
            listing_id,
            owner_id,
            hot_sale_price,
            activated_at: now,
            expires_at: Some(expires_at),
        };
        inner.boosts.insert(listing_id, boost.clone());
        Ok(BoostActivation::Activated(boost))
    }

    async fn clear_boost(
        &self,
        listing_id: i64,
        owner_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<Boost>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        match inner.boosts.get_mut(&listing_id) {
            Some(boost) if boost.owner_id == owner_id && boost.is_active(now) => {
                boost.expires_at = None;
                Ok(Some(boost.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn expire_boosts(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let mut cleared = 0;
        for boost in inner.boosts.values_mut() {
            if boost.expires_at.map_or(false, |expires| expires <= now) {
                boost.expires_at = None;
                cleared += 1;
            }
        }
        Ok(cleared)
    }

    async fn get_account(&self, account_id: i64) -> Result<Option<Account>, StoreError> {
        Ok(self.inner.lock().unwrap().accounts.get(&account_id).cloned())
    }

    async fn subscriptions_expiring_within(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<Account>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .accounts
            .values()
            .filter(|account| {
                account
                    .subscription_valid_until
                    .map_or(false, |valid| valid >= from && valid <= until)
            })
            .cloned()
            .collect())
    }

    async fn insert_notification_once(
        &self,
        req: &NotificationRequest,
        window_bucket: i64,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let key = (
            req.recipient_id,
            req.notification_type.clone(),
            req.related_entity_id,
            window_bucket,
        );
        if !inner.dedup.insert(key) {
            return Ok(false);
        }
        inner.next_notification_id += 1;
        let notification = Notification {
            id: inner.next_notification_id,
            recipient_id: req.recipient_id,
            notification_type: req.notification_type.clone(),
            title: req.title.clone(),
            description: req.description.clone(),
            entity_type: req.entity_type.clone(),
            related_entity_id: req.related_entity_id,
            action_url: req.action_url.clone(),
            is_read: false,
            created_at: now,
        };
        inner.notifications.push(notification);
        Ok(true)
    }

    async fn bids_for_auction(&self, auction_id: i64) -> Result<Vec<Bid>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut bids: Vec<Bid> = inner
            .bids
            .iter()
            .filter(|b| b.auction_id == auction_id)
            .cloned()
            .collect();
        bids.sort_by(|a, b| b.placed_at.cmp(&a.placed_at));
        Ok(bids)
    }
}
// endregion: --- Memory Store
