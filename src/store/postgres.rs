/// 엔티티 저장소 PostgreSQL 구현체
/// 모든 조건부 연산은 단일 guarded UPDATE / INSERT .. ON CONFLICT 문으로,
/// 복수 행 연산은 하나의 트랜잭션으로 수행한다.
// region:    --- Imports
use crate::auction::model::{status, Auction, Bid, NewAuction};
use crate::boost::model::{Account, Boost, BoostActivation};
use crate::error::StoreError;
use crate::notification::model::NotificationRequest;
use crate::store::EntityStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

// endregion: --- Imports

// region:    --- Postgres Entity Store
pub struct PostgresEntityStore {
    pool: Arc<PgPool>,
}

impl PostgresEntityStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EntityStore for PostgresEntityStore {
    async fn create_auction(&self, new: NewAuction) -> Result<Auction, StoreError> {
        let auction = sqlx::query_as::<_, Auction>(
            "INSERT INTO auctions (listing_id, seller_id, status, starting_price, reserve_price, bid_count, created_at)
             VALUES ($1, $2, $3, $4, $5, 0, $6)
             RETURNING *",
        )
        .bind(new.listing_id)
        .bind(new.seller_id)
        .bind(status::DRAFT)
        .bind(new.starting_price)
        .bind(new.reserve_price)
        .bind(Utc::now())
        .fetch_one(&*self.pool)
        .await?;
        Ok(auction)
    }

    async fn get_auction(&self, auction_id: i64) -> Result<Option<Auction>, StoreError> {
        let auction = sqlx::query_as::<_, Auction>("SELECT * FROM auctions WHERE id = $1")
            .bind(auction_id)
            .fetch_optional(&*self.pool)
            .await?;
        Ok(auction)
    }

    async fn transition_status(
        &self,
        auction_id: i64,
        from: &[&str],
        to: &str,
    ) -> Result<Option<Auction>, StoreError> {
        let from: Vec<String> = from.iter().map(|s| s.to_string()).collect();
        let auction = sqlx::query_as::<_, Auction>(
            "UPDATE auctions SET status = $2 WHERE id = $1 AND status = ANY($3) RETURNING *",
        )
        .bind(auction_id)
        .bind(to)
        .bind(&from)
        .fetch_optional(&*self.pool)
        .await?;
        Ok(auction)
    }

    async fn activate_auction(
        &self,
        auction_id: i64,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Result<Option<Auction>, StoreError> {
        let auction = sqlx::query_as::<_, Auction>(
            "UPDATE auctions SET status = $2, start_time = $3, end_time = $4
             WHERE id = $1 AND status = $5
             RETURNING *",
        )
        .bind(auction_id)
        .bind(status::ACTIVE)
        .bind(start_time)
        .bind(end_time)
        .bind(status::PENDING_APPROVAL)
        .fetch_optional(&*self.pool)
        .await?;
        Ok(auction)
    }

    async fn cancel_if_unbid(&self, auction_id: i64) -> Result<Option<Auction>, StoreError> {
        let from: Vec<String> = [status::DRAFT, status::PENDING_APPROVAL, status::ACTIVE]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let auction = sqlx::query_as::<_, Auction>(
            "UPDATE auctions SET status = $2
             WHERE id = $1 AND status = ANY($3) AND bid_count = 0
             RETURNING *",
        )
        .bind(auction_id)
        .bind(status::CANCELLED)
        .bind(&from)
        .fetch_optional(&*self.pool)
        .await?;
        Ok(auction)
    }

    async fn commit_bid(
        &self,
        auction_id: i64,
        bidder_id: i64,
        amount: i64,
        placed_at: DateTime<Utc>,
    ) -> Result<Option<Auction>, StoreError> {
        let mut tx = self.pool.begin().await.map_err(StoreError::Database)?;

        // 최신 상태 기준 선두 캐시 갱신 (커밋 시점 재검증)
        let updated = sqlx::query_as::<_, Auction>(
            "UPDATE auctions
             SET current_bid = $3, current_bidder_id = $2, bid_count = bid_count + 1
             WHERE id = $1 AND status = 'ACTIVE'
               AND start_time <= $4 AND end_time > $4
               AND $3 > COALESCE(current_bid, starting_price)
             RETURNING *",
        )
        .bind(auction_id)
        .bind(bidder_id)
        .bind(amount)
        .bind(placed_at)
        .fetch_optional(&mut *tx)
        .await
        .map_err(StoreError::Database)?;

        match updated {
            Some(auction) => {
                // 입찰 기록 추가 (선두 캐시 갱신과 같은 트랜잭션)
                sqlx::query(
                    "INSERT INTO bids (auction_id, bidder_id, amount, placed_at) VALUES ($1, $2, $3, $4)",
                )
                .bind(auction_id)
                .bind(bidder_id)
                .bind(amount)
                .bind(placed_at)
                .execute(&mut *tx)
                .await
                .map_err(StoreError::Database)?;

                tx.commit().await.map_err(StoreError::Database)?;
                Ok(Some(auction))
            }
            None => {
                tx.rollback().await.map_err(StoreError::Database)?;
                Ok(None)
            }
        }
    }

    async fn distinct_bidders(&self, auction_id: i64) -> Result<Vec<i64>, StoreError> {
        let bidders = sqlx::query_scalar::<_, i64>(
            "SELECT DISTINCT bidder_id FROM bids WHERE auction_id = $1",
        )
        .bind(auction_id)
        .fetch_all(&*self.pool)
        .await?;
        Ok(bidders)
    }

    async fn auctions_ending_within(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<Auction>, StoreError> {
        let auctions = sqlx::query_as::<_, Auction>(
            "SELECT * FROM auctions
             WHERE status = 'ACTIVE' AND end_time >= $1 AND end_time < $2",
        )
        .bind(from)
        .bind(until)
        .fetch_all(&*self.pool)
        .await?;
        Ok(auctions)
    }

    async fn auctions_past_end(&self, now: DateTime<Utc>) -> Result<Vec<Auction>, StoreError> {
        let auctions = sqlx::query_as::<_, Auction>(
            "SELECT * FROM auctions WHERE status = 'ACTIVE' AND end_time <= $1",
        )
        .bind(now)
        .fetch_all(&*self.pool)
        .await?;
        Ok(auctions)
    }

    async fn activate_boost(
        &self,
        listing_id: i64,
        owner_id: i64,
        hot_sale_price: Option<i64>,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<BoostActivation, StoreError> {
        let mut tx = self.pool.begin().await.map_err(StoreError::Database)?;

        // 쿼터 차감 (잔여분이 있을 때만)
        let quota = sqlx::query_scalar::<_, i64>(
            "UPDATE accounts SET available_boosts = available_boosts - 1
             WHERE id = $1 AND available_boosts > 0
             RETURNING available_boosts",
        )
        .bind(owner_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(StoreError::Database)?;

        if quota.is_none() {
            tx.rollback().await.map_err(StoreError::Database)?;
            return Ok(BoostActivation::NoQuota);
        }

        // 활성 부스트가 없을 때만 생성 (만료된 행은 재사용)
        let boost = sqlx::query_as::<_, Boost>(
            "INSERT INTO boosts (listing_id, owner_id, hot_sale_price, activated_at, expires_at)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (listing_id) DO UPDATE
             SET owner_id = EXCLUDED.owner_id,
                 hot_sale_price = EXCLUDED.hot_sale_price,
                 activated_at = EXCLUDED.activated_at,
                 expires_at = EXCLUDED.expires_at
             WHERE boosts.expires_at IS NULL OR boosts.expires_at <= $6
             RETURNING *",
        )
        .bind(listing_id)
        .bind(owner_id)
        .bind(hot_sale_price)
        .bind(now)
        .bind(expires_at)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await
        .map_err(StoreError::Database)?;

        match boost {
            Some(boost) => {
                tx.commit().await.map_err(StoreError::Database)?;
                Ok(BoostActivation::Activated(boost))
            }
            None => {
                // 롤백으로 쿼터 차감 취소
                tx.rollback().await.map_err(StoreError::Database)?;
                Ok(BoostActivation::AlreadyActive)
            }
        }
    }

    async fn clear_boost(
        &self,
        listing_id: i64,
        owner_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<Boost>, StoreError> {
        let boost = sqlx::query_as::<_, Boost>(
            "UPDATE boosts SET expires_at = NULL
             WHERE listing_id = $1 AND owner_id = $2
               AND expires_at IS NOT NULL AND expires_at > $3
             RETURNING *",
        )
        .bind(listing_id)
        .bind(owner_id)
        .bind(now)
        .fetch_optional(&*self.pool)
        .await?;
        Ok(boost)
    }

    async fn expire_boosts(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let result = sqlx::query(
            "UPDATE boosts SET expires_at = NULL
             WHERE expires_at IS NOT NULL AND expires_at <= $1",
        )
        .bind(now)
        .execute(&*self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn get_account(&self, account_id: i64) -> Result<Option<Account>, StoreError> {
        let account = sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE id = $1")
            .bind(account_id)
            .fetch_optional(&*self.pool)
            .await?;
        Ok(account)
    }

    async fn subscriptions_expiring_within(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<Account>, StoreError> {
        let accounts = sqlx::query_as::<_, Account>(
            "SELECT * FROM accounts
             WHERE subscription_valid_until IS NOT NULL
               AND subscription_valid_until >= $1 AND subscription_valid_until <= $2",
        )
        .bind(from)
        .bind(until)
        .fetch_all(&*self.pool)
        .await?;
        Ok(accounts)
    }

    async fn insert_notification_once(
        &self,
        req: &NotificationRequest,
        window_bucket: i64,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let mut tx = self.pool.begin().await.map_err(StoreError::Database)?;

        // 존재 확인과 기록을 한 문장으로 (select-then-insert 금지)
        let created = sqlx::query_scalar::<_, i64>(
            "INSERT INTO notification_dedup (recipient_id, notification_type, related_entity_id, window_bucket, created_at)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (recipient_id, notification_type, related_entity_id, window_bucket) DO NOTHING
             RETURNING recipient_id",
        )
        .bind(req.recipient_id)
        .bind(&req.notification_type)
        .bind(req.related_entity_id)
        .bind(window_bucket)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await
        .map_err(StoreError::Database)?;

        if created.is_none() {
            tx.rollback().await.map_err(StoreError::Database)?;
            return Ok(false);
        }

        sqlx::query(
            "INSERT INTO notifications (recipient_id, notification_type, title, description, entity_type, related_entity_id, action_url, is_read, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, FALSE, $8)",
        )
        .bind(req.recipient_id)
        .bind(&req.notification_type)
        .bind(&req.title)
        .bind(&req.description)
        .bind(&req.entity_type)
        .bind(req.related_entity_id)
        .bind(&req.action_url)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(StoreError::Database)?;

        tx.commit().await.map_err(StoreError::Database)?;
        Ok(true)
    }

    async fn bids_for_auction(&self, auction_id: i64) -> Result<Vec<Bid>, StoreError> {
        let bids = sqlx::query_as::<_, Bid>(
            "SELECT * FROM bids WHERE auction_id = $1 ORDER BY placed_at DESC",
        )
        .bind(auction_id)
        .fetch_all(&*self.pool)
        .await?;
        Ok(bids)
    }
}
// endregion: --- Postgres Entity Store
