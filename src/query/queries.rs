/// 경매 상태 조회
pub const GET_AUCTION_STATE: &str = "SELECT id, listing_id, seller_id, status, starting_price, reserve_price, current_bid, current_bidder_id, bid_count, start_time, end_time, created_at FROM auctions WHERE id = $1";

/// 모든 경매 조회
pub const GET_ALL_AUCTIONS: &str = "SELECT id, listing_id, seller_id, status, starting_price, reserve_price, current_bid, current_bidder_id, bid_count, start_time, end_time, created_at FROM auctions ORDER BY created_at DESC";

/// 최고 입찰 조회
pub const GET_HIGHEST_BID: &str =
    "SELECT MAX(amount) as highest_bid FROM bids WHERE auction_id = $1";

/// 입찰 이력 조회
pub const GET_BID_HISTORY: &str = r#"
    SELECT id, auction_id, bidder_id, amount, placed_at
    FROM bids
    WHERE auction_id = $1
    ORDER BY placed_at DESC
"#;

/// 부스트 조회
pub const GET_BOOST: &str =
    "SELECT listing_id, owner_id, hot_sale_price, activated_at, expires_at FROM boosts WHERE listing_id = $1";

/// 수신자별 알림 조회
pub const GET_NOTIFICATIONS: &str = r#"
    SELECT id, recipient_id, notification_type, title, description, entity_type, related_entity_id, action_url, is_read, created_at
    FROM notifications
    WHERE recipient_id = $1
    ORDER BY created_at DESC
"#;

/// 계정 조회
pub const GET_ACCOUNT: &str =
    "SELECT id, available_boosts, monthly_boost_allowance, subscription_valid_until FROM accounts WHERE id = $1";
