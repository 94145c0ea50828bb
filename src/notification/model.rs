use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// 알림 종류 상수
pub mod kind {
    pub const SUBSCRIPTION_EXPIRING: &str = "subscription_expiring";
    pub const AUCTION_ENDING_SOON: &str = "auction_ending_soon";
    pub const AUCTION_WON: &str = "auction_won";
    pub const AUCTION_ENDED: &str = "auction_ended";
}

// 알림 모델 (사용자에게 노출되는 추가 전용 기록)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Notification {
    pub id: i64,
    pub recipient_id: i64,
    pub notification_type: String,
    pub title: String,
    pub description: String,
    pub entity_type: String,
    pub related_entity_id: i64,
    pub action_url: Option<String>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// 알림 생성 요청
#[derive(Debug, Clone)]
pub struct NotificationRequest {
    pub recipient_id: i64,
    pub notification_type: String,
    pub title: String,
    pub description: String,
    pub entity_type: String,
    pub related_entity_id: i64,
    pub action_url: Option<String>,
}

/// 중복 제거 창
/// 같은 (수신자, 종류, 엔티티) 조합에 대해 같은 창 안에서는 알림을 한 번만 생성한다.
#[derive(Debug, Clone, Copy)]
pub enum DedupWindow {
    /// 엔티티 수명 동안 한 번만
    Once,
    /// 지정한 기간마다 한 번
    Within(Duration),
}

/// 중복 제거 키의 시간 버킷 계산
/// (recipient, type, entity, bucket) 4중 키의 마지막 구성 요소
pub fn window_bucket(now: DateTime<Utc>, window: DedupWindow) -> i64 {
    match window {
        DedupWindow::Once => 0,
        DedupWindow::Within(duration) => {
            let secs = duration.num_seconds().max(1);
            now.timestamp().div_euclid(secs)
        }
    }
}

// region:    --- Tests
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_once_window_is_constant() {
        let a = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let b = Utc.with_ymd_and_hms(2030, 6, 15, 12, 0, 0).unwrap();
        assert_eq!(window_bucket(a, DedupWindow::Once), 0);
        assert_eq!(window_bucket(b, DedupWindow::Once), 0);
    }

    #[test]
    fn test_within_window_buckets() {
        let window = DedupWindow::Within(Duration::hours(2));
        let base = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        // 같은 창 안의 두 시각은 같은 버킷
        assert_eq!(
            window_bucket(base, window),
            window_bucket(base + Duration::minutes(30), window)
        );
        // 창 길이만큼 떨어진 시각은 다른 버킷
        assert_ne!(
            window_bucket(base, window),
            window_bucket(base + Duration::hours(2), window)
        );
    }
}
// endregion: --- Tests
