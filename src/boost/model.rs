use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// 부스트 모델
// 리스팅당 최대 1개 (listing_id 가 기본 키), expires_at 이 NULL 이면 비활성
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Boost {
    pub listing_id: i64,
    pub owner_id: i64,
    pub hot_sale_price: Option<i64>,
    pub activated_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Boost {
    /// 활성 여부
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map_or(false, |expires| expires > now)
    }
}

// 계정 모델 (부스트 쿼터 + 구독 정보)
/// available_boosts 는 활성화 시 차감되고 만료/조기 해제 시 복구되지 않는다.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Account {
    pub id: i64,
    pub available_boosts: i64,
    pub monthly_boost_allowance: i64,
    pub subscription_valid_until: Option<DateTime<Utc>>,
}

/// 부스트 활성화 시도 결과 (저장소의 원자적 연산이 반환)
#[derive(Debug)]
pub enum BoostActivation {
    /// 쿼터 차감 및 부스트 생성 완료
    Activated(Boost),
    /// 사용 가능한 쿼터 없음
    NoQuota,
    /// 만료되지 않은 부스트가 이미 존재
    AlreadyActive,
}
