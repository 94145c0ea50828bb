/// 부스트 수명 주기 관리
/// 1. 활성화 (쿼터 차감)
/// 2. 조기 해제 (쿼터 미복구)
/// 3. 만료 일괄 해제 (스윕 디스패처가 호출)
// region:    --- Imports
use crate::boost::model::{Boost, BoostActivation};
use crate::error::EngineError;
use crate::store::EntityStore;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

// endregion: --- Imports

// region:    --- Commands
/// 부스트 활성화 명령
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ActivateBoostCommand {
    pub listing_id: i64,
    pub owner_id: i64,
    pub hot_sale_price: Option<i64>,
    pub duration_days: i64,
}

/// 부스트 해제 명령
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DeactivateBoostCommand {
    pub listing_id: i64,
    pub owner_id: i64,
}

/// 부스트 활성화
/// 쿼터 차감과 부스트 생성은 저장소에서 하나의 원자적 단위로 처리된다
pub async fn activate(
    store: &impl EntityStore,
    cmd: ActivateBoostCommand,
    now: DateTime<Utc>,
) -> Result<Boost, EngineError> {
    info!("{:<12} --> 부스트 활성화 요청: {:?}", "Boost", cmd);
    if cmd.duration_days <= 0 {
        return Err(EngineError::InvalidWindow);
    }
    let expires_at = now + Duration::days(cmd.duration_days);
    match store
        .activate_boost(
            cmd.listing_id,
            cmd.owner_id,
            cmd.hot_sale_price,
            expires_at,
            now,
        )
        .await?
    {
        BoostActivation::Activated(boost) => {
            info!(
                "{:<12} --> 부스트 활성화 완료: listing={}, expires_at={}",
                "Boost", cmd.listing_id, expires_at
            );
            Ok(boost)
        }
        BoostActivation::NoQuota => Err(EngineError::NoQuotaRemaining),
        BoostActivation::AlreadyActive => Err(EngineError::AlreadyBoosted),
    }
}

/// 부스트 조기 해제
/// 쿼터는 활성화 시점에 소비된 것으로 보고 복구하지 않는다.
/// 활성 부스트가 없으면 무해한 재호출로 처리 (None 반환)
pub async fn deactivate(
    store: &impl EntityStore,
    cmd: DeactivateBoostCommand,
    now: DateTime<Utc>,
) -> Result<Option<Boost>, EngineError> {
    info!("{:<12} --> 부스트 해제 요청: {:?}", "Boost", cmd);
    let cleared = store
        .clear_boost(cmd.listing_id, cmd.owner_id, now)
        .await?;
    Ok(cleared)
}

/// 만료된 부스트 일괄 해제 (멱등)
pub async fn sweep_expired(
    store: &impl EntityStore,
    now: DateTime<Utc>,
) -> Result<u64, EngineError> {
    let cleared = store.expire_boosts(now).await?;
    if cleared > 0 {
        info!("{:<12} --> 만료 부스트 해제: {} 건", "Boost", cleared);
    }
    Ok(cleared)
}
// endregion: --- Commands
