/// 알림 중복 제거 원장
/// "이 (수신자, 종류, 엔티티) 조합이 이 창 안에서 이미 알림을 받았는가"를
/// 판정과 기록이 분리되지 않는 단일 원자적 연산으로 처리한다.
// region:    --- Imports
use crate::error::StoreError;
use crate::store::EntityStore;
use chrono::{DateTime, Utc};
use tracing::{debug, info};

pub mod model;

pub use model::{kind, window_bucket, DedupWindow, NotificationRequest};

// endregion: --- Imports

// region:    --- Try Notify
/// 중복 제거 원장을 거쳐 알림 생성
/// true = 새 알림 생성, false = 같은 창 안의 중복으로 억제 (정상 결과)
pub async fn try_notify(
    store: &impl EntityStore,
    req: NotificationRequest,
    window: DedupWindow,
    now: DateTime<Utc>,
) -> Result<bool, StoreError> {
    let bucket = window_bucket(now, window);
    let created = store.insert_notification_once(&req, bucket, now).await?;
    if created {
        info!(
            "{:<12} --> 알림 생성: type={}, recipient={}, entity={}",
            "Notify", req.notification_type, req.recipient_id, req.related_entity_id
        );
    } else {
        debug!(
            "{:<12} --> 중복 알림 억제: type={}, recipient={}, entity={}, bucket={}",
            "Notify", req.notification_type, req.recipient_id, req.related_entity_id, bucket
        );
    }
    Ok(created)
}
// endregion: --- Try Notify
