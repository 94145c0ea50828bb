/// 주기적 스윕 디스패처
/// 시간 조건(구독 만료 예정, 경매 종료 임박, 부스트 만료, 경매 종료)을
/// 탐지해 알림과 상태 전환을 구동한다.
/// 주기 사이에 프로세스 상태를 유지하지 않으므로 호출이 겹치거나
/// 재시도되어도 중복 부작용은 저장소의 중복 제거 원장이 막는다.
// region:    --- Imports
use crate::auction::machine;
use crate::boost;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::notification::{self, kind, DedupWindow, NotificationRequest};
use crate::store::EntityStore;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::time::{interval, timeout, Duration};
use tracing::{debug, error, info};

// endregion: --- Imports

// region:    --- Sweep Report
/// 스윕 한 주기의 스캔별 처리 건수
#[derive(Debug, Default, Serialize)]
pub struct SweepReport {
    pub subscriptions_notified: u64,
    pub bidders_notified: u64,
    pub boosts_expired: u64,
    pub auctions_closed: u64,
}
// endregion: --- Sweep Report

// region:    --- Sweep Dispatcher
/// 주기적 스윕 디스패처
pub struct SweepDispatcher<S: EntityStore + 'static> {
    store: Arc<S>,
    config: EngineConfig,
}

impl<S: EntityStore + 'static> SweepDispatcher<S> {
    pub fn new(store: Arc<S>, config: EngineConfig) -> Self {
        Self { store, config }
    }

    /// 스윕 루프 시작
    pub async fn start(&self) {
        let store = Arc::clone(&self.store);
        let config = self.config.clone();
        tokio::spawn(async move {
            let mut interval = interval(Duration::from_secs(config.sweep_interval_secs));
            loop {
                interval.tick().await;
                let report = run_scheduled_sweep(store.as_ref(), &config, Utc::now()).await;
                debug!("{:<12} --> 스윕 완료: {:?}", "Sweep", report);
            }
        });
    }
}

/// 스윕 한 주기 실행
/// 네 개의 스캔은 서로 독립적이며, 한 스캔의 실패나 타임아웃은
/// 로그만 남기고 나머지 스캔 진행을 막지 않는다 (다음 주기에 재시도).
pub async fn run_scheduled_sweep(
    store: &impl EntityStore,
    config: &EngineConfig,
    now: DateTime<Utc>,
) -> SweepReport {
    info!("{:<12} --> 스윕 시작: now={}", "Sweep", now);
    let scan_timeout = Duration::from_secs(config.scan_timeout_secs);
    let mut report = SweepReport::default();

    // 1. 구독 만료 예정 스캔
    match timeout(scan_timeout, scan_expiring_subscriptions(store, config, now)).await {
        Ok(Ok(count)) => report.subscriptions_notified = count,
        Ok(Err(e)) => error!("{:<12} --> 구독 스캔 실패: {:?}", "Sweep", e),
        Err(_) => error!("{:<12} --> 구독 스캔 타임아웃", "Sweep"),
    }

    // 2. 경매 종료 임박 스캔
    match timeout(scan_timeout, scan_ending_auctions(store, config, now)).await {
        Ok(Ok(count)) => report.bidders_notified = count,
        Ok(Err(e)) => error!("{:<12} --> 종료 임박 스캔 실패: {:?}", "Sweep", e),
        Err(_) => error!("{:<12} --> 종료 임박 스캔 타임아웃", "Sweep"),
    }

    // 3. 부스트 만료 스캔
    match timeout(scan_timeout, boost::commands::sweep_expired(store, now)).await {
        Ok(Ok(count)) => report.boosts_expired = count,
        Ok(Err(e)) => error!("{:<12} --> 부스트 만료 스캔 실패: {:?}", "Sweep", e),
        Err(_) => error!("{:<12} --> 부스트 만료 스캔 타임아웃", "Sweep"),
    }

    // 4. 경매 종료 스캔
    match timeout(scan_timeout, scan_due_auctions(store, now)).await {
        Ok(Ok(count)) => report.auctions_closed = count,
        Ok(Err(e)) => error!("{:<12} --> 경매 종료 스캔 실패: {:?}", "Sweep", e),
        Err(_) => error!("{:<12} --> 경매 종료 스캔 타임아웃", "Sweep"),
    }

    info!("{:<12} --> 스윕 완료: {:?}", "Sweep", report);
    report
}
// endregion: --- Sweep Dispatcher

// region:    --- Scans
/// 구독 만료 예정 계정에 알림
async fn scan_expiring_subscriptions(
    store: &impl EntityStore,
    config: &EngineConfig,
    now: DateTime<Utc>,
) -> Result<u64, EngineError> {
    let lookahead = config.subscription_lookahead();
    let accounts = store
        .subscriptions_expiring_within(now, now + lookahead)
        .await?;
    let mut notified = 0;
    for account in accounts {
        let valid_until = match account.subscription_valid_until {
            Some(valid) => valid,
            None => continue,
        };
        let days_left = (valid_until - now).num_days();
        let created = notification::try_notify(
            store,
            NotificationRequest {
                recipient_id: account.id,
                notification_type: kind::SUBSCRIPTION_EXPIRING.to_string(),
                title: "구독 만료 예정".to_string(),
                description: format!("구독이 {}일 후 만료됩니다.", days_left),
                entity_type: "account".to_string(),
                related_entity_id: account.id,
                action_url: Some("/subscription".to_string()),
            },
            DedupWindow::Within(lookahead),
            now,
        )
        .await?;
        if created {
            notified += 1;
        }
    }
    Ok(notified)
}

/// 종료가 임박한 경매의 입찰자들에게 알림
/// 수신자 목록은 별도 구독 테이블이 아닌 입찰 원장에서 파생한다
async fn scan_ending_auctions(
    store: &impl EntityStore,
    config: &EngineConfig,
    now: DateTime<Utc>,
) -> Result<u64, EngineError> {
    let auctions = store
        .auctions_ending_within(now, now + config.auction_ending_lookahead())
        .await?;
    let mut notified = 0;
    for auction in auctions {
        for bidder_id in store.distinct_bidders(auction.id).await? {
            let created = notification::try_notify(
                store,
                NotificationRequest {
                    recipient_id: bidder_id,
                    notification_type: kind::AUCTION_ENDING_SOON.to_string(),
                    title: "경매 종료 임박".to_string(),
                    description: "입찰하신 경매가 곧 종료됩니다.".to_string(),
                    entity_type: "auction".to_string(),
                    related_entity_id: auction.id,
                    action_url: Some(format!("/auctions/{}", auction.id)),
                },
                DedupWindow::Within(config.auction_ending_dedup_window()),
                now,
            )
            .await?;
            if created {
                notified += 1;
            }
        }
    }
    Ok(notified)
}

/// 종료 시각이 지난 경매 종료 처리
/// 개별 경매의 실패는 로그만 남기고 다음 경매로 진행한다
async fn scan_due_auctions(
    store: &impl EntityStore,
    now: DateTime<Utc>,
) -> Result<u64, EngineError> {
    let due = store.auctions_past_end(now).await?;
    let mut closed = 0;
    for auction in due {
        match machine::close(store, auction.id, now).await {
            Ok(result) if result.newly_ended => closed += 1,
            Ok(_) => {}
            Err(e) => error!(
                "{:<12} --> 경매 종료 처리 실패: id={}, {:?}",
                "Sweep", auction.id, e
            ),
        }
    }
    Ok(closed)
}
// endregion: --- Scans
