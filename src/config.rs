/// 엔진 설정
/// 환경 변수로 재정의 가능한 값과 스윕 시간 창 상수를 정의한다.
// region:    --- Imports
use chrono::Duration;

// endregion: --- Imports

// region:    --- Constants
/// 스윕 주기 기본값 (초)
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;

/// 스캔별 타임아웃 기본값 (초)
pub const DEFAULT_SCAN_TIMEOUT_SECS: u64 = 30;

/// 구독 만료 사전 알림 구간 (일)
pub const SUBSCRIPTION_EXPIRY_LOOKAHEAD_DAYS: i64 = 7;

/// 경매 종료 임박 알림 구간 (시간)
pub const AUCTION_ENDING_LOOKAHEAD_HOURS: i64 = 1;

/// 경매 종료 임박 알림 중복 제거 창 (시간)
pub const AUCTION_ENDING_DEDUP_HOURS: i64 = 2;

// endregion: --- Constants

// region:    --- Engine Config
/// 엔진 설정
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// 스윕 주기 (SWEEP_INTERVAL_SECS)
    pub sweep_interval_secs: u64,
    /// 스캔별 타임아웃 (SCAN_TIMEOUT_SECS)
    pub scan_timeout_secs: u64,
    /// 판매자 자기 입찰 허용 여부 (ALLOW_SELLER_BIDS)
    pub allow_seller_bids: bool,
    /// 웹 서버 바인드 주소 (BIND_ADDR)
    pub bind_addr: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: DEFAULT_SWEEP_INTERVAL_SECS,
            scan_timeout_secs: DEFAULT_SCAN_TIMEOUT_SECS,
            allow_seller_bids: false,
            bind_addr: "0.0.0.0:3000".to_string(),
        }
    }
}

impl EngineConfig {
    /// 환경 변수에서 설정 로드
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            sweep_interval_secs: std::env::var("SWEEP_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.sweep_interval_secs),
            scan_timeout_secs: std::env::var("SCAN_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.scan_timeout_secs),
            allow_seller_bids: std::env::var("ALLOW_SELLER_BIDS")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(defaults.allow_seller_bids),
            bind_addr: std::env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
        }
    }

    /// 구독 만료 사전 알림 구간
    pub fn subscription_lookahead(&self) -> Duration {
        Duration::days(SUBSCRIPTION_EXPIRY_LOOKAHEAD_DAYS)
    }

    /// 경매 종료 임박 알림 구간
    pub fn auction_ending_lookahead(&self) -> Duration {
        Duration::hours(AUCTION_ENDING_LOOKAHEAD_HOURS)
    }

    /// 경매 종료 임박 알림 중복 제거 창
    pub fn auction_ending_dedup_window(&self) -> Duration {
        Duration::hours(AUCTION_ENDING_DEDUP_HOURS)
    }
}
// endregion: --- Engine Config
