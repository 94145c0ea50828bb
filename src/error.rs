/// 엔진 오류 타입 정의
/// 비즈니스 규칙 위반은 호출자에게 그대로 전달하고,
/// 일시적인 저장소 오류는 다음 주기에 재시도한다.
// region:    --- Imports
use thiserror::Error;

// endregion: --- Imports

// region:    --- Store Error
/// 저장소 계층 오류
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("데이터베이스 오류: {0}")]
    Database(#[from] sqlx::Error),
}
// endregion: --- Store Error

// region:    --- Engine Error
/// 경매 엔진 오류
/// 각 변형은 안정적인 코드 문자열을 가지며, 핸들러에서 JSON 응답으로 변환된다.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("허용되지 않는 상태 전환입니다. (현재 상태: {status})")]
    InvalidTransition { status: String },

    #[error("경매 기간이 유효하지 않습니다.")]
    InvalidWindow,

    #[error("입찰이 있는 경매는 취소할 수 없습니다. (입찰 수: {bid_count})")]
    HasBids { bid_count: i64 },

    #[error("경매가 진행 중이 아닙니다. (현재 상태: {status})")]
    AuctionNotActive { status: String },

    #[error("입찰 금액이 현재 최고가보다 낮습니다. (최소 입찰가: {floor} 초과)")]
    BidTooLow { floor: i64 },

    #[error("판매자는 자신의 경매에 입찰할 수 없습니다.")]
    SelfBid,

    #[error("사용 가능한 부스트가 없습니다.")]
    NoQuotaRemaining,

    #[error("이미 활성화된 부스트가 있습니다.")]
    AlreadyBoosted,

    #[error("경매를 찾을 수 없습니다. (id: {auction_id})")]
    AuctionNotFound { auction_id: i64 },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl EngineError {
    /// 응답용 오류 코드
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::InvalidTransition { .. } => "INVALID_TRANSITION",
            EngineError::InvalidWindow => "INVALID_WINDOW",
            EngineError::HasBids { .. } => "HAS_BIDS",
            EngineError::AuctionNotActive { .. } => "NOT_ACTIVE",
            EngineError::BidTooLow { .. } => "BID_TOO_LOW",
            EngineError::SelfBid => "SELF_BID",
            EngineError::NoQuotaRemaining => "NO_QUOTA",
            EngineError::AlreadyBoosted => "ALREADY_BOOSTED",
            EngineError::AuctionNotFound { .. } => "NOT_FOUND",
            EngineError::Store(_) => "STORE_ERROR",
        }
    }
}
// endregion: --- Engine Error

// region:    --- Tests
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_distinct() {
        let errors = [
            EngineError::InvalidTransition {
                status: "DRAFT".to_string(),
            },
            EngineError::InvalidWindow,
            EngineError::HasBids { bid_count: 1 },
            EngineError::AuctionNotActive {
                status: "ENDED".to_string(),
            },
            EngineError::BidTooLow { floor: 100 },
            EngineError::SelfBid,
            EngineError::NoQuotaRemaining,
            EngineError::AlreadyBoosted,
            EngineError::AuctionNotFound { auction_id: 1 },
        ];
        let mut codes: Vec<&str> = errors.iter().map(|e| e.code()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }
}
// endregion: --- Tests
