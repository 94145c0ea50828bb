use auction_engine::auction::machine;
use auction_engine::auction::model::{status, Auction, NewAuction};
use auction_engine::bidding::commands::{place_bid, PlaceBidCommand};
use auction_engine::config::EngineConfig;
use auction_engine::error::EngineError;
use auction_engine::notification::kind;
use auction_engine::store::{EntityStore, MemoryStore};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

/// 테스트용 ACTIVE 경매 시드
fn seed_active_auction(
    store: &MemoryStore,
    id: i64,
    seller_id: i64,
    starting_price: i64,
    now: DateTime<Utc>,
) -> Auction {
    let auction = Auction {
        id,
        listing_id: id * 10,
        seller_id,
        status: status::ACTIVE.to_string(),
        starting_price,
        reserve_price: None,
        current_bid: None,
        current_bidder_id: None,
        bid_count: 0,
        start_time: Some(now - Duration::hours(1)),
        end_time: Some(now + Duration::hours(2)),
        created_at: now - Duration::days(1),
    };
    store.put_auction(auction.clone());
    auction
}

/// 입찰 명령 생성
fn bid(auction_id: i64, bidder_id: i64, amount: i64) -> PlaceBidCommand {
    PlaceBidCommand {
        auction_id,
        bidder_id,
        amount,
    }
}

/// 수신자의 특정 종류 알림 수
fn notification_count(store: &MemoryStore, recipient_id: i64, kind: &str) -> usize {
    store
        .notifications_for(recipient_id)
        .iter()
        .filter(|n| n.notification_type == kind)
        .count()
}

/// 제출/승인 흐름 테스트
#[tokio::test]
async fn test_submit_and_approve_flow() {
    let store = MemoryStore::new();
    let now = Utc::now();

    let auction = store
        .create_auction(NewAuction {
            listing_id: 1,
            seller_id: 100,
            starting_price: 100_000,
            reserve_price: None,
        })
        .await
        .unwrap();
    assert_eq!(auction.status, status::DRAFT);

    let submitted = machine::submit(&store, auction.id).await.unwrap();
    assert_eq!(submitted.status, status::PENDING_APPROVAL);

    // 재제출은 거부
    let err = machine::submit(&store, auction.id).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidTransition { .. }));

    let approved = machine::approve(
        &store,
        auction.id,
        now + Duration::minutes(10),
        now + Duration::days(3),
        now,
    )
    .await
    .unwrap();
    assert_eq!(approved.status, status::ACTIVE);
    assert!(approved.start_time.is_some());
    assert!(approved.end_time.is_some());
}

/// 승인 시 경매 기간 검증 테스트
#[tokio::test]
async fn test_approve_rejects_invalid_window() {
    let store = MemoryStore::new();
    let now = Utc::now();

    let auction = store
        .create_auction(NewAuction {
            listing_id: 2,
            seller_id: 100,
            starting_price: 50_000,
            reserve_price: None,
        })
        .await
        .unwrap();
    machine::submit(&store, auction.id).await.unwrap();

    // 종료가 시작보다 빠름
    let err = machine::approve(
        &store,
        auction.id,
        now + Duration::days(2),
        now + Duration::days(1),
        now,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, EngineError::InvalidWindow));

    // 시작이 과거
    let err = machine::approve(
        &store,
        auction.id,
        now - Duration::minutes(1),
        now + Duration::days(1),
        now,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, EngineError::InvalidWindow));

    // DRAFT 상태 경매는 기간이 유효해도 승인 불가
    let draft = store
        .create_auction(NewAuction {
            listing_id: 3,
            seller_id: 100,
            starting_price: 50_000,
            reserve_price: None,
        })
        .await
        .unwrap();
    let err = machine::approve(
        &store,
        draft.id,
        now + Duration::hours(1),
        now + Duration::days(1),
        now,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, EngineError::InvalidTransition { .. }));

    // 존재하지 않는 경매
    let err = machine::approve(
        &store,
        999,
        now + Duration::hours(1),
        now + Duration::days(1),
        now,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, EngineError::AuctionNotFound { .. }));
}

/// 입찰 수락/거부 테스트 (시작가 기준)
#[tokio::test]
async fn test_place_bid_against_starting_price() {
    let store = MemoryStore::new();
    let config = EngineConfig::default();
    let now = Utc::now();
    let auction = seed_active_auction(&store, 1, 100, 100_000, now);

    // 시작가 미만 입찰은 거부
    let err = place_bid(&store, &config, bid(auction.id, 1, 95_000), now)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::BidTooLow { floor: 100_000 }));

    // 시작가와 같은 금액도 거부
    let err = place_bid(&store, &config, bid(auction.id, 1, 100_000), now)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::BidTooLow { .. }));

    // 시작가 초과 입찰은 수락
    let leader = place_bid(&store, &config, bid(auction.id, 1, 110_000), now)
        .await
        .unwrap();
    assert_eq!(leader.current_bid, 110_000);
    assert_eq!(leader.current_bidder_id, 1);
    assert_eq!(leader.bid_count, 1);
}

/// 입찰 단조 증가 테스트
/// 수락된 입찰 열에서 current_bid 는 항상 강증가하고
/// 선두는 마지막으로 수락된 입찰자와 일치한다
#[tokio::test]
async fn test_bid_monotonicity() {
    let store = MemoryStore::new();
    let config = EngineConfig::default();
    let now = Utc::now();
    let auction = seed_active_auction(&store, 1, 100, 100_000, now);

    let attempts = [
        (1, 110_000, true),
        (2, 105_000, false),
        (2, 120_000, true),
        (3, 120_000, false),
        (3, 130_000, true),
    ];

    let mut last_accepted_bid = 0;
    for (bidder_id, amount, should_accept) in attempts {
        let result = place_bid(&store, &config, bid(auction.id, bidder_id, amount), now).await;
        if should_accept {
            let leader = result.unwrap();
            assert!(leader.current_bid > last_accepted_bid);
            assert_eq!(leader.current_bid, amount);
            assert_eq!(leader.current_bidder_id, bidder_id);
            last_accepted_bid = amount;
        } else {
            assert!(matches!(result.unwrap_err(), EngineError::BidTooLow { .. }));
        }
    }

    let final_auction = store.get_auction(auction.id).await.unwrap().unwrap();
    assert_eq!(final_auction.current_bid, Some(130_000));
    assert_eq!(final_auction.current_bidder_id, Some(3));
    assert_eq!(final_auction.bid_count, 3);

    // 입찰 원장에는 수락된 입찰만 기록
    let bids = store.bids_for_auction(auction.id).await.unwrap();
    assert_eq!(bids.len(), 3);
}

/// 경매 기간 밖 입찰 거부 테스트
#[tokio::test]
async fn test_bid_outside_window_rejected() {
    let store = MemoryStore::new();
    let config = EngineConfig::default();
    let now = Utc::now();

    // 시작 전
    let mut not_started = seed_active_auction(&store, 1, 100, 100_000, now);
    not_started.start_time = Some(now + Duration::hours(1));
    store.put_auction(not_started.clone());
    let err = place_bid(&store, &config, bid(not_started.id, 1, 110_000), now)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::AuctionNotActive { .. }));

    // 종료 후
    let mut ended = seed_active_auction(&store, 2, 100, 100_000, now);
    ended.end_time = Some(now - Duration::minutes(1));
    store.put_auction(ended.clone());
    let err = place_bid(&store, &config, bid(ended.id, 1, 110_000), now)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::AuctionNotActive { .. }));

    // ACTIVE 가 아닌 상태
    let mut draft = seed_active_auction(&store, 3, 100, 100_000, now);
    draft.status = status::DRAFT.to_string();
    store.put_auction(draft.clone());
    let err = place_bid(&store, &config, bid(draft.id, 1, 110_000), now)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::AuctionNotActive { .. }));

    // 존재하지 않는 경매
    let err = place_bid(&store, &config, bid(999, 1, 110_000), now)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::AuctionNotFound { .. }));
}

/// 판매자 자기 입찰 규칙 테스트
#[tokio::test]
async fn test_self_bid_rule() {
    let store = MemoryStore::new();
    let now = Utc::now();
    let auction = seed_active_auction(&store, 1, 100, 100_000, now);

    // 기본 설정에서는 거부
    let config = EngineConfig::default();
    let err = place_bid(&store, &config, bid(auction.id, 100, 110_000), now)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::SelfBid));

    // 설정으로 허용 가능
    let permissive = EngineConfig {
        allow_seller_bids: true,
        ..EngineConfig::default()
    };
    let leader = place_bid(&store, &permissive, bid(auction.id, 100, 110_000), now)
        .await
        .unwrap();
    assert_eq!(leader.current_bidder_id, 100);
}

/// 경합 해소 테스트
/// 더 높은 입찰이 먼저 확정되면 낮은 입찰은 제출 시점에 유효했더라도
/// 커밋 시점 기준으로 BID_TOO_LOW 를 받는다
#[tokio::test]
async fn test_race_loser_gets_bid_too_low() {
    let store = MemoryStore::new();
    let config = EngineConfig::default();
    let now = Utc::now();
    let auction = seed_active_auction(&store, 1, 100, 100_000, now);

    let leader = place_bid(&store, &config, bid(auction.id, 2, 120_000), now)
        .await
        .unwrap();
    assert_eq!(leader.current_bidder_id, 2);

    let err = place_bid(&store, &config, bid(auction.id, 1, 110_000), now)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::BidTooLow { floor: 120_000 }));

    let final_auction = store.get_auction(auction.id).await.unwrap().unwrap();
    assert_eq!(final_auction.current_bidder_id, Some(2));
}

/// 동시성 입찰 테스트
/// 50개의 동시 입찰 중 최고액은 반드시 수락되고,
/// 수락 건수와 선두 캐시가 입찰 원장과 일치해야 한다
#[tokio::test]
async fn test_concurrent_bidding() {
    let store = Arc::new(MemoryStore::new());
    let now = Utc::now();
    let auction = seed_active_auction(&store, 1, 100, 100_000, now);

    let mut handles = vec![];
    for i in 1..=50i64 {
        let store = Arc::clone(&store);
        let amount = 100_000 + i * 1_000;
        let auction_id = auction.id;
        let handle = tokio::spawn(async move {
            let config = EngineConfig::default();
            place_bid(&*store, &config, bid(auction_id, i, amount), now).await
        });
        handles.push(handle);
    }

    let mut accepted = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => accepted += 1,
            Err(e) => assert!(matches!(e, EngineError::BidTooLow { .. })),
        }
    }

    // 최고액 입찰은 언제 실행되든 수락된다
    assert!(accepted >= 1);
    let final_auction = store.get_auction(auction.id).await.unwrap().unwrap();
    assert_eq!(final_auction.current_bid, Some(150_000));
    assert_eq!(final_auction.current_bidder_id, Some(50));
    assert_eq!(final_auction.bid_count, accepted);

    let bids = store.bids_for_auction(auction.id).await.unwrap();
    assert_eq!(bids.len(), accepted as usize);
}

/// 종료 멱등성 테스트
/// 두 번 종료해도 정산 알림은 수신자별로 정확히 1건
#[tokio::test]
async fn test_close_idempotent_settlement() {
    let store = MemoryStore::new();
    let config = EngineConfig::default();
    let now = Utc::now();
    let auction = seed_active_auction(&store, 1, 100, 100_000, now);
    place_bid(&store, &config, bid(auction.id, 1, 110_000), now)
        .await
        .unwrap();

    let first = machine::close(&store, auction.id, now).await.unwrap();
    assert!(first.newly_ended);
    assert_eq!(first.auction.status, status::ENDED);
    assert_eq!(notification_count(&store, 1, kind::AUCTION_WON), 1);
    assert_eq!(notification_count(&store, 100, kind::AUCTION_ENDED), 1);

    // 재종료는 무해한 재호출
    let second = machine::close(&store, auction.id, now).await.unwrap();
    assert!(!second.newly_ended);
    assert_eq!(notification_count(&store, 1, kind::AUCTION_WON), 1);
    assert_eq!(notification_count(&store, 100, kind::AUCTION_ENDED), 1);
}

/// 동시 종료 테스트
#[tokio::test]
async fn test_concurrent_close_single_settlement() {
    let store = Arc::new(MemoryStore::new());
    let config = EngineConfig::default();
    let now = Utc::now();
    let auction = seed_active_auction(&store, 1, 100, 100_000, now);
    place_bid(&*store, &config, bid(auction.id, 7, 125_000), now)
        .await
        .unwrap();

    let mut handles = vec![];
    for _ in 0..2 {
        let store = Arc::clone(&store);
        let auction_id = auction.id;
        handles.push(tokio::spawn(async move {
            machine::close(&*store, auction_id, now).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(notification_count(&store, 7, kind::AUCTION_WON), 1);
    assert_eq!(notification_count(&store, 100, kind::AUCTION_ENDED), 1);
}

/// 입찰 없는 경매 종료 테스트
#[tokio::test]
async fn test_close_without_bids_notifies_seller_only() {
    let store = MemoryStore::new();
    let now = Utc::now();
    let auction = seed_active_auction(&store, 1, 100, 100_000, now);

    let result = machine::close(&store, auction.id, now).await.unwrap();
    assert!(result.newly_ended);
    assert_eq!(notification_count(&store, 100, kind::AUCTION_ENDED), 1);
    assert!(store.all_notifications().iter().all(|n| n.notification_type != kind::AUCTION_WON));
}

/// 종료 불가 상태 테스트
#[tokio::test]
async fn test_close_invalid_from_draft() {
    let store = MemoryStore::new();
    let now = Utc::now();
    let auction = store
        .create_auction(NewAuction {
            listing_id: 1,
            seller_id: 100,
            starting_price: 100_000,
            reserve_price: None,
        })
        .await
        .unwrap();

    let err = machine::close(&store, auction.id, now).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidTransition { .. }));
}

/// 경매 취소 테스트
#[tokio::test]
async fn test_cancel_rules() {
    let store = MemoryStore::new();
    let config = EngineConfig::default();
    let now = Utc::now();

    // 입찰이 있는 경매는 취소 불가
    let with_bid = seed_active_auction(&store, 1, 100, 100_000, now);
    place_bid(&store, &config, bid(with_bid.id, 1, 110_000), now)
        .await
        .unwrap();
    let err = machine::cancel(&store, with_bid.id).await.unwrap_err();
    assert!(matches!(err, EngineError::HasBids { bid_count: 1 }));

    // 입찰이 없는 경매는 취소 가능
    let unbid = seed_active_auction(&store, 2, 100, 100_000, now);
    let cancelled = machine::cancel(&store, unbid.id).await.unwrap();
    assert_eq!(cancelled.status, status::CANCELLED);

    // 재취소는 무해한 재호출
    let again = machine::cancel(&store, unbid.id).await.unwrap();
    assert_eq!(again.status, status::CANCELLED);

    // 종료된 경매는 취소 불가
    let ended = seed_active_auction(&store, 3, 100, 100_000, now);
    machine::close(&store, ended.id, now).await.unwrap();
    let err = machine::cancel(&store, ended.id).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidTransition { .. }));
}
