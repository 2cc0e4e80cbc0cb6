use super::*;
use crate::state::test_helpers;
use tokio::time::{Duration, timeout};

fn room(id: &str) -> RoomId {
    RoomId::from(id)
}

fn chat(message: &str) -> RelayMessage {
    RelayMessage::Chat { room_id: Some(room("1")), message: message.to_owned() }
}

async fn assert_channel_has_message(rx: &mut mpsc::Receiver<RelayMessage>) -> RelayMessage {
    timeout(Duration::from_millis(200), rx.recv())
        .await
        .expect("message receive timed out")
        .expect("channel closed")
}

async fn assert_channel_empty(rx: &mut mpsc::Receiver<RelayMessage>) {
    assert!(
        timeout(Duration::from_millis(80), rx.recv()).await.is_err(),
        "expected channel to remain empty"
    );
}

#[tokio::test]
async fn broadcast_sends_to_all_except_excluded_client() {
    let state = test_helpers::test_app_state();
    let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
    let (tx_a, mut rx_a) = mpsc::channel(8);
    let (tx_b, mut rx_b) = mpsc::channel(8);
    let (tx_c, mut rx_c) = mpsc::channel(8);
    state.join(&room("1"), a, tx_a).await;
    state.join(&room("1"), b, tx_b).await;
    state.join(&room("1"), c, tx_c).await;

    let delivered = state.broadcast(&room("1"), &chat("hi"), Some(b)).await;
    assert_eq!(delivered, 2);
    assert_eq!(assert_channel_has_message(&mut rx_a).await, chat("hi"));
    assert_eq!(assert_channel_has_message(&mut rx_c).await, chat("hi"));
    assert_channel_empty(&mut rx_b).await;
}

#[tokio::test]
async fn broadcast_is_scoped_to_room() {
    let state = test_helpers::test_app_state();
    let (tx_a, mut rx_a) = mpsc::channel(8);
    let (tx_b, mut rx_b) = mpsc::channel(8);
    state.join(&room("1"), Uuid::new_v4(), tx_a).await;
    state.join(&room("2"), Uuid::new_v4(), tx_b).await;

    state.broadcast(&room("1"), &chat("one"), None).await;
    assert_eq!(assert_channel_has_message(&mut rx_a).await, chat("one"));
    assert_channel_empty(&mut rx_b).await;
}

#[tokio::test]
async fn broadcast_to_unknown_room_is_noop() {
    let state = test_helpers::test_app_state();
    assert_eq!(state.broadcast(&room("ghost"), &chat("x"), None).await, 0);
}

#[tokio::test]
async fn full_peer_channel_is_skipped() {
    let state = test_helpers::test_app_state();
    let (tx_slow, _rx_slow) = mpsc::channel(1);
    let (tx_fast, mut rx_fast) = mpsc::channel(8);
    state.join(&room("1"), Uuid::new_v4(), tx_slow).await;
    state.join(&room("1"), Uuid::new_v4(), tx_fast).await;

    assert_eq!(state.broadcast(&room("1"), &chat("first"), None).await, 2);
    assert_eq!(state.broadcast(&room("1"), &chat("second"), None).await, 1);
    assert_eq!(assert_channel_has_message(&mut rx_fast).await, chat("first"));
    assert_eq!(assert_channel_has_message(&mut rx_fast).await, chat("second"));
}

#[tokio::test]
async fn part_removes_client_and_evicts_empty_room() {
    let state = test_helpers::test_app_state();
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
    let (tx_a, _rx_a) = mpsc::channel(8);
    let (tx_b, _rx_b) = mpsc::channel(8);
    state.join(&room("1"), a, tx_a).await;
    state.join(&room("1"), b, tx_b).await;

    state.part(&room("1"), a).await;
    assert_eq!(state.member_count(&room("1")).await, 1);

    state.part(&room("1"), b).await;
    assert_eq!(state.member_count(&room("1")).await, 0);
    assert!(!state.rooms.read().await.contains_key(&room("1")));
}
