use super::*;
use crate::state::test_helpers;

fn shape_event(id: &str) -> String {
    format!(r#"{{"shape":{{"id":"{id}","type":"circle","centerX":1,"centerY":1,"radius":1}}}}"#)
}

#[test]
fn store_error_to_status_maps_not_found() {
    let err = StoreError::ShapeNotFound { room_id: RoomId::from("1"), shape_id: "a".into() };
    assert_eq!(store_error_to_status(&err), StatusCode::NOT_FOUND);
    assert_eq!(store_error_to_status(&StoreError::EmptyMessage), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn list_events_returns_room_log() {
    let state = test_helpers::test_app_state();
    state.store.append(&RoomId::from("7"), &shape_event("a")).await.unwrap();

    let Json(log) = list_events(State(state.clone()), Path("7".to_owned())).await;
    assert_eq!(log.messages.len(), 1);
    assert_eq!(frames::shape_id_of(&log.messages[0].message).as_deref(), Some("a"));

    let Json(empty) = list_events(State(state), Path("8".to_owned())).await;
    assert!(empty.messages.is_empty());
}

#[tokio::test]
async fn delete_shape_success_then_not_found() {
    let state = test_helpers::test_app_state();
    state.store.append(&RoomId::from("7"), &shape_event("a")).await.unwrap();

    let (status, Json(body)) = delete_shape(State(state.clone()), Path(("7".to_owned(), "a".to_owned()))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.success);

    let (status, Json(body)) = delete_shape(State(state.clone()), Path(("7".to_owned(), "a".to_owned()))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(!body.success);
    assert!(state.store.list(&RoomId::from("7")).await.messages.is_empty());
}
