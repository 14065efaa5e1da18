//! Integration tests for the foreground message router.

#![allow(clippy::unwrap_used)]

use portal_push::mocks::{MockPushProvider, RecordingNavigator, RecordingNotifier};
use portal_push::{
    ClickRoute, ForegroundRouter, NotificationState, PushError, PushMessage, RouterAction,
    RouterEnvironment,
};
use portal_testing::{init_test_tracing, test_clock, FixedClock};
use std::time::Duration;

type TestRouter = ForegroundRouter<FixedClock, RecordingNotifier, RecordingNavigator>;

fn router(notifier: RecordingNotifier, navigator: RecordingNavigator) -> TestRouter {
    ForegroundRouter::new(RouterEnvironment::new(test_clock(), notifier, navigator))
}

async fn wait_for_state<F>(router: &TestRouter, predicate: F) -> NotificationState
where
    F: Fn(&NotificationState) -> bool,
{
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            let state = router.snapshot().await;
            if predicate(&state) {
                return state;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap()
}

#[tokio::test]
async fn test_subscribed_message_becomes_unread_record() {
    init_test_tracing();
    let notifier = RecordingNotifier::new();
    let router = router(notifier.clone(), RecordingNavigator::new());
    let provider = MockPushProvider::new();
    let subscription = router.subscribe(&provider);
    assert!(subscription.is_active());

    assert_eq!(provider.push_message(PushMessage::new("m1", "T", "B")), 1);

    let state = wait_for_state(&router, |s| s.unread == 1).await;
    assert_eq!(state.records.len(), 1);
    let record = &state.records[0];
    assert_eq!(record.message_id, "m1");
    assert_eq!(record.title, "T");
    assert_eq!(record.body, "B");
    assert!(!record.read);
}

#[tokio::test]
async fn test_message_without_notification_is_dropped() {
    let router = router(RecordingNotifier::new(), RecordingNavigator::new());
    let provider = MockPushProvider::new();
    let _subscription = router.subscribe(&provider);

    provider.push_message(PushMessage::data_only("m-data").with_data("kind", "sync"));
    provider.push_message(PushMessage::new("m2", "T", "B"));

    // Messages are forwarded in order, so m-data has been handled once m2 shows up
    let state = wait_for_state(&router, |s| s.unread >= 1).await;
    assert_eq!(state.unread, 1);
    assert_eq!(state.records.len(), 1);
    assert_eq!(state.records[0].message_id, "m2");
}

#[tokio::test]
async fn test_received_message_is_displayed() {
    let notifier = RecordingNotifier::new();
    let router = router(notifier.clone(), RecordingNavigator::new());

    let mut handle = router
        .send(RouterAction::MessageReceived(PushMessage::new("m1", "Dues", "Renewal is open")))
        .await
        .unwrap();
    handle.wait().await;

    let toasts = notifier.toasts().unwrap();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].title, "Dues");
    assert_eq!(notifier.notifications().unwrap(), toasts);
}

#[tokio::test]
async fn test_room_click_is_not_routed() {
    init_test_tracing();
    let navigator = RecordingNavigator::new();
    let router = router(RecordingNotifier::new(), navigator.clone());

    let message = PushMessage::new("m1", "New message", "Hi").with_data("roomId", "room-7");
    router
        .send(RouterAction::MessageReceived(message))
        .await
        .unwrap();
    router.click("m1").await.unwrap().wait().await;

    let state = router.snapshot().await;
    assert_eq!(state.unread, 0);
    assert_eq!(
        state.last_route,
        Some(ClickRoute::Conversation {
            room_id: "room-7".into()
        })
    );
    assert!(matches!(
        state.last_route_error,
        Some(PushError::RouteNotImplemented { .. })
    ));
    assert!(navigator.routes().unwrap().is_empty());
}

#[tokio::test]
async fn test_click_navigates_to_notifications_list() {
    let navigator = RecordingNavigator::new();
    let router = router(RecordingNotifier::new(), navigator.clone());

    router
        .send(RouterAction::MessageReceived(PushMessage::new("m1", "T", "B")))
        .await
        .unwrap();
    router.click("m1").await.unwrap().wait().await;

    assert_eq!(navigator.routes().unwrap(), vec!["/notifications".to_string()]);
    let state = router.snapshot().await;
    assert!(state.records[0].read);
    assert_eq!(state.last_route_error, None);
}

#[tokio::test]
async fn test_click_uses_configured_route() {
    let navigator = RecordingNavigator::new();
    let router: TestRouter = ForegroundRouter::new(
        RouterEnvironment::new(test_clock(), RecordingNotifier::new(), navigator.clone())
            .with_notifications_route("/member/inbox"),
    );

    router.click("unknown").await.unwrap().wait().await;

    assert_eq!(navigator.routes().unwrap(), vec!["/member/inbox".to_string()]);
}

#[tokio::test]
async fn test_navigation_failure_is_recorded() {
    let router = router(RecordingNotifier::new(), RecordingNavigator::failing());

    router
        .send(RouterAction::MessageReceived(PushMessage::new("m1", "T", "B")))
        .await
        .unwrap();
    router.click("m1").await.unwrap().wait().await;

    let state = router.snapshot().await;
    assert!(matches!(
        state.last_route_error,
        Some(PushError::NavigationFailed(_))
    ));
}

#[tokio::test]
async fn test_unsubscribe_stops_forwarding() {
    let router = router(RecordingNotifier::new(), RecordingNavigator::new());
    let provider = MockPushProvider::new();
    let subscription = router.subscribe(&provider);

    provider.push_message(PushMessage::new("m1", "T", "B"));
    wait_for_state(&router, |s| s.unread == 1).await;

    subscription.unsubscribe();
    tokio::time::sleep(Duration::from_millis(50)).await;

    provider.push_message(PushMessage::new("m2", "T", "B"));
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(router.unread().await, 1);
}

#[tokio::test]
async fn test_dropped_subscription_stops_forwarding() {
    let router = router(RecordingNotifier::new(), RecordingNavigator::new());
    let provider = MockPushProvider::new();

    {
        let _subscription = router.subscribe(&provider);
    }
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(provider.push_message(PushMessage::new("m1", "T", "B")), 0);
    assert_eq!(router.unread().await, 0);
}

#[tokio::test]
async fn test_clones_share_notification_state() {
    let router = router(RecordingNotifier::new(), RecordingNavigator::new());
    let other = router.clone();

    router
        .send(RouterAction::MessageReceived(PushMessage::new("m1", "T", "B")))
        .await
        .unwrap();
    assert_eq!(other.unread().await, 1);

    other.clear().await;
    assert_eq!(router.snapshot().await, NotificationState::default());
}
