//! Foreground notification reducer.
//!
//! Owns the in-memory notification list and the unread badge. Display and
//! navigation are effects executed through the injected [`Notifier`] and
//! [`Navigator`].

use super::{ClickRoute, NotificationRecord};
use crate::error::PushError;
use crate::message::PushMessage;
use crate::providers::{Navigator, Notifier};
use portal_core::effect::Effect;
use portal_core::environment::Clock;
use portal_core::reducer::Reducer;
use portal_core::{smallvec, SmallVec};
use std::marker::PhantomData;

/// Notification list and routing outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationState {
    /// Received notifications, oldest first.
    pub records: Vec<NotificationRecord>,
    /// Number of unread records.
    pub unread: usize,
    /// Route computed for the last click.
    pub last_route: Option<ClickRoute>,
    /// Why the last click did not navigate.
    pub last_route_error: Option<PushError>,
}

impl NotificationState {
    /// Find a record by message id.
    #[must_use]
    pub fn record(&self, message_id: &str) -> Option<&NotificationRecord> {
        self.records.iter().find(|r| r.message_id == message_id)
    }

    fn mark_read(&mut self, message_id: &str) -> bool {
        let Some(record) = self
            .records
            .iter_mut()
            .find(|r| r.message_id == message_id)
        else {
            return false;
        };
        if !record.read {
            record.read = true;
            self.unread = self.unread.saturating_sub(1);
        }
        true
    }
}

/// Router actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouterAction {
    /// A message arrived while the app is in the foreground.
    MessageReceived(PushMessage),
    /// The user clicked a platform notification.
    NotificationClicked {
        /// Message the notification was raised for.
        message_id: String,
    },
    /// Mark one notification as read.
    MarkRead {
        /// Message to mark.
        message_id: String,
    },
    /// Mark every notification as read.
    MarkAllRead,
    /// Drop all notifications.
    Clear,
    /// The navigator could not open a route.
    NavigationFailed {
        /// Route that failed.
        route: String,
        /// Failure.
        error: PushError,
    },
}

/// Collaborators of the notification reducer.
#[derive(Debug, Clone)]
pub struct RouterEnvironment<C, N, V> {
    /// Timestamps records.
    pub clock: C,
    /// Shows toasts and platform notifications.
    pub notifier: N,
    /// Opens in-app routes.
    pub navigator: V,
    /// Route of the notifications list.
    pub notifications_route: String,
}

impl<C, N, V> RouterEnvironment<C, N, V> {
    /// Create an environment navigating to the default notifications route.
    #[must_use]
    pub fn new(clock: C, notifier: N, navigator: V) -> Self {
        Self {
            clock,
            notifier,
            navigator,
            notifications_route: crate::config::DEFAULT_NOTIFICATIONS_ROUTE.to_string(),
        }
    }

    /// Set the notifications list route.
    #[must_use]
    pub fn with_notifications_route(mut self, route: impl Into<String>) -> Self {
        self.notifications_route = route.into();
        self
    }
}

/// Reducer for [`NotificationState`].
#[derive(Debug)]
pub struct NotificationReducer<C, N, V> {
    _env: PhantomData<fn() -> (C, N, V)>,
}

impl<C, N, V> NotificationReducer<C, N, V> {
    /// Create the reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self { _env: PhantomData }
    }
}

impl<C, N, V> Default for NotificationReducer<C, N, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C, N, V> Clone for NotificationReducer<C, N, V> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<C, N, V> Reducer for NotificationReducer<C, N, V>
where
    C: Clock + Clone + 'static,
    N: Notifier + Clone + 'static,
    V: Navigator + Clone + 'static,
{
    type State = NotificationState;
    type Action = RouterAction;
    type Environment = RouterEnvironment<C, N, V>;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ═══════════════════════════════════════════════════════════════
            // Incoming messages
            // ═══════════════════════════════════════════════════════════════
            RouterAction::MessageReceived(message) => {
                let Some((title, body)) = message.displayable() else {
                    metrics::counter!("notifications.dropped").increment(1);
                    tracing::debug!(message_id = %message.message_id, "Dropped message without title or body");
                    return smallvec![Effect::None];
                };

                // Messages without an id cannot be matched to a redelivery
                if !message.message_id.is_empty() && state.record(&message.message_id).is_some() {
                    tracing::debug!(message_id = %message.message_id, "Ignored redelivered message");
                    return smallvec![Effect::None];
                }

                let record = NotificationRecord {
                    message_id: message.message_id.clone(),
                    from: message.from.clone(),
                    title: title.to_string(),
                    body: body.to_string(),
                    read: false,
                    timestamp: env.clock.now(),
                    data: message.data,
                };
                state.records.push(record.clone());
                state.unread += 1;

                metrics::counter!("notifications.received").increment(1);
                tracing::debug!(message_id = %record.message_id, unread = state.unread, "Notification received");

                let notifier = env.notifier.clone();
                smallvec![Effect::future(async move {
                    notifier.show_toast(&record);
                    if let Err(error) = notifier.show_notification(&record) {
                        tracing::warn!(message_id = %record.message_id, error = %error, "Could not show notification");
                    }
                    None
                })]
            },

            // ═══════════════════════════════════════════════════════════════
            // Clicks
            // ═══════════════════════════════════════════════════════════════
            RouterAction::NotificationClicked { message_id } => {
                state.mark_read(&message_id);

                let route = state
                    .record(&message_id)
                    .map_or(ClickRoute::NotificationsList, |r| ClickRoute::from_data(&r.data));
                state.last_route = Some(route.clone());

                match route {
                    ClickRoute::Conversation { room_id } => {
                        tracing::warn!(%message_id, %room_id, "Conversation routing is not implemented");
                        state.last_route_error = Some(PushError::RouteNotImplemented {
                            route: format!("conversation {room_id}"),
                        });
                        smallvec![Effect::None]
                    },
                    ClickRoute::NotificationsList => {
                        state.last_route_error = None;
                        let navigator = env.navigator.clone();
                        let path = env.notifications_route.clone();
                        smallvec![Effect::future(async move {
                            match navigator.navigate(&path) {
                                Ok(()) => None,
                                Err(error) => Some(RouterAction::NavigationFailed { route: path, error }),
                            }
                        })]
                    },
                }
            },

            RouterAction::NavigationFailed { route, error } => {
                tracing::warn!(%route, error = %error, "Notification navigation failed");
                state.last_route_error = Some(error);
                smallvec![Effect::None]
            },

            // ═══════════════════════════════════════════════════════════════
            // Housekeeping
            // ═══════════════════════════════════════════════════════════════
            RouterAction::MarkRead { message_id } => {
                state.mark_read(&message_id);
                smallvec![Effect::None]
            },

            RouterAction::MarkAllRead => {
                for record in &mut state.records {
                    record.read = true;
                }
                state.unread = 0;
                smallvec![Effect::None]
            },

            RouterAction::Clear => {
                *state = NotificationState::default();
                smallvec![Effect::None]
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{RecordingNavigator, RecordingNotifier};
    use portal_testing::{assertions, test_clock, FixedClock, ReducerTest};

    type TestReducer = NotificationReducer<FixedClock, RecordingNotifier, RecordingNavigator>;

    fn env() -> RouterEnvironment<FixedClock, RecordingNotifier, RecordingNavigator> {
        RouterEnvironment::new(test_clock(), RecordingNotifier::new(), RecordingNavigator::new())
    }

    fn received(id: &str) -> RouterAction {
        RouterAction::MessageReceived(PushMessage::new(id, "T", "B"))
    }

    #[test]
    fn test_message_appends_unread_record() {
        ReducerTest::new(TestReducer::new())
            .with_env(env())
            .given_state(NotificationState::default())
            .when_action(received("m1"))
            .then_state(|state| {
                assert_eq!(state.records.len(), 1);
                assert_eq!(state.unread, 1);
                let record = &state.records[0];
                assert!(!record.read);
                assert_eq!(record.title, "T");
                assert_eq!(record.body, "B");
                assert_eq!(record.timestamp, test_clock().now());
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_future_effect(effects);
            })
            .run();
    }

    #[test]
    fn test_data_only_message_is_dropped() {
        ReducerTest::new(TestReducer::new())
            .with_env(env())
            .given_state(NotificationState::default())
            .when_action(RouterAction::MessageReceived(PushMessage::data_only("m2")))
            .then_state(|state| {
                assert!(state.records.is_empty());
                assert_eq!(state.unread, 0);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_redelivery_is_ignored() {
        ReducerTest::new(TestReducer::new())
            .with_env(env())
            .given_state(NotificationState::default())
            .when_action(received("m1"))
            .when_action(received("m1"))
            .then_state(|state| assert_eq!(state.unread, 1))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_messages_without_id_are_all_kept() {
        ReducerTest::new(TestReducer::new())
            .with_env(env())
            .given_state(NotificationState::default())
            .when_action(received(""))
            .when_action(received(""))
            .then_state(|state| {
                assert_eq!(state.records.len(), 2);
                assert_eq!(state.unread, 2);
            })
            .then_effects(|effects| assertions::assert_effects_count(effects, 1))
            .run();
    }

    #[test]
    fn test_room_click_is_not_implemented() {
        let message = PushMessage::new("m1", "T", "B").with_data("roomId", "r-9");
        ReducerTest::new(TestReducer::new())
            .with_env(env())
            .given_state(NotificationState::default())
            .when_action(RouterAction::MessageReceived(message))
            .when_action(RouterAction::NotificationClicked {
                message_id: "m1".into(),
            })
            .then_state(|state| {
                assert_eq!(state.unread, 0);
                assert_eq!(
                    state.last_route,
                    Some(ClickRoute::Conversation {
                        room_id: "r-9".into()
                    })
                );
                assert!(matches!(
                    state.last_route_error,
                    Some(PushError::RouteNotImplemented { .. })
                ));
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_list_click_navigates() {
        ReducerTest::new(TestReducer::new())
            .with_env(env())
            .given_state(NotificationState::default())
            .when_action(received("m1"))
            .when_action(RouterAction::NotificationClicked {
                message_id: "m1".into(),
            })
            .then_state(|state| {
                assert_eq!(state.last_route, Some(ClickRoute::NotificationsList));
                assert!(state.records[0].read);
            })
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    #[test]
    fn test_unread_never_underflows() {
        ReducerTest::new(TestReducer::new())
            .with_env(env())
            .given_state(NotificationState::default())
            .when_action(received("m1"))
            .when_action(RouterAction::MarkRead {
                message_id: "m1".into(),
            })
            .when_action(RouterAction::MarkRead {
                message_id: "m1".into(),
            })
            .when_action(RouterAction::MarkRead {
                message_id: "missing".into(),
            })
            .then_state(|state| assert_eq!(state.unread, 0))
            .run();
    }

    #[test]
    fn test_mark_all_read_and_clear() {
        ReducerTest::new(TestReducer::new())
            .with_env(env())
            .given_state(NotificationState::default())
            .when_action(received("m1"))
            .when_action(received("m2"))
            .when_action(RouterAction::MarkAllRead)
            .then_state(|state| {
                assert_eq!(state.unread, 0);
                assert!(state.records.iter().all(|r| r.read));
            })
            .run();

        ReducerTest::new(TestReducer::new())
            .with_env(env())
            .given_state(NotificationState::default())
            .when_action(received("m1"))
            .when_action(RouterAction::Clear)
            .then_state(|state| assert_eq!(*state, NotificationState::default()))
            .run();
    }
}
