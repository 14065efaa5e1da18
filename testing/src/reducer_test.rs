//! Given-When-Then testing utilities for reducers

#![allow(clippy::module_name_repetitions)] // ReducerTest is the natural name

use portal_core::{effect::Effect, reducer::Reducer};

/// Type alias for state assertion functions
type StateAssertion<S> = Box<dyn FnOnce(&S)>;

/// Type alias for effect assertion functions
type EffectAssertion<A> = Box<dyn FnOnce(&[Effect<A>])>;

/// Fluent API for testing reducers with Given-When-Then syntax
///
/// # Example
///
/// ```ignore
/// ReducerTest::new(NotificationReducer::default())
///     .with_env(test_environment())
///     .given_state(NotificationState::default())
///     .when_action(RouterAction::MarkAllRead)
///     .then_state(|state| assert_eq!(state.unread, 0))
///     .then_effects(assertions::assert_no_effects)
///     .run();
/// ```
pub struct ReducerTest<R, S, A, E>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    reducer: R,
    environment: Option<E>,
    initial_state: Option<S>,
    actions: Vec<A>,
    state_assertions: Vec<StateAssertion<S>>,
    effect_assertions: Vec<EffectAssertion<A>>,
}

impl<R, S, A, E> ReducerTest<R, S, A, E>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    /// Create a new reducer test with the given reducer
    #[must_use]
    pub const fn new(reducer: R) -> Self {
        Self {
            reducer,
            environment: None,
            initial_state: None,
            actions: Vec::new(),
            state_assertions: Vec::new(),
            effect_assertions: Vec::new(),
        }
    }

    /// Set the environment for the test
    #[must_use]
    pub fn with_env(mut self, env: E) -> Self {
        self.environment = Some(env);
        self
    }

    /// Set the initial state (Given)
    #[must_use]
    pub fn given_state(mut self, state: S) -> Self {
        self.initial_state = Some(state);
        self
    }

    /// Add an action to run (When)
    ///
    /// Actions run in order; effect assertions see the effects of the last one.
    #[must_use]
    pub fn when_action(mut self, action: A) -> Self {
        self.actions.push(action);
        self
    }

    /// Add an assertion about the resulting state (Then)
    #[must_use]
    pub fn then_state<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&S) + 'static,
    {
        self.state_assertions.push(Box::new(assertion));
        self
    }

    /// Add an assertion about the effects of the last action (Then)
    #[must_use]
    pub fn then_effects<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&[Effect<A>]) + 'static,
    {
        self.effect_assertions.push(Box::new(assertion));
        self
    }

    /// Run the test and execute all assertions
    ///
    /// # Panics
    ///
    /// Panics if initial state, action, or environment is not set,
    /// or if any assertion fails.
    #[allow(clippy::panic)]
    #[allow(clippy::expect_used)]
    pub fn run(self) {
        let mut state = self
            .initial_state
            .expect("Initial state must be set with given_state()");

        assert!(!self.actions.is_empty(), "At least one action must be set with when_action()");

        let env = self
            .environment
            .expect("Environment must be set with with_env()");

        let mut effects = Vec::new();
        for action in self.actions {
            effects = self.reducer.reduce(&mut state, action, &env).into_vec();
        }

        for assertion in self.state_assertions {
            assertion(&state);
        }

        for assertion in self.effect_assertions {
            assertion(&effects);
        }
    }
}

/// Helper assertions for effects
pub mod assertions {
    use portal_core::effect::Effect;

    /// Assert that there are no effects
    ///
    /// # Panics
    ///
    /// Panics if any effect other than `Effect::None` is present.
    #[allow(clippy::panic)]
    pub fn assert_no_effects<A>(effects: &[Effect<A>]) {
        assert!(
            effects.iter().all(Effect::is_none),
            "Expected no effects, but found {}",
            effects.len()
        );
    }

    /// Assert the number of effects
    ///
    /// # Panics
    ///
    /// Panics if the number of effects doesn't match expected.
    #[allow(clippy::panic)]
    pub fn assert_effects_count<A>(effects: &[Effect<A>], expected: usize) {
        assert_eq!(
            effects.len(),
            expected,
            "Expected {} effects, but found {}",
            expected,
            effects.len()
        );
    }

    /// Assert that effects contain at least one Future effect, at any nesting depth
    ///
    /// # Panics
    ///
    /// Panics if no Future effect is found.
    #[allow(clippy::panic)]
    pub fn assert_has_future_effect<A>(effects: &[Effect<A>]) {
        fn contains_future<A>(effect: &Effect<A>) -> bool {
            match effect {
                Effect::Future(_) => true,
                Effect::Parallel(inner) => inner.iter().any(contains_future),
                Effect::None => false,
            }
        }

        assert!(
            effects.iter().any(contains_future),
            "Expected at least one Future effect, but none found"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal_core::{smallvec, SmallVec};

    #[derive(Clone, Debug)]
    struct BadgeState {
        unread: u32,
    }

    #[derive(Clone, Debug)]
    enum BadgeAction {
        Received,
        Seen,
        Ping,
    }

    struct BadgeReducer;

    impl Reducer for BadgeReducer {
        type State = BadgeState;
        type Action = BadgeAction;
        type Environment = ();

        fn reduce(
            &self,
            state: &mut BadgeState,
            action: BadgeAction,
            _env: &(),
        ) -> SmallVec<[Effect<BadgeAction>; 4]> {
            match action {
                BadgeAction::Received => {
                    state.unread += 1;
                    smallvec![Effect::None]
                },
                BadgeAction::Seen => {
                    state.unread = state.unread.saturating_sub(1);
                    smallvec![Effect::None]
                },
                BadgeAction::Ping => smallvec![Effect::future(async { None })],
            }
        }
    }

    #[test]
    fn test_reducer_test_received() {
        ReducerTest::new(BadgeReducer)
            .with_env(())
            .given_state(BadgeState { unread: 0 })
            .when_action(BadgeAction::Received)
            .then_state(|state| assert_eq!(state.unread, 1))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_reducer_test_runs_actions_in_order() {
        ReducerTest::new(BadgeReducer)
            .with_env(())
            .given_state(BadgeState { unread: 0 })
            .when_action(BadgeAction::Seen)
            .when_action(BadgeAction::Received)
            .when_action(BadgeAction::Received)
            .then_state(|state| assert_eq!(state.unread, 2))
            .run();
    }

    #[test]
    fn test_future_effect_assertion() {
        ReducerTest::new(BadgeReducer)
            .with_env(())
            .given_state(BadgeState { unread: 0 })
            .when_action(BadgeAction::Ping)
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_future_effect(effects);
            })
            .run();
    }
}
