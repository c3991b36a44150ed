//! A generic, re-entrant finite state machine engine.
//!
//! States are plain `usize` indices; the engine itself holds no behavior.
//! Behavior lives in an implementor of [`Actions`], passed to
//! [`Engine::do_transition`] / [`Engine::evaluate_state`] as a separate
//! argument rather than stored inside the engine — this sidesteps the
//! aliasing problem of an engine that owns closures which themselves need
//! to call back into the engine.
//!
//! Transitions requested from within [`Actions::on_entry`] or
//! [`Actions::on_exit`] are deferred and drained by the same
//! `do_transition`/`evaluate_state` call that triggered them (run-to-
//! completion): a caller never observes an intermediate state mid-chain.

#![cfg_attr(not(feature = "std"), no_std)]

/// Behavior attached to a state machine's states.
///
/// All methods default to doing nothing, so an implementor only overrides
/// the triggers it cares about. `state` is the id the trigger fires for;
/// `engine` is passed back so an action can call [`Engine::transition`] to
/// request a further move.
pub trait Actions {
    /// Fires after `engine`'s current state becomes `state`.
    fn on_entry(&mut self, engine: &mut Engine, state: usize) {
        let _ = (engine, state);
    }

    /// Fires before `engine` leaves `state`.
    fn on_exit(&mut self, engine: &mut Engine, state: usize) {
        let _ = (engine, state);
    }

    /// Fires on demand for the current state via [`Engine::evaluate_state`].
    fn on_evaluate(&mut self, engine: &mut Engine, state: usize) {
        let _ = (engine, state);
    }
}

/// A finite state machine with deferred, chained transitions.
///
/// The sentinel "no state yet" value is `num_states` itself, matching
/// [`Engine::cur_state`] before the first effective transition.
#[derive(Debug, Clone)]
pub struct Engine {
    current: usize,
    pending: Option<usize>,
    num_states: usize,
}

impl Engine {
    /// Creates an engine over `num_states` states, starting in the
    /// sentinel "no state" position.
    #[must_use]
    pub fn new(num_states: usize) -> Self {
        Self { current: num_states, pending: None, num_states }
    }

    /// Resets the engine to a fresh table of `num_states` states.
    pub fn init_states(&mut self, num_states: usize) {
        self.num_states = num_states;
        self.current = num_states;
        self.pending = None;
    }

    /// The state the engine currently occupies, or `num_states` if no
    /// transition has fired yet.
    #[must_use]
    pub fn cur_state(&self) -> usize {
        self.current
    }

    /// The number of states this engine was initialized with.
    #[must_use]
    pub fn num_states(&self) -> usize {
        self.num_states
    }

    /// Whether a transition is queued but not yet applied.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Requests a move to `new_state`. Does not apply immediately: the next
    /// call to [`Engine::do_transition`] (or the transition-drain phase of
    /// [`Engine::evaluate_state`]) performs it.
    pub fn transition(&mut self, new_state: usize) {
        self.pending = Some(new_state);
    }

    /// Applies at most one pending transition chain: fires `on_exit` on the
    /// old state (if any), moves `cur_state`, fires `on_entry` on the new
    /// state, and repeats as long as the handlers keep requesting further
    /// transitions. Returns `true` iff at least one transition fired.
    pub fn do_transition<A: Actions>(&mut self, actions: &mut A) -> bool {
        let mut fired = false;
        while let Some(next) = self.pending.take() {
            fired = true;
            let prev = self.current;
            if prev != self.num_states {
                actions.on_exit(self, prev);
            }
            self.current = next;
            actions.on_entry(self, next);
        }
        fired
    }

    /// Fires `on_evaluate` once on the current state, then drains any
    /// transition chain the evaluate handler (or its resulting entry/exit
    /// handlers) requested.
    pub fn evaluate_state<A: Actions>(&mut self, actions: &mut A) {
        if self.current != self.num_states {
            actions.on_evaluate(self, self.current);
        }
        self.do_transition(actions);
    }
}

#[cfg(test)]
mod tests {
    use super::{Actions, Engine};

    const A: usize = 0;
    const B: usize = 1;
    const C: usize = 2;

    // Test binaries always link std regardless of the crate's own
    // `no_std` gate, so plain `std::vec::Vec` is fine here.
    #[derive(Default)]
    struct Log {
        events: std::vec::Vec<&'static str>,
    }

    impl Actions for Log {
        fn on_entry(&mut self, _engine: &mut Engine, state: usize) {
            self.events.push(match state {
                A => "enter:a",
                B => "enter:b",
                C => "enter:c",
                _ => "enter:?",
            });
        }

        fn on_exit(&mut self, _engine: &mut Engine, state: usize) {
            self.events.push(match state {
                A => "exit:a",
                B => "exit:b",
                C => "exit:c",
                _ => "exit:?",
            });
        }
    }

    #[test]
    fn starts_at_sentinel() {
        let engine = Engine::new(3);
        assert_eq!(engine.cur_state(), 3);
        assert!(!engine.has_pending());
    }

    #[test]
    fn single_transition_fires_entry_only_first_time() {
        let mut engine = Engine::new(3);
        let mut log = Log::default();
        engine.transition(A);
        assert!(engine.do_transition(&mut log));
        assert_eq!(engine.cur_state(), A);
        assert_eq!(log.events, vec!["enter:a"]);
    }

    /// Property 8: a chain of transitions requested from entry/exit handlers
    /// is fully drained before `do_transition` returns; no observer of the
    /// *result* ever sees a `pending` chain mid-flight.
    #[test]
    fn chained_transitions_run_to_completion() {
        struct Chainer {
            log: Log,
        }

        impl Actions for Chainer {
            fn on_entry(&mut self, engine: &mut Engine, state: usize) {
                self.log.on_entry(engine, state);
                if state == A {
                    engine.transition(B);
                } else if state == B {
                    engine.transition(C);
                }
            }

            fn on_exit(&mut self, engine: &mut Engine, state: usize) {
                self.log.on_exit(engine, state);
            }
        }

        let mut engine = Engine::new(3);
        let mut actions = Chainer { log: Log::default() };
        engine.transition(A);
        let fired = engine.do_transition(&mut actions);

        assert!(fired);
        assert_eq!(engine.cur_state(), C);
        assert!(!engine.has_pending());
        assert_eq!(
            actions.log.events,
            vec!["enter:a", "exit:a", "enter:b", "exit:b", "enter:c"]
        );
    }

    #[test]
    fn evaluate_drains_transition_requested_during_evaluate() {
        struct Evaluator {
            log: Log,
        }

        impl Actions for Evaluator {
            fn on_entry(&mut self, engine: &mut Engine, state: usize) {
                self.log.on_entry(engine, state);
            }

            fn on_evaluate(&mut self, engine: &mut Engine, state: usize) {
                self.log.events.push("evaluate");
                if state == A {
                    engine.transition(B);
                }
            }
        }

        let mut engine = Engine::new(3);
        let mut actions = Evaluator { log: Log::default() };
        engine.transition(A);
        engine.do_transition(&mut actions);
        actions.log.events.clear();

        engine.evaluate_state(&mut actions);

        assert_eq!(engine.cur_state(), B);
        assert_eq!(actions.log.events, vec!["evaluate", "enter:b"]);
    }

    #[test]
    fn do_transition_returns_false_when_nothing_pending() {
        let mut engine = Engine::new(2);
        let mut log = Log::default();
        assert!(!engine.do_transition(&mut log));
        assert!(log.events.is_empty());
    }
}
