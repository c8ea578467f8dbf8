#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use eos_auth_harness::auth::{AuthError, AuthSession};
use eos_auth_harness::backend::{SimulatedBackend, SimulatedBehavior};

/// Records every outcome delivered to a callback.
#[derive(Clone, Default)]
pub struct OutcomeLog {
    outcomes: Rc<RefCell<Vec<Result<(), AuthError>>>>,
}

impl OutcomeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn callback(&self) -> impl FnOnce(Result<(), AuthError>) + 'static {
        let outcomes = self.outcomes.clone();
        move |outcome| outcomes.borrow_mut().push(outcome)
    }

    pub fn outcomes(&self) -> Vec<Result<(), AuthError>> {
        self.outcomes.borrow().clone()
    }

    pub fn count(&self) -> usize {
        self.outcomes.borrow().len()
    }
}

pub fn session(behavior: SimulatedBehavior) -> (Rc<SimulatedBackend>, AuthSession) {
    let backend = Rc::new(SimulatedBackend::with_behavior(behavior));
    let session = AuthSession::new(backend.clone());
    (backend, session)
}

pub fn initialized_session(behavior: SimulatedBehavior) -> (Rc<SimulatedBackend>, AuthSession) {
    let (backend, mut session) = session(behavior);
    session
        .initialize("p", "s", "d")
        .expect("simulated platform should initialize");
    (backend, session)
}

/// Ticks until `log` has an entry or `max_ticks` is reached.
pub fn tick_until_done(session: &AuthSession, log: &OutcomeLog, max_ticks: usize) -> usize {
    let mut ticks = 0;
    while log.count() == 0 && ticks < max_ticks {
        session.tick();
        ticks += 1;
    }
    ticks
}
