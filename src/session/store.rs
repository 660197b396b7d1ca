use std::collections::HashMap;

use crate::models::Counter;
use crate::session::GoalSetup;

/// What a user is in the middle of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Session {
    Setup(GoalSetup),
    AwaitingAmount(Counter),
    ConfirmWipe,
}

/// In-memory conversation state keyed by user id. One session per user;
/// starting a new one replaces the old.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: HashMap<String, Session>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, user: &str, session: Session) {
        self.sessions.insert(user.to_string(), session);
    }

    pub fn get(&self, user: &str) -> Option<&Session> {
        self.sessions.get(user)
    }

    pub fn take(&mut self, user: &str) -> Option<Session> {
        self.sessions.remove(user)
    }

    pub fn clear(&mut self, user: &str) -> bool {
        self.sessions.remove(user).is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Goals;

    #[test]
    fn sessions_are_per_user() {
        let mut store = SessionStore::new();
        store.begin("a", Session::AwaitingAmount(Counter::Dhikr));
        store.begin("b", Session::ConfirmWipe);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("a"), Some(&Session::AwaitingAmount(Counter::Dhikr)));

        store.begin("a", Session::Setup(GoalSetup::new(Goals::default())));
        assert!(matches!(store.get("a"), Some(Session::Setup(_))));
        assert_eq!(store.len(), 2);

        assert!(store.clear("b"));
        assert!(!store.clear("b"));
        assert!(store.take("a").is_some());
        assert!(store.is_empty());
    }
}
