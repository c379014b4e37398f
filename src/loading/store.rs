use tokio::sync::watch;

use crate::loading::reducer::{reduce, LoadingAction, LoadingState};

/// Process-wide holder of the current [`LoadingState`]
///
/// Each dispatch replaces the state with a freshly reduced value. Readers
/// either poll `current` or hold a receiver from `subscribe`, which wakes
/// only when the value actually changes.
pub struct LoadingStore {
    sender: watch::Sender<LoadingState>,
}

impl LoadingStore {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(LoadingState::default());
        Self { sender }
    }

    pub fn current(&self) -> LoadingState {
        *self.sender.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<LoadingState> {
        self.sender.subscribe()
    }

    /// Apply an action and return the resulting state
    pub fn dispatch(&self, action: impl Into<LoadingAction>) -> LoadingState {
        let action = action.into();
        let mut next = LoadingState::default();

        self.sender.send_if_modified(|state| {
            next = reduce(*state, action);
            if next == *state {
                return false;
            }
            *state = next;
            true
        });

        tracing::debug!("Dispatched {:?}, loading={}", action, next.loading);
        next
    }
}

impl Default for LoadingStore {
    fn default() -> Self {
        Self::new()
    }
}
