//! Session lifecycle events.
//!
//! The pipeline never navigates on its own. Hosts receive events through a
//! [`SessionHandler`] and decide what a redirect means for them.

use std::sync::atomic::{AtomicBool, Ordering};

/// Something the host should react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A refresh stored a new credential.
    Refreshed,
    /// The session died. The credential is already cleared; the host should
    /// navigate to `login_path`.
    Expired { login_path: String },
}

/// Receives [`SessionEvent`]s from an [`AuthClient`](crate::AuthClient).
pub trait SessionHandler: Send + Sync {
    fn handle(&self, event: &SessionEvent);
}

impl<F> SessionHandler for F
where
    F: Fn(&SessionEvent) + Send + Sync,
{
    fn handle(&self, event: &SessionEvent) {
        self(event)
    }
}

/// Ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSessionHandler;

impl SessionHandler for NoopSessionHandler {
    fn handle(&self, _event: &SessionEvent) {}
}

/// Fires the expiry event at most once per live session.
#[derive(Debug)]
pub(crate) struct SessionLatch {
    live: AtomicBool,
}

impl SessionLatch {
    pub(crate) fn new() -> Self {
        Self {
            live: AtomicBool::new(true),
        }
    }

    /// Marks a new session as live.
    pub(crate) fn arm(&self) {
        self.live.store(true, Ordering::Release);
    }

    /// Returns true only for the first caller after the session was armed.
    pub(crate) fn trip(&self) -> bool {
        self.live.swap(false, Ordering::AcqRel)
    }
}
