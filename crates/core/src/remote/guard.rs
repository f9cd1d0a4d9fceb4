//! Scoped ownership of a remote session.

use std::ops::{Deref, DerefMut};
use tracing::debug;

use super::traits::RemoteSession;

/// Owns a session for the length of a run and closes it when dropped.
///
/// Early returns, `?` propagation, panics, and a cancelled run future all
/// close the session.
pub struct SessionGuard<S: RemoteSession> {
    session: S,
    released: bool,
}

impl<S: RemoteSession> SessionGuard<S> {
    pub fn new(session: S) -> Self {
        Self {
            session,
            released: false,
        }
    }

    /// Closes the session now instead of at drop.
    pub fn release(mut self) {
        self.close_once();
    }

    fn close_once(&mut self) {
        if !self.released {
            self.released = true;
            debug!("Closing remote session");
            self.session.close();
        }
    }
}

impl<S: RemoteSession> Deref for SessionGuard<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.session
    }
}

impl<S: RemoteSession> DerefMut for SessionGuard<S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.session
    }
}

impl<S: RemoteSession> Drop for SessionGuard<S> {
    fn drop(&mut self) {
        self.close_once();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockRemote;

    #[test]
    fn test_drop_closes_session() {
        let remote = MockRemote::new();
        {
            let _guard = SessionGuard::new(remote.session());
            assert_eq!(remote.close_count(), 0);
        }
        assert_eq!(remote.close_count(), 1);
    }

    #[test]
    fn test_release_closes_exactly_once() {
        let remote = MockRemote::new();
        let guard = SessionGuard::new(remote.session());
        guard.release();
        assert_eq!(remote.close_count(), 1);
    }

    #[test]
    fn test_panic_still_closes_session() {
        let remote = MockRemote::new();
        let session = remote.session();

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            let _guard = SessionGuard::new(session);
            panic!("task blew up");
        }));

        assert!(result.is_err());
        assert_eq!(remote.close_count(), 1);
    }
}
