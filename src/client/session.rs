use super::events::EventSink;
use log::{debug, info};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// One live TCP connection. The stream is shared with the receive loop.
pub(crate) struct Session {
    pub(crate) id: u64,
    pub(crate) stream: Arc<TcpStream>,
    pub(crate) running: Arc<AtomicBool>,
    pub(crate) peer: Option<SocketAddr>,
}

/// Holds the current session, if any. Both the caller and the receive loop
/// tear sessions down through here; only the first teardown of a given
/// session has any effect.
#[derive(Default)]
pub(crate) struct SessionRegistry {
    current: Mutex<Option<Session>>,
    next_id: AtomicU64,
}

impl SessionRegistry {
    fn lock(&self) -> MutexGuard<'_, Option<Session>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    pub(crate) fn install(&self, session: Session) -> Option<Session> {
        self.lock().replace(session)
    }

    pub(crate) fn is_connected(&self) -> bool {
        self.lock()
            .as_ref()
            .is_some_and(|session| session.running.load(Ordering::Acquire))
    }

    pub(crate) fn peer_addr(&self) -> Option<SocketAddr> {
        self.lock().as_ref().and_then(|session| session.peer)
    }

    /// Stream handle for writing, only while the session is running.
    pub(crate) fn writer(&self) -> Option<Arc<TcpStream>> {
        self.lock()
            .as_ref()
            .filter(|session| session.running.load(Ordering::Acquire))
            .map(|session| Arc::clone(&session.stream))
    }

    /// Closes the current session. With `Some(id)` only that session is
    /// closed, so a finishing receive loop cannot close a newer connection.
    /// Returns `true` if this call performed the teardown.
    pub(crate) fn teardown(&self, id: Option<u64>, events: &EventSink) -> bool {
        let session = {
            let mut current = self.lock();
            match current.as_ref() {
                Some(session) if id.map_or(true, |id| id == session.id) => {
                    // Cleared under the lock so the loop never sees a running
                    // flag for a session that is no longer installed.
                    session.running.store(false, Ordering::Release);
                    current.take()
                }
                _ => None,
            }
        };

        let Some(session) = session else {
            debug!("No session to tear down");
            return false;
        };

        if let Err(e) = session.stream.shutdown(Shutdown::Both) {
            debug!("Socket shutdown for session {}: {}", session.id, e);
        }

        events.connection_changed(false);
        info!("Disconnected (session {})", session.id);
        true
    }
}
