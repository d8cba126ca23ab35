//! In-memory session store with idle-TTL eviction
//!
//! A session is checked out by [`SessionStore::get`] for the length of one
//! crawl invocation and returned with [`SessionStore::put`]. The idle TTL
//! counts from the last `put` (or `get`) and never runs while a session is
//! checked out. Expired and unknown tokens both surface as
//! [`CrawlError::SessionNotFound`].

use chrono::Utc;
use log::{debug, info};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use super::CrawlSession;
use crate::crawl_engine::crawl_types::{CrawlError, CrawlResult};
use crate::utils::SESSION_CLEANUP_INTERVAL_SECS;

/// Initial capacity for the session `HashMap`
const SESSION_CACHE_INITIAL_CAPACITY: usize = 16;

#[derive(Debug)]
enum Slot {
    Idle(Box<CrawlSession>),
    /// Checked out by a running invocation
    Busy,
}

#[derive(Debug)]
struct Entry {
    slot: Slot,
    last_access: Instant,
}

impl Entry {
    /// Only parked sessions age. A checked-out session is being crawled and
    /// stays alive however long the invocation runs.
    fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        matches!(self.slot, Slot::Idle(_)) && now.duration_since(self.last_access) >= ttl
    }
}

/// Token-keyed store of resumable crawl sessions
///
/// Uses `tokio::sync::Mutex` for async-safe concurrent access.
#[derive(Debug)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, Entry>>,
    ttl: Duration,
}

impl SessionStore {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::with_capacity(SESSION_CACHE_INITIAL_CAPACITY)),
            ttl,
        }
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Create a session for `seed_url`, already checked out to the caller
    pub async fn create(&self, seed_url: &str) -> CrawlResult<CrawlSession> {
        let session = CrawlSession::new(seed_url)?;
        let mut sessions = self.sessions.lock().await;
        sessions.insert(
            session.token().to_string(),
            Entry {
                slot: Slot::Busy,
                last_access: Instant::now(),
            },
        );
        info!(target: "sitemapper::session", "Starting new session: {}", session.token());
        Ok(session)
    }

    /// Check out the session for `token`
    ///
    /// # Errors
    ///
    /// `SessionNotFound` for unknown or expired tokens, `SessionBusy` when
    /// another invocation holds the session.
    pub async fn get(&self, token: &str) -> CrawlResult<CrawlSession> {
        let now = Instant::now();
        let mut sessions = self.sessions.lock().await;

        let Some(entry) = sessions.get_mut(token) else {
            return Err(CrawlError::SessionNotFound);
        };
        if entry.is_expired(now, self.ttl) {
            sessions.remove(token);
            debug!(target: "sitemapper::session", "Session {token} expired on access");
            return Err(CrawlError::SessionNotFound);
        }

        match std::mem::replace(&mut entry.slot, Slot::Busy) {
            Slot::Idle(session) => {
                entry.last_access = now;
                let age = Utc::now().signed_duration_since(session.created_at());
                info!(
                    target: "sitemapper::session",
                    "Resuming session: {token} (age {}s, {} invocations)",
                    age.num_seconds(),
                    session.invocations()
                );
                Ok(*session)
            }
            Slot::Busy => Err(CrawlError::SessionBusy),
        }
    }

    /// Return a session to the store and refresh its idle timer
    pub async fn put(&self, session: CrawlSession) {
        let mut sessions = self.sessions.lock().await;
        sessions.insert(
            session.token().to_string(),
            Entry {
                slot: Slot::Idle(Box::new(session)),
                last_access: Instant::now(),
            },
        );
    }

    /// Whether `token` currently maps to a live (unexpired) session
    pub async fn contains(&self, token: &str) -> bool {
        let now = Instant::now();
        self.sessions
            .lock()
            .await
            .get(token)
            .is_some_and(|entry| !entry.is_expired(now, self.ttl))
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }

    /// Drop every session idle for at least the TTL. Returns how many went.
    pub async fn cleanup_expired(&self) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.lock().await;
        let initial_count = sessions.len();

        sessions.retain(|token, entry| {
            let keep = !entry.is_expired(now, self.ttl);
            if !keep {
                debug!(target: "sitemapper::session", "Evicting idle session {token}");
            }
            keep
        });

        let cleaned = initial_count - sessions.len();
        if cleaned > 0 {
            debug!(target: "sitemapper::session", "Cleaned up {cleaned} crawl sessions");
        }
        cleaned
    }

    /// Start background cleanup task (call once at initialization)
    ///
    /// ```rust,no_run
    /// use kodegen_tools_sitemapper::session::SessionStore;
    /// use std::sync::Arc;
    /// use std::time::Duration;
    ///
    /// # #[tokio::main]
    /// # async fn main() {
    /// let store = Arc::new(SessionStore::new(Duration::from_secs(3600)));
    /// store.clone().start_cleanup_task();
    /// # }
    /// ```
    pub fn start_cleanup_task(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(Duration::from_secs(SESSION_CLEANUP_INTERVAL_SECS));
            loop {
                interval.tick().await;
                self.cleanup_expired().await;
            }
        })
    }
}
