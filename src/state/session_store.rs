//! Capacity- and time-bounded in-memory store for in-flight quiz sessions.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, SystemTime};

use dashmap::DashMap;
use tokio::time::Instant;
use tracing::debug;
use uuid::Uuid;

use crate::{
    clients::Conversation,
    quiz::{QuizPayload, QuizVariant},
};

/// One in-flight, started-but-not-yet-answered quiz round.
#[derive(Debug, Clone)]
pub struct QuizSession {
    /// Opaque session token handed to the client.
    pub id: Uuid,
    /// Variant this session belongs to; immutable once created.
    pub variant: QuizVariant,
    /// Variant-specific data produced by `begin`, including the reference
    /// answer.
    pub payload: QuizPayload,
    /// Conversation handle to reuse when the answer is evaluated.
    pub conversation: Conversation,
    /// Wall-clock creation time, for listing.
    pub started_at: SystemTime,
}

struct StoredEntry {
    session: QuizSession,
    expires_at: Instant,
}

impl StoredEntry {
    fn expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Session store bounded both by entry count and by a fixed time-to-live.
///
/// Sessions are process-local and fine to lose on restart. `take` is the
/// atomic get-plus-delete used by the answer path: concurrent takers of the
/// same id see exactly one winner.
pub struct SessionStore {
    entries: DashMap<Uuid, StoredEntry>,
    // Insertion order for the capacity bound; stale ids (already taken or
    // swept) are skipped during eviction.
    insertion_order: Mutex<VecDeque<Uuid>>,
    capacity: usize,
    ttl: Duration,
}

impl SessionStore {
    /// Create a store holding at most `capacity` sessions for `ttl` each.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            insertion_order: Mutex::new(VecDeque::new()),
            capacity: capacity.max(1),
            ttl,
        }
    }

    /// Insert a session, evicting the oldest inserted entries beyond the
    /// capacity bound.
    pub fn put(&self, session: QuizSession) {
        let id = session.id;
        self.entries.insert(
            id,
            StoredEntry {
                session,
                expires_at: Instant::now() + self.ttl,
            },
        );

        let mut order = self.insertion_order.lock().unwrap();
        order.push_back(id);
        while self.entries.len() > self.capacity {
            let Some(oldest) = order.pop_front() else {
                break;
            };
            if self.entries.remove(&oldest).is_some() {
                debug!(session = %oldest, "evicted session over capacity");
            }
        }
    }

    /// Look up a session; expired entries behave as absent (and are removed).
    pub fn get(&self, id: Uuid) -> Option<QuizSession> {
        let now = Instant::now();
        let expired = {
            let entry = self.entries.get(&id)?;
            if !entry.expired(now) {
                return Some(entry.session.clone());
            }
            true
        };
        if expired {
            self.entries.remove(&id);
        }
        None
    }

    /// Atomically remove and return a session. At most one concurrent caller
    /// wins; expired entries behave as absent.
    pub fn take(&self, id: Uuid) -> Option<QuizSession> {
        let (_, entry) = self.entries.remove(&id)?;
        if entry.expired(Instant::now()) {
            return None;
        }
        Some(entry.session)
    }

    /// Remove a session without returning it.
    pub fn delete(&self, id: Uuid) {
        self.entries.remove(&id);
    }

    /// Snapshot of all unexpired sessions.
    pub fn list_active(&self) -> Vec<QuizSession> {
        let now = Instant::now();
        self.entries
            .iter()
            .filter(|entry| !entry.expired(now))
            .map(|entry| entry.session.clone())
            .collect()
    }

    /// Drop expired entries and prune stale ids from the insertion order.
    /// Expiry also happens lazily in `get`/`take`; the sweep just reclaims
    /// memory for sessions nobody asks about again.
    pub fn sweep(&self) {
        let now = Instant::now();
        self.entries.retain(|_, entry| !entry.expired(now));

        let mut order = self.insertion_order.lock().unwrap();
        order.retain(|id| self.entries.contains_key(id));
    }

    /// Number of physically tracked entries (including not-yet-swept ones).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no entries are tracked.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::{BttfTriviaData, ChoiceQuestion};

    fn session(id: Uuid) -> QuizSession {
        QuizSession {
            id,
            variant: QuizVariant::BttfTrivia,
            payload: QuizPayload::BttfTrivia(BttfTriviaData {
                question: ChoiceQuestion {
                    question: "q".into(),
                    option_1: "a".into(),
                    option_2: "b".into(),
                    option_3: "c".into(),
                    option_4: "d".into(),
                    correct_answer: 1,
                },
                speech: "/audio/test.mp3".into(),
            }),
            conversation: Conversation::new(),
            started_at: SystemTime::now(),
        }
    }

    #[tokio::test]
    async fn put_then_get_returns_the_session() {
        let store = SessionStore::new(10, Duration::from_secs(600));
        let id = Uuid::new_v4();
        store.put(session(id));

        let found = store.get(id).expect("session should be present");
        assert_eq!(found.id, id);
        assert_eq!(found.variant, QuizVariant::BttfTrivia);
    }

    #[tokio::test]
    async fn take_consumes_exactly_once() {
        let store = SessionStore::new(10, Duration::from_secs(600));
        let id = Uuid::new_v4();
        store.put(session(id));

        assert!(store.take(id).is_some());
        assert!(store.take(id).is_none());
        assert!(store.get(id).is_none());
    }

    #[tokio::test]
    async fn concurrent_takes_have_one_winner() {
        let store = std::sync::Arc::new(SessionStore::new(10, Duration::from_secs(600)));
        let id = Uuid::new_v4();
        store.put(session(id));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move { store.take(id).is_some() }));
        }

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn sessions_expire_after_ttl() {
        let store = SessionStore::new(10, Duration::from_secs(2));
        let id = Uuid::new_v4();
        store.put(session(id));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(store.get(id).is_some());

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(store.get(id).is_none());
        assert!(store.take(id).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn sweep_reclaims_expired_entries() {
        let store = SessionStore::new(10, Duration::from_secs(2));
        store.put(session(Uuid::new_v4()));
        store.put(session(Uuid::new_v4()));

        tokio::time::advance(Duration::from_secs(3)).await;
        assert_eq!(store.len(), 2);

        store.sweep();
        assert!(store.is_empty());
        assert!(store.list_active().is_empty());
    }

    #[tokio::test]
    async fn capacity_evicts_oldest_inserted() {
        let store = SessionStore::new(2, Duration::from_secs(600));
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        let third = Uuid::new_v4();

        store.put(session(first));
        store.put(session(second));
        store.put(session(third));

        assert!(store.get(first).is_none());
        assert!(store.get(second).is_some());
        assert!(store.get(third).is_some());
    }

    #[tokio::test]
    async fn list_active_reflects_current_sessions() {
        let store = SessionStore::new(10, Duration::from_secs(600));
        let id = Uuid::new_v4();
        store.put(session(id));
        store.put(session(Uuid::new_v4()));

        assert_eq!(store.list_active().len(), 2);
        store.take(id);
        assert_eq!(store.list_active().len(), 1);
    }
}
