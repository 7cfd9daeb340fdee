//! Per-session conversation history.

use indexmap::IndexMap;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

/// Default cap on live sessions before the least recently used is evicted.
pub const MAX_SESSIONS: usize = 1000;

/// Storage for short conversational context keyed by session id.
#[async_trait::async_trait]
pub trait SessionStore: Send + Sync {
    /// Start a new, empty session and return its id.
    async fn create_session(&self) -> String;

    /// Rendered recent history, or `None` for an unknown or empty session.
    async fn get_history(&self, session_id: &str) -> Option<String>;

    /// Record one completed exchange. Unknown ids start a new session.
    async fn add_exchange(&self, session_id: &str, query: &str, answer: &str);
}

/// In-memory session store keeping the most recent exchanges per session.
///
/// Sessions live only as long as the process. At most `max_sessions` are
/// kept; the least recently used one is dropped to make room.
pub struct SessionManager {
    max_history: usize,
    max_sessions: usize,
    counter: AtomicU64,
    // ordered from least to most recently used
    sessions: Mutex<IndexMap<String, VecDeque<(String, String)>>>,
}

impl SessionManager {
    pub fn new(max_history: usize) -> Self {
        Self {
            max_history,
            max_sessions: MAX_SESSIONS,
            counter: AtomicU64::new(0),
            sessions: Mutex::new(IndexMap::new()),
        }
    }

    pub fn with_max_sessions(mut self, max_sessions: usize) -> Self {
        self.max_sessions = max_sessions.max(1);
        self
    }

    fn evict_overflow(&self, sessions: &mut IndexMap<String, VecDeque<(String, String)>>) {
        while sessions.len() > self.max_sessions {
            if let Some((id, _)) = sessions.shift_remove_index(0) {
                tracing::debug!("Evicted session {}", id);
            }
        }
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.lock().await.len()
    }
}

#[async_trait::async_trait]
impl SessionStore for SessionManager {
    async fn create_session(&self) -> String {
        let mut sessions = self.sessions.lock().await;

        // Callers may have claimed counter-shaped ids through add_exchange
        let id = loop {
            let candidate = format!("session_{}", self.counter.fetch_add(1, Ordering::SeqCst) + 1);
            if !sessions.contains_key(&candidate) {
                break candidate;
            }
        };

        sessions.insert(id.clone(), VecDeque::new());
        self.evict_overflow(&mut sessions);
        tracing::debug!("Created session {}", id);
        id
    }

    async fn get_history(&self, session_id: &str) -> Option<String> {
        let sessions = self.sessions.lock().await;
        let exchanges = sessions.get(session_id)?;
        if exchanges.is_empty() {
            return None;
        }

        let lines: Vec<String> = exchanges
            .iter()
            .map(|(q, a)| format!("User: {}\nAssistant: {}", q, a))
            .collect();
        Some(lines.join("\n"))
    }

    async fn add_exchange(&self, session_id: &str, query: &str, answer: &str) {
        let mut sessions = self.sessions.lock().await;
        let mut exchanges = sessions.shift_remove(session_id).unwrap_or_default();

        exchanges.push_back((query.to_string(), answer.to_string()));
        while exchanges.len() > self.max_history {
            exchanges.pop_front();
        }

        sessions.insert(session_id.to_string(), exchanges);
        self.evict_overflow(&mut sessions);
    }
}
