//! Per-session page state and its transitions.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domains::listings::BookListing;

pub const MISSING_IMAGES_WARNING: &str =
    "Please upload both the front and back cover images before submitting.";

/// Which view the session is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageMode {
    InputForm,
    Results,
}

/// Inline message rendered above the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Warning(String),
    Error(String),
}

/// Everything that can happen to a page.
#[derive(Debug, Clone, PartialEq)]
pub enum PageEvent {
    MissingImages,
    InvalidUpload(String),
    ExtractionSucceeded(BookListing),
    ExtractionFailed(String),
    Reset,
}

/// `listing` is present exactly when `mode` is `Results`.
#[derive(Debug, Clone, PartialEq)]
pub struct PageState {
    mode: PageMode,
    listing: Option<BookListing>,
}

impl Default for PageState {
    fn default() -> Self {
        Self::new()
    }
}

impl PageState {
    pub fn new() -> Self {
        Self {
            mode: PageMode::InputForm,
            listing: None,
        }
    }

    pub fn mode(&self) -> PageMode {
        self.mode
    }

    pub fn listing(&self) -> Option<&BookListing> {
        self.listing.as_ref()
    }

    /// Pure transition. Submit outcomes only apply on the input form; reset
    /// always lands on an empty input form.
    pub fn apply(self, event: PageEvent) -> (PageState, Option<Notice>) {
        match (self.mode, event) {
            (_, PageEvent::Reset) => (PageState::new(), None),
            (PageMode::Results, _) => (self, None),
            (PageMode::InputForm, PageEvent::MissingImages) => {
                (self, Some(Notice::Warning(MISSING_IMAGES_WARNING.to_string())))
            }
            (PageMode::InputForm, PageEvent::InvalidUpload(reason)) => {
                (self, Some(Notice::Warning(reason)))
            }
            (PageMode::InputForm, PageEvent::ExtractionSucceeded(listing)) => (
                PageState {
                    mode: PageMode::Results,
                    listing: Some(listing),
                },
                None,
            ),
            (PageMode::InputForm, PageEvent::ExtractionFailed(message)) => (
                PageState::new(),
                Some(Notice::Error(format!("Error: {}", message))),
            ),
        }
    }
}

/// Session identifier (random UUID carried in a cookie)
pub type SessionId = String;

struct SessionEntry {
    state: PageState,
    touched_at: chrono::DateTime<chrono::Utc>,
}

/// In-memory page state per session
///
/// Sessions expire after 24 hours without a request. The store holds at most
/// `max_sessions` entries; a new session beyond that evicts the least recently
/// used one.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, SessionEntry>>>,
    max_sessions: usize,
}

impl SessionStore {
    pub const IDLE_HOURS: i64 = 24;
    pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_MAX_SESSIONS)
    }

    pub fn with_capacity(max_sessions: usize) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            max_sessions: max_sessions.max(1),
        }
    }

    /// Resolve the caller's session, creating a fresh one for a missing,
    /// unknown or expired id. Returns the id to use from now on.
    pub async fn resolve(&self, id: Option<&str>) -> (SessionId, PageState) {
        if let Some(id) = id {
            let mut sessions = self.sessions.write().await;
            if let Some(entry) = sessions.get_mut(id) {
                if !is_expired(entry.touched_at) {
                    entry.touched_at = chrono::Utc::now();
                    return (id.to_string(), entry.state.clone());
                }
                sessions.remove(id);
            }
        }

        let id = Uuid::new_v4().to_string();
        let state = PageState::new();
        self.save(&id, state.clone()).await;
        (id, state)
    }

    pub async fn save(&self, id: &str, state: PageState) {
        let mut sessions = self.sessions.write().await;
        if !sessions.contains_key(id) && sessions.len() >= self.max_sessions {
            evict_least_recent(&mut sessions);
        }
        sessions.insert(
            id.to_string(),
            SessionEntry {
                state,
                touched_at: chrono::Utc::now(),
            },
        );
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drop idle sessions (run periodically)
    pub async fn cleanup_expired(&self) {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| !is_expired(entry.touched_at));
        let dropped = before - sessions.len();
        if dropped > 0 {
            tracing::debug!(dropped, "Expired idle sessions");
        }
    }

    #[cfg(test)]
    async fn backdate(&self, id: &str, hours: i64) {
        if let Some(entry) = self.sessions.write().await.get_mut(id) {
            entry.touched_at = chrono::Utc::now() - chrono::Duration::hours(hours);
        }
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

fn evict_least_recent(sessions: &mut HashMap<SessionId, SessionEntry>) {
    let oldest = sessions
        .iter()
        .min_by_key(|(_, entry)| entry.touched_at)
        .map(|(id, _)| id.clone());
    if let Some(id) = oldest {
        sessions.remove(&id);
        tracing::debug!(session = %id, "Evicted least recently used session");
    }
}

fn is_expired(touched_at: chrono::DateTime<chrono::Utc>) -> bool {
    chrono::Utc::now()
        .signed_duration_since(touched_at)
        .num_hours()
        >= SessionStore::IDLE_HOURS
}
