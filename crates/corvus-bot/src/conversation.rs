//! Per-thread conversation state.
//!
//! A conversation owns the system prompt and model parameters for one
//! thread. It is created when the thread starts, removed when the thread
//! is closed, and swept out after an inactivity bound, so the registry
//! never grows without bound.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use corvus_core::ModelParams;

/// State owned by one conversation thread.
#[derive(Debug, Clone)]
pub struct Conversation {
    /// System instruction for this thread.
    pub system_prompt: String,
    /// Generation parameters chosen when the thread started.
    pub params: ModelParams,
    last_active: Instant,
}

/// Registry of live conversations, keyed by thread id.
#[derive(Debug, Clone, Default)]
pub struct Conversations {
    inner: Arc<Mutex<HashMap<i64, Conversation>>>,
}

impl Conversations {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<i64, Conversation>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a new conversation for a thread.
    pub fn start(&self, thread_id: i64, system_prompt: impl Into<String>, params: ModelParams) {
        self.lock().insert(
            thread_id,
            Conversation {
                system_prompt: system_prompt.into(),
                params,
                last_active: Instant::now(),
            },
        );
    }

    /// Fetch the conversation for a thread, refreshing its activity mark.
    #[must_use]
    pub fn get(&self, thread_id: i64) -> Option<Conversation> {
        let mut map = self.lock();
        let conversation = map.get_mut(&thread_id)?;
        conversation.last_active = Instant::now();
        Some(conversation.clone())
    }

    /// Remove a conversation when its thread is archived or locked.
    pub fn end(&self, thread_id: i64) {
        self.lock().remove(&thread_id);
    }

    /// Drop every conversation idle longer than `max_idle`.
    ///
    /// Returns how many were evicted.
    pub fn evict_idle(&self, max_idle: Duration) -> usize {
        let mut map = self.lock();
        let before = map.len();
        map.retain(|_, c| c.last_active.elapsed() < max_idle);
        before - map.len()
    }

    /// Number of live conversations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
