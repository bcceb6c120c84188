//! Per-(subject, action) cooldowns over a shared expiring store.
//!
//! [`CooldownStore::try_acquire`] is a single check-and-set: a live entry
//! rejects the call with the time left, otherwise a new entry is written in
//! the same step. Two concurrent calls for one key can never both succeed.

extern crate alloc;

use alloc::string::{String, ToString};
use alloc::sync::Arc;
use core::fmt;
use core::time::Duration;
use std::collections::HashMap;

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, trace};

use crate::error::CooldownError;
use crate::record::UserId;

/// Store key for one subject performing one action.
///
/// Renders as `"{scope}:{subject}:{action}"`, so keys for different actions
/// or scopes never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CooldownKey {
    /// What the subject identifier refers to, e.g. `user`.
    pub scope: String,
    /// The rate-limited subject.
    pub subject: UserId,
    /// The action name.
    pub action: String,
}

impl CooldownKey {
    /// Builds a key.
    pub fn new(scope: impl Into<String>, subject: UserId, action: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            subject,
            action: action.into(),
        }
    }
}

impl fmt::Display for CooldownKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.scope, self.subject, self.action)
    }
}

/// Shared store of expiring cooldown entries.
#[async_trait]
pub trait CooldownStore: Send + Sync {
    /// Atomically claims `key` for `duration`.
    ///
    /// # Errors
    ///
    /// Returns [`CooldownError::OnCooldown`] with the remaining time if a live
    /// entry exists, or [`CooldownError::Unavailable`] if the store fails.
    async fn try_acquire(&self, key: &CooldownKey, duration: Duration)
    -> Result<(), CooldownError>;
}

/// In-process cooldown store.
///
/// Expired entries are replaced in place on the next claim and dropped by
/// [`MemoryCooldownStore::purge_expired`], which
/// [`MemoryCooldownStore::spawn_sweeper`] runs on an interval.
#[derive(Debug, Default)]
pub struct MemoryCooldownStore {
    entries: DashMap<String, Instant>,
}

impl MemoryCooldownStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every expired entry and returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, expires_at| *expires_at > now);
        before.saturating_sub(self.entries.len())
    }

    /// Runs [`Self::purge_expired`] every `every` until the task is aborted.
    pub fn spawn_sweeper(self: Arc<Self>, every: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                let purged = self.purge_expired();
                if purged > 0 {
                    trace!(purged, "purged expired cooldowns");
                }
            }
        })
    }

    /// Number of stored entries, live or not yet purged.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the store holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl CooldownStore for MemoryCooldownStore {
    async fn try_acquire(
        &self,
        key: &CooldownKey,
        duration: Duration,
    ) -> Result<(), CooldownError> {
        let now = Instant::now();
        let expires_at = now + duration;

        // The entry holds the shard lock from the check to the write.
        match self.entries.entry(key.to_string()) {
            Entry::Occupied(mut entry) => {
                let current = *entry.get();
                if current > now {
                    return Err(CooldownError::OnCooldown {
                        retry_after: current - now,
                    });
                }
                entry.insert(expires_at);
            }
            Entry::Vacant(entry) => {
                entry.insert(expires_at);
            }
        }

        Ok(())
    }
}

/// Cooldown durations per action name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CooldownPolicy {
    durations: HashMap<String, Duration>,
}

impl CooldownPolicy {
    /// A policy with no cooldowns.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            durations: HashMap::new(),
        }
    }

    /// Sets the cooldown for `action`; zero removes it.
    #[must_use]
    pub fn with(mut self, action: &str, duration: Duration) -> Self {
        if duration.is_zero() {
            self.durations.remove(action);
        } else {
            self.durations.insert(action.to_string(), duration);
        }
        self
    }

    /// The cooldown for `action`, if it has one.
    #[must_use]
    pub fn duration(&self, action: &str) -> Option<Duration> {
        self.durations.get(action).copied()
    }
}

/// A store, a key scope and a policy bundled for request handling.
#[derive(Clone)]
pub struct Cooldowns {
    store: Arc<dyn CooldownStore>,
    scope: String,
    policy: CooldownPolicy,
}

impl Cooldowns {
    /// Bundles `store` with `policy` under `scope`.
    pub fn new(store: Arc<dyn CooldownStore>, scope: impl Into<String>, policy: CooldownPolicy) -> Self {
        Self {
            store,
            scope: scope.into(),
            policy,
        }
    }

    /// Claims the cooldown for `subject` performing `action`.
    ///
    /// Actions without a configured cooldown always pass.
    ///
    /// # Errors
    ///
    /// Propagates [`CooldownStore::try_acquire`] failures.
    pub async fn check(&self, subject: UserId, action: &str) -> Result<(), CooldownError> {
        let Some(duration) = self.policy.duration(action) else {
            return Ok(());
        };

        let key = CooldownKey::new(self.scope.as_str(), subject, action);
        let result = self.store.try_acquire(&key, duration).await;
        if let Err(CooldownError::OnCooldown { retry_after }) = &result {
            debug!(%key, retry_after = retry_after.as_secs_f64(), "cooldown active");
        }
        result
    }

    /// The policy in effect.
    #[must_use]
    pub const fn policy(&self) -> &CooldownPolicy {
        &self.policy
    }
}
