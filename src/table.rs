//! Process-wide tables of in-flight interactions.
//!
//! Active blackjack sessions and pending coinflip challenges live here,
//! keyed by the [`InteractionId`] handed out when they were created. Each
//! entry remembers when it was last touched so idle ones can be expired.

extern crate alloc;

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};
use core::time::Duration;

use dashmap::DashMap;
use tokio::sync::{Mutex as AsyncMutex, MutexGuard as AsyncMutexGuard};
use tokio::time::Instant;

use crate::blackjack::Session;
use crate::minigame::Challenge;
use crate::record::UserId;
use crate::sync::Mutex;

/// Identifier of a session or challenge, shown on its controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InteractionId(pub u64);

impl fmt::Display for InteractionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One table entry.
pub struct Slot<T> {
    owner: UserId,
    value: T,
    touched: Mutex<Instant>,
}

impl<T> Slot<T> {
    /// The only user allowed to act on this entry.
    pub const fn owner(&self) -> UserId {
        self.owner
    }

    /// The stored value.
    pub const fn value(&self) -> &T {
        &self.value
    }

    /// Records activity now.
    pub fn touch(&self) {
        self.touched.with(|touched| *touched = Instant::now());
    }

    /// Time since the last activity.
    pub fn idle_for(&self) -> Duration {
        Instant::now().saturating_duration_since(self.touched.with(|touched| *touched))
    }
}

/// A concurrent id-keyed table.
pub struct Table<T> {
    next_id: AtomicU64,
    slots: DashMap<InteractionId, Arc<Slot<T>>>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            slots: DashMap::new(),
        }
    }
}

impl<T> Table<T> {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `value` owned by `owner` and returns its id.
    pub fn insert(&self, owner: UserId, value: T) -> InteractionId {
        let id = InteractionId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let slot = Slot {
            owner,
            value,
            touched: Mutex::new(Instant::now()),
        };
        self.slots.insert(id, Arc::new(slot));
        id
    }

    /// Looks up an entry.
    pub fn get(&self, id: InteractionId) -> Option<Arc<Slot<T>>> {
        self.slots.get(&id).map(|slot| Arc::clone(slot.value()))
    }

    /// Removes an entry, returning it if it was still present.
    pub fn remove(&self, id: InteractionId) -> Option<Arc<Slot<T>>> {
        self.slots.remove(&id).map(|(_, slot)| slot)
    }

    /// A snapshot of every live entry.
    pub fn entries(&self) -> Vec<(InteractionId, Arc<Slot<T>>)> {
        self.slots
            .iter()
            .map(|entry| (*entry.key(), Arc::clone(entry.value())))
            .collect()
    }

    /// Removes every entry idle for at least `timeout` that `may_expire`
    /// accepts, returning the removed entries.
    pub fn expire_idle<F>(&self, timeout: Duration, mut may_expire: F) -> Vec<(InteractionId, Arc<Slot<T>>)>
    where
        F: FnMut(&Slot<T>) -> bool,
    {
        let mut expired = Vec::new();
        self.slots.retain(|id, slot| {
            if slot.idle_for() >= timeout && may_expire(&**slot) {
                expired.push((*id, Arc::clone(slot)));
                false
            } else {
                true
            }
        });
        expired
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Active blackjack sessions. The async mutex allows one transition at a
/// time per session, including its ledger update.
pub type SessionTable = Table<AsyncMutex<Session>>;

/// Pending coinflip challenges, owned by their target.
pub type ChallengeTable = Table<Challenge>;

impl Slot<AsyncMutex<Session>> {
    /// Claims the session for one transition.
    ///
    /// Returns `None` while another transition is in flight; the caller drops
    /// the incoming action rather than queueing it.
    pub fn try_claim(&self) -> Option<AsyncMutexGuard<'_, Session>> {
        self.value.try_lock().ok()
    }
}
