//! Balance ledger collaborator.
//!
//! The ledger is the only state shared between concurrent sessions, so every
//! mutation is a relative increment applied atomically by the backend. The
//! crate never reads a balance, changes it locally and writes it back.

extern crate alloc;

use alloc::string::{String, ToString};
use std::collections::HashMap;

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

use crate::error::LedgerError;
use crate::record::{Delta, UserId, UserRecord};

/// Persistent per-user balances and counters.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Fetches a user's record.
    ///
    /// Unknown users get a zero-valued record; stored records missing some
    /// counters get those counters defaulted to zero.
    async fn fetch_balance(&self, user: UserId) -> Result<UserRecord, LedgerError>;

    /// Applies `delta` as atomic increments, creating the record if needed.
    async fn apply_delta(&self, user: UserId, delta: &Delta) -> Result<(), LedgerError>;
}

/// In-process ledger keyed by user, storing raw documents.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    documents: DashMap<UserId, HashMap<String, i64>>,
}

impl MemoryLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a raw document for `user`, replacing any existing one.
    ///
    /// Keys need not cover every field; this mirrors records written by
    /// older deployments.
    pub fn insert_document<'a, I>(&self, user: UserId, document: I)
    where
        I: IntoIterator<Item = (&'a str, i64)>,
    {
        let document = document
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        self.documents.insert(user, document);
    }

    /// Returns the raw stored document, if any.
    #[must_use]
    pub fn document(&self, user: UserId) -> Option<HashMap<String, i64>> {
        self.documents.get(&user).map(|doc| doc.clone())
    }

    /// Number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Returns whether no record is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[async_trait]
impl Ledger for MemoryLedger {
    async fn fetch_balance(&self, user: UserId) -> Result<UserRecord, LedgerError> {
        let record = self.documents.get(&user).map_or_else(
            || UserRecord::new(user),
            |doc| UserRecord::from_document(user, doc.iter().map(|(k, v)| (k.as_str(), *v))),
        );
        Ok(record)
    }

    async fn apply_delta(&self, user: UserId, delta: &Delta) -> Result<(), LedgerError> {
        if delta.is_empty() {
            return Ok(());
        }

        // The entry guard holds the shard lock for the whole update.
        let mut doc = self.documents.entry(user).or_default();
        for &(field, amount) in delta.increments() {
            *doc.entry(field.as_str().to_string()).or_insert(0) += amount;
        }
        drop(doc);

        debug!(%user, increments = ?delta.increments(), "applied ledger delta");
        Ok(())
    }
}
