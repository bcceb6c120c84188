//! Persisted user records and ledger increments.

extern crate alloc;

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;

use crate::error::BetError;

#[cfg(all(not(feature = "std"), feature = "alloc"))]
use hashbrown::HashMap;
#[cfg(feature = "std")]
use std::collections::HashMap;

/// Stable identifier of a chat user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Integer fields of a user record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    /// Spendable balance.
    Bank,
    /// Roulette rounds won.
    RouletteWon,
    /// Roulette rounds lost.
    RouletteLost,
    /// Slot spins won.
    SlotsWon,
    /// Slot spins lost.
    SlotsLost,
    /// Coinflip duels won.
    CoinflipWon,
    /// Coinflip duels lost.
    CoinflipLost,
    /// Blackjack sessions won.
    BlackjackWon,
    /// Blackjack sessions lost.
    BlackjackLost,
}

impl Field {
    /// Every field, in storage order.
    pub const ALL: [Self; 9] = [
        Self::Bank,
        Self::RouletteWon,
        Self::RouletteLost,
        Self::SlotsWon,
        Self::SlotsLost,
        Self::CoinflipWon,
        Self::CoinflipLost,
        Self::BlackjackWon,
        Self::BlackjackLost,
    ];

    /// The document key of the field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bank => "bank",
            Self::RouletteWon => "roulette_won",
            Self::RouletteLost => "roulette_lost",
            Self::SlotsWon => "slots_won",
            Self::SlotsLost => "slots_lost",
            Self::CoinflipWon => "coinflip_won",
            Self::CoinflipLost => "coinflip_lost",
            Self::BlackjackWon => "blackjack_won",
            Self::BlackjackLost => "blackjack_lost",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown field name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown user record field `{0}`")]
pub struct UnknownField(pub String);

impl FromStr for Field {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| UnknownField(s.to_string()))
    }
}

/// A user's balance and per-game counters.
///
/// Built from a stored document with [`UserRecord::from_document`], which
/// fills in every missing field with zero and keeps fields it does not know
/// about so a write-back never loses them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    /// Owner of the record.
    pub user: UserId,
    values: HashMap<Field, i64>,
    extra: Vec<(String, i64)>,
}

impl UserRecord {
    /// A zero-valued record.
    #[must_use]
    pub fn new(user: UserId) -> Self {
        let values = Field::ALL.into_iter().map(|f| (f, 0)).collect();
        Self {
            user,
            values,
            extra: Vec::new(),
        }
    }

    /// Builds a record from stored `(key, value)` pairs, defaulting missing
    /// fields to zero.
    pub fn from_document<'a, I>(user: UserId, document: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, i64)>,
    {
        let mut record = Self::new(user);
        for (key, value) in document {
            match key.parse::<Field>() {
                Ok(field) => {
                    record.values.insert(field, value);
                }
                Err(_) => record.extra.push((key.to_string(), value)),
            }
        }
        record
    }

    /// Returns the value of `field`.
    #[must_use]
    pub fn get(&self, field: Field) -> i64 {
        self.values.get(&field).copied().unwrap_or(0)
    }

    /// Spendable balance.
    #[must_use]
    pub fn bank(&self) -> i64 {
        self.get(Field::Bank)
    }

    /// Checks that `amount` is a positive wager covered by the bank.
    ///
    /// # Errors
    ///
    /// Returns [`BetError::InvalidAmount`] for a wager below one and
    /// [`BetError::InsufficientFunds`] when the bank cannot cover it.
    pub fn check_wager(&self, amount: i64) -> Result<(), BetError> {
        if amount < 1 {
            return Err(BetError::InvalidAmount);
        }
        if self.bank() < amount {
            return Err(BetError::InsufficientFunds);
        }
        Ok(())
    }

    /// Stored keys this crate does not model, preserved as-is.
    #[must_use]
    pub fn extra(&self) -> &[(String, i64)] {
        &self.extra
    }

    /// Win/loss ratio from a pair of counters, dividing by at least one.
    #[must_use]
    pub fn ratio(&self, won: Field, lost: Field) -> f64 {
        #[expect(
            clippy::cast_precision_loss,
            reason = "counters stay far below f64 precision limits"
        )]
        let ratio = self.get(won) as f64 / self.get(lost).max(1) as f64;
        ratio
    }
}

/// A set of relative increments applied atomically to one user record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Delta {
    increments: Vec<(Field, i64)>,
}

impl Delta {
    /// An empty delta.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            increments: Vec::new(),
        }
    }

    /// Adds `amount` to `field`, merging with an existing increment.
    #[must_use]
    pub fn add(mut self, field: Field, amount: i64) -> Self {
        if let Some(entry) = self.increments.iter_mut().find(|(f, _)| *f == field) {
            entry.1 += amount;
        } else {
            self.increments.push((field, amount));
        }
        self
    }

    /// Shorthand for a bank-only increment.
    #[must_use]
    pub fn bank(amount: i64) -> Self {
        Self::new().add(Field::Bank, amount)
    }

    /// The increments, in insertion order.
    #[must_use]
    pub fn increments(&self) -> &[(Field, i64)] {
        &self.increments
    }

    /// The increment for `field`, or zero.
    #[must_use]
    pub fn get(&self, field: Field) -> i64 {
        self.increments
            .iter()
            .find(|(f, _)| *f == field)
            .map_or(0, |(_, v)| *v)
    }

    /// The delta that undoes this one.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            increments: self.increments.iter().map(|&(field, v)| (field, -v)).collect(),
        }
    }

    /// Returns whether the delta changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.increments.iter().all(|(_, v)| *v == 0)
    }
}
