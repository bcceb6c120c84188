//! Error types.

extern crate alloc;

use alloc::string::String;
use core::time::Duration;

use thiserror::Error;

/// A draw was attempted on an exhausted deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no cards left in the deck")]
pub struct EmptyDeckError;

/// Errors that can occur while playing a blackjack session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ActionError {
    /// Someone other than the bettor submitted the action.
    #[error("this action is not addressed to you")]
    NotTargetOfAction,
    /// The session is not waiting for a player decision.
    #[error("invalid session phase for this action")]
    InvalidState,
    /// No cards left in the deck.
    #[error(transparent)]
    EmptyDeck(#[from] EmptyDeckError),
}

/// Errors that can occur while dealing a new session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DealError {
    /// The stake is zero or negative.
    #[error("bet amount must be positive")]
    InvalidAmount,
    /// Not enough cards for the initial deal.
    #[error(transparent)]
    EmptyDeck(#[from] EmptyDeckError),
}

/// Errors raised while validating a wager against a balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BetError {
    /// The wager is zero or negative.
    #[error("bet amount must be positive")]
    InvalidAmount,
    /// The wager exceeds the available balance.
    #[error("insufficient funds")]
    InsufficientFunds,
}

/// Errors surfaced at the request boundary.
///
/// Every variant except [`GameError::UnexpectedFailure`] is a precondition
/// failure that is reported privately to the requester and leaves all state
/// untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// The wager is zero or negative.
    #[error("bet amount must be positive")]
    InvalidAmount,
    /// A wager exceeds an available balance.
    #[error("insufficient funds")]
    InsufficientFunds {
        /// Whether the requester (rather than a counterparty) lacks funds.
        requester: bool,
    },
    /// The action is rate limited.
    #[error("on cooldown, retry in {:.2}s", .retry_after.as_secs_f64())]
    OnCooldown {
        /// Time left until the cooldown expires.
        retry_after: Duration,
    },
    /// The requester interacted with a control addressed to someone else.
    #[error("this action is not addressed to you")]
    NotTargetOfAction,
    /// The request names the requester themself where another user is needed.
    #[error("you cannot target yourself")]
    SelfTarget,
    /// The request targets the bot account.
    #[error("you cannot target the bot")]
    BotTarget,
    /// The session or challenge no longer exists.
    #[error("this game is over")]
    Expired,
    /// No cards left in the deck.
    #[error(transparent)]
    EmptyDeck(#[from] EmptyDeckError),
    /// Catch-all for collaborator and invariant failures.
    #[error("unexpected failure: {0}")]
    UnexpectedFailure(String),
}

impl GameError {
    /// Returns whether the error is a recoverable precondition failure.
    #[must_use]
    pub const fn is_precondition(&self) -> bool {
        !matches!(self, Self::UnexpectedFailure(_) | Self::EmptyDeck(_))
    }
}

impl From<BetError> for GameError {
    fn from(err: BetError) -> Self {
        match err {
            BetError::InvalidAmount => Self::InvalidAmount,
            BetError::InsufficientFunds => Self::InsufficientFunds { requester: true },
        }
    }
}

impl From<DealError> for GameError {
    fn from(err: DealError) -> Self {
        match err {
            DealError::InvalidAmount => Self::InvalidAmount,
            DealError::EmptyDeck(e) => Self::EmptyDeck(e),
        }
    }
}

impl From<ActionError> for GameError {
    fn from(err: ActionError) -> Self {
        match err {
            ActionError::NotTargetOfAction => Self::NotTargetOfAction,
            ActionError::InvalidState => Self::Expired,
            ActionError::EmptyDeck(e) => Self::EmptyDeck(e),
        }
    }
}

/// Errors raised by a balance ledger backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The backend could not be reached or rejected the operation.
    #[error("ledger unavailable: {0}")]
    Unavailable(String),
    /// A stored record could not be decoded.
    #[error("corrupted user record: {0}")]
    Corrupted(String),
}

impl From<LedgerError> for GameError {
    fn from(err: LedgerError) -> Self {
        Self::UnexpectedFailure(alloc::format!("{err}"))
    }
}

/// Errors raised by a cooldown store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CooldownError {
    /// A live entry exists for the key.
    #[error("on cooldown, retry in {:.2}s", .retry_after.as_secs_f64())]
    OnCooldown {
        /// Time left until the entry expires.
        retry_after: Duration,
    },
    /// The backing store failed.
    #[error("cooldown store unavailable: {0}")]
    Unavailable(String),
}

impl From<CooldownError> for GameError {
    fn from(err: CooldownError) -> Self {
        match err {
            CooldownError::OnCooldown { retry_after } => Self::OnCooldown { retry_after },
            CooldownError::Unavailable(_) => Self::UnexpectedFailure(alloc::format!("{err}")),
        }
    }
}

/// Errors raised while loading configuration.
#[cfg(feature = "std")]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// The file is not valid TOML or does not match the schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    /// A value is out of range.
    #[error("invalid config value for `{field}`: {reason}")]
    Invalid {
        /// The offending field.
        field: &'static str,
        /// Why it was rejected.
        reason: &'static str,
    },
}
