//! Casino games for a chat bot, with a `no_std` game core.
//!
//! The core ([`blackjack`], [`minigame`], [`record`]) is pure: it draws from a
//! caller-supplied generator and reports ledger deltas without doing any I/O.
//! With the `std` feature, [`service::Casino`] wires it to a [`ledger::Ledger`],
//! a [`cooldown::CooldownStore`] and a [`presenter::Presenter`].
//!
//! # Example
//!
//! ```
//! use cryptomc::blackjack::Session;
//! use cryptomc::card::{Card, Suit};
//! use cryptomc::deck::Deck;
//! use cryptomc::{GameOptions, Phase, UserId};
//!
//! let deck = Deck::from_draws(&[
//!     Card::new(Suit::Hearts, 10),
//!     Card::new(Suit::Spades, 7),
//!     Card::new(Suit::Clubs, 9),
//!     Card::new(Suit::Diamonds, 8),
//! ]);
//! let session = Session::deal(UserId(1), 50, deck, &GameOptions::default()).unwrap();
//! assert_eq!(session.phase(), Phase::PlayerTurn);
//! assert_eq!(session.player().score(), 17);
//! ```
#![cfg_attr(not(feature = "std"), no_std)]
#![cfg_attr(docsrs, feature(doc_cfg))]

#[cfg(all(not(feature = "std"), not(feature = "alloc")))]
compile_error!(
    "`std` is disabled but `alloc` feature is not enabled. Enable `alloc` or keep `std` enabled."
);

extern crate alloc;

pub mod blackjack;
pub mod card;
pub mod deck;
pub mod error;
pub mod hand;
pub mod minigame;
pub mod options;
pub mod record;
pub mod result;
mod sync;

#[cfg(feature = "std")]
#[cfg_attr(docsrs, doc(cfg(feature = "std")))]
pub mod config;
#[cfg(feature = "std")]
#[cfg_attr(docsrs, doc(cfg(feature = "std")))]
pub mod cooldown;
#[cfg(feature = "std")]
#[cfg_attr(docsrs, doc(cfg(feature = "std")))]
pub mod ledger;
#[cfg(feature = "std")]
#[cfg_attr(docsrs, doc(cfg(feature = "std")))]
pub mod presenter;
#[cfg(feature = "std")]
#[cfg_attr(docsrs, doc(cfg(feature = "std")))]
pub mod service;
#[cfg(feature = "std")]
#[cfg_attr(docsrs, doc(cfg(feature = "std")))]
pub mod table;
#[cfg(feature = "std")]
#[cfg_attr(docsrs, doc(cfg(feature = "std")))]
pub mod telemetry;

// Re-export main types
pub use blackjack::{Action, Phase, Session};
pub use card::{Card, DECK_SIZE, Suit};
pub use deck::{Deck, DeckSource, Shuffler};
pub use error::{ActionError, BetError, DealError, EmptyDeckError, GameError};
pub use hand::{BLACKJACK, Hand};
pub use options::{AbandonPolicy, GameOptions};
pub use record::{Delta, Field, UserId, UserRecord};
pub use result::{Outcome, Reason, Resolution, Settlement};

#[cfg(feature = "std")]
pub use service::{Casino, Command, Request};
