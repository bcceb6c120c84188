//! Blackjack session engine.
//!
//! A [`Session`] is one game between a bettor and the dealer, played from a
//! fresh deck. It moves through [`Phase::Dealing`], [`Phase::PlayerTurn`],
//! [`Phase::DealerTurn`] and ends in [`Phase::Resolved`], where its
//! [`Settlement`] can be taken exactly once.
//!
//! The session performs no I/O. Debiting the stake before [`Session::deal`]
//! and applying the settlement afterwards is up to the caller.

use crate::deck::Deck;
use crate::error::DealError;
use crate::hand::{BLACKJACK, Hand};
use crate::options::GameOptions;
use crate::record::UserId;
use crate::result::{Reason, Resolution, Settlement};

mod actions;
mod dealer;
pub mod state;

pub use state::{Action, Phase};

/// One blackjack game.
#[derive(Debug, Clone)]
pub struct Session {
    bettor: UserId,
    bet: i64,
    player: Hand,
    dealer: Hand,
    deck: Deck,
    phase: Phase,
    dealer_stands_on: u8,
    resolution: Option<Resolution>,
    settled: bool,
}

impl Session {
    /// Deals a new session for `bettor` staking `bet`.
    ///
    /// The player receives two face-up cards and the dealer one face-up card
    /// and the face-down hole card. A player dealt 21 wins on the spot and the
    /// session comes back already resolved.
    ///
    /// # Errors
    ///
    /// Returns an error if the bet is not positive or the deck runs out
    /// during the deal.
    pub fn deal(
        bettor: UserId,
        bet: i64,
        mut deck: Deck,
        options: &GameOptions,
    ) -> Result<Self, DealError> {
        if bet <= 0 {
            return Err(DealError::InvalidAmount);
        }

        let mut player = Hand::new();
        let mut dealer = Hand::new();
        player.add_card(deck.draw()?);
        player.add_card(deck.draw()?);
        dealer.add_card(deck.draw()?);
        dealer.add_card(deck.draw()?.turned_down());

        let mut session = Self {
            bettor,
            bet,
            player,
            dealer,
            deck,
            phase: Phase::Dealing,
            dealer_stands_on: options.dealer_stands_on,
            resolution: None,
            settled: false,
        };

        if session.player.score() == BLACKJACK {
            session.dealer.reveal();
            session.resolve(Reason::PlayerBlackjack);
        } else {
            session.phase = Phase::PlayerTurn;
        }

        Ok(session)
    }

    /// Marks the session resolved.
    fn resolve(&mut self, reason: Reason) {
        self.resolution = Some(Resolution {
            reason,
            player_score: self.player.score(),
            dealer_score: self.dealer.score(),
        });
        self.phase = Phase::Resolved;
    }

    /// The settlement still owed on a resolved session, without taking it.
    #[must_use]
    pub fn pending_settlement(&self) -> Option<Settlement> {
        if self.settled {
            return None;
        }
        self.resolution
            .map(|resolution| Settlement::new(resolution.outcome(), self.bet))
    }

    /// Returns the settlement of a resolved session.
    ///
    /// Yields `Some` exactly once; every later call returns `None`. Callers
    /// that write the settlement somewhere should read it with
    /// [`Self::pending_settlement`] first and only take it once the write
    /// has gone through.
    pub fn settle(&mut self) -> Option<Settlement> {
        let settlement = self.pending_settlement()?;
        self.settled = true;
        Some(settlement)
    }

    /// Ends an unfinished session without an outcome.
    ///
    /// Returns the stake if the session was still in play; a resolved or
    /// already abandoned session returns `None`. No settlement is produced
    /// afterwards.
    pub fn abandon(&mut self) -> Option<i64> {
        if self.phase == Phase::Resolved {
            return None;
        }
        self.phase = Phase::Resolved;
        self.settled = true;
        Some(self.bet)
    }

    /// The user who placed the stake.
    #[must_use]
    pub const fn bettor(&self) -> UserId {
        self.bettor
    }

    /// The stake.
    #[must_use]
    pub const fn bet(&self) -> i64 {
        self.bet
    }

    /// The player's hand.
    #[must_use]
    pub const fn player(&self) -> &Hand {
        &self.player
    }

    /// The dealer's hand. The hole card scores nothing until revealed.
    #[must_use]
    pub const fn dealer(&self) -> &Hand {
        &self.dealer
    }

    /// The current phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// The resolution, once the session has ended.
    #[must_use]
    pub const fn resolution(&self) -> Option<Resolution> {
        self.resolution
    }

    /// Returns whether the session has ended.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.phase == Phase::Resolved
    }

    /// The actions the player may take right now.
    #[must_use]
    pub fn available_actions(&self) -> &'static [Action] {
        if self.phase == Phase::PlayerTurn {
            &Action::CHOICES
        } else {
            &[]
        }
    }

    /// Cards left in the session's deck.
    #[must_use]
    pub fn cards_remaining(&self) -> usize {
        self.deck.len()
    }
}
