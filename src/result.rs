//! Session outcome types.

use crate::record::{Delta, Field};

/// Final result of a blackjack session, from the bettor's side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Player wins.
    Won,
    /// Player loses.
    Lost,
    /// Tie; the stake is returned.
    Tie,
}

/// Why a session resolved the way it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    /// The player reached exactly 21.
    PlayerBlackjack,
    /// The player went over 21.
    PlayerBust,
    /// The dealer finished on exactly 21.
    DealerBlackjack,
    /// The dealer went over 21.
    DealerBust,
    /// The player finished higher than the dealer.
    PlayerHigher,
    /// The dealer finished higher than the player.
    DealerHigher,
    /// Both finished on the same score.
    Push,
}

impl Reason {
    /// The outcome this reason implies.
    #[must_use]
    pub const fn outcome(self) -> Outcome {
        match self {
            Self::PlayerBlackjack | Self::DealerBust | Self::PlayerHigher => Outcome::Won,
            Self::PlayerBust | Self::DealerBlackjack | Self::DealerHigher => Outcome::Lost,
            Self::Push => Outcome::Tie,
        }
    }

    /// Short headline for the result.
    #[must_use]
    pub const fn headline(self) -> &'static str {
        match self {
            Self::PlayerBlackjack => "Blackjack!",
            Self::PlayerBust => "You bust",
            Self::DealerBlackjack => "Dealer blackjack",
            Self::DealerBust => "Dealer busts",
            Self::PlayerHigher => "You win",
            Self::DealerHigher => "You lose",
            Self::Push => "Push",
        }
    }
}

/// A resolved session: what happened and the scores it ended on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// Why the session ended.
    pub reason: Reason,
    /// Final player score.
    pub player_score: u8,
    /// Final dealer score (hole card included).
    pub dealer_score: u8,
}

impl Resolution {
    /// The outcome for the bettor.
    #[must_use]
    pub const fn outcome(&self) -> Outcome {
        self.reason.outcome()
    }
}

/// Ledger effect of a resolved session.
///
/// The stake was debited when the session started, so `credit` is what goes
/// back to the bettor: twice the bet on a win, the bet on a tie, nothing on a
/// loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settlement {
    /// The original stake.
    pub bet: i64,
    /// Amount credited back at resolution.
    pub credit: i64,
    /// Counter incremented alongside the credit, if any.
    pub counter: Option<Field>,
}

impl Settlement {
    /// Computes the settlement for `outcome` on a stake of `bet`.
    #[must_use]
    pub const fn new(outcome: Outcome, bet: i64) -> Self {
        match outcome {
            Outcome::Won => Self {
                bet,
                credit: bet * 2,
                counter: Some(Field::BlackjackWon),
            },
            Outcome::Lost => Self {
                bet,
                credit: 0,
                counter: Some(Field::BlackjackLost),
            },
            Outcome::Tie => Self {
                bet,
                credit: bet,
                counter: None,
            },
        }
    }

    /// Net balance change over the whole session (debit plus credit).
    #[must_use]
    pub const fn net(&self) -> i64 {
        self.credit - self.bet
    }

    /// The ledger increments to apply at resolution.
    #[must_use]
    pub fn delta(&self) -> Delta {
        let mut delta = Delta::new();
        if self.credit != 0 {
            delta = delta.add(Field::Bank, self.credit);
        }
        if let Some(counter) = self.counter {
            delta = delta.add(counter, 1);
        }
        delta
    }
}
