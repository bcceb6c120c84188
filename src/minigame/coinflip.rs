//! Coinflip duels between two users.

use rand::Rng;

use crate::record::{Delta, Field, UserId};

/// A pending duel offered by `challenger` to `target`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Challenge {
    /// The user who issued the challenge.
    pub challenger: UserId,
    /// The only user allowed to accept it.
    pub target: UserId,
    /// Amount each side puts up.
    pub amount: i64,
}

/// A settled duel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Duel {
    /// The user who takes the pot.
    pub winner: UserId,
    /// The user who pays.
    pub loser: UserId,
    /// Amount moved from loser to winner.
    pub amount: i64,
}

impl Duel {
    /// Increments for the winner.
    #[must_use]
    pub fn winner_delta(&self) -> Delta {
        Delta::bank(self.amount).add(Field::CoinflipWon, 1)
    }

    /// Increments for the loser.
    #[must_use]
    pub fn loser_delta(&self) -> Delta {
        Delta::bank(-self.amount).add(Field::CoinflipLost, 1)
    }
}

/// Flips a fair coin between the two sides of `challenge`.
pub fn flip<R: Rng + ?Sized>(rng: &mut R, challenge: &Challenge) -> Duel {
    let (winner, loser) = if rng.random_bool(0.5) {
        (challenge.challenger, challenge.target)
    } else {
        (challenge.target, challenge.challenger)
    };
    Duel {
        winner,
        loser,
        amount: challenge.amount,
    }
}
