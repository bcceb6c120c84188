//! Three-by-three slot machine.

use rand::Rng;

use crate::record::{Delta, Field};

use super::{multiply, pick_weighted};

/// A reel symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    /// Cherry, pays 3x.
    Cherry,
    /// Banana, pays 3x.
    Banana,
    /// Apple, pays 2x.
    Apple,
    /// Strawberry, pays 1.5x.
    Strawberry,
}

const REEL: [(Symbol, u32); 4] = [
    (Symbol::Cherry, 1),
    (Symbol::Banana, 1),
    (Symbol::Apple, 4),
    (Symbol::Strawberry, 5),
];

impl Symbol {
    /// Payout multiplier for a matching middle row.
    #[must_use]
    pub const fn multiplier(self) -> f64 {
        match self {
            Self::Cherry | Self::Banana => 3.0,
            Self::Apple => 2.0,
            Self::Strawberry => 1.5,
        }
    }

    /// Emoji shown on the reels.
    #[must_use]
    pub const fn emoji(self) -> &'static str {
        match self {
            Self::Cherry => "🍒",
            Self::Banana => "🍌",
            Self::Apple => "🍎",
            Self::Strawberry => "🍓",
        }
    }
}

/// The result of one pull: three rows of three symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pull {
    /// Rows top to bottom; the middle row pays.
    pub rows: [[Symbol; 3]; 3],
    /// The stake.
    pub amount: i64,
}

impl Pull {
    /// Pulls the lever for a stake of `amount`.
    pub fn play<R: Rng + ?Sized>(rng: &mut R, amount: i64) -> Self {
        let mut rows = [[Symbol::Strawberry; 3]; 3];
        for row in &mut rows {
            for slot in row.iter_mut() {
                *slot = pick_weighted(rng, &REEL);
            }
        }
        Self { rows, amount }
    }

    /// The symbol of a fully matching middle row.
    #[must_use]
    pub fn jackpot(&self) -> Option<Symbol> {
        let [first, rest @ ..] = self.rows[1];
        rest.iter().all(|s| *s == first).then_some(first)
    }

    /// Coins credited on a win, or zero.
    #[must_use]
    pub fn winnings(&self) -> i64 {
        self.jackpot()
            .map_or(0, |symbol| multiply(self.amount, symbol.multiplier()))
    }

    /// Ledger increments: the winnings on a win, the stake debited on a loss.
    #[must_use]
    pub fn delta(&self) -> Delta {
        if self.jackpot().is_some() {
            Delta::bank(self.winnings()).add(Field::SlotsWon, 1)
        } else {
            Delta::bank(-self.amount).add(Field::SlotsLost, 1)
        }
    }
}
