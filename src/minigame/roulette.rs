//! Colour roulette.

use core::fmt;
use core::str::FromStr;

use rand::Rng;

use crate::record::{Delta, Field};

use super::{multiply, pick_weighted};

/// A roulette colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    /// Red, pays 1.25x.
    Red,
    /// Black, pays 1.25x.
    Black,
    /// Green, pays 3x.
    Green,
}

/// Draw weights out of 100.
const WHEEL: [(Color, u32); 3] = [(Color::Red, 48), (Color::Black, 48), (Color::Green, 4)];

impl Color {
    /// Payout multiplier when this colour wins.
    #[must_use]
    pub const fn multiplier(self) -> f64 {
        match self {
            Self::Red | Self::Black => 1.25,
            Self::Green => 3.0,
        }
    }

    /// Emoji shown in results.
    #[must_use]
    pub const fn emoji(self) -> &'static str {
        match self {
            Self::Red => "🔴",
            Self::Black => "⚫",
            Self::Green => "🟢",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Red => "red",
            Self::Black => "black",
            Self::Green => "green",
        })
    }
}

/// Error returned when parsing an unknown colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unknown roulette colour")]
pub struct UnknownColor;

impl FromStr for Color {
    type Err = UnknownColor;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "red" => Ok(Self::Red),
            "black" => Ok(Self::Black),
            "green" => Ok(Self::Green),
            _ => Err(UnknownColor),
        }
    }
}

/// The result of one spin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Spin {
    /// The colour that came up.
    pub winning: Color,
    /// The colour the player backed.
    pub backed: Color,
    /// The stake.
    pub amount: i64,
}

impl Spin {
    /// Spins the wheel for a stake of `amount` on `backed`.
    pub fn play<R: Rng + ?Sized>(rng: &mut R, backed: Color, amount: i64) -> Self {
        Self {
            winning: pick_weighted(rng, &WHEEL),
            backed,
            amount,
        }
    }

    /// Returns whether the backed colour came up.
    #[must_use]
    pub fn won(&self) -> bool {
        self.winning == self.backed
    }

    /// Coins credited on a win, or zero.
    #[must_use]
    pub fn winnings(&self) -> i64 {
        if self.won() {
            multiply(self.amount, self.winning.multiplier())
        } else {
            0
        }
    }

    /// Ledger increments: the winnings on a win, the stake debited on a loss.
    #[must_use]
    pub fn delta(&self) -> Delta {
        if self.won() {
            Delta::bank(self.winnings()).add(Field::RouletteWon, 1)
        } else {
            Delta::bank(-self.amount).add(Field::RouletteLost, 1)
        }
    }
}
