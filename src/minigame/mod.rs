//! Single-shot games and rewards.
//!
//! Each game draws its outcome from a caller-supplied generator and reports
//! the [`Delta`](crate::record::Delta) to apply. Nothing here touches a
//! ledger.

use rand::Rng;

pub mod coinflip;
pub mod reward;
pub mod roulette;
pub mod slots;

pub use coinflip::{Challenge, Duel, flip};
pub use reward::{Job, Reward, RewardGrant};
pub use roulette::{Color, Spin};
pub use slots::{Pull, Symbol};

#[cfg(feature = "std")]
fn floor(amount: f64) -> f64 {
    amount.floor()
}

#[cfg(all(not(feature = "std"), feature = "alloc"))]
fn floor(amount: f64) -> f64 {
    libm::floor(amount)
}

/// Applies a payout multiplier, truncating to whole coins.
#[must_use]
pub fn multiply(amount: i64, multiplier: f64) -> i64 {
    #[expect(
        clippy::cast_precision_loss,
        reason = "f64 has sufficient precision for monetary values"
    )]
    let scaled = amount as f64 * multiplier;
    floor(scaled) as i64
}

/// Picks one item with probability proportional to its weight.
///
/// # Panics
///
/// Panics if `table` is empty or every weight is zero.
pub(crate) fn pick_weighted<T: Copy, R: Rng + ?Sized>(rng: &mut R, table: &[(T, u32)]) -> T {
    let total: u32 = table.iter().map(|(_, w)| *w).sum();
    let mut roll = rng.random_range(0..total);
    for &(item, weight) in table {
        if roll < weight {
            return item;
        }
        roll -= weight;
    }
    table[table.len() - 1].0
}
