//! Blackjack table options.

/// What happens to the stake of a session abandoned mid-game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "std", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "std", serde(rename_all = "snake_case"))]
pub enum AbandonPolicy {
    /// The stake stays debited and no counter moves.
    #[default]
    Forfeit,
    /// The stake is credited back.
    Refund,
}

/// Configuration options for blackjack sessions.
///
/// Use the builder pattern to customize options:
///
/// ```
/// use cryptomc::{AbandonPolicy, GameOptions};
///
/// let options = GameOptions::default()
///     .with_dealer_stands_on(17)
///     .with_idle_timeout_secs(90)
///     .with_abandon_policy(AbandonPolicy::Refund);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameOptions {
    /// Dealer draws while below this score.
    pub dealer_stands_on: u8,
    /// Seconds a session may wait for the next player action.
    pub idle_timeout_secs: u64,
    /// Settlement applied to sessions that time out.
    pub abandon_policy: AbandonPolicy,
}

impl Default for GameOptions {
    fn default() -> Self {
        Self {
            dealer_stands_on: 17,
            idle_timeout_secs: 60,
            abandon_policy: AbandonPolicy::Forfeit,
        }
    }
}

impl GameOptions {
    /// Sets the score the dealer stands on.
    ///
    /// # Example
    ///
    /// ```
    /// use cryptomc::GameOptions;
    ///
    /// let options = GameOptions::default().with_dealer_stands_on(18);
    /// assert_eq!(options.dealer_stands_on, 18);
    /// ```
    #[must_use]
    pub const fn with_dealer_stands_on(mut self, score: u8) -> Self {
        self.dealer_stands_on = score;
        self
    }

    /// Sets the idle timeout in seconds.
    ///
    /// # Example
    ///
    /// ```
    /// use cryptomc::GameOptions;
    ///
    /// let options = GameOptions::default().with_idle_timeout_secs(30);
    /// assert_eq!(options.idle_timeout_secs, 30);
    /// ```
    #[must_use]
    pub const fn with_idle_timeout_secs(mut self, secs: u64) -> Self {
        self.idle_timeout_secs = secs;
        self
    }

    /// Sets the abandoned-session policy.
    ///
    /// # Example
    ///
    /// ```
    /// use cryptomc::{AbandonPolicy, GameOptions};
    ///
    /// let options = GameOptions::default().with_abandon_policy(AbandonPolicy::Refund);
    /// assert_eq!(options.abandon_policy, AbandonPolicy::Refund);
    /// ```
    #[must_use]
    pub const fn with_abandon_policy(mut self, policy: AbandonPolicy) -> Self {
        self.abandon_policy = policy;
        self
    }
}
