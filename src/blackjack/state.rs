//! Session phase and action types.

/// Session phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Initial cards are being dealt.
    Dealing,
    /// Waiting for the player to hit or stay.
    PlayerTurn,
    /// Dealer plays out their hand.
    DealerTurn,
    /// Outcome recorded; no further actions are accepted.
    Resolved,
}

/// A player decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Draw one more card.
    Hit,
    /// Keep the current hand and let the dealer play.
    Stay,
}

impl Action {
    /// The actions offered during the player's turn.
    pub const CHOICES: [Self; 2] = [Self::Hit, Self::Stay];

    /// Button label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Hit => "Hit",
            Self::Stay => "Stay",
        }
    }
}
