//! Card types.

use core::fmt;

/// Card suit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Suit {
    /// Clubs.
    Clubs,
    /// Diamonds.
    Diamonds,
    /// Hearts.
    Hearts,
    /// Spades.
    Spades,
}

impl Suit {
    /// All four suits, in deck-building order.
    pub const ALL: [Self; 4] = [Self::Clubs, Self::Diamonds, Self::Hearts, Self::Spades];

    /// Lowercase suit name, as used for card artwork lookups.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Clubs => "clubs",
            Self::Diamonds => "diamonds",
            Self::Hearts => "hearts",
            Self::Spades => "spades",
        }
    }
}

/// Lowest rank in a deck.
pub const MIN_RANK: u8 = 2;
/// Jack.
pub const JACK: u8 = 11;
/// Queen.
pub const QUEEN: u8 = 12;
/// King.
pub const KING: u8 = 13;
/// Ace. Aces rank highest; see [`crate::hand::score`] for how they count.
pub const ACE: u8 = 14;

/// Number of cards per deck.
pub const DECK_SIZE: usize = 52;

/// A playing card.
///
/// Suit and rank never change once the card is built. `face_down` is toggled
/// for the dealer's hole card and nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Card {
    /// The suit of the card.
    pub suit: Suit,
    /// The rank of the card (2..=10, 11 = Jack, 12 = Queen, 13 = King, 14 = Ace).
    pub rank: u8,
    face_down: bool,
}

impl Card {
    /// Creates a new face-up card.
    ///
    /// Note: This function does not validate the rank. Values outside 2..=14
    /// are accepted but score as zero.
    #[must_use]
    pub const fn new(suit: Suit, rank: u8) -> Self {
        Self {
            suit,
            rank,
            face_down: false,
        }
    }

    /// Returns this card turned face down.
    #[must_use]
    pub const fn turned_down(mut self) -> Self {
        self.face_down = true;
        self
    }

    /// Flips the card over.
    pub const fn flip(&mut self) {
        self.face_down = !self.face_down;
    }

    /// Returns whether the card is face down.
    #[must_use]
    pub const fn is_face_down(&self) -> bool {
        self.face_down
    }

    /// Returns whether the card is an ace.
    #[must_use]
    pub const fn is_ace(&self) -> bool {
        self.rank == ACE
    }

    /// Short symbol for the rank: `2`..`10`, `J`, `Q`, `K`, `A`.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self.rank {
            2 => "2",
            3 => "3",
            4 => "4",
            5 => "5",
            6 => "6",
            7 => "7",
            8 => "8",
            9 => "9",
            10 => "10",
            JACK => "J",
            QUEEN => "Q",
            KING => "K",
            ACE => "A",
            _ => "?",
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.face_down {
            return f.write_str("??");
        }
        let suit = match self.suit {
            Suit::Clubs => 'C',
            Suit::Diamonds => 'D',
            Suit::Hearts => 'H',
            Suit::Spades => 'S',
        };
        write!(f, "{}{suit}", self.symbol())
    }
}
