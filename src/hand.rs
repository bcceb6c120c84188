//! Hand representation and scoring.

extern crate alloc;

use alloc::vec::Vec;

use crate::card::{ACE, Card, JACK, KING, MIN_RANK, QUEEN};

/// Score at which a hand is a blackjack; anything above busts.
pub const BLACKJACK: u8 = 21;

const fn card_value(rank: u8) -> u8 {
    match rank {
        MIN_RANK..=10 => rank,
        JACK | QUEEN | KING => 10,
        ACE => 11,
        _ => 0,
    }
}

/// Scores a set of cards.
///
/// Face-down cards count for nothing. Aces count 11 each, then drop to 1 one
/// at a time while the total is over 21, so the result only exceeds 21 when
/// every ace is already counted as 1.
#[must_use]
pub fn score(cards: &[Card]) -> u8 {
    let mut value: u8 = 0;
    let mut aces: u8 = 0;

    for card in cards.iter().filter(|c| !c.is_face_down()) {
        if card.is_ace() {
            aces += 1;
        }
        value = value.saturating_add(card_value(card.rank));
    }

    while value > BLACKJACK && aces > 0 {
        value -= 10;
        aces -= 1;
    }

    value
}

/// Cards held by one participant.
///
/// The score is cached and recomputed every time a card is added or flipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hand {
    cards: Vec<Card>,
    score: u8,
}

impl Hand {
    /// Creates a new empty hand.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cards: Vec::new(),
            score: 0,
        }
    }

    /// Adds a card to the hand.
    pub fn add_card(&mut self, card: Card) {
        self.cards.push(card);
        self.score = score(&self.cards);
    }

    /// Turns every face-down card face up.
    ///
    /// Returns `true` if a card was flipped.
    pub fn reveal(&mut self) -> bool {
        let mut flipped = false;
        for card in self.cards.iter_mut().filter(|c| c.is_face_down()) {
            card.flip();
            flipped = true;
        }
        if flipped {
            self.score = score(&self.cards);
        }
        flipped
    }

    /// Returns the cards in the hand.
    #[must_use]
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Returns the score of the face-up cards.
    #[must_use]
    pub const fn score(&self) -> u8 {
        self.score
    }

    /// Returns whether any card is still face down.
    #[must_use]
    pub fn has_hidden(&self) -> bool {
        self.cards.iter().any(Card::is_face_down)
    }

    /// Returns whether the hand is bust.
    #[must_use]
    pub const fn is_bust(&self) -> bool {
        self.score > BLACKJACK
    }

    /// Returns the number of cards in the hand.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Returns whether the hand is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}
