//! Deck building, shuffling and drawing.

extern crate alloc;

use alloc::vec::Vec;

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

use crate::card::{ACE, Card, DECK_SIZE, MIN_RANK, Suit};
use crate::error::EmptyDeckError;
use crate::sync::Mutex;

/// A single 52-card deck, drawn from the end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// Builds an ordered deck with every (suit, rank) pair exactly once.
    #[must_use]
    pub fn ordered() -> Self {
        let mut cards = Vec::with_capacity(DECK_SIZE);
        for rank in MIN_RANK..=ACE {
            for suit in Suit::ALL {
                cards.push(Card::new(suit, rank));
            }
        }
        Self { cards }
    }

    /// Builds a deck and applies a uniform Fisher-Yates shuffle.
    #[must_use]
    pub fn shuffled<R: rand::Rng + ?Sized>(rng: &mut R) -> Self {
        let mut deck = Self::ordered();
        deck.cards.shuffle(rng);
        deck
    }

    /// Builds a stacked deck that deals `draws` in the given order.
    #[must_use]
    pub fn from_draws(draws: &[Card]) -> Self {
        let mut cards = draws.to_vec();
        cards.reverse();
        Self { cards }
    }

    /// Removes and returns the next card.
    ///
    /// # Errors
    ///
    /// Returns [`EmptyDeckError`] when no cards are left.
    pub fn draw(&mut self) -> Result<Card, EmptyDeckError> {
        self.cards.pop().ok_or(EmptyDeckError)
    }

    /// Returns the number of cards left.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Returns whether the deck is exhausted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Returns the remaining cards, last one drawn first.
    #[must_use]
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }
}

/// Supplies a fresh deck for every new session.
pub trait DeckSource: Send + Sync {
    /// Returns a new deck.
    fn next_deck(&self) -> Deck;
}

impl<F> DeckSource for F
where
    F: Fn() -> Deck + Send + Sync,
{
    fn next_deck(&self) -> Deck {
        self()
    }
}

/// Shuffles fresh decks from a shared ChaCha generator.
pub struct Shuffler {
    rng: Mutex<ChaCha8Rng>,
}

impl Shuffler {
    /// Creates a shuffler with a fixed seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
        }
    }

    /// Creates a shuffler seeded from the operating system.
    #[cfg(feature = "std")]
    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(ChaCha8Rng::from_os_rng()),
        }
    }
}

impl DeckSource for Shuffler {
    fn next_deck(&self) -> Deck {
        self.rng.with(Deck::shuffled)
    }
}
