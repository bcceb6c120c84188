extern crate alloc;

use alloc::vec::Vec;
use core::cmp::Ordering;

use crate::card::Card;
use crate::error::EmptyDeckError;
use crate::hand::BLACKJACK;
use crate::result::Reason;

use super::Session;

impl Session {
    /// Dealer draws until reaching the stand score.
    ///
    /// There is no soft-17 exception: any 17 stands.
    ///
    /// Returns the cards drawn by the dealer.
    pub(super) fn dealer_play(&mut self) -> Result<Vec<Card>, EmptyDeckError> {
        let mut drawn_cards = Vec::new();

        while self.dealer.score() < self.dealer_stands_on {
            let card = self.deck.draw()?;
            self.dealer.add_card(card);
            drawn_cards.push(card);
        }

        Ok(drawn_cards)
    }

    /// Compares the finished hands once the dealer has played.
    pub(super) fn showdown(&self) -> Reason {
        let dealer = self.dealer.score();
        let player = self.player.score();

        if dealer == BLACKJACK {
            return Reason::DealerBlackjack;
        }
        if dealer > BLACKJACK {
            return Reason::DealerBust;
        }

        match dealer.cmp(&player) {
            Ordering::Equal => Reason::Push,
            Ordering::Greater => Reason::DealerHigher,
            Ordering::Less => Reason::PlayerHigher,
        }
    }
}
