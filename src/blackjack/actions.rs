use crate::card::Card;
use crate::error::ActionError;
use crate::hand::BLACKJACK;
use crate::record::UserId;
use crate::result::Reason;

use super::{Action, Phase, Session};

impl Session {
    fn ensure_player_turn(&self, actor: UserId) -> Result<(), ActionError> {
        if actor != self.bettor {
            return Err(ActionError::NotTargetOfAction);
        }

        if self.phase != Phase::PlayerTurn {
            return Err(ActionError::InvalidState);
        }

        Ok(())
    }

    /// Applies a player decision submitted by `actor`.
    ///
    /// Returns the phase the session is in afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if `actor` is not the bettor, the session is not in
    /// the player's turn, or the deck runs out. On error the session is
    /// restored to where it was before the action.
    pub fn act(&mut self, actor: UserId, action: Action) -> Result<Phase, ActionError> {
        self.ensure_player_turn(actor)?;

        let before = self.clone();
        let applied = match action {
            Action::Hit => self.hit().map(drop),
            Action::Stay => self.stay(),
        };
        if let Err(err) = applied {
            *self = before;
            return Err(err);
        }

        Ok(self.phase)
    }

    /// Player action: draw one card.
    ///
    /// Reaching exactly 21 wins and going over loses; both reveal the hole
    /// card and resolve the session.
    fn hit(&mut self) -> Result<Card, ActionError> {
        let card = self.deck.draw()?;
        self.player.add_card(card);

        let score = self.player.score();
        if score == BLACKJACK {
            self.dealer.reveal();
            self.resolve(Reason::PlayerBlackjack);
        } else if score > BLACKJACK {
            self.dealer.reveal();
            self.resolve(Reason::PlayerBust);
        }

        Ok(card)
    }

    /// Player action: stay, reveal the hole card and let the dealer play.
    fn stay(&mut self) -> Result<(), ActionError> {
        self.phase = Phase::DealerTurn;
        self.dealer.reveal();

        self.dealer_play()?;
        let reason = self.showdown();
        self.resolve(reason);

        Ok(())
    }
}
