extern crate alloc;

use alloc::format;
use alloc::vec::Vec;
use core::time::Duration;

use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info, warn};

use super::{Casino, Command, actions};
use crate::blackjack::{Action, Session};
use crate::error::GameError;
use crate::options::AbandonPolicy;
use crate::presenter::{Render, Reply, TableView};
use crate::record::{Delta, UserId};
use crate::result::{Outcome, Settlement};
use crate::table::InteractionId;

impl Casino {
    /// Debits the stake and deals a new session.
    pub(super) async fn start_blackjack(&self, actor: UserId, amount: i64) -> Result<Reply, GameError> {
        self.cooldowns.check(actor, actions::BLACKJACK).await?;
        self.validate_bet(actor, amount).await?;
        self.ledger.apply_delta(actor, &Delta::bank(-amount)).await?;

        let mut session = match Session::deal(actor, amount, self.decks.next_deck(), &self.options) {
            Ok(session) => session,
            Err(err) => {
                self.ledger.apply_delta(actor, &Delta::bank(amount)).await?;
                return Err(err.into());
            }
        };

        if session.is_resolved() {
            return match self.settle(&mut session).await {
                Ok(reply) => Ok(reply),
                Err(err) => {
                    // Keep the unpaid session so the sweeper can retry the payout.
                    let id = self.sessions.insert(actor, AsyncMutex::new(session));
                    warn!(session = %id, bettor = %actor, "blackjack payout pending");
                    Err(err)
                }
            };
        }

        let render = self.turn_render(&session);
        let id = self.sessions.insert(actor, AsyncMutex::new(session));
        info!(session = %id, bettor = %actor, bet = amount, "blackjack session started");

        Ok(Reply::Public(with_turn_controls(render, id)))
    }

    /// Applies a hit or stay to a running session.
    ///
    /// Returns `Ok(None)` when the session is mid-transition. A session that
    /// resolved but whose payout could not be written is settled again
    /// instead.
    pub(super) async fn blackjack_action(
        &self,
        actor: UserId,
        id: InteractionId,
        action: Action,
    ) -> Result<Option<Reply>, GameError> {
        let slot = self.sessions.get(id).ok_or(GameError::Expired)?;
        if slot.owner() != actor {
            return Err(GameError::NotTargetOfAction);
        }

        let Some(mut session) = slot.try_claim() else {
            debug!(session = %id, ?action, "session busy, action dropped");
            return Ok(None);
        };

        if !session.is_resolved() {
            session.act(actor, action)?;
            slot.touch();
        }

        if session.is_resolved() {
            let reply = self.settle(&mut session).await?;
            self.sessions.remove(id);
            return Ok(Some(reply));
        }

        let render = self.turn_render(&session);
        Ok(Some(Reply::Public(with_turn_controls(render, id))))
    }

    /// Credits a resolved session and renders its result.
    ///
    /// The session is only marked settled once the credit is written, so a
    /// failed write leaves the payout owed.
    async fn settle(&self, session: &mut Session) -> Result<Reply, GameError> {
        // Abandoned sessions resolve without a result.
        let resolution = session.resolution().ok_or(GameError::Expired)?;
        let settlement = self.pay_out(session).await?;
        info!(
            bettor = %session.bettor(),
            bet = settlement.bet,
            net = settlement.net(),
            reason = ?resolution.reason,
            "blackjack session resolved"
        );

        let verdict = match resolution.outcome() {
            Outcome::Won => format!("You win **{}** {}.", settlement.credit, self.coin),
            Outcome::Lost => format!("You lose **{}** {}.", settlement.bet, self.coin),
            Outcome::Tie => format!("Your **{}** {} are returned.", settlement.bet, self.coin),
        };
        let render = Render::text(
            resolution.reason.headline(),
            format!(
                "Your hand: **{}**.\nDealer's hand: **{}**.\n\n{verdict}",
                resolution.player_score, resolution.dealer_score
            ),
        )
        .with_table(table_view(session))
        .with_control(
            "Replay",
            Command::Blackjack {
                amount: settlement.bet,
            },
        );

        Ok(Reply::Public(render))
    }

    /// Writes the settlement still owed on `session` and marks it settled.
    ///
    /// An already settled session was finished by someone else and reads as
    /// expired.
    async fn pay_out(&self, session: &mut Session) -> Result<Settlement, GameError> {
        let settlement = session.pending_settlement().ok_or(GameError::Expired)?;
        let delta = settlement.delta();

        if let Err(err) = self.ledger.apply_delta(session.bettor(), &delta).await {
            return Err(GameError::UnexpectedFailure(format!(
                "blackjack payout to {} not written, still owed {:?} (bet {}): {err}",
                session.bettor(),
                delta.increments(),
                settlement.bet
            )));
        }

        session.settle();
        Ok(settlement)
    }

    /// Retries the payout of every resolved session left unpaid; returns how
    /// many were paid.
    async fn retry_payouts(&self) -> usize {
        let mut paid = 0;
        for (id, slot) in self.sessions.entries() {
            let Some(mut session) = slot.try_claim() else {
                continue;
            };
            if session.pending_settlement().is_none() {
                continue;
            }

            match self.pay_out(&mut session).await {
                Ok(settlement) => {
                    self.sessions.remove(id);
                    info!(session = %id, bettor = %session.bettor(), net = settlement.net(), "pending blackjack payout written");
                    paid += 1;
                }
                Err(err) => warn!(session = %id, %err, "blackjack payout still pending"),
            }
        }
        paid
    }

    fn turn_render(&self, session: &Session) -> Render {
        Render::text(
            format!("Blackjack for {} {}", session.bet(), self.coin),
            format!(
                "Your hand: **{}**.\nDealer's hand: **{}**.",
                session.player().score(),
                session.dealer().score()
            ),
        )
        .with_table(table_view(session))
    }

    /// Ends idle sessions under the abandon policy; returns how many ended.
    ///
    /// Unpaid resolved sessions are paid out instead of expired.
    pub(super) async fn expire_sessions(&self) -> usize {
        let paid = self.retry_payouts().await;
        let timeout = Duration::from_secs(self.options.idle_timeout_secs);
        let mut stakes = Vec::new();
        let expired = self.sessions.expire_idle(timeout, |slot| {
            // A busy session is mid-action and not idle after all.
            let Some(mut session) = slot.try_claim() else {
                return false;
            };
            if session.pending_settlement().is_some() {
                return false;
            }
            if let Some(bet) = session.abandon() {
                stakes.push((session.bettor(), bet));
            }
            true
        });

        for (bettor, bet) in stakes {
            match self.options.abandon_policy {
                AbandonPolicy::Forfeit => {
                    info!(%bettor, bet, "idle blackjack session forfeited");
                }
                AbandonPolicy::Refund => {
                    if let Err(err) = self.ledger.apply_delta(bettor, &Delta::bank(bet)).await {
                        warn!(%bettor, bet, %err, "failed to refund idle blackjack session");
                    } else {
                        info!(%bettor, bet, "idle blackjack session refunded");
                    }
                }
            }
        }

        paid + expired.len()
    }
}

fn table_view(session: &Session) -> TableView {
    TableView {
        dealer: session.dealer().cards().to_vec(),
        player: session.player().cards().to_vec(),
    }
}

fn with_turn_controls(render: Render, id: InteractionId) -> Render {
    Action::CHOICES.iter().fold(render, |render, &action| {
        render.with_control(action.label(), Command::BlackjackAction { session: id, action })
    })
}
