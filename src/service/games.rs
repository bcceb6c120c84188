extern crate alloc;

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use tracing::{info, warn};

use super::{Casino, Command, actions};
use crate::error::GameError;
use crate::minigame::{Challenge, Color, Pull, Reward, Spin, flip};
use crate::presenter::{Render, Reply};
use crate::record::{Delta, Field, UserId};
use crate::table::InteractionId;

impl Casino {
    pub(super) async fn roulette(&self, actor: UserId, color: Color, amount: i64) -> Result<Reply, GameError> {
        self.cooldowns.check(actor, actions::ROULETTE).await?;
        self.validate_bet(actor, amount).await?;

        let spin = self.rng.with(|rng| Spin::play(rng, color, amount));
        self.ledger.apply_delta(actor, &spin.delta()).await?;
        info!(%actor, amount, backed = %color, winning = %spin.winning, "roulette spun");

        let verdict = if spin.won() {
            format!("You won **{}** {}!", spin.winnings(), self.coin)
        } else {
            format!("You lost **{amount}** {}.", self.coin)
        };
        let render = Render::text(
            "💈 Roulette",
            format!("Result: {} {}\n\n{verdict}", spin.winning.emoji(), spin.winning),
        )
        .with_control("Replay", Command::Roulette { color, amount });

        Ok(Reply::Public(render))
    }

    pub(super) async fn slots(&self, actor: UserId, amount: i64) -> Result<Reply, GameError> {
        self.cooldowns.check(actor, actions::SLOTS).await?;
        self.validate_bet(actor, amount).await?;

        let pull = self.rng.with(|rng| Pull::play(rng, amount));
        self.ledger.apply_delta(actor, &pull.delta()).await?;
        info!(%actor, amount, jackpot = ?pull.jackpot(), "slots pulled");

        let reels = pull
            .rows
            .iter()
            .map(|row| row.iter().map(|symbol| symbol.emoji()).collect::<Vec<_>>().join(" "))
            .collect::<Vec<_>>()
            .join("\n");
        let verdict = if pull.jackpot().is_some() {
            format!("You won **{}** {}!", pull.winnings(), self.coin)
        } else {
            format!("You lost **{amount}** {}.", self.coin)
        };
        let render = Render::text("🎰 Slots", format!("{reels}\n\n{verdict}"))
            .with_control("Replay", Command::Slots { amount });

        Ok(Reply::Public(render))
    }

    /// Offers a coinflip to `target`; nothing moves until they accept.
    pub(super) async fn coinflip(&self, actor: UserId, target: UserId, amount: i64) -> Result<Reply, GameError> {
        self.cooldowns.check(actor, actions::COINFLIP).await?;
        self.validate_bet(actor, amount).await?;
        if target == actor {
            return Err(GameError::SelfTarget);
        }
        if self.bot_user == Some(target) {
            return Err(GameError::BotTarget);
        }
        if self.ledger.fetch_balance(target).await?.bank() < amount {
            return Err(GameError::InsufficientFunds { requester: false });
        }

        let challenge = Challenge {
            challenger: actor,
            target,
            amount,
        };
        let id = self.challenges.insert(target, challenge);
        info!(challenge = %id, challenger = %actor, %target, amount, "coinflip offered");

        let render = Render::text(
            "🪙 Coinflip",
            format!(
                "{target}, {actor} challenges you to a coinflip for **{amount}** {}.",
                self.coin
            ),
        )
        .with_control("Accept", Command::AcceptCoinflip { challenge: id });

        Ok(Reply::Public(render))
    }

    /// Settles a pending challenge; only its target may accept.
    pub(super) async fn accept_coinflip(&self, actor: UserId, id: InteractionId) -> Result<Reply, GameError> {
        let slot = self.challenges.get(id).ok_or(GameError::Expired)?;
        if slot.owner() != actor {
            return Err(GameError::NotTargetOfAction);
        }

        let challenge = *slot.value();
        // Balances may have moved since the offer.
        if self.ledger.fetch_balance(challenge.challenger).await?.bank() < challenge.amount {
            return Err(GameError::InsufficientFunds { requester: false });
        }
        if self.ledger.fetch_balance(actor).await?.bank() < challenge.amount {
            return Err(GameError::InsufficientFunds { requester: true });
        }
        if self.challenges.remove(id).is_none() {
            return Err(GameError::Expired);
        }

        let duel = self.rng.with(|rng| flip(rng, &challenge));
        self.transfer((duel.loser, duel.loser_delta()), (duel.winner, duel.winner_delta()))
            .await?;
        info!(challenge = %id, winner = %duel.winner, loser = %duel.loser, amount = duel.amount, "coinflip settled");

        let render = Render::text(
            "🪙 Coinflip",
            format!(
                "{} wins the coinflip and takes **{}** {} from {}.",
                duel.winner, duel.amount, self.coin, duel.loser
            ),
        );

        Ok(Reply::Public(render))
    }

    pub(super) async fn reward(&self, actor: UserId, reward: Reward) -> Result<Reply, GameError> {
        self.cooldowns.check(actor, reward.action()).await?;

        let grant = self.rng.with(|rng| reward.grant(rng));
        self.ledger.apply_delta(actor, &grant.delta()).await?;
        info!(%actor, reward = reward.action(), amount = grant.amount, "reward granted");

        let description = match grant.job {
            Some(job) => format!(
                "You worked as {} and earned **{}** {}.",
                job.title(),
                grant.amount,
                self.coin
            ),
            None => format!("You collected **{}** {}.", grant.amount, self.coin),
        };

        Ok(Reply::Public(Render::text(reward_title(reward), description)))
    }

    pub(super) async fn pay(&self, actor: UserId, target: UserId, amount: i64) -> Result<Reply, GameError> {
        if target == actor {
            return Err(GameError::SelfTarget);
        }
        self.validate_bet(actor, amount).await?;

        self.transfer((actor, Delta::bank(-amount)), (target, Delta::bank(amount)))
            .await?;
        info!(from = %actor, to = %target, amount, "coins transferred");

        Ok(Reply::Public(Render::text(
            "💸 Payment",
            format!("{actor} sent **{amount}** {} to {target}.", self.coin),
        )))
    }

    /// Applies a debit and its matching credit to two users.
    ///
    /// The debit goes first. If the credit then fails the debit is reversed;
    /// if the reversal fails too, the diagnostic names both deltas so the
    /// ledger can be fixed by hand.
    async fn transfer(&self, debit: (UserId, Delta), credit: (UserId, Delta)) -> Result<(), GameError> {
        let (payer, taken) = debit;
        let (payee, given) = credit;
        self.ledger.apply_delta(payer, &taken).await?;

        let Err(err) = self.ledger.apply_delta(payee, &given).await else {
            return Ok(());
        };

        match self.ledger.apply_delta(payer, &taken.reversed()).await {
            Ok(()) => {
                warn!(%payer, %payee, %err, "transfer credit failed, debit reversed");
                Err(GameError::UnexpectedFailure(format!(
                    "credit of {:?} to {payee} failed and the debit from {payer} was reversed: {err}",
                    given.increments()
                )))
            }
            Err(undo) => Err(GameError::UnexpectedFailure(format!(
                "transfer left unbalanced: {payer} was debited {:?} but {payee} was not credited {:?}: {err}; reversal failed: {undo}",
                taken.increments(),
                given.increments()
            ))),
        }
    }

    pub(super) async fn profile(&self, user: UserId) -> Result<Reply, GameError> {
        let record = self.ledger.fetch_balance(user).await?;

        let ratios = [
            ("Blackjack", Field::BlackjackWon, Field::BlackjackLost),
            ("Roulette", Field::RouletteWon, Field::RouletteLost),
            ("Slots", Field::SlotsWon, Field::SlotsLost),
            ("Coinflip", Field::CoinflipWon, Field::CoinflipLost),
        ]
        .iter()
        .map(|&(game, won, lost)| {
            format!(
                "{game}: {} won, {} lost, ratio {:.2}",
                record.get(won),
                record.get(lost),
                record.ratio(won, lost)
            )
        })
        .collect::<Vec<String>>()
        .join("\n");

        Ok(Reply::Public(Render::text(
            format!("Profile of {user}"),
            format!("Bank: **{}** {}\n\n{ratios}", record.bank(), self.coin),
        )))
    }
}

const fn reward_title(reward: Reward) -> &'static str {
    match reward {
        Reward::Mine => "⛏️ Mine",
        Reward::Work => "💼 Work",
        Reward::Hourly => "⏰ Hourly",
        Reward::Daily => "📅 Daily",
    }
}
