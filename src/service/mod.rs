//! Request handling.
//!
//! [`Casino`] runs every request through the same pipeline: cooldown claim,
//! balance precondition, game logic, ledger update, reply. Precondition
//! failures come back to the requester as private messages; anything else
//! gets a generic apology plus an operator report, and never takes down more
//! than the request that caused it.

extern crate alloc;

use alloc::boxed::Box;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::sync::Arc;
use core::time::Duration;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::blackjack::Action;
use crate::config::BotConfig;
use crate::cooldown::{CooldownStore, Cooldowns};
use crate::deck::{DeckSource, Shuffler};
use crate::error::GameError;
use crate::ledger::Ledger;
use crate::minigame::{Color, Reward};
use crate::options::GameOptions;
use crate::presenter::{Presenter, Reply};
use crate::record::{UserId, UserRecord};
use crate::sync::Mutex;
use crate::table::{ChallengeTable, InteractionId, SessionTable};

mod blackjack;
mod games;

/// Cooldown action names.
pub mod actions {
    /// Starting a blackjack session.
    pub const BLACKJACK: &str = "blackjack";
    /// Spinning the roulette.
    pub const ROULETTE: &str = "roulette";
    /// Pulling the slot machine.
    pub const SLOTS: &str = "slots";
    /// Issuing a coinflip challenge.
    pub const COINFLIP: &str = "coinflip";
}

const APOLOGY: &str = "Something went wrong while handling your request. The incident has been reported.";

/// What a user asked for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Start a blackjack session.
    Blackjack {
        /// Stake.
        amount: i64,
    },
    /// Hit or stay in a running session.
    BlackjackAction {
        /// The session.
        session: InteractionId,
        /// The decision.
        action: Action,
    },
    /// Spin the roulette.
    Roulette {
        /// Backed colour.
        color: Color,
        /// Stake.
        amount: i64,
    },
    /// Pull the slot machine.
    Slots {
        /// Stake.
        amount: i64,
    },
    /// Challenge another user to a coinflip.
    Coinflip {
        /// The challenged user.
        target: UserId,
        /// Amount each side puts up.
        amount: i64,
    },
    /// Accept a pending coinflip challenge.
    AcceptCoinflip {
        /// The challenge.
        challenge: InteractionId,
    },
    /// Collect a timed reward.
    Reward(Reward),
    /// Transfer coins to another user.
    Pay {
        /// Recipient.
        target: UserId,
        /// Amount.
        amount: i64,
    },
    /// Show a profile; the requester's own when `user` is `None`.
    Profile {
        /// Whose profile.
        user: Option<UserId>,
    },
}

/// A command and the user who issued it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Request {
    /// The acting user.
    pub actor: UserId,
    /// What they asked for.
    pub command: Command,
}

impl Request {
    /// Builds a request.
    #[must_use]
    pub const fn new(actor: UserId, command: Command) -> Self {
        Self { actor, command }
    }
}

/// The game service.
pub struct Casino {
    ledger: Arc<dyn Ledger>,
    cooldowns: Cooldowns,
    presenter: Arc<dyn Presenter>,
    sessions: SessionTable,
    challenges: ChallengeTable,
    decks: Box<dyn DeckSource>,
    rng: Mutex<ChaCha8Rng>,
    options: GameOptions,
    coin: String,
    bot_user: Option<UserId>,
    trace_limit: usize,
}

impl Casino {
    /// Builds the service from its configuration and collaborators.
    pub fn new(
        config: &BotConfig,
        ledger: Arc<dyn Ledger>,
        cooldown_store: Arc<dyn CooldownStore>,
        presenter: Arc<dyn Presenter>,
    ) -> Self {
        let (rng, decks) = match config.seed {
            Some(seed) => (
                ChaCha8Rng::seed_from_u64(seed),
                Shuffler::new(seed.wrapping_add(1)),
            ),
            None => (ChaCha8Rng::from_os_rng(), Shuffler::from_entropy()),
        };

        Self {
            ledger,
            cooldowns: Cooldowns::new(
                cooldown_store,
                config.cooldown_scope.as_str(),
                config.cooldown_policy(),
            ),
            presenter,
            sessions: SessionTable::new(),
            challenges: ChallengeTable::new(),
            decks: Box::new(decks),
            rng: Mutex::new(rng),
            options: config.game_options(),
            coin: config.coin.clone(),
            bot_user: config.bot_user_id.map(UserId),
            trace_limit: config.operator_trace_limit,
        }
    }

    /// Replaces the deck source used for new blackjack sessions.
    #[must_use]
    pub fn with_deck_source(mut self, decks: impl DeckSource + 'static) -> Self {
        self.decks = Box::new(decks);
        self
    }

    /// Active blackjack sessions.
    #[must_use]
    pub const fn sessions(&self) -> &SessionTable {
        &self.sessions
    }

    /// Pending coinflip challenges.
    #[must_use]
    pub const fn challenges(&self) -> &ChallengeTable {
        &self.challenges
    }

    /// Handles `request` on its own task.
    ///
    /// A panic while handling is contained to that task and reported like
    /// any other unexpected failure.
    pub async fn dispatch(self: &Arc<Self>, request: Request) {
        let this = Arc::clone(self);
        let task = tokio::spawn(async move { this.handle(request).await });

        if let Err(err) = task.await {
            let diagnostic = if err.is_panic() {
                let payload = err.into_panic();
                payload
                    .downcast_ref::<&str>()
                    .map(ToString::to_string)
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .map_or_else(|| String::from("panic"), |msg| format!("panic: {msg}"))
            } else {
                String::from("request task cancelled")
            };
            self.fail(request, &diagnostic).await;
        }
    }

    /// Handles `request` and delivers the reply.
    pub async fn handle(&self, request: Request) {
        let reply = match self.execute(request).await {
            Ok(Some(reply)) => reply,
            Ok(None) => return,
            Err(err) if err.is_precondition() => {
                debug!(actor = %request.actor, command = ?request.command, %err, "request rejected");
                Reply::Ephemeral(self.explain(&err))
            }
            Err(err) => {
                self.fail(request, &err.to_string()).await;
                return;
            }
        };

        self.send(request.actor, reply).await;
    }

    /// Runs `request` without delivering anything.
    ///
    /// Returns `Ok(None)` when the request is dropped because its session is
    /// busy with an earlier action.
    ///
    /// # Errors
    ///
    /// Returns the precondition or collaborator failure that stopped the
    /// request.
    pub async fn execute(&self, request: Request) -> Result<Option<Reply>, GameError> {
        let Request { actor, command } = request;
        match command {
            Command::Blackjack { amount } => self.start_blackjack(actor, amount).await.map(Some),
            Command::BlackjackAction { session, action } => {
                self.blackjack_action(actor, session, action).await
            }
            Command::Roulette { color, amount } => self.roulette(actor, color, amount).await.map(Some),
            Command::Slots { amount } => self.slots(actor, amount).await.map(Some),
            Command::Coinflip { target, amount } => {
                self.coinflip(actor, target, amount).await.map(Some)
            }
            Command::AcceptCoinflip { challenge } => {
                self.accept_coinflip(actor, challenge).await.map(Some)
            }
            Command::Reward(reward) => self.reward(actor, reward).await.map(Some),
            Command::Pay { target, amount } => self.pay(actor, target, amount).await.map(Some),
            Command::Profile { user } => self.profile(user.unwrap_or(actor)).await.map(Some),
        }
    }

    /// Expires idle sessions and challenges; returns how many were removed.
    pub async fn sweep(&self) -> usize {
        let sessions = self.expire_sessions().await;
        let timeout = Duration::from_secs(self.options.idle_timeout_secs);
        let challenges = self.challenges.expire_idle(timeout, |_| true);
        for (id, slot) in &challenges {
            debug!(challenge = %id, target = %slot.owner(), "coinflip challenge expired");
        }
        sessions + challenges.len()
    }

    /// Runs [`Self::sweep`] every `every` until the task is aborted.
    pub fn spawn_sweeper(self: Arc<Self>, every: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                self.sweep().await;
            }
        })
    }

    /// Checks a wager against the requester's balance.
    async fn validate_bet(&self, actor: UserId, amount: i64) -> Result<UserRecord, GameError> {
        if amount < 1 {
            return Err(GameError::InvalidAmount);
        }

        let record = self.ledger.fetch_balance(actor).await?;
        record.check_wager(amount)?;
        Ok(record)
    }

    /// Private message for a precondition failure.
    fn explain(&self, err: &GameError) -> String {
        match err {
            GameError::InvalidAmount => String::from("The amount must be at least 1."),
            GameError::InsufficientFunds { requester: true } => {
                format!("You do not have enough {} in your bank.", self.coin)
            }
            GameError::InsufficientFunds { requester: false } => {
                format!("The other player does not have enough {} in their bank.", self.coin)
            }
            GameError::OnCooldown { retry_after } => format!(
                "You are on cooldown. Try again in {:.2}s.",
                retry_after.as_secs_f64()
            ),
            GameError::NotTargetOfAction => String::from("This button is not meant for you."),
            GameError::SelfTarget => String::from("You cannot target yourself."),
            GameError::BotTarget => String::from("You cannot play against the bot."),
            GameError::Expired => String::from("This game is no longer active."),
            GameError::EmptyDeck(_) | GameError::UnexpectedFailure(_) => String::from(APOLOGY),
        }
    }

    /// Apologises to the requester and reports `diagnostic` to the operator.
    async fn fail(&self, request: Request, diagnostic: &str) {
        error!(actor = %request.actor, command = ?request.command, diagnostic, "request failed");

        let report = format!(
            "{:?} from {} failed: {diagnostic}",
            request.command, request.actor
        );
        if let Err(err) = self
            .presenter
            .report_failure(truncate(&report, self.trace_limit))
            .await
        {
            warn!(%err, "failed to report failure to operator");
        }

        self.send(request.actor, Reply::Ephemeral(String::from(APOLOGY)))
            .await;
    }

    async fn send(&self, to: UserId, reply: Reply) {
        if let Err(err) = self.presenter.send(to, reply).await {
            warn!(%to, %err, "failed to deliver reply");
        }
    }
}

/// Cuts `text` to at most `limit` characters.
fn truncate(text: &str, limit: usize) -> &str {
    text.char_indices()
        .nth(limit)
        .map_or(text, |(idx, _)| &text[..idx])
}
