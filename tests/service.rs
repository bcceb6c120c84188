//! Request pipeline tests against in-memory collaborators.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use cryptomc::config::BotConfig;
use cryptomc::cooldown::MemoryCooldownStore;
use cryptomc::error::LedgerError;
use cryptomc::ledger::{Ledger, MemoryLedger};
use cryptomc::minigame::{Color, Reward};
use cryptomc::presenter::{PresentError, Presenter, Reply};
use cryptomc::table::InteractionId;
use cryptomc::{
    AbandonPolicy, Action, Card, Casino, Command, Deck, Delta, Field, GameError, Request, Suit,
    UserId, UserRecord,
};

const ALICE: UserId = UserId(1);
const BOB: UserId = UserId(2);
const BOT: UserId = UserId(1000);

#[derive(Default)]
struct Recorder {
    sent: Mutex<Vec<(UserId, Reply)>>,
    reports: Mutex<Vec<String>>,
}

impl Recorder {
    fn sent(&self) -> Vec<(UserId, Reply)> {
        self.sent.lock().unwrap().clone()
    }

    fn reports(&self) -> Vec<String> {
        self.reports.lock().unwrap().clone()
    }
}

#[async_trait]
impl Presenter for Recorder {
    async fn send(&self, to: UserId, reply: Reply) -> Result<(), PresentError> {
        self.sent.lock().unwrap().push((to, reply));
        Ok(())
    }

    async fn report_failure(&self, report: &str) -> Result<(), PresentError> {
        self.reports.lock().unwrap().push(report.to_string());
        Ok(())
    }
}

struct BrokenLedger;

#[async_trait]
impl Ledger for BrokenLedger {
    async fn fetch_balance(&self, _user: UserId) -> Result<UserRecord, LedgerError> {
        Err(LedgerError::Unavailable("connection refused by database host".into()))
    }

    async fn apply_delta(&self, _user: UserId, _delta: &Delta) -> Result<(), LedgerError> {
        Err(LedgerError::Unavailable("connection refused by database host".into()))
    }
}

struct PanickingLedger;

#[async_trait]
impl Ledger for PanickingLedger {
    async fn fetch_balance(&self, _user: UserId) -> Result<UserRecord, LedgerError> {
        panic!("ledger exploded");
    }

    async fn apply_delta(&self, _user: UserId, _delta: &Delta) -> Result<(), LedgerError> {
        panic!("ledger exploded");
    }
}

/// Memory ledger whose `apply_delta` fails on the listed calls, counted
/// from 1.
struct FlakyLedger {
    inner: Arc<MemoryLedger>,
    writes: AtomicUsize,
    failing: Vec<usize>,
}

#[async_trait]
impl Ledger for FlakyLedger {
    async fn fetch_balance(&self, user: UserId) -> Result<UserRecord, LedgerError> {
        self.inner.fetch_balance(user).await
    }

    async fn apply_delta(&self, user: UserId, delta: &Delta) -> Result<(), LedgerError> {
        let call = self.writes.fetch_add(1, Ordering::SeqCst) + 1;
        if self.failing.contains(&call) {
            return Err(LedgerError::Unavailable("write timed out".into()));
        }
        self.inner.apply_delta(user, delta).await
    }
}

struct Fixture {
    casino: Arc<Casino>,
    ledger: Arc<MemoryLedger>,
    presenter: Arc<Recorder>,
}

impl Fixture {
    async fn run(&self, actor: UserId, command: Command) -> Result<Option<Reply>, GameError> {
        self.casino.execute(Request::new(actor, command)).await
    }

    async fn bank(&self, user: UserId) -> i64 {
        self.record(user).await.bank()
    }

    async fn record(&self, user: UserId) -> UserRecord {
        self.ledger.fetch_balance(user).await.unwrap()
    }
}

fn config() -> BotConfig {
    BotConfig {
        bot_user_id: Some(BOT.0),
        seed: Some(7),
        ..BotConfig::default()
    }
}

fn fixture_with(config: &BotConfig, draws: Vec<Card>) -> Fixture {
    let ledger = Arc::new(MemoryLedger::new());
    ledger.insert_document(ALICE, [("bank", 1000)]);
    ledger.insert_document(BOB, [("bank", 1000)]);
    let presenter = Arc::new(Recorder::default());

    let casino = Casino::new(
        config,
        ledger.clone(),
        Arc::new(MemoryCooldownStore::new()),
        presenter.clone(),
    )
    .with_deck_source(move || Deck::from_draws(&draws));

    Fixture {
        casino: Arc::new(casino),
        ledger,
        presenter,
    }
}

/// Like [`fixture`], but the listed ledger writes fail.
fn flaky_fixture(draws: &[(Suit, u8)], failing: &[usize]) -> Fixture {
    let draws: Vec<Card> = draws.iter().map(|&(suit, rank)| Card::new(suit, rank)).collect();
    let ledger = Arc::new(MemoryLedger::new());
    ledger.insert_document(ALICE, [("bank", 1000)]);
    ledger.insert_document(BOB, [("bank", 1000)]);
    let presenter = Arc::new(Recorder::default());
    let flaky = FlakyLedger {
        inner: ledger.clone(),
        writes: AtomicUsize::new(0),
        failing: failing.to_vec(),
    };

    let casino = Casino::new(
        &config(),
        Arc::new(flaky),
        Arc::new(MemoryCooldownStore::new()),
        presenter.clone(),
    )
    .with_deck_source(move || Deck::from_draws(&draws));

    Fixture {
        casino: Arc::new(casino),
        ledger,
        presenter,
    }
}

fn fixture(draws: &[(Suit, u8)]) -> Fixture {
    let draws = draws.iter().map(|&(suit, rank)| Card::new(suit, rank)).collect();
    fixture_with(&config(), draws)
}

/// Player 10+6 against dealer 9 with a 7 in the hole.
const OPEN: [(Suit, u8); 4] = [
    (Suit::Hearts, 10),
    (Suit::Spades, 6),
    (Suit::Clubs, 9),
    (Suit::Diamonds, 7),
];

fn controls(reply: &Option<Reply>) -> Vec<Command> {
    match reply {
        Some(Reply::Public(render)) => render.controls.iter().map(|c| c.command).collect(),
        other => panic!("expected a public reply, got {other:?}"),
    }
}

fn session_of(reply: &Option<Reply>) -> InteractionId {
    controls(reply)
        .into_iter()
        .find_map(|command| match command {
            Command::BlackjackAction { session, .. } => Some(session),
            _ => None,
        })
        .expect("session controls")
}

fn action(session: InteractionId, action: Action) -> Command {
    Command::BlackjackAction { session, action }
}

#[tokio::test(start_paused = true)]
async fn staying_on_a_winning_hand_nets_the_bet() {
    let f = fixture(&[
        (Suit::Hearts, 13),
        (Suit::Spades, 12),
        (Suit::Clubs, 10),
        (Suit::Diamonds, 8),
    ]);

    let reply = f.run(ALICE, Command::Blackjack { amount: 100 }).await.unwrap();
    let id = session_of(&reply);
    assert_eq!(
        controls(&reply),
        vec![action(id, Action::Hit), action(id, Action::Stay)]
    );
    assert_eq!(f.bank(ALICE).await, 900);
    assert_eq!(f.casino.sessions().len(), 1);

    let reply = f.run(ALICE, action(id, Action::Stay)).await.unwrap();
    assert_eq!(controls(&reply), vec![Command::Blackjack { amount: 100 }]);

    let record = f.record(ALICE).await;
    assert_eq!(record.bank(), 1100);
    assert_eq!(record.get(Field::BlackjackWon), 1);
    assert!(f.casino.sessions().is_empty());
}

#[tokio::test(start_paused = true)]
async fn natural_21_settles_without_a_session() {
    let f = fixture(&[
        (Suit::Hearts, 14),
        (Suit::Spades, 13),
        (Suit::Clubs, 5),
        (Suit::Diamonds, 6),
    ]);

    let reply = f.run(ALICE, Command::Blackjack { amount: 100 }).await.unwrap();
    assert_eq!(controls(&reply), vec![Command::Blackjack { amount: 100 }]);
    assert_eq!(f.bank(ALICE).await, 1100);
    assert!(f.casino.sessions().is_empty());
}

#[tokio::test(start_paused = true)]
async fn a_push_leaves_the_balance_unchanged() {
    let f = fixture(&[
        (Suit::Hearts, 10),
        (Suit::Spades, 8),
        (Suit::Clubs, 9),
        (Suit::Diamonds, 9),
    ]);

    let reply = f.run(ALICE, Command::Blackjack { amount: 100 }).await.unwrap();
    f.run(ALICE, action(session_of(&reply), Action::Stay))
        .await
        .unwrap();

    let record = f.record(ALICE).await;
    assert_eq!(record.bank(), 1000);
    assert_eq!(record.get(Field::BlackjackWon), 0);
    assert_eq!(record.get(Field::BlackjackLost), 0);
}

#[tokio::test(start_paused = true)]
async fn busting_loses_the_stake() {
    let mut draws = OPEN.to_vec();
    draws.push((Suit::Hearts, 12));
    let f = fixture(&draws);

    let reply = f.run(ALICE, Command::Blackjack { amount: 100 }).await.unwrap();
    f.run(ALICE, action(session_of(&reply), Action::Hit))
        .await
        .unwrap();

    let record = f.record(ALICE).await;
    assert_eq!(record.bank(), 900);
    assert_eq!(record.get(Field::BlackjackLost), 1);
    assert!(f.casino.sessions().is_empty());
}

#[tokio::test(start_paused = true)]
async fn bets_are_checked_before_anything_moves() {
    let f = fixture(&OPEN);

    assert_eq!(
        f.run(ALICE, Command::Blackjack { amount: 1001 }).await,
        Err(GameError::InsufficientFunds { requester: true })
    );
    assert_eq!(
        f.run(ALICE, Command::Blackjack { amount: 0 }).await,
        Err(GameError::InvalidAmount)
    );
    assert_eq!(
        f.run(ALICE, Command::Slots { amount: -5 }).await,
        Err(GameError::InvalidAmount)
    );
    assert_eq!(f.bank(ALICE).await, 1000);
    assert!(f.casino.sessions().is_empty());
}

#[tokio::test(start_paused = true)]
async fn users_may_run_several_sessions() {
    let mut draws = OPEN.to_vec();
    draws.push((Suit::Hearts, 2));
    let f = fixture(&draws);

    let first = f.run(ALICE, Command::Blackjack { amount: 100 }).await.unwrap();
    let second = f.run(ALICE, Command::Blackjack { amount: 100 }).await.unwrap();
    assert_ne!(session_of(&first), session_of(&second));
    assert_eq!(f.casino.sessions().len(), 2);
    assert_eq!(f.bank(ALICE).await, 800);
}

#[tokio::test(start_paused = true)]
async fn only_the_bettor_may_press_the_controls() {
    let f = fixture(&OPEN);

    let reply = f.run(ALICE, Command::Blackjack { amount: 100 }).await.unwrap();
    let id = session_of(&reply);

    assert_eq!(
        f.run(BOB, action(id, Action::Hit)).await,
        Err(GameError::NotTargetOfAction)
    );
    assert_eq!(f.casino.sessions().len(), 1);
    assert_eq!(f.bank(BOB).await, 1000);
}

#[tokio::test(start_paused = true)]
async fn actions_on_a_busy_session_are_dropped() {
    let f = fixture(&OPEN);

    let reply = f.run(ALICE, Command::Blackjack { amount: 100 }).await.unwrap();
    let id = session_of(&reply);
    let slot = f.casino.sessions().get(id).unwrap();
    let guard = slot.try_claim().unwrap();

    assert_eq!(f.run(ALICE, action(id, Action::Stay)).await, Ok(None));
    assert!(!guard.is_resolved());
    drop(guard);

    assert_eq!(f.bank(ALICE).await, 900);
    assert_eq!(f.casino.sessions().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn unknown_sessions_are_expired() {
    let f = fixture(&OPEN);
    assert_eq!(
        f.run(ALICE, action(InteractionId(99), Action::Hit)).await,
        Err(GameError::Expired)
    );
}

#[tokio::test(start_paused = true)]
async fn idle_sessions_forfeit_the_stake() {
    let f = fixture(&OPEN);

    let reply = f.run(ALICE, Command::Blackjack { amount: 100 }).await.unwrap();
    let id = session_of(&reply);

    tokio::time::advance(Duration::from_secs(30)).await;
    assert_eq!(f.casino.sweep().await, 0);

    tokio::time::advance(Duration::from_secs(31)).await;
    assert_eq!(f.casino.sweep().await, 1);
    assert!(f.casino.sessions().is_empty());
    assert_eq!(f.bank(ALICE).await, 900);

    assert_eq!(
        f.run(ALICE, action(id, Action::Stay)).await,
        Err(GameError::Expired)
    );
}

#[tokio::test(start_paused = true)]
async fn idle_sessions_refund_under_the_refund_policy() {
    let mut config = config();
    config.blackjack.abandon_policy = AbandonPolicy::Refund;
    let draws = OPEN.iter().map(|&(s, r)| Card::new(s, r)).collect();
    let f = fixture_with(&config, draws);

    f.run(ALICE, Command::Blackjack { amount: 100 }).await.unwrap();
    tokio::time::advance(Duration::from_secs(61)).await;

    assert_eq!(f.casino.sweep().await, 1);
    let record = f.record(ALICE).await;
    assert_eq!(record.bank(), 1000);
    assert_eq!(record.get(Field::BlackjackLost), 0);
}

#[tokio::test(start_paused = true)]
async fn activity_postpones_expiry() {
    let mut draws = OPEN.to_vec();
    draws.push((Suit::Hearts, 2));
    let f = fixture(&draws);

    let reply = f.run(ALICE, Command::Blackjack { amount: 100 }).await.unwrap();
    let id = session_of(&reply);

    tokio::time::advance(Duration::from_secs(50)).await;
    f.run(ALICE, action(id, Action::Hit)).await.unwrap();
    tokio::time::advance(Duration::from_secs(50)).await;

    assert_eq!(f.casino.sweep().await, 0);
    assert_eq!(f.casino.sessions().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn sweeping_skips_a_session_mid_action() {
    let f = fixture(&OPEN);

    let reply = f.run(ALICE, Command::Blackjack { amount: 100 }).await.unwrap();
    let slot = f.casino.sessions().get(session_of(&reply)).unwrap();
    let guard = slot.try_claim().unwrap();

    tokio::time::advance(Duration::from_secs(120)).await;
    assert_eq!(f.casino.sweep().await, 0);
    drop(guard);
    assert_eq!(f.casino.sweep().await, 1);
}

#[tokio::test(start_paused = true)]
async fn roulette_is_rate_limited() {
    let f = fixture(&OPEN);
    let spin = Command::Roulette {
        color: Color::Red,
        amount: 10,
    };

    f.run(ALICE, spin).await.unwrap();
    assert!(matches!(
        f.run(ALICE, spin).await,
        Err(GameError::OnCooldown { .. })
    ));
    f.run(BOB, spin).await.unwrap();

    tokio::time::advance(Duration::from_secs(3)).await;
    f.run(ALICE, spin).await.unwrap();

    let record = f.record(ALICE).await;
    assert_eq!(
        record.get(Field::RouletteWon) + record.get(Field::RouletteLost),
        2
    );
}

#[tokio::test(start_paused = true)]
async fn slots_record_every_pull() {
    let f = fixture(&OPEN);

    f.run(ALICE, Command::Slots { amount: 10 }).await.unwrap();
    let record = f.record(ALICE).await;
    assert_eq!(record.get(Field::SlotsWon) + record.get(Field::SlotsLost), 1);
    if record.get(Field::SlotsLost) == 1 {
        assert_eq!(record.bank(), 990);
    } else {
        assert!(record.bank() > 1000);
    }
}

#[tokio::test(start_paused = true)]
async fn coinflip_targets_are_checked() {
    let f = fixture(&OPEN);
    f.ledger.insert_document(UserId(3), [("bank", 5)]);

    assert_eq!(
        f.run(ALICE, Command::Coinflip { target: ALICE, amount: 10 }).await,
        Err(GameError::SelfTarget)
    );
    tokio::time::advance(Duration::from_secs(3)).await;
    assert_eq!(
        f.run(ALICE, Command::Coinflip { target: BOT, amount: 10 }).await,
        Err(GameError::BotTarget)
    );
    tokio::time::advance(Duration::from_secs(3)).await;
    assert_eq!(
        f.run(ALICE, Command::Coinflip { target: UserId(3), amount: 10 }).await,
        Err(GameError::InsufficientFunds { requester: false })
    );
    assert!(f.casino.challenges().is_empty());
}

#[tokio::test(start_paused = true)]
async fn accepted_coinflip_moves_the_stake_once() {
    let f = fixture(&OPEN);

    let reply = f
        .run(ALICE, Command::Coinflip { target: BOB, amount: 250 })
        .await
        .unwrap();
    let accept = controls(&reply)[0];
    assert!(matches!(accept, Command::AcceptCoinflip { .. }));
    assert_eq!(f.bank(ALICE).await, 1000);

    assert_eq!(f.run(ALICE, accept).await, Err(GameError::NotTargetOfAction));
    f.run(BOB, accept).await.unwrap();
    assert_eq!(f.run(BOB, accept).await, Err(GameError::Expired));

    let alice = f.record(ALICE).await;
    let bob = f.record(BOB).await;
    assert_eq!(alice.bank() + bob.bank(), 2000);
    assert!([750, 1250].contains(&alice.bank()));
    let (winner, loser) = if alice.bank() > 1000 { (&alice, &bob) } else { (&bob, &alice) };
    assert_eq!(winner.get(Field::CoinflipWon), 1);
    assert_eq!(winner.get(Field::CoinflipLost), 0);
    assert_eq!(loser.get(Field::CoinflipLost), 1);
    assert_eq!(loser.get(Field::CoinflipWon), 0);
    assert!(f.casino.challenges().is_empty());
}

#[tokio::test(start_paused = true)]
async fn coinflip_rechecks_funds_on_accept() {
    let f = fixture(&OPEN);

    let reply = f
        .run(ALICE, Command::Coinflip { target: BOB, amount: 600 })
        .await
        .unwrap();
    f.run(ALICE, Command::Pay { target: UserId(3), amount: 500 })
        .await
        .unwrap();

    assert_eq!(
        f.run(BOB, controls(&reply)[0]).await,
        Err(GameError::InsufficientFunds { requester: false })
    );
    assert_eq!(f.bank(BOB).await, 1000);
    assert_eq!(f.casino.challenges().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn stale_challenges_are_swept() {
    let f = fixture(&OPEN);
    f.run(ALICE, Command::Coinflip { target: BOB, amount: 10 })
        .await
        .unwrap();

    tokio::time::advance(Duration::from_secs(61)).await;
    assert_eq!(f.casino.sweep().await, 1);
    assert!(f.casino.challenges().is_empty());
}

#[tokio::test(start_paused = true)]
async fn pay_transfers_between_users() {
    let f = fixture(&OPEN);

    f.run(ALICE, Command::Pay { target: BOB, amount: 300 })
        .await
        .unwrap();
    assert_eq!(f.bank(ALICE).await, 700);
    assert_eq!(f.bank(BOB).await, 1300);

    assert_eq!(
        f.run(ALICE, Command::Pay { target: ALICE, amount: 1 }).await,
        Err(GameError::SelfTarget)
    );
    assert_eq!(
        f.run(ALICE, Command::Pay { target: BOB, amount: 701 }).await,
        Err(GameError::InsufficientFunds { requester: true })
    );
}

#[tokio::test(start_paused = true)]
async fn daily_reward_pays_once_a_day() {
    let f = fixture(&OPEN);

    f.run(ALICE, Command::Reward(Reward::Daily)).await.unwrap();
    let bank = f.bank(ALICE).await;
    assert!((3000..=4000).contains(&bank));

    tokio::time::advance(Duration::from_secs(60 * 60)).await;
    assert!(matches!(
        f.run(ALICE, Command::Reward(Reward::Daily)).await,
        Err(GameError::OnCooldown { .. })
    ));
    assert_eq!(f.bank(ALICE).await, bank);
}

#[tokio::test(start_paused = true)]
async fn profiles_default_missing_users_to_zero() {
    let f = fixture(&OPEN);

    let reply = f
        .run(ALICE, Command::Profile { user: Some(UserId(77)) })
        .await
        .unwrap();
    match reply {
        Some(Reply::Public(render)) => {
            assert!(render.title.contains("77"));
            assert!(render.description.contains("Bank: **0**"));
        }
        other => panic!("expected a public reply, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn preconditions_are_answered_privately() {
    let f = fixture(&OPEN);

    f.casino
        .handle(Request::new(ALICE, Command::Blackjack { amount: 5000 }))
        .await;

    let sent = f.presenter.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, ALICE);
    assert!(matches!(&sent[0].1, Reply::Ephemeral(text) if text.contains("not have enough")));
    assert!(f.presenter.reports().is_empty());
}

#[tokio::test(start_paused = true)]
async fn dropped_actions_send_nothing() {
    let f = fixture(&OPEN);

    let reply = f.run(ALICE, Command::Blackjack { amount: 100 }).await.unwrap();
    let id = session_of(&reply);
    let slot = f.casino.sessions().get(id).unwrap();
    let _guard = slot.try_claim().unwrap();

    f.casino.handle(Request::new(ALICE, action(id, Action::Hit))).await;
    assert!(f.presenter.sent().is_empty());
}

#[tokio::test(start_paused = true)]
async fn ledger_failures_are_reported_to_the_operator() {
    let mut config = config();
    config.operator_trace_limit = 24;
    let presenter = Arc::new(Recorder::default());
    let casino = Casino::new(
        &config,
        Arc::new(BrokenLedger),
        Arc::new(MemoryCooldownStore::new()),
        presenter.clone(),
    );

    casino
        .handle(Request::new(ALICE, Command::Slots { amount: 10 }))
        .await;

    let sent = presenter.sent();
    assert_eq!(sent.len(), 1);
    assert!(matches!(&sent[0].1, Reply::Ephemeral(text) if text.contains("Something went wrong")));

    let reports = presenter.reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].chars().count(), 24);
}

#[tokio::test(start_paused = true)]
async fn failed_deals_refund_the_stake() {
    let f = fixture_with(&config(), Vec::new());

    f.casino
        .handle(Request::new(ALICE, Command::Blackjack { amount: 100 }))
        .await;

    assert_eq!(f.bank(ALICE).await, 1000);
    assert!(f.casino.sessions().is_empty());
    assert_eq!(f.presenter.reports().len(), 1);
}

/// Player 20 stands against dealer 18.
const WINNING: [(Suit, u8); 4] = [
    (Suit::Hearts, 13),
    (Suit::Spades, 12),
    (Suit::Clubs, 10),
    (Suit::Diamonds, 8),
];

fn unexpected(result: Result<Option<Reply>, GameError>) -> String {
    match result {
        Err(GameError::UnexpectedFailure(diagnostic)) => diagnostic,
        other => panic!("expected an unexpected failure, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn unwritten_payouts_stay_owed_until_written() {
    // Write 1 is the stake, write 2 the payout.
    let f = flaky_fixture(&WINNING, &[2]);

    let reply = f.run(ALICE, Command::Blackjack { amount: 100 }).await.unwrap();
    let id = session_of(&reply);

    let diagnostic = unexpected(f.run(ALICE, action(id, Action::Stay)).await);
    assert!(diagnostic.contains("payout to 1"), "{diagnostic}");
    assert!(diagnostic.contains("(Bank, 200)"), "{diagnostic}");
    assert_eq!(f.bank(ALICE).await, 900);
    assert_eq!(f.casino.sessions().len(), 1);

    let reply = f.run(ALICE, action(id, Action::Stay)).await.unwrap();
    assert_eq!(controls(&reply), vec![Command::Blackjack { amount: 100 }]);
    let record = f.record(ALICE).await;
    assert_eq!(record.bank(), 1100);
    assert_eq!(record.get(Field::BlackjackWon), 1);
    assert!(f.casino.sessions().is_empty());

    assert_eq!(
        f.run(ALICE, action(id, Action::Stay)).await,
        Err(GameError::Expired)
    );
    assert_eq!(f.bank(ALICE).await, 1100);
}

#[tokio::test(start_paused = true)]
async fn sweeper_writes_an_unpaid_natural_21() {
    let f = flaky_fixture(
        &[
            (Suit::Hearts, 14),
            (Suit::Spades, 13),
            (Suit::Clubs, 5),
            (Suit::Diamonds, 6),
        ],
        &[2],
    );

    unexpected(f.run(ALICE, Command::Blackjack { amount: 100 }).await);
    assert_eq!(f.bank(ALICE).await, 900);
    assert_eq!(f.casino.sessions().len(), 1);

    assert_eq!(f.casino.sweep().await, 1);
    assert_eq!(f.bank(ALICE).await, 1100);
    assert!(f.casino.sessions().is_empty());

    assert_eq!(f.casino.sweep().await, 0);
    assert_eq!(f.bank(ALICE).await, 1100);
}

#[tokio::test(start_paused = true)]
async fn unpaid_sessions_are_not_forfeited_by_the_sweeper() {
    // Write 3 is the first retry, made by the sweep.
    let f = flaky_fixture(&WINNING, &[2, 3]);

    let reply = f.run(ALICE, Command::Blackjack { amount: 100 }).await.unwrap();
    let id = session_of(&reply);
    unexpected(f.run(ALICE, action(id, Action::Stay)).await);

    tokio::time::advance(Duration::from_secs(61)).await;
    assert_eq!(f.casino.sweep().await, 0);
    assert_eq!(f.casino.sessions().len(), 1);

    assert_eq!(f.casino.sweep().await, 1);
    assert_eq!(f.bank(ALICE).await, 1100);
}

#[tokio::test(start_paused = true)]
async fn failed_coinflip_credit_reverses_the_loser_debit() {
    // Write 1 debits the loser, write 2 credits the winner, write 3 reverses.
    let f = flaky_fixture(&OPEN, &[2]);

    let reply = f
        .run(ALICE, Command::Coinflip { target: BOB, amount: 250 })
        .await
        .unwrap();
    let diagnostic = unexpected(f.run(BOB, controls(&reply)[0]).await);
    assert!(diagnostic.contains("reversed"), "{diagnostic}");

    for user in [ALICE, BOB] {
        let record = f.record(user).await;
        assert_eq!(record.bank(), 1000);
        assert_eq!(record.get(Field::CoinflipWon), 0);
        assert_eq!(record.get(Field::CoinflipLost), 0);
    }
}

#[tokio::test(start_paused = true)]
async fn failed_pay_credit_reverses_the_debit() {
    let f = flaky_fixture(&OPEN, &[2]);

    unexpected(f.run(ALICE, Command::Pay { target: BOB, amount: 300 }).await);
    assert_eq!(f.bank(ALICE).await, 1000);
    assert_eq!(f.bank(BOB).await, 1000);
}

#[tokio::test(start_paused = true)]
async fn unbalanced_transfers_name_both_sides() {
    let f = flaky_fixture(&OPEN, &[2, 3]);

    let diagnostic = unexpected(f.run(ALICE, Command::Pay { target: BOB, amount: 300 }).await);
    assert!(diagnostic.contains("1 was debited [(Bank, -300)]"), "{diagnostic}");
    assert!(diagnostic.contains("2 was not credited [(Bank, 300)]"), "{diagnostic}");
    assert_eq!(f.bank(ALICE).await, 700);
    assert_eq!(f.bank(BOB).await, 1000);
}

#[tokio::test(start_paused = true)]
async fn panics_stay_inside_their_request() {
    let presenter = Arc::new(Recorder::default());
    let casino = Arc::new(Casino::new(
        &config(),
        Arc::new(PanickingLedger),
        Arc::new(MemoryCooldownStore::new()),
        presenter.clone(),
    ));

    casino
        .dispatch(Request::new(ALICE, Command::Profile { user: None }))
        .await;
    casino
        .dispatch(Request::new(BOB, Command::Profile { user: None }))
        .await;

    let sent = presenter.sent();
    assert_eq!(sent.len(), 2);
    assert!(sent.iter().all(|(_, reply)| matches!(reply, Reply::Ephemeral(_))));

    let reports = presenter.reports();
    assert_eq!(reports.len(), 2);
    assert!(reports[0].contains("ledger exploded"));
}
