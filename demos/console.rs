//! Console casino demo.
//!
//! Plays as user 1 against an in-memory ledger. Type `help` for commands.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use cryptomc::config::BotConfig;
use cryptomc::cooldown::MemoryCooldownStore;
use cryptomc::ledger::MemoryLedger;
use cryptomc::minigame::{Color, Reward};
use cryptomc::presenter::{Control, PresentError, Presenter, Reply};
use cryptomc::{Card, Casino, Command, Request, UserId};
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "\
commands:
  bj <amount>                blackjack
  roulette <red|black|green> <amount>
  slots <amount>
  flip <user> <amount>       coinflip challenge
  pay <user> <amount>
  mine | work | hourly | daily
  profile [user]
  as <user>                  act as another user
  <n>                        press button n of the last reply
  q                          quit";

#[derive(Default)]
struct ConsolePresenter {
    controls: Mutex<Vec<Control>>,
}

impl ConsolePresenter {
    fn control(&self, index: usize) -> Option<Command> {
        let controls = self.controls.lock().ok()?;
        controls.get(index.checked_sub(1)?).map(|control| control.command)
    }
}

#[async_trait]
impl Presenter for ConsolePresenter {
    async fn send(&self, to: UserId, reply: Reply) -> Result<(), PresentError> {
        match reply {
            Reply::Ephemeral(text) => println!("(to {to} only) {text}"),
            Reply::Public(render) => {
                println!("== {} ==", render.title);
                println!("{}", render.description);
                if let Some(table) = &render.table {
                    println!("dealer: {}", row(&table.dealer));
                    println!("player: {}", row(&table.player));
                }
                for (index, control) in render.controls.iter().enumerate() {
                    println!("  [{}] {}", index + 1, control.label);
                }
                if let Ok(mut controls) = self.controls.lock() {
                    *controls = render.controls;
                }
            }
        }
        Ok(())
    }

    async fn report_failure(&self, report: &str) -> Result<(), PresentError> {
        eprintln!("operator report: {report}");
        Ok(())
    }
}

fn row(cards: &[Card]) -> String {
    cards.iter().map(ToString::to_string).collect::<Vec<_>>().join(" ")
}

fn parse(line: &str, presenter: &ConsolePresenter) -> Option<Command> {
    let words: Vec<&str> = line.split_whitespace().collect();
    let amount = |index: usize| words.get(index).and_then(|w| w.parse::<i64>().ok());
    let user = |index: usize| words.get(index).and_then(|w| w.parse::<u64>().ok()).map(UserId);

    match words.as_slice() {
        ["bj", _] => Some(Command::Blackjack { amount: amount(1)? }),
        ["roulette", color, _] => Some(Command::Roulette {
            color: color.parse::<Color>().ok()?,
            amount: amount(2)?,
        }),
        ["slots", _] => Some(Command::Slots { amount: amount(1)? }),
        ["flip", _, _] => Some(Command::Coinflip {
            target: user(1)?,
            amount: amount(2)?,
        }),
        ["pay", _, _] => Some(Command::Pay {
            target: user(1)?,
            amount: amount(2)?,
        }),
        ["mine"] => Some(Command::Reward(Reward::Mine)),
        ["work"] => Some(Command::Reward(Reward::Work)),
        ["hourly"] => Some(Command::Reward(Reward::Hourly)),
        ["daily"] => Some(Command::Reward(Reward::Daily)),
        ["profile"] => Some(Command::Profile { user: None }),
        ["profile", _] => Some(Command::Profile { user: Some(user(1)?) }),
        [index] => presenter.control(index.parse().ok()?),
        _ => None,
    }
}

#[tokio::main]
async fn main() {
    cryptomc::telemetry::init("cryptomc=info");

    let config = BotConfig {
        bot_user_id: Some(1000),
        ..BotConfig::default()
    };

    let ledger = Arc::new(MemoryLedger::new());
    for user in [UserId(1), UserId(2)] {
        ledger.insert_document(user, [("bank", 1000)]);
    }
    let cooldowns = Arc::new(MemoryCooldownStore::new());
    let presenter = Arc::new(ConsolePresenter::default());

    let casino = Arc::new(Casino::new(
        &config,
        ledger,
        cooldowns.clone(),
        presenter.clone(),
    ));
    let sweeper = Arc::clone(&casino).spawn_sweeper(config.sweep_interval());
    let purger = cooldowns.spawn_sweeper(config.sweep_interval());

    println!("Console casino (type 'help' for commands)");
    let mut actor = UserId(1);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Ok(Some(line)) = lines.next_line().await {
        let line = line.trim();
        match line {
            "" => continue,
            "q" | "quit" => break,
            "help" => {
                println!("{HELP}");
                continue;
            }
            _ => {}
        }

        if let Some(user) = line.strip_prefix("as ") {
            match user.trim().parse() {
                Ok(id) => {
                    actor = UserId(id);
                    println!("now acting as {actor}");
                }
                Err(_) => println!("not a user id: {user}"),
            }
            continue;
        }

        match parse(line, &presenter) {
            Some(command) => casino.dispatch(Request::new(actor, command)).await,
            None => println!("unknown command, type 'help'"),
        }
    }

    sweeper.abort();
    purger.abort();
}
