//! Bot configuration.
//!
//! Loaded from TOML. Every key is optional and falls back to the defaults
//! below:
//!
//! ```toml
//! coin = "Lulux Coins"
//! bot_user_id = 1000
//! cooldown_scope = "user"
//! sweep_interval_secs = 15
//! operator_trace_limit = 1500
//!
//! [cooldowns]
//! roulette = 3
//! daily = 86400
//!
//! [blackjack]
//! dealer_stands_on = 17
//! idle_timeout_secs = 60
//! abandon_policy = "forfeit"
//! ```

extern crate alloc;

use alloc::string::String;
use core::time::Duration;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::cooldown::CooldownPolicy;
use crate::error::ConfigError;
use crate::minigame::Reward;
use crate::options::{AbandonPolicy, GameOptions};
use crate::service::actions;

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Currency name shown in messages.
    pub coin: String,
    /// The bot's own account; coinflips against it are refused.
    pub bot_user_id: Option<u64>,
    /// Scope segment of cooldown keys.
    pub cooldown_scope: String,
    /// Cooldown per action, in seconds.
    pub cooldowns: CooldownSettings,
    /// Blackjack table settings.
    pub blackjack: BlackjackSettings,
    /// How often idle sessions, challenges and cooldowns are swept.
    pub sweep_interval_secs: u64,
    /// Maximum length of a diagnostic sent to the operator channel.
    pub operator_trace_limit: usize,
    /// Fixed generator seed; the OS seeds the generator when absent.
    pub seed: Option<u64>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            coin: String::from("Lulux Coins"),
            bot_user_id: None,
            cooldown_scope: String::from("user"),
            cooldowns: CooldownSettings::default(),
            blackjack: BlackjackSettings::default(),
            sweep_interval_secs: 15,
            operator_trace_limit: 1500,
            seed: None,
        }
    }
}

/// Cooldown durations in seconds; zero disables a cooldown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CooldownSettings {
    /// Blackjack session start.
    pub blackjack: u64,
    /// Roulette spin.
    pub roulette: u64,
    /// Slot pull.
    pub slots: u64,
    /// Coinflip challenge.
    pub coinflip: u64,
    /// Mining reward.
    pub mine: u64,
    /// Work shift.
    pub work: u64,
    /// Hourly collection.
    pub hourly: u64,
    /// Daily collection.
    pub daily: u64,
}

impl Default for CooldownSettings {
    fn default() -> Self {
        Self {
            blackjack: 0,
            roulette: 3,
            slots: 3,
            coinflip: 3,
            mine: Reward::Mine.cooldown_secs(),
            work: Reward::Work.cooldown_secs(),
            hourly: Reward::Hourly.cooldown_secs(),
            daily: Reward::Daily.cooldown_secs(),
        }
    }
}

/// Blackjack settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlackjackSettings {
    /// The dealer draws below this score.
    pub dealer_stands_on: u8,
    /// Seconds a session waits for the next action.
    pub idle_timeout_secs: u64,
    /// What happens to the stake of a timed-out session.
    pub abandon_policy: AbandonPolicy,
}

impl Default for BlackjackSettings {
    fn default() -> Self {
        let options = GameOptions::default();
        Self {
            dealer_stands_on: options.dealer_stands_on,
            idle_timeout_secs: options.idle_timeout_secs,
            abandon_policy: options.abandon_policy,
        }
    }
}

impl BotConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document does not parse or a value is out of
    /// range.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or
    /// [`BotConfig::from_toml_str`] rejects it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(2..=21).contains(&self.blackjack.dealer_stands_on) {
            return Err(ConfigError::Invalid {
                field: "blackjack.dealer_stands_on",
                reason: "must be between 2 and 21",
            });
        }
        if self.blackjack.idle_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "blackjack.idle_timeout_secs",
                reason: "must be positive",
            });
        }
        if self.sweep_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "sweep_interval_secs",
                reason: "must be positive",
            });
        }
        if self.cooldown_scope.is_empty() || self.cooldown_scope.contains(':') {
            return Err(ConfigError::Invalid {
                field: "cooldown_scope",
                reason: "must be non-empty and contain no `:`",
            });
        }
        Ok(())
    }

    /// Blackjack engine options.
    #[must_use]
    pub fn game_options(&self) -> GameOptions {
        GameOptions::default()
            .with_dealer_stands_on(self.blackjack.dealer_stands_on)
            .with_idle_timeout_secs(self.blackjack.idle_timeout_secs)
            .with_abandon_policy(self.blackjack.abandon_policy)
    }

    /// Cooldown durations keyed by action name.
    #[must_use]
    pub fn cooldown_policy(&self) -> CooldownPolicy {
        let c = &self.cooldowns;
        [
            (actions::BLACKJACK, c.blackjack),
            (actions::ROULETTE, c.roulette),
            (actions::SLOTS, c.slots),
            (actions::COINFLIP, c.coinflip),
            (Reward::Mine.action(), c.mine),
            (Reward::Work.action(), c.work),
            (Reward::Hourly.action(), c.hourly),
            (Reward::Daily.action(), c.daily),
        ]
        .into_iter()
        .fold(CooldownPolicy::empty(), |policy, (action, secs)| {
            policy.with(action, Duration::from_secs(secs))
        })
    }

    /// Sweep interval as a duration.
    #[must_use]
    pub const fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}
