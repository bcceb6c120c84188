//! Timed rewards: mining, work shifts, hourly and daily collections.

use core::ops::RangeInclusive;

use rand::Rng;

use crate::record::Delta;

use super::pick_weighted;

/// A job picked for a work shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Job {
    /// Script developer.
    ScriptDeveloper,
    /// Web developer.
    WebDeveloper,
    /// Graphic designer.
    Designer,
    /// System administrator.
    SysAdmin,
    /// Map builder.
    Builder,
    /// Copywriter.
    Writer,
    /// Community manager.
    CommunityManager,
}

const JOBS: [(Job, u32); 7] = [
    (Job::ScriptDeveloper, 50),
    (Job::WebDeveloper, 3),
    (Job::Designer, 20),
    (Job::SysAdmin, 50),
    (Job::Builder, 20),
    (Job::Writer, 40),
    (Job::CommunityManager, 10),
];

impl Job {
    /// Pay range for one shift.
    #[must_use]
    pub const fn pay(self) -> RangeInclusive<i64> {
        match self {
            Self::ScriptDeveloper => 50..=100,
            Self::WebDeveloper => 300..=500,
            Self::Designer => 70..=130,
            Self::SysAdmin => 30..=50,
            Self::Builder => 60..=120,
            Self::Writer => 40..=100,
            Self::CommunityManager => 80..=150,
        }
    }

    /// Display name.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::ScriptDeveloper => "💻 Script developer",
            Self::WebDeveloper => "🖥️ Web developer",
            Self::Designer => "🎨 Designer",
            Self::SysAdmin => "🛠 Sys-admin",
            Self::Builder => "⛰️ Builder",
            Self::Writer => "🖊️ Writer",
            Self::CommunityManager => "🌐 Community manager",
        }
    }
}

/// A cooldown-gated reward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reward {
    /// Mine coins, every two hours.
    Mine,
    /// Work a shift, every twenty minutes.
    Work,
    /// Hourly collection.
    Hourly,
    /// Daily collection.
    Daily,
}

impl Reward {
    /// Action name used for cooldown keys.
    #[must_use]
    pub const fn action(self) -> &'static str {
        match self {
            Self::Mine => "mine",
            Self::Work => "work",
            Self::Hourly => "hourly",
            Self::Daily => "daily",
        }
    }

    /// Default cooldown in seconds.
    #[must_use]
    pub const fn cooldown_secs(self) -> u64 {
        match self {
            Self::Mine => 2 * 60 * 60,
            Self::Work => 20 * 60,
            Self::Hourly => 60 * 60,
            Self::Daily => 24 * 60 * 60,
        }
    }

    /// Rolls the reward.
    pub fn grant<R: Rng + ?Sized>(self, rng: &mut R) -> RewardGrant {
        let (job, range) = match self {
            Self::Mine => (None, 300..=600),
            Self::Work => {
                let job = pick_weighted(rng, &JOBS);
                (Some(job), job.pay())
            }
            Self::Hourly => (None, 100..=300),
            Self::Daily => (None, 2000..=3000),
        };
        RewardGrant {
            reward: self,
            job,
            amount: rng.random_range(range),
        }
    }
}

/// A rolled reward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewardGrant {
    /// Which reward was collected.
    pub reward: Reward,
    /// The job worked, for [`Reward::Work`].
    pub job: Option<Job>,
    /// Coins earned.
    pub amount: i64,
}

impl RewardGrant {
    /// Ledger increments for the grant.
    #[must_use]
    pub fn delta(&self) -> Delta {
        Delta::bank(self.amount)
    }
}
