//! Countdown clock for an attempt.
//!
//! The clock does not schedule anything itself. Its owner calls [`SessionClock::tick`]
//! once per elapsed second; the clock reports the expiry edge exactly once.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What a time limit of zero (or no time limit at all) means.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZeroLimitPolicy {
    /// No countdown; the learner submits when ready.
    #[default]
    Unlimited,
    /// The attempt expires as soon as it starts.
    Immediate,
}

impl fmt::Display for ZeroLimitPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZeroLimitPolicy::Unlimited => write!(f, "unlimited"),
            ZeroLimitPolicy::Immediate => write!(f, "immediate"),
        }
    }
}

impl FromStr for ZeroLimitPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "unlimited" | "none" => Ok(ZeroLimitPolicy::Unlimited),
            "immediate" => Ok(ZeroLimitPolicy::Immediate),
            other => Err(format!("unknown zero time limit policy: {other}")),
        }
    }
}

/// Outcome of a single clock tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// The clock is stopped or already expired; nothing changed.
    Idle,
    /// One second was counted. `remaining` is `None` for an unlimited clock.
    Counted { remaining: Option<u64> },
    /// This tick took the remaining time from one to zero.
    Expired,
}

/// Countdown timer that decrements once per tick while armed.
#[derive(Debug, Clone, Default)]
pub struct SessionClock {
    limited: bool,
    remaining: u64,
    elapsed: u64,
    armed: bool,
}

impl SessionClock {
    /// A stopped, unlimited clock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Initialize the remaining time and arm the countdown.
    ///
    /// A `total_secs` of zero is resolved through `policy`: `Unlimited` arms a
    /// clock that only counts elapsed time, `Immediate` leaves the clock
    /// expired and disarmed.
    pub fn start(&mut self, total_secs: u64, policy: ZeroLimitPolicy) {
        self.elapsed = 0;
        self.remaining = total_secs;
        match (total_secs, policy) {
            (0, ZeroLimitPolicy::Unlimited) => {
                self.limited = false;
                self.armed = true;
            }
            (0, ZeroLimitPolicy::Immediate) => {
                self.limited = true;
                self.armed = false;
            }
            _ => {
                self.limited = true;
                self.armed = true;
            }
        }
    }

    /// Count one second.
    pub fn tick(&mut self) -> Tick {
        if !self.armed {
            return Tick::Idle;
        }
        self.elapsed += 1;
        if !self.limited {
            return Tick::Counted { remaining: None };
        }

        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.armed = false;
            Tick::Expired
        } else {
            Tick::Counted {
                remaining: Some(self.remaining),
            }
        }
    }

    /// Disarm the countdown. Safe to call repeatedly and after expiry.
    pub fn stop(&mut self) {
        self.armed = false;
    }

    /// True once a limited clock has reached zero.
    pub fn is_expired(&self) -> bool {
        self.limited && self.remaining == 0
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Remaining seconds, or `None` when unlimited.
    pub fn remaining_secs(&self) -> Option<u64> {
        self.limited.then_some(self.remaining)
    }

    /// Seconds counted since `start`.
    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_down_and_expires_once() {
        let mut clock = SessionClock::new();
        clock.start(3, ZeroLimitPolicy::Unlimited);

        assert_eq!(clock.tick(), Tick::Counted { remaining: Some(2) });
        assert_eq!(clock.tick(), Tick::Counted { remaining: Some(1) });
        assert!(!clock.is_expired());
        assert_eq!(clock.tick(), Tick::Expired);
        assert!(clock.is_expired());

        for _ in 0..5 {
            assert_eq!(clock.tick(), Tick::Idle);
        }
        assert_eq!(clock.remaining_secs(), Some(0));
        assert_eq!(clock.elapsed_secs(), 3);
    }

    #[test]
    fn stop_is_idempotent() {
        let mut clock = SessionClock::new();
        clock.start(10, ZeroLimitPolicy::Unlimited);
        clock.tick();
        clock.stop();
        clock.stop();
        assert_eq!(clock.tick(), Tick::Idle);
        assert_eq!(clock.remaining_secs(), Some(9));
        assert!(!clock.is_expired());

        let mut expired = SessionClock::new();
        expired.start(1, ZeroLimitPolicy::Unlimited);
        assert_eq!(expired.tick(), Tick::Expired);
        expired.stop();
        assert!(expired.is_expired());
    }

    #[test]
    fn zero_limit_unlimited_counts_elapsed_only() {
        let mut clock = SessionClock::new();
        clock.start(0, ZeroLimitPolicy::Unlimited);
        for _ in 0..100 {
            assert_eq!(clock.tick(), Tick::Counted { remaining: None });
        }
        assert!(!clock.is_expired());
        assert_eq!(clock.remaining_secs(), None);
        assert_eq!(clock.elapsed_secs(), 100);
    }

    #[test]
    fn zero_limit_immediate_is_expired_at_start() {
        let mut clock = SessionClock::new();
        clock.start(0, ZeroLimitPolicy::Immediate);
        assert!(clock.is_expired());
        assert!(!clock.is_armed());
        assert_eq!(clock.tick(), Tick::Idle);
    }

    #[test]
    fn policy_parse() {
        assert_eq!(
            "Immediate".parse::<ZeroLimitPolicy>().unwrap(),
            ZeroLimitPolicy::Immediate
        );
        assert_eq!(ZeroLimitPolicy::default().to_string(), "unlimited");
        assert!("later".parse::<ZeroLimitPolicy>().is_err());
    }
}
