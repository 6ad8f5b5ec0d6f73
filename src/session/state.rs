//! Per-identity session state and the fatigue model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity;
use crate::random::Randomness;
use crate::{Error, Result};

/// Fatigue configuration
///
/// Delays grow linearly with elapsed session time up to `max_increase`
/// (a fraction, `0.2` = +20%) once `saturation_minutes` have passed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FatigueConfig {
    /// Scale delays with elapsed session time
    pub enabled: bool,
    /// Delay increase reached at saturation
    pub max_increase: f64,
    /// Minutes until the increase saturates
    pub saturation_minutes: f64,
    /// Energy lost per generated action
    pub energy_decay_per_action: f64,
}

impl Default for FatigueConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_increase: 0.2,
            saturation_minutes: 30.0,
            energy_decay_per_action: 0.0005,
        }
    }
}

impl FatigueConfig {
    /// Validate the fatigue configuration
    pub fn validate(&self) -> Result<()> {
        if !self.max_increase.is_finite() || self.max_increase < 0.0 {
            return Err(Error::configuration("fatigue.max_increase must be >= 0"));
        }
        if !self.saturation_minutes.is_finite() || self.saturation_minutes <= 0.0 {
            return Err(Error::configuration("fatigue.saturation_minutes must be > 0"));
        }
        if !(0.0..=1.0).contains(&self.energy_decay_per_action) {
            return Err(Error::configuration(
                "fatigue.energy_decay_per_action must be within [0, 1]",
            ));
        }
        Ok(())
    }

    /// Share of the saturation window that has elapsed, in `[0, 1]`
    fn progress(&self, start: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
        let elapsed_ms = (now - start).num_milliseconds().max(0) as f64;
        (elapsed_ms / (self.saturation_minutes * 60_000.0)).min(1.0)
    }
}

/// One synthetic persona's evolving state
#[derive(Debug, Clone)]
pub struct SeededSession {
    identity: String,
    seed: u64,
    energy: f64,
    action_count: u64,
    session_start: DateTime<Utc>,
    rng: Randomness,
}

impl SeededSession {
    /// Start a fresh session for `identity`
    pub fn new(identity: &str, now: DateTime<Utc>) -> Self {
        let seed = identity::seed_for(identity);
        Self {
            identity: identity.to_string(),
            seed,
            energy: 1.0,
            action_count: 0,
            session_start: now,
            rng: Randomness::seeded(seed),
        }
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn energy(&self) -> f64 {
        self.energy
    }

    pub fn action_count(&self) -> u64 {
        self.action_count
    }

    pub fn session_start(&self) -> DateTime<Utc> {
        self.session_start
    }

    /// Generator threaded through every draw for this identity
    pub fn rng_mut(&mut self) -> &mut Randomness {
        &mut self.rng
    }

    /// Delay multiplier at `now` without recording an action
    pub fn fatigue_factor(&self, now: DateTime<Utc>, fatigue: &FatigueConfig) -> f64 {
        if !fatigue.enabled {
            return 1.0;
        }
        1.0 + fatigue.max_increase * fatigue.progress(self.session_start, now)
    }

    /// Record one generated action and return the delay multiplier for it.
    ///
    /// The first action re-anchors `session_start` at `now`, so a fresh or
    /// reset session always starts at a factor of exactly 1. Energy only
    /// ever decreases.
    pub fn begin_action(&mut self, now: DateTime<Utc>, fatigue: &FatigueConfig) -> f64 {
        if self.action_count == 0 {
            self.session_start = now;
        }
        self.action_count += 1;

        let progress = fatigue.progress(self.session_start, now);
        let energy = 1.0
            - 0.5 * progress
            - fatigue.energy_decay_per_action * self.action_count as f64;
        self.energy = energy.clamp(0.0, 1.0).min(self.energy);

        self.fatigue_factor(now, fatigue)
    }

    /// Serializable view of this session
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            identity: self.identity.clone(),
            seed: self.seed,
            energy: self.energy,
            action_count: self.action_count,
            session_start: self.session_start,
        }
    }
}

/// Serializable copy of a session's bookkeeping fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub identity: String,
    pub seed: u64,
    pub energy: f64,
    pub action_count: u64,
    pub session_start: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn epoch() -> DateTime<Utc> {
        DateTime::<Utc>::UNIX_EPOCH
    }

    #[test]
    fn test_new_session() {
        let session = SeededSession::new("alice", epoch());
        assert_eq!(session.identity(), "alice");
        assert_eq!(session.seed(), identity::seed_for("alice"));
        assert_eq!(session.energy(), 1.0);
        assert_eq!(session.action_count(), 0);
    }

    #[test]
    fn test_fatigue_saturates() {
        let fatigue = FatigueConfig::default();
        let session = SeededSession::new("alice", epoch());

        assert_eq!(session.fatigue_factor(epoch(), &fatigue), 1.0);

        let half = session.fatigue_factor(epoch() + Duration::minutes(15), &fatigue);
        assert!((half - 1.1).abs() < 1e-9);

        let full = session.fatigue_factor(epoch() + Duration::minutes(30), &fatigue);
        let beyond = session.fatigue_factor(epoch() + Duration::hours(5), &fatigue);
        assert!((full - 1.2).abs() < 1e-9);
        assert!((beyond - 1.2).abs() < 1e-9);
    }

    #[test]
    fn test_fatigue_disabled() {
        let fatigue = FatigueConfig {
            enabled: false,
            ..Default::default()
        };
        let mut session = SeededSession::new("alice", epoch());
        let factor = session.begin_action(epoch() + Duration::hours(1), &fatigue);
        assert_eq!(factor, 1.0);
        assert_eq!(session.action_count(), 1);
    }

    #[test]
    fn test_energy_monotonic_and_clamped() {
        let fatigue = FatigueConfig {
            energy_decay_per_action: 0.1,
            ..Default::default()
        };
        let mut session = SeededSession::new("carol", epoch());
        let mut previous = session.energy();
        for i in 0..30 {
            session.begin_action(epoch() + Duration::minutes(i), &fatigue);
            assert!(session.energy() <= previous);
            assert!((0.0..=1.0).contains(&session.energy()));
            previous = session.energy();
        }
        assert_eq!(session.energy(), 0.0);
    }

    #[test]
    fn test_clock_going_backwards_does_not_restore_energy() {
        let fatigue = FatigueConfig::default();
        let mut session = SeededSession::new("dave", epoch());
        session.begin_action(epoch() + Duration::minutes(20), &fatigue);
        let tired = session.energy();
        session.begin_action(epoch(), &fatigue);
        assert!(session.energy() <= tired);
    }

    #[test]
    fn test_fatigue_validation() {
        assert!(FatigueConfig::default().validate().is_ok());
        let bad = FatigueConfig {
            saturation_minutes: 0.0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
        let bad = FatigueConfig {
            max_increase: -0.5,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_snapshot_fields() {
        let fatigue = FatigueConfig::default();
        let mut session = SeededSession::new("erin", epoch());
        session.begin_action(epoch(), &fatigue);
        let snapshot = session.snapshot();
        assert_eq!(snapshot.identity, "erin");
        assert_eq!(snapshot.action_count, 1);
        assert_eq!(snapshot.session_start, epoch());
    }

    #[test]
    fn test_first_action_anchors_session_start() {
        let fatigue = FatigueConfig::default();
        let mut session = SeededSession::new("frank", epoch());

        // Created well before the first action, e.g. behind a lock wait
        let first = epoch() + Duration::minutes(12);
        assert_eq!(session.begin_action(first, &fatigue), 1.0);
        assert_eq!(session.session_start(), first);

        let later = session.begin_action(first + Duration::minutes(15), &fatigue);
        assert!((later - 1.1).abs() < 1e-9);
        assert_eq!(session.session_start(), first);
    }
}
