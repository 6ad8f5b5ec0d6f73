//! Transport profile registry
//!
//! Selects a handshake profile for an identity. Candidates are filtered
//! before any strategy runs; deterministic selections are pinned per
//! identity until the cache is cleared.

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::{debug, trace};

use super::profiles::{self, BrowserFamily, OperatingSystem, TransportProfile, PROFILES};
use crate::identity;
use crate::{Error, Result};

/// How a profile is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum RotationStrategy {
    /// Always the configured default profile
    Static,
    /// Uniform over candidates on every call, never pinned
    PerCall,
    /// Uniform by identity hash
    PerIdentity,
    /// Weighted by market share, keyed by identity hash
    #[default]
    Adaptive,
}

impl std::str::FromStr for RotationStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "static" => Ok(RotationStrategy::Static),
            "per-call" | "per_call" => Ok(RotationStrategy::PerCall),
            "per-identity" | "per_identity" => Ok(RotationStrategy::PerIdentity),
            "adaptive" => Ok(RotationStrategy::Adaptive),
            other => Err(Error::configuration(format!(
                "unknown rotation strategy '{}'",
                other
            ))),
        }
    }
}

/// Allowed browsers and operating systems; an empty list allows all
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileFilter {
    pub browsers: Vec<BrowserFamily>,
    pub operating_systems: Vec<OperatingSystem>,
}

impl ProfileFilter {
    /// Filter that admits every profile
    pub fn any() -> Self {
        Self::default()
    }

    pub fn browsers(browsers: &[BrowserFamily]) -> Self {
        Self {
            browsers: browsers.to_vec(),
            ..Default::default()
        }
    }

    pub fn operating_systems(operating_systems: &[OperatingSystem]) -> Self {
        Self {
            operating_systems: operating_systems.to_vec(),
            ..Default::default()
        }
    }

    pub fn matches(&self, profile: &TransportProfile) -> bool {
        (self.browsers.is_empty() || self.browsers.contains(&profile.browser))
            && (self.operating_systems.is_empty()
                || self.operating_systems.contains(&profile.os))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PinKey {
    identity: String,
    strategy: RotationStrategy,
    filter: ProfileFilter,
}

/// Registry over the static profile table
#[derive(Debug)]
pub struct TransportRegistry {
    profiles: &'static [TransportProfile],
    default_profile: &'static TransportProfile,
    pinned: RwLock<HashMap<PinKey, &'static TransportProfile>>,
}

impl TransportRegistry {
    /// Create a registry whose static strategy serves `default_profile`
    pub fn new(default_profile: &str) -> Result<Self> {
        let default_profile = profiles::find(default_profile).ok_or_else(|| {
            Error::configuration(format!("unknown transport profile '{}'", default_profile))
        })?;

        Ok(Self {
            profiles: PROFILES,
            default_profile,
            pinned: RwLock::new(HashMap::new()),
        })
    }

    /// Every profile in the table
    pub fn profiles(&self) -> &'static [TransportProfile] {
        self.profiles
    }

    pub fn default_profile(&self) -> &'static TransportProfile {
        self.default_profile
    }

    /// Profiles admitted by `filter`
    pub fn candidates(&self, filter: &ProfileFilter) -> Result<Vec<&'static TransportProfile>> {
        let candidates: Vec<_> = self.profiles.iter().filter(|p| filter.matches(p)).collect();
        if candidates.is_empty() {
            return Err(Error::configuration(format!(
                "no transport profile matches browsers {:?} / operating systems {:?}",
                filter.browsers, filter.operating_systems
            )));
        }
        Ok(candidates)
    }

    /// Check that `strategy` can serve a profile under `filter`
    pub fn validate(&self, strategy: RotationStrategy, filter: &ProfileFilter) -> Result<()> {
        self.candidates(filter)?;
        if strategy == RotationStrategy::Static {
            self.static_profile(filter)?;
        }
        Ok(())
    }

    /// Select the profile for `identity`
    pub fn profile_for(
        &self,
        identity: &str,
        strategy: RotationStrategy,
        filter: &ProfileFilter,
    ) -> Result<&'static TransportProfile> {
        let candidates = self.candidates(filter)?;

        match strategy {
            RotationStrategy::Static => self.static_profile(filter),
            RotationStrategy::PerCall => {
                let mut rng = rand::thread_rng();
                let profile = candidates
                    .choose(&mut rng)
                    .copied()
                    .ok_or_else(|| Error::internal("empty candidate set"))?;
                trace!(profile = profile.id, "per-call transport profile");
                Ok(profile)
            }
            RotationStrategy::PerIdentity | RotationStrategy::Adaptive => {
                let key = PinKey {
                    identity: identity.to_string(),
                    strategy,
                    filter: filter.clone(),
                };

                if let Some(profile) = self
                    .pinned
                    .read()
                    .map_err(|e| Error::internal(format!("Lock error: {}", e)))?
                    .get(&key)
                {
                    return Ok(*profile);
                }

                let selected = if strategy == RotationStrategy::PerIdentity {
                    per_identity(identity, &candidates)?
                } else {
                    adaptive(identity, &candidates)
                };

                let mut pinned = self
                    .pinned
                    .write()
                    .map_err(|e| Error::internal(format!("Lock error: {}", e)))?;
                let profile = *pinned.entry(key).or_insert(selected);
                debug!(identity = %identity, ?strategy, profile = profile.id, "transport profile pinned");
                Ok(profile)
            }
        }
    }

    /// Unpin every profile selected for `identity`; returns how many were removed
    pub fn clear_cache(&self, identity: &str) -> Result<usize> {
        let mut pinned = self
            .pinned
            .write()
            .map_err(|e| Error::internal(format!("Lock error: {}", e)))?;
        let before = pinned.len();
        pinned.retain(|key, _| key.identity != identity);
        Ok(before - pinned.len())
    }

    /// Unpin every identity
    pub fn clear_all(&self) -> Result<()> {
        self.pinned
            .write()
            .map_err(|e| Error::internal(format!("Lock error: {}", e)))?
            .clear();
        Ok(())
    }

    /// Number of pinned selections
    pub fn pinned_count(&self) -> usize {
        self.pinned.read().map(|p| p.len()).unwrap_or(0)
    }

    fn static_profile(&self, filter: &ProfileFilter) -> Result<&'static TransportProfile> {
        if !filter.matches(self.default_profile) {
            return Err(Error::configuration(format!(
                "static transport profile '{}' is excluded by the profile filter",
                self.default_profile.id
            )));
        }
        Ok(self.default_profile)
    }
}

impl Default for TransportRegistry {
    fn default() -> Self {
        Self {
            profiles: PROFILES,
            default_profile: &PROFILES[0],
            pinned: RwLock::new(HashMap::new()),
        }
    }
}

fn per_identity(
    identity: &str,
    candidates: &[&'static TransportProfile],
) -> Result<&'static TransportProfile> {
    identity::index_for(identity, candidates.len())
        .map(|i| candidates[i])
        .ok_or_else(|| Error::internal("empty candidate set"))
}

/// Walk cumulative market-share weights with the identity's unit value
fn adaptive(identity: &str, candidates: &[&'static TransportProfile]) -> &'static TransportProfile {
    let total: f64 = candidates.iter().map(|p| p.market_share).sum();
    let target = identity::unit_for(identity) * total;

    let mut cumulative = 0.0;
    for profile in candidates {
        cumulative += profile.market_share;
        if target < cumulative {
            return profile;
        }
    }
    // Rounding can leave target at the very top of the range
    candidates[candidates.len() - 1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_parsing() {
        assert_eq!("per-call".parse::<RotationStrategy>().unwrap(), RotationStrategy::PerCall);
        assert_eq!("ADAPTIVE".parse::<RotationStrategy>().unwrap(), RotationStrategy::Adaptive);
        assert_eq!("per_identity".parse::<RotationStrategy>().unwrap(), RotationStrategy::PerIdentity);
        assert!(matches!(
            "round-robin".parse::<RotationStrategy>(),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_unknown_default_profile() {
        assert!(matches!(
            TransportRegistry::new("lynx-2-dos"),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_static_strategy() {
        let registry = TransportRegistry::new("firefox-133-linux").unwrap();
        for id in ["a", "b", "c"] {
            let profile = registry
                .profile_for(id, RotationStrategy::Static, &ProfileFilter::any())
                .unwrap();
            assert_eq!(profile.id, "firefox-133-linux");
        }
    }

    #[test]
    fn test_static_default_excluded_by_filter() {
        let registry = TransportRegistry::default();
        let filter = ProfileFilter::browsers(&[BrowserFamily::Safari]);
        assert!(matches!(
            registry.profile_for("a", RotationStrategy::Static, &filter),
            Err(Error::Configuration(_))
        ));
        assert!(registry.validate(RotationStrategy::Static, &filter).is_err());
        assert!(registry.validate(RotationStrategy::Adaptive, &filter).is_ok());
    }

    #[test]
    fn test_empty_filter_result_is_error() {
        let registry = TransportRegistry::default();
        let filter = ProfileFilter {
            browsers: vec![BrowserFamily::Safari],
            operating_systems: vec![OperatingSystem::Windows],
        };
        for strategy in [
            RotationStrategy::Static,
            RotationStrategy::PerCall,
            RotationStrategy::PerIdentity,
            RotationStrategy::Adaptive,
        ] {
            assert!(matches!(
                registry.profile_for("alice", strategy, &filter),
                Err(Error::Configuration(_))
            ));
        }
    }

    #[test]
    fn test_filter_respected() {
        let registry = TransportRegistry::default();
        let filter = ProfileFilter::operating_systems(&[OperatingSystem::Linux]);
        for i in 0..200 {
            let identity = format!("linux-{}", i);
            for strategy in [
                RotationStrategy::PerCall,
                RotationStrategy::PerIdentity,
                RotationStrategy::Adaptive,
            ] {
                let profile = registry.profile_for(&identity, strategy, &filter).unwrap();
                assert_eq!(profile.os, OperatingSystem::Linux);
            }
        }
    }

    #[test]
    fn test_per_identity_is_stable() {
        let registry = TransportRegistry::default();
        let first = registry
            .profile_for("stable", RotationStrategy::PerIdentity, &ProfileFilter::any())
            .unwrap();
        for _ in 0..1000 {
            let again = registry
                .profile_for("stable", RotationStrategy::PerIdentity, &ProfileFilter::any())
                .unwrap();
            assert_eq!(again.id, first.id);
        }

        // A fresh registry derives the same answer without the cache
        let fresh = TransportRegistry::default();
        let recomputed = fresh
            .profile_for("stable", RotationStrategy::PerIdentity, &ProfileFilter::any())
            .unwrap();
        assert_eq!(recomputed.id, first.id);
    }

    #[test]
    fn test_per_identity_matches_index() {
        let registry = TransportRegistry::default();
        let index = identity::index_for("indexed", PROFILES.len()).unwrap();
        let profile = registry
            .profile_for("indexed", RotationStrategy::PerIdentity, &ProfileFilter::any())
            .unwrap();
        assert_eq!(profile.id, PROFILES[index].id);
    }

    #[test]
    fn test_per_call_is_not_pinned() {
        let registry = TransportRegistry::default();
        let mut seen = std::collections::HashSet::new();
        for _ in 0..500 {
            let profile = registry
                .profile_for("roaming", RotationStrategy::PerCall, &ProfileFilter::any())
                .unwrap();
            seen.insert(profile.id);
        }
        assert!(seen.len() > 1);
        assert_eq!(registry.pinned_count(), 0);
    }

    #[test]
    fn test_clear_cache() {
        let registry = TransportRegistry::default();
        registry
            .profile_for("alice", RotationStrategy::Adaptive, &ProfileFilter::any())
            .unwrap();
        registry
            .profile_for("alice", RotationStrategy::PerIdentity, &ProfileFilter::any())
            .unwrap();
        registry
            .profile_for("bob", RotationStrategy::Adaptive, &ProfileFilter::any())
            .unwrap();
        assert_eq!(registry.pinned_count(), 3);

        assert_eq!(registry.clear_cache("alice").unwrap(), 2);
        assert_eq!(registry.clear_cache("alice").unwrap(), 0);
        assert_eq!(registry.pinned_count(), 1);

        registry.clear_all().unwrap();
        assert_eq!(registry.pinned_count(), 0);
    }

    #[test]
    fn test_adaptive_follows_market_share() {
        // Chi-square goodness of fit over 1000 identities, 9 degrees of freedom.
        // 27.88 is the 0.999 quantile.
        let registry = TransportRegistry::default();
        let mut counts: HashMap<&str, usize> = HashMap::new();
        let samples = 1000;
        for i in 0..samples {
            let identity = format!("population-{}", i);
            let profile = registry
                .profile_for(&identity, RotationStrategy::Adaptive, &ProfileFilter::any())
                .unwrap();
            *counts.entry(profile.id).or_insert(0) += 1;
        }

        let chi_square: f64 = PROFILES
            .iter()
            .map(|p| {
                let expected = p.market_share * samples as f64;
                let observed = *counts.get(p.id).unwrap_or(&0) as f64;
                (observed - expected).powi(2) / expected
            })
            .sum();

        assert!(chi_square < 27.88, "chi-square {} too large: {:?}", chi_square, counts);
    }
}
