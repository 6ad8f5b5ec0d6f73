//! Ghost-Engine façade
//!
//! Owns the per-identity sessions and caches and exposes every generator
//! behind one identity-keyed API. Work on different identities runs in
//! parallel; work on the same identity is serialized by that identity's
//! session lock.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::OwnedMutexGuard;
use tracing::{debug, info, warn};

use crate::behavior::{
    self, CancelToken, ClickTiming, DoubleClickTiming, Driver, KeystrokeEvent, MousePath, Point,
    Replayer, ScrollPlan,
};
use crate::config::EngineConfig;
use crate::identity;
use crate::render::{HardwareProfile, RenderFingerprint, RenderMutator};
use crate::session::{Clock, SeededSession, SessionSnapshot, SessionStore, SystemClock};
use crate::transport::{
    self, HeaderSet, Ja3Fingerprint, ProfileFilter, RotationStrategy, TransportProfile,
    TransportRegistry,
};
use crate::{Error, Result};

/// Everything an identity presents outside of its interaction timing
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityProfile {
    pub identity: String,
    pub seed: u64,
    pub transport_profile: &'static str,
    pub user_agent: String,
    pub headers: HeaderSet,
    pub ja3: Ja3Fingerprint,
    pub hardware: HardwareProfile,
}

/// Session copy that only replaces the stored session when committed
struct Draft {
    guard: OwnedMutexGuard<SeededSession>,
    session: SeededSession,
    now: DateTime<Utc>,
}

impl Draft {
    fn commit(mut self) {
        *self.guard = self.session;
    }
}

/// Identity-keyed synthesis engine
pub struct GhostEngine {
    config: EngineConfig,
    sessions: SessionStore,
    transport: TransportRegistry,
    render: RenderMutator,
    replay_time_scale: f64,
}

impl GhostEngine {
    /// Create an engine on the system clock; fails on invalid configuration
    pub fn new(config: EngineConfig) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create an engine reading time from `clock`
    pub fn with_clock(config: EngineConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;
        let transport = config.transport.registry()?;
        let render = RenderMutator::new(config.render.clone());

        info!(
            strategy = ?config.transport.strategy,
            default_profile = %config.transport.default_profile,
            "Ghost-Engine v{} ready",
            crate::VERSION
        );

        Ok(Self {
            config,
            sessions: SessionStore::new(clock),
            transport,
            render,
            replay_time_scale: 1.0,
        })
    }

    /// Scale every replay sleep; `0.0` replays without waiting
    pub fn with_replay_time_scale(mut self, time_scale: f64) -> Self {
        self.replay_time_scale = time_scale.max(0.0);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Number of identities with a live session
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    async fn with_session<T>(
        &self,
        identity: &str,
        generate: impl FnOnce(&mut SeededSession, DateTime<Utc>) -> T,
    ) -> Result<T> {
        let handle = self.sessions.handle(identity)?;
        let mut session = handle.lock().await;
        let now = self.sessions.now();
        Ok(generate(&mut *session, now))
    }

    async fn draft(&self, identity: &str) -> Result<Draft> {
        let handle = self.sessions.handle(identity)?;
        let guard = handle.lock_owned().await;
        let session = (*guard).clone();
        Ok(Draft {
            guard,
            session,
            now: self.sessions.now(),
        })
    }

    fn replayer<'a, D: Driver + ?Sized>(&self, driver: &'a D, cancel: &CancelToken) -> Replayer<'a, D> {
        Replayer::new(driver, cancel.clone()).with_time_scale(self.replay_time_scale)
    }

    // ========================================================================
    // Generators
    // ========================================================================

    /// Pointer path from `from` to `to`
    pub async fn mouse_path(&self, identity: &str, from: Point, to: Point) -> Result<MousePath> {
        check_point(from)?;
        check_point(to)?;
        let config = &self.config;
        self.with_session(identity, |session, now| {
            behavior::mouse_path(from, to, session, &config.motion, &config.fatigue, now)
        })
        .await
    }

    /// Single-click timing
    pub async fn click_timing(&self, identity: &str) -> Result<ClickTiming> {
        let config = &self.config;
        self.with_session(identity, |session, now| {
            behavior::click_timing(session, &config.click, &config.fatigue, now)
        })
        .await
    }

    /// Double-click timing
    pub async fn double_click_timing(&self, identity: &str) -> Result<DoubleClickTiming> {
        let config = &self.config;
        self.with_session(identity, |session, now| {
            behavior::double_click_timing(session, &config.click, &config.fatigue, now)
        })
        .await
    }

    /// Scroll plan for a signed distance in pixels, at most
    /// [`MAX_SCROLL_DISTANCE_PX`](behavior::MAX_SCROLL_DISTANCE_PX) either way
    pub async fn scroll_steps(&self, identity: &str, distance_px: i64) -> Result<ScrollPlan> {
        behavior::scroll::check_distance(distance_px)?;
        let config = &self.config;
        self.with_session(identity, |session, now| {
            behavior::scroll_steps(distance_px, session, &config.scroll, &config.fatigue, now)
        })
        .await?
    }

    /// Keystroke sequence that renders `text`
    pub async fn keystrokes(&self, identity: &str, text: &str) -> Result<Vec<KeystrokeEvent>> {
        let config = &self.config;
        self.with_session(identity, |session, now| {
            behavior::keystrokes(text, session, &config.keystroke, &config.fatigue, now)
        })
        .await
    }

    // ========================================================================
    // Transport
    // ========================================================================

    /// Profile for `identity` under the configured strategy and filter
    pub fn transport_profile(&self, identity: &str) -> Result<&'static TransportProfile> {
        self.profile_for(
            identity,
            self.config.transport.strategy,
            &self.config.transport.filter,
        )
    }

    /// Profile for `identity` under an explicit strategy and filter
    pub fn profile_for(
        &self,
        identity: &str,
        strategy: RotationStrategy,
        filter: &ProfileFilter,
    ) -> Result<&'static TransportProfile> {
        self.transport.profile_for(identity, strategy, filter)
    }

    /// Request headers matching the identity's transport profile
    pub fn transport_headers(&self, identity: &str) -> Result<HeaderSet> {
        Ok(transport::headers_for(self.transport_profile(identity)?))
    }

    /// JA3 fingerprint of the identity's transport profile
    pub fn ja3(&self, identity: &str) -> Result<Ja3Fingerprint> {
        Ok(transport::ja3::fingerprint(self.transport_profile(identity)?))
    }

    /// Unpin the identity's transport profiles
    pub fn clear_transport_cache(&self, identity: &str) -> Result<usize> {
        self.transport.clear_cache(identity)
    }

    // ========================================================================
    // Render
    // ========================================================================

    /// Apply the identity's noise field to an RGBA buffer
    ///
    /// Uses the session seed only, so it neither records an action nor
    /// advances the session generator.
    pub async fn mutate_canvas(
        &self,
        identity: &str,
        buffer: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<u8>> {
        let seed = self.with_session(identity, |session, _| session.seed()).await?;
        self.render.mutate(buffer, width, height, seed)
    }

    /// Cached render fingerprint for the identity at this canvas size
    pub fn render_fingerprint(&self, identity: &str, width: u32, height: u32) -> Result<RenderFingerprint> {
        self.render.fingerprint_for(identity, width, height)
    }

    /// GPU, audio and navigator hardware reported by the identity on the
    /// platform of its transport profile
    pub fn hardware_profile(&self, identity: &str) -> Result<HardwareProfile> {
        let profile = self.transport_profile(identity)?;
        Ok(hardware_for(identity, profile))
    }

    /// Transport, header, JA3 and hardware values in one record
    pub fn identity_profile(&self, identity: &str) -> Result<IdentityProfile> {
        let profile = self.transport_profile(identity)?;
        Ok(IdentityProfile {
            identity: identity.to_string(),
            seed: identity::seed_for(identity),
            transport_profile: profile.id,
            user_agent: transport::user_agent(profile),
            headers: transport::headers_for(profile),
            ja3: transport::ja3::fingerprint(profile),
            hardware: hardware_for(identity, profile),
        })
    }

    // ========================================================================
    // Session management
    // ========================================================================

    /// Bookkeeping view of the identity's session, `None` before first use
    pub async fn session_snapshot(&self, identity: &str) -> Result<Option<SessionSnapshot>> {
        self.sessions.snapshot(identity).await
    }

    /// Discard the identity's session and caches; `false` when nothing was cached
    pub fn reset(&self, identity: &str) -> bool {
        let session = self.sessions.reset(identity).unwrap_or_else(|e| {
            warn!(identity = %identity, error = %e, "session reset failed");
            false
        });
        let pinned = self.transport.clear_cache(identity).unwrap_or(0);
        let fingerprints = self.render.clear_cache(identity).unwrap_or(0);

        debug!(identity = %identity, session, pinned, fingerprints, "identity reset");
        session || pinned > 0 || fingerprints > 0
    }

    /// Drop every session and cache
    pub fn clear(&self) -> Result<()> {
        self.sessions.clear()?;
        self.transport.clear_all()?;
        self.render.clear_all()?;
        info!("all identities cleared");
        Ok(())
    }

    // ========================================================================
    // Replay
    //
    // Each helper generates on a copy of the session, replays through the
    // driver and stores the advanced copy only when every event was
    // accepted. The identity stays locked for the whole replay.
    // ========================================================================

    /// Generate a path and move the cursor along it
    pub async fn replay_move<D: Driver + ?Sized>(
        &self,
        identity: &str,
        driver: &D,
        from: Point,
        to: Point,
        cancel: &CancelToken,
    ) -> Result<MousePath> {
        check_point(from)?;
        check_point(to)?;
        let mut draft = self.draft(identity).await?;
        let path = behavior::mouse_path(
            from,
            to,
            &mut draft.session,
            &self.config.motion,
            &self.config.fatigue,
            draft.now,
        );

        debug!(identity = %identity, points = path.len(), "replaying move");
        let outcome = self.replayer(driver, cancel).replay_path(&path).await;
        finish(identity, draft, outcome)?;
        Ok(path)
    }

    /// Generate click timing and click
    pub async fn replay_click<D: Driver + ?Sized>(
        &self,
        identity: &str,
        driver: &D,
        cancel: &CancelToken,
    ) -> Result<ClickTiming> {
        let mut draft = self.draft(identity).await?;
        let timing = behavior::click_timing(
            &mut draft.session,
            &self.config.click,
            &self.config.fatigue,
            draft.now,
        );

        debug!(identity = %identity, "replaying click");
        let outcome = self.replayer(driver, cancel).replay_click(&timing).await;
        finish(identity, draft, outcome)?;
        Ok(timing)
    }

    /// Generate double-click timing and double click
    pub async fn replay_double_click<D: Driver + ?Sized>(
        &self,
        identity: &str,
        driver: &D,
        cancel: &CancelToken,
    ) -> Result<DoubleClickTiming> {
        let mut draft = self.draft(identity).await?;
        let timing = behavior::double_click_timing(
            &mut draft.session,
            &self.config.click,
            &self.config.fatigue,
            draft.now,
        );

        debug!(identity = %identity, "replaying double click");
        let outcome = self.replayer(driver, cancel).replay_double_click(&timing).await;
        finish(identity, draft, outcome)?;
        Ok(timing)
    }

    /// Generate keystrokes for `text` and type them
    pub async fn replay_typing<D: Driver + ?Sized>(
        &self,
        identity: &str,
        driver: &D,
        text: &str,
        cancel: &CancelToken,
    ) -> Result<Vec<KeystrokeEvent>> {
        let mut draft = self.draft(identity).await?;
        let events = behavior::keystrokes(
            text,
            &mut draft.session,
            &self.config.keystroke,
            &self.config.fatigue,
            draft.now,
        );

        debug!(identity = %identity, keys = events.len(), "replaying typing");
        let outcome = self.replayer(driver, cancel).replay_keystrokes(&events).await;
        finish(identity, draft, outcome)?;
        Ok(events)
    }

    /// Generate a scroll plan and scroll
    pub async fn replay_scroll<D: Driver + ?Sized>(
        &self,
        identity: &str,
        driver: &D,
        distance_px: i64,
        cancel: &CancelToken,
    ) -> Result<ScrollPlan> {
        behavior::scroll::check_distance(distance_px)?;
        let mut draft = self.draft(identity).await?;
        let plan = behavior::scroll_steps(
            distance_px,
            &mut draft.session,
            &self.config.scroll,
            &self.config.fatigue,
            draft.now,
        )?;

        debug!(identity = %identity, steps = plan.steps.len(), "replaying scroll");
        let outcome = self.replayer(driver, cancel).replay_scroll(&plan).await;
        finish(identity, draft, outcome)?;
        Ok(plan)
    }
}

impl std::fmt::Debug for GhostEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GhostEngine")
            .field("sessions", &self.sessions.len())
            .field("pinned_profiles", &self.transport.pinned_count())
            .field("cached_fingerprints", &self.render.cached_count())
            .finish()
    }
}

/// Commit the draft on success; leave the stored session untouched otherwise
fn finish(identity: &str, draft: Draft, outcome: Result<usize>) -> Result<()> {
    match outcome {
        Ok(events) => {
            draft.commit();
            debug!(identity = %identity, events, "replay committed");
            Ok(())
        }
        Err(e) => {
            warn!(identity = %identity, error = %e, "replay aborted, session unchanged");
            Err(e)
        }
    }
}

fn hardware_for(identity: &str, profile: &TransportProfile) -> HardwareProfile {
    HardwareProfile::for_platform(identity::seed_for(identity), profile.browser, profile.os)
}

fn check_point(point: Point) -> Result<()> {
    if !point.x.is_finite() || !point.y.is_finite() {
        return Err(Error::invalid_input(format!(
            "point ({}, {}) is not finite",
            point.x, point.y
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::{DriverEvent, MockDriver};
    use crate::session::ManualClock;

    fn engine() -> (GhostEngine, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::default());
        let engine = GhostEngine::with_clock(EngineConfig::default(), clock.clone())
            .unwrap()
            .with_replay_time_scale(0.0);
        (engine, clock)
    }

    #[tokio::test]
    async fn test_invalid_config_fails_fast() {
        let mut config = EngineConfig::default();
        config.motion.speed = -1.0;
        assert!(matches!(GhostEngine::new(config), Err(Error::Configuration(_))));
    }

    #[tokio::test]
    async fn test_sessions_created_lazily() {
        let (engine, _) = engine();
        assert_eq!(engine.session_count(), 0);
        assert!(engine.session_snapshot("alice").await.unwrap().is_none());

        engine.click_timing("alice").await.unwrap();
        let snapshot = engine.session_snapshot("alice").await.unwrap().unwrap();
        assert_eq!(snapshot.action_count, 1);
        assert_eq!(snapshot.seed, identity::seed_for("alice"));
        assert_eq!(engine.session_count(), 1);
    }

    #[tokio::test]
    async fn test_non_finite_point_rejected() {
        let (engine, _) = engine();
        let result = engine
            .mouse_path("alice", Point::new(f64::NAN, 0.0), Point::new(1.0, 1.0))
            .await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
        assert_eq!(engine.session_count(), 0);
    }

    #[tokio::test]
    async fn test_reset_reports_cached_state() {
        let (engine, _) = engine();
        assert!(!engine.reset("ghost"));

        engine.keystrokes("ghost", "boo").await.unwrap();
        engine.transport_profile("ghost").unwrap();
        assert!(engine.reset("ghost"));
        assert!(!engine.reset("ghost"));
    }

    #[tokio::test]
    async fn test_mutate_canvas_does_not_advance_session() {
        let (engine, _) = engine();
        let buf = vec![100u8; 8 * 8 * 4];
        let a = engine.mutate_canvas("painter", &buf, 8, 8).await.unwrap();
        let b = engine.mutate_canvas("painter", &buf, 8, 8).await.unwrap();
        assert_eq!(a, b);
        let snapshot = engine.session_snapshot("painter").await.unwrap().unwrap();
        assert_eq!(snapshot.action_count, 0);
    }

    #[tokio::test]
    async fn test_replay_commits_on_success() {
        let (engine, _) = engine();
        let driver = MockDriver::new();
        let timing = engine
            .replay_click("clicker", &driver, &CancelToken::new())
            .await
            .unwrap();

        assert!(timing.hold_duration_ms > 0.0);
        assert_eq!(driver.events(), vec![DriverEvent::Press, DriverEvent::Release]);
        let snapshot = engine.session_snapshot("clicker").await.unwrap().unwrap();
        assert_eq!(snapshot.action_count, 1);
    }

    #[tokio::test]
    async fn test_replay_failure_leaves_session_untouched() {
        let (engine, _) = engine();
        engine.click_timing("fragile").await.unwrap();
        let before = engine.session_snapshot("fragile").await.unwrap().unwrap();

        let driver = MockDriver::failing_after(3);
        let err = engine
            .replay_typing("fragile", &driver, "hello", &CancelToken::new())
            .await
            .unwrap_err();
        assert!(err.is_driver_failure());

        let after = engine.session_snapshot("fragile").await.unwrap().unwrap();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_identity_profile_is_consistent() {
        let (engine, _) = engine();
        let bundle = engine.identity_profile("carol").unwrap();
        let profile = engine.transport_profile("carol").unwrap();

        assert_eq!(bundle.transport_profile, profile.id);
        assert_eq!(bundle.headers.get("User-Agent"), Some(bundle.user_agent.as_str()));
        assert_eq!(bundle.ja3, engine.ja3("carol").unwrap());
        assert_eq!(bundle.hardware, engine.hardware_profile("carol").unwrap());
    }

    #[tokio::test]
    async fn test_fatigue_follows_clock() {
        let (engine, clock) = engine();
        engine.click_timing("tired").await.unwrap();
        let fresh = engine.session_snapshot("tired").await.unwrap().unwrap();

        clock.advance(chrono::Duration::minutes(45));
        engine.click_timing("tired").await.unwrap();
        let later = engine.session_snapshot("tired").await.unwrap().unwrap();

        assert!(later.energy < fresh.energy);
        assert_eq!(later.session_start, fresh.session_start);
    }

    #[tokio::test]
    async fn test_first_action_after_idle_session_is_unfatigued() {
        let (idle, clock) = engine();
        let buf = vec![0u8; 4 * 4 * 4];
        // Creates the session without recording an action
        idle.mutate_canvas("sleeper", &buf, 4, 4).await.unwrap();
        clock.advance(chrono::Duration::minutes(20));

        let (fresh, _) = engine();
        assert_eq!(
            idle.click_timing("sleeper").await.unwrap(),
            fresh.click_timing("sleeper").await.unwrap()
        );

        idle.reset("sleeper");
        idle.mutate_canvas("sleeper", &buf, 4, 4).await.unwrap();
        clock.advance(chrono::Duration::minutes(20));
        assert_eq!(
            idle.click_timing("sleeper").await.unwrap(),
            engine().0.click_timing("sleeper").await.unwrap()
        );
    }

    #[tokio::test]
    async fn test_scroll_distance_bounds() {
        let (engine, _) = engine();
        let max = behavior::MAX_SCROLL_DISTANCE_PX as i64;

        let plan = engine.scroll_steps("wheel", -max).await.unwrap();
        assert_eq!(plan.total_px(), -max);

        for distance in [i64::MIN, i64::MAX, max + 1] {
            assert!(matches!(
                engine.scroll_steps("wheel", distance).await,
                Err(Error::InvalidInput(_))
            ));
        }

        let driver = MockDriver::new();
        let result = engine
            .replay_scroll("untouched", &driver, i64::MIN, &CancelToken::new())
            .await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
        assert!(driver.events().is_empty());
        assert!(engine.session_snapshot("untouched").await.unwrap().is_none());

        let snapshot = engine.session_snapshot("wheel").await.unwrap().unwrap();
        assert_eq!(snapshot.action_count, 1);
    }

    #[tokio::test]
    async fn test_hardware_follows_transport_platform() {
        let mut config = EngineConfig::default();
        config.transport.strategy = RotationStrategy::PerIdentity;
        config.transport.filter = ProfileFilter::operating_systems(&[transport::OperatingSystem::IOS]);
        let engine = GhostEngine::with_clock(config, Arc::new(ManualClock::default())).unwrap();

        for i in 0..20 {
            let bundle = engine.identity_profile(&format!("phone-{}", i)).unwrap();
            assert_eq!(bundle.transport_profile, "safari-18-ios");
            assert_eq!(bundle.hardware.gpu_vendor, "Apple Inc.");
            assert!(!bundle.hardware.gpu_renderer.contains("Direct3D"));
        }
    }
}
