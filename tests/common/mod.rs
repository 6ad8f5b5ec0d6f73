//! Common test utilities
//!
//! This module provides shared test helpers and fixtures for all integration tests.

#![allow(dead_code)]

use ghost_engine::session::ManualClock;
use ghost_engine::{EngineConfig, GhostEngine};
use std::sync::{Arc, Once};

static TRACING: Once = Once::new();

/// Install a test subscriber once; honours `RUST_LOG`
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Engine on a manual clock that replays without sleeping
pub fn setup_engine(config: EngineConfig) -> (GhostEngine, Arc<ManualClock>) {
    init_tracing();
    let clock = Arc::new(ManualClock::default());
    let engine = GhostEngine::with_clock(config, clock.clone())
        .expect("valid test configuration")
        .with_replay_time_scale(0.0);
    (engine, clock)
}

/// Engine with default configuration
pub fn default_engine() -> GhostEngine {
    setup_engine(EngineConfig::default()).0
}

/// Default configuration without overshoot
pub fn no_overshoot() -> EngineConfig {
    let mut config = EngineConfig::default();
    config.motion.overshoot_probability = 0.0;
    config
}

/// Solid RGBA buffer
pub fn solid_rgba(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    rgba.iter()
        .copied()
        .cycle()
        .take((width * height * 4) as usize)
        .collect()
}
