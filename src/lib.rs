//! Ghost-Engine: identity-seeded synthesis of human interaction and client fingerprints
//!
//! This library derives deterministic-but-varied pointer paths, click and
//! scroll timing, keystroke dynamics, transport handshake profiles and render
//! noise from an opaque identity string.

pub mod error;
pub mod config;

pub mod random;
pub mod identity;
pub mod session;
pub mod behavior;
pub mod transport;
pub mod render;
pub mod engine;

// Re-exports
pub use error::{Error, Result};
pub use config::EngineConfig;
pub use engine::{GhostEngine, IdentityProfile};

/// Ghost-Engine library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
