//! # 会话管理层
//!
//! Per-identity state shared by every generator.
//!
//! ## 核心概念
//! - **SeededSession**: one persona: seed, seeded generator, energy, action count
//! - **SessionStore**: identity-keyed map with one lock per identity
//! - **Clock**: time source for fatigue, swappable for a manual clock
//!
//! ## 模块结构
//! - `clock`: `Clock` trait, `SystemClock`, `ManualClock`
//! - `state`: `SeededSession`, `SessionSnapshot`, `FatigueConfig`
//! - `store`: `SessionStore`

pub mod clock;
pub mod state;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use state::{FatigueConfig, SeededSession, SessionSnapshot};
pub use store::{SessionHandle, SessionStore};
