//! # 行为模拟
//!
//! Human-like interaction plans: pointer paths, click timing, scroll steps
//! and keystroke dynamics, plus helpers that replay them through a driver.
//!
//! ## 主要功能
//! - **鼠标轨迹**: Fitts' Law timing, cubic Bézier shape, overshoot and correction
//! - **点击**: bounded-Gaussian pre-delay, hold and post-delay, double clicks
//! - **滚动**: smooth, stepped and mixed scroll plans that conserve distance
//! - **打字**: per-pair delay modifiers, neighbor-key typos with correction
//! - **回放**: cancellable replay through the `Driver` capability
//!
//! Every generator is a pure function of its inputs and the session it is
//! handed; it advances that session's generator and action count only.
//!
//! ## 使用示例
//! ```rust,no_run
//! use ghost_engine::behavior::{mouse_path, MotionConfig, Point};
//! use ghost_engine::session::{FatigueConfig, SeededSession};
//! use chrono::Utc;
//!
//! let mut session = SeededSession::new("worker-7", Utc::now());
//! let path = mouse_path(
//!     Point::new(0.0, 0.0),
//!     Point::new(300.0, 120.0),
//!     &mut session,
//!     &MotionConfig::default(),
//!     &FatigueConfig::default(),
//!     Utc::now(),
//! );
//! println!("{} samples over {:.0}ms", path.len(), path.duration_ms());
//! ```

pub mod traits;
pub mod motion;
pub mod scroll;
pub mod keyboard;
pub mod keystroke;
pub mod replay;
pub mod mock;


pub use traits::{
    Driver, MotionConfig, ClickConfig, ScrollConfig, ScrollMode, KeystrokeConfig,
};

pub use motion::{
    mouse_path, click_timing, double_click_timing, fitts_duration, ease_in_out_cubic,
    Point, MousePath, ClickTiming, DoubleClickTiming, OVERSHOOT_MIN_DISTANCE,
};
pub use scroll::{scroll_steps, ScrollPlan, ScrollStep, MAX_SCROLL_DISTANCE_PX};
pub use keystroke::{keystrokes, render_text, KeystrokeEvent, BACKSPACE};
pub use replay::{CancelToken, Replayer};
pub use mock::{DriverEvent, MockDriver};
