//! Scroll plans
//!
//! Distances are whole pixels so the signed step deltas always sum to the
//! requested distance exactly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::traits::{ScrollConfig, ScrollMode};
use crate::session::{FatigueConfig, SeededSession};
use crate::{Error, Result};

/// Largest distance, in either direction, accepted for one scroll plan
pub const MAX_SCROLL_DISTANCE_PX: u64 = 1_000_000;

/// One scroll event, dispatched after `delay_ms`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollStep {
    pub delta_px: i64,
    pub delay_ms: f64,
}

/// Ordered scroll steps and the mode that produced them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollPlan {
    /// `Smooth` or `Stepped`, never `Mixed`
    pub mode: ScrollMode,
    pub steps: Vec<ScrollStep>,
}

impl ScrollPlan {
    /// Signed sum of all step deltas
    pub fn total_px(&self) -> i64 {
        self.steps.iter().map(|s| s.delta_px).sum()
    }

    /// Sum of all step delays
    pub fn duration_ms(&self) -> f64 {
        self.steps.iter().map(|s| s.delay_ms).sum()
    }
}

/// Reject distances beyond [`MAX_SCROLL_DISTANCE_PX`]
pub fn check_distance(distance_px: i64) -> Result<()> {
    if distance_px.unsigned_abs() > MAX_SCROLL_DISTANCE_PX {
        return Err(Error::invalid_input(format!(
            "scroll distance {} exceeds {} px",
            distance_px, MAX_SCROLL_DISTANCE_PX
        )));
    }
    Ok(())
}

/// Plan a scroll of `distance_px` (negative scrolls up); records one action.
///
/// Out-of-range distances fail before the session is touched.
pub fn scroll_steps(
    distance_px: i64,
    session: &mut SeededSession,
    config: &ScrollConfig,
    fatigue: &FatigueConfig,
    now: DateTime<Utc>,
) -> Result<ScrollPlan> {
    check_distance(distance_px)?;
    let factor = session.begin_action(now, fatigue);
    let rng = session.rng_mut();

    let mode = match config.mode {
        ScrollMode::Mixed => {
            if rng.chance(0.5) {
                ScrollMode::Smooth
            } else {
                ScrollMode::Stepped
            }
        }
        other => other,
    };

    let sign = distance_px.signum();
    let mut remaining = distance_px.unsigned_abs();
    let mut steps = Vec::new();

    match mode {
        ScrollMode::Smooth => {
            while remaining > 0 {
                let size = (config.smooth_step.sample(rng).round() as u64)
                    .max(1)
                    .min(remaining);
                steps.push(ScrollStep {
                    delta_px: sign * size as i64,
                    delay_ms: config.smooth_interval.sample(rng) * factor,
                });
                remaining -= size;
            }
        }
        _ => {
            while remaining > 0 {
                let burst = rng.range_inclusive(1, config.max_burst);
                for notch in 0..burst {
                    if remaining == 0 {
                        break;
                    }
                    let size = (config.wheel_delta as u64).min(remaining);
                    let delay = if notch == 0 && !steps.is_empty() {
                        config.burst_pause.sample(rng)
                    } else {
                        config.burst_interval.sample(rng)
                    };
                    steps.push(ScrollStep {
                        delta_px: sign * size as i64,
                        delay_ms: delay * factor,
                    });
                    remaining -= size;
                }
            }
        }
    }

    Ok(ScrollPlan { mode, steps })
}
