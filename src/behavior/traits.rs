//! Behavior synthesis traits and options
//!
//! This module defines the driver capability the replay helpers call into,
//! and the configuration for every interaction generator.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::motion::Point;
use crate::random::TimingDistribution;
use crate::{Error, Result};

// ============================================================================
// Driver
// ============================================================================

/// Input backend capability
///
/// Anything that can move a pointer, press buttons and keys, and scroll.
/// Errors are reported as `anyhow::Error` and surfaced to the caller
/// unmodified as [`Error::Driver`].
#[async_trait]
pub trait Driver: Send + Sync {
    /// Move the pointer to an absolute position
    async fn move_cursor_to(&self, point: Point) -> anyhow::Result<()>;

    /// Press the primary button
    async fn press_button(&self) -> anyhow::Result<()>;

    /// Release the primary button
    async fn release_button(&self) -> anyhow::Result<()>;

    /// Press a key (`"a"`, `"A"`, `" "`, `"Backspace"`)
    async fn press_key(&self, key: &str) -> anyhow::Result<()>;

    /// Release a key
    async fn release_key(&self, key: &str) -> anyhow::Result<()>;

    /// Scroll vertically by a signed pixel amount
    async fn scroll_by(&self, delta_px: i64) -> anyhow::Result<()>;
}

fn check_probability(name: &str, value: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(Error::configuration(format!(
            "{} must be within [0, 1], got {}",
            name, value
        )));
    }
    Ok(())
}

fn check_positive(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(Error::configuration(format!(
            "{} must be > 0, got {}",
            name, value
        )));
    }
    Ok(())
}

fn check_non_negative(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(Error::configuration(format!(
            "{} must be >= 0, got {}",
            name, value
        )));
    }
    Ok(())
}

// ============================================================================
// Motion
// ============================================================================

/// Mouse movement options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Speed multiplier; durations are divided by it
    pub speed: f64,
    /// Perpendicular control-point offset as a fraction of distance
    pub curve_intensity: f64,
    /// Assumed target width for Fitts' Law, in pixels
    pub target_width: f64,
    /// Fitts' Law intercept `a` in milliseconds
    pub fitts_a_ms: f64,
    /// Fitts' Law slope `b` in milliseconds
    pub fitts_b_ms: f64,
    /// Additive jitter on the movement time
    pub duration_jitter: TimingDistribution,
    /// Probability of overshooting (only for distances above 50px)
    pub overshoot_probability: f64,
    /// Overshoot distance as a fraction of travel distance
    pub overshoot_fraction: f64,
    /// Point count of the corrective segment
    pub correction_points: usize,
    /// Pause between the overshoot and the correction
    pub correction_pause: TimingDistribution,
    /// Standard deviation of per-sample positional jitter, in pixels
    pub jitter_amount: f64,
    /// Target spacing between samples in milliseconds
    pub sample_interval_ms: f64,
    pub min_points: usize,
    pub max_points: usize,
    /// Probability of a hesitation at an interior sample
    pub micro_pause_probability: f64,
    pub micro_pause: TimingDistribution,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            speed: 1.0,
            curve_intensity: 0.25,
            target_width: 20.0,
            fitts_a_ms: 50.0,
            fitts_b_ms: 150.0,
            duration_jitter: TimingDistribution::new(0.0, 60.0, -100.0, 300.0),
            overshoot_probability: 0.12,
            overshoot_fraction: 0.08,
            correction_points: 8,
            correction_pause: TimingDistribution::new(60.0, 20.0, 20.0, 150.0),
            jitter_amount: 1.0,
            sample_interval_ms: 16.0,
            min_points: 10,
            max_points: 120,
            micro_pause_probability: 0.02,
            micro_pause: TimingDistribution::new(45.0, 15.0, 15.0, 90.0),
        }
    }
}

impl MotionConfig {
    /// Validate the motion configuration
    pub fn validate(&self) -> Result<()> {
        check_positive("motion.speed", self.speed)?;
        check_non_negative("motion.curve_intensity", self.curve_intensity)?;
        check_positive("motion.target_width", self.target_width)?;
        check_non_negative("motion.fitts_a_ms", self.fitts_a_ms)?;
        check_non_negative("motion.fitts_b_ms", self.fitts_b_ms)?;
        check_probability("motion.overshoot_probability", self.overshoot_probability)?;
        check_non_negative("motion.overshoot_fraction", self.overshoot_fraction)?;
        check_non_negative("motion.jitter_amount", self.jitter_amount)?;
        check_positive("motion.sample_interval_ms", self.sample_interval_ms)?;
        check_probability("motion.micro_pause_probability", self.micro_pause_probability)?;

        if self.min_points < 2 || self.max_points < self.min_points {
            return Err(Error::configuration(
                "motion: require 2 <= min_points <= max_points",
            ));
        }
        if self.correction_points < 2 {
            return Err(Error::configuration("motion.correction_points must be >= 2"));
        }

        self.duration_jitter.validate("motion.duration_jitter")?;
        self.correction_pause.validate("motion.correction_pause")?;
        self.micro_pause.validate("motion.micro_pause")?;
        if self.correction_pause.min <= 0.0 || self.micro_pause.min <= 0.0 {
            return Err(Error::configuration(
                "motion: pauses must have a positive minimum",
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Click
// ============================================================================

/// Click options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClickConfig {
    /// Delay before pressing
    pub pre_delay: TimingDistribution,
    /// Button hold duration
    pub hold: TimingDistribution,
    /// Delay after releasing
    pub post_delay: TimingDistribution,
    /// Gap between the two clicks of a double click
    pub double_click_interval: TimingDistribution,
}

impl Default for ClickConfig {
    fn default() -> Self {
        Self {
            pre_delay: TimingDistribution::new(120.0, 40.0, 30.0, 400.0),
            hold: TimingDistribution::new(95.0, 25.0, 40.0, 250.0),
            post_delay: TimingDistribution::new(150.0, 50.0, 40.0, 500.0),
            double_click_interval: TimingDistribution::new(110.0, 30.0, 60.0, 250.0),
        }
    }
}

impl ClickConfig {
    /// Validate the click configuration
    pub fn validate(&self) -> Result<()> {
        self.pre_delay.validate("click.pre_delay")?;
        self.hold.validate("click.hold")?;
        self.post_delay.validate("click.post_delay")?;
        self.double_click_interval.validate("click.double_click_interval")?;
        if self.hold.min < 0.0 || self.pre_delay.min < 0.0 || self.post_delay.min < 0.0 {
            return Err(Error::configuration("click: delays must not be negative"));
        }
        Ok(())
    }
}

// ============================================================================
// Scroll
// ============================================================================

/// Scroll mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollMode {
    /// Many small variable steps at roughly frame cadence
    Smooth,
    /// Wheel-notch bursts separated by longer pauses
    Stepped,
    /// One of the above, chosen per call
    Mixed,
}

/// Scroll options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    pub mode: ScrollMode,
    /// Pixel size of a smooth step
    pub smooth_step: TimingDistribution,
    /// Delay between smooth steps
    pub smooth_interval: TimingDistribution,
    /// Pixels per wheel notch in stepped mode
    pub wheel_delta: i64,
    /// Largest number of notches in one burst
    pub max_burst: u32,
    /// Delay between notches inside a burst
    pub burst_interval: TimingDistribution,
    /// Pause between bursts
    pub burst_pause: TimingDistribution,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            mode: ScrollMode::Mixed,
            smooth_step: TimingDistribution::new(40.0, 15.0, 8.0, 90.0),
            smooth_interval: TimingDistribution::new(16.0, 3.0, 8.0, 32.0),
            wheel_delta: 100,
            max_burst: 6,
            burst_interval: TimingDistribution::new(35.0, 10.0, 15.0, 80.0),
            burst_pause: TimingDistribution::new(280.0, 90.0, 120.0, 700.0),
        }
    }
}

impl ScrollConfig {
    /// Validate the scroll configuration
    pub fn validate(&self) -> Result<()> {
        if self.wheel_delta < 1 {
            return Err(Error::configuration("scroll.wheel_delta must be >= 1"));
        }
        if self.max_burst < 1 {
            return Err(Error::configuration("scroll.max_burst must be >= 1"));
        }
        self.smooth_step.validate("scroll.smooth_step")?;
        self.smooth_interval.validate("scroll.smooth_interval")?;
        self.burst_interval.validate("scroll.burst_interval")?;
        self.burst_pause.validate("scroll.burst_pause")?;
        Ok(())
    }
}

// ============================================================================
// Keystroke
// ============================================================================

/// Typing options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeystrokeConfig {
    /// Characters per minute; baseline delay is `60000 / typing_speed`
    pub typing_speed: f64,
    /// Standard deviation of the per-pair delay multiplier
    pub delay_variation: f64,
    pub min_multiplier: f64,
    pub max_multiplier: f64,
    /// Key hold duration, independent of inter-key delay
    pub hold: TimingDistribution,
    /// Per-character probability of hitting a neighboring key
    pub typo_rate: f64,
    /// Backspace over typos; typos are only injected when enabled
    pub correction_enabled: bool,
    /// Pause before the corrective backspace
    pub notice_pause: TimingDistribution,
    pub same_finger_factor: f64,
    pub cross_hand_factor: f64,
    pub shift_factor: f64,
    pub word_pause_factor: f64,
}

impl Default for KeystrokeConfig {
    fn default() -> Self {
        Self {
            typing_speed: 250.0,
            delay_variation: 0.25,
            min_multiplier: 0.4,
            max_multiplier: 2.5,
            hold: TimingDistribution::new(95.0, 22.0, 45.0, 200.0),
            typo_rate: 0.02,
            correction_enabled: true,
            notice_pause: TimingDistribution::new(350.0, 120.0, 150.0, 900.0),
            same_finger_factor: 1.2,
            cross_hand_factor: 0.85,
            shift_factor: 1.25,
            word_pause_factor: 1.35,
        }
    }
}

impl KeystrokeConfig {
    /// Validate the typing configuration
    pub fn validate(&self) -> Result<()> {
        check_positive("keystroke.typing_speed", self.typing_speed)?;
        check_non_negative("keystroke.delay_variation", self.delay_variation)?;
        check_positive("keystroke.min_multiplier", self.min_multiplier)?;
        check_positive("keystroke.max_multiplier", self.max_multiplier)?;
        if self.min_multiplier > self.max_multiplier {
            return Err(Error::configuration(
                "keystroke.min_multiplier exceeds max_multiplier",
            ));
        }
        check_probability("keystroke.typo_rate", self.typo_rate)?;
        check_positive("keystroke.same_finger_factor", self.same_finger_factor)?;
        check_positive("keystroke.cross_hand_factor", self.cross_hand_factor)?;
        check_positive("keystroke.shift_factor", self.shift_factor)?;
        check_positive("keystroke.word_pause_factor", self.word_pause_factor)?;
        self.hold.validate("keystroke.hold")?;
        self.notice_pause.validate("keystroke.notice_pause")?;
        if self.hold.min <= 0.0 || self.notice_pause.min <= 0.0 {
            return Err(Error::configuration(
                "keystroke: hold and notice pause must have a positive minimum",
            ));
        }
        Ok(())
    }
}
