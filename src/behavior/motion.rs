//! Pointer motion and click timing
//!
//! Paths are cubic Bézier curves bent perpendicular to the travel vector,
//! timed by Fitts' Law and sampled through an ease-in-out cubic so the pointer
//! accelerates out of `from` and decelerates into `to`.

use bezier_rs::{Bezier, TValue};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::traits::{ClickConfig, MotionConfig};
use crate::random::Randomness;
use crate::session::{FatigueConfig, SeededSession};

/// Overshoot is only considered for travel longer than this, in pixels
pub const OVERSHOOT_MIN_DISTANCE: f64 = 50.0;

/// Screen-space coordinate
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`
    pub fn distance_to(&self, other: Point) -> f64 {
        ((other.x - self.x).powi(2) + (other.y - self.y).powi(2)).sqrt()
    }
}

/// Timed pointer trajectory
///
/// `points` and `timestamps_ms` have equal length, timestamps are relative to
/// the start of the movement and strictly increasing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MousePath {
    pub points: Vec<Point>,
    pub timestamps_ms: Vec<f64>,
}

impl MousePath {
    /// Zero-length, zero-duration path
    pub fn stationary(at: Point) -> Self {
        Self {
            points: vec![at],
            timestamps_ms: vec![0.0],
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Time of the last sample
    pub fn duration_ms(&self) -> f64 {
        self.timestamps_ms.last().copied().unwrap_or(0.0)
    }

    pub fn first(&self) -> Option<Point> {
        self.points.first().copied()
    }

    pub fn last(&self) -> Option<Point> {
        self.points.last().copied()
    }

    /// Append `next` after a `gap_ms` pause, skipping its first point (which
    /// coincides with this path's last point)
    fn append(&mut self, next: MousePath, gap_ms: f64) {
        let offset = self.duration_ms() + gap_ms;
        for (point, ts) in next.points.into_iter().zip(next.timestamps_ms).skip(1) {
            self.points.push(point);
            self.timestamps_ms.push(offset + ts);
        }
    }
}

/// Fitts' Law movement time, `a + b·log2(2D/W + 1)`
pub fn fitts_duration(distance: f64, config: &MotionConfig) -> f64 {
    config.fitts_a_ms + config.fitts_b_ms * (2.0 * distance / config.target_width + 1.0).log2()
}

/// Ease-in-out cubic remap of `t ∈ [0, 1]`
pub fn ease_in_out_cubic(t: f64) -> f64 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// Generate a pointer path from `from` to `to` for this session.
///
/// Records one action on the session. With probability
/// `overshoot_probability` (and only past [`OVERSHOOT_MIN_DISTANCE`]) the
/// path first lands beyond the target, then makes exactly one corrective
/// segment back onto it.
pub fn mouse_path(
    from: Point,
    to: Point,
    session: &mut SeededSession,
    config: &MotionConfig,
    fatigue: &FatigueConfig,
    now: DateTime<Utc>,
) -> MousePath {
    let factor = session.begin_action(now, fatigue);
    let rng = session.rng_mut();

    let distance = from.distance_to(to);
    if distance == 0.0 {
        return MousePath::stationary(from);
    }

    let overshoot =
        distance > OVERSHOOT_MIN_DISTANCE && rng.chance(config.overshoot_probability);
    if !overshoot {
        return segment(rng, from, to, config, config.curve_intensity, None, factor);
    }

    let fraction = config.overshoot_fraction;
    let extra = distance
        * rng.bounded_gaussian(fraction, fraction * 0.25, fraction * 0.5, fraction * 1.5);
    let beyond = Point::new(
        to.x + (to.x - from.x) / distance * extra,
        to.y + (to.y - from.y) / distance * extra,
    );

    let mut path = segment(rng, from, beyond, config, config.curve_intensity, None, factor);
    let pause = config.correction_pause.sample(rng) * factor;
    let correction = segment(
        rng,
        beyond,
        to,
        config,
        config.curve_intensity * 0.3,
        Some(config.correction_points),
        factor,
    );
    path.append(correction, pause);
    path
}

/// One Bézier segment with timing, anchored exactly at both ends
fn segment(
    rng: &mut Randomness,
    from: Point,
    to: Point,
    config: &MotionConfig,
    curve_intensity: f64,
    fixed_points: Option<usize>,
    factor: f64,
) -> MousePath {
    let distance = from.distance_to(to);
    if distance == 0.0 {
        return MousePath::stationary(from);
    }

    let movement = (fitts_duration(distance, config) + config.duration_jitter.sample(rng))
        .max(config.fitts_a_ms)
        .max(1.0);
    let duration = movement / config.speed * factor;

    let count = fixed_points
        .unwrap_or_else(|| {
            ((duration / config.sample_interval_ms).round() as usize)
                .clamp(config.min_points, config.max_points)
        })
        .max(2);

    // Perpendicular unit vector, randomly mirrored
    let (dx, dy) = (to.x - from.x, to.y - from.y);
    let side = rng.sign();
    let (nx, ny) = (-dy / distance * side, dx / distance * side);
    let bend = distance * curve_intensity;

    let along1 = rng.range(0.2, 0.4);
    let offset1 = bend * rng.range(0.3, 1.0);
    let along2 = rng.range(0.6, 0.8);
    let offset2 = bend * rng.range(0.3, 1.0);

    let cp1 = Point::new(from.x + dx * along1 + nx * offset1, from.y + dy * along1 + ny * offset1);
    let cp2 = Point::new(from.x + dx * along2 + nx * offset2, from.y + dy * along2 + ny * offset2);

    let bezier = Bezier::from_cubic_coordinates(
        from.x, from.y,
        cp1.x, cp1.y,
        cp2.x, cp2.y,
        to.x, to.y,
    );

    let mut points = Vec::with_capacity(count + 4);
    let mut timestamps_ms = Vec::with_capacity(count + 4);
    let mut hesitation = 0.0;
    let last = count - 1;

    for i in 0..count {
        let t = i as f64 / last as f64;
        let at = duration * t + hesitation;

        if i == 0 || i == last {
            points.push(if i == 0 { from } else { to });
            timestamps_ms.push(at);
            continue;
        }

        let eval = bezier.evaluate(TValue::Parametric(ease_in_out_cubic(t)));
        let point = Point::new(
            eval[0] + rng.gaussian(0.0, config.jitter_amount),
            eval[1] + rng.gaussian(0.0, config.jitter_amount),
        );
        points.push(point);
        timestamps_ms.push(at);

        if rng.chance(config.micro_pause_probability) {
            hesitation += config.micro_pause.sample(rng) * factor;
            points.push(point);
            timestamps_ms.push(duration * t + hesitation);
        }
    }

    MousePath {
        points,
        timestamps_ms,
    }
}

/// Timing for one click
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickTiming {
    pub pre_delay_ms: f64,
    pub hold_duration_ms: f64,
    pub post_delay_ms: f64,
}

/// Timing for a double click
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoubleClickTiming {
    pub pre_delay_ms: f64,
    pub hold_durations_ms: [f64; 2],
    pub interval_ms: f64,
    pub post_delay_ms: f64,
}

/// Generate single-click timing; records one action
pub fn click_timing(
    session: &mut SeededSession,
    config: &ClickConfig,
    fatigue: &FatigueConfig,
    now: DateTime<Utc>,
) -> ClickTiming {
    let factor = session.begin_action(now, fatigue);
    let rng = session.rng_mut();
    ClickTiming {
        pre_delay_ms: config.pre_delay.sample(rng) * factor,
        hold_duration_ms: config.hold.sample(rng) * factor,
        post_delay_ms: config.post_delay.sample(rng) * factor,
    }
}

/// Generate double-click timing; records one action
pub fn double_click_timing(
    session: &mut SeededSession,
    config: &ClickConfig,
    fatigue: &FatigueConfig,
    now: DateTime<Utc>,
) -> DoubleClickTiming {
    let factor = session.begin_action(now, fatigue);
    let rng = session.rng_mut();
    let pre_delay_ms = config.pre_delay.sample(rng) * factor;
    let first_hold = config.hold.sample(rng) * factor;
    let interval_ms = config.double_click_interval.sample(rng) * factor;
    let second_hold = config.hold.sample(rng) * factor;
    DoubleClickTiming {
        pre_delay_ms,
        hold_durations_ms: [first_hold, second_hold],
        interval_ms,
        post_delay_ms: config.post_delay.sample(rng) * factor,
    }
}
