//! Keystroke dynamics
//!
//! Produces key-down/key-up timelines for a piece of text. Typos hit a
//! neighboring key, pause, and are backspaced before the intended key is
//! typed, so replaying the events always renders the input text.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::keyboard;
use super::traits::KeystrokeConfig;
use crate::random::Randomness;
use crate::session::{FatigueConfig, SeededSession};

/// Key name used for corrections
pub const BACKSPACE: &str = "Backspace";

/// One key press
///
/// Times are relative to the first key-down. `delay_before_next_ms` is the
/// gap between this key-down and the next one; holds may overlap it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeystrokeEvent {
    pub key: String,
    pub down_time_ms: f64,
    pub up_time_ms: f64,
    pub delay_before_next_ms: f64,
}

impl KeystrokeEvent {
    pub fn is_backspace(&self) -> bool {
        self.key == BACKSPACE
    }
}

/// Text produced by replaying `events` into an empty field
pub fn render_text(events: &[KeystrokeEvent]) -> String {
    let mut text = String::new();
    for event in events {
        if event.is_backspace() {
            text.pop();
        } else {
            text.push_str(&event.key);
        }
    }
    text
}

struct Timeline<'a> {
    rng: &'a mut Randomness,
    config: &'a KeystrokeConfig,
    factor: f64,
    clock: f64,
    events: Vec<KeystrokeEvent>,
}

/// Share of the gap to the next press a held key may still be down for
const RELEASE_SHARE: f64 = 0.8;

/// Whether `a` and `b` are typed on the same physical key
fn same_physical_key(a: &str, b: &str) -> bool {
    let mut chars_a = a.chars();
    let mut chars_b = b.chars();
    match (chars_a.next(), chars_a.next(), chars_b.next(), chars_b.next()) {
        (Some(x), None, Some(y), None) => keyboard::base_key(x) == keyboard::base_key(y),
        _ => a == b,
    }
}

impl Timeline<'_> {
    /// Lift earlier presses of `key` that would still be down at the clock
    fn release_held(&mut self, key: &str) {
        let clock = self.clock;
        for event in self.events.iter_mut().rev() {
            if event.up_time_ms > clock && same_physical_key(&event.key, key) {
                event.up_time_ms =
                    event.down_time_ms + (clock - event.down_time_ms) * RELEASE_SHARE;
            }
        }
    }

    fn press(&mut self, key: String, delay_after: f64) {
        self.release_held(&key);
        let hold = self.config.hold.sample(self.rng) * self.factor;
        self.events.push(KeystrokeEvent {
            key,
            down_time_ms: self.clock,
            up_time_ms: self.clock + hold,
            delay_before_next_ms: delay_after,
        });
        self.clock += delay_after;
    }

    /// Baseline delay with per-pair variation
    fn base_delay(&mut self) -> f64 {
        let config = self.config;
        let multiplier = self.rng.bounded_gaussian(
            1.0,
            config.delay_variation,
            config.min_multiplier,
            config.max_multiplier,
        );
        60_000.0 / config.typing_speed * multiplier * self.factor
    }

    fn delay_between(&mut self, current: char, next: char) -> f64 {
        self.base_delay() * pair_modifier(current, next, self.config)
    }
}

/// Composable delay modifier for typing `next` right after `current`
pub fn pair_modifier(current: char, next: char, config: &KeystrokeConfig) -> f64 {
    let mut modifier = 1.0;

    if next == ' ' && current.is_alphanumeric() {
        modifier *= config.word_pause_factor;
    }
    if keyboard::requires_shift(next) {
        modifier *= config.shift_factor;
    }

    if let (Some((hand_a, finger_a)), Some((hand_b, finger_b))) =
        (keyboard::finger_for(current), keyboard::finger_for(next))
    {
        if hand_a == hand_b && finger_a == finger_b {
            modifier *= config.same_finger_factor;
        } else if hand_a != hand_b {
            modifier *= config.cross_hand_factor;
        }
    }

    modifier
}

/// Generate the keystroke sequence for `text`; records one action
pub fn keystrokes(
    text: &str,
    session: &mut SeededSession,
    config: &KeystrokeConfig,
    fatigue: &FatigueConfig,
    now: DateTime<Utc>,
) -> Vec<KeystrokeEvent> {
    let factor = session.begin_action(now, fatigue);
    let chars: Vec<char> = text.chars().collect();

    let mut timeline = Timeline {
        rng: session.rng_mut(),
        config,
        factor,
        clock: 0.0,
        events: Vec::with_capacity(chars.len() + 4),
    };

    for (i, &ch) in chars.iter().enumerate() {
        // Uncorrected typos would change the rendered text
        if config.correction_enabled && timeline.rng.chance(config.typo_rate) {
            if let Some(wrong) = keyboard::neighbor(ch, timeline.rng) {
                let notice = config.notice_pause.sample(timeline.rng) * factor;
                timeline.press(wrong.to_string(), notice);
                let recover = timeline.base_delay();
                timeline.press(BACKSPACE.to_string(), recover);
            }
        }

        let delay = match chars.get(i + 1) {
            Some(&next) => timeline.delay_between(ch, next),
            None => 0.0,
        };
        timeline.press(ch.to_string(), delay);
    }

    timeline.events
}
