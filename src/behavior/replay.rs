//! Replay of generated plans through a [`Driver`]
//!
//! The replayer only executes data that was already generated; it never
//! touches session state. It sleeps for the planned delays between events and
//! checks its [`CancelToken`] before every event and during every sleep.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tracing::{debug, trace};

use super::keystroke::KeystrokeEvent;
use super::motion::{ClickTiming, DoubleClickTiming, MousePath};
use super::scroll::ScrollPlan;
use super::traits::Driver;
use crate::{Error, Result};

#[derive(Debug, Default)]
struct CancelState {
    cancelled: AtomicBool,
    notify: Notify,
}

/// Cooperative cancellation for in-flight replays
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    state: Arc<CancelState>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Abort every replay holding this token at its next event boundary
    pub fn cancel(&self) {
        self.state.cancelled.store(true, Ordering::SeqCst);
        self.state.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.cancelled.load(Ordering::SeqCst)
    }

    /// Resolves once [`CancelToken::cancel`] has been called
    pub async fn cancelled(&self) {
        loop {
            let notified = self.state.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

/// Key transition in a merged keystroke timeline
#[derive(Debug, Clone, Copy, PartialEq)]
enum KeyTransition {
    Down,
    Up,
}

/// Executes plans against a driver
pub struct Replayer<'a, D: Driver + ?Sized> {
    driver: &'a D,
    cancel: CancelToken,
    time_scale: f64,
}

impl<'a, D: Driver + ?Sized> Replayer<'a, D> {
    /// Create a replayer that sleeps for the planned delays
    pub fn new(driver: &'a D, cancel: CancelToken) -> Self {
        Self {
            driver,
            cancel,
            time_scale: 1.0,
        }
    }

    /// Scale every sleep; `0.0` dispatches events back to back
    pub fn with_time_scale(mut self, time_scale: f64) -> Self {
        self.time_scale = time_scale.max(0.0);
        self
    }

    fn ensure_active(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        Ok(())
    }

    async fn wait(&self, delay_ms: f64) -> Result<()> {
        self.ensure_active()?;
        let scaled = delay_ms * self.time_scale;
        if scaled <= 0.0 || !scaled.is_finite() {
            return Ok(());
        }

        tokio::select! {
            _ = tokio::time::sleep(Duration::from_secs_f64(scaled / 1000.0)) => Ok(()),
            _ = self.cancel.cancelled() => Err(Error::Cancelled),
        }
    }

    /// Move along a path; returns the number of dispatched events
    pub async fn replay_path(&self, path: &MousePath) -> Result<usize> {
        let mut previous = 0.0;
        for (point, ts) in path.points.iter().zip(&path.timestamps_ms) {
            self.wait(ts - previous).await?;
            previous = *ts;
            self.driver
                .move_cursor_to(*point)
                .await
                .map_err(Error::driver)?;
        }
        trace!(events = path.len(), "path replayed");
        Ok(path.len())
    }

    /// Press and release the primary button
    pub async fn replay_click(&self, timing: &ClickTiming) -> Result<usize> {
        self.wait(timing.pre_delay_ms).await?;
        self.driver.press_button().await.map_err(Error::driver)?;
        self.wait(timing.hold_duration_ms).await?;
        self.driver.release_button().await.map_err(Error::driver)?;
        self.wait(timing.post_delay_ms).await?;
        Ok(2)
    }

    /// Two clicks separated by the planned interval
    pub async fn replay_double_click(&self, timing: &DoubleClickTiming) -> Result<usize> {
        self.wait(timing.pre_delay_ms).await?;
        for (i, hold) in timing.hold_durations_ms.iter().enumerate() {
            if i > 0 {
                self.wait(timing.interval_ms).await?;
            }
            self.driver.press_button().await.map_err(Error::driver)?;
            self.wait(*hold).await?;
            self.driver.release_button().await.map_err(Error::driver)?;
        }
        self.wait(timing.post_delay_ms).await?;
        Ok(4)
    }

    /// Type a keystroke sequence; overlapping holds are honored
    pub async fn replay_keystrokes(&self, events: &[KeystrokeEvent]) -> Result<usize> {
        let mut timeline: Vec<(f64, KeyTransition, &str)> = Vec::with_capacity(events.len() * 2);
        for event in events {
            timeline.push((event.down_time_ms, KeyTransition::Down, &event.key));
            timeline.push((event.up_time_ms, KeyTransition::Up, &event.key));
        }
        // Stable: a key's down always precedes its own up
        timeline.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut previous = 0.0;
        for (at, transition, key) in &timeline {
            self.wait(at - previous).await?;
            previous = *at;
            let dispatched = match transition {
                KeyTransition::Down => self.driver.press_key(key).await,
                KeyTransition::Up => self.driver.release_key(key).await,
            };
            dispatched.map_err(Error::driver)?;
        }
        trace!(events = timeline.len(), "keystrokes replayed");
        Ok(timeline.len())
    }

    /// Dispatch a scroll plan
    pub async fn replay_scroll(&self, plan: &ScrollPlan) -> Result<usize> {
        for step in &plan.steps {
            self.wait(step.delay_ms).await?;
            self.driver
                .scroll_by(step.delta_px)
                .await
                .map_err(Error::driver)?;
        }
        debug!(steps = plan.steps.len(), total = plan.total_px(), "scroll replayed");
        Ok(plan.steps.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::mock::{DriverEvent, MockDriver};
    use crate::behavior::motion::Point;

    #[tokio::test]
    async fn test_cancel_token() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
        let clone = token.clone();
        clone.cancel();
        assert!(token.is_cancelled());
        // Already cancelled: resolves immediately
        token.cancelled().await;
    }

    #[tokio::test]
    async fn test_cancel_interrupts_sleep() {
        let driver = MockDriver::new();
        let token = CancelToken::new();
        let replayer = Replayer::new(&driver, token.clone());

        let path = MousePath {
            points: vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)],
            timestamps_ms: vec![0.0, 60_000.0],
        };

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            token.cancel();
        });

        let result = replayer.replay_path(&path).await;
        canceller.await.unwrap();

        assert!(matches!(result, Err(Error::Cancelled)));
        assert_eq!(driver.events().len(), 1);
    }

    #[tokio::test]
    async fn test_keystroke_rollover_order() {
        let driver = MockDriver::new();
        let replayer = Replayer::new(&driver, CancelToken::new()).with_time_scale(0.0);
        let events = vec![
            KeystrokeEvent {
                key: "a".into(),
                down_time_ms: 0.0,
                up_time_ms: 120.0,
                delay_before_next_ms: 80.0,
            },
            KeystrokeEvent {
                key: "b".into(),
                down_time_ms: 80.0,
                up_time_ms: 150.0,
                delay_before_next_ms: 0.0,
            },
        ];

        let dispatched = replayer.replay_keystrokes(&events).await.unwrap();
        assert_eq!(dispatched, 4);
        assert_eq!(
            driver.events(),
            vec![
                DriverEvent::KeyDown("a".into()),
                DriverEvent::KeyDown("b".into()),
                DriverEvent::KeyUp("a".into()),
                DriverEvent::KeyUp("b".into()),
            ]
        );
    }

    #[test]
    fn test_scroll_replay_blocking() {
        let driver = MockDriver::new();
        let replayer = Replayer::new(&driver, CancelToken::new()).with_time_scale(0.0);
        let plan = ScrollPlan {
            mode: crate::behavior::traits::ScrollMode::Stepped,
            steps: vec![
                crate::behavior::scroll::ScrollStep { delta_px: 100, delay_ms: 40.0 },
                crate::behavior::scroll::ScrollStep { delta_px: -30, delay_ms: 40.0 },
            ],
        };

        let dispatched = tokio_test::block_on(replayer.replay_scroll(&plan)).unwrap();
        assert_eq!(dispatched, 2);
        assert_eq!(driver.scrolled_px(), 70);
    }

    #[tokio::test]
    async fn test_driver_failure_is_surfaced_unmodified() {
        let driver = MockDriver::failing_after(1);
        let replayer = Replayer::new(&driver, CancelToken::new()).with_time_scale(0.0);
        let timing = ClickTiming {
            pre_delay_ms: 10.0,
            hold_duration_ms: 10.0,
            post_delay_ms: 10.0,
        };

        let err = replayer.replay_click(&timing).await.unwrap_err();
        match err {
            Error::Driver(inner) => {
                assert!(inner.downcast_ref::<crate::behavior::mock::MockDriverError>().is_some())
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(driver.events(), vec![DriverEvent::Press]);
    }
}
