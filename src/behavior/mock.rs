//! Mock driver implementation for testing
//!
//! Records every dispatched event and can be told to fail after a fixed
//! number of successful calls.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use super::keystroke::BACKSPACE;
use super::motion::Point;
use super::traits::Driver;

/// Event received by [`MockDriver`]
#[derive(Debug, Clone, PartialEq)]
pub enum DriverEvent {
    Move(Point),
    Press,
    Release,
    KeyDown(String),
    KeyUp(String),
    Scroll(i64),
}

/// Error returned once the configured call budget is spent
#[derive(Debug, thiserror::Error)]
#[error("mock driver failed on call {call}")]
pub struct MockDriverError {
    pub call: usize,
}

/// Recording driver
#[derive(Debug, Default)]
pub struct MockDriver {
    events: Mutex<Vec<DriverEvent>>,
    calls: AtomicUsize,
    fail_after: Option<usize>,
}

impl MockDriver {
    /// Create a driver that accepts every event
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a driver that fails every call after `successful` calls
    pub fn failing_after(successful: usize) -> Self {
        Self {
            fail_after: Some(successful),
            ..Default::default()
        }
    }

    /// Events accepted so far
    pub fn events(&self) -> Vec<DriverEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Text typed into an empty field by the accepted key-downs
    pub fn typed_text(&self) -> String {
        let mut text = String::new();
        for event in self.events() {
            if let DriverEvent::KeyDown(key) = event {
                if key == BACKSPACE {
                    text.pop();
                } else {
                    text.push_str(&key);
                }
            }
        }
        text
    }

    /// Signed sum of accepted scroll deltas
    pub fn scrolled_px(&self) -> i64 {
        self.events()
            .iter()
            .map(|e| match e {
                DriverEvent::Scroll(delta) => *delta,
                _ => 0,
            })
            .sum()
    }

    fn record(&self, event: DriverEvent) -> anyhow::Result<()> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(limit) = self.fail_after {
            if call >= limit {
                return Err(MockDriverError { call }.into());
            }
        }
        self.events
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock error: {}", e))?
            .push(event);
        Ok(())
    }
}

#[async_trait]
impl Driver for MockDriver {
    async fn move_cursor_to(&self, point: Point) -> anyhow::Result<()> {
        self.record(DriverEvent::Move(point))
    }

    async fn press_button(&self) -> anyhow::Result<()> {
        self.record(DriverEvent::Press)
    }

    async fn release_button(&self) -> anyhow::Result<()> {
        self.record(DriverEvent::Release)
    }

    async fn press_key(&self, key: &str) -> anyhow::Result<()> {
        self.record(DriverEvent::KeyDown(key.to_string()))
    }

    async fn release_key(&self, key: &str) -> anyhow::Result<()> {
        self.record(DriverEvent::KeyUp(key.to_string()))
    }

    async fn scroll_by(&self, delta_px: i64) -> anyhow::Result<()> {
        self.record(DriverEvent::Scroll(delta_px))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_driver_records() {
        let driver = MockDriver::new();
        driver.move_cursor_to(Point::new(1.0, 2.0)).await.unwrap();
        driver.press_key("h").await.unwrap();
        driver.press_key("x").await.unwrap();
        driver.press_key(BACKSPACE).await.unwrap();
        driver.press_key("i").await.unwrap();
        driver.scroll_by(-40).await.unwrap();

        assert_eq!(driver.events().len(), 6);
        assert_eq!(driver.typed_text(), "hi");
        assert_eq!(driver.scrolled_px(), -40);
    }

    #[tokio::test]
    async fn test_mock_driver_fails_after_budget() {
        let driver = MockDriver::failing_after(2);
        assert!(driver.press_button().await.is_ok());
        assert!(driver.release_button().await.is_ok());
        assert!(driver.press_button().await.is_err());
        assert_eq!(driver.events(), vec![DriverEvent::Press, DriverEvent::Release]);
    }
}
