//! Per-host crawl-delay scheduler (spec §4.5).
//!
//! Reservations (not sleeps) are the critical section: the lock is held only
//! long enough to compute and record the next slot, so concurrent callers to
//! the same host queue deterministically without serializing their sleeps.

use crate::utils::clock::{default_clock, Clock};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;


pub struct Scheduler {
    earliest_next_start: Mutex<HashMap<String, DateTime<Utc>>>,
    clock: Arc<dyn Clock>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// Error returned when a scheduled wait is cancelled before its slot starts.
#[derive(Debug, thiserror::Error)]
#[error("crawl-delay wait cancelled")]
pub struct Cancelled;

impl Scheduler {
    pub fn new() -> Self {
        Self::with_clock(default_clock())
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            earliest_next_start: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// Reserve the next slot for `host` given crawl-delay `delay`, then wait
    /// for it (honoring `cancel`, which wins if fired before the slot
    /// starts). Unknown/zero delay returns immediately.
    pub async fn wait_for_slot(
        &self,
        host: &str,
        delay: Duration,
        cancel: Option<oneshot::Receiver<()>>,
    ) -> Result<(), Cancelled> {
        if delay.is_zero() {
            return Ok(());
        }

        let now = self.clock.now();
        let start = {
            let mut map = self
                .earliest_next_start
                .lock()
                .expect("scheduler mutex poisoned");
            let earliest = map.get(host).copied().unwrap_or(now);
            let start = earliest.max(now);
            let chrono_delay = chrono::Duration::from_std(delay).unwrap_or_default();
            map.insert(host.to_string(), start + chrono_delay);
            start
        };

        let remaining = (start - self.clock.now())
            .to_std()
            .unwrap_or(Duration::ZERO);
        if remaining.is_zero() {
            return Ok(());
        }

        match cancel {
            None => {
                tokio::time::sleep(remaining).await;
                Ok(())
            }
            Some(cancel) => tokio::select! {
                _ = tokio::time::sleep(remaining) => Ok(()),
                _ = cancel => Err(Cancelled),
            },
        }
    }
}
