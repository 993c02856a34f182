//! Single-slot reminder timer.
//!
//! At most one fire is pending. The event loop polls [`Scheduler::poll`] on
//! every tick; arming always replaces whatever was pending.

use chrono::{DateTime, Utc};
use std::time::{Duration, Instant};

use crate::model::Document;

// Far beyond any real delay, small enough that `Instant + MAX_DELAY` fits.
const MAX_DELAY: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

#[derive(Debug, Default)]
pub struct Scheduler {
    deadline: Option<Instant>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arm(&mut self, delay: Duration, now: Instant) {
        self.cancel();
        let delay = delay.min(MAX_DELAY);
        log::debug!("Reminder armed for {}s", delay.as_secs());
        self.deadline = now.checked_add(delay);
        if self.deadline.is_none() {
            log::warn!("Reminder delay of {}s is out of range, not armed", delay.as_secs());
        }
    }

    pub fn cancel(&mut self) {
        if self.deadline.take().is_some() {
            log::debug!("Cancelled pending reminder");
        }
    }

    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline.map(|d| d.saturating_duration_since(now))
    }

    /// Returns true exactly once when the pending deadline has passed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                log::debug!("Reminder fired");
                true
            }
            _ => false,
        }
    }
}

/// Delay before the first reminder after launch.
pub fn initial_delay(
    doc: &Document,
    now: DateTime<Utc>,
    popup_now: bool,
    launch_delay: Duration,
) -> Duration {
    if popup_now {
        return launch_delay;
    }
    match doc.not_before() {
        Some(not_before) if not_before > now => until(not_before, now),
        _ => launch_delay,
    }
}

/// What to do when the timer fires and no reminder is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireDecision {
    Show,
    Rearm(Duration),
}

pub fn on_fire(doc: &Document, now: DateTime<Utc>) -> FireDecision {
    match doc.not_before() {
        Some(not_before) if now < not_before => FireDecision::Rearm(until(not_before, now)),
        _ => FireDecision::Show,
    }
}

fn until(at: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    (at - now).to_std().unwrap_or(Duration::ZERO)
}
