use std::time::{Duration, Instant};

const SECOND: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct Countdown {
    total_seconds: u64,
    remaining: u64,
    running: bool,
    hidden: bool,
    last_tick: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Running,
    Finished,
    Stopped,
}

impl Countdown {
    pub fn start(minutes: u32, now: Instant) -> Self {
        let total_seconds = (u64::from(minutes) * 60).max(1);
        Self {
            total_seconds,
            remaining: total_seconds,
            running: true,
            hidden: false,
            last_tick: now,
        }
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn hide(&mut self) {
        self.hidden = true;
    }

    pub fn show(&mut self) {
        self.hidden = false;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn progress(&self) -> f64 {
        1.0 - self.remaining as f64 / self.total_seconds as f64
    }

    /// Consumes every whole second elapsed since the last tick.
    pub fn tick(&mut self, now: Instant) -> Tick {
        if !self.running {
            return Tick::Stopped;
        }
        while now.saturating_duration_since(self.last_tick) >= SECOND && self.remaining > 0 {
            self.last_tick += SECOND;
            self.remaining -= 1;
        }
        if self.remaining == 0 {
            self.running = false;
            Tick::Finished
        } else {
            Tick::Running
        }
    }
}

pub fn format_time(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_time(0), "00:00");
        assert_eq!(format_time(61), "01:01");
        assert_eq!(format_time(600 * 60), "600:00");
    }

    #[test]
    fn counts_down_whole_seconds() {
        let start = Instant::now();
        let mut c = Countdown::start(1, start);
        assert_eq!(c.remaining(), 60);

        assert_eq!(c.tick(start + Duration::from_millis(999)), Tick::Running);
        assert_eq!(c.remaining(), 60);
        assert_eq!(c.tick(start + Duration::from_millis(2500)), Tick::Running);
        assert_eq!(c.remaining(), 58);
        assert_eq!(c.tick(start + Duration::from_secs(60)), Tick::Finished);
        assert_eq!(c.remaining(), 0);
        assert_eq!(c.tick(start + Duration::from_secs(61)), Tick::Stopped);
    }

    #[test]
    fn keeps_running_while_hidden() {
        let start = Instant::now();
        let mut c = Countdown::start(1, start);
        c.hide();
        assert_eq!(c.tick(start + Duration::from_secs(30)), Tick::Running);
        assert!(c.is_hidden());
        c.show();
        assert_eq!(c.remaining(), 30);
    }

    #[test]
    fn stop_halts_ticks() {
        let start = Instant::now();
        let mut c = Countdown::start(1, start);
        c.stop();
        assert_eq!(c.tick(start + Duration::from_secs(120)), Tick::Stopped);
        assert_eq!(c.remaining(), 60);
    }
}
