//! Clock authority: the single source of simulated time.
//!
//! One background thread calls [`SimClock::advance`] in a loop. Every other
//! actor only reads the clock and uses [`SimClock::sleep_minutes`] to let
//! simulated time pass, so all waits share the same minute-to-wall-clock scale.

use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{info, trace};

/// Minutes in a calendar day, used for `HH:MM` rendering.
pub const MINUTES_PER_DAY: u64 = 24 * 60;

/// Outcome of one clock step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockTick {
    /// The minute counter moved to the contained value.
    Advanced(u64),
    /// The nominal day length had already been reached; the day is closed.
    DayFinished,
}

#[derive(Debug, Default)]
struct ClockState {
    minute: u64,
    day_finished: bool,
}

#[derive(Debug)]
pub struct SimClock {
    state: Mutex<ClockState>,
    day_minutes: u64,
    minute_duration: Duration,
}

impl SimClock {
    /// Clock for a day of `day_minutes`, where each simulated minute lasts
    /// `minute_duration` of real time.
    pub fn new(day_minutes: u64, minute_duration: Duration) -> Self {
        Self {
            state: Mutex::new(ClockState::default()),
            day_minutes,
            minute_duration,
        }
    }

    fn lock(&self) -> MutexGuard<'_, ClockState> {
        self.state.lock().expect("clock mutex poisoned")
    }

    pub fn day_minutes(&self) -> u64 {
        self.day_minutes
    }

    pub fn now_minute(&self) -> u64 {
        self.lock().minute
    }

    pub fn is_day_finished(&self) -> bool {
        self.lock().day_finished
    }

    /// Block the calling thread for `minutes` simulated minutes.
    pub fn sleep_minutes(&self, minutes: u64) {
        let real = self.minute_duration.saturating_mul(minutes.min(u32::MAX as u64) as u32);
        if !real.is_zero() {
            thread::sleep(real);
        }
    }

    /// Wait one simulated minute, then step the clock.
    pub fn advance(&self) -> ClockTick {
        self.sleep_minutes(1);
        let mut state = self.lock();
        if state.minute >= self.day_minutes {
            state.day_finished = true;
            ClockTick::DayFinished
        } else {
            state.minute += 1;
            ClockTick::Advanced(state.minute)
        }
    }

    /// Advance until the day is closed.
    pub fn run(&self) {
        loop {
            match self.advance() {
                ClockTick::Advanced(minute) => {
                    trace!(minute, "clock advanced");
                }
                ClockTick::DayFinished => {
                    info!(
                        day_minutes = self.day_minutes,
                        "day finished; no new trips will be admitted"
                    );
                    return;
                }
            }
        }
    }

    /// Run the clock loop on a dedicated `clock` thread.
    pub fn spawn(self: &Arc<Self>) -> std::io::Result<JoinHandle<()>> {
        let clock = Arc::clone(self);
        thread::Builder::new()
            .name("clock".to_string())
            .spawn(move || clock.run())
    }
}

/// Render a simulated minute as `HH:MM`, suffixed with ` (+Nd)` once the
/// minute reaches the end of the nominal day of `day_minutes`.
///
/// Each nominal day restarts the wall display at `00:00`.
///
/// # Panics
///
/// Panics if `day_minutes` is zero.
pub fn minute_to_clock(minute: u64, day_minutes: u64) -> String {
    assert!(day_minutes > 0, "day length must be positive");
    let day_offset = minute / day_minutes;
    let in_day = (minute % day_minutes) % MINUTES_PER_DAY;
    let (hh, mm) = (in_day / 60, in_day % 60);
    if day_offset == 0 {
        format!("{hh:02}:{mm:02}")
    } else {
        format!("{hh:02}:{mm:02} (+{day_offset}d)")
    }
}
