//! Interval timer with start pipeline.

use std::fmt;

/// Cycles between the start bit going 0→1 and the first count.
pub const TIMER_START_DELAY: u8 = 2;

/// Run state of one interval timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Stopped,
    /// Started, still inside the pipeline; holds the remaining delay.
    PendingStart(u8),
    Running,
}

impl fmt::Display for TimerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimerState::Stopped => write!(f, "stopped"),
            TimerState::PendingStart(n) => write!(f, "pending({n})"),
            TimerState::Running => write!(f, "running"),
        }
    }
}

/// One 16-bit down-counter with its reload latch.
#[derive(Debug, Clone)]
pub struct Timer {
    counter: u16,
    latch: u16,
    state: TimerState,
    one_shot: bool,
}

impl Timer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            counter: 0xFFFF,
            latch: 0xFFFF,
            state: TimerState::Stopped,
            one_shot: false,
        }
    }

    /// Write the low latch byte. The counter is untouched.
    pub fn write_latch_lo(&mut self, value: u8) {
        self.latch = (self.latch & 0xFF00) | u16::from(value);
    }

    /// Write the high latch byte; a stopped timer also loads its counter.
    pub fn write_latch_hi(&mut self, value: u8) {
        self.latch = (self.latch & 0x00FF) | (u16::from(value) << 8);
        if self.state == TimerState::Stopped {
            self.counter = self.latch;
        }
    }

    /// Copy the latch into the counter now.
    pub fn force_load(&mut self) {
        self.counter = self.latch;
    }

    /// Start bit set. Only a stopped timer enters the pipeline.
    pub fn start(&mut self) {
        if self.state == TimerState::Stopped {
            self.state = TimerState::PendingStart(TIMER_START_DELAY);
        }
    }

    /// Start bit cleared. Takes effect immediately.
    pub fn stop(&mut self) {
        self.state = TimerState::Stopped;
    }

    pub fn set_one_shot(&mut self, one_shot: bool) {
        self.one_shot = one_shot;
    }

    /// Advance one system cycle.
    ///
    /// `count` says whether the selected input source produced a count
    /// event this cycle. The start pipeline always advances in system
    /// cycles. Returns `true` on underflow.
    pub fn clock(&mut self, count: bool) -> bool {
        match self.state {
            TimerState::Stopped => false,
            TimerState::PendingStart(delay) => {
                let remaining = delay.saturating_sub(1);
                self.state = if remaining == 0 {
                    TimerState::Running
                } else {
                    TimerState::PendingStart(remaining)
                };
                false
            }
            TimerState::Running => {
                if !count {
                    return false;
                }
                if self.counter <= 1 {
                    self.counter = self.latch;
                    if self.one_shot {
                        self.state = TimerState::Stopped;
                    }
                    true
                } else {
                    self.counter -= 1;
                    false
                }
            }
        }
    }

    #[must_use]
    pub fn counter(&self) -> u16 {
        self.counter
    }

    #[must_use]
    pub fn latch(&self) -> u16 {
        self.latch
    }

    #[must_use]
    pub fn state(&self) -> TimerState {
        self.state
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.state == TimerState::Stopped
    }

    #[must_use]
    pub fn is_one_shot(&self) -> bool {
        self.one_shot
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}
