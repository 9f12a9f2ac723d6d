//! System clock and master clock configuration.

use crate::Ticks;

/// Master clock configuration for a system.
///
/// Each system has a master crystal that drives all timing. Components may
/// run at divided rates, but everything derives from this frequency.
#[derive(Debug, Clone, Copy)]
pub struct MasterClock {
    /// Processor clock frequency in Hz (e.g., `985_248` for a PAL C64).
    pub frequency_hz: u64,
}

impl MasterClock {
    #[must_use]
    pub const fn new(frequency_hz: u64) -> Self {
        Self { frequency_hz }
    }

    /// Ticks per period at the given rate (integer division).
    #[must_use]
    pub const fn ticks_per_frame(&self, frames_per_second: u64) -> Ticks {
        Ticks::new(self.frequency_hz / frames_per_second)
    }
}

/// Half of a system cycle.
///
/// During φ1 the video chip owns the bus; during φ2 the processor does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Phase {
    #[default]
    Phi1,
    Phi2,
}

/// Monotonic system cycle counter.
///
/// Incremented once per system cycle, zeroed on reset, never decremented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Clock {
    cycle: u64,
    phase: Phase,
}

impl Clock {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cycle: 0,
            phase: Phase::Phi1,
        }
    }

    /// Start a new cycle in φ1.
    pub fn begin_cycle(&mut self) {
        self.cycle += 1;
        self.phase = Phase::Phi1;
    }

    /// Hand the bus to the processor for the rest of the cycle.
    pub fn enter_phi2(&mut self) {
        self.phase = Phase::Phi2;
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Cycles elapsed since construction or the last reset.
    #[must_use]
    pub const fn cycle(&self) -> u64 {
        self.cycle
    }

    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub const fn elapsed(&self) -> Ticks {
        Ticks::new(self.cycle)
    }
}
