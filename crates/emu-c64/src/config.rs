//! C64 configuration: model selection and time-of-day divider.

use std::fmt;

use emu_core::MasterClock;

/// C64 model variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum C64Model {
    /// PAL C64 (6569 VIC-II, 985,248 Hz CPU).
    #[default]
    C64Pal,
    /// NTSC C64 (6567 VIC-II, 1,022,727 Hz CPU).
    C64Ntsc,
}

impl C64Model {
    /// CPU clock frequency in Hz.
    #[must_use]
    pub const fn cpu_frequency(self) -> u64 {
        match self {
            C64Model::C64Pal => 985_248,
            C64Model::C64Ntsc => 1_022_727,
        }
    }

    #[must_use]
    pub const fn master_clock(self) -> MasterClock {
        MasterClock::new(self.cpu_frequency())
    }

    /// CPU cycles per tenth of a second, the CIA time-of-day step.
    #[must_use]
    pub const fn tod_divider(self) -> u32 {
        self.master_clock().ticks_per_frame(10).get() as u32
    }
}

/// Configuration for constructing a C64 instance.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct C64Config {
    /// Model variant.
    pub model: C64Model,
    /// Override for the time-of-day divider. `None` derives it from the
    /// model's CPU frequency.
    #[cfg_attr(feature = "serde", serde(default))]
    pub tod_divider: Option<u32>,
}

impl C64Config {
    #[must_use]
    pub fn new(model: C64Model) -> Self {
        Self {
            model,
            tod_divider: None,
        }
    }

    /// Effective time-of-day divider.
    #[must_use]
    pub fn tod_divider(&self) -> u32 {
        self.tod_divider.unwrap_or_else(|| self.model.tod_divider())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.tod_divider {
            Some(0) => Err(ConfigError::ZeroTodDivider),
            Some(divider) if u64::from(divider) > self.model.cpu_frequency() => {
                Err(ConfigError::TodDividerTooLarge(divider))
            }
            _ => Ok(()),
        }
    }
}

/// Rejected configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The time-of-day clock would never advance.
    ZeroTodDivider,
    /// Divider longer than one second of CPU time.
    TodDividerTooLarge(u32),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroTodDivider => write!(f, "TOD divider must be non-zero"),
            ConfigError::TodDividerTooLarge(divider) => {
                write!(f, "TOD divider {divider} exceeds one second of CPU cycles")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
