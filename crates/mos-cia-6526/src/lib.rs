//! MOS 6526 Complex Interface Adapter.
//!
//! Two 16-bit interval timers with a start pipeline, an interrupt control
//! register whose summary bit lags the condition bits by one cycle, a BCD
//! time-of-day clock with alarm, a serial shift register, and two 8-bit
//! ports with data direction registers.
//!
//! The chip is clocked once per system cycle through [`Cia::clock`]; its
//! interrupt output is [`Cia::irq`]. Which processor line that output drives
//! is the machine's business.

mod cia;
mod icr;
mod timer;
mod tod;

pub use cia::{Cia, DEFAULT_TOD_DIVIDER};
pub use icr::InterruptControl;
pub use timer::{TIMER_START_DELAY, Timer, TimerState};
pub use tod::TimeOfDay;
