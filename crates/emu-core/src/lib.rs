//! Core traits and types for cycle-accurate emulation.
//!
//! Everything advances one bus cycle at a time. Every processor access is a
//! cycle, every cycle clocks the peripherals. No exceptions.

mod bus;
mod clock;
mod cpu;
mod observable;
mod tickable;
mod ticks;

pub use bus::{Bus, InterruptLines, SimpleBus};
pub use clock::{Clock, MasterClock, Phase};
pub use cpu::Cpu;
pub use observable::{Observable, Value};
pub use tickable::Tickable;
pub use ticks::Ticks;
