//! Commodore 64 core: 6510 processor, two 6526 CIAs and the per-cycle
//! orchestrator that keeps them in lock-step.
//!
//! The master clock ticks at CPU cycle rate (985,248 Hz PAL, 1,022,727 Hz
//! NTSC). Video and sound chips plug in through [`VideoChip`] and
//! [`SoundChip`]; register-level stand-ins are provided.

mod bus;
mod c64;
pub mod config;
mod memory;
pub mod sound;
pub mod video;

pub use bus::C64Bus;
pub use c64::C64;
pub use config::{C64Config, C64Model, ConfigError};
pub use memory::C64Memory;
pub use sound::{NullSound, SoundChip};
pub use video::{CollisionLatch, StubVideo, VideoChip};
