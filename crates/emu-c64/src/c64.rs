//! Top-level C64 system.
//!
//! The processor drives time: each of its bus accesses runs one system
//! cycle on the bus first (more while the video chip stalls it), so the
//! CIAs, video and sound chips stay in lock-step with processor cycles.
//!
//! # Cycle order
//!
//! 1. Clock enters φ1
//! 2. CIA1, then CIA2
//! 3. Video chip, then sound chip
//! 4. IRQ = CIA1 | video, NMI = CIA2 | RESTORE
//! 5. Clock enters φ2; the processor access happens unless stalled

use emu_core::{Clock, Observable, Value};
use mos_6502::Mos6502;

use crate::bus::C64Bus;
use crate::config::{C64Config, ConfigError};
use crate::sound::{NullSound, SoundChip};
use crate::video::{StubVideo, VideoChip};

/// C64 system.
pub struct C64<V: VideoChip = StubVideo, S: SoundChip = NullSound> {
    cpu: Mos6502,
    bus: C64Bus<V, S>,
    config: C64Config,
}

impl C64 {
    /// Create a C64 with the stand-in video and sound chips.
    pub fn new(config: &C64Config) -> Result<Self, ConfigError> {
        Self::with_chips(config, StubVideo::new(), NullSound::new())
    }
}

impl<V: VideoChip, S: SoundChip> C64<V, S> {
    /// Create a C64 around caller-supplied video and sound chips.
    ///
    /// The processor is left in its power-on state; load memory, then call
    /// [`reset`](Self::reset).
    pub fn with_chips(config: &C64Config, video: V, sound: S) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            cpu: Mos6502::new(),
            bus: C64Bus::new(video, sound, config.tod_divider()),
            config: config.clone(),
        })
    }

    /// Reset line: chips to power-on state, clock to zero, then the
    /// processor's reset sequence (which itself takes seven cycles).
    pub fn reset(&mut self) {
        log::debug!("C64 reset ({:?})", self.config.model);
        self.bus.reset();
        self.cpu.reset(&mut self.bus);
    }

    /// Execute one instruction (or interrupt entry).
    ///
    /// Returns system cycles elapsed, stall cycles included.
    pub fn step(&mut self) -> u64 {
        let start = self.bus.clock().cycle();
        self.cpu.step(&mut self.bus);
        self.bus.clock().cycle() - start
    }

    /// Run whole instructions until at least `budget` cycles have passed.
    ///
    /// Returns the cycles actually run; the last instruction may overshoot.
    pub fn run_cycles(&mut self, budget: u64) -> u64 {
        let mut elapsed = 0;
        while elapsed < budget {
            elapsed += self.step();
        }
        elapsed
    }

    /// Run `count` instructions. Returns the cycles they took.
    pub fn run_instructions(&mut self, count: u64) -> u64 {
        (0..count).map(|_| self.step()).sum()
    }

    /// Hold RESTORE down. The NMI edge is seen on the next cycle.
    pub fn press_restore(&mut self) {
        log::debug!("RESTORE pressed");
        self.bus.set_restore(true);
    }

    pub fn release_restore(&mut self) {
        self.bus.set_restore(false);
    }

    /// Reference to the CPU.
    #[must_use]
    pub fn cpu(&self) -> &Mos6502 {
        &self.cpu
    }

    /// Mutable reference to the CPU.
    pub fn cpu_mut(&mut self) -> &mut Mos6502 {
        &mut self.cpu
    }

    /// Reference to the bus.
    #[must_use]
    pub fn bus(&self) -> &C64Bus<V, S> {
        &self.bus
    }

    /// Mutable reference to the bus.
    pub fn bus_mut(&mut self) -> &mut C64Bus<V, S> {
        &mut self.bus
    }

    #[must_use]
    pub fn clock(&self) -> &Clock {
        self.bus.clock()
    }

    #[must_use]
    pub fn config(&self) -> &C64Config {
        &self.config
    }

    /// Copy a program into RAM.
    pub fn load(&mut self, addr: u16, data: &[u8]) {
        self.bus.memory.load(addr, data);
    }
}

fn parse_address(text: &str) -> Option<u16> {
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        u16::from_str_radix(hex, 16).ok()
    } else if let Some(hex) = text.strip_prefix('$') {
        u16::from_str_radix(hex, 16).ok()
    } else {
        text.parse().ok()
    }
}

impl<V: VideoChip, S: SoundChip> Observable for C64<V, S> {
    fn query(&self, path: &str) -> Option<Value> {
        if let Some(rest) = path.strip_prefix("cpu.") {
            self.cpu.query(rest)
        } else if let Some(rest) = path.strip_prefix("cia1.") {
            self.bus.cia1.query(rest)
        } else if let Some(rest) = path.strip_prefix("cia2.") {
            self.bus.cia2.query(rest)
        } else if let Some(rest) = path.strip_prefix("memory.") {
            parse_address(rest).map(|addr| Value::U8(self.bus.peek(addr)))
        } else {
            match path {
                "clock" => Some(self.bus.clock().cycle().into()),
                "clock.phase" => Some(format!("{:?}", self.bus.clock().phase()).into()),
                "stall_cycles" => Some(self.bus.stall_cycles().into()),
                "restore" => Some(self.bus.restore().into()),
                "halted" => Some(self.cpu.is_halted().into()),
                _ => None,
            }
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "cpu.<6502_paths>",
            "cia1.<cia_paths>",
            "cia2.<cia_paths>",
            "memory.<address>",
            "clock",
            "clock.phase",
            "stall_cycles",
            "restore",
            "halted",
        ]
    }
}
