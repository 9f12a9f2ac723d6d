//! C64 bus: memory map, I/O routing and the per-cycle tick.
//!
//! Implements `emu_core::Bus` for the C64. Every processor access first
//! advances the machine by one system cycle, and by more while the video
//! chip holds the bus, so cycle counting follows bus traffic.
//!
//! # Memory map
//!
//! | Range         | Device                               |
//! |---------------|--------------------------------------|
//! | $0000-$CFFF   | RAM                                  |
//! | $D000-$D3FF   | Video chip (64 registers, mirrored)  |
//! | $D400-$D7FF   | Sound chip (32 registers, mirrored)  |
//! | $D800-$DBFF   | Colour RAM (low nybble)              |
//! | $DC00-$DCFF   | CIA1 (16 registers, mirrored)        |
//! | $DD00-$DDFF   | CIA2 (16 registers, mirrored)        |
//! | $DE00-$DFFF   | Expansion I/O, open ($FF)            |
//! | $E000-$FFFF   | RAM                                  |

#![allow(clippy::cast_possible_truncation)]

use emu_core::{Bus, Clock, InterruptLines};
use mos_cia_6526::Cia;

use crate::memory::C64Memory;
use crate::sound::{NullSound, SoundChip};
use crate::video::{StubVideo, VideoChip};

/// The C64 bus, implementing `emu_core::Bus`.
///
/// Owns every chip except the processor.
pub struct C64Bus<V: VideoChip = StubVideo, S: SoundChip = NullSound> {
    pub memory: C64Memory,
    pub cia1: Cia,
    pub cia2: Cia,
    pub video: V,
    pub sound: S,
    clock: Clock,
    /// Merged interrupt levels after the latest cycle.
    lines: InterruptLines,
    /// RESTORE key, wired to NMI alongside CIA2.
    restore: bool,
    /// Cycles in which the processor waited for the video chip.
    stall_cycles: u64,
}

impl<V: VideoChip, S: SoundChip> C64Bus<V, S> {
    #[must_use]
    pub fn new(video: V, sound: S, tod_divider: u32) -> Self {
        Self {
            memory: C64Memory::new(),
            cia1: Cia::with_tod_divider(tod_divider),
            cia2: Cia::with_tod_divider(tod_divider),
            video,
            sound,
            clock: Clock::new(),
            lines: InterruptLines::default(),
            restore: false,
            stall_cycles: 0,
        }
    }

    /// Advance every chip except the processor by one system cycle.
    ///
    /// φ1: timers, then video, then sound. The interrupt lines are merged
    /// before the processor gets φ2.
    pub fn tick_cycle(&mut self) {
        self.clock.begin_cycle();
        self.cia1.clock();
        self.cia2.clock();
        self.video.clock();
        self.sound.clock(1);
        self.lines = InterruptLines {
            irq: self.cia1.irq() || self.video.interrupt_line(),
            nmi: self.cia2.irq() || self.restore,
        };
        self.clock.enter_phi2();
    }

    /// Tick until the video chip releases the bus.
    fn wait_for_bus(&mut self) {
        self.tick_cycle();
        while self.video.bus_stall() {
            self.stall_cycles += 1;
            self.tick_cycle();
        }
    }

    /// Cold-start every chip and zero the clock. RAM is kept.
    pub fn reset(&mut self) {
        self.clock.reset();
        self.cia1.reset();
        self.cia2.reset();
        self.lines = InterruptLines::default();
        self.restore = false;
        self.stall_cycles = 0;
    }

    pub fn set_restore(&mut self, pressed: bool) {
        self.restore = pressed;
    }

    #[must_use]
    pub fn restore(&self) -> bool {
        self.restore
    }

    #[must_use]
    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    #[must_use]
    pub fn stall_cycles(&self) -> u64 {
        self.stall_cycles
    }

    /// Read without ticking and without side effects. Video and sound
    /// registers are not visible and read as open bus.
    #[must_use]
    pub fn peek(&self, addr: u16) -> u8 {
        match addr {
            0xD000..=0xD7FF | 0xDE00..=0xDFFF => 0xFF,
            0xD800..=0xDBFF => self.memory.colour_ram_read(addr - 0xD800),
            0xDC00..=0xDCFF => self.cia1.peek(addr as u8),
            0xDD00..=0xDDFF => self.cia2.peek(addr as u8),
            _ => self.memory.ram_read(addr),
        }
    }

    fn io_read(&mut self, addr: u16) -> u8 {
        match addr {
            0xD000..=0xD3FF => self.video.read((addr & 0x3F) as u8),
            0xD400..=0xD7FF => self.sound.read((addr & 0x1F) as u8),
            0xD800..=0xDBFF => self.memory.colour_ram_read(addr - 0xD800),
            0xDC00..=0xDCFF => self.cia1.read((addr & 0x0F) as u8),
            0xDD00..=0xDDFF => self.cia2.read((addr & 0x0F) as u8),
            _ => 0xFF,
        }
    }

    fn io_write(&mut self, addr: u16, value: u8) {
        match addr {
            0xD000..=0xD3FF => self.video.write((addr & 0x3F) as u8, value),
            0xD400..=0xD7FF => self.sound.write((addr & 0x1F) as u8, value),
            0xD800..=0xDBFF => self.memory.colour_ram_write(addr - 0xD800, value),
            0xDC00..=0xDCFF => self.cia1.write((addr & 0x0F) as u8, value),
            0xDD00..=0xDDFF => self.cia2.write((addr & 0x0F) as u8, value),
            _ => {}
        }
    }
}

impl<V: VideoChip, S: SoundChip> Bus for C64Bus<V, S> {
    fn read(&mut self, addr: u16) -> u8 {
        self.wait_for_bus();
        if (0xD000..=0xDFFF).contains(&addr) {
            self.io_read(addr)
        } else {
            self.memory.ram_read(addr)
        }
    }

    fn write(&mut self, addr: u16, value: u8) {
        self.wait_for_bus();
        if (0xD000..=0xDFFF).contains(&addr) {
            self.io_write(addr, value);
        } else {
            self.memory.ram_write(addr, value);
        }
    }

    fn interrupt_lines(&self) -> InterruptLines {
        self.lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mos_cia_6526::DEFAULT_TOD_DIVIDER;

    fn make_bus() -> C64Bus {
        C64Bus::new(StubVideo::new(), NullSound::new(), DEFAULT_TOD_DIVIDER)
    }

    #[test]
    fn ram_read_write() {
        let mut bus = make_bus();
        bus.write(0x8000, 0xAB);
        assert_eq!(bus.read(0x8000), 0xAB);
        assert_eq!(bus.clock().cycle(), 2);
    }

    #[test]
    fn io_writes_do_not_reach_ram() {
        let mut bus = make_bus();
        bus.write(0xD020, 0x0E);
        bus.write(0xDC04, 0x10);
        bus.write(0xD900, 0x37);
        assert_eq!(bus.memory.ram_read(0xD020), 0);
        assert_eq!(bus.memory.ram_read(0xDC04), 0);
        assert_eq!(bus.memory.ram_read(0xD900), 0);
        assert_eq!(bus.read(0xD020), 0x0E);
        assert_eq!(bus.read(0xD900), 0xF7);
    }

    #[test]
    fn cia_registers_mirror() {
        let mut bus = make_bus();
        bus.write(0xDC12, 0x5A);
        assert_eq!(bus.read(0xDC02), 0x5A);
        bus.write(0xDDF3, 0xA5);
        assert_eq!(bus.read(0xDD03), 0xA5);
    }

    #[test]
    fn expansion_io_is_open() {
        let mut bus = make_bus();
        bus.write(0xDE00, 0x12);
        assert_eq!(bus.read(0xDE00), 0xFF);
        assert_eq!(bus.read(0xDFFF), 0xFF);
    }

    #[test]
    fn peek_has_no_side_effects() {
        let mut bus = make_bus();
        bus.cia1.trigger_flag();
        assert_eq!(bus.peek(0xDC0D), 0x10);
        assert_eq!(bus.peek(0xDC0D), 0x10);
        assert_eq!(bus.clock().cycle(), 0);
        assert_eq!(bus.read(0xDC0D), 0x10);
        assert_eq!(bus.peek(0xDC0D), 0x00);
    }

    #[test]
    fn stall_delays_the_access() {
        let mut bus = make_bus();
        bus.video.schedule_stall(0, 3);
        bus.memory.ram_write(0x1000, 0x42);
        assert_eq!(bus.read(0x1000), 0x42);
        assert_eq!(bus.clock().cycle(), 4);
        assert_eq!(bus.stall_cycles(), 3);
        assert_eq!(bus.sound.cycles(), 4);
    }

    #[test]
    fn lines_merge_sources() {
        let mut bus = make_bus();
        bus.video.set_interrupt_line(true);
        bus.set_restore(true);
        bus.tick_cycle();
        assert_eq!(
            bus.interrupt_lines(),
            InterruptLines { irq: true, nmi: true }
        );
        bus.video.set_interrupt_line(false);
        bus.set_restore(false);
        bus.tick_cycle();
        assert_eq!(bus.interrupt_lines(), InterruptLines::default());
    }
}
