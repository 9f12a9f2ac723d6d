//! Video chip contract and a register-level stand-in.
//!
//! The orchestrator needs three things from the video chip each cycle:
//! whether it is holding the bus (bad lines, sprite DMA), the level of its
//! interrupt output, and register access at $D000-$D3FF. Pixel output is
//! not part of the contract.

/// Per-cycle interface the orchestrator drives.
pub trait VideoChip {
    /// Advance one system cycle.
    fn clock(&mut self);

    /// `true` while the chip owns the bus and the processor must wait.
    fn bus_stall(&self) -> bool;

    /// Interrupt output level (raster, collisions, light pen).
    fn interrupt_line(&self) -> bool;

    /// Register read; may have side effects.
    fn read(&mut self, reg: u8) -> u8;

    fn write(&mut self, reg: u8, value: u8);
}

/// A collision register: bits accumulate until read, and a read clears them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollisionLatch {
    bits: u8,
}

impl CollisionLatch {
    #[must_use]
    pub const fn new() -> Self {
        Self { bits: 0 }
    }

    /// OR in newly detected collisions.
    pub fn record(&mut self, bits: u8) {
        self.bits |= bits;
    }

    /// Return the accumulated bits and clear them.
    pub fn take(&mut self) -> u8 {
        std::mem::take(&mut self.bits)
    }

    #[must_use]
    pub const fn peek(&self) -> u8 {
        self.bits
    }
}

const SPRITE_SPRITE: u8 = 0x1E;
const SPRITE_BACKGROUND: u8 = 0x1F;

/// Register file with scriptable stall and interrupt lines.
///
/// Stands in for a full video chip in tests and headless runs.
#[derive(Debug, Clone)]
pub struct StubVideo {
    regs: [u8; 0x40],
    irq: bool,
    /// Half-open range of own cycle numbers during which the bus is held.
    stall_window: Option<(u64, u64)>,
    cycle: u64,
    sprite_sprite: CollisionLatch,
    sprite_background: CollisionLatch,
}

impl StubVideo {
    #[must_use]
    pub fn new() -> Self {
        Self {
            regs: [0; 0x40],
            irq: false,
            stall_window: None,
            cycle: 0,
            sprite_sprite: CollisionLatch::new(),
            sprite_background: CollisionLatch::new(),
        }
    }

    pub fn set_interrupt_line(&mut self, active: bool) {
        self.irq = active;
    }

    /// Hold the bus for `length` cycles, starting `delay` cycles after the
    /// next one. A delay of zero stalls the very next cycle.
    pub fn schedule_stall(&mut self, delay: u64, length: u64) {
        let start = self.cycle + 1 + delay;
        self.stall_window = Some((start, start + length));
    }

    pub fn record_sprite_collision(&mut self, bits: u8) {
        self.sprite_sprite.record(bits);
    }

    pub fn record_background_collision(&mut self, bits: u8) {
        self.sprite_background.record(bits);
    }

    /// Cycles clocked so far.
    #[must_use]
    pub fn cycles(&self) -> u64 {
        self.cycle
    }
}

impl Default for StubVideo {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoChip for StubVideo {
    fn clock(&mut self) {
        self.cycle += 1;
        if let Some((_, end)) = self.stall_window {
            if self.cycle >= end {
                self.stall_window = None;
            }
        }
    }

    fn bus_stall(&self) -> bool {
        self.stall_window
            .is_some_and(|(start, end)| (start..end).contains(&self.cycle))
    }

    fn interrupt_line(&self) -> bool {
        self.irq
    }

    fn read(&mut self, reg: u8) -> u8 {
        match reg & 0x3F {
            SPRITE_SPRITE => self.sprite_sprite.take(),
            SPRITE_BACKGROUND => self.sprite_background.take(),
            r => self.regs[usize::from(r)],
        }
    }

    fn write(&mut self, reg: u8, value: u8) {
        self.regs[usize::from(reg & 0x3F)] = value;
    }
}
