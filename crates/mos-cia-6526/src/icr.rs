//! Interrupt control register.
//!
//! | Bit | Source                         |
//! |-----|--------------------------------|
//! | 0   | Timer A underflow              |
//! | 1   | Timer B underflow              |
//! | 2   | Time-of-day alarm              |
//! | 3   | Serial shift register complete |
//! | 4   | FLAG pin                       |
//! | 7   | Interrupt occurred (read only) |
//!
//! Bit 7 and the interrupt output follow an unmasked condition by one
//! cycle: raising the condition fills a one-slot pending flag that the next
//! [`begin_cycle`](InterruptControl::begin_cycle) consumes.

pub const TIMER_A: u8 = 0x01;
pub const TIMER_B: u8 = 0x02;
pub const ALARM: u8 = 0x04;
pub const SERIAL: u8 = 0x08;
pub const FLAG: u8 = 0x10;

const SOURCES: u8 = 0x1F;
const OCCURRED: u8 = 0x80;

#[derive(Debug, Clone, Default)]
pub struct InterruptControl {
    /// Condition bits 0-4.
    data: u8,
    /// Enable mask, bits 0-4.
    mask: u8,
    pending: bool,
    /// Bit 7; also the level of the interrupt output.
    asserted: bool,
}

impl InterruptControl {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set condition bits.
    pub fn raise(&mut self, bits: u8) {
        self.data |= bits & SOURCES;
        self.schedule();
    }

    /// Write the mask: bit 7 set ORs bits 0-4 in, bit 7 clear removes them.
    pub fn write_mask(&mut self, value: u8) {
        if value & OCCURRED != 0 {
            self.mask |= value & SOURCES;
        } else {
            self.mask &= !(value & SOURCES);
        }
        self.schedule();
    }

    fn schedule(&mut self) {
        if !self.asserted && self.data & self.mask != 0 {
            self.pending = true;
        }
    }

    /// Top of a chip cycle: promote last cycle's pending interrupt.
    pub fn begin_cycle(&mut self) {
        if self.pending {
            self.pending = false;
            self.asserted = true;
        }
    }

    /// Read with side effects: returns the register, then clears the
    /// condition bits, the pending slot and the output.
    pub fn acknowledge(&mut self) -> u8 {
        let value = self.peek();
        if value != 0 {
            log::debug!("CIA ICR acknowledged: {value:#04X}");
        }
        self.data = 0;
        self.pending = false;
        self.asserted = false;
        value
    }

    /// Register value without side effects.
    #[must_use]
    pub fn peek(&self) -> u8 {
        self.data | if self.asserted { OCCURRED } else { 0 }
    }

    #[must_use]
    pub fn irq(&self) -> bool {
        self.asserted
    }

    #[must_use]
    pub fn data(&self) -> u8 {
        self.data
    }

    #[must_use]
    pub fn mask(&self) -> u8 {
        self.mask
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending
    }
}
