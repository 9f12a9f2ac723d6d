//! 6502 processor status register (P).
//!
//! ```text
//!   7   6   5   4   3   2   1   0
//!   N   V   -   B   D   I   Z   C
//! ```
//!
//! Bits 4 and 5 are not storage. Bit 5 always reads as 1; bit 4 only exists
//! in the copy pushed to the stack, where it tells BRK/PHP (set) apart from
//! IRQ/NMI (clear).

use std::fmt;

/// Carry.
pub const C: u8 = 0x01;
/// Zero.
pub const Z: u8 = 0x02;
/// Interrupt disable - when set, IRQ is ignored. NMI is not.
pub const I: u8 = 0x04;
/// Decimal mode for ADC/SBC (and ARR).
pub const D: u8 = 0x08;
/// Break - only meaningful in a pushed status byte.
pub const B: u8 = 0x10;
/// Unused - always 1.
pub const U: u8 = 0x20;
/// Overflow.
pub const V: u8 = 0x40;
/// Negative.
pub const N: u8 = 0x80;

/// Processor status register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Status(pub u8);

impl Default for Status {
    fn default() -> Self {
        Self::new()
    }
}

impl Status {
    /// Status with only the unused bit set.
    #[must_use]
    pub const fn new() -> Self {
        Self(U)
    }

    /// Status as loaded by PLP/RTI: unused forced on, break dropped.
    #[must_use]
    pub const fn from_byte(value: u8) -> Self {
        Self((value | U) & !B)
    }

    /// Byte pushed by BRK and PHP.
    #[must_use]
    pub const fn to_byte_brk(self) -> u8 {
        self.0 | U | B
    }

    /// Byte pushed by IRQ and NMI entry.
    #[must_use]
    pub const fn to_byte_irq(self) -> u8 {
        (self.0 | U) & !B
    }

    #[must_use]
    pub const fn is_set(self, flag: u8) -> bool {
        self.0 & flag != 0
    }

    /// Carry as an addend.
    #[must_use]
    pub const fn carry(self) -> u8 {
        self.0 & C
    }

    pub fn set(&mut self, flag: u8) {
        self.0 |= flag;
    }

    pub fn clear(&mut self, flag: u8) {
        self.0 &= !flag;
    }

    pub fn set_if(&mut self, flag: u8, condition: bool) {
        if condition {
            self.set(flag);
        } else {
            self.clear(flag);
        }
    }

    /// Update N and Z from a result.
    pub fn update_nz(&mut self, value: u8) {
        self.set_if(N, value & 0x80 != 0);
        self.set_if(Z, value == 0);
    }
}

impl fmt::Display for Status {
    /// `NV-BDIZC`, upper case for set, lower case for clear.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(u8, char); 8] = [
            (N, 'N'),
            (V, 'V'),
            (U, '-'),
            (B, 'B'),
            (D, 'D'),
            (I, 'I'),
            (Z, 'Z'),
            (C, 'C'),
        ];
        for (flag, name) in NAMES {
            let shown = if flag == U || self.is_set(flag) {
                name
            } else {
                name.to_ascii_lowercase()
            };
            write!(f, "{shown}")?;
        }
        Ok(())
    }
}
