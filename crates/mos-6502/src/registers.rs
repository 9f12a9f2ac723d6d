//! 6502 CPU registers.

use crate::Status;
use crate::flags::{I, U};

/// 6502 register file.
///
/// - A: accumulator
/// - X, Y: index registers
/// - S: stack pointer into page 1 ($0100-$01FF), wraps within the page
/// - PC: program counter
/// - P: processor status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Registers {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub s: u8,
    pub pc: u16,
    pub p: Status,
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

impl Registers {
    /// Power-on register file.
    ///
    /// S starts at zero; the three dummy stack cycles of the reset sequence
    /// bring it to $FD. I is set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            a: 0,
            x: 0,
            y: 0,
            s: 0x00,
            pc: 0,
            p: Status(U | I),
        }
    }

    /// Address for the next push; post-decrements S.
    pub fn push(&mut self) -> u16 {
        let addr = self.stack_addr();
        self.s = self.s.wrapping_sub(1);
        addr
    }

    /// Pre-increments S; returns the address to pull from.
    pub fn pop(&mut self) -> u16 {
        self.s = self.s.wrapping_add(1);
        self.stack_addr()
    }

    /// Current stack address without moving S.
    #[must_use]
    pub const fn stack_addr(&self) -> u16 {
        0x0100 | (self.s as u16)
    }
}
