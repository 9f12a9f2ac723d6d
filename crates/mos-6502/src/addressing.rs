//! Effective-address resolution.
//!
//! Each mode issues exactly the bus cycles the silicon does, dummy reads
//! included. Indexed reads only pay the fix-up read on a page cross;
//! stores and read-modify-write always pay it.

use emu_core::Bus;

use crate::Mos6502;
use crate::opcodes::{Access, AddressingMode};

/// A resolved operand address.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Target {
    pub address: u16,
    /// Indexing carried into the high byte.
    pub crossed: bool,
    /// High byte of the un-indexed base address (used by SHA/SHX/SHY/TAS).
    pub base_high: u8,
}

impl Target {
    fn direct(address: u16) -> Self {
        Self {
            address,
            crossed: false,
            base_high: (address >> 8) as u8,
        }
    }
}

impl Mos6502 {
    /// Fetch the byte at PC and advance PC.
    pub(crate) fn fetch<B: Bus>(&mut self, bus: &mut B) -> u8 {
        let value = self.read(bus, self.regs.pc);
        self.regs.pc = self.regs.pc.wrapping_add(1);
        value
    }

    pub(crate) fn fetch_word<B: Bus>(&mut self, bus: &mut B) -> u16 {
        let lo = self.fetch(bus);
        let hi = self.fetch(bus);
        u16::from_le_bytes([lo, hi])
    }

    /// Read a pointer from zero page; the high byte wraps within page zero.
    fn read_zp_pointer<B: Bus>(&mut self, bus: &mut B, pointer: u8) -> u16 {
        let lo = self.read(bus, u16::from(pointer));
        let hi = self.read(bus, u16::from(pointer.wrapping_add(1)));
        u16::from_le_bytes([lo, hi])
    }

    /// Resolve the operand address for every mode that has one.
    pub(crate) fn resolve<B: Bus>(
        &mut self,
        bus: &mut B,
        mode: AddressingMode,
        access: Access,
    ) -> Target {
        match mode {
            AddressingMode::ZeroPage => {
                let address = u16::from(self.fetch(bus));
                Target::direct(address)
            }
            AddressingMode::ZeroPageX | AddressingMode::ZeroPageY => {
                let base = self.fetch(bus);
                let _ = self.read(bus, u16::from(base));
                let index = if mode == AddressingMode::ZeroPageX {
                    self.regs.x
                } else {
                    self.regs.y
                };
                Target::direct(u16::from(base.wrapping_add(index)))
            }
            AddressingMode::Absolute => {
                let address = self.fetch_word(bus);
                Target::direct(address)
            }
            AddressingMode::AbsoluteX => {
                let base = self.fetch_word(bus);
                self.indexed(bus, base, self.regs.x, access)
            }
            AddressingMode::AbsoluteY => {
                let base = self.fetch_word(bus);
                self.indexed(bus, base, self.regs.y, access)
            }
            AddressingMode::IndirectX => {
                let pointer = self.fetch(bus);
                let _ = self.read(bus, u16::from(pointer));
                let address = self.read_zp_pointer(bus, pointer.wrapping_add(self.regs.x));
                Target::direct(address)
            }
            AddressingMode::IndirectY => {
                let pointer = self.fetch(bus);
                let base = self.read_zp_pointer(bus, pointer);
                self.indexed(bus, base, self.regs.y, access)
            }
            AddressingMode::Implied
            | AddressingMode::Accumulator
            | AddressingMode::Immediate
            | AddressingMode::Indirect
            | AddressingMode::Relative => {
                self.undecodable(format_args!("{mode:?} addressing"));
                Target::direct(self.regs.pc)
            }
        }
    }

    /// Add an index to a 16-bit base. The first read goes to the address
    /// with the un-carried high byte.
    fn indexed<B: Bus>(&mut self, bus: &mut B, base: u16, index: u8, access: Access) -> Target {
        let address = base.wrapping_add(u16::from(index));
        let crossed = (base ^ address) & 0xFF00 != 0;
        if crossed || access != Access::Read {
            let partial = (base & 0xFF00) | (address & 0x00FF);
            let _ = self.read(bus, partial);
        }
        Target {
            address,
            crossed,
            base_high: (base >> 8) as u8,
        }
    }

    /// Read the operand for a read-class instruction.
    pub(crate) fn read_operand<B: Bus>(&mut self, bus: &mut B, mode: AddressingMode) -> u8 {
        if mode == AddressingMode::Immediate {
            return self.fetch(bus);
        }
        let target = self.resolve(bus, mode, Access::Read);
        self.read(bus, target.address)
    }

    /// Push a byte onto the stack.
    pub(crate) fn push<B: Bus>(&mut self, bus: &mut B, value: u8) {
        let addr = self.regs.push();
        self.write(bus, addr, value);
    }

    /// Pull a byte from the stack.
    pub(crate) fn pull<B: Bus>(&mut self, bus: &mut B) -> u8 {
        let addr = self.regs.pop();
        self.read(bus, addr)
    }

    pub(crate) fn push_pc<B: Bus>(&mut self, bus: &mut B) {
        let [lo, hi] = self.regs.pc.to_le_bytes();
        self.push(bus, hi);
        self.push(bus, lo);
    }

    pub(crate) fn read_vector<B: Bus>(&mut self, bus: &mut B, vector: u16) -> u16 {
        let lo = self.read(bus, vector);
        let hi = self.read(bus, vector.wrapping_add(1));
        u16::from_le_bytes([lo, hi])
    }
}
