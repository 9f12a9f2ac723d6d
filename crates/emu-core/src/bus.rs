//! Memory and I/O bus interface.

/// Interrupt request lines as seen by the processor.
///
/// Both are levels. Edge detection for NMI is the processor's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InterruptLines {
    /// Maskable interrupt request (active).
    pub irq: bool,
    /// Non-maskable interrupt request (active).
    pub nmi: bool,
}

/// Memory and I/O bus interface.
///
/// Components access memory and peripherals through this trait. The bus
/// handles address decoding and routing to the appropriate device.
///
/// Accesses are not idempotent: reading a chip register may clear it, and
/// on a clocked bus each access advances the system by one cycle.
pub trait Bus {
    /// Read a byte from the given address.
    fn read(&mut self, address: u16) -> u8;

    /// Write a byte to the given address.
    fn write(&mut self, address: u16, value: u8);

    /// Interrupt line levels after the most recent access.
    fn interrupt_lines(&self) -> InterruptLines {
        InterruptLines::default()
    }
}

/// Flat 64K RAM bus for tests and conformance runners.
///
/// No I/O, no mirroring. Counts every access so cycle totals can be checked
/// against real bus traffic.
pub struct SimpleBus {
    memory: Box<[u8; 0x10000]>,
    accesses: u64,
    /// IRQ line level presented to the processor.
    pub irq: bool,
    /// NMI line level presented to the processor.
    pub nmi: bool,
}

impl Default for SimpleBus {
    fn default() -> Self {
        Self::new()
    }
}

impl SimpleBus {
    #[must_use]
    pub fn new() -> Self {
        Self {
            memory: Box::new([0; 0x10000]),
            accesses: 0,
            irq: false,
            nmi: false,
        }
    }

    /// Copy `data` into memory starting at `address`, wrapping at $FFFF.
    pub fn load(&mut self, address: u16, data: &[u8]) {
        let mut addr = address;
        for &byte in data {
            self.memory[usize::from(addr)] = byte;
            addr = addr.wrapping_add(1);
        }
    }

    /// Read memory without counting an access.
    #[must_use]
    pub fn peek(&self, address: u16) -> u8 {
        self.memory[usize::from(address)]
    }

    /// Write memory without counting an access.
    pub fn poke(&mut self, address: u16, value: u8) {
        self.memory[usize::from(address)] = value;
    }

    /// Number of reads and writes performed through the `Bus` trait.
    #[must_use]
    pub fn accesses(&self) -> u64 {
        self.accesses
    }
}

impl Bus for SimpleBus {
    fn read(&mut self, address: u16) -> u8 {
        self.accesses += 1;
        self.memory[usize::from(address)]
    }

    fn write(&mut self, address: u16, value: u8) {
        self.accesses += 1;
        self.memory[usize::from(address)] = value;
    }

    fn interrupt_lines(&self) -> InterruptLines {
        InterruptLines {
            irq: self.irq,
            nmi: self.nmi,
        }
    }
}
