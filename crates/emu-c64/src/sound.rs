//! Sound chip contract and a silent stand-in.

/// Interface for the chip at $D400-$D7FF.
pub trait SoundChip {
    /// Advance by `cycles` system cycles.
    fn clock(&mut self, cycles: u32);

    fn read(&mut self, reg: u8) -> u8;

    fn write(&mut self, reg: u8, value: u8);
}

/// SID stand-in: accepts register writes, produces no audio.
///
/// Most SID registers are write-only; reads return 0.
#[derive(Debug, Clone)]
pub struct NullSound {
    regs: [u8; 0x20],
    cycles: u64,
}

impl NullSound {
    #[must_use]
    pub fn new() -> Self {
        Self {
            regs: [0; 0x20],
            cycles: 0,
        }
    }

    /// Last value written to `reg`.
    #[must_use]
    pub fn register(&self, reg: u8) -> u8 {
        self.regs[usize::from(reg & 0x1F)]
    }

    #[must_use]
    pub fn cycles(&self) -> u64 {
        self.cycles
    }
}

impl Default for NullSound {
    fn default() -> Self {
        Self::new()
    }
}

impl SoundChip for NullSound {
    fn clock(&mut self, cycles: u32) {
        self.cycles += u64::from(cycles);
    }

    fn read(&mut self, _reg: u8) -> u8 {
        0
    }

    fn write(&mut self, reg: u8, value: u8) {
        self.regs[usize::from(reg & 0x1F)] = value;
    }
}
