//! C64 memory: 64K RAM and 1K colour RAM.
//!
//! ROM and character-ROM banking through the 6510 port is left to
//! whoever loads images into RAM; the CPU sees RAM everywhere outside the
//! I/O window.

/// 64K RAM plus the 4-bit colour RAM at $D800-$DBFF.
pub struct C64Memory {
    ram: Box<[u8; 0x10000]>,
    /// Colour RAM, one nybble per cell.
    colour_ram: [u8; 1024],
}

impl C64Memory {
    #[must_use]
    pub fn new() -> Self {
        Self {
            ram: Box::new([0; 0x10000]),
            colour_ram: [0; 1024],
        }
    }

    #[must_use]
    pub fn ram_read(&self, addr: u16) -> u8 {
        self.ram[usize::from(addr)]
    }

    pub fn ram_write(&mut self, addr: u16, value: u8) {
        self.ram[usize::from(addr)] = value;
    }

    /// Copy `data` into RAM at `addr`, wrapping at the top of memory.
    pub fn load(&mut self, addr: u16, data: &[u8]) {
        for (i, &byte) in data.iter().enumerate() {
            self.ram_write(addr.wrapping_add(i as u16), byte);
        }
    }

    /// Colour RAM cell; the upper nybble floats high.
    #[must_use]
    pub fn colour_ram_read(&self, offset: u16) -> u8 {
        (self.colour_ram[usize::from(offset & 0x03FF)] & 0x0F) | 0xF0
    }

    pub fn colour_ram_write(&mut self, offset: u16, value: u8) {
        self.colour_ram[usize::from(offset & 0x03FF)] = value & 0x0F;
    }
}

impl Default for C64Memory {
    fn default() -> Self {
        Self::new()
    }
}
