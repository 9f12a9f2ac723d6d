//! Cycle-exact NMOS 6502/6510 CPU core.
//!
//! The 6502 performs one bus access per cycle, and so does this core:
//! `step()` executes a whole instruction and returns how many accesses it
//! made, dummy reads and the read-modify-write double store included.
//! Nothing is looked up from a cycle table at run time.
//!
//! All 256 opcodes are emulated. The documented set, the stable
//! undocumented combinations, the combined immediate operations and the
//! unstable stores all run; the twelve JAM opcodes lock the core up until
//! reset.

mod addressing;
pub mod alu;
mod cpu;
pub mod flags;
pub mod opcodes;
mod registers;

pub use cpu::{Interrupt, Mos6502, RunState};
pub use flags::Status;
pub use opcodes::{AddressingMode, Kind, Mnemonic, OPCODES, Opcode};
pub use registers::Registers;
