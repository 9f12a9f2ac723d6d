//! CPU core trait.

use crate::Bus;

/// A CPU core.
///
/// CPUs execute instructions and access memory through a bus. The bus is
/// passed in, not owned, so it can be shared with other components (timer
/// chips, video chip). Each access the CPU makes is one bus cycle.
pub trait Cpu<B: Bus> {
    /// Execute one instruction (or one interrupt entry).
    ///
    /// Returns the number of bus cycles consumed.
    fn step(&mut self, bus: &mut B) -> u32;

    /// Run the reset sequence and load the program counter from the reset
    /// vector.
    fn reset(&mut self, bus: &mut B);

    /// Assert the maskable interrupt request.
    fn interrupt(&mut self);

    /// Request a non-maskable interrupt.
    fn nmi(&mut self);

    /// Returns the current program counter.
    fn pc(&self) -> u16;

    /// Returns true if the CPU has locked up and only reset can revive it.
    fn is_halted(&self) -> bool;
}
