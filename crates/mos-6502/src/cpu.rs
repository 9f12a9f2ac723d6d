//! 6502 CPU implementation.
//!
//! `step()` runs one instruction or one interrupt entry. Every bus access
//! goes through `read()`/`write()`, which count the cycle and sample the
//! interrupt lines the bus presents, so the cycle total of an instruction
//! is whatever the bus saw.

use emu_core::{Bus, Cpu, Observable, Value};

use crate::addressing::Target;
use crate::alu;
use crate::flags::{B, C, D, I, N, U, V, Z};
use crate::opcodes::{Access, AddressingMode, Mnemonic, Opcode, decode};
use crate::{Registers, Status};

const NMI_VECTOR: u16 = 0xFFFA;
const RESET_VECTOR: u16 = 0xFFFC;
const IRQ_VECTOR: u16 = 0xFFFE;

/// Interrupt source being serviced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
    Irq,
    Nmi,
}

/// Execution state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    /// Pushing state and fetching the vector for an interrupt. Only held
    /// inside `step()`: the entry always completes before it returns.
    EnteringInterrupt(Interrupt),
    /// Locked up by a JAM opcode. Only reset leaves this state.
    Halted,
}

/// The MOS 6502 CPU.
#[derive(Debug)]
pub struct Mos6502 {
    /// CPU registers.
    pub regs: Registers,

    state: RunState,

    /// NMI latched by a rising edge, serviced at the next boundary.
    nmi_pending: bool,

    /// NMI line level at the previous sample, for edge detection.
    nmi_line: bool,

    /// IRQ asserted by the host through `assert_irq()`.
    irq_asserted: bool,

    /// IRQ line level presented by the bus.
    irq_line: bool,

    /// I flag as it was before a CLI/SEI/PLP that just ran. The IRQ poll
    /// for the next boundary happened before the flag changed.
    irq_poll_i: Option<bool>,

    /// Total cycles executed.
    cycles: u64,
}

impl Default for Mos6502 {
    fn default() -> Self {
        Self::new()
    }
}

impl Mos6502 {
    /// Create a 6502 in power-on state. Call `reset()` before running.
    #[must_use]
    pub fn new() -> Self {
        Self {
            regs: Registers::new(),
            state: RunState::Running,
            nmi_pending: false,
            nmi_line: false,
            irq_asserted: false,
            irq_line: false,
            irq_poll_i: None,
            cycles: 0,
        }
    }

    // ========================================================================
    // Bus access
    // ========================================================================

    pub(crate) fn read<B: Bus>(&mut self, bus: &mut B, address: u16) -> u8 {
        let value = bus.read(address);
        self.end_cycle(bus);
        value
    }

    pub(crate) fn write<B: Bus>(&mut self, bus: &mut B, address: u16, value: u8) {
        bus.write(address, value);
        self.end_cycle(bus);
    }

    fn end_cycle<B: Bus>(&mut self, bus: &B) {
        self.cycles += 1;
        let lines = bus.interrupt_lines();
        self.set_nmi_line(lines.nmi);
        self.irq_line = lines.irq;
    }

    // ========================================================================
    // Public contract
    // ========================================================================

    /// Run the 7-cycle reset sequence and jump through $FFFC.
    ///
    /// Two reads at PC, three stack reads that move S down by three without
    /// writing, then the vector. I is set; pending interrupts are dropped.
    pub fn reset<B: Bus>(&mut self, bus: &mut B) {
        self.state = RunState::Running;
        self.nmi_pending = false;
        self.irq_asserted = false;
        self.irq_poll_i = None;

        let _ = self.read(bus, self.regs.pc);
        let _ = self.read(bus, self.regs.pc);
        for _ in 0..3 {
            let _ = self.read(bus, self.regs.stack_addr());
            self.regs.s = self.regs.s.wrapping_sub(1);
        }
        self.regs.p.set(I);
        self.regs.pc = self.read_vector(bus, RESET_VECTOR);
        // The sequence never latches an NMI edge of its own.
        self.nmi_pending = false;
        log::debug!("6502 reset, PC=${:04X}", self.regs.pc);
    }

    /// Reset straight to `address` without touching the bus.
    ///
    /// For test runners that load a program and start it directly.
    pub fn reset_at(&mut self, address: u16) {
        self.regs.pc = address;
        self.regs.s = 0xFD;
        self.regs.p = Status(U | I);
        self.state = RunState::Running;
        self.nmi_pending = false;
        self.irq_asserted = false;
        self.irq_poll_i = None;
    }

    /// Execute one instruction, or enter a pending interrupt.
    ///
    /// Returns the number of bus cycles consumed. A halted CPU burns one
    /// cycle per call.
    pub fn step<B: Bus>(&mut self, bus: &mut B) -> u32 {
        let start = self.cycles;

        if self.state == RunState::Halted {
            let _ = self.read(bus, 0xFFFF);
        } else {
            let i_flag = self
                .irq_poll_i
                .take()
                .unwrap_or(self.regs.p.is_set(I));

            if self.nmi_pending {
                self.nmi_pending = false;
                self.enter_interrupt(bus, Interrupt::Nmi);
            } else if self.irq_requested() && !i_flag {
                self.enter_interrupt(bus, Interrupt::Irq);
            } else {
                let pc = self.regs.pc;
                let opcode = self.fetch(bus);
                let op = decode(opcode);
                log::trace!("{pc:04X}  {opcode:02X}  {}  {}", op.mnemonic, self.regs.p);
                self.execute(bus, op);
            }
        }

        (self.cycles - start) as u32
    }

    /// Latch an NMI request, as if the line had just fallen.
    pub fn assert_nmi(&mut self) {
        self.nmi_pending = true;
    }

    /// Present the NMI line level. A rising edge (inactive to active)
    /// latches a request; holding the line does nothing further.
    pub fn set_nmi_line(&mut self, active: bool) {
        if active && !self.nmi_line {
            self.nmi_pending = true;
        }
        self.nmi_line = active;
    }

    /// Hold the IRQ input active until `clear_irq()`.
    pub fn assert_irq(&mut self) {
        self.irq_asserted = true;
    }

    pub fn clear_irq(&mut self) {
        self.irq_asserted = false;
    }

    /// Present the IRQ line level directly.
    pub fn set_irq_line(&mut self, active: bool) {
        self.irq_line = active;
    }

    fn irq_requested(&self) -> bool {
        self.irq_asserted || self.irq_line
    }

    #[must_use]
    pub fn nmi_pending(&self) -> bool {
        self.nmi_pending
    }

    #[must_use]
    pub fn state(&self) -> RunState {
        self.state
    }

    #[must_use]
    pub fn is_halted(&self) -> bool {
        self.state == RunState::Halted
    }

    /// Total cycles executed since construction.
    #[must_use]
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    #[must_use]
    pub fn pc(&self) -> u16 {
        self.regs.pc
    }

    #[must_use]
    pub fn a(&self) -> u8 {
        self.regs.a
    }

    #[must_use]
    pub fn x(&self) -> u8 {
        self.regs.x
    }

    #[must_use]
    pub fn y(&self) -> u8 {
        self.regs.y
    }

    #[must_use]
    pub fn sp(&self) -> u8 {
        self.regs.s
    }

    /// Status byte as it would be pushed by an interrupt (bit 5 set, B clear).
    #[must_use]
    pub fn status(&self) -> u8 {
        self.regs.p.to_byte_irq()
    }

    pub fn set_pc(&mut self, value: u16) {
        self.regs.pc = value;
    }

    pub fn set_a(&mut self, value: u8) {
        self.regs.a = value;
    }

    pub fn set_x(&mut self, value: u8) {
        self.regs.x = value;
    }

    pub fn set_y(&mut self, value: u8) {
        self.regs.y = value;
    }

    pub fn set_sp(&mut self, value: u8) {
        self.regs.s = value;
    }

    /// Load the status byte; bit 5 is forced on and B dropped.
    pub fn set_status(&mut self, value: u8) {
        self.regs.p = Status::from_byte(value);
    }

    #[must_use]
    pub fn carry(&self) -> bool {
        self.regs.p.is_set(C)
    }

    #[must_use]
    pub fn zero(&self) -> bool {
        self.regs.p.is_set(Z)
    }

    #[must_use]
    pub fn interrupt_disable(&self) -> bool {
        self.regs.p.is_set(I)
    }

    #[must_use]
    pub fn decimal(&self) -> bool {
        self.regs.p.is_set(D)
    }

    #[must_use]
    pub fn overflow(&self) -> bool {
        self.regs.p.is_set(V)
    }

    #[must_use]
    pub fn negative(&self) -> bool {
        self.regs.p.is_set(N)
    }

    // ========================================================================
    // Interrupt sequencing
    // ========================================================================

    /// IRQ/NMI entry: 7 cycles, same shape as BRK but the first two cycles
    /// re-read PC instead of fetching and the pushed status has B clear.
    fn enter_interrupt<B: Bus>(&mut self, bus: &mut B, kind: Interrupt) {
        self.state = RunState::EnteringInterrupt(kind);
        let _ = self.read(bus, self.regs.pc);
        let _ = self.read(bus, self.regs.pc);
        self.push_pc(bus);
        self.push(bus, self.regs.p.to_byte_irq());
        self.regs.p.set(I);
        let vector = match kind {
            Interrupt::Nmi => NMI_VECTOR,
            Interrupt::Irq => IRQ_VECTOR,
        };
        let from = self.regs.pc;
        self.regs.pc = self.read_vector(bus, vector);
        self.state = RunState::Running;
        log::debug!(
            "{kind:?} taken at ${from:04X}, vector ${vector:04X} -> ${:04X}",
            self.regs.pc
        );
    }

    // ========================================================================
    // Instruction dispatch
    // ========================================================================

    fn execute<B: Bus>(&mut self, bus: &mut B, op: &Opcode) {
        match op.mnemonic {
            Mnemonic::Brk => self.op_brk(bus),
            Mnemonic::Jsr => self.op_jsr(bus),
            Mnemonic::Rts => self.op_rts(bus),
            Mnemonic::Rti => self.op_rti(bus),
            Mnemonic::Jmp => self.op_jmp(bus, op.mode),
            Mnemonic::Pha => {
                let _ = self.read(bus, self.regs.pc);
                self.push(bus, self.regs.a);
            }
            Mnemonic::Php => {
                let _ = self.read(bus, self.regs.pc);
                self.push(bus, self.regs.p.to_byte_brk());
            }
            Mnemonic::Pla => {
                let _ = self.read(bus, self.regs.pc);
                let _ = self.read(bus, self.regs.stack_addr());
                self.regs.a = self.pull(bus);
                self.regs.p.update_nz(self.regs.a);
            }
            Mnemonic::Plp => {
                let _ = self.read(bus, self.regs.pc);
                let _ = self.read(bus, self.regs.stack_addr());
                let before = self.regs.p.is_set(I);
                self.regs.p = Status::from_byte(self.pull(bus));
                self.irq_poll_i = Some(before);
            }
            Mnemonic::Bpl => self.op_branch(bus, !self.regs.p.is_set(N)),
            Mnemonic::Bmi => self.op_branch(bus, self.regs.p.is_set(N)),
            Mnemonic::Bvc => self.op_branch(bus, !self.regs.p.is_set(V)),
            Mnemonic::Bvs => self.op_branch(bus, self.regs.p.is_set(V)),
            Mnemonic::Bcc => self.op_branch(bus, !self.regs.p.is_set(C)),
            Mnemonic::Bcs => self.op_branch(bus, self.regs.p.is_set(C)),
            Mnemonic::Bne => self.op_branch(bus, !self.regs.p.is_set(Z)),
            Mnemonic::Beq => self.op_branch(bus, self.regs.p.is_set(Z)),
            Mnemonic::Jam => self.op_jam(bus),
            _ => match op.mode {
                AddressingMode::Implied => {
                    let _ = self.read(bus, self.regs.pc);
                    self.implied(op.mnemonic);
                }
                AddressingMode::Accumulator => {
                    let _ = self.read(bus, self.regs.pc);
                    self.regs.a = self.modify(op.mnemonic, self.regs.a);
                }
                mode => match op.mnemonic.access() {
                    Access::Read => {
                        let value = self.read_operand(bus, mode);
                        self.apply(op.mnemonic, value);
                    }
                    Access::Write => self.store(bus, op.mnemonic, mode),
                    Access::Modify => self.read_modify_write(bus, op.mnemonic, mode),
                },
            },
        }
    }

    /// Single-byte instructions; the dummy read has already happened.
    fn implied(&mut self, mnemonic: Mnemonic) {
        let regs = &mut self.regs;
        match mnemonic {
            Mnemonic::Clc => regs.p.clear(C),
            Mnemonic::Sec => regs.p.set(C),
            Mnemonic::Cld => regs.p.clear(D),
            Mnemonic::Sed => regs.p.set(D),
            Mnemonic::Clv => regs.p.clear(V),
            Mnemonic::Cli | Mnemonic::Sei => {
                self.irq_poll_i = Some(regs.p.is_set(I));
                regs.p.set_if(I, mnemonic == Mnemonic::Sei);
            }
            Mnemonic::Tax => {
                regs.x = regs.a;
                regs.p.update_nz(regs.x);
            }
            Mnemonic::Tay => {
                regs.y = regs.a;
                regs.p.update_nz(regs.y);
            }
            Mnemonic::Txa => {
                regs.a = regs.x;
                regs.p.update_nz(regs.a);
            }
            Mnemonic::Tya => {
                regs.a = regs.y;
                regs.p.update_nz(regs.a);
            }
            Mnemonic::Tsx => {
                regs.x = regs.s;
                regs.p.update_nz(regs.x);
            }
            // TXS is the one transfer that leaves the flags alone
            Mnemonic::Txs => regs.s = regs.x,
            Mnemonic::Inx => {
                regs.x = regs.x.wrapping_add(1);
                regs.p.update_nz(regs.x);
            }
            Mnemonic::Iny => {
                regs.y = regs.y.wrapping_add(1);
                regs.p.update_nz(regs.y);
            }
            Mnemonic::Dex => {
                regs.x = regs.x.wrapping_sub(1);
                regs.p.update_nz(regs.x);
            }
            Mnemonic::Dey => {
                regs.y = regs.y.wrapping_sub(1);
                regs.p.update_nz(regs.y);
            }
            Mnemonic::Nop => {}
            other => self.undecodable(format_args!("{other} as implied")),
        }
    }

    /// Read-class instructions.
    fn apply(&mut self, mnemonic: Mnemonic, value: u8) {
        let regs = &mut self.regs;
        match mnemonic {
            Mnemonic::Lda => {
                regs.a = value;
                regs.p.update_nz(value);
            }
            Mnemonic::Ldx => {
                regs.x = value;
                regs.p.update_nz(value);
            }
            Mnemonic::Ldy => {
                regs.y = value;
                regs.p.update_nz(value);
            }
            Mnemonic::Lax => {
                regs.a = value;
                regs.x = value;
                regs.p.update_nz(value);
            }
            Mnemonic::Las => {
                let result = value & regs.s;
                regs.a = result;
                regs.x = result;
                regs.s = result;
                regs.p.update_nz(result);
            }
            Mnemonic::Ora => {
                regs.a |= value;
                regs.p.update_nz(regs.a);
            }
            Mnemonic::And => {
                regs.a &= value;
                regs.p.update_nz(regs.a);
            }
            Mnemonic::Eor => {
                regs.a ^= value;
                regs.p.update_nz(regs.a);
            }
            Mnemonic::Adc => regs.a = alu::adc(regs.a, value, &mut regs.p),
            Mnemonic::Sbc => regs.a = alu::sbc(regs.a, value, &mut regs.p),
            Mnemonic::Cmp => alu::compare(regs.a, value, &mut regs.p),
            Mnemonic::Cpx => alu::compare(regs.x, value, &mut regs.p),
            Mnemonic::Cpy => alu::compare(regs.y, value, &mut regs.p),
            Mnemonic::Bit => alu::bit(regs.a, value, &mut regs.p),
            Mnemonic::Anc => {
                regs.a &= value;
                regs.p.update_nz(regs.a);
                regs.p.set_if(C, regs.a & 0x80 != 0);
            }
            Mnemonic::Alr => regs.a = alu::lsr(regs.a & value, &mut regs.p),
            Mnemonic::Arr => regs.a = alu::arr(regs.a, value, &mut regs.p),
            Mnemonic::Sbx => regs.x = alu::sbx(regs.a, regs.x, value, &mut regs.p),
            Mnemonic::Ane => regs.a = alu::ane(regs.a, regs.x, value, &mut regs.p),
            Mnemonic::Lxa => {
                regs.a = alu::lxa(regs.a, value, &mut regs.p);
                regs.x = regs.a;
            }
            Mnemonic::Nop => {}
            other => self.undecodable(format_args!("{other} as a read")),
        }
    }

    /// Shift/rotate/inc/dec and their undocumented combinations. Returns the
    /// value written back; combinations also update A.
    fn modify(&mut self, mnemonic: Mnemonic, value: u8) -> u8 {
        let regs = &mut self.regs;
        match mnemonic {
            Mnemonic::Asl => alu::asl(value, &mut regs.p),
            Mnemonic::Lsr => alu::lsr(value, &mut regs.p),
            Mnemonic::Rol => alu::rol(value, &mut regs.p),
            Mnemonic::Ror => alu::ror(value, &mut regs.p),
            Mnemonic::Inc => {
                let result = value.wrapping_add(1);
                regs.p.update_nz(result);
                result
            }
            Mnemonic::Dec => {
                let result = value.wrapping_sub(1);
                regs.p.update_nz(result);
                result
            }
            Mnemonic::Slo => {
                let result = alu::asl(value, &mut regs.p);
                regs.a |= result;
                regs.p.update_nz(regs.a);
                result
            }
            Mnemonic::Rla => {
                let result = alu::rol(value, &mut regs.p);
                regs.a &= result;
                regs.p.update_nz(regs.a);
                result
            }
            Mnemonic::Sre => {
                let result = alu::lsr(value, &mut regs.p);
                regs.a ^= result;
                regs.p.update_nz(regs.a);
                result
            }
            Mnemonic::Rra => {
                let result = alu::ror(value, &mut regs.p);
                regs.a = alu::adc(regs.a, result, &mut regs.p);
                result
            }
            Mnemonic::Dcp => {
                let result = value.wrapping_sub(1);
                alu::compare(regs.a, result, &mut regs.p);
                result
            }
            Mnemonic::Isc => {
                let result = value.wrapping_add(1);
                regs.a = alu::sbc(regs.a, result, &mut regs.p);
                result
            }
            other => {
                self.undecodable(format_args!("{other} as read-modify-write"));
                value
            }
        }
    }

    fn store<B: Bus>(&mut self, bus: &mut B, mnemonic: Mnemonic, mode: AddressingMode) {
        let target = self.resolve(bus, mode, Access::Write);
        let regs = &mut self.regs;
        let (address, value) = match mnemonic {
            Mnemonic::Sta => (target.address, regs.a),
            Mnemonic::Stx => (target.address, regs.x),
            Mnemonic::Sty => (target.address, regs.y),
            Mnemonic::Sax => (target.address, regs.a & regs.x),
            Mnemonic::Sha => unstable_store(target, regs.a & regs.x),
            Mnemonic::Shx => unstable_store(target, regs.x),
            Mnemonic::Shy => unstable_store(target, regs.y),
            Mnemonic::Tas => {
                regs.s = regs.a & regs.x;
                unstable_store(target, regs.s)
            }
            other => {
                self.undecodable(format_args!("{other} as a store"));
                return;
            }
        };
        self.write(bus, address, value);
    }

    /// NMOS read-modify-write writes the unmodified value back before the
    /// result. Chip registers see both writes.
    fn read_modify_write<B: Bus>(
        &mut self,
        bus: &mut B,
        mnemonic: Mnemonic,
        mode: AddressingMode,
    ) {
        let target = self.resolve(bus, mode, Access::Modify);
        let value = self.read(bus, target.address);
        self.write(bus, target.address, value);
        let result = self.modify(mnemonic, value);
        self.write(bus, target.address, result);
    }

    // ========================================================================
    // Control flow
    // ========================================================================

    fn op_brk<B: Bus>(&mut self, bus: &mut B) {
        // Padding byte: read and skipped, so the pushed PC is BRK + 2
        let _ = self.fetch(bus);
        self.push_pc(bus);
        self.push(bus, self.regs.p.to_byte_brk());
        self.regs.p.set(I);
        self.regs.pc = self.read_vector(bus, IRQ_VECTOR);
    }

    fn op_jsr<B: Bus>(&mut self, bus: &mut B) {
        let lo = self.fetch(bus);
        let _ = self.read(bus, self.regs.stack_addr());
        // PC points at the high operand byte: the pushed address is the
        // last byte of the JSR, and RTS adds one.
        self.push_pc(bus);
        let hi = self.read(bus, self.regs.pc);
        self.regs.pc = u16::from_le_bytes([lo, hi]);
    }

    fn op_rts<B: Bus>(&mut self, bus: &mut B) {
        let _ = self.read(bus, self.regs.pc);
        let _ = self.read(bus, self.regs.stack_addr());
        let lo = self.pull(bus);
        let hi = self.pull(bus);
        self.regs.pc = u16::from_le_bytes([lo, hi]);
        let _ = self.read(bus, self.regs.pc);
        self.regs.pc = self.regs.pc.wrapping_add(1);
    }

    fn op_rti<B: Bus>(&mut self, bus: &mut B) {
        let _ = self.read(bus, self.regs.pc);
        let _ = self.read(bus, self.regs.stack_addr());
        self.regs.p = Status::from_byte(self.pull(bus));
        let lo = self.pull(bus);
        let hi = self.pull(bus);
        self.regs.pc = u16::from_le_bytes([lo, hi]);
    }

    fn op_jmp<B: Bus>(&mut self, bus: &mut B, mode: AddressingMode) {
        let address = self.fetch_word(bus);
        if mode == AddressingMode::Indirect {
            // The high byte comes from the same page: JMP ($10FF) reads
            // $10FF and $1000.
            let lo = self.read(bus, address);
            let hi = self.read(bus, (address & 0xFF00) | (address.wrapping_add(1) & 0x00FF));
            self.regs.pc = u16::from_le_bytes([lo, hi]);
        } else {
            self.regs.pc = address;
        }
    }

    /// Relative branch: 2 cycles, +1 if taken, +1 more across a page.
    fn op_branch<B: Bus>(&mut self, bus: &mut B, taken: bool) {
        let offset = self.fetch(bus) as i8;
        if !taken {
            return;
        }
        let _ = self.read(bus, self.regs.pc);
        let target = self.regs.pc.wrapping_add_signed(i16::from(offset));
        if (target ^ self.regs.pc) & 0xFF00 != 0 {
            let _ = self.read(bus, (self.regs.pc & 0xFF00) | (target & 0x00FF));
        }
        self.regs.pc = target;
    }

    /// A descriptor the interpreter has no arm for. The table never pairs
    /// these; if it did, the core would lock up as on JAM.
    pub(crate) fn undecodable(&mut self, what: std::fmt::Arguments<'_>) {
        log::error!("6502 cannot execute {what} at ${:04X}", self.regs.pc);
        self.state = RunState::Halted;
    }

    fn op_jam<B: Bus>(&mut self, bus: &mut B) {
        let _ = self.read(bus, self.regs.pc);
        self.state = RunState::Halted;
        log::debug!("6502 jammed at ${:04X}", self.regs.pc.wrapping_sub(1));
    }
}

/// SHA/SHX/SHY/TAS store `value & (base high + 1)`. When indexing crossed a
/// page the same value also replaces the high byte of the address.
fn unstable_store(target: Target, value: u8) -> (u16, u8) {
    let stored = value & target.base_high.wrapping_add(1);
    let address = if target.crossed {
        (u16::from(stored) << 8) | (target.address & 0x00FF)
    } else {
        target.address
    };
    (address, stored)
}

impl<B: Bus> Cpu<B> for Mos6502 {
    fn step(&mut self, bus: &mut B) -> u32 {
        Mos6502::step(self, bus)
    }

    fn reset(&mut self, bus: &mut B) {
        Mos6502::reset(self, bus);
    }

    fn interrupt(&mut self) {
        self.assert_irq();
    }

    fn nmi(&mut self) {
        self.assert_nmi();
    }

    fn pc(&self) -> u16 {
        self.regs.pc
    }

    fn is_halted(&self) -> bool {
        self.state == RunState::Halted
    }
}

impl Observable for Mos6502 {
    fn query(&self, path: &str) -> Option<Value> {
        match path {
            "pc" => Some(self.regs.pc.into()),
            "a" => Some(self.regs.a.into()),
            "x" => Some(self.regs.x.into()),
            "y" => Some(self.regs.y.into()),
            "s" | "sp" => Some(self.regs.s.into()),
            "p" | "status" => Some(self.regs.p.0.into()),
            "flags.c" | "c" => Some(self.regs.p.is_set(C).into()),
            "flags.z" | "z" => Some(self.regs.p.is_set(Z).into()),
            "flags.i" | "i" => Some(self.regs.p.is_set(I).into()),
            "flags.d" | "d" => Some(self.regs.p.is_set(D).into()),
            "flags.b" => Some(self.regs.p.is_set(B).into()),
            "flags.v" | "v" => Some(self.regs.p.is_set(V).into()),
            "flags.n" | "n" => Some(self.regs.p.is_set(N).into()),
            "cycles" => Some(self.cycles.into()),
            "halted" => Some(self.is_halted().into()),
            "state" => Some(
                match self.state {
                    // Entry finishes within a step, so queries land after it
                    RunState::Running | RunState::EnteringInterrupt(_) => "running",
                    RunState::Halted => "halted",
                }
                .into(),
            ),
            "nmi_pending" => Some(self.nmi_pending.into()),
            "irq_line" => Some(self.irq_requested().into()),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "pc",
            "a",
            "x",
            "y",
            "s",
            "p",
            "flags.c",
            "flags.z",
            "flags.i",
            "flags.d",
            "flags.b",
            "flags.v",
            "flags.n",
            "cycles",
            "halted",
            "state",
            "nmi_pending",
            "irq_line",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emu_core::SimpleBus;

    fn cpu_with_program(program: &[u8]) -> (Mos6502, SimpleBus) {
        let mut bus = SimpleBus::new();
        bus.load(0x0200, program);
        let mut cpu = Mos6502::new();
        cpu.reset_at(0x0200);
        (cpu, bus)
    }

    #[test]
    fn test_lda_immediate() {
        let (mut cpu, mut bus) = cpu_with_program(&[0xA9, 0x42]);
        assert_eq!(cpu.step(&mut bus), 2);
        assert_eq!(cpu.regs.a, 0x42);
        assert_eq!(cpu.regs.pc, 0x0202);
        assert!(!cpu.zero());
        assert!(!cpu.negative());
    }

    #[test]
    fn test_sta_zeropage() {
        let (mut cpu, mut bus) = cpu_with_program(&[0x85, 0x10]);
        cpu.regs.a = 0x99;
        assert_eq!(cpu.step(&mut bus), 3);
        assert_eq!(bus.peek(0x0010), 0x99);
    }

    #[test]
    fn test_jmp_absolute() {
        let (mut cpu, mut bus) = cpu_with_program(&[0x4C, 0x00, 0x30]);
        assert_eq!(cpu.step(&mut bus), 3);
        assert_eq!(cpu.regs.pc, 0x3000);
    }

    #[test]
    fn cycle_count_matches_bus_traffic() {
        let (mut cpu, mut bus) = cpu_with_program(&[0xEE, 0x00, 0x10]); // INC $1000
        let cycles = cpu.step(&mut bus);
        assert_eq!(cycles, 6);
        assert_eq!(u64::from(cycles), bus.accesses());
        assert_eq!(cpu.cycles(), 6);
    }

    #[test]
    fn reset_reads_vector_and_moves_stack() {
        let mut bus = SimpleBus::new();
        bus.load(0xFFFC, &[0x00, 0xC0]);
        let mut cpu = Mos6502::new();
        cpu.reset(&mut bus);
        assert_eq!(cpu.regs.pc, 0xC000);
        assert_eq!(cpu.regs.s, 0xFD);
        assert!(cpu.interrupt_disable());
        assert_eq!(cpu.cycles(), 7);
    }

    #[test]
    fn unstable_store_address_corruption() {
        let target = Target {
            address: 0x1105,
            crossed: true,
            base_high: 0x10,
        };
        // $FF & $11 = $11, which also becomes the high address byte
        assert_eq!(unstable_store(target, 0xFF), (0x1105, 0x11));
        assert_eq!(unstable_store(target, 0x03), (0x0105, 0x01));
        let straight = Target {
            crossed: false,
            ..target
        };
        assert_eq!(unstable_store(straight, 0xFF), (0x1105, 0x11));
        assert_eq!(unstable_store(straight, 0x03), (0x1105, 0x01));
    }

    #[test]
    fn observable_paths() {
        let (cpu, _) = cpu_with_program(&[]);
        assert_eq!(cpu.query("pc"), Some(Value::U16(0x0200)));
        assert_eq!(cpu.query("flags.i"), Some(Value::Bool(true)));
        assert_eq!(cpu.query("state"), Some(Value::from("running")));
        assert_eq!(cpu.query("bogus"), None);
        for path in cpu.query_paths() {
            assert!(cpu.query(path).is_some(), "{path} should resolve");
        }
    }
}
