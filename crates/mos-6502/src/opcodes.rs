//! Opcode descriptor table.
//!
//! One entry per opcode byte, shared by the interpreter, the disassembly in
//! trace logs and the conformance runners. `cycles` is the documented base
//! count; the interpreter never reads it, it counts real bus accesses, and
//! the tests hold the two against each other.

use std::fmt;

/// Instruction mnemonic, documented and undocumented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mnemonic {
    Adc,
    And,
    Asl,
    Bcc,
    Bcs,
    Beq,
    Bit,
    Bmi,
    Bne,
    Bpl,
    Brk,
    Bvc,
    Bvs,
    Clc,
    Cld,
    Cli,
    Clv,
    Cmp,
    Cpx,
    Cpy,
    Dec,
    Dex,
    Dey,
    Eor,
    Inc,
    Inx,
    Iny,
    Jmp,
    Jsr,
    Lda,
    Ldx,
    Ldy,
    Lsr,
    Nop,
    Ora,
    Pha,
    Php,
    Pla,
    Plp,
    Rol,
    Ror,
    Rti,
    Rts,
    Sbc,
    Sec,
    Sed,
    Sei,
    Sta,
    Stx,
    Sty,
    Tax,
    Tay,
    Tsx,
    Txa,
    Txs,
    Tya,
    // Undocumented
    Alr,
    Anc,
    Ane,
    Arr,
    Dcp,
    Isc,
    Jam,
    Las,
    Lax,
    Lxa,
    Rla,
    Rra,
    Sax,
    Sbx,
    Sha,
    Shx,
    Shy,
    Slo,
    Sre,
    Tas,
}

/// How an instruction touches its operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Reads the operand; indexed modes pay a cycle only on page cross.
    Read,
    /// Stores; indexed modes always pay the dummy-read cycle.
    Write,
    /// Read, write back unchanged, write result.
    Modify,
}

impl Mnemonic {
    #[must_use]
    pub const fn access(self) -> Access {
        match self {
            Self::Sta
            | Self::Stx
            | Self::Sty
            | Self::Sax
            | Self::Sha
            | Self::Shx
            | Self::Shy
            | Self::Tas => Access::Write,
            Self::Asl
            | Self::Lsr
            | Self::Rol
            | Self::Ror
            | Self::Inc
            | Self::Dec
            | Self::Slo
            | Self::Rla
            | Self::Sre
            | Self::Rra
            | Self::Dcp
            | Self::Isc => Access::Modify,
            _ => Access::Read,
        }
    }

    /// Upper-case assembler name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Adc => "ADC",
            Self::And => "AND",
            Self::Asl => "ASL",
            Self::Bcc => "BCC",
            Self::Bcs => "BCS",
            Self::Beq => "BEQ",
            Self::Bit => "BIT",
            Self::Bmi => "BMI",
            Self::Bne => "BNE",
            Self::Bpl => "BPL",
            Self::Brk => "BRK",
            Self::Bvc => "BVC",
            Self::Bvs => "BVS",
            Self::Clc => "CLC",
            Self::Cld => "CLD",
            Self::Cli => "CLI",
            Self::Clv => "CLV",
            Self::Cmp => "CMP",
            Self::Cpx => "CPX",
            Self::Cpy => "CPY",
            Self::Dec => "DEC",
            Self::Dex => "DEX",
            Self::Dey => "DEY",
            Self::Eor => "EOR",
            Self::Inc => "INC",
            Self::Inx => "INX",
            Self::Iny => "INY",
            Self::Jmp => "JMP",
            Self::Jsr => "JSR",
            Self::Lda => "LDA",
            Self::Ldx => "LDX",
            Self::Ldy => "LDY",
            Self::Lsr => "LSR",
            Self::Nop => "NOP",
            Self::Ora => "ORA",
            Self::Pha => "PHA",
            Self::Php => "PHP",
            Self::Pla => "PLA",
            Self::Plp => "PLP",
            Self::Rol => "ROL",
            Self::Ror => "ROR",
            Self::Rti => "RTI",
            Self::Rts => "RTS",
            Self::Sbc => "SBC",
            Self::Sec => "SEC",
            Self::Sed => "SED",
            Self::Sei => "SEI",
            Self::Sta => "STA",
            Self::Stx => "STX",
            Self::Sty => "STY",
            Self::Tax => "TAX",
            Self::Tay => "TAY",
            Self::Tsx => "TSX",
            Self::Txa => "TXA",
            Self::Txs => "TXS",
            Self::Tya => "TYA",
            Self::Alr => "ALR",
            Self::Anc => "ANC",
            Self::Ane => "ANE",
            Self::Arr => "ARR",
            Self::Dcp => "DCP",
            Self::Isc => "ISC",
            Self::Jam => "JAM",
            Self::Las => "LAS",
            Self::Lax => "LAX",
            Self::Lxa => "LXA",
            Self::Rla => "RLA",
            Self::Rra => "RRA",
            Self::Sax => "SAX",
            Self::Sbx => "SBX",
            Self::Sha => "SHA",
            Self::Shx => "SHX",
            Self::Shy => "SHY",
            Self::Slo => "SLO",
            Self::Sre => "SRE",
            Self::Tas => "TAS",
        }
    }
}

impl fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Addressing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressingMode {
    Implied,
    Accumulator,
    Immediate,
    ZeroPage,
    ZeroPageX,
    ZeroPageY,
    Absolute,
    AbsoluteX,
    AbsoluteY,
    /// `JMP ($nnnn)`, with the page-wrap bug.
    Indirect,
    /// `($nn,X)`
    IndirectX,
    /// `($nn),Y`
    IndirectY,
    Relative,
}

impl AddressingMode {
    /// Operand bytes following the opcode.
    #[must_use]
    pub const fn operand_bytes(self) -> u8 {
        match self {
            Self::Implied | Self::Accumulator => 0,
            Self::Immediate
            | Self::ZeroPage
            | Self::ZeroPageX
            | Self::ZeroPageY
            | Self::IndirectX
            | Self::IndirectY
            | Self::Relative => 1,
            Self::Absolute | Self::AbsoluteX | Self::AbsoluteY | Self::Indirect => 2,
        }
    }
}

/// How trustworthy an opcode is on real silicon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// In the datasheet.
    Documented,
    /// Undocumented, but identical on every NMOS part.
    Stable,
    /// Undocumented immediate operations that combine two ALU steps with
    /// their own flag side effects (ANC, ALR, ARR, SBX).
    Combined,
    /// Result depends on analogue effects or the address bus (ANE, LXA,
    /// LAS and the "AND with high byte + 1" stores).
    Unstable,
    /// Locks up the processor.
    Halt,
}

/// Static description of one opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode {
    pub mnemonic: Mnemonic,
    pub mode: AddressingMode,
    /// Base cycle count, without page-cross or branch penalties.
    pub cycles: u8,
    pub kind: Kind,
}

impl Opcode {
    /// Instruction length in bytes.
    #[must_use]
    pub const fn len(&self) -> u8 {
        1 + self.mode.operand_bytes()
    }

    /// Whether an indexed read pays an extra cycle on page cross.
    #[must_use]
    pub const fn has_page_penalty(&self) -> bool {
        matches!(self.mnemonic.access(), Access::Read)
            && matches!(
                self.mode,
                AddressingMode::AbsoluteX | AddressingMode::AbsoluteY | AddressingMode::IndirectY
            )
    }
}

/// Look up the descriptor for an opcode byte.
#[must_use]
pub fn decode(opcode: u8) -> &'static Opcode {
    &OPCODES[usize::from(opcode)]
}

const fn op(mnemonic: Mnemonic, mode: AddressingMode, cycles: u8, kind: Kind) -> Opcode {
    Opcode {
        mnemonic,
        mode,
        cycles,
        kind,
    }
}

const fn jam() -> Opcode {
    op(Mnemonic::Jam, AddressingMode::Implied, 2, Kind::Halt)
}

pub use table::OPCODES;

#[allow(clippy::enum_glob_use)]
mod table {
    use super::AddressingMode::{
        Absolute, AbsoluteX, AbsoluteY, Accumulator, Immediate, Implied, Indirect, IndirectX,
        IndirectY, Relative, ZeroPage, ZeroPageX, ZeroPageY,
    };
    use super::Kind::{Combined, Documented, Stable, Unstable};
    use super::Mnemonic::*;
    use super::{Opcode, jam, op};

    /// Descriptor for every opcode byte.
    pub static OPCODES: [Opcode; 256] = [
        // 0x00
        op(Brk, Implied, 7, Documented),
        op(Ora, IndirectX, 6, Documented),
        jam(),
        op(Slo, IndirectX, 8, Stable),
        op(Nop, ZeroPage, 3, Stable),
        op(Ora, ZeroPage, 3, Documented),
        op(Asl, ZeroPage, 5, Documented),
        op(Slo, ZeroPage, 5, Stable),
        op(Php, Implied, 3, Documented),
        op(Ora, Immediate, 2, Documented),
        op(Asl, Accumulator, 2, Documented),
        op(Anc, Immediate, 2, Combined),
        op(Nop, Absolute, 4, Stable),
        op(Ora, Absolute, 4, Documented),
        op(Asl, Absolute, 6, Documented),
        op(Slo, Absolute, 6, Stable),
        // 0x10
        op(Bpl, Relative, 2, Documented),
        op(Ora, IndirectY, 5, Documented),
        jam(),
        op(Slo, IndirectY, 8, Stable),
        op(Nop, ZeroPageX, 4, Stable),
        op(Ora, ZeroPageX, 4, Documented),
        op(Asl, ZeroPageX, 6, Documented),
        op(Slo, ZeroPageX, 6, Stable),
        op(Clc, Implied, 2, Documented),
        op(Ora, AbsoluteY, 4, Documented),
        op(Nop, Implied, 2, Stable),
        op(Slo, AbsoluteY, 7, Stable),
        op(Nop, AbsoluteX, 4, Stable),
        op(Ora, AbsoluteX, 4, Documented),
        op(Asl, AbsoluteX, 7, Documented),
        op(Slo, AbsoluteX, 7, Stable),
        // 0x20
        op(Jsr, Absolute, 6, Documented),
        op(And, IndirectX, 6, Documented),
        jam(),
        op(Rla, IndirectX, 8, Stable),
        op(Bit, ZeroPage, 3, Documented),
        op(And, ZeroPage, 3, Documented),
        op(Rol, ZeroPage, 5, Documented),
        op(Rla, ZeroPage, 5, Stable),
        op(Plp, Implied, 4, Documented),
        op(And, Immediate, 2, Documented),
        op(Rol, Accumulator, 2, Documented),
        op(Anc, Immediate, 2, Combined),
        op(Bit, Absolute, 4, Documented),
        op(And, Absolute, 4, Documented),
        op(Rol, Absolute, 6, Documented),
        op(Rla, Absolute, 6, Stable),
        // 0x30
        op(Bmi, Relative, 2, Documented),
        op(And, IndirectY, 5, Documented),
        jam(),
        op(Rla, IndirectY, 8, Stable),
        op(Nop, ZeroPageX, 4, Stable),
        op(And, ZeroPageX, 4, Documented),
        op(Rol, ZeroPageX, 6, Documented),
        op(Rla, ZeroPageX, 6, Stable),
        op(Sec, Implied, 2, Documented),
        op(And, AbsoluteY, 4, Documented),
        op(Nop, Implied, 2, Stable),
        op(Rla, AbsoluteY, 7, Stable),
        op(Nop, AbsoluteX, 4, Stable),
        op(And, AbsoluteX, 4, Documented),
        op(Rol, AbsoluteX, 7, Documented),
        op(Rla, AbsoluteX, 7, Stable),
        // 0x40
        op(Rti, Implied, 6, Documented),
        op(Eor, IndirectX, 6, Documented),
        jam(),
        op(Sre, IndirectX, 8, Stable),
        op(Nop, ZeroPage, 3, Stable),
        op(Eor, ZeroPage, 3, Documented),
        op(Lsr, ZeroPage, 5, Documented),
        op(Sre, ZeroPage, 5, Stable),
        op(Pha, Implied, 3, Documented),
        op(Eor, Immediate, 2, Documented),
        op(Lsr, Accumulator, 2, Documented),
        op(Alr, Immediate, 2, Combined),
        op(Jmp, Absolute, 3, Documented),
        op(Eor, Absolute, 4, Documented),
        op(Lsr, Absolute, 6, Documented),
        op(Sre, Absolute, 6, Stable),
        // 0x50
        op(Bvc, Relative, 2, Documented),
        op(Eor, IndirectY, 5, Documented),
        jam(),
        op(Sre, IndirectY, 8, Stable),
        op(Nop, ZeroPageX, 4, Stable),
        op(Eor, ZeroPageX, 4, Documented),
        op(Lsr, ZeroPageX, 6, Documented),
        op(Sre, ZeroPageX, 6, Stable),
        op(Cli, Implied, 2, Documented),
        op(Eor, AbsoluteY, 4, Documented),
        op(Nop, Implied, 2, Stable),
        op(Sre, AbsoluteY, 7, Stable),
        op(Nop, AbsoluteX, 4, Stable),
        op(Eor, AbsoluteX, 4, Documented),
        op(Lsr, AbsoluteX, 7, Documented),
        op(Sre, AbsoluteX, 7, Stable),
        // 0x60
        op(Rts, Implied, 6, Documented),
        op(Adc, IndirectX, 6, Documented),
        jam(),
        op(Rra, IndirectX, 8, Stable),
        op(Nop, ZeroPage, 3, Stable),
        op(Adc, ZeroPage, 3, Documented),
        op(Ror, ZeroPage, 5, Documented),
        op(Rra, ZeroPage, 5, Stable),
        op(Pla, Implied, 4, Documented),
        op(Adc, Immediate, 2, Documented),
        op(Ror, Accumulator, 2, Documented),
        op(Arr, Immediate, 2, Combined),
        op(Jmp, Indirect, 5, Documented),
        op(Adc, Absolute, 4, Documented),
        op(Ror, Absolute, 6, Documented),
        op(Rra, Absolute, 6, Stable),
        // 0x70
        op(Bvs, Relative, 2, Documented),
        op(Adc, IndirectY, 5, Documented),
        jam(),
        op(Rra, IndirectY, 8, Stable),
        op(Nop, ZeroPageX, 4, Stable),
        op(Adc, ZeroPageX, 4, Documented),
        op(Ror, ZeroPageX, 6, Documented),
        op(Rra, ZeroPageX, 6, Stable),
        op(Sei, Implied, 2, Documented),
        op(Adc, AbsoluteY, 4, Documented),
        op(Nop, Implied, 2, Stable),
        op(Rra, AbsoluteY, 7, Stable),
        op(Nop, AbsoluteX, 4, Stable),
        op(Adc, AbsoluteX, 4, Documented),
        op(Ror, AbsoluteX, 7, Documented),
        op(Rra, AbsoluteX, 7, Stable),
        // 0x80
        op(Nop, Immediate, 2, Stable),
        op(Sta, IndirectX, 6, Documented),
        op(Nop, Immediate, 2, Stable),
        op(Sax, IndirectX, 6, Stable),
        op(Sty, ZeroPage, 3, Documented),
        op(Sta, ZeroPage, 3, Documented),
        op(Stx, ZeroPage, 3, Documented),
        op(Sax, ZeroPage, 3, Stable),
        op(Dey, Implied, 2, Documented),
        op(Nop, Immediate, 2, Stable),
        op(Txa, Implied, 2, Documented),
        op(Ane, Immediate, 2, Unstable),
        op(Sty, Absolute, 4, Documented),
        op(Sta, Absolute, 4, Documented),
        op(Stx, Absolute, 4, Documented),
        op(Sax, Absolute, 4, Stable),
        // 0x90
        op(Bcc, Relative, 2, Documented),
        op(Sta, IndirectY, 6, Documented),
        jam(),
        op(Sha, IndirectY, 6, Unstable),
        op(Sty, ZeroPageX, 4, Documented),
        op(Sta, ZeroPageX, 4, Documented),
        op(Stx, ZeroPageY, 4, Documented),
        op(Sax, ZeroPageY, 4, Stable),
        op(Tya, Implied, 2, Documented),
        op(Sta, AbsoluteY, 5, Documented),
        op(Txs, Implied, 2, Documented),
        op(Tas, AbsoluteY, 5, Unstable),
        op(Shy, AbsoluteX, 5, Unstable),
        op(Sta, AbsoluteX, 5, Documented),
        op(Shx, AbsoluteY, 5, Unstable),
        op(Sha, AbsoluteY, 5, Unstable),
        // 0xA0
        op(Ldy, Immediate, 2, Documented),
        op(Lda, IndirectX, 6, Documented),
        op(Ldx, Immediate, 2, Documented),
        op(Lax, IndirectX, 6, Stable),
        op(Ldy, ZeroPage, 3, Documented),
        op(Lda, ZeroPage, 3, Documented),
        op(Ldx, ZeroPage, 3, Documented),
        op(Lax, ZeroPage, 3, Stable),
        op(Tay, Implied, 2, Documented),
        op(Lda, Immediate, 2, Documented),
        op(Tax, Implied, 2, Documented),
        op(Lxa, Immediate, 2, Unstable),
        op(Ldy, Absolute, 4, Documented),
        op(Lda, Absolute, 4, Documented),
        op(Ldx, Absolute, 4, Documented),
        op(Lax, Absolute, 4, Stable),
        // 0xB0
        op(Bcs, Relative, 2, Documented),
        op(Lda, IndirectY, 5, Documented),
        jam(),
        op(Lax, IndirectY, 5, Stable),
        op(Ldy, ZeroPageX, 4, Documented),
        op(Lda, ZeroPageX, 4, Documented),
        op(Ldx, ZeroPageY, 4, Documented),
        op(Lax, ZeroPageY, 4, Stable),
        op(Clv, Implied, 2, Documented),
        op(Lda, AbsoluteY, 4, Documented),
        op(Tsx, Implied, 2, Documented),
        op(Las, AbsoluteY, 4, Unstable),
        op(Ldy, AbsoluteX, 4, Documented),
        op(Lda, AbsoluteX, 4, Documented),
        op(Ldx, AbsoluteY, 4, Documented),
        op(Lax, AbsoluteY, 4, Stable),
        // 0xC0
        op(Cpy, Immediate, 2, Documented),
        op(Cmp, IndirectX, 6, Documented),
        op(Nop, Immediate, 2, Stable),
        op(Dcp, IndirectX, 8, Stable),
        op(Cpy, ZeroPage, 3, Documented),
        op(Cmp, ZeroPage, 3, Documented),
        op(Dec, ZeroPage, 5, Documented),
        op(Dcp, ZeroPage, 5, Stable),
        op(Iny, Implied, 2, Documented),
        op(Cmp, Immediate, 2, Documented),
        op(Dex, Implied, 2, Documented),
        op(Sbx, Immediate, 2, Combined),
        op(Cpy, Absolute, 4, Documented),
        op(Cmp, Absolute, 4, Documented),
        op(Dec, Absolute, 6, Documented),
        op(Dcp, Absolute, 6, Stable),
        // 0xD0
        op(Bne, Relative, 2, Documented),
        op(Cmp, IndirectY, 5, Documented),
        jam(),
        op(Dcp, IndirectY, 8, Stable),
        op(Nop, ZeroPageX, 4, Stable),
        op(Cmp, ZeroPageX, 4, Documented),
        op(Dec, ZeroPageX, 6, Documented),
        op(Dcp, ZeroPageX, 6, Stable),
        op(Cld, Implied, 2, Documented),
        op(Cmp, AbsoluteY, 4, Documented),
        op(Nop, Implied, 2, Stable),
        op(Dcp, AbsoluteY, 7, Stable),
        op(Nop, AbsoluteX, 4, Stable),
        op(Cmp, AbsoluteX, 4, Documented),
        op(Dec, AbsoluteX, 7, Documented),
        op(Dcp, AbsoluteX, 7, Stable),
        // 0xE0
        op(Cpx, Immediate, 2, Documented),
        op(Sbc, IndirectX, 6, Documented),
        op(Nop, Immediate, 2, Stable),
        op(Isc, IndirectX, 8, Stable),
        op(Cpx, ZeroPage, 3, Documented),
        op(Sbc, ZeroPage, 3, Documented),
        op(Inc, ZeroPage, 5, Documented),
        op(Isc, ZeroPage, 5, Stable),
        op(Inx, Implied, 2, Documented),
        op(Sbc, Immediate, 2, Documented),
        op(Nop, Implied, 2, Documented),
        op(Sbc, Immediate, 2, Stable),
        op(Cpx, Absolute, 4, Documented),
        op(Sbc, Absolute, 4, Documented),
        op(Inc, Absolute, 6, Documented),
        op(Isc, Absolute, 6, Stable),
        // 0xF0
        op(Beq, Relative, 2, Documented),
        op(Sbc, IndirectY, 5, Documented),
        jam(),
        op(Isc, IndirectY, 8, Stable),
        op(Nop, ZeroPageX, 4, Stable),
        op(Sbc, ZeroPageX, 4, Documented),
        op(Inc, ZeroPageX, 6, Documented),
        op(Isc, ZeroPageX, 6, Stable),
        op(Sed, Implied, 2, Documented),
        op(Sbc, AbsoluteY, 4, Documented),
        op(Nop, Implied, 2, Stable),
        op(Isc, AbsoluteY, 7, Stable),
        op(Nop, AbsoluteX, 4, Stable),
        op(Sbc, AbsoluteX, 4, Documented),
        op(Inc, AbsoluteX, 7, Documented),
        op(Isc, AbsoluteX, 7, Stable),
    ];
}
