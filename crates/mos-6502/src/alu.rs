//! Arithmetic and logic.
//!
//! Free functions over `(operands, &mut Status)` so the decimal paths can be
//! exercised without a bus. Decimal ADC is split into its digit steps;
//! N and V on NMOS parts come from the high digit *before* it is corrected,
//! which is why that intermediate has a name.

use crate::Status;
use crate::flags::{C, D, N, V, Z};

/// OR mask seen on the internal bus by ANE and LXA.
///
/// Real chips show anything from $00 to $FF depending on temperature and
/// batch; $EE is the value most commonly measured on C64s.
pub const UNSTABLE_MAGIC: u8 = 0xEE;

pub fn adc(a: u8, operand: u8, p: &mut Status) -> u8 {
    if p.is_set(D) {
        adc_decimal(a, operand, p)
    } else {
        adc_binary(a, operand, p)
    }
}

pub fn adc_binary(a: u8, operand: u8, p: &mut Status) -> u8 {
    let sum = u16::from(a) + u16::from(operand) + u16::from(p.carry());
    let result = sum as u8;
    p.set_if(C, sum > 0xFF);
    p.set_if(V, (a ^ result) & (operand ^ result) & 0x80 != 0);
    p.update_nz(result);
    result
}

/// Low digit of a decimal add, +6 applied when it passes 9.
///
/// The result may exceed $0F; bit 4 is the carry into the high digit.
#[must_use]
pub fn decimal_low_digit(a: u8, operand: u8, carry: bool) -> u8 {
    let raw = (a & 0x0F) + (operand & 0x0F) + u8::from(carry);
    if raw > 9 { raw + 6 } else { raw }
}

/// High digit of a decimal add before its own correction.
#[must_use]
pub fn decimal_high_digit(a: u8, operand: u8, low: u8) -> u8 {
    (a >> 4) + (operand >> 4) + u8::from(low > 0x0F)
}

/// High digit after the +6 correction. Above $0F means carry out.
#[must_use]
pub fn decimal_high_corrected(high: u8) -> u8 {
    if high > 9 { high + 6 } else { high }
}

pub fn adc_decimal(a: u8, operand: u8, p: &mut Status) -> u8 {
    let carry_in = p.is_set(C);
    let binary = a.wrapping_add(operand).wrapping_add(u8::from(carry_in));

    let low = decimal_low_digit(a, operand, carry_in);
    let high = decimal_high_digit(a, operand, low);
    let partial = (high << 4) | (low & 0x0F);
    let corrected = decimal_high_corrected(high);

    p.set_if(Z, binary == 0);
    p.set_if(N, partial & 0x80 != 0);
    p.set_if(V, (a ^ partial) & (operand ^ partial) & 0x80 != 0);
    p.set_if(C, corrected > 0x0F);
    (corrected << 4) | (low & 0x0F)
}

pub fn sbc(a: u8, operand: u8, p: &mut Status) -> u8 {
    if p.is_set(D) {
        sbc_decimal(a, operand, p)
    } else {
        adc_binary(a, !operand, p)
    }
}

/// Decimal subtract. Every flag comes from the binary difference; only the
/// accumulator sees the digit corrections.
pub fn sbc_decimal(a: u8, operand: u8, p: &mut Status) -> u8 {
    let borrow = i16::from(!p.is_set(C));
    adc_binary(a, !operand, p);

    let low = i16::from(a & 0x0F) - i16::from(operand & 0x0F) - borrow;
    let low = if low < 0 { ((low - 6) & 0x0F) - 0x10 } else { low };
    let full = i16::from(a & 0xF0) - i16::from(operand & 0xF0) + low;
    let full = if full < 0 { full - 0x60 } else { full };
    full as u8
}

/// CMP/CPX/CPY.
pub fn compare(register: u8, operand: u8, p: &mut Status) {
    p.set_if(C, register >= operand);
    p.update_nz(register.wrapping_sub(operand));
}

pub fn bit(a: u8, operand: u8, p: &mut Status) {
    p.set_if(Z, a & operand == 0);
    p.set_if(N, operand & 0x80 != 0);
    p.set_if(V, operand & 0x40 != 0);
}

pub fn asl(value: u8, p: &mut Status) -> u8 {
    p.set_if(C, value & 0x80 != 0);
    let result = value << 1;
    p.update_nz(result);
    result
}

pub fn lsr(value: u8, p: &mut Status) -> u8 {
    p.set_if(C, value & 0x01 != 0);
    let result = value >> 1;
    p.update_nz(result);
    result
}

pub fn rol(value: u8, p: &mut Status) -> u8 {
    let result = (value << 1) | p.carry();
    p.set_if(C, value & 0x80 != 0);
    p.update_nz(result);
    result
}

pub fn ror(value: u8, p: &mut Status) -> u8 {
    let result = (value >> 1) | (p.carry() << 7);
    p.set_if(C, value & 0x01 != 0);
    p.update_nz(result);
    result
}

/// ARR: AND, then ROR with flags from the adder. Decimal mode adds digit
/// fix-ups that mirror ADC's.
pub fn arr(a: u8, operand: u8, p: &mut Status) -> u8 {
    let and = a & operand;
    let rotated = (and >> 1) | (p.carry() << 7);

    if !p.is_set(D) {
        p.update_nz(rotated);
        p.set_if(C, rotated & 0x40 != 0);
        p.set_if(V, ((rotated >> 6) ^ (rotated >> 5)) & 0x01 != 0);
        return rotated;
    }

    p.update_nz(rotated);
    p.set_if(V, (and ^ rotated) & 0x40 != 0);

    let low = and & 0x0F;
    let high = and >> 4;
    let mut result = rotated;
    if low + (low & 0x01) > 5 {
        result = (result & 0xF0) | (result.wrapping_add(6) & 0x0F);
    }
    let carry = high + (high & 0x01) > 5;
    p.set_if(C, carry);
    if carry {
        result = result.wrapping_add(0x60);
    }
    result
}

/// SBX: X = (A & X) - operand, compare-style flags, no borrow in.
pub fn sbx(a: u8, x: u8, operand: u8, p: &mut Status) -> u8 {
    let and = a & x;
    compare(and, operand, p);
    and.wrapping_sub(operand)
}

/// ANE ($8B): A = (A | magic) & X & operand.
pub fn ane(a: u8, x: u8, operand: u8, p: &mut Status) -> u8 {
    let result = (a | UNSTABLE_MAGIC) & x & operand;
    p.update_nz(result);
    result
}

/// LXA ($AB): A = X = (A | magic) & operand.
pub fn lxa(a: u8, operand: u8, p: &mut Status) -> u8 {
    let result = (a | UNSTABLE_MAGIC) & operand;
    p.update_nz(result);
    result
}
