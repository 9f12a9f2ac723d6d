//! Unit tests for 6502 instruction behavior.

use emu_core::SimpleBus;
use mos_6502::{Mos6502, flags};

/// Load a program at $0200 and reset straight into it.
fn setup_program(bus: &mut SimpleBus, cpu: &mut Mos6502, program: &[u8]) {
    bus.load(0x0200, program);
    cpu.reset_at(0x0200);
}

fn run(cpu: &mut Mos6502, bus: &mut SimpleBus, instructions: usize) -> u32 {
    (0..instructions).map(|_| cpu.step(bus)).sum()
}

#[test]
fn test_stack_pha_pla() {
    let mut bus = SimpleBus::new();
    let mut cpu = Mos6502::new();

    let program = [
        0xA9, 0x42, // LDA #$42
        0xA2, 0xFF, // LDX #$FF
        0x9A, // TXS
        0x48, // PHA
        0xA9, 0x00, // LDA #$00
        0x68, // PLA
    ];
    setup_program(&mut bus, &mut cpu, &program);
    run(&mut cpu, &mut bus, 6);

    assert_eq!(cpu.a(), 0x42, "PLA should restore A");
    assert_eq!(cpu.sp(), 0xFF, "SP should be back to $FF after PLA");
    assert_eq!(bus.peek(0x01FF), 0x42);
}

#[test]
fn test_stack_php_plp_round_trip() {
    let mut bus = SimpleBus::new();
    let mut cpu = Mos6502::new();

    let program = [
        0xA2, 0xFF, // LDX #$FF
        0x9A, // TXS
        0x38, // SEC
        0xF8, // SED
        0x08, // PHP
        0x18, // CLC
        0xD8, // CLD
        0x28, // PLP
    ];
    setup_program(&mut bus, &mut cpu, &program);
    run(&mut cpu, &mut bus, 5);
    let before = cpu.status();
    run(&mut cpu, &mut bus, 3);

    assert_eq!(cpu.status(), before, "PLP should restore every flag");
    assert!(cpu.carry());
    assert!(cpu.decimal());
    assert_eq!(
        bus.peek(0x01FF) & (flags::B | flags::U),
        flags::B | flags::U,
        "PHP pushes B and bit 5 set"
    );
    assert!(!cpu.regs.p.is_set(flags::B), "B never lives in P");
    assert_eq!(cpu.sp(), 0xFF);
}

#[test]
fn test_brk_stack_layout() {
    let mut bus = SimpleBus::new();
    let mut cpu = Mos6502::new();
    bus.load(0xFFFE, &[0x00, 0x03]);

    let program = [
        0xA2, 0xFF, // LDX #$FF    @ $0200
        0x9A, // TXS         @ $0202
        0x58, // CLI         @ $0203
        0x00, // BRK         @ $0204
        0xEA, // padding     @ $0205 (skipped)
    ];
    setup_program(&mut bus, &mut cpu, &program);
    run(&mut cpu, &mut bus, 3);
    let cycles = cpu.step(&mut bus);

    assert_eq!(cycles, 7, "BRK takes 7 cycles");
    assert_eq!(cpu.pc(), 0x0300, "PC should be at BRK vector target");
    assert_eq!(cpu.sp(), 0xFC, "SP should be $FC after three pushes");
    assert!(cpu.interrupt_disable(), "I flag should be set after BRK");

    assert_eq!(bus.peek(0x01FF), 0x02, "Pushed PCH");
    assert_eq!(bus.peek(0x01FE), 0x06, "Pushed PCL skips the padding byte");
    let pushed_p = bus.peek(0x01FD);
    assert_eq!(pushed_p & 0x30, 0x30, "Pushed P should have B and U set");
    assert_eq!(pushed_p & flags::I, 0, "Pushed P should not have I (CLI ran)");
}

#[test]
fn test_brk_then_rti_is_a_fixed_point() {
    let mut bus = SimpleBus::new();
    let mut cpu = Mos6502::new();
    bus.load(0xFFFE, &[0x00, 0x03]);
    bus.load(0x0300, &[0x40]); // RTI

    let program = [
        0xA9, 0x11, // LDA #$11
        0xA2, 0x22, // LDX #$22
        0xA0, 0x33, // LDY #$33
        0x00, 0xEA, // BRK + padding
        0xEA, // NOP
    ];
    setup_program(&mut bus, &mut cpu, &program);
    run(&mut cpu, &mut bus, 3);
    let sp = cpu.sp();

    assert_eq!(cpu.step(&mut bus), 7); // BRK
    assert_eq!(cpu.step(&mut bus), 6); // RTI

    assert_eq!(cpu.pc(), 0x0208, "RTI resumes after the padding byte");
    assert_eq!((cpu.a(), cpu.x(), cpu.y()), (0x11, 0x22, 0x33));
    assert_eq!(cpu.sp(), sp);
    assert!(cpu.interrupt_disable(), "I restored from before BRK");
}

#[test]
fn test_jsr_rts() {
    let mut bus = SimpleBus::new();
    let mut cpu = Mos6502::new();
    bus.load(0x0300, &[0x60]); // RTS

    setup_program(&mut bus, &mut cpu, &[0x20, 0x00, 0x03, 0xEA]);
    assert_eq!(cpu.step(&mut bus), 6);
    assert_eq!(cpu.pc(), 0x0300);
    assert_eq!(bus.peek(0x01FD), 0x02, "return address high byte");
    assert_eq!(bus.peek(0x01FC), 0x02, "return address points at JSR's last byte");

    assert_eq!(cpu.step(&mut bus), 6);
    assert_eq!(cpu.pc(), 0x0203);
    assert_eq!(cpu.sp(), 0xFD);
}

#[test]
fn test_jmp_indirect_page_wrap() {
    let mut bus = SimpleBus::new();
    let mut cpu = Mos6502::new();
    bus.poke(0x10FF, 0x34);
    bus.poke(0x1000, 0x12);
    bus.poke(0x1100, 0x56);

    setup_program(&mut bus, &mut cpu, &[0x6C, 0xFF, 0x10]);
    assert_eq!(cpu.step(&mut bus), 5);
    assert_eq!(cpu.pc(), 0x1234, "high byte fetched from the same page");
}

#[test]
fn test_zero_page_indexing_wraps() {
    let mut bus = SimpleBus::new();
    let mut cpu = Mos6502::new();
    bus.poke(0x0000, 0x77);
    bus.poke(0x0100, 0x99);

    setup_program(&mut bus, &mut cpu, &[0xA2, 0x01, 0xB5, 0xFF]); // LDX #1; LDA $FF,X
    run(&mut cpu, &mut bus, 2);
    assert_eq!(cpu.a(), 0x77);
}

#[test]
fn test_indirect_pointer_wraps_in_zero_page() {
    let mut bus = SimpleBus::new();
    let mut cpu = Mos6502::new();
    bus.poke(0x00FF, 0x00);
    bus.poke(0x0000, 0x40); // pointer high byte wraps to $00
    bus.poke(0x4000, 0x5A);

    setup_program(&mut bus, &mut cpu, &[0xB1, 0xFF]); // LDA ($FF),Y
    cpu.step(&mut bus);
    assert_eq!(cpu.a(), 0x5A);
}

#[test]
fn test_rmw_writes_twice() {
    let mut bus = SimpleBus::new();
    let mut cpu = Mos6502::new();
    bus.poke(0x0010, 0x7F);

    setup_program(&mut bus, &mut cpu, &[0xE6, 0x10]); // INC $10
    let before = bus.accesses();
    assert_eq!(cpu.step(&mut bus), 5);
    assert_eq!(bus.accesses() - before, 5);
    assert_eq!(bus.peek(0x0010), 0x80);
    assert!(cpu.negative());
}

// ============================================================================
// Arithmetic
// ============================================================================

#[test]
fn test_adc_binary_overflow() {
    let mut bus = SimpleBus::new();
    let mut cpu = Mos6502::new();

    setup_program(&mut bus, &mut cpu, &[0x18, 0xA9, 0x50, 0x69, 0x50]); // CLC; LDA #$50; ADC #$50
    run(&mut cpu, &mut bus, 3);

    assert_eq!(cpu.a(), 0xA0);
    assert!(cpu.overflow());
    assert!(cpu.negative());
    assert!(!cpu.carry());
}

#[test]
fn test_decimal_99_with_carry_set_is_unchanged() {
    let mut bus = SimpleBus::new();
    let mut cpu = Mos6502::new();

    // SED; SEC; LDA #$99; SBC #$00
    setup_program(&mut bus, &mut cpu, &[0xF8, 0x38, 0xA9, 0x99, 0xE9, 0x00]);
    run(&mut cpu, &mut bus, 4);

    assert_eq!(cpu.a(), 0x99);
    assert!(cpu.carry(), "no borrow, carry stays set");
}

#[test]
fn test_decimal_adc_carry_out() {
    let mut bus = SimpleBus::new();
    let mut cpu = Mos6502::new();

    // SED; SEC; LDA #$99; ADC #$00 -> 99 + 0 + 1 = 00, carry
    setup_program(&mut bus, &mut cpu, &[0xF8, 0x38, 0xA9, 0x99, 0x69, 0x00]);
    run(&mut cpu, &mut bus, 4);

    assert_eq!(cpu.a(), 0x00);
    assert!(cpu.carry());
}

// ============================================================================
// Undocumented opcodes
// ============================================================================

#[test]
fn test_illegal_lax_zeropage() {
    let mut bus = SimpleBus::new();
    let mut cpu = Mos6502::new();
    bus.poke(0x0010, 0x42);

    setup_program(&mut bus, &mut cpu, &[0xA7, 0x10]);
    assert_eq!(cpu.step(&mut bus), 3);

    assert_eq!(cpu.a(), 0x42, "LAX should load A");
    assert_eq!(cpu.x(), 0x42, "LAX should load X with same value");
    assert!(!cpu.zero());
    assert!(!cpu.negative());
}

#[test]
fn test_illegal_sax_zeropage() {
    let mut bus = SimpleBus::new();
    let mut cpu = Mos6502::new();
    bus.poke(0x0010, 0xFF);

    // LDA #$0F; LDX #$3C; SAX $10
    setup_program(&mut bus, &mut cpu, &[0xA9, 0x0F, 0xA2, 0x3C, 0x87, 0x10]);
    run(&mut cpu, &mut bus, 3);

    assert_eq!(bus.peek(0x0010), 0x0C, "SAX should store A AND X");
}

#[test]
fn test_illegal_slo_zeropage() {
    let mut bus = SimpleBus::new();
    let mut cpu = Mos6502::new();
    bus.poke(0x0010, 0x40);

    // LDA #$01; SLO $10
    setup_program(&mut bus, &mut cpu, &[0xA9, 0x01, 0x07, 0x10]);
    run(&mut cpu, &mut bus, 2);

    assert_eq!(bus.peek(0x0010), 0x80, "SLO shifts memory left");
    assert_eq!(cpu.a(), 0x81, "then ORs it into A");
    assert!(!cpu.carry());
    assert!(cpu.negative());
}

#[test]
fn test_illegal_rla_zeropage() {
    let mut bus = SimpleBus::new();
    let mut cpu = Mos6502::new();
    bus.poke(0x0010, 0x80);

    // CLC; LDA #$FF; RLA $10
    setup_program(&mut bus, &mut cpu, &[0x18, 0xA9, 0xFF, 0x27, 0x10]);
    run(&mut cpu, &mut bus, 3);

    assert_eq!(bus.peek(0x0010), 0x00);
    assert_eq!(cpu.a(), 0x00);
    assert!(cpu.carry(), "bit 7 rotated into carry");
    assert!(cpu.zero());
}

#[test]
fn test_illegal_dcp_zeropage() {
    let mut bus = SimpleBus::new();
    let mut cpu = Mos6502::new();
    bus.poke(0x0010, 0x43);

    // LDA #$42; DCP $10
    setup_program(&mut bus, &mut cpu, &[0xA9, 0x42, 0xC7, 0x10]);
    run(&mut cpu, &mut bus, 2);

    assert_eq!(bus.peek(0x0010), 0x42);
    assert!(cpu.zero(), "A equals decremented memory");
    assert!(cpu.carry());
}

#[test]
fn test_illegal_isc_zeropage() {
    let mut bus = SimpleBus::new();
    let mut cpu = Mos6502::new();
    bus.poke(0x0010, 0x0F);

    // SEC; LDA #$20; ISC $10
    setup_program(&mut bus, &mut cpu, &[0x38, 0xA9, 0x20, 0xE7, 0x10]);
    run(&mut cpu, &mut bus, 3);

    assert_eq!(bus.peek(0x0010), 0x10);
    assert_eq!(cpu.a(), 0x10);
    assert!(cpu.carry());
}

#[test]
fn test_illegal_sre_and_rra() {
    let mut bus = SimpleBus::new();
    let mut cpu = Mos6502::new();
    bus.poke(0x0010, 0x03);
    bus.poke(0x0011, 0x02);

    // LDA #$F0; SRE $10 -> mem $01, A = $F1, C = 1
    // RRA $11 -> mem $81 (carry rotated in, C = 0), A = $F1 + $81
    setup_program(&mut bus, &mut cpu, &[0xA9, 0xF0, 0x47, 0x10, 0x67, 0x11]);
    run(&mut cpu, &mut bus, 2);
    assert_eq!(bus.peek(0x0010), 0x01);
    assert_eq!(cpu.a(), 0xF1);
    assert!(cpu.carry());

    cpu.step(&mut bus);
    assert_eq!(bus.peek(0x0011), 0x81);
    assert_eq!(cpu.a(), 0x72, "$F1 + $81 with ROR's carry-out of 0");
    assert!(cpu.carry());
}

#[test]
fn test_illegal_anc_immediate() {
    let mut bus = SimpleBus::new();
    let mut cpu = Mos6502::new();

    setup_program(&mut bus, &mut cpu, &[0xA9, 0xFF, 0x0B, 0x80]);
    run(&mut cpu, &mut bus, 2);

    assert_eq!(cpu.a(), 0x80);
    assert!(cpu.negative());
    assert!(cpu.carry(), "ANC copies N into C");
}

#[test]
fn test_illegal_alr_immediate() {
    let mut bus = SimpleBus::new();
    let mut cpu = Mos6502::new();

    setup_program(&mut bus, &mut cpu, &[0xA9, 0xFF, 0x4B, 0x03]);
    run(&mut cpu, &mut bus, 2);

    assert_eq!(cpu.a(), 0x01);
    assert!(cpu.carry());
}

#[test]
fn test_illegal_sbx_immediate() {
    let mut bus = SimpleBus::new();
    let mut cpu = Mos6502::new();

    // LDA #$F0; LDX #$3C; SBX #$10
    setup_program(&mut bus, &mut cpu, &[0xA9, 0xF0, 0xA2, 0x3C, 0xCB, 0x10]);
    run(&mut cpu, &mut bus, 3);

    assert_eq!(cpu.x(), 0x20);
    assert_eq!(cpu.a(), 0xF0, "A is untouched");
    assert!(cpu.carry());
}

#[test]
fn test_illegal_ane_uses_magic_constant() {
    let mut bus = SimpleBus::new();
    let mut cpu = Mos6502::new();

    // LDA #$00; LDX #$FF; ANE #$FF
    setup_program(&mut bus, &mut cpu, &[0xA9, 0x00, 0xA2, 0xFF, 0x8B, 0xFF]);
    run(&mut cpu, &mut bus, 3);

    assert_eq!(cpu.a(), mos_6502::alu::UNSTABLE_MAGIC);
}

#[test]
fn test_illegal_lxa_loads_a_and_x() {
    let mut bus = SimpleBus::new();
    let mut cpu = Mos6502::new();

    // LDA #$11; LXA #$0F -> ($11 | $EE) & $0F
    setup_program(&mut bus, &mut cpu, &[0xA9, 0x11, 0xAB, 0x0F]);
    run(&mut cpu, &mut bus, 2);

    assert_eq!(cpu.a(), 0x0F);
    assert_eq!(cpu.x(), 0x0F);
}

#[test]
fn test_illegal_shx_without_page_cross() {
    let mut bus = SimpleBus::new();
    let mut cpu = Mos6502::new();

    // LDX #$FF; LDY #$01; SHX $1000,Y
    setup_program(&mut bus, &mut cpu, &[0xA2, 0xFF, 0xA0, 0x01, 0x9E, 0x00, 0x10]);
    run(&mut cpu, &mut bus, 2);
    assert_eq!(cpu.step(&mut bus), 5);

    assert_eq!(bus.peek(0x1001), 0x11, "X & (high byte + 1)");
}

#[test]
fn test_illegal_shx_page_cross_corrupts_address() {
    let mut bus = SimpleBus::new();
    let mut cpu = Mos6502::new();

    // LDX #$0F; LDY #$01; SHX $10FF,Y
    setup_program(&mut bus, &mut cpu, &[0xA2, 0x0F, 0xA0, 0x01, 0x9E, 0xFF, 0x10]);
    run(&mut cpu, &mut bus, 3);

    assert_eq!(bus.peek(0x0100), 0x01, "stored value becomes the high byte");
    assert_eq!(bus.peek(0x1100), 0x00);
}

#[test]
fn test_illegal_tas_and_las() {
    let mut bus = SimpleBus::new();
    let mut cpu = Mos6502::new();
    bus.poke(0x2000, 0x3C);

    // LDA #$FF; LDX #$F0; LDY #$00; TAS $1000,Y; LAS $2000,Y
    let program = [
        0xA9, 0xFF, 0xA2, 0xF0, 0xA0, 0x00, 0x9B, 0x00, 0x10, 0xBB, 0x00, 0x20,
    ];
    setup_program(&mut bus, &mut cpu, &program);
    run(&mut cpu, &mut bus, 4);
    assert_eq!(cpu.sp(), 0xF0, "TAS sets S = A & X");
    assert_eq!(bus.peek(0x1000), 0x10, "S & (high byte + 1)");

    cpu.step(&mut bus);
    assert_eq!(cpu.a(), 0x30);
    assert_eq!(cpu.x(), 0x30);
    assert_eq!(cpu.sp(), 0x30);
}

#[test]
fn test_illegal_nop_lengths_and_cycles() {
    let mut bus = SimpleBus::new();
    let mut cpu = Mos6502::new();

    let program = [
        0x1A, // NOP
        0x80, 0x12, // NOP #$12
        0x0C, 0x34, 0x12, // NOP $1234
        0xA9, 0x42, // LDA #$42
    ];
    setup_program(&mut bus, &mut cpu, &program);

    assert_eq!(cpu.step(&mut bus), 2);
    assert_eq!(cpu.pc(), 0x0201);
    assert_eq!(cpu.step(&mut bus), 2);
    assert_eq!(cpu.pc(), 0x0203);
    assert_eq!(cpu.step(&mut bus), 4, "three-byte NOP reads its operand");
    assert_eq!(cpu.pc(), 0x0206);

    cpu.step(&mut bus);
    assert_eq!(cpu.a(), 0x42, "Next instruction should execute normally");
}

#[test]
fn test_illegal_jam_halts_cpu() {
    let mut bus = SimpleBus::new();
    let mut cpu = Mos6502::new();
    bus.load(0xFFFC, &[0x00, 0x02]);

    setup_program(&mut bus, &mut cpu, &[0x02, 0xA9, 0x42]); // JAM, LDA #$42
    assert_eq!(cpu.step(&mut bus), 2);
    assert!(cpu.is_halted());

    let pc_before = cpu.pc();
    for _ in 0..10 {
        assert_eq!(cpu.step(&mut bus), 1, "a jammed CPU still burns cycles");
    }
    assert_eq!(cpu.pc(), pc_before, "JAM should halt the CPU");
    assert_ne!(cpu.a(), 0x42, "LDA should not have executed");

    cpu.assert_nmi();
    cpu.step(&mut bus);
    assert!(cpu.is_halted(), "interrupts do not revive a jammed CPU");

    cpu.reset(&mut bus);
    assert!(!cpu.is_halted());
    assert_eq!(cpu.pc(), 0x0200);
}

#[test]
fn test_undocumented_sbc_alias() {
    let mut bus = SimpleBus::new();
    let mut cpu = Mos6502::new();

    // SEC; LDA #$10; SBC #$01 (the $EB encoding)
    setup_program(&mut bus, &mut cpu, &[0x38, 0xA9, 0x10, 0xEB, 0x01]);
    run(&mut cpu, &mut bus, 3);
    assert_eq!(cpu.a(), 0x0F);
    assert!(cpu.carry());
}

#[test]
fn test_cpu_trait_drives_any_bus() {
    fn run_generic<C: emu_core::Cpu<SimpleBus>>(cpu: &mut C, bus: &mut SimpleBus) -> u32 {
        cpu.reset(bus);
        cpu.step(bus)
    }

    let mut bus = SimpleBus::new();
    bus.load(0xFFFC, &[0x00, 0x02]);
    bus.load(0x0200, &[0xA9, 0x01]);
    let mut cpu = Mos6502::new();
    assert_eq!(run_generic(&mut cpu, &mut bus), 2);
    assert_eq!(cpu.a(), 0x01);
}
