//! CIA 6526 register file and per-cycle behaviour.
//!
//! # Registers
//!
//! | Reg | Read                  | Write                 |
//! |-----|-----------------------|-----------------------|
//! | $x0 | Port A pins           | Port A output         |
//! | $x1 | Port B pins           | Port B output         |
//! | $x2 | Port A DDR            | Port A DDR            |
//! | $x3 | Port B DDR            | Port B DDR            |
//! | $x4 | Timer A low (counter) | Timer A low (latch)   |
//! | $x5 | Timer A high (counter)| Timer A high (latch)  |
//! | $x6 | Timer B low (counter) | Timer B low (latch)   |
//! | $x7 | Timer B high (counter)| Timer B high (latch)  |
//! | $x8 | TOD 10ths             | TOD 10ths             |
//! | $x9 | TOD seconds           | TOD seconds           |
//! | $xA | TOD minutes           | TOD minutes           |
//! | $xB | TOD hours             | TOD hours             |
//! | $xC | Serial shift register | Serial shift register |
//! | $xD | ICR (read/clear)      | ICR (set/clear mask)  |
//! | $xE | Control reg A         | Control reg A         |
//! | $xF | Control reg B         | Control reg B         |

#![allow(clippy::cast_possible_truncation)]

use emu_core::{Observable, Tickable, Value};

use crate::icr::{self, InterruptControl};
use crate::timer::Timer;
use crate::tod::TimeOfDay;

/// Time-of-day divider for a PAL machine: 985 248 Hz / 10.
pub const DEFAULT_TOD_DIVIDER: u32 = 98_524;

// Control register bits shared by CRA and CRB.
const CR_START: u8 = 0x01;
const CR_PB_ON: u8 = 0x02;
const CR_TOGGLE: u8 = 0x04;
const CR_ONE_SHOT: u8 = 0x08;
const CR_LOAD: u8 = 0x10;
// CRA only.
const CRA_CNT: u8 = 0x20;
const CRA_SP_OUT: u8 = 0x40;
// CRB only.
const CRB_ALARM: u8 = 0x80;

/// Timer B input source, CRB bits 5-6.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerBInput {
    Phi2,
    Cnt,
    TimerA,
    TimerAGatedByCnt,
}

impl TimerBInput {
    fn from_crb(crb: u8) -> Self {
        match (crb >> 5) & 0x03 {
            0 => Self::Phi2,
            1 => Self::Cnt,
            2 => Self::TimerA,
            _ => Self::TimerAGatedByCnt,
        }
    }
}

/// Level of a timer's port B output (PB6 for A, PB7 for B).
#[derive(Debug, Clone, Copy, Default)]
struct TimerOutput {
    level: bool,
}

impl TimerOutput {
    /// Pulse mode holds the line for one cycle only.
    fn begin_cycle(&mut self, cr: u8) {
        if cr & CR_TOGGLE == 0 {
            self.level = false;
        }
    }

    fn underflow(&mut self, cr: u8) {
        self.level = if cr & CR_TOGGLE != 0 { !self.level } else { true };
    }
}

/// CIA 6526 instance.
#[derive(Debug, Clone)]
pub struct Cia {
    /// Port A output register.
    pra: u8,
    /// Port B output register.
    prb: u8,
    /// Port A data direction register (1 = output).
    ddra: u8,
    /// Port B data direction register (1 = output).
    ddrb: u8,
    /// Levels driven onto port A by the outside world.
    port_a_pins: u8,
    /// Levels driven onto port B by the outside world.
    port_b_pins: u8,

    timer_a: Timer,
    timer_b: Timer,
    pb6: TimerOutput,
    pb7: TimerOutput,

    tod: TimeOfDay,
    icr: InterruptControl,

    /// Serial data register.
    sdr: u8,
    /// Timer A underflows left before the outgoing byte is complete.
    sdr_shifts: u8,

    /// Control register A (bit 4 never stored).
    cra: u8,
    /// Control register B (bit 4 never stored).
    crb: u8,
}

impl Cia {
    #[must_use]
    pub fn new() -> Self {
        Self::with_tod_divider(DEFAULT_TOD_DIVIDER)
    }

    /// A CIA whose time-of-day clock advances every `divider` cycles.
    #[must_use]
    pub fn with_tod_divider(divider: u32) -> Self {
        Self {
            pra: 0,
            prb: 0,
            ddra: 0,
            ddrb: 0,
            port_a_pins: 0xFF,
            port_b_pins: 0xFF,
            timer_a: Timer::new(),
            timer_b: Timer::new(),
            pb6: TimerOutput::default(),
            pb7: TimerOutput::default(),
            tod: TimeOfDay::new(divider),
            icr: InterruptControl::new(),
            sdr: 0,
            sdr_shifts: 0,
            cra: 0,
            crb: 0,
        }
    }

    /// Power-on state. External pin levels and the TOD divider survive.
    pub fn reset(&mut self) {
        let divider = self.tod.divider();
        let (port_a_pins, port_b_pins) = (self.port_a_pins, self.port_b_pins);
        *self = Self::with_tod_divider(divider);
        self.port_a_pins = port_a_pins;
        self.port_b_pins = port_b_pins;
    }

    pub fn set_tod_divider(&mut self, divider: u32) {
        self.tod.set_divider(divider);
    }

    /// Advance one system cycle.
    ///
    /// An interrupt raised during the previous call becomes visible (bit 7
    /// and [`irq`](Self::irq)) at the top of this one.
    pub fn clock(&mut self) {
        self.icr.begin_cycle();
        self.pb6.begin_cycle(self.cra);
        self.pb7.begin_cycle(self.crb);

        let a_underflow = self.timer_a.clock(self.cra & CRA_CNT == 0);
        if a_underflow {
            log::trace!("CIA timer A underflow, reload {:#06X}", self.timer_a.latch());
            self.icr.raise(icr::TIMER_A);
            self.pb6.underflow(self.cra);
            if self.timer_a.is_stopped() {
                self.cra &= !CR_START;
            }
            self.shift_serial();
        }

        // CNT is not driven by anything and floats high.
        let b_count = match TimerBInput::from_crb(self.crb) {
            TimerBInput::Phi2 => true,
            TimerBInput::Cnt => false,
            TimerBInput::TimerA | TimerBInput::TimerAGatedByCnt => a_underflow,
        };
        if self.timer_b.clock(b_count) {
            log::trace!("CIA timer B underflow, reload {:#06X}", self.timer_b.latch());
            self.icr.raise(icr::TIMER_B);
            self.pb7.underflow(self.crb);
            if self.timer_b.is_stopped() {
                self.crb &= !CR_START;
            }
        }

        if self.tod.clock() {
            self.icr.raise(icr::ALARM);
        }
    }

    /// Two timer A underflows per bit while the serial port is an output.
    fn shift_serial(&mut self) {
        if self.cra & CRA_SP_OUT == 0 || self.sdr_shifts == 0 {
            return;
        }
        self.sdr_shifts -= 1;
        if self.sdr_shifts == 0 {
            self.icr.raise(icr::SERIAL);
        }
    }

    /// Interrupt output level.
    #[must_use]
    pub fn irq(&self) -> bool {
        self.icr.irq()
    }

    /// Read a CIA register. Reading ICR acknowledges it and reading the
    /// TOD registers drives the read latch.
    pub fn read(&mut self, reg: u8) -> u8 {
        match reg & 0x0F {
            r @ 0x08..=0x0B => self.tod.read(r - 0x08),
            0x0D => self.icr.acknowledge(),
            r => self.peek(r),
        }
    }

    /// Read a CIA register without side effects.
    #[must_use]
    pub fn peek(&self, reg: u8) -> u8 {
        match reg & 0x0F {
            0x00 => self.port_a(),
            0x01 => self.port_b(),
            0x02 => self.ddra,
            0x03 => self.ddrb,
            0x04 => self.timer_a.counter() as u8,
            0x05 => (self.timer_a.counter() >> 8) as u8,
            0x06 => self.timer_b.counter() as u8,
            0x07 => (self.timer_b.counter() >> 8) as u8,
            r @ 0x08..=0x0B => self.tod.peek(r - 0x08),
            0x0C => self.sdr,
            0x0D => self.icr.peek(),
            0x0E => self.cra,
            _ => self.crb,
        }
    }

    /// Write a CIA register.
    pub fn write(&mut self, reg: u8, value: u8) {
        match reg & 0x0F {
            0x00 => self.pra = value,
            0x01 => self.prb = value,
            0x02 => self.ddra = value,
            0x03 => self.ddrb = value,
            0x04 => self.timer_a.write_latch_lo(value),
            0x05 => self.timer_a.write_latch_hi(value),
            0x06 => self.timer_b.write_latch_lo(value),
            0x07 => self.timer_b.write_latch_hi(value),
            r @ 0x08..=0x0B => {
                if self.tod.write(r - 0x08, value, self.crb & CRB_ALARM != 0) {
                    self.icr.raise(icr::ALARM);
                }
            }
            0x0C => {
                self.sdr = value;
                if self.cra & CRA_SP_OUT != 0 {
                    self.sdr_shifts = 16;
                }
            }
            0x0D => self.icr.write_mask(value),
            0x0E => {
                Self::write_control(&mut self.timer_a, &mut self.pb6, self.cra, value);
                if (self.cra ^ value) & CRA_SP_OUT != 0 {
                    self.sdr_shifts = 0;
                }
                self.cra = value & !CR_LOAD;
            }
            _ => {
                Self::write_control(&mut self.timer_b, &mut self.pb7, self.crb, value);
                self.crb = value & !CR_LOAD;
            }
        }
    }

    fn write_control(timer: &mut Timer, output: &mut TimerOutput, old: u8, value: u8) {
        timer.set_one_shot(value & CR_ONE_SHOT != 0);
        if value & CR_LOAD != 0 {
            timer.force_load();
        }
        if value & CR_START == 0 {
            timer.stop();
        } else if old & CR_START == 0 {
            timer.start();
            // Toggle output starts high with the timer.
            output.level = value & CR_TOGGLE != 0;
        }
    }

    /// Port A as seen on the pins: outputs where DDR is set, the external
    /// levels elsewhere.
    #[must_use]
    pub fn port_a(&self) -> u8 {
        (self.pra & self.ddra) | (self.port_a_pins & !self.ddra)
    }

    /// Port B as seen on the pins, with PB6/PB7 replaced by the timer
    /// outputs when enabled.
    #[must_use]
    pub fn port_b(&self) -> u8 {
        let mut value = (self.prb & self.ddrb) | (self.port_b_pins & !self.ddrb);
        if self.cra & CR_PB_ON != 0 {
            value = (value & !0x40) | if self.pb6.level { 0x40 } else { 0 };
        }
        if self.crb & CR_PB_ON != 0 {
            value = (value & !0x80) | if self.pb7.level { 0x80 } else { 0 };
        }
        value
    }

    /// Port A output register merged with the DDR; input lines read high.
    #[must_use]
    pub fn port_a_output(&self) -> u8 {
        (self.pra & self.ddra) | !self.ddra
    }

    /// Port B output register merged with the DDR; input lines read high.
    #[must_use]
    pub fn port_b_output(&self) -> u8 {
        (self.prb & self.ddrb) | !self.ddrb
    }

    /// Drive the external port A pins.
    pub fn set_port_a_pins(&mut self, value: u8) {
        self.port_a_pins = value;
    }

    /// Drive the external port B pins.
    pub fn set_port_b_pins(&mut self, value: u8) {
        self.port_b_pins = value;
    }

    /// Falling edge on the FLAG input.
    pub fn trigger_flag(&mut self) {
        self.icr.raise(icr::FLAG);
    }

    /// A byte clocked in from outside while the serial port is an input.
    pub fn receive_serial(&mut self, value: u8) {
        if self.cra & CRA_SP_OUT == 0 {
            self.sdr = value;
            self.icr.raise(icr::SERIAL);
        }
    }

    #[must_use]
    pub fn timer_a(&self) -> &Timer {
        &self.timer_a
    }

    #[must_use]
    pub fn timer_b(&self) -> &Timer {
        &self.timer_b
    }

    #[must_use]
    pub fn tod(&self) -> &TimeOfDay {
        &self.tod
    }

    #[must_use]
    pub fn icr(&self) -> &InterruptControl {
        &self.icr
    }

    #[must_use]
    pub fn cra(&self) -> u8 {
        self.cra
    }

    #[must_use]
    pub fn crb(&self) -> u8 {
        self.crb
    }
}

impl Default for Cia {
    fn default() -> Self {
        Self::new()
    }
}

impl Tickable for Cia {
    fn tick(&mut self) {
        self.clock();
    }
}

const QUERY_PATHS: &[&str] = &[
    "pra",
    "prb",
    "ddra",
    "ddrb",
    "port_a",
    "port_b",
    "timer_a.counter",
    "timer_a.latch",
    "timer_a.state",
    "timer_b.counter",
    "timer_b.latch",
    "timer_b.state",
    "tod.tenths",
    "tod.seconds",
    "tod.minutes",
    "tod.hours",
    "tod.running",
    "sdr",
    "icr.data",
    "icr.mask",
    "icr.pending",
    "irq",
    "cra",
    "crb",
];

impl Observable for Cia {
    fn query(&self, path: &str) -> Option<Value> {
        let value = match path {
            "pra" => self.pra.into(),
            "prb" => self.prb.into(),
            "ddra" => self.ddra.into(),
            "ddrb" => self.ddrb.into(),
            "port_a" => self.port_a().into(),
            "port_b" => self.port_b().into(),
            "timer_a.counter" => self.timer_a.counter().into(),
            "timer_a.latch" => self.timer_a.latch().into(),
            "timer_a.state" => self.timer_a.state().to_string().into(),
            "timer_b.counter" => self.timer_b.counter().into(),
            "timer_b.latch" => self.timer_b.latch().into(),
            "timer_b.state" => self.timer_b.state().to_string().into(),
            "tod.tenths" => self.tod.time()[0].into(),
            "tod.seconds" => self.tod.time()[1].into(),
            "tod.minutes" => self.tod.time()[2].into(),
            "tod.hours" => self.tod.time()[3].into(),
            "tod.running" => self.tod.is_running().into(),
            "sdr" => self.sdr.into(),
            "icr.data" => self.icr.peek().into(),
            "icr.mask" => self.icr.mask().into(),
            "icr.pending" => self.icr.is_pending().into(),
            "irq" => self.irq().into(),
            "cra" => self.cra.into(),
            "crb" => self.crb.into(),
            _ => return None,
        };
        Some(value)
    }

    fn query_paths(&self) -> &'static [&'static str] {
        QUERY_PATHS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::TimerState;
    use emu_core::Ticks;

    fn with_timer_a(latch: u16, cra: u8) -> Cia {
        let mut cia = Cia::new();
        cia.write(0x04, latch as u8);
        cia.write(0x05, (latch >> 8) as u8);
        cia.write(0x0E, cra);
        cia
    }

    #[test]
    fn timer_a_countdown() {
        let mut cia = with_timer_a(10, 0x01);
        // Two pipeline cycles, then ten counts.
        for _ in 0..11 {
            cia.clock();
        }
        assert_eq!(cia.peek(0x0D) & 0x01, 0);
        cia.clock();
        assert_eq!(cia.peek(0x0D) & 0x01, 0x01);
        assert_eq!(cia.timer_a().counter(), 10);
    }

    #[test]
    fn latch_one_underflows_after_pipeline_and_lags_irq() {
        let mut cia = with_timer_a(1, 0x01);
        cia.write(0x0D, 0x81);
        cia.clock();
        cia.clock();
        assert_eq!(cia.peek(0x0D), 0x00);
        cia.clock();
        assert_eq!(cia.peek(0x0D), 0x01);
        assert_eq!(cia.timer_a().counter(), 1);
        assert!(!cia.irq());
        cia.clock();
        assert_eq!(cia.peek(0x0D), 0x81);
        assert!(cia.irq());
    }

    #[test]
    fn timer_a_oneshot() {
        let mut cia = with_timer_a(5, 0x09);
        assert!(cia.timer_a().is_one_shot());
        for _ in 0..7 {
            cia.clock();
        }
        assert_eq!(cia.peek(0x0D) & 0x01, 0x01);
        assert_eq!(cia.timer_a().state(), TimerState::Stopped);
        assert_eq!(cia.cra() & CR_START, 0);
        assert_eq!(cia.timer_a().counter(), 5);
    }

    #[test]
    fn icr_read_clears_status() {
        let mut cia = with_timer_a(1, 0x01);
        cia.write(0x0D, 0x81);
        for _ in 0..4 {
            cia.clock();
        }
        assert_eq!(cia.read(0x0D), 0x81);
        assert_eq!(cia.read(0x0D), 0x00);
        assert!(!cia.irq());
    }

    #[test]
    fn force_load_is_a_strobe() {
        let mut cia = with_timer_a(0x0300, 0x01);
        for _ in 0..10 {
            cia.clock();
        }
        assert_eq!(cia.timer_a().counter(), 0x0300 - 8);
        cia.write(0x0E, 0x11);
        assert_eq!(cia.timer_a().counter(), 0x0300);
        assert_eq!(cia.read(0x0E), 0x01);
        assert_eq!(cia.timer_a().state(), TimerState::Running);
    }

    #[test]
    fn clearing_start_stops_immediately() {
        let mut cia = with_timer_a(100, 0x01);
        for _ in 0..5 {
            cia.clock();
        }
        cia.write(0x0E, 0x00);
        let held = cia.timer_a().counter();
        for _ in 0..5 {
            cia.clock();
        }
        assert_eq!(cia.timer_a().counter(), held);
    }

    #[test]
    fn timer_b_counts_timer_a_underflows() {
        let mut cia = with_timer_a(2, 0x01);
        cia.write(0x06, 3);
        cia.write(0x07, 0);
        cia.write(0x0F, 0x41);
        // Both pipelines finish after two cycles; A then underflows every
        // second cycle and B every third A underflow.
        for _ in 0..2 + 5 {
            cia.clock();
        }
        assert_eq!(cia.peek(0x0D) & 0x02, 0);
        cia.clock();
        assert_eq!(cia.peek(0x0D) & 0x02, 0x02);
    }

    #[test]
    fn timer_a_cnt_mode_holds() {
        let mut cia = with_timer_a(4, 0x21);
        for _ in 0..20 {
            cia.clock();
        }
        assert_eq!(cia.timer_a().counter(), 4);
        assert_eq!(cia.peek(0x0D), 0);
    }

    #[test]
    fn icr_mask_set_clear() {
        let mut cia = Cia::new();
        cia.write(0x0D, 0x83);
        assert_eq!(cia.icr().mask(), 0x03);
        cia.write(0x0D, 0x01);
        assert_eq!(cia.icr().mask(), 0x02);
    }

    #[test]
    fn port_reads_merge_ddr_and_pins() {
        let mut cia = Cia::new();
        cia.write(0x02, 0xF0);
        cia.write(0x00, 0xA5);
        cia.set_port_a_pins(0x3C);
        assert_eq!(cia.read(0x00), 0xAC);
        assert_eq!(cia.port_a_output(), 0xAF);

        cia.write(0x03, 0x0F);
        cia.write(0x01, 0x35);
        cia.set_port_b_pins(0x00);
        assert_eq!(cia.port_b(), 0x05);
        assert_eq!(cia.port_b_output(), 0xF5);
    }

    #[test]
    fn pb6_pulses_on_underflow() {
        let mut cia = with_timer_a(2, 0x03);
        cia.write(0x03, 0x00);
        cia.set_port_b_pins(0x00);
        for _ in 0..4 {
            cia.clock();
        }
        assert_eq!(cia.read(0x01) & 0x40, 0x40);
        cia.clock();
        assert_eq!(cia.read(0x01) & 0x40, 0x00);
    }

    #[test]
    fn pb7_toggles_on_underflow() {
        let mut cia = Cia::new();
        cia.set_port_b_pins(0x00);
        cia.write(0x06, 1);
        cia.write(0x07, 0);
        cia.write(0x0F, 0x07);
        assert_eq!(cia.read(0x01) & 0x80, 0x80);
        for _ in 0..3 {
            cia.clock();
        }
        assert_eq!(cia.read(0x01) & 0x80, 0x00);
        cia.clock();
        assert_eq!(cia.read(0x01) & 0x80, 0x80);
    }

    #[test]
    fn serial_output_completes_after_sixteen_underflows() {
        let mut cia = with_timer_a(1, 0x41);
        cia.write(0x0C, 0x55);
        // Pipeline, then one underflow per cycle.
        for _ in 0..2 + 15 {
            cia.clock();
        }
        assert_eq!(cia.peek(0x0D) & 0x08, 0);
        cia.clock();
        assert_eq!(cia.peek(0x0D) & 0x08, 0x08);
    }

    #[test]
    fn serial_input_and_flag_raise_their_bits() {
        let mut cia = Cia::new();
        cia.receive_serial(0x42);
        cia.trigger_flag();
        assert_eq!(cia.read(0x0C), 0x42);
        assert_eq!(cia.read(0x0D), 0x18);
    }

    #[test]
    fn tod_alarm_raises_bit_two() {
        let mut cia = Cia::with_tod_divider(3);
        cia.write(0x0D, 0x84);
        cia.write(0x0F, 0x80);
        cia.write(0x08, 0x01);
        cia.write(0x09, 0x00);
        cia.write(0x0A, 0x00);
        cia.write(0x0B, 0x01);
        cia.write(0x0F, 0x00);
        cia.write(0x0B, 0x01);
        cia.write(0x08, 0x00);
        for _ in 0..3 {
            cia.clock();
        }
        assert_eq!(cia.peek(0x0D), 0x04);
        cia.clock();
        assert_eq!(cia.peek(0x0D), 0x84);
        assert!(cia.irq());
    }

    #[test]
    fn tod_divider_can_be_changed() {
        let mut cia = Cia::new();
        cia.set_tod_divider(4);
        assert_eq!(cia.tod().divider(), 4);
        cia.write(0x08, 0x00);
        for _ in 0..7 {
            cia.clock();
        }
        assert_eq!(cia.peek(0x08), 0x01);
        cia.clock();
        assert_eq!(cia.peek(0x08), 0x02);
    }

    #[test]
    fn reset_restores_power_on_state() {
        let mut cia = with_timer_a(0x10, 0x01);
        cia.write(0x0D, 0x81);
        cia.set_port_a_pins(0x7F);
        for _ in 0..30 {
            cia.clock();
        }
        cia.reset();
        assert_eq!(cia.timer_a().counter(), 0xFFFF);
        assert_eq!(cia.timer_a().latch(), 0xFFFF);
        assert_eq!(cia.timer_a().state(), TimerState::Stopped);
        assert_eq!(cia.icr().mask(), 0);
        assert!(!cia.irq());
        assert_eq!(cia.tod().time(), [0, 0, 0, 0x01]);
        assert!(!cia.tod().is_running());
        assert_eq!(cia.read(0x00), 0x7F);
    }

    #[test]
    fn tick_n_matches_repeated_clock() {
        let mut a = with_timer_a(7, 0x01);
        let mut b = a.clone();
        a.tick_n(Ticks::new(20));
        for _ in 0..20 {
            b.clock();
        }
        assert_eq!(a.timer_a().counter(), b.timer_a().counter());
        assert_eq!(a.peek(0x0D), b.peek(0x0D));
    }

    #[test]
    fn observable_paths() {
        let mut cia = with_timer_a(0x1234, 0x01);
        assert_eq!(cia.query("timer_a.latch"), Some(Value::U16(0x1234)));
        assert_eq!(
            cia.query("timer_a.state"),
            Some(Value::String("pending(2)".into()))
        );
        cia.tick();
        cia.tick();
        assert_eq!(cia.query("timer_a.state"), Some(Value::from("running")));
        assert_eq!(cia.query("nope"), None);
        for path in cia.query_paths() {
            assert!(cia.query(path).is_some(), "{path}");
        }
    }
}
