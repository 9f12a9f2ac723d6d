//! Time-of-day clock.
//!
//! BCD tenths / seconds / minutes / hours with a 12-hour AM/PM flag in
//! bit 7 of the hours register. The clock advances one tenth every
//! `divider` system cycles, standing in for the mains-frequency input.

const TENTHS: usize = 0;
const SECONDS: usize = 1;
const MINUTES: usize = 2;
const HOURS: usize = 3;

const PM: u8 = 0x80;

#[derive(Debug, Clone)]
pub struct TimeOfDay {
    clock: [u8; 4],
    alarm: [u8; 4],
    /// Snapshot returned while a read sequence is in progress.
    latch: [u8; 4],
    latched: bool,
    running: bool,
    divider: u32,
    cycles: u32,
}

impl TimeOfDay {
    #[must_use]
    pub fn new(divider: u32) -> Self {
        Self {
            clock: [0, 0, 0, 0x01],
            alarm: [0; 4],
            latch: [0, 0, 0, 0x01],
            latched: false,
            running: false,
            divider: divider.max(1),
            cycles: 0,
        }
    }

    /// Power-on state: 1:00:00.0 AM, stopped. The divider is kept.
    pub fn reset(&mut self) {
        *self = Self::new(self.divider);
    }

    pub fn set_divider(&mut self, divider: u32) {
        self.divider = divider.max(1);
        self.cycles = 0;
    }

    #[must_use]
    pub fn divider(&self) -> u32 {
        self.divider
    }

    /// Advance one system cycle. Returns `true` when an advance lands on
    /// the alarm time.
    pub fn clock(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.cycles += 1;
        if self.cycles < self.divider {
            return false;
        }
        self.cycles = 0;
        self.advance();
        self.alarm_matches()
    }

    /// Read register 0-3. Hours freezes the visible time until tenths is
    /// read; the clock keeps running underneath.
    pub fn read(&mut self, reg: u8) -> u8 {
        let r = usize::from(reg & 0x03);
        if !self.latched {
            self.latch = self.clock;
        }
        match r {
            HOURS => self.latched = true,
            TENTHS => self.latched = false,
            _ => {}
        }
        self.latch[r]
    }

    /// Register value without side effects.
    #[must_use]
    pub fn peek(&self, reg: u8) -> u8 {
        let r = usize::from(reg & 0x03);
        if self.latched { self.latch[r] } else { self.clock[r] }
    }

    /// Write register 0-3 of the clock, or of the alarm when `alarm` is
    /// set. Returns `true` if the write makes the clock equal the alarm.
    pub fn write(&mut self, reg: u8, value: u8, alarm: bool) -> bool {
        let r = usize::from(reg & 0x03);
        let value = match r {
            TENTHS => value & 0x0F,
            SECONDS | MINUTES => value & 0x7F,
            _ => value & 0x9F,
        };
        if alarm {
            self.alarm[r] = value;
        } else {
            match r {
                HOURS => self.running = false,
                TENTHS => {
                    if !self.running {
                        self.cycles = 0;
                    }
                    self.running = true;
                }
                _ => {}
            }
            self.clock[r] = value;
        }
        self.alarm_matches()
    }

    fn alarm_matches(&self) -> bool {
        let hit = self.clock == self.alarm;
        if hit {
            log::debug!(
                "CIA TOD alarm at {:02X}:{:02X}:{:02X}.{:X}",
                self.clock[HOURS],
                self.clock[MINUTES],
                self.clock[SECONDS],
                self.clock[TENTHS]
            );
        }
        hit
    }

    /// One tenth of a second, with BCD carries up through the hours.
    fn advance(&mut self) {
        self.clock[TENTHS] = (self.clock[TENTHS] + 1) & 0x0F;
        if self.clock[TENTHS] < 10 {
            return;
        }
        self.clock[TENTHS] = 0;
        if !bcd_step(&mut self.clock[SECONDS], 0x60) {
            return;
        }
        if !bcd_step(&mut self.clock[MINUTES], 0x60) {
            return;
        }
        let pm = self.clock[HOURS] & PM;
        let hours = match self.clock[HOURS] & 0x1F {
            0x11 => {
                self.clock[HOURS] = 0x12 | (pm ^ PM);
                return;
            }
            0x12 => 0x01,
            0x09 => 0x10,
            h => (h + 1) & 0x1F,
        };
        self.clock[HOURS] = hours | pm;
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Current time, tenths first.
    #[must_use]
    pub fn time(&self) -> [u8; 4] {
        self.clock
    }

    #[must_use]
    pub fn alarm(&self) -> [u8; 4] {
        self.alarm
    }
}

/// Increment a two-digit BCD value; wraps to zero at `limit` and reports
/// the carry.
fn bcd_step(value: &mut u8, limit: u8) -> bool {
    let mut next = *value + 1;
    if next & 0x0F >= 0x0A {
        next = (next & 0xF0) + 0x10;
    }
    if next >= limit {
        *value = 0;
        true
    } else {
        *value = next;
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_time(tod: &mut TimeOfDay, hours: u8, minutes: u8, seconds: u8, tenths: u8) {
        tod.write(3, hours, false);
        tod.write(2, minutes, false);
        tod.write(1, seconds, false);
        tod.write(0, tenths, false);
    }

    #[test]
    fn powers_on_stopped_at_one_oclock() {
        let mut tod = TimeOfDay::new(1);
        assert_eq!(tod.time(), [0, 0, 0, 0x01]);
        assert!(!tod.is_running());
        tod.clock();
        assert_eq!(tod.time(), [0, 0, 0, 0x01]);
    }

    #[test]
    fn advances_every_divider_cycles() {
        let mut tod = TimeOfDay::new(4);
        set_time(&mut tod, 0x01, 0, 0, 0);
        for _ in 0..3 {
            tod.clock();
        }
        assert_eq!(tod.time()[0], 0);
        tod.clock();
        assert_eq!(tod.time()[0], 1);
    }

    #[test]
    fn bcd_carries_through_minutes() {
        let mut tod = TimeOfDay::new(1);
        set_time(&mut tod, 0x01, 0x09, 0x59, 0x09);
        tod.clock();
        assert_eq!(tod.time(), [0x00, 0x00, 0x10, 0x01]);
    }

    #[test]
    fn eleven_to_twelve_toggles_pm() {
        let mut tod = TimeOfDay::new(1);
        set_time(&mut tod, 0x11, 0x59, 0x59, 0x09);
        tod.clock();
        assert_eq!(tod.time(), [0, 0, 0, 0x92]);
        set_time(&mut tod, 0x91, 0x59, 0x59, 0x09);
        tod.clock();
        assert_eq!(tod.time(), [0, 0, 0, 0x12]);
    }

    #[test]
    fn twelve_rolls_to_one_keeping_pm() {
        let mut tod = TimeOfDay::new(1);
        set_time(&mut tod, 0x92, 0x59, 0x59, 0x09);
        tod.clock();
        assert_eq!(tod.time(), [0, 0, 0, 0x81]);
        set_time(&mut tod, 0x09, 0x59, 0x59, 0x09);
        tod.clock();
        assert_eq!(tod.time(), [0, 0, 0, 0x10]);
    }

    #[test]
    fn hours_write_stops_tenths_write_starts() {
        let mut tod = TimeOfDay::new(1);
        tod.write(3, 0x02, false);
        assert!(!tod.is_running());
        tod.write(0, 0x00, false);
        assert!(tod.is_running());
        tod.write(3, 0x03, false);
        assert!(!tod.is_running());
    }

    #[test]
    fn hours_read_latches_until_tenths() {
        let mut tod = TimeOfDay::new(1);
        set_time(&mut tod, 0x01, 0x00, 0x00, 0x00);
        assert_eq!(tod.read(3), 0x01);
        for _ in 0..25 {
            tod.clock();
        }
        assert_eq!(tod.read(1), 0x00);
        assert_eq!(tod.read(0), 0x00);
        assert_eq!(tod.read(1), 0x02);
        assert_eq!(tod.read(0), 0x05);
    }

    #[test]
    fn alarm_matches_on_advance_and_write() {
        let mut tod = TimeOfDay::new(1);
        tod.write(3, 0x01, true);
        tod.write(2, 0x00, true);
        tod.write(1, 0x00, true);
        assert!(!tod.write(0, 0x01, true));
        assert_eq!(tod.alarm(), [0x01, 0x00, 0x00, 0x01]);
        set_time(&mut tod, 0x01, 0x00, 0x00, 0x00);
        assert!(tod.clock());
        assert!(!tod.clock());
        assert!(tod.write(0, 0x01, false));
    }
}
