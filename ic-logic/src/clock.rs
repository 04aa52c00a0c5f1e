//! Relógios: gerador de onda quadrada e bit de relógio

use ic_core::marker::CONFIG_LINE;
use ic_core::prelude::*;

/// Smallest accepted period, in ticks
pub const MIN_PERIOD: i32 = 5;
/// Largest accepted period, in ticks
pub const MAX_PERIOD: i32 = 1000;
/// Period used when the configuration line is not a number
pub const DEFAULT_PERIOD: i32 = 20;

/// Parses a period from marker text, clamping it into
/// `MIN_PERIOD..=MAX_PERIOD`. Anything that is not an `i32` falls back to
/// `DEFAULT_PERIOD`.
pub fn parse_period(text: &str) -> u32 {
    let period = text
        .trim()
        .parse::<i32>()
        .map(|value| value.clamp(MIN_PERIOD, MAX_PERIOD))
        .unwrap_or(DEFAULT_PERIOD);
    period.unsigned_abs()
}

/// Self-triggering square-wave generator.
///
/// Counts ticks and flips its single output every `limit` ticks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clock {
    ticks: u32,
    limit: u32,
}

impl Clock {
    pub fn new() -> Self {
        Self {
            ticks: 0,
            limit: DEFAULT_PERIOD.unsigned_abs(),
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn ticks(&self) -> u32 {
        self.ticks
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl Chip for Clock {
    fn create(&mut self, _creator: &mut dyn Creator, lines: &mut SignLines) -> Result<(), InvalidIcError> {
        self.limit = parse_period(lines.get(CONFIG_LINE));
        lines.set(CONFIG_LINE, self.limit.to_string());
        Ok(())
    }

    fn load(&mut self, lines: &SignLines) -> ChipResult<()> {
        self.limit = parse_period(lines.get(CONFIG_LINE));
        self.ticks = 0;
        Ok(())
    }

    fn trigger(&mut self, _io: &mut ChipIo<'_>) -> ChipResult<()> {
        Ok(())
    }

    fn think(&mut self, io: &mut ChipIo<'_>) -> ChipResult<()> {
        self.ticks += 1;
        if self.ticks >= self.limit {
            self.ticks = 0;
            let level = io.output(0);
            io.set_output(0, !level);
        }
        Ok(())
    }

    fn can_think(&self) -> bool {
        true
    }
}

/// 1-bit number taken from the parity of the world time.
///
/// Whenever the input changes and is high, the output becomes `true` on
/// odd world ticks and `false` on even ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClockBit;

impl Chip for ClockBit {
    fn trigger(&mut self, io: &mut ChipIo<'_>) -> ChipResult<()> {
        if io.input(0) {
            let odd = io.world_time() % 2 == 1;
            io.set_output(0, odd);
        }
        Ok(())
    }
}
