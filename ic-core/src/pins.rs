//! # 📍 Pin Sets — Famílias de Pinos
//!
//! A pin set maps the physical neighbours of a placement to logical pins.
//! Mappings are relative to the marker's facing, so the same family works
//! for every orientation.
//!
//! | Família | Entradas | Saídas |
//! |:--------|:---------|:-------|
//! | `SISO` | front | back |
//! | `3ISO` | front, left, right | back |
//!
//! Pin sets are stateless strategies: the levels live in the instance's
//! [`PinLevels`], and writing a level never touches the world. Flushing
//! outputs is the caller's job.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::types::Direction;

/// Logical pin of a chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Pin {
    Input(usize),
    Output(usize),
}

/// Cached boolean level of every pin of one instance.
///
/// Output writes that change a level are remembered until
/// [`PinLevels::take_changed_outputs`] drains them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PinLevels {
    inputs: Vec<bool>,
    outputs: Vec<bool>,
    #[serde(skip)]
    changed: Vec<bool>,
}

impl PinLevels {
    pub fn new(inputs: usize, outputs: usize) -> Self {
        Self {
            inputs: vec![false; inputs],
            outputs: vec![false; outputs],
            changed: vec![false; outputs],
        }
    }

    /// Levels sized for a pin set, all low.
    pub fn for_pin_set(pin_set: &dyn PinSet) -> Self {
        Self::new(pin_set.input_count(), pin_set.output_count())
    }

    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }

    pub fn output_count(&self) -> usize {
        self.outputs.len()
    }

    /// Level of an input; unknown pins read low.
    pub fn input(&self, pin: usize) -> bool {
        self.inputs.get(pin).copied().unwrap_or(false)
    }

    /// Level of an output; unknown pins read low.
    pub fn output(&self, pin: usize) -> bool {
        self.outputs.get(pin).copied().unwrap_or(false)
    }

    /// Sets an input level. Returns `true` only if the level changed.
    pub fn set_input(&mut self, pin: usize, level: bool) -> bool {
        match self.inputs.get_mut(pin) {
            Some(current) if *current != level => {
                *current = level;
                true
            }
            _ => false,
        }
    }

    /// Sets an output level. Returns `true` only if the level changed.
    pub fn set_output(&mut self, pin: usize, level: bool) -> bool {
        match self.outputs.get_mut(pin) {
            Some(current) if *current != level => {
                *current = level;
                if self.changed.len() < self.outputs.len() {
                    self.changed.resize(self.outputs.len(), false);
                }
                // Toggling twice before a flush cancels out.
                self.changed[pin] = !self.changed[pin];
                true
            }
            _ => false,
        }
    }

    /// Outputs whose level differs from the last drain, with their new level.
    pub fn take_changed_outputs(&mut self) -> Vec<(usize, bool)> {
        let mut changed = Vec::new();
        for (pin, flag) in self.changed.iter_mut().enumerate() {
            if std::mem::take(flag) {
                changed.push((pin, self.outputs[pin]));
            }
        }
        changed
    }

    pub fn inputs(&self) -> &[bool] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[bool] {
        &self.outputs
    }
}

/// Strategy mapping a placement's neighbours to logical pins.
///
/// Implementors only describe [`PinSet::direction_for_pin`]; the reverse
/// mapping and the level accessors are derived from it, which keeps the
/// mapping a bijection over the declared pins.
///
/// # Exemplo
///
/// ```
/// use ic_core::pins::{Pin, PinSet, PinsSiso};
/// use ic_core::types::Direction;
///
/// let siso = PinsSiso;
/// let pin = siso.pin_for_direction(Direction::North, Direction::North);
/// assert_eq!(pin, Some(Pin::Input(0)));
/// assert_eq!(siso.pin_for_direction(Direction::North, Direction::Up), None);
/// ```
pub trait PinSet: Send + Sync + Debug {
    /// Family name (`SISO`, `3ISO`, ...)
    fn name(&self) -> &str;

    fn input_count(&self) -> usize;

    fn output_count(&self) -> usize;

    /// Physical direction of `pin` for a marker facing `facing`.
    ///
    /// Returns `None` for pins outside the family or non-horizontal facings.
    fn direction_for_pin(&self, facing: Direction, pin: Pin) -> Option<Direction>;

    /// Pin reached through `direction`, or `None` if that face is not a pin.
    fn pin_for_direction(&self, facing: Direction, direction: Direction) -> Option<Pin> {
        (0..self.input_count())
            .map(Pin::Input)
            .chain((0..self.output_count()).map(Pin::Output))
            .find(|pin| self.direction_for_pin(facing, *pin) == Some(direction))
    }

    fn get_input(&self, pin: usize, levels: &PinLevels) -> bool {
        pin < self.input_count() && levels.input(pin)
    }

    fn get_output(&self, pin: usize, levels: &PinLevels) -> bool {
        pin < self.output_count() && levels.output(pin)
    }

    /// Returns `true` if the level changed.
    fn set_input(&self, pin: usize, levels: &mut PinLevels, level: bool) -> bool {
        pin < self.input_count() && levels.set_input(pin, level)
    }

    /// Returns `true` if the level changed.
    fn set_output(&self, pin: usize, levels: &mut PinLevels, level: bool) -> bool {
        pin < self.output_count() && levels.set_output(pin, level)
    }
}

/// Single input, single output.
///
/// The input is the block in front of the marker, the output is the block
/// behind it.
#[derive(Debug, Clone, Copy, Default)]
pub struct PinsSiso;

impl PinSet for PinsSiso {
    fn name(&self) -> &str {
        "SISO"
    }

    fn input_count(&self) -> usize {
        1
    }

    fn output_count(&self) -> usize {
        1
    }

    fn direction_for_pin(&self, facing: Direction, pin: Pin) -> Option<Direction> {
        if !facing.is_horizontal() {
            return None;
        }
        match pin {
            Pin::Input(0) => Some(facing),
            Pin::Output(0) => Some(facing.opposite()),
            _ => None,
        }
    }
}

/// Three inputs, single output.
///
/// Inputs are front (0), left (1) and right (2) as seen when reading the
/// marker; the output is the block behind it.
#[derive(Debug, Clone, Copy, Default)]
pub struct Pins3Iso;

impl PinSet for Pins3Iso {
    fn name(&self) -> &str {
        "3ISO"
    }

    fn input_count(&self) -> usize {
        3
    }

    fn output_count(&self) -> usize {
        1
    }

    fn direction_for_pin(&self, facing: Direction, pin: Pin) -> Option<Direction> {
        if !facing.is_horizontal() {
            return None;
        }
        match pin {
            Pin::Input(0) => Some(facing),
            Pin::Input(1) => Some(facing.clockwise()),
            Pin::Input(2) => Some(facing.counter_clockwise()),
            Pin::Output(0) => Some(facing.opposite()),
            _ => None,
        }
    }
}
