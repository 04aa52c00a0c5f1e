//! Portas lógicas combinacionais

use serde::{Deserialize, Serialize};

use ic_core::prelude::*;

/// Output follows the input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Repeater;

impl Chip for Repeater {
    fn trigger(&mut self, io: &mut ChipIo<'_>) -> ChipResult<()> {
        let level = io.input(0);
        io.set_output(0, level);
        Ok(())
    }
}

/// Output is the negated input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Inverter;

impl Chip for Inverter {
    fn trigger(&mut self, io: &mut ChipIo<'_>) -> ChipResult<()> {
        let level = io.input(0);
        io.set_output(0, !level);
        Ok(())
    }
}

/// Operação de uma porta de três entradas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GateOp {
    And,
    Nand,
    Xor,
}

impl GateOp {
    /// Evaluates the gate over any number of input levels.
    pub fn evaluate<I>(self, inputs: I) -> bool
    where
        I: IntoIterator<Item = bool>,
    {
        let mut inputs = inputs.into_iter();
        match self {
            GateOp::And => inputs.all(|level| level),
            GateOp::Nand => !inputs.all(|level| level),
            GateOp::Xor => inputs.filter(|level| *level).count() % 2 == 1,
        }
    }
}

/// Combinational gate over every input of its pin set (three for `3ISO`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreeInputGate {
    op: GateOp,
}

impl ThreeInputGate {
    pub fn new(op: GateOp) -> Self {
        Self { op }
    }

    pub fn op(&self) -> GateOp {
        self.op
    }
}

impl Chip for ThreeInputGate {
    fn trigger(&mut self, io: &mut ChipIo<'_>) -> ChipResult<()> {
        let level = self.op.evaluate(io.inputs().collect::<Vec<_>>());
        io.set_output(0, level);
        Ok(())
    }
}
