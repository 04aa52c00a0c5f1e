//! Catálogo de chips embutidos

use ic_core::ChipDefinition;

use crate::clock::{Clock, ClockBit};
use crate::gates::{GateOp, Inverter, Repeater, ThreeInputGate};

/// Built-in chip kinds, in documentation order.
pub fn builtin_definitions() -> Vec<ChipDefinition> {
    vec![
        ChipDefinition::new(
            "MC1000",
            "REPEATER",
            "Repeater",
            "Outputs the same level as the input.",
            "SISO",
            |_| Box::new(Repeater),
        ),
        ChipDefinition::new(
            "MC1001",
            "INVERTER",
            "Inverter",
            "Outputs the inverse of the input.",
            "SISO",
            |_| Box::new(Inverter),
        ),
        ChipDefinition::new(
            "MC1025",
            "CLOCKBIT",
            "Clock Bit",
            "Outputs the parity of the world time when the input goes high.",
            "SISO",
            |_| Box::new(ClockBit),
        ),
        ChipDefinition::new(
            "MC1421",
            "CLOCK",
            "Clock",
            "Toggles the output every configured number of ticks.",
            "SISO",
            |_| Box::new(Clock::new()),
        )
        .self_triggering(),
        ChipDefinition::new(
            "MC3002",
            "AND",
            "And Gate",
            "Outputs high when all inputs are high.",
            "3ISO",
            |_| Box::new(ThreeInputGate::new(GateOp::And)),
        ),
        ChipDefinition::new(
            "MC3003",
            "NAND",
            "Nand Gate",
            "Outputs low when all inputs are high.",
            "3ISO",
            |_| Box::new(ThreeInputGate::new(GateOp::Nand)),
        ),
        ChipDefinition::new(
            "MC3020",
            "XOR",
            "Xor Gate",
            "Outputs high when an odd number of inputs are high.",
            "3ISO",
            |_| Box::new(ThreeInputGate::new(GateOp::Xor)),
        ),
    ]
}
