//! # ⏱️ ic-logic — Chips Embutidos
//!
//! Concrete implementations of the [`ic_core::Chip`] protocol and the
//! catalogue of built-in [`ic_core::ChipDefinition`]s.
//!
//! | Model | Shorthand | Família | Auto-disparo |
//! |:------|:----------|:--------|:-------------|
//! | MC1000 | REPEATER | SISO | não |
//! | MC1001 | INVERTER | SISO | não |
//! | MC1025 | CLOCKBIT | SISO | não |
//! | MC1421 | CLOCK | SISO | sim |
//! | MC3002 | AND | 3ISO | não |
//! | MC3003 | NAND | 3ISO | não |
//! | MC3020 | XOR | 3ISO | não |
//!
//! ## Exemplo
//!
//! ```
//! use ic_logic::builtin_definitions;
//!
//! let defs = builtin_definitions();
//! assert!(defs.iter().any(|d| d.shorthand_id() == "CLOCK" && d.is_self_triggering()));
//! ```

pub mod builtin;
pub mod clock;
pub mod gates;

pub use builtin::builtin_definitions;
pub use clock::{Clock, ClockBit};
pub use gates::{GateOp, Inverter, Repeater, ThreeInputGate};
