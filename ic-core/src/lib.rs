//! # 🔌 ic-core — Integrated Circuit Abstractions
//!
//! Core types shared by every crate of the IC simulator: world coordinates,
//! the marker (sign) text contract, the world boundary, pin families and the
//! chip protocol that concrete chips implement.
//!
//! ## Arquitetura
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                      World (host)                         │
//! │   powered(loc) | set_powered(loc) | marker(loc) | time    │
//! └─────────────────────────────┬─────────────────────────────┘
//!                               │ Direction → Location
//! ┌─────────────────────────────▼─────────────────────────────┐
//! │                  PinSet (SISO | 3ISO | ...)               │
//! │        direction ⇄ Pin::Input(n) / Pin::Output(n)         │
//! └─────────────────────────────┬─────────────────────────────┘
//!                               │ ChipIo (PinLevels)
//! ┌─────────────────────────────▼─────────────────────────────┐
//! │                Chip (create/load/trigger/think)           │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Princípio de Design
//!
//! > *"Trait no core, implementação no módulo."*
//!
//! Concrete chips live in `ic-logic`; the engine that binds them to world
//! placements lives in `ic-orchestration`.

pub mod chip;
pub mod error;
pub mod marker;
pub mod pins;
pub mod prelude;
pub mod types;
pub mod world;

pub use chip::{Chip, ChipDefinition, ChipFactory, ChipIo, ChipResult, Placement};
pub use error::{ChipFault, InvalidIcError};
pub use marker::{Marker, Mount, SignLines, TypeLine};
pub use pins::{Pin, PinLevels, PinSet, Pins3Iso, PinsSiso};
pub use types::{Direction, Location};
pub use world::{Creator, MemoryWorld, MessageLog, World};
