//! # 🎭 ic-orchestration — Motor de ICs
//!
//! Binds chips to world placements and drives them: creation with a deferred
//! load, edge-triggered dispatch of neighbour signal changes, and the
//! self-trigger scheduler that calls `think` once per tick.
//!
//! ## Arquitetura
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Engine                              │
//! │  ┌──────────────────┐  ┌─────────────────────────────────┐  │
//! │  │  ChipRegistry    │  │  AttachedDataStore              │  │
//! │  │  PinSetRegistry  │  │  Location → AttachedRecord      │  │
//! │  └──────────────────┘  └─────────────────────────────────┘  │
//! │  ┌──────────────────┐  ┌─────────────────────────────────┐  │
//! │  │  DeferredQueue   │  │  SelfTriggerScheduler           │  │
//! │  │  create → load   │  │  insertion-ordered think pass   │  │
//! │  └──────────────────┘  └─────────────────────────────────┘  │
//! │  ┌───────────────────────────────────────────────────────┐  │
//! │  │  EventHub: Created | Loaded | Broken | Fault | ...    │  │
//! │  └───────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Exemplo
//!
//! ```
//! use ic_core::prelude::*;
//! use ic_core::{MemoryWorld, MessageLog};
//! use ic_orchestration::{Engine, EngineConfig};
//!
//! let mut engine = Engine::new(EngineConfig::default()).unwrap();
//! engine.start().unwrap();
//!
//! let mut world = MemoryWorld::new();
//! let spot = Location::new(0, 64, 0);
//! world.place_marker(spot, Marker::wall(Direction::North, ["", "clock", "5", ""]));
//!
//! let mut lines = world.marker(spot).unwrap().lines.clone();
//! engine.create_ic(&world, spot, &mut lines, &mut MessageLog::new("steve")).unwrap();
//! world.set_lines(spot, lines);
//!
//! for _ in 0..6 {
//!     engine.tick(&mut world).unwrap();
//! }
//! // Output is the block behind the marker.
//! assert!(world.is_powered(spot.relative(Direction::South)));
//! ```

pub mod config;
pub mod deferred;
pub mod dispatcher;
pub mod docs;
pub mod engine;
pub mod error;
pub mod events;
pub mod registry;
pub mod scheduler;
pub mod store;

pub use config::EngineConfig;
pub use deferred::{DeferredQueue, DeferredTask};
pub use dispatcher::DispatchOutcome;
pub use docs::{IcTableRow, render_ic_table, substitute_ic_table};
pub use engine::{Engine, EngineStats, SharedEngine, TickReport};
pub use error::{OrchestrationError, OrchestrationResult};
pub use events::{EventHub, IcEvent};
pub use registry::{ChipRegistry, PinSetRegistry};
pub use scheduler::{PassReport, SchedulerStats, SelfTriggerScheduler, ThinkOutcome};
pub use store::{AttachedDataStore, AttachedRecord, IcInstance, Lifecycle};
