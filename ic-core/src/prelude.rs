//! Prelude — importa os tipos mais usados
//!
//! ```
//! use ic_core::prelude::*;
//!
//! let origin = Location::new(0, 64, 0);
//! assert_eq!(origin.relative(Direction::North), Location::new(0, 64, -1));
//! ```

pub use crate::chip::{Chip, ChipDefinition, ChipFactory, ChipIo, ChipResult, Placement};
pub use crate::error::{ChipFault, InvalidIcError};
pub use crate::marker::{Marker, Mount, SignLines};
pub use crate::pins::{Pin, PinLevels, PinSet};
pub use crate::types::{Direction, Location};
pub use crate::world::{Creator, World};
