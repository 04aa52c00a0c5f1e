//! # 🧩 Chip Protocol
//!
//! Every concrete chip implements [`Chip`]. The engine drives the calls:
//!
//! | Chamada | Quando |
//! |:--------|:-------|
//! | `create` | once, when the marker is written, before it becomes visible |
//! | `load` | once the placement is bound (one tick later), and after restores |
//! | `trigger` | whenever an input pin changes level |
//! | `think` | every tick, only for self-triggering chips |
//! | `can_think` | once, right after `load`, to decide scheduler registration |
//!
//! New chip kinds are added by registering a [`ChipDefinition`] whose
//! factory builds the chip; no engine internals are required.

use std::fmt;
use std::sync::Arc;

use crate::error::{ChipFault, InvalidIcError};
use crate::marker::SignLines;
use crate::pins::{PinLevels, PinSet};
use crate::types::{Direction, Location};
use crate::world::Creator;

pub type ChipResult<T> = Result<T, ChipFault>;

/// Where a chip instance lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Placement {
    pub location: Location,
    /// Facing of the marker
    pub facing: Direction,
}

impl Placement {
    pub const fn new(location: Location, facing: Direction) -> Self {
        Self { location, facing }
    }
}

/// Pin access handed to chip logic during `trigger` and `think`.
///
/// Writes only update the cached levels; the engine flushes changed outputs
/// to the world afterwards.
pub struct ChipIo<'a> {
    pin_set: &'a dyn PinSet,
    levels: &'a mut PinLevels,
    time: u64,
}

impl<'a> ChipIo<'a> {
    pub fn new(pin_set: &'a dyn PinSet, levels: &'a mut PinLevels, time: u64) -> Self {
        Self {
            pin_set,
            levels,
            time,
        }
    }

    pub fn input(&self, pin: usize) -> bool {
        self.pin_set.get_input(pin, self.levels)
    }

    pub fn output(&self, pin: usize) -> bool {
        self.pin_set.get_output(pin, self.levels)
    }

    /// Returns `true` if the output level changed.
    pub fn set_output(&mut self, pin: usize, level: bool) -> bool {
        self.pin_set.set_output(pin, self.levels, level)
    }

    pub fn input_count(&self) -> usize {
        self.pin_set.input_count()
    }

    pub fn output_count(&self) -> usize {
        self.pin_set.output_count()
    }

    /// Levels of every input pin, in pin order.
    pub fn inputs(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.input_count()).map(|pin| self.input(pin))
    }

    /// World time at the moment of the call.
    pub fn world_time(&self) -> u64 {
        self.time
    }

    pub fn family(&self) -> &str {
        self.pin_set.name()
    }
}

/// Behaviour of one chip kind.
pub trait Chip: Send + fmt::Debug {
    /// Parses and validates the configuration lines, possibly rewriting them
    /// to canonical form. Must accept its own rewritten text on later loads.
    fn create(&mut self, creator: &mut dyn Creator, lines: &mut SignLines) -> Result<(), InvalidIcError> {
        let _ = (creator, lines);
        Ok(())
    }

    /// Re-derives all configuration from the marker text. Identical text
    /// must always produce identical state.
    fn load(&mut self, lines: &SignLines) -> ChipResult<()> {
        let _ = lines;
        Ok(())
    }

    /// An input pin changed level.
    fn trigger(&mut self, io: &mut ChipIo<'_>) -> ChipResult<()>;

    /// Periodic evaluation, once per tick.
    fn think(&mut self, io: &mut ChipIo<'_>) -> ChipResult<()> {
        let _ = io;
        Ok(())
    }

    fn can_think(&self) -> bool {
        false
    }
}

/// Builds a chip for a placement.
pub type ChipFactory = Arc<dyn Fn(&Placement) -> Box<dyn Chip> + Send + Sync>;

/// Registered chip kind. Immutable once registered.
#[derive(Clone)]
pub struct ChipDefinition {
    model_id: String,
    shorthand_id: String,
    name: String,
    description: String,
    default_family: String,
    self_triggering: bool,
    factory: ChipFactory,
}

impl ChipDefinition {
    /// Cria nova definição (não auto-disparada)
    pub fn new<F>(
        model_id: impl Into<String>,
        shorthand_id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        default_family: impl Into<String>,
        factory: F,
    ) -> Self
    where
        F: Fn(&Placement) -> Box<dyn Chip> + Send + Sync + 'static,
    {
        Self {
            model_id: model_id.into(),
            shorthand_id: shorthand_id.into(),
            name: name.into(),
            description: description.into(),
            default_family: default_family.into(),
            self_triggering: false,
            factory: Arc::new(factory),
        }
    }

    /// Marks the chip kind as self-triggering.
    pub fn self_triggering(mut self) -> Self {
        self.self_triggering = true;
        self
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub fn shorthand_id(&self) -> &str {
        &self.shorthand_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn default_family(&self) -> &str {
        &self.default_family
    }

    pub fn is_self_triggering(&self) -> bool {
        self.self_triggering
    }

    /// Every text that resolves to this definition.
    pub fn keys(&self) -> [&str; 3] {
        [&self.model_id, &self.shorthand_id, &self.name]
    }

    pub fn build(&self, placement: &Placement) -> Box<dyn Chip> {
        (self.factory)(placement)
    }
}

impl PartialEq for ChipDefinition {
    fn eq(&self, other: &Self) -> bool {
        self.model_id == other.model_id && self.shorthand_id == other.shorthand_id
    }
}

impl Eq for ChipDefinition {}

impl fmt::Debug for ChipDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChipDefinition")
            .field("model_id", &self.model_id)
            .field("shorthand_id", &self.shorthand_id)
            .field("name", &self.name)
            .field("default_family", &self.default_family)
            .field("self_triggering", &self.self_triggering)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pins::PinsSiso;

    #[derive(Debug)]
    struct Follower;

    impl Chip for Follower {
        fn trigger(&mut self, io: &mut ChipIo<'_>) -> ChipResult<()> {
            let level = io.input(0);
            io.set_output(0, level);
            Ok(())
        }
    }

    fn follower_definition() -> ChipDefinition {
        ChipDefinition::new("MC9000", "FOLLOW", "Follower", "Copies input", "SISO", |_| {
            Box::new(Follower)
        })
    }

    #[test]
    fn test_definition_accessors() {
        let def = follower_definition();
        assert_eq!(def.keys(), ["MC9000", "FOLLOW", "Follower"]);
        assert!(!def.is_self_triggering());
        assert!(def.clone().self_triggering().is_self_triggering());
    }

    #[test]
    fn test_definition_builds_chip() {
        let def = follower_definition();
        let placement = Placement::new(Location::new(0, 0, 0), Direction::North);
        let mut chip = def.build(&placement);
        assert!(!chip.can_think());

        let mut levels = PinLevels::for_pin_set(&PinsSiso);
        levels.set_input(0, true);
        let mut io = ChipIo::new(&PinsSiso, &mut levels, 0);
        chip.trigger(&mut io).unwrap();
        assert!(io.output(0));
        assert_eq!(levels.take_changed_outputs(), vec![(0, true)]);
    }

    #[test]
    fn test_io_inputs_iterator() {
        let mut levels = PinLevels::new(1, 1);
        levels.set_input(0, true);
        let io = ChipIo::new(&PinsSiso, &mut levels, 42);
        assert_eq!(io.inputs().collect::<Vec<_>>(), vec![true]);
        assert_eq!(io.world_time(), 42);
        assert_eq!(io.family(), "SISO");
    }
}
