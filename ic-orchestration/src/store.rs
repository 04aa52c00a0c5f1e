//! # 🗃️ Attached Data — Instâncias por coordenada
//!
//! One [`AttachedRecord`] per placement coordinate. A record may be
//! uninitialised (no instance), in which case any resolution reports it as
//! broken. The engine is the sole owner of record lifetime.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use ic_core::prelude::*;

use crate::error::{OrchestrationError, OrchestrationResult};

/// Runs chip code, turning a panic into [`ChipFault::Panicked`].
pub(crate) fn guarded<T>(call: impl FnOnce() -> ChipResult<T>) -> ChipResult<T> {
    match panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(result) => result,
        Err(payload) => Err(ChipFault::from_panic(payload)),
    }
}

/// Estado do ciclo de vida
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    /// `create` ran, waiting for the deferred load
    Created,
    /// Bound and active: receives trigger and think calls
    Loaded,
}

/// A chip bound to a placement.
#[derive(Debug)]
pub struct IcInstance {
    definition: Arc<ChipDefinition>,
    placement: Placement,
    pin_set: Arc<dyn PinSet>,
    pins: PinLevels,
    chip: Box<dyn Chip>,
    lifecycle: Lifecycle,
}

impl IcInstance {
    /// Builds the chip through its factory. Nothing is parsed yet.
    pub fn new(definition: Arc<ChipDefinition>, placement: Placement, pin_set: Arc<dyn PinSet>) -> Self {
        let chip = definition.build(&placement);
        let pins = PinLevels::for_pin_set(pin_set.as_ref());
        Self {
            definition,
            placement,
            pin_set,
            pins,
            chip,
            lifecycle: Lifecycle::Created,
        }
    }

    /// Runs the chip's `create`, which may rewrite `lines`.
    pub fn create(&mut self, creator: &mut dyn Creator, lines: &mut SignLines) -> Result<(), InvalidIcError> {
        let chip = &mut self.chip;
        match panic::catch_unwind(AssertUnwindSafe(|| chip.create(creator, lines))) {
            Ok(result) => result,
            Err(payload) => Err(InvalidIcError::InvalidConfig(
                ChipFault::from_panic(payload).to_string(),
            )),
        }
    }

    /// Runs the chip's `load`; on success the instance becomes active.
    pub fn load(&mut self, lines: &SignLines) -> ChipResult<()> {
        let chip = &mut self.chip;
        guarded(|| chip.load(lines))?;
        self.lifecycle = Lifecycle::Loaded;
        Ok(())
    }

    pub fn trigger(&mut self, time: u64) -> ChipResult<()> {
        let mut io = ChipIo::new(self.pin_set.as_ref(), &mut self.pins, time);
        let chip = &mut self.chip;
        guarded(|| chip.trigger(&mut io))
    }

    pub fn think(&mut self, time: u64) -> ChipResult<()> {
        let mut io = ChipIo::new(self.pin_set.as_ref(), &mut self.pins, time);
        let chip = &mut self.chip;
        guarded(|| chip.think(&mut io))
    }

    /// Whether the chip wants `think` calls. Panics count as `false`.
    pub fn can_think(&self) -> bool {
        let chip = &self.chip;
        panic::catch_unwind(AssertUnwindSafe(|| chip.can_think())).unwrap_or(false)
    }

    /// Updates the cached input level; `true` only on an edge.
    pub fn update_input(&mut self, pin: usize, level: bool) -> bool {
        self.pin_set.set_input(pin, &mut self.pins, level)
    }

    /// Reads every input from the world without triggering.
    pub fn sample_inputs(&mut self, world: &dyn World) {
        for pin in 0..self.pin_set.input_count() {
            if let Some(direction) = self.direction_for_pin(Pin::Input(pin)) {
                let level = world.is_powered(self.placement.location.relative(direction));
                self.pin_set.set_input(pin, &mut self.pins, level);
            }
        }
    }

    /// Writes changed outputs to the world and returns them.
    pub fn flush_outputs(&mut self, world: &mut dyn World) -> Vec<(usize, bool)> {
        let changed = self.pins.take_changed_outputs();
        for (pin, level) in &changed {
            if let Some(direction) = self.direction_for_pin(Pin::Output(*pin)) {
                world.set_powered(self.placement.location.relative(direction), *level);
            }
        }
        changed
    }

    pub fn pin_for_direction(&self, direction: Direction) -> Option<Pin> {
        self.pin_set.pin_for_direction(self.placement.facing, direction)
    }

    pub fn direction_for_pin(&self, pin: Pin) -> Option<Direction> {
        self.pin_set.direction_for_pin(self.placement.facing, pin)
    }

    pub fn definition(&self) -> &Arc<ChipDefinition> {
        &self.definition
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }

    pub fn pin_set(&self) -> &dyn PinSet {
        self.pin_set.as_ref()
    }

    pub fn pins(&self) -> &PinLevels {
        &self.pins
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn is_active(&self) -> bool {
        self.lifecycle == Lifecycle::Loaded
    }
}

/// Registro anexado a uma coordenada
#[derive(Debug, Default)]
pub struct AttachedRecord {
    instance: Option<IcInstance>,
    generation: u64,
    broken_reported: bool,
}

impl AttachedRecord {
    /// Registro não inicializado
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_instance(instance: IcInstance) -> Self {
        Self {
            instance: Some(instance),
            ..Self::default()
        }
    }

    /// Model id of the stored chip, if any.
    pub fn stored_type(&self) -> Option<&str> {
        self.instance.as_ref().map(|ic| ic.definition().model_id())
    }

    pub fn instance(&self) -> Option<&IcInstance> {
        self.instance.as_ref()
    }

    pub fn instance_mut(&mut self) -> Option<&mut IcInstance> {
        self.instance.as_mut()
    }

    pub fn is_initialized(&self) -> bool {
        self.instance.is_some()
    }

    /// Creation stamp handed out by [`AttachedDataStore::attach`]; 0 for
    /// records inserted any other way.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Compares the stored chip against the one re-derived from the marker.
    ///
    /// A marker that now faces elsewhere is broken too: the cached pin
    /// mapping belongs to the old facing.
    pub fn check_type(
        &self,
        expected: &ChipDefinition,
        facing: Direction,
        location: Location,
    ) -> OrchestrationResult<()> {
        let Some(ic) = &self.instance else {
            return Err(OrchestrationError::BrokenChip {
                location,
                expected: expected.shorthand_id().to_string(),
                found: None,
            });
        };

        if ic.definition().model_id() != expected.model_id() {
            return Err(OrchestrationError::BrokenChip {
                location,
                expected: expected.shorthand_id().to_string(),
                found: Some(ic.definition().shorthand_id().to_string()),
            });
        }

        let stored = ic.placement().facing;
        if stored != facing {
            return Err(OrchestrationError::BrokenChip {
                location,
                expected: format!("{} facing {}", expected.shorthand_id(), facing),
                found: Some(format!("{} facing {}", ic.definition().shorthand_id(), stored)),
            });
        }
        Ok(())
    }

    /// Flags the record as broken; `true` only the first time, so the
    /// diagnostic is emitted once per broken spell.
    pub fn mark_broken(&mut self) -> bool {
        !std::mem::replace(&mut self.broken_reported, true)
    }

    pub fn clear_broken(&mut self) {
        self.broken_reported = false;
    }
}

/// Coordenada → registro
#[derive(Debug, Default)]
pub struct AttachedDataStore {
    records: HashMap<Location, AttachedRecord>,
    generations: u64,
}

impl AttachedDataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, location: Location) -> Option<&AttachedRecord> {
        self.records.get(&location)
    }

    pub fn get_mut(&mut self, location: Location) -> Option<&mut AttachedRecord> {
        self.records.get_mut(&location)
    }

    /// Record at `location`, created uninitialised on first access.
    pub fn get_or_insert(&mut self, location: Location) -> &mut AttachedRecord {
        self.records.entry(location).or_default()
    }

    /// Stores `instance` under a fresh generation and returns it. Tasks
    /// scheduled for an older generation no longer match the record.
    pub fn attach(&mut self, location: Location, instance: IcInstance) -> u64 {
        self.generations += 1;
        let record = AttachedRecord {
            generation: self.generations,
            ..AttachedRecord::with_instance(instance)
        };
        self.records.insert(location, record);
        self.generations
    }

    /// Replaces the record, returning the previous one.
    pub fn insert(&mut self, location: Location, record: AttachedRecord) -> Option<AttachedRecord> {
        self.records.insert(location, record)
    }

    pub fn remove(&mut self, location: Location) -> Option<AttachedRecord> {
        self.records.remove(&location)
    }

    pub fn contains(&self, location: Location) -> bool {
        self.records.contains_key(&location)
    }

    pub fn locations(&self) -> impl Iterator<Item = Location> + '_ {
        self.records.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ic_core::{MemoryWorld, MessageLog, PinsSiso};
    use ic_logic::builtin_definitions;

    fn definition(shorthand: &str) -> Arc<ChipDefinition> {
        builtin_definitions()
            .into_iter()
            .find(|def| def.shorthand_id() == shorthand)
            .map(Arc::new)
            .unwrap()
    }

    fn instance(shorthand: &str) -> IcInstance {
        let placement = Placement::new(Location::new(0, 64, 0), Direction::North);
        IcInstance::new(definition(shorthand), placement, Arc::new(PinsSiso))
    }

    #[derive(Debug)]
    struct Exploding;

    impl Chip for Exploding {
        fn create(&mut self, _creator: &mut dyn Creator, _lines: &mut SignLines) -> Result<(), InvalidIcError> {
            panic!("bad config");
        }

        fn trigger(&mut self, _io: &mut ChipIo<'_>) -> ChipResult<()> {
            panic!("boom");
        }
    }

    #[test]
    fn test_instance_lifecycle() {
        let mut ic = instance("CLOCK");
        assert_eq!(ic.lifecycle(), Lifecycle::Created);
        assert!(!ic.is_active());

        let mut lines = SignLines::new(["CLOCK", "CLOCK", "2", ""]);
        ic.create(&mut MessageLog::new("tester"), &mut lines).unwrap();
        assert_eq!(lines.get(2), "5");

        ic.load(&lines).unwrap();
        assert!(ic.is_active());
        assert!(ic.can_think());
    }

    #[test]
    fn test_panics_become_faults() {
        let def = Arc::new(ChipDefinition::new("MC9999", "BOOM", "Boom", "", "SISO", |_| {
            Box::new(Exploding)
        }));
        let placement = Placement::new(Location::new(0, 0, 0), Direction::East);
        let mut ic = IcInstance::new(def, placement, Arc::new(PinsSiso));

        let err = ic
            .create(&mut MessageLog::new("tester"), &mut SignLines::default())
            .unwrap_err();
        assert!(matches!(err, InvalidIcError::InvalidConfig(_)));

        let fault = ic.trigger(0).unwrap_err();
        assert_eq!(fault, ChipFault::Panicked("boom".into()));
    }

    #[test]
    fn test_sample_and_flush() {
        let mut world = MemoryWorld::new();
        let spot = Location::new(0, 64, 0);
        world.set_powered(spot.relative(Direction::North), true);

        let mut ic = instance("INVERTER");
        ic.sample_inputs(&world);
        assert!(ic.pins().input(0));
        // Sampling never counts as an edge.
        assert!(!ic.update_input(0, true));

        ic.trigger(0).unwrap();
        assert!(ic.flush_outputs(&mut world).is_empty());

        assert!(ic.update_input(0, false));
        ic.trigger(0).unwrap();
        assert_eq!(ic.flush_outputs(&mut world), vec![(0, true)]);
        assert!(world.is_powered(spot.relative(Direction::South)));
    }

    #[test]
    fn test_check_type() {
        let spot = Location::new(0, 64, 0);
        let record = AttachedRecord::with_instance(instance("CLOCK"));
        assert_eq!(record.stored_type(), Some("MC1421"));
        assert!(record.check_type(&definition("CLOCK"), Direction::North, spot).is_ok());

        let err = record.check_type(&definition("AND"), Direction::North, spot).unwrap_err();
        assert_eq!(
            err,
            OrchestrationError::BrokenChip {
                location: spot,
                expected: "AND".into(),
                found: Some("CLOCK".into()),
            }
        );
    }

    #[test]
    fn test_turned_marker_is_broken() {
        let spot = Location::new(0, 64, 0);
        let record = AttachedRecord::with_instance(instance("REPEATER"));
        let err = record.check_type(&definition("REPEATER"), Direction::East, spot).unwrap_err();
        assert_eq!(
            err,
            OrchestrationError::BrokenChip {
                location: spot,
                expected: "REPEATER facing east".into(),
                found: Some("REPEATER facing north".into()),
            }
        );
    }

    #[test]
    fn test_broken_reported_once() {
        let mut record = AttachedRecord::empty();
        assert!(record.mark_broken());
        assert!(!record.mark_broken());
        record.clear_broken();
        assert!(record.mark_broken());
    }

    #[test]
    fn test_uninitialized_record_is_broken() {
        let record = AttachedRecord::empty();
        assert!(!record.is_initialized());
        let err = record
            .check_type(&definition("CLOCK"), Direction::North, Location::new(0, 0, 0))
            .unwrap_err();
        assert!(matches!(err, OrchestrationError::BrokenChip { found: None, .. }));
    }

    #[test]
    fn test_store_lazy_records() {
        let mut store = AttachedDataStore::new();
        let spot = Location::new(4, 5, 6);
        assert!(store.get(spot).is_none());

        assert!(!store.get_or_insert(spot).is_initialized());
        assert_eq!(store.len(), 1);

        store.insert(spot, AttachedRecord::with_instance(instance("REPEATER")));
        assert!(store.get(spot).unwrap().is_initialized());
        assert_eq!(store.get(spot).unwrap().generation(), 0);
        assert!(store.remove(spot).is_some());
        assert!(store.is_empty());
    }

    #[test]
    fn test_attach_stamps_generations() {
        let mut store = AttachedDataStore::new();
        let spot = Location::new(4, 5, 6);
        let first = store.attach(spot, instance("REPEATER"));
        let second = store.attach(spot, instance("INVERTER"));
        assert!(second > first);
        assert_eq!(store.get(spot).unwrap().generation(), second);
        assert_eq!(store.len(), 1);
    }
}
