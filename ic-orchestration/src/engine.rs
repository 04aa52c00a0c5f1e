//! # ⚙️ Engine — contexto único do motor
//!
//! Owns every piece of process-wide state (registries, attached data,
//! scheduler, deferred queue, event hub) and exposes the entry points a host
//! calls: `create_ic` when a marker is written, `notify_neighbors` when a
//! neighbour's power changes, `tick` once per simulation tick, and
//! `shutdown` when the host stops.
//!
//! ```text
//! create_ic ──► IcInstance::create ──► DeferredQueue ──(tick + delay)──► load
//!                                                                        │
//!                              SelfTriggerScheduler ◄── can_think() ◄────┘
//!                                       │
//! tick ──► deferred loads ──► think pass ──► flush outputs ──► World
//! ```

use std::sync::{Arc, Mutex};

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crossbeam_channel::Receiver;
use ic_core::marker::{SHORTHAND_LINE, TYPE_LINE};
use ic_core::prelude::*;
use ic_core::TypeLine;

use crate::config::EngineConfig;
use crate::deferred::{DeferredQueue, DeferredTask};
use crate::error::{OrchestrationError, OrchestrationResult};
use crate::events::{EventHub, IcEvent};
use crate::registry::{ChipRegistry, PinSetRegistry};
use crate::scheduler::{PassReport, SchedulerStats, SelfTriggerScheduler, ThinkOutcome};
use crate::store::{AttachedDataStore, AttachedRecord, IcInstance};

/// Resumo de um tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TickReport {
    /// Número do tick
    pub tick: u64,
    /// Deferred loads that bound an instance
    pub loaded: usize,
    /// Self-trigger pass
    pub pass: PassReport,
}

/// Estatísticas do motor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineStats {
    pub tick: u64,
    pub running: bool,
    pub chips: usize,
    pub records: usize,
    pub pending_loads: usize,
    pub scheduler: SchedulerStats,
    pub events_published: u64,
}

/// Definition named by a marker and the marker's facing, if the marker can
/// host a chip at all.
pub(crate) fn marker_binding(chips: &ChipRegistry, marker: &Marker) -> Option<(Arc<ChipDefinition>, Direction)> {
    if !marker.is_valid_site() {
        return None;
    }
    chips
        .lookup(marker.lines.type_line().chip)
        .map(|definition| (definition, marker.facing))
}

fn report_broken(events: &mut EventHub, error: &OrchestrationError) {
    if let OrchestrationError::BrokenChip {
        location,
        expected,
        found,
    } = error
    {
        warn!(
            location = %location,
            expected = %expected,
            found = found.as_deref().unwrap_or("nothing"),
            "Found broken IC at {}", location
        );
        events.publish(IcEvent::Broken {
            location: *location,
            expected: expected.clone(),
            found: found.clone(),
        });
    }
}

/// Type check that reports a broken record once until it resolves again.
pub(crate) fn check_record(
    record: &mut AttachedRecord,
    expected: &ChipDefinition,
    facing: Direction,
    location: Location,
    events: &mut EventHub,
) -> OrchestrationResult<()> {
    match record.check_type(expected, facing, location) {
        Ok(()) => {
            record.clear_broken();
            Ok(())
        }
        Err(err) => {
            if record.mark_broken() {
                report_broken(events, &err);
            }
            Err(err)
        }
    }
}

pub(crate) fn report_fault(events: &mut EventHub, location: Location, chip: &str, fault: &ChipFault) {
    error!(location = %location, chip = %chip, "{}", fault);
    events.publish(IcEvent::Fault {
        location,
        chip: chip.to_string(),
        message: fault.to_string(),
    });
}

pub(crate) fn publish_outputs(events: &mut EventHub, location: Location, changed: Vec<(usize, bool)>) {
    for (pin, level) in changed {
        events.publish(IcEvent::OutputChanged { location, pin, level });
    }
}

/// One `think` delivery from the scheduler pass.
fn think_at(
    chips: &ChipRegistry,
    store: &mut AttachedDataStore,
    events: &mut EventHub,
    world: &mut dyn World,
    location: Location,
) -> ThinkOutcome {
    let Some((expected, facing)) = world.marker(location).and_then(|marker| marker_binding(chips, marker)) else {
        if store.remove(location).is_some() {
            events.publish(IcEvent::Destroyed { location });
        }
        debug!(location = %location, "placement gone, dropping self-triggering IC");
        return ThinkOutcome::Remove;
    };

    let Some(record) = store.get_mut(location) else {
        return ThinkOutcome::Remove;
    };
    if check_record(record, &expected, facing, location, events).is_err() {
        return ThinkOutcome::Skipped;
    }
    let Some(instance) = record.instance_mut() else {
        return ThinkOutcome::Skipped;
    };
    if !instance.is_active() {
        return ThinkOutcome::Skipped;
    }

    match instance.think(world.time()) {
        Ok(()) => {
            let changed = instance.flush_outputs(world);
            publish_outputs(events, location, changed);
            ThinkOutcome::Thought
        }
        Err(fault) => {
            report_fault(events, location, expected.shorthand_id(), &fault);
            ThinkOutcome::Faulted
        }
    }
}

/// Motor de ICs
#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    pub(crate) chips: ChipRegistry,
    pin_sets: PinSetRegistry,
    pub(crate) store: AttachedDataStore,
    scheduler: SelfTriggerScheduler,
    deferred: DeferredQueue,
    pub(crate) events: EventHub,
    tick: u64,
    running: bool,
}

impl Engine {
    /// Cria motor com os chips embutidos
    pub fn new(config: EngineConfig) -> OrchestrationResult<Self> {
        config.validate()?;
        let chips = ChipRegistry::with_builtins_except(&config.disabled_chips);
        Self::with_registry(config, chips)
    }

    /// Cria motor com um registro próprio
    pub fn with_registry(config: EngineConfig, chips: ChipRegistry) -> OrchestrationResult<Self> {
        config.validate()?;
        info!(
            chips = chips.len(),
            self_triggering = config.self_triggering,
            "IC engine created"
        );
        Ok(Self {
            events: EventHub::new(config.event_capacity),
            config,
            chips,
            pin_sets: PinSetRegistry::with_defaults(),
            store: AttachedDataStore::new(),
            scheduler: SelfTriggerScheduler::new(),
            deferred: DeferredQueue::new(),
            tick: 0,
            running: false,
        })
    }

    pub fn start(&mut self) -> OrchestrationResult<()> {
        if self.running {
            return Err(OrchestrationError::AlreadyRunning);
        }
        self.running = true;
        info!(tick = self.tick, "IC engine started");
        Ok(())
    }

    /// Drops every instance, registration and pending load.
    ///
    /// Calling it again is a no-op. Returns how many scheduler entries were
    /// dropped.
    pub fn shutdown(&mut self) -> usize {
        let dropped = self.scheduler.unload();
        self.deferred.clear();
        self.store.clear();
        if self.running {
            self.running = false;
            info!(tick = self.tick, dropped, "IC engine stopped");
        }
        dropped
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &ChipRegistry {
        &self.chips
    }

    pub fn registry_mut(&mut self) -> &mut ChipRegistry {
        &mut self.chips
    }

    pub fn pin_sets(&self) -> &PinSetRegistry {
        &self.pin_sets
    }

    pub fn pin_sets_mut(&mut self) -> &mut PinSetRegistry {
        &mut self.pin_sets
    }

    pub fn store(&self) -> &AttachedDataStore {
        &self.store
    }

    pub fn scheduler(&self) -> &SelfTriggerScheduler {
        &self.scheduler
    }

    pub fn pending_loads(&self) -> usize {
        self.deferred.len()
    }

    /// Instance bound at `location`, without any type check.
    pub fn instance(&self, location: Location) -> Option<&IcInstance> {
        self.store.get(location).and_then(AttachedRecord::instance)
    }

    /// Assina eventos do motor
    pub fn subscribe(&mut self) -> Receiver<IcEvent> {
        self.events.subscribe()
    }

    pub fn stats(&self) -> EngineStats {
        EngineStats {
            tick: self.tick,
            running: self.running,
            chips: self.chips.len(),
            records: self.store.len(),
            pending_loads: self.deferred.len(),
            scheduler: self.scheduler.stats(),
            events_published: self.events.published(),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // CRIAÇÃO
    // ═══════════════════════════════════════════════════════════════════════════

    /// Creates an IC for a marker whose text is being written.
    ///
    /// `lines` is the pending marker text. On success it is rewritten to the
    /// canonical form (shorthand on line 0, upper-cased type on line 1, chip
    /// configuration as normalised by the chip) and the load is deferred. On
    /// failure nothing changes and the creator is told why.
    pub fn create_ic(
        &mut self,
        world: &dyn World,
        location: Location,
        lines: &mut SignLines,
        creator: &mut dyn Creator,
    ) -> Result<Arc<ChipDefinition>, InvalidIcError> {
        match self.try_create(world, location, lines, creator) {
            Ok(definition) => {
                creator.send_message(&format!("Created {}", definition.name()));
                Ok(definition)
            }
            Err(err) => {
                creator.send_message(&format!("Failed to create IC. {}", err));
                Err(err)
            }
        }
    }

    fn try_create(
        &mut self,
        world: &dyn World,
        location: Location,
        lines: &mut SignLines,
        creator: &mut dyn Creator,
    ) -> Result<Arc<ChipDefinition>, InvalidIcError> {
        let type_text = lines.get(TYPE_LINE).to_string();
        let type_line = TypeLine::parse(&type_text);
        let definition = self
            .chips
            .lookup(type_line.chip)
            .ok_or_else(|| InvalidIcError::UnknownType(type_line.chip.to_string()))?;

        let facing = match world.marker(location) {
            Some(marker) if marker.is_valid_site() => marker.facing,
            Some(_) => {
                return Err(InvalidIcError::InvalidSite(format!(
                    "marker at {} is not on a wall",
                    location
                )));
            }
            None => return Err(InvalidIcError::InvalidSite(format!("no marker at {}", location))),
        };

        let family = type_line.family.unwrap_or(definition.default_family());
        let pin_set = self
            .pin_sets
            .get(family)
            .ok_or_else(|| InvalidIcError::UnknownPinSet(family.to_uppercase()))?;

        let mut staged = lines.clone();
        staged.set(SHORTHAND_LINE, definition.shorthand_id().to_uppercase());
        staged.set(TYPE_LINE, type_text.trim().to_uppercase());

        let mut instance = IcInstance::new(Arc::clone(&definition), Placement::new(location, facing), pin_set);
        instance.create(creator, &mut staged)?;
        instance.sample_inputs(world);

        self.destroy(location);
        let generation = self.store.attach(location, instance);
        let due = self.tick + self.config.load_delay_ticks;
        self.deferred.schedule(due, DeferredTask::Load { location, generation });
        *lines = staged;

        info!(
            location = %location,
            chip = %definition.shorthand_id(),
            creator = creator.name(),
            load_at = due,
            "IC created"
        );
        self.events.publish(IcEvent::Created {
            location,
            chip: definition.shorthand_id().to_string(),
        });
        Ok(definition)
    }

    /// Rebuilds the instance at `location` from the marker text already in
    /// the world, without calling `create`. Used after a host restart.
    pub fn restore(&mut self, world: &dyn World, location: Location) -> OrchestrationResult<Arc<ChipDefinition>> {
        let marker = world
            .marker(location)
            .ok_or_else(|| InvalidIcError::InvalidSite(format!("no marker at {}", location)))?;
        if !marker.is_valid_site() {
            return Err(InvalidIcError::InvalidSite(format!("marker at {} is not on a wall", location)).into());
        }

        let type_line = marker.lines.type_line();
        let definition = self
            .chips
            .lookup(type_line.chip)
            .ok_or_else(|| InvalidIcError::UnknownType(type_line.chip.to_string()))?;
        let family = type_line.family.unwrap_or(definition.default_family());
        let pin_set = self
            .pin_sets
            .get(family)
            .ok_or_else(|| InvalidIcError::UnknownPinSet(family.to_uppercase()))?;

        let mut instance = IcInstance::new(
            Arc::clone(&definition),
            Placement::new(location, marker.facing),
            pin_set,
        );
        instance.sample_inputs(world);

        self.destroy(location);
        self.store.attach(location, instance);
        self.bind(location, &marker.lines)
            .map_err(|fault| OrchestrationError::ChipFault { location, fault })?;
        Ok(definition)
    }

    /// Removes the record at `location` and its scheduler entry.
    pub fn destroy(&mut self, location: Location) -> bool {
        let unregistered = self.scheduler.unregister(location);
        match self.store.remove(location) {
            Some(_) => {
                debug!(location = %location, "IC destroyed");
                self.events.publish(IcEvent::Destroyed { location });
                true
            }
            None => unregistered,
        }
    }

    /// Drops the record at `location` once its marker no longer hosts an IC.
    ///
    /// An instance still waiting for its deferred load is kept while a marker
    /// exists, since the host may not have written the final text yet; the
    /// load decides. Returns whether anything was destroyed.
    pub(crate) fn discard_stale(&mut self, marker_present: bool, location: Location) -> bool {
        let pending = self.instance(location).is_some_and(|ic| !ic.is_active());
        if marker_present && pending {
            return false;
        }
        let destroyed = self.destroy(location);
        if destroyed {
            debug!(location = %location, "placement no longer hosts an IC");
        }
        destroyed
    }

    /// Resolves the record at `location` against its marker.
    ///
    /// `Ok(None)` when the location hosts no IC marker; any record left there
    /// is destroyed. A record is created on first access; an uninitialised or
    /// mismatching record is reported as [`OrchestrationError::BrokenChip`].
    pub fn resolve(&mut self, world: &dyn World, location: Location) -> OrchestrationResult<Option<&IcInstance>> {
        let marker = world.marker(location);
        let Some((expected, facing)) = marker.and_then(|marker| marker_binding(&self.chips, marker)) else {
            self.discard_stale(marker.is_some(), location);
            return Ok(None);
        };

        let record = self.store.get_or_insert(location);
        check_record(record, &expected, facing, location, &mut self.events)?;
        Ok(record.instance())
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // TICK
    // ═══════════════════════════════════════════════════════════════════════════

    /// Advances one simulation tick: due loads first, then the think pass.
    pub fn tick(&mut self, world: &mut dyn World) -> OrchestrationResult<TickReport> {
        if !self.running {
            return Err(OrchestrationError::NotRunning);
        }
        self.tick += 1;
        let mut report = TickReport {
            tick: self.tick,
            ..TickReport::default()
        };

        for task in self.deferred.take_due(self.tick) {
            match task {
                DeferredTask::Load { location, generation } => {
                    if self.run_deferred_load(world, location, generation) {
                        report.loaded += 1;
                    }
                }
            }
        }

        if self.config.self_triggering {
            let Self {
                chips,
                store,
                scheduler,
                events,
                ..
            } = self;
            report.pass = scheduler.tick(|location| think_at(chips, store, events, world, location));
        }
        Ok(report)
    }

    /// Runs `ticks` ticks.
    pub fn run_ticks(&mut self, world: &mut dyn World, ticks: u64) -> OrchestrationResult<Vec<TickReport>> {
        (0..ticks).map(|_| self.tick(world)).collect()
    }

    fn run_deferred_load(&mut self, world: &dyn World, location: Location, generation: u64) -> bool {
        let Some(record) = self.store.get(location) else {
            debug!(location = %location, "deferred load skipped: placement vanished");
            return false;
        };
        if record.generation() != generation {
            debug!(location = %location, generation, "deferred load skipped: IC was re-created");
            return false;
        }
        if record.instance().is_some_and(IcInstance::is_active) {
            debug!(location = %location, "deferred load skipped: already loaded");
            return false;
        }

        let Some(marker) = world.marker(location) else {
            debug!(location = %location, "deferred load skipped: marker removed");
            self.destroy(location);
            return false;
        };
        let Some((expected, facing)) = marker_binding(&self.chips, marker) else {
            debug!(location = %location, "deferred load skipped: marker no longer names an IC");
            self.destroy(location);
            return false;
        };
        let Some(record) = self.store.get_mut(location) else {
            return false;
        };
        if check_record(record, &expected, facing, location, &mut self.events).is_err() {
            return false;
        }

        self.bind(location, &marker.lines).is_ok()
    }

    /// Loads the instance at `location` and registers it when it thinks.
    fn bind(&mut self, location: Location, lines: &SignLines) -> ChipResult<()> {
        let Some(instance) = self.store.get_mut(location).and_then(AttachedRecord::instance_mut) else {
            return Ok(());
        };
        let definition = Arc::clone(instance.definition());

        if let Err(fault) = instance.load(lines) {
            report_fault(&mut self.events, location, definition.shorthand_id(), &fault);
            return Err(fault);
        }

        let thinks = self.config.self_triggering && definition.is_self_triggering() && instance.can_think();
        if thinks && !self.scheduler.contains(location) {
            if let Err(err) = self.scheduler.register(location) {
                warn!(location = %location, "{}", err);
            }
        }

        debug!(
            location = %location,
            chip = %definition.shorthand_id(),
            self_triggering = thinks,
            "IC loaded"
        );
        self.events.publish(IcEvent::Loaded {
            location,
            chip: definition.shorthand_id().to_string(),
            self_triggering: thinks,
        });
        Ok(())
    }
}

/// Handle compartilhado: serializa todo acesso ao motor
#[derive(Debug, Clone)]
pub struct SharedEngine {
    inner: Arc<Mutex<Engine>>,
}

impl SharedEngine {
    pub fn new(engine: Engine) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    /// Runs `f` inside the engine's critical section.
    pub fn with<R>(&self, f: impl FnOnce(&mut Engine) -> R) -> OrchestrationResult<R> {
        let mut engine = self.inner.lock()?;
        Ok(f(&mut engine))
    }

    pub fn tick(&self, world: &mut dyn World) -> OrchestrationResult<TickReport> {
        self.with(|engine| engine.tick(world))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ic_core::{MemoryWorld, MessageLog};

    fn started() -> Engine {
        let mut engine = Engine::new(EngineConfig::default()).unwrap();
        engine.start().unwrap();
        engine
    }

    fn place(world: &mut MemoryWorld, spot: Location, lines: [&str; 4]) -> SignLines {
        world.place_marker(spot, Marker::wall(Direction::North, lines));
        world.marker(spot).unwrap().lines.clone()
    }

    #[test]
    fn test_start_twice() {
        let mut engine = started();
        assert_eq!(engine.start(), Err(OrchestrationError::AlreadyRunning));
    }

    #[test]
    fn test_tick_requires_running() {
        let mut engine = Engine::new(EngineConfig::default()).unwrap();
        let mut world = MemoryWorld::new();
        assert_eq!(engine.tick(&mut world), Err(OrchestrationError::NotRunning));
    }

    #[test]
    fn test_create_rewrites_lines() {
        let mut engine = started();
        let mut world = MemoryWorld::new();
        let spot = Location::new(0, 64, 0);
        let mut lines = place(&mut world, spot, ["", "clock", "2", ""]);
        let mut log = MessageLog::new("alex");

        let def = engine.create_ic(&world, spot, &mut lines, &mut log).unwrap();
        assert_eq!(def.model_id(), "MC1421");
        assert_eq!(lines.get(0), "CLOCK");
        assert_eq!(lines.get(1), "CLOCK");
        assert_eq!(lines.get(2), "5");
        assert_eq!(log.last(), Some("Created Clock"));
        assert_eq!(engine.pending_loads(), 1);
    }

    #[test]
    fn test_create_unknown_type() {
        let mut engine = started();
        let mut world = MemoryWorld::new();
        let spot = Location::new(0, 64, 0);
        let mut lines = place(&mut world, spot, ["", "flux capacitor", "", ""]);
        let before = lines.clone();
        let mut log = MessageLog::new("alex");

        let err = engine.create_ic(&world, spot, &mut lines, &mut log).unwrap_err();
        assert_eq!(err, InvalidIcError::UnknownType("flux capacitor".into()));
        assert_eq!(log.last(), Some("Failed to create IC. Invalid IC type: flux capacitor"));
        assert_eq!(lines, before);
        assert!(engine.store().is_empty());
        assert_eq!(engine.pending_loads(), 0);
    }

    #[test]
    fn test_create_on_standing_marker() {
        let mut engine = started();
        let mut world = MemoryWorld::new();
        let spot = Location::new(0, 64, 0);
        world.place_marker(spot, Marker::standing(Direction::North, ["", "and", "", ""]));
        let mut lines = world.marker(spot).unwrap().lines.clone();

        let err = engine
            .create_ic(&world, spot, &mut lines, &mut MessageLog::new("alex"))
            .unwrap_err();
        assert!(matches!(err, InvalidIcError::InvalidSite(_)));
        assert!(engine.store().is_empty());
    }

    #[test]
    fn test_family_override() {
        let mut engine = started();
        let mut world = MemoryWorld::new();
        let spot = Location::new(0, 64, 0);

        let mut lines = place(&mut world, spot, ["", "and:siso", "", ""]);
        engine
            .create_ic(&world, spot, &mut lines, &mut MessageLog::new("alex"))
            .unwrap();
        assert_eq!(lines.get(1), "AND:SISO");
        assert_eq!(engine.instance(spot).unwrap().pin_set().name(), "SISO");

        let mut lines = place(&mut world, spot, ["", "and:9ISO", "", ""]);
        let err = engine
            .create_ic(&world, spot, &mut lines, &mut MessageLog::new("alex"))
            .unwrap_err();
        assert_eq!(err, InvalidIcError::UnknownPinSet("9ISO".into()));
    }

    #[test]
    fn test_self_triggering_disabled() {
        let config = EngineConfig {
            self_triggering: false,
            ..EngineConfig::default()
        };
        let mut engine = Engine::new(config).unwrap();
        engine.start().unwrap();
        let mut world = MemoryWorld::new();
        let spot = Location::new(0, 64, 0);
        let mut lines = place(&mut world, spot, ["", "clock", "5", ""]);
        engine
            .create_ic(&world, spot, &mut lines, &mut MessageLog::new("alex"))
            .unwrap();
        world.set_lines(spot, lines);

        engine.run_ticks(&mut world, 10).unwrap();
        assert!(engine.instance(spot).unwrap().is_active());
        assert!(engine.scheduler().is_empty());
        assert_eq!(world.powered_count(), 0);
    }

    #[test]
    fn test_disabled_chip_is_unknown() {
        let config = EngineConfig {
            disabled_chips: vec!["XOR".into()],
            ..EngineConfig::default()
        };
        let engine = Engine::new(config).unwrap();
        assert!(engine.registry().lookup("xor").is_none());
        assert_eq!(engine.stats().chips, 6);
    }

    #[test]
    fn test_shared_engine() {
        let shared = SharedEngine::new(started());
        let mut world = MemoryWorld::new();
        let report = shared.tick(&mut world).unwrap();
        assert_eq!(report.tick, 1);
        assert_eq!(shared.with(|engine| engine.current_tick()).unwrap(), 1);
    }

    #[test]
    fn test_shared_engine_across_threads() {
        let shared = SharedEngine::new(started());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let shared = shared.clone();
                std::thread::spawn(move || {
                    let mut world = MemoryWorld::new();
                    shared.tick(&mut world).map(|report| report.tick)
                })
            })
            .collect();

        let mut ticks: Vec<u64> = handles
            .into_iter()
            .map(|handle| handle.join().unwrap().unwrap())
            .collect();
        ticks.sort_unstable();
        assert_eq!(ticks, vec![1, 2, 3, 4]);
        assert_eq!(shared.with(|engine| engine.current_tick()).unwrap(), 4);
    }
}
