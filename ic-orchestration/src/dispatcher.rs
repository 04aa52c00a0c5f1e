//! Despacho de mudanças de sinal
//!
//! A neighbour of a marker changed power. Each changed face that maps to an
//! input pin is compared against the cached level; every real edge updates
//! the cache and triggers the chip once, followed by an output flush.

use serde::Serialize;

use ic_core::prelude::*;

use crate::engine::{Engine, check_record, marker_binding, publish_outputs, report_fault};
use crate::error::{OrchestrationError, OrchestrationResult};

/// Resultado do despacho
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DispatchOutcome {
    /// No wall marker naming a registered chip
    NotAnIc,
    /// Stored type disagrees with the marker; nothing delivered
    Broken,
    /// Created but not loaded yet
    Pending,
    /// `pins` trigger calls delivered, `faults` of them faulted
    Triggered { pins: usize, faults: usize },
}

impl Engine {
    /// Handles a power change on the `changed` faces around `location`.
    pub fn notify_neighbors(
        &mut self,
        world: &mut dyn World,
        location: Location,
        changed: &[Direction],
    ) -> OrchestrationResult<DispatchOutcome> {
        if !self.is_running() {
            return Err(OrchestrationError::NotRunning);
        }

        let marker = world.marker(location);
        let Some((expected, facing)) = marker.and_then(|marker| marker_binding(&self.chips, marker)) else {
            self.discard_stale(marker.is_some(), location);
            return Ok(DispatchOutcome::NotAnIc);
        };

        let record = self.store.get_or_insert(location);
        if check_record(record, &expected, facing, location, &mut self.events).is_err() {
            return Ok(DispatchOutcome::Broken);
        }
        let Some(instance) = record.instance_mut() else {
            return Ok(DispatchOutcome::Broken);
        };
        if !instance.is_active() {
            return Ok(DispatchOutcome::Pending);
        }

        let time = world.time();
        let mut pins = 0;
        let mut faults = 0;
        for direction in changed {
            let Some(Pin::Input(pin)) = instance.pin_for_direction(*direction) else {
                continue;
            };
            let level = world.is_powered(location.relative(*direction));
            if !instance.update_input(pin, level) {
                continue;
            }

            pins += 1;
            if let Err(fault) = instance.trigger(time) {
                faults += 1;
                report_fault(&mut self.events, location, expected.shorthand_id(), &fault);
            }
            let outputs = instance.flush_outputs(world);
            publish_outputs(&mut self.events, location, outputs);
        }

        Ok(DispatchOutcome::Triggered { pins, faults })
    }

    /// Same as [`Engine::notify_neighbors`] with every face changed.
    pub fn notify(&mut self, world: &mut dyn World, location: Location) -> OrchestrationResult<DispatchOutcome> {
        self.notify_neighbors(world, location, &Direction::ALL)
    }
}
