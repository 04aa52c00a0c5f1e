//! Fronteira com o mundo hospedeiro
//!
//! The engine only asks the world for redstone power of neighbouring blocks,
//! to set that power, and to locate markers. Everything else (materials,
//! physics, persistence) stays on the host side.

use std::collections::{HashMap, HashSet};

use crate::marker::{Marker, SignLines};
use crate::types::Location;

/// Host world collaborator.
pub trait World {
    /// Whether the block at `location` is powered.
    fn is_powered(&self, location: Location) -> bool;

    /// Drives the power of the block at `location`.
    fn set_powered(&mut self, location: Location, powered: bool);

    /// Marker at `location`, if any.
    fn marker(&self, location: Location) -> Option<&Marker>;

    /// World time in ticks.
    fn time(&self) -> u64 {
        0
    }
}

/// Whoever placed a marker; receives creation feedback.
pub trait Creator {
    fn name(&self) -> &str;

    fn send_message(&mut self, message: &str);
}

/// Creator that keeps every message it receives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageLog {
    name: String,
    messages: Vec<String>,
}

impl MessageLog {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            messages: Vec::new(),
        }
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn last(&self) -> Option<&str> {
        self.messages.last().map(String::as_str)
    }
}

impl Creator for MessageLog {
    fn name(&self) -> &str {
        &self.name
    }

    fn send_message(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }
}

/// In-memory world: a set of powered blocks plus markers.
///
/// Good enough for simulations driven from the CLI, benches and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryWorld {
    powered: HashSet<Location>,
    markers: HashMap<Location, Marker>,
    time: u64,
}

impl MemoryWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Places (or replaces) a marker, returning the previous one.
    pub fn place_marker(&mut self, location: Location, marker: Marker) -> Option<Marker> {
        self.markers.insert(location, marker)
    }

    pub fn remove_marker(&mut self, location: Location) -> Option<Marker> {
        self.markers.remove(&location)
    }

    /// Rewrites the text of an existing marker.
    pub fn set_lines(&mut self, location: Location, lines: SignLines) -> bool {
        match self.markers.get_mut(&location) {
            Some(marker) => {
                marker.lines = lines;
                true
            }
            None => false,
        }
    }

    pub fn powered_count(&self) -> usize {
        self.powered.len()
    }

    pub fn set_time(&mut self, time: u64) {
        self.time = time;
    }

    /// Advances world time by `ticks`.
    pub fn advance(&mut self, ticks: u64) {
        self.time = self.time.wrapping_add(ticks);
    }
}

impl World for MemoryWorld {
    fn is_powered(&self, location: Location) -> bool {
        self.powered.contains(&location)
    }

    fn set_powered(&mut self, location: Location, powered: bool) {
        if powered {
            self.powered.insert(location);
        } else {
            self.powered.remove(&location);
        }
    }

    fn marker(&self, location: Location) -> Option<&Marker> {
        self.markers.get(&location)
    }

    fn time(&self) -> u64 {
        self.time
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Direction;

    #[test]
    fn test_memory_world_power() {
        let mut world = MemoryWorld::new();
        let spot = Location::new(1, 2, 3);
        assert!(!world.is_powered(spot));
        world.set_powered(spot, true);
        assert!(world.is_powered(spot));
        assert_eq!(world.powered_count(), 1);
        world.set_powered(spot, false);
        assert!(!world.is_powered(spot));
    }

    #[test]
    fn test_memory_world_markers() {
        let mut world = MemoryWorld::new();
        let spot = Location::new(0, 64, 0);
        assert!(!world.set_lines(spot, SignLines::default()));

        world.place_marker(spot, Marker::wall(Direction::North, ["", "clock", "", ""]));
        assert!(world.set_lines(spot, SignLines::new(["CLOCK", "CLOCK", "20"])));
        assert_eq!(world.marker(spot).unwrap().lines.get(2), "20");

        assert!(world.remove_marker(spot).is_some());
        assert!(world.marker(spot).is_none());
    }

    #[test]
    fn test_message_log() {
        let mut log = MessageLog::new("steve");
        log.send_message("Created Clock");
        assert_eq!(log.name(), "steve");
        assert_eq!(log.last(), Some("Created Clock"));
    }
}
