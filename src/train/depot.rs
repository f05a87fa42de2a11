//! The depot: registry of all train units and the shared pools.
//!
//! The depot is both the allocator (every unit ever created is registered
//! here, looked up by [`TrainId`]) and the shared pool state: the ordered
//! queue of unsold units, discarded units buyable at list price, and the
//! rusted pool that units enter at most once and never leave.

use serde::{Deserialize, Serialize};

use crate::core::{EngineError, TrainId};

use super::train::{TrainType, TrainUnit};

/// Shared train pools plus the unit registry.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Depot {
    units: Vec<TrainUnit>,
    queue: Vec<TrainId>,
    discarded: Vec<TrainId>,
    rusted: Vec<TrainId>,
}

impl Depot {
    /// Build the depot from a roster, allocating units in roster order.
    #[must_use]
    pub fn from_roster(roster: &[TrainType]) -> Self {
        let mut depot = Self::default();
        for train_type in roster {
            for index in 1..=train_type.count {
                depot.add_unit(train_type, index);
            }
        }
        depot
    }

    /// Register a new unit of a type and queue it for sale.
    ///
    /// Variant rules use this to inject extra units beyond the base roster;
    /// the unit index continues the type's sequence.
    pub fn add_unit(&mut self, train_type: &TrainType, index: u32) -> TrainId {
        let id = TrainId::new(self.units.len() as u16);
        self.units.push(TrainUnit::of_type(id, train_type, index));
        self.queue.push(id);
        id
    }

    /// Number of units of a type ever created.
    #[must_use]
    pub fn count_of(&self, name: &str) -> u32 {
        self.units.iter().filter(|u| u.name == name).count() as u32
    }

    /// Look up a unit.
    ///
    /// # Panics
    /// Panics on an unknown ID: IDs only come from this registry, so a bad
    /// one is an engine bug.
    #[must_use]
    pub fn unit(&self, id: TrainId) -> &TrainUnit {
        &self.units[id.index()]
    }

    /// Look up a unit without panicking, for validating player-supplied IDs.
    #[must_use]
    pub fn get(&self, id: TrainId) -> Option<&TrainUnit> {
        self.units.get(id.index())
    }

    /// Mutable unit lookup.
    pub fn unit_mut(&mut self, id: TrainId) -> &mut TrainUnit {
        &mut self.units[id.index()]
    }

    /// Iterate all registered units.
    pub fn units(&self) -> impl Iterator<Item = &TrainUnit> {
        self.units.iter()
    }

    /// Mutable iteration over all registered units.
    pub fn units_mut(&mut self) -> impl Iterator<Item = &mut TrainUnit> {
        self.units.iter_mut()
    }

    /// The next unsold unit: the only new train currently for sale.
    #[must_use]
    pub fn next_unsold(&self) -> Option<TrainId> {
        self.queue.first().copied()
    }

    /// Units currently buyable from the depot: the next unsold unit plus
    /// everything in the discard pool.
    #[must_use]
    pub fn buyable(&self) -> Vec<TrainId> {
        let mut out = Vec::new();
        out.extend(self.next_unsold());
        out.extend(&self.discarded);
        out
    }

    /// True if this unit currently sits in the depot (queue or discards).
    #[must_use]
    pub fn holds(&self, id: TrainId) -> bool {
        self.queue.contains(&id) || self.discarded.contains(&id)
    }

    /// Remove a unit from the depot for purchase.
    ///
    /// Returns `true` if the unit came from the unsold queue (a depot
    /// purchase, which may trigger a phase) rather than the discards.
    pub fn take(&mut self, id: TrainId) -> Result<bool, EngineError> {
        if let Some(pos) = self.queue.iter().position(|&t| t == id) {
            self.queue.remove(pos);
            return Ok(true);
        }
        if let Some(pos) = self.discarded.iter().position(|&t| t == id) {
            self.discarded.remove(pos);
            return Ok(false);
        }
        Err(EngineError::rule(format!("{id} is not in the depot")))
    }

    /// Return a unit to the discard pool.
    pub fn discard(&mut self, id: TrainId) {
        debug_assert!(!self.holds(id), "{id} discarded while already in depot");
        self.discarded.push(id);
    }

    /// Move a unit to the rusted pool. No refund; rusting is permanent.
    ///
    /// Idempotent: a unit already rusted is left untouched, so crossing the
    /// same phase boundary twice cannot re-rust it.
    pub fn rust(&mut self, id: TrainId) {
        let unit = &mut self.units[id.index()];
        if unit.rusted {
            return;
        }
        unit.rusted = true;
        self.queue.retain(|&t| t != id);
        self.discarded.retain(|&t| t != id);
        self.rusted.push(id);
    }

    /// Units in the rusted pool.
    #[must_use]
    pub fn rusted(&self) -> &[TrainId] {
        &self.rusted
    }

    /// Units remaining in the unsold queue.
    #[must_use]
    pub fn unsold(&self) -> &[TrainId] {
        &self.queue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::train::train::Distance;

    fn roster() -> Vec<TrainType> {
        vec![
            TrainType::new("2", Distance::Simple(2), 80, 2).rusts_on("4"),
            TrainType::new("3", Distance::Simple(3), 180, 2),
            TrainType::new("4", Distance::Simple(4), 300, 1),
        ]
    }

    #[test]
    fn test_roster_allocation() {
        let depot = Depot::from_roster(&roster());
        assert_eq!(depot.units().count(), 5);
        assert_eq!(depot.unit(TrainId::new(0)).name, "2");
        assert_eq!(depot.unit(TrainId::new(1)).index, 2);
        assert_eq!(depot.unit(TrainId::new(4)).name, "4");
        assert_eq!(depot.count_of("2"), 2);
    }

    #[test]
    fn test_queue_order_and_take() {
        let mut depot = Depot::from_roster(&roster());
        assert_eq!(depot.next_unsold(), Some(TrainId::new(0)));

        assert_eq!(depot.take(TrainId::new(0)).unwrap(), true);
        assert_eq!(depot.next_unsold(), Some(TrainId::new(1)));

        // Taking a unit that left the depot fails.
        assert!(depot.take(TrainId::new(0)).is_err());
    }

    #[test]
    fn test_discard_is_buyable() {
        let mut depot = Depot::from_roster(&roster());
        depot.take(TrainId::new(0)).unwrap();
        depot.discard(TrainId::new(0));

        let buyable = depot.buyable();
        assert!(buyable.contains(&TrainId::new(0)));
        assert!(buyable.contains(&TrainId::new(1)));

        // Discarded units do not count as depot-queue purchases.
        assert_eq!(depot.take(TrainId::new(0)).unwrap(), false);
    }

    #[test]
    fn test_rust_removes_and_is_idempotent() {
        let mut depot = Depot::from_roster(&roster());
        depot.rust(TrainId::new(0));
        depot.rust(TrainId::new(0));

        assert_eq!(depot.rusted(), &[TrainId::new(0)]);
        assert!(depot.unit(TrainId::new(0)).rusted);
        assert!(!depot.holds(TrainId::new(0)));
        assert_eq!(depot.next_unsold(), Some(TrainId::new(1)));
    }

    #[test]
    fn test_inject_extra_unit() {
        let mut depot = Depot::from_roster(&roster());
        let four = roster().pop().unwrap();
        let id = depot.add_unit(&four, 2);

        assert_eq!(depot.count_of("4"), 2);
        assert_eq!(depot.unit(id).index, 2);
        assert!(depot.holds(id));
    }
}
