//! Trains and distance classes.

use serde::{Deserialize, Serialize};

use crate::core::TrainId;

/// A train's reach limit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Distance {
    /// Counts every revenue stop (city or town) against one limit.
    Simple(u32),
    /// Mixed class: a city limit plus a separate town allowance
    /// (a "2+1" train visits 2 cities and up to 1 town).
    Mixed {
        /// City/offboard stop limit.
        cities: u32,
        /// Extra town stops that do not consume a city slot.
        towns: u32,
    },
}

impl Distance {
    /// City/offboard stops allowed.
    #[must_use]
    pub const fn city_limit(self) -> u32 {
        match self {
            Distance::Simple(n) => n,
            Distance::Mixed { cities, .. } => cities,
        }
    }

    /// Whether a stop tally is within this distance class.
    ///
    /// For `Simple`, towns and cities share the limit. For `Mixed`, towns
    /// first consume the town allowance, then spill into the city limit.
    #[must_use]
    pub fn allows(self, cities: u32, towns: u32) -> bool {
        match self {
            Distance::Simple(n) => cities + towns <= n,
            Distance::Mixed {
                cities: city_limit,
                towns: town_allowance,
            } => {
                let spill = towns.saturating_sub(town_allowance);
                cities + spill <= city_limit
            }
        }
    }
}

impl std::fmt::Display for Distance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Distance::Simple(n) => write!(f, "{n}"),
            Distance::Mixed { cities, towns } => write!(f, "{cities}+{towns}"),
        }
    }
}

/// A roster entry: one train type and how many units of it exist.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainType {
    /// Train name ("2", "4D").
    pub name: String,
    /// Reach limit.
    pub distance: Distance,
    /// Depot list price.
    pub price: i64,
    /// Name of the train whose first purchase rusts this type.
    pub rusts_on: Option<String>,
    /// Name of the train whose first purchase obsoletes this type.
    pub obsolete_on: Option<String>,
    /// Units in the base roster.
    pub count: u32,
}

impl TrainType {
    /// Create a type with no rust or obsolescence trigger.
    #[must_use]
    pub fn new(name: impl Into<String>, distance: Distance, price: i64, count: u32) -> Self {
        Self {
            name: name.into(),
            distance,
            price,
            rusts_on: None,
            obsolete_on: None,
            count,
        }
    }

    /// Set the rust trigger (builder pattern).
    #[must_use]
    pub fn rusts_on(mut self, train: impl Into<String>) -> Self {
        self.rusts_on = Some(train.into());
        self
    }

    /// Set the obsolescence trigger (builder pattern).
    #[must_use]
    pub fn obsolete_on(mut self, train: impl Into<String>) -> Self {
        self.obsolete_on = Some(train.into());
        self
    }
}

/// One train unit in play or in the depot.
///
/// Units copy their type data so game state is self-contained; variant rules
/// may also rewrite triggers per-unit (hard-rust conversions).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainUnit {
    /// Unit identifier.
    pub id: TrainId,
    /// Type name.
    pub name: String,
    /// Unit index within the type, 1-based.
    pub index: u32,
    /// Reach limit.
    pub distance: Distance,
    /// Depot list price.
    pub price: i64,
    /// Rust trigger.
    pub rusts_on: Option<String>,
    /// Obsolescence trigger.
    pub obsolete_on: Option<String>,
    /// The unit has rusted and is out of play. Rusting happens at most once.
    pub rusted: bool,
    /// The unit is obsolete: still owned and runnable, exempt from limits.
    pub obsolete: bool,
}

impl TrainUnit {
    /// Instantiate a unit of a type.
    #[must_use]
    pub fn of_type(id: TrainId, train_type: &TrainType, index: u32) -> Self {
        Self {
            id,
            name: train_type.name.clone(),
            index,
            distance: train_type.distance,
            price: train_type.price,
            rusts_on: train_type.rusts_on.clone(),
            obsolete_on: train_type.obsolete_on.clone(),
            rusted: false,
            obsolete: false,
        }
    }
}
