//! Declarative abilities.
//!
//! Abilities attach to companies and corporations and are resolved by kind
//! when a step requests them: the track step queries tile-lay and discount
//! abilities, revenue calculation queries hex and route bonuses, and so on.
//! Nothing iterates abilities blindly.
//!
//! Each ability carries an activation window and an optional remaining-use
//! counter; a use decrements the counter and the ability is removed when it
//! reaches zero. Variant behavior is expressed by attaching different
//! ability combinations at setup, not by subclassing the engine.

use serde::{Deserialize, Serialize};

use crate::core::HexId;
use crate::map::Terrain;

/// Kind tag used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AbilityKind {
    /// Right to lay a tile on specific hexes (possibly free or extra).
    TileLay,
    /// Discount on terrain costs when laying.
    TileDiscount,
    /// Flat revenue bonus when a route stops on listed hexes.
    HexBonus,
    /// A named cross-route bonus paid when a route covers all listed hexes.
    RouteBonus,
    /// The owning company's stated revenue changes under a condition.
    RevenueChange,
    /// Right to place an extra token on a hex.
    TokenGrant,
    /// Fixed income paid each operating round.
    Income,
    /// A historical-objective hex assignment.
    AssignHexes,
}

impl AbilityKind {
    /// Canonical tag name, used in log entries.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AbilityKind::TileLay => "tile_lay",
            AbilityKind::TileDiscount => "tile_discount",
            AbilityKind::HexBonus => "hex_bonus",
            AbilityKind::RouteBonus => "route_bonus",
            AbilityKind::RevenueChange => "revenue_change",
            AbilityKind::TokenGrant => "token_grant",
            AbilityKind::Income => "income",
            AbilityKind::AssignHexes => "assign_hexes",
        }
    }
}

/// The effect payload of an ability.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbilityEffect {
    /// Lay (or upgrade) on the listed hexes, waiving tile cost if `free`.
    TileLay {
        /// Eligible hexes.
        hexes: Vec<HexId>,
        /// Terrain costs are waived.
        free: bool,
    },
    /// Discount terrain costs by `amount`, optionally only for one terrain.
    TileDiscount {
        /// Discount amount.
        amount: i64,
        /// Restrict to one terrain type if set.
        terrain: Option<Terrain>,
    },
    /// Add `amount` per route stop on a listed hex.
    HexBonus {
        /// Bonus hexes.
        hexes: Vec<HexId>,
        /// Bonus per qualifying stop.
        amount: i64,
    },
    /// Named bonus paid once per route covering all listed hexes.
    ///
    /// Across a corporation's routes, only the best route's bonus per name
    /// is paid (summed across names).
    RouteBonus {
        /// Bonus name ("atlanta_birmingham").
        name: String,
        /// Hexes the route must all visit.
        hexes: Vec<HexId>,
        /// Bonus amount.
        amount: i64,
    },
    /// Company revenue becomes `revenue` while the condition window holds.
    RevenueChange {
        /// Replacement revenue.
        revenue: i64,
    },
    /// Extra token placement right on a hex.
    TokenGrant {
        /// Target hex.
        hex: HexId,
        /// Token is free.
        free: bool,
    },
    /// Fixed income paid to the owner each operating round.
    Income {
        /// Amount paid.
        amount: i64,
    },
    /// Historical objective hexes.
    AssignHexes {
        /// Objective hexes.
        hexes: Vec<HexId>,
    },
}

impl AbilityEffect {
    /// The kind tag of this effect.
    #[must_use]
    pub fn kind(&self) -> AbilityKind {
        match self {
            AbilityEffect::TileLay { .. } => AbilityKind::TileLay,
            AbilityEffect::TileDiscount { .. } => AbilityKind::TileDiscount,
            AbilityEffect::HexBonus { .. } => AbilityKind::HexBonus,
            AbilityEffect::RouteBonus { .. } => AbilityKind::RouteBonus,
            AbilityEffect::RevenueChange { .. } => AbilityKind::RevenueChange,
            AbilityEffect::TokenGrant { .. } => AbilityKind::TokenGrant,
            AbilityEffect::Income { .. } => AbilityKind::Income,
            AbilityEffect::AssignHexes { .. } => AbilityKind::AssignHexes,
        }
    }
}

/// When an ability may be used.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AbilityWhen {
    /// Always active while the ability exists.
    #[default]
    Any,
    /// Active only while the owning entity has a train.
    HasTrain,
    /// Active only in the named phase or later.
    FromPhase(String),
}

/// Context for activation checks, captured by the querying step.
#[derive(Clone, Copy, Debug)]
pub struct AbilityContext<'a> {
    /// Names of every phase reached so far, in order; the last entry is the
    /// current phase.
    pub phases_reached: &'a [String],
    /// The owning entity currently has a train.
    pub owner_has_train: bool,
}

impl AbilityContext<'_> {
    /// The current phase name.
    #[must_use]
    pub fn phase(&self) -> &str {
        self.phases_reached.last().map_or("", String::as_str)
    }
}

/// An ability instance attached to an entity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ability {
    /// The effect payload.
    pub effect: AbilityEffect,
    /// Activation window.
    pub when: AbilityWhen,
    /// Remaining uses. `None` = unlimited.
    pub uses_remaining: Option<u32>,
    /// Human-readable description, shown in logs.
    pub description: String,
}

impl Ability {
    /// Create an always-active, unlimited ability.
    #[must_use]
    pub fn new(effect: AbilityEffect) -> Self {
        Self {
            effect,
            when: AbilityWhen::default(),
            uses_remaining: None,
            description: String::new(),
        }
    }

    /// Set the activation window (builder pattern).
    #[must_use]
    pub fn when(mut self, when: AbilityWhen) -> Self {
        self.when = when;
        self
    }

    /// Limit uses (builder pattern).
    #[must_use]
    pub fn with_uses(mut self, uses: u32) -> Self {
        self.uses_remaining = Some(uses);
        self
    }

    /// Set the description (builder pattern).
    #[must_use]
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// The kind tag.
    #[must_use]
    pub fn kind(&self) -> AbilityKind {
        self.effect.kind()
    }

    /// Whether this ability is usable in the given context.
    #[must_use]
    pub fn is_active(&self, ctx: &AbilityContext<'_>) -> bool {
        if self.uses_remaining == Some(0) {
            return false;
        }
        match &self.when {
            AbilityWhen::Any => true,
            AbilityWhen::HasTrain => ctx.owner_has_train,
            AbilityWhen::FromPhase(name) => ctx.phases_reached.contains(name),
        }
    }
}

/// The ability list of one entity, with query-by-kind resolution.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AbilitySet {
    abilities: Vec<Ability>,
}

impl AbilitySet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach an ability.
    pub fn add(&mut self, ability: Ability) {
        self.abilities.push(ability);
    }

    /// True if no abilities are attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.abilities.is_empty()
    }

    /// Query the active abilities of a kind, in attachment order.
    pub fn of_kind<'a>(
        &'a self,
        kind: AbilityKind,
        ctx: &'a AbilityContext<'_>,
    ) -> impl Iterator<Item = &'a Ability> {
        self.abilities
            .iter()
            .filter(move |a| a.kind() == kind && a.is_active(ctx))
    }

    /// Consume one use of the first active ability of a kind.
    ///
    /// Returns the ability's effect if one was used. Exhausted abilities
    /// are removed immediately, so subsequent queries no longer see them.
    pub fn use_one(&mut self, kind: AbilityKind, ctx: &AbilityContext<'_>) -> Option<AbilityEffect> {
        self.use_matching(kind, ctx, |_| true)
    }

    /// Consume one use of the first active ability of a kind whose effect
    /// satisfies a predicate (a tile-lay right covering a specific hex).
    pub fn use_matching(
        &mut self,
        kind: AbilityKind,
        ctx: &AbilityContext<'_>,
        pred: impl Fn(&AbilityEffect) -> bool,
    ) -> Option<AbilityEffect> {
        let index = self
            .abilities
            .iter()
            .position(|a| a.kind() == kind && a.is_active(ctx) && pred(&a.effect))?;

        let effect = self.abilities[index].effect.clone();
        if let Some(uses) = &mut self.abilities[index].uses_remaining {
            *uses = uses.saturating_sub(1);
            if *uses == 0 {
                self.abilities.remove(index);
            }
        }
        Some(effect)
    }

    /// Remove every ability of a kind (an explicit remove event).
    pub fn remove_kind(&mut self, kind: AbilityKind) {
        self.abilities.retain(|a| a.kind() != kind);
    }

    /// Iterate all attached abilities regardless of activation.
    pub fn iter(&self) -> impl Iterator<Item = &Ability> {
        self.abilities.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> AbilityContext<'static> {
        static PHASES: [String; 0] = [];
        AbilityContext {
            phases_reached: &PHASES,
            owner_has_train: false,
        }
    }

    fn hex_bonus() -> Ability {
        Ability::new(AbilityEffect::HexBonus {
            hexes: vec![HexId::new(1), HexId::new(2)],
            amount: 10,
        })
        .describe("Warrior Coal Field")
    }

    #[test]
    fn test_query_by_kind() {
        let mut set = AbilitySet::new();
        set.add(hex_bonus());
        set.add(Ability::new(AbilityEffect::Income { amount: 5 }));

        let ctx = ctx();
        assert_eq!(set.of_kind(AbilityKind::HexBonus, &ctx).count(), 1);
        assert_eq!(set.of_kind(AbilityKind::Income, &ctx).count(), 1);
        assert_eq!(set.of_kind(AbilityKind::TileLay, &ctx).count(), 0);
    }

    #[test]
    fn test_exhaustion_removes() {
        let mut set = AbilitySet::new();
        set.add(
            Ability::new(AbilityEffect::TileLay {
                hexes: vec![HexId::new(7)],
                free: true,
            })
            .with_uses(1),
        );

        let ctx = ctx();
        assert!(set.use_one(AbilityKind::TileLay, &ctx).is_some());
        // Used once with count=1: absent from subsequent queries.
        assert_eq!(set.of_kind(AbilityKind::TileLay, &ctx).count(), 0);
        assert!(set.use_one(AbilityKind::TileLay, &ctx).is_none());
        assert!(set.is_empty());
    }

    #[test]
    fn test_unlimited_uses_persist() {
        let mut set = AbilitySet::new();
        set.add(hex_bonus());

        let ctx = ctx();
        for _ in 0..5 {
            assert!(set.use_one(AbilityKind::HexBonus, &ctx).is_some());
        }
        assert!(!set.is_empty());
    }

    #[test]
    fn test_has_train_window() {
        let mut set = AbilitySet::new();
        set.add(
            Ability::new(AbilityEffect::RevenueChange { revenue: 30 })
                .when(AbilityWhen::HasTrain),
        );

        let inactive = ctx();
        assert_eq!(set.of_kind(AbilityKind::RevenueChange, &inactive).count(), 0);

        let active = AbilityContext {
            owner_has_train: true,
            ..inactive
        };
        assert_eq!(set.of_kind(AbilityKind::RevenueChange, &active).count(), 1);
    }

    #[test]
    fn test_remove_kind() {
        let mut set = AbilitySet::new();
        set.add(hex_bonus());
        set.add(hex_bonus());
        set.add(Ability::new(AbilityEffect::Income { amount: 5 }));

        set.remove_kind(AbilityKind::HexBonus);
        let ctx = ctx();
        assert_eq!(set.of_kind(AbilityKind::HexBonus, &ctx).count(), 0);
        assert_eq!(set.of_kind(AbilityKind::Income, &ctx).count(), 1);
    }
}
