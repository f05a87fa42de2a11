//! The action log.
//!
//! The log is the sole contract with external collaborators: the UI renders
//! from log-derived state, persistence replays it. Each accepted action
//! appends exactly one [`ActionLogEntry`] carrying the actor, the action,
//! and the structured state deltas it produced. Replaying the full log from
//! the initial definition and seed deterministically reproduces final state.
//!
//! Entries use an `im::Vector` so snapshots of the log are O(1) to clone.

use im::Vector;
use serde::{Deserialize, Serialize};

use super::action::{Action, DividendKind};
use super::entity::{AbilityOwner, Actor, CompanyId, CorporationId, HexId, PlayerId, TrainId};

/// Which kind of round an entry was logged in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoundKind {
    /// Players trade shares.
    Stock,
    /// Corporations lay track, run trains, pay dividends.
    Operating,
}

/// Round label attached to each log entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundLabel {
    /// Round type.
    pub kind: RoundKind,
    /// 1-based round number of that type.
    pub number: u32,
}

impl std::fmt::Display for RoundLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            RoundKind::Stock => write!(f, "SR {}", self.number),
            RoundKind::Operating => write!(f, "OR {}", self.number),
        }
    }
}

/// A market position with its price, captured before/after moves so price
/// protection rules can compare historical prices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Grid row.
    pub row: u8,
    /// Grid column.
    pub col: u8,
    /// Cell price.
    pub price: i64,
}

/// A structured state delta produced by an accepted action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogEvent {
    /// Cash moved to (positive) or from (negative) an actor.
    CashChange {
        /// Affected actor.
        actor: Actor,
        /// Signed amount.
        amount: i64,
    },
    /// A corporation's price marker moved.
    PriceMoved {
        /// Affected corporation.
        corporation: CorporationId,
        /// Position and price before the move.
        from: PricePoint,
        /// Position and price after the move.
        to: PricePoint,
    },
    /// A tile was laid or upgraded.
    TileLaid {
        /// Target hex.
        hex: HexId,
        /// Tile name.
        tile: String,
        /// Rotation in sixths.
        rotation: u8,
    },
    /// A station token was placed.
    TokenPlaced {
        /// Target hex.
        hex: HexId,
        /// Owning corporation.
        corporation: CorporationId,
    },
    /// Routes were run for revenue.
    RevenueRun {
        /// Operating corporation.
        corporation: CorporationId,
        /// Total bonus-adjusted revenue.
        revenue: i64,
        /// Number of trains that found a route.
        routes: u8,
    },
    /// Revenue was distributed.
    DividendPaid {
        /// Operating corporation.
        corporation: CorporationId,
        /// Payout or withhold.
        kind: DividendKind,
        /// Total amount distributed or withheld.
        amount: i64,
    },
    /// A train changed hands for money.
    TrainBought {
        /// Buying corporation.
        buyer: CorporationId,
        /// The train unit.
        train: TrainId,
        /// Price paid.
        price: i64,
        /// True if bought from the depot (may trigger a phase).
        from_depot: bool,
    },
    /// A train was discarded to the depot pool (over the train limit).
    TrainDiscarded {
        /// Corporation that discarded it.
        corporation: CorporationId,
        /// The discarded train.
        train: TrainId,
    },
    /// A train was removed from play by a rust event.
    TrainRusted {
        /// The rusted train.
        train: TrainId,
        /// Owner it was removed from, if any.
        owner: Option<CorporationId>,
    },
    /// A train became obsolete (kept, but limit-exempt).
    TrainObsoleted {
        /// The obsoleted train.
        train: TrainId,
    },
    /// The game advanced to a new phase.
    PhaseAdvanced {
        /// New phase name.
        name: String,
    },
    /// A private company closed and left play.
    CompanyClosed {
        /// The closed company.
        company: CompanyId,
    },
    /// A private company was bought by a corporation.
    CompanyBought {
        /// The company.
        company: CompanyId,
        /// Buying corporation.
        buyer: CorporationId,
        /// Price paid.
        price: i64,
    },
    /// An ability was consumed (one use decremented).
    AbilityUsed {
        /// The ability's owner.
        owner: AbilityOwner,
        /// Ability kind tag.
        kind: String,
    },
    /// A corporation was started at a par price.
    Parred {
        /// The corporation.
        corporation: CorporationId,
        /// Chosen par price.
        price: i64,
    },
    /// A corporation floated and received its capital.
    Floated {
        /// The corporation.
        corporation: CorporationId,
    },
    /// Shares changed hands.
    SharesTraded {
        /// The trading player.
        player: PlayerId,
        /// The corporation.
        corporation: CorporationId,
        /// Signed percent: positive bought, negative sold.
        percent: i8,
    },
    /// A corporation took a loan.
    LoanTaken {
        /// The corporation.
        corporation: CorporationId,
        /// Loan principal received.
        amount: i64,
    },
    /// A player went bankrupt, ending the game.
    Bankrupted {
        /// The bankrupt player.
        player: PlayerId,
    },
    /// A round ended and the next began.
    RoundChanged {
        /// The round that just started.
        next: RoundLabel,
    },
}

/// An immutable, ordered record of one accepted action.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActionLogEntry {
    /// Position in the total order, starting at 0.
    pub sequence: u32,
    /// Round the action was taken in.
    pub round: RoundLabel,
    /// Who acted.
    pub actor: Actor,
    /// The action.
    pub action: Action,
    /// Structured deltas the action produced.
    pub events: Vec<LogEvent>,
}

/// Append-only ordered action log.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ActionLog {
    entries: Vector<ActionLogEntry>,
}

impl ActionLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry. The entry's sequence must equal the current length.
    pub fn push(&mut self, entry: ActionLogEntry) {
        debug_assert_eq!(entry.sequence as usize, self.entries.len());
        self.entries.push_back(entry);
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no actions have been logged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The next sequence number to assign.
    #[must_use]
    pub fn next_sequence(&self) -> u32 {
        self.entries.len() as u32
    }

    /// Iterate entries in order.
    pub fn iter(&self) -> impl Iterator<Item = &ActionLogEntry> {
        self.entries.iter()
    }

    /// Get an entry by sequence number.
    #[must_use]
    pub fn get(&self, sequence: u32) -> Option<&ActionLogEntry> {
        self.entries.get(sequence as usize)
    }

    /// Extract just the actions, for replay.
    #[must_use]
    pub fn actions(&self) -> Vec<Action> {
        self.entries.iter().map(|e| e.action.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(seq: u32) -> ActionLogEntry {
        ActionLogEntry {
            sequence: seq,
            round: RoundLabel {
                kind: RoundKind::Stock,
                number: 1,
            },
            actor: Actor::Player(PlayerId::new(0)),
            action: Action::Pass,
            events: vec![],
        }
    }

    #[test]
    fn test_push_and_order() {
        let mut log = ActionLog::new();
        assert!(log.is_empty());

        log.push(entry(0));
        log.push(entry(1));

        assert_eq!(log.len(), 2);
        assert_eq!(log.next_sequence(), 2);
        assert_eq!(log.get(1).unwrap().sequence, 1);
        let seqs: Vec<_> = log.iter().map(|e| e.sequence).collect();
        assert_eq!(seqs, vec![0, 1]);
    }

    #[test]
    fn test_round_label_display() {
        let sr = RoundLabel {
            kind: RoundKind::Stock,
            number: 2,
        };
        let or = RoundLabel {
            kind: RoundKind::Operating,
            number: 3,
        };
        assert_eq!(sr.to_string(), "SR 2");
        assert_eq!(or.to_string(), "OR 3");
    }

    #[test]
    fn test_log_serialization() {
        let mut log = ActionLog::new();
        log.push(ActionLogEntry {
            events: vec![LogEvent::CashChange {
                actor: Actor::Player(PlayerId::new(0)),
                amount: -80,
            }],
            ..entry(0)
        });

        let json = serde_json::to_string(&log).unwrap();
        let back: ActionLog = serde_json::from_str(&json).unwrap();
        assert_eq!(back.len(), 1);
        assert_eq!(back.get(0).unwrap().events, log.get(0).unwrap().events);
    }
}
