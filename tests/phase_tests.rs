//! Phase advancement, rusting, and obsolescence at the state level.

use hexrail::core::{CorporationId, LogEvent, TrainId};
use hexrail::game::GameState;
use hexrail::games::simple::definition;

/// Move a depot train into a corporation's hands.
fn give_train(state: &mut GameState, corp: CorporationId, train: TrainId) {
    state.depot.take(train).unwrap();
    state.corporations[corp.index()].trains.push(train);
}

#[test]
fn test_rust_removes_owned_trains() {
    let def = definition();
    let mut state = GameState::new(&def, 1);
    let corp = CorporationId::new(0);
    give_train(&mut state, corp, TrainId::new(0)); // a 2-train

    let mut events = Vec::new();
    // Phase "4" is index 2; 2-trains rust on "4".
    state.advance_phase(&def, 2, "4", &mut events);

    assert_eq!(state.phase(&def).name, "4");
    assert!(state.corporation(corp).trains.is_empty());
    assert!(state.depot.unit(TrainId::new(0)).rusted);
    // All four units of the type rust, owned or not.
    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e, LogEvent::TrainRusted { .. }))
            .count(),
        4
    );
    assert!(events
        .iter()
        .any(|e| matches!(e, LogEvent::PhaseAdvanced { name } if name == "4")));
}

#[test]
fn test_obsolete_trains_stay_but_stop_counting() {
    let def = definition();
    let mut state = GameState::new(&def, 1);
    let corp = CorporationId::new(0);
    give_train(&mut state, corp, TrainId::new(7)); // a 4-train

    let mut events = Vec::new();
    // Diesels obsolete the 4s (and rust the 3s).
    state.advance_phase(&def, 3, "D", &mut events);

    let unit = state.depot.unit(TrainId::new(7));
    assert!(unit.obsolete);
    assert!(!unit.rusted);
    assert_eq!(state.corporation(corp).trains, vec![TrainId::new(7)]);
    assert_eq!(state.counted_trains(corp), 0);
    assert!(events
        .iter()
        .any(|e| matches!(e, LogEvent::TrainObsoleted { train } if *train == TrainId::new(7))));
}

#[test]
fn test_rust_fires_once() {
    let def = definition();
    let mut state = GameState::new(&def, 1);

    let mut events = Vec::new();
    state.advance_phase(&def, 3, "D", &mut events);
    let rusted = events
        .iter()
        .filter(|e| matches!(e, LogEvent::TrainRusted { .. }))
        .count();

    // A second advance on the same trigger finds everything already
    // handled and stays quiet.
    let mut again = Vec::new();
    state.advance_phase(&def, 3, "D", &mut again);
    assert_eq!(
        again
            .iter()
            .filter(|e| matches!(
                e,
                LogEvent::TrainRusted { .. } | LogEvent::TrainObsoleted { .. }
            ))
            .count(),
        0
    );
    assert_eq!(rusted, 3); // the three 3-trains
}

#[test]
fn test_hard_rust_removes_instead_of_flagging() {
    let mut def = definition();
    def.rules.hard_rust = true;
    let mut state = GameState::new(&def, 1);
    let corp = CorporationId::new(0);
    give_train(&mut state, corp, TrainId::new(7)); // a 4-train

    let mut events = Vec::new();
    state.advance_phase(&def, 3, "D", &mut events);

    assert!(state.depot.unit(TrainId::new(7)).rusted);
    assert!(state.corporation(corp).trains.is_empty());
    assert!(events
        .iter()
        .any(|e| matches!(e, LogEvent::TrainRusted { train, .. } if *train == TrainId::new(7))));
}
