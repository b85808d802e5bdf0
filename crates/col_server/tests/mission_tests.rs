//! Idle-at-settlement mission scenarios on the sample game.

use col_core::features::HistoryEventType;
use col_core::map::TilePos;
use col_core::objects::Location;
use col_core::ocean::PACIFIC;
use col_server::ai::{AiController, Mission, MissionKind, MissionStep};
use col_test_utils::fixtures::{sample_game, seeded_rng};

#[test]
fn unit_in_settlement_idles_without_moving() {
    let mut sample = sample_game();
    let mut mission = Mission::idle_at_settlement(sample.colonist);
    let mut rng = seeded_rng(11);
    let before = sample.game.state_hash();

    let step = mission.step(&mut sample.game, &mut rng).unwrap();

    assert_eq!(step, MissionStep::Continue);
    assert_eq!(sample.game.state_hash(), before);
    assert_eq!(
        sample.game.objects().unit(sample.colonist).unwrap().moves_left,
        1
    );
}

#[test]
fn unit_in_europe_targets_its_location() {
    let mut sample = sample_game();
    let mut mission = Mission::idle_at_settlement(sample.recruit);
    assert_eq!(mission.find_target(&sample.game), Some(Location::Europe));

    let before = sample.game.state_hash();
    let step = mission.step(&mut sample.game, &mut seeded_rng(1)).unwrap();
    assert_eq!(step, MissionStep::Continue);
    assert_eq!(sample.game.state_hash(), before);
}

#[test]
fn ship_without_reachable_settlement_wanders() {
    // The settlement is landlocked in the island center, so the ship
    // cannot reach it and wanders instead.
    let mut sample = sample_game();
    let mut mission = Mission::idle_at_settlement(sample.ship);
    assert_eq!(mission.find_target(&sample.game), None);

    let step = mission.step(&mut sample.game, &mut seeded_rng(3)).unwrap();
    assert_eq!(step, MissionStep::Continue);

    let ship = sample.game.objects().unit(sample.ship).unwrap();
    assert_ne!(ship.tile(), Some(TilePos::new(0, 0)));
    assert_eq!(ship.moves_left, 0);

    // Every neighbour of the corner lies in the north Pacific.
    let pacific = sample.game.map().regions().get(PACIFIC).unwrap();
    assert_eq!(pacific.discovered_by(), Some(sample.player));
    let history = sample
        .game
        .objects()
        .get(sample.player)
        .unwrap()
        .features
        .history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].event_type, HistoryEventType::DiscoverRegion);
}

#[test]
fn disposed_unit_completes_mission() {
    let mut sample = sample_game();
    let mut mission = Mission::idle_at_settlement(sample.ship);
    sample.game.dispose_unit(sample.ship).unwrap();

    let step = mission.step(&mut sample.game, &mut seeded_rng(1)).unwrap();
    assert_eq!(step, MissionStep::Complete);
}

#[test]
fn controller_runs_every_ai_unit_once() {
    let mut sample = sample_game();
    let mut ai = AiController::new();
    assert_eq!(ai.assign_idle_missions(&sample.game), 3);
    assert!(ai.assign(Mission::wander(sample.colonist)));

    let report = ai.run_turn(&mut sample.game, &mut seeded_rng(9)).unwrap();
    assert_eq!(report.ran, 3);
    assert_eq!(report.completed, 0);
    assert_eq!(
        ai.mission(sample.colonist).unwrap().kind(),
        MissionKind::Wander
    );
}

#[test]
fn same_seed_same_turns() {
    let play = |seed| {
        let mut sample = sample_game();
        let mut ai = AiController::new();
        let mut rng = seeded_rng(seed);
        for _ in 0..4 {
            ai.assign_idle_missions(&sample.game);
            ai.run_turn(&mut sample.game, &mut rng).unwrap();
            sample.game.new_turn();
        }
        sample.game.state_hash()
    };
    assert_eq!(play(21), play(21));
}
