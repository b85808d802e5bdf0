//! Server actor tests over the request channel.

use col_core::features::{Ability, Trait};
use col_core::protocol::{FeatureChangeMessage, FeatureChangeOutcome, Message};
use col_server::server::{self, GameServer};
use col_server::{ServerConfig, ServerError};
use col_test_utils::fixtures::sample_game;
use tempfile::tempdir;

#[tokio::test]
async fn end_turn_publishes_discovery_and_new_turn() {
    let sample = sample_game();
    let handle = server::spawn(sample.game, &ServerConfig::default().with_ai_seed(3));

    let summary = handle.end_turn().await.unwrap();
    assert_eq!(summary.turn, 2);
    assert_eq!(summary.assigned, 3);
    assert_eq!(summary.missions_run, 3);
    // The wandering ship discovers the Pacific on its first step.
    assert_eq!(summary.changes_queued, 1);

    let outbound = handle.drain_outbound().await.unwrap();
    assert_eq!(outbound.len(), 2);
    assert_eq!(outbound[0], Message::NewTurn { turn: 2 });
    match &outbound[1] {
        Message::FeatureChange(change) => {
            assert_eq!(change.id, sample.player);
            assert!(change.add);
            assert!(matches!(change.children.as_slice(), [Trait::HistoryEvent(_)]));
        }
        other => panic!("expected a feature change, got {other:?}"),
    }

    // Already published history is not sent again.
    let summary = handle.end_turn().await.unwrap();
    assert_eq!(summary.changes_queued, 0);
    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn wire_changes_apply_in_receipt_order() {
    let sample = sample_game();
    let handle = server::spawn(sample.game, &ServerConfig::default());
    let ability = Trait::Ability(Ability::new("model.ability.bornInColony"));

    let attach = Message::FeatureChange(FeatureChangeMessage::new(
        sample.colonist,
        ability.clone(),
        true,
    ));
    let detach = Message::FeatureChange(FeatureChangeMessage::new(
        sample.colonist,
        ability,
        false,
    ));
    for message in [&attach, &detach] {
        let outcome = handle.apply_wire(message.to_wire().unwrap()).await.unwrap();
        assert_eq!(outcome, Some(FeatureChangeOutcome::Applied { changed: 1 }));
    }

    let game = handle.snapshot().await.unwrap();
    let colonist = game.objects().get(sample.colonist).unwrap();
    assert!(!colonist.features.has_ability("model.ability.bornInColony"));
    assert_eq!(handle.drain_outbound().await.unwrap(), vec![attach, detach]);
    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn malformed_line_is_rejected_and_server_keeps_running() {
    let handle = server::spawn(sample_game().game, &ServerConfig::default());

    let result = handle
        .apply_wire(r#"{"type":"featureChange","id":1,"children":[{"tag":"bogus"}]}"#)
        .await;
    assert!(matches!(result, Err(ServerError::Wire(_))));

    assert_eq!(handle.snapshot().await.unwrap().turn(), 1);
    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn stale_target_is_a_noop() {
    let mut sample = sample_game();
    sample.game.dispose_unit(sample.ship).unwrap();
    let before = sample.game.state_hash();
    let handle = server::spawn(sample.game, &ServerConfig::default());

    let outcome = handle
        .apply(Message::FeatureChange(FeatureChangeMessage::new(
            sample.ship,
            Trait::Ability(Ability::new("model.ability.navalUnit")),
            true,
        )))
        .await
        .unwrap();
    assert_eq!(outcome, Some(FeatureChangeOutcome::MissingTarget));
    assert_eq!(handle.snapshot().await.unwrap().state_hash(), before);
    handle.shutdown().await.unwrap();
}

#[test]
fn same_seed_same_game() {
    let play = || {
        let mut server = GameServer::new(sample_game().game, &ServerConfig::default());
        for _ in 0..5 {
            server.end_turn().unwrap();
        }
        server.game().state_hash()
    };
    assert_eq!(play(), play());
}

#[test]
fn config_file_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("server.ron");
    std::fs::write(&path, "(port: 4242, max_players: 2, ai_seed: 17)").unwrap();

    let config = ServerConfig::load(&path).unwrap();
    assert_eq!(config.port, 4242);
    assert_eq!(config.max_players, 2);
    assert_eq!(config.ai_seed, 17);

    match ServerConfig::load(dir.path().join("missing.ron")) {
        Err(ServerError::Config { path, .. }) => assert!(path.ends_with("missing.ron")),
        other => panic!("expected config error, got {other:?}"),
    }
}
