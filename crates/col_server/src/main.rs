//! Colonia - Dedicated Server
//!
//! Generates a map, seats the AI players and plays a few turns.
//! Usage: `col_server [config.ron]`

use col_core::game::Game;
use col_core::map::TilePos;
use col_core::map_generation::generate_map;
use col_core::objects::Location;
use col_core::protocol::verify_trait_parsers;
use col_server::{server, ServerConfig, ServerError};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEMO_TURNS: u32 = 5;
const NATIONS: [&str; 4] = ["Dutch", "English", "French", "Spanish"];

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    if let Err(e) = run().await {
        tracing::error!("Server failed: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), ServerError> {
    verify_trait_parsers()?;

    let config = match std::env::args().nth(1) {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    };
    tracing::info!(port = config.port, seed = config.map.seed, "Starting Colonia server");

    let game = new_game(&config)?;
    let handle = server::spawn(game, &config);

    for _ in 0..DEMO_TURNS {
        handle.end_turn().await?;
    }

    for message in handle.drain_outbound().await? {
        match message.to_wire() {
            Ok(line) => tracing::info!(tag = message.tag(), "{line}"),
            Err(e) => tracing::warn!(error = %e, "Unencodable message"),
        }
    }

    let snapshot = handle.snapshot().await?;
    tracing::info!(
        turn = snapshot.turn(),
        state_hash = snapshot.state_hash(),
        "Final state"
    );
    handle.shutdown().await
}

/// Generate the map and give each AI nation a settlement, a colonist and a
/// ship on the first free coast it finds.
fn new_game(config: &ServerConfig) -> Result<Game, ServerError> {
    let map = generate_map(&config.map)?;
    let mut game = Game::new(map);
    let players = usize::from(config.max_players).min(NATIONS.len());

    let mut coasts = coastal_sites(&game).into_iter();
    for nation in NATIONS.iter().take(players) {
        let player = game.add_player(*nation, true);
        let Some((land, sea)) = coasts.next() else {
            tracing::warn!(nation, "No coast left, nation starts in Europe");
            game.spawn_unit(player, Location::Europe, false)?;
            continue;
        };
        game.found_settlement(player, format!("{nation} Landing"), land)?;
        game.spawn_unit(player, Location::Tile(land), false)?;
        game.spawn_unit(player, Location::Tile(sea), true)?;
        game.spawn_unit(player, Location::Europe, false)?;
    }
    Ok(game)
}

/// Land tiles next to water, spread out along the map.
fn coastal_sites(game: &Game) -> Vec<(TilePos, TilePos)> {
    let map = game.map();
    let stride = (map.height() / NATIONS.len() as u32).max(1);
    (0..NATIONS.len() as u32)
        .filter_map(|band| {
            map.tiles()
                .filter(|t| t.land && (band * stride..(band + 1) * stride).contains(&t.pos.y))
                .find_map(|t| {
                    map.neighbours(t.pos)
                        .find(|&n| map.tile(n).is_some_and(|n| !n.land))
                        .map(|sea| (t.pos, sea))
                })
        })
        .collect()
}
