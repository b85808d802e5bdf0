//! Determinism testing utilities.
//!
//! Provides a harness for verifying that map generation, ocean partitioning
//! and turn processing produce identical results given identical inputs.
//!
//! # Testing Strategy
//!
//! The server is the single writer of game state and clients replay its
//! messages, so every step must be reproducible. Sources of
//! non-determinism include:
//!
//! - **HashMap iteration order**: Rust's default hasher is randomized.
//!   Objects and regions live in `BTreeMap`s and are iterated in id order.
//!
//! - **System randomness**: No calls to `rand()` without explicit seeds.
//!   Map generation and AI wandering take a seeded `ChaCha8Rng`.
//!
//! - **Traversal order**: Flood fills and path searches visit neighbours in
//!   the fixed [`Direction::ALL`](col_core::map::Direction::ALL) order.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: Individual operations (fill, discover, move)
//! 2. **Property tests**: Random maps must still partition reproducibly
//! 3. **Integration tests**: Full turn sequences are reproducible
//! 4. **Parallel tests**: Running N generations in parallel all match

use std::thread;

use col_core::game::Game;
use col_core::map::Map;
use col_core::map_generation::{generate_map, MapConfig};

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of steps run.
    pub steps: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic run).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the runs were deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Runs are non-deterministic!\n\
                 Runs: {}\n\
                 Steps: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.steps,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a scenario multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run the scenario
/// * `steps` - Number of steps per run
/// * `setup` - Function to create initial state
/// * `step` - Function to advance the state by one step
/// * `hash` - Function to compute state hash
///
/// # Example
///
/// ```
/// use col_test_utils::determinism::verify_determinism;
/// use col_test_utils::fixtures::sample_game;
///
/// let result = verify_determinism(
///     3,
///     5,
///     || sample_game().game,
///     |game| { game.new_turn(); },
///     |game| game.state_hash(),
/// );
/// result.assert_deterministic();
/// ```
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    steps: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..steps {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        steps,
    }
}

/// Generate the same map twice and compare state hashes.
///
/// Regions are included, so this covers ocean partitioning as well.
#[must_use]
pub fn verify_map_generation_determinism(config: &MapConfig) -> bool {
    let hash = |config: &MapConfig| generate_map(config).map(|m| m.state_hash()).ok();
    match (hash(config), hash(config)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Generate the same map on `num_runs` threads and collect the hashes.
///
/// # Panics
///
/// Panics if a generating thread panics.
pub fn run_parallel_generations(config: &MapConfig, num_runs: usize) -> DeterminismResult {
    let hashes: Vec<u64> = thread::scope(|s| {
        let handles: Vec<_> = (0..num_runs)
            .map(|_| s.spawn(|| generate_map(config).map(|m| m.state_hash()).unwrap_or(0)))
            .collect();

        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    DeterminismResult {
        is_deterministic: hashes.windows(2).all(|w| w[0] == w[1]),
        hashes,
        steps: 1,
    }
}

/// Compare two games turn by turn, finding the first divergence.
///
/// Useful for debugging non-determinism by finding exactly when two runs
/// start to differ.
///
/// # Returns
///
/// `None` if the runs agree, `Some(turn)` if they diverge after that many
/// turns (0 for the initial state).
pub fn find_first_divergence<Setup, Step>(setup: Setup, step: Step, turns: u64) -> Option<u64>
where
    Setup: Fn() -> Game,
    Step: Fn(&mut Game),
{
    let mut a = setup();
    let mut b = setup();

    if a.state_hash() != b.state_hash() {
        return Some(0);
    }

    for turn in 1..=turns {
        step(&mut a);
        step(&mut b);

        if a.state_hash() != b.state_hash() {
            return Some(turn);
        }
    }

    None
}

/// Verify that a snapshot round trip preserves a map exactly.
#[must_use]
pub fn verify_map_snapshot(map: &Map) -> bool {
    map.serialize()
        .and_then(|bytes| Map::deserialize(&bytes))
        .is_ok_and(|restored| restored.state_hash() == map.state_hash())
}

/// Verify that a snapshot round trip preserves a game exactly.
#[must_use]
pub fn verify_game_snapshot(game: &Game) -> bool {
    game.serialize()
        .and_then(|bytes| Game::deserialize(&bytes))
        .is_ok_and(|restored| restored.state_hash() == game.state_hash())
}
