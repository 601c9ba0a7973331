//! Determinism testing utilities.
//!
//! Provides a harness for verifying that the battle simulation
//! produces identical results given identical inputs.
//!
//! # Testing Strategy
//!
//! The battle core must be 100% deterministic so the server stays
//! authoritative and replays verify. Sources of non-determinism include:
//!
//! - **Floating-point math**: Different CPUs can produce different
//!   results. We use fixed-point arithmetic via
//!   [`battle_core::math::Fixed`] throughout.
//!
//! - **HashMap iteration order**: Rust's default hasher is randomized.
//!   We always iterate in sorted unit ID order.
//!
//! - **System randomness**: The core takes no entropy at all; every
//!   outcome follows from state, context and inputs.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: Individual component determinism (planner, executor)
//! 2. **Property tests**: Random inputs must still produce deterministic outputs
//! 3. **Integration tests**: Full battle scenarios are reproducible
//! 4. **Parallel tests**: Running N battles in parallel all match

use std::thread;

use battle_core::prelude::*;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of frames simulated.
    pub frames: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic battle).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the battle was deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Battle is non-deterministic!\n\
                 Runs: {}\n\
                 Frames: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.frames,
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
/// * `frames` - Number of frames to simulate per run
/// * `setup` - Function to create the initial battle
/// * `step` - Function to advance the battle by one frame
/// * `hash` - Function to compute the state hash
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    frames: u64,
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
        for _ in 0..frames {
            step(&mut state);
        }
        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        frames,
    }
}

/// Simplified determinism verification for [`Battle`].
///
/// Runs the battle twice with identical setup, no player input, and
/// verifies the final state hashes match exactly.
pub fn verify_battle_determinism<F>(setup_fn: F, num_frames: u64) -> bool
where
    F: Fn() -> Battle,
{
    let result = verify_determinism(
        2,
        num_frames,
        &setup_fn,
        |battle| {
            battle.advance_frame();
        },
        Battle::state_hash,
    );
    result.is_deterministic
}

/// Run N battles in parallel and verify they all end in the same state.
///
/// Catches non-determinism that only manifests under thread scheduling
/// variations or memory layout differences.
///
/// # Panics
///
/// Panics if any run diverges, or if a worker thread panics.
pub fn run_parallel_battles<F>(setup_fn: F, num_battles: usize, num_frames: u64)
where
    F: Fn() -> Battle + Sync,
{
    let hashes: Vec<u64> = thread::scope(|s| {
        let handles: Vec<_> = (0..num_battles)
            .map(|_| {
                s.spawn(|| {
                    let mut battle = setup_fn();
                    for _ in 0..num_frames {
                        battle.advance_frame();
                    }
                    battle.state_hash()
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("battle thread panicked"))
            .collect()
    });

    assert!(
        hashes.windows(2).all(|w| w[0] == w[1]),
        "Parallel battles diverged: {hashes:?}"
    );
}

/// Compare two runs frame-by-frame, finding the first divergence.
///
/// Returns `None` if the runs match for the whole duration, or
/// `Some(frame)` for the first frame with differing hashes.
pub fn find_first_divergence<F>(setup_fn: F, num_frames: u64) -> Option<u64>
where
    F: Fn() -> Battle,
{
    let mut first = setup_fn();
    let mut second = setup_fn();

    if first.state_hash() != second.state_hash() {
        return Some(0);
    }

    for frame in 1..=num_frames {
        first.advance_frame();
        second.advance_frame();
        if first.state_hash() != second.state_hash() {
            return Some(frame);
        }
    }
    None
}

/// Verify that a serialization round-trip preserves the battle exactly.
///
/// The context is not part of the serialized state, so the caller
/// supplies the one the restored battle should run over. This is
/// critical for save/load and replay capture.
pub fn verify_serialization_determinism<F>(
    setup_fn: F,
    ctx: std::sync::Arc<BattleContext>,
    num_frames: u64,
) -> bool
where
    F: Fn() -> Battle,
{
    let mut battle = setup_fn();
    for _ in 0..num_frames {
        battle.advance_frame();
    }
    let hash_before = battle.state_hash();

    let Ok(bytes) = battle.serialize() else {
        return false;
    };
    let Ok(restored) = Battle::deserialize(&bytes, ctx) else {
        return false;
    };

    restored.state_hash() == hash_before
}

/// Proptest strategies for determinism testing.
pub mod strategies {
    use proptest::prelude::*;

    use battle_core::prelude::*;

    /// A fixed-point coordinate inside a 16x16 arena of 16-unit tiles.
    pub fn arb_arena_coord() -> impl Strategy<Value = Fixed> {
        (8i32..248i32).prop_map(Fixed::from_num)
    }

    /// A world position inside the test arena.
    pub fn arb_arena_position() -> impl Strategy<Value = Vec2Fixed> {
        (arb_arena_coord(), arb_arena_coord()).prop_map(|(x, y)| Vec2Fixed::new(x, y))
    }

    /// An integer spawn position on tile centers of the test arena.
    pub fn arb_spawn_pos() -> impl Strategy<Value = (i32, i32)> {
        (0i32..16, 0i32..16).prop_map(|(tx, ty)| (tx * 16 + 8, ty * 16 + 8))
    }

    /// A stat block with small, battle-plausible values.
    pub fn arb_stats() -> impl Strategy<Value = Stats> {
        (0i32..10, 1i32..8, 0i32..10, 0i32..10, 0i32..10).prop_map(
            |(resilience, movement, str, mag, wis)| Stats {
                resilience,
                movement,
                str,
                mag,
                wis,
            },
        )
    }
}
