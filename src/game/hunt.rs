//! Vault hunting simulator.
//!
//! A hunt runs a fixed, ordered plan of 8 named phases. Overall progress
//! is `(completed_phases / total) + (current_phase_progress / total)`,
//! reported as a percentage. During the first [`SPAWN_PHASES`] phases
//! each phase may spot a new vault; the spawn roll and the spotted
//! vault's attributes come from an injected RNG so the whole plan is
//! testable without wall-clock time.

use rand::Rng;
use serde::Serialize;

use super::difficulty::Difficulty;

#[derive(Copy, Clone, Debug)]
pub struct HuntPhase {
    pub name: &'static str,
    pub message: &'static str,
    pub duration_ms: u64,
}

/// The scripted hunt plan. Order and count are part of the contract.
pub const HUNT_PHASES: [HuntPhase; 8] = [
    HuntPhase {
        name: "calibrate",
        message: "Calibrating resonance scanner",
        duration_ms: 1200,
    },
    HuntPhase {
        name: "sweep",
        message: "Sweeping district frequencies",
        duration_ms: 1800,
    },
    HuntPhase {
        name: "triangulate",
        message: "Triangulating encrypted beacons",
        duration_ms: 1600,
    },
    HuntPhase {
        name: "decode",
        message: "Decoding vault signatures",
        duration_ms: 1400,
    },
    HuntPhase {
        name: "verify",
        message: "Cross-checking registry records",
        duration_ms: 1100,
    },
    HuntPhase {
        name: "rank",
        message: "Ranking candidate sites",
        duration_ms: 900,
    },
    HuntPhase {
        name: "secure",
        message: "Securing channel to guardians",
        duration_ms: 800,
    },
    HuntPhase {
        name: "finalize",
        message: "Compiling hunt report",
        duration_ms: 700,
    },
];

/// Only the opening phases can spot vaults.
pub const SPAWN_PHASES: usize = 3;

#[must_use]
pub const fn total_duration_ms() -> u64 {
    let mut total = 0;
    let mut i = 0;
    while i < HUNT_PHASES.len() {
        total += HUNT_PHASES[i].duration_ms;
        i += 1;
    }
    total
}

#[derive(Clone, Debug, Serialize)]
pub struct HuntProgress {
    pub phase_index: usize,
    pub phase_name: &'static str,
    pub message: &'static str,
    pub percent: f64,
    pub finished: bool,
}

/// Snapshot of the plan at `elapsed_ms` since hunt start.
#[must_use]
pub fn progress_at(elapsed_ms: u64) -> HuntProgress {
    let total = HUNT_PHASES.len() as f64;
    let mut remaining = elapsed_ms;

    for (index, phase) in HUNT_PHASES.iter().enumerate() {
        if remaining < phase.duration_ms {
            let phase_progress = remaining as f64 / phase.duration_ms as f64;
            let percent = ((index as f64 / total) + (phase_progress / total)) * 100.0;
            return HuntProgress {
                phase_index: index,
                phase_name: phase.name,
                message: phase.message,
                percent,
                finished: false,
            };
        }
        remaining -= phase.duration_ms;
    }

    let last = HUNT_PHASES.len() - 1;
    HuntProgress {
        phase_index: last,
        phase_name: HUNT_PHASES[last].name,
        message: HUNT_PHASES[last].message,
        percent: 100.0,
        finished: true,
    }
}

/// A vault spotted mid-hunt, before it is persisted.
#[derive(Clone, Debug, Serialize)]
pub struct SpottedVault {
    pub name: String,
    pub location: String,
    pub estimated_value_cents: i64,
    pub difficulty: Difficulty,
}

const NAME_PREFIXES: &[&str] = &[
    "Obsidian", "Gilded", "Hollow", "Ashen", "Sunken", "Whispering", "Ironbound", "Velvet",
    "Forgotten", "Crimson",
];

const NAME_SUFFIXES: &[&str] = &[
    "Reliquary", "Strongbox", "Cache", "Coffer", "Depository", "Crypt", "Lockup", "Hoard",
];

const LOCATIONS: &[&str] = &[
    "Old Mint Quarter",
    "Harbor Undercroft",
    "Clockwork Arcade",
    "Drowned Exchange",
    "Lantern Row",
    "Saltglass Terrace",
    "Museum Substreet",
    "Foundry Vaults",
];

/// Rolls whether the current phase spots a vault.
pub fn should_spawn<R: Rng + ?Sized>(rng: &mut R, chance: f64) -> bool {
    rng.random::<f64>() < chance
}

/// Generates a spotted vault with randomized name, location and value.
/// Harder tiers are rarer and carry larger value bands.
pub fn spot_vault<R: Rng + ?Sized>(rng: &mut R) -> SpottedVault {
    let difficulty = match rng.random_range(0..100) {
        0..40 => Difficulty::Easy,
        40..70 => Difficulty::Medium,
        70..92 => Difficulty::Hard,
        _ => Difficulty::Legendary,
    };

    let prefix = NAME_PREFIXES[rng.random_range(0..NAME_PREFIXES.len())];
    let suffix = NAME_SUFFIXES[rng.random_range(0..NAME_SUFFIXES.len())];
    let location = LOCATIONS[rng.random_range(0..LOCATIONS.len())];

    let (min, max) = difficulty.loot_value_range_cents();

    SpottedVault {
        name: format!("{prefix} {suffix}"),
        location: location.to_string(),
        estimated_value_cents: rng.random_range(min..=max),
        difficulty,
    }
}

/// Number of loot items a spotted vault opens with.
pub fn spawned_item_amount<R: Rng + ?Sized>(rng: &mut R, difficulty: Difficulty) -> i32 {
    match difficulty {
        Difficulty::Easy => rng.random_range(2..=4),
        Difficulty::Medium => rng.random_range(3..=6),
        Difficulty::Hard => rng.random_range(4..=8),
        Difficulty::Legendary => rng.random_range(6..=12),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_plan_has_eight_phases() {
        assert_eq!(HUNT_PHASES.len(), 8);
        assert!(HUNT_PHASES.iter().all(|p| p.duration_ms > 0));
        assert!(SPAWN_PHASES < HUNT_PHASES.len());
    }

    #[test]
    fn test_progress_formula() {
        assert!((progress_at(0).percent - 0.0).abs() < f64::EPSILON);

        // Halfway through the first phase: (0/8 + 0.5/8) * 100 = 6.25%.
        let p = progress_at(600);
        assert_eq!(p.phase_index, 0);
        assert!((p.percent - 6.25).abs() < 1e-9);

        // Exactly at the start of phase 5 (index 4): 4/8 = 50%.
        let into_fifth: u64 = HUNT_PHASES[..4].iter().map(|p| p.duration_ms).sum();
        let p = progress_at(into_fifth);
        assert_eq!(p.phase_index, 4);
        assert!((p.percent - 50.0).abs() < 1e-9);
        assert!(!p.finished);
    }

    #[test]
    fn test_progress_monotonic_and_finishes() {
        let mut last = -1.0;
        for t in (0..=total_duration_ms()).step_by(50) {
            let p = progress_at(t);
            assert!(p.percent >= last, "progress went backwards at {t}ms");
            last = p.percent;
        }
        let done = progress_at(total_duration_ms());
        assert!(done.finished);
        assert!((done.percent - 100.0).abs() < f64::EPSILON);
        assert_eq!(done.phase_index, HUNT_PHASES.len() - 1);
    }

    #[test]
    fn test_spawn_roll_respects_chance_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        assert!((0..100).all(|_| !should_spawn(&mut rng, 0.0)));
        assert!((0..100).all(|_| should_spawn(&mut rng, 1.0)));
    }

    #[test]
    fn test_spotted_vault_shape() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..50 {
            let v = spot_vault(&mut rng);
            assert!(!v.name.is_empty());
            assert!(!v.location.is_empty());
            let (min, max) = v.difficulty.loot_value_range_cents();
            assert!((min..=max).contains(&v.estimated_value_cents));

            let items = spawned_item_amount(&mut rng, v.difficulty);
            assert!(items >= 2);
        }
    }
}
