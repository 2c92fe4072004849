//! Random loot rolled for a vault when it is created.

use rand::Rng;

use super::difficulty::Difficulty;

#[derive(Clone, Debug)]
pub struct LootRoll {
    pub name: String,
    pub rarity: &'static str,
    pub value_cents: i64,
}

const ADJECTIVES: &[&str] = &[
    "Tarnished", "Gilded", "Cracked", "Engraved", "Sealed", "Antique", "Polished", "Etched",
    "Lacquered", "Weathered",
];

const OBJECTS: &[&str] = &[
    "Signet", "Locket", "Ledger", "Astrolabe", "Chalice", "Music Box", "Pocket Watch", "Tiara",
    "Dagger", "Snuffbox", "Compass", "Inkwell",
];

/// Rarity ladder; higher tiers shift the roll toward the top end.
const RARITIES: &[&str] = &["common", "rare", "epic", "legendary"];

fn roll_rarity<R: Rng + ?Sized>(rng: &mut R, difficulty: Difficulty) -> &'static str {
    let bump = match difficulty {
        Difficulty::Easy => 0,
        Difficulty::Medium => 10,
        Difficulty::Hard => 25,
        Difficulty::Legendary => 45,
    };

    let roll = rng.random_range(0..100) + bump;
    let index = match roll {
        0..55 => 0,
        55..85 => 1,
        85..110 => 2,
        _ => 3,
    };
    RARITIES[index]
}

/// Rolls `count` loot items for a vault of the given difficulty.
pub fn roll_loot<R: Rng + ?Sized>(
    rng: &mut R,
    difficulty: Difficulty,
    count: i32,
) -> Vec<LootRoll> {
    let (min, max) = difficulty.loot_value_range_cents();

    (0..count.max(0))
        .map(|_| {
            let adjective = ADJECTIVES[rng.random_range(0..ADJECTIVES.len())];
            let object = OBJECTS[rng.random_range(0..OBJECTS.len())];
            LootRoll {
                name: format!("{adjective} {object}"),
                rarity: roll_rarity(rng, difficulty),
                value_cents: rng.random_range(min..=max),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_roll_count_and_bounds() {
        let mut rng = StdRng::seed_from_u64(21);
        let rolls = roll_loot(&mut rng, Difficulty::Hard, 6);
        assert_eq!(rolls.len(), 6);

        let (min, max) = Difficulty::Hard.loot_value_range_cents();
        for roll in &rolls {
            assert!(!roll.name.is_empty());
            assert!(RARITIES.contains(&roll.rarity));
            assert!((min..=max).contains(&roll.value_cents));
        }
    }

    #[test]
    fn test_negative_count_rolls_nothing() {
        let mut rng = StdRng::seed_from_u64(3);
        assert!(roll_loot(&mut rng, Difficulty::Easy, -2).is_empty());
    }

    #[test]
    fn test_legendary_vaults_skew_rarer() {
        let mut rng = StdRng::seed_from_u64(8);
        let easy = roll_loot(&mut rng, Difficulty::Easy, 200);
        let legendary = roll_loot(&mut rng, Difficulty::Legendary, 200);

        let count_top = |rolls: &[LootRoll]| {
            rolls
                .iter()
                .filter(|r| r.rarity == "epic" || r.rarity == "legendary")
                .count()
        };
        assert!(count_top(&legendary) > count_top(&easy));
    }
}
