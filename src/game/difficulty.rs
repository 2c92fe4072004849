use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Vault difficulty tier. Stored as lowercase text in the database and
/// parsed back through this enum at the edges.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Legendary,
}

impl Difficulty {
    pub const ALL: [Self; 4] = [Self::Easy, Self::Medium, Self::Hard, Self::Legendary];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
            Self::Legendary => "legendary",
        }
    }

    /// Conviction score at which the guardian gives in and the vault opens.
    #[must_use]
    pub const fn unlock_threshold(self) -> i32 {
        match self {
            Self::Easy => 60,
            Self::Medium => 75,
            Self::Hard => 90,
            Self::Legendary => 99,
        }
    }

    /// Rough value band for loot generated behind this tier, in cents.
    #[must_use]
    pub const fn loot_value_range_cents(self) -> (i64, i64) {
        match self {
            Self::Easy => (500, 5_000),
            Self::Medium => (2_500, 25_000),
            Self::Hard => (10_000, 100_000),
            Self::Legendary => (50_000, 1_000_000),
        }
    }

    /// Lenient parse used when reading stored rows: unknown text falls
    /// back to `Medium` rather than failing the whole read.
    #[must_use]
    pub fn from_stored(s: &str) -> Self {
        s.parse().unwrap_or(Self::Medium)
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            "legendary" => Ok(Self::Legendary),
            other => Err(format!(
                "Unknown difficulty '{other}'. Expected easy, medium, hard or legendary"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roundtrip() {
        for d in Difficulty::ALL {
            assert_eq!(d.as_str().parse::<Difficulty>().unwrap(), d);
        }
        assert_eq!("LEGENDARY".parse::<Difficulty>().unwrap(), Difficulty::Legendary);
        assert!("impossible".parse::<Difficulty>().is_err());
    }

    #[test]
    fn test_thresholds_increase_with_tier() {
        let thresholds: Vec<i32> = Difficulty::ALL
            .iter()
            .map(|d| d.unlock_threshold())
            .collect();
        assert!(thresholds.windows(2).all(|w| w[0] < w[1]));
        assert!(thresholds.iter().all(|t| (1..=100).contains(t)));
    }

    #[test]
    fn test_from_stored_falls_back_to_medium() {
        assert_eq!(Difficulty::from_stored("garbage"), Difficulty::Medium);
        assert_eq!(Difficulty::from_stored("hard"), Difficulty::Hard);
    }
}
