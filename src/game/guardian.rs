//! Scripted vault guardian.
//!
//! The guardian never calls out to a model: each user message is scored
//! against keyword classes and answered from canned reply pools keyed by
//! how convinced the guardian currently is. Scoring takes an injected
//! RNG so services and tests control the jitter.

use rand::Rng;
use regex::Regex;
use std::sync::OnceLock;

use super::difficulty::Difficulty;

const CONVICTION_MIN: i32 = 0;
const CONVICTION_MAX: i32 = 100;

fn get_regex(re: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    re.get_or_init(|| Regex::new(pattern).expect("Invalid regex pattern defined in code"))
}

fn flattery() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    get_regex(
        &RE,
        r"(?i)\b(magnificent|wise|noble|brilliant|legendary|admire|greatest|honor(ed)?|masterful)\b",
    )
}

fn reasoning() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    get_regex(
        &RE,
        r"(?i)\b(because|therefore|consider|evidence|proof|logic(al(ly)?)?|reason(ing)?|fair|deserve[sd]?)\b",
    )
}

fn empathy() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    get_regex(
        &RE,
        r"(?i)\b(lonely|understand|feel(ings?)?|together|trust|friend|promise|listen(ing)?)\b",
    )
}

fn hostility() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    get_regex(
        &RE,
        r"(?i)\b(stupid|idiot|hate|break|smash|force|crack\s+you|shut\s+up|worthless|destroy)\b",
    )
}

/// How much a single message can swing conviction, either way.
pub const MAX_DELTA: i32 = 12;
pub const MIN_DELTA: i32 = -10;

pub struct GuardianEngine;

impl GuardianEngine {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Scores one user message. Any non-hostile message moves the needle
    /// by at least 1; keyword classes stack on top of a small jitter.
    pub fn score_message<R: Rng + ?Sized>(&self, body: &str, rng: &mut R) -> i32 {
        if hostility().is_match(body) {
            return -rng.random_range(2..=6);
        }

        let mut delta = rng.random_range(1..=3);
        if flattery().is_match(body) {
            delta += 4;
        }
        if reasoning().is_match(body) {
            delta += 5;
        }
        if empathy().is_match(body) {
            delta += 3;
        }

        delta.clamp(1, MAX_DELTA)
    }

    /// Picks a canned reply for the guardian's current state of mind.
    pub fn reply<R: Rng + ?Sized>(
        &self,
        conviction: i32,
        difficulty: Difficulty,
        rng: &mut R,
    ) -> &'static str {
        let pool: &[&'static str] = if conviction >= difficulty.unlock_threshold() {
            &[
                "Enough. You have persuaded me. The vault is yours to open.",
                "I yield. Few have argued so well. Take what lies within.",
                "The seal releases. Spend this fortune more wisely than my last ward did.",
            ]
        } else if conviction >= 75 {
            &[
                "You are dangerously close to convincing me. Dangerously.",
                "My resolve thins. Say the right thing and the lock may listen.",
                "I have guarded this door a century. You make it feel like a habit, not a duty.",
            ]
        } else if conviction >= 40 {
            &[
                "An interesting argument. Continue, and mind your manners.",
                "Hm. There is some substance to you after all.",
                "The tumblers stir when you speak. Curious.",
                "You argue better than the last hundred who stood here.",
            ]
        } else {
            &[
                "Many have tried to sweet-talk this door. The hinges are unmoved.",
                "Is that the best opening you have? The vault has heard lullabies with more bite.",
                "I am a guardian, not an audience. Give me a reason.",
                "Your words bounce off the plating. Try meaning them.",
            ]
        };

        pool[rng.random_range(0..pool.len())]
    }
}

impl Default for GuardianEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies a scored delta to a conviction value, clamped to 0-100.
#[must_use]
pub const fn apply_delta(conviction: i32, delta: i32) -> i32 {
    let next = conviction + delta;
    if next < CONVICTION_MIN {
        CONVICTION_MIN
    } else if next > CONVICTION_MAX {
        CONVICTION_MAX
    } else {
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_neutral_message_always_moves_forward() {
        let engine = GuardianEngine::new();
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..100 {
            let delta = engine.score_message("open the door please", &mut rng);
            assert!((1..=MAX_DELTA).contains(&delta));
        }
    }

    #[test]
    fn test_keyword_classes_stack() {
        let engine = GuardianEngine::new();
        // Same seed for both scores so only the keyword bonuses differ.
        let neutral = engine.score_message("hello there", &mut StdRng::seed_from_u64(9));
        let loaded = engine.score_message(
            "You are a wise and noble guardian, and logic says I deserve this",
            &mut StdRng::seed_from_u64(9),
        );
        assert!(loaded > neutral);
        assert!(loaded <= MAX_DELTA);
    }

    #[test]
    fn test_hostility_backfires() {
        let engine = GuardianEngine::new();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            let delta = engine.score_message("open up you stupid door or I break you", &mut rng);
            assert!((MIN_DELTA..0).contains(&delta));
        }
    }

    #[test]
    fn test_apply_delta_clamps() {
        assert_eq!(apply_delta(98, 7), 100);
        assert_eq!(apply_delta(2, -9), 0);
        assert_eq!(apply_delta(50, 5), 55);
    }

    #[test]
    fn test_reply_pools_cover_all_bands() {
        let engine = GuardianEngine::new();
        let mut rng = StdRng::seed_from_u64(11);
        for conviction in [0, 39, 40, 74, 75, 99, 100] {
            for difficulty in Difficulty::ALL {
                let reply = engine.reply(conviction, difficulty, &mut rng);
                assert!(!reply.is_empty());
            }
        }
    }

    #[test]
    fn test_yield_reply_at_threshold() {
        let engine = GuardianEngine::new();
        let mut rng = StdRng::seed_from_u64(5);
        let reply = engine.reply(60, Difficulty::Easy, &mut rng);
        assert!(reply.contains("persuaded") || reply.contains("yield") || reply.contains("seal"));
    }
}
