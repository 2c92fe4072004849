//! Pure game logic: no I/O, clocks and RNGs injected by callers.

pub mod billing;
pub mod claim;
pub mod difficulty;
pub mod guardian;
pub mod hunt;
pub mod lootgen;

pub use claim::{ClaimError, ClaimGesture, ClaimOutcome, GestureSample, SampleKind};
pub use difficulty::Difficulty;
pub use guardian::GuardianEngine;
pub use hunt::{HUNT_PHASES, HuntProgress, SpottedVault};
