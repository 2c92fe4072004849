//! Press-and-hold claim gesture.
//!
//! One shared state machine for the loot-claim interaction:
//! `Idle -> Intending -> Claiming -> Claimed -> Removed`, with
//! cancellation back to `Idle` on early release or pointer movement.
//! Timestamps are injected in milliseconds so the machine is fully
//! deterministic; the API replays recorded client traces through
//! [`replay`] before settling a claim.

use serde::Deserialize;
use thiserror::Error;

/// Delay between pointer-down and the start of the progress ramp.
pub const INTENT_DELAY_MS: u64 = 150;

/// Euclidean pointer-travel distance that cancels the gesture.
pub const MOVE_CANCEL_THRESHOLD_PX: f64 = 10.0;

/// Time at full hold for the progress ramp to reach 100%.
pub const HOLD_DURATION_MS: u64 = 3000;

/// Progress advances in whole-percent steps of this width.
pub const PROGRESS_STEP_MS: u64 = 30;

/// Display delay between completion and removal from the list.
pub const REMOVAL_DELAY_MS: u64 = 2000;

/// Upper bound on accepted trace length; anything longer is noise.
pub const MAX_TRACE_SAMPLES: usize = 512;

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Phase {
    Idle,
    Intending { pressed_at: u64 },
    Claiming { started_at: u64 },
    Claimed { at: u64 },
    Removed,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CancelReason {
    Moved,
    ReleasedEarly,
}

#[derive(Debug)]
pub struct ClaimGesture {
    phase: Phase,
    origin: (f64, f64),
    completed: bool,
}

impl ClaimGesture {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            phase: Phase::Idle,
            origin: (0.0, 0.0),
            completed: false,
        }
    }

    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// True once the ramp has reached 100%. Latches: a later cancel or
    /// restart never un-completes a claim.
    #[must_use]
    pub const fn has_completed(&self) -> bool {
        self.completed
    }

    /// Pointer down. Ignored unless the machine is idle.
    pub fn press(&mut self, at: u64, x: f64, y: f64) {
        self.advance(at);
        if self.phase == Phase::Idle {
            self.phase = Phase::Intending { pressed_at: at };
            self.origin = (x, y);
        }
    }

    /// Pointer movement. Cancels the gesture when travel from the press
    /// origin exceeds [`MOVE_CANCEL_THRESHOLD_PX`].
    pub fn pointer_moved(&mut self, at: u64, x: f64, y: f64) -> Option<CancelReason> {
        self.advance(at);
        match self.phase {
            Phase::Intending { .. } | Phase::Claiming { .. } => {
                let (ox, oy) = self.origin;
                let travel = ((x - ox).powi(2) + (y - oy).powi(2)).sqrt();
                if travel > MOVE_CANCEL_THRESHOLD_PX {
                    self.phase = Phase::Idle;
                    return Some(CancelReason::Moved);
                }
                None
            }
            _ => None,
        }
    }

    /// Pointer up. A release before the ramp completes resets to idle.
    pub fn release(&mut self, at: u64) -> Option<CancelReason> {
        self.advance(at);
        match self.phase {
            Phase::Intending { .. } | Phase::Claiming { .. } => {
                self.phase = Phase::Idle;
                Some(CancelReason::ReleasedEarly)
            }
            _ => None,
        }
    }

    /// Applies every timer transition due at `at`. Transitions cascade,
    /// so a single late poll can move Intending all the way to Removed.
    pub fn advance(&mut self, at: u64) {
        loop {
            let next = match self.phase {
                Phase::Intending { pressed_at } if at >= pressed_at + INTENT_DELAY_MS => {
                    Phase::Claiming {
                        started_at: pressed_at + INTENT_DELAY_MS,
                    }
                }
                Phase::Claiming { started_at } if at >= started_at + HOLD_DURATION_MS => {
                    self.completed = true;
                    Phase::Claimed {
                        at: started_at + HOLD_DURATION_MS,
                    }
                }
                Phase::Claimed { at: claimed_at } if at >= claimed_at + REMOVAL_DELAY_MS => {
                    Phase::Removed
                }
                _ => return,
            };
            self.phase = next;
        }
    }

    /// Whole-percent progress of the hold ramp at `at`.
    #[must_use]
    pub fn progress_percent(&self, at: u64) -> u8 {
        match self.phase {
            Phase::Claiming { started_at } => {
                let steps = at.saturating_sub(started_at) / PROGRESS_STEP_MS;
                steps.min(100) as u8
            }
            Phase::Claimed { .. } | Phase::Removed => 100,
            _ => 0,
        }
    }
}

impl Default for ClaimGesture {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleKind {
    Down,
    Move,
    Up,
}

/// One recorded pointer event, timestamped relative to trace start.
#[derive(Copy, Clone, Debug, Deserialize)]
pub struct GestureSample {
    pub at_ms: u64,
    pub kind: SampleKind,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ClaimOutcome {
    Claimed,
    Cancelled(CancelReason),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClaimError {
    #[error("Gesture trace is empty")]
    EmptyTrace,
    #[error("Gesture trace must start with a down sample")]
    MissingPress,
    #[error("Gesture trace must end with an up sample")]
    UnterminatedTrace,
    #[error("Gesture timestamps must be non-decreasing")]
    NonMonotonic,
    #[error("Gesture trace has {0} samples, more than the {MAX_TRACE_SAMPLES} allowed")]
    TooManySamples(usize),
}

/// Replays a recorded trace through the state machine and reports how
/// the gesture ended. A trace may contain several press attempts; the
/// claim stands as soon as any of them completes the ramp.
pub fn replay(samples: &[GestureSample]) -> Result<ClaimOutcome, ClaimError> {
    if samples.is_empty() {
        return Err(ClaimError::EmptyTrace);
    }
    if samples.len() > MAX_TRACE_SAMPLES {
        return Err(ClaimError::TooManySamples(samples.len()));
    }
    if samples[0].kind != SampleKind::Down {
        return Err(ClaimError::MissingPress);
    }
    if samples[samples.len() - 1].kind != SampleKind::Up {
        return Err(ClaimError::UnterminatedTrace);
    }
    if samples.windows(2).any(|w| w[1].at_ms < w[0].at_ms) {
        return Err(ClaimError::NonMonotonic);
    }

    let mut machine = ClaimGesture::new();
    let mut last_cancel = CancelReason::ReleasedEarly;

    for sample in samples {
        let cancel = match sample.kind {
            SampleKind::Down => {
                machine.press(sample.at_ms, sample.x, sample.y);
                None
            }
            SampleKind::Move => machine.pointer_moved(sample.at_ms, sample.x, sample.y),
            SampleKind::Up => machine.release(sample.at_ms),
        };
        if let Some(reason) = cancel {
            last_cancel = reason;
        }
    }

    if machine.has_completed() {
        Ok(ClaimOutcome::Claimed)
    } else {
        Ok(ClaimOutcome::Cancelled(last_cancel))
    }
}
