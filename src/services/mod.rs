pub mod hunts;
pub mod offensives;

pub use hunts::{HuntService, HuntSnapshot};
pub use offensives::{ExchangeOutcome, OffensiveError, OffensiveService};
