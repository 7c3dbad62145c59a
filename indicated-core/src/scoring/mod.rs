//! Signal interpreter and score aggregator.
//!
//! Each indicator result is interpreted into classification lines and a
//! contribution weighted by the mode's `max_score`; the aggregator sums the
//! contributions into the composite score and maps it to a recommendation.

pub mod aggregate;
pub mod interpret;

pub use aggregate::{composite_score, round_score, Assessment, Mode, Recommendation, ScoreRecord};
pub use interpret::{Interpret, Interpretation};
