//! Player ratings.
//!
//! A rating is the weighted mean of a player's skills under a position's
//! weight profile, scaled to an integer so that every downstream sum is
//! exact:
//!
//! ```text
//! rating = round( Σ skill[s] * w[s] / Σ w[s] * scale )
//! ```
//!
//! Each player gets a primary rating (profile of the first listed position)
//! and an adjusted rating used when playing off-position. The adjusted
//! rating currently applies no penalty and equals the primary rating.

mod calculator;

pub use calculator::{PlayerRatings, RatingCalculator, RatingTable, DEFAULT_RATING_SCALE};
