//! Session data model: players, skills, and position weight profiles.
//!
//! Everything in this module is loaded once per session and treated as
//! immutable afterwards. Parsing and normalising source tables is the
//! loader's job; the [`Roster`] only enforces that player names are unique.

mod table;
mod types;

pub use table::Roster;
pub use types::{Player, PositionProfile, Skill};
