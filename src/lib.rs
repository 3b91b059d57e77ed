//! Fair rotating team assignment.
//!
//! Splits the players present at a session into balanced teams, round after
//! round, while making sure nobody sits out much more than anyone else:
//!
//! - **Roster**: players with skill values, ordered eligible positions and
//!   conflicts, plus per-position skill weight profiles.
//! - **Rating**: integer ratings from skills and position weights, exact
//!   enough for the solver to compare sums without floating point.
//! - **Assignment**: the constraint model that places players on teams and
//!   positions and minimizes the rating gap between teams.
//! - **CP (Constraint Programming)**: a generic model of boolean and integer
//!   variables with a deterministic branch-and-bound solver.
//! - **Ranking**: tries several team configurations and pools every
//!   candidate, best balance first.
//! - **Rotation**: the session state machine deciding who must play and who
//!   is benched before each round.
//!
//! # Architecture
//!
//! Data flows from the [`rotation`] controller (round roster) through the
//! [`assignment`] builder (model) and the [`cp`] solver (solution stream) into
//! the [`ranking`] pool, and the chosen candidate flows back into the
//! rotation state. Loading players from files, prompting users and writing
//! session logs belong to the caller.

pub mod assignment;
pub mod cp;
pub mod error;
pub mod ranking;
pub mod rating;
pub mod roster;
pub mod rotation;

#[cfg(test)]
mod fixtures;

pub use error::{DataError, EngineError, Infeasibility};
