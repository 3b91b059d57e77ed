//! Team assignment as a constraint model.
//!
//! For one round roster and one [`Configuration`], the builder creates:
//!
//! - `assigned(p, t)`: player `p` is on team `t` (at most one team, exactly
//!   one for mandatory players)
//! - `plays(p, k)`: player `p` plays eligible position `k`, chosen iff
//!   the player is assigned
//! - `filled(p, t, k) = assigned(p, t) AND plays(p, k)`, summed per team and
//!   position to meet the team shape exactly
//! - `primary(p, t)` / `secondary(p, t)`: whether the chosen position is the
//!   player's primary one
//! - `rating(t)`, the summed ratings of team `t`, and `gap = max - min`
//!
//! Conflicting players never share a team. The objective minimizes
//! `gap - K * Σ primary`; with `K` far below the rating scale the primary
//! count only separates assignments of (nearly) equal balance.

mod builder;
mod types;

pub use builder::{AssignmentModel, AssignmentModelBuilder, DEFAULT_PRIMARY_BONUS};
pub use types::{
    CandidateSolution, Configuration, Placement, RoundRoster, TeamLineup, TeamShape,
};
