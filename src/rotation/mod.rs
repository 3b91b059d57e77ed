//! Session rotation.
//!
//! Decides, before every round, who must play and who rests, and records
//! the outcome of the round afterwards. Players left out of one round are
//! guaranteed a place in the next; to make room, the players with the
//! longest unbroken streak are benched.

mod controller;
mod state;

pub use controller::{ArrivalReport, RotationConfig, RotationController, RoundPlan};
pub use state::{PlayerRecord, RotationPhase, SessionState, StatsRow};
