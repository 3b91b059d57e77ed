//! Error taxonomy.
//!
//! [`EngineError`] aborts the call that produced it. [`Infeasibility`] is the
//! recoverable outcome of a single configuration and is reported alongside
//! the ranked pool instead of being raised.

use crate::roster::Skill;
use thiserror::Error;

/// Inconsistent input data detected while rating players.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    #[error("player '{player}' has no value for skill {skill}")]
    MissingSkill { player: String, skill: Skill },

    #[error("position '{position}' has no weight for skill {skill}")]
    MissingWeight { position: String, skill: Skill },

    #[error("player '{player}' lists position '{position}' which has no weight profile")]
    UnknownPosition { player: String, position: String },

    #[error("player '{player}' has no eligible positions")]
    NoPositions { player: String },

    #[error("position '{position}' has zero total weight")]
    ZeroWeight { position: String },

    #[error("invalid {skill} value {value} on '{owner}'")]
    InvalidValue {
        owner: String,
        skill: Skill,
        value: f64,
    },
}

/// Failure that aborts an engine call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("data inconsistency: {0}")]
    DataInconsistency(#[from] DataError),

    #[error("unknown player '{name}'")]
    UnknownPlayer { name: String },

    #[error("duplicate player '{name}'")]
    DuplicatePlayer { name: String },

    #[error("no rating computed for player '{name}'")]
    MissingRating { name: String },

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("invalid winning team {team}: the solution has {teams} teams")]
    InvalidWinner { team: usize, teams: usize },

    #[error("no round has been planned")]
    NoRoundPlanned,

    #[error("outcome does not match the planned round: {0}")]
    OutcomeMismatch(String),

    #[error("solver rejected the model: {0}")]
    ModelInvalid(String),
}

/// Why a configuration produced no candidate solutions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Infeasibility {
    #[error("{available} players present but the configuration needs {required}")]
    InsufficientRoster { required: usize, available: usize },

    #[error("position '{position}' needs {required} players but only {available} are eligible")]
    PositionShortage {
        position: String,
        required: usize,
        available: usize,
    },

    #[error("{mandatory} mandatory players exceed the {capacity} available slots")]
    TooManyMandatory { mandatory: usize, capacity: usize },

    #[error("no feasible assignment exists")]
    InfeasibleModel,

    #[error("solver timed out before finding an assignment")]
    SolverTimeout,

    #[error("search limit reached before finding an assignment")]
    SearchLimit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_error_converts() {
        let err: EngineError = DataError::ZeroWeight {
            position: "Libero".into(),
        }
        .into();
        assert!(matches!(err, EngineError::DataInconsistency(_)));
        assert_eq!(
            err.to_string(),
            "data inconsistency: position 'Libero' has zero total weight"
        );
    }

    #[test]
    fn test_infeasibility_message() {
        let reason = Infeasibility::PositionShortage {
            position: "Setter".into(),
            required: 2,
            available: 1,
        };
        assert_eq!(
            reason.to_string(),
            "position 'Setter' needs 2 players but only 1 are eligible"
        );
    }
}
