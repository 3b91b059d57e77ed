//! Round-to-round rotation.
//!
//! # Algorithm
//!
//! First round: the first `first_round_mandatory` present players must play,
//! nobody is benched.
//!
//! Every later round:
//! 1. Mandatory = last round's left-out players, then queued arrivals
//! 2. Bench size = number of players left out last round
//! 3. Bench = last round's assigned players (minus mandatory) with the
//!    longest streaks, ties by entry order
//! 4. Everyone else present is optional fill
//!
//! After the caller picks a candidate and a winner, streaks grow for the
//! players who played and reset for those who sat out.

use super::state::{RotationPhase, SessionState};
use crate::assignment::{CandidateSolution, RoundRoster};
use crate::cp::CpSolver;
use crate::error::EngineError;
use crate::ranking::{MultiConfigRanker, RankedPool};
use std::collections::HashSet;

/// Configuration for [`RotationController`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationConfig {
    /// How many of the first entered players must play the first round.
    pub first_round_mandatory: usize,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            first_round_mandatory: 12,
        }
    }
}

impl RotationConfig {
    pub fn with_first_round_mandatory(mut self, n: usize) -> Self {
        self.first_round_mandatory = n;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.first_round_mandatory == 0 {
            return Err("first_round_mandatory must be at least 1".into());
        }
        Ok(())
    }
}

/// Result of [`RotationController::register_arrivals`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArrivalReport {
    /// Newly present players, queued for the next round.
    pub added: Vec<String>,
    /// Names missing from the roster.
    pub unknown: Vec<String>,
    /// Names already present.
    pub already_present: Vec<String>,
}

/// A built round waiting for the caller's choice.
#[derive(Debug, Clone)]
pub struct RoundPlan {
    pub round: usize,
    pub roster: RoundRoster,
    pub benched: Vec<String>,
    /// Ranked candidates; empty when no assignment is possible.
    pub pool: RankedPool,
}

/// Drives a session round by round.
///
/// # Examples
///
/// ```
/// use u_lineup::assignment::{Configuration, TeamShape};
/// use u_lineup::cp::BranchAndBoundSolver;
/// use u_lineup::ranking::{MultiConfigRanker, RankerConfig};
/// use u_lineup::roster::{Player, PositionProfile, Roster};
/// use u_lineup::rotation::{RotationConfig, RotationController};
///
/// let players = (0..5)
///     .map(|i| Player::new(format!("p{i}")).with_skills([i as f64 + 1.0; 6]).with_positions(["Court"]))
///     .collect();
/// let roster = Roster::new(players, [PositionProfile::new("Court").with_weights([1.0; 6])]).unwrap();
/// let pairs = Configuration::new("pairs", vec![TeamShape::new().with("Court", 2); 2]);
/// let ranker = MultiConfigRanker::new(
///     &roster,
///     BranchAndBoundSolver::new(),
///     RankerConfig::default().with_configurations(vec![pairs]),
/// )
/// .unwrap();
///
/// let config = RotationConfig::default().with_first_round_mandatory(4);
/// let mut rotation =
///     RotationController::new(ranker, config, ["p0", "p1", "p2", "p3", "p4"]).unwrap();
///
/// let plan = rotation.build_round().unwrap();
/// let chosen = plan.pool.top().unwrap().clone();
/// assert_eq!(chosen.left_out, vec!["p4".to_string()]);
/// rotation.apply_outcome(&chosen, 0).unwrap();
///
/// // The player who sat out must play next.
/// let (next, benched) = rotation.plan_round();
/// assert_eq!(next.mandatory(), &["p4"]);
/// assert_eq!(benched.len(), 1);
/// ```
pub struct RotationController<'a, S: CpSolver> {
    ranker: MultiConfigRanker<'a, S>,
    config: RotationConfig,
    state: SessionState,
}

impl<'a, S: CpSolver> RotationController<'a, S> {
    /// Starts a session with the players entered so far, in entry order.
    pub fn new<I>(
        ranker: MultiConfigRanker<'a, S>,
        config: RotationConfig,
        entered: I,
    ) -> Result<Self, EngineError>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        config
            .validate()
            .map_err(EngineError::InvalidConfiguration)?;

        let roster = ranker.roster();
        let mut present: Vec<String> = Vec::new();
        for name in entered.into_iter().map(Into::into) {
            roster.require(&name)?;
            if present.contains(&name) {
                return Err(EngineError::DuplicatePlayer { name });
            }
            present.push(name);
        }

        let roster_order = roster.players().iter().map(|p| p.name.clone()).collect();
        Ok(Self {
            ranker,
            config,
            state: SessionState::new(roster_order, present),
        })
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn ranker(&self) -> &MultiConfigRanker<'a, S> {
        &self.ranker
    }

    /// Computes the next round's roster and bench without solving.
    pub fn plan_round(&self) -> (RoundRoster, Vec<String>) {
        let state = &self.state;
        match state.phase {
            RotationPhase::FirstRound => {
                let mandatory = state
                    .present
                    .iter()
                    .take(self.config.first_round_mandatory)
                    .cloned();
                (RoundRoster::new(state.present.clone(), mandatory), Vec::new())
            }
            RotationPhase::SteadyState => {
                let mut mandatory = state.last_left_out.clone();
                for name in &state.new_arrivals {
                    if !mandatory.contains(name) {
                        mandatory.push(name.clone());
                    }
                }

                let mut candidates: Vec<&String> = state
                    .last_assigned
                    .iter()
                    .filter(|name| !mandatory.contains(*name))
                    .collect();
                let entry = state.entry_positions();
                candidates.sort_by_key(|name| {
                    let streak = state.record(name).map_or(0, |r| r.consecutive_rounds);
                    let position = entry.get(name.as_str()).copied().unwrap_or(usize::MAX);
                    (std::cmp::Reverse(streak), position)
                });
                let benched: Vec<String> = candidates
                    .into_iter()
                    .take(state.last_left_out.len())
                    .cloned()
                    .collect();

                let entered = state
                    .present
                    .iter()
                    .filter(|name| !benched.contains(*name))
                    .cloned();
                (RoundRoster::new(entered, mandatory), benched)
            }
        }
    }

    /// Plans and ranks the next round.
    ///
    /// An empty pool leaves the session where it was; the caller may change
    /// the roster and try again.
    pub fn build_round(&mut self) -> Result<RoundPlan, EngineError> {
        let (roster, benched) = self.plan_round();
        let round = self.state.round;
        log::info!(
            "round {round}: {} players, mandatory {:?}, benched {:?}",
            roster.len(),
            roster.mandatory(),
            benched
        );

        let pool = self.ranker.rank(&roster)?;

        self.state.mandatory = roster.mandatory().to_vec();
        self.state.bench = benched.clone();
        if pool.is_empty() {
            log::warn!("round {round}: no assignment possible with the present players");
            self.state.planned = None;
        } else {
            self.state.planned = Some(roster.clone());
        }

        Ok(RoundPlan {
            round,
            roster,
            benched,
            pool,
        })
    }

    /// Records the chosen candidate and the winning team, then advances.
    pub fn apply_outcome(
        &mut self,
        chosen: &CandidateSolution,
        winning_team: usize,
    ) -> Result<(), EngineError> {
        let planned = self
            .state
            .planned
            .as_ref()
            .ok_or(EngineError::NoRoundPlanned)?;

        if winning_team >= chosen.teams.len() {
            return Err(EngineError::InvalidWinner {
                team: winning_team,
                teams: chosen.teams.len(),
            });
        }

        let mut assigned = HashSet::new();
        for name in chosen.assigned_players() {
            if !planned.contains(name) {
                return Err(EngineError::OutcomeMismatch(format!(
                    "'{name}' was not part of the planned round"
                )));
            }
            if !assigned.insert(name) {
                return Err(EngineError::OutcomeMismatch(format!(
                    "'{name}' is placed more than once"
                )));
            }
        }
        if let Some(missing) = planned.mandatory().iter().find(|m| !assigned.contains(m.as_str())) {
            return Err(EngineError::OutcomeMismatch(format!(
                "mandatory player '{missing}' was left out"
            )));
        }

        let (played, left_out): (Vec<String>, Vec<String>) = planned
            .players()
            .iter()
            .cloned()
            .partition(|name| assigned.contains(name.as_str()));
        let winners: Vec<String> = chosen.teams[winning_team]
            .names()
            .into_iter()
            .map(String::from)
            .collect();
        let round_players: Vec<String> = planned.players().to_vec();
        let bench = self.state.bench.clone();

        for name in &played {
            let record = self.state.record_mut(name);
            record.games_played += 1;
            record.consecutive_rounds += 1;
        }
        for name in left_out.iter().chain(&bench) {
            self.state.record_mut(name).consecutive_rounds = 0;
        }
        for name in &winners {
            self.state.record_mut(name).games_won += 1;
        }

        log::info!(
            "round {}: team {winning_team} won, left out {:?}",
            self.state.round,
            left_out
        );

        self.state
            .new_arrivals
            .retain(|name| !round_players.contains(name));
        self.state.last_assigned = played;
        self.state.last_left_out = left_out;
        self.state.phase = RotationPhase::SteadyState;
        self.state.round += 1;
        self.state.planned = None;
        Ok(())
    }

    /// Marks players as present and queues them for the next round.
    ///
    /// Unknown and repeated names are reported, not rejected.
    pub fn register_arrivals<I>(&mut self, names: I) -> ArrivalReport
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let mut report = ArrivalReport::default();
        for name in names.into_iter().map(Into::into) {
            if !self.ranker.roster().contains(&name) {
                log::warn!("arrival '{name}' is not in the roster");
                report.unknown.push(name);
            } else if self.state.present.contains(&name) {
                log::warn!("arrival '{name}' is already present");
                report.already_present.push(name);
            } else {
                log::info!("arrival '{name}' queued for the next round");
                self.state.present.push(name.clone());
                self.state.new_arrivals.push(name.clone());
                self.state.record_mut(&name);
                report.added.push(name);
            }
        }
        report
    }
}
