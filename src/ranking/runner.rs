//! Multi-configuration ranking.
//!
//! # Algorithm
//!
//! 1. Rate every round player once
//! 2. For each configuration, in order:
//!    a. Run the counting pre-checks
//!    b. Build the assignment model and solve it
//!    c. Decode every emitted solution
//! 3. Pool all candidates in configuration order and sort them stably by
//!    rating gap
//!
//! A configuration that yields nothing is recorded as a failure and never
//! stops the others.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::config::RankerConfig;
use crate::assignment::{AssignmentModelBuilder, CandidateSolution, Configuration, RoundRoster};
use crate::cp::{CpSolver, SolverStatus};
use crate::error::{EngineError, Infeasibility};
use crate::rating::{RatingCalculator, RatingTable};
use crate::roster::Roster;

/// Why one configuration produced no candidates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationFailure {
    /// Index in the ranker's configuration list.
    pub configuration: usize,
    pub label: String,
    pub reason: Infeasibility,
}

/// Candidates from every configuration, best balance first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RankedPool {
    /// Sorted ascending by `rating_gap`; ties keep configuration order,
    /// then solver emission order.
    pub candidates: Vec<CandidateSolution>,
    /// Configurations that produced nothing, in configuration order.
    pub failures: Vec<ConfigurationFailure>,
}

impl RankedPool {
    /// The best-balanced candidate.
    pub fn top(&self) -> Option<&CandidateSolution> {
        self.candidates.first()
    }

    /// `true` when no assignment is possible this round.
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }
}

type Outcome = Result<Vec<CandidateSolution>, Infeasibility>;

/// Runs every configured team shape and ranks the combined results.
///
/// # Examples
///
/// ```
/// use u_lineup::assignment::{Configuration, RoundRoster, TeamShape};
/// use u_lineup::cp::BranchAndBoundSolver;
/// use u_lineup::ranking::{MultiConfigRanker, RankerConfig};
/// use u_lineup::roster::{Player, PositionProfile, Roster};
///
/// let players = (0..4)
///     .map(|i| Player::new(format!("p{i}")).with_skills([i as f64 + 1.0; 6]).with_positions(["Court"]))
///     .collect();
/// let roster = Roster::new(players, [PositionProfile::new("Court").with_weights([1.0; 6])]).unwrap();
/// let pairs = Configuration::new("pairs", vec![TeamShape::new().with("Court", 2); 2]);
/// let config = RankerConfig::default().with_configurations(vec![pairs]);
///
/// let ranker = MultiConfigRanker::new(&roster, BranchAndBoundSolver::new(), config).unwrap();
/// let pool = ranker.rank(&RoundRoster::new(["p0", "p1", "p2", "p3"], Vec::<String>::new())).unwrap();
/// assert_eq!(pool.top().unwrap().rating_gap, 0);
/// ```
pub struct MultiConfigRanker<'a, S: CpSolver> {
    roster: &'a Roster,
    solver: S,
    config: RankerConfig,
}

impl<'a, S: CpSolver> MultiConfigRanker<'a, S> {
    /// Creates a ranker after validating `config`.
    pub fn new(roster: &'a Roster, solver: S, config: RankerConfig) -> Result<Self, EngineError> {
        config.validate().map_err(EngineError::InvalidConfiguration)?;
        Ok(Self {
            roster,
            solver,
            config,
        })
    }

    pub fn config(&self) -> &RankerConfig {
        &self.config
    }

    pub fn roster(&self) -> &Roster {
        self.roster
    }

    /// Ranks candidate assignments for `round`.
    ///
    /// Data errors and unknown players abort the whole round. Infeasible
    /// configurations end up in [`RankedPool::failures`].
    pub fn rank(&self, round: &RoundRoster) -> Result<RankedPool, EngineError> {
        let calculator = RatingCalculator::new(self.config.rating_scale);
        let ratings = RatingTable::compute(
            &calculator,
            self.roster,
            round.players().iter().map(String::as_str),
        )?;
        let builder =
            AssignmentModelBuilder::new(self.roster).with_primary_bonus(self.config.primary_bonus);

        let outcomes = self.solve_all(&builder, round, &ratings);

        let mut pool = RankedPool::default();
        for (index, (config, outcome)) in self
            .config
            .configurations
            .iter()
            .zip(outcomes)
            .enumerate()
        {
            match outcome? {
                Ok(candidates) => {
                    log::debug!(
                        "configuration '{}': {} candidates",
                        config.label,
                        candidates.len()
                    );
                    pool.candidates.extend(candidates);
                }
                Err(reason) => {
                    log::debug!("configuration '{}': {reason}", config.label);
                    pool.failures.push(ConfigurationFailure {
                        configuration: index,
                        label: config.label.clone(),
                        reason,
                    });
                }
            }
        }

        pool.candidates.sort_by_key(|c| c.rating_gap);
        log::info!(
            "ranked {} candidates for {} players ({} configurations failed)",
            pool.len(),
            round.len(),
            pool.failures.len()
        );
        Ok(pool)
    }

    #[cfg(feature = "parallel")]
    fn solve_all(
        &self,
        builder: &AssignmentModelBuilder<'_>,
        round: &RoundRoster,
        ratings: &RatingTable,
    ) -> Vec<Result<Outcome, EngineError>> {
        if self.config.parallel {
            self.config
                .configurations
                .par_iter()
                .map(|config| self.solve_one(builder, round, config, ratings))
                .collect()
        } else {
            self.solve_sequential(builder, round, ratings)
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn solve_all(
        &self,
        builder: &AssignmentModelBuilder<'_>,
        round: &RoundRoster,
        ratings: &RatingTable,
    ) -> Vec<Result<Outcome, EngineError>> {
        self.solve_sequential(builder, round, ratings)
    }

    fn solve_sequential(
        &self,
        builder: &AssignmentModelBuilder<'_>,
        round: &RoundRoster,
        ratings: &RatingTable,
    ) -> Vec<Result<Outcome, EngineError>> {
        self.config
            .configurations
            .iter()
            .map(|config| self.solve_one(builder, round, config, ratings))
            .collect()
    }

    fn solve_one(
        &self,
        builder: &AssignmentModelBuilder<'_>,
        round: &RoundRoster,
        config: &Configuration,
        ratings: &RatingTable,
    ) -> Result<Outcome, EngineError> {
        if let Err(reason) = builder.precheck(round, config) {
            return Ok(Err(reason));
        }

        let model = builder.build(round, config, ratings)?;
        let result = self.solver.solve(model.model(), &self.config.solver);

        if result.status == SolverStatus::ModelInvalid {
            return Err(EngineError::ModelInvalid(format!(
                "configuration '{}'",
                config.label
            )));
        }
        if result.solutions.is_empty() {
            let reason = match result.status {
                SolverStatus::Timeout => Infeasibility::SolverTimeout,
                SolverStatus::Unknown => Infeasibility::SearchLimit,
                _ => Infeasibility::InfeasibleModel,
            };
            return Ok(Err(reason));
        }

        Ok(Ok(result
            .solutions
            .iter()
            .enumerate()
            .map(|(sequence, solution)| model.decode(solution, sequence))
            .collect()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assignment::TeamShape;
    use crate::cp::{BranchAndBoundSolver, CpModel, SolveResult, SolverConfig};
    use crate::error::DataError;
    use crate::fixtures;
    use crate::roster::{Player, Skill};

    fn test_solver_config() -> SolverConfig {
        SolverConfig::default()
            .with_node_limit(200_000)
            .without_time_limit()
    }

    fn ranker(roster: &Roster) -> MultiConfigRanker<'_, BranchAndBoundSolver> {
        let config = RankerConfig::default().with_solver(test_solver_config());
        MultiConfigRanker::new(roster, BranchAndBoundSolver::new(), config).unwrap()
    }

    fn everyone(roster: &Roster) -> RoundRoster {
        RoundRoster::new(fixtures::names(roster), Vec::<String>::new())
    }

    struct FixedStatus(SolverStatus);

    impl CpSolver for FixedStatus {
        fn solve(&self, _model: &CpModel, _config: &SolverConfig) -> SolveResult {
            SolveResult::empty(self.0)
        }
    }

    #[test]
    fn test_pool_sorted_ascending() {
        let roster = fixtures::twelve_player_roster();
        let pool = ranker(&roster).rank(&everyone(&roster)).unwrap();

        assert!(!pool.is_empty());
        for pair in pool.candidates.windows(2) {
            assert!(pair[0].rating_gap <= pair[1].rating_gap);
        }
        assert_eq!(pool.top().unwrap().rating_gap, pool.candidates[0].rating_gap);
    }

    #[test]
    fn test_standard_shortages_reported() {
        // Two middles cannot fill the double-middle configurations.
        let roster = fixtures::twelve_player_roster();
        let pool = ranker(&roster).rank(&everyone(&roster)).unwrap();

        assert!(pool
            .candidates
            .iter()
            .all(|c| c.configuration == "libero-both"));
        let labels: Vec<&str> = pool.failures.iter().map(|f| f.label.as_str()).collect();
        assert_eq!(labels, vec!["libero-one", "libero-none"]);
        assert_eq!(
            pool.failures[0].reason,
            Infeasibility::PositionShortage {
                position: "Middle".into(),
                required: 3,
                available: 2
            }
        );
        assert_eq!(pool.failures[1].configuration, 2);
    }

    #[test]
    fn test_ranking_is_reproducible() {
        let roster = fixtures::twelve_player_roster();
        let first = ranker(&roster).rank(&everyone(&roster)).unwrap();
        let second = ranker(&roster).rank(&everyone(&roster)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_ties_keep_configuration_order() {
        let roster = fixtures::court_roster(4);
        let pairs = fixtures::court_configuration(2);
        let renamed = Configuration::new("court-again", pairs.teams.clone());
        let config = RankerConfig::default()
            .with_configurations(vec![pairs, renamed])
            .with_solver(test_solver_config());
        let pool = MultiConfigRanker::new(&roster, BranchAndBoundSolver::new(), config)
            .unwrap()
            .rank(&everyone(&roster))
            .unwrap();

        let best_gap = pool.top().unwrap().rating_gap;
        let tied: Vec<&str> = pool
            .candidates
            .iter()
            .filter(|c| c.rating_gap == best_gap)
            .map(|c| c.configuration.as_str())
            .collect();
        assert_eq!(tied, vec!["court", "court-again"]);
    }

    #[test]
    fn test_undersized_roster_fails_every_configuration() {
        let roster = fixtures::twelve_player_roster();
        let names = fixtures::names(&roster);
        let round = RoundRoster::new(names[..10].to_vec(), Vec::<String>::new());
        let pool = ranker(&roster).rank(&round).unwrap();

        assert!(pool.is_empty());
        assert_eq!(pool.failures.len(), 3);
        for failure in &pool.failures {
            assert_eq!(
                failure.reason,
                Infeasibility::InsufficientRoster {
                    required: 12,
                    available: 10
                }
            );
        }
    }

    #[test]
    fn test_data_inconsistency_aborts_round() {
        let mut players = fixtures::twelve_player_roster().players().to_vec();
        players[3].skills.remove(&Skill::Block);
        let roster = Roster::new(players, fixtures::volleyball_profiles()).unwrap();

        let err = ranker(&roster).rank(&everyone(&roster)).unwrap_err();
        assert_eq!(
            err,
            EngineError::DataInconsistency(DataError::MissingSkill {
                player: "P03".into(),
                skill: Skill::Block
            })
        );
    }

    #[test]
    fn test_unknown_round_player_aborts_round() {
        let roster = fixtures::court_roster(4);
        let round = RoundRoster::new(["C00", "C01", "C02", "ghost"], Vec::<String>::new());
        let err = ranker(&roster).rank(&round).unwrap_err();
        assert_eq!(err, EngineError::UnknownPlayer { name: "ghost".into() });
    }

    #[test]
    fn test_solver_status_mapping() {
        let roster = fixtures::court_roster(4);
        let config = RankerConfig::default().with_configurations(vec![fixtures::court_configuration(2)]);

        let cases = [
            (SolverStatus::Timeout, Infeasibility::SolverTimeout),
            (SolverStatus::Unknown, Infeasibility::SearchLimit),
            (SolverStatus::Infeasible, Infeasibility::InfeasibleModel),
        ];
        for (status, reason) in cases {
            let pool = MultiConfigRanker::new(&roster, FixedStatus(status), config.clone())
                .unwrap()
                .rank(&everyone(&roster))
                .unwrap();
            assert!(pool.is_empty());
            assert_eq!(pool.failures[0].reason, reason);
        }

        let err = MultiConfigRanker::new(&roster, FixedStatus(SolverStatus::ModelInvalid), config)
            .unwrap()
            .rank(&everyone(&roster))
            .unwrap_err();
        assert!(matches!(err, EngineError::ModelInvalid(_)));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let roster = fixtures::court_roster(4);
        let config = RankerConfig::default().with_configurations(vec![Configuration::new(
            "empty",
            vec![TeamShape::new()],
        )]);
        let result = MultiConfigRanker::new(&roster, BranchAndBoundSolver::new(), config);
        assert!(matches!(result, Err(EngineError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_mandatory_player_in_every_candidate() {
        let roster = fixtures::court_roster(7);
        let names = fixtures::names(&roster);
        let round = RoundRoster::new(names.clone(), [names[6].clone()]);
        let config = RankerConfig::default()
            .with_configurations(vec![fixtures::court_configuration(3)])
            .with_solver(test_solver_config());
        let pool = MultiConfigRanker::new(&roster, BranchAndBoundSolver::new(), config)
            .unwrap()
            .rank(&round)
            .unwrap();

        assert!(!pool.is_empty());
        for candidate in &pool.candidates {
            assert!(candidate.is_assigned("C06"));
            assert_eq!(candidate.left_out.len(), 1);
        }
    }

    #[test]
    fn test_conflicting_players_never_share_team() {
        let profile = crate::roster::PositionProfile::new("Court").with_weights([1.0; 6]);
        let players = (0..6)
            .map(|i| {
                let p = Player::new(format!("x{i}"))
                    .with_skills([1.0 + i as f64; 6])
                    .with_positions(["Court"]);
                if i == 0 {
                    p.with_conflict("x5")
                } else {
                    p
                }
            })
            .collect();
        let roster = Roster::new(players, [profile]).unwrap();
        let config = RankerConfig::default()
            .with_configurations(vec![fixtures::court_configuration(3)])
            .with_solver(test_solver_config());
        let pool = MultiConfigRanker::new(&roster, BranchAndBoundSolver::new(), config)
            .unwrap()
            .rank(&everyone(&roster))
            .unwrap();

        assert!(!pool.is_empty());
        for candidate in &pool.candidates {
            assert_ne!(candidate.team_of("x0"), candidate.team_of("x5"));
        }
    }
}
