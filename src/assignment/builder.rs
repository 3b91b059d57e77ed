//! Translation of one round and one configuration into a [`CpModel`].

use super::types::{CandidateSolution, Configuration, Placement, RoundRoster, TeamLineup};
use crate::cp::{CpModel, CpSolution, Literal, Objective, ValueSelection, VarId};
use crate::error::{DataError, EngineError, Infeasibility};
use crate::rating::{PlayerRatings, RatingTable};
use crate::roster::Roster;

/// Default weight of the primary-position tie-break.
pub const DEFAULT_PRIMARY_BONUS: i64 = 1;

/// Builds assignment models for one roster.
///
/// # Examples
///
/// ```
/// use u_lineup::assignment::{AssignmentModelBuilder, Configuration, RoundRoster, TeamShape};
/// use u_lineup::cp::{BranchAndBoundSolver, CpSolver, SolverConfig};
/// use u_lineup::rating::{RatingCalculator, RatingTable};
/// use u_lineup::roster::{Player, PositionProfile, Roster};
///
/// let players = (0..4)
///     .map(|i| Player::new(format!("p{i}")).with_skills([i as f64 + 1.0; 6]).with_positions(["Court"]))
///     .collect();
/// let roster = Roster::new(players, [PositionProfile::new("Court").with_weights([1.0; 6])]).unwrap();
/// let config = Configuration::new("pairs", vec![TeamShape::new().with("Court", 2); 2]);
/// let round = RoundRoster::new(["p0", "p1", "p2", "p3"], Vec::<String>::new());
///
/// let ratings = RatingTable::compute(&RatingCalculator::default(), &roster, ["p0", "p1", "p2", "p3"]).unwrap();
/// let builder = AssignmentModelBuilder::new(&roster);
/// builder.precheck(&round, &config).unwrap();
/// let model = builder.build(&round, &config, &ratings).unwrap();
///
/// let result = BranchAndBoundSolver::new().solve(model.model(), &SolverConfig::default());
/// let best = model.decode(result.best().unwrap(), 0);
/// assert_eq!(best.rating_gap, 0);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct AssignmentModelBuilder<'a> {
    roster: &'a Roster,
    primary_bonus: i64,
}

impl<'a> AssignmentModelBuilder<'a> {
    pub fn new(roster: &'a Roster) -> Self {
        Self {
            roster,
            primary_bonus: DEFAULT_PRIMARY_BONUS,
        }
    }

    /// Sets the per-placement reward for playing a primary position.
    pub fn with_primary_bonus(mut self, bonus: i64) -> Self {
        self.primary_bonus = bonus;
        self
    }

    /// Cheap counting checks run before any model is built.
    pub fn precheck(&self, round: &RoundRoster, config: &Configuration) -> Result<(), Infeasibility> {
        let required = config.total_size();
        if round.len() < required {
            return Err(Infeasibility::InsufficientRoster {
                required,
                available: round.len(),
            });
        }

        for (position, required) in config.position_totals() {
            let available = round
                .players()
                .iter()
                .filter(|name| {
                    self.roster
                        .player(name)
                        .is_some_and(|p| p.can_play(&position))
                })
                .count();
            if available < required {
                return Err(Infeasibility::PositionShortage {
                    position,
                    required,
                    available,
                });
            }
        }

        let mandatory = round.mandatory().len();
        if mandatory > required {
            return Err(Infeasibility::TooManyMandatory {
                mandatory,
                capacity: required,
            });
        }
        Ok(())
    }

    /// Builds the model for `round` under `config`.
    ///
    /// Every round player must be in the roster and in `ratings`.
    pub fn build(
        &self,
        round: &RoundRoster,
        config: &Configuration,
        ratings: &RatingTable,
    ) -> Result<AssignmentModel, EngineError> {
        if config.teams.is_empty() {
            return Err(EngineError::InvalidConfiguration(format!(
                "configuration '{}' has no teams",
                config.label
            )));
        }

        let teams = config.team_count();
        let mut model = CpModel::new(format!("lineup_{}", config.label));
        let mut players = Vec::with_capacity(round.len());

        for name in round.players() {
            let player = self.roster.require(name)?;
            let rating = ratings
                .get(name)
                .ok_or_else(|| EngineError::MissingRating { name: name.clone() })?;

            let assigned: Vec<VarId> = (0..teams)
                .map(|t| model.new_bool_var(format!("assigned_{name}_team{t}")))
                .collect();
            let plays: Vec<(String, VarId)> = player
                .positions
                .iter()
                .map(|pos| (pos.clone(), model.new_bool_var(format!("plays_{name}_{pos}"))))
                .collect();
            let plays_primary = match plays.first() {
                Some((_, v)) => *v,
                None => {
                    return Err(DataError::NoPositions { player: name.clone() }.into());
                }
            };

            let min_teams = i64::from(round.is_mandatory(name));
            model.add_linear(unit(&assigned), min_teams, 1);
            let position_vars: Vec<VarId> = plays.iter().map(|(_, v)| *v).collect();
            model.add_at_most_one(&position_vars);
            // Assigned to a team iff some position is chosen.
            let mut link = unit(&assigned);
            link.extend(position_vars.iter().map(|&v| (v, -1)));
            model.add_equality(link, 0);

            let mut filled = vec![Vec::with_capacity(plays.len()); teams];
            let mut primary = Vec::with_capacity(teams);
            let mut secondary = Vec::with_capacity(teams);
            for (t, &on_team) in assigned.iter().enumerate() {
                for (pos, plays_pos) in &plays {
                    let f = model.new_bool_var(format!("filled_{name}_team{t}_{pos}"));
                    model.add_and_equality(f, vec![on_team.into(), (*plays_pos).into()]);
                    filled[t].push((pos.clone(), f));
                }

                let p = model.new_bool_var(format!("primary_{name}_team{t}"));
                let s = model.new_bool_var(format!("secondary_{name}_team{t}"));
                model.add_and_equality(p, vec![on_team.into(), plays_primary.into()]);
                model.add_and_equality(s, vec![on_team.into(), Literal::negative(plays_primary)]);
                model.add_at_most_one(&[p, s]);
                primary.push(p);
                secondary.push(s);
            }

            players.push(PlayerVars {
                name: name.clone(),
                ratings: rating,
                assigned,
                plays,
                filled,
                primary,
                secondary,
            });
        }

        let mut positions: Vec<&str> = Vec::new();
        let listed = config
            .teams
            .iter()
            .flat_map(|shape| shape.iter().map(|(p, _)| p))
            .chain(players.iter().flat_map(|pv| pv.plays.iter().map(|(p, _)| p.as_str())));
        for position in listed {
            if !positions.contains(&position) {
                positions.push(position);
            }
        }

        let max_team_rating: i64 = players
            .iter()
            .map(|pv| pv.ratings.primary.max(pv.ratings.adjusted).max(0))
            .sum();
        let mut team_ratings = Vec::with_capacity(teams);

        for (t, shape) in config.teams.iter().enumerate() {
            let members: Vec<VarId> = players.iter().map(|pv| pv.assigned[t]).collect();
            model.add_exactly(&members, shape.size() as i64);

            for &position in &positions {
                let slots: Vec<VarId> = players
                    .iter()
                    .flat_map(|pv| pv.filled[t].iter())
                    .filter(|(p, _)| p == position)
                    .map(|(_, v)| *v)
                    .collect();
                model.add_exactly(&slots, shape.required(position) as i64);
            }

            for (i, pv) in players.iter().enumerate() {
                for other in &players[i + 1..] {
                    if self.roster.in_conflict(&pv.name, &other.name) {
                        model.add_at_most_one(&[pv.assigned[t], other.assigned[t]]);
                    }
                }
            }

            let rating = model.new_int_var(format!("rating_team{t}"), 0, max_team_rating);
            let terms = players
                .iter()
                .flat_map(|pv| {
                    [
                        (pv.primary[t], pv.ratings.primary),
                        (pv.secondary[t], pv.ratings.adjusted),
                    ]
                })
                .collect();
            model.add_linear_definition(rating, terms);
            team_ratings.push(rating);
        }

        let gap = model.new_int_var("rating_gap", 0, max_team_rating);
        model.add_spread(gap, team_ratings.clone());

        let mut objective = vec![(gap, 1)];
        objective.extend(
            players
                .iter()
                .flat_map(|pv| pv.primary.iter().map(|&p| (p, -self.primary_bonus))),
        );
        model.set_objective(Objective::Minimize { terms: objective });

        let decisions = players
            .iter()
            .flat_map(|pv| {
                pv.assigned
                    .iter()
                    .copied()
                    .chain(pv.plays.iter().map(|(_, v)| *v))
            })
            .collect();
        model.add_decision_strategy(decisions, ValueSelection::MaxValue);

        log::debug!(
            "built model '{}': {} players, {} variables ({} boolean), {} constraints",
            model.name,
            players.len(),
            model.var_count(),
            model.bool_var_count(),
            model.constraint_count()
        );

        Ok(AssignmentModel {
            model,
            configuration: config.label.clone(),
            teams,
            players,
            team_ratings,
            gap,
        })
    }
}

fn unit(vars: &[VarId]) -> Vec<(VarId, i64)> {
    vars.iter().map(|&v| (v, 1)).collect()
}

#[derive(Debug, Clone)]
struct PlayerVars {
    name: String,
    ratings: PlayerRatings,
    assigned: Vec<VarId>,
    /// One entry per eligible position, primary first.
    plays: Vec<(String, VarId)>,
    filled: Vec<Vec<(String, VarId)>>,
    primary: Vec<VarId>,
    secondary: Vec<VarId>,
}

/// A built model together with the handles needed to read solutions back.
#[derive(Debug, Clone)]
pub struct AssignmentModel {
    model: CpModel,
    configuration: String,
    teams: usize,
    players: Vec<PlayerVars>,
    team_ratings: Vec<VarId>,
    gap: VarId,
}

impl AssignmentModel {
    /// The underlying CP model.
    pub fn model(&self) -> &CpModel {
        &self.model
    }

    /// Label of the configuration this model encodes.
    pub fn configuration(&self) -> &str {
        &self.configuration
    }

    /// Converts a solver solution into teams and left-out players.
    pub fn decode(&self, solution: &CpSolution, sequence: usize) -> CandidateSolution {
        let mut teams = vec![TeamLineup::default(); self.teams];
        let mut left_out = Vec::new();

        for pv in &self.players {
            let team = pv.assigned.iter().position(|&v| solution.is_true(v));
            let position = pv
                .plays
                .iter()
                .enumerate()
                .find(|(_, (_, v))| solution.is_true(*v));

            match (team, position) {
                (Some(t), Some((k, (pos, _)))) => {
                    let primary = k == 0;
                    let rating = if primary {
                        pv.ratings.primary
                    } else {
                        pv.ratings.adjusted
                    };
                    teams[t].rating += rating;
                    teams[t].players.push(Placement {
                        player: pv.name.clone(),
                        team: t,
                        position: pos.clone(),
                        primary,
                        rating,
                    });
                }
                _ => left_out.push(pv.name.clone()),
            }
        }

        debug_assert!(self
            .team_ratings
            .iter()
            .zip(&teams)
            .all(|(&v, team)| solution.value(v) == team.rating));

        CandidateSolution {
            configuration: self.configuration.clone(),
            teams,
            left_out,
            rating_gap: solution.value(self.gap),
            objective: solution.objective_value,
            sequence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assignment::TeamShape;
    use crate::cp::{BranchAndBoundSolver, CpSolver, SolveResult, SolverConfig, SolverStatus};
    use crate::fixtures;
    use crate::rating::RatingCalculator;
    use crate::roster::{Player, PositionProfile};

    fn solve(
        roster: &Roster,
        round: &RoundRoster,
        config: &Configuration,
    ) -> (AssignmentModel, SolveResult) {
        let ratings = RatingTable::compute(
            &RatingCalculator::default(),
            roster,
            round.players().iter().map(String::as_str),
        )
        .unwrap();
        let model = AssignmentModelBuilder::new(roster)
            .build(round, config, &ratings)
            .unwrap();
        let solver_config = SolverConfig::default()
            .with_node_limit(200_000)
            .without_time_limit();
        let result = BranchAndBoundSolver::new().solve(model.model(), &solver_config);
        (model, result)
    }

    /// Checks the structural guarantees every candidate must satisfy.
    fn assert_valid(
        candidate: &CandidateSolution,
        roster: &Roster,
        round: &RoundRoster,
        config: &Configuration,
    ) {
        for name in round.mandatory() {
            assert!(candidate.is_assigned(name), "mandatory {name} left out");
        }
        for (t, (team, shape)) in candidate.teams.iter().zip(&config.teams).enumerate() {
            assert_eq!(team.size(), shape.size(), "team {t} size");
            for (position, n) in shape.iter() {
                assert_eq!(team.players_at(position).count(), n, "team {t} {position}");
            }
            for a in &team.players {
                assert!(roster.player(&a.player).unwrap().can_play(&a.position));
                for b in &team.players {
                    assert!(!roster.in_conflict(&a.player, &b.player));
                }
            }
        }
        let assigned = candidate.assigned_players().len();
        assert_eq!(assigned + candidate.left_out.len(), round.len());
    }

    #[test]
    fn test_precheck_insufficient_roster() {
        let roster = fixtures::court_roster(5);
        let round = RoundRoster::new(fixtures::names(&roster), Vec::<String>::new());
        let err = AssignmentModelBuilder::new(&roster)
            .precheck(&round, &fixtures::court_configuration(3))
            .unwrap_err();
        assert_eq!(
            err,
            Infeasibility::InsufficientRoster {
                required: 6,
                available: 5
            }
        );
    }

    #[test]
    fn test_precheck_position_shortage() {
        let roster = fixtures::twelve_player_roster();
        let round = RoundRoster::new(fixtures::names(&roster), Vec::<String>::new());
        let config = Configuration::new("setters", vec![TeamShape::new().with("Setter", 3)]);
        let err = AssignmentModelBuilder::new(&roster)
            .precheck(&round, &config)
            .unwrap_err();
        assert_eq!(
            err,
            Infeasibility::PositionShortage {
                position: "Setter".into(),
                required: 3,
                available: 2
            }
        );
    }

    #[test]
    fn test_precheck_too_many_mandatory() {
        let roster = fixtures::court_roster(6);
        let names = fixtures::names(&roster);
        let round = RoundRoster::new(names.clone(), names[..5].to_vec());
        let err = AssignmentModelBuilder::new(&roster)
            .precheck(&round, &fixtures::court_configuration(2))
            .unwrap_err();
        assert_eq!(
            err,
            Infeasibility::TooManyMandatory {
                mandatory: 5,
                capacity: 4
            }
        );
    }

    #[test]
    fn test_twelve_players_exact_split() {
        let roster = fixtures::twelve_player_roster();
        let round = RoundRoster::new(fixtures::names(&roster), Vec::<String>::new());
        let config = fixtures::balanced_configuration();
        AssignmentModelBuilder::new(&roster)
            .precheck(&round, &config)
            .unwrap();

        let (model, result) = solve(&roster, &round, &config);
        assert!(result.is_solution_found());

        let calc = RatingCalculator::default();
        for (seq, solution) in result.solutions.iter().enumerate() {
            let candidate = model.decode(solution, seq);
            assert_valid(&candidate, &roster, &round, &config);
            assert!(candidate.left_out.is_empty());

            let totals: Vec<i64> = candidate
                .teams
                .iter()
                .map(|team| {
                    team.players
                        .iter()
                        .map(|p| {
                            let player = roster.player(&p.player).unwrap();
                            let profile = roster.profile(player.primary_position().unwrap());
                            calc.rating(player, profile.unwrap()).unwrap()
                        })
                        .sum()
                })
                .collect();
            assert_eq!(candidate.rating_gap, (totals[0] - totals[1]).abs());
            assert_eq!(candidate.teams[0].rating, totals[0]);
            // Single-position players always play their primary position.
            assert_eq!(candidate.primary_count(), 12);
            assert_eq!(candidate.objective, candidate.rating_gap - 12);
        }
    }

    #[test]
    fn test_conflicting_pair_split_across_teams() {
        let profile = PositionProfile::new("Court").with_weights([1.0; 6]);
        let roster = Roster::new(
            vec![
                Player::new("a")
                    .with_skills([3.0; 6])
                    .with_positions(["Court"])
                    .with_conflict("b"),
                Player::new("b").with_skills([4.0; 6]).with_positions(["Court"]),
            ],
            [profile],
        )
        .unwrap();
        let round = RoundRoster::new(["a", "b"], ["a", "b"]);
        let config = fixtures::court_configuration(1);

        let (model, result) = solve(&roster, &round, &config);
        assert_eq!(result.status, SolverStatus::Optimal);
        for solution in &result.solutions {
            let candidate = model.decode(solution, 0);
            assert_valid(&candidate, &roster, &round, &config);
            assert_ne!(candidate.team_of("a"), candidate.team_of("b"));
            assert_eq!(candidate.rating_gap, 1000);
        }
    }

    #[test]
    fn test_conflict_on_single_team_is_infeasible() {
        let profile = PositionProfile::new("Court").with_weights([1.0; 6]);
        let roster = Roster::new(
            vec![
                Player::new("a").with_skills([3.0; 6]).with_positions(["Court"]),
                Player::new("b")
                    .with_skills([4.0; 6])
                    .with_positions(["Court"])
                    .with_conflict("a"),
            ],
            [profile],
        )
        .unwrap();
        let round = RoundRoster::new(["a", "b"], ["a", "b"]);
        let config = Configuration::new("one", vec![TeamShape::new().with("Court", 2)]);

        let (_, result) = solve(&roster, &round, &config);
        assert_eq!(result.status, SolverStatus::Infeasible);
    }

    #[test]
    fn test_mandatory_players_always_placed() {
        let roster = fixtures::court_roster(8);
        let names = fixtures::names(&roster);
        let round = RoundRoster::new(names.clone(), [names[6].clone(), names[7].clone()]);
        let config = fixtures::court_configuration(3);

        let (model, result) = solve(&roster, &round, &config);
        assert!(result.is_solution_found());
        for (seq, solution) in result.solutions.iter().enumerate() {
            let candidate = model.decode(solution, seq);
            assert_valid(&candidate, &roster, &round, &config);
            assert_eq!(candidate.left_out.len(), 2);
        }
    }

    #[test]
    fn test_secondary_position_used_when_needed() {
        let roster = Roster::new(
            vec![
                Player::new("s1").with_skills([3.0; 6]).with_positions(["Setter"]),
                Player::new("s2")
                    .with_skills([3.0; 6])
                    .with_positions(["Setter", "Libero"]),
            ],
            fixtures::volleyball_profiles(),
        )
        .unwrap();
        let round = RoundRoster::new(["s1", "s2"], Vec::<String>::new());
        let shape = TeamShape::new().with("Setter", 1).with("Libero", 1);
        let config = Configuration::new("pair", vec![shape]);

        let (model, result) = solve(&roster, &round, &config);
        let candidate = model.decode(result.best().unwrap(), 0);
        let libero: Vec<&Placement> = candidate.teams[0].players_at("Libero").collect();
        assert_eq!(libero.len(), 1);
        assert_eq!(libero[0].player, "s2");
        assert!(!libero[0].primary);
        assert_eq!(candidate.primary_count(), 1);
    }

    #[test]
    fn test_variable_names() {
        let roster = fixtures::twelve_player_roster();
        let round = RoundRoster::new(fixtures::names(&roster), Vec::<String>::new());
        let ratings = RatingTable::compute(
            &RatingCalculator::default(),
            &roster,
            round.players().iter().map(String::as_str),
        )
        .unwrap();
        let built = AssignmentModelBuilder::new(&roster)
            .build(&round, &fixtures::balanced_configuration(), &ratings)
            .unwrap();
        let model = built.model();
        assert!(model.lookup("assigned_P00_team1").is_some());
        assert!(model.lookup("plays_P00_Setter").is_some());
        assert!(model.lookup("filled_P03_team0_Outside").is_some());
        assert!(model.lookup("rating_gap").is_some());
        assert!(model.validate().is_ok());
        // Two team ratings and the gap are the only integers.
        assert_eq!(model.bool_var_count(), model.var_count() - 3);
        assert_eq!(built.configuration(), "standard");
    }

    #[test]
    fn test_missing_rating_is_error() {
        let roster = fixtures::court_roster(4);
        let round = RoundRoster::new(fixtures::names(&roster), Vec::<String>::new());
        let err = AssignmentModelBuilder::new(&roster)
            .build(&round, &fixtures::court_configuration(2), &RatingTable::default())
            .unwrap_err();
        assert_eq!(err, EngineError::MissingRating { name: "C00".into() });
    }
}
