//! Ranker configuration.

use crate::assignment::{Configuration, TeamShape, DEFAULT_PRIMARY_BONUS};
use crate::cp::SolverConfig;
use crate::rating::DEFAULT_RATING_SCALE;

/// The three two-team volleyball configurations tried every round.
///
/// All of them need 12 players:
/// 1. both teams with a libero,
/// 2. one libero team against a double-middle team,
/// 3. both teams with two middles and no libero.
pub fn standard_configurations() -> Vec<Configuration> {
    let with_libero = TeamShape::new()
        .with("Setter", 1)
        .with("Outside", 2)
        .with("Middle", 1)
        .with("Libero", 1)
        .with("Opposite", 1);
    let double_middle = TeamShape::new()
        .with("Setter", 1)
        .with("Outside", 2)
        .with("Middle", 2)
        .with("Opposite", 1);

    vec![
        Configuration::new("libero-both", vec![with_libero.clone(), with_libero.clone()]),
        Configuration::new("libero-one", vec![with_libero, double_middle.clone()]),
        Configuration::new("libero-none", vec![double_middle.clone(), double_middle]),
    ]
}

/// Configuration for [`MultiConfigRanker`](super::MultiConfigRanker).
///
/// # Examples
///
/// ```
/// use u_lineup::ranking::RankerConfig;
/// use u_lineup::cp::SolverConfig;
///
/// let config = RankerConfig::default()
///     .with_solver(SolverConfig::default().with_solution_limit(5))
///     .with_parallel(false);
/// assert_eq!(config.configurations.len(), 3);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct RankerConfig {
    /// Configurations tried in order. All must need the same player count.
    pub configurations: Vec<Configuration>,
    /// Fixed-point rating scale.
    pub rating_scale: i64,
    /// Objective reward per primary-position placement.
    pub primary_bonus: i64,
    /// Limits and seed for every solve.
    pub solver: SolverConfig,
    /// Whether to solve configurations in parallel using rayon.
    ///
    /// Only effective with the `parallel` feature.
    pub parallel: bool,
}

impl Default for RankerConfig {
    fn default() -> Self {
        Self {
            configurations: standard_configurations(),
            rating_scale: DEFAULT_RATING_SCALE,
            primary_bonus: DEFAULT_PRIMARY_BONUS,
            solver: SolverConfig::default(),
            parallel: false,
        }
    }
}

impl RankerConfig {
    pub fn with_configurations(mut self, configurations: Vec<Configuration>) -> Self {
        self.configurations = configurations;
        self
    }

    pub fn with_rating_scale(mut self, scale: i64) -> Self {
        self.rating_scale = scale;
        self
    }

    pub fn with_primary_bonus(mut self, bonus: i64) -> Self {
        self.primary_bonus = bonus;
        self
    }

    pub fn with_solver(mut self, solver: SolverConfig) -> Self {
        self.solver = solver;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Validates the configuration.
    ///
    /// The primary bonus summed over every slot must stay below one rating
    /// point, so it can only break ties between equally balanced lineups.
    pub fn validate(&self) -> Result<(), String> {
        let first = self
            .configurations
            .first()
            .ok_or_else(|| "at least one configuration is required".to_string())?;
        let slots = first.total_size();

        for config in &self.configurations {
            if config.teams.is_empty() || config.total_size() == 0 {
                return Err(format!("configuration '{}' is empty", config.label));
            }
            if config.total_size() != slots {
                return Err(format!(
                    "configuration '{}' needs {} players, '{}' needs {}",
                    config.label,
                    config.total_size(),
                    first.label,
                    slots
                ));
            }
        }

        if self.rating_scale <= 0 {
            return Err("rating_scale must be positive".into());
        }
        if self.primary_bonus < 0 {
            return Err("primary_bonus must be non-negative".into());
        }
        if self.primary_bonus.saturating_mul(slots as i64) >= self.rating_scale {
            return Err(format!(
                "primary_bonus {} over {} slots reaches the rating scale {}",
                self.primary_bonus, slots, self.rating_scale
            ));
        }
        self.solver.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_configurations() {
        let configs = standard_configurations();
        assert_eq!(configs.len(), 3);
        for config in &configs {
            assert_eq!(config.team_count(), 2);
            assert_eq!(config.total_size(), 12);
            for team in &config.teams {
                assert_eq!(team.size(), 6);
                assert_eq!(team.required("Setter"), 1);
                assert_eq!(team.required("Outside"), 2);
            }
        }
        assert_eq!(configs[1].teams[0].required("Libero"), 1);
        assert_eq!(configs[1].teams[1].required("Middle"), 2);
        assert_eq!(configs[2].teams[0].required("Libero"), 0);
    }

    #[test]
    fn test_default_is_valid() {
        let config = RankerConfig::default();
        assert_eq!(config.rating_scale, 1000);
        assert_eq!(config.primary_bonus, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_mismatched_totals_rejected() {
        let small = Configuration::new("small", vec![TeamShape::new().with("Court", 2)]);
        let config = RankerConfig::default().with_configurations(vec![
            standard_configurations().remove(0),
            small,
        ]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_list_rejected() {
        assert!(RankerConfig::default()
            .with_configurations(Vec::new())
            .validate()
            .is_err());
    }

    #[test]
    fn test_bonus_must_stay_below_scale() {
        // 12 slots * 84 = 1008 >= 1000
        assert!(RankerConfig::default()
            .with_primary_bonus(84)
            .validate()
            .is_err());
        assert!(RankerConfig::default()
            .with_primary_bonus(83)
            .validate()
            .is_ok());
        assert!(RankerConfig::default()
            .with_primary_bonus(-1)
            .validate()
            .is_err());
    }

    #[test]
    fn test_invalid_solver_limits_rejected() {
        let config =
            RankerConfig::default().with_solver(SolverConfig::default().with_solution_limit(0));
        assert!(config.validate().is_err());
    }
}
