//! Rating computation.

use crate::error::{DataError, EngineError};
use crate::roster::{Player, PositionProfile, Roster, Skill};
use std::collections::HashMap;

/// Fixed-point factor applied to the weighted skill mean.
pub const DEFAULT_RATING_SCALE: i64 = 1000;

/// Primary and adjusted ratings of one player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerRatings {
    /// Rating at the primary position.
    pub primary: i64,
    /// Rating used when the player fills a non-primary position.
    pub adjusted: i64,
}

/// Converts skill values and a weight profile into an integer rating.
///
/// # Examples
///
/// ```
/// use u_lineup::rating::RatingCalculator;
/// use u_lineup::roster::{Player, PositionProfile};
///
/// let player = Player::new("Ana").with_skills([3.0, 4.0, 5.0, 2.0, 2.0, 4.0]);
/// let setter = PositionProfile::new("Setter").with_weights([0.0, 0.0, 1.0, 0.0, 0.0, 1.0]);
///
/// let calc = RatingCalculator::default();
/// assert_eq!(calc.rating(&player, &setter).unwrap(), 4500);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatingCalculator {
    scale: i64,
}

impl Default for RatingCalculator {
    fn default() -> Self {
        Self::new(DEFAULT_RATING_SCALE)
    }
}

impl RatingCalculator {
    /// Creates a calculator with the given fixed-point scale.
    pub fn new(scale: i64) -> Self {
        Self { scale }
    }

    /// The fixed-point scale.
    pub fn scale(&self) -> i64 {
        self.scale
    }

    /// Rating of `player` under `profile`.
    ///
    /// Every skill in [`Skill::ALL`] must be present on both sides; a missing
    /// key is reported rather than treated as zero.
    pub fn rating(&self, player: &Player, profile: &PositionProfile) -> Result<i64, DataError> {
        let mut weighted = 0.0;
        let mut total_weight = 0.0;

        for skill in Skill::ALL {
            let weight = profile.weight(skill).ok_or_else(|| DataError::MissingWeight {
                position: profile.position.clone(),
                skill,
            })?;
            if !weight.is_finite() || weight < 0.0 {
                return Err(DataError::InvalidValue {
                    owner: profile.position.clone(),
                    skill,
                    value: weight,
                });
            }

            let value = player.skill(skill).ok_or_else(|| DataError::MissingSkill {
                player: player.name.clone(),
                skill,
            })?;
            if !value.is_finite() || value < 0.0 {
                return Err(DataError::InvalidValue {
                    owner: player.name.clone(),
                    skill,
                    value,
                });
            }

            weighted += value * weight;
            total_weight += weight;
        }

        if total_weight <= 0.0 {
            return Err(DataError::ZeroWeight {
                position: profile.position.clone(),
            });
        }

        Ok((weighted / total_weight * self.scale as f64).round() as i64)
    }

    /// Primary and adjusted ratings of `player`.
    ///
    /// Every listed position must have a profile in the roster, even though
    /// only the primary one is used for the value.
    pub fn rate(&self, player: &Player, roster: &Roster) -> Result<PlayerRatings, DataError> {
        let primary = player
            .primary_position()
            .ok_or_else(|| DataError::NoPositions {
                player: player.name.clone(),
            })?;

        for position in &player.positions {
            if roster.profile(position).is_none() {
                return Err(DataError::UnknownPosition {
                    player: player.name.clone(),
                    position: position.clone(),
                });
            }
        }

        let profile = roster
            .profile(primary)
            .ok_or_else(|| DataError::UnknownPosition {
                player: player.name.clone(),
                position: primary.to_string(),
            })?;
        let rating = self.rating(player, profile)?;

        Ok(PlayerRatings {
            primary: rating,
            adjusted: rating,
        })
    }
}

/// Ratings of the players present in one round.
#[derive(Debug, Clone, Default)]
pub struct RatingTable {
    ratings: HashMap<String, PlayerRatings>,
}

impl RatingTable {
    /// Rates every named player. Unknown names and data errors abort.
    pub fn compute<'a, I>(
        calculator: &RatingCalculator,
        roster: &Roster,
        names: I,
    ) -> Result<Self, EngineError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut ratings = HashMap::new();
        for name in names {
            let player = roster.require(name)?;
            ratings.insert(name.to_string(), calculator.rate(player, roster)?);
        }
        Ok(Self { ratings })
    }

    pub fn get(&self, name: &str) -> Option<PlayerRatings> {
        self.ratings.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.ratings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }
}
