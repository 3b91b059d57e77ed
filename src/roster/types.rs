//! Player and position types.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// A rated volleyball skill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Skill {
    Serve,
    Reception,
    Set,
    Attack,
    Block,
    Defense,
}

impl Skill {
    /// Every skill, in rating order.
    pub const ALL: [Skill; 6] = [
        Skill::Serve,
        Skill::Reception,
        Skill::Set,
        Skill::Attack,
        Skill::Block,
        Skill::Defense,
    ];

    /// Human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            Skill::Serve => "Serve",
            Skill::Reception => "Reception",
            Skill::Set => "Set",
            Skill::Attack => "Attack",
            Skill::Block => "Block",
            Skill::Defense => "Defense",
        }
    }
}

impl fmt::Display for Skill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A player available to the session.
///
/// `positions` is ordered: index 0 is the primary position. Conflicts may be
/// recorded on either side of a pair; [`Roster::in_conflict`](super::Roster::in_conflict)
/// treats them as symmetric.
///
/// # Examples
///
/// ```
/// use u_lineup::roster::{Player, Skill};
///
/// let p = Player::new("Ana")
///     .with_skill(Skill::Set, 4.5)
///     .with_positions(["Setter", "Opposite"])
///     .with_conflict("Bia");
/// assert_eq!(p.primary_position(), Some("Setter"));
/// assert!(p.can_play("Opposite"));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Player {
    /// Unique name.
    pub name: String,
    /// Raw skill values.
    pub skills: BTreeMap<Skill, f64>,
    /// Eligible positions, primary first.
    pub positions: Vec<String>,
    /// Names of players this player must not share a team with.
    pub conflicts: BTreeSet<String>,
}

impl Player {
    /// Creates a player with no skills, positions or conflicts.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            skills: BTreeMap::new(),
            positions: Vec::new(),
            conflicts: BTreeSet::new(),
        }
    }

    /// Sets a skill value.
    pub fn with_skill(mut self, skill: Skill, value: f64) -> Self {
        self.skills.insert(skill, value);
        self
    }

    /// Sets every skill from an array ordered like [`Skill::ALL`].
    pub fn with_skills(mut self, values: [f64; 6]) -> Self {
        for (skill, value) in Skill::ALL.into_iter().zip(values) {
            self.skills.insert(skill, value);
        }
        self
    }

    /// Appends eligible positions. Repeated positions are ignored.
    pub fn with_positions<I, S>(mut self, positions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for pos in positions {
            let pos = pos.into();
            if !self.positions.contains(&pos) {
                self.positions.push(pos);
            }
        }
        self
    }

    /// Records a conflict with another player.
    pub fn with_conflict(mut self, other: impl Into<String>) -> Self {
        self.conflicts.insert(other.into());
        self
    }

    /// The primary position, if any position is listed.
    pub fn primary_position(&self) -> Option<&str> {
        self.positions.first().map(String::as_str)
    }

    /// Whether `position` is among the eligible positions.
    pub fn can_play(&self, position: &str) -> bool {
        self.positions.iter().any(|p| p == position)
    }

    /// Raw value of a skill.
    pub fn skill(&self, skill: Skill) -> Option<f64> {
        self.skills.get(&skill).copied()
    }
}

/// Skill weights used to rate a player at one position.
///
/// Weights need not sum to one; ratings divide by the total.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PositionProfile {
    /// Position identifier.
    pub position: String,
    /// Non-negative weight per skill.
    pub weights: BTreeMap<Skill, f64>,
}

impl PositionProfile {
    /// Creates a profile with no weights.
    pub fn new(position: impl Into<String>) -> Self {
        Self {
            position: position.into(),
            weights: BTreeMap::new(),
        }
    }

    /// Sets one weight.
    pub fn with_weight(mut self, skill: Skill, weight: f64) -> Self {
        self.weights.insert(skill, weight);
        self
    }

    /// Sets every weight from an array ordered like [`Skill::ALL`].
    pub fn with_weights(mut self, weights: [f64; 6]) -> Self {
        for (skill, weight) in Skill::ALL.into_iter().zip(weights) {
            self.weights.insert(skill, weight);
        }
        self
    }

    /// Weight of a skill.
    pub fn weight(&self, skill: Skill) -> Option<f64> {
        self.weights.get(&skill).copied()
    }
}
