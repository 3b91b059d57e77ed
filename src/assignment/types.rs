//! Team shapes, round rosters and candidate solutions.

use std::collections::HashSet;

/// Required players per position for one team.
///
/// Positions keep the order they were first added in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TeamShape {
    slots: Vec<(String, usize)>,
}

impl TeamShape {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `count` required players at `position`.
    pub fn with(mut self, position: impl Into<String>, count: usize) -> Self {
        let position = position.into();
        match self.slots.iter_mut().find(|(p, _)| *p == position) {
            Some((_, n)) => *n += count,
            None => self.slots.push((position, count)),
        }
        self
    }

    /// Total players on the team.
    pub fn size(&self) -> usize {
        self.slots.iter().map(|(_, n)| n).sum()
    }

    /// Required players at `position` (0 if absent).
    pub fn required(&self, position: &str) -> usize {
        self.slots
            .iter()
            .find(|(p, _)| p == position)
            .map_or(0, |(_, n)| *n)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.slots.iter().map(|(p, n)| (p.as_str(), *n))
    }
}

/// One admissible way to split the round into teams.
///
/// # Examples
///
/// ```
/// use u_lineup::assignment::{Configuration, TeamShape};
///
/// let a = TeamShape::new().with("Setter", 1).with("Outside", 2);
/// let b = TeamShape::new().with("Setter", 1).with("Middle", 2);
/// let config = Configuration::new("mixed", vec![a, b]);
///
/// assert_eq!(config.total_size(), 6);
/// assert_eq!(
///     config.position_totals(),
///     vec![("Setter".to_string(), 2), ("Outside".to_string(), 2), ("Middle".to_string(), 2)]
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Configuration {
    /// Human-readable name, carried into every candidate.
    pub label: String,
    /// One shape per team.
    pub teams: Vec<TeamShape>,
}

impl Configuration {
    pub fn new(label: impl Into<String>, teams: Vec<TeamShape>) -> Self {
        Self {
            label: label.into(),
            teams,
        }
    }

    pub fn team_count(&self) -> usize {
        self.teams.len()
    }

    /// Players needed across all teams.
    pub fn total_size(&self) -> usize {
        self.teams.iter().map(TeamShape::size).sum()
    }

    /// Required players per position summed over teams, in first-seen order.
    pub fn position_totals(&self) -> Vec<(String, usize)> {
        let mut totals: Vec<(String, usize)> = Vec::new();
        for (position, n) in self.teams.iter().flat_map(TeamShape::iter) {
            match totals.iter_mut().find(|(p, _)| p == position) {
                Some((_, total)) => *total += n,
                None => totals.push((position.to_string(), n)),
            }
        }
        totals
    }
}

/// Players eligible for one round, mandatory ones first.
///
/// Mandatory players are always part of the round, whether or not they
/// also appear in the entered list. Duplicates are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoundRoster {
    players: Vec<String>,
    mandatory: usize,
}

impl RoundRoster {
    pub fn new<E, M>(entered: E, mandatory: M) -> Self
    where
        E: IntoIterator,
        E::Item: Into<String>,
        M: IntoIterator,
        M::Item: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut players = Vec::new();
        for name in mandatory.into_iter().map(Into::into) {
            if seen.insert(name.clone()) {
                players.push(name);
            }
        }
        let mandatory = players.len();
        for name in entered.into_iter().map(Into::into) {
            if seen.insert(name.clone()) {
                players.push(name);
            }
        }
        Self { players, mandatory }
    }

    /// All round players: mandatory first, then optional fill.
    pub fn players(&self) -> &[String] {
        &self.players
    }

    pub fn mandatory(&self) -> &[String] {
        &self.players[..self.mandatory]
    }

    pub fn optional(&self) -> &[String] {
        &self.players[self.mandatory..]
    }

    pub fn is_mandatory(&self, name: &str) -> bool {
        self.mandatory().iter().any(|n| n == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.players.iter().any(|n| n == name)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

/// One player placed on a team at a position.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Placement {
    pub player: String,
    pub team: usize,
    pub position: String,
    /// Whether `position` is the player's primary position.
    pub primary: bool,
    /// Rating this placement adds to the team total.
    pub rating: i64,
}

/// Players of one team and their summed rating.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TeamLineup {
    pub players: Vec<Placement>,
    pub rating: i64,
}

impl TeamLineup {
    pub fn size(&self) -> usize {
        self.players.len()
    }

    /// Mean rating per player, back in skill units.
    pub fn average_rating(&self, scale: i64) -> f64 {
        if self.players.is_empty() || scale == 0 {
            return 0.0;
        }
        self.rating as f64 / self.players.len() as f64 / scale as f64
    }

    /// Members placed at `position`.
    pub fn players_at<'a>(&'a self, position: &'a str) -> impl Iterator<Item = &'a Placement> {
        self.players.iter().filter(move |p| p.position == position)
    }

    pub fn names(&self) -> Vec<&str> {
        self.players.iter().map(|p| p.player.as_str()).collect()
    }
}

/// One decoded solver solution.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CandidateSolution {
    /// Label of the configuration that produced it.
    pub configuration: String,
    pub teams: Vec<TeamLineup>,
    /// Round players not placed on any team, in round order.
    pub left_out: Vec<String>,
    /// Highest minus lowest team rating.
    pub rating_gap: i64,
    /// Objective value reported by the solver.
    pub objective: i64,
    /// Emission index within its configuration.
    pub sequence: usize,
}

impl CandidateSolution {
    /// Assigned players in team order.
    pub fn assigned_players(&self) -> Vec<&str> {
        self.teams.iter().flat_map(TeamLineup::names).collect()
    }

    /// Team index of a player, if assigned.
    pub fn team_of(&self, name: &str) -> Option<usize> {
        self.teams
            .iter()
            .position(|t| t.players.iter().any(|p| p.player == name))
    }

    pub fn is_assigned(&self, name: &str) -> bool {
        self.team_of(name).is_some()
    }

    /// Placements at a primary position.
    pub fn primary_count(&self) -> usize {
        self.teams
            .iter()
            .flat_map(|t| &t.players)
            .filter(|p| p.primary)
            .count()
    }
}
