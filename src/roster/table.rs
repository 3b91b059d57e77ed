//! The session roster.

use super::types::{Player, PositionProfile};
use crate::error::EngineError;
use std::collections::{BTreeMap, HashMap};

/// All known players and position profiles for a session.
///
/// Players keep the order they were loaded in; that order is the tie-break
/// used when rotation has to choose between equally rested players.
#[derive(Debug, Clone)]
pub struct Roster {
    players: Vec<Player>,
    index: HashMap<String, usize>,
    profiles: BTreeMap<String, PositionProfile>,
}

impl Roster {
    /// Builds a roster, rejecting duplicate player names.
    ///
    /// Profiles with the same position replace earlier ones.
    pub fn new(
        players: Vec<Player>,
        profiles: impl IntoIterator<Item = PositionProfile>,
    ) -> Result<Self, EngineError> {
        let mut index = HashMap::with_capacity(players.len());
        for (i, player) in players.iter().enumerate() {
            if index.insert(player.name.clone(), i).is_some() {
                return Err(EngineError::DuplicatePlayer {
                    name: player.name.clone(),
                });
            }
        }
        let profiles = profiles
            .into_iter()
            .map(|p| (p.position.clone(), p))
            .collect();
        Ok(Self {
            players,
            index,
            profiles,
        })
    }

    /// Looks up a player by name.
    pub fn player(&self, name: &str) -> Option<&Player> {
        self.index.get(name).map(|&i| &self.players[i])
    }

    /// Looks up a player, failing with [`EngineError::UnknownPlayer`].
    pub fn require(&self, name: &str) -> Result<&Player, EngineError> {
        self.player(name).ok_or_else(|| EngineError::UnknownPlayer {
            name: name.to_string(),
        })
    }

    /// Whether a player with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Weight profile of a position.
    pub fn profile(&self, position: &str) -> Option<&PositionProfile> {
        self.profiles.get(position)
    }

    /// All players in load order.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// All position profiles.
    pub fn profiles(&self) -> impl Iterator<Item = &PositionProfile> {
        self.profiles.values()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Whether two players conflict. A conflict listed on either side counts.
    pub fn in_conflict(&self, a: &str, b: &str) -> bool {
        let listed = |x: &str, y: &str| {
            self.player(x).is_some_and(|p| p.conflicts.contains(y))
        };
        listed(a, b) || listed(b, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_rejected() {
        let err = Roster::new(vec![Player::new("a"), Player::new("a")], []).unwrap_err();
        assert_eq!(err, EngineError::DuplicatePlayer { name: "a".into() });
    }

    #[test]
    fn test_conflict_is_symmetric() {
        let roster = Roster::new(
            vec![Player::new("a").with_conflict("b"), Player::new("b")],
            [],
        )
        .unwrap();
        assert!(roster.in_conflict("a", "b"));
        assert!(roster.in_conflict("b", "a"));
        assert!(!roster.in_conflict("a", "c"));
    }

    #[test]
    fn test_lookup_and_order() {
        let roster = Roster::new(
            vec![Player::new("x"), Player::new("y")],
            [PositionProfile::new("Setter")],
        )
        .unwrap();
        assert_eq!(roster.player("y").map(|p| p.name.as_str()), Some("y"));
        assert!(roster.profile("Setter").is_some());
        assert!(matches!(
            roster.require("z"),
            Err(EngineError::UnknownPlayer { .. })
        ));
        assert_eq!(roster.len(), 2);
    }
}
