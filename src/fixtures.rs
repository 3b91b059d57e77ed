//! Shared test rosters.

use crate::assignment::{Configuration, TeamShape};
use crate::roster::{Player, PositionProfile, Roster};

/// Weight profiles for the five volleyball positions, ordered like
/// [`Skill::ALL`](crate::roster::Skill::ALL).
pub(crate) fn volleyball_profiles() -> Vec<PositionProfile> {
    vec![
        PositionProfile::new("Setter").with_weights([1.0, 1.0, 4.0, 1.0, 1.0, 2.0]),
        PositionProfile::new("Outside").with_weights([2.0, 3.0, 0.5, 3.0, 1.0, 2.0]),
        PositionProfile::new("Middle").with_weights([1.0, 0.5, 0.5, 3.0, 4.0, 1.0]),
        PositionProfile::new("Libero").with_weights([0.0, 4.0, 1.0, 0.0, 0.0, 4.0]),
        PositionProfile::new("Opposite").with_weights([2.0, 1.0, 0.5, 4.0, 2.0, 1.0]),
    ]
}

fn skills_for(i: usize) -> [f64; 6] {
    let base = 2.0 + (i % 4) as f64 * 0.5;
    [
        base,
        base + 0.5,
        base - 0.5,
        base + (i % 3) as f64 * 0.25,
        base,
        base + 0.25,
    ]
}

/// Twelve single-position players covering one configuration exactly:
/// two setters, four outsides, two middles, two liberos, two opposites.
pub(crate) fn twelve_player_roster() -> Roster {
    let positions = [
        "Setter", "Setter", "Outside", "Outside", "Outside", "Outside", "Middle", "Middle",
        "Libero", "Libero", "Opposite", "Opposite",
    ];
    let players = positions
        .iter()
        .enumerate()
        .map(|(i, pos)| {
            Player::new(format!("P{i:02}"))
                .with_skills(skills_for(i))
                .with_positions([*pos])
        })
        .collect();
    Roster::new(players, volleyball_profiles()).unwrap()
}

/// One configuration matching [`twelve_player_roster`].
pub(crate) fn balanced_configuration() -> Configuration {
    let shape = TeamShape::new()
        .with("Setter", 1)
        .with("Outside", 2)
        .with("Middle", 1)
        .with("Libero", 1)
        .with("Opposite", 1);
    Configuration::new("standard", vec![shape.clone(), shape])
}

/// `n` players who can all play the single position "Court".
pub(crate) fn court_roster(n: usize) -> Roster {
    let players = (0..n)
        .map(|i| {
            Player::new(format!("C{i:02}"))
                .with_skills(skills_for(i))
                .with_positions(["Court"])
        })
        .collect();
    let profile =
        PositionProfile::new("Court").with_weights([1.0, 1.0, 1.0, 1.0, 1.0, 1.0]);
    Roster::new(players, [profile]).unwrap()
}

/// Two teams of `size` on the "Court" position.
pub(crate) fn court_configuration(size: usize) -> Configuration {
    let shape = TeamShape::new().with("Court", size);
    Configuration::new("court", vec![shape.clone(), shape])
}

/// Names in load order.
pub(crate) fn names(roster: &Roster) -> Vec<String> {
    roster.players().iter().map(|p| p.name.clone()).collect()
}
