//! Session bookkeeping carried between rounds.

use crate::assignment::RoundRoster;
use std::collections::HashMap;

/// Where the session is in the rotation cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RotationPhase {
    /// No round has been finalized yet.
    FirstRound,
    /// At least one round has been finalized.
    SteadyState,
}

/// Cumulative counters of one player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerRecord {
    pub games_played: u32,
    pub games_won: u32,
    /// Rounds played since the player last sat out.
    pub consecutive_rounds: u32,
}

/// One line of the per-round statistics export.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatsRow {
    pub name: String,
    pub games_played: u32,
    pub games_won: u32,
}

/// Everything the rotation remembers from one round to the next.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub(super) phase: RotationPhase,
    pub(super) round: usize,
    /// Roster load order, used for snapshots.
    pub(super) roster_order: Vec<String>,
    /// Present players in arrival order.
    pub(super) present: Vec<String>,
    pub(super) records: HashMap<String, PlayerRecord>,
    pub(super) mandatory: Vec<String>,
    pub(super) bench: Vec<String>,
    pub(super) new_arrivals: Vec<String>,
    pub(super) last_assigned: Vec<String>,
    pub(super) last_left_out: Vec<String>,
    pub(super) planned: Option<RoundRoster>,
}

impl SessionState {
    pub(super) fn new(roster_order: Vec<String>, present: Vec<String>) -> Self {
        let records = present
            .iter()
            .map(|name| (name.clone(), PlayerRecord::default()))
            .collect();
        Self {
            phase: RotationPhase::FirstRound,
            round: 1,
            roster_order,
            present,
            records,
            mandatory: Vec::new(),
            bench: Vec::new(),
            new_arrivals: Vec::new(),
            last_assigned: Vec::new(),
            last_left_out: Vec::new(),
            planned: None,
        }
    }

    pub fn phase(&self) -> RotationPhase {
        self.phase
    }

    /// Number of the next round to be finalized, starting at 1.
    pub fn round(&self) -> usize {
        self.round
    }

    /// Present players in arrival order.
    pub fn present(&self) -> &[String] {
        &self.present
    }

    pub fn record(&self, name: &str) -> Option<&PlayerRecord> {
        self.records.get(name)
    }

    /// Mandatory players of the most recently built round.
    pub fn mandatory(&self) -> &[String] {
        &self.mandatory
    }

    /// Benched players of the most recently built round.
    pub fn bench(&self) -> &[String] {
        &self.bench
    }

    /// Arrivals still waiting for their guaranteed round.
    pub fn new_arrivals(&self) -> &[String] {
        &self.new_arrivals
    }

    pub fn last_assigned(&self) -> &[String] {
        &self.last_assigned
    }

    pub fn last_left_out(&self) -> &[String] {
        &self.last_left_out
    }

    /// The round awaiting an outcome, if any.
    pub fn planned_round(&self) -> Option<&RoundRoster> {
        self.planned.as_ref()
    }

    /// Games played and won per player who has played, in roster order.
    pub fn snapshot(&self) -> Vec<StatsRow> {
        self.roster_order
            .iter()
            .filter_map(|name| {
                let record = self.records.get(name)?;
                (record.games_played > 0).then(|| StatsRow {
                    name: name.clone(),
                    games_played: record.games_played,
                    games_won: record.games_won,
                })
            })
            .collect()
    }

    /// Entry position of every present player; arrivals come last.
    pub(super) fn entry_positions(&self) -> HashMap<&str, usize> {
        self.present
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_str(), i))
            .collect()
    }

    pub(super) fn record_mut(&mut self, name: &str) -> &mut PlayerRecord {
        self.records.entry(name.to_string()).or_default()
    }
}
