//! Multi-configuration ranking.
//!
//! Every round is tried against a fixed list of team configurations. All
//! candidates go into one pool sorted by rating gap; the caller picks one.

mod config;
mod runner;

pub use config::{standard_configurations, RankerConfig};
pub use runner::{ConfigurationFailure, MultiConfigRanker, RankedPool};
