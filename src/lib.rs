//! Scenario-based demand simulation and purchase planning.
//!
//! A trained demand model is combined with static product data to simulate demand, revenue and
//! margin under several scenarios. The projections are then turned into purchase plans and the
//! scenarios are compared with one another.
#![warn(missing_docs)]
use std::path::PathBuf;

pub mod cli;
pub mod comparison;
pub mod error;
pub mod id;
pub mod input;
pub mod log;
pub mod model;
pub mod output;
pub mod planning;
pub mod predictor;
pub mod product;
pub mod scenario;
pub mod settings;
pub mod simulation;
pub mod units;

#[cfg(test)]
mod fixture;

/// Get config dir for program.
///
/// This is `<config dir>/stockcast`, where the config dir is platform-dependent (e.g.
/// `~/.config` on Linux). If no config dir can be determined, the current directory is used.
pub fn get_stockcast_config_dir() -> PathBuf {
    let mut path = dirs::config_dir().unwrap_or_default();
    path.push("stockcast");
    path
}
