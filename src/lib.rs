pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::oracle::{OpenAiOracle, ScriptedOracle};
pub use config::settings::{Configuration, OracleSettings};
pub use config::toml_config::AssignmentFile;
pub use core::engine::AssignmentEngine;
pub use core::state::{HousingState, Phase, StageOutput};
pub use domain::model::{Assignment, Dormitory, Record, Room, Roster, Student, ROOM_CAPACITY};
pub use domain::ports::Oracle;
pub use utils::error::{AssignError, Result};
