pub mod dormitory_stage;
pub mod engine;
pub mod room_stage;
pub mod stage;
pub mod state;

pub use crate::domain::model::{
    Assignment, ChatMessage, Dormitory, Record, Role, Room, Roster, Student, ROOM_CAPACITY,
};
pub use crate::domain::ports::Oracle;
pub use crate::utils::error::Result;
