use crate::domain::model::{Assignment, Roster, Student};
use crate::utils::error::{AssignError, Result};
use std::fmt;

/// 分配流程的階段；只能往前推進
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    NotStarted,
    DormitoryResolved(Option<String>),
    RoomResolved(Option<String>),
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::NotStarted => write!(f, "NotStarted"),
            Phase::DormitoryResolved(_) => write!(f, "DormitoryResolved"),
            Phase::RoomResolved(_) => write!(f, "RoomResolved"),
        }
    }
}

/// 單一階段的輸出，由 `HousingState::merge` 併入狀態
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutput {
    Dormitory(Option<String>),
    Room(Option<String>),
}

impl StageOutput {
    fn stage_name(&self) -> &'static str {
        match self {
            StageOutput::Dormitory(_) => "assign_dormitory",
            StageOutput::Room(_) => "assign_room",
        }
    }
}

/// 一次執行共用的狀態，執行結束即丟棄
#[derive(Debug, Clone)]
pub struct HousingState {
    pub roster: Roster,
    pub student: Student,
    pub assigned_dorm: Option<String>,
    pub assigned_room: Option<String>,
    phase: Phase,
}

impl HousingState {
    pub fn new(roster: Roster, student: Student) -> Self {
        Self {
            roster,
            student,
            assigned_dorm: None,
            assigned_room: None,
            phase: Phase::NotStarted,
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn merge(&mut self, output: StageOutput) -> Result<()> {
        match output {
            StageOutput::Dormitory(dorm) if self.phase == Phase::NotStarted => {
                self.assigned_dorm = dorm.clone();
                self.phase = Phase::DormitoryResolved(dorm);
                Ok(())
            }
            StageOutput::Room(room) if matches!(self.phase, Phase::DormitoryResolved(_)) => {
                self.assigned_room = room.clone();
                self.phase = Phase::RoomResolved(room);
                Ok(())
            }
            output => Err(AssignError::StageOrderError {
                stage: output.stage_name().to_string(),
                phase: self.phase.to_string(),
            }),
        }
    }

    pub fn assignment(&self) -> Assignment {
        Assignment {
            assigned_dorm: self.assigned_dorm.clone(),
            assigned_room: self.assigned_room.clone(),
        }
    }
}
