use crate::core::dormitory_stage::DormitoryStage;
use crate::core::room_stage::RoomStage;
use crate::core::stage::AssignmentStage;
use crate::core::state::HousingState;
use crate::core::{Assignment, Oracle, Record, Roster, Student};
use crate::utils::error::Result;

/// 固定兩步的分配流程：宿舍 → 房間 → 結束
pub struct AssignmentEngine<O: Oracle> {
    oracle: O,
}

impl<O: Oracle> AssignmentEngine<O> {
    pub fn new(oracle: O) -> Self {
        Self { oracle }
    }

    /// 一定會回傳結果；欄位為 None 代表無法安排，不是錯誤
    pub async fn run(&self, roster: Roster, student: Student) -> Assignment {
        match self.run_state(HousingState::new(roster, student)).await {
            Ok(state) => state.assignment(),
            // 固定的兩步順序不會產生順序錯誤
            Err(e) => {
                tracing::error!("❌ Assignment pipeline out of order: {}", e);
                Assignment::default()
            }
        }
    }

    /// 在流程邊界把鬆散的學生記錄轉成 `Student`，轉換失敗直接回報
    pub async fn run_record(&self, roster: Roster, student: Record) -> Result<Assignment> {
        let student = Student::try_from(student)?;
        Ok(self.run(roster, student).await)
    }

    pub async fn run_state(&self, mut state: HousingState) -> Result<HousingState> {
        tracing::info!("Starting assignment for student {}", state.student.name);

        let stages: [&dyn AssignmentStage; 2] = [
            &DormitoryStage::new(&self.oracle),
            &RoomStage::new(&self.oracle),
        ];

        for stage in stages {
            tracing::debug!("▶️ Running stage: {}", stage.get_name());
            let output = stage.resolve(&state).await;
            state.merge(output)?;
        }

        let assignment = state.assignment();
        if assignment.is_placed() {
            tracing::info!(
                "✅ Assignment completed: {:?} / {:?}",
                assignment.assigned_dorm,
                assignment.assigned_room
            );
        } else {
            tracing::info!(
                "🚫 Student {} could not be fully placed (dorm: {:?}, room: {:?})",
                state.student.name,
                assignment.assigned_dorm,
                assignment.assigned_room
            );
        }

        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::oracle::ScriptedOracle;
    use crate::core::state::Phase;
    use crate::core::Dormitory;
    use crate::utils::error::AssignError;
    use std::sync::Arc;

    fn roster() -> Roster {
        Roster::new()
            .with_dorm(
                Dormitory::new("Dorm A").with_room("Room 1", ["Alice (quiet)", "Bob (quiet)"]),
            )
            .with_dorm(Dormitory::new("Dorm C").with_room("Room 2", ["Dave"]))
    }

    #[tokio::test]
    async fn test_run_end_to_end() {
        let oracle = Arc::new(ScriptedOracle::replying(["Dorm C", "Room 2"]));
        let engine = AssignmentEngine::new(oracle.clone());

        let assignment = engine.run(roster(), Student::new("Eve", "social")).await;

        assert_eq!(assignment.assigned_dorm.as_deref(), Some("Dorm C"));
        assert_eq!(assignment.assigned_room.as_deref(), Some("Room 2"));
        assert_eq!(oracle.call_count(), 2);
    }

    #[tokio::test]
    async fn test_run_returns_empty_assignment_when_oracle_is_silent() {
        let oracle = Arc::new(ScriptedOracle::new(Vec::new()));
        let engine = AssignmentEngine::new(oracle.clone());

        let assignment: Assignment = engine.run(roster(), Student::new("Eve", "social")).await;

        assert_eq!(assignment, Assignment::default());
        assert!(!assignment.is_placed());
        assert_eq!(oracle.call_count(), 1);
    }

    #[tokio::test]
    async fn test_run_state_reaches_terminal_phase_without_dorm() {
        let oracle = Arc::new(ScriptedOracle::replying(["No available dormitory."]));
        let engine = AssignmentEngine::new(oracle.clone());

        let state = engine
            .run_state(HousingState::new(roster(), Student::new("Eve", "social")))
            .await
            .unwrap();

        assert_eq!(state.phase(), &Phase::RoomResolved(None));
        assert_eq!(state.assignment(), Assignment::default());
        assert_eq!(oracle.call_count(), 1);
    }

    #[tokio::test]
    async fn test_run_record_rejects_bad_student() {
        let oracle = Arc::new(ScriptedOracle::replying(["Dorm C", "Room 2"]));
        let engine = AssignmentEngine::new(oracle.clone());

        let err = engine
            .run_record(roster(), Record::new().with_field("name", "Eve"))
            .await
            .unwrap_err();

        assert!(matches!(err, AssignError::ValidationError { .. }));
        assert_eq!(oracle.call_count(), 0);
    }

    #[tokio::test]
    async fn test_run_with_trait_object_oracle() {
        let oracle: Arc<dyn Oracle> = Arc::new(ScriptedOracle::replying(["Dorm C", "Room 2"]));
        let engine = AssignmentEngine::new(oracle);

        let assignment = engine
            .run_record(
                roster(),
                Record::new()
                    .with_field("name", "Eve")
                    .with_field("personality", "social"),
            )
            .await
            .unwrap();

        assert!(assignment.is_placed());
    }
}
