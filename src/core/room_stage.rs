use crate::core::stage::AssignmentStage;
use crate::core::state::{HousingState, StageOutput};
use crate::core::{ChatMessage, Dormitory, Oracle, Student};
use regex::Regex;

const HOUSING_MANAGER_INSTRUCTIONS: &str = "
You are the Dormitory Housing Manager. Your job is to assign students to rooms based on personality and availability.
Each room can have a maximum of 2 students. If no compatible room is available, return \"No available room.\"

Current room assignments:
{room_assignments}

New student profile:
{student_profile}
";

const ROOM_REQUEST: &str = "Assign the student to a room.";

/// LLM 表示沒有合適房間時的固定回覆
pub const NO_ROOM_SENTINEL: &str = "No available room";

const ROOM_PATTERN: &str = r"Room (\d+)";

pub fn render_room_assignments(dorm: &Dormitory) -> String {
    dorm.rooms
        .iter()
        .map(|room| {
            let occupants = if room.occupants.is_empty() {
                "Empty".to_string()
            } else {
                room.occupants.join(", ")
            };
            format!("{}: {}", room.name, occupants)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_student_profile(student: &Student) -> String {
    format!("Name: {}, Personality: {}", student.name, student.personality)
}

pub fn build_room_messages(room_assignments: &str, student_profile: &str) -> Vec<ChatMessage> {
    let system = HOUSING_MANAGER_INSTRUCTIONS
        .replace("{room_assignments}", room_assignments)
        .replace("{student_profile}", student_profile);
    vec![ChatMessage::system(system), ChatMessage::user(ROOM_REQUEST)]
}

/// 解析 LLM 回覆中的房號，並確認該房間屬於指定宿舍
pub fn extract_room_name(response: &str, dorm: &Dormitory) -> Option<String> {
    let result = response.trim();
    if result == NO_ROOM_SENTINEL {
        return None;
    }

    let re = match Regex::new(ROOM_PATTERN) {
        Ok(re) => re,
        Err(e) => {
            tracing::warn!("⚠️ Could not build room pattern: {}", e);
            return None;
        }
    };

    let Some(caps) = re.captures(result) else {
        tracing::warn!("Could not extract room from LLM response");
        return None;
    };
    let room = format!("Room {}", &caps[1]);

    if !dorm.has_room(&room) {
        tracing::warn!("{} is not a valid room in {}", room, dorm.name);
        return None;
    }

    Some(room)
}

pub struct RoomStage<'a, O: Oracle> {
    oracle: &'a O,
}

impl<'a, O: Oracle> RoomStage<'a, O> {
    pub fn new(oracle: &'a O) -> Self {
        Self { oracle }
    }
}

#[async_trait::async_trait]
impl<'a, O: Oracle> AssignmentStage for RoomStage<'a, O> {
    async fn resolve(&self, state: &HousingState) -> StageOutput {
        let Some(dorm) = state
            .assigned_dorm
            .as_deref()
            .and_then(|name| state.roster.dorm(name))
        else {
            tracing::info!("🚫 No dormitory found for assignment");
            return StageOutput::Room(None);
        };

        let room_assignments = render_room_assignments(dorm);
        let student_profile = render_student_profile(&state.student);
        tracing::debug!(
            "Assigning room in {} for student: {}",
            dorm.name,
            student_profile
        );
        tracing::debug!("Current room assignments:\n{}", room_assignments);

        let messages = build_room_messages(&room_assignments, &student_profile);
        let response = match self.oracle.complete(&messages).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("⚠️ Error in room assignment: {}", e);
                return StageOutput::Room(None);
            }
        };
        tracing::debug!("LLM room response: {}", response.trim());

        let room = extract_room_name(&response, dorm);
        if let Some(room) = &room {
            tracing::info!(
                "🛏️ Student {} assigned to room {} in dorm {}",
                state.student.name,
                room,
                dorm.name
            );
        }
        StageOutput::Room(room)
    }

    fn get_name(&self) -> &str {
        "assign_room"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::oracle::ScriptedOracle;
    use crate::core::Roster;

    fn dorm_with_rooms(rooms: &[&str]) -> Dormitory {
        rooms
            .iter()
            .fold(Dormitory::new("Dorm C"), |dorm, room| {
                dorm.with_room(*room, Vec::<String>::new())
            })
    }

    fn resolved_state(dorm: Dormitory) -> HousingState {
        let mut state = HousingState::new(
            Roster::new().with_dorm(dorm),
            Student::new("Eve", "Is very social and loves to party late at night."),
        );
        state
            .merge(StageOutput::Dormitory(Some("Dorm C".to_string())))
            .unwrap();
        state
    }

    #[test]
    fn test_render_room_assignments() {
        let dorm = Dormitory::new("Dorm C")
            .with_room("Room 1", Vec::<String>::new())
            .with_room("Room 2", ["Dave (party)"])
            .with_room("Room 3", ["Ann (quiet)", "Ben (quiet)"]);

        assert_eq!(
            render_room_assignments(&dorm),
            "Room 1: Empty\nRoom 2: Dave (party)\nRoom 3: Ann (quiet), Ben (quiet)"
        );
    }

    #[test]
    fn test_render_student_profile() {
        assert_eq!(
            render_student_profile(&Student::new("Eve", "social")),
            "Name: Eve, Personality: social"
        );
    }

    #[test]
    fn test_prompt_embeds_assignments_and_profile() {
        let messages = build_room_messages("Room 1: Empty", "Name: Eve, Personality: social");
        assert!(messages[0]
            .content
            .contains("Current room assignments:\nRoom 1: Empty"));
        assert!(messages[0]
            .content
            .contains("New student profile:\nName: Eve, Personality: social"));
        assert!(messages[0].content.contains("maximum of 2 students"));
        assert_eq!(messages[1].content, "Assign the student to a room.");
    }

    #[test]
    fn test_extract_room_validates_membership() {
        let both = dorm_with_rooms(&["Room 1", "Room 2"]);
        assert_eq!(
            extract_room_name("I suggest Room 2", &both),
            Some("Room 2".to_string())
        );

        let gap = dorm_with_rooms(&["Room 1", "Room 3"]);
        assert_eq!(extract_room_name("I suggest Room 2", &gap), None);
    }

    #[test]
    fn test_extract_room_sentinel_and_garbage() {
        let dorm = dorm_with_rooms(&["Room 1"]);
        assert_eq!(extract_room_name("No available room", &dorm), None);
        assert_eq!(extract_room_name("  No available room\n", &dorm), None);
        assert_eq!(extract_room_name("Put her in the attic", &dorm), None);
        assert_eq!(extract_room_name("room 1", &dorm), None);
    }

    #[test]
    fn test_extract_room_first_match_wins() {
        let dorm = dorm_with_rooms(&["Room 1", "Room 3"]);
        assert_eq!(
            extract_room_name("Room 3, or maybe Room 1", &dorm),
            Some("Room 3".to_string())
        );
        // 第一個匹配不存在時不會再往後找
        assert_eq!(extract_room_name("Room 9, or maybe Room 1", &dorm), None);
    }

    #[tokio::test]
    async fn test_stage_without_dormitory_skips_oracle() {
        let oracle = ScriptedOracle::replying(["Room 1"]);
        let mut state = HousingState::new(
            Roster::new().with_dorm(dorm_with_rooms(&["Room 1"])),
            Student::new("Eve", "social"),
        );
        state.merge(StageOutput::Dormitory(None)).unwrap();

        let output = RoomStage::new(&oracle).resolve(&state).await;

        assert_eq!(output, StageOutput::Room(None));
        assert_eq!(oracle.call_count(), 0);
    }

    #[tokio::test]
    async fn test_stage_with_unknown_dormitory_skips_oracle() {
        let oracle = ScriptedOracle::replying(["Room 1"]);
        let mut state = HousingState::new(
            Roster::new().with_dorm(dorm_with_rooms(&["Room 1"])),
            Student::new("Eve", "social"),
        );
        state
            .merge(StageOutput::Dormitory(Some("Dorm Z".to_string())))
            .unwrap();

        let output = RoomStage::new(&oracle).resolve(&state).await;

        assert_eq!(output, StageOutput::Room(None));
        assert_eq!(oracle.call_count(), 0);
    }

    #[tokio::test]
    async fn test_stage_assigns_valid_room() {
        let oracle = ScriptedOracle::replying(["I suggest Room 2"]);
        let state = resolved_state(dorm_with_rooms(&["Room 1", "Room 2"]));

        let output = RoomStage::new(&oracle).resolve(&state).await;

        assert_eq!(output, StageOutput::Room(Some("Room 2".to_string())));
        let calls = oracle.calls();
        assert!(calls[0][0]
            .content
            .contains("Name: Eve, Personality: Is very social"));
    }

    #[tokio::test]
    async fn test_stage_sentinel_is_none() {
        let oracle = ScriptedOracle::replying(["No available room"]);
        let state = resolved_state(dorm_with_rooms(&["Room 1"]));
        let output = RoomStage::new(&oracle).resolve(&state).await;
        assert_eq!(output, StageOutput::Room(None));
        assert_eq!(oracle.call_count(), 1);
    }

    #[tokio::test]
    async fn test_stage_oracle_failure_is_none() {
        let oracle = ScriptedOracle::failing("rate limited");
        let state = resolved_state(dorm_with_rooms(&["Room 1"]));
        let output = RoomStage::new(&oracle).resolve(&state).await;
        assert_eq!(output, StageOutput::Room(None));
    }
}
