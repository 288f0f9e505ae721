use crate::core::stage::AssignmentStage;
use crate::core::state::{HousingState, StageOutput};
use crate::core::{ChatMessage, Oracle, Roster};
use regex::Regex;

const CAMPUS_MANAGER_INSTRUCTIONS: &str = "
You are the Campus Housing Manager. Your job is to assign students to dormitories based on available space.
Select the first available one. If no dormitories have space, return \"No available dormitory.\"

Available Dormitories:
{dorm_list}
";

const DORM_REQUEST: &str = "Assign the student to a dormitory.";

/// 每棟宿舍一行：`<name>: <free> free spots`
pub fn render_dorm_listing(roster: &Roster) -> String {
    roster
        .dorms
        .iter()
        .map(|dorm| format!("{}: {} free spots", dorm.name, dorm.free_spots()))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn build_dorm_messages(dorm_list: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(CAMPUS_MANAGER_INSTRUCTIONS.replace("{dorm_list}", dorm_list)),
        ChatMessage::user(DORM_REQUEST),
    ]
}

/// 從 LLM 回覆中找出第一個完整出現的宿舍名稱（區分大小寫）
pub fn extract_dorm_name(response: &str, roster: &Roster) -> Option<String> {
    if roster.is_empty() {
        return None;
    }

    let alternatives = roster
        .dorm_names()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join("|");
    let pattern = format!(r"\b({})\b", alternatives);

    let re = match Regex::new(&pattern) {
        Ok(re) => re,
        Err(e) => {
            tracing::warn!("⚠️ Could not build dormitory pattern: {}", e);
            return None;
        }
    };

    re.captures(response)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

pub struct DormitoryStage<'a, O: Oracle> {
    oracle: &'a O,
}

impl<'a, O: Oracle> DormitoryStage<'a, O> {
    pub fn new(oracle: &'a O) -> Self {
        Self { oracle }
    }
}

#[async_trait::async_trait]
impl<'a, O: Oracle> AssignmentStage for DormitoryStage<'a, O> {
    async fn resolve(&self, state: &HousingState) -> StageOutput {
        let dorm_list = render_dorm_listing(&state.roster);
        tracing::debug!("Assigning dormitory. Available dorms:\n{}", dorm_list);

        let messages = build_dorm_messages(&dorm_list);
        let response = match self.oracle.complete(&messages).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("⚠️ Error in dormitory assignment: {}", e);
                return StageOutput::Dormitory(None);
            }
        };

        let result = response.trim();
        tracing::debug!("LLM dormitory response: {}", result);

        match extract_dorm_name(result, &state.roster) {
            Some(dorm) => {
                tracing::info!("🏠 Extracted dorm: {}", dorm);
                StageOutput::Dormitory(Some(dorm))
            }
            None => {
                tracing::info!("🚫 No dormitory found in response");
                StageOutput::Dormitory(None)
            }
        }
    }

    fn get_name(&self) -> &str {
        "assign_dormitory"
    }
}
