use crate::utils::error::{AssignError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// 每間房間的床位上限
pub const ROOM_CAPACITY: usize = 2;

/// 未經驗證的鍵值記錄（例如 TOML table 或 JSON object）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Record {
    pub data: HashMap<String, serde_json::Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.data.insert(key.to_string(), value.into());
        self
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for Record {
    fn from(map: serde_json::Map<String, serde_json::Value>) -> Self {
        Self {
            data: map.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub name: String,
    pub personality: String,
}

impl Student {
    pub fn new(name: impl Into<String>, personality: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            personality: personality.into(),
        }
    }

    fn required_text(record: &Record, key: &str) -> Result<String> {
        match record.data.get(key) {
            Some(serde_json::Value::String(s)) if !s.trim().is_empty() => Ok(s.clone()),
            Some(serde_json::Value::String(_)) => Err(AssignError::validation(format!(
                "student field '{}' cannot be blank",
                key
            ))),
            Some(other) => Err(AssignError::validation(format!(
                "student field '{}' must be a string, got {}",
                key, other
            ))),
            None => Err(AssignError::validation(format!(
                "student record is missing '{}'",
                key
            ))),
        }
    }
}

impl TryFrom<Record> for Student {
    type Error = AssignError;

    fn try_from(record: Record) -> Result<Self> {
        Ok(Self {
            name: Self::required_text(&record, "name")?,
            personality: Self::required_text(&record, "personality")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub name: String,
    #[serde(default)]
    pub occupants: Vec<String>,
}

impl Room {
    pub fn free_spots(&self) -> usize {
        ROOM_CAPACITY.saturating_sub(self.occupants.len())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dormitory {
    pub name: String,
    #[serde(default)]
    pub rooms: Vec<Room>,
}

impl Dormitory {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rooms: Vec::new(),
        }
    }

    pub fn with_room<I, S>(mut self, name: impl Into<String>, occupants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rooms.push(Room {
            name: name.into(),
            occupants: occupants.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn room(&self, name: &str) -> Option<&Room> {
        self.rooms.iter().find(|r| r.name == name)
    }

    pub fn has_room(&self, name: &str) -> bool {
        self.room(name).is_some()
    }

    pub fn free_spots(&self) -> usize {
        self.rooms.iter().map(Room::free_spots).sum()
    }
}

/// 宿舍名冊，保留呼叫端提供的順序
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    #[serde(default)]
    pub dorms: Vec<Dormitory>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dorm(mut self, dorm: Dormitory) -> Self {
        self.dorms.push(dorm);
        self
    }

    pub fn dorm(&self, name: &str) -> Option<&Dormitory> {
        self.dorms.iter().find(|d| d.name == name)
    }

    pub fn dorm_names(&self) -> impl Iterator<Item = &str> {
        self.dorms.iter().map(|d| d.name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.dorms.is_empty()
    }

    /// 檢查名稱唯一性；超額房間只記錄警告
    pub fn validate(&self) -> Result<()> {
        let mut seen_dorms = HashSet::new();
        for dorm in &self.dorms {
            if !seen_dorms.insert(dorm.name.as_str()) {
                return Err(AssignError::validation(format!(
                    "duplicate dormitory '{}'",
                    dorm.name
                )));
            }

            let mut seen_rooms = HashSet::new();
            for room in &dorm.rooms {
                if !seen_rooms.insert(room.name.as_str()) {
                    return Err(AssignError::validation(format!(
                        "duplicate room '{}' in dormitory '{}'",
                        room.name, dorm.name
                    )));
                }
                if room.occupants.len() > ROOM_CAPACITY {
                    tracing::warn!(
                        "⚠️ {} / {} holds {} occupants (capacity {})",
                        dorm.name,
                        room.name,
                        room.occupants.len(),
                        ROOM_CAPACITY
                    );
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// 一次分配的最終結果；欄位為 None 表示無法安排
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub assigned_dorm: Option<String>,
    pub assigned_room: Option<String>,
}

impl Assignment {
    pub fn is_placed(&self) -> bool {
        self.assigned_dorm.is_some() && self.assigned_room.is_some()
    }
}
