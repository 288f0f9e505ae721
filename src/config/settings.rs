use crate::utils::error::Result;
use crate::utils::validation::{validate_non_empty_string, validate_range, validate_url, Validate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const DEFAULT_USER_ID: &str = "default-user";
pub const DEFAULT_TASK_ROLE: &str = "You are a Campus Housing Manager. You help assign students to dormitories and rooms based on availability.";

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 60;

/// 執行者設定：呼叫者識別碼與 LLM 角色描述
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    pub user_id: String,
    pub task_role: String,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            user_id: DEFAULT_USER_ID.to_string(),
            task_role: DEFAULT_TASK_ROLE.to_string(),
        }
    }
}

impl Configuration {
    /// 從環境變數與覆寫表建立設定，環境變數優先
    pub fn from_env(overrides: &HashMap<String, String>) -> Self {
        Self::from_sources(|key| std::env::var(key).ok(), overrides)
    }

    /// `lookup` 以大寫欄位名稱查詢（`USER_ID`、`TASK_ROLE`），空字串視為未設定
    pub fn from_sources<F>(lookup: F, overrides: &HashMap<String, String>) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let resolve = |field: &str| -> Option<String> {
            lookup(&field.to_uppercase())
                .or_else(|| overrides.get(field).cloned())
                .filter(|v| !v.is_empty())
        };

        let defaults = Self::default();
        Self {
            user_id: resolve("user_id").unwrap_or(defaults.user_id),
            task_role: resolve("task_role").unwrap_or(defaults.task_role),
        }
    }
}

/// OpenAI 相容端點的連線設定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleSettings {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub timeout_seconds: u64,
}

impl Default for OracleSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.0,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

impl OracleSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        Self {
            base_url: get("OPENAI_BASE_URL").unwrap_or(defaults.base_url),
            api_key: get("OPENAI_API_KEY").unwrap_or(defaults.api_key),
            model: get("ORACLE_MODEL").unwrap_or(defaults.model),
            temperature: defaults.temperature,
            timeout_seconds: defaults.timeout_seconds,
        }
    }
}

impl Validate for OracleSettings {
    fn validate(&self) -> Result<()> {
        validate_url("oracle.base_url", &self.base_url)?;
        validate_non_empty_string("oracle.api_key", &self.api_key)?;
        validate_non_empty_string("oracle.model", &self.model)?;
        validate_range("oracle.temperature", self.temperature, 0.0, 2.0)?;
        validate_range("oracle.timeout_seconds", self.timeout_seconds, 1, 600)?;
        Ok(())
    }
}
