use crate::config::settings::{Configuration, OracleSettings};
use crate::domain::model::{Dormitory, Record, Roster};
use crate::utils::error::{AssignError, Result};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// 分配輸入檔：名冊、學生與 oracle 設定
///
/// ```toml
/// [oracle]
/// api_key = "${OPENAI_API_KEY}"
///
/// [student]
/// name = "Eve"
/// personality = "Is very social and loves to party late at night."
///
/// [[dorms]]
/// name = "Dorm C"
///
/// [[dorms.rooms]]
/// name = "Room 2"
/// occupants = ["Dave (party)"]
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssignmentFile {
    pub oracle: Option<OracleSection>,
    pub student: Option<serde_json::Map<String, serde_json::Value>>,
    pub configurable: Option<HashMap<String, String>>,
    #[serde(default)]
    pub dorms: Vec<Dormitory>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OracleSection {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub timeout_seconds: Option<u64>,
}

impl OracleSection {
    /// 只替換 `[oracle]` 的字串欄位，名冊與學生資料保持原文
    fn substitute_env_vars(&mut self) -> Result<()> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| AssignError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        for value in [&mut self.base_url, &mut self.api_key, &mut self.model]
            .into_iter()
            .flatten()
        {
            *value = substitute(&re, value);
        }
        Ok(())
    }

    pub fn apply_to(&self, settings: &mut OracleSettings) {
        if let Some(base_url) = &self.base_url {
            settings.base_url = base_url.clone();
        }
        // 未替換的 ${VAR} 不覆蓋環境變數取得的金鑰
        if let Some(api_key) = self.api_key.as_ref().filter(|k| !k.starts_with("${")) {
            settings.api_key = api_key.clone();
        }
        if let Some(model) = &self.model {
            settings.model = model.clone();
        }
        if let Some(temperature) = self.temperature {
            settings.temperature = temperature;
        }
        if let Some(timeout) = self.timeout_seconds {
            settings.timeout_seconds = timeout;
        }
    }
}

impl AssignmentFile {
    /// 從 TOML 檔案載入
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut file: Self = toml::from_str(content).map_err(|e| AssignError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })?;

        if let Some(section) = file.oracle.as_mut() {
            section.substitute_env_vars()?;
        }
        Ok(file)
    }

    pub fn roster(&self) -> Roster {
        Roster {
            dorms: self.dorms.clone(),
        }
    }

    pub fn student_record(&self) -> Option<Record> {
        self.student.clone().map(Record::from)
    }

    /// 依序套用：環境變數 → 檔案 `[oracle]`
    pub fn oracle_settings(&self) -> OracleSettings {
        let mut settings = OracleSettings::from_env();
        if let Some(section) = &self.oracle {
            section.apply_to(&mut settings);
        }
        settings
    }

    pub fn configuration(&self) -> Configuration {
        Configuration::from_env(&self.configurable.clone().unwrap_or_default())
    }
}

/// 替換環境變數 (例如 ${OPENAI_API_KEY})，未設定的保留原樣
fn substitute(re: &regex::Regex, value: &str) -> String {
    re.replace_all(value, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
    })
    .into_owned()
}

impl Validate for AssignmentFile {
    fn validate(&self) -> Result<()> {
        self.roster().validate()
    }
}
