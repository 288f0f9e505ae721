pub mod settings;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::config::settings::OracleSettings;
#[cfg(feature = "cli")]
use crate::domain::model::Record;
#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "dorm-assign")]
#[command(about = "Assign a student to a dormitory and room with an LLM")]
pub struct CliConfig {
    /// Path to the TOML roster file
    #[arg(short, long, default_value = "roster.toml")]
    pub roster: String,

    /// Student name (overrides [student] in the roster file)
    #[arg(long)]
    pub name: Option<String>,

    /// Student personality (overrides [student] in the roster file)
    #[arg(long)]
    pub personality: Option<String>,

    /// Chat model to use
    #[arg(long)]
    pub model: Option<String>,

    /// OpenAI-compatible base URL
    #[arg(long)]
    pub base_url: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    pub fn apply_oracle_overrides(&self, settings: &mut OracleSettings) {
        if let Some(model) = &self.model {
            settings.model = model.clone();
        }
        if let Some(base_url) = &self.base_url {
            settings.base_url = base_url.clone();
        }
    }

    /// CLI 提供的欄位覆蓋檔案中的學生記錄
    pub fn merge_student(&self, base: Option<Record>) -> Record {
        let mut record = base.unwrap_or_default();
        if let Some(name) = &self.name {
            record.data.insert("name".to_string(), name.clone().into());
        }
        if let Some(personality) = &self.personality {
            record
                .data
                .insert("personality".to_string(), personality.clone().into());
        }
        record
    }
}
