use clap::Parser;
use dorm_assign::utils::{logger, validation::Validate};
use dorm_assign::{AssignError, AssignmentEngine, AssignmentFile, CliConfig, OpenAiOracle, Student};

fn fail(context: &str, e: &AssignError) -> ! {
    tracing::error!("❌ {}: {}", context, e);
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(1);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    logger::init_logger(config.verbose, config.log_json);

    tracing::info!("🚀 Starting dorm-assign");
    tracing::info!("📁 Loading roster from: {}", config.roster);

    let file = match AssignmentFile::from_file(&config.roster) {
        Ok(file) => file,
        Err(e) => fail("Failed to load roster file", &e),
    };
    if let Err(e) = file.validate() {
        fail("Roster validation failed", &e);
    }

    let settings = file.configuration();
    tracing::info!("👤 Running as {}", settings.user_id);
    tracing::debug!("Persona: {}", settings.task_role);

    let student = match Student::try_from(config.merge_student(file.student_record())) {
        Ok(student) => student,
        Err(e) => fail("Invalid student", &e),
    };

    let mut oracle_settings = file.oracle_settings();
    config.apply_oracle_overrides(&mut oracle_settings);
    if let Err(e) = oracle_settings.validate() {
        fail("Oracle configuration validation failed", &e);
    }

    let oracle = match OpenAiOracle::new(&oracle_settings) {
        Ok(oracle) => oracle,
        Err(e) => fail("Failed to create oracle client", &e),
    };
    tracing::info!("🤖 Using model {}", oracle.model());

    let engine = AssignmentEngine::new(oracle);
    let assignment = engine.run(file.roster(), student.clone()).await;

    let report = serde_json::json!({
        "user_id": settings.user_id,
        "student": student,
        "assigned_dorm": assignment.assigned_dorm,
        "assigned_room": assignment.assigned_room,
        "decided_at": chrono::Utc::now().to_rfc3339(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    if !assignment.is_placed() {
        tracing::warn!("⚠️ {} could not be placed", student.name);
    }

    Ok(())
}
