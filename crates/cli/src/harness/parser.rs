use anyhow::{Context, Result};
use clockwise_core::model::WorkflowScenario;
use std::path::Path;

/// Parse a workflow scenario from a YAML file, with field-path error
/// reporting and structural validation.
pub fn parse_scenario(path: &Path) -> Result<WorkflowScenario> {
    if !path.exists() {
        anyhow::bail!(
            "Scenario file not found: {}\nPlease check the file path and try again.",
            path.display()
        );
    }

    let content = std::fs::read_to_string(path).with_context(|| {
        format!(
            "Failed to read scenario file: {}\nPlease check file permissions.",
            path.display()
        )
    })?;

    let deserializer = serde_yaml::Deserializer::from_str(&content);
    let scenario: WorkflowScenario =
        serde_path_to_error::deserialize(deserializer).with_context(|| {
            format!(
                "Failed to parse YAML from: {}\n\
                 This usually means there's a syntax error or missing required field.",
                path.display()
            )
        })?;

    scenario.validate().with_context(|| {
        format!(
            "Validation failed for scenario: {}\n\
             The YAML was parsed successfully but references names it never declares\n\
             or describes steps the engine could never run.",
            path.display()
        )
    })?;

    Ok(scenario)
}
