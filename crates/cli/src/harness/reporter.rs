use anyhow::Result;
use clockwise_core::model::{ScenarioResult, ScenarioStatus, SuiteResult};

/// Output format for scenario results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
}

/// Report a scenario result in human-readable format
pub fn report_result(result: &ScenarioResult, verbose: bool) {
    println!("Scenario: {}", result.scenario_name);

    match result.status {
        ScenarioStatus::Pass => {
            println!("Status: PASS");
            println!();
            println!("✓ All steps matched their expectations");
            println!("✓ Final record state matched");
        }
        ScenarioStatus::Fail => {
            println!("Status: FAIL");
            println!();

            if !result.step_issues.is_empty() {
                println!("Step Issues ({}):", result.step_issues.len());
                for (shown, issue) in result.step_issues.iter().enumerate() {
                    println!("  ✗ Step {} ({}): {}", issue.step, issue.action, issue.message);

                    if !verbose && shown + 1 >= 5 && result.step_issues.len() > 5 {
                        println!(
                            "  ... and {} more issues (use --verbose to see all)",
                            result.step_issues.len() - 5
                        );
                        break;
                    }
                }
            }

            if !result.record_mismatches.is_empty() {
                if !result.step_issues.is_empty() {
                    println!();
                }
                println!("Record Mismatches ({}):", result.record_mismatches.len());
                for (shown, mismatch) in result.record_mismatches.iter().enumerate() {
                    println!("  ✗ {} / {}", mismatch.record, mismatch.field);
                    println!("      Expected: {}", mismatch.expected);
                    println!("      Actual:   {}", mismatch.actual);

                    if !verbose && shown + 1 >= 5 && result.record_mismatches.len() > 5 {
                        println!(
                            "  ... and {} more mismatches (use --verbose to see all)",
                            result.record_mismatches.len() - 5
                        );
                        break;
                    }
                }
            }
        }
        ScenarioStatus::Error => {
            println!("Status: ERROR");
            println!();

            if let Some(error) = &result.error {
                println!("Error: {error}");
            }
        }
    }
}

/// Report suite results in human-readable format
pub fn report_suite_result(suite_result: &SuiteResult, verbose: bool) {
    println!("Scenario Suite Results");
    println!("======================");
    println!();
    println!("Total:   {}", suite_result.total);
    println!(
        "Passed:  {} ({:.1}%)",
        suite_result.passed,
        percentage(suite_result.passed, suite_result.total)
    );
    println!(
        "Failed:  {} ({:.1}%)",
        suite_result.failed,
        percentage(suite_result.failed, suite_result.total)
    );
    println!(
        "Errored: {} ({:.1}%)",
        suite_result.errored,
        percentage(suite_result.errored, suite_result.total)
    );
    println!();

    for result in &suite_result.results {
        let status_symbol = match result.status {
            ScenarioStatus::Pass => "✓",
            ScenarioStatus::Fail => "✗",
            ScenarioStatus::Error => "⚠",
        };
        println!("{} {}", status_symbol, result.scenario_name);
    }

    if verbose {
        for result in &suite_result.results {
            if result.status != ScenarioStatus::Pass {
                println!();
                report_result(result, verbose);
            }
        }
    }
}

pub fn report_result_json(result: &ScenarioResult) -> Result<()> {
    let json = serde_json::to_string_pretty(result)?;
    println!("{}", json);
    Ok(())
}

pub fn report_suite_result_json(suite_result: &SuiteResult) -> Result<()> {
    let json = serde_json::to_string_pretty(suite_result)?;
    println!("{}", json);
    Ok(())
}

fn percentage(count: usize, total: usize) -> f64 {
    if total > 0 {
        (count as f64 / total as f64) * 100.0
    } else {
        0.0
    }
}
